use std::path::Path;

use crate::common::{TestApp, routes};

mod document_lookup {
    use super::*;

    #[tokio::test]
    async fn get_returns_document_with_latest_version() {
        let app = TestApp::spawn().await;
        let id = app.create_document("brochure.pdf", b"%PDF", "JohnDoe").await;

        let res = app.get(&routes::document(id)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["id"], id);
        assert_eq!(res.body["name"], "brochure.pdf");
        assert_eq!(res.body["owner"], "JohnDoe");
        assert_eq!(res.body["latestVersion"], 1);
    }

    #[tokio::test]
    async fn get_unknown_document_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::document(999)).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn lookup_by_name_prefers_newest_document() {
        let app = TestApp::spawn().await;
        app.create_document("shared.txt", b"one", "alice").await;
        let newest = app.create_document("shared.txt", b"two", "bob").await;

        let res = app.get(&routes::lookup("shared.txt")).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["id"], newest);
        assert_eq!(res.body["owner"], "bob");
    }

    #[tokio::test]
    async fn lookup_with_blank_name_is_rejected() {
        let app = TestApp::spawn().await;
        app.create_document("present.txt", b"here", "alice").await;

        for name in ["", "%20%20"] {
            let res = app.get(&routes::lookup(name)).await;

            assert_eq!(res.status, 400, "{name:?}");
            assert_eq!(res.body["code"], "VALIDATION_ERROR");
        }
    }

    #[tokio::test]
    async fn lookup_of_unknown_name_is_not_found() {
        let app = TestApp::spawn().await;
        app.create_document("present.txt", b"here", "alice").await;

        let res = app.get(&routes::lookup("absent.txt")).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod revisions {
    use super::*;

    #[tokio::test]
    async fn revision_becomes_next_version_and_keeps_old_content() {
        let app = TestApp::spawn().await;
        let id = app.create_document("plan.txt", b"v1", "JohnDoe").await;

        let res = app.upload_revision(id, "plan.txt", b"v2").await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["id"], id);
        assert_eq!(res.body["latestVersion"], 2);
        let revision_path = res.body["filePath"].as_str().unwrap();
        assert_eq!(Path::new(revision_path), app.revision_path(id, 2));
        assert_eq!(app.read_stored(revision_path), b"v2");
        assert_eq!(app.read_stored(app.stored_path("plan.txt")), b"v1");

        let latest = app.get(&routes::document(id)).await;
        assert_eq!(latest.body["latestVersion"], 2);
        assert_eq!(latest.body["filePath"], revision_path);
    }

    #[tokio::test]
    async fn upload_named_like_a_revision_leaves_it_intact() {
        let app = TestApp::spawn().await;
        let id = app.create_document("a.txt", b"v1", "JohnDoe").await;
        let revision = app.upload_revision(id, "a.txt", b"v2").await;
        assert_eq!(revision.status, 201, "{}", revision.text);

        let colliding = format!("{id}-v2");
        let other = app.create_document(&colliding, b"intruder", "mallory").await;

        assert_ne!(other, id);
        assert_eq!(app.read_stored(app.revision_path(id, 2)), b"v2");
        assert_eq!(app.read_stored(app.stored_path(&colliding)), b"intruder");

        let latest = app.get(&routes::document(id)).await;
        assert_eq!(app.read_stored(latest.body["filePath"].as_str().unwrap()), b"v2");

        let hidden = app.upload(".versions", b"x", "mallory").await;
        assert_eq!(hidden.status, 400);
    }

    #[tokio::test]
    async fn versions_are_listed_newest_first() {
        let app = TestApp::spawn().await;
        let id = app.create_document("log.txt", b"1", "JohnDoe").await;
        for content in [b"2", b"3"] {
            let res = app.upload_revision(id, "log.txt", content).await;
            assert_eq!(res.status, 201);
        }

        let res = app.get(&routes::versions(id)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["total"], 3);
        let numbers: Vec<i64> = res.body["versions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["version"].as_i64().unwrap())
            .collect();
        assert_eq!(numbers, vec![3, 2, 1]);
        assert!(
            res.body["versions"]
                .as_array()
                .unwrap()
                .iter()
                .all(|v| v["documentId"] == id)
        );
    }

    #[tokio::test]
    async fn audit_trail_records_each_action() {
        let app = TestApp::spawn().await;
        let id = app.create_document("audit.txt", b"a", "JohnDoe").await;
        app.upload_revision(id, "audit.txt", b"b").await;

        let res = app.get(&routes::audit(id)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["total"], 2);
        let entries = res.body["entries"].as_array().unwrap();
        assert_eq!(entries[0]["action"], "Created");
        assert_eq!(entries[1]["action"], "Updated");
        assert!(entries.iter().all(|e| e["performedBy"] == "anonymous"));
    }

    #[tokio::test]
    async fn revision_of_unknown_document_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.upload_revision(42, "ghost.txt", b"boo").await;

        assert_eq!(res.status, 404);
        assert_eq!(
            res.text,
            "An error occurred while uploading the document: Document 42 not found"
        );
        assert_eq!(app.row_counts().await, (0, 0));
    }

    #[tokio::test]
    async fn empty_revision_is_rejected() {
        let app = TestApp::spawn().await;
        let id = app.create_document("keep.txt", b"keep", "JohnDoe").await;

        let res = app.upload_revision(id, "keep.txt", b"").await;

        assert_eq!(res.status, 400);
        assert_eq!(res.text, "File is empty. Please upload a valid document.");
        assert_eq!(app.row_counts().await, (1, 1));
    }

    #[tokio::test]
    async fn versions_of_unknown_document_are_not_found() {
        let app = TestApp::spawn().await;

        assert_eq!(app.get(&routes::versions(7)).await.status, 404);
        assert_eq!(app.get(&routes::audit(7)).await.status, 404);
    }
}

mod api_docs {
    use super::*;

    #[tokio::test]
    async fn openapi_document_lists_upload_route() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::OPENAPI).await;

        assert_eq!(res.status, 200);
        assert!(res.body["paths"]["/documents/upload"]["post"].is_object());
        assert!(res.body["components"]["securitySchemes"]["basic"].is_object());
    }
}
