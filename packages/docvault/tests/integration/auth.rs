use crate::common::{ADMIN_PASSWORD, ADMIN_USER, TestApp, routes, upload_form};

#[tokio::test]
async fn request_without_credentials_is_challenged() {
    let app = TestApp::spawn_with_auth().await;

    let res = app.get_without_credentials(&routes::document(1)).await;

    assert_eq!(res.status, 401);
    assert_eq!(res.body["code"], "CREDENTIALS_MISSING");
    assert_eq!(
        res.headers.get("www-authenticate").unwrap(),
        "Basic realm=\"docvault\""
    );
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let app = TestApp::spawn_with_auth().await;

    let res = app
        .get_with_credentials(&routes::document(1), ADMIN_USER, "not-the-password")
        .await;

    assert_eq!(res.status, 401);
    assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn unauthenticated_upload_stores_nothing() {
    let app = TestApp::spawn_with_auth().await;

    let res = app
        .post_form_without_credentials(
            routes::UPLOAD,
            upload_form(Some("secret.txt"), b"classified", Some("JohnDoe")),
        )
        .await;

    assert_eq!(res.status, 401);
    assert_eq!(app.row_counts().await, (0, 0));
    assert!(!app.stored_path("secret.txt").exists());
}

#[tokio::test]
async fn authenticated_upload_is_attributed_to_principal() {
    let app = TestApp::spawn_with_auth().await;

    let id = app.create_document("memo.txt", b"memo", "JohnDoe").await;

    let res = app
        .get_with_credentials(&routes::audit(id), ADMIN_USER, ADMIN_PASSWORD)
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["entries"][0]["performedBy"], ADMIN_USER);

    // Owner is what the client declared, not who authenticated.
    let doc = app.get(&routes::document(id)).await;
    assert_eq!(doc.body["owner"], "JohnDoe");
}
