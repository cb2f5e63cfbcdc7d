use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use common::StorageConfig;
use common::storage::filesystem::FilesystemBlobStore;
use reqwest::header::HeaderMap;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::Value;
use tempfile::TempDir;

use docvault::auth::{CredentialStore, InMemoryCredentialStore};
use docvault::config::{AppConfig, AuthConfig, CorsConfig, DatabaseConfig, ServerConfig};
use docvault::ingest::{REVISIONS_NAMESPACE, revision_blob_name};
use docvault::repository::{AuditRepository, DocumentRepository, VersionRepository};
use docvault::state::AppState;

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin123";

pub mod routes {
    pub const UPLOAD: &str = "/documents/upload";
    pub const OPENAPI: &str = "/api-docs/openapi.json";

    pub fn document(id: i64) -> String {
        format!("/documents/{id}")
    }

    pub fn lookup(name: &str) -> String {
        format!("/documents?name={name}")
    }

    pub fn versions(id: i64) -> String {
        format!("/documents/{id}/versions")
    }

    pub fn audit(id: i64) -> String {
        format!("/documents/{id}/audit")
    }
}

pub struct TestOptions {
    pub auth: bool,
    pub max_blob_size: u64,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            auth: false,
            max_blob_size: StorageConfig::default().max_blob_size,
        }
    }
}

/// A running test server backed by an in-memory database and a temporary
/// content directory.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
    pub content_root: PathBuf,
    /// Basic credentials attached to every request made through the helpers.
    credentials: Option<(String, String)>,
    _content_dir: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    pub headers: HeaderMap,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestResponse {
    async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let headers = res.headers().clone();
        let text = res.text().await.expect("Failed to read response body");
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self {
            status,
            headers,
            text,
            body,
        }
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(TestOptions::default()).await
    }

    /// Spawn with authentication enabled; helpers authenticate as the admin account.
    pub async fn spawn_with_auth() -> Self {
        Self::spawn_with(TestOptions {
            auth: true,
            ..Default::default()
        })
        .await
    }

    pub async fn spawn_with(options: TestOptions) -> Self {
        // One connection keeps every query on the same in-memory database.
        let mut opts = ConnectOptions::new("sqlite::memory:");
        opts.max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);
        let db = Database::connect(opts)
            .await
            .expect("Failed to connect to test database");
        docvault::database::sync_schema(&db)
            .await
            .expect("Failed to create schema");

        let content_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let content_root = content_dir.path().join("uploads");

        let app_config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors: CorsConfig {
                    allow_origins: vec![],
                    max_age: 3600,
                },
            },
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
            },
            storage: StorageConfig {
                content_root: content_root.clone(),
                max_blob_size: options.max_blob_size,
                ..Default::default()
            },
            auth: AuthConfig {
                enabled: options.auth,
                username: ADMIN_USER.to_string(),
                password: ADMIN_PASSWORD.to_string(),
            },
        };

        let blob_store = FilesystemBlobStore::new(content_root.clone(), options.max_blob_size)
            .await
            .expect("Failed to create blob store");

        let credentials: Option<Arc<dyn CredentialStore>> = if options.auth {
            Some(Arc::new(
                InMemoryCredentialStore::new(ADMIN_USER, ADMIN_PASSWORD)
                    .expect("Failed to hash test password"),
            ))
        } else {
            None
        };

        let revision_store = blob_store
            .namespace(REVISIONS_NAMESPACE)
            .await
            .expect("Failed to create revision store");

        let state = AppState {
            db: db.clone(),
            blob_store: Arc::new(blob_store),
            revision_store: Arc::new(revision_store),
            credentials,
            config: app_config,
        };

        let app = docvault::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
            content_root,
            credentials: options
                .auth
                .then(|| (ADMIN_USER.to_string(), ADMIN_PASSWORD.to_string())),
            _content_dir: content_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some((user, password)) => req.basic_auth(user, Some(password)),
            None => req,
        }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self
            .authorized(self.client.get(self.url(path)))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn get_without_credentials(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn get_with_credentials(
        &self,
        path: &str,
        user: &str,
        password: &str,
    ) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .basic_auth(user, Some(password))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn post_form(&self, path: &str, form: Form) -> TestResponse {
        let res = self
            .authorized(self.client.post(self.url(path)))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send multipart request");

        TestResponse::from_response(res).await
    }

    pub async fn post_form_without_credentials(&self, path: &str, form: Form) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send multipart request");

        TestResponse::from_response(res).await
    }

    /// Upload through `POST /documents/upload`.
    pub async fn upload(&self, file_name: &str, bytes: &[u8], owner: &str) -> TestResponse {
        self.post_form(routes::UPLOAD, upload_form(Some(file_name), bytes, Some(owner)))
            .await
    }

    /// Upload and return the new document id, panicking on anything but 201.
    pub async fn create_document(&self, file_name: &str, bytes: &[u8], owner: &str) -> i64 {
        let res = self.upload(file_name, bytes, owner).await;
        assert_eq!(res.status, 201, "upload failed: {}", res.text);
        res.body["id"].as_i64().unwrap()
    }

    pub async fn upload_revision(&self, id: i64, file_name: &str, bytes: &[u8]) -> TestResponse {
        self.post_form(&routes::versions(id), upload_form(Some(file_name), bytes, None))
            .await
    }

    pub fn stored_path(&self, name: &str) -> PathBuf {
        self.content_root.join(name)
    }

    /// Where version `version` (2 and up) of a document is kept.
    pub fn revision_path(&self, id: i64, version: i32) -> PathBuf {
        let id = i32::try_from(id).expect("document id out of range");
        self.content_root
            .join(format!(".{REVISIONS_NAMESPACE}"))
            .join(revision_blob_name(id, version))
    }

    pub fn read_stored(&self, path: impl AsRef<Path>) -> Vec<u8> {
        std::fs::read(path).expect("Failed to read stored blob")
    }

    /// (documents, versions)
    pub async fn row_counts(&self) -> (u64, u64) {
        (
            DocumentRepository::new(&self.db).count().await.unwrap(),
            VersionRepository::new(&self.db).count().await.unwrap(),
        )
    }

    pub async fn audit_actions(&self, document_id: i32) -> Vec<String> {
        AuditRepository::new(&self.db)
            .find_by_document_id(document_id)
            .await
            .unwrap()
            .into_iter()
            .map(|entry| entry.action)
            .collect()
    }
}

/// Build an upload form. `None` leaves the corresponding part out.
pub fn upload_form(file_name: Option<&str>, bytes: &[u8], owner: Option<&str>) -> Form {
    let mut form = Form::new();
    if let Some(file_name) = file_name {
        let part = Part::bytes(bytes.to_vec())
            .file_name(file_name.to_string())
            .mime_str("text/plain")
            .expect("Failed to set MIME type");
        form = form.part("file", part);
    }
    if let Some(owner) = owner {
        form = form.text("owner", owner.to_string());
    }
    form
}
