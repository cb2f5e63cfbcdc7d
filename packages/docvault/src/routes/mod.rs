use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers::document;
use crate::state::AppState;

pub fn document_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(document::upload_document))
        .routes(routes!(document::find_document_by_name))
        .routes(routes!(document::get_document))
        .routes(routes!(
            document::list_versions,
            document::upload_revision
        ))
        .routes(routes!(document::list_audit_trail))
        .layer(document::upload_body_limit(
            config.storage.max_blob_size,
        ))
}
