use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "document_version")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Location of the content in the blob store.
    pub file_path: String,

    /// 1-based, gapless per document.
    #[sea_orm(unique_key = "document_version_number")]
    pub version: i32,

    pub uploaded_at: DateTimeUtc,

    #[sea_orm(unique_key = "document_version_number")]
    pub document_id: i32,
    #[sea_orm(belongs_to, from = "document_id", to = "id")]
    pub document: HasOne<super::document::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
