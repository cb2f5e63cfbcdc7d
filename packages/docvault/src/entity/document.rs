use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "document")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Original upload filename. Not unique: re-uploading a name creates a new document.
    pub name: String,
    pub owner: String,

    #[sea_orm(has_many)]
    pub versions: HasMany<super::document_version::Entity>,

    #[sea_orm(has_many)]
    pub audit_entries: HasMany<super::audit_trail::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
