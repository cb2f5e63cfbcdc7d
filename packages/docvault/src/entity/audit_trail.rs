use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "audit_trail")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// One of: Created, Updated
    pub action: String,
    /// Principal that performed the action.
    pub performed_by: String,
    pub timestamp: DateTimeUtc,

    pub document_id: i32,
    #[sea_orm(belongs_to, from = "document_id", to = "id")]
    pub document: HasOne<super::document::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}

pub const ACTION_CREATED: &str = "Created";
pub const ACTION_UPDATED: &str = "Updated";
