use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};

use crate::entity::audit_trail;

pub struct AuditRepository<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> AuditRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn record(
        &self,
        document_id: i32,
        action: &str,
        performed_by: &str,
        at: DateTime<Utc>,
    ) -> Result<audit_trail::Model, DbErr> {
        audit_trail::ActiveModel {
            action: Set(action.to_string()),
            performed_by: Set(performed_by.to_string()),
            timestamp: Set(at),
            document_id: Set(document_id),
            ..Default::default()
        }
        .insert(self.conn)
        .await
    }

    /// Audit entries of a document in the order they were written.
    pub async fn find_by_document_id(
        &self,
        document_id: i32,
    ) -> Result<Vec<audit_trail::Model>, DbErr> {
        audit_trail::Entity::find()
            .filter(audit_trail::Column::DocumentId.eq(document_id))
            .order_by_asc(audit_trail::Column::Id)
            .all(self.conn)
            .await
    }
}
