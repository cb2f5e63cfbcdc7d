use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::entity::document_version;

pub struct VersionRepository<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> VersionRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn insert(
        &self,
        document_id: i32,
        file_path: &str,
        version: i32,
        uploaded_at: DateTime<Utc>,
    ) -> Result<document_version::Model, DbErr> {
        document_version::ActiveModel {
            file_path: Set(file_path.to_string()),
            version: Set(version),
            uploaded_at: Set(uploaded_at),
            document_id: Set(document_id),
            ..Default::default()
        }
        .insert(self.conn)
        .await
    }

    /// All versions of a document, newest first.
    pub async fn find_by_document_id_order_by_version_desc(
        &self,
        document_id: i32,
    ) -> Result<Vec<document_version::Model>, DbErr> {
        document_version::Entity::find()
            .filter(document_version::Column::DocumentId.eq(document_id))
            .order_by_desc(document_version::Column::Version)
            .all(self.conn)
            .await
    }

    pub async fn latest(
        &self,
        document_id: i32,
    ) -> Result<Option<document_version::Model>, DbErr> {
        document_version::Entity::find()
            .filter(document_version::Column::DocumentId.eq(document_id))
            .order_by_desc(document_version::Column::Version)
            .one(self.conn)
            .await
    }

    /// The number the next version of a document should get.
    pub async fn next_version(&self, document_id: i32) -> Result<i32, DbErr> {
        let max: Option<i32> = document_version::Entity::find()
            .select_only()
            .column_as(document_version::Column::Version.max(), "max_version")
            .filter(document_version::Column::DocumentId.eq(document_id))
            .into_tuple::<Option<i32>>()
            .one(self.conn)
            .await?
            .flatten();

        max.unwrap_or(0)
            .checked_add(1)
            .ok_or_else(|| DbErr::Custom("version number overflow".into()))
    }

    pub async fn count(&self) -> Result<u64, DbErr> {
        document_version::Entity::find().count(self.conn).await
    }
}
