use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, sea_query::LockType,
};

use crate::entity::document;

pub struct DocumentRepository<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> DocumentRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Insert a document. The identifier is assigned by the database.
    pub async fn insert(
        &self,
        name: &str,
        owner: &str,
        created_at: DateTime<Utc>,
    ) -> Result<document::Model, DbErr> {
        document::ActiveModel {
            name: Set(name.to_string()),
            owner: Set(owner.to_string()),
            created_at: Set(created_at),
            ..Default::default()
        }
        .insert(self.conn)
        .await
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<document::Model>, DbErr> {
        document::Entity::find_by_id(id).one(self.conn).await
    }

    /// Find a document and lock its row until the surrounding transaction ends.
    pub async fn find_by_id_for_update(&self, id: i32) -> Result<Option<document::Model>, DbErr> {
        document::Entity::find_by_id(id)
            .lock(LockType::Update)
            .one(self.conn)
            .await
    }

    /// Names are not unique; the most recently created document wins.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<document::Model>, DbErr> {
        document::Entity::find()
            .filter(document::Column::Name.eq(name))
            .order_by_desc(document::Column::Id)
            .one(self.conn)
            .await
    }

    pub async fn exists_by_name(&self, name: &str) -> Result<bool, DbErr> {
        let count = document::Entity::find()
            .filter(document::Column::Name.eq(name))
            .count(self.conn)
            .await?;

        Ok(count > 0)
    }

    pub async fn count(&self) -> Result<u64, DbErr> {
        document::Entity::find().count(self.conn).await
    }
}
