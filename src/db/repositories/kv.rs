use crate::entities::{kv_entries, prelude::*};
use anyhow::Result;
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder, QuerySelect, Set};

pub struct KvRepository {
    conn: DatabaseConnection,
}

impl KvRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = KvEntries::find_by_id(key.to_string())
            .one(&self.conn)
            .await?;
        Ok(row.map(|m| m.value))
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        let active_model = kv_entries::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value.to_string()),
            updated_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        KvEntries::insert(active_model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(kv_entries::Column::Key)
                    .update_columns([kv_entries::Column::Value, kv_entries::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(())
    }

    pub async fn remove(&self, key: &str) -> Result<bool> {
        let result = KvEntries::delete_by_id(key.to_string())
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn keys(&self) -> Result<Vec<String>> {
        let keys = KvEntries::find()
            .select_only()
            .column(kv_entries::Column::Key)
            .order_by_asc(kv_entries::Column::Key)
            .into_tuple::<String>()
            .all(&self.conn)
            .await?;
        Ok(keys)
    }
}
