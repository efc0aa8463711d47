//! PostgreSQL implementation of HistoryRepository.
//!
//! Every call runs in its own transaction.

use async_trait::async_trait;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::live::{
    ChatRecord, GiftCatalogEntry, GiftRecord, MembershipRecord, PaidMessageRecord, RoomRecord,
    SenderColumns,
};
use crate::ports::HistoryRepository;

type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

/// PostgreSQL implementation of HistoryRepository.
#[derive(Clone)]
pub struct PostgresHistoryRepository {
    pool: PgPool,
}

impl PostgresHistoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>, DomainError> {
        self.pool.begin().await.map_err(|e| db_error("begin transaction", e))
    }

    /// Runs one insert in its own transaction.
    async fn insert_one(&self, table: &str, query: PgQuery<'_>) -> Result<(), DomainError> {
        let mut tx = self.begin().await?;
        query
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error(&format!("insert into {}", table), e))?;
        tx.commit()
            .await
            .map_err(|e| db_error(&format!("commit {}", table), e))
    }
}

fn db_error(action: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Failed to {}: {}", action, e),
    )
}

/// Converts an upstream id to the signed column type.
fn to_db_id(value: u64, field: &str) -> Result<i64, DomainError> {
    i64::try_from(value).map_err(|_| {
        DomainError::new(
            ErrorCode::InvalidFormat,
            format!("{} out of range: {}", field, value),
        )
        .with_detail("field", field)
    })
}

fn to_db_count(value: u32, field: &str) -> Result<i32, DomainError> {
    i32::try_from(value).map_err(|_| {
        DomainError::new(
            ErrorCode::InvalidFormat,
            format!("{} out of range: {}", field, value),
        )
    })
}

/// Binds the eight shared sender columns, in table order.
fn bind_sender<'q>(query: PgQuery<'q>, sender: &SenderColumns) -> Result<PgQuery<'q>, DomainError> {
    let uid = sender
        .uid
        .map(|uid| to_db_id(uid.as_u64(), "uid"))
        .transpose()?;

    Ok(query
        .bind(to_db_id(sender.room_id.as_u64(), "room_id")?)
        .bind(sender.user_name.clone())
        .bind(uid)
        .bind(to_db_count(sender.fan_level, "fan_level")?)
        .bind(sender.privilege.clone())
        .bind(sender.identity.clone())
        .bind(sender.avatar.clone())
        .bind(*sender.created_at.as_datetime()))
}

#[async_trait]
impl HistoryRepository for PostgresHistoryRepository {
    async fn insert_chat(&self, record: &ChatRecord) -> Result<(), DomainError> {
        let query = sqlx::query(
            r#"
            INSERT INTO chat_history (
                room_id, user_name, uid, fan_level, privilege, identity, avatar, created_at,
                text
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        );
        let query = bind_sender(query, &record.sender)?.bind(record.text.clone());
        self.insert_one("chat_history", query).await
    }

    async fn insert_paid_message(&self, record: &PaidMessageRecord) -> Result<(), DomainError> {
        let query = sqlx::query(
            r#"
            INSERT INTO paid_message_history (
                room_id, user_name, uid, fan_level, privilege, identity, avatar, created_at,
                text, price
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        );
        let query = bind_sender(query, &record.sender)?
            .bind(record.text.clone())
            .bind(record.price);
        self.insert_one("paid_message_history", query).await
    }

    async fn insert_gift(&self, record: &GiftRecord) -> Result<(), DomainError> {
        let query = sqlx::query(
            r#"
            INSERT INTO gift_history (
                room_id, user_name, uid, fan_level, privilege, identity, avatar, created_at,
                gift_name, gift_count, price
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        );
        let query = bind_sender(query, &record.sender)?
            .bind(record.gift_name.clone())
            .bind(to_db_count(record.gift_count, "gift_count")?)
            .bind(record.price);
        self.insert_one("gift_history", query).await
    }

    async fn insert_membership(&self, record: &MembershipRecord) -> Result<(), DomainError> {
        let query = sqlx::query(
            r#"
            INSERT INTO membership_history (
                room_id, user_name, uid, fan_level, privilege, identity, avatar, created_at,
                tier, months, price, is_purchase
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        );
        let query = bind_sender(query, &record.sender)?
            .bind(record.tier.clone())
            .bind(to_db_count(record.months, "months")?)
            .bind(record.price)
            .bind(record.is_purchase);
        self.insert_one("membership_history", query).await
    }

    async fn upsert_room(&self, room: &RoomRecord) -> Result<(), DomainError> {
        let query = sqlx::query(
            r#"
            INSERT INTO rooms (room_id, title, host, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (room_id) DO UPDATE SET
                title = EXCLUDED.title,
                host = EXCLUDED.host,
                updated_at = NOW()
            "#,
        )
        .bind(to_db_id(room.room_id.as_u64(), "room_id")?)
        .bind(room.title.clone())
        .bind(room.host.clone());
        self.insert_one("rooms", query).await
    }

    async fn replace_gift_catalog(&self, entries: &[GiftCatalogEntry]) -> Result<usize, DomainError> {
        let mut tx = self.begin().await?;

        sqlx::query("DELETE FROM gift_catalog")
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("clear gift catalog", e))?;

        for entry in entries {
            sqlx::query(
                r#"
                INSERT INTO gift_catalog (name, price, coin_type, image)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(entry.name.clone())
            .bind(entry.price)
            .bind(entry.coin_type.clone())
            .bind(entry.image.clone())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("insert gift catalog entry", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("commit gift catalog", e))?;
        Ok(entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_in_range_convert() {
        assert_eq!(to_db_id(12345, "room_id").unwrap(), 12345);
        assert_eq!(to_db_count(3, "months").unwrap(), 3);
    }

    #[test]
    fn oversized_ids_are_rejected() {
        let err = to_db_id(u64::MAX, "uid").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFormat);
        assert_eq!(err.details.get("field").map(String::as_str), Some("uid"));
        assert!(to_db_count(u32::MAX, "gift_count").is_err());
    }
}
