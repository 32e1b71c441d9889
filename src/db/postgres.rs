use super::queries;
use super::store::LedgerStore;
use crate::error::{is_unique_violation, LedgerError, LedgerResult};
use crate::models::{
    DailySummary, DamageEntry, NewDamage, NewRevenue, NewStock, NewUser, Notification,
    RevenueEntry, StockEntry, User,
};
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use sqlx::PgPool;

/// 基于 PostgreSQL 的存储
#[derive(Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 执行 `migrations/` 下的建表脚本
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn create_user(&self, user: NewUser) -> LedgerResult<User> {
        queries::insert_user(&self.pool, &user).await.map_err(|e| {
            if is_unique_violation(&e) {
                LedgerError::Conflict(format!("username '{}' is already taken", user.username))
            } else {
                e.into()
            }
        })
    }

    async fn find_user_by_username(&self, username: &str) -> LedgerResult<Option<User>> {
        Ok(queries::get_user_by_username(&self.pool, username).await?)
    }

    async fn get_user(&self, user_id: i64) -> LedgerResult<Option<User>> {
        Ok(queries::get_user(&self.pool, user_id).await?)
    }

    async fn update_profile_url(
        &self,
        user_id: i64,
        profile_url: &str,
    ) -> LedgerResult<Option<User>> {
        Ok(queries::update_profile_url(&self.pool, user_id, profile_url).await?)
    }

    async fn insert_revenue(&self, entry: NewRevenue) -> LedgerResult<RevenueEntry> {
        Ok(queries::insert_revenue(&self.pool, &entry).await?)
    }

    async fn insert_stock(&self, entry: NewStock) -> LedgerResult<StockEntry> {
        Ok(queries::insert_stock(&self.pool, &entry).await?)
    }

    async fn insert_damage(&self, entry: NewDamage) -> LedgerResult<DamageEntry> {
        Ok(queries::insert_damage(&self.pool, &entry).await?)
    }

    async fn closing_stock(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> LedgerResult<Option<BigDecimal>> {
        Ok(queries::get_closing_stock(&self.pool, user_id, date).await?)
    }

    async fn sum_stock_entries(&self, user_id: i64, date: NaiveDate) -> LedgerResult<BigDecimal> {
        Ok(queries::sum_stock_entries(&self.pool, user_id, date).await?)
    }

    async fn sum_damage_entries(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> LedgerResult<BigDecimal> {
        Ok(queries::sum_damage_entries(&self.pool, user_id, date).await?)
    }

    async fn insert_summary_if_absent(
        &self,
        summary: &DailySummary,
    ) -> LedgerResult<Option<DailySummary>> {
        Ok(queries::insert_summary_if_absent(&self.pool, summary).await?)
    }

    async fn upsert_summary(&self, summary: &DailySummary) -> LedgerResult<DailySummary> {
        Ok(queries::upsert_summary(&self.pool, summary).await?)
    }

    async fn get_summary(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> LedgerResult<Option<DailySummary>> {
        Ok(queries::get_summary(&self.pool, user_id, date).await?)
    }

    async fn list_summaries(&self, user_id: i64) -> LedgerResult<Vec<DailySummary>> {
        Ok(queries::list_summaries(&self.pool, user_id).await?)
    }

    async fn insert_notification(
        &self,
        user_id: i64,
        message: &str,
    ) -> LedgerResult<Notification> {
        Ok(queries::insert_notification(&self.pool, user_id, message).await?)
    }

    async fn list_notifications(&self, user_id: i64) -> LedgerResult<Vec<Notification>> {
        Ok(queries::list_notifications(&self.pool, user_id).await?)
    }
}
