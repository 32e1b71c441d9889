use crate::error::LedgerResult;
use crate::models::{
    DailySummary, DamageEntry, NewDamage, NewRevenue, NewStock, NewUser, Notification,
    RevenueEntry, StockEntry, User,
};
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;

/// 持久化接口
///
/// 所有查询都按 user_id 隔离。汇总表的 (user_id, business_date) 唯一性由实现保证，
/// 调用方不加锁。
#[async_trait]
pub trait LedgerStore: Send + Sync {
    // ---- 用户 ----

    /// 用户名重复时返回 `LedgerError::Conflict`
    async fn create_user(&self, user: NewUser) -> LedgerResult<User>;

    async fn find_user_by_username(&self, username: &str) -> LedgerResult<Option<User>>;

    async fn get_user(&self, user_id: i64) -> LedgerResult<Option<User>>;

    /// 更新头像地址；用户不存在时返回 None
    async fn update_profile_url(&self, user_id: i64, profile_url: &str)
        -> LedgerResult<Option<User>>;

    // ---- 流水 ----

    async fn insert_revenue(&self, entry: NewRevenue) -> LedgerResult<RevenueEntry>;

    async fn insert_stock(&self, entry: NewStock) -> LedgerResult<StockEntry>;

    async fn insert_damage(&self, entry: NewDamage) -> LedgerResult<DamageEntry>;

    // ---- 汇总 ----

    /// 指定日期汇总的期末库存，没有汇总时返回 None
    async fn closing_stock(&self, user_id: i64, date: NaiveDate)
        -> LedgerResult<Option<BigDecimal>>;

    /// 当日进货合计，无记录时为 0
    async fn sum_stock_entries(&self, user_id: i64, date: NaiveDate) -> LedgerResult<BigDecimal>;

    /// 当日损耗合计，无记录时为 0
    async fn sum_damage_entries(&self, user_id: i64, date: NaiveDate)
        -> LedgerResult<BigDecimal>;

    /// 仅当 (user_id, business_date) 不存在时插入；写入时返回库中的行，已存在时返回 None
    async fn insert_summary_if_absent(&self, summary: &DailySummary)
        -> LedgerResult<Option<DailySummary>>;

    /// 插入或覆盖 (user_id, business_date) 的汇总
    async fn upsert_summary(&self, summary: &DailySummary) -> LedgerResult<DailySummary>;

    async fn get_summary(&self, user_id: i64, date: NaiveDate)
        -> LedgerResult<Option<DailySummary>>;

    /// 按营业日期降序
    async fn list_summaries(&self, user_id: i64) -> LedgerResult<Vec<DailySummary>>;

    // ---- 通知 ----

    async fn insert_notification(&self, user_id: i64, message: &str)
        -> LedgerResult<Notification>;

    /// 按创建时间降序
    async fn list_notifications(&self, user_id: i64) -> LedgerResult<Vec<Notification>>;
}
