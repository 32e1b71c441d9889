use crate::models::{
    DailySummary, DamageEntry, NewDamage, NewRevenue, NewStock, NewUser, Notification,
    RevenueEntry, StockEntry, User,
};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use sqlx::PgPool;

const USER_COLUMNS: &str =
    "user_id, name, surname, username, password_hash, profile_url, created_at";

const SUMMARY_COLUMNS: &str = "user_id, business_date, opening_stock, total_stock, damages, \
     net_cash, closing_stock, created_at";

/// 新增用户
pub async fn insert_user(pool: &PgPool, user: &NewUser) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (name, surname, username, password_hash)
         VALUES ($1, $2, $3, $4)
         RETURNING {USER_COLUMNS}"
    ))
    .bind(&user.name)
    .bind(&user.surname)
    .bind(&user.username)
    .bind(&user.password_hash)
    .fetch_one(pool)
    .await
}

/// 按用户名查询用户
pub async fn get_user_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await
}

/// 按ID查询用户
pub async fn get_user(pool: &PgPool, user_id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"))
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// 更新头像地址
pub async fn update_profile_url(
    pool: &PgPool,
    user_id: i64,
    profile_url: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET profile_url = $2 WHERE user_id = $1 RETURNING {USER_COLUMNS}"
    ))
    .bind(user_id)
    .bind(profile_url)
    .fetch_optional(pool)
    .await
}

/// 新增营业额记录
pub async fn insert_revenue(
    pool: &PgPool,
    entry: &NewRevenue,
) -> Result<RevenueEntry, sqlx::Error> {
    sqlx::query_as::<_, RevenueEntry>(
        r#"
        INSERT INTO revenue_entries (user_id, till, expenditure, net_cash, business_date)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, user_id, till, expenditure, net_cash, business_date, created_at
        "#,
    )
    .bind(entry.user_id)
    .bind(&entry.till)
    .bind(&entry.expenditure)
    .bind(&entry.net_cash)
    .bind(entry.business_date)
    .fetch_one(pool)
    .await
}

/// 新增进货记录
pub async fn insert_stock(pool: &PgPool, entry: &NewStock) -> Result<StockEntry, sqlx::Error> {
    sqlx::query_as::<_, StockEntry>(
        r#"
        INSERT INTO stock_entries (user_id, category, total_stock, business_date)
        VALUES ($1, $2, $3, $4)
        RETURNING id, user_id, category, total_stock, business_date, created_at
        "#,
    )
    .bind(entry.user_id)
    .bind(&entry.category)
    .bind(&entry.total_stock)
    .bind(entry.business_date)
    .fetch_one(pool)
    .await
}

/// 新增损耗记录
pub async fn insert_damage(pool: &PgPool, entry: &NewDamage) -> Result<DamageEntry, sqlx::Error> {
    sqlx::query_as::<_, DamageEntry>(
        r#"
        INSERT INTO damage_entries (user_id, total_damages, business_date)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, total_damages, business_date, created_at
        "#,
    )
    .bind(entry.user_id)
    .bind(&entry.total_damages)
    .bind(entry.business_date)
    .fetch_one(pool)
    .await
}

/// 查询某日汇总的期末库存
pub async fn get_closing_stock(
    pool: &PgPool,
    user_id: i64,
    date: NaiveDate,
) -> Result<Option<BigDecimal>, sqlx::Error> {
    sqlx::query_scalar::<_, BigDecimal>(
        r#"
        SELECT closing_stock
        FROM daily_summaries
        WHERE user_id = $1 AND business_date = $2
        "#,
    )
    .bind(user_id)
    .bind(date)
    .fetch_optional(pool)
    .await
}

/// 当日进货合计
pub async fn sum_stock_entries(
    pool: &PgPool,
    user_id: i64,
    date: NaiveDate,
) -> Result<BigDecimal, sqlx::Error> {
    sqlx::query_scalar::<_, BigDecimal>(
        r#"
        SELECT COALESCE(SUM(total_stock), 0)
        FROM stock_entries
        WHERE user_id = $1 AND business_date = $2
        "#,
    )
    .bind(user_id)
    .bind(date)
    .fetch_one(pool)
    .await
}

/// 当日损耗合计
pub async fn sum_damage_entries(
    pool: &PgPool,
    user_id: i64,
    date: NaiveDate,
) -> Result<BigDecimal, sqlx::Error> {
    sqlx::query_scalar::<_, BigDecimal>(
        r#"
        SELECT COALESCE(SUM(total_damages), 0)
        FROM damage_entries
        WHERE user_id = $1 AND business_date = $2
        "#,
    )
    .bind(user_id)
    .bind(date)
    .fetch_one(pool)
    .await
}

/// 写入汇总，主键冲突时什么都不做；写入时返回库中的行
pub async fn insert_summary_if_absent(
    pool: &PgPool,
    s: &DailySummary,
) -> Result<Option<DailySummary>, sqlx::Error> {
    sqlx::query_as::<_, DailySummary>(&format!(
        "INSERT INTO daily_summaries
            (user_id, business_date, opening_stock, total_stock, damages, net_cash, closing_stock, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         ON CONFLICT (user_id, business_date) DO NOTHING
         RETURNING {SUMMARY_COLUMNS}"
    ))
    .bind(s.user_id)
    .bind(s.business_date)
    .bind(&s.opening_stock)
    .bind(&s.total_stock)
    .bind(&s.damages)
    .bind(&s.net_cash)
    .bind(&s.closing_stock)
    .bind(s.created_at)
    .fetch_optional(pool)
    .await
}

/// 写入或覆盖汇总
pub async fn upsert_summary(pool: &PgPool, s: &DailySummary) -> Result<DailySummary, sqlx::Error> {
    sqlx::query_as::<_, DailySummary>(&format!(
        "INSERT INTO daily_summaries
            (user_id, business_date, opening_stock, total_stock, damages, net_cash, closing_stock, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         ON CONFLICT (user_id, business_date) DO UPDATE SET
            opening_stock = EXCLUDED.opening_stock,
            total_stock   = EXCLUDED.total_stock,
            damages       = EXCLUDED.damages,
            net_cash      = EXCLUDED.net_cash,
            closing_stock = EXCLUDED.closing_stock,
            created_at    = EXCLUDED.created_at
         RETURNING {SUMMARY_COLUMNS}"
    ))
    .bind(s.user_id)
    .bind(s.business_date)
    .bind(&s.opening_stock)
    .bind(&s.total_stock)
    .bind(&s.damages)
    .bind(&s.net_cash)
    .bind(&s.closing_stock)
    .bind(s.created_at)
    .fetch_one(pool)
    .await
}

pub async fn get_summary(
    pool: &PgPool,
    user_id: i64,
    date: NaiveDate,
) -> Result<Option<DailySummary>, sqlx::Error> {
    sqlx::query_as::<_, DailySummary>(&format!(
        "SELECT {SUMMARY_COLUMNS} FROM daily_summaries WHERE user_id = $1 AND business_date = $2"
    ))
    .bind(user_id)
    .bind(date)
    .fetch_optional(pool)
    .await
}

/// 用户全部汇总 (营业日期降序)
pub async fn list_summaries(pool: &PgPool, user_id: i64) -> Result<Vec<DailySummary>, sqlx::Error> {
    sqlx::query_as::<_, DailySummary>(&format!(
        "SELECT {SUMMARY_COLUMNS} FROM daily_summaries WHERE user_id = $1 ORDER BY business_date DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn insert_notification(
    pool: &PgPool,
    user_id: i64,
    message: &str,
) -> Result<Notification, sqlx::Error> {
    sqlx::query_as::<_, Notification>(
        r#"
        INSERT INTO notifications (user_id, message)
        VALUES ($1, $2)
        RETURNING id, user_id, message, created_at
        "#,
    )
    .bind(user_id)
    .bind(message)
    .fetch_one(pool)
    .await
}

pub async fn list_notifications(
    pool: &PgPool,
    user_id: i64,
) -> Result<Vec<Notification>, sqlx::Error> {
    sqlx::query_as::<_, Notification>(
        r#"
        SELECT id, user_id, message, created_at
        FROM notifications
        WHERE user_id = $1
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}
