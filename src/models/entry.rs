use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 日营业额 (revenue_entries)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueEntry {
    pub id: i64,
    pub user_id: i64,
    pub till: BigDecimal,
    pub expenditure: BigDecimal,
    pub net_cash: BigDecimal,
    pub business_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// 进货记录 (stock_entries)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockEntry {
    pub id: i64,
    pub user_id: i64,
    pub category: String,
    pub total_stock: BigDecimal,
    pub business_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// 损耗记录 (damage_entries)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageEntry {
    pub id: i64,
    pub user_id: i64,
    pub total_damages: BigDecimal,
    pub business_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewRevenue {
    pub user_id: i64,
    pub till: BigDecimal,
    pub expenditure: BigDecimal,
    pub net_cash: BigDecimal,
    pub business_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct NewStock {
    pub user_id: i64,
    pub category: String,
    pub total_stock: BigDecimal,
    pub business_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct NewDamage {
    pub user_id: i64,
    pub total_damages: BigDecimal,
    pub business_date: NaiveDate,
}
