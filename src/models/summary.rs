use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 每日经营汇总 (daily_summaries)，每个 (user_id, business_date) 至多一行
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub user_id: i64,
    pub business_date: NaiveDate,
    pub opening_stock: BigDecimal,
    pub total_stock: BigDecimal,
    pub damages: BigDecimal,
    pub net_cash: BigDecimal,
    pub closing_stock: BigDecimal,
    pub created_at: DateTime<Utc>,
}

impl DailySummary {
    /// 结转: closing = opening + total_stock - net_cash - damages
    pub fn roll_forward(
        user_id: i64,
        business_date: NaiveDate,
        opening_stock: BigDecimal,
        total_stock: BigDecimal,
        damages: BigDecimal,
        net_cash: BigDecimal,
    ) -> Self {
        let closing_stock = &opening_stock + &total_stock - &net_cash - &damages;
        Self {
            user_id,
            business_date,
            opening_stock,
            total_stock,
            damages,
            net_cash,
            closing_stock,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(v: i64) -> BigDecimal {
        BigDecimal::from(v)
    }

    #[test]
    fn closing_stock_subtracts_cash_and_damages() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let s = DailySummary::roll_forward(1, date, d(0), d(100), d(10), d(50));
        assert_eq!(s.closing_stock, d(40));
    }

    #[test]
    fn closing_stock_can_go_negative() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let s = DailySummary::roll_forward(1, date, d(5), d(0), d(0), d(20));
        assert_eq!(s.closing_stock, d(-15));
    }
}
