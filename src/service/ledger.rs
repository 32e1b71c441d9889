use crate::db::LedgerStore;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    checked_amount, DailySummary, DamageEntry, NewDamage, NewRevenue, NewStock, Notification, RevenueEntry,
    StockEntry, User,
};
use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDate;
use std::sync::Arc;

/// 流水录入、汇总查询与通知
pub struct LedgerService {
    store: Arc<dyn LedgerStore>,
}

/// 非负且能按 NUMERIC(14, 2) 原样存储
fn non_negative(field: &str, value: &BigDecimal) -> LedgerResult<BigDecimal> {
    if value < &BigDecimal::zero() {
        return Err(LedgerError::validation(format!("{} must not be negative", field)));
    }
    checked_amount(field, value)
}

fn non_blank(field: &str, value: &str) -> LedgerResult<()> {
    if value.trim().is_empty() {
        return Err(LedgerError::validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

impl LedgerService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// 记录营业额；未给出 net_cash 时按 till - expenditure 计算
    pub async fn record_revenue(
        &self,
        user_id: i64,
        till: BigDecimal,
        expenditure: BigDecimal,
        net_cash: Option<BigDecimal>,
        business_date: NaiveDate,
    ) -> LedgerResult<RevenueEntry> {
        let till = non_negative("till", &till)?;
        let expenditure = non_negative("expenditure", &expenditure)?;
        let net_cash = match net_cash {
            Some(v) => checked_amount("netCash", &v)?,
            None => &till - &expenditure,
        };

        let entry = self
            .store
            .insert_revenue(NewRevenue {
                user_id,
                till,
                expenditure,
                net_cash,
                business_date,
            })
            .await?;
        tracing::info!(
            "Revenue saved: user {} date {} net_cash {}",
            user_id, business_date, entry.net_cash
        );
        Ok(entry)
    }

    pub async fn record_stock(
        &self,
        user_id: i64,
        category: String,
        total_stock: BigDecimal,
        business_date: NaiveDate,
    ) -> LedgerResult<StockEntry> {
        non_blank("category", &category)?;
        let total_stock = non_negative("totalStock", &total_stock)?;

        let entry = self
            .store
            .insert_stock(NewStock {
                user_id,
                category: category.trim().to_string(),
                total_stock,
                business_date,
            })
            .await?;
        tracing::info!(
            "Stock saved: user {} date {} category {} amount {}",
            user_id, business_date, entry.category, entry.total_stock
        );
        Ok(entry)
    }

    pub async fn record_damage(
        &self,
        user_id: i64,
        total_damages: BigDecimal,
        business_date: NaiveDate,
    ) -> LedgerResult<DamageEntry> {
        let total_damages = non_negative("totalDamages", &total_damages)?;

        let entry = self
            .store
            .insert_damage(NewDamage {
                user_id,
                total_damages,
                business_date,
            })
            .await?;
        tracing::info!(
            "Damage recorded: user {} date {} amount {}",
            user_id, business_date, entry.total_damages
        );
        Ok(entry)
    }

    /// 用户全部每日汇总，最新日期在前
    pub async fn list_summaries(&self, user_id: i64) -> LedgerResult<Vec<DailySummary>> {
        self.store.list_summaries(user_id).await
    }

    /// 导出每日汇总为 CSV (含表头)
    pub async fn export_summaries_csv(&self, user_id: i64) -> LedgerResult<Vec<u8>> {
        let summaries = self.store.list_summaries(user_id).await?;
        summaries_to_csv(&summaries)
    }

    pub async fn save_notification(
        &self,
        user_id: i64,
        message: &str,
    ) -> LedgerResult<Notification> {
        non_blank("message", message)?;
        self.store.insert_notification(user_id, message.trim()).await
    }

    pub async fn list_notifications(&self, user_id: i64) -> LedgerResult<Vec<Notification>> {
        self.store.list_notifications(user_id).await
    }

    pub async fn user_profile(&self, user_id: i64) -> LedgerResult<User> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or_else(|| LedgerError::not_found(format!("user {}", user_id)))
    }

    /// 更新头像地址，仅接受 http(s) 链接
    pub async fn update_profile_url(&self, user_id: i64, profile_url: &str) -> LedgerResult<User> {
        let profile_url = profile_url.trim();
        non_blank("profileUrl", profile_url)?;
        if !(profile_url.starts_with("http://") || profile_url.starts_with("https://")) {
            return Err(LedgerError::validation("profileUrl must be an http(s) URL"));
        }

        let user = self
            .store
            .update_profile_url(user_id, profile_url)
            .await?
            .ok_or_else(|| LedgerError::not_found(format!("user {}", user_id)))?;
        tracing::info!("Profile url updated: user {}", user_id);
        Ok(user)
    }
}

/// 将每日汇总写成 CSV
fn summaries_to_csv(summaries: &[DailySummary]) -> LedgerResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let csv_err = |e: csv::Error| LedgerError::Storage(format!("csv export failed: {}", e));

    writer
        .write_record([
            "date",
            "opening_stock",
            "total_stock",
            "damages",
            "net_cash",
            "closing_stock",
        ])
        .map_err(csv_err)?;

    for s in summaries {
        writer
            .write_record(&[
                s.business_date.format("%Y-%m-%d").to_string(),
                s.opening_stock.to_string(),
                s.total_stock.to_string(),
                s.damages.to_string(),
                s.net_cash.to_string(),
                s.closing_stock.to_string(),
            ])
            .map_err(csv_err)?;
    }

    writer
        .into_inner()
        .map_err(|e| LedgerError::Storage(format!("csv export failed: {}", e)))
}
