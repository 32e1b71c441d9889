use crate::db::LedgerStore;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{checked_amount, DailySummary};
use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDate;
use std::sync::Arc;

/// 汇总写入结果
#[derive(Debug, Clone, PartialEq)]
pub enum SummaryOutcome {
    /// 本次调用写入了新汇总
    Created(DailySummary),
    /// 当日汇总已存在，本次计算被丢弃；返回库中已有的行
    AlreadyRecorded(DailySummary),
}

impl SummaryOutcome {
    pub fn summary(&self) -> &DailySummary {
        match self {
            Self::Created(s) | Self::AlreadyRecorded(s) => s,
        }
    }

    pub fn into_summary(self) -> DailySummary {
        match self {
            Self::Created(s) | Self::AlreadyRecorded(s) => s,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// 每日库存结转服务
///
/// `closing = opening + total_stock - net_cash - damages`，其中 opening 取前一营业日的
/// closing (没有则为 0)，total_stock / damages 为当日流水合计。
pub struct SummaryService {
    store: Arc<dyn LedgerStore>,
}

impl SummaryService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// 计算并写入当日汇总 (每个用户每天只写一次)
    ///
    /// 重复调用是成功的空操作: 已存在的汇总不会被覆盖，返回 `AlreadyRecorded` 和库中的值。
    /// 唯一性由存储层保证，这里不加锁。
    pub async fn compute_and_store_summary(
        &self,
        user_id: i64,
        business_date: NaiveDate,
        net_cash: BigDecimal,
    ) -> LedgerResult<SummaryOutcome> {
        let summary = self.compute(user_id, business_date, net_cash).await?;

        if let Some(stored) = self.store.insert_summary_if_absent(&summary).await? {
            tracing::info!(
                "Daily summary stored: user {} date {} closing {}",
                user_id, business_date, stored.closing_stock
            );
            return Ok(SummaryOutcome::Created(stored));
        }

        tracing::info!(
            "Daily summary for user {} date {} already exists, skipping (computed closing {})",
            user_id, business_date, summary.closing_stock
        );
        let existing = self
            .store
            .get_summary(user_id, business_date)
            .await?
            .ok_or_else(|| {
                LedgerError::Storage(format!(
                    "summary for user {} on {} was reported as existing but could not be read",
                    user_id, business_date
                ))
            })?;
        Ok(SummaryOutcome::AlreadyRecorded(existing))
    }

    /// 重新计算并覆盖当日汇总
    ///
    /// 只覆盖这一天；后续日期已写入的 opening 不会级联更新。
    pub async fn recompute_summary(
        &self,
        user_id: i64,
        business_date: NaiveDate,
        net_cash: BigDecimal,
    ) -> LedgerResult<DailySummary> {
        let summary = self.compute(user_id, business_date, net_cash).await?;
        let stored = self.store.upsert_summary(&summary).await?;
        tracing::info!(
            "Daily summary recomputed: user {} date {} closing {}",
            user_id, business_date, stored.closing_stock
        );
        Ok(stored)
    }

    async fn compute(
        &self,
        user_id: i64,
        business_date: NaiveDate,
        net_cash: BigDecimal,
    ) -> LedgerResult<DailySummary> {
        if user_id <= 0 {
            return Err(LedgerError::validation(format!("invalid userId {}", user_id)));
        }
        let net_cash = checked_amount("netCash", &net_cash)?;
        let previous_day = business_date.pred_opt().ok_or_else(|| {
            LedgerError::validation(format!("date {} has no previous day", business_date))
        })?;

        // 三个聚合互不依赖，并发查询
        let (opening, total_stock, damages) = futures::try_join!(
            self.store.closing_stock(user_id, previous_day),
            self.store.sum_stock_entries(user_id, business_date),
            self.store.sum_damage_entries(user_id, business_date),
        )?;
        let opening = opening.unwrap_or_else(BigDecimal::zero);

        let summary = DailySummary::roll_forward(
            user_id,
            business_date,
            opening,
            total_stock,
            damages,
            net_cash,
        );
        // 结果同样要能放进 NUMERIC(14, 2)
        checked_amount("closingStock", &summary.closing_stock)?;

        tracing::debug!(
            "Summary computed: user {} date {} opening {} stock {} net_cash {} damages {} closing {}",
            user_id,
            business_date,
            summary.opening_stock,
            summary.total_stock,
            summary.net_cash,
            summary.damages,
            summary.closing_stock
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryLedgerStore;
    use crate::models::{NewDamage, NewStock, NewUser};

    fn d(v: i64) -> BigDecimal {
        BigDecimal::from(v)
    }

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, n).unwrap()
    }

    async fn setup() -> (Arc<MemoryLedgerStore>, SummaryService, i64) {
        let store = Arc::new(MemoryLedgerStore::new());
        let user = store
            .create_user(NewUser {
                name: "Sipho".into(),
                surname: "Nkosi".into(),
                username: "sipho".into(),
                password_hash: "hash".into(),
            })
            .await
            .unwrap();
        let service = SummaryService::new(store.clone());
        (store, service, user.user_id)
    }

    async fn add_stock(store: &MemoryLedgerStore, user_id: i64, date: NaiveDate, amount: i64) {
        store
            .insert_stock(NewStock {
                user_id,
                category: "spirits".into(),
                total_stock: d(amount),
                business_date: date,
            })
            .await
            .unwrap();
    }

    async fn add_damage(store: &MemoryLedgerStore, user_id: i64, date: NaiveDate, amount: i64) {
        store
            .insert_damage(NewDamage {
                user_id,
                total_damages: d(amount),
                business_date: date,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn first_day_starts_from_zero() {
        let (store, service, user) = setup().await;
        add_stock(&store, user, day(1), 60).await;
        add_stock(&store, user, day(1), 40).await;
        add_damage(&store, user, day(1), 10).await;

        let outcome = service
            .compute_and_store_summary(user, day(1), d(50))
            .await
            .unwrap();

        assert!(outcome.is_created());
        let s = outcome.summary();
        assert_eq!(s.opening_stock, d(0));
        assert_eq!(s.total_stock, d(100));
        assert_eq!(s.damages, d(10));
        assert_eq!(s.net_cash, d(50));
        assert_eq!(s.closing_stock, d(40));
    }

    #[tokio::test]
    async fn opening_rolls_forward_from_previous_day() {
        let (store, service, user) = setup().await;
        add_stock(&store, user, day(1), 100).await;
        add_damage(&store, user, day(1), 10).await;
        service
            .compute_and_store_summary(user, day(1), d(50))
            .await
            .unwrap();

        let s = service
            .compute_and_store_summary(user, day(2), d(20))
            .await
            .unwrap()
            .into_summary();

        assert_eq!(s.opening_stock, d(40));
        assert_eq!(s.closing_stock, d(20));
    }

    #[tokio::test]
    async fn gap_day_means_zero_opening() {
        let (store, service, user) = setup().await;
        add_stock(&store, user, day(1), 100).await;
        service
            .compute_and_store_summary(user, day(1), d(0))
            .await
            .unwrap();

        // day 2 没有汇总，day 3 从 0 开始
        let s = service
            .compute_and_store_summary(user, day(3), d(5))
            .await
            .unwrap()
            .into_summary();
        assert_eq!(s.opening_stock, d(0));
        assert_eq!(s.closing_stock, d(-5));
    }

    #[tokio::test]
    async fn second_call_keeps_first_write() {
        let (store, service, user) = setup().await;
        add_stock(&store, user, day(1), 100).await;

        let first = service
            .compute_and_store_summary(user, day(1), d(30))
            .await
            .unwrap();
        let second = service
            .compute_and_store_summary(user, day(1), d(99))
            .await
            .unwrap();

        assert!(first.is_created());
        assert!(!second.is_created());
        assert_eq!(second.summary(), first.summary());
        assert_eq!(second.summary().net_cash, d(30));
        assert_eq!(store.summary_count(), 1);
    }

    #[tokio::test]
    async fn identical_calls_store_one_row() {
        let (store, service, user) = setup().await;
        service
            .compute_and_store_summary(user, day(5), d(10))
            .await
            .unwrap();
        service
            .compute_and_store_summary(user, day(5), d(10))
            .await
            .unwrap();
        assert_eq!(store.list_summaries(user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_first_writes_yield_one_row() {
        let (store, service, user) = setup().await;
        let service = Arc::new(service);

        let mut handles = Vec::new();
        for cash in 0..8 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service.compute_and_store_summary(user, day(7), d(cash)).await
            }));
        }

        let mut created = 0;
        let mut stored = Vec::new();
        for h in handles {
            let outcome = h.await.unwrap().unwrap();
            if outcome.is_created() {
                created += 1;
            }
            stored.push(outcome.into_summary());
        }

        assert_eq!(created, 1);
        assert_eq!(store.summary_count(), 1);
        let canonical = store.get_summary(user, day(7)).await.unwrap().unwrap();
        assert!(stored.iter().all(|s| *s == canonical));
    }

    #[tokio::test]
    async fn recompute_overwrites_existing_row() {
        let (store, service, user) = setup().await;
        service
            .compute_and_store_summary(user, day(1), d(30))
            .await
            .unwrap();
        add_stock(&store, user, day(1), 200).await;

        let s = service.recompute_summary(user, day(1), d(50)).await.unwrap();
        assert_eq!(s.closing_stock, d(150));
        assert_eq!(
            store.closing_stock(user, day(1)).await.unwrap(),
            Some(d(150))
        );
        assert_eq!(store.summary_count(), 1);
    }

    #[tokio::test]
    async fn ledger_entries_are_untouched() {
        let (store, service, user) = setup().await;
        add_stock(&store, user, day(1), 100).await;
        add_damage(&store, user, day(1), 3).await;
        service
            .compute_and_store_summary(user, day(1), d(1))
            .await
            .unwrap();
        assert_eq!(store.sum_stock_entries(user, day(1)).await.unwrap(), d(100));
        assert_eq!(store.sum_damage_entries(user, day(1)).await.unwrap(), d(3));
    }

    #[tokio::test]
    async fn unknown_user_is_a_storage_error() {
        let (store, service, _user) = setup().await;
        let err = service
            .compute_and_store_summary(999, day(1), d(1))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Storage(_)));
        assert_eq!(store.summary_count(), 0);
    }

    #[tokio::test]
    async fn non_positive_user_id_is_rejected() {
        let (store, service, _user) = setup().await;
        let err = service
            .compute_and_store_summary(0, day(1), d(1))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert_eq!(store.summary_count(), 0);
    }

    #[tokio::test]
    async fn net_cash_with_three_decimals_is_rejected() {
        let (store, service, user) = setup().await;
        let net_cash: BigDecimal = "0.005".parse().unwrap();
        let err = service
            .compute_and_store_summary(user, day(1), net_cash)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert_eq!(store.summary_count(), 0);
    }

    #[tokio::test]
    async fn closing_beyond_column_range_is_rejected() {
        let (store, service, user) = setup().await;
        let net_cash: BigDecimal = "999999999999.99".parse().unwrap();
        service
            .compute_and_store_summary(user, day(1), net_cash.clone())
            .await
            .unwrap();

        // day 1 closing 为 -999999999999.99，再减同样金额超出 10^12
        let err = service
            .compute_and_store_summary(user, day(2), net_cash)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert_eq!(store.summary_count(), 1);
    }

    #[tokio::test]
    async fn created_summary_is_normalised_to_two_decimals() {
        let (_store, service, user) = setup().await;
        let net_cash: BigDecimal = "12.5".parse().unwrap();
        let s = service
            .compute_and_store_summary(user, day(1), net_cash)
            .await
            .unwrap()
            .into_summary();
        assert_eq!(s.net_cash.to_string(), "12.50");
    }
}
