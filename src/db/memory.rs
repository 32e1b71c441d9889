use super::store::LedgerStore;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    DailySummary, DamageEntry, NewDamage, NewRevenue, NewStock, NewUser, Notification,
    RevenueEntry, StockEntry, User,
};
use async_trait::async_trait;
use bigdecimal::{BigDecimal, Zero};
use chrono::{NaiveDate, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};

type DayKey = (i64, NaiveDate);

/// 内存存储，用于测试和本地调试 (`database.url = "memory"`)
///
/// 与 Postgres 实现保持同样的约束: 用户名唯一、流水引用的用户必须存在、
/// 汇总按 (user_id, business_date) 唯一。
#[derive(Default)]
pub struct MemoryLedgerStore {
    seq: AtomicI64,
    users: DashMap<i64, User>,
    usernames: DashMap<String, i64>,
    revenue: DashMap<DayKey, Vec<RevenueEntry>>,
    stock: DashMap<DayKey, Vec<StockEntry>>,
    damages: DashMap<DayKey, Vec<DamageEntry>>,
    summaries: DashMap<DayKey, DailySummary>,
    notifications: DashMap<i64, Vec<Notification>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> i64 {
        self.seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// 模拟外键约束
    fn ensure_user(&self, user_id: i64) -> LedgerResult<()> {
        if self.users.contains_key(&user_id) {
            Ok(())
        } else {
            Err(LedgerError::Storage(format!(
                "foreign key violation: user {} does not exist",
                user_id
            )))
        }
    }

    /// 已写入的汇总行数 (测试用)
    pub fn summary_count(&self) -> usize {
        self.summaries.len()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn create_user(&self, user: NewUser) -> LedgerResult<User> {
        match self.usernames.entry(user.username.clone()) {
            Entry::Occupied(_) => Err(LedgerError::Conflict(format!(
                "username '{}' is already taken",
                user.username
            ))),
            Entry::Vacant(slot) => {
                let created = User {
                    user_id: self.next_id(),
                    name: user.name,
                    surname: user.surname,
                    username: user.username,
                    password_hash: user.password_hash,
                    profile_url: None,
                    created_at: Utc::now(),
                };
                slot.insert(created.user_id);
                self.users.insert(created.user_id, created.clone());
                Ok(created)
            }
        }
    }

    async fn find_user_by_username(&self, username: &str) -> LedgerResult<Option<User>> {
        let Some(id) = self.usernames.get(username).map(|r| *r) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn get_user(&self, user_id: i64) -> LedgerResult<Option<User>> {
        Ok(self.users.get(&user_id).map(|u| u.clone()))
    }

    async fn update_profile_url(
        &self,
        user_id: i64,
        profile_url: &str,
    ) -> LedgerResult<Option<User>> {
        Ok(self.users.get_mut(&user_id).map(|mut u| {
            u.profile_url = Some(profile_url.to_string());
            u.clone()
        }))
    }

    async fn insert_revenue(&self, entry: NewRevenue) -> LedgerResult<RevenueEntry> {
        self.ensure_user(entry.user_id)?;
        let row = RevenueEntry {
            id: self.next_id(),
            user_id: entry.user_id,
            till: entry.till,
            expenditure: entry.expenditure,
            net_cash: entry.net_cash,
            business_date: entry.business_date,
            created_at: Utc::now(),
        };
        self.revenue
            .entry((row.user_id, row.business_date))
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn insert_stock(&self, entry: NewStock) -> LedgerResult<StockEntry> {
        self.ensure_user(entry.user_id)?;
        let row = StockEntry {
            id: self.next_id(),
            user_id: entry.user_id,
            category: entry.category,
            total_stock: entry.total_stock,
            business_date: entry.business_date,
            created_at: Utc::now(),
        };
        self.stock
            .entry((row.user_id, row.business_date))
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn insert_damage(&self, entry: NewDamage) -> LedgerResult<DamageEntry> {
        self.ensure_user(entry.user_id)?;
        let row = DamageEntry {
            id: self.next_id(),
            user_id: entry.user_id,
            total_damages: entry.total_damages,
            business_date: entry.business_date,
            created_at: Utc::now(),
        };
        self.damages
            .entry((row.user_id, row.business_date))
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn closing_stock(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> LedgerResult<Option<BigDecimal>> {
        Ok(self
            .summaries
            .get(&(user_id, date))
            .map(|s| s.closing_stock.clone()))
    }

    async fn sum_stock_entries(&self, user_id: i64, date: NaiveDate) -> LedgerResult<BigDecimal> {
        Ok(self
            .stock
            .get(&(user_id, date))
            .map(|rows| rows.iter().map(|r| &r.total_stock).sum())
            .unwrap_or_else(BigDecimal::zero))
    }

    async fn sum_damage_entries(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> LedgerResult<BigDecimal> {
        Ok(self
            .damages
            .get(&(user_id, date))
            .map(|rows| rows.iter().map(|r| &r.total_damages).sum())
            .unwrap_or_else(BigDecimal::zero))
    }

    async fn insert_summary_if_absent(
        &self,
        summary: &DailySummary,
    ) -> LedgerResult<Option<DailySummary>> {
        self.ensure_user(summary.user_id)?;
        // entry 持有分片写锁，检查与插入是原子的
        match self.summaries.entry((summary.user_id, summary.business_date)) {
            Entry::Occupied(_) => Ok(None),
            Entry::Vacant(slot) => {
                slot.insert(summary.clone());
                Ok(Some(summary.clone()))
            }
        }
    }

    async fn upsert_summary(&self, summary: &DailySummary) -> LedgerResult<DailySummary> {
        self.ensure_user(summary.user_id)?;
        self.summaries
            .insert((summary.user_id, summary.business_date), summary.clone());
        Ok(summary.clone())
    }

    async fn get_summary(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> LedgerResult<Option<DailySummary>> {
        Ok(self.summaries.get(&(user_id, date)).map(|s| s.clone()))
    }

    async fn list_summaries(&self, user_id: i64) -> LedgerResult<Vec<DailySummary>> {
        let mut rows: Vec<DailySummary> = self
            .summaries
            .iter()
            .filter(|s| s.user_id == user_id)
            .map(|s| s.value().clone())
            .collect();
        rows.sort_by(|a, b| b.business_date.cmp(&a.business_date));
        Ok(rows)
    }

    async fn insert_notification(
        &self,
        user_id: i64,
        message: &str,
    ) -> LedgerResult<Notification> {
        self.ensure_user(user_id)?;
        let row = Notification {
            id: self.next_id(),
            user_id,
            message: message.to_string(),
            created_at: Utc::now(),
        };
        self.notifications
            .entry(user_id)
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn list_notifications(&self, user_id: i64) -> LedgerResult<Vec<Notification>> {
        let mut rows = self
            .notifications
            .get(&user_id)
            .map(|r| r.clone())
            .unwrap_or_default();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed_user(store: &MemoryLedgerStore, username: &str) -> User {
        store
            .create_user(NewUser {
                name: "Thandi".into(),
                surname: "Dlamini".into(),
                username: username.into(),
                password_hash: "x".into(),
            })
            .await
            .unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict() {
        let store = MemoryLedgerStore::new();
        seed_user(&store, "thandi").await;
        let err = store
            .create_user(NewUser {
                name: "Other".into(),
                surname: "Person".into(),
                username: "thandi".into(),
                password_hash: "y".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Conflict(_)));
    }

    #[tokio::test]
    async fn summary_insert_is_first_write_wins() {
        let store = MemoryLedgerStore::new();
        let user = seed_user(&store, "thandi").await;
        let zero = BigDecimal::zero();
        let first = DailySummary::roll_forward(
            user.user_id,
            day(1),
            zero.clone(),
            BigDecimal::from(100),
            zero.clone(),
            BigDecimal::from(30),
        );
        let second = DailySummary::roll_forward(
            user.user_id,
            day(1),
            zero.clone(),
            zero.clone(),
            zero.clone(),
            BigDecimal::from(5),
        );

        assert_eq!(
            store.insert_summary_if_absent(&first).await.unwrap(),
            Some(first.clone())
        );
        assert_eq!(store.insert_summary_if_absent(&second).await.unwrap(), None);
        assert_eq!(store.summary_count(), 1);
        assert_eq!(
            store.closing_stock(user.user_id, day(1)).await.unwrap(),
            Some(BigDecimal::from(70))
        );
    }

    #[tokio::test]
    async fn sums_are_scoped_to_user_and_day() {
        let store = MemoryLedgerStore::new();
        let a = seed_user(&store, "a").await;
        let b = seed_user(&store, "b").await;
        let rows = [
            (a.user_id, day(1), 10),
            (a.user_id, day(1), 15),
            (a.user_id, day(2), 99),
            (b.user_id, day(1), 7),
        ];
        for (user_id, date, amount) in rows {
            store
                .insert_stock(NewStock {
                    user_id,
                    category: "beer".into(),
                    total_stock: BigDecimal::from(amount),
                    business_date: date,
                })
                .await
                .unwrap();
        }

        assert_eq!(
            store.sum_stock_entries(a.user_id, day(1)).await.unwrap(),
            BigDecimal::from(25)
        );
        assert_eq!(
            store.sum_damage_entries(a.user_id, day(1)).await.unwrap(),
            BigDecimal::zero()
        );
    }

    #[tokio::test]
    async fn entries_for_unknown_user_are_rejected() {
        let store = MemoryLedgerStore::new();
        let err = store
            .insert_damage(NewDamage {
                user_id: 42,
                total_damages: BigDecimal::from(1),
                business_date: day(1),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Storage(_)));
    }

    #[tokio::test]
    async fn profile_url_update_is_visible_to_lookups() {
        let store = MemoryLedgerStore::new();
        let user = seed_user(&store, "thandi").await;

        let updated = store
            .update_profile_url(user.user_id, "https://cdn.example/thandi.png")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            updated.profile_url.as_deref(),
            Some("https://cdn.example/thandi.png")
        );

        let found = store.find_user_by_username("thandi").await.unwrap().unwrap();
        assert_eq!(found.profile_url, updated.profile_url);
        assert!(store
            .update_profile_url(9999, "https://cdn.example/x.png")
            .await
            .unwrap()
            .is_none());
    }
}
