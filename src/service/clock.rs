use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

/// 营业日历: 按固定时区偏移把当前时间换算成营业日期
#[derive(Debug, Clone, Copy)]
pub struct BusinessClock {
    offset: FixedOffset,
}

impl BusinessClock {
    /// 偏移超出 ±24h 时退回 UTC
    pub fn new(utc_offset_minutes: i32) -> Self {
        let offset = FixedOffset::east_opt(utc_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| {
                tracing::warn!(
                    "Invalid business utc offset {} minutes, falling back to UTC",
                    utc_offset_minutes
                );
                Utc.fix()
            });
        Self { offset }
    }

    pub fn today(&self) -> NaiveDate {
        self.date_at(Utc::now())
    }

    pub fn date_at(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }

    /// 请求里显式给出的日期优先，否则取今天
    pub fn resolve(&self, requested: Option<NaiveDate>) -> NaiveDate {
        requested.unwrap_or_else(|| self.today())
    }
}

impl Default for BusinessClock {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn offset_moves_date_across_midnight() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 23, 30, 0).unwrap();
        assert_eq!(
            BusinessClock::new(0).date_at(at),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        assert_eq!(
            BusinessClock::new(120).date_at(at),
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()
        );
        assert_eq!(
            BusinessClock::new(-60).date_at(Utc.with_ymd_and_hms(2024, 3, 2, 0, 30, 0).unwrap()),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
    }

    #[test]
    fn explicit_date_wins() {
        let d = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        assert_eq!(BusinessClock::default().resolve(Some(d)), d);
    }

    #[test]
    fn out_of_range_offset_falls_back_to_utc() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 23, 30, 0).unwrap();
        assert_eq!(
            BusinessClock::new(100_000).date_at(at),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
    }
}
