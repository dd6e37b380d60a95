use chrono::NaiveDate;
use tracing::info;

/// In-memory daily post budget. Resets itself the first time it is consulted
/// on a new calendar day.
#[derive(Debug, Clone)]
pub struct DailyQuota {
    max: u32,
    posts_today: u32,
    last_reset: NaiveDate,
}

impl DailyQuota {
    pub fn new(max: u32, today: NaiveDate) -> Self {
        DailyQuota {
            max,
            posts_today: 0,
            last_reset: today,
        }
    }

    /// Resets the counter when the date has changed. Returns true on reset.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if today == self.last_reset {
            return false;
        }
        info!(
            "New day {}: resetting daily post counter (was {})",
            today, self.posts_today
        );
        self.posts_today = 0;
        self.last_reset = today;
        true
    }

    pub fn exhausted(&self) -> bool {
        self.posts_today >= self.max
    }

    pub fn record_post(&mut self) {
        self.posts_today += 1;
    }

    pub fn posts_today(&self) -> u32 {
        self.posts_today
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn quota_exhausts_at_the_limit() {
        let mut quota = DailyQuota::new(2, date("2026-08-23"));
        assert!(!quota.exhausted());
        quota.record_post();
        assert!(!quota.exhausted());
        quota.record_post();
        assert!(quota.exhausted());
    }

    #[test]
    fn roll_over_resets_exactly_once_per_date_change() {
        let mut quota = DailyQuota::new(1, date("2026-08-23"));
        quota.record_post();
        assert!(quota.exhausted());

        assert!(!quota.roll_over(date("2026-08-23")));
        assert!(quota.exhausted());

        assert!(quota.roll_over(date("2026-08-24")));
        assert!(!quota.exhausted());
        assert_eq!(quota.posts_today(), 0);

        assert!(!quota.roll_over(date("2026-08-24")));
    }

    #[test]
    fn zero_quota_is_always_exhausted() {
        let quota = DailyQuota::new(0, date("2026-08-23"));
        assert!(quota.exhausted());
    }
}
