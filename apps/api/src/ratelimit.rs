//! Per-IP daily rate limiting for job creation.
//!
//! A process-wide counter keyed by (IP, UTC date). Counting and the quota
//! check happen under the map's per-key entry lock, so concurrent uploads
//! from one IP cannot slip past the quota. Counters for past days are
//! pruned whenever the day rolls over. Already-created jobs are never
//! affected by the limit.

use std::net::IpAddr;

use chrono::{NaiveDate, Utc};
use dashmap::DashMap;

use crate::errors::AppError;

pub struct RateLimiter {
    /// `None` disables limiting (dev mode).
    quota: Option<u32>,
    counters: DashMap<(IpAddr, NaiveDate), u32>,
}

impl RateLimiter {
    pub fn new(quota: Option<u32>) -> Self {
        Self {
            quota,
            counters: DashMap::new(),
        }
    }

    /// Counts one job-creation attempt for `ip` today. Rejects with
    /// `RateLimited` once the daily quota is exhausted.
    pub fn check_and_increment(&self, ip: IpAddr) -> Result<(), AppError> {
        self.check_on(ip, Utc::now().date_naive())
    }

    fn check_on(&self, ip: IpAddr, day: NaiveDate) -> Result<(), AppError> {
        let Some(quota) = self.quota else {
            return Ok(());
        };

        {
            let mut count = self.counters.entry((ip, day)).or_insert(0);
            if *count >= quota {
                return Err(AppError::RateLimited(quota));
            }
            *count += 1;
        }

        // opportunistic cleanup of yesterday's counters
        self.counters.retain(|(_, d), _| *d == day);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(last: u8) -> IpAddr {
        IpAddr::from([127, 0, 0, last])
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, d).unwrap()
    }

    #[test]
    fn test_fifth_accepted_sixth_rejected() {
        let limiter = RateLimiter::new(Some(5));
        for _ in 0..5 {
            limiter.check_on(ip(1), day(7)).unwrap();
        }
        let err = limiter.check_on(ip(1), day(7)).unwrap_err();
        assert!(matches!(err, AppError::RateLimited(5)));
    }

    #[test]
    fn test_unlimited_in_dev() {
        let limiter = RateLimiter::new(None);
        for _ in 0..100 {
            limiter.check_on(ip(1), day(7)).unwrap();
        }
    }

    #[test]
    fn test_quota_is_per_ip() {
        let limiter = RateLimiter::new(Some(1));
        limiter.check_on(ip(1), day(7)).unwrap();
        limiter.check_on(ip(2), day(7)).unwrap();
        assert!(limiter.check_on(ip(1), day(7)).is_err());
    }

    #[test]
    fn test_quota_resets_on_day_boundary() {
        let limiter = RateLimiter::new(Some(1));
        limiter.check_on(ip(1), day(7)).unwrap();
        assert!(limiter.check_on(ip(1), day(7)).is_err());
        limiter.check_on(ip(1), day(8)).unwrap();
    }

    #[test]
    fn test_stale_day_counters_are_pruned() {
        let limiter = RateLimiter::new(Some(5));
        limiter.check_on(ip(1), day(7)).unwrap();
        limiter.check_on(ip(1), day(8)).unwrap();
        assert_eq!(limiter.counters.len(), 1);
    }
}
