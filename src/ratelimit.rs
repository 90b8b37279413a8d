use std::collections::HashMap;
use std::net::IpAddr;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window request counter keyed by client address. Initialized once at
/// startup; a limit of 0 disables limiting.
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    hits: Mutex<HashMap<IpAddr, Window>>,
}

impl RateLimiter {
    pub fn new(limit_per_minute: u32) -> Self {
        Self::with_window(limit_per_minute, Duration::from_secs(60))
    }

    fn with_window(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            hits: Mutex::new(HashMap::new()),
        }
    }

    /// Records one hit for `addr`; false means the budget is spent.
    pub fn check(&self, addr: IpAddr) -> bool {
        if self.limit == 0 {
            return true;
        }
        let now = Instant::now();
        let mut hits = self.hits.lock();
        let window = hits.entry(addr).or_insert(Window { started: now, count: 0 });
        if now.duration_since(window.started) >= self.window {
            window.started = now;
            window.count = 0;
        }
        if window.count >= self.limit {
            return false;
        }
        window.count += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(127, 0, 0, last))
    }

    #[test]
    fn budget_is_enforced() {
        let limiter = RateLimiter::new(2);
        assert!(limiter.check(ip(1)));
        assert!(limiter.check(ip(1)));
        assert!(!limiter.check(ip(1)));
    }

    #[test]
    fn clients_are_counted_separately() {
        let limiter = RateLimiter::new(1);
        assert!(limiter.check(ip(1)));
        assert!(limiter.check(ip(2)));
        assert!(!limiter.check(ip(1)));
        assert!(!limiter.check(ip(2)));
    }

    #[test]
    fn window_expiry_resets_the_count() {
        let limiter = RateLimiter::with_window(1, Duration::from_millis(30));
        assert!(limiter.check(ip(1)));
        assert!(!limiter.check(ip(1)));
        std::thread::sleep(Duration::from_millis(40));
        assert!(limiter.check(ip(1)));
    }

    #[test]
    fn zero_limit_disables_limiting() {
        let limiter = RateLimiter::new(0);
        for _ in 0..100 {
            assert!(limiter.check(ip(1)));
        }
    }
}
