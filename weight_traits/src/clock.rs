use chrono::{DateTime, FixedOffset, Local, NaiveDate};

/// Wall-clock abstraction used by the store and the report engines.
///
/// - now(): current instant, carrying the local UTC offset
/// - today(): local calendar date of `now()`
pub trait Clock {
    fn now(&self) -> DateTime<FixedOffset>;

    /// Calendar date of `now()` in its own offset.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Default clock backed by the system time and local offset.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<FixedOffset> {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> DateTime<FixedOffset> {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn today_matches_now_date() {
        let c = SystemClock::new();
        let now = c.now();
        let today = c.today();
        // A midnight rollover between the two calls is the only way these differ.
        assert!(today == now.date_naive() || today == now.date_naive().succ_opt().unwrap());
    }

    #[test]
    fn reference_clock_delegates() {
        let c = SystemClock;
        let r = &c;
        assert!(r.now() <= c.now());
    }
}
