use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    settled: T,
    pending: Option<(T, Instant)>,
}

impl<T: Clone + PartialEq> Debouncer<T> {
    pub fn new(delay: Duration, initial: T) -> Self {
        Self {
            delay,
            settled: initial,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    pub fn reset(&mut self, value: T) {
        self.settled = value;
        self.pending = None;
    }

    /// Settles the pending value when its deadline has passed. Returns the
    /// new settled value only when it differs from the previous one.
    pub fn poll(&mut self, now: Instant) -> Option<&T> {
        let due = matches!(&self.pending, Some((_, deadline)) if now >= *deadline);
        if !due {
            return None;
        }

        let (value, _) = self.pending.take()?;
        if value == self.settled {
            return None;
        }
        self.settled = value;
        Some(&self.settled)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn settled(&self) -> &T {
        &self.settled
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::Instant;

    use super::Debouncer;

    #[test]
    fn settles_only_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(300), String::new());

        debouncer.push("bud".to_string(), start);
        assert!(debouncer.poll(start + Duration::from_millis(299)).is_none());

        debouncer.push("budget".to_string(), start + Duration::from_millis(200));
        assert!(debouncer.poll(start + Duration::from_millis(350)).is_none());
        assert_eq!(
            debouncer.poll(start + Duration::from_millis(500)).map(String::as_str),
            Some("budget")
        );
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn unchanged_value_does_not_report_settlement() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(10), "a".to_string());
        debouncer.push("a".to_string(), start);
        assert!(debouncer.poll(start + Duration::from_millis(10)).is_none());
        assert!(!debouncer.is_pending());
    }
}
