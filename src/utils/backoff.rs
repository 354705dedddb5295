use std::time::Duration;

/// Exponential backoff state for the polling loop.
#[derive(Debug, Clone)]
pub struct Backoff {
    factor: u32,
    max: Duration,
    initial: Duration,
    value: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, factor: u32, max: Duration) -> Self {
        Self {
            factor,
            max,
            initial,
            value: initial,
        }
    }

    /// Obtain the current delay and precompute the next one.
    pub fn advance(&mut self) -> Duration {
        let current = self.value;
        self.value = current.saturating_mul(self.factor).min(self.max);
        current
    }

    pub fn reset(&mut self) {
        self.value = self.initial;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doubles_until_capped() {
        let mut backoff = Backoff::new(Duration::from_secs(1), 2, Duration::from_secs(4));
        assert_eq!(backoff.advance(), Duration::from_secs(1));
        assert_eq!(backoff.advance(), Duration::from_secs(2));
        assert_eq!(backoff.advance(), Duration::from_secs(4));
        assert_eq!(backoff.advance(), Duration::from_secs(4));
    }

    #[test]
    fn test_reset_returns_to_initial() {
        let mut backoff = Backoff::new(Duration::from_secs(1), 2, Duration::from_secs(30));
        backoff.advance();
        backoff.advance();
        backoff.reset();
        assert_eq!(backoff.advance(), Duration::from_secs(1));
    }
}
