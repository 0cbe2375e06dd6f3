use std::time::Duration;

#[derive(Debug)]
pub struct Backoff {
    runs: u32,
    backoff_ms: u64,
}

impl Backoff {
    pub fn new() -> Self {
        Self {
            runs: 1,
            backoff_ms: 1,
        }
    }

    pub fn step(&mut self) -> Duration {
        let delay = Duration::from_millis(self.backoff_ms);

        self.backoff_ms += (fastrand::f64() * f64::from(1u32 << self.runs)) as u64;
        if self.backoff_ms > 1024 {
            self.backoff_ms %= 64;
            if self.backoff_ms == 0 {
                self.backoff_ms = 1;
            }
            self.runs = 1;
        } else if self.runs < 10 {
            self.runs += 1;
        }

        delay
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::Backoff;

    #[test]
    fn delays_stay_within_bounds() {
        let mut backoff = Backoff::new();
        for _ in 0..10_000 {
            let delay = backoff.step().as_millis();
            assert!((1..=1024).contains(&delay), "delay out of range: {delay}ms");
        }
    }

    #[test]
    fn schedule_collapses_after_the_cap() {
        let mut backoff = Backoff::new();
        let mut previous = backoff.step().as_millis();
        for _ in 0..10_000 {
            let delay = backoff.step().as_millis();
            if delay < previous && delay < 64 {
                return;
            }
            previous = delay;
        }
        panic!("backoff never collapsed back below 64ms");
    }
}
