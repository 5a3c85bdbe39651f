use std::fmt::Debug;

/// A point in time that animations can be measured against.
pub trait Timestamp: Copy + PartialOrd + Debug {
    /// Seconds from `earlier` to `self`. Negative if `earlier` is actually later.
    fn seconds_since(&self, earlier: &Self) -> f64;
}

impl Timestamp for std::time::Instant {
    fn seconds_since(&self, earlier: &Self) -> f64 {
        if self >= earlier {
            self.duration_since(*earlier).as_secs_f64()
        } else {
            -earlier.duration_since(*self).as_secs_f64()
        }
    }
}

impl Timestamp for tokio::time::Instant {
    fn seconds_since(&self, earlier: &Self) -> f64 {
        self.into_std().seconds_since(&earlier.into_std())
    }
}

/// Plain seconds, for externally clocked drivers and tests
impl Timestamp for f64 {
    fn seconds_since(&self, earlier: &Self) -> f64 {
        self - earlier
    }
}

#[cfg(test)]
mod test {
    use super::Timestamp;
    use std::time::{Duration, Instant};

    #[test]
    fn instant_difference() {
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_millis(1500);
        assert!((t1.seconds_since(&t0) - 1.5).abs() < 1e-9);
        assert!((t0.seconds_since(&t1) + 1.5).abs() < 1e-9);
    }
}
