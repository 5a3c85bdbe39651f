use super::curve::AnimationCurve;
use super::timestamp::Timestamp;

#[derive(Clone, Debug)]
pub struct Animation<Instant> {
    /// When the animation begins
    pub start: Instant,
    /// Length in seconds. Zero means the end state applies immediately.
    pub duration: f64,
    pub curve: AnimationCurve,
}

impl<Instant> Animation<Instant>
where
    Instant: Timestamp,
{
    pub fn new(start: Instant, duration: f64, curve: AnimationCurve) -> Animation<Instant> {
        Animation {
            start,
            duration: if duration > 0.0 { duration } else { 0.0 },
            curve,
        }
    }

    /// Linear progress through the animation, 0.0 - 1.0
    pub fn progress(&self, now: &Instant) -> f64 {
        if self.duration == 0.0 {
            return 1.0;
        }
        let p = now.seconds_since(&self.start) / self.duration;
        if p.is_nan() {
            0.0
        } else {
            p.clamp(0.0, 1.0)
        }
    }

    /// Eased value at `now`, 0.0 - 1.0
    pub fn value(&self, now: &Instant) -> f64 {
        if self.duration == 0.0 {
            return 1.0;
        }
        let v = self.curve.apply(self.progress(now));
        if v.is_nan() {
            0.0
        } else {
            v.clamp(0.0, 1.0)
        }
    }

    pub fn is_complete(&self, now: &Instant) -> bool {
        self.progress(now) >= 1.0
    }
}

#[cfg(test)]
mod test {
    use super::{Animation, AnimationCurve};
    use std::time::{Duration, Instant};

    #[test]
    fn linear_math() {
        let time = Instant::now();
        let animation = Animation::new(time, 1.0, AnimationCurve::Linear);
        assert_eq!(animation.value(&time), 0.0);
        assert_eq!(animation.value(&(time + Duration::from_millis(500))), 0.5);
        assert_eq!(animation.value(&(time + Duration::from_secs(1))), 1.0);
        assert!(animation.is_complete(&(time + Duration::from_secs(1))));
        assert!(!animation.is_complete(&(time + Duration::from_millis(999))));
    }

    #[test]
    fn zero_duration() {
        let animation = Animation::new(10.0, 0.0, AnimationCurve::EaseIn);
        assert_eq!(animation.value(&0.0), 1.0);
        assert_eq!(animation.value(&10.0), 1.0);
        assert_eq!(animation.value(&1000.0), 1.0);
        assert!(animation.is_complete(&0.0));
    }

    #[test]
    fn clamped_outside_range() {
        let animation = Animation::new(5.0, 2.0, AnimationCurve::Linear);
        assert_eq!(animation.value(&4.0), 0.0);
        assert_eq!(animation.value(&9.0), 1.0);
        let negative = Animation::new(0.0, -3.0, AnimationCurve::Linear);
        assert_eq!(negative.duration, 0.0);
    }

    #[test]
    fn custom_curve_is_clamped() {
        let animation = Animation::new(0.0, 1.0, AnimationCurve::custom(|x| x * 3.0 - 1.0));
        assert_eq!(animation.value(&0.0), 0.0);
        assert_eq!(animation.value(&0.5), 0.5);
        assert_eq!(animation.value(&1.0), 1.0);
        let broken = Animation::new(0.0, 1.0, AnimationCurve::custom(|_| f64::NAN));
        assert_eq!(broken.value(&0.5), 0.0);
    }
}
