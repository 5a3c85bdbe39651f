use std::error::Error;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub type CurveFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// Maps animation progress (0.0 - 1.0) to an eased value.
#[derive(Clone, Default)]
pub enum AnimationCurve {
    Linear,
    #[default]
    EaseIn,
    EaseOut,
    EaseInOut,
    /// Caller supplied. Should map 0.0 - 1.0 onto itself, which is not checked.
    Custom(CurveFn),
}

impl AnimationCurve {
    pub fn custom<F>(f: F) -> AnimationCurve
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        AnimationCurve::Custom(Arc::new(f))
    }

    pub fn apply(&self, x: f64) -> f64 {
        match self {
            AnimationCurve::Linear => x,
            AnimationCurve::EaseIn => x.powi(5),
            AnimationCurve::EaseOut => 1.0 - (1.0 - x).powi(5),
            AnimationCurve::EaseInOut => {
                if x < 0.5 {
                    16.0 * x.powi(5)
                } else {
                    1.0 - (-2.0 * x + 2.0).powi(5) / 2.0
                }
            }
            AnimationCurve::Custom(f) => f(x),
        }
    }
}

impl fmt::Debug for AnimationCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnimationCurve::Linear => write!(f, "Linear"),
            AnimationCurve::EaseIn => write!(f, "EaseIn"),
            AnimationCurve::EaseOut => write!(f, "EaseOut"),
            AnimationCurve::EaseInOut => write!(f, "EaseInOut"),
            AnimationCurve::Custom(_) => write!(f, "Custom"),
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct UnknownCurve(pub String);

impl Error for UnknownCurve {}

impl fmt::Display for UnknownCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown animation curve \"{}\"", self.0)
    }
}

impl FromStr for AnimationCurve {
    type Err = UnknownCurve;
    fn from_str(s: &str) -> Result<AnimationCurve, UnknownCurve> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "linear" => Ok(AnimationCurve::Linear),
            "easein" => Ok(AnimationCurve::EaseIn),
            "easeout" => Ok(AnimationCurve::EaseOut),
            "easeinout" => Ok(AnimationCurve::EaseInOut),
            _ => Err(UnknownCurve(s.to_string())),
        }
    }
}

#[cfg(test)]
mod test {
    use super::AnimationCurve;

    #[test]
    fn end_points() {
        for curve in [
            AnimationCurve::Linear,
            AnimationCurve::EaseIn,
            AnimationCurve::EaseOut,
            AnimationCurve::EaseInOut,
        ] {
            assert_eq!(curve.apply(0.0), 0.0, "{:?}", curve);
            assert_eq!(curve.apply(1.0), 1.0, "{:?}", curve);
        }
    }

    #[test]
    fn midpoints() {
        assert_eq!(AnimationCurve::Linear.apply(0.5), 0.5);
        assert_eq!(AnimationCurve::EaseIn.apply(0.5), 0.03125);
        assert_eq!(AnimationCurve::EaseOut.apply(0.5), 0.96875);
        assert_eq!(AnimationCurve::EaseInOut.apply(0.25), 16.0 * 0.25f64.powi(5));
        assert_eq!(AnimationCurve::EaseInOut.apply(0.5), 0.5);
        assert_eq!(AnimationCurve::EaseInOut.apply(0.75), 1.0 - 0.5f64.powi(5) / 2.0);
    }

    #[test]
    fn custom_curve() {
        let c = AnimationCurve::custom(|x| x * x);
        assert_eq!(c.apply(0.5), 0.25);
        assert_eq!(format!("{:?}", c), "Custom");
    }

    #[test]
    fn parse_names() {
        assert!(matches!("linear".parse::<AnimationCurve>(), Ok(AnimationCurve::Linear)));
        assert!(matches!("ease-out".parse::<AnimationCurve>(), Ok(AnimationCurve::EaseOut)));
        assert!(matches!("EaseInOut".parse::<AnimationCurve>(), Ok(AnimationCurve::EaseInOut)));
        assert!("bounce".parse::<AnimationCurve>().is_err());
    }
}
