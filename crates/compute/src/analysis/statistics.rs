use foundation::math::precision::stable_total_cmp_f64;
use serde::Serialize;

/// Count, mean and extremes over the finite values of a sample.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Descriptive statistics. Non-finite values (missing anomalies) are ignored
/// everywhere, so an all-missing sample behaves like an empty one.
pub struct Statistics;

impl Statistics {
    pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
        Self::summarize(values).map(|s| s.mean)
    }

    /// Largest absolute value; `None` when no finite value exists.
    pub fn max_abs(values: impl IntoIterator<Item = f64>) -> Option<f64> {
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .map(f64::abs)
            .max_by(|a, b| stable_total_cmp_f64(*a, *b))
    }

    pub fn summarize(values: impl IntoIterator<Item = f64>) -> Option<Summary> {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in values.into_iter().filter(|v| v.is_finite()) {
            count += 1;
            sum += v;
            min = min.min(v);
            max = max.max(v);
        }
        if count == 0 {
            return None;
        }
        Some(Summary {
            count,
            mean: sum / count as f64,
            min,
            max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Statistics;

    #[test]
    fn mean_works() {
        let m = Statistics::mean([1.0, 2.0, 3.0]).unwrap();
        assert!((m - 2.0).abs() < 1e-9);
    }

    #[test]
    fn missing_values_are_ignored() {
        let s = Statistics::summarize([1.0, f64::NAN, -3.0]).unwrap();
        assert_eq!(s.count, 2);
        assert!((s.mean + 1.0).abs() < 1e-12);
        assert_eq!((s.min, s.max), (-3.0, 1.0));
        assert!(Statistics::mean([f64::NAN]).is_none());
        assert!(Statistics::summarize(std::iter::empty()).is_none());
    }

    #[test]
    fn max_abs_uses_magnitude() {
        assert_eq!(Statistics::max_abs([0.5, -2.5, 1.0]), Some(2.5));
        assert_eq!(Statistics::max_abs([f64::NAN]), None);
    }
}
