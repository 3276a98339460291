//! Ranges: mapping the size dial to sampling bounds and a complexity metric.

use crate::data::Size;
use crate::error::GenError;

/// How a range responds to the size parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleMode {
    /// Bounds are always `[min, max]` regardless of size.
    Constant,
    /// Bounds interpolate from `[origin, origin]` at size 0 to
    /// `[min, max]` at size 100.
    Linear,
}

/// An inclusive integer range with a shrink origin.
///
/// Invariant: `min <= origin <= max`. Both constructors establish it, so a
/// `Range` value is always well-formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub min: i64,
    pub max: i64,
    pub origin: i64,
    pub scale: ScaleMode,
}

impl Range {
    /// Build a range from three unordered values; the middle one becomes
    /// the origin. Invariant under any permutation of the arguments.
    pub fn from_unordered(x: i64, y: i64, z: i64, scale: ScaleMode) -> Range {
        let mut values = [x, y, z];
        values.sort_unstable();
        Range {
            min: values[0],
            origin: values[1],
            max: values[2],
            scale,
        }
    }

    /// Build a range with an explicit origin, rejecting one that falls
    /// outside the (sorted) bounds.
    pub fn with_origin(min: i64, max: i64, origin: i64, scale: ScaleMode) -> Result<Range, GenError> {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        if origin < min || origin > max {
            return Err(GenError::OriginOutsideRange { min, max, origin });
        }
        Ok(Range {
            min,
            max,
            origin,
            scale,
        })
    }

    /// The sampling bounds at a given size.
    ///
    /// Linear scaling truncates the scaled distance toward the origin and
    /// re-clamps, so the result never escapes `[min, max]`.
    pub fn sized_bounds(&self, size: Size) -> (i64, i64) {
        match self.scale {
            ScaleMode::Constant => (self.min, self.max),
            ScaleMode::Linear => {
                let factor = size.get().min(100) as i128;
                let low_span = self.origin as i128 - self.min as i128;
                let high_span = self.max as i128 - self.origin as i128;
                let low = self.origin as i128 - low_span * factor / 100;
                let high = self.origin as i128 + high_span * factor / 100;
                (
                    low.clamp(self.min as i128, self.max as i128) as i64,
                    high.clamp(self.min as i128, self.max as i128) as i64,
                )
            }
        }
    }

    /// Distance from the origin as a percentage of the way to the nearer
    /// extreme: 0 at the origin, 100 at either boundary.
    ///
    /// This is the default complexity function for numeric generators.
    pub fn proportional_distance(&self, value: i64) -> f64 {
        let value = value.clamp(self.min, self.max);
        if value >= self.origin {
            let span = self.max as i128 - self.origin as i128;
            if span == 0 {
                0.0
            } else {
                (value as i128 - self.origin as i128) as f64 * 100.0 / span as f64
            }
        } else {
            let span = self.origin as i128 - self.min as i128;
            (self.origin as i128 - value as i128) as f64 * 100.0 / span as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_invariance() {
        let permutations = [
            (1, 5, 9),
            (1, 9, 5),
            (5, 1, 9),
            (5, 9, 1),
            (9, 1, 5),
            (9, 5, 1),
        ];
        let expected = Range::from_unordered(1, 5, 9, ScaleMode::Linear);
        for (a, b, c) in permutations {
            assert_eq!(Range::from_unordered(a, b, c, ScaleMode::Linear), expected);
        }
        assert_eq!(expected.min, 1);
        assert_eq!(expected.origin, 5);
        assert_eq!(expected.max, 9);
    }

    #[test]
    fn test_with_origin_validation() {
        assert!(Range::with_origin(0, 10, 5, ScaleMode::Linear).is_ok());
        assert!(Range::with_origin(10, 0, 5, ScaleMode::Linear).is_ok());
        let err = Range::with_origin(0, 10, 50, ScaleMode::Linear).unwrap_err();
        assert_eq!(
            err,
            GenError::OriginOutsideRange {
                min: 0,
                max: 10,
                origin: 50
            }
        );
    }

    #[test]
    fn test_linear_boundaries() {
        let range = Range::from_unordered(-100, 0, 1000, ScaleMode::Linear);
        assert_eq!(range.sized_bounds(Size::new(0)), (0, 0));
        assert_eq!(range.sized_bounds(Size::new(100)), (-100, 1000));
    }

    #[test]
    fn test_linear_truncates_toward_origin() {
        let range = Range::from_unordered(0, 0, 1000, ScaleMode::Linear);
        assert_eq!(range.sized_bounds(Size::new(95)), (0, 950));
        // 10 * 33 / 100 = 3.3, truncated toward the origin.
        let small = Range::from_unordered(0, 0, 10, ScaleMode::Linear);
        assert_eq!(small.sized_bounds(Size::new(33)), (0, 3));
    }

    #[test]
    fn test_constant_ignores_size() {
        let range = Range::from_unordered(2, 4, 8, ScaleMode::Constant);
        assert_eq!(range.sized_bounds(Size::new(0)), (2, 8));
        assert_eq!(range.sized_bounds(Size::new(100)), (2, 8));
    }

    #[test]
    fn test_proportional_distance() {
        let range = Range::from_unordered(-10, 0, 1000, ScaleMode::Linear);
        assert_eq!(range.proportional_distance(0), 0.0);
        assert_eq!(range.proportional_distance(1000), 100.0);
        assert_eq!(range.proportional_distance(-10), 100.0);
        assert_eq!(range.proportional_distance(500), 50.0);

        // A side with zero span has no distance to report.
        let flat = Range::from_unordered(0, 0, 0, ScaleMode::Linear);
        assert_eq!(flat.proportional_distance(0), 0.0);
    }
}
