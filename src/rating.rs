use std::ops::{Add, Mul, Neg, Sub};

/// Number representing how strongly a book is preferred. Higher is better.
/// The difference between two ratings predicts which of the two books wins
/// a comparison.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RatingScalar(pub f64);

impl From<RatingScalar> for f64 {
    #[inline]
    fn from(RatingScalar(rating): RatingScalar) -> f64 {
        rating
    }
}

impl From<f64> for RatingScalar {
    #[inline]
    fn from(rating: f64) -> RatingScalar {
        RatingScalar(rating)
    }
}

impl Sub<RatingScalar> for RatingScalar {
    type Output = RatingDifference;

    #[inline]
    fn sub(self, rhs: RatingScalar) -> RatingDifference {
        RatingDifference(self.0 - rhs.0)
    }
}

impl Add<RatingDifference> for RatingScalar {
    type Output = RatingScalar;

    #[inline]
    fn add(self, RatingDifference(difference): RatingDifference) -> RatingScalar {
        RatingScalar(self.0 + difference)
    }
}

/// A difference between two ratings. Also the unit of the rating deviation.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RatingDifference(pub f64);

impl From<RatingDifference> for f64 {
    #[inline]
    fn from(RatingDifference(difference): RatingDifference) -> f64 {
        difference
    }
}

impl From<f64> for RatingDifference {
    #[inline]
    fn from(difference: f64) -> RatingDifference {
        RatingDifference(difference)
    }
}

impl RatingDifference {
    #[must_use]
    #[inline]
    pub fn abs(self) -> RatingDifference {
        RatingDifference(self.0.abs())
    }

    #[must_use]
    #[inline]
    pub fn max(self, other: RatingDifference) -> RatingDifference {
        RatingDifference(f64::max(self.0, other.0))
    }

    #[inline]
    pub(crate) fn sq(self) -> f64 {
        self.0 * self.0
    }
}

impl Mul<f64> for RatingDifference {
    type Output = RatingDifference;

    #[inline]
    fn mul(self, scalar: f64) -> RatingDifference {
        RatingDifference(self.0 * scalar)
    }
}

impl Neg for RatingDifference {
    type Output = RatingDifference;

    #[inline]
    fn neg(self) -> RatingDifference {
        RatingDifference(-self.0)
    }
}

/// A rating together with its uncertainty.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rating {
    /// Preference strength. The difference between two ratings determines
    /// the expected outcome of a comparison between the two books.
    pub rating: RatingScalar,
    /// Uncertainty in the rating (RD). A range from rating minus twice the
    /// deviation to rating plus twice the deviation approximately represents
    /// a 95% confidence interval.
    pub deviation: RatingDifference,
}

impl Rating {
    /// Approximate 95% confidence interval.
    pub fn interval(&self) -> (RatingScalar, RatingScalar) {
        let spread = self.deviation * 2.0;
        (self.rating + -spread, self.rating + spread)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval() {
        let rating = Rating {
            rating: RatingScalar(1500.0),
            deviation: RatingDifference(120.0),
        };
        assert_eq!(rating.interval(), (RatingScalar(1260.0), RatingScalar(1740.0)));
    }

    #[test]
    fn test_difference() {
        assert_eq!(RatingScalar(1400.0) - RatingScalar(1500.0), RatingDifference(-100.0));
        assert_eq!((RatingScalar(1400.0) - RatingScalar(1500.0)).abs(), RatingDifference(100.0));
        assert_eq!(RatingScalar(1400.0) + RatingDifference(25.0), RatingScalar(1425.0));
    }
}
