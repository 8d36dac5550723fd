use std::f64::consts::{LN_10, PI};

use tracing::trace;

use crate::{Rating, RatingDifference, RatingScalar, Score};

/// Scale constant of the Glicko system, `ln(10) / 400`.
pub const Q: f64 = LN_10 / 400.0;

/// Dampening factor for an opponent's uncertainty. The less is known about
/// the opponent, the less a result against it tells about the player.
#[inline]
fn g(deviation: RatingDifference) -> f64 {
    1.0 / (1.0 + 3.0 * Q * Q * deviation.sq() / (PI * PI)).sqrt()
}

#[inline]
fn expectation(player: RatingScalar, opponent: RatingScalar, g_opponent: f64) -> f64 {
    let RatingDifference(difference) = player - opponent;
    1.0 / (1.0 + 10f64.powf(-g_opponent * difference / 400.0))
}

#[derive(Debug, Clone)]
pub struct RatingSystemBuilder {
    default_rating: f64,
    default_deviation: f64,
    min_deviation: f64,
}

impl Default for RatingSystemBuilder {
    fn default() -> RatingSystemBuilder {
        RatingSystemBuilder::new()
    }
}

impl RatingSystemBuilder {
    pub fn new() -> RatingSystemBuilder {
        RatingSystemBuilder {
            default_rating: 1500.0,
            default_deviation: 350.0,
            min_deviation: 50.0,
        }
    }

    pub fn default_rating(&mut self, default_rating: f64) -> &mut Self {
        assert!(default_rating.is_finite());
        self.default_rating = default_rating;
        self
    }

    pub fn default_deviation(&mut self, default_deviation: f64) -> &mut Self {
        assert!(default_deviation.is_finite());
        self.default_deviation = default_deviation;
        self
    }

    pub fn min_deviation(&mut self, min_deviation: f64) -> &mut Self {
        assert!(min_deviation > 0.0);
        self.min_deviation = min_deviation;
        self
    }

    pub fn build(&self) -> RatingSystem {
        assert!(self.min_deviation <= self.default_deviation);

        RatingSystem {
            default_rating: RatingScalar(self.default_rating),
            default_deviation: RatingDifference(self.default_deviation),
            min_deviation: RatingDifference(self.min_deviation),
        }
    }
}

/// Single-opponent Glicko update, applied after every comparison.
///
/// Deviations only ever shrink: there is no notion of time passing between
/// comparisons of a ranking session.
#[derive(Debug, Clone)]
pub struct RatingSystem {
    default_rating: RatingScalar,
    default_deviation: RatingDifference,
    min_deviation: RatingDifference,
}

impl Default for RatingSystem {
    fn default() -> RatingSystem {
        RatingSystem::new()
    }
}

impl RatingSystem {
    pub fn builder() -> RatingSystemBuilder {
        RatingSystemBuilder::default()
    }

    pub fn new() -> RatingSystem {
        RatingSystem::builder().build()
    }

    pub fn default_rating(&self) -> RatingScalar {
        self.default_rating
    }

    pub fn default_deviation(&self) -> RatingDifference {
        self.default_deviation
    }

    pub fn min_deviation(&self) -> RatingDifference {
        self.min_deviation
    }

    /// Rating of a book that has not been compared yet.
    pub fn new_rating(&self) -> Rating {
        Rating {
            rating: self.default_rating,
            deviation: self.default_deviation,
        }
    }

    /// Probability that `player` wins a comparison against `opponent`.
    pub fn expected_score(&self, player: &Rating, opponent: &Rating) -> f64 {
        expectation(player.rating, opponent.rating, g(opponent.deviation))
    }

    /// New rating of `player` after a comparison against `opponent`.
    ///
    /// Both arguments must be the snapshots from before the comparison. The
    /// deviations must be positive.
    #[must_use]
    pub fn update_rating(&self, player: &Rating, opponent: &Rating, score: Score) -> Rating {
        let g_opponent = g(opponent.deviation);
        let expected = expectation(player.rating, opponent.rating, g_opponent);

        // 1 / d^2. Zero when the outcome was certain, which is also what an
        // infinite d^2 would give.
        let information = Q * Q * g_opponent * g_opponent * expected * (1.0 - expected);
        let precision = 1.0 / player.deviation.sq() + information;

        if !precision.is_finite() || precision <= 0.0 {
            return Rating {
                rating: player.rating,
                deviation: self.clamp_deviation(player.deviation),
            };
        }

        let rating = player.rating
            + RatingDifference(Q / precision * g_opponent * (score.value() - expected));
        let deviation = self.clamp_deviation(RatingDifference((1.0 / precision).sqrt()));

        trace!(
            from = player.rating.0,
            to = rating.0,
            deviation = deviation.0,
            expected,
            ?score,
            "rating updated"
        );

        Rating { rating, deviation }
    }

    /// Updates both sides of a comparison from their pre-comparison ratings.
    #[must_use]
    pub fn update_ratings(&self, winner: &Rating, loser: &Rating) -> (Rating, Rating) {
        (
            self.update_rating(winner, loser, Score::Win),
            self.update_rating(loser, winner, Score::Loss),
        )
    }

    fn clamp_deviation(&self, deviation: RatingDifference) -> RatingDifference {
        if deviation.0.is_nan() {
            self.min_deviation
        } else {
            deviation.max(self.min_deviation)
        }
    }
}

/// [`RatingSystem::update_rating`] with the default parameters
/// (1500 / 350, deviation floored at 50).
pub fn update(player: &Rating, opponent: &Rating, score: Score) -> Rating {
    RatingSystem::new().update_rating(player, opponent, score)
}
