#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use bookrank::{Rating, RatingDifference, RatingScalar, RatingSystem, Score};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary)]
struct ArbitraryRating {
    rating: f64,
    deviation: f64,
}

impl ArbitraryRating {
    fn into_clamped(self) -> Option<Rating> {
        if self.rating.is_nan() || self.deviation.is_nan() {
            None
        } else {
            Some(Rating {
                rating: RatingScalar(self.rating.clamp(-10000.0, 10000.0)),
                deviation: RatingDifference(self.deviation.clamp(0.0, 1000.0)),
            })
        }
    }
}

#[derive(Arbitrary)]
struct Comparison {
    player: ArbitraryRating,
    opponent: ArbitraryRating,
    win: bool,
}

fn assert_rating(rating_system: &RatingSystem, rating: Rating) {
    assert!(f64::from(rating.rating).is_finite());
    assert!(f64::from(rating.deviation).is_finite());
    assert!(rating.deviation >= rating_system.min_deviation());
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(comparison) = Comparison::arbitrary(&mut u) else {
        return;
    };
    let (Some(player), Some(opponent)) = (
        comparison.player.into_clamped(),
        comparison.opponent.into_clamped(),
    ) else {
        return;
    };

    let rating_system = RatingSystem::new();

    assert_rating(
        &rating_system,
        rating_system.update_rating(&player, &opponent, Score::from(comparison.win)),
    );

    let (winner, loser) = rating_system.update_ratings(&player, &opponent);
    assert_rating(&rating_system, winner);
    assert_rating(&rating_system, loser);
    assert!(winner.rating >= player.rating);
    assert!(loser.rating <= opponent.rating);
});
