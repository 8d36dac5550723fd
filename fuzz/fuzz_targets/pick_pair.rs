#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use bookrank::{max_pairs, pick_pair, Book, RatingSystem, SeenPairs};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary)]
struct Round {
    first_wins: Vec<bool>,
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(round) = Round::arbitrary(&mut u) else {
        return;
    };
    if round.first_wins.len() > 24 {
        return;
    }

    let rating_system = RatingSystem::new();
    let mut books: Vec<Book> = (0..round.first_wins.len())
        .map(|i| Book::new(&rating_system, i.to_string(), i.to_string()))
        .collect();

    // Exhaust every pair, recording each result to move ratings around.
    let mut seen = SeenPairs::new();
    let mut rounds = 0;
    while let Some((first, second)) = pick_pair(&books, &seen) {
        assert_ne!(first.id, second.id);
        assert!(seen.insert(&first.id, &second.id));

        let (a, b) = (first.id.clone(), second.id.clone());
        let first_wins = round.first_wins[rounds % round.first_wins.len()];
        let (w, l) = if first_wins { (a, b) } else { (b, a) };
        let wi = books.iter().position(|book| book.id == w).unwrap();
        let li = books.iter().position(|book| book.id == l).unwrap();
        let (winner, loser) = rating_system.update_ratings(&books[wi].rating, &books[li].rating);
        books[wi].rating = winner;
        books[li].rating = loser;

        rounds += 1;
        assert!(rounds <= max_pairs(books.len()));
    }

    assert_eq!(rounds, max_pairs(books.len()));
});
