/// Outcome of a single comparison from the point of view of one book.
///
/// There are no draws: the reader always prefers one of the two books.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Score {
    Loss,
    Win,
}

impl From<Score> for f64 {
    fn from(score: Score) -> f64 {
        score.value()
    }
}

impl Score {
    /// The outcome for the other side of the same comparison.
    pub fn opposite(self) -> Score {
        match self {
            Score::Loss => Score::Win,
            Score::Win => Score::Loss,
        }
    }

    pub fn value(self) -> f64 {
        match self {
            Score::Loss => 0.0,
            Score::Win => 1.0,
        }
    }
}

impl From<bool> for Score {
    fn from(won: bool) -> Score {
        if won {
            Score::Win
        } else {
            Score::Loss
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite() {
        assert_eq!(Score::Win.opposite(), Score::Loss);
        assert_eq!(Score::Loss.opposite(), Score::Win);
        assert_eq!(Score::from(true), Score::Win);
        assert_eq!(f64::from(Score::Loss), 0.0);
    }
}
