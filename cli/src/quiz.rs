//! Interactive ranking on a terminal.

use std::{
    io::{BufRead, Write},
    str::FromStr,
};

use bookrank::{Book, RankingSession};
use thiserror::Error;
use tracing::debug;

use crate::Error;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Choice {
    First,
    Second,
    Skip,
    Quit,
}

#[derive(Debug, Error)]
#[error("expected 1, 2, s or q")]
pub struct InvalidChoice;

impl FromStr for Choice {
    type Err = InvalidChoice;

    fn from_str(s: &str) -> Result<Choice, InvalidChoice> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "1" => Choice::First,
            "2" => Choice::Second,
            "s" | "skip" => Choice::Skip,
            "q" | "quit" => Choice::Quit,
            _ => return Err(InvalidChoice),
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum QuizOutcome {
    /// The session has nothing left to ask.
    Completed,
    /// The reader quit, or input ended.
    Quit,
}

fn describe(book: &Book) -> String {
    if book.authors.is_empty() {
        book.title.clone()
    } else {
        format!("{} by {}", book.title, book.authors.join(", "))
    }
}

/// Presents matchups until the session completes or the reader quits.
///
/// `checkpoint` runs after every answered or skipped pair.
pub fn run_quiz<R, W, F>(
    session: &mut RankingSession,
    mut input: R,
    mut output: W,
    mut checkpoint: F,
) -> Result<QuizOutcome, Error>
where
    R: BufRead,
    W: Write,
    F: FnMut(&RankingSession) -> Result<(), Error>,
{
    let mut line = String::new();

    while let Some(matchup) = session.next_matchup() {
        writeln!(output)?;
        writeln!(output, "Comparison {}", session.seen().len() + 1)?;
        writeln!(output, "Which book did you enjoy more?")?;
        writeln!(output, "  1) {}", describe(&matchup.first))?;
        writeln!(output, "  2) {}", describe(&matchup.second))?;

        let choice = loop {
            write!(output, "[1/2, s to skip, q to quit] > ")?;
            output.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                writeln!(output)?;
                break Choice::Quit;
            }
            match line.parse::<Choice>() {
                Ok(choice) => break choice,
                Err(err) => writeln!(output, "{err}")?,
            }
        };

        debug!(?choice, first = %matchup.first.id, second = %matchup.second.id, "answer");

        match choice {
            Choice::First => session.record(&matchup.first.id, &matchup.second.id)?,
            Choice::Second => session.record(&matchup.second.id, &matchup.first.id)?,
            Choice::Skip => session.skip(&matchup.first.id, &matchup.second.id)?,
            Choice::Quit => return Ok(QuizOutcome::Quit),
        }

        checkpoint(session)?;
    }

    Ok(QuizOutcome::Completed)
}
