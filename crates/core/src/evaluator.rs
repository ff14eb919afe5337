use thiserror::Error;

use crate::model::{Answer, GameKind, Round, Side};

/// Reasons an answer cannot be judged against the round on screen.
///
/// Sessions treat these as no-ops.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnswerError {
    #[error("answer does not fit a {game} round")]
    WrongKind { game: GameKind },

    #[error("option {index} does not exist (round has {len})")]
    NoSuchOption { index: usize, len: usize },

    #[error("submitted order is not a permutation of the round's numbers")]
    NotAPermutation,
}

/// Judge `answer` against `round`. Pure: no state is read or written.
///
/// # Errors
///
/// Returns `AnswerError` when the answer is malformed for this round.
pub fn evaluate(round: &Round, answer: &Answer) -> Result<bool, AnswerError> {
    match (round, answer) {
        (Round::Comparison(round), Answer::Side(side)) => {
            let chosen = round.number(*side);
            let other = match side {
                Side::Left => round.right,
                Side::Right => round.left,
            };
            Ok(round.relation.holds(chosen, other))
        }
        (Round::Composition(round), Answer::Choice(index)) => round
            .options
            .get(*index)
            .map(|option| option.is_correct)
            .ok_or(AnswerError::NoSuchOption {
                index: *index,
                len: round.options.len(),
            }),
        (Round::Ordering(round), Answer::Order(submitted)) => {
            let solution = round.solution();
            let mut sorted_submission = submitted.clone();
            sorted_submission.sort_unstable();
            let mut sorted_round = round.numbers.clone();
            sorted_round.sort_unstable();
            if sorted_submission != sorted_round {
                return Err(AnswerError::NotAPermutation);
            }
            Ok(*submitted == solution)
        }
        (round, _) => Err(AnswerError::WrongKind { game: round.game() }),
    }
}
