//! Random round generation for the three mini-games.
//!
//! Every sampler is a rejection loop bounded by [`MAX_ATTEMPTS`]. When a loop
//! runs out of attempts it falls back to a deterministic value that still
//! satisfies the round invariants, so generation never spins forever.

use std::ops::RangeInclusive;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::model::{
    ComparisonRound, CompositionOption, CompositionRound, GameKind, Level, OrderDirection,
    OrderingRound, Relation, Round,
};

pub const MAX_ATTEMPTS: usize = 64;

/// Largest distance between a distractor's sum and the target.
pub const MAX_DISTRACTOR_OFFSET: u32 = 3;

const SINGLE_DIGIT: RangeInclusive<u32> = 1..=9;
const TWO_DIGIT: RangeInclusive<u32> = 10..=99;

/// Produce a fresh round for `game` at `level`.
pub fn generate<R: Rng + ?Sized>(game: GameKind, level: Level, rng: &mut R) -> Round {
    match game {
        GameKind::Comparison => Round::Comparison(comparison(level, rng)),
        GameKind::Composition => Round::Composition(composition(level, rng)),
        GameKind::Ordering => Round::Ordering(ordering(level, rng)),
    }
}

//
// ─── COMPARISON ────────────────────────────────────────────────────────────────
//

pub fn comparison<R: Rng + ?Sized>(level: Level, rng: &mut R) -> ComparisonRound {
    let (left, right) = match level.value() {
        1 => distinct_pair(SINGLE_DIGIT, rng),
        2 => distinct_pair(TWO_DIGIT, rng),
        // mixed place values: one single-digit, one two-digit, random side
        _ => {
            let small = rng.random_range(SINGLE_DIGIT);
            let large = rng.random_range(TWO_DIGIT);
            if rng.random_bool(0.5) {
                (small, large)
            } else {
                (large, small)
            }
        }
    };

    let relation = if rng.random_bool(0.5) {
        Relation::Greater
    } else {
        Relation::Less
    };

    ComparisonRound {
        left,
        right,
        relation,
    }
}

fn distinct_pair<R: Rng + ?Sized>(range: RangeInclusive<u32>, rng: &mut R) -> (u32, u32) {
    let first = rng.random_range(range.clone());
    for _ in 0..MAX_ATTEMPTS {
        let second = rng.random_range(range.clone());
        if second != first {
            return (first, second);
        }
    }
    let second = if first < *range.end() {
        first + 1
    } else {
        first - 1
    };
    (first, second)
}

//
// ─── COMPOSITION ───────────────────────────────────────────────────────────────
//

/// Range of targets per level. The lower bound is at least 2 so a target can
/// always be split into two positive addends.
#[must_use]
pub fn composition_targets(level: Level) -> RangeInclusive<u32> {
    match level.value() {
        1 => 2..=9,
        2 => 10..=25,
        _ => 15..=35,
    }
}

pub fn composition<R: Rng + ?Sized>(level: Level, rng: &mut R) -> CompositionRound {
    let target = rng.random_range(composition_targets(level));
    let first = rng.random_range(1..target);
    let correct = CompositionOption {
        first,
        second: target - first,
        is_correct: true,
    };
    let wrong = distractor(&correct, target, rng);

    let mut options = vec![correct, wrong];
    options.shuffle(rng);

    CompositionRound { target, options }
}

fn distractor<R: Rng + ?Sized>(
    correct: &CompositionOption,
    target: u32,
    rng: &mut R,
) -> CompositionOption {
    for _ in 0..MAX_ATTEMPTS {
        let offset = rng.random_range(1..=MAX_DISTRACTOR_OFFSET);
        let sum = if rng.random_bool(0.5) {
            target + offset
        } else {
            target.saturating_sub(offset)
        };
        if sum < 2 || sum == target {
            continue;
        }

        let first = rng.random_range(1..sum);
        let candidate = CompositionOption {
            first,
            second: sum - first,
            is_correct: false,
        };
        if !candidate.same_pair(correct) {
            return candidate;
        }
    }

    CompositionOption {
        first: correct.first,
        second: correct.second + 1,
        is_correct: false,
    }
}

//
// ─── ORDERING ──────────────────────────────────────────────────────────────────
//

pub fn ordering<R: Rng + ?Sized>(level: Level, rng: &mut R) -> OrderingRound {
    let (mut numbers, direction) = match level.value() {
        1 => {
            let count = rng.random_range(3..=5);
            let numbers = distinct_numbers(count, rng, |rng, _| rng.random_range(SINGLE_DIGIT));
            (numbers, OrderDirection::Ascending)
        }
        2 => {
            // two single-digit numbers, the rest two-digit
            let count = rng.random_range(4..=5);
            let numbers = distinct_numbers(count, rng, |rng, index| {
                if index < 2 {
                    rng.random_range(SINGLE_DIGIT)
                } else {
                    rng.random_range(TWO_DIGIT)
                }
            });
            (numbers, OrderDirection::Ascending)
        }
        _ => {
            let count = rng.random_range(4..=5);
            let numbers = distinct_numbers(count, rng, |rng, _| rng.random_range(1..=50));
            let direction = if rng.random_bool(0.5) {
                OrderDirection::Ascending
            } else {
                OrderDirection::Descending
            };
            (numbers, direction)
        }
    };

    numbers.shuffle(rng);
    OrderingRound { numbers, direction }
}

fn distinct_numbers<R, F>(count: usize, rng: &mut R, mut draw: F) -> Vec<u32>
where
    R: Rng + ?Sized,
    F: FnMut(&mut R, usize) -> u32,
{
    let mut numbers: Vec<u32> = Vec::with_capacity(count);
    for index in 0..count {
        let mut candidate = draw(&mut *rng, index);
        let mut attempts = 0;
        while numbers.contains(&candidate) && attempts < MAX_ATTEMPTS {
            candidate = draw(&mut *rng, index);
            attempts += 1;
        }
        while numbers.contains(&candidate) {
            candidate += 1;
        }
        numbers.push(candidate);
    }
    numbers
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
