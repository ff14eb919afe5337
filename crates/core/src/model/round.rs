use serde::{Deserialize, Serialize};

use crate::model::GameKind;

//
// ─── COMPARISON ────────────────────────────────────────────────────────────────
//

/// Which relation the player must find between the two numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    Greater,
    Less,
}

impl Relation {
    #[must_use]
    pub fn holds(self, chosen: u32, other: u32) -> bool {
        match self {
            Relation::Greater => chosen > other,
            Relation::Less => chosen < other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

/// Two distinct numbers and the relation the player is asked about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonRound {
    pub left: u32,
    pub right: u32,
    pub relation: Relation,
}

impl ComparisonRound {
    #[must_use]
    pub fn number(&self, side: Side) -> u32 {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    /// The side whose number satisfies the relation.
    #[must_use]
    pub fn winning_side(&self) -> Side {
        if self.relation.holds(self.left, self.right) {
            Side::Left
        } else {
            Side::Right
        }
    }
}

//
// ─── COMPOSITION ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionOption {
    pub first: u32,
    pub second: u32,
    pub is_correct: bool,
}

impl CompositionOption {
    #[must_use]
    pub fn sum(&self) -> u32 {
        self.first + self.second
    }

    /// Same addends, in either order.
    #[must_use]
    pub fn same_pair(&self, other: &CompositionOption) -> bool {
        (self.first == other.first && self.second == other.second)
            || (self.first == other.second && self.second == other.first)
    }
}

/// A target number and the candidate addend pairs shown for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionRound {
    pub target: u32,
    pub options: Vec<CompositionOption>,
}

impl CompositionRound {
    #[must_use]
    pub fn correct_index(&self) -> Option<usize> {
        self.options.iter().position(|option| option.is_correct)
    }
}

//
// ─── ORDERING ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    Ascending,
    Descending,
}

/// Distinct numbers in shuffled order plus the order the player must restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderingRound {
    pub numbers: Vec<u32>,
    pub direction: OrderDirection,
}

impl OrderingRound {
    /// The numbers sorted in the requested direction.
    #[must_use]
    pub fn solution(&self) -> Vec<u32> {
        let mut sorted = self.numbers.clone();
        match self.direction {
            OrderDirection::Ascending => sorted.sort_unstable(),
            OrderDirection::Descending => sorted.sort_unstable_by(|a, b| b.cmp(a)),
        }
        sorted
    }
}

//
// ─── ROUND ─────────────────────────────────────────────────────────────────────
//

/// One generated question for a mini-game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "game", rename_all = "lowercase")]
pub enum Round {
    Comparison(ComparisonRound),
    Composition(CompositionRound),
    Ordering(OrderingRound),
}

impl Round {
    #[must_use]
    pub fn game(&self) -> GameKind {
        match self {
            Round::Comparison(_) => GameKind::Comparison,
            Round::Composition(_) => GameKind::Composition,
            Round::Ordering(_) => GameKind::Ordering,
        }
    }
}

//
// ─── ANSWER ────────────────────────────────────────────────────────────────────
//

/// Player input for the round on screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Answer {
    /// Comparison: the side the player picked.
    Side(Side),
    /// Composition: zero-based index into `CompositionRound::options`.
    Choice(usize),
    /// Ordering: the sequence as arranged by the player.
    Order(Vec<u32>),
}
