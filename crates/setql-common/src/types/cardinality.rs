//! Static set shapes: cardinality classes and parameter set-modes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Statically known count-class of a set.
///
/// `Many` is the unbounded class: it admits any number of elements,
/// including zero. The algebra below is closed over the four classes so
/// that a call's cardinality is always a function of its arguments'
/// cardinalities alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// Exactly zero elements.
    Empty,
    /// Exactly one element.
    One,
    /// Zero or one element.
    AtMostOne,
    /// Any number of elements.
    Many,
}

impl Cardinality {
    /// Classifies a concrete element count.
    #[must_use]
    pub fn of_len(len: usize) -> Self {
        match len {
            0 => Cardinality::Empty,
            1 => Cardinality::One,
            _ => Cardinality::Many,
        }
    }

    /// Returns the set-mode that describes this cardinality.
    #[must_use]
    pub const fn mode(self) -> SetMode {
        match self {
            Cardinality::One => SetMode::Singleton,
            Cardinality::Empty | Cardinality::AtMostOne => SetMode::Optional,
            Cardinality::Many => SetMode::SetOf,
        }
    }

    /// Returns true if a set of this class may have no elements.
    #[must_use]
    pub const fn may_be_empty(self) -> bool {
        !matches!(self, Cardinality::One)
    }

    /// Returns true if a set of this class has at most one element.
    #[must_use]
    pub const fn at_most_one(self) -> bool {
        !matches!(self, Cardinality::Many)
    }

    /// Returns true if a runtime set of `len` elements belongs to this class.
    #[must_use]
    pub const fn admits(self, len: usize) -> bool {
        match self {
            Cardinality::Empty => len == 0,
            Cardinality::One => len == 1,
            Cardinality::AtMostOne => len <= 1,
            Cardinality::Many => true,
        }
    }

    /// Cardinality of an element-wise cross product.
    ///
    /// `Empty` annihilates, `One` is the identity.
    #[must_use]
    pub const fn product(self, other: Self) -> Self {
        use Cardinality::{AtMostOne, Empty, Many, One};
        match (self, other) {
            (Empty, _) | (_, Empty) => Empty,
            (One, c) | (c, One) => c,
            (AtMostOne, AtMostOne) => AtMostOne,
            _ => Many,
        }
    }

    /// Cardinality of a bag union: counts add.
    #[must_use]
    pub const fn sum(self, other: Self) -> Self {
        match (self, other) {
            (Cardinality::Empty, c) | (c, Cardinality::Empty) => c,
            _ => Cardinality::Many,
        }
    }

    /// Cardinality of a value that is one of two alternatives.
    #[must_use]
    pub const fn join(self, other: Self) -> Self {
        use Cardinality::{AtMostOne, Empty, Many, One};
        match (self, other) {
            (Many, _) | (_, Many) => Many,
            (Empty, Empty) => Empty,
            (One, One) => One,
            _ => AtMostOne,
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Cardinality::Empty => "empty",
            Cardinality::One => "one",
            Cardinality::AtMostOne => "at most one",
            Cardinality::Many => "many",
        };
        f.write_str(s)
    }
}

/// Declared set-mode of an operator parameter or return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetMode {
    /// Exactly one value per application; the operator is applied
    /// element-wise and an empty argument empties the call.
    Singleton,
    /// Zero or one value per application; empty is a valid input.
    Optional,
    /// The whole set is passed as a unit.
    SetOf,
}

impl SetMode {
    /// The largest cardinality this mode admits per application.
    #[must_use]
    pub const fn max_cardinality(self) -> Cardinality {
        match self {
            SetMode::Singleton => Cardinality::One,
            SetMode::Optional => Cardinality::AtMostOne,
            SetMode::SetOf => Cardinality::Many,
        }
    }

    /// Declaration keyword prefix (`""`, `"OPTIONAL "`, `"SET OF "`).
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            SetMode::Singleton => "",
            SetMode::Optional => "OPTIONAL ",
            SetMode::SetOf => "SET OF ",
        }
    }
}

impl fmt::Display for SetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SetMode::Singleton => "singleton",
            SetMode::Optional => "optional",
            SetMode::SetOf => "set of",
        };
        f.write_str(s)
    }
}
