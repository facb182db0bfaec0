//! Interpretations - fixed-length truth assignments over an ordered
//! proposition signature.
//!
//! An `Interpretation` is the atomic unit of belief in this crate: every
//! agent holds a set of them, the model universe is a list of them, and all
//! disagreement is measured as Hamming distance between two of them.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised by interpretation-level operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InterpretationError {
    /// Two interpretations of different widths were compared.
    #[error("length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },
}

/// An immutable fixed-length truth assignment.
///
/// Position `i` holds the truth value of the `i`-th proposition in the
/// governing signature. Equality and Hamming distance are positional and
/// only defined between interpretations of equal length.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interpretation {
    values: Vec<bool>,
}

impl Interpretation {
    /// Creates an interpretation from explicit truth values.
    pub fn new(values: Vec<bool>) -> Self {
        Self { values }
    }

    /// Creates an interpretation from 0/1 bits (any nonzero byte is true).
    ///
    /// Convenience for fixtures written in the `(1, 0, 0)` notation.
    pub fn from_bits(bits: &[u8]) -> Self {
        Self {
            values: bits.iter().map(|&b| b != 0).collect(),
        }
    }

    /// Number of propositions this interpretation assigns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the interpretation assigns no propositions.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Truth value at position `i`, if in range.
    pub fn get(&self, i: usize) -> Option<bool> {
        self.values.get(i).copied()
    }

    /// The full assignment, in signature order.
    pub fn values(&self) -> &[bool] {
        &self.values
    }

    /// Number of positions at which `self` and `other` disagree.
    ///
    /// Fails with [`InterpretationError::LengthMismatch`] if the two
    /// interpretations are not over the same signature width.
    pub fn hamming_distance(&self, other: &Interpretation) -> Result<usize, InterpretationError> {
        if self.len() != other.len() {
            return Err(InterpretationError::LengthMismatch {
                left: self.len(),
                right: other.len(),
            });
        }

        Ok(self
            .values
            .iter()
            .zip(&other.values)
            .filter(|(a, b)| a != b)
            .count())
    }
}

impl From<Vec<bool>> for Interpretation {
    fn from(values: Vec<bool>) -> Self {
        Self::new(values)
    }
}

impl fmt::Display for Interpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, v) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", u8::from(*v))?;
        }
        write!(f, ")")
    }
}

/// Free-function form of [`Interpretation::hamming_distance`].
pub fn hamming_distance(x: &Interpretation, y: &Interpretation) -> Result<usize, InterpretationError> {
    x.hamming_distance(y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::collection::vec;
    use proptest::prelude::*;

    #[test]
    fn test_distance_counts_differing_positions() {
        let x = Interpretation::from_bits(&[1, 0, 0]);
        let y = Interpretation::from_bits(&[1, 1, 1]);
        assert_eq!(x.hamming_distance(&y), Ok(2));
    }

    #[test]
    fn test_distance_rejects_length_mismatch() {
        let x = Interpretation::from_bits(&[1, 0]);
        let y = Interpretation::from_bits(&[1, 0, 1]);
        assert_eq!(
            x.hamming_distance(&y),
            Err(InterpretationError::LengthMismatch { left: 2, right: 3 })
        );
    }

    #[test]
    fn test_display_uses_bit_tuple_notation() {
        let x = Interpretation::from_bits(&[1, 0, 1]);
        assert_eq!(x.to_string(), "(1, 0, 1)");
    }

    /// Three interpretations over the same signature width.
    fn equal_width_triple() -> impl Strategy<Value = (Interpretation, Interpretation, Interpretation)>
    {
        (1usize..12).prop_flat_map(|n| {
            (
                vec(any::<bool>(), n),
                vec(any::<bool>(), n),
                vec(any::<bool>(), n),
            )
                .prop_map(|(a, b, c)| {
                    (
                        Interpretation::new(a),
                        Interpretation::new(b),
                        Interpretation::new(c),
                    )
                })
        })
    }

    proptest! {
        #[test]
        fn prop_distance_is_symmetric((x, y, _) in equal_width_triple()) {
            prop_assert_eq!(x.hamming_distance(&y).unwrap(), y.hamming_distance(&x).unwrap());
        }

        #[test]
        fn prop_distance_to_self_is_zero((x, _, _) in equal_width_triple()) {
            prop_assert_eq!(x.hamming_distance(&x).unwrap(), 0);
        }

        #[test]
        fn prop_triangle_inequality((x, y, z) in equal_width_triple()) {
            let xz = x.hamming_distance(&z).unwrap();
            let xy = x.hamming_distance(&y).unwrap();
            let yz = y.hamming_distance(&z).unwrap();
            prop_assert!(xz <= xy + yz);
        }
    }
}
