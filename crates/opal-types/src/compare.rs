use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Comparison operator for extended-attribute guard sub-operations.
///
/// A guard compares the caller-supplied value against the attribute value
/// currently stored on the object. The operator reads left-to-right with
/// the supplied value on the left: `Gt` matches when the supplied value
/// sorts after the stored one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    /// Whether this operator accepts the given ordering of
    /// (supplied value) relative to (stored value).
    pub fn matches(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Ne => ordering != Ordering::Equal,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Gte => ordering != Ordering::Less,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Lte => ordering != Ordering::Greater,
        }
    }

    /// Evaluate the guard for a supplied value against a stored value.
    ///
    /// Both operands are treated as null-terminated strings: each is
    /// truncated at its first NUL byte before the lexicographic compare,
    /// so `b"\0X"` and `b"\0"` are equal regardless of the trailing byte.
    pub fn evaluate(self, supplied: &[u8], stored: &[u8]) -> bool {
        let ordering = null_terminated(supplied).cmp(null_terminated(stored));
        self.matches(ordering)
    }
}

/// The prefix of `bytes` up to (not including) the first NUL byte.
fn null_terminated(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|&b| b == 0) {
        Some(nul) => &bytes[..nul],
        None => bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn equal_values() {
        let v = [0xcc_u8; 8];
        assert!(CompareOp::Eq.evaluate(&v, &v));
        assert!(CompareOp::Gte.evaluate(&v, &v));
        assert!(CompareOp::Lte.evaluate(&v, &v));
        assert!(!CompareOp::Ne.evaluate(&v, &v));
        assert!(!CompareOp::Gt.evaluate(&v, &v));
        assert!(!CompareOp::Lt.evaluate(&v, &v));
    }

    #[test]
    fn shorter_supplied_value_sorts_before() {
        let stored = [0xcc_u8; 8];
        let supplied = [0xcc_u8; 7];
        assert!(CompareOp::Lt.evaluate(&supplied, &stored));
        assert!(CompareOp::Lte.evaluate(&supplied, &stored));
        assert!(CompareOp::Ne.evaluate(&supplied, &stored));
        assert!(!CompareOp::Eq.evaluate(&supplied, &stored));
        assert!(!CompareOp::Gt.evaluate(&supplied, &stored));
        assert!(!CompareOp::Gte.evaluate(&supplied, &stored));
    }

    #[test]
    fn greater_supplied_value_sorts_after() {
        let stored = [0xcc_u8; 8];
        let supplied = [0xcd_u8; 8];
        assert!(CompareOp::Gt.evaluate(&supplied, &stored));
        assert!(CompareOp::Gte.evaluate(&supplied, &stored));
        assert!(CompareOp::Ne.evaluate(&supplied, &stored));
        assert!(!CompareOp::Eq.evaluate(&supplied, &stored));
        assert!(!CompareOp::Lt.evaluate(&supplied, &stored));
        assert!(!CompareOp::Lte.evaluate(&supplied, &stored));
    }

    #[test]
    fn nul_truncates_both_operands() {
        // Stored "\0" and supplied "\0X" compare equal: both truncate to
        // the empty string.
        let stored = [0_u8];
        let supplied = [0_u8, b'X'];
        assert!(CompareOp::Eq.evaluate(&supplied, &stored));
        assert!(CompareOp::Gte.evaluate(&supplied, &stored));
        assert!(CompareOp::Lte.evaluate(&supplied, &stored));
        assert!(!CompareOp::Ne.evaluate(&supplied, &stored));
        assert!(!CompareOp::Gt.evaluate(&supplied, &stored));
        assert!(!CompareOp::Lt.evaluate(&supplied, &stored));
    }

    #[test]
    fn nul_only_affects_the_tail() {
        let stored = [b'a', b'b'];
        let supplied = [b'a', 0, b'z'];
        // Supplied truncates to "a", which sorts before "ab".
        assert!(CompareOp::Lt.evaluate(&supplied, &stored));
    }

    proptest! {
        // Exactly one of Eq/Lt/Gt accepts any pair of values.
        #[test]
        fn trichotomy(supplied in proptest::collection::vec(1u8.., 0..32),
                      stored in proptest::collection::vec(1u8.., 0..32)) {
            let hits = [CompareOp::Eq, CompareOp::Lt, CompareOp::Gt]
                .iter()
                .filter(|op| op.evaluate(&supplied, &stored))
                .count();
            prop_assert_eq!(hits, 1);
        }

        // Ne is the exact complement of Eq.
        #[test]
        fn ne_complements_eq(supplied in proptest::collection::vec(any::<u8>(), 0..32),
                             stored in proptest::collection::vec(any::<u8>(), 0..32)) {
            prop_assert_ne!(
                CompareOp::Eq.evaluate(&supplied, &stored),
                CompareOp::Ne.evaluate(&supplied, &stored)
            );
        }

        // Gte == Gt || Eq, Lte == Lt || Eq.
        #[test]
        fn weak_operators_decompose(supplied in proptest::collection::vec(any::<u8>(), 0..32),
                                    stored in proptest::collection::vec(any::<u8>(), 0..32)) {
            let eq = CompareOp::Eq.evaluate(&supplied, &stored);
            let gt = CompareOp::Gt.evaluate(&supplied, &stored);
            let lt = CompareOp::Lt.evaluate(&supplied, &stored);
            prop_assert_eq!(CompareOp::Gte.evaluate(&supplied, &stored), gt || eq);
            prop_assert_eq!(CompareOp::Lte.evaluate(&supplied, &stored), lt || eq);
        }
    }
}
