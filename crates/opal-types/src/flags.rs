use serde::{Deserialize, Serialize};

/// Operation-wide dispatch flags.
///
/// Flags set here apply to every sub-operation in the composite operation
/// at dispatch time. The same knobs are also available per sub-operation;
/// a sub-operation is treated as flagged when either granularity sets it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationFlags {
    /// FAILOK: a failing sub-operation records its return code in its
    /// result slot but neither stops the sequence nor contributes to the
    /// overall status.
    pub fail_ok: bool,

    /// Hint that the backend may serve reads from any replica rather than
    /// the authoritative copy. Advisory; backends may ignore it.
    pub balance_reads: bool,
}

impl OperationFlags {
    /// Flags with FAILOK set and everything else defaulted.
    pub fn fail_ok() -> Self {
        Self {
            fail_ok: true,
            ..Self::default()
        }
    }
}
