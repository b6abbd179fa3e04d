//! Operator editing mode for set membership.

use serde::{Deserialize, Serialize};

/// Which drag action the operator has armed.
///
/// A single enum keeps grouping and ungrouping mutually exclusive: entering
/// one leaves the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupingMode {
    /// Shoppers' view; no drag actions.
    #[default]
    Idle,
    /// Dropping a card onto another joins them into one set.
    Grouping,
    /// Sets are shown expanded; dragging a card out removes it from its set.
    Ungrouping,
}

impl GroupingMode {
    /// Flip grouping on, or back to idle if it was already on.
    pub fn toggle_grouping(self) -> Self {
        match self {
            GroupingMode::Grouping => GroupingMode::Idle,
            _ => GroupingMode::Grouping,
        }
    }

    /// Flip ungrouping on, or back to idle if it was already on.
    pub fn toggle_ungrouping(self) -> Self {
        match self {
            GroupingMode::Ungrouping => GroupingMode::Idle,
            _ => GroupingMode::Ungrouping,
        }
    }

    pub fn allows_join(self) -> bool {
        self == GroupingMode::Grouping
    }

    pub fn allows_leave(self) -> bool {
        self == GroupingMode::Ungrouping
    }
}
