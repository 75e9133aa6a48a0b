//! Status enums for various entities.

use serde::{Deserialize, Serialize};

/// Checkout form submission state.
///
/// `Idle -> Submitting -> {Succeeded, Failed}`. `Failed` returns to `Idle`
/// (editable) automatically once it has been published. `Succeeded` is
/// terminal for the form instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Succeeded {
        /// Server-assigned order identifier.
        order_id: String,
    },
    Failed {
        /// Message shown to the customer.
        message: String,
    },
}

impl SubmissionState {
    /// Whether a new submission may start from this state.
    #[must_use]
    pub const fn accepts_submission(&self) -> bool {
        matches!(self, Self::Idle | Self::Failed { .. })
    }

    /// Whether a request is in flight.
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting)
    }

    /// Whether the form reached its terminal success state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}
