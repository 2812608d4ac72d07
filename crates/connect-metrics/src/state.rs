//! Connector/task state encoding.
//!
//! Connect workers report states as free-form labels. Exported gauges
//! carry a closed integer encoding instead; anything that is not known
//! to be healthy or intentionally idle encodes as `Failed`.

/// Numeric state exported on task gauges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EncodedState {
    Failed = 0,
    Running = 1,
    Unassigned = 2,
    Paused = 3,
}

impl EncodedState {
    /// Encode a state label. Case-insensitive; unknown labels are `Failed`.
    pub fn encode(label: &str) -> Self {
        if label.eq_ignore_ascii_case("running") {
            Self::Running
        } else if label.eq_ignore_ascii_case("unassigned") {
            Self::Unassigned
        } else if label.eq_ignore_ascii_case("paused") {
            Self::Paused
        } else {
            Self::Failed
        }
    }

    /// Gauge value for this state.
    pub fn as_gauge(self) -> f64 {
        f64::from(self as u8)
    }

    pub fn is_running(self) -> bool {
        self == Self::Running
    }
}

/// Lowercase a state label for use as a metric label value.
pub fn normalize_label(label: &str) -> String {
    label.to_lowercase()
}
