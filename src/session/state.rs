use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a resolver session: `Unbound -> Bound -> Closed`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Created, no handle allocated yet
    #[default]
    Unbound,
    /// Handle allocated on the first bind; later binds reuse it
    Bound,
    /// Terminal; every operation fails
    Closed,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }

    pub fn is_bound(&self) -> bool {
        matches!(self, Self::Bound)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbound => write!(f, "unbound"),
            Self::Bound => write!(f, "bound"),
            Self::Closed => write!(f, "closed"),
        }
    }
}
