/// Task lifecycle states
///
/// Each state is backed by its own persisted collection.
use std::fmt;

/// Represents which collection a task currently lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    /// Accepted and assigned an identifier; link statuses not yet final
    Pending,

    /// All link statuses final; retrievable for reporting
    Completed,
}

impl TaskState {
    /// Name of the persisted document that holds tasks in this state
    pub fn document_name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    /// Parses a state from its document name
    ///
    /// Returns None if the string doesn't match any known state.
    pub fn from_document_name(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Returns all task states
    pub fn all_states() -> [Self; 2] {
        [Self::Pending, Self::Completed]
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.document_name())
    }
}
