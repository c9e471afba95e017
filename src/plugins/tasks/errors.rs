use std::fmt;
use thiserror::Error;

/// Which kind of entity a lookup failed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    List,
    Task,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::List => f.write_str("List"),
            EntityKind::Task => f.write_str("Task"),
        }
    }
}

/// Errors from the task/list mutation core. Either one aborts the mutation
/// and leaves the collection as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TasksError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },
}

impl TasksError {
    pub fn validation(msg: impl Into<String>) -> Self {
        TasksError::Validation(msg.into())
    }

    pub fn list_not_found(id: impl Into<String>) -> Self {
        TasksError::NotFound {
            kind: EntityKind::List,
            id: id.into(),
        }
    }

    pub fn task_not_found(id: impl Into<String>) -> Self {
        TasksError::NotFound {
            kind: EntityKind::Task,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, TasksError::NotFound { .. })
    }
}

/// Errors from the tag-suggestion flow.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SuggestError {
    #[error("Provide a title or description to get tag suggestions")]
    EmptyInput,
    #[error("A tag suggestion request is already running")]
    InFlight,
    #[error("The task form is closed")]
    FormClosed,
    #[error("Tag suggestions unavailable: {0}")]
    Unavailable(String),
}

impl SuggestError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        SuggestError::Unavailable(msg.into())
    }

    /// Local failures never reach the network and need no retry hint.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            SuggestError::EmptyInput | SuggestError::InFlight | SuggestError::FormClosed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_kind() {
        let err = TasksError::list_not_found("abc");
        assert_eq!(err.to_string(), "List not found: abc");
        assert!(err.is_not_found());

        let err = TasksError::task_not_found("xyz");
        assert_eq!(err.to_string(), "Task not found: xyz");
    }

    #[test]
    fn test_suggest_error_locality() {
        assert!(SuggestError::EmptyInput.is_local());
        assert!(SuggestError::InFlight.is_local());
        assert!(SuggestError::FormClosed.is_local());
        assert!(!SuggestError::unavailable("timeout").is_local());
    }
}
