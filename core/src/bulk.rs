//! Bulk actions over a selection of todos.

use std::fmt;
use std::str::FromStr;

use crate::error::TodoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    Complete,
    Incomplete,
    Delete,
    /// Delete only the selected todos that are already completed.
    DeleteCompleted,
}

impl BulkAction {
    pub const ALL: [BulkAction; 4] = [
        BulkAction::Complete,
        BulkAction::Incomplete,
        BulkAction::Delete,
        BulkAction::DeleteCompleted,
    ];

    /// Success message with `{n}` standing for the affected count.
    pub fn template(self) -> &'static str {
        match self {
            BulkAction::Complete => "{n} tasks marked as completed",
            BulkAction::Incomplete => "{n} tasks marked as incomplete",
            BulkAction::Delete => "{n} tasks deleted",
            BulkAction::DeleteCompleted => "{n} completed tasks deleted",
        }
    }
}

impl FromStr for BulkAction {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "complete" => Ok(BulkAction::Complete),
            "incomplete" => Ok(BulkAction::Incomplete),
            "delete" => Ok(BulkAction::Delete),
            "deleteCompleted" => Ok(BulkAction::DeleteCompleted),
            other => Err(TodoError::InvalidAction(other.to_string())),
        }
    }
}

/// How many records a bulk action actually touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkOutcome {
    pub action: BulkAction,
    pub affected: u64,
}

impl fmt::Display for BulkOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.action.template().replace("{n}", &self.affected.to_string());
        f.write_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("complete", BulkAction::Complete)]
    #[case("incomplete", BulkAction::Incomplete)]
    #[case("delete", BulkAction::Delete)]
    #[case("deleteCompleted", BulkAction::DeleteCompleted)]
    fn parses_known_actions(#[case] raw: &str, #[case] expected: BulkAction) {
        assert_eq!(raw.parse::<BulkAction>().unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("archive")]
    #[case("Complete")]
    fn rejects_unknown_actions(#[case] raw: &str) {
        let err = raw.parse::<BulkAction>().unwrap_err();
        assert_eq!(err, TodoError::InvalidAction(raw.to_string()));
    }

    #[test]
    fn outcome_message_reports_count() {
        let outcome = BulkOutcome {
            action: BulkAction::DeleteCompleted,
            affected: 3,
        };
        assert_eq!(outcome.to_string(), "3 completed tasks deleted");
        let outcome = BulkOutcome {
            action: BulkAction::Complete,
            affected: 0,
        };
        assert_eq!(outcome.to_string(), "0 tasks marked as completed");
    }
}
