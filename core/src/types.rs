//! Domain types for the todo list.
//!
//! # Design
//! `Todo` is the stored record. Raw form input arrives as `TodoInput` (all
//! strings, all optional) and must pass through `TodoInput::validate` to
//! become `TodoFields` before anything is written. The store never sees
//! unvalidated text, so the record invariants (non-empty task, no blank
//! tags, known priority) hold for every persisted value.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TodoError;

/// Urgency of a todo. Ordered by declaration: `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(TodoError::Validation("Invalid priority".to_string())),
        }
    }
}

/// A single persisted todo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: Uuid,
    pub task: String,
    pub description: String,
    pub completed: bool,
    pub priority: Priority,
    pub category: String,
    #[serde(rename = "dueDate")]
    pub due_date: Option<NaiveDate>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Builds a fresh, pending record. The id is a placeholder until the
    /// store assigns one on insert.
    pub fn new(fields: TodoFields, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::nil(),
            task: fields.task,
            description: fields.description,
            completed: false,
            priority: fields.priority,
            category: fields.category,
            due_date: fields.due_date,
            tags: fields.tags,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a patch in place. `updated_at` always moves strictly forward,
    /// even if the patch carries an older or equal timestamp. Returns `true`
    /// if any stored value changed other than the timestamp.
    pub fn apply(&mut self, patch: &TodoPatch) -> bool {
        let mut changed = false;
        if let Some(fields) = &patch.fields {
            let before = self.fields();
            if before != *fields {
                changed = true;
            }
            self.task = fields.task.clone();
            self.description = fields.description.clone();
            self.priority = fields.priority;
            self.category = fields.category.clone();
            self.due_date = fields.due_date;
            self.tags = fields.tags.clone();
        }
        if let Some(completed) = patch.completed {
            if self.completed != completed {
                changed = true;
            }
            self.completed = completed;
        }
        self.updated_at = next_timestamp(patch.updated_at, self.updated_at);
        changed
    }

    /// The user-editable portion of the record.
    pub fn fields(&self) -> TodoFields {
        TodoFields {
            task: self.task.clone(),
            description: self.description.clone(),
            priority: self.priority,
            category: self.category.clone(),
            due_date: self.due_date,
            tags: self.tags.clone(),
        }
    }
}

/// Raw, unvalidated form input for create and update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TodoInput {
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, rename = "dueDate")]
    pub due_date: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
}

impl TodoInput {
    /// Normalizes and checks the input.
    ///
    /// Strings are trimmed, `tags` is split on commas with blanks dropped,
    /// and a missing priority becomes `Medium`. Fails with
    /// `TodoError::Validation` on an empty task, an unknown priority, or a
    /// due date that is not `YYYY-MM-DD`.
    pub fn validate(&self) -> Result<TodoFields, TodoError> {
        let task = self.task.as_deref().map(str::trim).unwrap_or_default();
        if task.is_empty() {
            return Err(TodoError::Validation("Task is required".to_string()));
        }

        let priority = match non_blank(self.priority.as_deref()) {
            Some(raw) => raw.parse()?,
            None => Priority::default(),
        };

        let due_date = match non_blank(self.due_date.as_deref()) {
            Some(raw) => Some(
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map_err(|_| TodoError::Validation("Invalid due date".to_string()))?,
            ),
            None => None,
        };

        Ok(TodoFields {
            task: task.to_string(),
            description: trimmed(self.description.as_deref()),
            priority,
            category: trimmed(self.category.as_deref()),
            due_date,
            tags: split_tags(self.tags.as_deref().unwrap_or_default()),
        })
    }
}

/// Validated, normalized user-editable fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoFields {
    pub task: String,
    pub description: String,
    pub priority: Priority,
    pub category: String,
    pub due_date: Option<NaiveDate>,
    pub tags: Vec<String>,
}

/// A set of field overwrites sent to the store. `updated_at` is always
/// written.
#[derive(Debug, Clone)]
pub struct TodoPatch {
    pub fields: Option<TodoFields>,
    pub completed: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

impl TodoPatch {
    pub fn replace(fields: TodoFields, updated_at: DateTime<Utc>) -> Self {
        Self {
            fields: Some(fields),
            completed: None,
            updated_at,
        }
    }

    pub fn completed(completed: bool, updated_at: DateTime<Utc>) -> Self {
        Self {
            fields: None,
            completed: Some(completed),
            updated_at,
        }
    }
}

/// Splits a comma-separated tag list, trimming each entry and dropping blanks.
pub fn split_tags(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

fn trimmed(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Returns a timestamp strictly after `previous`, preferring `now`.
fn next_timestamp(now: DateTime<Utc>, previous: DateTime<Utc>) -> DateTime<Utc> {
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn input(task: &str) -> TodoInput {
        TodoInput {
            task: Some(task.to_string()),
            ..TodoInput::default()
        }
    }

    #[test]
    fn priority_orders_by_urgency_not_alphabet() {
        let mut priorities = vec![Priority::High, Priority::Low, Priority::Medium];
        priorities.sort();
        assert_eq!(priorities, vec![Priority::Low, Priority::Medium, Priority::High]);
    }

    #[test]
    fn priority_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Priority::High).unwrap(), "high");
        let back: Priority = serde_json::from_str(r#""low""#).unwrap();
        assert_eq!(back, Priority::Low);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\t\n")]
    fn blank_task_is_rejected(#[case] task: &str) {
        let err = input(task).validate().unwrap_err();
        assert!(matches!(err, TodoError::Validation(ref m) if m == "Task is required"));
    }

    #[test]
    fn missing_task_is_rejected() {
        let err = TodoInput::default().validate().unwrap_err();
        assert!(matches!(err, TodoError::Validation(_)));
    }

    #[test]
    fn validate_trims_and_defaults() {
        let fields = TodoInput {
            task: Some("  Buy milk ".to_string()),
            description: Some("  2 litres ".to_string()),
            category: Some(" Errands ".to_string()),
            ..TodoInput::default()
        }
        .validate()
        .unwrap();
        assert_eq!(fields.task, "Buy milk");
        assert_eq!(fields.description, "2 litres");
        assert_eq!(fields.category, "Errands");
        assert_eq!(fields.priority, Priority::Medium);
        assert!(fields.due_date.is_none());
        assert!(fields.tags.is_empty());
    }

    #[rstest]
    #[case("a, b ,c", vec!["a", "b", "c"])]
    #[case(" , ,", vec![])]
    #[case("solo", vec!["solo"])]
    #[case("x,,y, ", vec!["x", "y"])]
    fn tags_are_split_and_cleaned(#[case] csv: &str, #[case] expected: Vec<&str>) {
        assert_eq!(split_tags(csv), expected);
    }

    #[test]
    fn unknown_priority_is_rejected() {
        let err = TodoInput {
            priority: Some("urgent".to_string()),
            ..input("x")
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, TodoError::Validation(ref m) if m == "Invalid priority"));
    }

    #[test]
    fn due_date_parses_iso_and_rejects_garbage() {
        let fields = TodoInput {
            due_date: Some("2024-03-09".to_string()),
            ..input("x")
        }
        .validate()
        .unwrap();
        assert_eq!(fields.due_date, NaiveDate::from_ymd_opt(2024, 3, 9));

        let err = TodoInput {
            due_date: Some("next week".to_string()),
            ..input("x")
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, TodoError::Validation(_)));
    }

    #[test]
    fn new_todo_is_pending_with_equal_timestamps() {
        let now = Utc::now();
        let todo = Todo::new(input("x").validate().unwrap(), now);
        assert!(!todo.completed);
        assert_eq!(todo.created_at, todo.updated_at);
    }

    #[test]
    fn apply_reports_whether_anything_changed() {
        let now = Utc::now();
        let mut todo = Todo::new(input("x").validate().unwrap(), now);
        assert!(!todo.apply(&TodoPatch::completed(false, now)));
        assert!(todo.apply(&TodoPatch::completed(true, now)));
        assert!(todo.completed);
    }

    #[test]
    fn apply_moves_updated_at_forward_under_a_stalled_clock() {
        let now = Utc::now();
        let mut todo = Todo::new(input("x").validate().unwrap(), now);
        todo.apply(&TodoPatch::completed(true, now));
        assert!(todo.updated_at > todo.created_at);
    }

    #[test]
    fn next_timestamp_is_strictly_increasing() {
        let t = Utc::now();
        assert!(next_timestamp(t, t) > t);
        assert!(next_timestamp(t - Duration::seconds(5), t) > t);
        let later = t + Duration::seconds(1);
        assert_eq!(next_timestamp(later, t), later);
    }

    #[test]
    fn todo_serializes_due_date_as_camel_case() {
        let todo = Todo::new(input("x").validate().unwrap(), Utc::now());
        let json = serde_json::to_value(&todo).unwrap();
        assert!(json.get("dueDate").is_some());
        assert_eq!(json["priority"], "medium");
    }
}
