//! Search, filter and sort construction for the list view.
//!
//! # Design
//! `build_query` turns the optional list parameters into a `TodoFilter` and
//! a `SortOrder`. Every filter is evaluated by `TodoFilter::matches` with
//! plain, case-insensitive substring tests; the search term is never
//! interpreted as a pattern, so user input cannot inject match syntax or
//! trigger pathological backtracking.

use std::cmp::Ordering;

use crate::types::Todo;

/// Sentinel meaning "no filter" for the priority and category selectors.
pub const ALL: &str = "all";

/// Raw list parameters as they arrive from the query string.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub search: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub sort_by: Option<String>,
}

/// Predicate over stored todos. Each populated field narrows the result;
/// populated fields combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoFilter {
    /// Lowercased search term matched against task, description and tags.
    pub search: Option<String>,
    /// Exact priority name. An unknown name matches nothing.
    pub priority: Option<String>,
    /// Lowercased category substring.
    pub category: Option<String>,
    pub completed: Option<bool>,
}

impl TodoFilter {
    pub fn matches(&self, todo: &Todo) -> bool {
        if let Some(term) = &self.search {
            let hit = contains_folded(&todo.task, term)
                || contains_folded(&todo.description, term)
                || todo.tags.iter().any(|tag| contains_folded(tag, term));
            if !hit {
                return false;
            }
        }
        if let Some(priority) = &self.priority {
            if todo.priority.as_str() != priority {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if !contains_folded(&todo.category, category) {
                return false;
            }
        }
        if let Some(completed) = self.completed {
            if todo.completed != completed {
                return false;
            }
        }
        true
    }
}

/// `term` must already be lowercased.
fn contains_folded(haystack: &str, term: &str) -> bool {
    haystack.to_lowercase().contains(term)
}

/// Result ordering for the list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// `created_at` descending.
    #[default]
    Newest,
    /// Priority ascending (low, medium, high), then newest first.
    Priority,
    /// Due date ascending with undated records last, then newest first.
    DueDate,
    /// Task text ascending, case-insensitive.
    Alphabetical,
}

impl SortOrder {
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("priority") => SortOrder::Priority,
            Some("dueDate") => SortOrder::DueDate,
            Some("alphabetical") => SortOrder::Alphabetical,
            _ => SortOrder::Newest,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Newest => "newest",
            SortOrder::Priority => "priority",
            SortOrder::DueDate => "dueDate",
            SortOrder::Alphabetical => "alphabetical",
        }
    }

    pub fn compare(self, a: &Todo, b: &Todo) -> Ordering {
        let newest = || b.created_at.cmp(&a.created_at);
        match self {
            SortOrder::Newest => newest(),
            SortOrder::Priority => a.priority.cmp(&b.priority).then_with(newest),
            SortOrder::DueDate => match (a.due_date, b.due_date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
            .then_with(newest),
            SortOrder::Alphabetical => a
                .task
                .to_lowercase()
                .cmp(&b.task.to_lowercase())
                .then_with(newest),
        }
    }

    pub fn sort(self, todos: &mut [Todo]) {
        todos.sort_by(|a, b| self.compare(a, b));
    }
}

/// Translates list parameters into a filter and an ordering.
pub fn build_query(params: &ListParams) -> (TodoFilter, SortOrder) {
    let filter = TodoFilter {
        search: present(&params.search).map(str::to_lowercase),
        priority: present(&params.priority)
            .filter(|p| *p != ALL)
            .map(str::to_string),
        category: present(&params.category)
            .filter(|c| *c != ALL)
            .map(str::to_lowercase),
        completed: match present(&params.status) {
            Some("completed") => Some(true),
            Some("pending") => Some(false),
            _ => None,
        },
    };
    (filter, SortOrder::from_param(present(&params.sort_by)))
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// The filter selections echoed back to the page, with defaults filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFilters {
    pub search: String,
    pub priority: String,
    pub category: String,
    pub status: String,
    pub sort_by: String,
}

impl Default for ListFilters {
    fn default() -> Self {
        Self {
            search: String::new(),
            priority: ALL.to_string(),
            category: ALL.to_string(),
            status: ALL.to_string(),
            sort_by: SortOrder::Newest.as_str().to_string(),
        }
    }
}

impl ListFilters {
    pub fn echo(params: &ListParams) -> Self {
        let defaults = Self::default();
        let or = |value: &Option<String>, fallback: String| {
            present(value).map(str::to_string).unwrap_or(fallback)
        };
        Self {
            search: or(&params.search, defaults.search),
            priority: or(&params.priority, defaults.priority),
            category: or(&params.category, defaults.category),
            status: or(&params.status, defaults.status),
            sort_by: or(&params.sort_by, defaults.sort_by),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Priority, TodoInput};
    use chrono::{Duration, NaiveDate, Utc};
    use rstest::rstest;

    fn todo(task: &str, priority: Priority, age_secs: i64) -> Todo {
        let fields = TodoInput {
            task: Some(task.to_string()),
            ..TodoInput::default()
        }
        .validate()
        .unwrap();
        let mut todo = Todo::new(fields, Utc::now() - Duration::seconds(age_secs));
        todo.priority = priority;
        todo
    }

    fn params(f: impl FnOnce(&mut ListParams)) -> ListParams {
        let mut p = ListParams::default();
        f(&mut p);
        p
    }

    #[test]
    fn empty_params_build_empty_filter() {
        let (filter, sort) = build_query(&ListParams::default());
        assert_eq!(filter, TodoFilter::default());
        assert_eq!(sort, SortOrder::Newest);
    }

    #[test]
    fn all_sentinel_and_blank_values_are_ignored() {
        let (filter, _) = build_query(&params(|p| {
            p.search = Some(String::new());
            p.priority = Some("all".into());
            p.category = Some("all".into());
            p.status = Some("all".into());
        }));
        assert_eq!(filter, TodoFilter::default());
    }

    #[rstest]
    #[case("completed", Some(true))]
    #[case("pending", Some(false))]
    #[case("done", None)]
    fn status_maps_to_completed_flag(#[case] status: &str, #[case] expected: Option<bool>) {
        let (filter, _) = build_query(&params(|p| p.status = Some(status.into())));
        assert_eq!(filter.completed, expected);
    }

    #[rstest]
    #[case("priority", SortOrder::Priority)]
    #[case("dueDate", SortOrder::DueDate)]
    #[case("alphabetical", SortOrder::Alphabetical)]
    #[case("newest", SortOrder::Newest)]
    #[case("bogus", SortOrder::Newest)]
    fn sort_selector(#[case] raw: &str, #[case] expected: SortOrder) {
        let (_, sort) = build_query(&params(|p| p.sort_by = Some(raw.into())));
        assert_eq!(sort, expected);
    }

    #[test]
    fn search_matches_task_description_or_tag_case_insensitively() {
        let (filter, _) = build_query(&params(|p| p.search = Some("MiLk".into())));

        let by_task = todo("Buy milk", Priority::Low, 0);
        let mut by_description = todo("Shopping", Priority::Low, 0);
        by_description.description = "Get MILK and eggs".into();
        let mut by_tag = todo("Errand", Priority::Low, 0);
        by_tag.tags = vec!["dairy".into(), "Milkman".into()];
        let miss = todo("Walk dog", Priority::Low, 0);

        assert!(filter.matches(&by_task));
        assert!(filter.matches(&by_description));
        assert!(filter.matches(&by_tag));
        assert!(!filter.matches(&miss));
    }

    #[test]
    fn search_treats_pattern_syntax_literally() {
        let (filter, _) = build_query(&params(|p| p.search = Some("(a+)+$".into())));
        assert!(!filter.matches(&todo("aaaaaaaaaaaaaaaaaaaaaaaaaaaa!", Priority::Low, 0)));
        assert!(filter.matches(&todo("regex (a+)+$ here", Priority::Low, 0)));
    }

    #[test]
    fn priority_filter_is_exact() {
        let (filter, _) = build_query(&params(|p| p.priority = Some("high".into())));
        assert!(filter.matches(&todo("a", Priority::High, 0)));
        assert!(!filter.matches(&todo("b", Priority::Medium, 0)));

        let (unknown, _) = build_query(&params(|p| p.priority = Some("urgent".into())));
        assert!(!unknown.matches(&todo("c", Priority::High, 0)));
    }

    #[test]
    fn category_filter_is_substring_case_insensitive() {
        let (filter, _) = build_query(&params(|p| p.category = Some("WORK".into())));
        let mut homework = todo("a", Priority::Low, 0);
        homework.category = "Homework".into();
        let mut none = todo("b", Priority::Low, 0);
        none.category = String::new();
        assert!(filter.matches(&homework));
        assert!(!filter.matches(&none));
    }

    #[test]
    fn filters_combine_with_and() {
        let (filter, _) = build_query(&params(|p| {
            p.search = Some("report".into());
            p.status = Some("pending".into());
        }));
        let mut done = todo("Write report", Priority::Low, 0);
        done.completed = true;
        assert!(!filter.matches(&done));
        assert!(filter.matches(&todo("Write report", Priority::Low, 0)));
    }

    #[test]
    fn priority_sort_is_ordinal() {
        let mut todos = vec![
            todo("h", Priority::High, 3),
            todo("l", Priority::Low, 2),
            todo("m", Priority::Medium, 1),
        ];
        SortOrder::Priority.sort(&mut todos);
        let order: Vec<_> = todos.iter().map(|t| t.priority).collect();
        assert_eq!(order, vec![Priority::Low, Priority::Medium, Priority::High]);
    }

    #[test]
    fn priority_sort_breaks_ties_newest_first() {
        let mut todos = vec![todo("old", Priority::Low, 100), todo("new", Priority::Low, 1)];
        SortOrder::Priority.sort(&mut todos);
        assert_eq!(todos[0].task, "new");
    }

    #[test]
    fn due_date_sort_puts_undated_last() {
        let mut undated = todo("undated", Priority::Low, 0);
        undated.due_date = None;
        let mut late = todo("late", Priority::Low, 0);
        late.due_date = NaiveDate::from_ymd_opt(2030, 1, 1);
        let mut soon = todo("soon", Priority::Low, 0);
        soon.due_date = NaiveDate::from_ymd_opt(2025, 1, 1);

        let mut todos = vec![undated, late, soon];
        SortOrder::DueDate.sort(&mut todos);
        let order: Vec<_> = todos.iter().map(|t| t.task.as_str()).collect();
        assert_eq!(order, vec!["soon", "late", "undated"]);
    }

    #[test]
    fn alphabetical_sort_ignores_case() {
        let mut todos = vec![
            todo("banana", Priority::Low, 0),
            todo("Apple", Priority::Low, 0),
            todo("cherry", Priority::Low, 0),
        ];
        SortOrder::Alphabetical.sort(&mut todos);
        let order: Vec<_> = todos.iter().map(|t| t.task.as_str()).collect();
        assert_eq!(order, vec!["Apple", "banana", "cherry"]);
    }

    #[test]
    fn newest_sort_is_created_at_descending() {
        let mut todos = vec![todo("old", Priority::Low, 50), todo("new", Priority::Low, 5)];
        SortOrder::Newest.sort(&mut todos);
        assert_eq!(todos[0].task, "new");
    }

    #[test]
    fn echo_fills_defaults() {
        assert_eq!(ListFilters::echo(&ListParams::default()), ListFilters::default());
        let echoed = ListFilters::echo(&params(|p| {
            p.search = Some("x".into());
            p.sort_by = Some("priority".into());
        }));
        assert_eq!(echoed.search, "x");
        assert_eq!(echoed.sort_by, "priority");
        assert_eq!(echoed.status, "all");
    }
}
