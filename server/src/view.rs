//! Server-rendered HTML for the list and edit pages.
//!
//! Pages implement `Display` and are rendered with `to_string()`. Every
//! value that originates from user input or the store goes through
//! `Escaped` before it reaches the output.

use std::fmt::{self, Display, Formatter};

use chrono::{DateTime, NaiveDate, Utc};
use todo_core::query::ALL;
use todo_core::{ListFilters, Priority, SortOrder, Todo, TodoListing};
use uuid::Uuid;

use crate::i18n::{localize_digits, to_jalali, Lang, Translations, JALALI_MONTHS};

/// HTML-escapes the wrapped text on display.
pub struct Escaped<'a>(pub &'a str);

impl Display for Escaped<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for ch in self.0.chars() {
            match ch {
                '&' => f.write_str("&amp;")?,
                '<' => f.write_str("&lt;")?,
                '>' => f.write_str("&gt;")?,
                '"' => f.write_str("&quot;")?,
                '\'' => f.write_str("&#39;")?,
                c => write!(f, "{c}")?,
            }
        }
        Ok(())
    }
}

/// Due dates: `Mar 09, 2024` in English, Jalali day, month name and year
/// in Persian.
pub fn format_date(date: NaiveDate, lang: Lang) -> String {
    match lang {
        Lang::En => date.format("%b %d, %Y").to_string(),
        Lang::Fa => {
            let (year, month, day) = to_jalali(date);
            let month = JALALI_MONTHS[month as usize - 1];
            localize_digits(&format!("{day} {month} {year}"), lang)
        }
    }
}

/// Coarse relative time, e.g. "3 hours ago".
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>, lang: Lang, tr: &Translations) -> String {
    let secs = (now - then).num_seconds().max(0);
    let (n, one, many) = match secs {
        0..=44 => return tr.t(lang, "secondsAgo").to_string(),
        45..=3599 => (secs / 60, "minuteAgo", "minutesAgo"),
        3600..=86_399 => (secs / 3600, "hourAgo", "hoursAgo"),
        86_400..=2_591_999 => (secs / 86_400, "dayAgo", "daysAgo"),
        2_592_000..=31_535_999 => (secs / 2_592_000, "monthAgo", "monthsAgo"),
        _ => (secs / 31_536_000, "yearAgo", "yearsAgo"),
    };
    match n.max(1) {
        1 => tr.t(lang, one).to_string(),
        n => tr.count(lang, many, n),
    }
}

/// Appends the language to a local URL when it is not the default.
fn localized(path: &str, lang: Lang) -> String {
    match lang {
        Lang::En => path.to_string(),
        other => format!("{path}?lang={}", other.code()),
    }
}

fn option(f: &mut Formatter<'_>, value: &str, label: &str, selected: &str) -> fmt::Result {
    let attr = if value == selected { " selected" } else { "" };
    write!(f, r#"<option value="{}"{attr}>{}</option>"#, Escaped(value), Escaped(label))
}

fn head(f: &mut Formatter<'_>, lang: Lang, tr: &Translations, title: &str) -> fmt::Result {
    write!(
        f,
        r#"<!DOCTYPE html><html lang="{}" dir="{}"><head><meta charset="utf-8">"#,
        lang.code(),
        lang.dir(),
    )?;
    write!(f, "<title>{}</title></head><body>", Escaped(tr.t(lang, title)))
}

/// A one-button form posting `field=<id>` to `action`.
fn post_button(
    f: &mut Formatter<'_>,
    action: &str,
    field: &str,
    id: Uuid,
    label: &str,
) -> fmt::Result {
    write!(f, r#"<form method="post" action="{action}">"#)?;
    write!(f, r#"<input type="hidden" name="{field}" value="{id}">"#)?;
    write!(f, r#"<button type="submit">{}</button></form>"#, Escaped(label))
}

fn priority_select(
    f: &mut Formatter<'_>,
    lang: Lang,
    tr: &Translations,
    selected: &str,
) -> fmt::Result {
    write!(f, r#"<select name="priority">"#)?;
    for priority in Priority::ALL {
        option(f, priority.as_str(), tr.t(lang, priority.as_str()), selected)?;
    }
    f.write_str("</select>")
}

/// The list page: flash messages, add form, filters, bulk form and todos.
pub struct ListPage<'a> {
    pub listing: &'a TodoListing,
    pub success: Option<&'a str>,
    pub error: Option<&'a str>,
    pub lang: Lang,
    pub tr: &'a Translations,
    pub now: DateTime<Utc>,
}

impl ListPage<'_> {
    fn flash(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (class, msg) in [("success", self.success), ("error", self.error)] {
            if let Some(msg) = msg {
                let text = self.tr.message(self.lang, msg);
                write!(f, r#"<p class="flash {class}">{}</p>"#, Escaped(&text))?;
            }
        }
        Ok(())
    }

    fn add_form(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let (lang, tr) = (self.lang, self.tr);
        write!(f, r#"<form class="add" method="post" action="{}">"#, localized("/", lang))?;
        write!(
            f,
            r#"<input name="task" required placeholder="{}">"#,
            Escaped(tr.t(lang, "taskPlaceholder"))
        )?;
        write!(
            f,
            r#"<textarea name="description" placeholder="{}"></textarea>"#,
            Escaped(tr.t(lang, "description"))
        )?;
        priority_select(f, lang, tr, Priority::default().as_str())?;
        write!(
            f,
            r#"<input name="category" placeholder="{}">"#,
            Escaped(tr.t(lang, "category"))
        )?;
        write!(
            f,
            r#"<input type="date" name="dueDate" aria-label="{}">"#,
            Escaped(tr.t(lang, "dueDate"))
        )?;
        write!(
            f,
            r#"<input name="tags" placeholder="{}">"#,
            Escaped(tr.t(lang, "tagsPlaceholder"))
        )?;
        write!(
            f,
            r#"<button type="submit">{}</button></form>"#,
            Escaped(tr.t(lang, "addTask"))
        )
    }

    fn filter_form(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let (lang, tr) = (self.lang, self.tr);
        let filters: &ListFilters = &self.listing.filters;
        f.write_str(r#"<form class="filters" method="get" action="/">"#)?;
        write!(
            f,
            r#"<input type="search" name="search" value="{}" placeholder="{}">"#,
            Escaped(&filters.search),
            Escaped(tr.t(lang, "searchPlaceholder"))
        )?;

        f.write_str(r#"<select name="priority">"#)?;
        option(f, ALL, tr.t(lang, "allPriorities"), &filters.priority)?;
        for priority in Priority::ALL {
            option(f, priority.as_str(), tr.t(lang, priority.as_str()), &filters.priority)?;
        }
        f.write_str("</select>")?;

        f.write_str(r#"<select name="category">"#)?;
        option(f, ALL, tr.t(lang, "allCategories"), &filters.category)?;
        for category in &self.listing.categories {
            option(f, category, category, &filters.category)?;
        }
        f.write_str("</select>")?;

        f.write_str(r#"<select name="status">"#)?;
        option(f, ALL, tr.t(lang, "allStatuses"), &filters.status)?;
        option(f, "pending", tr.t(lang, "pending"), &filters.status)?;
        option(f, "completed", tr.t(lang, "completed"), &filters.status)?;
        f.write_str("</select>")?;

        write!(f, r#"<select name="sortBy" aria-label="{}">"#, Escaped(tr.t(lang, "sortBy")))?;
        for sort in [
            SortOrder::Newest,
            SortOrder::Priority,
            SortOrder::DueDate,
            SortOrder::Alphabetical,
        ] {
            option(f, sort.as_str(), tr.t(lang, sort.as_str()), &filters.sort_by)?;
        }
        f.write_str("</select>")?;

        if lang != Lang::En {
            write!(f, r#"<input type="hidden" name="lang" value="{}">"#, lang.code())?;
        }
        write!(f, r#"<button type="submit">{}</button></form>"#, Escaped(tr.t(lang, "filter")))
    }

    fn bulk_form(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let (lang, tr) = (self.lang, self.tr);
        write!(
            f,
            r#"<form id="bulk" class="bulk" method="post" action="{}">"#,
            localized("/todo/bulk", lang)
        )?;
        write!(
            f,
            r#"<select name="action" aria-label="{}">"#,
            Escaped(tr.t(lang, "bulkActions"))
        )?;
        for (value, key) in [
            ("complete", "markComplete"),
            ("incomplete", "markIncomplete"),
            ("delete", "deleteSelected"),
            ("deleteCompleted", "deleteCompleted"),
        ] {
            option(f, value, tr.t(lang, key), "")?;
        }
        write!(
            f,
            r#"</select><button type="submit">{}</button></form>"#,
            Escaped(tr.t(lang, "apply"))
        )
    }

    fn todo_item(&self, f: &mut Formatter<'_>, todo: &Todo) -> fmt::Result {
        let (lang, tr) = (self.lang, self.tr);
        let state = if todo.completed { "completed" } else { "pending" };
        write!(f, r#"<li class="todo {state} priority-{}">"#, todo.priority)?;
        write!(
            f,
            r#"<input type="checkbox" form="bulk" name="taskIds" value="{}">"#,
            todo.id
        )?;
        write!(
            f,
            r#"<span class="task">{}</span><span class="priority">{}</span>"#,
            Escaped(&todo.task),
            Escaped(tr.t(lang, todo.priority.as_str()))
        )?;
        if !todo.description.is_empty() {
            write!(f, r#"<p class="description">{}</p>"#, Escaped(&todo.description))?;
        }
        if !todo.category.is_empty() {
            write!(f, r#"<span class="category">{}</span>"#, Escaped(&todo.category))?;
        }
        for tag in &todo.tags {
            write!(f, r#"<span class="tag">{}</span>"#, Escaped(tag))?;
        }
        if let Some(due) = todo.due_date {
            write!(
                f,
                r#"<span class="due">{}: {}</span>"#,
                Escaped(tr.t(lang, "due")),
                format_date(due, lang)
            )?;
        }
        write!(
            f,
            r#"<time datetime="{}">{}</time>"#,
            todo.created_at.to_rfc3339(),
            Escaped(&time_ago(todo.created_at, self.now, lang, tr))
        )?;
        post_button(
            f,
            &localized("/todo/toggle", lang),
            "_id",
            todo.id,
            tr.t(lang, "toggle"),
        )?;
        write!(
            f,
            r#"<a href="{}">{}</a>"#,
            localized(&format!("/todo/edit/{}", todo.id), lang),
            Escaped(tr.t(lang, "edit"))
        )?;
        post_button(
            f,
            &localized("/todo/destroy", lang),
            "_key",
            todo.id,
            tr.t(lang, "delete"),
        )?;
        f.write_str("</li>")
    }
}

impl Display for ListPage<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let (lang, tr) = (self.lang, self.tr);
        head(f, lang, tr, "title")?;
        write!(f, "<header><h1>{}</h1><nav>", Escaped(tr.t(lang, "title")))?;
        f.write_str(r#"<a href="/?lang=en">English</a> <a href="/?lang=fa">فارسی</a>"#)?;
        f.write_str("</nav></header>")?;
        self.flash(f)?;
        self.add_form(f)?;
        self.filter_form(f)?;
        self.bulk_form(f)?;
        if self.listing.todos.is_empty() {
            write!(f, r#"<p class="empty">{}</p>"#, Escaped(tr.t(lang, "noTasks")))?;
        } else {
            f.write_str(r#"<ul class="todos">"#)?;
            for todo in &self.listing.todos {
                self.todo_item(f, todo)?;
            }
            f.write_str("</ul>")?;
        }
        f.write_str("</body></html>")
    }
}

/// The edit form for a single todo.
pub struct EditPage<'a> {
    pub todo: &'a Todo,
    pub lang: Lang,
    pub tr: &'a Translations,
}

impl Display for EditPage<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let (lang, tr, todo) = (self.lang, self.tr, self.todo);
        head(f, lang, tr, "editTask")?;
        write!(f, "<h1>{}</h1>", Escaped(tr.t(lang, "editTask")))?;
        write!(
            f,
            r#"<form class="edit" method="post" action="{}">"#,
            localized("/todo/update", lang)
        )?;
        write!(f, r#"<input type="hidden" name="_id" value="{}">"#, todo.id)?;
        write!(f, r#"<input name="task" required value="{}">"#, Escaped(&todo.task))?;
        write!(f, r#"<textarea name="description">{}</textarea>"#, Escaped(&todo.description))?;
        priority_select(f, lang, tr, todo.priority.as_str())?;
        write!(f, r#"<input name="category" value="{}">"#, Escaped(&todo.category))?;
        let due = todo.due_date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();
        write!(f, r#"<input type="date" name="dueDate" value="{due}">"#)?;
        write!(f, r#"<input name="tags" value="{}">"#, Escaped(&todo.tags.join(", ")))?;
        write!(
            f,
            r#"<button type="submit">{}</button><a href="{}">{}</a></form></body></html>"#,
            Escaped(tr.t(lang, "save")),
            localized("/", lang),
            Escaped(tr.t(lang, "cancel"))
        )
    }
}
