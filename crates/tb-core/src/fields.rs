//! # Filter Fields
//!
//! Each table exposes a fixed, closed set of filterable attributes. The sets
//! are enums rather than string lookup tables so that an unknown key from a
//! URL or a stale persisted view resolves to `None` exactly once, at the
//! parse boundary, and is dropped there.

use serde::{Deserialize, Serialize};

/// Boolean combinator applied across the filters of one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOperator {
    #[default]
    And,
    Or,
}

impl LogicalOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOperator::And => "and",
            LogicalOperator::Or => "or",
        }
    }

    /// Anything that is not literally "or" collapses to the default.
    pub fn parse(s: &str) -> LogicalOperator {
        match s {
            "or" => LogicalOperator::Or,
            _ => LogicalOperator::And,
        }
    }
}

/// Contract every entity's filter-field enum fulfils.
///
/// `as_str` returns the wire name used in query strings and persisted views
/// (camelCase, matching the column ids the table UI uses); `column` returns
/// the SQL column the predicate builder targets.
pub trait TableField: Copy + Eq + std::fmt::Debug + Send + Sync + 'static {
    /// Every filterable field of the entity, in display order.
    const ALL: &'static [Self];

    /// Column ids visible by default when no view is selected.
    const DEFAULT_COLUMNS: &'static [&'static str];

    fn as_str(&self) -> &'static str;

    /// Closed allow-list check. Unknown keys yield `None`; callers decide
    /// whether that means "drop silently" (query strings, persisted views).
    fn parse(key: &str) -> Option<Self>;

    fn column(&self) -> &'static str;

    /// Categorical fields filter by membership rather than substring.
    fn is_selectable(&self) -> bool;

    /// Numeric fields filter by exact match rather than substring.
    fn is_numeric(&self) -> bool;

    /// Resolves a sort key ("createdAt", "title", ...) to a real column.
    /// Sort accepts a wider set than the filters do (identity and timestamp
    /// columns are sortable but not filterable).
    fn sort_column(key: &str) -> Option<&'static str>;
}

/// Filterable attributes of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostField {
    Title,
    AuthorName,
    Status,
    CommentsNumber,
}

impl TableField for PostField {
    const ALL: &'static [Self] = &[
        PostField::Title,
        PostField::AuthorName,
        PostField::Status,
        PostField::CommentsNumber,
    ];

    const DEFAULT_COLUMNS: &'static [&'static str] =
        &["title", "authorName", "status", "commentsNumber", "createdAt"];

    fn as_str(&self) -> &'static str {
        match self {
            PostField::Title => "title",
            PostField::AuthorName => "authorName",
            PostField::Status => "status",
            PostField::CommentsNumber => "commentsNumber",
        }
    }

    fn parse(key: &str) -> Option<Self> {
        match key {
            "title" => Some(PostField::Title),
            "authorName" => Some(PostField::AuthorName),
            "status" => Some(PostField::Status),
            "commentsNumber" => Some(PostField::CommentsNumber),
            _ => None,
        }
    }

    fn column(&self) -> &'static str {
        match self {
            PostField::Title => "title",
            PostField::AuthorName => "author_name",
            PostField::Status => "status",
            PostField::CommentsNumber => "comments_number",
        }
    }

    fn is_selectable(&self) -> bool {
        matches!(self, PostField::Status)
    }

    fn is_numeric(&self) -> bool {
        matches!(self, PostField::CommentsNumber)
    }

    fn sort_column(key: &str) -> Option<&'static str> {
        match key {
            "id" => Some("id"),
            "createdAt" => Some("created_at"),
            "updatedAt" => Some("updated_at"),
            other => PostField::parse(other).map(|f| f.column()),
        }
    }
}

/// Filterable attributes of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskField {
    Title,
    Status,
    Priority,
}

impl TableField for TaskField {
    const ALL: &'static [Self] = &[TaskField::Title, TaskField::Status, TaskField::Priority];

    const DEFAULT_COLUMNS: &'static [&'static str] =
        &["title", "status", "priority", "createdAt"];

    fn as_str(&self) -> &'static str {
        match self {
            TaskField::Title => "title",
            TaskField::Status => "status",
            TaskField::Priority => "priority",
        }
    }

    fn parse(key: &str) -> Option<Self> {
        match key {
            "title" => Some(TaskField::Title),
            "status" => Some(TaskField::Status),
            "priority" => Some(TaskField::Priority),
            _ => None,
        }
    }

    fn column(&self) -> &'static str {
        match self {
            TaskField::Title => "title",
            TaskField::Status => "status",
            TaskField::Priority => "priority",
        }
    }

    fn is_selectable(&self) -> bool {
        matches!(self, TaskField::Status | TaskField::Priority)
    }

    fn is_numeric(&self) -> bool {
        false
    }

    fn sort_column(key: &str) -> Option<&'static str> {
        match key {
            "id" => Some("id"),
            "code" => Some("code"),
            "createdAt" => Some("created_at"),
            "updatedAt" => Some("updated_at"),
            other => TaskField::parse(other).map(|f| f.column()),
        }
    }
}

/// Static description of one filterable field as offered by the filter
/// builder UI: display label plus the discrete choices, if any.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef<F> {
    pub field: F,
    pub label: &'static str,
    pub choices: &'static [&'static str],
}

/// Filter-builder registry for posts.
pub const POST_FIELD_DEFS: &[FieldDef<PostField>] = &[
    FieldDef { field: PostField::Title, label: "Title", choices: &[] },
    FieldDef { field: PostField::AuthorName, label: "Author", choices: &[] },
    FieldDef {
        field: PostField::Status,
        label: "Status",
        choices: &["draft", "published", "archived"],
    },
    FieldDef { field: PostField::CommentsNumber, label: "Comments", choices: &[] },
];

/// Filter-builder registry for tasks.
pub const TASK_FIELD_DEFS: &[FieldDef<TaskField>] = &[
    FieldDef { field: TaskField::Title, label: "Title", choices: &[] },
    FieldDef {
        field: TaskField::Status,
        label: "Status",
        choices: &["todo", "in-progress", "done", "canceled"],
    },
    FieldDef {
        field: TaskField::Priority,
        label: "Priority",
        choices: &["low", "medium", "high"],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_key_is_rejected() {
        assert_eq!(PostField::parse("priority"), None);
        assert_eq!(TaskField::parse("authorName"), None);
        assert_eq!(PostField::parse(""), None);
    }

    #[test]
    fn sort_accepts_timestamp_columns() {
        assert_eq!(PostField::sort_column("createdAt"), Some("created_at"));
        assert_eq!(PostField::sort_column("commentsNumber"), Some("comments_number"));
        assert_eq!(PostField::sort_column("nope"), None);
    }

    #[test]
    fn operator_defaults_to_and() {
        assert_eq!(LogicalOperator::parse("or"), LogicalOperator::Or);
        assert_eq!(LogicalOperator::parse("and"), LogicalOperator::And);
        assert_eq!(LogicalOperator::parse("xor"), LogicalOperator::And);
    }
}
