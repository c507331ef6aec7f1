//! # Domain Models
//!
//! These structs represent the core entities of Tabula. We use UUID v7 for
//! time-ordered, globally unique identification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::fields::TableField;
use crate::filter::params::FilterParams;

/// Lifecycle state of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl PostStatus {
    pub const ALL: &'static [Self] =
        &[PostStatus::Draft, PostStatus::Published, PostStatus::Archived];

    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
            PostStatus::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(PostStatus::Draft),
            "published" => Some(PostStatus::Published),
            "archived" => Some(PostStatus::Archived),
            _ => None,
        }
    }
}

/// A row of the posts table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub status: PostStatus,
    #[serde(rename = "authorName")]
    pub author_name: String,
    #[serde(rename = "commentsNumber")]
    pub comments_number: i32,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub status: PostStatus,
    #[serde(rename = "authorName")]
    pub author_name: String,
    #[serde(rename = "commentsNumber")]
    pub comments_number: i32,
}

/// Partial update for a post. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePost {
    pub title: Option<String>,
    pub status: Option<PostStatus>,
    #[serde(rename = "authorName")]
    pub author_name: Option<String>,
    #[serde(rename = "commentsNumber")]
    pub comments_number: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
    Canceled,
}

impl TaskStatus {
    pub const ALL: &'static [Self] = &[
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Done,
        TaskStatus::Canceled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Done => "done",
            TaskStatus::Canceled => "canceled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "todo" => Some(TaskStatus::Todo),
            "in-progress" => Some(TaskStatus::InProgress),
            "done" => Some(TaskStatus::Done),
            "canceled" => Some(TaskStatus::Canceled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskLabel {
    #[default]
    Bug,
    Feature,
    Enhancement,
    Documentation,
}

impl TaskLabel {
    pub const ALL: &'static [Self] = &[
        TaskLabel::Bug,
        TaskLabel::Feature,
        TaskLabel::Enhancement,
        TaskLabel::Documentation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskLabel::Bug => "bug",
            TaskLabel::Feature => "feature",
            TaskLabel::Enhancement => "enhancement",
            TaskLabel::Documentation => "documentation",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bug" => Some(TaskLabel::Bug),
            "feature" => Some(TaskLabel::Feature),
            "enhancement" => Some(TaskLabel::Enhancement),
            "documentation" => Some(TaskLabel::Documentation),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    #[default]
    Low,
    Medium,
    High,
}

impl TaskPriority {
    pub const ALL: &'static [Self] =
        &[TaskPriority::Low, TaskPriority::Medium, TaskPriority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(TaskPriority::Low),
            "medium" => Some(TaskPriority::Medium),
            "high" => Some(TaskPriority::High),
            _ => None,
        }
    }
}

/// A row of the tasks table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    /// Human-readable ticket code, e.g. "TASK-7421"
    pub code: String,
    pub title: Option<String>,
    pub status: TaskStatus,
    pub label: TaskLabel,
    pub priority: TaskPriority,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub code: String,
    pub title: Option<String>,
    pub status: TaskStatus,
    pub label: TaskLabel,
    pub priority: TaskPriority,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub status: Option<TaskStatus>,
    pub label: Option<TaskLabel>,
    pub priority: Option<TaskPriority>,
}

/// A named, persisted snapshot of column visibility + filter/sort state.
///
/// Views are owned by the persistence store; callers read them and issue new
/// persistence operations, never mutate one in place.
#[derive(Debug, Clone, PartialEq)]
pub struct View<F: TableField> {
    pub id: Uuid,
    pub name: String,
    /// Column ids visible under this view. `None` means the view never
    /// captured a column selection.
    pub columns: Option<Vec<String>>,
    pub filter_params: Option<FilterParams<F>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a view.
#[derive(Debug, Clone)]
pub struct NewView<F: TableField> {
    pub name: String,
    pub columns: Option<Vec<String>>,
    pub filter_params: Option<FilterParams<F>>,
}

/// Update payload for a view. `None` fields are left untouched.
#[derive(Debug, Clone)]
pub struct ViewChanges<F: TableField> {
    pub name: Option<String>,
    pub columns: Option<Vec<String>>,
    pub filter_params: Option<FilterParams<F>>,
}

impl<F: TableField> Default for ViewChanges<F> {
    fn default() -> Self {
        ViewChanges { name: None, columns: None, filter_params: None }
    }
}

/// One page of query results plus the total page count for the pager.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(rename = "pageCount")]
    pub page_count: i64,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Page { data: Vec::new(), page_count: 0 }
    }
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: i64, per_page: i64) -> Self {
        let page_count = if per_page > 0 {
            (total + per_page - 1) / per_page
        } else {
            0
        };
        Page { data, page_count }
    }
}
