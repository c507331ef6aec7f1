//! # Core Traits (Ports)
//!
//! Any record-store plugin must implement these traits to be used by the
//! binary. The core hands every read a pre-built predicate/order/limit
//! triple; adapters only translate and execute.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::fields::TableField;
use crate::filter::predicate::{OrderBy, Predicate};
use crate::models::{
    NewPost, NewTask, NewView, Page, Post, PostStatus, Task, TaskPriority, TaskStatus, UpdatePost,
    UpdateTask, View, ViewChanges,
};

/// Saved views retained per table; inserting past this evicts the oldest.
pub const VIEW_CAPACITY: i64 = 10;

/// Data persistence contract for the posts table.
#[async_trait]
pub trait PostRepo: Send + Sync {
    /// Rows matching the predicate plus the total page count, resolved in a
    /// single transaction so the pager never disagrees with the rows.
    async fn fetch_page(
        &self,
        predicate: &Predicate,
        order: &OrderBy,
        limit: i64,
        offset: i64,
    ) -> Result<Page<Post>>;

    // Faceted counts for the filter builder
    async fn count_by_status(&self) -> Result<Vec<(PostStatus, i64)>>;
    async fn count_by_author(&self) -> Result<Vec<(String, i64)>>;
    async fn count_by_comments(&self) -> Result<Vec<(i32, i64)>>;

    async fn create(&self, new: NewPost) -> Result<Post>;
    async fn update(&self, id: Uuid, changes: UpdatePost) -> Result<()>;
    async fn update_many(&self, ids: &[Uuid], changes: UpdatePost) -> Result<()>;
    async fn delete(&self, id: Uuid) -> Result<()>;
    async fn delete_many(&self, ids: &[Uuid]) -> Result<()>;
}

/// Data persistence contract for the tasks table.
#[async_trait]
pub trait TaskRepo: Send + Sync {
    async fn fetch_page(
        &self,
        predicate: &Predicate,
        order: &OrderBy,
        limit: i64,
        offset: i64,
    ) -> Result<Page<Task>>;

    async fn count_by_status(&self) -> Result<Vec<(TaskStatus, i64)>>;
    async fn count_by_priority(&self) -> Result<Vec<(TaskPriority, i64)>>;

    async fn create(&self, new: NewTask) -> Result<Task>;
    async fn update(&self, id: Uuid, changes: UpdateTask) -> Result<()>;
    async fn update_many(&self, ids: &[Uuid], changes: UpdateTask) -> Result<()>;
    async fn delete(&self, id: Uuid) -> Result<()>;
    async fn delete_many(&self, ids: &[Uuid]) -> Result<()>;
}

/// Persistence contract for one entity's saved views.
#[async_trait]
pub trait ViewRepo<F: TableField>: Send + Sync {
    /// Inserts a view. Capacity eviction is part of the same transaction:
    /// when the insert pushes the count past [`VIEW_CAPACITY`], the oldest
    /// view other than the one just inserted is deleted. A duplicate name
    /// fails with [`crate::AppError::DuplicateName`] and changes nothing.
    async fn create(&self, new: NewView<F>) -> Result<View<F>>;

    async fn update(&self, id: Uuid, changes: ViewChanges<F>) -> Result<()>;
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// All views, newest first.
    async fn list(&self) -> Result<Vec<View<F>>>;
}
