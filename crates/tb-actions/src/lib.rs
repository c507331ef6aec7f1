//! # tb-actions
//!
//! The operation boundary between the view layer and the record store.
//! Every mutation returns an [`ActionResult`]: a `{data, error}` pair that
//! never panics and never lets a store fault propagate upward. Reads fail
//! closed instead — on any query error the caller gets an empty, renderable
//! result rather than an error at all.

use serde::Serialize;
use tb_core::error::AppError;
use tb_core::fields::TableField;
use tb_core::filter::predicate::SearchQuery;
use tb_core::models::{
    NewPost, NewTask, NewView, Page, Post, PostStatus, Task, TaskPriority, TaskStatus, UpdatePost,
    UpdateTask, View, ViewChanges,
};
use tb_core::traits::{PostRepo, TaskRepo, ViewRepo};
use uuid::Uuid;

/// Outcome of one mutation as the UI layer sees it: either `data` or a
/// human-readable `error`, never both, never a fault.
#[derive(Debug, Clone, Serialize)]
pub struct ActionResult<T> {
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ActionResult<T> {
    pub fn ok(data: T) -> Self {
        ActionResult { data: Some(data), error: None }
    }

    pub fn err(message: impl Into<String>) -> Self {
        ActionResult { data: None, error: Some(message.into()) }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

impl<T> From<tb_core::error::Result<T>> for ActionResult<T> {
    fn from(result: tb_core::error::Result<T>) -> Self {
        match result {
            Ok(data) => ActionResult::ok(data),
            Err(err) => ActionResult::err(error_message(err)),
        }
    }
}

/// Maps an operation failure to the message the UI shows. Only duplicate
/// view names and validation problems surface their specifics; everything
/// else collapses to a generic message after being logged.
fn error_message(err: AppError) -> String {
    match err {
        AppError::DuplicateName(name) => {
            format!("A view with the name \"{name}\" already exists")
        }
        AppError::Validation(message) => message,
        other => {
            log::error!("operation failed: {other}");
            "Something went wrong. Please try again.".to_string()
        }
    }
}

// ── Post queries (fail closed) ──────────────────────────────────────────────

pub async fn get_posts(
    repo: &dyn PostRepo,
    query: &SearchQuery<tb_core::fields::PostField>,
) -> Page<Post> {
    repo.fetch_page(&query.predicate(), &query.order_by(), query.limit(), query.offset())
        .await
        .unwrap_or_else(|err| {
            log::error!("post search failed: {err}");
            Page::default()
        })
}

pub async fn get_post_count_by_status(repo: &dyn PostRepo) -> Vec<(PostStatus, i64)> {
    repo.count_by_status().await.unwrap_or_default()
}

pub async fn get_post_count_by_author(repo: &dyn PostRepo) -> Vec<(String, i64)> {
    repo.count_by_author().await.unwrap_or_default()
}

pub async fn get_post_count_by_comments(repo: &dyn PostRepo) -> Vec<(i32, i64)> {
    repo.count_by_comments().await.unwrap_or_default()
}

// ── Post mutations ──────────────────────────────────────────────────────────

pub async fn create_post(repo: &dyn PostRepo, input: NewPost) -> ActionResult<Post> {
    repo.create(input).await.into()
}

pub async fn update_post(repo: &dyn PostRepo, id: Uuid, input: UpdatePost) -> ActionResult<()> {
    repo.update(id, input).await.into()
}

pub async fn update_posts(
    repo: &dyn PostRepo,
    ids: &[Uuid],
    input: UpdatePost,
) -> ActionResult<()> {
    repo.update_many(ids, input).await.into()
}

pub async fn delete_post(repo: &dyn PostRepo, id: Uuid) -> ActionResult<()> {
    repo.delete(id).await.into()
}

pub async fn delete_posts(repo: &dyn PostRepo, ids: &[Uuid]) -> ActionResult<()> {
    repo.delete_many(ids).await.into()
}

// ── Task queries and mutations ──────────────────────────────────────────────

pub async fn get_tasks(
    repo: &dyn TaskRepo,
    query: &SearchQuery<tb_core::fields::TaskField>,
) -> Page<Task> {
    repo.fetch_page(&query.predicate(), &query.order_by(), query.limit(), query.offset())
        .await
        .unwrap_or_else(|err| {
            log::error!("task search failed: {err}");
            Page::default()
        })
}

pub async fn get_task_count_by_status(repo: &dyn TaskRepo) -> Vec<(TaskStatus, i64)> {
    repo.count_by_status().await.unwrap_or_default()
}

pub async fn get_task_count_by_priority(repo: &dyn TaskRepo) -> Vec<(TaskPriority, i64)> {
    repo.count_by_priority().await.unwrap_or_default()
}

pub async fn create_task(repo: &dyn TaskRepo, input: NewTask) -> ActionResult<Task> {
    repo.create(input).await.into()
}

pub async fn update_task(repo: &dyn TaskRepo, id: Uuid, input: UpdateTask) -> ActionResult<()> {
    repo.update(id, input).await.into()
}

pub async fn update_tasks(
    repo: &dyn TaskRepo,
    ids: &[Uuid],
    input: UpdateTask,
) -> ActionResult<()> {
    repo.update_many(ids, input).await.into()
}

pub async fn delete_task(repo: &dyn TaskRepo, id: Uuid) -> ActionResult<()> {
    repo.delete(id).await.into()
}

pub async fn delete_tasks(repo: &dyn TaskRepo, ids: &[Uuid]) -> ActionResult<()> {
    repo.delete_many(ids).await.into()
}

// ── Saved views ─────────────────────────────────────────────────────────────

pub async fn get_views<F: TableField>(repo: &dyn ViewRepo<F>) -> Vec<View<F>> {
    repo.list().await.unwrap_or_else(|err| {
        log::error!("view listing failed: {err}");
        Vec::new()
    })
}

pub async fn create_view<F: TableField>(
    repo: &dyn ViewRepo<F>,
    input: NewView<F>,
) -> ActionResult<View<F>> {
    repo.create(input).await.into()
}

pub async fn update_view<F: TableField>(
    repo: &dyn ViewRepo<F>,
    id: Uuid,
    input: ViewChanges<F>,
) -> ActionResult<()> {
    repo.update(id, input).await.into()
}

pub async fn delete_view<F: TableField>(repo: &dyn ViewRepo<F>, id: Uuid) -> ActionResult<()> {
    repo.delete(id).await.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tb_core::fields::PostField;
    use tb_core::filter::predicate::{OrderBy, Predicate};
    use tb_db_sqlite::{connect, SqlitePostRepo, SqliteViewRepo};

    /// A repo whose backing store is unreachable.
    struct BrokenPostRepo;

    #[async_trait]
    impl PostRepo for BrokenPostRepo {
        async fn fetch_page(
            &self,
            _: &Predicate,
            _: &OrderBy,
            _: i64,
            _: i64,
        ) -> tb_core::error::Result<Page<Post>> {
            Err(AppError::Internal("connection refused".into()))
        }
        async fn count_by_status(&self) -> tb_core::error::Result<Vec<(PostStatus, i64)>> {
            Err(AppError::Internal("connection refused".into()))
        }
        async fn count_by_author(&self) -> tb_core::error::Result<Vec<(String, i64)>> {
            Err(AppError::Internal("connection refused".into()))
        }
        async fn count_by_comments(&self) -> tb_core::error::Result<Vec<(i32, i64)>> {
            Err(AppError::Internal("connection refused".into()))
        }
        async fn create(&self, _: NewPost) -> tb_core::error::Result<Post> {
            Err(AppError::Internal("connection refused".into()))
        }
        async fn update(&self, _: Uuid, _: UpdatePost) -> tb_core::error::Result<()> {
            Err(AppError::Internal("connection refused".into()))
        }
        async fn update_many(&self, _: &[Uuid], _: UpdatePost) -> tb_core::error::Result<()> {
            Err(AppError::Internal("connection refused".into()))
        }
        async fn delete(&self, _: Uuid) -> tb_core::error::Result<()> {
            Err(AppError::Internal("connection refused".into()))
        }
        async fn delete_many(&self, _: &[Uuid]) -> tb_core::error::Result<()> {
            Err(AppError::Internal("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn reads_fail_closed() {
        let repo = BrokenPostRepo;
        let page = get_posts(&repo, &SearchQuery::<PostField>::default()).await;
        assert!(page.data.is_empty());
        assert_eq!(page.page_count, 0);
        assert!(get_post_count_by_status(&repo).await.is_empty());
    }

    #[tokio::test]
    async fn mutations_report_generic_errors() {
        let repo = BrokenPostRepo;
        let result = delete_post(&repo, Uuid::new_v4()).await;
        assert!(result.data.is_none());
        assert_eq!(result.error.as_deref(), Some("Something went wrong. Please try again."));
    }

    #[tokio::test]
    async fn duplicate_view_name_surfaces_targeted_message() {
        let pool = connect("sqlite::memory:").await.unwrap();
        let repo = SqliteViewRepo::posts(pool);

        let first = create_view(
            &repo,
            NewView { name: "weekly".into(), columns: None, filter_params: None },
        )
        .await;
        assert!(first.is_ok());

        let second = create_view(
            &repo,
            NewView { name: "weekly".into(), columns: None, filter_params: None },
        )
        .await;
        assert_eq!(
            second.error.as_deref(),
            Some("A view with the name \"weekly\" already exists")
        );
    }

    #[tokio::test]
    async fn create_and_search_round_trip() {
        let pool = connect("sqlite::memory:").await.unwrap();
        let repo = SqlitePostRepo::new(pool);

        let created = create_post(
            &repo,
            NewPost {
                title: "Kickoff".into(),
                status: PostStatus::Draft,
                author_name: "alice".into(),
                comments_number: 1,
            },
        )
        .await;
        assert!(created.is_ok());

        let query = SearchQuery::<PostField> {
            filters: vec![(PostField::Title, "kick~contains".to_string())],
            ..SearchQuery::default()
        };
        let page = get_posts(&repo, &query).await;
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].title, "Kickoff");
    }
}
