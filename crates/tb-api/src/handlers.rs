//! # tb-api Handlers
//!
//! This module coordinates the flow between HTTP requests and the core
//! ports. List endpoints parse the query-string contract (field tokens,
//! `operator`, `sort`, paging, `viewId`) into a `SearchQuery`; mutation
//! endpoints forward to the action boundary and always answer 200 with the
//! `{data, error}` shape.

use actix_web::{web, HttpResponse, Responder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tb_core::fields::{LogicalOperator, PostField, TableField, TaskField};
use tb_core::filter::params::FilterParams;
use tb_core::filter::predicate::SearchQuery;
use tb_core::models::{NewPost, NewTask, NewView, UpdatePost, UpdateTask, View, ViewChanges};
use tb_core::traits::{PostRepo, TaskRepo, ViewRepo};
use uuid::Uuid;

/// State shared across all Actix-web workers.
pub struct AppState {
    pub posts: Box<dyn PostRepo>,
    pub tasks: Box<dyn TaskRepo>,
    pub post_views: Box<dyn ViewRepo<PostField>>,
    pub task_views: Box<dyn ViewRepo<TaskField>>,
}

fn clamp_page(value: Option<i64>, default: i64) -> i64 {
    value.unwrap_or(default).max(1)
}

/// Raw list-request parameters for the posts table.
#[derive(Debug, Deserialize)]
pub struct PostListParams {
    page: Option<i64>,
    per_page: Option<i64>,
    sort: Option<String>,
    title: Option<String>,
    status: Option<String>,
    #[serde(rename = "authorName")]
    author_name: Option<String>,
    #[serde(rename = "commentsNumber")]
    comments_number: Option<String>,
    from: Option<String>,
    to: Option<String>,
    operator: Option<String>,
    #[serde(rename = "viewId")]
    view_id: Option<String>,
}

impl PostListParams {
    /// Pagination is clamped here; the predicate builder trusts its input.
    fn into_query(self) -> SearchQuery<PostField> {
        let mut filters = Vec::new();
        if let Some(value) = self.title {
            filters.push((PostField::Title, value));
        }
        if let Some(value) = self.status {
            filters.push((PostField::Status, value));
        }
        if let Some(value) = self.author_name {
            filters.push((PostField::AuthorName, value));
        }
        if let Some(value) = self.comments_number {
            filters.push((PostField::CommentsNumber, value));
        }

        SearchQuery {
            page: clamp_page(self.page, 1),
            per_page: clamp_page(self.per_page, tb_core::filter::params::DEFAULT_PER_PAGE),
            sort: self.sort,
            operator: self
                .operator
                .as_deref()
                .map(LogicalOperator::parse)
                .unwrap_or_default(),
            from: self.from,
            to: self.to,
            view_id: self.view_id.and_then(|raw| Uuid::parse_str(&raw).ok()),
            filters,
        }
    }
}

/// Raw list-request parameters for the tasks table.
#[derive(Debug, Deserialize)]
pub struct TaskListParams {
    page: Option<i64>,
    per_page: Option<i64>,
    sort: Option<String>,
    title: Option<String>,
    status: Option<String>,
    priority: Option<String>,
    from: Option<String>,
    to: Option<String>,
    operator: Option<String>,
    #[serde(rename = "viewId")]
    view_id: Option<String>,
}

impl TaskListParams {
    fn into_query(self) -> SearchQuery<TaskField> {
        let mut filters = Vec::new();
        if let Some(value) = self.title {
            filters.push((TaskField::Title, value));
        }
        if let Some(value) = self.status {
            filters.push((TaskField::Status, value));
        }
        if let Some(value) = self.priority {
            filters.push((TaskField::Priority, value));
        }

        SearchQuery {
            page: clamp_page(self.page, 1),
            per_page: clamp_page(self.per_page, tb_core::filter::params::DEFAULT_PER_PAGE),
            sort: self.sort,
            operator: self
                .operator
                .as_deref()
                .map(LogicalOperator::parse)
                .unwrap_or_default(),
            from: self.from,
            to: self.to,
            view_id: self.view_id.and_then(|raw| Uuid::parse_str(&raw).ok()),
            filters,
        }
    }
}

/// Wire shape of a saved view.
#[derive(Debug, Serialize)]
pub struct ViewDto {
    pub id: Uuid,
    pub name: String,
    pub columns: Option<Vec<String>>,
    #[serde(rename = "filterParams")]
    pub filter_params: Option<serde_json::Value>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl<F: TableField> From<View<F>> for ViewDto {
    fn from(view: View<F>) -> Self {
        ViewDto {
            id: view.id,
            name: view.name,
            columns: view.columns,
            filter_params: view.filter_params.as_ref().map(|p| p.to_json()),
            created_at: view.created_at,
            updated_at: view.updated_at,
        }
    }
}

/// Create/update payload for a saved view. `filterParams` arrives as loose
/// JSON and is narrowed permissively against the entity's field set.
#[derive(Debug, Deserialize)]
pub struct ViewPayload {
    pub name: Option<String>,
    pub columns: Option<Vec<String>>,
    #[serde(rename = "filterParams")]
    pub filter_params: Option<serde_json::Value>,
}

impl ViewPayload {
    fn new_view<F: TableField>(self) -> NewView<F> {
        NewView {
            name: self.name.unwrap_or_default(),
            columns: self.columns,
            filter_params: self.filter_params.as_ref().map(FilterParams::from_json),
        }
    }

    fn changes<F: TableField>(self) -> ViewChanges<F> {
        ViewChanges {
            name: self.name,
            columns: self.columns,
            filter_params: self.filter_params.as_ref().map(FilterParams::from_json),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct IdsPayload {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct BulkUpdatePosts {
    pub ids: Vec<Uuid>,
    pub changes: UpdatePost,
}

#[derive(Debug, Deserialize)]
pub struct BulkUpdateTasks {
    pub ids: Vec<Uuid>,
    pub changes: UpdateTask,
}

// ── Posts ───────────────────────────────────────────────────────────────────

pub async fn list_posts(
    data: web::Data<AppState>,
    params: web::Query<PostListParams>,
) -> impl Responder {
    let query = params.into_inner().into_query();
    let page = tb_actions::get_posts(data.posts.as_ref(), &query).await;
    HttpResponse::Ok().json(page)
}

pub async fn post_status_counts(data: web::Data<AppState>) -> impl Responder {
    let counts = tb_actions::get_post_count_by_status(data.posts.as_ref()).await;
    HttpResponse::Ok().json(counts)
}

pub async fn post_author_counts(data: web::Data<AppState>) -> impl Responder {
    let counts = tb_actions::get_post_count_by_author(data.posts.as_ref()).await;
    HttpResponse::Ok().json(counts)
}

pub async fn post_comment_counts(data: web::Data<AppState>) -> impl Responder {
    let counts = tb_actions::get_post_count_by_comments(data.posts.as_ref()).await;
    HttpResponse::Ok().json(counts)
}

pub async fn create_post(
    data: web::Data<AppState>,
    input: web::Json<NewPost>,
) -> impl Responder {
    let result = tb_actions::create_post(data.posts.as_ref(), input.into_inner()).await;
    HttpResponse::Ok().json(result)
}

pub async fn update_post(
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
    input: web::Json<UpdatePost>,
) -> impl Responder {
    let result =
        tb_actions::update_post(data.posts.as_ref(), path.into_inner(), input.into_inner()).await;
    HttpResponse::Ok().json(result)
}

pub async fn update_posts(
    data: web::Data<AppState>,
    input: web::Json<BulkUpdatePosts>,
) -> impl Responder {
    let input = input.into_inner();
    let result = tb_actions::update_posts(data.posts.as_ref(), &input.ids, input.changes).await;
    HttpResponse::Ok().json(result)
}

pub async fn delete_post(data: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    let result = tb_actions::delete_post(data.posts.as_ref(), path.into_inner()).await;
    HttpResponse::Ok().json(result)
}

pub async fn delete_posts(
    data: web::Data<AppState>,
    input: web::Json<IdsPayload>,
) -> impl Responder {
    let result = tb_actions::delete_posts(data.posts.as_ref(), &input.ids).await;
    HttpResponse::Ok().json(result)
}

pub async fn list_post_views(data: web::Data<AppState>) -> impl Responder {
    let views = tb_actions::get_views(data.post_views.as_ref()).await;
    let dtos: Vec<ViewDto> = views.into_iter().map(ViewDto::from).collect();
    HttpResponse::Ok().json(dtos)
}

pub async fn create_post_view(
    data: web::Data<AppState>,
    input: web::Json<ViewPayload>,
) -> impl Responder {
    let result =
        tb_actions::create_view(data.post_views.as_ref(), input.into_inner().new_view()).await;
    HttpResponse::Ok().json(tb_actions::ActionResult {
        data: result.data.map(ViewDto::from),
        error: result.error,
    })
}

pub async fn update_post_view(
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
    input: web::Json<ViewPayload>,
) -> impl Responder {
    let result = tb_actions::update_view(
        data.post_views.as_ref(),
        path.into_inner(),
        input.into_inner().changes(),
    )
    .await;
    HttpResponse::Ok().json(result)
}

pub async fn delete_post_view(
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let result = tb_actions::delete_view(data.post_views.as_ref(), path.into_inner()).await;
    HttpResponse::Ok().json(result)
}

// ── Tasks ───────────────────────────────────────────────────────────────────

pub async fn list_tasks(
    data: web::Data<AppState>,
    params: web::Query<TaskListParams>,
) -> impl Responder {
    let query = params.into_inner().into_query();
    let page = tb_actions::get_tasks(data.tasks.as_ref(), &query).await;
    HttpResponse::Ok().json(page)
}

pub async fn task_status_counts(data: web::Data<AppState>) -> impl Responder {
    let counts = tb_actions::get_task_count_by_status(data.tasks.as_ref()).await;
    HttpResponse::Ok().json(counts)
}

pub async fn task_priority_counts(data: web::Data<AppState>) -> impl Responder {
    let counts = tb_actions::get_task_count_by_priority(data.tasks.as_ref()).await;
    HttpResponse::Ok().json(counts)
}

pub async fn create_task(
    data: web::Data<AppState>,
    input: web::Json<NewTask>,
) -> impl Responder {
    let result = tb_actions::create_task(data.tasks.as_ref(), input.into_inner()).await;
    HttpResponse::Ok().json(result)
}

pub async fn update_task(
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
    input: web::Json<UpdateTask>,
) -> impl Responder {
    let result =
        tb_actions::update_task(data.tasks.as_ref(), path.into_inner(), input.into_inner()).await;
    HttpResponse::Ok().json(result)
}

pub async fn update_tasks(
    data: web::Data<AppState>,
    input: web::Json<BulkUpdateTasks>,
) -> impl Responder {
    let input = input.into_inner();
    let result = tb_actions::update_tasks(data.tasks.as_ref(), &input.ids, input.changes).await;
    HttpResponse::Ok().json(result)
}

pub async fn delete_task(data: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    let result = tb_actions::delete_task(data.tasks.as_ref(), path.into_inner()).await;
    HttpResponse::Ok().json(result)
}

pub async fn delete_tasks(
    data: web::Data<AppState>,
    input: web::Json<IdsPayload>,
) -> impl Responder {
    let result = tb_actions::delete_tasks(data.tasks.as_ref(), &input.ids).await;
    HttpResponse::Ok().json(result)
}

pub async fn list_task_views(data: web::Data<AppState>) -> impl Responder {
    let views = tb_actions::get_views(data.task_views.as_ref()).await;
    let dtos: Vec<ViewDto> = views.into_iter().map(ViewDto::from).collect();
    HttpResponse::Ok().json(dtos)
}

pub async fn create_task_view(
    data: web::Data<AppState>,
    input: web::Json<ViewPayload>,
) -> impl Responder {
    let result =
        tb_actions::create_view(data.task_views.as_ref(), input.into_inner().new_view()).await;
    HttpResponse::Ok().json(tb_actions::ActionResult {
        data: result.data.map(ViewDto::from),
        error: result.error,
    })
}

pub async fn update_task_view(
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
    input: web::Json<ViewPayload>,
) -> impl Responder {
    let result = tb_actions::update_view(
        data.task_views.as_ref(),
        path.into_inner(),
        input.into_inner().changes(),
    )
    .await;
    HttpResponse::Ok().json(result)
}

pub async fn delete_task_view(
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let result = tb_actions::delete_view(data.task_views.as_ref(), path.into_inner()).await;
    HttpResponse::Ok().json(result)
}

/// Registers every route under the service config.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/posts")
            .route("", web::get().to(list_posts))
            .route("", web::post().to(create_post))
            .route("", web::patch().to(update_posts))
            .route("", web::delete().to(delete_posts))
            .route("/counts/status", web::get().to(post_status_counts))
            .route("/counts/author", web::get().to(post_author_counts))
            .route("/counts/comments", web::get().to(post_comment_counts))
            .route("/views", web::get().to(list_post_views))
            .route("/views", web::post().to(create_post_view))
            .route("/views/{id}", web::patch().to(update_post_view))
            .route("/views/{id}", web::delete().to(delete_post_view))
            .route("/{id}", web::patch().to(update_post))
            .route("/{id}", web::delete().to(delete_post)),
    )
    .service(
        web::scope("/tasks")
            .route("", web::get().to(list_tasks))
            .route("", web::post().to(create_task))
            .route("", web::patch().to(update_tasks))
            .route("", web::delete().to(delete_tasks))
            .route("/counts/status", web::get().to(task_status_counts))
            .route("/counts/priority", web::get().to(task_priority_counts))
            .route("/views", web::get().to(list_task_views))
            .route("/views", web::post().to(create_task_view))
            .route("/views/{id}", web::patch().to(update_task_view))
            .route("/views/{id}", web::delete().to(delete_task_view))
            .route("/{id}", web::patch().to(update_task))
            .route("/{id}", web::delete().to(delete_task)),
    );
}
