//! SQLite implementation of `PostRepo`.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use tb_core::error::{AppError, Result};
use tb_core::filter::predicate::{OrderBy, Predicate};
use tb_core::models::{NewPost, Page, Post, PostStatus, UpdatePost};
use tb_core::traits::PostRepo;
use uuid::Uuid;

use crate::sql::{order_clause, where_clause};
use crate::{blob_to_uuid, db_err, uuid_to_blob};

pub struct SqlitePostRepo {
    pool: SqlitePool,
}

impl SqlitePostRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_post(row: &SqliteRow) -> Post {
    Post {
        id: blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice()),
        title: row.get("title"),
        status: PostStatus::parse(&row.get::<String, _>("status")).unwrap_or_default(),
        author_name: row.get("author_name"),
        comments_number: row.get("comments_number"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl PostRepo for SqlitePostRepo {
    /// Runs the filtered select and the matching COUNT inside one
    /// transaction so rows and page count come from the same snapshot.
    async fn fetch_page(
        &self,
        predicate: &Predicate,
        order: &OrderBy,
        limit: i64,
        offset: i64,
    ) -> Result<Page<Post>> {
        let (condition, binds) = where_clause(predicate);
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let select = format!(
            "SELECT id, title, status, author_name, comments_number, created_at, updated_at \
             FROM posts WHERE {condition} {} LIMIT ? OFFSET ?",
            order_clause(order)
        );
        let mut query = sqlx::query(&select);
        for bind in &binds {
            query = query.bind(bind);
        }
        let rows = query
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut *tx)
            .await
            .map_err(db_err)?;

        let count_sql = format!("SELECT COUNT(*) AS total FROM posts WHERE {condition}");
        let mut count_query = sqlx::query(&count_sql);
        for bind in &binds {
            count_query = count_query.bind(bind);
        }
        let total: i64 = count_query
            .fetch_one(&mut *tx)
            .await
            .map_err(db_err)?
            .get("total");

        tx.commit().await.map_err(db_err)?;

        let data = rows.iter().map(row_to_post).collect();
        Ok(Page::new(data, total, limit))
    }

    async fn count_by_status(&self) -> Result<Vec<(PostStatus, i64)>> {
        let rows = sqlx::query("SELECT status, COUNT(*) AS total FROM posts GROUP BY status")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(rows
            .iter()
            .filter_map(|row| {
                PostStatus::parse(&row.get::<String, _>("status"))
                    .map(|status| (status, row.get("total")))
            })
            .collect())
    }

    async fn count_by_author(&self) -> Result<Vec<(String, i64)>> {
        let rows =
            sqlx::query("SELECT author_name, COUNT(*) AS total FROM posts GROUP BY author_name")
                .fetch_all(&self.pool)
                .await
                .map_err(db_err)?;

        Ok(rows
            .iter()
            .map(|row| (row.get("author_name"), row.get("total")))
            .collect())
    }

    async fn count_by_comments(&self) -> Result<Vec<(i32, i64)>> {
        let rows = sqlx::query(
            "SELECT comments_number, COUNT(*) AS total FROM posts GROUP BY comments_number",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows
            .iter()
            .map(|row| (row.get("comments_number"), row.get("total")))
            .collect())
    }

    async fn create(&self, new: NewPost) -> Result<Post> {
        let now = Utc::now();
        let post = Post {
            id: Uuid::now_v7(),
            title: new.title,
            status: new.status,
            author_name: new.author_name,
            comments_number: new.comments_number,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO posts (id, title, status, author_name, comments_number, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(post.id))
        .bind(&post.title)
        .bind(post.status.as_str())
        .bind(&post.author_name)
        .bind(post.comments_number)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(post)
    }

    async fn update(&self, id: Uuid, changes: UpdatePost) -> Result<()> {
        let result = sqlx::query(
            "UPDATE posts SET \
                title = COALESCE(?, title), \
                status = COALESCE(?, status), \
                author_name = COALESCE(?, author_name), \
                comments_number = COALESCE(?, comments_number), \
                updated_at = ? \
             WHERE id = ?",
        )
        .bind(changes.title)
        .bind(changes.status.map(|s| s.as_str()))
        .bind(changes.author_name)
        .bind(changes.comments_number)
        .bind(Utc::now())
        .bind(uuid_to_blob(id))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Post".into(), id.to_string()));
        }
        Ok(())
    }

    async fn update_many(&self, ids: &[Uuid], changes: UpdatePost) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "UPDATE posts SET \
                title = COALESCE(?, title), \
                status = COALESCE(?, status), \
                author_name = COALESCE(?, author_name), \
                comments_number = COALESCE(?, comments_number), \
                updated_at = ? \
             WHERE id IN ({placeholders})"
        );

        let mut query = sqlx::query(&sql)
            .bind(changes.title)
            .bind(changes.status.map(|s| s.as_str()))
            .bind(changes.author_name)
            .bind(changes.comments_number)
            .bind(Utc::now());
        for id in ids {
            query = query.bind(uuid_to_blob(*id));
        }

        query.execute(&self.pool).await.map_err(db_err)?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Post".into(), id.to_string()));
        }
        Ok(())
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("DELETE FROM posts WHERE id IN ({placeholders})");

        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(uuid_to_blob(*id));
        }

        query.execute(&self.pool).await.map_err(db_err)?;
        Ok(())
    }
}
