//! SQLite implementation of `TaskRepo`.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use tb_core::error::{AppError, Result};
use tb_core::filter::predicate::{OrderBy, Predicate};
use tb_core::models::{NewTask, Page, Task, TaskLabel, TaskPriority, TaskStatus, UpdateTask};
use tb_core::traits::TaskRepo;
use uuid::Uuid;

use crate::sql::{order_clause, where_clause};
use crate::{blob_to_uuid, db_err, uuid_to_blob};

pub struct SqliteTaskRepo {
    pool: SqlitePool,
}

impl SqliteTaskRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_task(row: &SqliteRow) -> Task {
    Task {
        id: blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice()),
        code: row.get("code"),
        title: row.get("title"),
        status: TaskStatus::parse(&row.get::<String, _>("status")).unwrap_or_default(),
        label: TaskLabel::parse(&row.get::<String, _>("label")).unwrap_or_default(),
        priority: TaskPriority::parse(&row.get::<String, _>("priority")).unwrap_or_default(),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl TaskRepo for SqliteTaskRepo {
    async fn fetch_page(
        &self,
        predicate: &Predicate,
        order: &OrderBy,
        limit: i64,
        offset: i64,
    ) -> Result<Page<Task>> {
        let (condition, binds) = where_clause(predicate);
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let select = format!(
            "SELECT id, code, title, status, label, priority, created_at, updated_at \
             FROM tasks WHERE {condition} {} LIMIT ? OFFSET ?",
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

        let count_sql = format!("SELECT COUNT(*) AS total FROM tasks WHERE {condition}");
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

        let data = rows.iter().map(row_to_task).collect();
        Ok(Page::new(data, total, limit))
    }

    async fn count_by_status(&self) -> Result<Vec<(TaskStatus, i64)>> {
        let rows = sqlx::query("SELECT status, COUNT(*) AS total FROM tasks GROUP BY status")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(rows
            .iter()
            .filter_map(|row| {
                TaskStatus::parse(&row.get::<String, _>("status"))
                    .map(|status| (status, row.get("total")))
            })
            .collect())
    }

    async fn count_by_priority(&self) -> Result<Vec<(TaskPriority, i64)>> {
        let rows = sqlx::query("SELECT priority, COUNT(*) AS total FROM tasks GROUP BY priority")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(rows
            .iter()
            .filter_map(|row| {
                TaskPriority::parse(&row.get::<String, _>("priority"))
                    .map(|priority| (priority, row.get("total")))
            })
            .collect())
    }

    async fn create(&self, new: NewTask) -> Result<Task> {
        let now = Utc::now();
        let task = Task {
            id: Uuid::now_v7(),
            code: new.code,
            title: new.title,
            status: new.status,
            label: new.label,
            priority: new.priority,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO tasks (id, code, title, status, label, priority, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(task.id))
        .bind(&task.code)
        .bind(&task.title)
        .bind(task.status.as_str())
        .bind(task.label.as_str())
        .bind(task.priority.as_str())
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(task)
    }

    async fn update(&self, id: Uuid, changes: UpdateTask) -> Result<()> {
        let result = sqlx::query(
            "UPDATE tasks SET \
                title = COALESCE(?, title), \
                status = COALESCE(?, status), \
                label = COALESCE(?, label), \
                priority = COALESCE(?, priority), \
                updated_at = ? \
             WHERE id = ?",
        )
        .bind(changes.title)
        .bind(changes.status.map(|s| s.as_str()))
        .bind(changes.label.map(|l| l.as_str()))
        .bind(changes.priority.map(|p| p.as_str()))
        .bind(Utc::now())
        .bind(uuid_to_blob(id))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Task".into(), id.to_string()));
        }
        Ok(())
    }

    async fn update_many(&self, ids: &[Uuid], changes: UpdateTask) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "UPDATE tasks SET \
                title = COALESCE(?, title), \
                status = COALESCE(?, status), \
                label = COALESCE(?, label), \
                priority = COALESCE(?, priority), \
                updated_at = ? \
             WHERE id IN ({placeholders})"
        );

        let mut query = sqlx::query(&sql)
            .bind(changes.title)
            .bind(changes.status.map(|s| s.as_str()))
            .bind(changes.label.map(|l| l.as_str()))
            .bind(changes.priority.map(|p| p.as_str()))
            .bind(Utc::now());
        for id in ids {
            query = query.bind(uuid_to_blob(*id));
        }

        query.execute(&self.pool).await.map_err(db_err)?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Task".into(), id.to_string()));
        }
        Ok(())
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("DELETE FROM tasks WHERE id IN ({placeholders})");

        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(uuid_to_blob(*id));
        }

        query.execute(&self.pool).await.map_err(db_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tb_core::fields::TaskField;
    use tb_core::filter::predicate::SearchQuery;

    async fn repo_with_fixtures() -> SqliteTaskRepo {
        let pool = crate::connect("sqlite::memory:").await.unwrap();
        let repo = SqliteTaskRepo::new(pool);

        for (code, status, priority) in [
            ("TASK-0001", TaskStatus::Todo, TaskPriority::High),
            ("TASK-0002", TaskStatus::InProgress, TaskPriority::Low),
            ("TASK-0003", TaskStatus::Done, TaskPriority::High),
        ] {
            repo.create(NewTask {
                code: code.into(),
                title: Some(format!("{code} title")),
                status,
                label: TaskLabel::Bug,
                priority,
            })
            .await
            .unwrap();
        }

        repo
    }

    #[tokio::test]
    async fn filters_by_priority_membership() {
        let repo = repo_with_fixtures().await;

        let query = SearchQuery {
            filters: vec![(TaskField::Priority, "high~eq~multi".to_string())],
            ..SearchQuery::default()
        };

        let page = repo
            .fetch_page(&query.predicate(), &query.order_by(), query.limit(), query.offset())
            .await
            .unwrap();

        assert_eq!(page.data.len(), 2);
        assert!(page.data.iter().all(|t| t.priority == TaskPriority::High));
    }

    #[tokio::test]
    async fn duplicate_code_is_rejected_by_schema() {
        let repo = repo_with_fixtures().await;
        let err = repo
            .create(NewTask {
                code: "TASK-0001".into(),
                title: None,
                status: TaskStatus::Todo,
                label: TaskLabel::Feature,
                priority: TaskPriority::Low,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[tokio::test]
    async fn status_counts_group_correctly() {
        let repo = repo_with_fixtures().await;
        let counts = repo.count_by_status().await.unwrap();
        assert_eq!(counts.len(), 3);
        assert!(counts.contains(&(TaskStatus::Todo, 1)));
    }
}
