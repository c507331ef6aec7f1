//! SQLite implementation of the saved-view gateway.
//!
//! Both entities share this implementation; only the backing table differs.
//! The capacity eviction lives inside the insert transaction, so a failure
//! partway rolls back both the insert and the eviction together.

use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use tb_core::error::{AppError, Result};
use tb_core::fields::{PostField, TableField, TaskField};
use tb_core::filter::params::FilterParams;
use tb_core::models::{NewView, View, ViewChanges};
use tb_core::traits::{ViewRepo, VIEW_CAPACITY};
use uuid::Uuid;

use crate::{blob_to_uuid, db_err, is_unique_violation, uuid_to_blob};

pub struct SqliteViewRepo<F: TableField> {
    pool: SqlitePool,
    table: &'static str,
    _marker: PhantomData<F>,
}

impl SqliteViewRepo<PostField> {
    pub fn posts(pool: SqlitePool) -> Self {
        Self { pool, table: "post_views", _marker: PhantomData }
    }
}

impl SqliteViewRepo<TaskField> {
    pub fn tasks(pool: SqlitePool) -> Self {
        Self { pool, table: "task_views", _marker: PhantomData }
    }
}

fn row_to_view<F: TableField>(row: &SqliteRow) -> View<F> {
    // Both JSON columns are parsed permissively: a stale payload written by
    // an older schema degrades instead of failing the whole listing.
    let columns = row
        .get::<Option<String>, _>("columns")
        .and_then(|raw| serde_json::from_str::<Vec<String>>(&raw).ok());
    let filter_params = row
        .get::<Option<String>, _>("filter_params")
        .and_then(|raw| serde_json::from_str::<serde_json::Value>(&raw).ok())
        .map(|value| FilterParams::from_json(&value));

    View {
        id: blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice()),
        name: row.get("name"),
        columns,
        filter_params,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn columns_to_json(columns: &Option<Vec<String>>) -> Option<String> {
    columns
        .as_ref()
        .and_then(|cols| serde_json::to_string(cols).ok())
}

fn params_to_json<F: TableField>(params: &Option<FilterParams<F>>) -> Option<String> {
    params.as_ref().map(|p| p.to_json().to_string())
}

#[async_trait]
impl<F: TableField> ViewRepo<F> for SqliteViewRepo<F> {
    async fn create(&self, new: NewView<F>) -> Result<View<F>> {
        if new.name.trim().is_empty() {
            return Err(AppError::Validation("view name must not be empty".into()));
        }

        let now = Utc::now();
        let view = View {
            id: Uuid::now_v7(),
            name: new.name,
            columns: new.columns,
            filter_params: new.filter_params,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let insert = format!(
            "INSERT INTO {} (id, name, columns, filter_params, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
            self.table
        );
        sqlx::query(&insert)
            .bind(uuid_to_blob(view.id))
            .bind(&view.name)
            .bind(columns_to_json(&view.columns))
            .bind(params_to_json(&view.filter_params))
            .bind(view.created_at)
            .bind(view.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    AppError::DuplicateName(view.name.clone())
                } else {
                    db_err(err)
                }
            })?;

        // Capacity check sees the row we just inserted.
        let count_sql = format!("SELECT COUNT(*) AS total FROM {}", self.table);
        let total: i64 = sqlx::query(&count_sql)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_err)?
            .get("total");

        if total > VIEW_CAPACITY {
            // Evict the single oldest view, never the one just inserted.
            let oldest_sql = format!(
                "SELECT id FROM {} WHERE id <> ? ORDER BY created_at ASC, id ASC LIMIT 1",
                self.table
            );
            let oldest: Vec<u8> = sqlx::query(&oldest_sql)
                .bind(uuid_to_blob(view.id))
                .fetch_one(&mut *tx)
                .await
                .map_err(db_err)?
                .get("id");

            let delete_sql = format!("DELETE FROM {} WHERE id = ?", self.table);
            sqlx::query(&delete_sql)
                .bind(oldest)
                .execute(&mut *tx)
                .await
                .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;
        Ok(view)
    }

    async fn update(&self, id: Uuid, changes: ViewChanges<F>) -> Result<()> {
        if changes.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(AppError::Validation("view name must not be empty".into()));
        }

        let attempted_name = changes.name.clone().unwrap_or_default();
        let sql = format!(
            "UPDATE {} SET \
                name = COALESCE(?, name), \
                columns = COALESCE(?, columns), \
                filter_params = COALESCE(?, filter_params), \
                updated_at = ? \
             WHERE id = ?",
            self.table
        );

        let result = sqlx::query(&sql)
            .bind(changes.name)
            .bind(columns_to_json(&changes.columns))
            .bind(params_to_json(&changes.filter_params))
            .bind(Utc::now())
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    AppError::DuplicateName(attempted_name.clone())
                } else {
                    db_err(err)
                }
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("View".into(), id.to_string()));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let sql = format!("DELETE FROM {} WHERE id = ?", self.table);
        let result = sqlx::query(&sql)
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("View".into(), id.to_string()));
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<View<F>>> {
        let sql = format!(
            "SELECT id, name, columns, filter_params, created_at, updated_at \
             FROM {} ORDER BY created_at DESC, id DESC",
            self.table
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(rows.iter().map(row_to_view).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tb_core::fields::LogicalOperator;
    use tb_core::filter::params::FilterItem;

    async fn repo() -> SqliteViewRepo<PostField> {
        let pool = crate::connect("sqlite::memory:").await.unwrap();
        SqliteViewRepo::posts(pool)
    }

    fn new_view(name: &str) -> NewView<PostField> {
        NewView {
            name: name.to_string(),
            columns: Some(vec!["title".into(), "createdAt".into()]),
            filter_params: Some(FilterParams {
                operator: Some(LogicalOperator::And),
                sort: Some("createdAt.desc".into()),
                filters: vec![FilterItem {
                    field: PostField::Title,
                    value: "kick~contains".into(),
                    is_multi: false,
                }],
            }),
        }
    }

    #[tokio::test]
    async fn create_list_round_trip() {
        let repo = repo().await;
        let created = repo.create(new_view("mine")).await.unwrap();

        let views = repo.list().await.unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].id, created.id);
        assert_eq!(views[0].columns, created.columns);
        assert_eq!(views[0].filter_params, created.filter_params);
    }

    #[tokio::test]
    async fn eleventh_view_evicts_the_oldest() {
        let repo = repo().await;

        let mut ids = Vec::new();
        for i in 0..10 {
            ids.push(repo.create(new_view(&format!("view-{i}"))).await.unwrap().id);
        }

        let newest = repo.create(new_view("view-10")).await.unwrap();

        let views = repo.list().await.unwrap();
        assert_eq!(views.len(), 10);
        assert!(views.iter().any(|v| v.id == newest.id));
        // The oldest of the original ten is gone; the rest survive.
        assert!(!views.iter().any(|v| v.id == ids[0]));
        for id in &ids[1..] {
            assert!(views.iter().any(|v| v.id == *id));
        }
    }

    #[tokio::test]
    async fn duplicate_name_is_distinguishable_and_mutates_nothing() {
        let repo = repo().await;
        repo.create(new_view("mine")).await.unwrap();

        let err = repo.create(new_view("mine")).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateName(ref name) if name == "mine"));
        assert_eq!(repo.list().await.unwrap().len(), 1);

        let other = repo.create(new_view("other")).await.unwrap();
        let err = repo
            .update(other.id, ViewChanges { name: Some("mine".into()), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateName(ref name) if name == "mine"));

        let views = repo.list().await.unwrap();
        let untouched = views.iter().find(|v| v.id == other.id).unwrap();
        assert_eq!(untouched.name, "other");
    }

    #[tokio::test]
    async fn empty_name_is_rejected() {
        let repo = repo().await;
        let err = repo.create(NewView { name: "  ".into(), columns: None, filter_params: None })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn missing_view_reports_not_found() {
        let repo = repo().await;
        let id = Uuid::new_v4();
        assert!(matches!(repo.delete(id).await.unwrap_err(), AppError::NotFound(..)));
        assert!(matches!(
            repo.update(id, ViewChanges::default()).await.unwrap_err(),
            AppError::NotFound(..)
        ));
    }

    #[tokio::test]
    async fn stale_fields_in_persisted_params_are_dropped() {
        let repo = repo().await;
        let created = repo
            .create(NewView {
                name: "stale".into(),
                columns: None,
                filter_params: None,
            })
            .await
            .unwrap();

        // Simulate a payload written against a different entity's field set.
        sqlx::query("UPDATE post_views SET filter_params = ? WHERE id = ?")
            .bind(r#"{"operator":"or","filters":[{"field":"priority","value":"high~eq","isMulti":true}]}"#)
            .bind(uuid_to_blob(created.id))
            .execute(&repo.pool)
            .await
            .unwrap();

        let views = repo.list().await.unwrap();
        let params = views[0].filter_params.as_ref().unwrap();
        assert_eq!(params.operator, Some(LogicalOperator::Or));
        assert!(params.filters.is_empty());
    }
}
