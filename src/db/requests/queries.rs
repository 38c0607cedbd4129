//! Request repository for database queries.

use super::models::{ActivityRequest, NewActivityRequest, RequestStatus};
use crate::db::DbError;
use chrono::DateTime;
use sqlx::SqliteConnection;

/// Raw row as stored; converted into [`ActivityRequest`] after validation.
#[derive(sqlx::FromRow)]
struct RequestRow {
    id: i64,
    full_name: String,
    group_name: String,
    supervisor: String,
    activity: String,
    file_name: String,
    file_content: String,
    file_type: String,
    status: String,
    created_at: i64,
}

impl TryFrom<RequestRow> for ActivityRequest {
    type Error = DbError;

    fn try_from(row: RequestRow) -> Result<Self, Self::Error> {
        let status = row.status.parse().map_err(|e| DbError::CorruptRow {
            id: row.id,
            reason: format!("{e}"),
        })?;
        let created_at =
            DateTime::from_timestamp_micros(row.created_at).ok_or_else(|| DbError::CorruptRow {
                id: row.id,
                reason: format!("created_at out of range: {}", row.created_at),
            })?;

        Ok(ActivityRequest {
            id: row.id,
            full_name: row.full_name,
            group_name: row.group_name,
            supervisor: row.supervisor,
            activity: row.activity,
            file_name: row.file_name,
            file_content: row.file_content,
            file_type: row.file_type,
            status,
            created_at,
        })
    }
}

/// Repository for activity request operations.
///
/// Borrowed from a [`Session`](crate::db::Session); every query runs inside
/// that session's transaction.
pub struct RequestRepository<'a> {
    conn: &'a mut SqliteConnection,
}

impl<'a> RequestRepository<'a> {
    /// Create a new request repository.
    pub fn new(conn: &'a mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// Insert a new request with status `pending` and return its id.
    pub async fn create(&mut self, request: &NewActivityRequest) -> Result<i64, DbError> {
        let now = chrono::Utc::now().timestamp_micros();

        let result = sqlx::query(
            r#"
            INSERT INTO activity_requests
                (full_name, group_name, supervisor, activity, file_name, file_content, file_type, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&request.full_name)
        .bind(&request.group_name)
        .bind(&request.supervisor)
        .bind(&request.activity)
        .bind(&request.file_name)
        .bind(&request.file_content)
        .bind(&request.file_type)
        .bind(RequestStatus::Pending.as_str())
        .bind(now)
        .execute(&mut *self.conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Find a request by id.
    pub async fn find_by_id(&mut self, id: i64) -> Result<Option<ActivityRequest>, DbError> {
        let row = sqlx::query_as::<_, RequestRow>(
            r#"
            SELECT id, full_name, group_name, supervisor, activity, file_name,
                   file_content, file_type, status, created_at
            FROM activity_requests
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        row.map(ActivityRequest::try_from).transpose()
    }

    /// All requests with the given status, newest first.
    pub async fn list_by_status(
        &mut self,
        status: RequestStatus,
    ) -> Result<Vec<ActivityRequest>, DbError> {
        let rows = sqlx::query_as::<_, RequestRow>(
            r#"
            SELECT id, full_name, group_name, supervisor, activity, file_name,
                   file_content, file_type, status, created_at
            FROM activity_requests
            WHERE status = ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(status.as_str())
        .fetch_all(&mut *self.conn)
        .await?;

        rows.into_iter().map(ActivityRequest::try_from).collect()
    }

    /// Overwrite the status of a request. Returns `false` if no row matched.
    pub async fn update_status(&mut self, id: i64, status: RequestStatus) -> Result<bool, DbError> {
        let result = sqlx::query("UPDATE activity_requests SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a request. Returns `false` if no row matched.
    pub async fn delete(&mut self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM activity_requests WHERE id = ?")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
