use serde::Serialize;
use tokio_postgres::Row;

use super::{TableDef, found, update_returning};
use crate::client::GenericClient;
use crate::error::JoblyResult;
use crate::row::{FromRow, RowExt, map_rows};
use crate::value::FieldMap;

/// Columns a user update may touch. Username is the key; the password hash
/// is owned by the authentication layer and is not updatable here.
pub const USER_UPDATE_COLUMNS: &[&str] = &["first_name", "last_name", "email", "is_admin"];

const USERS: TableDef = TableDef {
    name: "users",
    key_column: "username",
    returning: "username, first_name, last_name, email, is_admin",
    updatable: USER_UPDATE_COLUMNS,
};

/// `{username, first_name, last_name, email}` as listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl FromRow for UserSummary {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            username: row.try_get_column("username")?,
            first_name: row.try_get_column("first_name")?,
            last_name: row.try_get_column("last_name")?,
            email: row.try_get_column("email")?,
        })
    }
}

/// A user without the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

impl FromRow for User {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            username: row.try_get_column("username")?,
            first_name: row.try_get_column("first_name")?,
            last_name: row.try_get_column("last_name")?,
            email: row.try_get_column("email")?,
            is_admin: row.try_get_column("is_admin")?,
        })
    }
}

impl User {
    pub async fn find_all(conn: &impl GenericClient) -> JoblyResult<Vec<UserSummary>> {
        tracing::debug!(target: "jobly.sql", tag = "users.find_all", param_count = 0);
        let rows = conn
            .query(
                "SELECT username, first_name, last_name, email FROM users ORDER BY username",
                &[],
            )
            .await?;
        map_rows(&rows)
    }

    pub async fn get(conn: &impl GenericClient, username: &str) -> JoblyResult<User> {
        tracing::debug!(target: "jobly.sql", tag = "users.get", param_count = 1);
        let row = conn
            .query_opt(
                "SELECT username, first_name, last_name, email, is_admin \
                 FROM users WHERE username = $1",
                &[&username],
            )
            .await?;
        User::from_row(&found(row, "user", username)?)
    }

    /// Partially update a user. `data` may hold `first_name`, `last_name`,
    /// `email`, `is_admin`.
    pub async fn update(
        conn: &impl GenericClient,
        username: &str,
        data: &FieldMap,
    ) -> JoblyResult<User> {
        let row = update_returning(conn, "users.update", &USERS, &username, data).await?;
        User::from_row(&found(row, "user", username)?)
    }

    /// Delete a user, returning the removed username.
    pub async fn remove(conn: &impl GenericClient, username: &str) -> JoblyResult<String> {
        tracing::debug!(target: "jobly.sql", tag = "users.remove", param_count = 1);
        let row = conn
            .query_opt(
                "DELETE FROM users WHERE username = $1 RETURNING username",
                &[&username],
            )
            .await?;
        found(row, "user", username)?.try_get_column("username")
    }
}
