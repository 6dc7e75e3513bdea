use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

use super::{TableDef, found, inserted, update_returning};
use crate::client::GenericClient;
use crate::error::JoblyResult;
use crate::filter::JOB_FILTERS;
use crate::row::{FromRow, RowExt, map_rows};
use crate::value::FieldMap;

/// Columns a job update may touch. A job never moves between companies.
pub const JOB_UPDATE_COLUMNS: &[&str] = &["title", "salary", "equity"];

const JOBS: TableDef = TableDef {
    name: "jobs",
    key_column: "id",
    returning: "id, title, salary, equity, company_handle",
    updatable: JOB_UPDATE_COLUMNS,
};

/// `{id, title}` as listed by searches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobSummary {
    pub id: i32,
    pub title: String,
}

impl FromRow for JobSummary {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
        })
    }
}

/// A full job row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl FromRow for Job {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company_handle: row.try_get_column("company_handle")?,
        })
    }
}

/// What [`Job::remove`] reports back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovedJob {
    pub id: i32,
    pub company_handle: String,
    pub title: String,
}

impl FromRow for RemovedJob {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            company_handle: row.try_get_column("company_handle")?,
            title: row.try_get_column("title")?,
        })
    }
}

/// Input for [`Job::create`]. Duplicate titles per company are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewJob {
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl Job {
    /// Search jobs. `filters` may hold `title`, `minSalary`, `hasEquity`;
    /// other keys are ignored.
    pub async fn find_all(
        conn: &impl GenericClient,
        filters: &FieldMap,
    ) -> JoblyResult<Vec<JobSummary>> {
        let where_ = JOB_FILTERS.build(filters)?;
        let sql = format!("SELECT id, title FROM jobs {} ORDER BY title", where_.clause);

        tracing::debug!(
            target: "jobly.sql",
            tag = "jobs.find_all",
            param_count = where_.values.len()
        );
        let rows = conn.query(&sql, &where_.params_ref()).await?;
        map_rows(&rows)
    }

    pub async fn get(conn: &impl GenericClient, id: i32) -> JoblyResult<Job> {
        tracing::debug!(target: "jobly.sql", tag = "jobs.get", param_count = 1);
        let row = conn
            .query_opt(
                "SELECT id, title, salary, equity, company_handle FROM jobs WHERE id = $1",
                &[&id],
            )
            .await?;
        Job::from_row(&found(row, "job", id)?)
    }

    /// Insert a job. An unknown `company_handle` is rejected by the foreign
    /// key and reported as [`crate::JoblyError::InvalidInput`].
    pub async fn create(conn: &impl GenericClient, new: &NewJob) -> JoblyResult<Job> {
        tracing::debug!(target: "jobly.sql", tag = "jobs.create", param_count = 4);
        let rows = conn
            .query(
                "INSERT INTO jobs (title, salary, equity, company_handle) \
                 VALUES ($1, $2, $3, $4) \
                 RETURNING id, title, salary, equity, company_handle",
                &[&new.title, &new.salary, &new.equity, &new.company_handle],
            )
            .await?;
        Job::from_row(&inserted(rows, JOBS.name)?)
    }

    /// Partially update a job. `data` may hold `title`, `salary`, `equity`.
    pub async fn update(conn: &impl GenericClient, id: i32, data: &FieldMap) -> JoblyResult<Job> {
        let row = update_returning(conn, "jobs.update", &JOBS, &id, data).await?;
        Job::from_row(&found(row, "job", id)?)
    }

    pub async fn remove(conn: &impl GenericClient, id: i32) -> JoblyResult<RemovedJob> {
        tracing::debug!(target: "jobly.sql", tag = "jobs.remove", param_count = 1);
        let row = conn
            .query_opt(
                "DELETE FROM jobs WHERE id = $1 RETURNING id, company_handle, title",
                &[&id],
            )
            .await?;
        RemovedJob::from_row(&found(row, "job", id)?)
    }
}
