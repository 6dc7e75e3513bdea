use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

use super::{TableDef, found, inserted, update_returning};
use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::filter::COMPANY_FILTERS;
use crate::row::{FromRow, RowExt, map_rows};
use crate::value::FieldMap;

/// Columns a company update may touch. The handle is the key and never changes.
pub const COMPANY_UPDATE_COLUMNS: &[&str] = &["name", "description", "num_employees", "logo_url"];

const COMPANIES: TableDef = TableDef {
    name: "companies",
    key_column: "handle",
    returning: "handle, name, num_employees, description, logo_url",
    updatable: COMPANY_UPDATE_COLUMNS,
};

/// `{handle, name}` as listed by searches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanySummary {
    pub handle: String,
    pub name: String,
}

impl FromRow for CompanySummary {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            handle: row.try_get_column("handle")?,
            name: row.try_get_column("name")?,
        })
    }
}

/// A full company row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub num_employees: Option<i32>,
    pub description: String,
    pub logo_url: Option<String>,
}

impl FromRow for Company {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            handle: row.try_get_column("handle")?,
            name: row.try_get_column("name")?,
            num_employees: row.try_get_column("num_employees")?,
            description: row.try_get_column("description")?,
            logo_url: row.try_get_column("logo_url")?,
        })
    }
}

/// A job as listed under its company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyJob {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
}

impl FromRow for CompanyJob {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
        })
    }
}

/// A company together with its jobs, ordered by title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<CompanyJob>,
}

/// Input for [`Company::create`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub num_employees: Option<i32>,
    pub description: String,
    pub logo_url: Option<String>,
}

impl Company {
    /// Search companies. `filters` may hold `name`, `minEmployees`,
    /// `maxEmployees`; other keys are ignored.
    ///
    /// Fails with [`JoblyError::Range`] if `minEmployees > maxEmployees`.
    pub async fn find_all(
        conn: &impl GenericClient,
        filters: &FieldMap,
    ) -> JoblyResult<Vec<CompanySummary>> {
        let where_ = COMPANY_FILTERS.build(filters)?;
        let sql = format!(
            "SELECT handle, name FROM companies {} ORDER BY name",
            where_.clause
        );

        tracing::debug!(
            target: "jobly.sql",
            tag = "companies.find_all",
            param_count = where_.values.len()
        );
        let rows = conn.query(&sql, &where_.params_ref()).await?;
        map_rows(&rows)
    }

    /// Fetch one company and its jobs.
    pub async fn get(conn: &impl GenericClient, handle: &str) -> JoblyResult<CompanyDetail> {
        tracing::debug!(target: "jobly.sql", tag = "companies.get", param_count = 1);
        let row = conn
            .query_opt(
                "SELECT handle, name, num_employees, description, logo_url \
                 FROM companies WHERE handle = $1",
                &[&handle],
            )
            .await?;
        let company = Company::from_row(&found(row, "company", handle)?)?;

        let rows = conn
            .query(
                "SELECT id, title, salary, equity FROM jobs \
                 WHERE company_handle = $1 ORDER BY title",
                &[&handle],
            )
            .await?;

        Ok(CompanyDetail {
            company,
            jobs: map_rows(&rows)?,
        })
    }

    /// Insert a company.
    ///
    /// Fails with [`JoblyError::Duplicate`] if the handle is taken.
    pub async fn create(conn: &impl GenericClient, new: &NewCompany) -> JoblyResult<Company> {
        tracing::debug!(target: "jobly.sql", tag = "companies.create.check", param_count = 1);
        let duplicate = conn
            .query_opt("SELECT handle FROM companies WHERE handle = $1", &[&new.handle])
            .await?;
        if duplicate.is_some() {
            return Err(JoblyError::Duplicate(format!(
                "Duplicate company: {}",
                new.handle
            )));
        }

        tracing::debug!(target: "jobly.sql", tag = "companies.create", param_count = 5);
        let rows = conn
            .query(
                "INSERT INTO companies (handle, name, num_employees, description, logo_url) \
                 VALUES ($1, $2, $3, $4, $5) \
                 RETURNING handle, name, num_employees, description, logo_url",
                &[
                    &new.handle,
                    &new.name,
                    &new.num_employees,
                    &new.description,
                    &new.logo_url,
                ],
            )
            .await?;
        Company::from_row(&inserted(rows, COMPANIES.name)?)
    }

    /// Partially update a company. `data` may hold `name`, `description`,
    /// `num_employees`, `logo_url`.
    pub async fn update(
        conn: &impl GenericClient,
        handle: &str,
        data: &FieldMap,
    ) -> JoblyResult<Company> {
        let row = update_returning(conn, "companies.update", &COMPANIES, &handle, data).await?;
        Company::from_row(&found(row, "company", handle)?)
    }

    /// Delete a company (its jobs go with it).
    pub async fn remove(conn: &impl GenericClient, handle: &str) -> JoblyResult<()> {
        tracing::debug!(target: "jobly.sql", tag = "companies.remove", param_count = 1);
        let row = conn
            .query_opt(
                "DELETE FROM companies WHERE handle = $1 RETURNING handle",
                &[&handle],
            )
            .await?;
        found(row, "company", handle).map(|_| ())
    }
}
