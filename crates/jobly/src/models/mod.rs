//! Data access for companies, jobs and users.
//!
//! Every operation takes `conn: &impl GenericClient`, so it runs equally on a
//! plain connection or inside a caller-owned transaction. Searches go through
//! the filter specs in [`crate::filter`]; partial updates go through
//! [`crate::update::sql_for_partial_update`] with the entity's column
//! whitelist, and the row key is bound after the update values.

mod company;
mod job;
mod user;

pub use company::{
    COMPANY_UPDATE_COLUMNS, Company, CompanyDetail, CompanyJob, CompanySummary, NewCompany,
};
pub use job::{JOB_UPDATE_COLUMNS, Job, JobSummary, NewJob, RemovedJob};
pub use user::{USER_UPDATE_COLUMNS, User, UserSummary};

use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::fragment::QueryFragment;
use crate::update::{ColumnSet, sql_for_partial_update};
use crate::value::FieldMap;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// Fixed SQL shape of one entity table.
pub(crate) struct TableDef {
    pub name: &'static str,
    pub key_column: &'static str,
    pub returning: &'static str,
    pub updatable: &'static [&'static str],
}

/// Run `UPDATE <table> SET ... WHERE <key_column> = $N RETURNING ...`.
///
/// Returns `None` when no row matched the key.
pub(crate) async fn update_returning(
    conn: &impl GenericClient,
    tag: &str,
    table: &TableDef,
    key: &(dyn ToSql + Sync),
    data: &FieldMap,
) -> JoblyResult<Option<Row>> {
    let allowed = ColumnSet::new(table.updatable)?;
    let set: QueryFragment = sql_for_partial_update(data, &allowed)?;

    let sql = format!(
        "UPDATE {} SET {} WHERE {} = ${} RETURNING {}",
        table.name,
        set.clause,
        table.key_column,
        set.next_placeholder(),
        table.returning
    );
    let mut params = set.params_ref();
    params.push(key);

    tracing::debug!(target: "jobly.sql", tag, param_count = params.len(), "update");
    conn.query_opt(&sql, &params).await
}

/// The row an `INSERT ... RETURNING` produced.
///
/// A missing row is a server-side failure, never a client error.
pub(crate) fn inserted(rows: Vec<Row>, table: &str) -> JoblyResult<Row> {
    rows.into_iter().next().ok_or_else(|| {
        JoblyError::decode("RETURNING", format!("INSERT INTO {table} returned no row"))
    })
}

/// Turn "no row" into a `NotFound` naming the entity and key.
pub(crate) fn found<T>(value: Option<T>, what: &str, key: impl std::fmt::Display) -> JoblyResult<T> {
    value.ok_or_else(|| JoblyError::not_found(format!("No {what}: {key}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_inserted_row_is_a_server_error() {
        let err = inserted(Vec::new(), "jobs").unwrap_err();
        assert!(matches!(err, JoblyError::Decode { .. }));
        assert!(!err.is_not_found());
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn found_names_entity_and_key() {
        let err = found(None::<()>, "company", "nope").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Not found: No company: nope");
        assert_eq!(found(Some(3), "job", 1).unwrap(), 3);
    }
}
