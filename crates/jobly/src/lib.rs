//! # jobly
//!
//! Data access for a job board on PostgreSQL.
//!
//! ## Features
//!
//! - **Partial updates**: turn a sparse field map into `col=$1, col=$2` plus
//!   ordered values, restricted to a per-entity column whitelist
//! - **Search filters**: turn caller filters into a `WHERE` fragment from a
//!   declarative [`FilterSpec`]
//! - **Parameterized only**: caller data never reaches SQL text; identifiers
//!   come from fixed tables and are validated
//! - **Transaction-friendly**: models accept anything implementing
//!   [`GenericClient`]
//!
//! ```ignore
//! use jobly::{COMPANY_FILTERS, FieldMap};
//!
//! let filters = FieldMap::new().with("name", "net").with("minEmployees", 10);
//! let where_ = COMPANY_FILTERS.build(&filters)?;
//! assert_eq!(where_.clause, "WHERE name ILIKE $1 AND num_employees >= $2");
//!
//! let companies = jobly::models::Company::find_all(&client, &filters).await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod fragment;
pub mod ident;
pub mod models;
pub mod row;
pub mod update;
pub mod value;

pub use client::{GenericClient, TimeoutClient};
pub use config::Config;
pub use error::{JoblyError, JoblyResult};
pub use filter::{
    COMPANY_FILTERS, Comparison, FilterRule, FilterSpec, JOB_FILTERS, RangeCheck, ValueTransform,
    sql_for_filtering,
};
pub use fragment::QueryFragment;
pub use ident::Ident;
pub use row::{FromRow, RowExt};
pub use update::{ColumnSet, sql_for_partial_update};
pub use value::{FieldMap, Scalar};

/// Build the `WHERE` fragment for a job search.
///
/// Shorthand for `JOB_FILTERS.build(filters)`.
pub fn sql_for_jobs_filtering(filters: &FieldMap) -> JoblyResult<QueryFragment> {
    JOB_FILTERS.build(filters)
}
