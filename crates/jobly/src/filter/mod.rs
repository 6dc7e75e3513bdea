//! Search `WHERE` fragments driven by declarative filter tables.
//!
//! A [`FilterSpec`] maps caller-facing filter keys (`minEmployees`,
//! `hasEquity`, ...) to fixed predicate templates over physical columns.
//! Adding a searchable entity means adding a table, not code.
//!
//! # Example
//! ```ignore
//! use jobly::{FieldMap, filter::JOB_FILTERS};
//!
//! let filters = FieldMap::new()
//!     .with("hasEquity", true)
//!     .with("title", "CEO")
//!     .with("minSalary", 2000);
//! let where_ = JOB_FILTERS.build(&filters)?;
//! assert_eq!(where_.clause, "WHERE title ILIKE $1 AND salary >= $2 AND equity > $3");
//! ```
//!
//! # Input handling
//!
//! - Keys the filter table does not know are ignored and never reach SQL text. Callers
//!   routinely pass a whole request body (auth token included), so this is the
//!   expected path, not an error.
//! - A falsy value (`null`, `false`, `0`, `""`) is treated as absent. A literal
//!   zero bound therefore cannot be expressed through these filters.
//! - Flag filters (`hasEquity`) only react to a strict `true`; `false` means
//!   "no constraint", not "must be falsy".

mod specs;


pub use specs::{COMPANY_FILTERS, JOB_FILTERS};

use crate::error::{JoblyError, JoblyResult};
use crate::fragment::{QueryFragment, placeholders};
use crate::ident::Ident;
use crate::value::{FieldMap, Scalar};

/// Comparison operator of a predicate template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Case-insensitive pattern match (PostgreSQL ILIKE)
    Ilike,
    /// Greater than: column > value
    Gt,
    /// Greater than or equal: column >= value
    Gte,
    /// Less than or equal: column <= value
    Lte,
}

impl Comparison {
    pub fn as_sql(self) -> &'static str {
        match self {
            Comparison::Ilike => "ILIKE",
            Comparison::Gt => ">",
            Comparison::Gte => ">=",
            Comparison::Lte => "<=",
        }
    }
}

/// How a raw filter value becomes the bound value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueTransform {
    /// Bind the raw value unchanged.
    Identity,
    /// Bind `%<raw>%` for substring matching.
    Contains,
    /// Bind a fixed value; the raw value only switches the predicate on and
    /// must be exactly `true`.
    Flag(i64),
}

/// One recognized filter key and its predicate template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterRule {
    pub key: &'static str,
    pub column: &'static str,
    pub comparison: Comparison,
    pub transform: ValueTransform,
}

impl FilterRule {
    /// `column ILIKE '%value%'`
    pub const fn contains(key: &'static str, column: &'static str) -> Self {
        Self {
            key,
            column,
            comparison: Comparison::Ilike,
            transform: ValueTransform::Contains,
        }
    }

    /// `column >= value`
    pub const fn at_least(key: &'static str, column: &'static str) -> Self {
        Self {
            key,
            column,
            comparison: Comparison::Gte,
            transform: ValueTransform::Identity,
        }
    }

    /// `column <= value`
    pub const fn at_most(key: &'static str, column: &'static str) -> Self {
        Self {
            key,
            column,
            comparison: Comparison::Lte,
            transform: ValueTransform::Identity,
        }
    }

    /// `column > bound`, switched on by a strict `true`.
    pub const fn flag_above(key: &'static str, column: &'static str, bound: i64) -> Self {
        Self {
            key,
            column,
            comparison: Comparison::Gt,
            transform: ValueTransform::Flag(bound),
        }
    }

    /// The value to bind for `raw`, or `None` if this rule stays inactive.
    pub fn bind_value(&self, raw: &Scalar) -> Option<Scalar> {
        match self.transform {
            ValueTransform::Flag(bound) => {
                matches!(raw, Scalar::Bool(true)).then_some(Scalar::Int(bound))
            }
            _ if !raw.is_truthy() => None,
            ValueTransform::Identity => Some(raw.clone()),
            ValueTransform::Contains => Some(Scalar::Text(format!("%{}%", raw.to_text()))),
        }
    }
}

/// A pair of filter keys where the first may not exceed the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeCheck {
    pub min_key: &'static str,
    pub max_key: &'static str,
}

/// The recognized filters of one searchable entity.
///
/// `rules` order is the predicate order and therefore the placeholder order,
/// independent of the caller's key order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSpec {
    pub entity: &'static str,
    pub rules: &'static [FilterRule],
    pub range_checks: &'static [RangeCheck],
}

impl FilterSpec {
    /// Build the `WHERE` fragment for `filters`. See [`sql_for_filtering`].
    pub fn build(&self, filters: &FieldMap) -> JoblyResult<QueryFragment> {
        sql_for_filtering(filters, self)
    }

    /// Whether `key` is a recognized filter of this spec.
    pub fn recognizes(&self, key: &str) -> bool {
        self.rules.iter().any(|r| r.key == key)
    }

    /// Check that every column in the table is a plain identifier.
    pub fn validate(&self) -> JoblyResult<()> {
        for rule in self.rules {
            Ident::parse(rule.column)?;
        }
        for check in self.range_checks {
            if !self.recognizes(check.min_key) || !self.recognizes(check.max_key) {
                return Err(JoblyError::invalid_input(format!(
                    "Range check on unknown filter: {}/{}",
                    check.min_key, check.max_key
                )));
            }
        }
        Ok(())
    }

    fn check_ranges(&self, filters: &FieldMap) -> JoblyResult<()> {
        for check in self.range_checks {
            let bound = |key: &str| {
                filters
                    .get(key)
                    .filter(|v| v.is_truthy())
                    .and_then(Scalar::as_f64)
            };
            if let (Some(min), Some(max)) = (bound(check.min_key), bound(check.max_key)) {
                if min > max {
                    return Err(JoblyError::range("min cannot be greater than max"));
                }
            }
        }
        Ok(())
    }
}

/// Build a `WHERE` fragment from caller-supplied filters.
///
/// Rules are visited in `spec` order; each present, active key contributes one
/// predicate and one value. With no contributing key the result is
/// [`QueryFragment::empty`], meaning "fetch all rows".
///
/// # Errors
/// [`JoblyError::Range`] when a range check's minimum exceeds its maximum.
/// [`JoblyError::InvalidInput`] if a contributing rule names a column that is
/// not a plain identifier; the built-in tables never do.
pub fn sql_for_filtering(filters: &FieldMap, spec: &FilterSpec) -> JoblyResult<QueryFragment> {
    spec.check_ranges(filters)?;

    let mut predicates = Vec::new();
    let mut values = Vec::new();
    let mut used = Vec::new();

    for rule in spec.rules {
        let Some(value) = filters.get(rule.key).and_then(|raw| rule.bind_value(raw)) else {
            continue;
        };
        let column = Ident::parse(rule.column)?;
        values.push(value);
        predicates.push(format!(
            "{} {} ${}",
            column,
            rule.comparison.as_sql(),
            values.len()
        ));
        used.push(rule.key);
    }

    tracing::trace!(
        target: "jobly.sql",
        entity = spec.entity,
        filters = ?used,
        ignored = filters.keys().filter(|k| !spec.recognizes(k)).count(),
        param_count = values.len(),
        "built filter clause"
    );

    if predicates.is_empty() {
        return Ok(QueryFragment::empty());
    }

    let clause = format!("WHERE {}", predicates.join(" AND "));
    debug_assert_eq!(
        placeholders(&clause),
        (1..=values.len()).collect::<Vec<_>>()
    );

    Ok(QueryFragment { clause, values })
}
