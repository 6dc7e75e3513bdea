//! Partial-update `SET` fragments.
//!
//! Every update site passes a [`ColumnSet`] naming the columns it may touch;
//! keys outside it are rejected before any SQL text is produced.

use crate::error::{JoblyError, JoblyResult};
use crate::fragment::{QueryFragment, placeholders};
use crate::ident::Ident;
use crate::value::FieldMap;

/// The fixed set of columns an update operation is permitted to modify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSet {
    columns: Vec<Ident>,
}

impl ColumnSet {
    /// Validate and collect the permitted column names.
    pub fn new<I, S>(columns: I) -> JoblyResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let columns = columns
            .into_iter()
            .map(|c| Ident::parse(c.as_ref()))
            .collect::<JoblyResult<Vec<_>>>()?;
        Ok(Self { columns })
    }

    /// Look up a permitted column by name.
    pub fn get(&self, name: &str) -> Option<&Ident> {
        self.columns.iter().find(|c| c.as_str() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ident> {
        self.columns.iter()
    }
}

/// Build the column-assignment list for `UPDATE ... SET <clause>`.
///
/// `{name: "nick", employee_num: 32}` becomes
/// `name=$1, employee_num=$2` with values `["nick", 32]`, in the mapping's
/// iteration order. Values pass through untouched.
///
/// # Errors
/// [`JoblyError::InvalidInput`] if `data` is empty or names a column that is
/// not in `allowed`.
pub fn sql_for_partial_update(data: &FieldMap, allowed: &ColumnSet) -> JoblyResult<QueryFragment> {
    if data.is_empty() {
        return Err(JoblyError::invalid_input("No data"));
    }

    let columns = data
        .keys()
        .map(|key| {
            allowed
                .get(key)
                .ok_or_else(|| JoblyError::invalid_input(format!("Cannot update column: {key}")))
        })
        .collect::<JoblyResult<Vec<_>>>()?;

    let mut clause = String::new();
    for (i, col) in columns.iter().enumerate() {
        if i > 0 {
            clause.push_str(", ");
        }
        clause.push_str(col.as_str());
        clause.push_str("=$");
        clause.push_str(&(i + 1).to_string());
    }

    let values: Vec<_> = data.iter().map(|(_, v)| v.clone()).collect();
    debug_assert_eq!(
        placeholders(&clause),
        (1..=values.len()).collect::<Vec<_>>()
    );

    tracing::trace!(
        target: "jobly.sql",
        columns = ?data.keys().collect::<Vec<_>>(),
        param_count = values.len(),
        "built partial update"
    );

    Ok(QueryFragment { clause, values })
}
