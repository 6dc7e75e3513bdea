//! The output shared by both builders.

use crate::value::Scalar;
use tokio_postgres::types::ToSql;

/// A SQL fragment with `$1..$N` placeholders and the values bound to them.
///
/// `clause` never contains caller data: everything variable lives in
/// `values`, and the placeholders are numbered contiguously from 1 in the
/// order of `values`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryFragment {
    pub clause: String,
    pub values: Vec<Scalar>,
}

impl QueryFragment {
    /// The "nothing to add" fragment: no clause, no values.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.clause.is_empty() && self.values.is_empty()
    }

    /// Index of the first placeholder a caller may append after this fragment.
    pub fn next_placeholder(&self) -> usize {
        self.values.len() + 1
    }

    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.values.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
    }
}

/// Count the distinct `$N` placeholders in `sql`, returning them in order of appearance.
pub(crate) fn placeholders(sql: &str) -> Vec<usize> {
    let bytes = sql.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' {
            let start = i + 1;
            let mut end = start;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            if end > start {
                if let Ok(n) = sql[start..end].parse() {
                    out.push(n);
                }
            }
            i = end.max(i + 1);
        } else {
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_fragment_has_no_clause() {
        let f = QueryFragment::empty();
        assert!(f.is_empty());
        assert_eq!(f.next_placeholder(), 1);
        assert!(f.params_ref().is_empty());
    }

    #[test]
    fn next_placeholder_follows_values() {
        let f = QueryFragment {
            clause: "name=$1, num_employees=$2".into(),
            values: vec![Scalar::from("x"), Scalar::Int(3)],
        };
        assert_eq!(f.next_placeholder(), 3);
        assert_eq!(f.params_ref().len(), 2);
    }

    #[test]
    fn placeholders_scans_in_order() {
        assert_eq!(
            placeholders("WHERE a >= $1 AND b ILIKE $12 AND c = '$'"),
            vec![1, 12]
        );
    }
}
