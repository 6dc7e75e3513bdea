//! Validated SQL identifiers.
//!
//! Column names cannot be bound as parameters, so every name that reaches SQL
//! text goes through [`Ident`] first. Only plain unquoted names are accepted,
//! optionally dot-qualified (`jobs.salary`):
//!
//! - each part matches `[A-Za-z_][A-Za-z0-9_]*`
//! - no empty parts, no leading/trailing dots

use crate::error::{JoblyError, JoblyResult};
use std::fmt;

/// A validated SQL identifier (column or table name).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident(String);

impl Ident {
    /// Parse and validate an identifier.
    pub fn parse(s: &str) -> JoblyResult<Self> {
        if s.is_empty() {
            return Err(JoblyError::invalid_input("Identifier cannot be empty"));
        }

        for part in s.split('.') {
            validate_part(s, part)?;
        }

        Ok(Self(s.to_string()))
    }

    /// The identifier as it will appear in SQL.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn validate_part(full: &str, part: &str) -> JoblyResult<()> {
    let mut chars = part.chars();
    match chars.next() {
        None => {
            return Err(JoblyError::invalid_input(format!(
                "Empty identifier segment in '{full}'"
            )));
        }
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        Some(c) => {
            return Err(JoblyError::invalid_input(format!(
                "Invalid identifier start character: '{c}'"
            )));
        }
    }

    if let Some(c) = chars.find(|c| !(*c == '_' || c.is_ascii_alphanumeric())) {
        return Err(JoblyError::invalid_input(format!(
            "Invalid character in identifier: '{c}'"
        )));
    }
    Ok(())
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Ident {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
