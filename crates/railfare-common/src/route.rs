//! Route directories and the table names derived from them
//!
//! A route such as `"HKI TPE"` is both a folder under the destination root and,
//! once normalized, the name of its PostgreSQL table (`hki_tpe`). Every other
//! per-route object is named after the table: `<table>_current`,
//! `<table>_price_range` and `trigger_<table>`.

use crate::error::{RailfareError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest table name whose derived identifiers still fit PostgreSQL's
/// 63-byte limit (`<table>_price_range` adds 12 bytes).
pub const MAX_TABLE_NAME_LEN: usize = 51;

/// A route directory name as configured, spaces and case preserved
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Route {
    name: String,
    table: TableName,
}

impl Route {
    /// Build a route, rejecting names that do not normalize to a usable table name
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let table = TableName::from_route(&name)?;
        Ok(Self { name, table })
    }

    /// Folder name under the destination root
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Destination table for this route
    pub fn table_name(&self) -> &TableName {
        &self.table
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Validated, normalized table identifier
///
/// Only ASCII letters, digits and underscores survive validation, which is what
/// lets the store splice the name into DDL and trigger arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TableName(String);

impl TableName {
    /// Normalize a route name: spaces become underscores, everything is lowercased
    pub fn from_route(route: &str) -> Result<Self> {
        let normalized = route.trim().replace(' ', "_").to_lowercase();
        Self::validate(route, &normalized)?;
        Ok(Self(normalized))
    }

    fn validate(route: &str, normalized: &str) -> Result<()> {
        let invalid = |reason: &str| RailfareError::InvalidRoute {
            route: route.to_string(),
            reason: reason.to_string(),
        };

        if normalized.is_empty() {
            return Err(invalid("name is empty"));
        }
        if normalized.len() > MAX_TABLE_NAME_LEN {
            return Err(invalid(&format!(
                "normalized name is longer than {} bytes",
                MAX_TABLE_NAME_LEN
            )));
        }
        if let Some(c) = normalized
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
        {
            return Err(invalid(&format!("character {:?} is not allowed", c)));
        }

        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Materialized view with the rows of the latest request date
    pub fn current_view(&self) -> String {
        format!("{}_current", self.0)
    }

    /// Materialized view with the per-day price range of the latest request date
    pub fn price_range_view(&self) -> String {
        format!("{}_price_range", self.0)
    }

    /// Trigger refreshing both views after updates
    pub fn trigger_name(&self) -> String {
        format!("trigger_{}", self.0)
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TableName {
    type Error = RailfareError;

    fn try_from(value: String) -> Result<Self> {
        Self::validate(&value, &value)?;
        Ok(Self(value))
    }
}

impl From<TableName> for String {
    fn from(value: TableName) -> Self {
        value.0
    }
}
