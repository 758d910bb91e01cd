/// Customer Data Model
///
/// Row type for the `customers` table, its status enum, and the explicit
/// partial-update structure used by `update_customer`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a customer account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerStatus {
    Active,
    Disabled,
}

impl CustomerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerStatus::Active => "active",
            CustomerStatus::Disabled => "disabled",
        }
    }
}

impl fmt::Display for CustomerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CustomerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(CustomerStatus::Active),
            "disabled" => Ok(CustomerStatus::Disabled),
            other => Err(format!(
                "Status must be \"active\" or \"disabled\", got \"{}\"",
                other
            )),
        }
    }
}

/// A persisted customer record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Surrogate key assigned by the store
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: CustomerStatus,
    pub created_at: DateTime<Utc>,
    /// Refreshed on every mutating operation
    pub updated_at: DateTime<Utc>,
}

/// A single field of a partial update.
///
/// `Keep` means the caller did not mention the field at all, which is
/// distinct from `Clear` (explicit null) and `Set` (a new value).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    Keep,
    Clear,
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Keep
    }
}

impl<T> Patch<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, Patch::Keep)
    }
}

/// Fields supplied to `update_customer`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerUpdate {
    pub name: Patch<String>,
    pub email: Patch<String>,
    pub phone: Patch<String>,
}

impl CustomerUpdate {
    /// True when the caller supplied no field at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_keep() && self.email.is_keep() && self.phone.is_keep()
    }
}

/// Row counts reported at startup and by the health probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub total: i64,
    pub active: i64,
    pub disabled: i64,
}
