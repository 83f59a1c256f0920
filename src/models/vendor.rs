use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum VendorStatus {
    Active,
    Inactive,
}

impl VendorStatus {
    /// Lenient parse for query-string filters; unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(VendorStatus::Active),
            "inactive" => Some(VendorStatus::Inactive),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Vendor {
    pub id: i64,
    pub name: String,
    pub status: VendorStatus,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Body for both create and update; update replaces every field it carries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VendorInput {
    pub name: Option<String>,
    pub status: Option<VendorStatus>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub notes: Option<String>,
}
