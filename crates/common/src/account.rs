use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The only status value meaning "safe to serve requests".
///
/// Any other string is an operator-visible error description left behind by
/// a failed `save`, not a machine-readable code.
pub const WORKING_STATUS: &str = "work";

/// A configured, credentialed instance of one driver.
///
/// Each account forms an independent namespace root; the account record is
/// the sole owner of driver session state (`drive_id`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique key in the account store.
    pub name: String,
    /// Name of the driver this account is an instance of.
    pub driver: String,
    pub username: String,
    pub password: String,
    /// Root location inside the backend: a directory path for local-style
    /// drivers, a folder identifier for id-addressed ones.
    pub root_folder: String,
    pub status: String,
    /// Opaque session token set by the driver on a successful save.
    pub drive_id: String,
    /// Route downloads through this server instead of redirecting.
    pub proxy: bool,
    pub sort_by: SortBy,
    pub sort_direction: SortDirection,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Account {
    pub fn is_working(&self) -> bool {
        self.status == WORKING_STATUS
    }

    pub fn mark_working(&mut self) {
        self.status = WORKING_STATUS.to_string();
        self.updated_at = Some(Utc::now());
    }

    pub fn mark_failed(&mut self, reason: impl fmt::Display) {
        self.status = reason.to_string();
        self.updated_at = Some(Utc::now());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    Name,
    Size,
    UpdatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl Default for SortBy {
    fn default() -> Self {
        SortBy::Name
    }
}

impl Default for SortDirection {
    fn default() -> Self {
        SortDirection::Asc
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SortBy::Name => "name",
            SortBy::Size => "size",
            SortBy::UpdatedAt => "updated_at",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(SortBy::Name),
            "size" => Ok(SortBy::Size),
            "updated_at" => Ok(SortBy::UpdatedAt),
            other => Err(format!("unknown sort key: {}", other)),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn working_status_round_trip() {
        let mut account = Account {
            name: "a".into(),
            driver: "local".into(),
            username: String::new(),
            password: String::new(),
            root_folder: "/tmp".into(),
            status: String::new(),
            drive_id: String::new(),
            proxy: false,
            sort_by: SortBy::default(),
            sort_direction: SortDirection::default(),
            updated_at: None,
        };
        assert!(!account.is_working());
        account.mark_working();
        assert!(account.is_working());
        account.mark_failed("login rejected");
        assert!(!account.is_working());
        assert_eq!(account.status, "login rejected");
    }

    #[test]
    fn sort_keys_parse() {
        assert_eq!("size".parse::<SortBy>().unwrap(), SortBy::Size);
        assert_eq!("desc".parse::<SortDirection>().unwrap(), SortDirection::Desc);
        assert!("bogus".parse::<SortBy>().is_err());
    }
}
