// src/models/mod.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ───────────────────────────────────────
// Accounts (role kept as TEXT in the DB)
// ───────────────────────────────────────
#[derive(Debug, FromRow)]
pub struct User {
    pub user_id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Closed set of roles. `Role::parse` is the single point where the DB
/// string becomes a variant; everything downstream checks capabilities on
/// the enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Supervisor,
    Management,
}

impl Role {
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "admin" => Some(Role::Admin),
            "supervisor" => Some(Role::Supervisor),
            "management" => Some(Role::Management),
            _ => None,
        }
    }

    /// Whether this role may mutate operators and reports.
    pub fn can_manage(self) -> bool {
        matches!(self, Role::Admin | Role::Supervisor)
    }
}

// ───────────────────────────────────────
// Operators
// ───────────────────────────────────────
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Operator {
    pub operator_id: i64,
    pub full_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

// ───────────────────────────────────────
// Shift reports
// ───────────────────────────────────────

/// The three daily reporting windows, in chronological order. The order is
/// load-bearing: it decides which slot counts as "previous" when a
/// cumulative call total is turned into a per-slot delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "time_slot", rename_all = "lowercase")]
pub enum Shift {
    Morning,   // 08:00 - 12:00
    Afternoon, // 12:00 - 18:00
    Evening,   // 18:00 - 20:00
}

impl Shift {
    pub const ALL: [Shift; 3] = [Shift::Morning, Shift::Afternoon, Shift::Evening];

    /// The immediately preceding slot, or `None` for the first of the day.
    pub fn prev(self) -> Option<Shift> {
        match self {
            Shift::Morning => None,
            Shift::Afternoon => Some(Shift::Morning),
            Shift::Evening => Some(Shift::Afternoon),
        }
    }
}

/// One row per (operator, date, slot). `calls_cumulative` is a running
/// total since the start of the day, not a per-slot count.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Report {
    pub report_id: i64,
    pub operator_id: i64,
    pub report_date: NaiveDate,
    pub slot: Shift,
    pub calls_cumulative: i32,
    pub incoming_accepted: i32,
    pub outgoing_made: i32,
    pub missed: i32,
    pub minutes_on_line: i32,
    pub minutes_in_calls: i32,
    pub recordings: i32,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct ReportWithOperator {
    pub report_id: i64,
    pub operator_id: i64,
    pub operator_name: String,
    pub report_date: NaiveDate,
    pub slot: Shift,
    pub calls_cumulative: i32,
    pub incoming_accepted: i32,
    pub outgoing_made: i32,
    pub missed: i32,
    pub minutes_on_line: i32,
    pub minutes_in_calls: i32,
    pub recordings: i32,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ───────────────────────────────────────
// DTOs helpful for endpoints
// ───────────────────────────────────────
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_order_defines_previous() {
        assert_eq!(Shift::Morning.prev(), None);
        assert_eq!(Shift::Afternoon.prev(), Some(Shift::Morning));
        assert_eq!(Shift::Evening.prev(), Some(Shift::Afternoon));
    }

    #[test]
    fn slot_serde_spelling() {
        assert_eq!(serde_json::to_string(&Shift::Morning).unwrap(), r#""morning""#);
        let s: Shift = serde_json::from_str(r#""evening""#).unwrap();
        assert_eq!(s, Shift::Evening);
        assert!(serde_json::from_str::<Shift>(r#""night""#).is_err());
    }

    #[test]
    fn role_parse_is_closed() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("supervisor"), Some(Role::Supervisor));
        assert_eq!(Role::parse("management"), Some(Role::Management));
        assert_eq!(Role::parse("root"), None);
        assert_eq!(Role::parse("Admin"), None);
    }

    #[test]
    fn only_admin_and_supervisor_manage() {
        assert!(Role::Admin.can_manage());
        assert!(Role::Supervisor.can_manage());
        assert!(!Role::Management.can_manage());
    }
}
