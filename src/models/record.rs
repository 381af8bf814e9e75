//! Roster record models.

/// Which entry point a record arrived through.
///
/// The two entry points share one validation and reconciliation path and differ only
/// in the allowed user types, the `enable` flag and the display-name rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncVariant {
    /// CSV import from the command line
    Batch,
    /// JSON batch posted to the HTTP service
    Service,
}

impl SyncVariant {
    /// Whether `user_type` may be synced through this entry point.
    pub fn allows(&self, user_type: UserType) -> bool {
        match self {
            SyncVariant::Batch => matches!(user_type, UserType::Staff | UserType::Player),
            SyncVariant::Service => true,
        }
    }

    /// Whether every record must carry an explicit `enable` flag.
    pub fn requires_enable(&self) -> bool {
        matches!(self, SyncVariant::Service)
    }
}

/// Kind of roster member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserType {
    Staff,
    Player,
    Recruit,
    Guest,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Staff => "STAFF",
            UserType::Player => "PLAYER",
            UserType::Recruit => "RECRUIT",
            UserType::Guest => "GUEST",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "STAFF" => Some(UserType::Staff),
            "PLAYER" => Some(UserType::Player),
            "RECRUIT" => Some(UserType::Recruit),
            "GUEST" => Some(UserType::Guest),
            _ => None,
        }
    }
}

/// One unvalidated input row, as produced by the CSV or JSON adapters.
///
/// Empty strings are kept as-is here; the validator treats them as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub user_type: Option<String>,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub year: Option<String>,
    pub birthday: Option<String>,
    pub groups: Option<String>,
    pub enable: Option<bool>,
}

/// A validated roster entry ready to be reconciled against the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRecord {
    pub first_name: String,
    pub last_name: String,
    pub user_type: UserType,
    pub title: String,
    pub email: String,
    pub phone: String,
    pub year: Option<String>,
    pub birthday: Option<String>,
    /// Group names in input order; `None` leaves memberships untouched
    pub groups: Option<Vec<String>>,
    /// Only carried by service records
    pub enable: Option<bool>,
}

impl RosterRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Whether the record lists `group` among its groups (case-insensitive).
    pub fn in_group(&self, group: &str) -> bool {
        self.groups
            .as_ref()
            .is_some_and(|groups| groups.iter().any(|g| g.trim().eq_ignore_ascii_case(group)))
    }
}
