//! Role module

use std::fmt;

/// Session role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Submits grievances and sees their own
    Citizen,
    /// Acts within a department scope
    Admin,
    /// Unrestricted
    Superadmin,
}

impl Role {
    /// Get the wire label
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Citizen => "citizen",
            Role::Admin => "admin",
            Role::Superadmin => "superadmin",
        }
    }

    /// Parse an exact wire label
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "citizen" => Some(Role::Citizen),
            "admin" => Some(Role::Admin),
            "superadmin" => Some(Role::Superadmin),
            _ => None,
        }
    }

    /// Whether this role may use the staff (admin) paths at all
    pub fn is_staff(&self) -> bool {
        match self {
            Role::Citizen => false,
            Role::Admin | Role::Superadmin => true,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid role: {}", s))
    }
}
