//! Department module - the closed label set and its reference catalog

use std::fmt;

/// Department label (closed set of 9; part of the external contract)
///
/// Adding or renaming a label is a versioned change: stored grievances,
/// session tokens and the model prompt all carry these strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DepartmentId {
    /// Water supply, leaks, pipes
    Water,
    /// Garbage, sewage, drains
    Sanitation,
    /// Roads, potholes, pavements
    Roads,
    /// Power outages, streetlights
    Electricity,
    /// Hospitals, clinics, public health
    Health,
    /// Crime and public safety
    Police,
    /// Buildings, construction, permits
    Housing,
    /// General services
    General,
    /// Anything that cannot be placed
    Miscellaneous,
}

impl DepartmentId {
    /// Every label, in declaration order
    pub const ALL: [DepartmentId; 9] = [
        DepartmentId::Water,
        DepartmentId::Sanitation,
        DepartmentId::Roads,
        DepartmentId::Electricity,
        DepartmentId::Health,
        DepartmentId::Police,
        DepartmentId::Housing,
        DepartmentId::General,
        DepartmentId::Miscellaneous,
    ];

    /// Get the wire label
    pub fn as_str(&self) -> &'static str {
        match self {
            DepartmentId::Water => "water",
            DepartmentId::Sanitation => "sanitation",
            DepartmentId::Roads => "roads",
            DepartmentId::Electricity => "electricity",
            DepartmentId::Health => "health",
            DepartmentId::Police => "police",
            DepartmentId::Housing => "housing",
            DepartmentId::General => "general",
            DepartmentId::Miscellaneous => "miscellaneous",
        }
    }

    /// Parse an exact wire label
    ///
    /// Matching is case-sensitive: the label set is a contract, not free text.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|d| d.as_str() == s)
    }
}

impl fmt::Display for DepartmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DepartmentId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid department: {}", s))
    }
}

/// Department reference data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Department {
    /// Label
    pub id: DepartmentId,
    /// Human-readable name
    pub display_name: &'static str,
    /// Target resolution time in hours
    pub sla_hours: u32,
    /// Contact address
    pub contact_email: &'static str,
}

impl Department {
    /// Look up the catalog entry for a label
    pub fn get(id: DepartmentId) -> &'static Department {
        // CATALOG is declared in DepartmentId::ALL order
        &CATALOG[id as usize]
    }

    /// The full reference catalog
    pub fn catalog() -> &'static [Department] {
        &CATALOG
    }
}

static CATALOG: [Department; 9] = [
    Department {
        id: DepartmentId::Water,
        display_name: "Water Supply",
        sla_hours: 24,
        contact_email: "water@municipal.gov",
    },
    Department {
        id: DepartmentId::Sanitation,
        display_name: "Sanitation & Waste",
        sla_hours: 48,
        contact_email: "sanitation@municipal.gov",
    },
    Department {
        id: DepartmentId::Roads,
        display_name: "Roads & Infrastructure",
        sla_hours: 72,
        contact_email: "roads@municipal.gov",
    },
    Department {
        id: DepartmentId::Electricity,
        display_name: "Electricity",
        sla_hours: 12,
        contact_email: "electricity@municipal.gov",
    },
    Department {
        id: DepartmentId::Health,
        display_name: "Public Health",
        sla_hours: 24,
        contact_email: "health@municipal.gov",
    },
    Department {
        id: DepartmentId::Police,
        display_name: "Police & Safety",
        sla_hours: 2,
        contact_email: "police@municipal.gov",
    },
    Department {
        id: DepartmentId::Housing,
        display_name: "Housing & Building",
        sla_hours: 120,
        contact_email: "housing@municipal.gov",
    },
    Department {
        id: DepartmentId::General,
        display_name: "General Services",
        sla_hours: 96,
        contact_email: "general@municipal.gov",
    },
    Department {
        id: DepartmentId::Miscellaneous,
        display_name: "Miscellaneous",
        sla_hours: 168,
        contact_email: "misc@municipal.gov",
    },
];
