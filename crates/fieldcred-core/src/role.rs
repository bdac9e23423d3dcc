//! Role registry
//!
//! The closed set of roles a field credential can carry. The table is static
//! and read-only for the life of the process; the catalog view is purely
//! informational and carries no security weight.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::RoleNotFound;

/// Volunteer role carried by a credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Medic,
    SearchRescue,
    Coordinator,
    Firefighter,
    Police,
    CivilDefense,
    Volunteer,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::Medic,
        Role::SearchRescue,
        Role::Coordinator,
        Role::Firefighter,
        Role::Police,
        Role::CivilDefense,
        Role::Volunteer,
    ];

    /// Wire identifier, as it appears in payloads and requests
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Medic => "medic",
            Role::SearchRescue => "search_rescue",
            Role::Coordinator => "coordinator",
            Role::Firefighter => "firefighter",
            Role::Police => "police",
            Role::CivilDefense => "civil_defense",
            Role::Volunteer => "volunteer",
        }
    }

    /// Exact, case-sensitive lookup by wire identifier
    pub fn from_id(id: &str) -> Option<Self> {
        Role::ALL.into_iter().find(|role| role.as_str() == id)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Medic => "Medic",
            Role::SearchRescue => "Search & Rescue",
            Role::Coordinator => "Field Coordinator",
            Role::Firefighter => "Firefighter",
            Role::Police => "Police",
            Role::CivilDefense => "Civil Defense",
            Role::Volunteer => "Volunteer",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Role::Medic => "Provides triage and emergency medical care on site",
            Role::SearchRescue => "Locates and extracts trapped or missing people",
            Role::Coordinator => "Directs teams and allocates resources at an incident site",
            Role::Firefighter => "Fire suppression and hazardous material response",
            Role::Police => "Perimeter, traffic and evacuation control",
            Role::CivilDefense => "Shelter operations and public protection measures",
            Role::Volunteer => "General logistics and supply support",
        }
    }

    /// Capabilities granted to holders of this role
    pub fn permissions(&self) -> &'static [&'static str] {
        match self {
            Role::Medic => &[
                "triage",
                "first_aid",
                "medical_supplies_access",
                "casualty_reporting",
            ],
            Role::SearchRescue => &[
                "collapsed_structure_entry",
                "survivor_extraction",
                "rescue_equipment_access",
                "casualty_reporting",
            ],
            Role::Coordinator => &[
                "team_assignment",
                "resource_allocation",
                "site_access",
                "incident_reporting",
                "volunteer_verification",
            ],
            Role::Firefighter => &[
                "fire_suppression",
                "hazmat_response",
                "collapsed_structure_entry",
                "evacuation_order",
            ],
            Role::Police => &[
                "perimeter_control",
                "traffic_control",
                "evacuation_order",
                "site_access",
            ],
            Role::CivilDefense => &[
                "shelter_management",
                "evacuation_order",
                "resource_allocation",
                "site_access",
            ],
            Role::Volunteer => &["logistics_support", "supply_distribution"],
        }
    }

    pub fn info(&self) -> RoleInfo {
        RoleInfo {
            id: self.as_str().to_string(),
            name: self.label().to_string(),
            description: self.description().to_string(),
            permissions: self.permissions().iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl FromStr for Role {
    type Err = RoleNotFound;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::from_id(s).ok_or_else(|| RoleNotFound(s.to_string()))
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catalog entry for informational lookups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub permissions: Vec<String>,
}

/// Process-wide view over the fixed role table
pub struct RoleRegistry;

impl RoleRegistry {
    pub fn is_valid(role: &str) -> bool {
        Role::from_id(role).is_some()
    }

    pub fn get(role: &str) -> Result<Role, RoleNotFound> {
        role.parse()
    }

    pub fn permissions_for(role: &str) -> Result<&'static [&'static str], RoleNotFound> {
        Ok(Self::get(role)?.permissions())
    }

    pub fn info(role: &str) -> Result<RoleInfo, RoleNotFound> {
        Ok(Self::get(role)?.info())
    }

    /// Full catalog in registry order
    pub fn catalog() -> Vec<RoleInfo> {
        Role::ALL.iter().map(Role::info).collect()
    }
}
