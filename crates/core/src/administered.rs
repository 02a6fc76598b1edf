use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Where an administered record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdministeredSource {
    /// Inferred locally because the due date has passed.
    AutoPastDue,
    /// Marked by the caregiver in this session.
    Manual,
    /// Confirmed by the system of record.
    ServerConfirmed,
}

impl AdministeredSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdministeredSource::AutoPastDue => "auto-past-due",
            AdministeredSource::Manual => "manual",
            AdministeredSource::ServerConfirmed => "server-confirmed",
        }
    }
}

/// Composite identity of a dose within the administered set.
///
/// No two administered records may share the same vaccine and date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DoseKey {
    pub vaccine: String,
    pub due_date: NaiveDate,
}

/// One administered (or administered-presumed) dose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdministeredRecord {
    pub vaccine: String,
    /// The date the dose was due (and is recorded against).
    pub due_date: NaiveDate,
    pub source: AdministeredSource,
}

impl AdministeredRecord {
    pub fn key(&self) -> DoseKey {
        DoseKey {
            vaccine: self.vaccine.clone(),
            due_date: self.due_date,
        }
    }
}
