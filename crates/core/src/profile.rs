use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ChanjoError;

/// Server-issued baby identifier (opaque string).
pub type BabyId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = ChanjoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            other => Err(ChanjoError::Parse(format!("unknown gender: {other}"))),
        }
    }
}

/// A registered baby, as known to the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Baby {
    pub id: BabyId,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
}

/// The caregiver's own profile data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotherProfile {
    pub full_name: String,
    pub phone_number: String,
}

/// The caregiver account as returned by `GET /api/profile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub must_reset_password: bool,
    pub profile_complete: bool,
    pub mother: Option<MotherProfile>,
    pub babies: Vec<Baby>,
}

impl Profile {
    /// Resolve a baby by ID, exact name, or unambiguous name prefix.
    ///
    /// `None` selects the first registered baby.
    pub fn resolve_baby(&self, selector: Option<&str>) -> Result<&Baby, ChanjoError> {
        let Some(sel) = selector else {
            return self
                .babies
                .first()
                .ok_or_else(|| ChanjoError::BabyNotFound("no babies registered".to_string()));
        };

        if let Some(baby) = self.babies.iter().find(|b| b.id == sel) {
            return Ok(baby);
        }

        let sel_lower = sel.to_lowercase();
        let matches: Vec<&Baby> = self
            .babies
            .iter()
            .filter(|b| b.name.to_lowercase().starts_with(&sel_lower))
            .collect();

        match matches.len() {
            0 => Err(ChanjoError::BabyNotFound(sel.to_string())),
            1 => Ok(matches[0]),
            n => Err(ChanjoError::Validation(format!(
                "ambiguous baby '{sel}': {n} matches found. Use a more specific name or the ID."
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baby(id: &str, name: &str) -> Baby {
        Baby {
            id: id.to_string(),
            name: name.to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            gender: Gender::Female,
        }
    }

    fn profile(babies: Vec<Baby>) -> Profile {
        Profile {
            must_reset_password: false,
            profile_complete: true,
            mother: None,
            babies,
        }
    }

    #[test]
    fn gender_from_str() {
        assert_eq!(Gender::from_str("Male").unwrap(), Gender::Male);
        assert_eq!(Gender::from_str("female").unwrap(), Gender::Female);
        assert_eq!(Gender::from_str("F").unwrap(), Gender::Female);
        assert!(Gender::from_str("other").is_err());
    }

    #[test]
    fn resolve_baby_default_is_first() {
        let p = profile(vec![baby("b1", "Amina"), baby("b2", "Baraka")]);
        assert_eq!(p.resolve_baby(None).unwrap().id, "b1");
    }

    #[test]
    fn resolve_baby_by_id_and_prefix() {
        let p = profile(vec![baby("b1", "Amina"), baby("b2", "Baraka")]);
        assert_eq!(p.resolve_baby(Some("b2")).unwrap().name, "Baraka");
        assert_eq!(p.resolve_baby(Some("ami")).unwrap().id, "b1");
    }

    #[test]
    fn resolve_baby_ambiguous_prefix() {
        let p = profile(vec![baby("b1", "Amina"), baby("b2", "Amani")]);
        assert!(matches!(
            p.resolve_baby(Some("am")),
            Err(ChanjoError::Validation(_))
        ));
    }

    #[test]
    fn resolve_baby_empty_profile() {
        let p = profile(vec![]);
        assert!(matches!(
            p.resolve_baby(None),
            Err(ChanjoError::BabyNotFound(_))
        ));
    }
}
