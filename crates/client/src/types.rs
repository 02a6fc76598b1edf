//! Wire types for the backend API.
//!
//! Field names mirror the backend JSON exactly (a mix of camelCase and
//! snake_case, preserved as-is). Conversions into domain types live here so
//! the rest of the workspace never sees raw wire data.

use chanjo_core::{
    AdministeredRecord, AdministeredSource, Baby, Gender, MotherProfile, Profile,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

// ── Auth ──────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct CredentialsBody {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SignupResponse {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub token: String,
    #[serde(rename = "mustReset", default)]
    pub must_reset: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResetPasswordBody {
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

// ── Profile ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct ProfileBody {
    #[serde(rename = "mustResetPassword", default)]
    pub must_reset_password: bool,
    #[serde(rename = "profileComplete", default)]
    pub profile_complete: bool,
    pub mother: Option<MotherBody>,
    #[serde(default)]
    pub babies: Vec<BabyBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MotherBody {
    pub full_name: String,
    pub phone_number: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BabyBody {
    pub id: String,
    pub baby_name: String,
    pub date_of_birth: String,
    pub gender: String,
}

impl TryFrom<ProfileBody> for Profile {
    type Error = ApiError;

    fn try_from(body: ProfileBody) -> Result<Self, Self::Error> {
        let babies = body
            .babies
            .into_iter()
            .map(Baby::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Profile {
            must_reset_password: body.must_reset_password,
            profile_complete: body.profile_complete,
            mother: body.mother.map(|m| MotherProfile {
                full_name: m.full_name,
                phone_number: m.phone_number,
            }),
            babies,
        })
    }
}

impl TryFrom<BabyBody> for Baby {
    type Error = ApiError;

    fn try_from(body: BabyBody) -> Result<Self, Self::Error> {
        let date_of_birth = parse_wire_date(&body.date_of_birth).ok_or_else(|| {
            ApiError::Decode(format!(
                "baby '{}' has invalid date_of_birth: {:?}",
                body.id, body.date_of_birth
            ))
        })?;
        let gender = body
            .gender
            .parse::<Gender>()
            .map_err(|e| ApiError::Decode(format!("baby '{}': {e}", body.id)))?;
        Ok(Baby {
            id: body.id,
            name: body.baby_name,
            date_of_birth,
            gender,
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmitProfileBody {
    #[serde(rename = "fullName")]
    pub full_name: String,
    #[serde(rename = "phoneNumber")]
    pub phone_number: String,
    #[serde(rename = "babyName")]
    pub baby_name: String,
    #[serde(rename = "dateOfBirth")]
    pub date_of_birth: NaiveDate,
    pub gender: String,
}

// ── Babies ────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct CreateBabyBody {
    #[serde(rename = "babyName")]
    pub baby_name: String,
    #[serde(rename = "dateOfBirth")]
    pub date_of_birth: NaiveDate,
    pub gender: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateBabyResponse {
    pub baby: CreatedBaby,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedBaby {
    #[serde(rename = "babyId")]
    pub baby_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct BirthDateBody {
    #[serde(rename = "birthDate")]
    pub birth_date: NaiveDate,
}

// ── Administered history ──────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct AdministeredListBody {
    #[serde(default)]
    pub administered: Vec<AdministeredEntryBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AdministeredEntryBody {
    pub vaccine: String,
    pub date: String,
}

impl TryFrom<AdministeredEntryBody> for AdministeredRecord {
    type Error = ApiError;

    fn try_from(body: AdministeredEntryBody) -> Result<Self, Self::Error> {
        let due_date = parse_wire_date(&body.date).ok_or_else(|| {
            ApiError::Decode(format!(
                "administered entry '{}' has invalid date: {:?}",
                body.vaccine, body.date
            ))
        })?;
        Ok(AdministeredRecord {
            vaccine: body.vaccine,
            due_date,
            source: AdministeredSource::ServerConfirmed,
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct MarkBody {
    pub vaccine: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

/// Parse a backend date: plain `YYYY-MM-DD`, or a timestamp whose first ten
/// characters are the date (`2024-02-12T00:00:00Z`).
pub(crate) fn parse_wire_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    if trimmed.len() > 10 {
        return NaiveDate::parse_from_str(&trimmed[..10], "%Y-%m-%d").ok();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_wire_date_variants() {
        let expected = NaiveDate::from_ymd_opt(2024, 2, 12).unwrap();
        assert_eq!(parse_wire_date("2024-02-12"), Some(expected));
        assert_eq!(parse_wire_date("2024-02-12T00:00:00Z"), Some(expected));
        assert_eq!(parse_wire_date(" 2024-02-12 "), Some(expected));
        assert_eq!(parse_wire_date("12/02/2024"), None);
        assert_eq!(parse_wire_date(""), None);
    }

    #[test]
    fn profile_body_decodes_backend_field_names() {
        let json = r#"{
            "mustResetPassword": false,
            "profileComplete": true,
            "mother": { "full_name": "Jane Doe", "phone_number": "+254700000000" },
            "babies": [
                { "id": "b1", "baby_name": "Amina", "date_of_birth": "2024-01-01", "gender": "Female" }
            ]
        }"#;
        let body: ProfileBody = serde_json::from_str(json).unwrap();
        let profile = Profile::try_from(body).unwrap();
        assert!(profile.profile_complete);
        assert_eq!(profile.mother.as_ref().unwrap().full_name, "Jane Doe");
        assert_eq!(profile.babies.len(), 1);
        assert_eq!(profile.babies[0].name, "Amina");
        assert_eq!(profile.babies[0].gender, Gender::Female);
    }

    #[test]
    fn profile_with_bad_birth_date_is_a_decode_error() {
        let body = ProfileBody {
            must_reset_password: false,
            profile_complete: true,
            mother: None,
            babies: vec![BabyBody {
                id: "b1".to_string(),
                baby_name: "Amina".to_string(),
                date_of_birth: "yesterday".to_string(),
                gender: "Female".to_string(),
            }],
        };
        assert!(matches!(
            Profile::try_from(body),
            Err(ApiError::Decode(_))
        ));
    }

    #[test]
    fn administered_entry_converts_with_server_source() {
        let entry = AdministeredEntryBody {
            vaccine: "OPV 1".to_string(),
            date: "2024-02-12T08:30:00Z".to_string(),
        };
        let record = AdministeredRecord::try_from(entry).unwrap();
        assert_eq!(record.source, AdministeredSource::ServerConfirmed);
        assert_eq!(
            record.due_date,
            NaiveDate::from_ymd_opt(2024, 2, 12).unwrap()
        );
    }

    #[test]
    fn mark_body_serializes_type_field() {
        let body = MarkBody {
            vaccine: "OPV 1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 2, 12).unwrap(),
            kind: "manual",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["type"], "manual");
        assert_eq!(json["date"], "2024-02-12");
        assert_eq!(json["vaccine"], "OPV 1");
    }

    #[test]
    fn login_response_defaults_must_reset() {
        let body: LoginResponse = serde_json::from_str(r#"{"token":"t1"}"#).unwrap();
        assert!(!body.must_reset);
        let body: LoginResponse =
            serde_json::from_str(r#"{"token":"t1","mustReset":true}"#).unwrap();
        assert!(body.must_reset);
    }
}
