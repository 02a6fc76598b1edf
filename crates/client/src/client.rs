//! HTTP client for the chanjo backend REST API.

use chanjo_core::config::ApiConfig;
use chanjo_core::{AdministeredRecord, BabyId, Gender, MotherProfile, Profile};
use chrono::NaiveDate;

use crate::error::ApiError;
use crate::types::{
    AdministeredListBody, BirthDateBody, CreateBabyBody, CreateBabyResponse, CredentialsBody,
    LoginResponse, MarkBody, ProfileBody, ResetPasswordBody, SignupResponse, SubmitProfileBody,
};

/// Client for the backend REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Create a new client for the given base URL.
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        let http = reqwest::Client::new();
        Self { base_url, http }
    }

    /// Build a client from config, applying the request timeout.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    /// Turn a non-2xx response into a typed status error.
    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        tracing::warn!(%status, body = %body, "backend returned non-2xx status");
        Err(ApiError::Status { status, body })
    }

    // ── Auth ──────────────────────────────────────────────────

    /// Create an account. Returns the bearer token.
    pub async fn signup(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let resp = self
            .http
            .post(self.url("/signup"))
            .json(&CredentialsBody {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        let body: SignupResponse = Self::check(resp).await?.json().await?;
        Ok(body.token)
    }

    /// Log in. Returns the bearer token and whether a password reset is
    /// required before anything else.
    pub async fn login(&self, email: &str, password: &str) -> Result<(String, bool), ApiError> {
        let resp = self
            .http
            .post(self.url("/login"))
            .json(&CredentialsBody {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        let body: LoginResponse = Self::check(resp).await?.json().await?;
        Ok((body.token, body.must_reset))
    }

    /// Complete a forced password reset.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), ApiError> {
        let resp = self
            .http
            .post(self.url("/reset-password"))
            .bearer_auth(token)
            .json(&ResetPasswordBody {
                new_password: new_password.to_string(),
            })
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    // ── Profile ───────────────────────────────────────────────

    /// Fetch the caregiver profile and registered babies.
    pub async fn profile(&self, token: &str) -> Result<Profile, ApiError> {
        let resp = self
            .http
            .get(self.url("/profile"))
            .bearer_auth(token)
            .send()
            .await?;
        let body: ProfileBody = Self::check(resp).await?.json().await?;
        Profile::try_from(body)
    }

    /// Submit the initial mother/baby profile. Returns the new baby's ID;
    /// the caller is expected to follow up with [`init_administered`].
    ///
    /// [`init_administered`]: ApiClient::init_administered
    pub async fn submit_profile(
        &self,
        token: &str,
        mother: &MotherProfile,
        baby_name: &str,
        date_of_birth: NaiveDate,
        gender: Gender,
    ) -> Result<BabyId, ApiError> {
        let resp = self
            .http
            .post(self.url("/profile"))
            .bearer_auth(token)
            .json(&SubmitProfileBody {
                full_name: mother.full_name.clone(),
                phone_number: mother.phone_number.clone(),
                baby_name: baby_name.to_string(),
                date_of_birth,
                gender: gender.as_str().to_string(),
            })
            .send()
            .await?;
        let body: CreateBabyResponse = Self::check(resp).await?.json().await?;
        Ok(body.baby.baby_id)
    }

    // ── Babies ────────────────────────────────────────────────

    /// Register a new baby. Returns the server-issued baby ID; the caller
    /// is expected to follow up with [`init_administered`].
    ///
    /// [`init_administered`]: ApiClient::init_administered
    pub async fn create_baby(
        &self,
        token: &str,
        name: &str,
        date_of_birth: NaiveDate,
        gender: Gender,
    ) -> Result<BabyId, ApiError> {
        let resp = self
            .http
            .post(self.url("/baby"))
            .bearer_auth(token)
            .json(&CreateBabyBody {
                baby_name: name.to_string(),
                date_of_birth,
                gender: gender.as_str().to_string(),
            })
            .send()
            .await?;
        let body: CreateBabyResponse = Self::check(resp).await?.json().await?;
        Ok(body.baby.baby_id)
    }

    /// Initialize server-side administered tracking for a new baby.
    /// Called once at baby-creation time.
    pub async fn init_administered(&self, token: &str, baby_id: &str) -> Result<(), ApiError> {
        let resp = self
            .http
            .post(self.url(&format!("/baby/{baby_id}/administered/init")))
            .bearer_auth(token)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    /// Update a baby's birth date. The schedule regenerates entirely from
    /// the new date on the next load.
    pub async fn update_birth_date(
        &self,
        token: &str,
        baby_id: &str,
        birth_date: NaiveDate,
    ) -> Result<(), ApiError> {
        let resp = self
            .http
            .put(self.url(&format!("/baby/{baby_id}/birth-date")))
            .bearer_auth(token)
            .json(&BirthDateBody { birth_date })
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    // ── Administered history ──────────────────────────────────

    /// Fetch the confirmed administered list for a baby.
    pub async fn administered(
        &self,
        token: &str,
        baby_id: &str,
    ) -> Result<Vec<AdministeredRecord>, ApiError> {
        let resp = self
            .http
            .get(self.url(&format!("/baby/{baby_id}/administered")))
            .bearer_auth(token)
            .send()
            .await?;
        let body: AdministeredListBody = Self::check(resp).await?.json().await?;
        body.administered
            .into_iter()
            .map(AdministeredRecord::try_from)
            .collect()
    }

    /// Persist a manual mark against the system of record. Best-effort:
    /// the response body is ignored beyond the status.
    pub async fn mark_administered(
        &self,
        token: &str,
        baby_id: &str,
        vaccine: &str,
        date: NaiveDate,
    ) -> Result<(), ApiError> {
        let resp = self
            .http
            .post(self.url(&format!("/baby/{baby_id}/administered/mark")))
            .bearer_auth(token)
            .json(&MarkBody {
                vaccine: vaccine.to_string(),
                date,
                kind: "manual",
            })
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    /// Base URL with any trailing slash removed.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_trimmed() {
        let client = ApiClient::new("http://localhost:3001///");
        assert_eq!(client.base_url(), "http://localhost:3001");
        assert_eq!(
            client.url("/baby/b1/administered"),
            "http://localhost:3001/api/baby/b1/administered"
        );
    }

    #[test]
    fn from_config_applies_base_url() {
        let config = ApiConfig {
            base_url: "https://api.example.com/".to_string(),
            timeout_secs: 5,
        };
        let client = ApiClient::from_config(&config).unwrap();
        assert_eq!(client.base_url(), "https://api.example.com");
    }
}
