//! JSON bodies exchanged with the browser.
//!
//! Everything here is serialized in camelCase because the frontend expects
//! `displayName`, `primaryColor`, and so on. Optional fields are omitted
//! instead of being sent as `null`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Realm;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A stable identifier for a registered traveller.
///
/// Progression is keyed by this, not by session, so it survives logout and
/// login.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wraps an id as issued by the user directory. No validation happens
    /// here; ids arriving from outside go through the gatekeeper's checks.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The parts of a user that are safe to hand to the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: UserId,
    pub username: String,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// `POST /login` body. Missing fields decode as empty strings so the
/// handler can answer with a precise message instead of a parse error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// `POST /submit-flag` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitFlagRequest {
    #[serde(default)]
    pub flag: Option<String>,
}

/// `POST /internal/flags` body: which traveller's flag to issue, for which
/// realm. Field names match what the realm services already send.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueFlagRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub realm_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Outcome marker carried by every status body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// The generic `{ status, message, ... }` body used by the JSON endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: ResponseStatus,
    pub message: String,
    /// Realm unlocked by an accepted flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocked: Option<Realm>,
    /// Realm the accepted flag belonged to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realm: Option<Realm>,
    /// Set once Asgard has been solved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complete: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<PublicUser>,
}

impl StatusResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self::with_status(ResponseStatus::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_status(ResponseStatus::Error, message)
    }

    fn with_status(status: ResponseStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            unlocked: None,
            realm: None,
            complete: None,
            user: None,
        }
    }
}

/// Theme block nested in each [`RealmSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealmThemeSummary {
    pub primary_color: String,
    pub image: String,
    pub category: String,
}

/// One entry of `GET /realms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealmSummary {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub order: u8,
    pub locked: bool,
    pub theme: RealmThemeSummary,
}

impl RealmSummary {
    /// Builds the summary of `realm` as seen by a caller for whom it is
    /// `locked` or not.
    pub fn new(realm: Realm, locked: bool) -> Self {
        let meta = realm.metadata();
        Self {
            name: realm.name().to_string(),
            display_name: meta.display_name.to_string(),
            description: meta.description.to_string(),
            order: realm.order(),
            locked,
            theme: RealmThemeSummary {
                primary_color: meta.theme.primary_color.to_string(),
                image: meta.theme.image.to_string(),
                category: meta.theme.category.to_string(),
            },
        }
    }
}

/// `GET /realms` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealmListResponse {
    pub realms: Vec<RealmSummary>,
}

/// `GET /auth/status` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthStatusResponse {
    pub authenticated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<PublicUser>,
}

/// `POST /internal/flags` reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueFlagResponse {
    pub status: String,
    pub flag: String,
    /// Uppercase realm tag, as it appears inside the flag.
    pub realm_id: String,
}

/// `GET /health` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

impl HealthResponse {
    pub fn ok(service: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_flag_request_reads_camel_case() {
        let req: IssueFlagRequest =
            serde_json::from_str(r#"{"userId":"user_1","realmId":"niflheim"}"#).unwrap();
        assert_eq!(req.user_id.as_deref(), Some("user_1"));
        assert_eq!(req.realm_id.as_deref(), Some("niflheim"));

        let empty: IssueFlagRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, IssueFlagRequest::default());
    }

    #[test]
    fn test_realm_summary_serializes_camel_case() {
        let summary = RealmSummary::new(Realm::Niflheim, false);
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["name"], "niflheim");
        assert_eq!(json["displayName"], "Niflheim");
        assert_eq!(json["order"], 10);
        assert_eq!(json["locked"], false);
        assert_eq!(json["theme"]["primaryColor"], "#60a5fa");
        assert_eq!(json["theme"]["category"], "A10:2025 Exceptional Conditions");
    }

    #[test]
    fn test_status_response_omits_empty_optionals() {
        let json = serde_json::to_value(StatusResponse::error("nope")).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "error", "message": "nope" }));
    }

    #[test]
    fn test_status_response_includes_unlocked_realm() {
        let mut body = StatusResponse::success("Flag accepted");
        body.unlocked = Some(Realm::Helheim);
        body.realm = Some(Realm::Niflheim);

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["unlocked"], "helheim");
        assert_eq!(json["realm"], "niflheim");
        assert!(json.get("complete").is_none());
    }

    #[test]
    fn test_login_request_missing_fields_default_to_empty() {
        let req: LoginRequest = serde_json::from_str("{}").unwrap();
        assert!(req.username.is_empty());
        assert!(req.password.is_empty());
    }

    #[test]
    fn test_submit_flag_request_missing_flag_is_none() {
        let req: SubmitFlagRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.flag, None);
    }

    #[test]
    fn test_user_id_is_transparent() {
        let json = serde_json::to_string(&UserId::new("user_1")).unwrap();
        assert_eq!(json, "\"user_1\"");
    }
}
