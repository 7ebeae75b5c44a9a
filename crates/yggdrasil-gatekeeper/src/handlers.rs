//! HTTP handlers.
//!
//! Handlers are generic over the authenticator and progression backend so
//! tests can mount the same routes over in-memory stores.

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use subtle::ConstantTimeEq;
use yggdrasil_progression::{FlagOutcome, ProgressionRepository};
use yggdrasil_realm::{
    AuthStatusResponse, HealthResponse, IssueFlagRequest, IssueFlagResponse, LoginRequest,
    PublicUser, Realm, RealmListResponse, RealmSummary, StatusResponse, SubmitFlagRequest,
    UserId,
};
use yggdrasil_session::{Authenticator, Session, SessionId};

use crate::GatekeeperError;
use crate::config::SESSION_COOKIE;
use crate::pages;
use crate::rate_limit::RateLimitDecision;
use crate::server::AppState;

type State<A, R> = web::Data<AppState<A, R>>;

fn client_ip(req: &HttpRequest) -> String {
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn public_user(session: &Session) -> PublicUser {
    PublicUser {
        id: session.user_id.clone(),
        username: session.username.clone(),
    }
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse::ok("gatekeeper"))
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// `POST /login`
pub async fn login<A: Authenticator, R: ProgressionRepository>(
    req: HttpRequest,
    state: State<A, R>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, GatekeeperError> {
    let ip = client_ip(&req);

    if let RateLimitDecision::Limited { retry_after } =
        state.login_limiter.check(&format!("login:{ip}")).await
    {
        tracing::warn!(%ip, retry_after_secs = retry_after.as_secs(), "login rate limit exceeded");
        return Err(GatekeeperError::RateLimited { retry_after });
    }

    let LoginRequest { username, password } = body.into_inner();
    if username.trim().is_empty() || password.is_empty() {
        return Err(GatekeeperError::BadRequest(
            "Username and password are required".into(),
        ));
    }

    let user = state.auth.authenticate(&username, &password).await?;

    // A session presented at login is never reused.
    if let Some(old) = req.cookie(SESSION_COOKIE) {
        state.sessions.destroy(&SessionId::from(old.value())).await;
    }

    let session_id = SessionId::generate();
    state
        .sessions
        .set(session_id.clone(), Session::new(user.id.clone(), user.username.clone()))
        .await;
    state.tracker.initialize(&user.id).await?;

    tracing::info!(user_id = %user.id, %ip, "login succeeded");

    let mut body = StatusResponse::success("Login successful");
    body.user = Some(user.to_public());
    Ok(HttpResponse::Ok()
        .cookie(state.session_cookie(&session_id))
        .json(body))
}

/// `GET|POST /logout`. Succeeds with or without a session.
pub async fn logout<A: Authenticator, R: ProgressionRepository>(
    req: HttpRequest,
    state: State<A, R>,
) -> HttpResponse {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        let id = SessionId::from(cookie.value());
        if state.sessions.destroy(&id).await {
            tracing::info!(session_id = %id, "logged out");
        }
    }

    HttpResponse::Ok()
        .cookie(state.removal_cookie())
        .json(StatusResponse::success("Logout successful"))
}

/// `GET /auth/status`
pub async fn auth_status<A: Authenticator, R: ProgressionRepository>(
    req: HttpRequest,
    state: State<A, R>,
) -> HttpResponse {
    let user = state
        .current_session(&req)
        .await
        .map(|(_, session)| public_user(&session));

    HttpResponse::Ok().json(AuthStatusResponse {
        authenticated: user.is_some(),
        user,
    })
}

// ---------------------------------------------------------------------------
// Realms
// ---------------------------------------------------------------------------

/// `GET /realms`: the catalogue, hardest first, locked per caller.
pub async fn list_realms<A: Authenticator, R: ProgressionRepository>(
    req: HttpRequest,
    state: State<A, R>,
) -> Result<HttpResponse, GatekeeperError> {
    let (_, session) = state.require_session(&req).await?;
    let unlocked = state.tracker.unlocked_realms(&session.user_id).await?;

    let realms = Realm::ALL
        .into_iter()
        .map(|realm| RealmSummary::new(realm, !unlocked.contains(&realm)))
        .collect();

    Ok(HttpResponse::Ok().json(RealmListResponse { realms }))
}

/// `GET /realm/{name}` (with or without trailing slash).
///
/// Anonymous callers, unknown names, and locked realms all receive the
/// same sealed page.
pub async fn realm_page<A: Authenticator, R: ProgressionRepository>(
    req: HttpRequest,
    state: State<A, R>,
    name: web::Path<String>,
) -> Result<HttpResponse, GatekeeperError> {
    let name = name.into_inner();
    let ip = client_ip(&req);

    let Some((_, session)) = state.current_session(&req).await else {
        tracing::warn!(realm = %name, %ip, "realm access denied: no session");
        return Err(GatekeeperError::RealmSealed);
    };

    if !state.tracker.is_unlocked(&session.user_id, &name).await? {
        tracing::warn!(user_id = %session.user_id, realm = %name, %ip, "realm access denied");
        return Err(GatekeeperError::RealmSealed);
    }
    let realm = Realm::from_name(&name).map_err(|_| GatekeeperError::RealmSealed)?;

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(pages::realm_page(realm)))
}

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

/// `POST /submit-flag`, as JSON or as the realm page's form post.
pub async fn submit_flag<A: Authenticator, R: ProgressionRepository>(
    req: HttpRequest,
    state: State<A, R>,
    body: web::Either<web::Json<SubmitFlagRequest>, web::Form<SubmitFlagRequest>>,
) -> Result<HttpResponse, GatekeeperError> {
    let (_, session) = state.require_session(&req).await?;

    if let RateLimitDecision::Limited { retry_after } = state
        .flag_limiter
        .check(&format!("flag:{}", session.user_id))
        .await
    {
        tracing::warn!(
            user_id = %session.user_id,
            retry_after_secs = retry_after.as_secs(),
            "flag submission rate limit exceeded"
        );
        return Err(GatekeeperError::RateLimited { retry_after });
    }

    let flag = body
        .into_inner()
        .flag
        .filter(|f| !f.trim().is_empty())
        .ok_or_else(|| GatekeeperError::BadRequest("flag is required".into()))?;

    let outcome = state.tracker.submit_flag(&session.user_id, &flag).await?;

    let body = match outcome {
        FlagOutcome::Advanced {
            solved,
            unlocked,
            complete,
        } => {
            let message = match unlocked {
                Some(next) => format!(
                    "Flag accepted. {} is now open.",
                    next.metadata().display_name
                ),
                None => "Flag accepted. The journey is complete.".to_string(),
            };
            let mut body = StatusResponse::success(message);
            body.realm = Some(solved);
            body.unlocked = unlocked;
            body.complete = complete.then_some(true);
            body
        }
        FlagOutcome::AlreadySolved(realm) => {
            let mut body = StatusResponse::success("Flag already submitted");
            body.realm = Some(realm);
            body.unlocked = realm.next();
            body
        }
    };

    Ok(HttpResponse::Ok().json(body))
}

// ---------------------------------------------------------------------------
// Internal
// ---------------------------------------------------------------------------

/// Longest user id accepted from a realm service.
const MAX_USER_ID_LEN: usize = 128;

/// `POST /internal/flags`: hands a realm service the flag it should reveal
/// to a given traveller.
///
/// Requires `Authorization: Bearer <INTERNAL_API_TOKEN>`. Answers 503 when no
/// token is configured.
pub async fn issue_flag<A: Authenticator, R: ProgressionRepository>(
    req: HttpRequest,
    state: State<A, R>,
    body: web::Json<IssueFlagRequest>,
) -> Result<HttpResponse, GatekeeperError> {
    let Some(expected) = state.internal_token.as_deref() else {
        return Err(GatekeeperError::FlagIssueDisabled);
    };
    let presented = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default();
    if !bool::from(presented.as_bytes().ct_eq(expected.as_bytes())) {
        tracing::warn!(ip = %client_ip(&req), "flag issue refused: bad service token");
        return Err(GatekeeperError::Unauthenticated);
    }

    let IssueFlagRequest { user_id, realm_id } = body.into_inner();
    let (Some(user_id), Some(realm_id)) = (
        user_id.as_deref().and_then(valid_user_id),
        realm_id.filter(|r| !r.trim().is_empty()),
    ) else {
        return Err(GatekeeperError::BadRequest(
            "userId and realmId are required".into(),
        ));
    };

    let realm = Realm::from_name(&realm_id)?;
    let flag = state.tracker.signer().generate(realm, &user_id);
    tracing::info!(user_id = %user_id, %realm, "flag issued");

    Ok(HttpResponse::Ok().json(IssueFlagResponse {
        status: "ok".to_string(),
        flag,
        realm_id: realm.tag(),
    }))
}

/// Trimmed, 1 to 128 characters of `[A-Za-z0-9_-]`.
fn valid_user_id(raw: &str) -> Option<UserId> {
    let id = raw.trim();
    let well_formed = !id.is_empty()
        && id.len() <= MAX_USER_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    well_formed.then(|| UserId::new(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_user_id_accepts_directory_ids() {
        assert_eq!(
            valid_user_id(" user_0f3c2a1b "),
            Some(UserId::new("user_0f3c2a1b"))
        );
        assert_eq!(valid_user_id("a-b_C9"), Some(UserId::new("a-b_C9")));
    }

    #[test]
    fn test_valid_user_id_rejects_odd_input() {
        assert_eq!(valid_user_id(""), None);
        assert_eq!(valid_user_id("   "), None);
        assert_eq!(valid_user_id("alice:admin"), None);
        assert_eq!(valid_user_id("../etc"), None);
        assert_eq!(valid_user_id(&"x".repeat(MAX_USER_ID_LEN + 1)), None);
        assert!(valid_user_id(&"x".repeat(MAX_USER_ID_LEN)).is_some());
    }
}
