//! `GatekeeperServer` builder, shared state, and route table.
//!
//! Ties the layers together: session store and authenticator from
//! `yggdrasil-session`, the progression tracker, and the HTTP handlers.

use std::sync::Arc;

use actix_web::cookie::{Cookie, SameSite, time};
use actix_web::middleware::Logger;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, error, web};
use yggdrasil_progression::{ProgressionRepository, ProgressionTracker};
use yggdrasil_realm::StatusResponse;
use yggdrasil_session::{Authenticator, Session, SessionConfig, SessionId, SessionStore};

use crate::config::{CookieSettings, SESSION_COOKIE};
use crate::handlers;
use crate::headers::security_headers;
use crate::rate_limit::{AuthRateLimiter, RateLimitConfig};
use crate::GatekeeperError;

/// State shared by every worker.
pub struct AppState<A: Authenticator, R: ProgressionRepository> {
    pub sessions: SessionStore,
    pub auth: A,
    pub tracker: ProgressionTracker<R>,
    /// Keyed `login:{ip}`.
    pub login_limiter: AuthRateLimiter,
    /// Keyed `flag:{user_id}`.
    pub flag_limiter: AuthRateLimiter,
    pub cookie: CookieSettings,
    /// Bearer token accepted by `POST /internal/flags`; `None` disables it.
    pub internal_token: Option<String>,
}

impl<A: Authenticator, R: ProgressionRepository> AppState<A, R> {
    /// The caller's live session, if the cookie names one.
    ///
    /// A found session is touched, so activity keeps it alive.
    pub async fn current_session(&self, req: &HttpRequest) -> Option<(SessionId, Session)> {
        let cookie = req.cookie(SESSION_COOKIE)?;
        let id = SessionId::from(cookie.value());
        let session = self.sessions.get(&id).await?;
        self.sessions.touch(&id).await;
        Some((id, session))
    }

    /// Like [`current_session`](Self::current_session) but required.
    pub async fn require_session(
        &self,
        req: &HttpRequest,
    ) -> Result<(SessionId, Session), GatekeeperError> {
        self.current_session(req)
            .await
            .ok_or(GatekeeperError::Unauthenticated)
    }

    /// The cookie handed out at login.
    pub fn session_cookie(&self, id: &SessionId) -> Cookie<'static> {
        let max_age = time::Duration::seconds(self.cookie.max_age.as_secs() as i64);
        Cookie::build(SESSION_COOKIE, id.as_str().to_owned())
            .path("/")
            .http_only(true)
            .secure(self.cookie.secure)
            .same_site(SameSite::Strict)
            .max_age(max_age)
            .finish()
    }

    /// An expired, empty session cookie that makes the browser drop it.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build(SESSION_COOKIE, "")
            .path("/")
            .http_only(true)
            .secure(self.cookie.secure)
            .same_site(SameSite::Strict)
            .finish();
        cookie.make_removal();
        cookie
    }
}

/// Registers every gatekeeper route.
///
/// Expects `web::Data<AppState<A, R>>` in the app data.
pub fn configure<A: Authenticator, R: ProgressionRepository>(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(form_config())
        .route("/health", web::get().to(handlers::health))
        .route("/login", web::post().to(handlers::login::<A, R>))
        .service(
            web::resource("/logout")
                .route(web::get().to(handlers::logout::<A, R>))
                .route(web::post().to(handlers::logout::<A, R>)),
        )
        .route("/auth/status", web::get().to(handlers::auth_status::<A, R>))
        .route("/realms", web::get().to(handlers::list_realms::<A, R>))
        .route("/realm/{name}", web::get().to(handlers::realm_page::<A, R>))
        .route("/realm/{name}/", web::get().to(handlers::realm_page::<A, R>))
        .route("/submit-flag", web::post().to(handlers::submit_flag::<A, R>))
        .route("/internal/flags", web::post().to(handlers::issue_flag::<A, R>));
}

/// Unparseable JSON bodies get the usual `{ status, message }` shape.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::BadRequest().json(StatusResponse::error("Invalid JSON body"));
        error::InternalError::from_response(err, response).into()
    })
}

/// Same for form posts from the realm pages.
fn form_config() -> web::FormConfig {
    web::FormConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::BadRequest().json(StatusResponse::error("Invalid form body"));
        error::InternalError::from_response(err, response).into()
    })
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for configuring and starting the gatekeeper.
///
/// # Example
///
/// ```rust,ignore
/// let server = GatekeeperServerBuilder::new()
///     .bind("0.0.0.0:8080")
///     .session_config(cli.session_config())
///     .build(authenticator, tracker)?;
/// server.run().await
/// ```
pub struct GatekeeperServerBuilder {
    bind_addr: String,
    session_config: SessionConfig,
    rate_limit: RateLimitConfig,
    flag_rate_limit: RateLimitConfig,
    cookie_secure: bool,
    internal_token: Option<String>,
}

impl GatekeeperServerBuilder {
    /// Defaults: `127.0.0.1:8080`, default session and rate limits,
    /// insecure cookies, flag issuing disabled.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            session_config: SessionConfig::default(),
            rate_limit: RateLimitConfig::default(),
            flag_rate_limit: RateLimitConfig::flag_submissions(),
            cookie_secure: false,
            internal_token: None,
        }
    }

    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Login attempts per client IP.
    pub fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit = config;
        self
    }

    /// Flag submissions per traveller.
    pub fn flag_rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.flag_rate_limit = config;
        self
    }

    /// Enables `POST /internal/flags` for callers presenting `token`.
    pub fn internal_token(mut self, token: Option<String>) -> Self {
        self.internal_token = token.filter(|t| !t.is_empty());
        self
    }

    /// Issue `Secure` cookies and send HSTS.
    pub fn cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    /// Validates the configuration and starts the session sweeper.
    ///
    /// Must be called from within a tokio runtime.
    pub fn build<A: Authenticator, R: ProgressionRepository>(
        self,
        auth: A,
        tracker: ProgressionTracker<R>,
    ) -> Result<GatekeeperServer<A, R>, GatekeeperError> {
        let rate_limit = self.rate_limit.validated()?;
        let flag_rate_limit = self.flag_rate_limit.validated()?;

        let mut sessions = SessionStore::new(self.session_config)?;
        sessions.start()?;
        let cookie = CookieSettings {
            secure: self.cookie_secure,
            max_age: sessions.config().ttl,
        };
        if self.internal_token.is_none() {
            tracing::info!("INTERNAL_API_TOKEN not set, flag issuing disabled");
        }

        let state = Arc::new(AppState {
            sessions,
            auth,
            tracker,
            login_limiter: AuthRateLimiter::new(rate_limit),
            flag_limiter: AuthRateLimiter::new(flag_rate_limit),
            cookie,
            internal_token: self.internal_token,
        });

        Ok(GatekeeperServer {
            bind_addr: self.bind_addr,
            state,
        })
    }
}

impl Default for GatekeeperServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// A configured gatekeeper. Call [`run()`](Self::run) to serve.
pub struct GatekeeperServer<A: Authenticator, R: ProgressionRepository> {
    bind_addr: String,
    state: Arc<AppState<A, R>>,
}

impl<A: Authenticator, R: ProgressionRepository> GatekeeperServer<A, R> {
    /// Serves HTTP until the process receives a shutdown signal.
    pub async fn run(self) -> Result<(), GatekeeperError> {
        let state = self.state;
        let hsts = state.cookie.secure;

        tracing::info!(addr = %self.bind_addr, "gatekeeper listening");

        HttpServer::new(move || {
            App::new()
                .wrap(security_headers(hsts))
                .wrap(Logger::default())
                .app_data(web::Data::from(Arc::clone(&state)))
                .configure(configure::<A, R>)
        })
        .bind(&self.bind_addr)?
        .run()
        .await?;

        tracing::info!("gatekeeper stopped");
        Ok(())
    }
}
