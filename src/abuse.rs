//! Screening for the room socket
//!
//! Rooms live in memory and are cheap to create, so `/ws` only accepts
//! upgrades that look like they come from a browser tab, and each device
//! (the `client=` query parameter the web client sends) may only reconnect so
//! often per window.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;

const SEC_WEBSOCKET_KEY: &str = "sec-websocket-key";

const DEFAULT_RATE_LIMIT_MAX: u32 = 30;
const DEFAULT_RATE_LIMIT_WINDOW: u64 = 10;

/// Substrings of user agents that never belong to a player's browser
const SCRIPTED_AGENTS: &[&str] = &[
    "curl",
    "wget",
    "httpie",
    "python-requests",
    "python-urllib",
    "go-http-client",
    "java/",
    "spider",
    "crawler",
];

#[derive(Debug, Clone, Copy)]
struct ClientWindow {
    started: Instant,
    connects: u32,
}

/// Fixed-window connect counter per device
#[derive(Debug, Clone)]
pub struct RateLimiter {
    clients: Arc<RwLock<HashMap<String, ClientWindow>>>,
    max_connects: u32,
    window: Duration,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(
            DEFAULT_RATE_LIMIT_MAX,
            Duration::from_secs(DEFAULT_RATE_LIMIT_WINDOW),
        )
    }
}

impl RateLimiter {
    pub fn new(max_connects: u32, window: Duration) -> Self {
        Self {
            clients: Arc::new(RwLock::new(HashMap::new())),
            max_connects,
            window,
        }
    }

    /// Count one connect for `key`; false once the window's budget is spent
    pub async fn check(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut clients = self.clients.write().await;
        let entry = clients.entry(key.to_string()).or_insert(ClientWindow {
            started: now,
            connects: 0,
        });

        if now.duration_since(entry.started) >= self.window {
            *entry = ClientWindow {
                started: now,
                connects: 0,
            };
        }
        if entry.connects >= self.max_connects {
            return false;
        }
        entry.connects += 1;
        true
    }

    /// Forget devices whose last window ended a while ago
    pub async fn cleanup(&self) -> usize {
        let now = Instant::now();
        let mut clients = self.clients.write().await;
        let before = clients.len();
        clients.retain(|_, w| now.duration_since(w.started) < self.window * 2);
        before - clients.len()
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

#[derive(Debug, Clone)]
pub struct AbuseConfig {
    pub block_user_agents: bool,
    /// Require `Origin` and `Sec-WebSocket-Key`
    pub require_browser_headers: bool,
    pub rate_limiter: Option<RateLimiter>,
}

impl Default for AbuseConfig {
    fn default() -> Self {
        Self {
            block_user_agents: true,
            require_browser_headers: true,
            rate_limiter: Some(RateLimiter::default()),
        }
    }
}

/// `0` and `false` switch a check off; anything else (or unset) keeps it on
fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
        .unwrap_or(true)
}

fn env_positive<T: std::str::FromStr + PartialOrd + Default>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|v| *v > T::default())
        .unwrap_or(default)
}

impl AbuseConfig {
    /// `ABUSE_BLOCK_USER_AGENTS`, `ABUSE_REQUIRE_BROWSER`, `ABUSE_RATE_LIMIT`,
    /// `ABUSE_RATE_LIMIT_MAX` and `ABUSE_RATE_LIMIT_WINDOW` (seconds)
    pub fn from_env() -> Self {
        let rate_limiter = env_flag("ABUSE_RATE_LIMIT").then(|| {
            RateLimiter::new(
                env_positive("ABUSE_RATE_LIMIT_MAX", DEFAULT_RATE_LIMIT_MAX),
                Duration::from_secs(env_positive(
                    "ABUSE_RATE_LIMIT_WINDOW",
                    DEFAULT_RATE_LIMIT_WINDOW,
                )),
            )
        });

        let config = Self {
            block_user_agents: env_flag("ABUSE_BLOCK_USER_AGENTS"),
            require_browser_headers: env_flag("ABUSE_REQUIRE_BROWSER"),
            rate_limiter,
        };
        tracing::info!(
            block_user_agents = config.block_user_agents,
            require_browser_headers = config.require_browser_headers,
            rate_limit = config.rate_limiter.is_some(),
            "Socket screening configured"
        );
        config
    }
}

fn is_scripted_agent(user_agent: &str) -> bool {
    let ua = user_agent.to_lowercase();
    ua.ends_with("bot")
        || ua.contains("bot/")
        || ua.contains("bot ")
        || SCRIPTED_AGENTS.iter().any(|marker| ua.contains(marker))
}

/// Device id from `?client=...`; anonymous upgrades are not counted
fn client_key(uri: &Uri) -> Option<String> {
    uri.query()?
        .split('&')
        .find_map(|pair| pair.strip_prefix("client="))
        .filter(|id| !id.is_empty())
        .map(|id| format!("client:{}", id))
}

#[derive(Debug, PartialEq)]
enum Rejection {
    Forbidden,
    RateLimited(Duration),
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        match self {
            Rejection::Forbidden => (StatusCode::FORBIDDEN, "Access denied").into_response(),
            Rejection::RateLimited(window) => (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, window.as_secs().to_string())],
                "Too many reconnects, slow down",
            )
                .into_response(),
        }
    }
}

async fn screen(config: &AbuseConfig, headers: &HeaderMap, uri: &Uri) -> Result<(), Rejection> {
    if config.block_user_agents {
        let agent = headers
            .get(header::USER_AGENT)
            .and_then(|ua| ua.to_str().ok());
        match agent {
            Some(ua) if !is_scripted_agent(ua) => {}
            other => {
                tracing::warn!(user_agent = ?other, "Rejected socket: user agent");
                return Err(Rejection::Forbidden);
            }
        }
    }

    if config.require_browser_headers
        && !(headers.contains_key(SEC_WEBSOCKET_KEY) && headers.contains_key(header::ORIGIN))
    {
        tracing::warn!(uri = %uri, "Rejected socket: not a browser upgrade");
        return Err(Rejection::Forbidden);
    }

    if let (Some(limiter), Some(key)) = (&config.rate_limiter, client_key(uri)) {
        if !limiter.check(&key).await {
            tracing::warn!(key, "Rejected socket: reconnect limit");
            return Err(Rejection::RateLimited(limiter.window()));
        }
    }
    Ok(())
}

/// Middleware in front of `/ws`
pub async fn ws_abuse_middleware(
    State(config): State<Arc<AbuseConfig>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let verdict = screen(&config, request.headers(), request.uri()).await;
    match verdict {
        Ok(()) => next.run(request).await,
        Err(rejection) => rejection.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower::ServiceExt;

    fn guarded_router(config: AbuseConfig) -> axum::Router {
        axum::Router::new()
            .route("/ws", axum::routing::get(|| async { "upgraded" }))
            .layer(axum::middleware::from_fn_with_state(
                Arc::new(config),
                ws_abuse_middleware,
            ))
    }

    fn upgrade(uri: &str, user_agent: &str, browser: bool) -> Request<Body> {
        let mut builder = Request::builder()
            .uri(uri)
            .header(header::USER_AGENT, user_agent);
        if browser {
            builder = builder
                .header(header::ORIGIN, "http://localhost:7529")
                .header(SEC_WEBSOCKET_KEY, "dGhlIHNhbXBsZSBub25jZQ==");
        }
        builder.body(Body::empty()).unwrap()
    }

    const PHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)";

    #[test]
    fn test_scripted_agents() {
        for ua in [
            "curl/8.4.0",
            "Wget/1.21",
            "python-requests/2.31",
            "Go-http-client/1.1",
            "Googlebot/2.1",
            "bingbot",
            "SomeSpider/1.0",
        ] {
            assert!(is_scripted_agent(ua), "{} should be rejected", ua);
        }
        assert!(!is_scripted_agent(PHONE));
        assert!(!is_scripted_agent(
            "Mozilla/5.0 (X11; Linux x86_64) Firefox/128.0"
        ));
    }

    #[test]
    fn test_client_key() {
        let key = |uri: &str| client_key(&uri.parse::<Uri>().unwrap());
        assert_eq!(
            key("/ws?v=2&client=abc123"),
            Some("client:abc123".to_string())
        );
        assert_eq!(key("/ws?client="), None);
        assert_eq!(key("/ws"), None);
    }

    #[tokio::test]
    async fn test_limiter_window() {
        let limiter = RateLimiter::new(2, Duration::from_millis(50));
        assert!(limiter.check("a").await);
        assert!(limiter.check("a").await);
        assert!(!limiter.check("a").await);
        assert!(limiter.check("b").await);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(limiter.check("a").await);
    }

    #[tokio::test]
    async fn test_limiter_cleanup() {
        let limiter = RateLimiter::new(5, Duration::from_millis(10));
        limiter.check("a").await;
        limiter.check("b").await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(limiter.cleanup().await, 2);
    }

    #[tokio::test]
    async fn test_rejects_curl_and_missing_agent() {
        let response = guarded_router(AbuseConfig::default())
            .oneshot(upgrade("/ws", "curl/8.4.0", true))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let bare = Request::builder().uri("/ws").body(Body::empty()).unwrap();
        let response = guarded_router(AbuseConfig::default())
            .oneshot(bare)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_browser_headers_required() {
        let response = guarded_router(AbuseConfig::default())
            .oneshot(upgrade("/ws", PHONE, false))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let config = AbuseConfig {
            require_browser_headers: false,
            ..AbuseConfig::default()
        };
        let response = guarded_router(config)
            .oneshot(upgrade("/ws", PHONE, false))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_reconnect_limit_per_device() {
        let config = AbuseConfig {
            rate_limiter: Some(RateLimiter::new(2, Duration::from_secs(60))),
            ..AbuseConfig::default()
        };
        let router = guarded_router(config);

        for _ in 0..2 {
            let response = router
                .clone()
                .oneshot(upgrade("/ws?client=phone-1", PHONE, true))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = router
            .clone()
            .oneshot(upgrade("/ws?client=phone-1", PHONE, true))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let retry_after = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok());
        assert_eq!(retry_after, Some("60"));

        // another device at the same party is unaffected
        let response = router
            .oneshot(upgrade("/ws?client=phone-2", PHONE, true))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_default_config_screens_everything() {
        let config = AbuseConfig::default();
        assert!(config.block_user_agents);
        assert!(config.require_browser_headers);
        assert!(config.rate_limiter.is_some());
    }
}
