use std::{
    collections::HashMap,
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Public address of the caller, if one could be determined.
///
/// `None` means "let the geolocation provider locate the server itself",
/// which is what happens for loopback callers during local development.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientIp(pub Option<IpAddr>);

impl ClientIp {
    pub fn as_lookup_key(self) -> Option<String> {
        self.0.map(|ip| ip.to_string())
    }
}

/// Per-caller request budgets over a fixed window.
///
/// Callers are keyed by [`ClientIp`]; every caller without a public address
/// (loopback, unknown peer) shares the `None` bucket.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    budgets: Arc<Mutex<HashMap<Option<IpAddr>, Budget>>>,
}

#[derive(Debug, Clone, Copy)]
struct Budget {
    opened_at: Instant,
    used: usize,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            budgets: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Charges one request to `caller`. Returns `false` once the caller's
    /// budget for the current window is spent.
    async fn try_acquire(&self, caller: ClientIp) -> bool {
        let now = Instant::now();
        let mut budgets = self.budgets.lock().await;
        budgets.retain(|_, budget| now.duration_since(budget.opened_at) < self.window);

        let budget = budgets.entry(caller.0).or_insert(Budget {
            opened_at: now,
            used: 0,
        });
        if budget.used >= self.max_requests {
            return false;
        }
        budget.used += 1;
        true
    }
}

const REQUEST_ID_HEADER: &str = "x-request-id";
const MAX_REQUEST_ID_LEN: usize = 128;

/// Tags each request with a [`RequestId`] and echoes it back in the response.
///
/// A caller-supplied `x-request-id` is reused when it is non-blank and at most
/// 128 bytes; anything else gets a fresh `UUIDv4`.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map_or_else(|| Uuid::new_v4().to_string(), str::to_string);

    let header = HeaderValue::from_str(&id).ok();
    req.extensions_mut().insert(RequestId(id));

    let mut res = next.run(req).await;
    if let Some(value) = header {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    res
}

/// Resolves the caller's address into a [`ClientIp`] extension.
///
/// The first `X-Forwarded-For` entry wins; otherwise the socket peer address
/// recorded by `into_make_service_with_connect_info` is used.
pub async fn client_ip(mut req: Request, next: Next) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let ip = forwarded_for(req.headers())
        .or(peer)
        .filter(|ip| !ip.is_loopback() && !ip.is_unspecified());

    tracing::debug!(client_ip = ?ip, "resolved client address");
    req.extensions_mut().insert(ClientIp(ip));
    next.run(req).await
}

fn forwarded_for(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .and_then(|first| first.parse().ok())
}

/// Rejects callers that have spent their [`RateLimitState`] budget.
///
/// Runs inside [`client_ip`], so the caller's address is already resolved.
pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let caller = req.extensions().get::<ClientIp>().copied().unwrap_or_default();
    if rate_limit.try_acquire(caller).await {
        return next.run(req).await;
    }

    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    tracing::warn!(request_id = %request_id, client_ip = ?caller.0, "rate limit exceeded");
    ApiError::new(request_id, "rate_limited", "rate limit exceeded").into_response()
}
