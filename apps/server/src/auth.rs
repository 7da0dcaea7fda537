use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::State,
    http::{
        header::{AUTHORIZATION, COOKIE, SET_COOKIE},
        HeaderMap, Request, StatusCode,
    },
    middleware::Next,
    response::{AppendHeaders, IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use goalshare_core::auth::{AuthServiceTrait, LoginCodeIssued, LoginCodeSenderTrait};

use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;
use crate::models::{RequestCodeRequest, VerifyCodeRequest, VerifyCodeResponse};

pub const SESSION_COOKIE: &str = "goalshare_session";

pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    session_ttl: Duration,
    cookie_secure: bool,
}

/// The signed-in user, inserted into request extensions by [`require_session`].
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: usize,
    iat: usize,
}

impl AuthManager {
    pub fn new(secret: &[u8], session_ttl: Duration, cookie_secure: bool) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            session_ttl,
            cookie_secure,
        }
    }

    pub fn issue_token(&self, user_id: &str) -> ApiResult<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| ApiError::Internal("System clock is before UNIX_EPOCH".into()))?;
        let exp = now + self.session_ttl;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.as_secs() as usize,
            exp: exp.as_secs() as usize,
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(format!("Failed to sign token: {e}")))
    }

    /// Returns the user id carried by a valid token.
    pub fn validate_token(&self, token: &str) -> ApiResult<String> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims.sub)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature
                | jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::InvalidSignature
                | jsonwebtoken::errors::ErrorKind::Base64(_)
                | jsonwebtoken::errors::ErrorKind::Json(_)
                | jsonwebtoken::errors::ErrorKind::Utf8(_)
                | jsonwebtoken::errors::ErrorKind::MissingRequiredClaim(_) => {
                    ApiError::Unauthorized("Unauthorized".into())
                }
                other => ApiError::Internal(format!("Failed to validate token: {other:?}")),
            })
    }

    pub fn expires_in(&self) -> Duration {
        self.session_ttl
    }

    pub fn session_cookie(&self, token: &str) -> String {
        self.cookie_with(token, self.session_ttl.as_secs())
    }

    pub fn cleared_cookie(&self) -> String {
        self.cookie_with("", 0)
    }

    fn cookie_with(&self, value: &str, max_age: u64) -> String {
        let mut cookie =
            format!("{SESSION_COOKIE}={value}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age}");
        if self.cookie_secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// Resolves the user from a bearer token or the session cookie, if any.
    pub fn user_id_from_headers(&self, headers: &HeaderMap) -> ApiResult<Option<String>> {
        match session_token(headers) {
            Some(token) => self.validate_token(&token).map(Some),
            None => Ok(None),
        }
    }
}

/// Bearer token first, then the session cookie.
fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(header) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        let mut parts = header.splitn(2, ' ');
        if let (Some(scheme), Some(token)) = (parts.next(), parts.next()) {
            let token = token.trim();
            if scheme.eq_ignore_ascii_case("Bearer") && !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

pub fn decode_secret_key(raw: &str) -> anyhow::Result<Vec<u8>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        anyhow::bail!("Session secret cannot be empty");
    }
    let decoded = match BASE64.decode(trimmed) {
        Ok(bytes) => bytes,
        Err(_) if trimmed.len() == 32 => trimmed.as_bytes().to_vec(),
        Err(_) => {
            anyhow::bail!("Session secret must be base64 encoded or a 32-byte ASCII string")
        }
    };

    if decoded.len() != 32 {
        anyhow::bail!("Session secret must decode to exactly 32 bytes");
    }

    Ok(decoded)
}

/// Writes login codes to the log instead of mailing them.
pub struct LogCodeSender;

#[async_trait]
impl LoginCodeSenderTrait for LogCodeSender {
    async fn send_code(&self, email: &str, code: &str) -> goalshare_core::Result<()> {
        tracing::info!(%email, %code, "Login code issued");
        Ok(())
    }
}

pub async fn request_code(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RequestCodeRequest>,
) -> ApiResult<Json<LoginCodeIssued>> {
    let issued = state.auth_service.request_code(&payload.email).await?;
    Ok(Json(issued))
}

pub async fn verify_code(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<VerifyCodeRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .auth_service
        .verify_code(&payload.email, &payload.code)
        .await?;
    let token = state.auth.issue_token(&user.id)?;
    let cookie = state.auth.session_cookie(&token);
    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(VerifyCodeResponse {
            user,
            access_token: token,
            expires_in: state.auth.expires_in().as_secs(),
        }),
    ))
}

pub async fn logout(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        AppendHeaders([(SET_COOKIE, state.auth.cleared_cookie())]),
    )
}

pub async fn require_session(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let user_id = state
        .auth
        .user_id_from_headers(request.headers())?
        .ok_or_else(|| ApiError::Unauthorized("Unauthorized".into()))?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser { user_id });
    Ok(next.run(request).await)
}
