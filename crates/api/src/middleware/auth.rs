//! Request gate: bearer-token authentication middleware and extractor.
//!
//! Every protected route passes through [`require_auth`], which parses the
//! bearer token, resolves the subject with a single bounded store lookup,
//! and attaches an [`AuthContext`] to the request. Handlers read it back
//! with the [`CurrentUser`] extractor. The gate never reveals why a request
//! was rejected; the reason strings below end up in logs only.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};

use tienda_core::UserId;

use crate::error::{ApiError, set_sentry_user};
use crate::models::Role;
use crate::services::auth::AuthError;
use crate::state::AppState;
use crate::store::bounded;

/// Identity attached to a request once the gate has admitted it.
///
/// Lives for the duration of one request; built fresh from the store on
/// every pass so deleted or disabled accounts lose access immediately even
/// while holding a validly signed token.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// The authenticated subject's id.
    pub subject_id: UserId,
    /// The subject's role at the time of the request, if any is assigned.
    pub role: Option<Role>,
    /// Whether the account is enabled. Always `true` for admitted requests.
    pub enabled: bool,
}

/// Middleware that admits only requests carrying a valid bearer token for a
/// live, enabled account.
///
/// Applied via `middleware::from_fn_with_state` as a `route_layer` on the
/// protected sub-router, so public routes never pay for a token parse.
///
/// # Errors
///
/// Returns `ApiError::Unauthorized` (401) when the token is missing,
/// malformed, badly signed, expired, or names a subject that no longer
/// exists or is disabled. Returns `ApiError::Store` (503) when the subject
/// lookup times out.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))?;

    let claims = state.tokens().parse(token).map_err(AuthError::from)?;

    // Exactly one by-id lookup per admitted request; a signed token alone is
    // never proof the account still exists
    let subject_id = UserId::from(claims.sub);
    let user = bounded(
        state.config().store_timeout,
        state.stores().users.find_by_id(&subject_id),
    )
    .await?
    .ok_or_else(|| ApiError::Unauthorized(format!("token subject {subject_id} not found")))?;

    if !user.enabled {
        return Err(ApiError::Unauthorized(format!(
            "account {subject_id} is disabled"
        )));
    }

    set_sentry_user(&user.id, Some(user.email.as_str()));

    request.extensions_mut().insert(AuthContext {
        subject_id: user.id,
        role: user.role,
        enabled: user.enabled,
    });

    Ok(next.run(request).await)
}

/// Extractor for the [`AuthContext`] placed by [`require_auth`].
///
/// # Example
///
/// ```rust,ignore
/// async fn me(CurrentUser(ctx): CurrentUser) -> impl IntoResponse {
///     format!("subject {}", ctx.subject_id)
/// }
/// ```
pub struct CurrentUser(pub AuthContext);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Absent context means the route was wired outside the gate
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(Self)
            .ok_or_else(|| ApiError::Unauthorized("no authorization context".to_string()))
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}
