//! HTTP middleware stack for the API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layer (capture errors)
//! 2. CORS (honor configured origins)
//! 3. `TraceLayer` (request tracing)
//! 4. Request ID (add unique ID to each request)
//! 5. Request gate (`require_auth`, applied to protected routes only)

pub mod auth;
pub mod request_id;

pub use auth::{AuthContext, CurrentUser, require_auth};
pub use request_id::request_id_middleware;
