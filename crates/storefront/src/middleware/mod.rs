//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transaction naming)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (recorded on the span)
//! 4. Session layer (tower-sessions, signed cookie)
//!
//! Authorization is not a layer: handlers opt in through the `RequireLogin`
//! and `RequireAdmin` extractors.

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{
    Denial, Gate, OptionalUser, RequireAdmin, RequireLogin, admin_gate, clear_session,
    current_user, login_gate, set_current_user,
};
pub use request_id::request_id_middleware;
pub use session::create_session_layer;
