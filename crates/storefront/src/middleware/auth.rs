//! Authentication gate and extractors.
//!
//! The gate itself is two pure decision functions, [`login_gate`] and
//! [`admin_gate`], returning a [`Gate`]. The extractors wrap them: a
//! [`Gate::Denied`] outcome pushes the denial's flash message and becomes the
//! extractor's rejection (a redirect), so the handler body never runs.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn cart(RequireLogin(user): RequireLogin) -> impl IntoResponse {
//!     format!("{}'s cart", user.username)
//! }
//!
//! async fn dashboard(RequireAdmin(admin): RequireAdmin) -> impl IntoResponse {
//!     format!("Hello, {}!", admin.username)
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::db::UserRepository;
use crate::flash;
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

// =============================================================================
// Gate decisions
// =============================================================================

/// Outcome of an authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    /// The request may proceed as this user.
    Allowed(CurrentUser),
    /// The request must be turned away.
    Denied(Denial),
}

/// Why a request was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// No user in the session.
    LoginRequired,
    /// A user is logged in but the stored admin flag is not set.
    AdminRequired,
}

impl Denial {
    /// Flash message shown after the redirect.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::LoginRequired => "Please login first",
            Self::AdminRequired => "Admin access required",
        }
    }

    /// Where the browser is sent.
    #[must_use]
    pub const fn redirect_to(self) -> &'static str {
        match self {
            Self::LoginRequired => "/login",
            Self::AdminRequired => "/",
        }
    }
}

/// Allowed iff the session holds a user.
#[must_use]
pub fn login_gate(user: Option<CurrentUser>) -> Gate {
    user.map_or(Gate::Denied(Denial::LoginRequired), Gate::Allowed)
}

/// Allowed iff the session holds a user whose stored admin flag is set.
///
/// `stored_flag` is the `users.is_admin` value looked up by the session's user
/// ID; `None` means the user no longer exists. The session's own `is_admin`
/// snapshot is never trusted.
#[must_use]
pub fn admin_gate(user: Option<CurrentUser>, stored_flag: Option<bool>) -> Gate {
    match login_gate(user) {
        Gate::Allowed(user) if stored_flag == Some(true) => Gate::Allowed(CurrentUser {
            is_admin: true,
            ..user
        }),
        Gate::Allowed(_) => Gate::Denied(Denial::AdminRequired),
        denied @ Gate::Denied(_) => denied,
    }
}

// =============================================================================
// Extractors
// =============================================================================

/// Extractor that requires a logged-in user.
pub struct RequireLogin(pub CurrentUser);

/// Extractor that requires a logged-in user with the admin flag set.
///
/// Reads `users.is_admin` on every request.
pub struct RequireAdmin(pub CurrentUser);

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireLogin`, this does not reject the request if nobody is logged in.
pub struct OptionalUser(pub Option<CurrentUser>);

/// Rejection produced by the auth extractors.
#[derive(Debug)]
pub enum AuthRejection {
    /// Gate denied the request; the flash message is already stored.
    Redirect(&'static str),
    /// The session layer is not installed.
    MissingSession,
    /// The admin flag lookup failed.
    Lookup,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Redirect(to) => Redirect::to(to).into_response(),
            Self::MissingSession | Self::Lookup => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

fn session_from(parts: &Parts) -> Result<Session, AuthRejection> {
    parts.extensions.get::<Session>().cloned().ok_or_else(|| {
        tracing::error!("Session layer missing from router");
        AuthRejection::MissingSession
    })
}

async fn deny(session: &Session, denial: Denial) -> AuthRejection {
    flash::error(session, denial.message()).await;
    AuthRejection::Redirect(denial.redirect_to())
}

impl<S> FromRequestParts<S> for RequireLogin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = session_from(parts)?;

        match login_gate(current_user(&session).await) {
            Gate::Allowed(user) => Ok(Self(user)),
            Gate::Denied(denial) => Err(deny(&session, denial).await),
        }
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = session_from(parts)?;

        // Skip the lookup entirely when nobody is logged in
        let user = match login_gate(current_user(&session).await) {
            Gate::Allowed(user) => user,
            Gate::Denied(denial) => return Err(deny(&session, denial).await),
        };

        let stored_flag = UserRepository::new(state.pool())
            .is_admin(user.id)
            .await
            .map_err(|e| {
                tracing::error!(user_id = %user.id, "Admin flag lookup failed: {e}");
                AuthRejection::Lookup
            })?;

        match admin_gate(Some(user), stored_flag) {
            Gate::Allowed(admin) => Ok(Self(admin)),
            Gate::Denied(denial) => {
                tracing::info!(path = %parts.uri.path(), "Non-admin denied");
                Err(deny(&session, denial).await)
            }
        }
    }
}

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => current_user(session).await,
            None => None,
        };

        Ok(Self(user))
    }
}

// =============================================================================
// Session helpers
// =============================================================================

/// Read the current user from the session.
pub async fn current_user(session: &Session) -> Option<CurrentUser> {
    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

/// Store the logged-in user, issuing a fresh session ID.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Drop everything in the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be deleted from the store.
pub async fn clear_session(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
