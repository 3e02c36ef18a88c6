//! Authentication route handlers.
//!
//! Login, registration, and logout. Outcomes are reported with flash messages
//! and a redirect rather than query-string error codes.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::PageContext;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::flash;
use crate::middleware::{OptionalUser, clear_session, set_current_user};
use crate::models::CurrentUser;
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Registration form data.
#[derive(Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub ctx: PageContext,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub ctx: PageContext,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(session: Session, OptionalUser(user): OptionalUser) -> LoginTemplate {
    LoginTemplate {
        ctx: PageContext::new(&session, user).await,
    }
}

/// Handle login form submission.
///
/// Admins land on the dashboard, everyone else on the catalog.
#[instrument(skip_all, fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let user = match AuthService::new(state.pool())
        .login(&form.username, &form.password)
        .await
    {
        Ok(user) => user,
        Err(e) => {
            if matches!(e, AuthError::InvalidCredentials) {
                tracing::info!("Login rejected");
            } else {
                tracing::error!("Login failed: {e}");
            }
            flash::error(&session, "Invalid credentials").await;
            return Redirect::to("/login").into_response();
        }
    };

    let current_user = CurrentUser::from(&user);
    if let Err(e) = set_current_user(&session, &current_user).await {
        tracing::error!("Failed to set session: {e}");
        flash::error(&session, "Invalid credentials").await;
        return Redirect::to("/login").into_response();
    }

    set_sentry_user(&user.id, &user.username);
    tracing::info!(user_id = %user.id, is_admin = user.is_admin, "User logged in");
    flash::success(&session, "Welcome back!").await;

    let target = if user.is_admin { "/admin" } else { "/" };
    Redirect::to(target).into_response()
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(
    session: Session,
    OptionalUser(user): OptionalUser,
) -> RegisterTemplate {
    RegisterTemplate {
        ctx: PageContext::new(&session, user).await,
    }
}

/// Handle registration form submission.
///
/// Every failure shows the same message, matching what users see for a
/// taken username or email.
#[instrument(skip_all, fields(username = %form.username))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response {
    match AuthService::new(state.pool())
        .register(&form.username, &form.email, &form.password)
        .await
    {
        Ok(_) => {
            flash::success(&session, "Registration successful! Please login.").await;
            Redirect::to("/login").into_response()
        }
        Err(e) => {
            if matches!(e, AuthError::Repository(_) | AuthError::PasswordHash) {
                tracing::error!("Registration failed: {e}");
            } else {
                tracing::info!("Registration rejected: {e}");
            }
            flash::error(&session, "Username or email already exists").await;
            Redirect::to("/register").into_response()
        }
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Clear the session and return to the login page.
pub async fn logout(session: Session) -> Redirect {
    if let Err(e) = clear_session(&session).await {
        tracing::error!("Failed to clear session: {e}");
    }
    clear_sentry_user();

    flash::success(&session, "You have been logged out").await;
    Redirect::to("/login")
}
