//! Admin authentication routes.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::middleware::{clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::services::AdminAuthService;
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
}

/// Display the login page.
pub async fn login_page(Query(query): Query<LoginQuery>) -> impl IntoResponse {
    LoginTemplate { error: query.error }
}

/// Handle login form submission.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let auth = AdminAuthService::new(state.pool());

    match auth.login(&form.email, &form.password).await {
        Ok(admin) => {
            // Fresh session ID on privilege change
            session.cycle_id().await.ok();

            let current = CurrentAdmin {
                id: admin.id,
                email: admin.email,
                name: admin.name,
                role: admin.role,
            };

            if let Err(e) = set_current_admin(&session, &current).await {
                tracing::error!("Failed to set admin session: {e}");
                return Redirect::to("/auth/login?error=session").into_response();
            }

            tracing::info!(admin = %current.email, "admin logged in");
            Redirect::to("/").into_response()
        }
        Err(e) => {
            tracing::warn!("Admin login failed: {e}");
            Redirect::to("/auth/login?error=credentials").into_response()
        }
    }
}

/// Handle logout.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_admin(&session).await {
        tracing::error!("Failed to clear admin session: {e}");
    }

    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush admin session: {e}");
    }

    Redirect::to("/auth/login").into_response()
}
