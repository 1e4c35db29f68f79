//! Admin user management routes (super admin only).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use coralcart_core::{AdminRole, AdminUserId};

use crate::db::AdminUserRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireSuperAdmin;
use crate::models::AdminUser;
use crate::services::auth::{AdminAuthError, AdminAuthService};
use crate::state::AppState;

use super::dashboard::AdminUserView;

/// Build the admin users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index).post(create))
        .route("/{id}/delete", post(delete))
}

// =============================================================================
// View Types
// =============================================================================

/// Admin user row for the listing table.
#[derive(Debug, Clone)]
pub struct AdminUserRowView {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: String,
}

impl From<&AdminUser> for AdminUserRowView {
    fn from(user: &AdminUser) -> Self {
        Self {
            id: user.id.as_i32(),
            name: user.name.clone(),
            email: user.email.to_string(),
            role: user.role.to_string(),
            created_at: user.created_at.format("%Y-%m-%d").to_string(),
        }
    }
}

// =============================================================================
// Query / Form Types
// =============================================================================

/// Page query parameters.
#[derive(Debug, Deserialize)]
pub struct AdminUsersQuery {
    pub notice: Option<String>,
    pub error: Option<String>,
}

/// Admin user create form data.
#[derive(Debug, Deserialize)]
pub struct CreateAdminForm {
    pub email: String,
    pub name: String,
    pub role: String,
    pub password: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Admin users page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin_users/index.html")]
pub struct AdminUsersTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub users: Vec<AdminUserRowView>,
    pub notice: Option<String>,
    pub error: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Admin users page handler.
#[instrument(skip(admin, state))]
pub async fn index(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Query(query): Query<AdminUsersQuery>,
) -> Result<AdminUsersTemplate> {
    let users = AdminUserRepository::new(state.pool()).list_all().await?;

    Ok(AdminUsersTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/admin-users".to_string(),
        users: users.iter().map(AdminUserRowView::from).collect(),
        notice: query.notice,
        error: query.error,
    })
}

/// Create an admin user.
#[instrument(skip(_admin, state, form))]
pub async fn create(
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Form(form): Form<CreateAdminForm>,
) -> Result<Response> {
    let Ok(role) = form.role.parse::<AdminRole>() else {
        return Ok(Redirect::to("/admin-users?error=role").into_response());
    };

    let result = AdminAuthService::new(state.pool())
        .create_admin(&form.email, form.name.trim(), role, &form.password)
        .await;

    match result {
        Ok(user) => {
            tracing::info!(admin = %user.email, role = %user.role, "admin user created");
            Ok(Redirect::to("/admin-users?notice=created").into_response())
        }
        Err(AdminAuthError::AdminAlreadyExists) => {
            Ok(Redirect::to("/admin-users?error=email_taken").into_response())
        }
        Err(AdminAuthError::WeakPassword(_)) => {
            Ok(Redirect::to("/admin-users?error=password").into_response())
        }
        Err(AdminAuthError::InvalidEmail(_)) => {
            Ok(Redirect::to("/admin-users?error=email").into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete an admin user.
///
/// The last super admin cannot be removed, and admins cannot remove
/// themselves.
#[instrument(skip(admin, state))]
pub async fn delete(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response> {
    let target = AdminUserId::new(id);

    if target == admin.id {
        return Ok(Redirect::to("/admin-users?error=self_delete").into_response());
    }

    let repo = AdminUserRepository::new(state.pool());

    let Some(user) = repo.get_by_id(target).await? else {
        return Err(AppError::NotFound(format!("admin user {id}")));
    };

    if user.role == AdminRole::SuperAdmin && repo.count_super_admins().await? <= 1 {
        return Ok(Redirect::to("/admin-users?error=last_super_admin").into_response());
    }

    repo.delete(target).await?;
    Ok(Redirect::to("/admin-users?notice=deleted").into_response())
}
