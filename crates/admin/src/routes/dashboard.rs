//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::db::OrderAdminRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::{AdminOrder, CurrentAdmin};
use crate::state::AppState;

use coralcart_core::AdminRole;

/// Admin user view for templates.
#[derive(Debug, Clone)]
pub struct AdminUserView {
    pub name: String,
    pub email: String,
    pub is_super_admin: bool,
}

impl From<&CurrentAdmin> for AdminUserView {
    fn from(admin: &CurrentAdmin) -> Self {
        Self {
            name: admin.name.clone(),
            email: admin.email.to_string(),
            is_super_admin: admin.role == AdminRole::SuperAdmin,
        }
    }
}

/// Dashboard metrics view.
#[derive(Debug, Clone)]
pub struct MetricsView {
    pub orders: String,
    pub revenue: String,
    pub customers: String,
    pub products: String,
}

/// Recent order view for dashboard.
#[derive(Debug, Clone)]
pub struct RecentOrderView {
    pub id: i32,
    pub number: String,
    pub customer: String,
    pub total: String,
    pub status: String,
}

impl From<&AdminOrder> for RecentOrderView {
    fn from(order: &AdminOrder) -> Self {
        Self {
            id: order.id.as_i32(),
            number: order.number.clone(),
            customer: order.shipping_name.clone(),
            total: order.totals.total.to_string(),
            status: order.status.label().to_string(),
        }
    }
}

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub metrics: MetricsView,
    pub recent_orders: Vec<RecentOrderView>,
}

/// Dashboard page handler.
#[instrument(skip(admin, state))]
pub async fn dashboard(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<DashboardTemplate> {
    let orders = OrderAdminRepository::new(state.pool());

    let metrics = orders.metrics().await?;
    let recent = orders.recent(5).await?;

    Ok(DashboardTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/".to_string(),
        metrics: MetricsView {
            orders: metrics.order_count.to_string(),
            revenue: metrics.revenue.to_string(),
            customers: metrics.customer_count.to_string(),
            products: metrics.product_count.to_string(),
        },
        recent_orders: recent.iter().map(RecentOrderView::from).collect(),
    })
}
