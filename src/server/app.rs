use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post, MethodRouter},
    Extension, Router,
};
use sea_orm::DatabaseConnection;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{admin, auth, health, networks};
use super::openapi::ApiDoc;
use crate::admin::{AdminRegistry, AdminView};
use crate::services::{AuthService, CheckService, CheckTaskQueue, NetworkService};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub auth: AuthService,
    pub networks: NetworkService,
    pub checks: CheckService,
    pub admin: AdminRegistry,
}

impl AppState {
    pub fn new(db: DatabaseConnection, queue: Arc<dyn CheckTaskQueue>) -> Self {
        Self {
            auth: AuthService::new(db.clone()),
            networks: NetworkService::new(db.clone()),
            checks: CheckService::new(db.clone(), queue),
            admin: AdminRegistry::new(),
            db,
        }
    }

    pub fn with_session_ttl_hours(mut self, hours: i64) -> Self {
        self.auth = self.auth.with_session_ttl_hours(hours);
        self
    }
}

pub fn create_app(state: AppState, cors_origin: Option<&str>) -> Result<Router> {
    let cors = match cors_origin.filter(|origin| *origin != "*") {
        Some(origin) => CorsLayer::new()
            .allow_origin(
                origin
                    .parse::<axum::http::HeaderValue>()
                    .with_context(|| format!("Invalid CORS origin: {}", origin))?,
            )
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    let admin_routes = state
        .admin
        .views()
        .iter()
        .fold(admin_routes(), |router, view| {
            router.merge(view_routes(Arc::clone(view)))
        });

    let app = Router::new()
        .route("/health", get(health::health_check))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(auth_routes())
        .merge(network_routes())
        .merge(admin_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state);

    Ok(app)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", get(auth::login_page).post(auth::login))
        .route("/auth/logout", post(auth::logout))
}

fn network_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(networks::home))
        .route(
            "/create_network",
            get(networks::create_network).post(networks::create_network),
        )
        .route(
            "/update_network_config",
            get(networks::network_config).post(networks::update_network_config),
        )
        .route(
            "/delete_network",
            get(networks::delete_network_confirm).post(networks::delete_network),
        )
        .route("/web_network", get(networks::web_network))
        .route("/web_network_shared", get(networks::web_network_shared))
        .route("/post_nodes", post(networks::post_nodes))
        .route("/post_edges", post(networks::post_edges))
        .route("/post_nodes_edges", post(networks::post_nodes_edges))
        .route("/move_nodes", post(networks::move_nodes))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/", get(admin::index))
        .route(
            admin::CHECK_BY_QUESTION_PATH,
            get(admin::check_by_question_form).post(admin::check_by_question),
        )
        .route(
            admin::CREATE_CHECK_TASK_PATH,
            get(admin::create_check_task_form).post(admin::create_check_task),
        )
}

/// CRUD routes of one view, mounted under its slug.
fn view_routes(view: Arc<dyn AdminView>) -> Router<AppState> {
    let base = format!("/admin/{}", view.info().slug);
    let bind = |route: MethodRouter<AppState>| -> MethodRouter<AppState> {
        route.layer(Extension(Arc::clone(&view)))
    };

    Router::new()
        .route(&format!("{}/", base), bind(get(admin::list)))
        .route(&format!("{}/new", base), bind(post(admin::create)))
        .route(&format!("{}/:id", base), bind(get(admin::get)))
        .route(&format!("{}/:id/edit", base), bind(post(admin::update)))
        .route(&format!("{}/:id/delete", base), bind(post(admin::delete)))
        .route(&format!("{}/choices/:field", base), bind(get(admin::choices)))
}
