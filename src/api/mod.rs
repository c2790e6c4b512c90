use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Store;
use crate::services::admin::AdminService;
use crate::services::token::TokenService;
use crate::services::upload::UploadService;
use crate::services::users::UserService;

mod admin;
pub mod auth;
mod error;
mod types;
mod users;
mod validation;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    pub store: Store,

    pub tokens: Arc<TokenService>,

    pub users: Arc<UserService>,

    pub admin: Arc<AdminService>,

    pub uploads: Arc<UploadService>,
}

pub async fn create_app_state_from_config(config: Config) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let tokens = Arc::new(TokenService::new(&config.auth));
    let users = Arc::new(UserService::new(store.clone(), tokens.clone()));
    let admin = Arc::new(AdminService::new(store.clone(), tokens.clone()));
    let uploads = Arc::new(UploadService::new(&config.general.uploads_path));

    Ok(Arc::new(AppState {
        config: Arc::new(config),
        store,
        tokens,
        users,
        admin,
        uploads,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let uploads_path = state.config.general.uploads_path.clone();
    let cors_origins = state.config.server.cors_allowed_origins.clone();

    let public_routes = Router::new()
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login))
        .route("/users/logout", post(users::logout))
        .route("/admin/login", post(admin::admin_login));

    let profile_routes = Router::new()
        .route("/users/profile", get(users::get_profile))
        .route("/users/profile", put(users::edit_profile))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    // Layer order matters here: the auth layer is added last so it runs
    // first and the admin gate sees the loaded user.
    let admin_routes = Router::new()
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users", post(admin::create_user))
        .route("/admin/users/{id}", get(admin::get_user))
        .route("/admin/users/{id}", put(admin::update_user))
        .route("/admin/users/{id}", delete(admin::delete_user))
        .route_layer(middleware::from_fn(auth::require_admin))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .merge(public_routes)
        .merge(profile_routes)
        .merge(admin_routes)
        .nest_service(
            "/uploads",
            tower_http::services::ServeDir::new(uploads_path),
        )
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
