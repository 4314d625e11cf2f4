mod auth;
mod files;
mod home;
mod upload;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use sea_orm::DatabaseConnection;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::services::catalog::MediaCatalog;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub catalog: MediaCatalog,
    pub config: Arc<Config>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        home::root,
        auth::login,
        auth::register,
        files::list_files,
        files::update_file,
        files::delete_file,
        upload::upload_media,
    ),
    components(
        schemas(
            crate::models::MessageResponse,
            crate::models::media::MediaRecord,
            crate::models::account::AuthToken,
            crate::models::account::UserProfile,
            crate::models::account::LoginRequest,
            crate::models::account::LoginResponse,
            crate::models::account::RegisterRequest,
            crate::entities::media::MediaKind,
        )
    ),
    tags(
        (name = "General", description = "General API information"),
        (name = "Authentication", description = "Registration and login; tokens are unverified placeholders"),
        (name = "Media", description = "Listing, uploading, editing and deleting memories")
    ),
    info(
        title = "Memory Share API",
        version = "0.1.0",
        description = "Photo and video memory sharing backed by a relational catalog",
    )
)]
struct ApiDoc;

pub fn create_routes(state: AppState) -> Router {
    let swagger_router: Router = SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into();

    let api_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/files", get(files::list_files))
        .route("/files/{id}", put(files::update_file).delete(files::delete_file))
        .route("/upload", post(upload::upload_media))
        // Multipart framing adds a little on top of the file itself.
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes.saturating_add(64 * 1024)));

    let mut app = Router::new()
        .route("/", get(home::root))
        .nest("/api", api_routes);

    if let Some(dir) = state.catalog.store().served_dir() {
        app = app.nest_service("/uploads", ServeDir::new(dir));
    }

    Router::new()
        .merge(swagger_router)
        .merge(app.with_state(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
