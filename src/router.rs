use std::sync::Arc;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::{middleware, Router};
use axum::extract::DefaultBodyLimit;
use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::response::IntoResponse;
use axum::routing::get;
use http::header::{CONNECTION, CONTENT_LENGTH, ORIGIN};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower::ServiceBuilder;
use crate::auth::middleware::require_auth;
use crate::auth::routes::create_auth_routes;
use crate::chat::routes::create_chat_routes;
use crate::core::AppState;
use crate::files::routes::create_file_routes;
use crate::friends::routes::create_friend_routes;
use crate::users::routes::create_user_routes;

/**
 * Initializing the api routes.
 */
pub async fn init_router(app_state: AppState) -> Router {
    let state = Arc::new(app_state);
    let origin = state.env.http.cors_origin.clone();
    let cors = CorsLayer::new()
        .allow_origin(origin.parse::<HeaderValue>().unwrap())
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE, CONTENT_LENGTH, CONNECTION, ORIGIN])
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS]);

    let public_routing = Router::new()
        .route("/", get(|| async { "Hello, world! I'm your new courier. 🤗" }))
        .route("/health", get(|| async { (StatusCode::OK, "Healthy").into_response() }))
        .merge(create_auth_routes())
        .nest_service("/uploads", ServeDir::new(&state.env.uploads.dir))
        .with_state(state.clone());

    let protected_routing = Router::new() //add new routes here
        .merge(create_chat_routes())
        .merge(create_friend_routes())
        .merge(create_user_routes())
        .merge(create_file_routes())

        //layering bottom to top middleware
        .layer(
            ServiceBuilder::new() //layering top to bottom middleware
                .layer(TraceLayer::new_for_http()) //1
                .layer(cors) //2
                .layer(middleware::from_fn_with_state(state.clone(), require_auth)) //3..
                .layer(DefaultBodyLimit::max(5 * 1024 * 1024)) //max 5mb files
        )
        .with_state(state);
    public_routing.merge(protected_routing)
}
