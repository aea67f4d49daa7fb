use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, MethodRouter};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::errors::AppError;
use crate::handlers::{admin, auth, booking, chat, content, health, media, public, theme};
use crate::middleware::require_admin;
use crate::models::{
    ContentSection, Creatable, EventHighlight, FoodShowcaseItem, GalleryItem, MediaAsset, MenuItem, Resource,
    Testimonial,
};
use crate::services::media::MAX_UPLOAD_BODY_BYTES;
use crate::state::AppState;

type SharedState = Arc<AppState>;

async fn fallback() -> AppError {
    AppError::NotFound("The requested endpoint does not exist".to_string())
}

fn admin_collection<R: Creatable>() -> MethodRouter<SharedState> {
    get(content::list::<R>)
        .post(content::create::<R>)
        .patch(content::update::<R>)
        .delete(content::remove::<R>)
}

fn public_collection<R: Resource>() -> MethodRouter<SharedState> {
    get(public::list_visible::<R>)
}

fn cors(origin: Option<&str>) -> CorsLayer {
    let Some(origin) = origin else {
        return CorsLayer::permissive();
    };
    match origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true),
        Err(e) => {
            tracing::warn!(origin, error = %e, "invalid CORS_ORIGIN, allowing any origin");
            CorsLayer::permissive()
        }
    }
}

pub fn build_router(state: SharedState) -> Router {
    let booking_routes = Router::new()
        .route("/create", post(booking::create_booking))
        .route("/accept", post(booking::accept_booking))
        .route("/reject", post(booking::reject_booking))
        .route(
            "/suggest",
            get(booking::prepare_suggestion).post(booking::suggest_times),
        )
        .route("/confirm", post(booking::confirm_booking));

    let admin_routes = Router::new()
        .route(
            "/bookings",
            get(admin::list_bookings).patch(admin::update_booking_status),
        )
        .route("/bookings/:id", get(admin::get_booking))
        .route("/bookings/:id/ics", get(admin::download_ics))
        .route("/menu", admin_collection::<MenuItem>())
        .route("/gallery", admin_collection::<GalleryItem>())
        .route("/testimonials", admin_collection::<Testimonial>())
        .route("/events", admin_collection::<EventHighlight>())
        .route("/food-showcase", admin_collection::<FoodShowcaseItem>())
        .route("/content", admin_collection::<ContentSection>())
        .route(
            "/media",
            get(content::list::<MediaAsset>)
                .post(media::upload)
                .patch(content::update::<MediaAsset>)
                .delete(content::remove::<MediaAsset>)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES)),
        )
        .route("/media/thumbnail", get(media::thumbnail))
        .route("/theme", get(theme::get_theme).put(theme::update_theme));

    let public_routes = Router::new()
        .route("/menu", public_collection::<MenuItem>())
        .route("/gallery", public_collection::<GalleryItem>())
        .route("/testimonials", public_collection::<Testimonial>())
        .route("/events", public_collection::<EventHighlight>())
        .route("/food-showcase", public_collection::<FoodShowcaseItem>())
        .route("/content", public_collection::<ContentSection>())
        .route("/theme", get(public::theme));

    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/session", get(auth::session));

    Router::new()
        .route("/health", get(health::health))
        .route("/api/chat", post(chat::chat))
        .nest("/api/booking", booking_routes)
        .nest("/api/admin", admin_routes)
        .nest("/api/public", public_routes)
        .nest("/api/auth", auth_routes)
        .fallback(fallback)
        .layer(from_fn_with_state(state.clone(), require_admin))
        .layer(TraceLayer::new_for_http())
        .layer(cors(state.config.cors_origin.as_deref()))
        .with_state(state)
}
