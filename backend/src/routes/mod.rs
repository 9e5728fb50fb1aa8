//! Route definitions for the SOILY platform

use axum::{
    middleware,
    routing::{get, patch, post, put},
    Router,
};

use crate::{
    handlers,
    middleware::{admin_auth, farmer_auth},
    AppState,
};

/// Create API routes
pub fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Protected farmer routes
        .nest("/farmer", farmer_routes(state))
        .nest("/soil-analysis", soil_analysis_routes(state))
        .nest("/dashboard", dashboard_routes(state))
        .nest("/analyze-field", field_routes(state))
        // Admin console
        .nest("/admin", admin_routes(state))
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
        .route("/logout", post(handlers::logout))
}

/// Farmer account routes (protected)
fn farmer_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(handlers::get_profile).put(handlers::update_profile),
        )
        .route("/farm-details", put(handlers::update_farm_details))
        .route("/language", put(handlers::update_language))
        .route("/notifications", put(handlers::update_notifications))
        .route("/change-password", post(handlers::change_password))
        .route("/account", axum::routing::delete(handlers::delete_account))
        .route_layer(middleware::from_fn_with_state(state.clone(), farmer_auth))
}

/// Soil analysis and report routes (protected)
fn soil_analysis_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::save_analysis))
        .route("/preview", post(handlers::preview_analysis))
        .route("/reports", get(handlers::list_reports))
        .route(
            "/reports/:id",
            get(handlers::get_report).delete(handlers::delete_report),
        )
        .route("/reports/:id/notes", put(handlers::update_report_notes))
        .route("/reports/:id/archive", put(handlers::archive_report))
        .route("/reports/:id/download", get(handlers::download_report))
        .route("/export-all", get(handlers::export_all_reports))
        .route("/statistics", get(handlers::get_statistics))
        .route("/seasonal-trends", get(handlers::get_seasonal_trends))
        .route_layer(middleware::from_fn_with_state(state.clone(), farmer_auth))
}

/// Dashboard routes (protected)
fn dashboard_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/stats", get(handlers::dashboard_stats))
        .route("/recent-activity", get(handlers::recent_activities))
        .route("/recommendations", get(handlers::dashboard_recommendations))
        .route_layer(middleware::from_fn_with_state(state.clone(), farmer_auth))
}

/// Satellite imagery (protected)
fn field_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::analyze_field))
        .route_layer(middleware::from_fn_with_state(state.clone(), farmer_auth))
}

/// Admin routes; login is public, the rest need an admin token
fn admin_routes(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/farmers", get(handlers::admin_list_farmers))
        .route(
            "/farmers/bulk-delete",
            post(handlers::admin_bulk_delete_farmers),
        )
        .route(
            "/farmers/:id",
            get(handlers::admin_get_farmer)
                .put(handlers::admin_update_farmer)
                .delete(handlers::admin_delete_farmer),
        )
        .route(
            "/farmers/:id/toggle-status",
            patch(handlers::admin_toggle_farmer_status),
        )
        .route("/analyses", get(handlers::admin_list_analyses))
        .route(
            "/analyses/bulk-delete",
            post(handlers::admin_bulk_delete_analyses),
        )
        .route(
            "/analyses/:id",
            get(handlers::admin_get_analysis).delete(handlers::admin_delete_analysis),
        )
        .route("/statistics", get(handlers::admin_statistics))
        .route("/report", get(handlers::admin_system_report))
        .route_layer(middleware::from_fn_with_state(state.clone(), admin_auth));

    Router::new()
        .route("/login", post(handlers::admin_login))
        .merge(protected)
}
