mod config;
mod database;
mod error;
mod handlers;
mod middleware;
mod models;
mod params;
mod repositories;
mod response;
mod services;
mod utils;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, FromRef},
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, put},
    Router,
};
use dotenvy::dotenv;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use config::AppConfig;
use database::{close_database_pool, create_database_pool, Database};
use services::{AnalyticsService, PurchaseOrderService};

/// Shared router state. Services are cheap handles over the same pool.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt_secret: Arc<str>,
    pub expose_error_details: bool,
}

impl AppState {
    pub fn new(db: Database, jwt_secret: &str) -> Self {
        Self {
            db,
            jwt_secret: Arc::from(jwt_secret),
            expose_error_details: false,
        }
    }

    /// Show internal error text in 500 responses.
    pub fn with_error_details(mut self, enabled: bool) -> Self {
        self.expose_error_details = enabled;
        self
    }
}

impl FromRef<AppState> for Database {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for PurchaseOrderService {
    fn from_ref(state: &AppState) -> Self {
        PurchaseOrderService::new(state.db.clone())
    }
}

impl FromRef<AppState> for AnalyticsService {
    fn from_ref(state: &AppState) -> Self {
        AnalyticsService::new(state.db.clone())
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run().await {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    let db = create_database_pool(&config.database_url, config.max_connections).await?;

    let state =
        AppState::new(db.clone(), &config.jwt_secret).with_error_details(config.is_development());
    let app = create_router(state).layer(cors_layer(&config.cors_origins));

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("Vendor management API listening on http://{} ({})", addr, config.environment);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_database_pool(db).await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", err);
    }
    log::info!("Shutdown signal received");
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                log::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/dashboard", get(handlers::dashboard))
        // Vendors
        .route(
            "/vendors",
            get(handlers::vendors::list_vendors).post(handlers::vendors::create_vendor),
        )
        .route(
            "/vendors/:id",
            get(handlers::vendors::get_vendor)
                .put(handlers::vendors::update_vendor)
                .delete(handlers::vendors::delete_vendor),
        )
        // Contacts
        .route(
            "/vendors/:id/contacts",
            get(handlers::contacts::list_contacts).post(handlers::contacts::create_contact),
        )
        .route(
            "/contacts/:id",
            put(handlers::contacts::update_contact).delete(handlers::contacts::delete_contact),
        )
        // Products
        .route(
            "/vendors/:id/products",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route(
            "/products/:id",
            put(handlers::products::update_product).delete(handlers::products::delete_product),
        )
        // Purchase orders
        .route(
            "/purchase-orders",
            get(handlers::purchase_orders::list_purchase_orders)
                .post(handlers::purchase_orders::create_purchase_order),
        )
        .route(
            "/purchase-orders/:id",
            get(handlers::purchase_orders::get_purchase_order)
                .put(handlers::purchase_orders::update_purchase_order)
                .delete(handlers::purchase_orders::delete_purchase_order),
        )
        .route(
            "/purchase-orders/:id/items",
            put(handlers::purchase_orders::replace_purchase_order_items),
        )
        // Analytics
        .route("/analytics/summary", get(handlers::analytics::summary))
        .route(
            "/analytics/spend-by-vendor",
            get(handlers::analytics::spend_by_vendor),
        )
        .route("/analytics/spend-trend", get(handlers::analytics::spend_trend))
        .route("/analytics/po-status", get(handlers::analytics::po_status))
        .route_layer(from_fn_with_state(state.clone(), middleware::require_auth));

    let api = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected);

    Router::new()
        .nest("/api", api)
        .fallback(handlers::not_found)
        .layer(from_fn_with_state(
            state.clone(),
            middleware::expose_error_details,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(1024 * 1024)),
        )
        .with_state(state)
}
