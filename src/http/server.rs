//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build subsystems from configuration (route table, cities, cache, USGS client)
//! - Create Axum Router with page dispatch and API handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit, metrics)
//! - Serve until shutdown, then persist the result cache

use axum::{
    http::{header, HeaderValue},
    middleware,
    routing::get,
    Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{AppConfig, SiteConfig};
use crate::earthquakes::{
    CityError, CityStore, EarthquakeService, ResultCache, TaskRegistry, UsgsClient, UsgsError,
};
use crate::http::middleware::track_metrics;
use crate::http::request::{make_request_span, X_REQUEST_ID};
use crate::http::{api, pages};
use crate::lifecycle::Shutdown;
use crate::routing::{app_router, PageRouter, RouteError};

/// Errors that abort start-up.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid route table: {0}")]
    Routes(#[from] RouteError),
    #[error("invalid city seed: {0}")]
    Cities(#[from] CityError),
    #[error("failed to build USGS client: {0}")]
    Usgs(#[from] UsgsError),
    #[error("failed to load result cache: {0}")]
    Cache(#[from] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pages: PageRouter,
    pub service: EarthquakeService,
    pub tasks: TaskRegistry,
    pub site: Arc<SiteConfig>,
}

/// HTTP server for quake-finder.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: AppConfig) -> Result<Self, StartupError> {
        let pages = app_router()?;
        let cities = CityStore::from_seeds(&config.cities)?;
        let usgs = UsgsClient::new(
            config.usgs.clone(),
            &config.retries,
            Duration::from_secs(config.timeouts.upstream_secs),
        )?;

        let cache = if config.cache.enabled {
            let ttl = Duration::from_secs(config.cache.ttl_secs);
            Some(match &config.cache.persistence_path {
                Some(path) => ResultCache::load_from_file(&PathBuf::from(path), ttl)?,
                None => ResultCache::new(ttl, None),
            })
        } else {
            None
        };

        let state = AppState {
            pages,
            service: EarthquakeService::new(cities, usgs, cache),
            tasks: TaskRegistry::new(),
            site: Arc::new(config.site.clone()),
        };

        let router = Self::build_router(&config, state.clone());
        Ok(Self {
            router,
            config,
            state,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/health", get(api::health))
            .route("/api/routes", get(api::list_routes))
            .route("/api/cities", get(api::list_cities).post(api::create_city))
            .route(
                "/api/cities/{city_id}",
                get(api::get_city).put(api::update_city).delete(api::delete_city),
            )
            .route(
                "/api/cities/{city_id}/earthquakes",
                get(api::search_earthquakes).post(api::submit_search),
            )
            .route("/api/cities/results/{task_id}", get(api::task_result))
            .fallback(pages::page_handler)
            .with_state(state)
            .layer(middleware::from_fn(track_metrics))
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

        if config.security.enable_headers {
            router = router
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::X_FRAME_OPTIONS,
                    HeaderValue::from_static("DENY"),
                ));
        }

        router
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
    }

    /// The fully layered router, e.g. for driving requests in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run the server until `shutdown` is triggered.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, routes = self.state.pages.len(), "HTTP server starting");

        let sweeper = self.state.tasks.clone().run_sweeper(
            Duration::from_secs(self.config.tasks.sweep_interval_secs),
            Duration::from_secs(self.config.tasks.result_ttl_secs),
            shutdown.subscribe(),
        );
        tokio::spawn(sweeper);

        if let Some(cache) = self.state.service.cache() {
            tokio::spawn(cache.clone().run_sweeper(
                Duration::from_secs(self.config.cache.sweep_interval_secs),
                shutdown.subscribe(),
            ));
        }

        let mut stop = shutdown.subscribe();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = stop.recv().await;
            })
            .await?;

        if let Some(cache) = self.state.service.cache() {
            if let Err(e) = cache.save_to_file() {
                tracing::error!(error = %e, "Failed to persist result cache");
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
