//! HTTP front of the dashboard.
//!
//! Handlers are thin: capture one snapshot, call the view builders, hand
//! the result to the renderer. No lock is held past the snapshot read.

pub mod handlers;
pub mod render;
pub mod server;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use std::time::Instant;

use crate::core::config::Config;
use crate::core::event_log::EventLog;
use crate::core::locate::LocateProvider;
use crate::core::severity::Classifier;
use crate::core::state_store::StateStore;
use crate::error::PoolwatchError;
use crate::platform::locate::SysfsLocator;

pub use render::{JsonRenderer, Nav, NavEntry, Page, Renderer, SubNav};
pub use server::{router, serve};

/// Shared state of all request handlers. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub classifier: Arc<Classifier>,
    pub store: StateStore,
    pub event_log: Arc<EventLog>,
    /// `None` when locate LEDs are disabled.
    pub locate: Option<Arc<dyn LocateProvider>>,
    pub renderer: Arc<dyn Renderer>,
    pub started: Instant,
}

impl AppState {
    /// State with the sysfs locate backend (if enabled) and the JSON renderer.
    pub fn new(config: Config, store: StateStore, event_log: Arc<EventLog>) -> Self {
        let locate: Option<Arc<dyn LocateProvider>> = if config.leds.enable {
            log::info!("locate LEDs enabled via {:?}", config.leds.sysfs_root);
            Some(Arc::new(SysfsLocator::new(config.leds.sysfs_root.clone())))
        } else {
            None
        };

        Self {
            classifier: Arc::new(config.classifier()),
            config: Arc::new(config),
            store,
            event_log,
            locate,
            renderer: Arc::new(JsonRenderer::default()),
            started: Instant::now(),
        }
    }

    pub fn with_locate(mut self, locate: Option<Arc<dyn LocateProvider>>) -> Self {
        self.locate = locate;
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn root(&self) -> &str {
        &self.config.www.root
    }

    fn nav(&self, active: Option<NavEntry>) -> Nav {
        Nav {
            active,
            root: self.root().to_string(),
        }
    }
}

impl IntoResponse for PoolwatchError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_client_error() {
            log::debug!("rejected request: {}", self);
        } else {
            log::error!("{}", self);
        }
        (status, status.canonical_reason().unwrap_or_default()).into_response()
    }
}
