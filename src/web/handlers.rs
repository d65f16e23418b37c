//! Page handlers.

use axum::extract::{Form, Path, Query, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Redirect, Response};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::task::JoinSet;

use super::render::{NavEntry, Page, SubNav};
use super::AppState;
use crate::core::enclosure::build_enclosure_view;
use crate::core::event_log::Notification;
use crate::core::locate::LocateProvider;
use crate::core::pool::{build_pool_view, PoolState, PoolView, ViewContext};
use crate::core::severity::Severity;
use crate::core::usage::{list_pool_usage, DatasetUsage};
use crate::core::validation::{parse_locate_state, validate_device_name, validate_pool_name};
use crate::error::{PoolwatchError, Result};
use crate::platform::system::{format_duration, load_average, system_uptime};

type HandlerResult = std::result::Result<Response, PoolwatchError>;

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub sys_uptime: String,
    pub daemon_uptime: String,
    pub load_average: [f64; 3],
    pub pools: Vec<PoolView>,
}

#[derive(Debug, Serialize)]
pub struct UsageView {
    pub pool: String,
    pub datasets: Vec<DatasetUsage>,
}

#[derive(Debug, Serialize)]
pub struct AboutView {
    pub version: &'static str,
    pub environment: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LocateParams {
    pub dev: String,
    pub state: String,
}

impl LocateParams {
    /// Fields from a form body win over the query string.
    fn merge(self, body: Option<LocateParams>) -> Self {
        let Some(body) = body else { return self };
        let pick = |body: String, query: String| if body.is_empty() { query } else { body };
        Self {
            dev: pick(body.dev, self.dev),
            state: pick(body.state, self.state),
        }
    }
}

impl AppState {
    /// Record a backend failure in the dashboard's own event log.
    fn report(&self, err: PoolwatchError) -> PoolwatchError {
        if !err.is_validation() {
            self.event_log
                .append(Notification::message(Severity::Err, err.to_string()));
        }
        err
    }
}

fn render_page<T: Serialize>(
    app: &AppState,
    template: &str,
    active: Option<NavEntry>,
    subnav: Vec<SubNav>,
    data: &T,
) -> HandlerResult {
    let rendered = Page::new(app.nav(active), subnav, data)
        .and_then(|page| app.renderer.render(template, &page));

    match rendered {
        Ok(body) => Ok(([(header::CONTENT_TYPE, app.renderer.content_type())], body).into_response()),
        Err(e) => Err(app.report(PoolwatchError::render(format!(
            "error executing template {}: {}",
            template, e
        )))),
    }
}

/// Locate state answered before the views are built.
///
/// Devices missing from the map did not answer (error or timeout) and get
/// no locate control.
struct LocateAnswers(HashMap<String, bool>);

impl LocateProvider for LocateAnswers {
    fn query(&self, device: &str) -> Result<bool> {
        self.0
            .get(device)
            .copied()
            .ok_or_else(|| PoolwatchError::locate(format!("no answer for {}", device)))
    }

    fn set(&self, device: &str, _on: bool) -> Result<()> {
        Err(PoolwatchError::locate(format!("{}: answers are read-only", device)))
    }

    fn name(&self) -> &str {
        "answers"
    }
}

/// Names of the leaf devices of `pools`, the only ones with a locate control.
fn leaf_devices<'a, I>(pools: I) -> HashSet<String>
where
    I: IntoIterator<Item = &'a PoolState>,
{
    pools
        .into_iter()
        .flat_map(|pool| pool.devices.iter())
        .filter(|dev| dev.is_leaf())
        .map(|dev| dev.name.clone())
        .collect()
}

/// Query every device concurrently on the blocking pool.
///
/// Each query has its own timeout, so a hanging slot only loses its own
/// control. Abandoned queries finish in the background.
async fn query_locate(app: &AppState, devices: HashSet<String>) -> Option<LocateAnswers> {
    let locate = app.locate.clone()?;
    let timeout = app.config.leds.query_timeout();

    let mut queries = JoinSet::new();
    for device in devices {
        let locate = Arc::clone(&locate);
        queries.spawn(async move {
            let dev = device.clone();
            let task = tokio::task::spawn_blocking(move || locate.query(&dev));
            let answer = match tokio::time::timeout(timeout, task).await {
                Ok(Ok(Ok(lit))) => Some(lit),
                Ok(Ok(Err(e))) => {
                    log::debug!("no locate control for {}: {}", device, e);
                    None
                }
                Ok(Err(e)) => {
                    log::error!("locate query for {} failed: {}", device, e);
                    None
                }
                Err(_) => {
                    log::warn!("locate query for {} took longer than {:?}", device, timeout);
                    None
                }
            };
            answer.map(|lit| (device, lit))
        });
    }

    let mut answers = HashMap::new();
    while let Some(joined) = queries.join_next().await {
        if let Ok(Some((device, lit))) = joined {
            answers.insert(device, lit);
        }
    }
    Some(LocateAnswers(answers))
}

/// Build views against the captured snapshot, with the locate answers
/// gathered up front.
async fn build_views<T, F>(app: &AppState, devices: HashSet<String>, build: F) -> T
where
    F: FnOnce(&ViewContext<'_>) -> T,
{
    let answers = query_locate(app, devices).await;
    build(&ViewContext {
        classifier: &*app.classifier,
        root: app.root(),
        locate: answers.as_ref().map(|a| a as &dyn LocateProvider),
    })
}

/// Run one locate backend call on the blocking pool under the timeout.
async fn with_locate<T, F>(app: &AppState, locate: Arc<dyn LocateProvider>, call: F) -> Result<T>
where
    F: FnOnce(&dyn LocateProvider) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let timeout = app.config.leds.query_timeout();
    let task = tokio::task::spawn_blocking(move || call(&*locate));

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => Err(PoolwatchError::locate(format!("locate task failed: {}", e))),
        Err(_) => Err(PoolwatchError::locate(format!("no answer within {:?}", timeout))),
    }
}

pub async fn status_index(State(app): State<AppState>) -> HandlerResult {
    status(app, String::new()).await
}

pub async fn status_pool(State(app): State<AppState>, Path(pool): Path<String>) -> HandlerResult {
    status(app, pool).await
}

async fn status(app: AppState, pool: String) -> HandlerResult {
    if !pool.is_empty() {
        validate_pool_name(&pool)?;
    }

    let snapshot = app.store.snapshot();

    if snapshot.pools.is_empty() {
        return render_page(&app, "status-none", Some(NavEntry::Status), Vec::new(), &());
    }

    if pool.is_empty() {
        let target = format!("{}/status/{}", app.root(), snapshot.pools[0].name);
        return Ok(Redirect::to(&target).into_response());
    }

    let subnav: Vec<SubNav> = snapshot
        .pools
        .iter()
        .map(|p| SubNav {
            name: p.name.clone(),
            active: p.name == pool,
        })
        .collect();

    let index = snapshot
        .pools
        .iter()
        .position(|p| p.name == pool)
        .ok_or(PoolwatchError::UnknownPool(pool))?;

    let pool = &snapshot.pools[index];
    let view = build_views(&app, leaf_devices([pool]), |ctx| {
        build_pool_view(pool, &snapshot.usage, ctx)
    })
    .await;

    let template = if subnav.len() > 1 {
        "status-many"
    } else {
        "status-single"
    };
    render_page(&app, template, Some(NavEntry::Status), subnav, &view)
}

pub async fn usage_index() -> HandlerResult {
    Err(PoolwatchError::InvalidPoolName(String::new()))
}

pub async fn usage_pool(State(app): State<AppState>, Path(pool): Path<String>) -> HandlerResult {
    validate_pool_name(&pool)?;

    let datasets = list_pool_usage(&app.config.main.usage_command, &pool)
        .await
        .map_err(|e| app.report(e))?;

    render_page(&app, "usage", None, Vec::new(), &UsageView { pool, datasets })
}

pub async fn dashboard(State(app): State<AppState>) -> HandlerResult {
    let sys_uptime = system_uptime().unwrap_or_else(|e| {
        log::error!("can not get system uptime: {}", e);
        0
    });
    let load_average = load_average().unwrap_or_else(|e| {
        log::error!("can not get system load average: {}", e);
        [0.0; 3]
    });

    let snapshot = app.store.snapshot();
    let pools = build_views(&app, leaf_devices(snapshot.pools.iter()), |ctx| {
        snapshot
            .pools
            .iter()
            .enumerate()
            .map(|(n, pool)| PoolView {
                n,
                ..build_pool_view(pool, &snapshot.usage, ctx)
            })
            .collect::<Vec<_>>()
    })
    .await;

    let view = DashboardView {
        sys_uptime: format_duration(std::time::Duration::from_secs(sys_uptime)),
        daemon_uptime: format_duration(app.started.elapsed()),
        load_average,
        pools,
    };
    render_page(&app, "dashboard", Some(NavEntry::Dashboard), Vec::new(), &view)
}

pub async fn statistics(State(app): State<AppState>) -> HandlerResult {
    render_page(&app, "statistics", Some(NavEntry::Statistics), Vec::new(), &())
}

pub async fn logs(State(app): State<AppState>) -> HandlerResult {
    let entries = app.event_log.snapshot();
    render_page(&app, "logs", Some(NavEntry::Logs), Vec::new(), &entries)
}

pub async fn about(State(app): State<AppState>) -> HandlerResult {
    let view = AboutView {
        version: env!("CARGO_PKG_VERSION"),
        environment: format!("{} {} ({})", std::env::consts::OS, std::env::consts::ARCH, std::env::consts::FAMILY),
    };
    render_page(&app, "about", Some(NavEntry::About), Vec::new(), &view)
}

pub async fn enclosure(State(app): State<AppState>) -> HandlerResult {
    let snapshot = app.store.snapshot();
    let view = build_enclosure_view(&snapshot.pools, app.config.chassis.model);
    render_page(&app, "enclosure", Some(NavEntry::Enclosure), Vec::new(), &view)
}

pub async fn locate(
    State(app): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<LocateParams>,
    body: Option<Form<LocateParams>>,
) -> HandlerResult {
    let params = query.merge(body.map(|Form(body)| body));
    let device = validate_device_name(&params.dev)?.to_string();
    let on = parse_locate_state(&params.state)?;
    let unknown = || PoolwatchError::InvalidDevice(params.dev.clone());

    let locate = app.locate.clone().ok_or_else(unknown)?;

    let dev = device.clone();
    if let Err(e) = with_locate(&app, Arc::clone(&locate), move |l| l.query(&dev)).await {
        log::debug!("locate query for {} failed: {}", device, e);
        return Err(unknown());
    }

    let dev = device.clone();
    with_locate(&app, locate, move |l| l.set(&dev, on))
        .await
        .map_err(|e| app.report(e))?;

    let back = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}/status/", app.root()));
    Ok(Redirect::to(&back).into_response())
}
