// Request-level tests against the axum router, no socket involved.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

use poolwatch::core::config::Config;
use poolwatch::core::event_log::EventLog;
use poolwatch::core::locate::LocateProvider;
use poolwatch::core::pool::{DeviceState, PoolState, UsageMap, UsageStat};
use poolwatch::error::{PoolwatchError, Result};
use poolwatch::web::{router, AppState};
use poolwatch::StateStore;

#[derive(Default)]
struct FakeLocate {
    leds: Mutex<HashMap<String, bool>>,
    /// Devices whose query stalls for `delay`.
    slow: Vec<&'static str>,
    delay: Duration,
}

impl FakeLocate {
    fn with(devices: &[&str]) -> Self {
        Self {
            leds: Mutex::new(devices.iter().map(|d| (d.to_string(), false)).collect()),
            ..Default::default()
        }
    }

    fn lit(&self, device: &str) -> bool {
        self.leds.lock().unwrap()[device]
    }
}

impl LocateProvider for FakeLocate {
    fn query(&self, device: &str) -> Result<bool> {
        if self.slow.contains(&device) {
            std::thread::sleep(self.delay);
        }
        self.leds
            .lock()
            .unwrap()
            .get(device)
            .copied()
            .ok_or_else(|| PoolwatchError::locate(format!("{} not in a bay", device)))
    }

    fn set(&self, device: &str, on: bool) -> Result<()> {
        match self.leds.lock().unwrap().get_mut(device) {
            Some(led) => {
                *led = on;
                Ok(())
            }
            None => Err(PoolwatchError::locate(format!("{} not in a bay", device))),
        }
    }

    fn name(&self) -> &str {
        "fake"
    }
}

fn pool(name: &str, state: &str, leaves: &[(&str, &str)]) -> PoolState {
    let mut devices = vec![DeviceState {
        name: name.to_string(),
        state: state.to_string(),
        sub_devices: (1..=leaves.len()).collect(),
        ..Default::default()
    }];
    devices.extend(leaves.iter().map(|(dev, st)| DeviceState {
        name: dev.to_string(),
        state: st.to_string(),
        parent: Some(0),
        ..Default::default()
    }));
    PoolState {
        name: name.to_string(),
        state: state.to_string(),
        devices,
        ..Default::default()
    }
}

fn app_state(config: Config, pools: Vec<PoolState>, usage: UsageMap) -> AppState {
    let store = StateStore::new();
    store.publish(pools, usage);
    let event_log = Arc::new(EventLog::new(
        config.www.log_buffer,
        config.classifier().log_severity,
    ));
    AppState::new(config, store, event_log)
}

fn two_pools() -> Vec<PoolState> {
    vec![
        pool("tank", "ONLINE", &[("1-1", "ONLINE"), ("1-2", "ONLINE")]),
        pool("dozer", "DEGRADED", &[("2-1", "FAULTED")]),
    ]
}

async fn send(state: AppState, request: Request<Body>) -> Response {
    router(state).oneshot(request).await.unwrap()
}

async fn get(state: AppState, uri: &str) -> Response {
    send(state, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

async fn json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn location(response: &Response) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

#[tokio::test]
async fn test_status_without_pools() {
    let state = app_state(Config::default(), Vec::new(), UsageMap::new());
    let response = get(state, "/status/").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json(response).await;
    assert_eq!(body["template"], "status-none");
    assert_eq!(body["nav"]["active"], "status");
}

#[tokio::test]
async fn test_status_redirects_to_first_pool() {
    let state = app_state(Config::default(), two_pools(), UsageMap::new());

    let response = get(state.clone(), "/status/").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/status/tank");

    let response = get(state, "/status").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_status_many_pools() {
    let mut usage = UsageMap::new();
    usage.insert("dozer".to_string(), UsageStat::new(10, 90));
    let state = app_state(Config::default(), two_pools(), usage);

    let body = json(get(state, "/status/dozer").await).await;
    assert_eq!(body["template"], "status-many");
    assert_eq!(body["subnav"][0]["name"], "tank");
    assert_eq!(body["subnav"][0]["active"], false);
    assert_eq!(body["subnav"][1]["active"], true);

    let data = &body["data"];
    assert_eq!(data["name"], "dozer");
    assert_eq!(data["state_class"], "text-warning");
    assert_eq!(data["used_percent"], 90);
    assert_eq!(data["used_class"], "progress-bar-danger");
    assert_eq!(data["devices"][0]["indent"], 1);
    assert_eq!(data["devices"][1]["indent"], 3);
    assert_eq!(data["devices"][1]["state_class"], "text-danger");
}

#[tokio::test]
async fn test_status_single_pool_without_usage() {
    let pools = vec![pool("tank", "ONLINE", &[("sda", "ONLINE")])];
    let state = app_state(Config::default(), pools, UsageMap::new());

    let body = json(get(state, "/status/tank").await).await;
    assert_eq!(body["template"], "status-single");
    assert_eq!(body["data"]["used"], -1);
    assert_eq!(body["data"]["avail_percent"], -1);
    assert_eq!(body["data"]["devices"][1]["enable_led"], false);
}

#[tokio::test]
async fn test_status_rejects_bad_and_unknown_pools() {
    let state = app_state(Config::default(), two_pools(), UsageMap::new());

    let response = get(state.clone(), "/status/mirror0").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(state.clone(), "/status/9tank").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(state.clone(), "/status/backup").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // validation errors are not dashboard events
    assert!(state.event_log.is_empty());
}

#[tokio::test]
async fn test_root_prefix() {
    let mut config = Config::default();
    config.www.root = "/zfs".to_string();
    let state = app_state(config, two_pools(), UsageMap::new());

    let response = get(state.clone(), "/zfs/status/").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/zfs/status/tank");

    let body = json(get(state.clone(), "/zfs/status/tank").await).await;
    assert_eq!(body["nav"]["root"], "/zfs");
    assert_eq!(body["data"]["root"], "/zfs");

    let response = get(state, "/status/tank").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_root_prefix_dashboard_with_and_without_slash() {
    let mut config = Config::default();
    config.www.root = "/zfs".to_string();
    let state = app_state(config, two_pools(), UsageMap::new());

    for uri in ["/zfs", "/zfs/"] {
        let response = get(state.clone(), uri).await;
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        let body = json(response).await;
        assert_eq!(body["template"], "dashboard");
        assert_eq!(body["nav"]["root"], "/zfs");
    }
}

#[tokio::test]
async fn test_dashboard_numbers_pools() {
    let state = app_state(Config::default(), two_pools(), UsageMap::new());

    let body = json(get(state, "/").await).await;
    assert_eq!(body["template"], "dashboard");
    assert_eq!(body["nav"]["active"], "dashboard");
    assert_eq!(body["data"]["pools"][0]["n"], 0);
    assert_eq!(body["data"]["pools"][1]["n"], 1);
    assert_eq!(body["data"]["pools"][1]["name"], "dozer");
    assert!(body["data"]["daemon_uptime"].as_str().unwrap().contains(':'));
}

#[tokio::test]
async fn test_logs_page() {
    let state = app_state(Config::default(), Vec::new(), UsageMap::new());
    state.event_log.append(poolwatch::Notification::message(
        poolwatch::core::severity::Severity::Warning,
        "pool dozer is DEGRADED",
    ));

    let body = json(get(state, "/logs").await).await;
    assert_eq!(body["template"], "logs");
    assert_eq!(body["data"][0]["text"], "pool dozer is DEGRADED");
    assert_eq!(body["data"][0]["class"], "text-warning");
}

#[tokio::test]
async fn test_enclosure_page() {
    let state = app_state(Config::default(), two_pools(), UsageMap::new());

    let body = json(get(state, "/enclosure").await).await;
    assert_eq!(body["template"], "enclosure");
    assert_eq!(body["data"]["chassis_enabled"], false);
    assert_eq!(body["data"]["drives1"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["drives2"][0]["name"], "2-1");
}

#[tokio::test]
async fn test_static_pages() {
    let state = app_state(Config::default(), Vec::new(), UsageMap::new());

    let body = json(get(state.clone(), "/about").await).await;
    assert_eq!(body["template"], "about");
    assert_eq!(body["data"]["version"], env!("CARGO_PKG_VERSION"));

    let body = json(get(state, "/statistics").await).await;
    assert_eq!(body["template"], "statistics");
}

#[tokio::test]
async fn test_usage_without_pool() {
    let state = app_state(Config::default(), Vec::new(), UsageMap::new());
    let response = get(state, "/usage/").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[cfg(unix)]
#[tokio::test]
async fn test_usage_listing() {
    let mut config = Config::default();
    config.main.usage_command = r"printf %s\t1024\t2048\t512\t/mnt\n".to_string();
    let state = app_state(config, Vec::new(), UsageMap::new());

    let body = json(get(state, "/usage/tank").await).await;
    assert_eq!(body["template"], "usage");
    assert_eq!(body["data"]["pool"], "tank");
    assert_eq!(body["data"]["datasets"][0]["name"], "tank");
    assert_eq!(body["data"]["datasets"][0]["used"], 1024);
    assert_eq!(body["data"]["datasets"][0]["mountpoint"], "/mnt");
}

#[cfg(unix)]
#[tokio::test]
async fn test_usage_command_failure_is_logged() {
    let mut config = Config::default();
    config.main.usage_command = "false".to_string();
    let state = app_state(config, Vec::new(), UsageMap::new());

    let response = get(state.clone(), "/usage/tank").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let entries = state.event_log.snapshot();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].severity, "err");
}

#[tokio::test]
async fn test_locate_turns_led_on_and_returns() {
    let fake = Arc::new(FakeLocate::with(&["1-1"]));
    let state = app_state(Config::default(), two_pools(), UsageMap::new())
        .with_locate(Some(fake.clone() as Arc<dyn LocateProvider>));

    let request = Request::builder()
        .method("POST")
        .uri("/locate")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(header::REFERER, "/status/tank")
        .body(Body::from("dev=1-1&state=on"))
        .unwrap();
    let response = send(state.clone(), request).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/status/tank");
    assert!(fake.lit("1-1"));

    let body = json(get(state.clone(), "/status/tank").await).await;
    assert_eq!(body["data"]["devices"][1]["enable_led"], true);
    assert_eq!(body["data"]["devices"][1]["locate"], true);
    // not in a bay
    assert_eq!(body["data"]["devices"][2]["enable_led"], false);

    let response = get(state, "/locate?dev=/dev/1-1&state=off").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/status/");
    assert!(!fake.lit("1-1"));
}

#[tokio::test]
async fn test_locate_post_with_query_string_only() {
    let fake = Arc::new(FakeLocate::with(&["1-1"]));
    let state = app_state(Config::default(), two_pools(), UsageMap::new())
        .with_locate(Some(fake.clone() as Arc<dyn LocateProvider>));

    let request = Request::builder()
        .method("POST")
        .uri("/locate?dev=1-1&state=on")
        .header(header::REFERER, "/status/tank")
        .body(Body::empty())
        .unwrap();
    let response = send(state.clone(), request).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/status/tank");
    assert!(fake.lit("1-1"));

    // form body fields take precedence over the query string
    let request = Request::builder()
        .method("POST")
        .uri("/locate?dev=1-1&state=on")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("state=off"))
        .unwrap();
    let response = send(state, request).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(!fake.lit("1-1"));
}

#[tokio::test]
async fn test_locate_rejects_bad_requests() {
    let fake = Arc::new(FakeLocate::with(&["sda"]));
    let state = app_state(Config::default(), Vec::new(), UsageMap::new())
        .with_locate(Some(fake.clone() as Arc<dyn LocateProvider>));

    for uri in [
        "/locate?dev=sda&state=blink",
        "/locate?dev=sdz&state=on",
        "/locate?dev=../sda&state=on",
        "/locate?state=on",
    ] {
        let response = get(state.clone(), uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
    }
    assert!(!fake.lit("sda"));

    let disabled = app_state(Config::default(), Vec::new(), UsageMap::new());
    let response = get(disabled, "/locate?dev=sda&state=on").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_slow_slot_only_hides_its_own_control() {
    let fake = FakeLocate {
        slow: vec!["1-2"],
        delay: Duration::from_millis(300),
        ..FakeLocate::with(&["1-1", "1-2"])
    };
    let mut config = Config::default();
    config.leds.query_timeout_ms = 50;
    let state = app_state(config, two_pools(), UsageMap::new())
        .with_locate(Some(Arc::new(fake) as Arc<dyn LocateProvider>));

    let response = get(state, "/status/tank").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json(response).await;
    let devices = body["data"]["devices"].as_array().unwrap();
    assert_eq!(devices.len(), 3);
    assert_eq!(devices[0]["enable_led"], false);
    assert_eq!(devices[1]["name"], "1-1");
    assert_eq!(devices[1]["enable_led"], true);
    assert_eq!(devices[2]["name"], "1-2");
    assert_eq!(devices[2]["enable_led"], false);
}

#[tokio::test]
async fn test_slow_locate_hides_controls() {
    let fake = FakeLocate {
        slow: vec!["1-1", "1-2"],
        delay: Duration::from_millis(300),
        ..FakeLocate::with(&["1-1", "1-2"])
    };
    let mut config = Config::default();
    config.leds.query_timeout_ms = 20;
    let state = app_state(config, two_pools(), UsageMap::new())
        .with_locate(Some(Arc::new(fake) as Arc<dyn LocateProvider>));

    let response = get(state, "/status/tank").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json(response).await;
    let devices = body["data"]["devices"].as_array().unwrap();
    assert_eq!(devices.len(), 3);
    assert!(devices.iter().all(|d| d["enable_led"] == false));
}
