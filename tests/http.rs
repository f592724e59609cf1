use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct Summary {
    total_forecast: f64,
    total_min: f64,
    total_max: f64,
    monthly_average: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastPoint {
    date: String,
    forecast_mean: f64,
    forecast_min: f64,
    forecast_max: f64,
}

#[derive(Debug, Deserialize)]
struct HistoricalPoint {
    date: String,
}

#[derive(Debug, Deserialize)]
struct DashboardResponse {
    context: String,
    summary: Summary,
    forecast: Vec<ForecastPoint>,
    historical: Vec<HistoricalPoint>,
}

#[derive(Debug, Deserialize)]
struct OptionsResponse {
    clients: Vec<String>,
    products: Vec<String>,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_db_path(tag: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("demand_planner_http_{tag}_{}_{}.db", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

fn seed_database(db_path: &str) {
    let status = Command::new(env!("CARGO_BIN_EXE_demand_planner"))
        .args(["seed", "--seed", "42"])
        .env("DEMAND_DB_PATH", db_path)
        .env("RUST_LOG", "info")
        .status()
        .expect("failed to run seed");
    assert!(status.success(), "seed command failed");
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/health")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server(db_path: String) -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_demand_planner"))
        .env("PORT", port.to_string())
        .env("DEMAND_DB_PATH", db_path)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let db_path = unique_db_path("seeded");
    seed_database(&db_path);
    let server = Arc::new(spawn_server(db_path).await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn dashboard(server: &TestServer, query: &[(&str, &str)]) -> DashboardResponse {
    Client::new()
        .get(format!("{}/api/dashboard", server.base_url))
        .query(query)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_global_dashboard_aggregates_twelve_months() {
    let server = shared_server().await;
    let view = dashboard(&server, &[]).await;

    assert_eq!(view.context, "Global view: whole company");
    assert_eq!(view.forecast.len(), 12);
    assert_eq!(view.historical.len(), 32);
    assert!(view.forecast.windows(2).all(|w| w[0].date < w[1].date));
    assert!(view.historical.windows(2).all(|w| w[0].date < w[1].date));

    let total: f64 = view.forecast.iter().map(|p| p.forecast_mean).sum();
    let total_min: f64 = view.forecast.iter().map(|p| p.forecast_min).sum();
    let total_max: f64 = view.forecast.iter().map(|p| p.forecast_max).sum();
    assert!((view.summary.total_forecast - total).abs() < 1e-6);
    assert!((view.summary.total_min - total_min).abs() < 1e-6);
    assert!((view.summary.total_max - total_max).abs() < 1e-6);
    assert!((view.summary.monthly_average - total / 12.0).abs() < 1e-6);
}

#[tokio::test]
async fn http_unknown_pair_is_empty_with_zero_summary() {
    let server = shared_server().await;
    let view = dashboard(&server, &[("client", "Client 1"), ("product", "NO SUCH PRODUCT")]).await;

    assert!(view.forecast.is_empty());
    assert!(view.historical.is_empty());
    assert_eq!(view.summary.total_forecast, 0.0);
    assert_eq!(view.summary.total_min, 0.0);
    assert_eq!(view.summary.total_max, 0.0);
    assert_eq!(view.summary.monthly_average, 0.0);

    let html = Client::new()
        .get(format!("{}/", server.base_url))
        .query(&[("client", "Client 1"), ("product", "NO SUCH PRODUCT")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("No data to display"));
}

#[tokio::test]
async fn http_same_selection_twice_is_identical() {
    let server = shared_server().await;
    let client = Client::new();
    let url = format!("{}/api/dashboard", server.base_url);
    let query = [("client", "Client 2")];

    let first = client.get(&url).query(&query).send().await.unwrap().bytes().await.unwrap();
    let second = client.get(&url).query(&query).send().await.unwrap().bytes().await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn http_options_follow_client() {
    let server = shared_server().await;
    let options: OptionsResponse = Client::new()
        .get(format!("{}/api/options", server.base_url))
        .query(&[("client", "Client 1")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(options.clients, vec!["Client 1", "Client 2"]);
    assert_eq!(options.products.len(), 2);
    assert!(options.products.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn http_index_and_csv_export() {
    let server = shared_server().await;
    let client = Client::new();

    let html = client
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("Executive Demand Forecast Dashboard"));
    assert!(html.contains("chart-forecast"));

    let csv = client
        .get(format!("{}/api/forecast.csv", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("date,forecast_mean,forecast_min,forecast_max"));
    assert_eq!(lines.count(), 12);
}

#[tokio::test]
async fn http_missing_database_reports_unavailable() {
    let server = spawn_server(unique_db_path("missing")).await;
    let client = Client::new();

    let response = client
        .get(format!("{}/api/dashboard", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(response.text().await.unwrap().contains("demand_planner seed"));

    let page = client.get(format!("{}/", server.base_url)).send().await.unwrap();
    assert_eq!(page.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(page.text().await.unwrap().contains("Error connecting to the database"));
}
