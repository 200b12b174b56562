use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use broadsheet_core::analytics::{
    AnalysesListing, AnalyticsSource, CollectionEntry, QueryResponse, Tenant,
};
use broadsheet_core::config::{Config, HostingMode, InsightsSettings, ServerSettings};
use broadsheet_core::error::InsightsError;
use broadsheet_core::query::KEYWORD_COLLECTION;
use broadsheet_report::artifacts::{CONTAINER, ERROR_PAGE, FRAMED, HEADER_NOTES};
use broadsheet_server::app::build_app;
use broadsheet_server::state::AppState;

// ---------------------------------------------------------------------------
// Fake platform: every month has visits=1 000, orders=10, revenue=2 000.
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FakeSource {
    calls: AtomicUsize,
}

impl FakeSource {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, InsightsError> {
    serde_json::from_value(value).map_err(|e| InsightsError::Transport(e.to_string()))
}

#[async_trait]
impl AnalyticsSource for FakeSource {
    async fn list_analyses(&self, tenant: &Tenant) -> Result<AnalysesListing, InsightsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if tenant.project == "does-not-exist" {
            return decode(json!({"count": 0, "results": []}));
        }
        decode(json!({
            "count": 1,
            "results": [{
                "slug": "20261001",
                "owner": {"firstName": "Jo", "companyName": "Acme Retail"},
                "features": {"semantic_metadata": {"structured_data": {"currencies": {"offer": ["EUR"]}}}}
            }]
        }))
    }

    async fn list_collections(&self, tenant: &Tenant) -> Result<Vec<CollectionEntry>, InsightsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if tenant.project == "no-analytics" {
            return decode(json!([{"id": "crawl"}]));
        }
        decode(json!([
            {"id": "crawl.20261001"},
            {"id": "visits.dip", "date_start": "2020-01-01"}
        ]))
    }

    async fn execute_query(
        &self,
        _tenant: &Tenant,
        body: &Value,
        page_size: Option<u32>,
    ) -> Result<QueryResponse, InsightsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Lets concurrent submissions overlap.
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let results: Vec<Value> = if body["collections"][0] == KEYWORD_COLLECTION {
            (0..page_size.unwrap_or(50))
                .map(|i| {
                    let clicks = match i {
                        0 => 1_000,
                        1 => 500,
                        n => 500 - n,
                    };
                    json!({"dimensions": [format!("keyword {}", i + 1)], "metrics": [clicks, 2.5, 12.0]})
                })
                .collect()
        } else {
            vec![json!({"dimensions": [], "metrics": [10.0, 2000.0, 1000.0]})]
        };
        decode(json!({ "results": results }))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Harness {
    _tmp: tempfile::TempDir,
    root: PathBuf,
    source: Arc<FakeSource>,
    app: Router,
}

fn test_config(root: &Path) -> Config {
    Config {
        api_token: "secret".to_string(),
        api_url: "http://api.invalid/v1".to_string(),
        app_url: "https://app.example.com".to_string(),
        log_folder: root.join("logs"),
        cache_root: root.join("insights"),
        hosting: HostingMode::Local,
        timezone: chrono_tz::Tz::UTC,
        server: ServerSettings {
            protocol: "http".to_string(),
            hostname: "localhost".to_string(),
            port: "8080".to_string(),
        },
        insights: InsightsSettings::default(),
    }
}

fn harness() -> Harness {
    let tmp = tempfile::tempdir().expect("tempdir");
    let root = tmp.path().to_path_buf();
    let config = test_config(&root);
    std::fs::create_dir_all(&config.log_folder).expect("log folder");
    std::fs::create_dir_all(&config.cache_root).expect("cache root");

    let source = Arc::new(FakeSource::default());
    let state = Arc::new(AppState::new(config, Arc::clone(&source) as Arc<dyn AnalyticsSource>));
    Harness {
        _tmp: tmp,
        root,
        source,
        app: build_app(state),
    }
}

impl Harness {
    async fn submit(&self, form: &str) -> Response<Body> {
        let request = Request::builder()
            .method("POST")
            .uri("/submit")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .expect("build request");
        self.app.clone().oneshot(request).await.expect("request")
    }

    async fn get(&self, uri: &str) -> Response<Body> {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .expect("build request");
        self.app.clone().oneshot(request).await.expect("request")
    }

    /// Directory on disk behind a redirect target.
    fn dir_of(&self, location: &str) -> PathBuf {
        let relative = location.trim_start_matches("/insights/");
        let dir = relative.rsplit_once('/').map(|(d, _)| d).expect("file in location");
        self.root.join("insights").join(dir)
    }

    fn log_rows(&self) -> Vec<csv::StringRecord> {
        let mut rdr = csv::Reader::from_path(self.root.join("logs/_seoBusinessInsights.log"))
            .expect("open log");
        rdr.records().map(|r| r.expect("log row")).collect()
    }

    fn raw_log(&self) -> String {
        std::fs::read_to_string(self.root.join("logs/_seoBusinessInsights.log")).expect("read log")
    }
}

fn location(response: &Response<Body>) -> String {
    response.headers()[header::LOCATION]
        .to_str()
        .expect("location header")
        .to_string()
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("read dir")
        .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn landing_page_serves_the_form() {
    let h = harness();
    let response = h.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains(r#"action="/submit""#));
    assert!(html.contains(r#"name="organization""#));
    assert!(html.contains(r#"name="project""#));

    let css = h.get("/static/style.css").await;
    assert_eq!(css.status(), StatusCode::OK);
    assert_eq!(css.headers()[header::CONTENT_TYPE], "text/css; charset=utf-8");

    assert_eq!(h.get("/static/missing.js").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_reports_version() {
    let h = harness();
    let response = h.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = serde_json::from_str(&body_text(response).await).expect("json");
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn happy_path_redirects_to_container() {
    let h = harness();
    let response = h.submit("organization=acme&project=demo").await;
    assert_eq!(response.status(), StatusCode::FOUND);

    let location = location(&response);
    assert!(location.starts_with("/insights/1-"), "{location}");
    assert!(location.ends_with(&format!("acme/{CONTAINER}")), "{location}");

    let dir = h.dir_of(&location);
    let files = files_in(&dir);
    assert_eq!(files.len(), FRAMED.len() + 1);
    assert!(!files.contains(&ERROR_PAGE.to_string()));

    let header_page = std::fs::read_to_string(dir.join(HEADER_NOTES)).expect("header");
    assert!(header_page.contains("based on the previous 12 months"));
    assert!(header_page.contains("Acme Retail"));
    assert!(!header_page.contains("Warning"));
    let totals = std::fs::read_to_string(dir.join("go_seo_TotalsVisitsOrdersRevenue.html"))
        .expect("totals");
    assert!(totals.contains("12,000"));
    assert!(totals.contains("€24,000"));
    assert!(totals.contains("€200"));
    assert!(totals.contains("€2.00"));

    // 2 listings, 12 revenue queries, 2 keyword queries.
    assert_eq!(h.source.calls(), 16);

    let served = h.get(&location).await;
    assert_eq!(served.status(), StatusCode::OK);
    assert!(body_text(served).await.contains("New broadsheet"));

    let rows = h.log_rows();
    let statuses: Vec<&str> = rows.iter().map(|r| &r[5]).collect();
    assert_eq!(
        statuses,
        [
            "Revenue data acquired",
            "Keyword data acquired",
            "SEO Insights acquired",
            "Broadsheet generated"
        ]
    );
    assert!(rows.iter().all(|r| &r[4] == "visits.dip"));
    assert!(rows.iter().all(|r| &r[2] == "acme" && &r[3] == "demo"));
}

#[tokio::test]
async fn unknown_project_redirects_to_error_page() {
    let h = harness();
    let response = h.submit("organization=acme&project=does-not-exist").await;
    assert_eq!(response.status(), StatusCode::FOUND);

    let location = location(&response);
    assert!(location.ends_with(ERROR_PAGE), "{location}");
    let dir = h.dir_of(&location);
    assert_eq!(files_in(&dir), vec![ERROR_PAGE.to_string()]);
    let page = std::fs::read_to_string(dir.join(ERROR_PAGE)).expect("error page");
    assert!(page.contains("No project found"));
    assert!(page.contains("Try again"));

    let rows = h.log_rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][4], "-");
    assert_eq!(&rows[0][5], "No project found");
}

#[tokio::test]
async fn project_without_analytics_redirects_to_error_page() {
    let h = harness();
    let response = h.submit("organization=acme&project=no-analytics").await;
    let location = location(&response);
    assert!(location.ends_with(ERROR_PAGE));

    let page = std::fs::read_to_string(h.dir_of(&location).join(ERROR_PAGE)).expect("error page");
    assert!(page.contains("No analytics tool has been integrated"));
    let rows = h.log_rows();
    assert_eq!(&rows[rows.len() - 1][5], "No analytics found");
}

#[tokio::test]
async fn missing_organisation_never_reaches_the_platform() {
    let h = harness();
    let response = h.submit("organization=&project=demo").await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert!(location(&response).ends_with(ERROR_PAGE));
    assert_eq!(h.source.calls(), 0);

    let rows = h.log_rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][5], "Missing organisation or project");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_submissions_are_isolated() {
    let h = harness();
    let (first, second) = tokio::join!(
        h.submit("organization=acme&project=demo"),
        h.submit("organization=acme&project=demo"),
    );
    let (first, second) = (location(&first), location(&second));
    assert_ne!(first, second);

    for location in [&first, &second] {
        let dir = h.dir_of(location);
        assert_eq!(files_in(&dir).len(), FRAMED.len() + 1);
    }

    assert_eq!(h.raw_log().matches("SessionID,Date").count(), 1);
    let rows = h.log_rows();
    assert_eq!(rows.len(), 8);
    assert!(rows.iter().all(|r| r.len() == 6));
    // Builds are serialised, so each session's rows are contiguous.
    let sessions: Vec<&str> = rows.iter().map(|r| &r[0]).collect();
    assert!(sessions[..4].iter().all(|s| *s == sessions[0]));
    assert!(sessions[4..].iter().all(|s| *s == sessions[4]));
    assert_ne!(sessions[0], sessions[4]);
}
