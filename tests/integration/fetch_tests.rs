//! Integration tests for the pagination engine
//!
//! These tests use wiremock to stand up mock GraphQL servers and drive the
//! real HTTP transport through full pagination runs.

use graphql_sync::client::HttpTransport;
use graphql_sync::pagination::{FetchPhase, Paginator, PRODUCTS_QUERY};
use graphql_sync::retry::RetryPolicy;
use graphql_sync::throttle::BudgetTracker;
use graphql_sync::Transport;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Simulated query-cost bucket, refilled continuously like the real server
struct CostBucket {
    maximum: f64,
    available: f64,
    restore_rate: f64,
    last_refill: Instant,
}

impl CostBucket {
    fn new(maximum: f64, restore_rate: f64) -> Self {
        Self {
            maximum,
            available: maximum,
            restore_rate,
            last_refill: Instant::now(),
        }
    }

    fn refill(&mut self) {
        let elapsed = self.last_refill.elapsed().as_secs_f64();
        self.available = (self.available + elapsed * self.restore_rate).min(self.maximum);
        self.last_refill = Instant::now();
    }

    fn throttle_status(&self) -> Value {
        json!({
            "maximumAvailable": self.maximum,
            "currentlyAvailable": self.available,
            "restoreRate": self.restore_rate
        })
    }
}

/// Mock products connection with cursor pagination
///
/// Cursors are `cursor-N` where N is the 1-based product number. Scripted
/// failure statuses are served before any real page.
struct ProductCatalog {
    total: u32,
    query_cost: f64,
    bucket: Mutex<CostBucket>,
    failures: Mutex<VecDeque<u16>>,
    malformed_after: Option<u32>,
    requests: Arc<AtomicU32>,
    throttled: Arc<AtomicU32>,
}

impl ProductCatalog {
    fn new(total: u32) -> Self {
        Self {
            total,
            query_cost: 12.0,
            bucket: Mutex::new(CostBucket::new(1000.0, 50.0)),
            failures: Mutex::new(VecDeque::new()),
            malformed_after: None,
            requests: Arc::new(AtomicU32::new(0)),
            throttled: Arc::new(AtomicU32::new(0)),
        }
    }

    fn with_bucket(mut self, maximum: f64, restore_rate: f64, query_cost: f64) -> Self {
        self.bucket = Mutex::new(CostBucket::new(maximum, restore_rate));
        self.query_cost = query_cost;
        self
    }

    fn with_failures(self, statuses: &[u16]) -> Self {
        self.failures.lock().unwrap().extend(statuses.iter().copied());
        self
    }

    fn with_malformed_page_after(mut self, offset: u32) -> Self {
        self.malformed_after = Some(offset);
        self
    }

    fn page(&self, first: u32, offset: u32) -> Value {
        let end = (offset + first).min(self.total);
        let edges: Vec<Value> = (offset + 1..=end)
            .map(|n| {
                json!({
                    "cursor": format!("cursor-{}", n),
                    "node": {
                        "id": format!("gid://shopify/Product/{}", 1000 + n),
                        "title": format!("Product {} - Widget", n),
                        "updatedAt": "2024-01-15T10:30:00Z"
                    }
                })
            })
            .collect();

        json!({
            "products": {
                "edges": edges,
                "pageInfo": { "hasNextPage": end < self.total }
            }
        })
    }
}

impl Respond for ProductCatalog {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        self.requests.fetch_add(1, Ordering::SeqCst);

        if let Some(status) = self.failures.lock().unwrap().pop_front() {
            return ResponseTemplate::new(status)
                .set_body_json(json!({ "errors": [{ "message": "Service unavailable" }] }));
        }

        let payload: Value = match serde_json::from_slice(&request.body) {
            Ok(payload) => payload,
            Err(_) => return ResponseTemplate::new(400).set_body_json(json!({ "errors": [] })),
        };
        let variables = &payload["variables"];
        let first = variables["first"].as_u64().unwrap_or(0) as u32;
        let offset = variables["after"]
            .as_str()
            .and_then(|c| c.strip_prefix("cursor-"))
            .and_then(|n| n.parse::<u32>().ok())
            .unwrap_or(0);

        let mut bucket = self.bucket.lock().unwrap();
        bucket.refill();

        if bucket.available < self.query_cost {
            self.throttled.fetch_add(1, Ordering::SeqCst);
            return ResponseTemplate::new(429).set_body_json(json!({
                "errors": [{ "message": "Throttled" }],
                "extensions": {
                    "cost": {
                        "requestedQueryCost": self.query_cost,
                        "throttleStatus": bucket.throttle_status()
                    }
                }
            }));
        }
        bucket.available -= self.query_cost;

        let data = match self.malformed_after {
            Some(limit) if offset >= limit => json!({ "orders": {} }),
            _ => self.page(first, offset),
        };

        ResponseTemplate::new(200).set_body_json(json!({
            "data": data,
            "extensions": {
                "cost": {
                    "requestedQueryCost": self.query_cost,
                    "actualQueryCost": self.query_cost,
                    "throttleStatus": bucket.throttle_status()
                }
            }
        }))
    }
}

async fn mount(catalog: ProductCatalog) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(catalog)
        .mount(&server)
        .await;
    server
}

fn transport(server: &MockServer) -> HttpTransport {
    HttpTransport::new(
        &format!("{}/graphql", server.uri()),
        None,
        Duration::from_secs(5),
    )
    .expect("Failed to build transport")
}

fn fast_retries() -> RetryPolicy {
    RetryPolicy::new()
        .with_max_attempts(3)
        .with_base_delay(Duration::from_millis(5))
        .with_max_delay(Duration::from_millis(20))
        .with_jitter(Duration::from_millis(5))
}

#[tokio::test]
async fn test_fetch_across_multiple_pages() {
    let server = mount(ProductCatalog::new(25)).await;
    let mut paginator = Paginator::new(transport(&server), BudgetTracker::default(), fast_retries());

    let outcome = paginator.fetch_all(100, 10).await;

    assert_eq!(outcome.phase, FetchPhase::Completed);
    assert_eq!(outcome.records.len(), 25);
    assert_eq!(outcome.records[0].id, "gid://shopify/Product/1001");
    assert_eq!(outcome.records[0].title, "Product 1 - Widget");
    assert!(!outcome.records[0].updated_at.is_empty());
    assert_eq!(outcome.records[24].id, "gid://shopify/Product/1025");

    for pair in outcome.records.windows(2) {
        assert!(pair[1].id > pair[0].id, "records out of order: {:?}", pair);
    }

    assert_eq!(outcome.stats.total_fetched, 25);
    assert_eq!(outcome.stats.total_requests, 3);
    assert_eq!(outcome.stats.total_retries, 0);
    assert_eq!(outcome.stats.avg_query_cost, 12.0);
}

#[tokio::test]
async fn test_fetch_stops_at_total_limit() {
    let server = mount(ProductCatalog::new(100)).await;
    let mut paginator = Paginator::new(transport(&server), BudgetTracker::default(), fast_retries());

    let outcome = paginator.fetch_all(5, 10).await;

    assert_eq!(outcome.phase, FetchPhase::LimitReached);
    assert_eq!(outcome.records.len(), 5);
    assert_eq!(outcome.stats.total_requests, 1);
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let server = mount(ProductCatalog::new(30).with_failures(&[503, 429])).await;
    let mut paginator = Paginator::new(transport(&server), BudgetTracker::default(), fast_retries());

    let outcome = paginator.fetch_all(30, 10).await;

    assert_eq!(outcome.phase, FetchPhase::Completed);
    assert_eq!(outcome.records.len(), 30);
    assert_eq!(outcome.stats.total_requests, 3);
    assert_eq!(outcome.stats.total_retries, 2);
}

#[tokio::test]
async fn test_retry_exhaustion_returns_empty_partial_result() {
    let server = mount(ProductCatalog::new(30).with_failures(&[500, 502, 503, 504])).await;
    let mut paginator = Paginator::new(transport(&server), BudgetTracker::default(), fast_retries());

    let outcome = paginator.fetch_all(30, 10).await;

    assert_eq!(outcome.phase, FetchPhase::RequestFailed);
    assert!(outcome.records.is_empty());
    assert_eq!(outcome.stats.total_requests, 0);
    assert_eq!(outcome.stats.total_retries, 2);
}

#[tokio::test]
async fn test_malformed_page_keeps_prior_pages() {
    let server = mount(ProductCatalog::new(50).with_malformed_page_after(20)).await;
    let mut paginator = Paginator::new(transport(&server), BudgetTracker::default(), fast_retries());

    let outcome = paginator.fetch_all(50, 10).await;

    assert_eq!(outcome.phase, FetchPhase::MalformedPage);
    assert_eq!(outcome.records.len(), 20);
    assert_eq!(outcome.stats.total_requests, 3);
    assert_eq!(outcome.stats.total_retries, 0);
}

#[tokio::test]
async fn test_budget_tracker_prevents_throttling() {
    // Two queries fit in the bucket; the tracker must wait for refills
    let catalog = ProductCatalog::new(40).with_bucket(60.0, 50.0, 30.0);
    let throttled = catalog.throttled.clone();
    let server = mount(catalog).await;

    let mut paginator = Paginator::new(transport(&server), BudgetTracker::new(20.0), fast_retries());
    let outcome = paginator.fetch_all(40, 10).await;

    assert_eq!(outcome.phase, FetchPhase::Completed);
    assert_eq!(outcome.records.len(), 40);
    assert_eq!(throttled.load(Ordering::SeqCst), 0, "server throttled a request");
    assert!(outcome.stats.total_sleep_seconds > 0.0);
    assert_eq!(outcome.stats.avg_query_cost, 30.0);
}

#[tokio::test]
async fn test_without_budget_wait_server_throttles() {
    // Back-to-back requests with no budget gate drain the bucket
    let catalog = ProductCatalog::new(40).with_bucket(60.0, 1.0, 30.0);
    let requests = catalog.requests.clone();
    let throttled = catalog.throttled.clone();
    let server = mount(catalog).await;

    let client = transport(&server);
    let policy = RetryPolicy::new().with_max_attempts(1);
    let variables = json!({ "first": 10 });

    let mut got_throttled = false;
    for _ in 0..3 {
        let output = policy
            .execute(|| client.execute(PRODUCTS_QUERY, &variables))
            .await;
        if output.is_err() {
            got_throttled = true;
        }
    }

    assert!(got_throttled);
    assert_eq!(requests.load(Ordering::SeqCst), 3);
    assert_eq!(throttled.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_access_token_header_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("X-Shopify-Access-Token", "shpat_secret"))
        .respond_with(ProductCatalog::new(3))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpTransport::new(
        &format!("{}/graphql", server.uri()),
        Some("shpat_secret".to_string()),
        Duration::from_secs(5),
    )
    .expect("Failed to build transport");

    let mut paginator = Paginator::new(client, BudgetTracker::default(), fast_retries());
    let outcome = paginator.fetch_all(10, 10).await;

    assert_eq!(outcome.phase, FetchPhase::Completed);
    assert_eq!(outcome.records.len(), 3);
}

#[tokio::test]
async fn test_non_json_body_is_retried_then_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .expect(3)
        .mount(&server)
        .await;

    let mut paginator = Paginator::new(transport(&server), BudgetTracker::default(), fast_retries());
    let outcome = paginator.fetch_all(10, 10).await;

    assert_eq!(outcome.phase, FetchPhase::RequestFailed);
    assert!(outcome.records.is_empty());
    assert_eq!(outcome.stats.total_retries, 2);
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "errors": [{ "message": "Invalid API key" }] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut paginator = Paginator::new(transport(&server), BudgetTracker::default(), fast_retries());
    let outcome = paginator.fetch_all(10, 10).await;

    assert_eq!(outcome.phase, FetchPhase::MissingData);
    assert_eq!(outcome.stats.total_requests, 1);
    assert_eq!(outcome.stats.total_retries, 0);
}

#[tokio::test]
async fn test_unreachable_server_returns_partial_result() {
    // Bind then drop a listener so the port is very likely closed
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let client = HttpTransport::new(
        &format!("http://127.0.0.1:{}/graphql", port),
        None,
        Duration::from_millis(500),
    )
    .expect("Failed to build transport");

    let mut paginator = Paginator::new(client, BudgetTracker::default(), fast_retries());
    let outcome = paginator.fetch_all(10, 10).await;

    assert_eq!(outcome.phase, FetchPhase::RequestFailed);
    assert!(outcome.records.is_empty());
    assert_eq!(outcome.stats.total_retries, 2);
}
