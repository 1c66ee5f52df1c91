//! Common test utilities for stock-ledger integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum_test::TestServer;
use chrono::{DateTime, Utc};
use tempfile::TempDir;

use stock_ledger_core::{
    OrderFilter, OrderId, OrderLine, OrderRecord, OrderStatus, OrderType, ProductId,
};
use stock_ledger_service::{
    create_router, AppState, CommercePlatform, PlatformError, ServiceConfig,
};
use stock_ledger_store::RocksStore;

/// In-memory stand-in for the host platform, backed by a plain order
/// list and a stock map that tests mutate directly.
pub struct MockPlatform {
    /// Orders the platform knows about.
    pub orders: Mutex<Vec<OrderRecord>>,
    /// Live stock counters; absent products are "not tracked".
    pub stock: Mutex<HashMap<ProductId, i64>>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            orders: Mutex::new(Vec::new()),
            stock: Mutex::new(HashMap::new()),
        }
    }

    pub fn push_order(&self, order: OrderRecord) {
        self.orders.lock().unwrap().push(order);
    }

    pub fn set_stock(&self, product_id: ProductId, qoh: i64) {
        self.stock.lock().unwrap().insert(product_id, qoh);
    }

    fn matches(filter: &OrderFilter, order: &OrderRecord) -> bool {
        order.order_type == filter.order_type
            && filter
                .statuses
                .as_ref()
                .map_or(true, |s| s.contains(&order.status))
            && filter
                .created_after
                .map_or(true, |t| order.created_at >= t)
    }
}

#[async_trait]
impl CommercePlatform for MockPlatform {
    async fn order(&self, id: OrderId) -> Result<Option<OrderRecord>, PlatformError> {
        Ok(self.orders.lock().unwrap().iter().find(|o| o.id == id).cloned())
    }

    async fn list_orders(
        &self,
        filter: &OrderFilter,
        after: OrderId,
        limit: usize,
    ) -> Result<Vec<OrderId>, PlatformError> {
        let mut ids: Vec<OrderId> = self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.id > after && Self::matches(filter, o))
            .map(|o| o.id)
            .collect();
        ids.sort_unstable();
        ids.truncate(limit);
        Ok(ids)
    }

    async fn count_orders(&self, filter: &OrderFilter) -> Result<u64, PlatformError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|o| Self::matches(filter, o))
            .count() as u64)
    }

    async fn current_stock(&self, product_id: ProductId) -> Result<Option<i64>, PlatformError> {
        Ok(self.stock.lock().unwrap().get(&product_id).copied())
    }
}

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Temporary directory for the database (kept alive for test duration).
    pub _temp_dir: TempDir,
    /// The fake platform behind the service.
    pub platform: Arc<MockPlatform>,
    /// The admin API key for destructive requests.
    pub admin_key: String,
}

impl TestHarness {
    /// Create a new test harness with a fresh database.
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Create a harness with a tweaked configuration.
    pub fn with_config(tweak: impl FnOnce(&mut ServiceConfig)) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = RocksStore::open(temp_dir.path()).expect("Failed to open store");

        let admin_key = "test-admin-key".to_string();

        let mut config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            data_dir: temp_dir.path().to_string_lossy().to_string(),
            platform_base_url: "http://localhost".into(),
            platform_api_key: None,
            admin_api_key: Some(admin_key.clone()),
            hook_secret: None,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
            rebuild_batch_size: 50,
            reservation_scan_cap: 5000,
        };
        tweak(&mut config);

        let platform = Arc::new(MockPlatform::new());
        let state = AppState::new(Arc::new(store), platform.clone(), config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            _temp_dir: temp_dir,
            platform,
            admin_key,
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Build an order with one plain line item.
pub fn order(id: u64, status: OrderStatus, product: u64, qty: u64) -> OrderRecord {
    order_at(id, status, product, qty, Utc::now() - chrono::Duration::hours(1))
}

/// Build an order with one plain line item at a given creation time.
pub fn order_at(
    id: u64,
    status: OrderStatus,
    product: u64,
    qty: u64,
    created_at: DateTime<Utc>,
) -> OrderRecord {
    OrderRecord {
        id: OrderId::new(id),
        status,
        order_type: OrderType::Order,
        created_at,
        line_items: vec![OrderLine {
            product_id: ProductId::new(product),
            quantity: qty,
            is_variation: false,
            parent_id: None,
        }],
        customer_label: Some("Test Customer".into()),
    }
}
