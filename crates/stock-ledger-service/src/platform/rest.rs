//! REST implementation of the platform client.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use stock_ledger_core::{OrderFilter, OrderId, OrderRecord, ProductId};

use super::{CommercePlatform, PlatformError, Result};

/// Timeout for platform API requests.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(20);

/// Client for the host platform's admin REST API.
pub struct RestPlatform {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

/// Response wrapper for order id listings.
#[derive(Debug, Deserialize)]
struct OrderIdsResponse {
    orders: Vec<OrderId>,
}

/// Response wrapper for order counts.
#[derive(Debug, Deserialize)]
struct OrderCountResponse {
    count: u64,
}

/// Response wrapper for product stock lookups. `quantity` is null when the
/// platform does not manage stock for the product.
#[derive(Debug, Deserialize)]
struct StockResponse {
    quantity: Option<i64>,
}

/// Error body shape the platform uses for non-success responses.
#[derive(Debug, Deserialize)]
struct PlatformErrorBody {
    message: String,
}

impl RestPlatform {
    /// Create a new client for the given base URL.
    #[must_use]
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let mut req = self.client.get(format!("{}{path}", self.base_url));
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        req
    }

    /// Translate an order filter into the platform's query parameters.
    fn filter_query(filter: &OrderFilter) -> Vec<(&'static str, String)> {
        let mut query = vec![("type", filter.order_type.as_str().to_string())];
        if let Some(statuses) = &filter.statuses {
            let joined = statuses
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(",");
            query.push(("status", joined));
        }
        if let Some(after) = filter.created_after {
            query.push(("created_after", after.to_rfc3339()));
        }
        query
    }

    /// Parse a successful response body, or map a non-success status to
    /// `PlatformError::Api` with the platform's message when one is given.
    async fn handle_response<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| PlatformError::InvalidResponse(e.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<PlatformErrorBody>(&body)
            .map_or(body, |parsed| parsed.message);

        Err(PlatformError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl CommercePlatform for RestPlatform {
    async fn order(&self, id: OrderId) -> Result<Option<OrderRecord>> {
        let response = self.get(&format!("/api/v1/orders/{id}")).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        Self::handle_response(response).await.map(Some)
    }

    async fn list_orders(
        &self,
        filter: &OrderFilter,
        after: OrderId,
        limit: usize,
    ) -> Result<Vec<OrderId>> {
        let mut query = Self::filter_query(filter);
        query.push(("after_id", after.to_string()));
        query.push(("limit", limit.to_string()));

        let response = self.get("/api/v1/orders").query(&query).send().await?;
        let body: OrderIdsResponse = Self::handle_response(response).await?;
        Ok(body.orders)
    }

    async fn count_orders(&self, filter: &OrderFilter) -> Result<u64> {
        let query = Self::filter_query(filter);
        let response = self
            .get("/api/v1/orders/count")
            .query(&query)
            .send()
            .await?;
        let body: OrderCountResponse = Self::handle_response(response).await?;
        Ok(body.count)
    }

    async fn current_stock(&self, product_id: ProductId) -> Result<Option<i64>> {
        let response = self
            .get(&format!("/api/v1/products/{product_id}/stock"))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body: StockResponse = Self::handle_response(response).await?;
        Ok(body.quantity)
    }
}
