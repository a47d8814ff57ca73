//! HTTP order service - network implementation of [`OrderService`]
//!
//! # Endpoints
//!
//! | 方法 | 路径 | 说明 |
//! |------|------|------|
//! | GET | /orders | 全部订单 |
//! | GET | /orders?table={id} | 单桌订单 |
//! | GET | /orders?status=pending | 待处理订单 |
//! | POST | /tables/{id}/confirm-payment | 确认付款 |
//! | POST | /tables/{id}/print | 打印小票 |

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use shared::{Snapshot, TableId};
use std::time::Duration;

use crate::{ClientConfig, ClientError, ClientResult, OrderScope, OrderService};

/// 网络订单服务客户端
#[derive(Debug, Clone)]
pub struct HttpOrderService {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpOrderService {
    /// Create a new HTTP order service from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let base_url = Url::parse(config.base_url.trim())
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(config.base_url.clone()));
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url,
            token: config.token.clone(),
        })
    }

    /// 获取基础 URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot-be-a-base URLs are rejected in new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn orders_url(&self, scope: &OrderScope) -> Url {
        let mut url = self.endpoint(&["orders"]);
        match scope {
            OrderScope::All => {}
            OrderScope::Table(table) => {
                url.query_pairs_mut().append_pair("table", table.as_str());
            }
            OrderScope::Pending => {
                url.query_pairs_mut().append_pair("status", "pending");
            }
        }
        url
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> ClientResult<reqwest::Response> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send().await?;
        Self::check_status(response).await
    }

    async fn check_status(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let path = response.url().path().to_string();
        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED => {
                Err(ClientError::NotImplemented(path))
            }
            _ => Err(ClientError::Status {
                status: status.as_u16(),
                body,
            }),
        }
    }

    async fn post_action(&self, table: &TableId, action: &str) -> ClientResult<()> {
        let url = self.endpoint(&["tables", table.as_str(), action]);
        self.send(self.client.post(url)).await?;
        Ok(())
    }
}

#[async_trait]
impl OrderService for HttpOrderService {
    async fn list_orders(&self, scope: &OrderScope) -> ClientResult<Snapshot> {
        let url = self.orders_url(scope);
        let response = self.send(self.client.get(url)).await?;

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Snapshot::empty());
        }

        let body: serde_json::Value = serde_json::from_str(&text)?;
        let snapshot =
            Snapshot::from_json(body).map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        for reason in &snapshot.skipped {
            tracing::warn!(reason = %reason, "Skipping malformed order");
        }
        Ok(snapshot)
    }

    async fn confirm_payment(&self, table: &TableId) -> ClientResult<()> {
        self.post_action(table, "confirm-payment").await
    }

    async fn print_ticket(&self, table: &TableId) -> ClientResult<()> {
        self.post_action(table, "print").await
    }
}
