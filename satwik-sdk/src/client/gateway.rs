//! Gateway API client (mobile app or tooling → gateway).

use reqwest::Client;
use url::Url;

use super::ClientError;
use crate::objects::{
    Accu360WebhookPayload, CreateOrderRequest, CreateOrderResponse, HealthResponse,
    OrderResponse, WebhookAck,
};
use crate::signature::{WEBHOOK_SIGNATURE_HEADER, sign_webhook_body};

/// Typed HTTP client for the order gateway.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: Client,
    base_url: Url,
}

impl GatewayClient {
    /// Create a new `GatewayClient` for the gateway at `base_url`.
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure timeouts or a proxy).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `base_url` with `segments` appended, each percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `GET /health`
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let url = self.endpoint(&["health"])?;
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }

    /// `POST /orders` – submit a new order.
    ///
    /// A vendor rejection comes back as [`ClientError::Api`] with status 502;
    /// its body is an `OrderFailedResponse`.
    pub async fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<CreateOrderResponse, ClientError> {
        let url = self.endpoint(&["orders"])?;
        let resp = self.http.post(url).json(request).send().await?;
        parse_response(resp).await
    }

    /// `GET /orders/{order_id}`
    pub async fn get_order(&self, order_id: &str) -> Result<OrderResponse, ClientError> {
        let url = self.endpoint(&["orders", order_id])?;
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }

    /// `POST /webhooks/accu360` – deliver a status update the way Accu360
    /// does, signing the body with `secret` when one is given.
    pub async fn send_webhook(
        &self,
        payload: &Accu360WebhookPayload,
        secret: Option<&[u8]>,
    ) -> Result<WebhookAck, ClientError> {
        let url = self.endpoint(&["webhooks", "accu360"])?;
        let body = serde_json::to_vec(payload)?;

        let mut request = self
            .http
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(secret) = secret {
            request = request.header(WEBHOOK_SIGNATURE_HEADER, sign_webhook_body(&body, secret));
        }

        let resp = request.body(body).send().await?;
        parse_response(resp).await
    }
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Api { status, body });
    }
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(ClientError::Json)
}
