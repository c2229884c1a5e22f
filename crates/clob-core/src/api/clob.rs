//! L2-authenticated session against the Polymarket CLOB.
//!
//! A [`ClobSession`] binds one wallet to its API credentials and signs every
//! request it sends with a fresh HMAC over the exact body bytes.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use super::credentials::CredentialManager;
use super::transport::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::config::ClobConfig;
use crate::signing::amounts::TickSize;
use crate::signing::l2::{ApiCredentials, L2Signature};
use crate::signing::order_types::{OrderArgs, OrderOptions, SignedOrder};
use crate::signing::signer::OrderSigner;
use crate::wallet::WalletSigner;
use crate::Result;

/// Order type for submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    /// Good-till-cancelled limit order.
    #[default]
    Gtc,
    /// Fill-or-kill market order.
    Fok,
    /// Good-till-date limit order.
    Gtd,
    /// Fill-and-kill: fill what is available, cancel the rest.
    Fak,
}

impl std::str::FromStr for OrderType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GTC" => Ok(OrderType::Gtc),
            "FOK" => Ok(OrderType::Fok),
            "GTD" => Ok(OrderType::Gtd),
            "FAK" => Ok(OrderType::Fak),
            other => Err(crate::Error::order(format!("Unknown order type: {other}"))),
        }
    }
}

/// Request body for posting an order.
#[derive(Debug, Clone, Serialize)]
pub struct PostOrderRequest {
    pub order: SignedOrder,
    /// API key of the order owner.
    pub owner: String,
    #[serde(rename = "orderType")]
    pub order_type: OrderType,
}

/// Response from posting an order.
#[derive(Debug, Clone, Deserialize)]
pub struct PostOrderResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(rename = "errorMsg", default)]
    pub error_msg: String,
    /// Order ID assigned by the CLOB.
    #[serde(rename = "orderID", default)]
    pub order_id: String,
    /// Status of the order (e.g. "matched", "delayed", "unmatched").
    #[serde(default)]
    pub status: String,
    #[serde(rename = "transactionsHashes", default)]
    pub transaction_hashes: Vec<String>,
}

impl PostOrderResponse {
    /// Check if the order was accepted onto the book or matched.
    pub fn is_filled(&self) -> bool {
        let s = self.status.to_lowercase();
        s == "matched" || s == "live" || s == "delayed"
    }

    /// Check if the order was explicitly not filled (FOK rejection).
    pub fn is_unfilled(&self) -> bool {
        let s = self.status.to_lowercase();
        s == "unmatched" || s == "rejected"
    }
}

/// Response from cancelling orders.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CancelOrderResponse {
    #[serde(default)]
    pub canceled: Vec<String>,
    /// Order ID to reason.
    #[serde(default)]
    pub not_canceled: HashMap<String, String>,
}

/// Authenticated CLOB session for one wallet.
pub struct ClobSession {
    config: ClobConfig,
    signer: WalletSigner,
    address: Address,
    credentials: ApiCredentials,
    transport: Arc<dyn Transport>,
}

impl ClobSession {
    /// Bind a wallet to credentials it already holds.
    pub fn new(
        config: ClobConfig,
        signer: WalletSigner,
        credentials: ApiCredentials,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        let address = signer.address()?;
        Ok(Self {
            config,
            signer,
            address,
            credentials,
            transport,
        })
    }

    /// Obtain credentials through `manager` and open a session.
    pub async fn connect(
        manager: &CredentialManager,
        signer: WalletSigner,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        let credentials = manager.create_or_derive(&signer).await?;
        Self::new(manager.config().clone(), signer, credentials, transport)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn credentials(&self) -> &ApiCredentials {
        &self.credentials
    }

    pub fn signer(&self) -> &WalletSigner {
        &self.signer
    }

    /// Build an L2-signed request for `path`.
    ///
    /// `body` must be the exact bytes sent; the signature covers them.
    pub fn authenticated_request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<String>,
    ) -> Result<HttpRequest> {
        let l2 = L2Signature::new(
            self.address,
            &self.credentials,
            method.as_str(),
            path,
            body.as_deref(),
            None,
        )?;

        let request =
            HttpRequest::new(method, self.config.url(path)).with_headers(l2.headers());
        Ok(match body {
            Some(body) => request.with_body(body),
            None => request,
        })
    }

    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<String>,
    ) -> Result<HttpResponse> {
        let request = self.authenticated_request(method, path, body)?;
        debug!(method = %method, path = %path, "Sending authenticated request");
        self.transport.send(request).await
    }

    /// Post a signed order to the CLOB.
    pub async fn post_order(
        &self,
        order: SignedOrder,
        order_type: OrderType,
    ) -> Result<PostOrderResponse> {
        let request = PostOrderRequest {
            order,
            owner: self.credentials.key.clone(),
            order_type,
        };
        let body = serde_json::to_string(&request)?;

        debug!(payload = %body, "POST /order request body");

        let response = self.send(HttpMethod::Post, "/order", Some(body)).await?;
        let result: PostOrderResponse = response.json("Failed to post order")?;
        info!(order_id = %result.order_id, status = %result.status, "Order posted");

        Ok(result)
    }

    /// Build, sign and post a limit order in one step.
    pub async fn place_order(
        &self,
        order_signer: &OrderSigner,
        args: &OrderArgs,
        tick: TickSize,
        options: &OrderOptions,
        order_type: OrderType,
    ) -> Result<PostOrderResponse> {
        let order = order_signer
            .build_order(&self.signer, args, tick, options)
            .await?;
        self.post_order(order, order_type).await
    }

    /// Cancel an order by ID.
    pub async fn cancel_order(&self, order_id: &str) -> Result<CancelOrderResponse> {
        let body = serde_json::json!({ "orderID": order_id }).to_string();

        let response = self.send(HttpMethod::Delete, "/order", Some(body)).await?;
        let result: CancelOrderResponse = response.json("Failed to cancel order")?;
        info!(order_id = %order_id, canceled = result.canceled.len(), "Cancel request processed");

        Ok(result)
    }
}

impl std::fmt::Debug for ClobSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClobSession")
            .field("host", &self.config.host)
            .field("address", &self.address)
            .field("credentials", &self.credentials)
            .finish()
    }
}
