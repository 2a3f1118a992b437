//! HTTP handlers for payment endpoints.
//!
//! These handlers connect Axum routes to the application layer command
//! handlers. Webhook endpoints read the raw body; signature verification
//! needs the exact bytes the provider sent.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{ConnectInfo, Json, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::application::handlers::payment::{
    CancelStaleTransactionsHandler, ConfirmPlatformPaymentHandler, HandleGatewayWebhookCommand,
    HandleGatewayWebhookHandler, HandleGatewayWebhookResult, InitiatePaymentCommand,
    InitiatePaymentHandler,
};
use crate::domain::foundation::{Money, PlanId, UserId};
use crate::domain::payment::{GatewayKind, PaymentError, TransactionLedger};
use crate::ports::{GatewayFactory, TaskQueue};

use super::dto::{
    CreatePaymentRequestBody, ErrorResponse, PaymentCreatedResponse, WebhookAckResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all payment dependencies.
#[derive(Clone)]
pub struct PaymentsAppState {
    pub factory: Arc<dyn GatewayFactory>,
    pub ledger: Arc<TransactionLedger>,
    pub task_queue: Arc<dyn TaskQueue>,
}

impl PaymentsAppState {
    /// Create handlers on demand from the shared state.
    pub fn initiate_handler(&self) -> InitiatePaymentHandler {
        InitiatePaymentHandler::new(self.factory.clone(), self.ledger.clone())
    }

    pub fn webhook_handler(&self) -> HandleGatewayWebhookHandler {
        HandleGatewayWebhookHandler::new(
            self.factory.clone(),
            self.ledger.clone(),
            self.task_queue.clone(),
        )
    }

    pub fn platform_confirm_handler(&self) -> ConfirmPlatformPaymentHandler {
        ConfirmPlatformPaymentHandler::new(self.ledger.clone(), self.task_queue.clone())
    }

    pub fn sweep_handler(&self) -> CancelStaleTransactionsHandler {
        CancelStaleTransactionsHandler::new(self.ledger.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Authenticated Caller Context
// ════════════════════════════════════════════════════════════════════════════════

/// Caller identity extracted from the request.
///
/// The bot layer and the web frontend both sit behind their own auth and
/// forward the resolved user id in a header; this core does not own
/// authentication.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Rejection type for AuthenticatedUser extraction.
pub struct AuthenticationRequired;

impl IntoResponse for AuthenticationRequired {
    fn into_response(self) -> axum::response::Response {
        let error = ErrorResponse::new("AUTHENTICATION_REQUIRED", "Authentication is required");
        (StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

impl<S> axum::extract::FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthenticationRequired;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let user_id = parts
                .headers
                .get("X-User-Id")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| UserId::new(s).ok())
                .ok_or(AuthenticationRequired)?;

            Ok(AuthenticatedUser { user_id })
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Mapping
// ════════════════════════════════════════════════════════════════════════════════

/// Wrapper turning `PaymentError` into an HTTP response.
pub struct PaymentApiError(pub PaymentError);

impl From<PaymentError> for PaymentApiError {
    fn from(err: PaymentError) -> Self {
        Self(err)
    }
}

impl IntoResponse for PaymentApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.0.status_code();
        let code = match &self.0 {
            PaymentError::Configuration { .. } => "GATEWAY_UNAVAILABLE",
            PaymentError::Authentication { .. } => "AUTHENTICATION_FAILED",
            PaymentError::Gateway(_) => "GATEWAY_ERROR",
            PaymentError::UnknownTransaction { .. } => "UNKNOWN_TRANSACTION",
            PaymentError::Extension { .. } => "EXTENSION_FAILED",
            PaymentError::Storage(_) => "INTERNAL_ERROR",
        };
        let error = ErrorResponse::new(code, self.0.to_string());
        (status, Json(error)).into_response()
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Endpoint Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/payments - Start a payment for a plan purchase
pub async fn create_payment(
    State(state): State<PaymentsAppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreatePaymentRequestBody>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let plan_id = PlanId::new(body.plan_id)
        .map_err(|e| PaymentError::Storage(e.into()))?;
    let description = body
        .description
        .unwrap_or_else(|| format!("Subscription: {} days", body.duration_days));

    let handler = state.initiate_handler();
    let cmd = InitiatePaymentCommand {
        user_id: user.user_id,
        plan_id,
        duration_days: body.duration_days,
        amount: Money::new(body.amount, body.currency),
        gateway: body.gateway,
        description,
    };

    let result = handler.handle(cmd).await?;

    Ok((
        StatusCode::CREATED,
        Json(PaymentCreatedResponse::from(result)),
    ))
}

/// POST /api/webhooks/{gateway} - Inbound provider callback
///
/// No caller authentication: the gateway's own authentication (source
/// ranges or body signature) decides whether the request is trusted.
pub async fn handle_provider_webhook(
    State(state): State<PaymentsAppState>,
    Path(gateway): Path<String>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<axum::response::Response, PaymentApiError> {
    let gateway: GatewayKind = match gateway.parse() {
        Ok(kind) => kind,
        Err(_) => {
            let error = ErrorResponse::new(
                "UNKNOWN_GATEWAY",
                format!("No webhook endpoint for '{}'", gateway),
            );
            return Ok((StatusCode::NOT_FOUND, Json(error)).into_response());
        }
    };

    let handler = state.webhook_handler();
    let cmd = HandleGatewayWebhookCommand {
        gateway,
        body: body.to_vec(),
        headers,
        source_ip: peer.ip(),
    };

    let ack = match handler.handle(cmd).await? {
        HandleGatewayWebhookResult::Resolved { .. } => WebhookAckResponse::processed(),
        HandleGatewayWebhookResult::Duplicate { .. } => WebhookAckResponse::duplicate(),
    };

    Ok((StatusCode::OK, Json(ack)).into_response())
}
