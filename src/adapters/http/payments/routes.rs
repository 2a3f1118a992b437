//! Axum router configuration for payment endpoints.

use axum::routing::post;
use axum::Router;

use super::handlers::{create_payment, handle_provider_webhook, PaymentsAppState};

/// Create the payment API router.
///
/// # Routes
///
/// ## User Endpoints (caller identity required)
/// - `POST /` - Start a payment for a plan purchase
pub fn payment_routes() -> Router<PaymentsAppState> {
    Router::new().route("/", post(create_payment))
}

/// Create the provider webhook router.
///
/// Separate from the user routes because webhooks carry no caller
/// identity; each gateway authenticates its own callbacks (source ranges
/// or body signature).
///
/// # Routes
/// - `POST /:gateway` - Inbound provider callback (`yookassa`, `cryptomus`)
pub fn webhook_routes() -> Router<PaymentsAppState> {
    Router::new().route("/:gateway", post(handle_provider_webhook))
}

/// Create the complete payment module router.
///
/// Suitable for nesting under `/api`:
///
/// ```ignore
/// let app = Router::new()
///     .nest("/api", payment_router())
///     .with_state(state);
/// ```
pub fn payment_router() -> Router<PaymentsAppState> {
    Router::new()
        .nest("/payments", payment_routes())
        .nest("/webhooks", webhook_routes())
}
