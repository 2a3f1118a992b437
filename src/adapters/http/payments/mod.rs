//! HTTP adapter for payment initiation and provider webhooks.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    CreatePaymentRequestBody, ErrorResponse, PaymentActionResponse, PaymentCreatedResponse,
    WebhookAckResponse,
};
pub use handlers::{AuthenticatedUser, PaymentApiError, PaymentsAppState};
pub use routes::{payment_router, payment_routes, webhook_routes};
