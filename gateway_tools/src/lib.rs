//! # Gateway tools
//!
//! A thin client for the card payment gateway's REST API (Paystack-compatible wire format), plus the HMAC helpers
//! used to authenticate incoming webhook calls.
//!
//! All amounts in this crate are in **minor units** (kobo), since that is what the gateway speaks. Conversion to
//! major units is the caller's responsibility, and should happen exactly once, where gateway data enters the payment
//! engine.
mod api;
mod config;
mod error;

pub mod data_objects;
pub mod signature;

pub use api::GatewayApi;
pub use config::GatewayConfig;
pub use data_objects::{
    ApiResponse,
    InitializeTransactionRequest,
    InitializedTransaction,
    Transaction,
    WebhookEvent,
    CHARGE_SUCCESS_EVENT,
};
pub use error::GatewayApiError;
