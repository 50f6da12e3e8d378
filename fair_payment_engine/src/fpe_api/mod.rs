//! # Fair payment engine public API
//!
//! The `fpe_api` module exposes the programmatic API for the Fair Payment engine.
//!
//! * [`payment_flow_api`] is the primary API. It opens payment sessions and reconciles payments with the gateway,
//!   whether the reference arrives via the customer's redirect or via a gateway webhook.
//! * [`reference_api`] provides read-only lookups of payment references and their owners.
//!
//! # API usage
//!
//! An API instance is created by supplying the backends it needs. For example:
//!
//! ```rust,ignore
//! use fair_payment_engine::{traits::NoopNotifier, PaymentFlowApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! // SqliteDatabase implements PaymentGatewayDatabase; `gateway` implements PaymentGateway
//! let api = PaymentFlowApi::new(db, gateway, NoopNotifier);
//! let result = api.reconcile("STAND-1718012400123-x7Gk2PqA").await?;
//! ```
pub mod errors;
pub mod payment_flow_api;
pub mod payment_objects;
pub mod reference_api;
