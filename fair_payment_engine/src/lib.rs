//! Fair Payment Engine
//!
//! The Fair Payment Engine confirms card payments for the book fair (attendee registrations, exhibitor book stands
//! and donations) and propagates the outcome to whichever record the payment was for. It is provider-agnostic: the
//! card payment gateway, the database and the notification channel are all supplied by the caller through traits.
//!
//! The library is divided into these sections:
//! 1. Domain and database types ([`mod@db_types`]). A payment is tracked by its [`db_types::PaymentReference`], which
//!    is owned by exactly one [`db_types::PaymentOwner`].
//! 2. Backend contracts ([`mod@traits`]). A database backend implements [`traits::PaymentGatewayDatabase`]; the card
//!    gateway integration implements [`traits::PaymentGateway`]; email (or any other channel) implements
//!    [`traits::Notifier`]. SQLite is the bundled database backend.
//! 3. The public API ([`PaymentFlowApi`] and [`ReferenceApi`]). `PaymentFlowApi` hosts the reconciliation workflow:
//!    verify with the gateway, update the reference and its owner in one transaction, then notify the customer on a
//!    best-effort basis.
pub mod db_types;
pub mod helpers;
pub mod traits;

mod fpe_api;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use fpe_api::{
    errors::PaymentFlowError,
    payment_flow_api::{PaymentFlowApi, ReconciliationOptions, DEFAULT_VERIFY_ATTEMPTS, DEFAULT_VERIFY_BACKOFF},
    payment_objects,
    reference_api::ReferenceApi,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
