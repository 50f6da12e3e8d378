//! #  Backend contracts
//!
//! This module provides the interfaces that the payment engine expects its collaborators to implement.
//!
//! ## Payment references and their owners
//! Every payment attempt is tracked by a [`crate::db_types::PaymentReference`]. A reference belongs to exactly one
//! owner: an attendee registration, an exhibitor book stand or a donation.
//!
//! ## Traits
//! * [`PaymentGatewayDatabase`] defines the highest level of behaviour for database backends, including the atomic
//!   confirmation of a payment.
//! * [`ReferenceRegistry`] stores and updates payment references.
//! * [`OwnerManagement`] looks up the owners of payments and marks them as paid.
//! * [`PaymentGateway`] is the seam to the external card payment provider.
//! * [`Notifier`] delivers the confirmation message once a payment is confirmed.
mod data_objects;
mod notifier;
mod owner_management;
mod payment_gateway;
mod payment_gateway_database;
mod reference_registry;

pub use data_objects::{
    ConfirmedPayment,
    GatewayPaymentStatus,
    InitializePayment,
    PaymentConfirmation,
    PaymentSession,
    VerifiedPayment,
};
pub use notifier::{NoopNotifier, Notification, NotificationError, NotificationTemplate, Notifier};
pub use owner_management::OwnerManagement;
pub use payment_gateway::{GatewayError, PaymentGateway};
pub use payment_gateway_database::{PaymentGatewayDatabase, PaymentGatewayError};
pub use reference_registry::ReferenceRegistry;
