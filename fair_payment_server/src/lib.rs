//! # Fair payment server
//! This crate hosts the HTTP server for book fair payments. It is responsible for:
//! * Opening payment sessions with the card payment gateway for registrations, book stands and donations.
//! * Handling the redirect callbacks the gateway sends customers back to, and verifying those payments.
//! * Receiving signed webhook calls from the gateway and reconciling the payments they report.
//!
//! The payment logic itself lives in `fair_payment_engine`. This crate wires it to the outside world: the gateway's
//! REST API, an SMTP server for confirmation emails, and the routes below.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/payment/initialize`: Opens a payment session and returns the gateway's checkout URL.
//! * `/payment/verify`, `/payment/book-stand/verify`, `/payment/donation/verify`: Redirect callbacks.
//! * `/payment/reference/{reference}`: Looks up a stored payment reference.
//! * `/payment/webhook`: The gateway's webhook. Calls must carry a valid `x-gateway-signature` header.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
