use std::{sync::Arc, time::Duration};

use actix_web::{dev::Server, error::Error, http::KeepAlive, middleware::Logger, web, App, HttpRequest, HttpServer};
use fair_payment_engine::{
    traits::{Notifier, PaymentGateway, PaymentGatewayDatabase},
    PaymentFlowApi,
    ReferenceApi,
    SqliteDatabase,
};
use log::*;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::{ConfiguredNotifier, GatewayClient},
    middleware::{SignatureMiddlewareFactory, SIGNATURE_HEADER},
    routes::{
        health,
        InitializePaymentRoute,
        PaymentReferenceRoute,
        PaymentWebhookRoute,
        VerifyBookStandPaymentRoute,
        VerifyDonationPaymentRoute,
        VerifyPaymentRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(format!("Database migration failed. {e}")))?;
    info!("🗃️ Database is ready at {}", config.database_url);
    let gateway = GatewayClient::new(config.gateway.clone())
        .map_err(|e| ServerError::InitializeError(format!("Could not create the gateway client. {e}")))?;
    let notifier = ConfiguredNotifier::from_config(config.smtp.as_ref())?;
    let srv = create_server_instance(config, db, gateway, notifier)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    gateway: GatewayClient,
    notifier: ConfiguredNotifier,
) -> Result<Server, ServerError> {
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let payments_api = PaymentFlowApi::new(db.clone(), gateway.clone(), notifier.clone())
            .with_options(config.reconciliation_options());
        let reference_api = ReferenceApi::new(db.clone());
        let webhook_gateway = Arc::new(gateway.clone());
        let signature_checks = config.signature_checks;
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("fpg::access_log"))
            .app_data(web::Data::new(payments_api))
            .app_data(web::Data::new(reference_api))
            .configure(configure_extractors)
            .configure(move |cfg| {
                configure_payment_routes::<SqliteDatabase, GatewayClient, ConfiguredNotifier>(
                    cfg,
                    webhook_gateway,
                    signature_checks,
                )
            })
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}

/// Makes malformed JSON bodies and query strings fail with the same `{"error": ...}` body as every other error.
pub fn configure_extractors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error));
}

fn json_error(e: actix_web::error::JsonPayloadError, _req: &HttpRequest) -> Error {
    debug!("💻️ Rejecting request body. {e}");
    ServerError::InvalidRequestBody(e.to_string()).into()
}

fn query_error(e: actix_web::error::QueryPayloadError, _req: &HttpRequest) -> Error {
    debug!("💻️ Rejecting request query. {e}");
    ServerError::InvalidRequestQuery(e.to_string()).into()
}

/// Registers every payment route for the given backends. The webhook is wrapped in the signature middleware, which
/// uses `gateway` to check signatures.
///
/// The routes expect a `PaymentFlowApi<B, G, N>` and a `ReferenceApi<B>` in the app data.
pub fn configure_payment_routes<B, G, N>(cfg: &mut web::ServiceConfig, gateway: Arc<G>, signature_checks: bool)
where
    B: PaymentGatewayDatabase + 'static,
    G: PaymentGateway + 'static,
    N: Notifier + 'static,
{
    let webhook_scope = web::scope("/payment/webhook")
        .wrap(SignatureMiddlewareFactory::new(SIGNATURE_HEADER, gateway, signature_checks))
        .service(PaymentWebhookRoute::<B, G, N>::new());
    cfg.service(health)
        .service(webhook_scope)
        .service(InitializePaymentRoute::<B, G, N>::new())
        .service(VerifyPaymentRoute::<B, G, N>::new())
        .service(VerifyBookStandPaymentRoute::<B, G, N>::new())
        .service(VerifyDonationPaymentRoute::<B, G, N>::new())
        .service(PaymentReferenceRoute::<B>::new());
}
