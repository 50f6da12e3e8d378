//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Verifying a payment can take several seconds when the gateway is
//! slow (see the retry policy in `PaymentFlowApi`), so every gateway and database call here is awaited, never blocked
//! on.
use actix_web::{get, web, HttpResponse, Responder};
use fair_payment_engine::{
    db_types::OwnerKind,
    traits::{Notifier, PaymentGateway, PaymentGatewayDatabase},
    PaymentFlowApi,
    ReferenceApi,
};
use gateway_tools::WebhookEvent;
use log::*;

use crate::{
    data_objects::{InitializePaymentBody, PaymentVerificationResponse, ReferenceQuery, WebhookAck},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro.
// Each trait bound becomes a type parameter of the handler, in the order given.
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $(| $more:ident)* $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::Any(actix_web::guard::$method())$(.or(actix_web::guard::$more()))*)
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Initialize  ----------------------------------------------------
route!(initialize_payment => Post "/payment/initialize" impl PaymentGatewayDatabase, PaymentGateway, Notifier);
/// Opens a payment session with the gateway.
///
/// The body is an [`InitializePaymentBody`]. The metadata must identify the registration, book stand or donation
/// being paid for; that owner must already exist.
///
/// On success, returns `{authorizationUrl, reference, accessCode}`. The client sends the customer to
/// `authorizationUrl` to complete the payment.
pub async fn initialize_payment<B, G, N>(
    body: web::Json<InitializePaymentBody>,
    api: web::Data<PaymentFlowApi<B, G, N>>,
) -> Result<HttpResponse, ServerError>
where
    B: PaymentGatewayDatabase,
    G: PaymentGateway,
    N: Notifier,
{
    let request = body.into_inner().into_request()?;
    debug!("💻️ POST initialize payment of {} for {}", request.amount, request.owner);
    let session = api.initialize_payment(request).await.map_err(|e| {
        debug!("💻️ Could not initialize payment. {e}");
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Ok().json(session))
}

//----------------------------------------------   Verify  ----------------------------------------------------
route!(verify_payment => Get "/payment/verify" impl PaymentGatewayDatabase, PaymentGateway, Notifier);
/// The redirect callback for payments. The gateway sends the customer here with `?reference=...` once they have
/// finished on the checkout page.
///
/// The payment is verified with the gateway and, if successful, applied to whichever record it was for. A payment
/// the gateway does not report as successful is still a `200` response, with `success: false`.
pub async fn verify_payment<B, G, N>(
    query: web::Query<ReferenceQuery>,
    api: web::Data<PaymentFlowApi<B, G, N>>,
) -> Result<HttpResponse, ServerError>
where
    B: PaymentGatewayDatabase,
    G: PaymentGateway,
    N: Notifier,
{
    let reference = reference_from(query)?;
    debug!("💻️ GET verify payment {reference}");
    let result = api.reconcile(&reference).await?;
    Ok(HttpResponse::Ok().json(PaymentVerificationResponse::from(result)))
}

route!(verify_book_stand_payment => Get "/payment/book-stand/verify" impl PaymentGatewayDatabase, PaymentGateway, Notifier);
/// Like `/payment/verify`, but the payment must be for a book stand.
pub async fn verify_book_stand_payment<B, G, N>(
    query: web::Query<ReferenceQuery>,
    api: web::Data<PaymentFlowApi<B, G, N>>,
) -> Result<HttpResponse, ServerError>
where
    B: PaymentGatewayDatabase,
    G: PaymentGateway,
    N: Notifier,
{
    let reference = reference_from(query)?;
    debug!("💻️ GET verify book stand payment {reference}");
    verify_for_owner(&reference, OwnerKind::BookStand, api.as_ref()).await
}

route!(verify_donation_payment => Get "/payment/donation/verify" impl PaymentGatewayDatabase, PaymentGateway, Notifier);
/// Like `/payment/verify`, but the payment must be for a donation.
pub async fn verify_donation_payment<B, G, N>(
    query: web::Query<ReferenceQuery>,
    api: web::Data<PaymentFlowApi<B, G, N>>,
) -> Result<HttpResponse, ServerError>
where
    B: PaymentGatewayDatabase,
    G: PaymentGateway,
    N: Notifier,
{
    let reference = reference_from(query)?;
    debug!("💻️ GET verify donation {reference}");
    verify_for_owner(&reference, OwnerKind::Donation, api.as_ref()).await
}

async fn verify_for_owner<B, G, N>(
    reference: &str,
    kind: OwnerKind,
    api: &PaymentFlowApi<B, G, N>,
) -> Result<HttpResponse, ServerError>
where
    B: PaymentGatewayDatabase,
    G: PaymentGateway,
    N: Notifier,
{
    let result = api.reconcile_for_owner(reference, kind).await.map_err(|e| {
        debug!("💻️ Could not verify {kind} payment {reference}. {e}");
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Ok().json(PaymentVerificationResponse::from(result)))
}

fn reference_from(query: web::Query<ReferenceQuery>) -> Result<String, ServerError> {
    let reference = query.into_inner().reference.trim().to_string();
    if reference.is_empty() {
        return Err(ServerError::InvalidRequestQuery("A payment reference is required".into()));
    }
    Ok(reference)
}

//----------------------------------------------   References  ----------------------------------------------------
route!(payment_reference => Get "/payment/reference/{reference}" impl PaymentGatewayDatabase);
/// Returns the stored payment reference, along with the current state of the record it pays for.
///
/// This does not contact the gateway. Use the verify endpoints to refresh a payment's status.
pub async fn payment_reference<B: PaymentGatewayDatabase>(
    path: web::Path<String>,
    api: web::Data<ReferenceApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let reference = path.into_inner();
    debug!("💻️ GET payment reference {reference}");
    let result = api.reference_with_owner(&reference).await?;
    match result {
        Some(r) => Ok(HttpResponse::Ok().json(r)),
        None => Err(ServerError::NoRecordFound(format!("Payment reference {reference} does not exist"))),
    }
}

//----------------------------------------------   Webhook  ----------------------------------------------------
route!(payment_webhook => Post | Put "" impl PaymentGatewayDatabase, PaymentGateway, Notifier);
/// The gateway's webhook. This route must be wrapped in the signature middleware, which has already checked the
/// `x-gateway-signature` header by the time the handler runs.
///
/// Only `charge.success` events are acted on. The response is always `{"received": true}`: anything else makes the
/// gateway retry the call, and a payment that cannot be reconciled now will not reconcile on a retry either. Failures
/// are logged instead, and the customer's redirect callback gets another chance at the payment.
pub async fn payment_webhook<B, G, N>(body: web::Bytes, api: web::Data<PaymentFlowApi<B, G, N>>) -> HttpResponse
where
    B: PaymentGatewayDatabase,
    G: PaymentGateway,
    N: Notifier,
{
    trace!("💻️ Received webhook call");
    let event = match serde_json::from_slice::<WebhookEvent>(body.as_ref()) {
        Ok(event) => event,
        Err(e) => {
            warn!("💻️ Could not read webhook event. {e}");
            return HttpResponse::Ok().json(WebhookAck::received());
        },
    };
    if !event.is_charge_success() {
        debug!("💻️ Ignoring '{}' webhook event for {}", event.event, event.data.reference);
        return HttpResponse::Ok().json(WebhookAck::received());
    }
    let reference = event.data.reference;
    info!("💻️ Payment {reference} reported successful by webhook. Reconciling.");
    match api.reconcile(&reference).await {
        Ok(result) if result.success => {
            info!("💻️ Webhook reconciled payment {reference} ({})", result.message)
        },
        Ok(result) => warn!("💻️ Webhook reported {reference} successful, but verification says '{}'", result.status),
        Err(e) => error!("💻️ Could not reconcile payment {reference} from webhook. {e}"),
    }
    HttpResponse::Ok().json(WebhookAck::received())
}
