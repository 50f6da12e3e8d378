use std::{sync::Arc, time::Duration};

use actix_web::{body, http::StatusCode, test, test::TestRequest, web, web::ServiceConfig, App};
use chrono::{DateTime, TimeZone, Utc};
use fair_payment_engine::{
    db_types::{
        BookStand,
        BookStandStatus,
        OwnerRecord,
        PaymentOwner,
        PaymentReference,
        PaymentStatus,
        Registration,
        RegistrationStatus,
    },
    traits::{GatewayPaymentStatus, VerifiedPayment},
    PaymentFlowApi,
    ReconciliationOptions,
    ReferenceApi,
};
use fpg_common::MajorUnits;
use log::debug;
use serde_json::{json, Value};

use super::mocks::{MockGateway, MockMailer, MockPaymentDb};
use crate::server::{configure_extractors, configure_payment_routes};

/// The mocks behind one test app. `db`, `gateway` and `mailer` back the payment flow; `references` backs the
/// reference lookups; `signatures` checks webhook signatures.
#[derive(Default)]
pub struct Mocks {
    pub db: MockPaymentDb,
    pub gateway: MockGateway,
    pub mailer: MockMailer,
    pub references: MockPaymentDb,
    pub signatures: MockGateway,
}

fn options() -> ReconciliationOptions {
    ReconciliationOptions {
        verify_backoff: Duration::from_millis(1),
        public_base_url: Some("https://pay.bookfair.ng".into()),
        ..ReconciliationOptions::default()
    }
}

fn configure(mocks: Mocks) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let Mocks { db, gateway, mailer, references, signatures } = mocks;
        let payments_api = PaymentFlowApi::new(db, gateway, mailer).with_options(options());
        cfg.app_data(web::Data::new(payments_api)).app_data(web::Data::new(ReferenceApi::new(references)));
        configure_payment_routes::<MockPaymentDb, MockGateway, MockMailer>(cfg, Arc::new(signatures), true);
    }
}

/// Sends the request to an app built from `mocks` and returns the status and body of the response.
pub async fn send_request(req: TestRequest, mocks: Mocks) -> (StatusCode, String) {
    let _ = env_logger::try_init();
    let app = App::new().configure(configure_extractors).configure(configure(mocks));
    let service = test::init_service(app).await;
    debug!("Making request");
    let response = match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => res.into_parts().1,
        Err(e) => e.error_response(),
    };
    let status = response.status();
    let body = body::to_bytes(response.into_body())
        .await
        .map(|b| String::from_utf8_lossy(&b).into_owned())
        .unwrap_or_default();
    (status, body)
}

pub fn json(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|e| panic!("Response is not JSON ({e}): {body}"))
}

pub fn timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 10, 9, 40, 0).unwrap()
}

pub fn book_stand(status: BookStandStatus) -> OwnerRecord {
    OwnerRecord::BookStand(BookStand {
        reference_id: "REF123".into(),
        email: "sales@lagosbooks.ng".into(),
        company_name: "Lagos Books Ltd".into(),
        status,
        created_at: timestamp(),
        updated_at: timestamp(),
    })
}

pub fn registration(status: RegistrationStatus) -> OwnerRecord {
    OwnerRecord::Registration(Registration {
        id: "R-7".into(),
        email: "chidi@example.com".into(),
        full_name: "Chidi Okeke".into(),
        payment_status: status,
        created_at: timestamp(),
        updated_at: timestamp(),
    })
}

pub fn payment_reference(reference: &str, owner: PaymentOwner, status: PaymentStatus) -> PaymentReference {
    PaymentReference {
        reference: reference.into(),
        owner_kind: owner.kind(),
        owner_key: owner.key().into(),
        amount: MajorUnits::from_whole(5000),
        currency: "NGN".into(),
        status,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

pub fn verified(reference: &str, status: &str, owner: &PaymentOwner) -> VerifiedPayment {
    let success = status == "success";
    VerifiedPayment {
        reference: reference.into(),
        status: GatewayPaymentStatus::from(status),
        amount: MajorUnits::from_whole(5000),
        currency: "NGN".into(),
        paid_at: success.then(timestamp),
        channel: Some("card".into()),
        gateway_response: Some(if success { "Approved".into() } else { "Declined".into() }),
        metadata: json!({ "owner": owner }),
    }
}
