#![allow(dead_code)]
use std::{
    collections::VecDeque,
    env,
    sync::{Arc, Mutex},
};

use fair_payment_engine::{
    db_types::{BookStandStatus, NewBookStand, NewDonation, NewRegistration},
    sqlite::db::{book_stands, donations, registrations},
    traits::{
        GatewayError,
        GatewayPaymentStatus,
        InitializePayment,
        Notification,
        NotificationError,
        Notifier,
        PaymentGateway,
        PaymentSession,
        VerifiedPayment,
    },
    SqliteDatabase,
};
use fpg_common::MajorUnits;
use log::*;
use serde_json::{json, Value};

pub async fn prepare_test_env() -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    let url = random_db_url();
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database");
    db.migrate().await.expect("Error running DB migrations");
    debug!("🚀️ Test database ready at {url}");
    db
}

pub fn random_db_url() -> String {
    format!("sqlite://{}/fpe_test_{}.db", env::temp_dir().display(), rand::random::<u64>())
}

pub async fn seed_registration(db: &SqliteDatabase, id: &str) {
    let mut conn = db.pool().acquire().await.unwrap();
    let registration =
        NewRegistration { id: id.into(), email: format!("{id}@example.com"), full_name: "Chidi Okeke".into() };
    registrations::insert(registration, &mut conn).await.unwrap();
}

pub async fn seed_book_stand(db: &SqliteDatabase, reference_id: &str, status: BookStandStatus) {
    let mut conn = db.pool().acquire().await.unwrap();
    let stand = NewBookStand {
        reference_id: reference_id.into(),
        email: "sales@lagosbooks.ng".into(),
        company_name: "Lagos Books Ltd".into(),
        status,
    };
    book_stands::insert(stand, &mut conn).await.unwrap();
}

pub async fn seed_donation(db: &SqliteDatabase, id: &str) {
    let mut conn = db.pool().acquire().await.unwrap();
    let donation = NewDonation { id: id.into(), email: "ada@example.com".into(), donor_name: "Ada".into() };
    donations::insert(donation, &mut conn).await.unwrap();
}

pub fn verified(reference: &str, status: &str, amount: i64, metadata: Value) -> VerifiedPayment {
    VerifiedPayment {
        reference: reference.into(),
        status: GatewayPaymentStatus::from(status),
        amount: MajorUnits::from_whole(amount),
        currency: "NGN".into(),
        paid_at: None,
        channel: Some("card".into()),
        gateway_response: Some(if status == "success" { "Approved".into() } else { "Declined".into() }),
        metadata,
    }
}

pub fn book_stand_metadata(reference_id: &str) -> Value {
    json!({"owner": {"kind": "BookStand", "key": reference_id}})
}

/// A payment gateway that replays scripted responses. When the script runs out, the last verify response is repeated.
#[derive(Clone, Default)]
pub struct ScriptedGateway {
    verify_script: Arc<Mutex<VecDeque<Result<VerifiedPayment, GatewayError>>>>,
    last_verify: Arc<Mutex<Option<Result<VerifiedPayment, GatewayError>>>>,
    verify_calls: Arc<Mutex<u32>>,
    init_requests: Arc<Mutex<Vec<InitializePayment>>>,
    init_fails: bool,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_initialization() -> Self {
        Self { init_fails: true, ..Self::default() }
    }

    pub fn push_verify(&self, response: Result<VerifiedPayment, GatewayError>) {
        self.verify_script.lock().unwrap().push_back(response);
    }

    pub fn verify_calls(&self) -> u32 {
        *self.verify_calls.lock().unwrap()
    }

    pub fn init_requests(&self) -> Vec<InitializePayment> {
        self.init_requests.lock().unwrap().clone()
    }
}

impl PaymentGateway for ScriptedGateway {
    async fn initialize(&self, request: InitializePayment) -> Result<PaymentSession, GatewayError> {
        if self.init_fails {
            return Err(GatewayError::Response { status: 401, message: "Invalid key".into() });
        }
        let session = PaymentSession {
            authorization_url: format!("https://checkout.example.com/{}", request.reference),
            reference: request.reference.clone(),
            access_code: "access_123".into(),
        };
        self.init_requests.lock().unwrap().push(request);
        Ok(session)
    }

    async fn verify(&self, _reference: &str) -> Result<VerifiedPayment, GatewayError> {
        *self.verify_calls.lock().unwrap() += 1;
        let next = self.verify_script.lock().unwrap().pop_front();
        let mut last = self.last_verify.lock().unwrap();
        match next {
            Some(response) => {
                *last = Some(response.clone());
                response
            },
            None => last.clone().unwrap_or_else(|| Err(GatewayError::Transport("No scripted response".into()))),
        }
    }

    fn validate_webhook_signature(&self, _raw_body: &[u8], signature: &str) -> bool {
        signature == "valid"
    }
}

/// Collects every notification it is asked to send. If `fail` is set, it records the attempt and then fails.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    async fn send(&self, notification: Notification) -> Result<(), NotificationError> {
        self.sent.lock().unwrap().push(notification);
        if self.fail {
            return Err(NotificationError("SMTP server unavailable".into()));
        }
        Ok(())
    }
}
