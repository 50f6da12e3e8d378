use actix_web::{http::StatusCode, test::TestRequest};
use fair_payment_engine::{
    db_types::{
        BookStandStatus,
        OwnerKind,
        PaymentOwner,
        PaymentReference,
        PaymentStatus,
        RegistrationStatus,
        ReferenceStatusUpdate,
    },
    traits::{
        ConfirmedPayment,
        GatewayError,
        NotificationError,
        NotificationTemplate,
        PaymentGatewayError,
        PaymentSession,
    },
};
use fpg_common::MajorUnits;
use mockall::predicate::eq;
use serde_json::json;

use super::helpers::*;

const STAND_REF: &str = "STAND-1718012400123-x7Gk2PqA";

fn stand_owner() -> PaymentOwner {
    PaymentOwner::BookStand("REF123".into())
}

fn initialize_request(metadata: serde_json::Value) -> TestRequest {
    TestRequest::post().uri("/payment/initialize").set_json(json!({
        "email": "sales@lagosbooks.ng",
        "amount": 5000,
        "metadata": metadata,
    }))
}

fn stored(reference: &str, owner: PaymentOwner, status: PaymentStatus) -> Option<PaymentReference> {
    Some(payment_reference(reference, owner, status))
}

//----------------------------------------------   Initialize  ----------------------------------------------------

#[actix_web::test]
async fn initialize_book_stand_payment() {
    let mut mocks = Mocks::default();
    mocks
        .db
        .expect_fetch_owner()
        .with(eq(stand_owner()))
        .times(1)
        .returning(|_| Ok(Some(book_stand(BookStandStatus::PaymentPending))));
    mocks
        .gateway
        .expect_initialize()
        .withf(|r| {
            r.amount == MajorUnits::from_whole(5000) &&
                r.owner == stand_owner() &&
                r.currency == "NGN" &&
                r.reference.starts_with("STAND-") &&
                r.callback_url.as_deref() == Some("https://pay.bookfair.ng/payment/book-stand/verify") &&
                r.metadata["bookStandReferenceId"] == "REF123"
        })
        .times(1)
        .returning(|r| {
            Ok(PaymentSession {
                authorization_url: format!("https://checkout.example.com/{}", r.reference),
                reference: r.reference.clone(),
                access_code: "ac_7rbx2".into(),
            })
        });
    mocks
        .db
        .expect_create_reference()
        .withf(|r| {
            r.owner == stand_owner() && r.status == PaymentStatus::Pending && r.amount == MajorUnits::from_whole(5000)
        })
        .times(1)
        .returning(|r| Ok(payment_reference(&r.reference, r.owner, r.status)));
    let req = initialize_request(json!({ "ownerKind": "BookStand", "ownerKey": "REF123" }));
    let (status, body) = send_request(req, mocks).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let body = json(&body);
    let reference = body["reference"].as_str().unwrap();
    assert!(reference.starts_with("STAND-"));
    assert_eq!(body["authorizationUrl"], format!("https://checkout.example.com/{reference}"));
    assert_eq!(body["accessCode"], "ac_7rbx2");
}

#[actix_web::test]
async fn initialize_without_owner_metadata() {
    let mut mocks = Mocks::default();
    mocks.gateway.expect_initialize().never();
    let req = initialize_request(json!({ "note": "stand by the entrance" }));
    let (status, body) = send_request(req, mocks).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json(&body)["error"].as_str().unwrap().contains("does not say which registration"));
}

#[actix_web::test]
async fn initialize_with_malformed_body() {
    let req = TestRequest::post()
        .uri("/payment/initialize")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"email\": \"sales@lagosbooks.ng\", \"amount\": ");
    let (status, body) = send_request(req, Mocks::default()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json(&body)["error"].as_str().unwrap().starts_with("Could not read request body"));
}

#[actix_web::test]
async fn initialize_with_invalid_email() {
    let req = TestRequest::post().uri("/payment/initialize").set_json(json!({
        "email": "lagos books",
        "amount": 5000,
        "metadata": { "ownerKind": "BookStand", "ownerKey": "REF123" },
    }));
    let (status, body) = send_request(req, Mocks::default()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("not a valid email address"));
}

#[actix_web::test]
async fn initialize_with_zero_amount() {
    let mut mocks = Mocks::default();
    mocks.db.expect_fetch_owner().never();
    let req = TestRequest::post().uri("/payment/initialize").set_json(json!({
        "email": "sales@lagosbooks.ng",
        "amount": 0,
        "metadata": { "ownerKind": "BookStand", "ownerKey": "REF123" },
    }));
    let (status, body) = send_request(req, mocks).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("not a positive amount"));
}

#[actix_web::test]
async fn initialize_for_unknown_owner() {
    let mut mocks = Mocks::default();
    mocks.db.expect_fetch_owner().times(1).returning(|_| Ok(None));
    mocks.gateway.expect_initialize().never();
    mocks.db.expect_create_reference().never();
    let req = initialize_request(json!({ "ownerKind": "BookStand", "ownerKey": "REF999" }));
    let (status, body) = send_request(req, mocks).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("BookStand [REF999] does not exist"));
}

#[actix_web::test]
async fn initialize_when_gateway_is_down() {
    let mut mocks = Mocks::default();
    mocks.db.expect_fetch_owner().returning(|_| Ok(Some(book_stand(BookStandStatus::PaymentPending))));
    mocks.gateway.expect_initialize().times(1).returning(|_| Err(GatewayError::Transport("connection reset".into())));
    mocks.db.expect_create_reference().never();
    let req = initialize_request(json!({ "ownerKind": "BookStand", "ownerKey": "REF123" }));
    let (status, body) = send_request(req, mocks).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.contains("connection reset"));
}

#[actix_web::test]
async fn initialize_with_duplicate_reference() {
    let mut mocks = Mocks::default();
    mocks.db.expect_fetch_owner().returning(|_| Ok(Some(book_stand(BookStandStatus::PaymentPending))));
    mocks.gateway.expect_initialize().returning(|r| {
        Ok(PaymentSession {
            authorization_url: "https://checkout.example.com/x".into(),
            reference: r.reference.clone(),
            access_code: "ac_1".into(),
        })
    });
    mocks
        .db
        .expect_create_reference()
        .returning(|r| Err(PaymentGatewayError::DuplicateReference(r.reference.clone())));
    let req = initialize_request(json!({ "ownerKind": "BookStand", "ownerKey": "REF123" }));
    let (status, body) = send_request(req, mocks).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("already exists"));
}

//----------------------------------------------   Verify  ----------------------------------------------------

#[actix_web::test]
async fn verify_book_stand_payment() {
    let mut mocks = Mocks::default();
    mocks
        .gateway
        .expect_verify()
        .with(eq(STAND_REF))
        .times(1)
        .returning(|r| Ok(verified(r, "success", &stand_owner())));
    mocks
        .db
        .expect_fetch_reference()
        .with(eq(STAND_REF))
        .returning(|r| Ok(stored(r, stand_owner(), PaymentStatus::Pending)));
    mocks.db.expect_fetch_owner().returning(|_| Ok(Some(book_stand(BookStandStatus::PaymentPending))));
    mocks
        .db
        .expect_confirm_payment()
        .withf(|p| p.reference == STAND_REF && p.owner == stand_owner() && p.amount == MajorUnits::from_whole(5000))
        .times(1)
        .returning(|p| {
            Ok(ConfirmedPayment {
                reference: payment_reference(&p.reference, p.owner, PaymentStatus::Success),
                owner: book_stand(BookStandStatus::Paid),
                newly_confirmed: true,
            })
        });
    mocks
        .mailer
        .expect_send()
        .withf(|n| {
            n.template == NotificationTemplate::BookStandPaid &&
                n.recipient == "sales@lagosbooks.ng" &&
                n.data["reference"] == STAND_REF
        })
        .times(1)
        .returning(|_| Ok(()));
    let req = TestRequest::get().uri(&format!("/payment/book-stand/verify?reference={STAND_REF}"));
    let (status, body) = send_request(req, mocks).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let body = json(&body);
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "success");
    assert_eq!(body["amount"], 5000);
    assert_eq!(body["currency"], "NGN");
    assert_eq!(body["ownerKind"], "BookStand");
    assert_eq!(body["ownerKey"], "REF123");
    assert_eq!(body["paidAt"], "2024-06-10T09:40:00Z");
    assert_eq!(body["message"], "Payment verified successfully");
    assert!(body.get("registrationId").is_none());
}

#[actix_web::test]
async fn verify_registration_payment() {
    let owner = PaymentOwner::Registration("R-7".into());
    let mut mocks = Mocks::default();
    let o = owner.clone();
    mocks.gateway.expect_verify().returning(move |r| Ok(verified(r, "success", &o)));
    let o = owner.clone();
    mocks.db.expect_fetch_reference().returning(move |r| Ok(stored(r, o.clone(), PaymentStatus::Pending)));
    mocks.db.expect_fetch_owner().returning(|_| Ok(Some(registration(RegistrationStatus::Pending))));
    mocks.db.expect_confirm_payment().times(1).returning(|p| {
        Ok(ConfirmedPayment {
            reference: payment_reference(&p.reference, p.owner, PaymentStatus::Success),
            owner: registration(RegistrationStatus::Completed),
            newly_confirmed: true,
        })
    });
    mocks
        .mailer
        .expect_send()
        .withf(|n| n.template == NotificationTemplate::RegistrationConfirmed && n.recipient == "chidi@example.com")
        .times(1)
        .returning(|_| Ok(()));
    let req = TestRequest::get().uri("/payment/verify?reference=REG-1718012400123-Qm3xT9aZ");
    let (status, body) = send_request(req, mocks).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let body = json(&body);
    assert_eq!(body["success"], true);
    assert_eq!(body["ownerKind"], "Registration");
    assert_eq!(body["registrationId"], "R-7");
}

#[actix_web::test]
async fn verify_failed_payment() {
    let mut mocks = Mocks::default();
    mocks.gateway.expect_verify().returning(|r| Ok(verified(r, "failed", &stand_owner())));
    mocks.db.expect_fetch_reference().returning(|r| Ok(stored(r, stand_owner(), PaymentStatus::Pending)));
    mocks
        .db
        .expect_update_reference_status()
        .with(eq(STAND_REF), eq(ReferenceStatusUpdate::new(PaymentStatus::Failed)))
        .times(1)
        .returning(|r, u| Ok(payment_reference(r, stand_owner(), u.status)));
    mocks.db.expect_confirm_payment().never();
    mocks.mailer.expect_send().never();
    let req = TestRequest::get().uri(&format!("/payment/book-stand/verify?reference={STAND_REF}"));
    let (status, body) = send_request(req, mocks).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let body = json(&body);
    assert_eq!(body["success"], false);
    assert_eq!(body["status"], "failed");
    assert_eq!(body["message"], "Declined");
    assert!(body["paidAt"].is_null());
}

#[actix_web::test]
async fn verify_already_confirmed_payment() {
    let mut mocks = Mocks::default();
    mocks.gateway.expect_verify().returning(|r| Ok(verified(r, "success", &stand_owner())));
    mocks.db.expect_fetch_reference().returning(|r| Ok(stored(r, stand_owner(), PaymentStatus::Success)));
    mocks.db.expect_fetch_owner().returning(|_| Ok(Some(book_stand(BookStandStatus::Paid))));
    mocks.db.expect_confirm_payment().times(1).returning(|p| {
        Ok(ConfirmedPayment {
            reference: payment_reference(&p.reference, p.owner, PaymentStatus::Success),
            owner: book_stand(BookStandStatus::Paid),
            newly_confirmed: false,
        })
    });
    mocks.mailer.expect_send().never();
    let req = TestRequest::get().uri(&format!("/payment/verify?reference={STAND_REF}"));
    let (status, body) = send_request(req, mocks).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let body = json(&body);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Payment was already verified");
}

#[actix_web::test]
async fn failed_notification_does_not_fail_verification() {
    let mut mocks = Mocks::default();
    mocks.gateway.expect_verify().returning(|r| Ok(verified(r, "success", &stand_owner())));
    mocks.db.expect_fetch_reference().returning(|r| Ok(stored(r, stand_owner(), PaymentStatus::Pending)));
    mocks.db.expect_fetch_owner().returning(|_| Ok(Some(book_stand(BookStandStatus::PaymentPending))));
    mocks.db.expect_confirm_payment().returning(|p| {
        Ok(ConfirmedPayment {
            reference: payment_reference(&p.reference, p.owner, PaymentStatus::Success),
            owner: book_stand(BookStandStatus::Paid),
            newly_confirmed: true,
        })
    });
    mocks.mailer.expect_send().times(1).returning(|_| Err(NotificationError("SMTP relay refused".into())));
    let req = TestRequest::get().uri(&format!("/payment/book-stand/verify?reference={STAND_REF}"));
    let (status, body) = send_request(req, mocks).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(json(&body)["success"], true);
}

#[actix_web::test]
async fn verify_without_reference() {
    let mut mocks = Mocks::default();
    mocks.gateway.expect_verify().never();
    let (status, body) = send_request(TestRequest::get().uri("/payment/verify"), mocks).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json(&body)["error"].as_str().unwrap().starts_with("Could not read request query"));

    let mut mocks = Mocks::default();
    mocks.gateway.expect_verify().never();
    let (status, body) = send_request(TestRequest::get().uri("/payment/donation/verify?reference=%20"), mocks).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("A payment reference is required"));
}

#[actix_web::test]
async fn verify_for_the_wrong_owner_kind() {
    let mut mocks = Mocks::default();
    mocks.gateway.expect_verify().returning(|r| Ok(verified(r, "success", &stand_owner())));
    mocks.db.expect_fetch_reference().returning(|r| Ok(stored(r, stand_owner(), PaymentStatus::Pending)));
    mocks.db.expect_confirm_payment().never();
    mocks.mailer.expect_send().never();
    let req = TestRequest::get().uri(&format!("/payment/donation/verify?reference={STAND_REF}"));
    let (status, body) = send_request(req, mocks).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains(&format!("{}", OwnerKind::Donation)));
}

#[actix_web::test]
async fn verify_retries_transient_gateway_errors() {
    let mut mocks = Mocks::default();
    mocks.gateway.expect_verify().times(3).returning(|_| Err(GatewayError::Transport("timed out".into())));
    mocks.db.expect_fetch_reference().never();
    let req = TestRequest::get().uri(&format!("/payment/verify?reference={STAND_REF}"));
    let (status, body) = send_request(req, mocks).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.contains("after 3 attempt(s)"));
}

#[actix_web::test]
async fn verify_does_not_retry_rejections() {
    let mut mocks = Mocks::default();
    mocks
        .gateway
        .expect_verify()
        .times(1)
        .returning(|_| Err(GatewayError::Rejected("Transaction reference not found".into())));
    let req = TestRequest::get().uri("/payment/verify?reference=NOPE");
    let (status, body) = send_request(req, mocks).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.contains("after 1 attempt(s)"));
}

#[actix_web::test]
async fn verify_unknown_reference_from_metadata() {
    let mut mocks = Mocks::default();
    mocks.gateway.expect_verify().returning(|r| Ok(verified(r, "success", &stand_owner())));
    mocks.db.expect_fetch_reference().returning(|_| Ok(None));
    mocks.db.expect_fetch_owner().with(eq(stand_owner())).returning(|_| Ok(None));
    mocks.db.expect_confirm_payment().never();
    let req = TestRequest::get().uri(&format!("/payment/book-stand/verify?reference={STAND_REF}"));
    let (status, body) = send_request(req, mocks).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("BookStand [REF123] does not exist"));
}
