use actix_web::{http::StatusCode, test::TestRequest};
use fair_payment_engine::db_types::{BookStandStatus, PaymentOwner, PaymentStatus};
use mockall::predicate::eq;

use super::helpers::*;

#[actix_web::test]
async fn fetch_payment_reference() {
    let mut mocks = Mocks::default();
    mocks
        .references
        .expect_fetch_reference()
        .with(eq("STAND-1718012400123-x7Gk2PqA"))
        .times(1)
        .returning(|r| {
            let owner = PaymentOwner::BookStand("REF123".into());
            Ok(Some(payment_reference(r, owner, PaymentStatus::Success)))
        });
    mocks
        .references
        .expect_fetch_owner()
        .with(eq(PaymentOwner::BookStand("REF123".into())))
        .returning(|_| Ok(Some(book_stand(BookStandStatus::Paid))));
    mocks.gateway.expect_verify().never();
    let req = TestRequest::get().uri("/payment/reference/STAND-1718012400123-x7Gk2PqA");
    let (status, body) = send_request(req, mocks).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let body = json(&body);
    assert_eq!(body["reference"]["reference"], "STAND-1718012400123-x7Gk2PqA");
    assert_eq!(body["reference"]["ownerKind"], "BookStand");
    assert_eq!(body["reference"]["status"], "Success");
    assert_eq!(body["reference"]["amount"], 5000);
    assert_eq!(body["owner"]["kind"], "BookStand");
    assert_eq!(body["owner"]["record"]["companyName"], "Lagos Books Ltd");
    assert_eq!(body["owner"]["record"]["status"], "Paid");
}

#[actix_web::test]
async fn fetch_missing_payment_reference() {
    let mut mocks = Mocks::default();
    mocks.references.expect_fetch_reference().times(1).returning(|_| Ok(None));
    mocks.references.expect_fetch_owner().never();
    let (status, body) = send_request(TestRequest::get().uri("/payment/reference/DON-404"), mocks).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json(&body)["error"], "The data was not found. Payment reference DON-404 does not exist");
}

#[actix_web::test]
async fn health_check() {
    let (status, body) = send_request(TestRequest::get().uri("/health"), Mocks::default()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "👍️\n");
}
