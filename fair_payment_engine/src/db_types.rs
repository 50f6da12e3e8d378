use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use fpg_common::MajorUnits;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid {kind}: {value}")]
pub struct ConversionError {
    kind: &'static str,
    value: String,
}

impl ConversionError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self { kind, value: value.to_string() }
    }
}

// Implements Display and FromStr for a plain enum, using the variant names as the string representation. These are
// also the values stored in the database.
macro_rules! string_enum {
    ($name:ident, $desc:literal, [$($variant:ident),+]) => {
        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str(stringify!($variant)),)+
                }
            }
        }

        impl FromStr for $name {
            type Err = ConversionError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $(stringify!($variant) => Ok(Self::$variant),)+
                    s => Err(ConversionError::new($desc, s)),
                }
            }
        }
    };
}

//--------------------------------------   PaymentStatus     ---------------------------------------------------------
/// The verification status of a payment reference.
///
/// `Success` is final. A `Failed` reference may be verified again, since the customer can retry the payment on the
/// gateway with the same reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Success,
    Failed,
}

string_enum!(PaymentStatus, "payment status", [Pending, Success, Failed]);

//--------------------------------------     OwnerKind       ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
pub enum OwnerKind {
    Registration,
    BookStand,
    Donation,
}

string_enum!(OwnerKind, "owner kind", [Registration, BookStand, Donation]);

//--------------------------------------    PaymentOwner     ---------------------------------------------------------
/// The record that a payment is for. The key is the owner's natural key: the registration id, the book stand
/// reference id, or the donation id.
///
/// In JSON, this is represented as `{"kind": "BookStand", "key": "REF123"}`, which is how it travels in the gateway
/// metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "key")]
pub enum PaymentOwner {
    Registration(String),
    BookStand(String),
    Donation(String),
}

impl PaymentOwner {
    pub fn new<S: Into<String>>(kind: OwnerKind, key: S) -> Self {
        let key = key.into();
        match kind {
            OwnerKind::Registration => Self::Registration(key),
            OwnerKind::BookStand => Self::BookStand(key),
            OwnerKind::Donation => Self::Donation(key),
        }
    }

    pub fn kind(&self) -> OwnerKind {
        match self {
            Self::Registration(_) => OwnerKind::Registration,
            Self::BookStand(_) => OwnerKind::BookStand,
            Self::Donation(_) => OwnerKind::Donation,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Self::Registration(k) | Self::BookStand(k) | Self::Donation(k) => k.as_str(),
        }
    }
}

impl Display for PaymentOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]", self.kind(), self.key())
    }
}

//--------------------------------------  PaymentReference   ---------------------------------------------------------
/// The audit record of a single payment attempt. Rows are never deleted.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReference {
    pub reference: String,
    pub owner_kind: OwnerKind,
    pub owner_key: String,
    /// In major currency units
    #[sqlx(try_from = "String")]
    pub amount: MajorUnits,
    pub currency: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentReference {
    pub fn owner(&self) -> PaymentOwner {
        PaymentOwner::new(self.owner_kind, self.owner_key.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPaymentReference {
    pub reference: String,
    pub owner: PaymentOwner,
    pub amount: MajorUnits,
    pub currency: String,
    pub status: PaymentStatus,
}

impl NewPaymentReference {
    pub fn new<S: Into<String>>(reference: S, owner: PaymentOwner, amount: MajorUnits, currency: &str) -> Self {
        let status = PaymentStatus::Pending;
        Self { reference: reference.into(), owner, amount, currency: currency.to_string(), status }
    }

    pub fn with_status(mut self, status: PaymentStatus) -> Self {
        self.status = status;
        self
    }
}

/// A change to a payment reference's status. `amount` and `currency` are only overwritten when supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceStatusUpdate {
    pub status: PaymentStatus,
    pub amount: Option<MajorUnits>,
    pub currency: Option<String>,
}

impl ReferenceStatusUpdate {
    pub fn new(status: PaymentStatus) -> Self {
        Self { status, amount: None, currency: None }
    }

    pub fn with_amount(mut self, amount: MajorUnits, currency: &str) -> Self {
        self.amount = Some(amount);
        self.currency = Some(currency.to_string());
        self
    }
}

//--------------------------------------    Registration     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum RegistrationStatus {
    #[default]
    Pending,
    Completed,
}

string_enum!(RegistrationStatus, "registration status", [Pending, Completed]);

impl RegistrationStatus {
    pub const PAID: Self = Self::Completed;
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub payment_status: RegistrationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub id: String,
    pub email: String,
    pub full_name: String,
}

//--------------------------------------      BookStand      ---------------------------------------------------------
/// Book stand booking status.
///
/// `Confirmed` and `PaymentPending` are set by the admin workflow. The payment engine only ever performs the final
/// transition to `Paid`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum BookStandStatus {
    #[default]
    Pending,
    Confirmed,
    PaymentPending,
    Paid,
}

string_enum!(BookStandStatus, "book stand status", [Pending, Confirmed, PaymentPending, Paid]);

impl BookStandStatus {
    pub const PAID: Self = Self::Paid;
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookStand {
    pub reference_id: String,
    pub email: String,
    pub company_name: String,
    pub status: BookStandStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewBookStand {
    pub reference_id: String,
    pub email: String,
    pub company_name: String,
    pub status: BookStandStatus,
}

//--------------------------------------   DonationRecord    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum DonationStatus {
    #[default]
    Pending,
    Successful,
    Failed,
}

string_enum!(DonationStatus, "donation status", [Pending, Successful, Failed]);

impl DonationStatus {
    pub const PAID: Self = Self::Successful;
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationRecord {
    pub id: String,
    pub email: String,
    pub donor_name: String,
    pub status: DonationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDonation {
    pub id: String,
    pub email: String,
    pub donor_name: String,
}

//--------------------------------------     OwnerRecord     ---------------------------------------------------------
/// The current state of the record that owns a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "record")]
pub enum OwnerRecord {
    Registration(Registration),
    BookStand(BookStand),
    Donation(DonationRecord),
}

impl OwnerRecord {
    pub fn owner(&self) -> PaymentOwner {
        match self {
            Self::Registration(r) => PaymentOwner::Registration(r.id.clone()),
            Self::BookStand(b) => PaymentOwner::BookStand(b.reference_id.clone()),
            Self::Donation(d) => PaymentOwner::Donation(d.id.clone()),
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Self::Registration(r) => &r.email,
            Self::BookStand(b) => &b.email,
            Self::Donation(d) => &d.email,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Self::Registration(r) => &r.full_name,
            Self::BookStand(b) => &b.company_name,
            Self::Donation(d) => &d.donor_name,
        }
    }

    /// True if the owner has reached its terminal paid status.
    pub fn is_paid(&self) -> bool {
        match self {
            Self::Registration(r) => r.payment_status == RegistrationStatus::PAID,
            Self::BookStand(b) => b.status == BookStandStatus::PAID,
            Self::Donation(d) => d.status == DonationStatus::PAID,
        }
    }
}
