//! # Finding the owner of a payment
//!
//! Every payment session this system opens carries its owner in the gateway metadata, tagged under `owner`:
//!
//! ```json
//! { "owner": { "kind": "BookStand", "key": "REF123" }, "ownerKind": "BookStand", "ownerKey": "REF123" }
//! ```
//!
//! Sessions opened by older clients only carry loose fields, so the extractor falls back to, in order:
//! * the `ownerKind` / `ownerKey` pair,
//! * explicit id fields (`bookStandReferenceId`, `registrationId`, `donationId` and their snake_case forms),
//! * `custom_fields` entries, matched on `variable_name`.
//!
//! Gateways sometimes return the metadata as a JSON-encoded string. That is unwrapped first.
use log::*;
use serde_json::{json, Value};

use crate::db_types::{OwnerKind, PaymentOwner};

const REGISTRATION_FIELDS: [&str; 2] = ["registrationId", "registration_id"];
const BOOK_STAND_FIELDS: [&str; 3] = ["bookStandReferenceId", "book_stand_reference_id", "bookStandId"];
const DONATION_FIELDS: [&str; 2] = ["donationId", "donation_id"];

/// Determines which record a payment belongs to from the metadata the gateway returned with it. Returns `None` if
/// the metadata does not identify an owner.
pub fn extract_owner_from_metadata(metadata: &Value) -> Option<PaymentOwner> {
    let parsed;
    let metadata = match metadata {
        Value::String(s) => {
            parsed = serde_json::from_str::<Value>(s).ok()?;
            &parsed
        },
        m => m,
    };
    if !metadata.is_object() {
        return None;
    }
    tagged_owner(metadata)
        .or_else(|| kind_and_key(metadata))
        .or_else(|| explicit_fields(metadata))
        .or_else(|| custom_fields(metadata))
}

/// Builds the metadata sent to the gateway when a payment is initialized. `extra` fields are kept, but the owner
/// fields always win.
pub fn owner_metadata(owner: &PaymentOwner, extra: &Value) -> Value {
    let mut metadata = match extra {
        Value::Object(map) => map.clone(),
        _ => serde_json::Map::new(),
    };
    let (field, label) = match owner.kind() {
        OwnerKind::Registration => (REGISTRATION_FIELDS[0], "Registration ID"),
        OwnerKind::BookStand => (BOOK_STAND_FIELDS[0], "Book Stand Reference"),
        OwnerKind::Donation => (DONATION_FIELDS[0], "Donation ID"),
    };
    metadata.insert("owner".into(), json!(owner));
    metadata.insert("ownerKind".into(), json!(owner.kind()));
    metadata.insert("ownerKey".into(), json!(owner.key()));
    metadata.insert(field.into(), json!(owner.key()));
    metadata.insert(
        "custom_fields".into(),
        json!([{ "display_name": label, "variable_name": field, "value": owner.key() }]),
    );
    Value::Object(metadata)
}

fn tagged_owner(metadata: &Value) -> Option<PaymentOwner> {
    let owner = metadata.get("owner")?;
    match serde_json::from_value::<PaymentOwner>(owner.clone()) {
        Ok(owner) if !owner.key().is_empty() => Some(owner),
        Ok(_) => None,
        Err(e) => {
            warn!("🔄️ Payment metadata has an 'owner' field, but it is not valid. {e}");
            None
        },
    }
}

fn kind_and_key(metadata: &Value) -> Option<PaymentOwner> {
    let kind = metadata.get("ownerKind")?.as_str()?.parse::<OwnerKind>().ok()?;
    let key = value_as_key(metadata.get("ownerKey")?)?;
    Some(PaymentOwner::new(kind, key))
}

fn explicit_fields(metadata: &Value) -> Option<PaymentOwner> {
    let find = |fields: &[&str]| fields.iter().find_map(|f| metadata.get(*f).and_then(value_as_key));
    // A book stand booking is the most specific claim, since book stand metadata may also carry the exhibitor's
    // registration id.
    find(&BOOK_STAND_FIELDS[..])
        .map(PaymentOwner::BookStand)
        .or_else(|| find(&REGISTRATION_FIELDS[..]).map(PaymentOwner::Registration))
        .or_else(|| find(&DONATION_FIELDS[..]).map(PaymentOwner::Donation))
}

fn custom_fields(metadata: &Value) -> Option<PaymentOwner> {
    let fields = metadata.get("custom_fields")?.as_array()?;
    let find = |names: &[&str]| {
        fields.iter().find_map(|field| {
            let name = field.get("variable_name")?.as_str()?;
            if names.contains(&name) {
                field.get("value").and_then(value_as_key)
            } else {
                None
            }
        })
    };
    find(&BOOK_STAND_FIELDS[..])
        .map(PaymentOwner::BookStand)
        .or_else(|| find(&REGISTRATION_FIELDS[..]).map(PaymentOwner::Registration))
        .or_else(|| find(&DONATION_FIELDS[..]).map(PaymentOwner::Donation))
}

/// Keys may arrive as strings or numbers. Empty strings do not count.
fn value_as_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
