use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};

use crate::db_types::OwnerKind;

const RANDOM_SUFFIX_LEN: usize = 8;

pub fn reference_prefix(kind: OwnerKind) -> &'static str {
    match kind {
        OwnerKind::Registration => "REG",
        OwnerKind::BookStand => "STAND",
        OwnerKind::Donation => "DON",
    }
}

/// Generates a new payment reference of the form `{PREFIX}-{unix millis}-{8 random alphanumerics}`, e.g.
/// `STAND-1718012400123-x7Gk2PqA`.
pub fn generate_reference(kind: OwnerKind) -> String {
    let suffix: String =
        rand::thread_rng().sample_iter(&Alphanumeric).take(RANDOM_SUFFIX_LEN).map(char::from).collect();
    format!("{}-{}-{suffix}", reference_prefix(kind), Utc::now().timestamp_millis())
}

/// The page the gateway sends the customer back to after paying. Each owner kind has its own verify endpoint.
pub fn callback_url(base_url: &str, kind: OwnerKind) -> String {
    let path = match kind {
        OwnerKind::Registration => "/payment/verify",
        OwnerKind::BookStand => "/payment/book-stand/verify",
        OwnerKind::Donation => "/payment/donation/verify",
    };
    format!("{}{path}", base_url.trim_end_matches('/'))
}
