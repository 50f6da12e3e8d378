mod owner_extractor;
mod reference;

pub use owner_extractor::{extract_owner_from_metadata, owner_metadata};
pub use reference::{callback_url, generate_reference, reference_prefix};
