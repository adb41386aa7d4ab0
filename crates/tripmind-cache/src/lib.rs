pub mod keys;
pub mod ttl;

pub use keys::{coordinate_key, normalize_text, text_key};
pub use ttl::{TtlCache, MAX_TTL};
