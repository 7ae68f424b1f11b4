pub mod location;
pub mod query_binding;

pub use location::{Location, MemoryLocation};
pub use query_binding::{overlay_id_from_url, share_url, url_with_overlay_id, OVERLAY_PARAM};
