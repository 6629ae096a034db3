//! Request and response values flowing between the page, the cache and the network.
//!
//! Both types are immutable once built. A response body can be handed out
//! more than once only by cloning the snapshot, which is cheap because the
//! body is reference-counted `Bytes`.

pub mod request;
pub mod response;

pub use request::RequestDescriptor;
pub use response::{ResponseSnapshot, ResponseType};

/// Case-insensitive header lookup over an ordered header list.
pub(crate) fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}
