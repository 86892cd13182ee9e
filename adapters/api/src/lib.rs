#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! HTTP adapter that fetches catalog pages for the Pokédex viewer.
//!
//! [`PageSource`] is the seam between the pure systems and the network:
//! [`HttpPageSource`] talks to the catalog API, tests substitute scripted
//! sources. [`PageLoader`] runs a source on a background thread so the UI loop
//! never blocks on a request.

mod client;
mod error;
mod loader;

pub use self::client::{
    decode_page, ApiConfig, HttpPageSource, PageSource, DEFAULT_BASE_URL, DEFAULT_COLLECTION,
};
pub use self::error::FetchError;
pub use self::loader::{PageLoader, PageResponse};
