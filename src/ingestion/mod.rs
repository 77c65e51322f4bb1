//! Turning a URL into plain document text.
//!
//! Two steps, in order:
//!
//! * [`fetch`] — downloads the raw HTML behind a URL.
//! * [`extract`] — reduces the HTML to its paragraph text.

pub mod extract;
pub mod fetch;

pub use extract::extract_paragraphs;
pub use fetch::{fetch_page, http_client, BROWSER_USER_AGENT};
