//! XML → [`MetricSet`](regtest_core::MetricSet) extraction.
//!
//! Domain documents carry their results either directly (`RESULT`/`OUTPUT`
//! blocks) or as a second XML document escaped inside a `Data` element. The
//! [`MetricExtractor`] handles both, driven by an [`ExtractionProfile`].

pub mod error;
pub mod extractor;
pub mod profile;
pub mod tree;

pub use error::{DocumentLevel, ExtractError};
pub use extractor::MetricExtractor;
pub use profile::ExtractionProfile;
pub use tree::document_tree;
