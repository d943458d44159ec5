//! xsscout: crawl-driven reflected XSS discovery.
//!
//! Pipeline: fetch → crawl → parameter discovery → context/defense
//! classification → payload selection → probing → report.

pub mod cli;
pub mod core;
pub mod errors;
pub mod http;
pub mod payload;
pub mod reporting;
pub mod scanner;
pub mod xss;

pub use crate::core::cancel::CancelFlag;
pub use crate::core::context::ScanConfig;
pub use crate::core::engine::Engine;
pub use crate::errors::{FetchError, ScanError};
pub use crate::reporting::model::{Finding, ScanReport};
pub use crate::reporting::reporter::Reporter;
