// Reflected XSS detection: context classification, payload selection and probing

pub mod context;
pub mod engine;
pub mod payloads;
pub mod probe;

// Re-export types
pub use context::{Classification, ClassifyOptions, XssContext};
pub use engine::{ProbeSummary, XssScanner};
pub use payloads::{select_payloads, PayloadCategory, XssPayload};
pub use probe::{is_reflected, probe, ReflectionEvidence};
