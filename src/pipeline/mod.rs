pub mod annotate;
pub mod extract;
pub mod matcher;
pub mod processor;

pub use annotate::AnnotateError;
pub use matcher::ComplianceResult;
pub use processor::ProcessOutcome;
