pub mod label;
pub mod relevance;
pub mod wire;

pub use label::{Label, LabelError, LabelMapping};
pub use relevance::{COVID_KEYWORDS, RELEVANCE_THRESHOLD, is_relevant, relevance_score};
pub use wire::{ClassificationRequest, ClassificationResponse, ErrorBody, ProbabilityTable};
