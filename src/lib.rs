pub mod dataset;
pub mod error;
pub mod output;
pub mod package;
pub mod stats;
pub mod summary;

pub use dataset::{Dataset, Value};
pub use error::SummaryError;
pub use summary::{GroupKey, GroupSummary, summarize, summarize_by};
