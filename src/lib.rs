// Tally: classifier word metrics for social-media post exports.
//
// This is the library root. Each module is one stage of the metrics
// pipeline; `pipeline::run` ties them together.

pub mod dictionary;
pub mod error;
pub mod ingest;
pub mod metrics;
pub mod output;
pub mod pipeline;
pub mod tokenize;

pub use error::MetricsError;
