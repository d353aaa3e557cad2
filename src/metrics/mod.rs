// Classifier metrics: counting, grouping, percentages.

pub mod aggregate;
pub mod models;

pub use aggregate::{aggregate, count_text, count_tokens, RecordCounts};
pub use models::{percent_column, percentage, MetricsRow, MetricsTable, TOTAL_WORDS_COLUMN};
