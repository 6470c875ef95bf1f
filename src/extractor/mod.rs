// Extractor module: free-text summarization followed by schema-constrained extraction.

pub mod structured;
pub mod summarizer;

pub use structured::StructuredExtractor;
pub use summarizer::TextSummarizer;
