use crate::llm::LanguageModel;
use crate::model::ModelError;
use crate::utils::truncate_chars;

use std::sync::Arc;
use tracing::debug;

/// The ten topics every hosting page is mined for.
pub const TOPICS: [&str; 10] = [
    "the service name (website name)",
    "pricing",
    "service description",
    "features description",
    "uptime guarantee info",
    "security features info",
    "backup options",
    "provides free domain?",
    "money back guarantee",
    "details (any additional important information about the service)",
];

/// First model pass: condenses raw page text into notes about the ten topics.
pub struct TextSummarizer {
    model: Arc<dyn LanguageModel>,
    max_output_tokens: u32,
    max_content_chars: usize,
}

impl TextSummarizer {
    pub fn new(model: Arc<dyn LanguageModel>, max_output_tokens: u32, max_content_chars: usize) -> Self {
        Self {
            model,
            max_output_tokens,
            max_content_chars,
        }
    }

    /// One model call, no retries; model errors go straight back to the caller.
    pub async fn summarize(&self, content: &str) -> Result<String, ModelError> {
        let capped = truncate_chars(content, self.max_content_chars);
        if capped.len() < content.len() {
            debug!(
                "Page text capped at {} chars (was {} bytes)",
                self.max_content_chars,
                content.len()
            );
        }

        let prompt = build_prompt(capped);
        let summary = self.model.complete(&prompt, self.max_output_tokens).await?;
        debug!("Summary: {} chars", summary.len());
        Ok(summary)
    }
}

fn build_prompt(content: &str) -> String {
    let topics: String = TOPICS.iter().map(|t| format!("- {}\n", t)).collect();
    format!(
        "Analyze the following web page content about a WordPress hosting service \
         and extract the following information:\n\
         {topics}\n\
         Only report what the content actually states. If a piece of information \
         is not found, skip it; never guess or invent values.\n\n\
         Content:\n{content}\n"
    )
}
