//! Content summarizer: turns raw article text (or a topic) into a structured
//! post payload via the generation backend.

mod client;
pub mod payload;
pub mod prompts;

pub use self::client::{GenerationBackend, OpenAiBackend};
pub use self::payload::{PostPayload, SectionValue, SummaryBody};

use anyhow::{anyhow, Result};
use rand::Rng;
use tracing::{info, warn};

use self::payload::GeneratedPost;
use crate::TARGET_LLM_REQUEST;

pub struct Summarizer<B: GenerationBackend> {
    backend: B,
}

impl<B: GenerationBackend> Summarizer<B> {
    pub fn new(backend: B) -> Self {
        Summarizer { backend }
    }

    /// Summarizes one article into a post payload. A backend error or a
    /// response that fails to parse as the expected structure is an error;
    /// the caller drops the candidate and moves on. No in-cycle retry.
    pub async fn summarize(
        &self,
        text: &str,
        title: &str,
        link: &str,
        rng: &mut impl Rng,
    ) -> Result<PostPayload> {
        let style = prompts::pick_style(rng);
        let prompt = prompts::article_prompt(style, title, text, link);

        let content = self.backend.generate(prompts::SYSTEM_EDITOR, &prompt).await?;
        let generated = parse_generated(&content)?;

        info!(target: TARGET_LLM_REQUEST, "Generated post for article: {}", title);
        Ok(PostPayload {
            // Fall back to the original title if the model omitted one.
            title: if generated.title.trim().is_empty() {
                title.to_string()
            } else {
                generated.title
            },
            body: generated.summary,
            hashtags: generated.hashtags,
            link: Some(link.to_string()),
            image_url: None,
        })
    }

    /// Generates educational content for a topic rather than an article.
    pub async fn summarize_topic(&self, topic: &str) -> Result<PostPayload> {
        let prompt = prompts::lesson_prompt(topic);
        let content = self.backend.generate(prompts::SYSTEM_ENGINEER, &prompt).await?;
        let generated = parse_generated(&content)?;

        info!(target: TARGET_LLM_REQUEST, "Generated lesson for topic: {}", topic);
        Ok(PostPayload {
            title: if generated.title.trim().is_empty() {
                format!("Master class: {}", topic)
            } else {
                generated.title
            },
            body: generated.summary,
            hashtags: if generated.hashtags.trim().is_empty() {
                "#Coding".to_string()
            } else {
                generated.hashtags
            },
            link: None,
            image_url: None,
        })
    }
}

fn parse_generated(content: &str) -> Result<GeneratedPost> {
    let generated: GeneratedPost = serde_json::from_str(content).map_err(|err| {
        warn!(target: TARGET_LLM_REQUEST, "Failed to parse generation response: {}", err);
        anyhow!("malformed generation response: {}", err)
    })?;

    if generated.summary.is_empty() {
        return Err(anyhow!("generation response had an empty summary"));
    }
    Ok(generated)
}
