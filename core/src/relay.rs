use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::Result;
use crate::extract::parse_embedded_json;
use crate::level::ValidationMode;
use crate::llm::TextGenerator;
use crate::prompt::{build_prompt, GenerationRequest};

/// Turns a level request into level JSON via one model call.
///
/// Holds no per-request state; clone it freely or share behind an `Arc`.
#[derive(Clone)]
pub struct LevelRelay {
    generator: Arc<dyn TextGenerator>,
    validation: ValidationMode,
}

impl LevelRelay {
    pub fn new(generator: Arc<dyn TextGenerator>, validation: ValidationMode) -> Self {
        Self {
            generator,
            validation,
        }
    }

    pub fn validation(&self) -> ValidationMode {
        self.validation
    }

    /// Prompt, call, extract, parse, and (in strict mode) shape-check.
    ///
    /// The returned value is exactly what the model emitted between its first
    /// `{` and last `}`.
    pub async fn generate_level(&self, request: &GenerationRequest) -> Result<Value> {
        let prompt = build_prompt(request);
        debug!(prompt_len = prompt.len(), model = self.generator.model(), "prompt built");

        let text = self.generator.generate(&prompt).await?;
        info!(response_len = text.len(), "model responded");

        let level = parse_embedded_json(&text)?;
        self.validation.check(&level)?;
        Ok(level)
    }
}
