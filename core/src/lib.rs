//! Level generation core: prompt building, the model call, and pulling level
//! JSON back out of the model's reply.

pub mod config;
pub mod error;
pub mod extract;
pub mod level;
pub mod llm;
pub mod prompt;
pub mod relay;

pub use config::{LlmSettings, Provider, RelayConfig};
pub use error::RelayError;
pub use level::{LevelDescriptor, ValidationMode};
pub use llm::{build_generator, AnthropicClient, OpenAiClient, TextGenerator};
pub use prompt::GenerationRequest;
pub use relay::LevelRelay;
