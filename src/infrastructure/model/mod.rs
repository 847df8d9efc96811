//! Model infrastructure module
//!
//! # Structure
//! - `types` - generation request, response and error types
//! - `traits` - the `ModelProvider` seam the bridge is generic over
//! - `clients` - HTTP clients (Gemini)

pub mod clients;
pub mod traits;
pub mod types;

pub use clients::GeminiClient;
pub use traits::ModelProvider;
pub use types::{GenerationRequest, GenerationResponse, ModelError};
