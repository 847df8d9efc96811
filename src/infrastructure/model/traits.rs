//! Model traits

use super::types::{GenerationRequest, GenerationResponse, ModelError};
use async_trait::async_trait;
use std::sync::Arc;

/// A language model that can answer with text or request a function call.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn generate(&self, request: GenerationRequest)
    -> Result<GenerationResponse, ModelError>;
}

#[async_trait]
impl<P> ModelProvider for Arc<P>
where
    P: ModelProvider + ?Sized,
{
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, ModelError> {
        (**self).generate(request).await
    }
}
