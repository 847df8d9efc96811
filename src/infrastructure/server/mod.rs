mod docs;
mod dto;
mod error;
mod router;
mod routes;
mod state;

pub use error::ServerError;
pub use router::build_router;

use crate::application::bridge::Bridge;
use crate::config::RestConfig;
use crate::infrastructure::model::ModelProvider;
use std::sync::Arc;

/// Serves the REST API until Ctrl-C, then closes the active session.
pub async fn serve<P>(bridge: Arc<Bridge<P>>, config: &RestConfig) -> Result<(), ServerError>
where
    P: ModelProvider + 'static,
{
    router::serve(bridge, config).await
}
