mod connector;
mod error;
mod interface;
mod process;

pub use connector::StdioConnector;
pub use error::ToolInvokeError;
pub use interface::{ToolTransport, TransportConnector};
pub use process::McpProcess;
