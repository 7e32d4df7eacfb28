//! HTTP messages, headers and the transport seam.

pub mod message;
pub mod orderedheaders;
pub mod response;
pub mod statusrange;
pub mod transaction;
pub mod transport;

// Re-exports for convenience
pub use message::{OutgoingMessage, RequestBody};
pub use orderedheaders::OrderedHeaderMap;
pub use response::HttpResponse;
pub use statusrange::StatusRange;
pub use transport::{HttpTransport, HyperTransport};
