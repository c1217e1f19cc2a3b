pub mod error;
pub mod sse;
pub mod transport;

pub use error::{TransportError, TransportErrorKind};
pub use sse::StreamDecoder;
pub use transport::SseTransport;
