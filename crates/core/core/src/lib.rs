//! # PushSMS Core
//!
//! Foundational types shared by the PushSMS SDK crates: the credential pair
//! used as signing key material, the SDK error type, and the HTTP transport
//! boundary that outbound API calls are written against.
//!
//! [`HttpTransport`] is the extension seam for outbound clients: API clients
//! take any implementation, [`ReqwestTransport`] is the default one behind the
//! `http-client` feature, and tests substitute an in-memory transport.

pub mod error;
pub mod transport;
pub mod types;

// Re-export commonly used items at the crate root
pub use error::{SdkError, SdkResult};
pub use transport::{Auth, HttpRequest, HttpResponse, HttpTransport, Method};
pub use types::Credentials;

#[cfg(feature = "http-client")]
pub use transport::ReqwestTransport;
