//! # PushSMS Callback
//!
//! Receiver for the vendor's inbound SMS notifications:
//! - URL ownership challenge (`GET ?echostr=`)
//! - SHA-1 signature verification of every notification
//! - Decoding of reply, delivery report and audit payloads
//! - Dispatch to per-kind application processors
//!
//! ## Example
//!
//! ```rust,ignore
//! use pushsms_callback::{CallbackServer, FnProcessor, ReportNotification};
//! use pushsms_core::Credentials;
//!
//! let server = CallbackServer::builder(Credentials::new("app-key", "master-secret"))
//!     .addr(":8088")
//!     .path("/callback")
//!     .report_processor(FnProcessor::new("reports", |report: ReportNotification| async move {
//!         tracing::info!(msg_id = ?report.msg_id, status = report.status, "Delivery report");
//!         Ok(())
//!     }))
//!     .build()?;
//!
//! server.run().await?;
//! ```

mod builder;
mod config;
pub mod decode;
mod dispatcher;
mod error;
mod notification;
mod processor;
mod server;
pub mod signature;
pub mod time;

pub use builder::CallbackServerBuilder;
pub use config::{CallbackConfig, DEFAULT_ADDR, DEFAULT_PATH};
pub use dispatcher::{Dispatched, Dispatcher, Envelope};
pub use error::{CallbackError, CallbackResult, DecodeError};
pub use notification::{
    DecodedNotification, Notification, NotificationKind, ReplyNotification, ReportNotification,
    SignatureAuditNotification, TemplateAuditNotification,
};
pub use processor::{
    FnProcessor, LoggingProcessor, Processor, ProcessorError, ProcessorResult, Processors,
    SharedProcessor,
};
pub use server::CallbackServer;
pub use signature::SignatureVerifier;
pub use time::TimeParseError;
