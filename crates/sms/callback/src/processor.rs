//! Application callbacks invoked with decoded notifications.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

use crate::notification::{
    DecodedNotification, NotificationKind, ReplyNotification, ReportNotification,
    SignatureAuditNotification, TemplateAuditNotification,
};

/// Error returned by a processor.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ProcessorError {
    message: String,
}

impl ProcessorError {
    /// Creates a processor error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for ProcessorError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for ProcessorError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Result of processing one notification.
pub type ProcessorResult = Result<(), ProcessorError>;

/// Handles decoded notifications of one kind.
///
/// Processors run inside the request that delivered the notification, so the
/// vendor waits for them. Long work should be handed off (e.g. to a channel or
/// a spawned task) before returning.
#[async_trait]
pub trait Processor<N: DecodedNotification>: Send + Sync {
    /// Returns an identifier used in logs.
    fn id(&self) -> &str {
        "anonymous"
    }

    /// Handles a notification.
    async fn process(&self, notification: &N) -> ProcessorResult;
}

/// A shared processor.
pub type SharedProcessor<N> = Arc<dyn Processor<N>>;

/// Wrapper for closure-based processors.
///
/// The closure receives an owned copy of the notification.
///
/// ```rust,ignore
/// let processor = FnProcessor::new("reports", |report: ReportNotification| async move {
///     println!("{:?} -> {}", report.msg_id, report.status);
///     Ok(())
/// });
/// ```
pub struct FnProcessor<F> {
    id: String,
    handler: F,
}

impl<F> FnProcessor<F> {
    /// Creates a new function processor.
    pub fn new(id: impl Into<String>, handler: F) -> Self {
        Self {
            id: id.into(),
            handler,
        }
    }
}

#[async_trait]
impl<N, F, Fut> Processor<N> for FnProcessor<F>
where
    N: DecodedNotification + Clone,
    F: Fn(N) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ProcessorResult> + Send + 'static,
{
    fn id(&self) -> &str {
        &self.id
    }

    async fn process(&self, notification: &N) -> ProcessorResult {
        (self.handler)(notification.clone()).await
    }
}

/// Processor that logs the raw payload and accepts it.
///
/// Installed for every kind the application does not configure.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingProcessor;

#[async_trait]
impl<N: DecodedNotification> Processor<N> for LoggingProcessor {
    fn id(&self) -> &str {
        "logging"
    }

    async fn process(&self, notification: &N) -> ProcessorResult {
        tracing::info!(kind = %N::KIND, payload = notification.raw_json(), "Notification received");
        Ok(())
    }
}

/// The processor registered for each notification kind.
///
/// An empty slot means notifications of that kind are accepted and discarded.
#[derive(Clone, Default)]
pub struct Processors {
    pub reply: Option<SharedProcessor<ReplyNotification>>,
    pub report: Option<SharedProcessor<ReportNotification>>,
    pub template_audit: Option<SharedProcessor<TemplateAuditNotification>>,
    pub signature_audit: Option<SharedProcessor<SignatureAuditNotification>>,
}

impl Processors {
    /// No processors; every notification is discarded after authentication.
    pub fn none() -> Self {
        Self::default()
    }

    /// `LoggingProcessor` for every kind.
    pub fn logging() -> Self {
        Self {
            reply: Some(Arc::new(LoggingProcessor)),
            report: Some(Arc::new(LoggingProcessor)),
            template_audit: Some(Arc::new(LoggingProcessor)),
            signature_audit: Some(Arc::new(LoggingProcessor)),
        }
    }

    /// Returns true if a processor is registered for `kind`.
    pub fn is_registered(&self, kind: NotificationKind) -> bool {
        match kind {
            NotificationKind::Reply => self.reply.is_some(),
            NotificationKind::Report => self.report.is_some(),
            NotificationKind::TemplateAudit => self.template_audit.is_some(),
            NotificationKind::SignatureAudit => self.signature_audit.is_some(),
        }
    }
}

impl std::fmt::Debug for Processors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Processors")
            .field("reply", &self.reply.as_ref().map(|p| p.id().to_string()))
            .field("report", &self.report.as_ref().map(|p| p.id().to_string()))
            .field(
                "template_audit",
                &self.template_audit.as_ref().map(|p| p.id().to_string()),
            )
            .field(
                "signature_audit",
                &self.signature_audit.as_ref().map(|p| p.id().to_string()),
            )
            .finish()
    }
}
