//! Builder for callback servers.

use axum::Router;
use pushsms_core::Credentials;
use std::sync::Arc;
use tracing::Span;

use crate::config::{CallbackConfig, DEFAULT_ADDR, DEFAULT_PATH};
use crate::dispatcher::Dispatcher;
use crate::error::{CallbackError, CallbackResult};
use crate::notification::{
    DecodedNotification, NotificationKind, ReplyNotification, ReportNotification,
    SignatureAuditNotification, TemplateAuditNotification,
};
use crate::processor::{LoggingProcessor, Processor, Processors, SharedProcessor};
use crate::server::CallbackServer;

/// What to install for one notification kind.
enum Slot<N: DecodedNotification> {
    /// `LoggingProcessor`.
    Default,
    Custom(SharedProcessor<N>),
    /// Accept and discard.
    Disabled,
}

impl<N: DecodedNotification> Slot<N> {
    fn resolve(self) -> Option<SharedProcessor<N>> {
        match self {
            Slot::Default => Some(Arc::new(LoggingProcessor)),
            Slot::Custom(processor) => Some(processor),
            Slot::Disabled => None,
        }
    }
}

/// Builder for [`CallbackServer`].
///
/// # Example
///
/// ```rust,ignore
/// let server = CallbackServer::builder(Credentials::new("app-key", "secret"))
///     .addr("127.0.0.1:8088")
///     .report_processor(FnProcessor::new("reports", |report: ReportNotification| async move {
///         tracing::info!(msg_id = ?report.msg_id, status = report.status, "delivered");
///         Ok(())
///     }))
///     .disable(NotificationKind::TemplateAudit)
///     .build()?;
/// server.run().await?;
/// ```
pub struct CallbackServerBuilder {
    credentials: Credentials,
    addr: Option<String>,
    path: Option<String>,
    logger: Option<Span>,
    handler: Option<Router>,
    reply: Slot<ReplyNotification>,
    report: Slot<ReportNotification>,
    template_audit: Slot<TemplateAuditNotification>,
    signature_audit: Slot<SignatureAuditNotification>,
}

impl CallbackServerBuilder {
    /// Creates a builder with default address, path and logging processors.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            addr: None,
            path: None,
            logger: None,
            handler: None,
            reply: Slot::Default,
            report: Slot::Default,
            template_audit: Slot::Default,
            signature_audit: Slot::Default,
        }
    }

    /// Applies address and path from a config value.
    pub fn config(mut self, config: CallbackConfig) -> Self {
        self.addr = Some(config.addr);
        self.path = Some(config.path);
        self
    }

    /// Sets the listen address (`host:port` or `:port`).
    pub fn addr(mut self, addr: impl Into<String>) -> Self {
        self.addr = Some(addr.into());
        self
    }

    /// Sets the callback path.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the span all request spans and server logs are parented to.
    pub fn logger(mut self, logger: Span) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Serves `router` from `run` instead of the built-in dispatcher router.
    ///
    /// The override is expected to mount [`CallbackServer::handle`] or
    /// [`Dispatcher::method_router`] itself.
    pub fn handler(mut self, router: Router) -> Self {
        self.handler = Some(router);
        self
    }

    /// Registers the `SMS_REPLY` processor.
    pub fn reply_processor(
        mut self,
        processor: impl Processor<ReplyNotification> + 'static,
    ) -> Self {
        self.reply = Slot::Custom(Arc::new(processor));
        self
    }

    /// Registers the `SMS_REPORT` processor.
    pub fn report_processor(
        mut self,
        processor: impl Processor<ReportNotification> + 'static,
    ) -> Self {
        self.report = Slot::Custom(Arc::new(processor));
        self
    }

    /// Registers the `SMS_TEMPLATE` processor.
    pub fn template_audit_processor(
        mut self,
        processor: impl Processor<TemplateAuditNotification> + 'static,
    ) -> Self {
        self.template_audit = Slot::Custom(Arc::new(processor));
        self
    }

    /// Registers the `SMS_SIGN` processor.
    pub fn signature_audit_processor(
        mut self,
        processor: impl Processor<SignatureAuditNotification> + 'static,
    ) -> Self {
        self.signature_audit = Slot::Custom(Arc::new(processor));
        self
    }

    /// Accepts notifications of `kind` without decoding or processing them.
    pub fn disable(mut self, kind: NotificationKind) -> Self {
        match kind {
            NotificationKind::Reply => self.reply = Slot::Disabled,
            NotificationKind::Report => self.report = Slot::Disabled,
            NotificationKind::TemplateAudit => self.template_audit = Slot::Disabled,
            NotificationKind::SignatureAudit => self.signature_audit = Slot::Disabled,
        }
        self
    }

    /// Validates the configuration and builds the server.
    pub fn build(self) -> CallbackResult<CallbackServer> {
        self.credentials
            .validate()
            .map_err(|e| CallbackError::config(e.to_string()))?;

        let config = CallbackConfig {
            addr: self.addr.unwrap_or_else(|| DEFAULT_ADDR.to_string()),
            path: self.path.unwrap_or_else(|| DEFAULT_PATH.to_string()),
        };
        config.validate()?;

        let processors = Processors {
            reply: self.reply.resolve(),
            report: self.report.resolve(),
            template_audit: self.template_audit.resolve(),
            signature_audit: self.signature_audit.resolve(),
        };
        let logger = self
            .logger
            .unwrap_or_else(|| tracing::info_span!("sms_callback"));

        tracing::debug!(
            parent: &logger,
            addr = %config.addr,
            path = %config.path,
            processors = ?processors,
            "Built callback server"
        );

        let dispatcher = Dispatcher::new(self.credentials, processors, logger.clone());
        Ok(CallbackServer::new(config, dispatcher, logger, self.handler))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::{FnProcessor, ProcessorError};

    fn builder() -> CallbackServerBuilder {
        CallbackServerBuilder::new(Credentials::new("key", "secret"))
    }

    #[test]
    fn test_defaults() {
        let server = builder().build().unwrap();
        assert_eq!(server.config().addr, DEFAULT_ADDR);
        assert_eq!(server.config().path, DEFAULT_PATH);
        for kind in NotificationKind::ALL {
            assert!(server.dispatcher().processors().is_registered(kind));
        }
    }

    #[test]
    fn test_explicit_empty_values_are_errors() {
        assert!(matches!(
            builder().addr("").build(),
            Err(CallbackError::Configuration { .. })
        ));
        assert!(matches!(
            builder().path("").build(),
            Err(CallbackError::Configuration { .. })
        ));
        assert!(builder().path("no-slash").build().is_err());
        assert!(matches!(
            builder().path("/:token").build(),
            Err(CallbackError::Configuration { .. })
        ));
        assert!(matches!(
            builder().path("/hooks/*rest").build(),
            Err(CallbackError::Configuration { .. })
        ));
    }

    #[test]
    fn test_missing_credentials() {
        let result = CallbackServerBuilder::new(Credentials::new("", "secret")).build();
        assert!(matches!(result, Err(CallbackError::Configuration { .. })));
    }

    #[test]
    fn test_disable_and_custom() {
        let server = builder()
            .disable(NotificationKind::SignatureAudit)
            .report_processor(FnProcessor::new("reports", |_: ReportNotification| async {
                Ok::<(), ProcessorError>(())
            }))
            .build()
            .unwrap();

        let processors = server.dispatcher().processors();
        assert!(!processors.is_registered(NotificationKind::SignatureAudit));
        assert_eq!(processors.report.as_ref().map(|p| p.id()), Some("reports"));
        assert_eq!(processors.reply.as_ref().map(|p| p.id()), Some("logging"));
    }

    #[test]
    fn test_config_applies() {
        let server = builder()
            .config(CallbackConfig {
                addr: "127.0.0.1:9999".into(),
                path: "/sms/notify".into(),
            })
            .build()
            .unwrap();
        assert_eq!(server.config().addr, "127.0.0.1:9999");
        assert_eq!(server.config().path, "/sms/notify");
    }
}
