//! Inbound notification dispatch.
//!
//! `GET` answers the vendor's echo challenge. `POST` carries one notification:
//! the signature is checked first, then the type tag is classified, and only
//! then is the payload decoded and handed to the registered processor.

use axum::extract::rejection::{FormRejection, QueryRejection};
use axum::extract::{Form, Query, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{MethodRouter, get};
use futures_util::FutureExt;
use pushsms_core::Credentials;
use serde::Deserialize;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{Instrument, Span, debug, error, warn};

use crate::error::{CallbackError, CallbackResult};
use crate::notification::{DecodedNotification, NotificationKind};
use crate::processor::{Processor, Processors};
use crate::signature::SignatureVerifier;

/// Form fields of one notification POST.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Envelope {
    /// Random token, part of the signature input.
    pub nonce: Option<String>,
    /// Vendor clock string, part of the signature input. Never parsed.
    pub timestamp: Option<String>,
    /// Lowercase hex SHA-1 signature.
    pub signature: Option<String>,
    /// Notification type tag.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Type-specific JSON payload.
    pub data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChallengeQuery {
    echostr: Option<String>,
}

/// What happened to an authenticated notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    /// Decoded and handled by the registered processor.
    Processed(NotificationKind),
    /// No processor registered; accepted without decoding.
    Discarded(NotificationKind),
}

/// Authenticates, classifies and routes inbound notifications.
///
/// Cloning is cheap; all clones share the same credentials and processors.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    verifier: SignatureVerifier,
    processors: Processors,
    logger: Span,
}

impl Dispatcher {
    /// Creates a dispatcher.
    ///
    /// Request spans are created as children of `logger`.
    pub fn new(credentials: Credentials, processors: Processors, logger: Span) -> Self {
        Self {
            inner: Arc::new(DispatcherInner {
                verifier: SignatureVerifier::new(credentials),
                processors,
                logger,
            }),
        }
    }

    /// Returns the registered processors.
    pub fn processors(&self) -> &Processors {
        &self.inner.processors
    }

    /// Answers the endpoint-ownership challenge by echoing the token.
    pub fn challenge(&self, echostr: Option<&str>) -> CallbackResult<String> {
        match echostr {
            Some(token) if !token.is_empty() => Ok(token.to_string()),
            _ => Err(CallbackError::validation("echostr")),
        }
    }

    /// Handles one notification envelope.
    ///
    /// Nothing is decoded before the signature has been verified.
    pub async fn notify(&self, envelope: &Envelope) -> CallbackResult<Dispatched> {
        let nonce = envelope.nonce.as_deref().unwrap_or_default();
        let timestamp = envelope.timestamp.as_deref().unwrap_or_default();
        let signature = envelope.signature.as_deref().unwrap_or_default();

        if !self.inner.verifier.verify(nonce, timestamp, signature) {
            warn!(nonce, timestamp, "Callback signature mismatch");
            return Err(CallbackError::Authentication);
        }

        let tag = envelope
            .kind
            .as_deref()
            .filter(|tag| !tag.is_empty())
            .ok_or_else(|| CallbackError::validation("type"))?;
        let kind = tag
            .parse::<NotificationKind>()
            .inspect_err(|_| warn!(tag, "Unsupported notification type"))?;
        Span::current().record("kind", kind.as_str());

        let data = envelope.data.as_deref().unwrap_or_default();
        let processors = &self.inner.processors;
        match kind {
            NotificationKind::Reply => invoke(processors.reply.as_deref(), data).await,
            NotificationKind::Report => invoke(processors.report.as_deref(), data).await,
            NotificationKind::TemplateAudit => {
                invoke(processors.template_audit.as_deref(), data).await
            }
            NotificationKind::SignatureAudit => {
                invoke(processors.signature_audit.as_deref(), data).await
            }
        }
    }

    /// Builds the method router serving this dispatcher.
    ///
    /// `GET` and `POST` are handled; every other method gets 405.
    pub fn method_router<S>(&self) -> MethodRouter<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        get(challenge_handler)
            .post(notify_handler)
            .fallback(method_not_allowed)
            .with_state(self.clone())
    }

    fn request_span(&self, method: &Method) -> Span {
        tracing::info_span!(
            parent: &self.inner.logger,
            "callback_request",
            method = %method,
            kind = tracing::field::Empty,
        )
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("processors", &self.inner.processors)
            .finish_non_exhaustive()
    }
}

/// Decodes `data` and runs the processor, if one is registered.
async fn invoke<N: DecodedNotification>(
    processor: Option<&dyn Processor<N>>,
    data: &str,
) -> CallbackResult<Dispatched> {
    let Some(processor) = processor else {
        debug!(kind = %N::KIND, "No processor registered, discarding notification");
        return Ok(Dispatched::Discarded(N::KIND));
    };

    let notification = N::decode(data).inspect_err(|e| {
        warn!(kind = %N::KIND, raw = %e.raw, reason = %e.reason, "Failed to decode notification");
    })?;

    match AssertUnwindSafe(processor.process(&notification))
        .catch_unwind()
        .await
    {
        Ok(Ok(())) => {
            debug!(kind = %N::KIND, processor = processor.id(), "Notification processed");
            Ok(Dispatched::Processed(N::KIND))
        }
        Ok(Err(e)) => {
            error!(kind = %N::KIND, processor = processor.id(), error = %e, "Processor failed");
            Err(CallbackError::Processor {
                kind: N::KIND,
                message: e.to_string(),
            })
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            error!(
                kind = %N::KIND,
                processor = processor.id(),
                panic = %message,
                "Processor panicked"
            );
            Err(CallbackError::Processor {
                kind: N::KIND,
                message: format!("panicked: {message}"),
            })
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

async fn challenge_handler(
    State(dispatcher): State<Dispatcher>,
    query: Result<Query<ChallengeQuery>, QueryRejection>,
) -> Response {
    let span = dispatcher.request_span(&Method::GET);
    async move {
        let echostr = query.ok().and_then(|Query(q)| q.echostr);
        match dispatcher.challenge(echostr.as_deref()) {
            Ok(token) => {
                debug!("Answered echo challenge");
                (StatusCode::OK, token).into_response()
            }
            Err(e) => {
                warn!(error = %e, "Rejected echo challenge");
                e.into_response()
            }
        }
    }
    .instrument(span)
    .await
}

async fn notify_handler(
    State(dispatcher): State<Dispatcher>,
    form: Result<Form<Envelope>, FormRejection>,
) -> Response {
    let span = dispatcher.request_span(&Method::POST);
    async move {
        let envelope = match form {
            Ok(Form(envelope)) => envelope,
            Err(rejection) => {
                warn!(error = %rejection, "Malformed callback body");
                return CallbackError::validation("body").into_response();
            }
        };

        match dispatcher.notify(&envelope).await {
            Ok(_) => (StatusCode::OK, "success").into_response(),
            Err(e) => e.into_response(),
        }
    }
    .instrument(span)
    .await
}

async fn method_not_allowed(method: Method) -> Response {
    let body = serde_json::json!({
        "error": format!("Method {method} not allowed"),
        "code": StatusCode::METHOD_NOT_ALLOWED.as_u16()
    });
    let mut response = (StatusCode::METHOD_NOT_ALLOWED, axum::Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::ALLOW, HeaderValue::from_static("GET, POST"));
    response
}
