//! HTTP listener lifecycle.

use axum::Router;
use axum::extract::Request;
use axum::response::Response;
use pushsms_core::Credentials;
use std::future::Future;
use tokio::net::TcpListener;
use tower::ServiceExt;
use tracing::Span;

use crate::builder::CallbackServerBuilder;
use crate::config::CallbackConfig;
use crate::dispatcher::Dispatcher;
use crate::error::CallbackResult;

/// A configured callback listener.
///
/// Created through [`CallbackServer::builder`]. The server can either own a
/// listener (`run`, `run_until`, `serve`) or be embedded in a host
/// application through `router` or `handle`.
pub struct CallbackServer {
    config: CallbackConfig,
    dispatcher: Dispatcher,
    router: Router,
    handler: Option<Router>,
    logger: Span,
}

impl CallbackServer {
    /// Starts building a server for the given application credentials.
    pub fn builder(credentials: Credentials) -> CallbackServerBuilder {
        CallbackServerBuilder::new(credentials)
    }

    pub(crate) fn new(
        config: CallbackConfig,
        dispatcher: Dispatcher,
        logger: Span,
        handler: Option<Router>,
    ) -> Self {
        let router = Router::new().route(&config.path, dispatcher.method_router());
        Self {
            config,
            dispatcher,
            router,
            handler,
            logger,
        }
    }

    pub fn config(&self) -> &CallbackConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Returns a router serving the callback endpoint at the configured path.
    ///
    /// Merge or nest it into a host router to share a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Handles a single request as the callback endpoint would.
    pub async fn handle(&self, request: Request) -> Response {
        match self.router.clone().oneshot(request).await {
            Ok(response) => response,
            Err(infallible) => match infallible {},
        }
    }

    /// Binds the configured address and serves until the process is stopped.
    pub async fn run(&self) -> CallbackResult<()> {
        self.run_until(std::future::pending()).await
    }

    /// Binds the configured address and serves until `shutdown` resolves.
    ///
    /// In-flight requests are allowed to finish before this returns.
    pub async fn run_until<F>(&self, shutdown: F) -> CallbackResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.bind_addr();
        let listener = TcpListener::bind(&addr).await.inspect_err(|e| {
            tracing::error!(
                parent: &self.logger,
                addr = %addr,
                error = %e,
                "Failed to bind callback listener"
            );
        })?;
        self.serve(listener, shutdown).await
    }

    /// Serves on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> CallbackResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local_addr = listener.local_addr()?;
        let app = self.handler.clone().unwrap_or_else(|| self.router());

        tracing::info!(
            parent: &self.logger,
            addr = %local_addr,
            path = %self.config.path,
            custom_handler = self.handler.is_some(),
            "Callback server listening"
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!(parent: &self.logger, "Callback server stopped");
        Ok(())
    }
}

impl std::fmt::Debug for CallbackServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackServer")
            .field("config", &self.config)
            .field("dispatcher", &self.dispatcher)
            .field("custom_handler", &self.handler.is_some())
            .finish()
    }
}
