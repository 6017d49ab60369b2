//! Fetch-handler registration with supersede semantics.
//!
//! One handler is installed per session and keeps serving until a newer
//! version replaces it. When that happens the host's reload hook fires
//! once, so no page keeps running against a mix of handler versions.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::fetch::{FetchError, Fetcher, Request, Response};

struct Installed {
    version: String,
    handler: Arc<dyn Fetcher>,
}

/// The single interception point between the application and the network.
///
/// Requests resolve against the currently installed handler; with none
/// installed they fall through to the plain network transport.
#[derive(Clone)]
pub struct Gateway {
    network: Arc<dyn Fetcher>,
    installed: Arc<RwLock<Option<Installed>>>,
}

impl Gateway {
    pub fn new(network: Arc<dyn Fetcher>) -> Self {
        Self {
            network,
            installed: Arc::new(RwLock::new(None)),
        }
    }

    /// Install a handler version. Replacing a live handler of a different
    /// version invokes `on_supersede` exactly once; the first install and
    /// same-version reinstalls never do.
    pub async fn install(
        &self,
        version: impl Into<String>,
        handler: Arc<dyn Fetcher>,
        on_supersede: impl FnOnce(),
    ) {
        let version = version.into();
        let mut installed = self.installed.write().await;
        let superseding = installed
            .as_ref()
            .is_some_and(|previous| previous.version != version);

        tracing::info!(version = %version, superseding, "Installing fetch handler");
        *installed = Some(Installed { version, handler });
        drop(installed);

        if superseding {
            on_supersede();
        }
    }

    pub async fn installed_version(&self) -> Option<String> {
        self.installed
            .read()
            .await
            .as_ref()
            .map(|i| i.version.clone())
    }
}

#[async_trait]
impl Fetcher for Gateway {
    async fn fetch(&self, request: Request) -> Result<Response, FetchError> {
        let handler = {
            let installed = self.installed.read().await;
            installed.as_ref().map(|i| i.handler.clone())
        };
        match handler {
            Some(handler) => handler.fetch(request).await,
            None => self.network.fetch(request).await,
        }
    }
}
