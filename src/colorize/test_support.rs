//! Shared fixtures for async display tests

use super::error::{DisplayError, Result};
use crate::host::{Feature, GetFeaturesArgs, RpcChannel, TrackConfig, ViewState};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::json;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

type Reply = oneshot::Sender<Result<Vec<Feature>>>;

/// Remote call channel whose replies are released by the test
///
/// Each call parks on a oneshot channel; `resolve(i, ..)` answers the
/// `i`-th call, in any order.
#[derive(Default)]
pub(crate) struct MockRpc {
    calls: Mutex<Vec<(String, GetFeaturesArgs)>>,
    replies: Mutex<Vec<Option<Reply>>>,
}

impl MockRpc {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) fn method(&self, index: usize) -> String {
        self.calls.lock().unwrap()[index].0.clone()
    }

    pub(crate) fn args(&self, index: usize) -> GetFeaturesArgs {
        self.calls.lock().unwrap()[index].1.clone()
    }

    pub(crate) fn resolve(&self, index: usize, result: Result<Vec<Feature>>) {
        let reply = self.replies.lock().unwrap()[index]
            .take()
            .expect("call already resolved");
        // The caller may be gone (stopped controller); that is fine
        let _ = reply.send(result);
    }
}

impl RpcChannel for MockRpc {
    fn call(
        &self,
        _session_id: &str,
        method: &str,
        args: GetFeaturesArgs,
    ) -> BoxFuture<'static, Result<Vec<Feature>>> {
        let (tx, rx) = oneshot::channel();
        self.calls.lock().unwrap().push((method.to_string(), args));
        self.replies.lock().unwrap().push(Some(tx));
        rx.map(|reply| reply.unwrap_or(Err(DisplayError::Cancelled)))
            .boxed()
    }
}

/// Let spawned tasks on the current-thread runtime run to their next await
pub(crate) async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

/// Feature with a `name` attribute
pub(crate) fn named(id: &str, name: &str) -> Feature {
    Feature::new(id).with_attribute("name", name)
}

/// Track with a GFF3 adapter
pub(crate) fn gene_track() -> TrackConfig {
    TrackConfig::new("genes").with_slot("adapter", json!({"type": "Gff3TabixAdapter"}))
}

/// Initialized view showing one block of the gene track
pub(crate) fn ready_view(locstring: &str) -> ViewState {
    let region = locstring.parse().expect("valid locstring");
    ViewState::ready(vec![region], gene_track())
}
