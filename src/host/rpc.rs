//! Remote call channel used to fetch features off the main thread

use super::feature::Feature;
use super::view::Region;
use crate::colorize::error::Result;
use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;

/// Remote method returning the features overlapping a set of regions
pub const CORE_GET_FEATURES: &str = "CoreGetFeatures";

/// Arguments of a `CoreGetFeatures` call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetFeaturesArgs {
    pub adapter_config: Value,
    pub session_id: String,
    pub regions: Vec<Region>,
}

/// Channel to the browser's remote call manager
///
/// Implementations hand back a future that owns everything it needs, so the
/// caller can await it on a spawned task. Timeouts are the channel's concern.
pub trait RpcChannel: Send + Sync {
    fn call(
        &self,
        session_id: &str,
        method: &str,
        args: GetFeaturesArgs,
    ) -> BoxFuture<'static, Result<Vec<Feature>>>;
}
