//! Reactive fetch controller
//!
//! Keeps the display's feature snapshot in step with the view. One tokio
//! task watches the published `ViewState`; every change re-runs the fetch
//! step from the top:
//!
//! 1. view not initialized → nothing is fetched, state is left alone
//! 2. otherwise read the visible blocks and the adapter of the display's own
//!    track and issue one `CoreGetFeatures` call
//! 3. on success overwrite the snapshot, on failure fill the error slot
//!
//! Fetches run concurrently with the watch loop inside the same task, so
//! state is only ever written from here. Every re-run bumps a generation
//! counter; with `StaleFetchPolicy::Discard` a completion belonging to an
//! older generation is dropped instead of overwriting newer data.

use super::error::{DisplayError, Result};
use super::state::DisplayState;
use crate::host::{Feature, GetFeaturesArgs, RpcChannel, ViewState, CORE_GET_FEATURES};
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, instrument, warn};

/// How completions of superseded fetches are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StaleFetchPolicy {
    /// Only the most recently issued fetch may write state
    #[default]
    Discard,
    /// Whichever fetch resolves last wins, even an outdated one
    LastWriterWins,
}

impl StaleFetchPolicy {
    /// Parse from string value (validation happens in the property reader)
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "last-writer-wins" => Self::LastWriterWins,
            _ => Self::Discard,
        }
    }
}

/// One remote feature request derived from the view
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub session_id: String,
    pub args: GetFeaturesArgs,
}

impl FetchRequest {
    /// Derive the request of track `track_id` for the current view
    ///
    /// Returns `Ok(None)` while the view is not initialized.
    pub fn from_view(view: &ViewState, track_id: &str) -> Result<Option<Self>> {
        if !view.initialized {
            return Ok(None);
        }

        let track = view
            .track(track_id)
            .ok_or_else(|| DisplayError::MissingTrack(track_id.to_string()))?;
        let adapter_config = track
            .get_conf("adapter")
            .filter(|adapter| !adapter.is_null())
            .cloned()
            .ok_or_else(|| DisplayError::MissingAdapter(track.track_id.clone()))?;
        let session_id = track.rpc_session_id();

        Ok(Some(FetchRequest {
            session_id: session_id.clone(),
            args: GetFeaturesArgs {
                adapter_config,
                session_id,
                regions: view.content_blocks.clone(),
            },
        }))
    }
}

type InFlight = BoxFuture<'static, (u64, Result<Vec<Feature>>)>;

/// Handle to the running controller task
///
/// Dropping the handle stops the task; in-flight fetches are abandoned.
pub struct FetchController {
    handle: JoinHandle<()>,
}

impl FetchController {
    /// Start fetching for track `track_id` of `view`, publishing into `state`
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        view: watch::Receiver<ViewState>,
        track_id: impl Into<String>,
        rpc: Arc<dyn RpcChannel>,
        state: Arc<watch::Sender<DisplayState>>,
        policy: StaleFetchPolicy,
    ) -> Self {
        let controller = Controller {
            track_id: track_id.into(),
            rpc,
            state,
            policy,
            generation: 0,
            last_request: None,
            in_flight: FuturesUnordered::new(),
        };
        FetchController {
            handle: tokio::spawn(controller.run(view)),
        }
    }

    /// Stop the controller task
    pub fn stop(&self) {
        self.handle.abort();
    }

    /// True once the task has ended (view channel closed or stopped)
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for FetchController {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

struct Controller {
    track_id: String,
    rpc: Arc<dyn RpcChannel>,
    state: Arc<watch::Sender<DisplayState>>,
    policy: StaleFetchPolicy,
    /// Generation of the latest re-run
    generation: u64,
    /// Request issued by the latest re-run that fetched
    last_request: Option<FetchRequest>,
    in_flight: FuturesUnordered<InFlight>,
}

impl Controller {
    #[instrument(skip_all, name = "fetch_controller", fields(track = %self.track_id))]
    async fn run(mut self, view: watch::Receiver<ViewState>) {
        let mut changes = WatchStream::new(view);

        loop {
            tokio::select! {
                change = changes.next() => match change {
                    Some(view) => self.rerun(&view),
                    None => {
                        debug!("view channel closed, stopping");
                        break;
                    }
                },
                Some((generation, result)) = self.in_flight.next(), if !self.in_flight.is_empty() => {
                    self.complete(generation, result);
                }
            }
        }
    }

    /// One evaluation of the fetch step for a newly observed view
    fn rerun(&mut self, view: &ViewState) {
        match FetchRequest::from_view(view, &self.track_id) {
            Ok(None) => {
                debug!("view not initialized, skipping fetch");
                self.generation += 1;
                self.last_request = None;
            }
            Ok(Some(request)) if self.last_request.as_ref() == Some(&request) => {
                debug!("fetch inputs unchanged, keeping current fetch");
            }
            Ok(Some(request)) => {
                self.generation += 1;
                let generation = self.generation;
                debug!(
                    generation,
                    session_id = %request.session_id,
                    regions = request.args.regions.len(),
                    "fetching features"
                );

                let call = self
                    .rpc
                    .call(&request.session_id, CORE_GET_FEATURES, request.args.clone());
                self.in_flight
                    .push(call.map(move |result| (generation, result)).boxed());
                self.last_request = Some(request);
            }
            Err(e) => {
                warn!(error = %e, "cannot fetch features for view");
                self.generation += 1;
                self.last_request = None;
                self.state.send_modify(|state| state.set_error(e));
            }
        }
    }

    /// Apply the outcome of a finished fetch
    fn complete(&mut self, generation: u64, result: Result<Vec<Feature>>) {
        if self.policy == StaleFetchPolicy::Discard && generation != self.generation {
            debug!(
                generation,
                latest = self.generation,
                "discarding stale fetch result"
            );
            return;
        }

        match result {
            Ok(feats) => {
                info!(generation, count = feats.len(), "features fetched");
                self.state.send_modify(|state| state.set_feats(feats));
            }
            Err(e) => {
                warn!(generation, error = %e, "feature fetch failed");
                self.state.send_modify(|state| state.set_error(e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colorize::test_support::{gene_track, named, ready_view, settle, MockRpc};
    use crate::host::{Region, TrackConfig};
    use serde_json::json;

    fn names(state: &DisplayState) -> Vec<String> {
        state
            .feats()
            .map(|feats| {
                feats
                    .iter()
                    .filter_map(|f| f.get("name").and_then(|v| v.as_str()).map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }

    struct Harness {
        view: watch::Sender<ViewState>,
        state: watch::Receiver<DisplayState>,
        rpc: Arc<MockRpc>,
        controller: FetchController,
    }

    fn start(initial: ViewState, policy: StaleFetchPolicy) -> Harness {
        let (view_tx, view_rx) = watch::channel(initial);
        let (state_tx, state_rx) = watch::channel(DisplayState::default());
        let rpc = MockRpc::new();
        let controller =
            FetchController::spawn(view_rx, "genes", rpc.clone(), Arc::new(state_tx), policy);
        Harness {
            view: view_tx,
            state: state_rx,
            rpc,
            controller,
        }
    }

    #[test]
    fn test_request_from_uninitialized_view() {
        assert_eq!(FetchRequest::from_view(&ViewState::default(), "genes"), Ok(None));
    }

    #[test]
    fn test_request_from_ready_view() {
        let view = ready_view("ctgA:1-1000");
        let request = FetchRequest::from_view(&view, "genes").unwrap().unwrap();

        assert_eq!(request.session_id, "genes");
        assert_eq!(request.args.session_id, "genes");
        assert_eq!(request.args.adapter_config, json!({"type": "Gff3TabixAdapter"}));
        assert_eq!(request.args.regions, vec![Region::new("", "ctgA", 1, 1000)]);
    }

    #[test]
    fn test_request_without_track_or_adapter() {
        let view = ViewState {
            initialized: true,
            ..Default::default()
        };
        assert_eq!(
            FetchRequest::from_view(&view, "genes"),
            Err(DisplayError::MissingTrack("genes".into()))
        );

        let view = ViewState::ready(vec![], TrackConfig::new("bare"));
        assert_eq!(
            FetchRequest::from_view(&view, "bare"),
            Err(DisplayError::MissingAdapter("bare".into()))
        );
    }

    #[test]
    fn test_request_uses_own_track_among_several() {
        let mut view = ViewState::ready(
            vec![Region::new("", "ctgA", 1, 1000)],
            TrackConfig::new("repeats").with_slot("adapter", json!({"type": "BigBedAdapter"})),
        );
        view.tracks.push(gene_track());

        let request = FetchRequest::from_view(&view, "genes").unwrap().unwrap();
        assert_eq!(request.session_id, "genes");
        assert_eq!(request.args.adapter_config, json!({"type": "Gff3TabixAdapter"}));

        let request = FetchRequest::from_view(&view, "repeats").unwrap().unwrap();
        assert_eq!(request.args.adapter_config, json!({"type": "BigBedAdapter"}));

        // Own track removed from the view
        assert_eq!(
            FetchRequest::from_view(&view, "variants"),
            Err(DisplayError::MissingTrack("variants".into()))
        );
    }

    #[test]
    fn test_stale_policy_parse() {
        assert_eq!(StaleFetchPolicy::parse("discard"), StaleFetchPolicy::Discard);
        assert_eq!(
            StaleFetchPolicy::parse("Last-Writer-Wins"),
            StaleFetchPolicy::LastWriterWins
        );
        assert_eq!(StaleFetchPolicy::parse(""), StaleFetchPolicy::Discard);
    }

    #[tokio::test]
    async fn test_no_fetch_until_initialized() {
        let mut h = start(ViewState::default(), StaleFetchPolicy::Discard);
        settle().await;

        assert_eq!(h.rpc.call_count(), 0);
        assert!(h.state.borrow().feats().is_none());

        h.view.send_replace(ready_view("ctgA:1-1000"));
        settle().await;
        assert_eq!(h.rpc.call_count(), 1);
        assert_eq!(h.rpc.method(0), CORE_GET_FEATURES);

        h.rpc.resolve(0, Ok(vec![named("1", "gene1")]));
        settle().await;
        assert!(h.state.has_changed().unwrap());
        assert_eq!(names(&h.state.borrow_and_update()), ["gene1"]);
    }

    #[tokio::test]
    async fn test_failure_sets_error_and_keeps_snapshot() {
        let h = start(ready_view("ctgA:1-1000"), StaleFetchPolicy::Discard);
        settle().await;
        h.rpc.resolve(0, Ok(vec![named("1", "gene1")]));
        settle().await;

        h.view.send_replace(ready_view("ctgA:1000-2000"));
        settle().await;
        h.rpc.resolve(1, Err(DisplayError::Rpc("adapter exploded".into())));
        settle().await;

        let state = h.state.borrow();
        assert_eq!(state.error(), Some(&DisplayError::Rpc("adapter exploded".into())));
        assert_eq!(names(&state), ["gene1"]);
    }

    #[tokio::test]
    async fn test_missing_track_reported_as_error() {
        let view = ViewState {
            initialized: true,
            ..Default::default()
        };
        let h = start(view, StaleFetchPolicy::Discard);
        settle().await;

        assert_eq!(h.rpc.call_count(), 0);
        assert_eq!(
            h.state.borrow().error(),
            Some(&DisplayError::MissingTrack("genes".into()))
        );
    }

    #[tokio::test]
    async fn test_all_visible_blocks_requested_in_order() {
        let blocks = vec![
            Region::new("volvox", "ctgA", 0, 5000),
            Region::new("volvox", "ctgB", 100, 900),
            Region::new("volvox", "ctgA", 8000, 9000),
        ];
        let h = start(
            ViewState::ready(blocks.clone(), gene_track()),
            StaleFetchPolicy::Discard,
        );
        settle().await;

        assert_eq!(h.rpc.call_count(), 1);
        assert_eq!(h.rpc.args(0).regions, blocks);

        h.rpc.resolve(0, Ok(vec![named("1", "a"), named("2", "b")]));
        settle().await;
        assert_eq!(names(&h.state.borrow()), ["a", "b"]);
    }

    #[tokio::test]
    async fn test_unchanged_inputs_coalesced() {
        let h = start(ready_view("ctgA:1-1000"), StaleFetchPolicy::Discard);
        settle().await;

        // Same regions and adapter published again
        h.view.send_replace(ready_view("ctgA:1-1000"));
        settle().await;
        assert_eq!(h.rpc.call_count(), 1);

        h.view.send_replace(ready_view("ctgA:1-2000"));
        settle().await;
        assert_eq!(h.rpc.call_count(), 2);
    }

    #[tokio::test]
    async fn test_stale_result_discarded() {
        let h = start(ready_view("ctgA:1-1000"), StaleFetchPolicy::Discard);
        settle().await;
        h.view.send_replace(ready_view("ctgA:5000-6000"));
        settle().await;
        assert_eq!(h.rpc.call_count(), 2);

        // Newer fetch resolves first, then the outdated one
        h.rpc.resolve(1, Ok(vec![named("2", "new")]));
        settle().await;
        h.rpc.resolve(0, Ok(vec![named("1", "old")]));
        settle().await;

        assert_eq!(names(&h.state.borrow()), ["new"]);
    }

    #[tokio::test]
    async fn test_stale_result_wins_when_configured() {
        let h = start(ready_view("ctgA:1-1000"), StaleFetchPolicy::LastWriterWins);
        settle().await;
        h.view.send_replace(ready_view("ctgA:5000-6000"));
        settle().await;

        h.rpc.resolve(1, Ok(vec![named("2", "new")]));
        settle().await;
        h.rpc.resolve(0, Ok(vec![named("1", "old")]));
        settle().await;

        assert_eq!(names(&h.state.borrow()), ["old"]);
    }

    #[tokio::test]
    async fn test_uninitialized_rerun_leaves_state_and_refetches_after() {
        let h = start(ready_view("ctgA:1-1000"), StaleFetchPolicy::Discard);
        settle().await;
        h.rpc.resolve(0, Ok(vec![named("1", "gene1")]));
        settle().await;
        let version = h.state.borrow().version();

        h.view.send_replace(ViewState::default());
        settle().await;
        assert_eq!(h.state.borrow().version(), version);
        assert_eq!(names(&h.state.borrow()), ["gene1"]);

        // Same inputs as before the reset still trigger a fresh fetch
        h.view.send_replace(ready_view("ctgA:1-1000"));
        settle().await;
        assert_eq!(h.rpc.call_count(), 2);
    }

    #[tokio::test]
    async fn test_controller_stops_when_view_dropped() {
        let h = start(ViewState::default(), StaleFetchPolicy::Discard);
        settle().await;
        drop(h.view);
        settle().await;
        assert!(h.controller.is_finished());
    }

    #[tokio::test]
    async fn test_stopped_controller_ignores_results() {
        let h = start(ready_view("ctgA:1-1000"), StaleFetchPolicy::Discard);
        settle().await;
        h.controller.stop();
        settle().await;

        h.rpc.resolve(0, Ok(vec![named("1", "gene1")]));
        settle().await;
        assert!(h.state.borrow().feats().is_none());
    }
}
