use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use crate::api::ToggleApi;
use crate::app::{Result, UttarError};
use crate::config::{CoalescePolicy, SyncConfig};
use crate::domain::{TargetKey, ToggleAck, TogglePatch, ToggleTarget};
use crate::sync::mutator::{apply_toggle, Inverse};
use crate::sync::reconcile::{acknowledge, on_failure, on_success, Reconciliation};
use crate::sync::registry::ToggleRegistry;

const NOTICE_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Folded into the trailing request of the call already in flight.
    Coalesced,
    /// Dropped because a request is in flight and repeat toggles are disabled.
    Suppressed,
    /// This call drove the exchange with the server until nothing was owed.
    Settled {
        requests: usize,
        last: Reconciliation,
        target: Option<ToggleTarget>,
    },
}

/// Non-blocking report of a failed toggle request.
#[derive(Debug, Clone)]
pub struct SyncNotice {
    pub key: TargetKey,
    pub message: String,
    pub rolled_back: bool,
    pub at: DateTime<Utc>,
}

/// One request about to go out.
#[derive(Debug, Clone, Copy)]
struct Flight {
    version: u64,
    desired: bool,
    /// Server state when the request left; restored if it fails.
    inverse: Inverse,
}

#[derive(Debug, Default)]
struct SyncState {
    registry: ToggleRegistry,
    /// Keys with a request on the wire. Kept across `forget` until the
    /// request resolves.
    in_flight: HashSet<TargetKey>,
    queued_retry: HashSet<TargetKey>,
    /// Last state the server confirmed per key, seeded on `track`.
    acknowledged: HashMap<TargetKey, Inverse>,
}

impl SyncState {
    fn begin_flight(&mut self, key: &TargetKey) -> Option<Flight> {
        let target = self.registry.get(key)?;
        let flight = Flight {
            version: target.version,
            desired: target.is_active,
            inverse: self.acknowledged.get(key).copied().unwrap_or(Inverse {
                is_active: !target.is_active,
                count: target.count,
            }),
        };
        self.registry.set(key, TogglePatch::pending(true));
        self.in_flight.insert(key.clone());
        Some(flight)
    }

    fn record_ack(&mut self, key: &TargetKey, ack: ToggleAck) {
        if let Some(previous) = self.acknowledged.get(key).copied() {
            self.acknowledged
                .insert(key.clone(), acknowledge(previous, key, ack));
        }
    }

    /// Decides what `key` still owes once its request has resolved.
    ///
    /// The toggle endpoint flips server state, so a trailing request only
    /// goes out when the latest local intent differs from what the server
    /// last confirmed. Otherwise the target settles on the confirmed state.
    fn follow_up(
        &mut self,
        key: &TargetKey,
        last: Reconciliation,
    ) -> (Reconciliation, Option<Flight>) {
        let retry = self.queued_retry.remove(key);
        let local = self.registry.get(key).map(|t| t.is_active);
        let confirmed = self.acknowledged.get(key).copied();

        let (Some(is_active), Some(confirmed)) = (local, confirmed) else {
            self.in_flight.remove(key);
            return (last, None);
        };

        if retry && is_active != confirmed.is_active {
            return (last, self.begin_flight(key));
        }

        let last = match last {
            Reconciliation::Superseded | Reconciliation::FailureSuperseded => {
                let mut patch = confirmed.patch();
                patch.pending = Some(false);
                self.registry.set(key, patch);
                Reconciliation::Adopted
            }
            other => other,
        };
        self.in_flight.remove(key);
        (last, None)
    }
}

/// Serializes toggle requests per target and keeps the registry consistent
/// with whatever the server answers.
///
/// At most one request per key is in flight. Toggles that arrive meanwhile
/// are applied locally and owe at most one trailing request, sent once the
/// in-flight one resolves if the latest state still differs from the server's.
pub struct SyncEngine {
    api: Arc<dyn ToggleApi + Send + Sync>,
    state: Mutex<SyncState>,
    request_timeout: Duration,
    policy: CoalescePolicy,
    notices: broadcast::Sender<SyncNotice>,
}

impl SyncEngine {
    pub fn new(api: Arc<dyn ToggleApi + Send + Sync>, config: &SyncConfig) -> Self {
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
        Self {
            api,
            state: Mutex::new(SyncState::default()),
            request_timeout: config.request_timeout(),
            policy: config.policy,
            notices,
        }
    }

    /// Starts tracking an entity from its server-loaded state.
    ///
    /// A key re-tracked while an older request is still out starts pending.
    pub fn track(&self, key: &TargetKey, is_active: bool, count: u64) -> ToggleTarget {
        let mut state = self.state();
        if state.registry.get(key).is_none() {
            state.registry.get_or_seed(key, is_active, count);
            state
                .acknowledged
                .insert(key.clone(), Inverse { is_active, count });
            if state.in_flight.contains(key) {
                state.registry.set(key, TogglePatch::pending(true));
            }
        }
        state.registry.get_or_seed(key, is_active, count).clone()
    }

    pub fn snapshot(&self, key: &TargetKey) -> Option<ToggleTarget> {
        self.state().registry.snapshot(key)
    }

    /// Stops tracking; a response still in flight for it will be ignored.
    pub fn forget(&self, key: &TargetKey) -> Option<ToggleTarget> {
        let mut state = self.state();
        state.queued_retry.remove(key);
        state.acknowledged.remove(key);
        state.registry.forget(key)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncNotice> {
        self.notices.subscribe()
    }

    /// Handles one user toggle of `key`.
    pub async fn toggle(&self, key: &TargetKey) -> Result<ToggleOutcome> {
        let mut flight = {
            let mut state = self.state();
            if state.registry.get(key).is_none() {
                return Err(UttarError::UntrackedTarget(key.to_string()));
            }
            let pending = state.in_flight.contains(key);

            if pending && self.policy == CoalescePolicy::DisableWhilePending {
                tracing::debug!("{} is pending, toggle suppressed", key);
                return Ok(ToggleOutcome::Suppressed);
            }

            let inverse = apply_toggle(&mut state.registry, key)
                .ok_or_else(|| UttarError::UntrackedTarget(key.to_string()))?;

            if pending {
                tracing::debug!("{} is pending, trailing request owed", key);
                state.queued_retry.insert(key.clone());
                return Ok(ToggleOutcome::Coalesced);
            }

            state.acknowledged.entry(key.clone()).or_insert(inverse);
            state
                .begin_flight(key)
                .ok_or_else(|| UttarError::UntrackedTarget(key.to_string()))?
        };

        let mut requests = 0;
        loop {
            requests += 1;
            tracing::debug!(
                "{} request #{} (version {}, desired {})",
                key,
                requests,
                flight.version,
                flight.desired
            );
            let result = self.dispatch(key).await;

            let (last, next) = {
                let mut state = self.state();
                let last = match result {
                    Ok(ack) => {
                        state.record_ack(key, ack);
                        on_success(&mut state.registry, key, flight.version, ack)
                    }
                    Err(e) => {
                        let last = on_failure(&mut state.registry, key, flight.version, flight.inverse);
                        self.notify(key, &e, last);
                        last
                    }
                };
                state.follow_up(key, last)
            };

            match next {
                Some(trailing) => flight = trailing,
                None => {
                    let target = self.snapshot(key);
                    tracing::info!("{} settled after {} request(s): {:?}", key, requests, last);
                    return Ok(ToggleOutcome::Settled {
                        requests,
                        last,
                        target,
                    });
                }
            }
        }
    }

    async fn dispatch(&self, key: &TargetKey) -> Result<ToggleAck> {
        match tokio::time::timeout(self.request_timeout, self.api.send(key)).await {
            Ok(result) => result,
            Err(_) => Err(UttarError::Timeout(self.request_timeout)),
        }
    }

    fn notify(&self, key: &TargetKey, error: &UttarError, outcome: Reconciliation) {
        let rolled_back = outcome == Reconciliation::RolledBack;
        tracing::warn!(
            "{} request failed ({}): {}",
            key,
            if rolled_back { "rolled back" } else { "kept newer state" },
            error
        );

        // No subscribers is fine
        let _ = self.notices.send(SyncNotice {
            key: key.clone(),
            message: error.to_string(),
            rolled_back,
            at: Utc::now(),
        });
    }

    fn state(&self) -> MutexGuard<'_, SyncState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::{mpsc, oneshot};
    use tokio_test::assert_ok;

    use crate::domain::ToggleKind;

    struct Call {
        reply: oneshot::Sender<Result<ToggleAck>>,
    }

    /// Fake backend: every request waits until the test answers it.
    struct ScriptedApi {
        calls: mpsc::UnboundedSender<Call>,
    }

    #[async_trait]
    impl ToggleApi for ScriptedApi {
        async fn send(&self, _key: &TargetKey) -> Result<ToggleAck> {
            let (reply, rx) = oneshot::channel();
            let _ = self.calls.send(Call { reply });
            rx.await
                .unwrap_or_else(|_| Err(UttarError::Other("call dropped".into())))
        }
    }

    fn engine_with(policy: CoalescePolicy) -> (Arc<SyncEngine>, mpsc::UnboundedReceiver<Call>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let config = SyncConfig {
            policy,
            ..Default::default()
        };
        let engine = SyncEngine::new(Arc::new(ScriptedApi { calls: tx }), &config);
        (Arc::new(engine), rx)
    }

    fn engine() -> (Arc<SyncEngine>, mpsc::UnboundedReceiver<Call>) {
        engine_with(CoalescePolicy::Coalesce)
    }

    fn like(id: &str) -> TargetKey {
        TargetKey::new(ToggleKind::QuestionLike, id)
    }

    fn ack(is_active: bool, count: u64) -> Result<ToggleAck> {
        Ok(ToggleAck {
            is_active,
            count: Some(count),
        })
    }

    fn spawn_toggle(
        engine: &Arc<SyncEngine>,
        key: &TargetKey,
    ) -> tokio::task::JoinHandle<Result<ToggleOutcome>> {
        let engine = engine.clone();
        let key = key.clone();
        tokio::spawn(async move { engine.toggle(&key).await })
    }

    fn state_of(engine: &SyncEngine, key: &TargetKey) -> (bool, u64) {
        let target = engine.snapshot(key).unwrap();
        (target.is_active, target.count)
    }

    #[tokio::test]
    async fn test_single_toggle_confirmed() {
        let (engine, mut calls) = engine();
        let key = like("q1");
        engine.track(&key, false, 5);

        let handle = spawn_toggle(&engine, &key);
        let call = calls.recv().await.unwrap();
        assert_eq!(state_of(&engine, &key), (true, 6));
        assert!(engine.snapshot(&key).unwrap().pending);

        call.reply.send(ack(true, 6)).unwrap();
        let outcome = assert_ok!(handle.await.unwrap());

        let target = engine.snapshot(&key).unwrap();
        assert_eq!(
            outcome,
            ToggleOutcome::Settled {
                requests: 1,
                last: Reconciliation::Adopted,
                target: Some(target.clone()),
            }
        );
        assert!(target.is_active);
        assert_eq!(target.count, 6);
        assert!(!target.pending);
    }

    #[tokio::test]
    async fn test_matching_response_overrides_optimistic_count() {
        let (engine, mut calls) = engine();
        let key = like("q1");
        engine.track(&key, false, 5);

        let handle = spawn_toggle(&engine, &key);
        let call = calls.recv().await.unwrap();
        call.reply.send(ack(true, 11)).unwrap();
        handle.await.unwrap().unwrap();

        assert_eq!(state_of(&engine, &key), (true, 11));
    }

    #[tokio::test]
    async fn test_on_then_off_sends_trailing_request() {
        let (engine, mut calls) = engine();
        let key = like("q1");
        engine.track(&key, false, 5);

        let handle = spawn_toggle(&engine, &key);
        let first = calls.recv().await.unwrap();

        let second = engine.toggle(&key).await.unwrap();
        assert_eq!(second, ToggleOutcome::Coalesced);
        assert_eq!(state_of(&engine, &key), (false, 5));
        assert!(calls.try_recv().is_err(), "no second request while one is in flight");

        // Server confirms the superseded "on"; local "off" differs, so it is sent
        first.reply.send(ack(true, 6)).unwrap();
        let trailing = calls.recv().await.unwrap();
        assert_eq!(state_of(&engine, &key), (false, 5));
        assert!(engine.snapshot(&key).unwrap().pending);

        trailing.reply.send(ack(false, 5)).unwrap();
        let outcome = handle.await.unwrap().unwrap();
        match outcome {
            ToggleOutcome::Settled { requests, last, .. } => {
                assert_eq!(requests, 2);
                assert_eq!(last, Reconciliation::Adopted);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        let target = engine.snapshot(&key).unwrap();
        assert_eq!((target.is_active, target.count), (false, 5));
        assert!(!target.pending);
        assert!(calls.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_superseded_response_ignored_even_if_odd() {
        let (engine, mut calls) = engine();
        let key = like("q1");
        engine.track(&key, false, 5);

        let handle = spawn_toggle(&engine, &key);
        let first = calls.recv().await.unwrap();
        engine.toggle(&key).await.unwrap();

        first.reply.send(ack(true, 40)).unwrap();
        let trailing = calls.recv().await.unwrap();
        assert_eq!(state_of(&engine, &key), (false, 5));

        trailing.reply.send(ack(false, 5)).unwrap();
        handle.await.unwrap().unwrap();
        assert_eq!(state_of(&engine, &key), (false, 5));
    }

    #[tokio::test]
    async fn test_rapid_toggles_coalesce_into_one_trailing_request() {
        let (engine, mut calls) = engine();
        let key = like("q1");
        engine.track(&key, false, 5);

        let handle = spawn_toggle(&engine, &key);
        let first = calls.recv().await.unwrap();

        // Five more clicks: six in total, ending inactive
        for _ in 0..5 {
            assert_eq!(engine.toggle(&key).await.unwrap(), ToggleOutcome::Coalesced);
        }
        assert!(calls.try_recv().is_err());
        assert_eq!(state_of(&engine, &key), (false, 5));
        assert_eq!(engine.snapshot(&key).unwrap().version, 6);

        first.reply.send(ack(true, 6)).unwrap();
        let trailing = calls.recv().await.unwrap();
        assert!(calls.try_recv().is_err());

        trailing.reply.send(ack(false, 5)).unwrap();
        let outcome = handle.await.unwrap().unwrap();
        assert!(matches!(outcome, ToggleOutcome::Settled { requests: 2, .. }));
        assert!(calls.try_recv().is_err());
        assert_eq!(state_of(&engine, &key), (false, 5));
    }

    #[tokio::test]
    async fn test_no_trailing_request_when_server_already_matches() {
        let (engine, mut calls) = engine();
        let key = like("q1");
        engine.track(&key, false, 5);

        let handle = spawn_toggle(&engine, &key);
        let first = calls.recv().await.unwrap();

        // Five clicks in total, ending active like the first request
        for _ in 0..4 {
            assert_eq!(engine.toggle(&key).await.unwrap(), ToggleOutcome::Coalesced);
        }
        assert_eq!(state_of(&engine, &key), (true, 6));

        // Another user liked meanwhile; the server count wins
        first.reply.send(ack(true, 8)).unwrap();
        let outcome = handle.await.unwrap().unwrap();
        assert!(matches!(
            outcome,
            ToggleOutcome::Settled {
                requests: 1,
                last: Reconciliation::Adopted,
                ..
            }
        ));
        assert!(calls.try_recv().is_err());

        let target = engine.snapshot(&key).unwrap();
        assert_eq!((target.is_active, target.count), (true, 8));
        assert!(!target.pending);
    }

    #[tokio::test]
    async fn test_failure_rolls_back_and_notifies() {
        let (engine, mut calls) = engine();
        let mut notices = engine.subscribe();
        let key = like("q1");
        engine.track(&key, false, 0);

        let handle = spawn_toggle(&engine, &key);
        let call = calls.recv().await.unwrap();
        assert_eq!(state_of(&engine, &key), (true, 1));

        call.reply
            .send(Err(UttarError::Rejected("Question not found".into())))
            .unwrap();
        let outcome = handle.await.unwrap().unwrap();
        assert!(matches!(
            outcome,
            ToggleOutcome::Settled {
                last: Reconciliation::RolledBack,
                ..
            }
        ));

        let target = engine.snapshot(&key).unwrap();
        assert_eq!((target.is_active, target.count), (false, 0));
        assert!(!target.pending);

        let notice = notices.try_recv().unwrap();
        assert_eq!(notice.key, key);
        assert!(notice.rolled_back);
        assert!(notice.message.contains("Question not found"));
    }

    #[tokio::test]
    async fn test_failure_of_superseded_request_keeps_newer_state() {
        let (engine, mut calls) = engine();
        let mut notices = engine.subscribe();
        let key = like("q1");
        engine.track(&key, false, 5);

        let handle = spawn_toggle(&engine, &key);
        let first = calls.recv().await.unwrap();
        engine.toggle(&key).await.unwrap();
        engine.toggle(&key).await.unwrap();
        assert_eq!(state_of(&engine, &key), (true, 6));

        first.reply.send(Err(UttarError::Status(502))).unwrap();
        let trailing = calls.recv().await.unwrap();
        assert_eq!(state_of(&engine, &key), (true, 6));

        let notice = notices.try_recv().unwrap();
        assert!(!notice.rolled_back);

        trailing.reply.send(ack(true, 6)).unwrap();
        handle.await.unwrap().unwrap();
        assert_eq!(state_of(&engine, &key), (true, 6));
    }

    #[tokio::test]
    async fn test_trailing_failure_restores_server_state() {
        let (engine, mut calls) = engine();
        let key = like("q1");
        engine.track(&key, false, 5);

        let handle = spawn_toggle(&engine, &key);
        let first = calls.recv().await.unwrap();
        engine.toggle(&key).await.unwrap();

        first.reply.send(ack(true, 7)).unwrap();
        let trailing = calls.recv().await.unwrap();
        trailing
            .reply
            .send(Err(UttarError::Rejected("try later".into())))
            .unwrap();
        handle.await.unwrap().unwrap();

        // Back to what the server last said, not to the pre-click count
        assert_eq!(state_of(&engine, &key), (true, 7));
        assert!(!engine.snapshot(&key).unwrap().pending);
    }

    #[tokio::test]
    async fn test_both_requests_fail_restores_seed() {
        let (engine, mut calls) = engine();
        let key = like("q1");
        engine.track(&key, false, 5);

        let handle = spawn_toggle(&engine, &key);
        let first = calls.recv().await.unwrap();
        engine.toggle(&key).await.unwrap();
        engine.toggle(&key).await.unwrap();
        assert_eq!(state_of(&engine, &key), (true, 6));

        first.reply.send(Err(UttarError::Status(502))).unwrap();
        let trailing = calls.recv().await.unwrap();
        trailing.reply.send(Err(UttarError::Status(502))).unwrap();
        let outcome = handle.await.unwrap().unwrap();

        assert!(matches!(
            outcome,
            ToggleOutcome::Settled {
                requests: 2,
                last: Reconciliation::RolledBack,
                ..
            }
        ));
        let target = engine.snapshot(&key).unwrap();
        assert_eq!((target.is_active, target.count), (false, 5));
        assert!(!target.pending);
    }

    #[tokio::test]
    async fn test_failed_first_request_with_reverted_intent_sends_nothing_more() {
        let (engine, mut calls) = engine();
        let mut notices = engine.subscribe();
        let key = like("q1");
        engine.track(&key, false, 5);

        let handle = spawn_toggle(&engine, &key);
        let first = calls.recv().await.unwrap();
        engine.toggle(&key).await.unwrap();

        first.reply.send(Err(UttarError::Status(502))).unwrap();
        let outcome = handle.await.unwrap().unwrap();
        assert!(matches!(outcome, ToggleOutcome::Settled { requests: 1, .. }));
        assert!(calls.try_recv().is_err());

        let target = engine.snapshot(&key).unwrap();
        assert_eq!((target.is_active, target.count), (false, 5));
        assert!(!target.pending);
        assert!(!notices.try_recv().unwrap().rolled_back);
    }

    #[tokio::test]
    async fn test_disable_while_pending_suppresses() {
        let (engine, mut calls) = engine_with(CoalescePolicy::DisableWhilePending);
        let key = like("q1");
        engine.track(&key, false, 5);

        let handle = spawn_toggle(&engine, &key);
        let call = calls.recv().await.unwrap();

        assert_eq!(engine.toggle(&key).await.unwrap(), ToggleOutcome::Suppressed);
        assert_eq!(state_of(&engine, &key), (true, 6));
        assert_eq!(engine.snapshot(&key).unwrap().version, 1);

        call.reply.send(ack(true, 6)).unwrap();
        let outcome = handle.await.unwrap().unwrap();
        assert!(matches!(outcome, ToggleOutcome::Settled { requests: 1, .. }));
        assert!(calls.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_counts_as_failure() {
        let (engine, mut calls) = engine();
        let mut notices = engine.subscribe();
        let key = TargetKey::new(ToggleKind::QuestionBookmark, "q1");
        engine.track(&key, false, 0);

        // The call is never answered; the paused clock auto-advances to the deadline
        let outcome = engine.toggle(&key).await.unwrap();
        let _unanswered = calls.recv().await.unwrap();

        assert!(matches!(
            outcome,
            ToggleOutcome::Settled {
                last: Reconciliation::RolledBack,
                ..
            }
        ));
        assert!(!engine.snapshot(&key).unwrap().is_active);

        let notice = notices.try_recv().unwrap();
        assert!(notice.message.contains("timed out"));
    }

    #[tokio::test]
    async fn test_untracked_target() {
        let (engine, _calls) = engine();
        let result = engine.toggle(&like("ghost")).await;
        assert!(matches!(result, Err(UttarError::UntrackedTarget(_))));
    }

    #[tokio::test]
    async fn test_forget_while_in_flight() {
        let (engine, mut calls) = engine();
        let key = like("q1");
        engine.track(&key, false, 5);

        let handle = spawn_toggle(&engine, &key);
        let call = calls.recv().await.unwrap();
        engine.forget(&key);

        call.reply.send(ack(true, 6)).unwrap();
        let outcome = handle.await.unwrap().unwrap();
        assert_eq!(
            outcome,
            ToggleOutcome::Settled {
                requests: 1,
                last: Reconciliation::Untracked,
                target: None,
            }
        );
        assert!(engine.snapshot(&key).is_none());
    }

    #[tokio::test]
    async fn test_retrack_while_in_flight_keeps_single_request() {
        let (engine, mut calls) = engine();
        let key = like("q1");
        engine.track(&key, false, 5);

        let handle = spawn_toggle(&engine, &key);
        let stale = calls.recv().await.unwrap();
        engine.forget(&key);

        // The entity comes back into view before the old request resolves
        let target = engine.track(&key, false, 5);
        assert!(target.pending);
        assert_eq!(engine.toggle(&key).await.unwrap(), ToggleOutcome::Coalesced);
        assert!(calls.try_recv().is_err(), "second request while one is in flight");

        stale.reply.send(Err(UttarError::Status(502))).unwrap();
        let trailing = calls.recv().await.unwrap();
        let target = engine.snapshot(&key).unwrap();
        assert_eq!((target.is_active, target.count), (true, 6));
        assert!(target.pending);

        trailing.reply.send(ack(true, 6)).unwrap();
        let outcome = handle.await.unwrap().unwrap();
        assert!(matches!(
            outcome,
            ToggleOutcome::Settled {
                requests: 2,
                last: Reconciliation::Adopted,
                ..
            }
        ));
        let target = engine.snapshot(&key).unwrap();
        assert_eq!((target.is_active, target.count), (true, 6));
        assert!(!target.pending);
    }

    #[tokio::test]
    async fn test_targets_are_independent() {
        let (engine, mut calls) = engine();
        let a = like("q1");
        let b = TargetKey::new(ToggleKind::QuestionBookmark, "q1");
        engine.track(&a, false, 0);
        engine.track(&b, false, 0);

        let ha = spawn_toggle(&engine, &a);
        let ca = calls.recv().await.unwrap();
        let hb = spawn_toggle(&engine, &b);
        let cb = calls.recv().await.unwrap();

        cb.reply
            .send(Ok(ToggleAck {
                is_active: true,
                count: None,
            }))
            .unwrap();
        ca.reply.send(ack(true, 1)).unwrap();
        ha.await.unwrap().unwrap();
        hb.await.unwrap().unwrap();

        assert_eq!(state_of(&engine, &a), (true, 1));
        assert_eq!(state_of(&engine, &b), (true, 0));
    }
}
