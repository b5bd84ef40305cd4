// src/engine/retry.rs
//
// Retry budget for network fetches.

use crate::engine::DEFAULT_RETRY_COUNT;
use tracing::debug;

/// Connectivity as reported by the host platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NetworkState {
    Connected,
    Connecting,
    Disconnecting,
    Disconnected,
    Suspended,
    Unknown,
}

/// Snapshot of the active network, when the host can provide one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NetworkInfo {
    pub state: NetworkState,
}

impl NetworkInfo {
    pub fn new(state: NetworkState) -> Self {
        Self { state }
    }

    pub fn is_connected_or_connecting(&self) -> bool {
        matches!(self.state, NetworkState::Connected | NetworkState::Connecting)
    }
}

/// Count-bounded retry decisions for one in-flight request.
///
/// Owned by a single network hunter; never shared across requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    remaining: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_COUNT)
    }
}

impl RetryPolicy {
    pub fn new(budget: u32) -> Self {
        Self { remaining: budget }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// With the budget spent, only a local cache may still answer.
    pub fn local_cache_only(&self) -> bool {
        self.remaining == 0
    }

    /// Decide whether a failed fetch should run again.
    ///
    /// Every call with budget left consumes one retry. The answer is `false`
    /// only when the budget is gone or `network` positively reports that we
    /// are offline; unknown connectivity retries. `airplane_mode` is accepted
    /// for the host contract but does not change the decision.
    pub fn should_retry(&mut self, airplane_mode: bool, network: Option<&NetworkInfo>) -> bool {
        if self.remaining == 0 {
            debug!(target: "pixel_hunter::retry", airplane_mode, "retry budget exhausted");
            return false;
        }
        self.remaining -= 1;
        let retry = network.map_or(true, NetworkInfo::is_connected_or_connecting);
        debug!(
            target: "pixel_hunter::retry",
            remaining = self.remaining,
            airplane_mode,
            state = ?network.map(|n| n.state),
            retry,
            "retry decision"
        );
        retry
    }
}
