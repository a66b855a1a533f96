use chrono::Duration;
use tracing::info;

use crate::domain::SessionConfig;
use crate::store::SlotStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Active,
    /// The next message starts a fresh session.
    ExpiredPendingRestart,
}

/// Decides when a conversation session ends and what survives the boundary.
/// The core owns no timers: the caller reports elapsed inactivity each turn.
#[derive(Clone, Debug)]
pub struct SessionManager {
    config: SessionConfig,
    state: SessionState,
}

impl SessionManager {
    /// A new manager starts pending restart, so the first message of a
    /// brand-new conversation takes the same path as a post-expiry message.
    pub fn new(config: SessionConfig) -> Self {
        Self { config, state: SessionState::ExpiredPendingRestart }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Expire the active session when inactivity reaches the configured
    /// threshold. A threshold of 0 disables expiry permanently.
    pub fn observe_inactivity(&mut self, elapsed: Duration) {
        if self.config.session_expiration_time == 0 {
            return;
        }
        let threshold = Duration::minutes(self.config.session_expiration_time as i64);
        if self.state == SessionState::Active && elapsed >= threshold {
            info!(
                event_name = "session.expired",
                inactive_minutes = elapsed.num_minutes(),
                "session expired after inactivity"
            );
            self.state = SessionState::ExpiredPendingRestart;
        }
    }

    /// Manual session-start signal from the external conversation tracker.
    pub fn request_restart(&mut self) {
        self.state = SessionState::ExpiredPendingRestart;
    }

    /// Called on every incoming message. Returns true when a fresh session
    /// started, in which case the store was reset per the carry-over policy.
    pub fn on_message(&mut self, store: &mut SlotStore) -> bool {
        if self.state != SessionState::ExpiredPendingRestart {
            return false;
        }
        let carry_over = self.config.carry_over_slots_to_new_session;
        store.reset(carry_over);
        self.state = SessionState::Active;
        info!(event_name = "session.started", carry_over, "new session started");
        true
    }
}
