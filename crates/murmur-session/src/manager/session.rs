//! Session manager: construction, queries and participant callbacks.
//! State-changing operations live in `operations.rs`, intents in
//! `intents.rs`.

use std::collections::BTreeSet;
use std::sync::Arc;

use murmur_common::{
    EventBus, LoginState, Participant, SessionEvent, SessionId, TransmissionTarget,
};
use tokio::sync::{broadcast, watch, Mutex, RwLock};
use tracing::{debug, warn};

use crate::error::SessionError;
use crate::roster::Roster;
use crate::transport::VoiceTransport;
use crate::volume::ListenVolume;

use super::pump::{EventPump, RosterFeed};
use super::types::{ChannelMembership, SessionConfig, SessionState};

/// State shared between the manager handle and the tasks its operations
/// run on.
pub(super) struct Shared {
    pub transport: Arc<dyn VoiceTransport>,
    pub config: SessionConfig,
    pub login: watch::Sender<LoginState>,
    pub op_lock: Arc<Mutex<()>>,
    pub state: RwLock<SessionState>,
    pub feed: RosterFeed,
    pub events: EventBus,
}

/// Single source of truth for call membership and talk/listen routing.
///
/// State-changing operations are serialized FIFO on an async mutex and
/// suspend while the transport works. Once an operation holds the mutex it
/// runs to completion on its own task, even if the caller stops waiting.
/// Queries and participant callbacks never touch that mutex.
pub struct SessionManager {
    pub(super) shared: Arc<Shared>,
    _pump: EventPump,
}

impl SessionManager {
    /// Subscribes to `transport` and spawns the event pump, so this must be
    /// called inside a Tokio runtime.
    pub fn new(transport: Arc<dyn VoiceTransport>, config: SessionConfig) -> Self {
        let events = EventBus::new(config.event_capacity);
        let feed = RosterFeed::new(Arc::new(Roster::new()), events.clone());
        let pump = EventPump::spawn(transport.subscribe(), feed.clone());
        let (login, _) = watch::channel(LoginState::LoggedOut);

        debug!(
            all = %config.all_channel,
            team = %config.team_channel,
            "session manager created"
        );

        let shared = Shared {
            transport,
            config,
            login,
            op_lock: Arc::new(Mutex::new(())),
            state: RwLock::new(SessionState::default()),
            feed,
            events,
        };
        Self {
            shared: Arc::new(shared),
            _pump: pump,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.shared.config
    }

    // -- queries -----------------------------------------------------------

    pub fn login_state(&self) -> LoginState {
        self.shared.login_state()
    }

    pub fn is_logged_in(&self) -> bool {
        self.shared.is_logged_in()
    }

    pub fn watch_login_state(&self) -> watch::Receiver<LoginState> {
        self.shared.login.subscribe()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.shared.events.subscribe()
    }

    pub async fn session_id(&self) -> Option<SessionId> {
        self.shared.state.read().await.session.as_ref().map(|s| s.id)
    }

    pub async fn display_name(&self) -> Option<String> {
        self.shared
            .state
            .read()
            .await
            .session
            .as_ref()
            .map(|s| s.display_name.clone())
    }

    /// Joined channel names, sorted.
    pub async fn active_channels(&self) -> BTreeSet<String> {
        self.shared.active_channels().await
    }

    pub async fn memberships(&self) -> Vec<ChannelMembership> {
        self.shared
            .state
            .read()
            .await
            .session
            .as_ref()
            .map(|s| s.memberships.values().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn is_joined(&self, channel: &str) -> bool {
        self.shared.is_joined(channel).await
    }

    pub async fn channel_volume(&self, channel: &str) -> Option<ListenVolume> {
        self.shared
            .state
            .read()
            .await
            .session
            .as_ref()
            .and_then(|s| s.memberships.get(channel))
            .map(|m| m.volume)
    }

    pub async fn transmission_target(&self) -> TransmissionTarget {
        self.shared
            .state
            .read()
            .await
            .session
            .as_ref()
            .map(|s| s.transmission.clone())
            .unwrap_or_default()
    }

    /// Joined channels that currently receive the microphone.
    pub async fn transmitting_channels(&self) -> BTreeSet<String> {
        let state = self.shared.state.read().await;
        let Some(session) = state.session.as_ref() else {
            return BTreeSet::new();
        };
        session
            .memberships
            .keys()
            .filter(|name| session.transmission.includes(name))
            .cloned()
            .collect()
    }

    /// Participants of `channel` in arrival order.
    pub async fn roster(&self, channel: &str) -> Vec<Participant> {
        self.shared.feed.roster().participants(channel).await
    }

    // -- transport callbacks ----------------------------------------------

    pub async fn on_participant_added(&self, participant: Participant) {
        self.shared.feed.participant_added(participant).await;
    }

    pub async fn on_participant_removed(&self, participant: Participant) {
        self.shared.feed.participant_removed(participant).await;
    }

    pub async fn on_participant_updated(&self, participant: Participant) {
        self.shared.feed.participant_updated(participant).await;
    }
}

impl Shared {
    pub fn login_state(&self) -> LoginState {
        *self.login.borrow()
    }

    pub fn is_logged_in(&self) -> bool {
        self.login_state() == LoginState::LoggedIn
    }

    /// Joined channel names, sorted.
    pub async fn active_channels(&self) -> BTreeSet<String> {
        self.state
            .read()
            .await
            .session
            .as_ref()
            .map(|s| s.memberships.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn is_joined(&self, channel: &str) -> bool {
        self.state
            .read()
            .await
            .session
            .as_ref()
            .is_some_and(|s| s.is_joined(channel))
    }

    pub fn set_login_state(&self, next: LoginState) {
        self.login.send_replace(next);
        self.events.publish(SessionEvent::LoginStateChanged(next));
    }

    pub fn require_logged_in(&self) -> Result<(), SessionError> {
        if self.is_logged_in() {
            Ok(())
        } else {
            Err(SessionError::NotLoggedIn)
        }
    }

    /// Out-of-range volumes are clamped, not rejected.
    pub fn clamp_volume(raw: i32) -> ListenVolume {
        ListenVolume::new(raw).unwrap_or_else(|err| {
            let clamped = ListenVolume::clamped(raw);
            warn!(%err, clamped = clamped.get(), "clamping listen volume");
            clamped
        })
    }
}
