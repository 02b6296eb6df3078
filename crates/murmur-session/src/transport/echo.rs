//! In-process loopback transport.
//!
//! Behaves like a voice server that only ever hosts the local user plus
//! whatever remote participants a test or the CLI injects. Every call
//! sleeps for the configured latency first, so manager code sees real
//! suspension points.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use murmur_common::{new_id, Participant, TransmissionMode};
use tokio::sync::{broadcast, Mutex};
use tracing::debug;

use super::{ChatCapability, LoginOptions, TransportError, TransportEvent, VoiceTransport};

const EVENT_CAPACITY: usize = 256;

struct JoinedChannel {
    volume: i32,
    local: Participant,
}

struct EchoState {
    logged_in: bool,
    display_name: String,
    joined: BTreeMap<String, JoinedChannel>,
    /// Remote participants per channel, whether or not we are joined.
    population: HashMap<String, Vec<Participant>>,
    mode: TransmissionMode,
    single: Option<String>,
}

impl EchoState {
    fn transmits_into(&self, channel: &str) -> bool {
        match self.mode {
            TransmissionMode::None => false,
            TransmissionMode::All => true,
            TransmissionMode::Single => self.single.as_deref() == Some(channel),
        }
    }
}

pub struct EchoTransport {
    latency: Duration,
    self_id: String,
    state: Mutex<EchoState>,
    events: broadcast::Sender<TransportEvent>,
    unavailable: AtomicBool,
}

impl EchoTransport {
    pub fn new(latency: Duration, self_id: Option<String>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            latency,
            self_id: self_id.unwrap_or_else(new_id),
            state: Mutex::new(EchoState {
                logged_in: false,
                display_name: String::new(),
                joined: BTreeMap::new(),
                population: HashMap::new(),
                mode: TransmissionMode::None,
                single: None,
            }),
            events,
            unavailable: AtomicBool::new(false),
        }
    }

    /// Zero-latency transport.
    pub fn instant() -> Self {
        Self::new(Duration::ZERO, None)
    }

    pub fn self_id(&self) -> &str {
        &self.self_id
    }

    /// Make every subsequent call fail with [`TransportError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Add a remote participant to `channel`. Announced immediately if the
    /// local user is in that channel, otherwise when it is joined.
    pub async fn inject_participant(&self, channel: &str, display_name: &str) -> Participant {
        let participant = Participant::new(new_id(), display_name, channel);
        let mut state = self.state.lock().await;
        state
            .population
            .entry(channel.to_string())
            .or_default()
            .push(participant.clone());
        if state.joined.contains_key(channel) {
            self.emit(TransportEvent::ParticipantAdded(participant.clone()));
        }
        debug!(channel, display_name, "echo: remote participant arrived");
        participant
    }

    /// Remove the first remote participant named `display_name` from `channel`.
    pub async fn remove_participant(&self, channel: &str, display_name: &str) -> Option<Participant> {
        let mut state = self.state.lock().await;
        let members = state.population.get_mut(channel)?;
        let idx = members.iter().position(|p| p.display_name == display_name)?;
        let participant = members.remove(idx);
        if state.joined.contains_key(channel) {
            self.emit(TransportEvent::ParticipantRemoved(participant.clone()));
        }
        debug!(channel, display_name, "echo: remote participant left");
        Some(participant)
    }

    /// Flip the speaking flag of a remote participant. Returns false when
    /// no such participant exists.
    pub async fn set_speaking(&self, channel: &str, display_name: &str, speaking: bool) -> bool {
        let mut state = self.state.lock().await;
        let joined = state.joined.contains_key(channel);
        let Some(participant) = state
            .population
            .get_mut(channel)
            .and_then(|members| members.iter_mut().find(|p| p.display_name == display_name))
        else {
            return false;
        };
        participant.speaking = speaking;
        if joined {
            self.emit(TransportEvent::ParticipantUpdated(participant.clone()));
        }
        true
    }

    /// Simulate the server dropping the connection: all channels are gone
    /// and an unsolicited `LoggedOut` is emitted.
    pub async fn drop_connection(&self) {
        let mut state = self.state.lock().await;
        if !state.logged_in {
            return;
        }
        self.clear_session(&mut state);
        debug!("echo: connection dropped");
    }

    pub async fn is_logged_in(&self) -> bool {
        self.state.lock().await.logged_in
    }

    pub async fn joined_channels(&self) -> Vec<String> {
        self.state.lock().await.joined.keys().cloned().collect()
    }

    pub async fn volume(&self, channel: &str) -> Option<i32> {
        self.state.lock().await.joined.get(channel).map(|c| c.volume)
    }

    pub async fn transmission(&self) -> (TransmissionMode, Option<String>) {
        let state = self.state.lock().await;
        (state.mode, state.single.clone())
    }

    fn emit(&self, event: TransportEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    async fn simulate(&self) -> Result<(), TransportError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(TransportError::Unavailable);
        }
        Ok(())
    }

    fn leave_inner(&self, state: &mut EchoState, channel: &str) -> Result<(), TransportError> {
        let left = state
            .joined
            .remove(channel)
            .ok_or_else(|| TransportError::UnknownChannel(channel.to_string()))?;
        if state.single.as_deref() == Some(channel) {
            state.mode = TransmissionMode::None;
            state.single = None;
        }
        for remote in state.population.get(channel).into_iter().flatten() {
            self.emit(TransportEvent::ParticipantRemoved(remote.clone()));
        }
        self.emit(TransportEvent::ParticipantRemoved(left.local));
        Ok(())
    }

    fn clear_session(&self, state: &mut EchoState) {
        let channels: Vec<String> = state.joined.keys().cloned().collect();
        for channel in channels {
            let _ = self.leave_inner(state, &channel);
        }
        state.logged_in = false;
        state.mode = TransmissionMode::None;
        state.single = None;
        self.emit(TransportEvent::LoggedOut);
    }

    fn require_login(state: &EchoState) -> Result<(), TransportError> {
        if state.logged_in {
            Ok(())
        } else {
            Err(TransportError::NotLoggedIn)
        }
    }
}

#[async_trait]
impl VoiceTransport for EchoTransport {
    async fn login(&self, options: &LoginOptions) -> Result<(), TransportError> {
        self.simulate().await?;
        let mut state = self.state.lock().await;
        if state.logged_in {
            return Err(TransportError::Rejected("already logged in".into()));
        }
        state.logged_in = true;
        state.display_name = options.display_name.clone();
        debug!(display_name = %options.display_name, tts = options.enable_tts, "echo: logged in");
        self.emit(TransportEvent::LoggedIn);
        Ok(())
    }

    async fn logout(&self) -> Result<(), TransportError> {
        self.simulate().await?;
        let mut state = self.state.lock().await;
        Self::require_login(&state)?;
        self.clear_session(&mut state);
        debug!("echo: logged out");
        Ok(())
    }

    async fn join_channel(
        &self,
        channel: &str,
        capability: ChatCapability,
    ) -> Result<(), TransportError> {
        self.simulate().await?;
        let mut state = self.state.lock().await;
        Self::require_login(&state)?;
        if channel.trim().is_empty() {
            return Err(TransportError::Rejected("channel name must not be empty".into()));
        }
        if state.joined.contains_key(channel) {
            return Err(TransportError::Rejected(format!("already in {channel}")));
        }

        let mut local = Participant::new(self.self_id.clone(), state.display_name.clone(), channel);
        local.muted = !state.transmits_into(channel);
        state.joined.insert(
            channel.to_string(),
            JoinedChannel {
                volume: 0,
                local: local.clone(),
            },
        );

        self.emit(TransportEvent::ParticipantAdded(local));
        for remote in state.population.get(channel).into_iter().flatten() {
            self.emit(TransportEvent::ParticipantAdded(remote.clone()));
        }
        debug!(channel, ?capability, "echo: joined channel");
        Ok(())
    }

    async fn leave_channel(&self, channel: &str) -> Result<(), TransportError> {
        self.simulate().await?;
        let mut state = self.state.lock().await;
        Self::require_login(&state)?;
        self.leave_inner(&mut state, channel)?;
        debug!(channel, "echo: left channel");
        Ok(())
    }

    async fn leave_all(&self) -> Result<(), TransportError> {
        self.simulate().await?;
        let mut state = self.state.lock().await;
        Self::require_login(&state)?;
        let channels: Vec<String> = state.joined.keys().cloned().collect();
        for channel in &channels {
            self.leave_inner(&mut state, channel)?;
        }
        debug!(count = channels.len(), "echo: left all channels");
        Ok(())
    }

    async fn set_volume(&self, channel: &str, volume: i32) -> Result<(), TransportError> {
        self.simulate().await?;
        let mut state = self.state.lock().await;
        Self::require_login(&state)?;
        if !(-50..=40).contains(&volume) {
            return Err(TransportError::Rejected(format!(
                "volume {volume} outside [-50, 40]"
            )));
        }
        let joined = state
            .joined
            .get_mut(channel)
            .ok_or_else(|| TransportError::UnknownChannel(channel.to_string()))?;
        joined.volume = volume;
        debug!(channel, volume, "echo: volume set");
        Ok(())
    }

    async fn set_transmission(
        &self,
        mode: TransmissionMode,
        channel: Option<&str>,
    ) -> Result<(), TransportError> {
        self.simulate().await?;
        let mut state = self.state.lock().await;
        Self::require_login(&state)?;
        let single = match mode {
            TransmissionMode::Single => {
                let name = channel.unwrap_or_default();
                if !state.joined.contains_key(name) {
                    return Err(TransportError::UnknownChannel(name.to_string()));
                }
                Some(name.to_string())
            }
            _ => None,
        };
        state.mode = mode;
        state.single = single;

        let updates: Vec<(String, bool)> = state
            .joined
            .keys()
            .map(|name| (name.clone(), !state.transmits_into(name)))
            .collect();
        for (name, muted) in updates {
            if let Some(joined) = state.joined.get_mut(&name) {
                if joined.local.muted != muted {
                    joined.local.muted = muted;
                    self.emit(TransportEvent::ParticipantUpdated(joined.local.clone()));
                }
            }
        }
        debug!(%mode, ?channel, "echo: transmission set");
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<TransportEvent> {
        self.events.subscribe()
    }
}
