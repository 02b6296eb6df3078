//! Recording transport for manager tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use murmur_common::TransmissionMode;
use tokio::sync::{broadcast, Notify};

use crate::transport::{ChatCapability, LoginOptions, TransportError, TransportEvent, VoiceTransport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    Login,
    Logout,
    Join,
    Leave,
    LeaveAll,
    SetVolume,
    SetTransmission,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Login(String),
    Logout,
    Join(String),
    Leave(String),
    LeaveAll,
    SetVolume(String, i32),
    SetTransmission(TransmissionMode, Option<String>),
}

impl Call {
    pub fn kind(&self) -> CallKind {
        match self {
            Self::Login(_) => CallKind::Login,
            Self::Logout => CallKind::Logout,
            Self::Join(_) => CallKind::Join,
            Self::Leave(_) => CallKind::Leave,
            Self::LeaveAll => CallKind::LeaveAll,
            Self::SetVolume(..) => CallKind::SetVolume,
            Self::SetTransmission(..) => CallKind::SetTransmission,
        }
    }
}

/// One-shot gate holding the next call of a kind until released.
#[derive(Default)]
pub struct Gate {
    entered: Notify,
    release: Notify,
}

impl Gate {
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }
}

pub struct MockTransport {
    calls: Mutex<Vec<Call>>,
    failures: Mutex<HashMap<CallKind, VecDeque<TransportError>>>,
    gates: Mutex<HashMap<CallKind, Arc<Gate>>>,
    events: broadcast::Sender<TransportEvent>,
}

impl MockTransport {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
            events,
        }
    }

    /// Fail the next call of `kind` with `err`.
    pub fn fail_next(&self, kind: CallKind, err: TransportError) {
        self.failures
            .lock()
            .unwrap()
            .entry(kind)
            .or_default()
            .push_back(err);
    }

    /// Suspend the next call of `kind` until the returned gate is released.
    pub fn hold(&self, kind: CallKind) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        self.gates.lock().unwrap().insert(kind, gate.clone());
        gate
    }

    pub fn emit(&self, event: TransportEvent) {
        let _ = self.events.send(event);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, kind: CallKind) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.kind() == kind)
            .count()
    }

    pub fn position(&self, call: &Call) -> Option<usize> {
        self.calls.lock().unwrap().iter().position(|c| c == call)
    }

    pub fn receiver_count(&self) -> usize {
        self.events.receiver_count()
    }

    async fn enter(&self, call: Call) -> Result<(), TransportError> {
        let kind = call.kind();
        self.calls.lock().unwrap().push(call);
        let gate = self.gates.lock().unwrap().remove(&kind);
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        let failure = self
            .failures
            .lock()
            .unwrap()
            .get_mut(&kind)
            .and_then(VecDeque::pop_front);
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl VoiceTransport for MockTransport {
    async fn login(&self, options: &LoginOptions) -> Result<(), TransportError> {
        self.enter(Call::Login(options.display_name.clone())).await
    }

    async fn logout(&self) -> Result<(), TransportError> {
        self.enter(Call::Logout).await
    }

    async fn join_channel(
        &self,
        channel: &str,
        _capability: ChatCapability,
    ) -> Result<(), TransportError> {
        self.enter(Call::Join(channel.to_string())).await
    }

    async fn leave_channel(&self, channel: &str) -> Result<(), TransportError> {
        self.enter(Call::Leave(channel.to_string())).await
    }

    async fn leave_all(&self) -> Result<(), TransportError> {
        self.enter(Call::LeaveAll).await
    }

    async fn set_volume(&self, channel: &str, volume: i32) -> Result<(), TransportError> {
        self.enter(Call::SetVolume(channel.to_string(), volume)).await
    }

    async fn set_transmission(
        &self,
        mode: TransmissionMode,
        channel: Option<&str>,
    ) -> Result<(), TransportError> {
        self.enter(Call::SetTransmission(mode, channel.map(str::to_string)))
            .await
    }

    fn subscribe(&self) -> broadcast::Receiver<TransportEvent> {
        self.events.subscribe()
    }
}
