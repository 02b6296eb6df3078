//! Transport event pump.
//!
//! Drains the transport's broadcast stream on a background task and feeds
//! participant changes into the roster. Never touches the operation lock.

use std::sync::Arc;

use murmur_common::{EventBus, Participant, SessionEvent};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::roster::Roster;
use crate::transport::TransportEvent;

/// Roster plus the upward event bus; everything the participant callbacks
/// are allowed to mutate.
#[derive(Clone)]
pub(crate) struct RosterFeed {
    roster: Arc<Roster>,
    events: EventBus,
}

impl RosterFeed {
    pub fn new(roster: Arc<Roster>, events: EventBus) -> Self {
        Self { roster, events }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub async fn participant_added(&self, participant: Participant) {
        let event = if self.roster.add(participant.clone()).await {
            SessionEvent::ParticipantAdded(participant)
        } else {
            SessionEvent::ParticipantUpdated(participant)
        };
        self.events.publish(event);
    }

    pub async fn participant_removed(&self, participant: Participant) {
        match self.roster.remove(&participant).await {
            Some(removed) => {
                self.events.publish(SessionEvent::ParticipantRemoved(removed));
            }
            None => debug!(
                channel = %participant.channel_name,
                participant = %participant.display_name,
                "removal for unknown participant ignored"
            ),
        }
    }

    pub async fn participant_updated(&self, participant: Participant) {
        if self.roster.update(participant.clone()).await {
            self.events
                .publish(SessionEvent::ParticipantUpdated(participant));
        }
    }

    async fn handle(&self, event: TransportEvent) {
        match event {
            TransportEvent::LoggedIn => {
                self.events.publish(SessionEvent::TransportLoggedIn);
            }
            TransportEvent::LoggedOut => {
                info!("transport reported logout");
                self.events.publish(SessionEvent::TransportLoggedOut);
            }
            TransportEvent::ParticipantAdded(p) => self.participant_added(p).await,
            TransportEvent::ParticipantRemoved(p) => self.participant_removed(p).await,
            TransportEvent::ParticipantUpdated(p) => self.participant_updated(p).await,
        }
    }
}

/// Background task bound to the manager's lifetime. Dropping it aborts the
/// task, which drops the receiver and so unsubscribes from the transport.
pub(crate) struct EventPump {
    handle: JoinHandle<()>,
}

impl EventPump {
    pub fn spawn(mut rx: broadcast::Receiver<TransportEvent>, feed: RosterFeed) -> Self {
        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => feed.handle(event).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "transport event stream lagged; roster may be stale");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("transport event stream closed");
                        break;
                    }
                }
            }
        });
        Self { handle }
    }
}

impl Drop for EventPump {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
