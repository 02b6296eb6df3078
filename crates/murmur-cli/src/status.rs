//! Human-readable status lines. The session manager returns structured
//! results; all wording lives here.

use std::collections::BTreeSet;
use std::time::Duration;

use murmur_common::{LoginState, Participant, SessionEvent, SessionId};
use murmur_session::ChannelMembership;

pub fn describe_event(event: &SessionEvent) -> Option<String> {
    let line = match event {
        SessionEvent::LoginStateChanged(state) => format!("Login state: {state}"),
        SessionEvent::ChannelJoined { channel, volume } => {
            format!("Joined channel {channel} (volume {volume})")
        }
        SessionEvent::ChannelLeft { channel } => format!("Left channel {channel}"),
        SessionEvent::VolumeChanged { channel, volume } => {
            format!("Channel {channel} volume set to {volume}")
        }
        SessionEvent::TransmissionChanged(target) => format!("Transmitting to {target}"),
        SessionEvent::ParticipantAdded(p) => {
            format!("Participant {} joined channel {}", p.display_name, p.channel_name)
        }
        SessionEvent::ParticipantRemoved(p) => {
            format!("Participant {} left channel {}", p.display_name, p.channel_name)
        }
        SessionEvent::ParticipantUpdated(p) => format!(
            "Participant {} in {}: {}",
            p.display_name,
            p.channel_name,
            flags(p)
        ),
        SessionEvent::TransportLoggedOut => "Voice service disconnected".to_string(),
        SessionEvent::TransportLoggedIn | SessionEvent::Unknown => return None,
    };
    Some(line)
}

fn flags(p: &Participant) -> String {
    match (p.muted, p.speaking) {
        (true, true) => "muted, speaking".into(),
        (true, false) => "muted".into(),
        (false, true) => "speaking".into(),
        (false, false) => "idle".into(),
    }
}

pub fn took(what: &str, elapsed: Duration) -> String {
    format!("{what} in {:.2}s", elapsed.as_secs_f64())
}

/// Login state plus the active/transmitting channel dump.
pub fn report(
    state: LoginState,
    session: Option<SessionId>,
    memberships: &[ChannelMembership],
    transmitting: &BTreeSet<String>,
) -> Vec<String> {
    let mut lines = Vec::with_capacity(memberships.len() + transmitting.len() + 3);
    match session {
        Some(id) => lines.push(format!("Login state: {state} (session {id})")),
        None => lines.push(format!("Login state: {state}")),
    }
    lines.push(format!("Active channels: {}", memberships.len()));
    for m in memberships {
        lines.push(format!("Channel: {} - Volume {}", m.channel, m.volume));
    }
    lines.push(format!("Transmitting channels: {}", transmitting.len()));
    for channel in transmitting {
        lines.push(format!("Channel: {channel}"));
    }
    lines
}

pub fn roster(channel: &str, participants: &[Participant]) -> Vec<String> {
    let mut lines = vec![format!(
        "Roster {channel}: {} participant(s)",
        participants.len()
    )];
    lines.extend(
        participants
            .iter()
            .map(|p| format!("- {} ({})", p.display_name, flags(p))),
    );
    lines
}
