//! State-changing operations. Each one holds the operation lock for its
//! whole duration, including the transport call, and only writes the state
//! snapshot after the transport has acknowledged.
//!
//! The public methods queue on the lock, then hand the body to a spawned
//! task together with the lock guard. Dropping the caller's future (for
//! example under `tokio::time::timeout`) only stops the wait; the transport
//! call and the state commit after it still run.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use murmur_common::{new_correlation_id, LoginState, SessionEvent, TransmissionTarget};
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, error, info, warn};

use crate::error::SessionError;
use crate::transport::{ChatCapability, LoginOptions, TransportError};

use super::session::{SessionManager, Shared};
use super::types::{ActiveSession, ChannelMembership};

/// Puts the state back to `LoggedOut` if a login is dropped while still
/// queued on the operation lock.
struct PendingLogin<'a> {
    shared: &'a Shared,
    armed: bool,
}

impl PendingLogin<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingLogin<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("login abandoned before reaching the transport");
            self.shared.set_login_state(LoginState::LoggedOut);
        }
    }
}

impl SessionManager {
    async fn queue(&self) -> OwnedMutexGuard<()> {
        Arc::clone(&self.shared.op_lock).lock_owned().await
    }

    /// Run `body` on its own task while `guard` is held.
    async fn detach<T, F, Fut>(
        &self,
        guard: OwnedMutexGuard<()>,
        body: F,
    ) -> Result<T, SessionError>
    where
        F: FnOnce(Arc<Shared>) -> Fut,
        Fut: Future<Output = Result<T, SessionError>> + Send + 'static,
        T: Send + 'static,
    {
        let work = body(Arc::clone(&self.shared));
        let task = tokio::spawn(async move {
            let _op = guard;
            work.await
        });
        match task.await {
            Ok(result) => result,
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(err) => {
                error!(%err, "session operation task cancelled");
                Err(SessionError::Aborted)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Login / logout
    // -----------------------------------------------------------------------

    /// Log in. A concurrent call while this one is pending fails with
    /// [`SessionError::AlreadyInProgress`] without reaching the transport.
    pub async fn login(&self, display_name: &str, enable_tts: bool) -> Result<(), SessionError> {
        let mut rejected = None;
        self.shared.login.send_if_modified(|state| match *state {
            LoginState::LoggedOut => {
                *state = LoginState::LoggingIn;
                true
            }
            LoginState::LoggedIn => {
                rejected = Some(SessionError::AlreadyLoggedIn);
                false
            }
            LoginState::LoggingIn | LoginState::LoggingOut => {
                rejected = Some(SessionError::AlreadyInProgress);
                false
            }
        });
        if let Some(err) = rejected {
            return Err(err);
        }
        self.shared
            .events
            .publish(SessionEvent::LoginStateChanged(LoginState::LoggingIn));

        let pending = PendingLogin {
            shared: &self.shared,
            armed: true,
        };
        let guard = self.queue().await;
        pending.disarm();

        let options = LoginOptions {
            display_name: display_name.to_string(),
            enable_tts,
        };
        self.detach(guard, move |shared| async move { shared.login(options).await })
            .await
    }

    /// Log out. Queued behind any pending operation.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let guard = self.queue().await;
        self.detach(guard, |shared| async move { shared.logout().await })
            .await
    }

    // -----------------------------------------------------------------------
    // Channels
    // -----------------------------------------------------------------------

    /// Join `channel` at the configured default volume. Joining a channel
    /// that is already joined succeeds without calling the transport.
    pub async fn join_channel(&self, channel: &str) -> Result<(), SessionError> {
        self.join_channel_with_volume(channel, self.config().default_volume.get())
            .await
    }

    /// Join `channel` and apply `volume` (clamped) before recording the
    /// membership. If the volume call fails the join is undone.
    pub async fn join_channel_with_volume(
        &self,
        channel: &str,
        volume: i32,
    ) -> Result<(), SessionError> {
        let guard = self.queue().await;
        let channel = channel.to_string();
        self.detach(guard, move |shared| async move {
            shared.join_channel(&channel, volume).await
        })
        .await
    }

    /// Leave `channel`. Leaving a channel that is not joined is a no-op.
    pub async fn leave_channel(&self, channel: &str) -> Result<(), SessionError> {
        let guard = self.queue().await;
        let channel = channel.to_string();
        self.detach(guard, move |shared| async move {
            shared.leave_channel(&channel).await
        })
        .await
    }

    /// Leave every joined channel and reset the transmission target.
    pub async fn leave_all_channels(&self) -> Result<(), SessionError> {
        let guard = self.queue().await;
        self.detach(guard, |shared| async move { shared.leave_all_channels().await })
            .await
    }

    /// Set the listen volume of a joined channel. Out-of-range values are
    /// clamped; the stored value changes only after the transport accepts it.
    pub async fn set_channel_volume(&self, channel: &str, volume: i32) -> Result<(), SessionError> {
        let guard = self.queue().await;
        let channel = channel.to_string();
        self.detach(guard, move |shared| async move {
            shared.set_channel_volume(&channel, volume).await
        })
        .await
    }

    // -----------------------------------------------------------------------
    // Transmission
    // -----------------------------------------------------------------------

    /// Replace the transmission target. A single-channel target must name a
    /// channel that is already joined.
    pub async fn set_transmission(&self, target: TransmissionTarget) -> Result<(), SessionError> {
        let guard = self.queue().await;
        self.detach(guard, move |shared| async move {
            shared.set_transmission(target).await
        })
        .await
    }
}

// ---------------------------------------------------------------------------
// Operation bodies, run with the operation lock held
// ---------------------------------------------------------------------------

impl Shared {
    async fn login(&self, options: LoginOptions) -> Result<(), SessionError> {
        let op = new_correlation_id();
        let display_name = options.display_name.as_str();
        let session = ActiveSession::new(display_name);
        let session_id = session.id;
        self.state.write().await.session = Some(session);
        debug!(%op, %session_id, display_name, enable_tts = options.enable_tts, "logging in");

        match self.transport.login(&options).await {
            Ok(()) => {
                self.set_login_state(LoginState::LoggedIn);
                info!(%op, %session_id, display_name, "logged in");
                Ok(())
            }
            Err(err) => {
                self.state.write().await.session = None;
                self.set_login_state(LoginState::LoggedOut);
                warn!(%op, %err, "login failed");
                Err(SessionError::from_transport(err, SessionError::LoginFailed))
            }
        }
    }

    /// A transport that has already dropped the session answers
    /// `NotLoggedIn`; the local teardown still completes in that case.
    async fn logout(&self) -> Result<(), SessionError> {
        match self.login_state() {
            LoginState::LoggedIn => {}
            LoginState::LoggedOut => return Err(SessionError::NotLoggedIn),
            LoginState::LoggingIn | LoginState::LoggingOut => {
                return Err(SessionError::AlreadyInProgress)
            }
        }
        let op = new_correlation_id();
        self.set_login_state(LoginState::LoggingOut);
        debug!(%op, "logging out");

        match self.transport.logout().await {
            Ok(()) => {}
            Err(TransportError::NotLoggedIn) => {
                info!(%op, "transport already logged out; clearing local session");
            }
            Err(err) => {
                self.set_login_state(LoginState::LoggedIn);
                warn!(%op, %err, "logout failed");
                return Err(SessionError::from_transport(err, SessionError::LogoutFailed));
            }
        }

        let ended = self.state.write().await.session.take();
        self.feed.roster().clear().await;
        if let Some(session) = ended {
            for channel in session.memberships.into_keys() {
                self.events.publish(SessionEvent::ChannelLeft { channel });
            }
            info!(%op, session_id = %session.id, "logged out");
        }
        self.set_login_state(LoginState::LoggedOut);
        Ok(())
    }

    async fn join_channel(&self, channel: &str, volume: i32) -> Result<(), SessionError> {
        self.require_logged_in()?;
        if self.is_joined(channel).await {
            debug!(channel, "already joined");
            return Ok(());
        }
        let volume = Self::clamp_volume(volume);
        let op = new_correlation_id();
        let started = Instant::now();
        debug!(%op, channel, volume = volume.get(), "joining channel");

        if let Err(err) = self
            .transport
            .join_channel(channel, ChatCapability::AudioOnly)
            .await
        {
            self.feed.roster().clear_channel(channel).await;
            warn!(%op, channel, %err, "join failed");
            return Err(SessionError::from_transport(err, |e| {
                SessionError::JoinFailed(channel.to_string(), e)
            }));
        }

        if let Err(err) = self.transport.set_volume(channel, volume.get()).await {
            warn!(%op, channel, %err, "volume after join failed; leaving again");
            if let Err(leave_err) = self.transport.leave_channel(channel).await {
                warn!(%op, channel, err = %leave_err, "compensating leave failed");
            }
            self.feed.roster().clear_channel(channel).await;
            return Err(SessionError::from_transport(err, |e| {
                SessionError::JoinFailed(channel.to_string(), e)
            }));
        }

        if let Some(session) = self.state.write().await.session.as_mut() {
            session
                .memberships
                .insert(channel.to_string(), ChannelMembership::joined(channel, volume));
        }
        self.events.publish(SessionEvent::ChannelJoined {
            channel: channel.to_string(),
            volume: volume.get(),
        });
        info!(
            %op,
            channel,
            elapsed_secs = started.elapsed().as_secs_f64(),
            "joined channel"
        );
        Ok(())
    }

    async fn leave_channel(&self, channel: &str) -> Result<(), SessionError> {
        self.require_logged_in()?;
        if !self.is_joined(channel).await {
            debug!(channel, "not joined; nothing to leave");
            return Ok(());
        }
        let op = new_correlation_id();
        debug!(%op, channel, "leaving channel");

        self.transport.leave_channel(channel).await.map_err(|err| {
            warn!(%op, channel, %err, "leave failed");
            SessionError::from_transport(err, |e| SessionError::LeaveFailed(channel.to_string(), e))
        })?;

        let mut target_reset = false;
        if let Some(session) = self.state.write().await.session.as_mut() {
            session.memberships.remove(channel);
            if session.transmission.channel() == Some(channel) {
                session.transmission = TransmissionTarget::None;
                target_reset = true;
            }
        }
        self.feed.roster().clear_channel(channel).await;
        self.events.publish(SessionEvent::ChannelLeft {
            channel: channel.to_string(),
        });
        if target_reset {
            self.events
                .publish(SessionEvent::TransmissionChanged(TransmissionTarget::None));
            debug!(%op, channel, "transmission target reset");
        }
        info!(%op, channel, "left channel");
        Ok(())
    }

    async fn leave_all_channels(&self) -> Result<(), SessionError> {
        self.require_logged_in()?;
        let op = new_correlation_id();
        let joined = self.active_channels().await;

        if !joined.is_empty() {
            debug!(%op, count = joined.len(), "leaving all channels");
            self.transport.leave_all().await.map_err(|err| {
                warn!(%op, %err, "leave all failed");
                SessionError::from_transport(err, |e| SessionError::LeaveFailed("*".into(), e))
            })?;
        }

        let mut target_reset = false;
        if let Some(session) = self.state.write().await.session.as_mut() {
            session.memberships.clear();
            if session.transmission != TransmissionTarget::None {
                session.transmission = TransmissionTarget::None;
                target_reset = true;
            }
        }
        self.feed.roster().clear().await;
        for channel in joined {
            self.events.publish(SessionEvent::ChannelLeft { channel });
        }
        if target_reset {
            self.events
                .publish(SessionEvent::TransmissionChanged(TransmissionTarget::None));
        }
        info!(%op, "left all channels");
        Ok(())
    }

    async fn set_channel_volume(&self, channel: &str, volume: i32) -> Result<(), SessionError> {
        self.require_logged_in()?;
        if !self.is_joined(channel).await {
            return Err(SessionError::NotJoined(channel.to_string()));
        }
        let volume = Self::clamp_volume(volume);
        let op = new_correlation_id();
        debug!(%op, channel, volume = volume.get(), "setting volume");

        self.transport
            .set_volume(channel, volume.get())
            .await
            .map_err(|err| {
                warn!(%op, channel, %err, "set volume failed");
                SessionError::from_transport(err, |e| {
                    SessionError::VolumeFailed(channel.to_string(), e)
                })
            })?;

        if let Some(membership) = self
            .state
            .write()
            .await
            .session
            .as_mut()
            .and_then(|s| s.memberships.get_mut(channel))
        {
            membership.volume = volume;
        }
        self.events.publish(SessionEvent::VolumeChanged {
            channel: channel.to_string(),
            volume: volume.get(),
        });
        Ok(())
    }

    async fn set_transmission(&self, target: TransmissionTarget) -> Result<(), SessionError> {
        self.require_logged_in()?;
        if let TransmissionTarget::SingleChannel(channel) = &target {
            if !self.is_joined(channel).await {
                return Err(SessionError::ChannelNotJoined(channel.clone()));
            }
        }
        let op = new_correlation_id();
        debug!(%op, %target, "setting transmission");

        self.transport
            .set_transmission(target.mode(), target.channel())
            .await
            .map_err(|err| {
                warn!(%op, %err, "set transmission failed");
                SessionError::from_transport(err, SessionError::TransmissionFailed)
            })?;

        if let Some(session) = self.state.write().await.session.as_mut() {
            session.transmission = target.clone();
        }
        info!(%op, %target, "transmission set");
        self.events.publish(SessionEvent::TransmissionChanged(target));
        Ok(())
    }
}
