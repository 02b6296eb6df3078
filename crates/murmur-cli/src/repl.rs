//! Line-oriented command loop over stdin.

use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use murmur_common::{MurmurError, SessionEvent, TransmissionTarget};
use murmur_session::{retry, EchoTransport, Intent, RetryPolicy, SessionError, SessionManager};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::settings::Identity;
use crate::status;

const HELP: &[&str] = &[
    "login                      log in with the configured display name",
    "logout                     log out and leave every channel",
    "join <channel>             join a channel",
    "leave <channel>            leave a channel",
    "leave-all                  leave every channel",
    "volume <channel> <n>       set listen volume (-50..40, clamped)",
    "talk none|all|<channel>    choose where the microphone goes",
    "listen-all | listen-team   listen intents",
    "talk-all | talk-team       talk intents",
    "mute-speaker | mute-mic    mute intents",
    "roster <channel>           list participants",
    "status                     show login state and channels",
    "simulate-join <ch> <name>  add a remote participant",
    "simulate-leave <ch> <name> remove a remote participant",
    "help                       this list",
    "quit                       log out and exit",
];

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login,
    Logout,
    Join(String),
    Leave(String),
    LeaveAll,
    Volume(String, i32),
    Talk(TransmissionTarget),
    Intent(Intent),
    Roster(String),
    Status,
    SimulateJoin { channel: String, name: String },
    SimulateLeave { channel: String, name: String },
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseCommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command `{0}`; type `help`")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("not a number: {0}")]
    BadNumber(String),
}

fn one_arg(args: &[&str], usage: &'static str) -> Result<String, ParseCommandError> {
    match args {
        [arg] => Ok((*arg).to_string()),
        _ => Err(ParseCommandError::Usage(usage)),
    }
}

/// `<channel> <name...>`; the name may contain spaces.
fn channel_and_name(
    args: &[&str],
    usage: &'static str,
) -> Result<(String, String), ParseCommandError> {
    match args {
        [channel, name @ ..] if !name.is_empty() => Ok((channel.to_string(), name.join(" "))),
        _ => Err(ParseCommandError::Usage(usage)),
    }
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&head, args)) = words.split_first() else {
            return Err(ParseCommandError::Empty);
        };

        if let Ok(intent) = head.parse::<Intent>() {
            return Ok(Self::Intent(intent));
        }

        let command = match head {
            "login" => Self::Login,
            "logout" => Self::Logout,
            "join" => Self::Join(one_arg(args, "join <channel>")?),
            "leave" => Self::Leave(one_arg(args, "leave <channel>")?),
            "leave-all" => Self::LeaveAll,
            "volume" => match args {
                [channel, value] => {
                    let volume = value
                        .parse::<i32>()
                        .map_err(|_| ParseCommandError::BadNumber(value.to_string()))?;
                    Self::Volume(channel.to_string(), volume)
                }
                _ => return Err(ParseCommandError::Usage("volume <channel> <n>")),
            },
            "talk" => match one_arg(args, "talk none|all|<channel>")?.as_str() {
                "none" => Self::Talk(TransmissionTarget::None),
                "all" => Self::Talk(TransmissionTarget::AllJoinedChannels),
                channel => Self::Talk(TransmissionTarget::single(channel)),
            },
            "roster" => Self::Roster(one_arg(args, "roster <channel>")?),
            "status" => Self::Status,
            "simulate-join" => {
                let (channel, name) = channel_and_name(args, "simulate-join <channel> <name>")?;
                Self::SimulateJoin { channel, name }
            }
            "simulate-leave" => {
                let (channel, name) = channel_and_name(args, "simulate-leave <channel> <name>")?;
                Self::SimulateLeave { channel, name }
            }
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(ParseCommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

// ---------------------------------------------------------------------------
// Repl
// ---------------------------------------------------------------------------

pub enum Reply {
    Lines(Vec<String>),
    Quit,
}

impl Reply {
    fn line(line: impl Into<String>) -> Self {
        Self::Lines(vec![line.into()])
    }
}

pub struct Repl {
    manager: Arc<SessionManager>,
    echo: Arc<EchoTransport>,
    identity: Identity,
    retry: RetryPolicy,
    timeout: Option<Duration>,
}

impl Repl {
    pub fn new(
        manager: Arc<SessionManager>,
        echo: Arc<EchoTransport>,
        identity: Identity,
        retry: RetryPolicy,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            manager,
            echo,
            identity,
            retry,
            timeout,
        }
    }

    /// Read commands from stdin until `quit` or end of input, then log out.
    pub async fn run(&self) -> Result<(), MurmurError> {
        let printer = spawn_event_printer(self.manager.subscribe());
        println!("murmur ready, type `help` for commands");

        let mut input = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = input.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<Command>() {
                Ok(command) => match self.execute(command).await {
                    Reply::Lines(lines) => {
                        for line in lines {
                            println!("{line}");
                        }
                    }
                    Reply::Quit => break,
                },
                Err(e) => println!("{e}"),
            }
        }

        if self.manager.is_logged_in() {
            if let Err(e) = self.manager.logout().await {
                warn!(error = %e, "logout on exit failed");
            }
        }
        printer.abort();
        Ok(())
    }

    pub async fn execute(&self, command: Command) -> Reply {
        debug!(?command, "executing");
        let started = Instant::now();
        let manager = &*self.manager;

        let outcome = match command {
            Command::Login => {
                let identity = &self.identity;
                self.timed(manager.login(&identity.display_name, identity.enable_tts))
                    .await
                    .map(|_| status::took("Logged in", started.elapsed()))
            }
            Command::Logout => self
                .timed(manager.logout())
                .await
                .map(|_| status::took("Logged out", started.elapsed())),
            Command::Join(channel) => {
                let name = channel.as_str();
                self.timed(retry(self.retry, move || manager.join_channel(name)))
                    .await
                    .map(|_| status::took(&format!("Joined {channel}"), started.elapsed()))
            }
            Command::Leave(channel) => self
                .timed(manager.leave_channel(&channel))
                .await
                .map(|_| format!("Left {channel}")),
            Command::LeaveAll => self
                .timed(manager.leave_all_channels())
                .await
                .map(|_| status::took("Left all channels", started.elapsed())),
            Command::Volume(channel, volume) => {
                match self.timed(manager.set_channel_volume(&channel, volume)).await {
                    Ok(()) => {
                        let stored = manager
                            .channel_volume(&channel)
                            .await
                            .map_or(volume, |v| v.get());
                        Ok(format!("Channel {channel} volume set to {stored}"))
                    }
                    Err(e) => Err(e),
                }
            }
            Command::Talk(target) => {
                let line = format!("Transmission set to {target}");
                self.timed(manager.set_transmission(target))
                    .await
                    .map(|_| line)
            }
            Command::Intent(intent) => self
                .timed(intent.apply(manager))
                .await
                .map(|_| status::took(&format!("Applied {intent}"), started.elapsed())),
            Command::Roster(channel) => {
                let participants = manager.roster(&channel).await;
                return Reply::Lines(status::roster(&channel, &participants));
            }
            Command::Status => {
                let lines = status::report(
                    manager.login_state(),
                    manager.session_id().await,
                    &manager.memberships().await,
                    &manager.transmitting_channels().await,
                );
                return Reply::Lines(lines);
            }
            Command::SimulateJoin { channel, name } => {
                self.echo.inject_participant(&channel, &name).await;
                Ok(format!("Simulated {name} joining {channel}"))
            }
            Command::SimulateLeave { channel, name } => {
                match self.echo.remove_participant(&channel, &name).await {
                    Some(_) => Ok(format!("Simulated {name} leaving {channel}")),
                    None => Ok(format!("No participant {name} in {channel}")),
                }
            }
            Command::Help => {
                return Reply::Lines(HELP.iter().map(|l| l.to_string()).collect());
            }
            Command::Quit => return Reply::Quit,
        };

        match outcome {
            Ok(line) => Reply::line(line),
            Err(e) => Reply::line(format!("error: {e}")),
        }
    }

    /// Apply the configured per-command timeout. The transport call itself
    /// keeps running in the manager if the wait is abandoned.
    async fn timed<T>(
        &self,
        fut: impl Future<Output = Result<T, SessionError>>,
    ) -> Result<T, MurmurError> {
        match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, fut).await {
                Ok(result) => result.map_err(MurmurError::from),
                Err(_) => Err(MurmurError::Timeout(limit)),
            },
            None => fut.await.map_err(MurmurError::from),
        }
    }
}

fn spawn_event_printer(mut rx: broadcast::Receiver<SessionEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Some(line) = status::describe_event(&event) {
                        println!("  * {line}");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event printer lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
