//! Telnet-style remote control command dispatcher.
//!
//! Grounded on `lib/remotecontrol/src/remotecontrol.c`'s `olsr_telnet_command`
//! table and its `olsr_telnet_result` enum: a command is a name plus a
//! handler that writes to the telnet session's output buffer and returns
//! one of a small set of outcomes. The "continuous output" commands (e.g.
//! `log`, which streams log events to the console until stopped) register a
//! stop callback on the session the way `_start_logging`/`_stop_logging`
//! install and clear `telnet->stop_handler`.

use std::collections::HashMap;
use std::io::Write;

use thiserror::Error;

/// Outcome of executing one remote-control command, per spec.md §9.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandResult {
    /// The command ran to completion; the session stays open for the next
    /// command.
    Active,
    /// The command started a continuous output stream (e.g. `log`); the
    /// session remains open until the registered stop closure is invoked.
    Continuous,
    /// The command asked to close the session (e.g. `quit`).
    Quit,
    /// The output sink could not accept more data.
    BufferError,
    /// No command with this name is registered.
    UnknownCommand,
}

#[derive(Error, Debug)]
pub enum RemoteControlError {
    #[error("command '{0}' already registered")]
    DuplicateCommand(String),
}

/// One remote-control command: matched by name, invoked with the
/// remainder of the input line as `params`, writing its reply to `out`.
///
/// Mirrors `struct olsr_telnet_command`'s `{name, help, handler}` triple;
/// `help` is folded into [`Command::help`] instead of a separate struct
/// field since Rust trait objects carry their own vtable already.
pub trait Command: Send + Sync {
    fn name(&self) -> &'static str;

    fn help(&self) -> &'static str;

    /// Execute the command. `session` gives continuous commands a place to
    /// register their stop closure.
    fn execute(&self, params: &str, out: &mut dyn Write, session: &mut Session) -> CommandResult;
}

/// Per-connection telnet state: the pending continuous-output stop hook, if
/// one is registered.
///
/// Grounded on `olsr_telnet_session`'s `stop_handler`/`stop_data` fields:
/// the original stores a function pointer plus an opaque payload; here a
/// boxed closure captures whatever state the continuous command needs.
#[derive(Default)]
pub struct Session {
    stop: Option<Box<dyn FnOnce() + Send>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `stop` to run once, when this session's continuous output
    /// is cancelled or the session is torn down. Matches
    /// `_handle_log`'s "you cannot stack continuous output commands" rule:
    /// a session may have at most one stop hook at a time.
    pub fn set_continuous_stop(&mut self, stop: impl FnOnce() + Send + 'static) {
        self.stop = Some(Box::new(stop));
    }

    pub fn has_continuous_output(&self) -> bool {
        self.stop.is_some()
    }

    /// Invoke and clear the stop hook, if any. Called both when a command
    /// explicitly cancels continuous output and when the session as a
    /// whole is torn down (`_handle_session_cleanup`).
    pub fn stop_continuous_output(&mut self) {
        if let Some(stop) = self.stop.take() {
            stop();
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop_continuous_output();
    }
}

/// The dispatcher: a name-keyed table of registered commands, mirroring
/// `_telnet_cmds[]`.
#[derive(Default)]
pub struct CommandDispatcher {
    commands: HashMap<&'static str, Box<dyn Command>>,
}

impl CommandDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, command: Box<dyn Command>) -> Result<(), RemoteControlError> {
        let name = command.name();
        if self.commands.contains_key(name) {
            return Err(RemoteControlError::DuplicateCommand(name.to_string()));
        }
        self.commands.insert(name, command);
        Ok(())
    }

    /// Split `line` into a command name and its parameter string, look up
    /// the command, and run it. Returns `UnknownCommand` without touching
    /// `out` if no such command is registered, matching the original's
    /// "unknown command" telnet reply path.
    pub fn dispatch(&self, line: &str, out: &mut dyn Write, session: &mut Session) -> CommandResult {
        let mut parts = line.trim().splitn(2, ' ');
        let name = parts.next().unwrap_or("");
        let params = parts.next().unwrap_or("");

        match self.commands.get(name) {
            Some(command) => {
                tracing::debug!(command = name, "dispatching remote-control command");
                command.execute(params, out, session)
            }
            None => {
                tracing::debug!(command = name, "unknown remote-control command");
                CommandResult::UnknownCommand
            }
        }
    }

    pub fn commands(&self) -> impl Iterator<Item = &dyn Command> {
        self.commands.values().map(|c| c.as_ref())
    }
}
