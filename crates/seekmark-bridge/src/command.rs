//! Named, versioned page commands
//!
//! A command is addressed by `name@version`. Callers never ship code into
//! the page; they ship a [`CommandInvocation`] and the page side looks the
//! command up.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

use seekmark_messaging::{EpisodeTime, ScriptResult};

use crate::error::BridgeError;
use crate::page::PageContext;
use crate::seek::{read_current_time, seek_to};
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandId {
    pub name: &'static str,
    pub version: u32,
}

impl std::fmt::Display for CommandId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// Serializable call of a page command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandInvocation {
    pub name: String,
    pub version: u32,
    #[serde(default)]
    pub args: Value,
}

impl CommandInvocation {
    pub fn new(id: CommandId, args: Value) -> Self {
        Self {
            name: id.name.to_string(),
            version: id.version,
            args,
        }
    }
}

pub trait PageCommand: Send + Sync {
    fn id(&self) -> CommandId;

    fn run(&self, page: &PageContext, args: &Value) -> Result<Value>;
}

#[derive(Debug, Deserialize)]
struct SeekArgs {
    #[serde(rename = "timeMs")]
    time_ms: EpisodeTime,
}

/// `seek@1`: `{"timeMs": u64}` → `ScriptResult`
pub struct SeekCommand;

impl SeekCommand {
    pub const ID: CommandId = CommandId {
        name: "seek",
        version: 1,
    };

    pub fn invocation(time_ms: EpisodeTime) -> CommandInvocation {
        CommandInvocation::new(Self::ID, json!({ "timeMs": time_ms }))
    }
}

impl PageCommand for SeekCommand {
    fn id(&self) -> CommandId {
        Self::ID
    }

    fn run(&self, page: &PageContext, args: &Value) -> Result<Value> {
        let args = SeekArgs::deserialize(args).map_err(|e| BridgeError::InvalidArguments {
            command: Self::ID.to_string(),
            message: e.to_string(),
        })?;

        let result: ScriptResult = seek_to(page, args.time_ms).into();
        Ok(serde_json::to_value(result)?)
    }
}

/// `current-time@1`: no arguments → milliseconds or `null`
pub struct CurrentTimeCommand;

impl CurrentTimeCommand {
    pub const ID: CommandId = CommandId {
        name: "current-time",
        version: 1,
    };

    pub fn invocation() -> CommandInvocation {
        CommandInvocation::new(Self::ID, Value::Null)
    }
}

impl PageCommand for CurrentTimeCommand {
    fn id(&self) -> CommandId {
        Self::ID
    }

    fn run(&self, page: &PageContext, _args: &Value) -> Result<Value> {
        Ok(json!(read_current_time(page)))
    }
}

#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<(String, u32), Arc<dyn PageCommand>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding `seek@1` and `current-time@1`
    pub fn with_builtin_commands() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(SeekCommand));
        registry.register(Arc::new(CurrentTimeCommand));
        registry
    }

    /// Returns the command previously registered under the same id
    pub fn register(&mut self, command: Arc<dyn PageCommand>) -> Option<Arc<dyn PageCommand>> {
        let id = command.id();
        self.commands.insert((id.name.to_string(), id.version), command)
    }

    pub fn contains(&self, name: &str, version: u32) -> bool {
        self.commands.contains_key(&(name.to_string(), version))
    }

    pub fn dispatch(&self, page: &PageContext, invocation: &CommandInvocation) -> Result<Value> {
        let command = self
            .commands
            .get(&(invocation.name.clone(), invocation.version))
            .ok_or_else(|| BridgeError::UnknownCommand {
                name: invocation.name.clone(),
                version: invocation.version,
            })?;

        tracing::debug!(command = %command.id(), "Running page command");

        command.run(page, &invocation.args)
    }
}
