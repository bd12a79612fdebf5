//! Command registry for turning operator input into command requests.
//!
//! The registry maps a one-letter token to the command it sends, how many
//! params it needs and the prompt shown when they are missing. Tokens are
//! case-insensitive. `q` is reserved for quitting.
//!
//! # Example
//!
//! ```
//! use alex_link::command::{CommandRegistry, Parsed};
//! use alex_link::protocol::CommandKind;
//!
//! let registry = CommandRegistry::new();
//!
//! let Parsed::Command(request) = registry.parse("f 50 80").unwrap() else {
//!     panic!("expected a command");
//! };
//! assert_eq!(request.command, CommandKind::Forward.as_u8());
//! assert_eq!(request.params, vec![50, 80]);
//! ```

use std::collections::HashMap;

use bytes::Bytes;

use crate::error::{LinkError, Result};
use crate::protocol::{encode_command, CommandKind, Packet, PacketType};

/// Token that ends the session.
pub const QUIT_TOKEN: &str = "q";

/// One entry in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    /// Input token, lower case.
    pub token: &'static str,
    /// Command sent to the device.
    pub kind: CommandKind,
    /// Params the command needs.
    pub param_count: usize,
    /// Short name for the help line.
    pub description: &'static str,
    /// Shown when params are missing.
    pub prompt: Option<&'static str>,
}

const DEFAULT_COMMANDS: [CommandSpec; 11] = [
    CommandSpec {
        token: "f",
        kind: CommandKind::Forward,
        param_count: 2,
        description: "forward",
        prompt: Some("Enter distance in cm and power in %:"),
    },
    CommandSpec {
        token: "b",
        kind: CommandKind::Reverse,
        param_count: 2,
        description: "reverse",
        prompt: Some("Enter distance in cm and power in %:"),
    },
    CommandSpec {
        token: "l",
        kind: CommandKind::TurnLeft,
        param_count: 2,
        description: "turn left",
        prompt: Some("Enter degrees to turn left and power in %:"),
    },
    CommandSpec {
        token: "r",
        kind: CommandKind::TurnRight,
        param_count: 2,
        description: "turn right",
        prompt: Some("Enter degrees to turn right and power in %:"),
    },
    CommandSpec {
        token: "s",
        kind: CommandKind::Stop,
        param_count: 0,
        description: "stop",
        prompt: None,
    },
    CommandSpec {
        token: "c",
        kind: CommandKind::ClearStats,
        param_count: 0,
        description: "clear stats",
        prompt: None,
    },
    CommandSpec {
        token: "g",
        kind: CommandKind::GetStats,
        param_count: 0,
        description: "get stats",
        prompt: None,
    },
    CommandSpec {
        token: "o",
        kind: CommandKind::Open,
        param_count: 0,
        description: "open",
        prompt: None,
    },
    CommandSpec {
        token: "p",
        kind: CommandKind::Close,
        param_count: 0,
        description: "close",
        prompt: None,
    },
    CommandSpec {
        token: "k",
        kind: CommandKind::Scan,
        param_count: 0,
        description: "scan",
        prompt: None,
    },
    CommandSpec {
        token: "d",
        kind: CommandKind::Drop,
        param_count: 0,
        description: "drop",
        prompt: None,
    },
];

/// A command ready for the codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub packet_type: PacketType,
    pub command: u8,
    pub params: Vec<u32>,
}

impl CommandRequest {
    /// Request for a COMMAND packet.
    pub fn new(kind: CommandKind, params: Vec<u32>) -> Self {
        Self {
            packet_type: PacketType::Command,
            command: kind.as_u8(),
            params,
        }
    }

    /// Decoded packet this request produces.
    pub fn to_packet(&self) -> Result<Packet> {
        Packet::new(self.packet_type, self.command, &self.params)
    }

    /// Wire bytes for this request.
    pub fn encode(&self) -> Result<Bytes> {
        encode_command(self.packet_type, self.command, &self.params)
    }
}

/// Outcome of parsing one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    /// Complete command.
    Command(CommandRequest),
    /// Operator asked to quit.
    Quit,
    /// Command recognised but params are missing.
    NeedParams {
        spec: CommandSpec,
        given: Vec<u32>,
    },
}

/// Registry mapping input tokens to commands.
pub struct CommandRegistry {
    /// Specs in registration order (for help text).
    commands: Vec<CommandSpec>,
    /// Token to index in `commands`.
    by_token: HashMap<String, usize>,
}

impl CommandRegistry {
    /// Registry with the standard command table.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for spec in DEFAULT_COMMANDS {
            registry.register(spec);
        }
        registry
    }

    /// Registry with no commands.
    pub fn empty() -> Self {
        Self {
            commands: Vec::new(),
            by_token: HashMap::new(),
        }
    }

    /// Register a command, replacing any existing entry for its token.
    ///
    /// The quit token cannot be registered.
    pub fn register(&mut self, spec: CommandSpec) {
        let token = spec.token.to_ascii_lowercase();
        if token == QUIT_TOKEN {
            tracing::warn!("Ignoring registration of reserved token '{}'", token);
            return;
        }
        match self.by_token.get(&token) {
            Some(&index) => self.commands[index] = spec,
            None => {
                self.by_token.insert(token, self.commands.len());
                self.commands.push(spec);
            }
        }
    }

    /// Look up a command by token (case-insensitive).
    pub fn get(&self, token: &str) -> Option<&CommandSpec> {
        self.by_token
            .get(&token.to_ascii_lowercase())
            .map(|&index| &self.commands[index])
    }

    /// All commands in registration order.
    pub fn commands(&self) -> &[CommandSpec] {
        &self.commands
    }

    /// One-line help listing every token.
    pub fn help(&self) -> String {
        let entries: Vec<String> = self
            .commands
            .iter()
            .map(|spec| format!("{}={}", spec.token, spec.description))
            .chain(std::iter::once(format!("{QUIT_TOKEN}=exit")))
            .collect();
        format!("Command ({})", entries.join(", "))
    }

    /// Parse a line such as `f 50 80` or `g`.
    ///
    /// Params beyond the command's count are dropped.
    ///
    /// # Errors
    ///
    /// - [`LinkError::InvalidInput`] for an empty line or a param that is
    ///   not an unsigned integer
    /// - [`LinkError::UnknownCommand`] for a token not in the registry
    pub fn parse(&self, line: &str) -> Result<Parsed> {
        let mut words = line.split_whitespace();
        let token = words
            .next()
            .ok_or_else(|| LinkError::InvalidInput("empty input".to_string()))?;

        if token.eq_ignore_ascii_case(QUIT_TOKEN) {
            return Ok(Parsed::Quit);
        }

        let spec = *self
            .get(token)
            .ok_or_else(|| LinkError::UnknownCommand(token.to_string()))?;
        let given = parse_params(words)?;
        Ok(finish(spec, given))
    }

    /// Add params read after a [`Parsed::NeedParams`] prompt.
    pub fn complete(&self, spec: &CommandSpec, given: &[u32], line: &str) -> Result<Parsed> {
        let mut params = given.to_vec();
        params.extend(parse_params(line.split_whitespace())?);
        Ok(finish(*spec, params))
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_params<'a>(words: impl Iterator<Item = &'a str>) -> Result<Vec<u32>> {
    words
        .map(|word| {
            word.parse::<u32>()
                .map_err(|_| LinkError::InvalidInput(format!("not a number: '{word}'")))
        })
        .collect()
}

fn finish(spec: CommandSpec, mut params: Vec<u32>) -> Parsed {
    if params.len() < spec.param_count {
        return Parsed::NeedParams {
            spec,
            given: params,
        };
    }
    params.truncate(spec.param_count);
    Parsed::Command(CommandRequest::new(spec.kind, params))
}
