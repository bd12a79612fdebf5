//! Command module - operator input to command requests.

mod registry;

pub use registry::{CommandRegistry, CommandRequest, CommandSpec, Parsed, QUIT_TOKEN};
