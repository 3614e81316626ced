use clap::{Args, Subcommand};
use fifoglue_endpoint::Registry;
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod list;
pub mod listen;
pub mod send;
pub mod unregister;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Register an endpoint and print the messages it receives.
    Listen(ListenArgs),
    /// Send a single message to an endpoint.
    Send(SendArgs),
    /// Remove an endpoint, stopping its listener if one is attached.
    Unregister(UnregisterArgs),
    /// List the endpoints registered in the namespace.
    List(ListArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, registry: &Registry, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Listen(args) => listen::run(args, registry, format),
        Command::Send(args) => send::run(args, registry),
        Command::Unregister(args) => unregister::run(args, registry),
        Command::List(args) => list::run(args, registry, format),
        Command::Version(args) => version::run(args, registry),
    }
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Endpoint name to register.
    pub name: String,
    /// Exit after receiving N messages.
    #[arg(long)]
    pub count: Option<usize>,
    /// Exit after receiving a message with this payload.
    #[arg(long, value_name = "PAYLOAD")]
    pub until: Option<String>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Destination endpoint name.
    pub name: String,
    /// Message header.
    #[arg(long, default_value = "msg")]
    pub header: String,
    /// Payload string.
    #[arg(long, conflicts_with = "file")]
    pub data: Option<String>,
    /// Read the payload from a UTF-8 file.
    #[arg(long, conflicts_with = "data")]
    pub file: Option<PathBuf>,
    /// Fail instead of waiting when no listener is attached or it is full.
    #[arg(long)]
    pub no_wait: bool,
}

#[derive(Args, Debug)]
pub struct UnregisterArgs {
    /// Endpoint name to remove.
    pub name: String,
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show build and configuration details.
    #[arg(long)]
    pub extended: bool,
}
