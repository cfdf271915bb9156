use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "hireflow",
    about = "Access control and hiring workflows for agencies and talent",
    version
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the role to permission table in effect
    Roles(RolesArgs),
    /// Walk through the hiring scenarios against an in-memory store
    Demo,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct RolesArgs {
    /// CSV file of role,permission rows replacing the built-in table
    #[arg(long)]
    pub(crate) table: Option<PathBuf>,
}
