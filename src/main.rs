mod cli;
mod demo;
mod server;

use clap::Parser;
use hireflow::config::AppConfig;
use hireflow::error::AppError;

use crate::cli::{Cli, Command, RolesArgs, ServeArgs};

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Roles(args) => print_roles(args),
        Command::Demo => demo::run(),
    }
}

fn print_roles(args: RolesArgs) -> Result<(), AppError> {
    let mut access = AppConfig::load()?.access;
    if let Some(table) = args.table {
        access.role_table = Some(table);
    }

    let registry = hireflow::access::RoleRegistry::load(&access)?;
    match &access.role_table {
        Some(path) => println!("Role table: {}", path.display()),
        None => println!("Role table: built-in"),
    }
    for (role, permissions) in registry.entries() {
        let names = permissions
            .iter()
            .map(|permission| permission.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        println!("- {role}: {names}");
    }
    Ok(())
}
