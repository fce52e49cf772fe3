use clap::Parser;
use subcommands::Subcommand;

mod chart;
mod classify;
mod config;
mod date_range;
mod events;
mod mail;
mod reports;
mod subcommands;
mod table;
mod warehouse;

#[derive(Parser, Debug)]
struct CliArgs {
    /// The command to perform.
    #[command(subcommand)]
    command: Subcommand,
}

fn main() -> anyhow::Result<()> {
    // set up tracing
    tracing_subscriber::fmt::init();

    let CliArgs { command } = CliArgs::parse();

    match command {
        Subcommand::Report(args) => {
            subcommands::report::main(args)?;
        }
        Subcommand::Notify(args) => {
            subcommands::notify::main(args)?;
        }
        Subcommand::Run(args) => {
            subcommands::run::main(args)?;
        }
    }

    Ok(())
}
