mod commands;
mod terminal;

use beacon_common::config::Config;
use commands::{CommandLine, Commands, discover, resolve, scan};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();
    let cfg: Config = commands.to_config();

    logging::init();
    print::banner(cfg.quiet);

    let outcome = match commands.command {
        Commands::Discover { target } => discover::discover(target, &cfg).await,
        Commands::Scan { target } => scan::scan(target, &cfg).await,
        Commands::Resolve { target, raw } => resolve::resolve(&target, raw, &cfg).await,
    };

    print::end_of_program(cfg.quiet);
    outcome
}
