use clap::Parser;
use partonomy_tools::cli::{Cli, Commands};
use partonomy_tools::commands;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Treemap(args) => commands::treemap::run(args),
        Commands::Tree(args) => commands::tree::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
