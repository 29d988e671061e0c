use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use colored::Colorize;
use fileinventory::cli::{Cli, Commands};
use fileinventory::commands::{self, index::IndexOptions};
use fileinventory::output::{self, Verbosity};
use fileinventory::reconcile::Overrides;
use fileinventory::{InventoryContext, logging};
use std::io;
use std::process;

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e:#}", "Error:".red().bold());
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let verbosity = Verbosity::from_flags(cli.verbose, cli.quiet);
    output::set_verbosity(verbosity);
    if let Err(e) = logging::init(verbosity) {
        output::warning(&format!("Logging disabled: {e}"));
    }

    if let Commands::Completion { shell } = cli.command {
        print_completions(shell, &mut Cli::command());
        return Ok(());
    }

    let ctx = InventoryContext::new(cli.db, cli.config)?;

    match cli.command {
        Commands::Index {
            scan,
            category,
            subcategory,
            label,
            tags,
            reindex_all,
            dry_run,
        } => {
            let options = IndexOptions {
                overrides: Overrides::new(category, subcategory, label, tags),
                reindex_all,
                dry_run,
            };
            commands::index::execute(&ctx, &scan, options)?;
        }
        Commands::Ls { scan, new } => {
            commands::ls::execute(&ctx, &scan, new)?;
        }
        Commands::Health { scan, list } => {
            commands::health::execute(&ctx, &scan, list)?;
        }
        Commands::Completion { .. } => {}
    }

    Ok(())
}

fn print_completions<G: Generator>(generator: G, cmd: &mut clap::Command) {
    generate(
        generator,
        cmd,
        cmd.get_name().to_string(),
        &mut io::stdout(),
    );
}
