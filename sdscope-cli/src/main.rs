mod app;
mod commands;
mod output;

use clap::Parser;

use crate::app::{Cli, Command};

fn main() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        eprintln!("\nCancelled.");
        std::process::exit(130);
    })
    .expect("failed to set Ctrl+C handler");

    let cli = Cli::parse();

    // Show sdscope warnings on stderr unless --json; --verbose enables debug; RUST_LOG overrides
    if !cli.global.json {
        let level = if cli.global.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        };
        env_logger::Builder::new()
            .filter_module("sdscope", level)
            .parse_default_env()
            .target(env_logger::Target::Stderr)
            .format_timestamp(None)
            .format_module_path(false)
            .format_target(false)
            .init();
    }

    match &cli.command {
        Command::Decode { input, all } => commands::decode::run(input, *all, &cli.global),
        Command::Delegation {
            uac,
            spns,
            targets,
            rbcd,
        } => commands::delegation::run(
            &commands::delegation::DelegationArgs {
                uac: *uac,
                spns,
                targets,
                rbcd: rbcd.as_deref(),
            },
            &cli.global,
        ),
        Command::Readers { input } => commands::delegation::run_readers(input, &cli.global),
        Command::Sid { value } => commands::sid::run(value, &cli.global),
        Command::Mask { mask, object_type } => {
            commands::mask::run(*mask, object_type.as_deref(), &cli.global)
        }
        Command::Batch { dir, recursive } => commands::batch::run(dir, *recursive, &cli.global),
    }
}
