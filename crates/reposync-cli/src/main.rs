use std::time::Duration;

use clap::Parser;
use cli::{Args, Commands};
use nu_ansi_term::Color::{Green, Red, Yellow};
use reposync_core::{clean, sync, RepoContext, RepoResult, SyncOutcome, SyncReport};
use reposync_dl::http_client::configure_http_client;
use tracing::{info, warn};

use crate::{
    logging::setup_logging,
    status::display_status,
    utils::{set_color, Colored},
};

mod cli;
mod logging;
mod status;
mod utils;

fn summarize_sync(report: &SyncReport) {
    let reconcile = &report.reconcile;
    info!(
        "{} {}: {} desired, {} downloaded, {} removed, {} unchanged",
        Colored(Green, "Synced"),
        report.channel,
        report.desired,
        reconcile.downloaded.len(),
        reconcile.removed.len(),
        reconcile.kept.len()
    );

    if !reconcile.failed.is_empty() {
        warn!(
            "{} download(s) failed:",
            Colored(Red, reconcile.failed.len())
        );
        for failed in &reconcile.failed {
            warn!("  {} ({}): {}", failed.filename, failed.url, failed.error);
        }
    }

    info!(
        "Wrote {} record(s) to {}",
        report.records,
        report.api_file.display()
    );
}

fn handle_cli() -> RepoResult<()> {
    let args = Args::parse();

    setup_logging(&args);
    set_color(!args.no_color);

    if args.user_agent.is_some() || args.timeout.is_some() {
        configure_http_client(|config| {
            if let Some(user_agent) = args.user_agent.clone() {
                config.user_agent = Some(user_agent);
            }
            if let Some(secs) = args.timeout {
                config.timeout = Some(Duration::from_secs(secs));
            }
        });
    }

    let ctx = RepoContext::new(args.settings());

    match args.command.unwrap_or(Commands::Sync) {
        Commands::Sync => {
            match sync::sync(&ctx)? {
                SyncOutcome::TemplateCreated(path) => {
                    info!(
                        "Created {}. Add package sources and run again.",
                        Colored(Yellow, path.display())
                    );
                }
                SyncOutcome::Synced(report) => summarize_sync(&report),
            }
        }
        Commands::Clean => {
            let report = clean::clean(&ctx)?;
            info!(
                "Cleaned {}: removed {} package(s) and {} database entries, reset {}",
                ctx.settings().channel,
                report.removed_packages.len(),
                report.removed_database.len(),
                report.api_file.display()
            );
        }
        Commands::Status => display_status(&ctx)?,
    }

    Ok(())
}

fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli() {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}
