use nu_ansi_term::Color::{Blue, Cyan, Green, Magenta, Red, Yellow};
use reposync_core::{status, RepoContext, RepoResult, StatusReport};
use reposync_utils::bytes::format_bytes;
use tabled::{
    builder::Builder,
    settings::{peaker::PriorityMax, themes::BorderCorrection, Panel, Style, Width},
};
use tracing::info;

use crate::utils::{term_width, Colored};

fn render(builder: Builder, title: &str) -> String {
    builder
        .build()
        .with(Panel::header(title))
        .with(Style::rounded())
        .with(BorderCorrection {})
        .with(Width::wrap(term_width()).priority(PriorityMax::default()))
        .to_string()
}

fn size_or_missing(size: Option<u64>) -> String {
    match size {
        Some(size) => Colored(Magenta, format_bytes(size, 2)).to_string(),
        None => Colored(Red, "not found").to_string(),
    }
}

fn overview_table(report: &StatusReport) -> String {
    let mut builder = Builder::new();
    builder.push_record(["Channel".to_string(), Colored(Cyan, report.channel).to_string()]);
    builder.push_record(["Database".to_string(), Colored(Blue, &report.db_base_name).to_string()]);
    builder.push_record([
        "Channel directory".to_string(),
        if report.repo_dir_exists {
            report.repo_dir.display().to_string()
        } else {
            format!("{} ({})", report.repo_dir.display(), Colored(Red, "missing"))
        },
    ]);
    builder.push_record(["API directory".to_string(), report.api_dir.display().to_string()]);
    builder.push_record([
        "Sources file".to_string(),
        format!(
            "{} {}",
            report.sources_file.path.display(),
            size_or_missing(report.sources_file.size)
        ),
    ]);
    render(builder, "Repository")
}

fn packages_table(report: &StatusReport) -> String {
    let mut builder = Builder::new();
    builder.push_record(["Package", "Size"]);
    for package in &report.packages {
        builder.push_record([
            Colored(Green, &package.name).to_string(),
            Colored(Magenta, format_bytes(package.size, 2)).to_string(),
        ]);
    }
    builder.push_record([
        format!("{} package(s)", report.packages.len()),
        format_bytes(report.total_package_size(), 2),
    ]);
    render(builder, "Packages")
}

fn database_table(report: &StatusReport) -> String {
    let mut builder = Builder::new();
    builder.push_record(["Entry", "Size", "Target"]);
    for entry in &report.database {
        builder.push_record([
            entry.name.clone(),
            Colored(Magenta, format_bytes(entry.size, 2)).to_string(),
            entry
                .link_target
                .as_ref()
                .map(|target| Colored(Yellow, target.display()).to_string())
                .unwrap_or_default(),
        ]);
    }
    render(builder, "Database")
}

fn metadata_table(report: &StatusReport) -> String {
    let mut builder = Builder::new();
    builder.push_record(["Channel", "Size", "Path"]);
    for (channel, file) in &report.api_files {
        builder.push_record([
            Colored(Cyan, channel).to_string(),
            size_or_missing(file.size),
            file.path.display().to_string(),
        ]);
    }
    render(builder, "Metadata")
}

/// Tables for `report`, in display order.
fn status_tables(report: &StatusReport) -> Vec<String> {
    let mut tables = vec![overview_table(report)];
    if report.repo_dir_exists {
        if !report.packages.is_empty() {
            tables.push(packages_table(report));
        }
        tables.push(database_table(report));
    }
    tables.push(metadata_table(report));
    tables
}

/// Prints the channel status to stdout. Hints go through the logger.
pub fn display_status(ctx: &RepoContext) -> RepoResult<()> {
    let report = status::status(ctx)?;

    for table in status_tables(&report) {
        println!("{table}");
    }

    if !report.repo_dir_exists {
        info!(
            "Channel directory does not exist yet. Run {} first.",
            Colored(Green, "reposync sync")
        );
    } else if report.packages.is_empty() {
        info!("No packages in {}", report.repo_dir.display());
    }

    Ok(())
}
