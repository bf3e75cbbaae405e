use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};
use reposync_config::{
    channel::Channel,
    settings::{
        RepoSettings, DEFAULT_API_DIR, DEFAULT_ARCH, DEFAULT_FORGE_URL, DEFAULT_PACMAN,
        DEFAULT_REPO_ADD, DEFAULT_REPO_NAME,
    },
    sources::DEFAULT_SOURCES_FILE,
};
use reposync_dl::gitlab::GitLab;

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}"
)]
pub struct Args {
    /// Set output verbosity; repeat for trace output
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Enable trace output
    #[arg(long, global = true)]
    pub debug: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with_all = ["verbose", "debug"])]
    pub quiet: bool,

    /// Output logs as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Operate on the testing channel instead of stable
    #[arg(short, long, global = true)]
    pub testing: bool,

    /// Repository base name
    #[arg(long, global = true, default_value = DEFAULT_REPO_NAME)]
    pub repo_name: String,

    /// Repository architecture
    #[arg(long, global = true, default_value = DEFAULT_ARCH)]
    pub arch: String,

    /// Override the channel directory
    #[arg(long, global = true, value_hint = ValueHint::DirPath)]
    pub repo_arch_dir: Option<PathBuf>,

    /// Directory receiving the package metadata files
    #[arg(long, global = true, default_value = DEFAULT_API_DIR, value_hint = ValueHint::DirPath)]
    pub api_dir: PathBuf,

    /// Package sources file
    #[arg(
        short,
        long,
        global = true,
        env = "REPOSYNC_CONFIG",
        default_value = DEFAULT_SOURCES_FILE,
        value_hint = ValueHint::FilePath
    )]
    pub config: PathBuf,

    /// Forge API token used to list project releases
    #[arg(long, global = true, env = GitLab::TOKEN_ENV, hide_env_values = true)]
    pub gitlab_token: Option<String>,

    /// Project id used for forge entries declared without one
    #[arg(long, global = true, env = "CI_PROJECT_ID")]
    pub project_id: Option<String>,

    /// Forge base URL
    #[arg(long, global = true, env = "CI_SERVER_URL", default_value = DEFAULT_FORGE_URL)]
    pub forge_url: String,

    /// Database indexing tool
    #[arg(long, global = true, default_value = DEFAULT_REPO_ADD, value_hint = ValueHint::CommandName)]
    pub repo_add: String,

    /// Package inspection tool
    #[arg(long, global = true, default_value = DEFAULT_PACMAN, value_hint = ValueHint::CommandName)]
    pub pacman: String,

    /// Set user agent
    #[arg(required = false, long, short = 'A', global = true)]
    pub user_agent: Option<String>,

    /// Give up on a request after this many seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    #[clap(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Mirror configured packages and rebuild the channel (default)
    Sync,

    /// Remove every package and database entry of the channel
    Clean,

    /// Show the contents of the channel
    #[clap(name = "status", visible_alias = "st")]
    Status,
}

impl Args {
    pub fn channel(&self) -> Channel {
        Channel::from_testing_flag(self.testing)
    }

    /// Tool output is shown whenever debug output is requested.
    pub fn show_tool_output(&self) -> bool {
        !self.quiet && (self.verbose > 0 || self.debug)
    }

    pub fn settings(&self) -> RepoSettings {
        let mut settings = RepoSettings::new(&self.repo_name, &self.arch, self.channel())
            .with_api_dir(&self.api_dir)
            .with_sources_path(&self.config);
        if let Some(dir) = &self.repo_arch_dir {
            settings = settings.with_repo_dir(dir);
        }

        settings.forge_url = self.forge_url.clone();
        settings.forge_token = self.gitlab_token.clone().filter(|t| !t.is_empty());
        settings.ci_project_id = self.project_id.clone().filter(|id| !id.is_empty());
        settings.repo_add_bin = self.repo_add.clone();
        settings.pacman_bin = self.pacman.clone();
        settings.show_tool_output = self.show_tool_output();
        settings
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults_to_stable_layout() {
        let args = Args::try_parse_from(["reposync", "--config", "packages.toml"]).unwrap();
        assert!(args.command.is_none());

        let settings = args.settings();
        assert_eq!(settings.channel, Channel::Stable);
        assert_eq!(settings.db_base_name, "repo");
        assert_eq!(settings.repo_dir, PathBuf::from("x86_64"));
        assert!(!settings.show_tool_output);
    }

    #[test]
    fn test_testing_overrides() {
        let args = Args::try_parse_from([
            "reposync",
            "status",
            "--testing",
            "--repo-name",
            "extra",
            "--repo-arch-dir",
            "/srv/repo/testing",
            "--repo-add",
            "/opt/bin/repo-add",
            "-v",
        ])
        .unwrap();
        assert!(matches!(args.command, Some(Commands::Status)));

        let settings = args.settings();
        assert_eq!(settings.db_base_name, "extra-testing");
        assert_eq!(settings.repo_dir, PathBuf::from("/srv/repo/testing"));
        assert_eq!(settings.repo_add_bin, "/opt/bin/repo-add");
        assert!(settings.show_tool_output);
    }

    #[test]
    fn test_token_reads_forge_env() {
        let command = Args::command();
        let token = command
            .get_arguments()
            .find(|arg| arg.get_id() == "gitlab_token")
            .unwrap();
        assert_eq!(token.get_env(), Some(std::ffi::OsStr::new("GITLAB_TOKEN")));
    }

    #[test]
    fn test_timeout_flag() {
        let args = Args::try_parse_from(["reposync", "clean", "--timeout", "45"]).unwrap();
        assert_eq!(args.timeout, Some(45));
        assert!(Args::try_parse_from(["reposync", "--timeout", "soon"]).is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Args::try_parse_from(["reposync", "-q", "-v"]).is_err());
    }
}
