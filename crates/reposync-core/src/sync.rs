use reposync_config::sources::{ForgeProject, LoadedSources, SourcesConfig};
use reposync_dl::traits::Platform;
use reposync_utils::fs::ensure_dir_exists;
use tracing::{debug, info, warn};

use crate::{
    database, merge::DesiredSet, metadata, reconcile::reconcile, release::ForgeResolver,
    source::resolve_direct_sources, RepoContext, RepoResult, ResolvedPackage, SyncOutcome,
    SyncReport,
};

/// Runs a full sync of the configured channel.
///
/// When the sources file does not exist yet, a commented template is written
/// and nothing else happens.
pub fn sync<P: Platform>(ctx: &RepoContext<P>) -> RepoResult<SyncOutcome> {
    let settings = ctx.settings();
    debug!("loading sources from {}", settings.sources_path.display());

    match SourcesConfig::load_or_init(&settings.sources_path)? {
        LoadedSources::TemplateCreated(path) => {
            warn!(
                "No sources configured yet. Edit {} and run again.",
                path.display()
            );
            Ok(SyncOutcome::TemplateCreated(path))
        }
        LoadedSources::Loaded(sources) => sync_sources(ctx, &sources).map(SyncOutcome::Synced),
    }
}

/// Syncs the channel against an already loaded sources configuration.
pub fn sync_sources<P: Platform>(
    ctx: &RepoContext<P>,
    sources: &SourcesConfig,
) -> RepoResult<SyncReport> {
    let settings = ctx.settings();
    let channel = settings.channel;
    info!(
        "Syncing {} channel into {}",
        channel,
        settings.repo_dir.display()
    );

    ensure_dir_exists(&settings.repo_dir)?;
    ensure_dir_exists(&settings.api_dir)?;

    let forge = resolve_forge(ctx, &sources.forge_projects);
    let direct = resolve_direct_sources(&sources.remote_urls, channel);
    debug!(
        "{} forge package(s), {} direct package(s)",
        forge.len(),
        direct.len()
    );
    let desired = DesiredSet::from_sources(forge, direct);
    info!("{} package(s) desired for {}", desired.len(), channel);

    let reconcile = reconcile(&settings.repo_dir, &desired)?;
    let database = database::rebuild(settings)?;
    let records = metadata::generate(settings)?;

    Ok(SyncReport {
        channel,
        desired: desired.len(),
        reconcile,
        database,
        records,
        api_file: settings.api_file_path(),
    })
}

fn resolve_forge<P: Platform>(
    ctx: &RepoContext<P>,
    projects: &[ForgeProject],
) -> Vec<ResolvedPackage> {
    let settings = ctx.settings();
    let Some(platform) = ctx.platform() else {
        let wanted = projects
            .iter()
            .filter(|p| p.enabled && p.channels.contains(&settings.channel))
            .count();
        if wanted > 0 {
            warn!("No forge token configured, skipping {wanted} forge project(s)");
        }
        return Vec::new();
    };

    ForgeResolver::new(platform, settings.channel)
        .fallback_id(settings.ci_project_id.as_deref())
        .resolve_all(projects)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use reposync_config::{channel::Channel, settings::RepoSettings};
    use reposync_dl::{
        gitlab::GitLab,
        test_server::{TestResponse, TestServer},
    };

    use super::*;
    use crate::{metadata::PackageRecord, test_utils::test_settings, DatabaseState};

    const RELEASES_PAGE_1: &str = "/api/v4/projects/7/releases?page=1&per_page=100";
    const RELEASES_PAGE_2: &str = "/api/v4/projects/7/releases?page=2&per_page=100";

    fn release_json(tag: &str, created_at: &str, asset: &str) -> String {
        format!(
            r#"{{"name":"{tag}","tag_name":"{tag}","created_at":"{created_at}","assets":{{"links":[{{"name":"{asset}","url":"https://forge.invalid/{tag}/{asset}"}}]}}}}"#
        )
    }

    fn forge_server(extra: Vec<(&str, TestResponse)>) -> TestServer {
        let releases = format!(
            "[{},{},{}]",
            release_json("r2", "2024-02-01T00:00:00Z", "tool-2-1-x86_64.pkg.tar.zst"),
            release_json("r1", "2024-01-01T00:00:00Z", "tool-1-1-x86_64.pkg.tar.zst"),
            release_json("r3", "2024-03-01T00:00:00Z", "tool-3-1-x86_64.pkg.tar.zst"),
        );
        let mut routes = vec![
            (RELEASES_PAGE_1, TestResponse::ok(releases)),
            (RELEASES_PAGE_2, TestResponse::ok("[]")),
        ];
        routes.extend(extra);
        TestServer::start(routes)
    }

    fn write_sources(settings: &RepoSettings, server: &TestServer) {
        let content = format!(
            r#"
[[forge_projects]]
id = "7"
name = "tool"
channels = ["stable", "testing"]

[[remote_urls]]
url = "{direct}"
channel = "stable"

[[remote_urls]]
url = "{override_url}"
channel = "testing"
"#,
            direct = server.url("/pool/direct-1-1-any.pkg.tar.zst"),
            override_url = server.url("/mirror/tool-3-1-x86_64.pkg.tar.zst"),
        );
        fs::write(&settings.sources_path, content).unwrap();
    }

    fn context(settings: RepoSettings, server: &TestServer) -> RepoContext<GitLab> {
        let forge = GitLab::new(server.base_url()).token(Some("token".into()));
        RepoContext::with_platform(settings, Some(forge))
    }

    fn synced(outcome: SyncOutcome) -> SyncReport {
        match outcome {
            SyncOutcome::Synced(report) => report,
            other => panic!("expected a sync, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_sources_writes_template_only() {
        let root = tempfile::tempdir().unwrap();
        let settings = test_settings(root.path(), Channel::Stable);
        let repo_dir = settings.repo_dir.clone();
        let sources_path = settings.sources_path.clone();

        let outcome = sync(&RepoContext::new(settings)).unwrap();

        assert!(matches!(outcome, SyncOutcome::TemplateCreated(ref p) if p == &sources_path));
        assert!(sources_path.exists());
        assert!(!repo_dir.exists());
        assert!(!root.path().join("api").exists());
    }

    #[test]
    fn test_stable_sync_promotes_previous_release() {
        let server = forge_server(vec![(
            "/pool/direct-1-1-any.pkg.tar.zst",
            TestResponse::ok("direct"),
        )]);
        let root = tempfile::tempdir().unwrap();
        let settings = test_settings(root.path(), Channel::Stable);
        write_sources(&settings, &server);

        let dir = settings.repo_dir.clone();
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("tool-2-1-x86_64.pkg.tar.zst"), "r2").unwrap();
        fs::write(dir.join("tool-1-1-x86_64.pkg.tar.zst"), "r1").unwrap();

        let report = synced(sync(&context(settings, &server)).unwrap());

        assert_eq!(report.desired, 2);
        assert_eq!(report.reconcile.removed, ["tool-1-1-x86_64.pkg.tar.zst"]);
        assert_eq!(report.reconcile.kept, ["tool-2-1-x86_64.pkg.tar.zst"]);
        assert_eq!(report.reconcile.downloaded, ["direct-1-1-any.pkg.tar.zst"]);
        assert_eq!(report.database, DatabaseState::Indexed(2));
        assert_eq!(report.records, 2);

        assert_eq!(
            fs::read_to_string(dir.join("core.db")).unwrap(),
            "direct-1-1-any.pkg.tar.zst\ntool-2-1-x86_64.pkg.tar.zst\n"
        );
        assert_eq!(fs::read_to_string(dir.join("tool-2-1-x86_64.pkg.tar.zst")).unwrap(), "r2");

        let json = fs::read_to_string(root.path().join("api/stable.json")).unwrap();
        let records: Vec<PackageRecord> = serde_json::from_str(&json).unwrap();
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["direct", "tool"]);
        assert!(records.iter().all(|r| r.channel == Channel::Stable));
    }

    #[test]
    fn test_testing_sync_direct_url_overrides_forge_asset() {
        let server = forge_server(vec![(
            "/mirror/tool-3-1-x86_64.pkg.tar.zst",
            TestResponse::ok("mirrored"),
        )]);
        let root = tempfile::tempdir().unwrap();
        let settings = test_settings(root.path(), Channel::Testing);
        write_sources(&settings, &server);
        let dir = settings.repo_dir.clone();

        let report = synced(sync(&context(settings, &server)).unwrap());

        assert_eq!(report.reconcile.downloaded, ["tool-3-1-x86_64.pkg.tar.zst"]);
        assert!(report.reconcile.failed.is_empty());
        assert_eq!(
            fs::read_to_string(dir.join("tool-3-1-x86_64.pkg.tar.zst")).unwrap(),
            "mirrored"
        );
        assert!(dir.ends_with("testing/x86_64"));
        assert!(dir.join("core-testing.db").exists());
        assert!(root.path().join("api/testing.json").exists());
        assert!(!root.path().join("api/stable.json").exists());
    }

    #[test]
    fn test_sync_is_idempotent() {
        let server = forge_server(vec![(
            "/pool/direct-1-1-any.pkg.tar.zst",
            TestResponse::ok("direct"),
        )]);
        let root = tempfile::tempdir().unwrap();
        let settings = test_settings(root.path(), Channel::Stable);
        write_sources(&settings, &server);
        fs::create_dir_all(&settings.repo_dir).unwrap();
        fs::write(settings.repo_dir.join("tool-2-1-x86_64.pkg.tar.zst"), "r2").unwrap();

        let dir = settings.repo_dir.clone();
        let api_file = settings.api_file_path();
        let ctx = context(settings, &server);

        synced(sync(&ctx).unwrap());
        let first_db = fs::read_to_string(dir.join("core.db.tar.gz")).unwrap();
        let first_json = fs::read_to_string(&api_file).unwrap();

        let second = synced(sync(&ctx).unwrap());
        assert!(second.reconcile.removed.is_empty());
        assert!(second.reconcile.downloaded.is_empty());
        assert_eq!(second.reconcile.kept.len(), 2);
        assert_eq!(fs::read_to_string(dir.join("core.db.tar.gz")).unwrap(), first_db);
        assert_eq!(fs::read_to_string(&api_file).unwrap(), first_json);

        let downloads = server
            .targets()
            .iter()
            .filter(|t| t.starts_with("/pool/"))
            .count();
        assert_eq!(downloads, 1);
    }

    #[test]
    fn test_partial_failure_still_builds_database() {
        let server = forge_server(vec![]);
        let root = tempfile::tempdir().unwrap();
        let settings = test_settings(root.path(), Channel::Stable);
        fs::write(
            &settings.sources_path,
            format!(
                "[[remote_urls]]\nurl = \"{}\"\nchannel = \"stable\"\n\n[[remote_urls]]\nurl = \"{}\"\nchannel = \"stable\"\n",
                server.url("/gone/missing-1-1-any.pkg.tar.zst"),
                server.url("/gone/other-1-1-any.pkg.tar.zst"),
            ),
        )
        .unwrap();
        let dir = settings.repo_dir.clone();

        let report = synced(sync(&RepoContext::new(settings)).unwrap());

        assert_eq!(report.reconcile.failed.len(), 2);
        assert_eq!(report.database, DatabaseState::Empty);
        assert!(!dir.join("missing-1-1-any.pkg.tar.zst").exists());
        assert_eq!(fs::metadata(dir.join("core.db.tar.gz")).unwrap().len(), 0);
    }

    #[test]
    fn test_empty_sources_give_empty_repository() {
        let root = tempfile::tempdir().unwrap();
        let settings = test_settings(root.path(), Channel::Testing);
        fs::write(&settings.sources_path, "").unwrap();
        let dir = settings.repo_dir.clone();
        let api_file = settings.api_file_path();

        let report = synced(sync(&RepoContext::new(settings)).unwrap());

        assert_eq!(report.database, DatabaseState::Empty);
        assert_eq!(report.records, 0);
        for name in ["core-testing.db.tar.gz", "core-testing.files.tar.gz"] {
            assert_eq!(fs::metadata(dir.join(name)).unwrap().len(), 0);
        }
        assert!(fs::symlink_metadata(dir.join("core-testing.db"))
            .unwrap()
            .file_type()
            .is_symlink());
        assert_eq!(fs::read_to_string(api_file).unwrap(), "[]");
    }

    #[test]
    fn test_without_token_forge_projects_are_skipped() {
        let server = forge_server(vec![(
            "/pool/direct-1-1-any.pkg.tar.zst",
            TestResponse::ok("direct"),
        )]);
        let root = tempfile::tempdir().unwrap();
        let mut settings = test_settings(root.path(), Channel::Stable);
        settings.forge_url = server.base_url();
        settings.forge_token = None;
        write_sources(&settings, &server);

        let ctx = RepoContext::new(settings);
        assert!(ctx.platform().is_none());

        let report = synced(sync(&ctx).unwrap());
        assert_eq!(report.reconcile.downloaded, ["direct-1-1-any.pkg.tar.zst"]);
        assert!(!server
            .targets()
            .iter()
            .any(|t| t.starts_with("/api/")));
    }
}
