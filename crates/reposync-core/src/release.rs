//! Forge release selection and asset resolution.

use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset};
use reposync_config::{channel::Channel, sources::ForgeProject};
use reposync_dl::traits::{Asset, Platform, Release};
use tracing::{debug, info, warn};

use crate::{source, ResolvedPackage};

fn parse_created_at(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value).ok()
}

/// Orders releases newest first by creation time.
///
/// Releases with an unparseable timestamp sort after all others; ties keep the
/// order the forge returned them in.
pub fn sort_newest_first<R: Release>(releases: &mut [R]) {
    releases.sort_by(|a, b| {
        match (parse_created_at(a.created_at()), parse_created_at(b.created_at())) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
}

/// Index into a newest-first release list that serves `channel`, if any.
///
/// A project publishing to both channels sends its newest release to testing and
/// the one before it to stable, so a build reaches stable only once a newer one
/// has replaced it in testing. A single-channel project ships its newest release.
pub fn selected_index(
    release_count: usize,
    dual_channel: bool,
    channel: Channel,
) -> Option<usize> {
    let index = match (dual_channel, channel) {
        (true, Channel::Stable) => 1,
        _ => 0,
    };
    (index < release_count).then_some(index)
}

/// Picks the release serving `channel` from a newest-first list.
pub fn select_release<'a, R: Release>(
    releases: &'a [R],
    project: &ForgeProject,
    channel: Channel,
) -> Option<&'a R> {
    if !project.channels.contains(&channel) {
        return None;
    }
    selected_index(releases.len(), project.is_dual_channel(), channel).map(|i| &releases[i])
}

/// Accepted package assets of a single release.
pub fn release_packages<R: Release>(release: &R, channel: Channel) -> Vec<ResolvedPackage> {
    release
        .assets()
        .iter()
        .filter_map(|asset| {
            source::accept(source::resolve_forge_asset(
                asset.name(),
                asset.url(),
                channel,
            ))
        })
        .collect()
}

/// Resolves forge projects for one channel through a release platform.
pub struct ForgeResolver<'a, P: Platform> {
    platform: &'a P,
    channel: Channel,
    fallback_id: Option<&'a str>,
}

impl<'a, P: Platform> ForgeResolver<'a, P> {
    pub fn new(platform: &'a P, channel: Channel) -> Self {
        Self {
            platform,
            channel,
            fallback_id: None,
        }
    }

    /// Project id used for entries declared without one.
    pub fn fallback_id(mut self, id: Option<&'a str>) -> Self {
        self.fallback_id = id.filter(|id| !id.is_empty());
        self
    }

    /// Resolves all projects, in declaration order.
    ///
    /// A project whose releases cannot be fetched is skipped; the others still
    /// contribute their packages.
    pub fn resolve_all(&self, projects: &[ForgeProject]) -> Vec<ResolvedPackage> {
        projects
            .iter()
            .flat_map(|project| self.resolve_project(project))
            .collect()
    }

    pub fn resolve_project(&self, project: &ForgeProject) -> Vec<ResolvedPackage> {
        if !project.enabled {
            debug!("skipping disabled project {}", project.label());
            return Vec::new();
        }
        if !project.channels.contains(&self.channel) {
            debug!(
                "skipping project {}: not published to {}",
                project.label(),
                self.channel
            );
            return Vec::new();
        }

        let id = if project.id.is_empty() {
            match self.fallback_id {
                Some(id) => id,
                None => {
                    warn!("Skipping project {}: no project id configured", project.label());
                    return Vec::new();
                }
            }
        } else {
            project.id.as_str()
        };

        let mut releases = match self.platform.fetch_releases(id) {
            Ok(releases) => releases,
            Err(err) => {
                warn!("Failed to fetch releases for {}: {err}", project.label());
                return Vec::new();
            }
        };
        if releases.is_empty() {
            warn!("Project {} has no releases", project.label());
            return Vec::new();
        }
        sort_newest_first(&mut releases);

        let Some(release) = select_release(&releases, project, self.channel) else {
            info!(
                "Project {} has no release eligible for {} yet",
                project.label(),
                self.channel
            );
            return Vec::new();
        };

        let packages = release_packages(release, self.channel);
        debug!(
            "{} release {} ({}) provides {} package(s) for {}",
            project.label(),
            release.tag(),
            release.created_at(),
            packages.len(),
            self.channel
        );
        packages
    }
}
