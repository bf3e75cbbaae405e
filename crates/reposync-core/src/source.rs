//! Acceptance rules for candidate packages.
//!
//! Both forge release assets and direct URLs pass through here before they can
//! enter the desired set, so the suffix and channel checks live in one place.

use reposync_config::{channel::Channel, sources::DirectSource, PKG_EXTENSION};
use reposync_dl::utils::filename_from_url;
use tracing::{debug, warn};

use crate::{RejectReason, ResolvedPackage, SourceKind, SourceOutcome};

/// Examines one direct URL entry against the active channel.
pub fn resolve_direct_source(source: &DirectSource, channel: Channel) -> SourceOutcome {
    let url = source.url.trim();
    let reject = |reason| {
        SourceOutcome::Rejected {
            source: url.to_string(),
            reason,
        }
    };

    if !source.enabled {
        return reject(RejectReason::Disabled);
    }

    match source.channel.parse::<Channel>() {
        Ok(declared) if declared == channel => {}
        Ok(_) => return reject(RejectReason::OtherChannel),
        Err(_) => return reject(RejectReason::UnknownChannel(source.channel.clone())),
    }

    if !url.ends_with(PKG_EXTENSION) {
        return reject(RejectReason::NotPackageArchive);
    }

    let Some(filename) = filename_from_url(url).filter(|name| is_archive_name(name)) else {
        return reject(RejectReason::NoFilename);
    };

    SourceOutcome::Accepted(ResolvedPackage {
        filename,
        url: url.to_string(),
        channel,
        kind: SourceKind::Direct,
    })
}

/// Examines one release asset published by a forge project.
pub fn resolve_forge_asset(name: &str, url: &str, channel: Channel) -> SourceOutcome {
    let reject = |reason| {
        SourceOutcome::Rejected {
            source: name.to_string(),
            reason,
        }
    };

    if !name.ends_with(PKG_EXTENSION) {
        return reject(RejectReason::NotPackageArchive);
    }
    if !url.starts_with("https") {
        return reject(RejectReason::InsecureUrl);
    }
    if !is_archive_name(name) {
        return reject(RejectReason::NoFilename);
    }

    SourceOutcome::Accepted(ResolvedPackage {
        filename: name.to_string(),
        url: url.to_string(),
        channel,
        kind: SourceKind::Forge,
    })
}

/// Resolves every direct URL entry, logging the ones that are skipped.
pub fn resolve_direct_sources(sources: &[DirectSource], channel: Channel) -> Vec<ResolvedPackage> {
    sources
        .iter()
        .filter_map(|source| accept(resolve_direct_source(source, channel)))
        .collect()
}

/// Unwraps an accepted outcome, logging a rejection at a level matching its cause.
pub fn accept(outcome: SourceOutcome) -> Option<ResolvedPackage> {
    match outcome {
        SourceOutcome::Accepted(package) => Some(package),
        SourceOutcome::Rejected { source, reason } => {
            if reason.is_misconfiguration() {
                warn!("Skipping {source}: {reason}");
            } else {
                debug!("skipping {source}: {reason}");
            }
            None
        }
    }
}

// A bare file name that cannot escape the channel directory.
fn is_archive_name(name: &str) -> bool {
    name.len() > PKG_EXTENSION.len()
        && name.ends_with(PKG_EXTENSION)
        && !name.contains('/')
        && !name.starts_with('.')
}
