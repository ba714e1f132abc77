//! Cluster output provisioning.
//!
//! Creates `clusters/<cluster_id>/` and, when the template directory holds
//! anything besides the hosts template, its `group_vars/` subdirectory. Existing directories are left alone, so provisioning the
//! same cluster again is a no-op.

use std::path::{Path, PathBuf};

use pagoda_core::ClusterId;

use crate::error::PlaybookError;
use crate::layout::PlaybookLayout;

/// Ensure the output directories for `cluster_id` exist.
///
/// Returns the cluster output root. Must complete before any file is written
/// into that root.
pub fn provision(
    playbook_root: &Path,
    cluster_id: &ClusterId,
    layout: &PlaybookLayout,
    group_vars: bool,
) -> Result<PathBuf, PlaybookError> {
    let cluster_root = layout.cluster_root(playbook_root, cluster_id);
    create_dir(&cluster_root)?;

    if group_vars {
        create_dir(&layout.group_vars_root(playbook_root, cluster_id))?;
    }
    Ok(cluster_root)
}

fn create_dir(path: &Path) -> Result<(), PlaybookError> {
    if path.is_dir() {
        return Ok(());
    }
    dir_builder()
        .create(path)
        .map_err(|source| PlaybookError::ProvisionFailed {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::debug!("created {}", path.display());
    Ok(())
}

#[cfg(unix)]
fn dir_builder() -> std::fs::DirBuilder {
    use std::os::unix::fs::DirBuilderExt;
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true).mode(0o755);
    builder
}
#[cfg(not(unix))]
fn dir_builder() -> std::fs::DirBuilder {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    builder
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
