//! Template classification: decide what each source file becomes.
//!
//! Rules, per file name, first match wins:
//!
//! | Source                       | Kind        | Destination                            |
//! |------------------------------|-------------|----------------------------------------|
//! | `hosts.tera` (reserved name) | `Hosts`     | `clusters/<id>/hosts`                  |
//! | `<name>.tera`                | `GroupVars` | `clusters/<id>/group_vars/<name>`      |
//! | anything else                | `Static`    | `clusters/<id>/<file>` (byte copy)     |

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use pagoda_core::ClusterId;

use crate::error::PlaybookError;
use crate::layout::PlaybookLayout;

/// Which output slot a source file lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    Hosts,
    GroupVars,
    Static,
}

/// One source file paired with where its output goes.
///
/// Built fresh on every run: the destination depends on the cluster id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDescriptor {
    pub src: PathBuf,
    pub dest: PathBuf,
    pub kind: TemplateKind,
    /// Whether `src` is rendered through the template engine. The hosts
    /// template is only rendered when its name carries the suffix.
    pub templated: bool,
}

/// Everything found directly inside one template directory.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TemplateSet {
    pub descriptors: Vec<TemplateDescriptor>,
    /// Subdirectories next to the templates. Never rendered, but they still
    /// count as entries when deciding whether `group_vars/` is created.
    pub skipped_dirs: Vec<PathBuf>,
}

impl TemplateSet {
    /// Whether the directory holds any entry besides the hosts template.
    pub fn needs_group_vars(&self) -> bool {
        !self.skipped_dirs.is_empty() || needs_group_vars(&self.descriptors)
    }
}

/// Classify every entry directly inside `<playbook_root>/yat/`.
///
/// Listing order is kept as-is. Subdirectories are recorded in
/// [`TemplateSet::skipped_dirs`] and not descended into. Fails before
/// anything is written if the directory cannot be listed or has no hosts
/// template.
pub fn classify(
    playbook_root: &Path,
    cluster_id: &ClusterId,
    layout: &PlaybookLayout,
) -> Result<TemplateSet, PlaybookError> {
    let dir = layout.template_dir_of(playbook_root);
    let unavailable = |source| PlaybookError::SourceUnavailable {
        path: dir.clone(),
        source,
    };
    let entries = std::fs::read_dir(&dir).map_err(unavailable)?;

    let cluster_root = layout.cluster_root(playbook_root, cluster_id);
    let mut descriptors = Vec::new();
    let mut skipped_dirs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(unavailable)?;
        let src = entry.path();
        if src.is_dir() {
            tracing::debug!("skipping directory {}", src.display());
            skipped_dirs.push(src);
            continue;
        }
        let descriptor = classify_file(&src, &cluster_root, layout);
        tracing::debug!(
            "classified {} as {:?} -> {}",
            src.display(),
            descriptor.kind,
            descriptor.dest.display()
        );
        descriptors.push(descriptor);
    }

    if !descriptors.iter().any(|d| d.kind == TemplateKind::Hosts) {
        return Err(PlaybookError::MissingRequiredTemplate {
            dir,
            name: layout.hosts_template.clone(),
        });
    }

    warn_on_collisions(&descriptors);
    Ok(TemplateSet {
        descriptors,
        skipped_dirs,
    })
}

/// Apply the classification rules to a single source path.
pub fn classify_file(src: &Path, cluster_root: &Path, layout: &PlaybookLayout) -> TemplateDescriptor {
    let file_name = src.file_name().unwrap_or(src.as_os_str());
    let Some(name) = file_name.to_str() else {
        // Non-UTF-8 names can never match the reserved name or the suffix.
        return TemplateDescriptor {
            src: src.to_path_buf(),
            dest: cluster_root.join(file_name),
            kind: TemplateKind::Static,
            templated: false,
        };
    };

    let templated = layout.is_template(name);
    let (kind, dest) = if name == layout.hosts_template {
        (TemplateKind::Hosts, cluster_root.join(&layout.hosts_file))
    } else if templated {
        (
            TemplateKind::GroupVars,
            cluster_root
                .join(&layout.group_vars_dir)
                .join(layout.strip_suffix(name)),
        )
    } else {
        (TemplateKind::Static, cluster_root.join(name))
    };

    TemplateDescriptor {
        src: src.to_path_buf(),
        dest,
        kind,
        templated,
    }
}

/// Whether any descriptor needs the `group_vars/` directory.
///
/// Any file besides the hosts template counts, matching how the output
/// tree has always been provisioned.
pub fn needs_group_vars(descriptors: &[TemplateDescriptor]) -> bool {
    descriptors.iter().any(|d| d.kind != TemplateKind::Hosts)
}

/// Two sources landing on one destination is allowed (the later one in
/// listing order wins) but almost always a mistake in the playbook.
fn warn_on_collisions(descriptors: &[TemplateDescriptor]) {
    let mut seen: HashMap<&Path, &Path> = HashMap::new();
    for d in descriptors {
        if let Some(previous) = seen.insert(d.dest.as_path(), d.src.as_path()) {
            tracing::warn!(
                "{} and {} both write {}; the later file wins",
                previous.display(),
                d.src.display(),
                d.dest.display()
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
