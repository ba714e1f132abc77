//! Playbook directory layout.
//!
//! ```text
//! <root>/
//!   pagoda.yaml                          (optional layout overrides)
//!   <component>-playbook/
//!     <version>/
//!       yat/                             (template sources)
//!         hosts.tera                     (required)
//!         <name>.tera                    → group_vars/<name>
//!         <file>                         → copied as-is
//!       clusters/
//!         <cluster_id>/
//!           hosts
//!           group_vars/<name>
//!           <file>
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use pagoda_core::{ClusterId, ComponentName};

use crate::error::PlaybookError;

/// File under the playbook root that overrides [`PlaybookLayout`] defaults.
pub const LAYOUT_FILE: &str = "pagoda.yaml";

/// Names of every fixed directory and file in a playbook tree.
///
/// Any subset may be overridden from [`LAYOUT_FILE`]; missing keys keep
/// their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybookLayout {
    /// Appended to the component name to form its playbook directory.
    pub playbook_suffix: String,
    /// Subdirectory of a version directory holding template sources.
    pub template_dir: String,
    /// Marks a source file as a template.
    pub template_suffix: String,
    /// The one mandatory template; renders the inventory.
    pub hosts_template: String,
    /// Output name of the rendered hosts template.
    pub hosts_file: String,
    pub clusters_dir: String,
    pub group_vars_dir: String,
}

impl Default for PlaybookLayout {
    fn default() -> Self {
        Self {
            playbook_suffix: "-playbook".to_string(),
            template_dir: "yat".to_string(),
            template_suffix: ".tera".to_string(),
            hosts_template: "hosts.tera".to_string(),
            hosts_file: "hosts".to_string(),
            clusters_dir: "clusters".to_string(),
            group_vars_dir: "group_vars".to_string(),
        }
    }
}

impl PlaybookLayout {
    /// Load `<root>/pagoda.yaml`, or the defaults if it does not exist.
    pub fn load_at(root: &Path) -> Result<Self, PlaybookError> {
        let path = root.join(LAYOUT_FILE);
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => return Err(PlaybookError::SourceReadError { path, source }),
        };
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&contents).map_err(|source| PlaybookError::Config { path, source })
    }

    /// `<root>/<component><suffix>/<version>/`
    pub fn playbook_root(&self, root: &Path, component: &ComponentName, version: &str) -> PathBuf {
        root.join(format!("{}{}", component.0, self.playbook_suffix))
            .join(version)
    }

    /// `<playbook_root>/yat/`
    pub fn template_dir_of(&self, playbook_root: &Path) -> PathBuf {
        playbook_root.join(&self.template_dir)
    }

    /// `<playbook_root>/clusters/<cluster_id>/`
    pub fn cluster_root(&self, playbook_root: &Path, cluster_id: &ClusterId) -> PathBuf {
        playbook_root.join(&self.clusters_dir).join(&cluster_id.0)
    }

    /// `<playbook_root>/clusters/<cluster_id>/group_vars/`
    pub fn group_vars_root(&self, playbook_root: &Path, cluster_id: &ClusterId) -> PathBuf {
        self.cluster_root(playbook_root, cluster_id)
            .join(&self.group_vars_dir)
    }

    /// Whether `file_name` carries the template suffix.
    ///
    /// A file named exactly like the suffix has no name left to render into
    /// and is treated as a plain file.
    pub fn is_template(&self, file_name: &str) -> bool {
        file_name.len() > self.template_suffix.len() && file_name.ends_with(&self.template_suffix)
    }

    /// `file_name` without the template suffix.
    pub fn strip_suffix<'a>(&self, file_name: &'a str) -> &'a str {
        file_name
            .strip_suffix(self.template_suffix.as_str())
            .unwrap_or(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn playbook_paths_follow_layout() {
        let layout = PlaybookLayout::default();
        let root = Path::new("/srv/playbooks");
        let pb = layout.playbook_root(root, &ComponentName::from("web"), "1.0");
        assert_eq!(pb, PathBuf::from("/srv/playbooks/web-playbook/1.0"));
        assert_eq!(layout.template_dir_of(&pb), pb.join("yat"));
        assert_eq!(
            layout.group_vars_root(&pb, &ClusterId::from("c1")),
            PathBuf::from("/srv/playbooks/web-playbook/1.0/clusters/c1/group_vars")
        );
    }

    #[test]
    fn suffix_detection() {
        let layout = PlaybookLayout::default();
        assert!(layout.is_template("vars.tera"));
        assert!(!layout.is_template("vars.yml"));
        assert!(!layout.is_template(".tera"));
        assert!(!layout.is_template("vars.tera.bak"));
        assert_eq!(layout.strip_suffix("all.yml.tera"), "all.yml");
    }

    #[test]
    fn missing_config_file_gives_defaults() {
        let root = TempDir::new().unwrap();
        let layout = PlaybookLayout::load_at(root.path()).unwrap();
        assert_eq!(layout, PlaybookLayout::default());
    }

    #[test]
    fn partial_config_overrides_only_given_keys() {
        let root = TempDir::new().unwrap();
        std::fs::write(
            root.path().join(LAYOUT_FILE),
            "template_suffix: .gotmpl\nhosts_template: hosts.gotmpl\n",
        )
        .unwrap();
        let layout = PlaybookLayout::load_at(root.path()).unwrap();
        assert_eq!(layout.template_suffix, ".gotmpl");
        assert_eq!(layout.hosts_template, "hosts.gotmpl");
        assert_eq!(layout.template_dir, "yat");
        assert_eq!(layout.group_vars_dir, "group_vars");
    }

    #[test]
    fn malformed_config_is_a_config_error() {
        let root = TempDir::new().unwrap();
        std::fs::write(root.path().join(LAYOUT_FILE), "template_dir: [unclosed").unwrap();
        let err = PlaybookLayout::load_at(root.path()).unwrap_err();
        assert!(matches!(err, PlaybookError::Config { .. }), "got: {err}");
        assert!(err.to_string().contains(LAYOUT_FILE));
    }
}
