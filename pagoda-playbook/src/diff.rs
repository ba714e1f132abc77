//! Dry-run unified diff support for `pagoda diff`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use similar::TextDiff;

use pagoda_core::DeploymentModel;
use pagoda_renderer::{RenderContext, TemplateEngine};

use crate::error::PlaybookError;
use crate::layout::PlaybookLayout;
use crate::pipeline::plan_playbooks;
use crate::writer::render_descriptor;

/// A single output file whose on-disk content differs from what generation
/// would write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub path: PathBuf,
    pub unified_diff: String,
}

/// Render everything generation would write and compare it with the files
/// currently on disk. Missing files diff against empty content.
///
/// No files are written.
pub fn diff_playbooks(
    root: &Path,
    model: &DeploymentModel,
    layout: &PlaybookLayout,
) -> Result<Vec<FileDiff>, PlaybookError> {
    let engine = TemplateEngine::new();
    let ctx = RenderContext::from_model(model)?;

    let mut diffs = Vec::new();
    for plan in plan_playbooks(root, model, layout)? {
        for descriptor in &plan.descriptors {
            let rendered = render_descriptor(descriptor, &engine, &ctx)?;
            let existing = read_existing_or_empty(&descriptor.dest)?;
            if existing == rendered {
                continue;
            }

            let relative = descriptor
                .dest
                .strip_prefix(root)
                .unwrap_or(descriptor.dest.as_path());
            let old_header = format!("a/{}", relative.display());
            let new_header = format!("b/{}", relative.display());

            let unified_diff = match (std::str::from_utf8(&existing), std::str::from_utf8(&rendered)) {
                (Ok(old), Ok(new)) => TextDiff::from_lines(old, new)
                    .unified_diff()
                    .header(&old_header, &new_header)
                    .context_radius(3)
                    .to_string(),
                _ => format!("Binary files {old_header} and {new_header} differ\n"),
            };

            diffs.push(FileDiff {
                path: descriptor.dest.clone(),
                unified_diff,
            });
        }
    }
    Ok(diffs)
}

fn read_existing_or_empty(path: &Path) -> Result<Vec<u8>, PlaybookError> {
    match std::fs::read(path) {
        Ok(content) => Ok(content),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(Vec::new()),
        Err(source) => Err(PlaybookError::SourceReadError {
            path: path.to_path_buf(),
            source,
        }),
    }
}
