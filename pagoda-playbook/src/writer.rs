//! Per-file rendering and atomic writes.
//!
//! ## `apply_template` write protocol
//!
//! 1. Read the source (templates as UTF-8, static files as raw bytes).
//! 2. Render templates against the deployment model, fully in memory.
//! 3. Write the result to `<dest>.pagoda.tmp` and set its mode to 0755.
//! 4. Rename over `<dest>` (atomic on POSIX).
//!
//! A failure in steps 1–2 leaves the destination untouched; a failure in
//! 3–4 removes the temp file. The destination is always fully replaced,
//! never appended to.

use std::path::{Path, PathBuf};

use pagoda_renderer::{RenderContext, TemplateEngine};

use crate::classify::TemplateDescriptor;
use crate::error::PlaybookError;

// ---------------------------------------------------------------------------
// Write result
// ---------------------------------------------------------------------------

/// Outcome of an individual file write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written.
    Written { path: PathBuf },
    /// `--dry-run` mode: the file *would* have been written.
    WouldWrite { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path } | WriteResult::WouldWrite { path } => path,
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Produce the final bytes for `descriptor.dest` without touching it.
pub fn render_descriptor(
    descriptor: &TemplateDescriptor,
    engine: &TemplateEngine,
    ctx: &RenderContext,
) -> Result<Vec<u8>, PlaybookError> {
    let read_err = |source| PlaybookError::SourceReadError {
        path: descriptor.src.clone(),
        source,
    };

    if !descriptor.templated {
        return std::fs::read(&descriptor.src).map_err(read_err);
    }

    let source = std::fs::read_to_string(&descriptor.src).map_err(read_err)?;
    let name = descriptor.src.to_string_lossy();
    let rendered = engine.render(&name, &source, ctx).map_err(|source| {
        PlaybookError::TemplateExecutionError {
            path: descriptor.src.clone(),
            source,
        }
    })?;
    Ok(rendered.into_bytes())
}

/// Render `descriptor` and write it to its destination.
///
/// In dry-run mode the file is still rendered, so template errors surface,
/// but nothing is written.
pub fn apply_template(
    descriptor: &TemplateDescriptor,
    engine: &TemplateEngine,
    ctx: &RenderContext,
    dry_run: bool,
) -> Result<WriteResult, PlaybookError> {
    let content = render_descriptor(descriptor, engine, ctx)?;
    let path = descriptor.dest.clone();

    if dry_run {
        tracing::info!("[dry-run] would write: {}", path.display());
        return Ok(WriteResult::WouldWrite { path });
    }

    atomic_write(&path, &content)?;
    tracing::info!("wrote: {}", path.display());
    Ok(WriteResult::Written { path })
}

// ---------------------------------------------------------------------------
// atomic_write
// ---------------------------------------------------------------------------

/// Replace `path` with `content` via a sibling temp file and rename.
///
/// The parent directory must already exist; creating it is the provisioner's
/// job.
pub(crate) fn atomic_write(path: &Path, content: &[u8]) -> Result<(), PlaybookError> {
    let tmp = PathBuf::from(format!("{}.pagoda.tmp", path.display()));
    atomic_write_with_tmp(path, content, &tmp)
}

fn atomic_write_with_tmp(path: &Path, content: &[u8], tmp: &Path) -> Result<(), PlaybookError> {
    let write_err = |path: &Path, source| PlaybookError::DestinationWriteError {
        path: path.to_path_buf(),
        source,
    };

    std::fs::write(tmp, content).map_err(|e| write_err(tmp, e))?;

    if let Err(e) = set_output_permissions(tmp) {
        let _ = std::fs::remove_file(tmp);
        return Err(write_err(tmp, e));
    }
    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(write_err(path, e));
    }
    Ok(())
}

/// Generated files get 0755, the same mode as the directories holding them.
#[cfg(unix)]
fn set_output_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn set_output_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
