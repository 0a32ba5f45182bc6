//! Document CLI commands: open, save, edit, archive, check

use std::fs;
use std::io::Read;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use uuid::Uuid;

use super::editor::run_editor;
use super::output::Output;
use crate::document::{archive_trees, merge_buffer, open_document, Saved};
use crate::domain::{MergeReport, NodeKind, Timestamp};
use crate::format::{parse_mtask, parse_tasklist, render_tasklist};
use crate::storage::{Config, MtaskStore, Project, ProjectError};

/// Resolves a command-line path against the current directory
///
/// `.` and `..` are folded lexically so project lookup walks the real
/// ancestors of the file.
fn absolute(path: &Path) -> Result<PathBuf> {
    let path = std::path::absolute(path)
        .with_context(|| format!("Failed to resolve {}", path.display()))?;

    let mut resolved = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other),
        }
    }
    Ok(resolved)
}

/// The project containing `path`, if any
fn project_for(path: &Path) -> Result<Option<Project>> {
    let start = path.parent().unwrap_or(path);
    Config::find_project_root_from(start)
        .map(Project::open)
        .transpose()
}

pub fn open(output: &Output, file: &Path) -> Result<()> {
    let path = absolute(file)?;
    let bytes = MtaskStore::new(&path)
        .read_bytes()?
        .with_context(|| format!("No such file: {}", path.display()))?;

    let text = open_document(&bytes).with_context(|| format!("Failed to open {}", path.display()))?;
    output.verbose_ctx("open", &format!("Rendered {} bytes of TaskList", text.len()));

    if output.is_json() {
        output.data(&serde_json::json!({
            "file": path.display().to_string(),
            "tasklist": text,
        }));
    } else {
        output.document(&text);
    }

    Ok(())
}

#[derive(Debug, Serialize)]
struct SaveSummary {
    file: String,
    nodes: usize,
    #[serde(flatten)]
    report: MergeReport,
    archived: Option<ArchiveSummary>,
}

#[derive(Debug, Serialize)]
struct ArchiveSummary {
    file: String,
    archive: String,
    moved: usize,
}

pub fn save(output: &Output, file: &Path, input: Option<&Path>) -> Result<()> {
    let buffer = match input {
        Some(input) => fs::read_to_string(input)
            .with_context(|| format!("Failed to read {}", input.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read TaskList from stdin")?;
            buffer
        }
    };
    output.verbose_ctx("save", &format!("Read {} bytes of TaskList", buffer.len()));

    let summary = save_buffer(output, &absolute(file)?, &buffer)?;
    report_save(output, &summary);
    Ok(())
}

pub fn edit(output: &Output, file: &Path) -> Result<()> {
    let path = absolute(file)?;
    let config = match project_for(&path)? {
        Some(project) => project.config().clone(),
        None => Config::load()?,
    };

    let tree = MtaskStore::new(&path).read_tree()?;
    let buffer_path = std::env::temp_dir().join(format!(
        "taskmage-{}.{}",
        Uuid::new_v4().simple(),
        config.project.tasklist_extension
    ));
    fs::write(&buffer_path, render_tasklist(&tree))
        .with_context(|| format!("Failed to write {}", buffer_path.display()))?;

    let editor = config.global.editor_command();
    output.verbose_ctx("edit", &format!("Running '{}' on {}", editor, buffer_path.display()));
    if let Err(e) = run_editor(&editor, &buffer_path) {
        let _ = fs::remove_file(&buffer_path);
        return Err(e);
    }

    let buffer = fs::read_to_string(&buffer_path)
        .with_context(|| format!("Failed to read {}", buffer_path.display()))?;
    let summary = save_buffer(output, &path, &buffer)
        .with_context(|| format!("Edits kept in {}", buffer_path.display()))?;

    let _ = fs::remove_file(&buffer_path);
    report_save(output, &summary);
    Ok(())
}

/// Merges `buffer` into the Mtask file at `path` and writes it back
fn save_buffer(output: &Output, path: &Path, buffer: &str) -> Result<SaveSummary> {
    let store = MtaskStore::new(path);
    let saved = if store.exists() {
        Some(store.read_tree()?)
    } else {
        output.verbose_ctx("save", &format!("Creating {}", path.display()));
        None
    };

    let now = Timestamp::now();
    let Saved { tree, report } =
        merge_buffer(buffer, saved, now).with_context(|| format!("Failed to save {}", path.display()))?;
    store.write_tree(&tree)?;

    let archived = match project_for(path)? {
        Some(project) if project.config().project.archive_on_save => {
            output.verbose_ctx("save", "Archiving after save");
            Some(archive_file(&project, path, now)?)
        }
        _ => None,
    };

    Ok(SaveSummary {
        file: path.display().to_string(),
        nodes: tree.len(),
        report,
        archived,
    })
}

fn report_save(output: &Output, summary: &SaveSummary) {
    if output.is_json() {
        output.data(summary);
        return;
    }

    let report = &summary.report;
    output.success(&format!(
        "Saved {}: {} nodes ({} changed, {} added, {} moved, {} removed)",
        summary.file, summary.nodes, report.changed, report.added, report.moved, report.removed
    ));
    if let Some(archived) = &summary.archived {
        report_archive(output, archived);
    }
}

pub fn archive(output: &Output, file: &Path) -> Result<()> {
    let path = absolute(file)?;
    let project = project_for(&path)?.ok_or(ProjectError::NotInProject)?;

    let summary = archive_file(&project, &path, Timestamp::now())?;
    if output.is_json() {
        output.data(&summary);
    } else {
        report_archive(output, &summary);
    }
    Ok(())
}

/// Moves complete task chains of `path` into its archive file
fn archive_file(project: &Project, path: &Path, now: Timestamp) -> Result<ArchiveSummary> {
    let active_store = MtaskStore::new(path);
    let archive_store = project.archive_store(path)?;

    let active = active_store.read_tree()?;
    let archive = archive_store.read_tree()?;
    let archived = archive_trees(active, archive, now);

    // Archive first: an interruption duplicates chains instead of losing them
    if archived.moved > 0 {
        archive_store.write_tree(&archived.archive)?;
        active_store.write_tree(&archived.active)?;
    }

    Ok(ArchiveSummary {
        file: path.display().to_string(),
        archive: archive_store.path().display().to_string(),
        moved: archived.moved,
    })
}

fn report_archive(output: &Output, summary: &ArchiveSummary) {
    if summary.moved == 0 {
        output.success(&format!("Nothing to archive in {}", summary.file));
    } else {
        output.success(&format!(
            "Archived {} task chain(s) from {} to {}",
            summary.moved, summary.file, summary.archive
        ));
    }
}

#[derive(Debug, Default, Serialize)]
struct CheckSummary {
    file: String,
    format: &'static str,
    nodes: usize,
    tasks: usize,
    sections: usize,
    files: usize,
}

pub fn check(output: &Output, file: &Path) -> Result<()> {
    let path = absolute(file)?;
    let text = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let is_mtask = path
        .extension()
        .is_some_and(|ext| ext == "mtask" || ext == "json");
    let (format, tree) = if is_mtask {
        ("mtask", parse_mtask(&text))
    } else {
        ("tasklist", parse_tasklist(&text))
    };
    let tree = tree.with_context(|| format!("Invalid {} file {}", format, path.display()))?;
    output.verbose_ctx("check", &format!("Parsed {} as {}", path.display(), format));

    let mut summary = CheckSummary {
        file: path.display().to_string(),
        format,
        nodes: tree.len(),
        ..CheckSummary::default()
    };
    for visit in tree.walk() {
        match visit.node.kind {
            NodeKind::Task => summary.tasks += 1,
            NodeKind::Section => summary.sections += 1,
            NodeKind::File => summary.files += 1,
        }
    }

    if output.is_json() {
        output.data(&summary);
    } else {
        output.success(&format!(
            "{}: valid {} ({} tasks, {} sections, {} files)",
            summary.file, summary.format, summary.tasks, summary.sections, summary.files
        ));
    }
    Ok(())
}
