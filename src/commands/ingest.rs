//! Document ingestion command

use crate::error::Result;
use crate::index::DocumentIndexer;
use crate::load::{self, FileKind};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// Outcome of an ingest run
#[derive(Debug, Default)]
pub struct IngestStats {
    pub files_processed: usize,
    pub files_failed: usize,
    pub chunks_indexed: usize,
    pub errors: Vec<String>,
}

/// Ingest a file or every supported file under a directory.
///
/// Files fail independently: a document that cannot be loaded or indexed is
/// recorded in the stats and the run continues.
pub async fn run(indexer: &DocumentIndexer, path: &Path) -> Result<IngestStats> {
    let files = collect_files(path)?;
    if files.is_empty() {
        warn!("No supported documents under {}", path.display());
        return Ok(IngestStats::default());
    }

    let bar = ProgressBar::new(files.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut stats = IngestStats::default();
    for file in files {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        bar.set_message(name.clone());

        match load::load_document(&file) {
            Ok((content, metadata)) => {
                let chunks = indexer
                    .index_document(&content, &metadata.file_name, Some(metadata.to_extra()))
                    .await;
                if chunks > 0 {
                    stats.files_processed += 1;
                    stats.chunks_indexed += chunks;
                } else {
                    stats.files_failed += 1;
                    stats.errors.push(format!("{name}: no chunks indexed"));
                }
            }
            Err(e) => {
                stats.files_failed += 1;
                stats.errors.push(format!("{name}: {e}"));
            }
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    info!(
        "Ingested {} files ({} chunks), {} failed",
        stats.files_processed, stats.chunks_indexed, stats.files_failed
    );
    Ok(stats)
}

pub fn print_stats(stats: &IngestStats) {
    println!(
        "Indexed {} chunks from {} files",
        stats.chunks_indexed, stats.files_processed
    );
    if stats.files_failed > 0 {
        println!("{} files failed:", stats.files_failed);
        for error in &stats.errors {
            println!("  {error}");
        }
    }
}

/// A single file is taken as-is; a directory is walked recursively for
/// supported extensions, sorted for a stable ingest order.
fn collect_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|p| {
            p.extension()
                .map(|e| e.to_string_lossy().to_lowercase())
                .map(|ext| FileKind::from_extension(&ext).is_some())
                .unwrap_or(false)
        })
        .collect();

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), "b").unwrap();
        std::fs::write(dir.path().join("a.md"), "a").unwrap();
        std::fs::write(dir.path().join("skip.exe"), "x").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested/c.csv"), "x,y\n1,2").unwrap();

        let files = collect_files(dir.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.md", "b.txt", "c.csv"]);
    }

    #[test]
    fn test_collect_single_file_ignores_extension_filter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.unknown");
        std::fs::write(&path, "content").unwrap();

        // An explicitly named file is always attempted
        let files = collect_files(&path).unwrap();
        assert_eq!(files, vec![path]);
    }
}
