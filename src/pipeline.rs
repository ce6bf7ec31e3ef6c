/// Batch orchestration: walk a project, inline and chunk each pair, write
/// JSON artifacts, and push embeddings into the vector store.
///
/// Failures are tolerated at file granularity: a file that cannot be read,
/// chunked, embedded, or stored is logged with its name and skipped, and
/// the batch always runs to completion.
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::chunker::Chunker;
use crate::db::Db;
use crate::db::records::StoredFile;
use crate::embedder::Embedder;
use crate::inliner;
use crate::walker::{self, SourcePair};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnitType {
    HeaderOnly,
    HeaderAndSource,
}

impl UnitType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            UnitType::HeaderOnly => "header_only",
            UnitType::HeaderAndSource => "header_and_source",
        }
    }
}

/// Chunking result for one header/implementation pair. Persisted as
/// `<stem>_chunks.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub header_path: PathBuf,
    pub implementation_path: Option<PathBuf>,
    pub chunks: Vec<String>,
    #[serde(rename = "type")]
    pub unit_type: UnitType,
}

/// Batch result, persisted as `summary.json`. `results` is keyed by file
/// stem and ordered so the artifact is reproducible.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub project_dir: PathBuf,
    pub processed_files: usize,
    pub results: BTreeMap<String, ChunkRecord>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct EmbedStats {
    pub stored: usize,
    pub failed: usize,
}

/// Default artifact directory: `<project_dir>/chunks_<timestamp>`.
#[must_use]
pub fn default_output_dir(project_dir: &Path) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    project_dir.join(format!("chunks_{stamp}"))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn chunk_pair(pair: &SourcePair, chunker: &Chunker) -> Result<ChunkRecord> {
    let header = fs::read_to_string(&pair.header_path)
        .with_context(|| format!("failed to read header: {}", pair.header_path.display()))?;

    let (text, unit_type) = match &pair.implementation_path {
        Some(impl_path) => {
            let implementation = fs::read_to_string(impl_path)
                .with_context(|| format!("failed to read implementation: {}", impl_path.display()))?;
            (
                inliner::inline_unit(&header, &implementation),
                UnitType::HeaderAndSource,
            )
        }
        None => (header, UnitType::HeaderOnly),
    };

    Ok(ChunkRecord {
        header_path: pair.header_path.clone(),
        implementation_path: pair.implementation_path.clone(),
        chunks: chunker.split_text(&text),
        unit_type,
    })
}

/// Chunk one pair by base name: `<project_dir>/<name>.h` plus its sibling
/// implementation if present.
pub fn chunk_single_file(project_dir: &Path, name: &str, chunker: &Chunker) -> Result<ChunkRecord> {
    let header_path = project_dir.join(format!("{name}.h"));
    anyhow::ensure!(
        header_path.is_file(),
        "header not found: {}",
        header_path.display()
    );
    let pair = SourcePair {
        implementation_path: walker::find_implementation(&header_path),
        header_path,
    };
    chunk_pair(&pair, chunker)
}

/// Chunk every header/implementation pair under `project_dir`, writing one
/// `<stem>_chunks.json` per file plus `summary.json` into `output_dir`.
///
/// A failed file gets no artifact; `processed_files` counts every
/// discovered pair, successful or not.
pub fn process_project(
    project_dir: &Path,
    output_dir: &Path,
    chunker: &Chunker,
) -> Result<ProjectSummary> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output dir: {}", output_dir.display()))?;

    let pairs = walker::discover(project_dir);
    let mut results = BTreeMap::new();

    for pair in &pairs {
        let stem = file_stem(&pair.header_path);
        match chunk_pair(pair, chunker).and_then(|record| {
            write_artifact(output_dir, &stem, &record)?;
            Ok(record)
        }) {
            Ok(record) => {
                info!(
                    "Chunked {stem} ({} chunks, {})",
                    record.chunks.len(),
                    record.unit_type.as_str()
                );
                results.insert(stem, record);
            }
            Err(e) => warn!("Skipping {stem}: {e:#}"),
        }
    }

    let summary = ProjectSummary {
        project_dir: project_dir.to_path_buf(),
        processed_files: pairs.len(),
        results,
    };

    let summary_json =
        serde_json::to_string_pretty(&summary).context("failed to serialize summary")?;
    fs::write(output_dir.join("summary.json"), summary_json)
        .context("failed to write summary.json")?;

    info!(
        "Processed {} files into {}",
        summary.processed_files,
        output_dir.display()
    );
    Ok(summary)
}

fn write_artifact(output_dir: &Path, stem: &str, record: &ChunkRecord) -> Result<()> {
    let path = output_dir.join(format!("{stem}_chunks.json"));
    let json = serde_json::to_string_pretty(record)
        .with_context(|| format!("failed to serialize record for {stem}"))?;
    fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Embed every record in the summary and append it to the store.
///
/// Provider failures abort the offending file only; the batch continues and
/// the counts report what happened.
pub fn embed_project<E: Embedder + ?Sized>(
    summary: &ProjectSummary,
    db: &mut Db,
    embedder: &E,
    chunk_size: usize,
    chunk_overlap: usize,
) -> EmbedStats {
    let bar = ProgressBar::new(summary.results.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut stats = EmbedStats::default();
    for (stem, record) in &summary.results {
        bar.set_message(stem.clone());
        match embed_record(stem, record, db, embedder, chunk_size, chunk_overlap) {
            Ok(()) => stats.stored += 1,
            Err(e) => {
                warn!("Failed to embed {stem}: {e:#}");
                stats.failed += 1;
            }
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    info!("Embedded {} files ({} failed)", stats.stored, stats.failed);
    stats
}

fn embed_record<E: Embedder + ?Sized>(
    stem: &str,
    record: &ChunkRecord,
    db: &mut Db,
    embedder: &E,
    chunk_size: usize,
    chunk_overlap: usize,
) -> Result<()> {
    if record.chunks.is_empty() {
        return Ok(());
    }

    let texts: Vec<&str> = record.chunks.iter().map(String::as_str).collect();
    let vectors = embedder.embed_batch(&texts)?;

    let meta = StoredFile {
        file_name: stem.to_string(),
        language: "cpp".to_string(),
        header_path: Some(record.header_path.to_string_lossy().into_owned()),
        implementation_path: record
            .implementation_path
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned()),
        unit_type: record.unit_type.as_str().to_string(),
        chunk_size,
        chunk_overlap,
    };

    db.add_texts(&meta, &record.chunks, &vectors)?;
    Ok(())
}
