use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use cpprag::chunker::Chunker;
use cpprag::config::Config;
use cpprag::db::Db;
use cpprag::db::search::{SearchFilter, SearchHit};
use cpprag::embedder::Embedder;
use cpprag::embedder::openai::OpenAiEmbedder;
use cpprag::pipeline::{self, ProjectSummary};

#[derive(Parser)]
#[command(name = "cpprag", version, about = "C++ code chunking, embedding, and semantic retrieval")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Split a project's header/source pairs into chunk artifacts
    Chunk {
        #[arg(long)]
        project_dir: PathBuf,

        /// Defaults to <project-dir>/chunks_<timestamp>
        #[arg(long)]
        output_dir: Option<PathBuf>,

        #[arg(long, default_value_t = 1000)]
        chunk_size: usize,

        #[arg(long, default_value_t = 200)]
        chunk_overlap: usize,
    },
    /// Chunk, embed, and store a project (or one file pair)
    Embed {
        #[arg(long)]
        project_dir: PathBuf,

        /// Defaults to <project-dir>/chunks_<timestamp>
        #[arg(long)]
        output_dir: Option<PathBuf>,

        #[arg(long, default_value_t = 1000)]
        chunk_size: usize,

        #[arg(long, default_value_t = 200)]
        chunk_overlap: usize,

        #[arg(long, default_value = "code_chunks_db")]
        db_dir: PathBuf,

        /// Base name of a single header/source pair to embed
        #[arg(long)]
        single_file: Option<String>,
    },
    /// Semantic similarity search over stored chunks
    Query {
        #[arg(long)]
        query: String,

        #[arg(long, default_value = "code_chunks_db")]
        db_dir: PathBuf,

        #[arg(long, default_value_t = 3)]
        k: usize,

        /// Restrict results to one file's chunks
        #[arg(long)]
        file_name: Option<String>,
    },
    /// Exact metadata lookup, no embedding involved
    Lookup {
        #[arg(long)]
        file_name: String,

        #[arg(long, default_value = "code_chunks_db")]
        db_dir: PathBuf,

        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Chunk {
            project_dir,
            output_dir,
            chunk_size,
            chunk_overlap,
        } => {
            let chunker = Chunker::new(chunk_size, chunk_overlap)?;
            let output_dir =
                output_dir.unwrap_or_else(|| pipeline::default_output_dir(&project_dir));
            pipeline::process_project(&project_dir, &output_dir, &chunker)?;
            Ok(())
        }

        Command::Embed {
            project_dir,
            output_dir,
            chunk_size,
            chunk_overlap,
            db_dir,
            single_file,
        } => {
            // Credential and chunking config are checked before any
            // network call or file-system mutation.
            let api_key = Config::api_key_from_env()?;
            let chunker = Chunker::new(chunk_size, chunk_overlap)?;

            let config = Config::default();
            let embedder = OpenAiEmbedder::new(api_key, &config.model)?;
            let mut db = Db::open(&db_dir, config.model.dimensions)?;

            let summary = match single_file {
                Some(name) => {
                    let record = pipeline::chunk_single_file(&project_dir, &name, &chunker)?;
                    ProjectSummary {
                        project_dir,
                        processed_files: 1,
                        results: BTreeMap::from([(name, record)]),
                    }
                }
                None => {
                    let output_dir =
                        output_dir.unwrap_or_else(|| pipeline::default_output_dir(&project_dir));
                    pipeline::process_project(&project_dir, &output_dir, &chunker)?
                }
            };

            let stats =
                pipeline::embed_project(&summary, &mut db, &embedder, chunk_size, chunk_overlap);
            info!(
                "Stored {} of {} files in {}",
                stats.stored,
                summary.processed_files,
                db_dir.display()
            );
            Ok(())
        }

        Command::Query {
            query,
            db_dir,
            k,
            file_name,
        } => {
            let api_key = Config::api_key_from_env()?;
            let config = Config::default();
            let embedder = OpenAiEmbedder::new(api_key, &config.model)?;
            let db = Db::open(&db_dir, config.model.dimensions)?;

            let query_vector = embedder.embed(&query)?;
            let filter = file_name.as_deref().map(|name| SearchFilter {
                file_name: Some(name),
            });
            let hits = db.similarity_search(&query_vector, k, filter.as_ref())?;

            println!("\nQuery: {query}");
            println!("Results ({}):\n", hits.len());
            print_hits(&hits, true);
            Ok(())
        }

        Command::Lookup {
            file_name,
            db_dir,
            limit,
        } => {
            let config = Config::default();
            let db = Db::open(&db_dir, config.model.dimensions)?;
            let filter = SearchFilter {
                file_name: Some(&file_name),
            };
            let hits = db.exact_match_search(&filter, limit)?;

            println!("\nChunks for {file_name} ({}):\n", hits.len());
            print_hits(&hits, false);
            Ok(())
        }
    }
}

fn print_hits(hits: &[SearchHit], with_similarity: bool) {
    for (i, hit) in hits.iter().enumerate() {
        println!("=== Result {} ===", i + 1);
        println!("File: {} ({})", hit.metadata.file_name, hit.metadata.unit_type);
        if with_similarity {
            println!("Similarity: {:.4}", hit.similarity);
        }
        println!("{}\n", hit.text);
    }
}
