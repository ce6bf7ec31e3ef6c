//! # cpprag — C++ code chunking and semantic retrieval
//!
//! Splits C++ header/source pairs into bounded, overlapping text chunks,
//! embeds them through the OpenAI embeddings API, stores the vectors in a
//! local SQLite + sqlite-vec database, and retrieves similar chunks by
//! cosine similarity.
//!
//! ## Architecture
//!
//! - **[`config`]** — Defaults, validation, and credential lookup
//! - **[`walker`]** — Header/implementation pair discovery
//! - **[`inliner`]** — Merges a header and its source into one synthetic unit
//! - **[`chunker`]** — Recursive separator-preference text splitter
//! - **[`embedder`]** — Embedding trait, OpenAI provider, deterministic mock
//! - **[`db`]** — SQLite + sqlite-vec vector store (append-only writes, search)
//! - **[`pipeline`]** — Batch orchestration, JSON artifacts, summary

pub mod chunker;
pub mod config;
pub mod db;
pub mod embedder;
pub mod inliner;
pub mod pipeline;
pub mod walker;
