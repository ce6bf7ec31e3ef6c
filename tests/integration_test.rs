/// End-to-end tests for the cpprag pipeline.
///
/// Covers the complete flow:
///   Walker → Inliner → Chunker → (JSON artifacts) → Embedder → Store → Search
use std::fs;

use cpprag::chunker::Chunker;
use cpprag::config::Config;
use cpprag::db::Db;
use cpprag::db::search::SearchFilter;
use cpprag::embedder::Embedder;
use cpprag::embedder::mock::MockEmbedder;
use cpprag::pipeline::{self, UnitType};
use tempfile::tempdir;

const STUDENT_H: &str = "#include <string>\n#include <iostream>\n\nclass Student {\npublic:\n    void print();\nprivate:\n    int id;\n};\n";
const STUDENT_CPP: &str = "#include \"student.h\"\n#include <iostream>\n\nvoid Student::print() {\n    std::cout << id;\n}\n";
const MATRIX_H: &str = "class Matrix {\npublic:\n    double at(int row, int col);\n};\n";

/// Full pipeline: discover → chunk → embed → store → search
#[test]
fn test_full_pipeline() {
    // 1. Setup a project with one pair and one lone header
    let project = tempdir().unwrap();
    fs::write(project.path().join("student.h"), STUDENT_H).unwrap();
    fs::write(project.path().join("student.cpp"), STUDENT_CPP).unwrap();
    fs::write(project.path().join("matrix.h"), MATRIX_H).unwrap();

    let output = tempdir().unwrap();
    let chunker = Chunker::new(200, 40).unwrap();

    // 2. Chunk the project
    let summary = pipeline::process_project(project.path(), output.path(), &chunker).unwrap();
    assert_eq!(summary.processed_files, 2);
    assert_eq!(summary.results.len(), 2);

    let student = &summary.results["student"];
    assert_eq!(student.unit_type, UnitType::HeaderAndSource);
    let joined = student.chunks.concat();
    assert!(joined.contains("#include <string>"), "header includes kept");
    assert!(
        !joined.contains("#include \"student.h\""),
        "implementation includes dropped"
    );
    assert!(joined.contains("void Student::print()"));

    let matrix = &summary.results["matrix"];
    assert_eq!(matrix.unit_type, UnitType::HeaderOnly);
    assert!(matrix.implementation_path.is_none());

    // 3. Artifacts exist and round-trip
    for name in ["student_chunks.json", "matrix_chunks.json", "summary.json"] {
        assert!(output.path().join(name).is_file(), "{name} should exist");
    }
    let reloaded: pipeline::ProjectSummary =
        serde_json::from_str(&fs::read_to_string(output.path().join("summary.json")).unwrap())
            .unwrap();
    assert_eq!(reloaded.processed_files, 2);

    // 4. Embed and store with the mock embedder
    let embedder = MockEmbedder::new(16);
    let mut db = Db::open_in_memory(16).unwrap();
    let stats = pipeline::embed_project(&summary, &mut db, &embedder, 200, 40);
    assert_eq!(stats.stored, 2);
    assert_eq!(stats.failed, 0);
    assert_eq!(db.list_files().unwrap(), vec!["matrix", "student"]);

    // 5. Similarity search returns well-formed hits
    let query_vector = embedder.embed("print the student id").unwrap();
    let hits = db.similarity_search(&query_vector, 5, None).unwrap();
    assert!(!hits.is_empty());
    for hit in &hits {
        assert!(!hit.text.is_empty());
        assert!(!hit.metadata.file_name.is_empty());
        assert!(hit.similarity >= -1.0 && hit.similarity <= 1.0);
    }

    // 6. file_name filter narrows to one file's chunks
    let filter = SearchFilter {
        file_name: Some("matrix"),
    };
    let filtered = db.similarity_search(&query_vector, 10, Some(&filter)).unwrap();
    assert!(!filtered.is_empty());
    assert!(filtered.iter().all(|h| h.metadata.file_name == "matrix"));

    // 7. Exact metadata lookup without a query vector
    let exact = db.exact_match_search(&filter, 10).unwrap();
    assert_eq!(exact.len(), filtered.len());
    assert!(exact.iter().all(|h| h.metadata.unit_type == "header_only"));
}

/// The on-disk store survives reopening.
#[test]
fn test_store_persists_across_reopen() {
    let project = tempdir().unwrap();
    fs::write(project.path().join("a.h"), "class A { int x; };").unwrap();

    let output = tempdir().unwrap();
    let store_dir = tempdir().unwrap();
    let chunker = Chunker::new(100, 10).unwrap();
    let embedder = MockEmbedder::new(8);

    let summary = pipeline::process_project(project.path(), output.path(), &chunker).unwrap();
    {
        let mut db = Db::open(store_dir.path().join("db"), 8).unwrap();
        let stats = pipeline::embed_project(&summary, &mut db, &embedder, 100, 10);
        assert_eq!(stats.stored, 1);
    }

    let db = Db::open(store_dir.path().join("db"), 8).unwrap();
    assert_eq!(db.list_files().unwrap(), vec!["a"]);
}

/// Chunk bound and reconstruction hold end-to-end for real C++ input.
#[test]
fn test_chunking_properties_on_inlined_unit() {
    let chunker = Chunker::new(80, 0).unwrap();
    let inlined = cpprag::inliner::inline_unit(STUDENT_H, STUDENT_CPP);

    let chunks = chunker.split_text(&inlined);
    assert!(!chunks.is_empty());
    for chunk in &chunks {
        assert!(chunk.chars().count() <= 80);
    }
    // Zero overlap: plain concatenation reconstructs the inlined unit
    assert_eq!(chunks.concat(), inlined);

    // Deterministic across calls
    assert_eq!(chunks, chunker.split_text(&inlined));
}

/// Config validation and defaults match the documented CLI surface.
#[test]
fn test_config_defaults_and_validation() {
    let config = Config::default();
    assert_eq!(config.chunk_size, 1000);
    assert_eq!(config.chunk_overlap, 200);
    assert_eq!(config.db_dir, "code_chunks_db");
    assert!(config.validate().is_ok());

    let bad = Config {
        chunk_size: 100,
        chunk_overlap: 150,
        ..Config::default()
    };
    assert!(bad.validate().is_err());

    // The chunker enforces the same rule at construction
    assert!(Chunker::new(100, 150).is_err());
}

/// A lone unreadable pair does not stop the batch.
#[test]
fn test_unreadable_file_is_skipped_not_fatal() {
    let project = tempdir().unwrap();
    fs::write(project.path().join("good.h"), "class Good {};").unwrap();
    // Not valid UTF-8, so reading it as text fails
    fs::write(project.path().join("bad.h"), [0xFFu8, 0xFE, 0x00, 0x80]).unwrap();

    let output = tempdir().unwrap();
    let chunker = Chunker::new(100, 10).unwrap();
    let summary = pipeline::process_project(project.path(), output.path(), &chunker).unwrap();

    // Both discovered, only the readable one produced a record
    assert_eq!(summary.processed_files, 2);
    assert_eq!(summary.results.len(), 1);
    assert!(summary.results.contains_key("good"));
    assert!(!output.path().join("bad_chunks.json").exists());
    assert!(output.path().join("good_chunks.json").is_file());
}
