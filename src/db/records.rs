use super::{Db, serialize_vector};
use rusqlite::{Result, params};

/// Metadata stored alongside one batch of chunks.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub file_name: String,
    pub language: String,
    pub header_path: Option<String>,
    pub implementation_path: Option<String>,
    pub unit_type: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Db {
    /// Append chunks with their embeddings under one metadata record.
    ///
    /// Writes are append-only: re-embedding a file adds a new record rather
    /// than replacing the old one. The whole insert is transactional, so a
    /// failed file leaves nothing behind.
    pub fn add_texts(
        &mut self,
        meta: &StoredFile,
        chunks: &[String],
        embeddings: &[Vec<f32>],
    ) -> Result<i64> {
        assert_eq!(
            chunks.len(),
            embeddings.len(),
            "chunks and embeddings length mismatch"
        );

        let tx = self.conn.transaction()?;

        let file_id: i64 = tx.query_row(
            r#"
            INSERT INTO files
                (file_name, language, header_path, implementation_path,
                 unit_type, chunk_size, chunk_overlap)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
            params![
                meta.file_name,
                meta.language,
                meta.header_path,
                meta.implementation_path,
                meta.unit_type,
                meta.chunk_size as i64,
                meta.chunk_overlap as i64,
            ],
            |row| row.get(0),
        )?;

        for (position, content) in chunks.iter().enumerate() {
            tx.execute(
                "INSERT INTO chunks (file_id, position, content) VALUES (?, ?, ?)",
                params![file_id, position as i64, content],
            )?;
            let chunk_id = tx.last_insert_rowid();

            let vector_blob = serialize_vector(&embeddings[position]);
            tx.execute(
                "INSERT INTO vec_chunks (rowid, embedding) VALUES (?, ?)",
                params![chunk_id, vector_blob],
            )?;
        }

        tx.commit()?;
        Ok(file_id)
    }

    /// File names of all stored records, in insertion order.
    pub fn list_files(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT file_name FROM files ORDER BY id")?;
        let rows = stmt.query_map([], |row| row.get(0))?;

        let mut names = Vec::new();
        for row in rows {
            names.push(row?);
        }
        Ok(names)
    }
}
