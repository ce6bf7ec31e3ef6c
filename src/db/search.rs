use super::{Db, serialize_vector};
use rusqlite::Result;
use rusqlite::types::Value;

/// Metadata-based restriction applied to a search.
#[derive(Debug, Default)]
pub struct SearchFilter<'a> {
    pub file_name: Option<&'a str>,
}

#[derive(Debug)]
pub struct SearchHit {
    pub text: String,
    pub similarity: f64,
    pub position: usize,
    pub metadata: HitMetadata,
}

#[derive(Debug)]
pub struct HitMetadata {
    pub file_name: String,
    pub language: String,
    pub header_path: Option<String>,
    pub implementation_path: Option<String>,
    pub unit_type: String,
}

fn map_hit_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SearchHit> {
    let distance: f64 = row.get(7)?;
    let similarity = 1.0 - (distance / 2.0);

    Ok(SearchHit {
        text: row.get(0)?,
        position: row.get::<_, i64>(1)? as usize,
        similarity,
        metadata: HitMetadata {
            file_name: row.get(2)?,
            language: row.get(3)?,
            header_path: row.get(4)?,
            implementation_path: row.get(5)?,
            unit_type: row.get(6)?,
        },
    })
}

impl Db {
    /// Vector similarity search using cosine distance, best matches first.
    pub fn similarity_search(
        &self,
        query_vector: &[f32],
        k: usize,
        filter: Option<&SearchFilter<'_>>,
    ) -> Result<Vec<SearchHit>> {
        let mut query = String::from(
            r#"
            SELECT
                c.content,
                c.position,
                f.file_name,
                f.language,
                f.header_path,
                f.implementation_path,
                f.unit_type,
                vec_distance_cosine(v.embedding, ?) AS distance
            FROM vec_chunks v
            JOIN chunks c ON v.rowid = c.id
            JOIN files f ON c.file_id = f.id
            "#,
        );

        let mut params: Vec<Value> = vec![Value::Blob(serialize_vector(query_vector))];

        if let Some(file_name) = filter.and_then(|f| f.file_name) {
            query.push_str(" WHERE f.file_name = ?");
            params.push(Value::Text(file_name.to_string()));
        }

        query.push_str(" ORDER BY distance ASC LIMIT ?");
        params.push(Value::Integer(k as i64));

        self.run_hit_query(&query, &params)
    }

    /// Metadata-only lookup, no vector involved. Results come back in the
    /// store's native order.
    pub fn exact_match_search(
        &self,
        filter: &SearchFilter<'_>,
        limit: usize,
    ) -> Result<Vec<SearchHit>> {
        let mut query = String::from(
            r#"
            SELECT
                c.content,
                c.position,
                f.file_name,
                f.language,
                f.header_path,
                f.implementation_path,
                f.unit_type,
                0.0 AS distance
            FROM chunks c
            JOIN files f ON c.file_id = f.id
            "#,
        );

        let mut params: Vec<Value> = Vec::new();

        if let Some(file_name) = filter.file_name {
            query.push_str(" WHERE f.file_name = ?");
            params.push(Value::Text(file_name.to_string()));
        }

        query.push_str(" LIMIT ?");
        params.push(Value::Integer(limit as i64));

        self.run_hit_query(&query, &params)
    }

    fn run_hit_query(&self, query: &str, params: &[Value]) -> Result<Vec<SearchHit>> {
        let param_refs: Vec<&dyn rusqlite::ToSql> =
            params.iter().map(|p| p as &dyn rusqlite::ToSql).collect();

        let mut stmt = self.conn.prepare(query)?;
        let rows = stmt.query_map(param_refs.as_slice(), map_hit_row)?;

        let mut hits = Vec::new();
        for row in rows {
            hits.push(row?);
        }
        Ok(hits)
    }
}
