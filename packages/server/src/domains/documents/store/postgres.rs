use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::{DocumentPage, DocumentStore, ListQuery, StorageError, StoreResult, TypeCounts};
use crate::common::DocumentId;
use crate::domains::documents::models::{Document, DocumentType};

/// Documents persisted in the `extracted_documents` table.
#[derive(Clone)]
pub struct PostgresDocumentStore {
    pool: PgPool,
}

impl PostgresDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[derive(Debug, FromRow)]
struct DocumentRow {
    id: DocumentId,
    document_type: String,
    file_name: String,
    extracted_data: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl TryFrom<DocumentRow> for Document {
    type Error = StorageError;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        let document_type =
            row.document_type
                .parse::<DocumentType>()
                .map_err(|e| StorageError::Corrupt {
                    id: row.id,
                    reason: e.to_string(),
                })?;

        Ok(Document {
            id: row.id,
            document_type,
            file_name: row.file_name,
            extracted_data: row.extracted_data,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn insert(&self, document: &Document) -> StoreResult<DocumentId> {
        sqlx::query(
            r#"
            INSERT INTO extracted_documents (id, document_type, file_name, extracted_data, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(document.id)
        .bind(document.document_type.as_str())
        .bind(&document.file_name)
        .bind(&document.extracted_data)
        .bind(document.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StorageError::Duplicate(document.id)
            }
            _ => StorageError::Database(e),
        })?;

        Ok(document.id)
    }

    async fn get(&self, id: DocumentId) -> StoreResult<Option<Document>> {
        let row = sqlx::query_as::<_, DocumentRow>(
            "SELECT id, document_type, file_name, extracted_data, created_at FROM extracted_documents WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Document::try_from).transpose()
    }

    async fn list(&self, query: &ListQuery) -> StoreResult<DocumentPage> {
        let document_type = query.document_type.map(|t| t.as_str());

        let rows = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, document_type, file_name, extracted_data, created_at
            FROM extracted_documents
            WHERE ($1::text IS NULL OR document_type = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(document_type)
        .bind(i64::from(query.limit))
        .bind(i64::from(query.offset))
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM extracted_documents WHERE ($1::text IS NULL OR document_type = $1)",
        )
        .bind(document_type)
        .fetch_one(&self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(Document::try_from)
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(DocumentPage {
            items,
            total: total.max(0) as u64,
        })
    }

    async fn delete(&self, id: DocumentId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM extracted_documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_by_type(&self) -> StoreResult<TypeCounts> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT document_type, COUNT(*) FROM extracted_documents GROUP BY document_type",
        )
        .fetch_all(&self.pool)
        .await?;

        // Rows with types this build doesn't know are left out of the totals.
        let counts = rows.into_iter().filter_map(|(document_type, count)| {
            document_type
                .parse::<DocumentType>()
                .ok()
                .map(|t| (t, count.max(0) as u64))
        });

        Ok(TypeCounts::from_counts(counts))
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
