//! PostgreSQL record store.
//!
//! Documents live in the `records` table as JSONB. Equality conditions are
//! evaluated with containment (`doc @> $conditions`), so they use the GIN
//! index. The numeric `id` is drawn from `records_id_seq` and written both
//! to the key column and into the document itself.

use async_trait::async_trait;
use repairdesk_core::query::{BuiltQuery, SortDirection};
use repairdesk_core::store::{
    Document, ReadOutcome, RecordStore, StoreError, StoreResult, UpdateOutcome, UpdateSpec,
};
use sqlx::types::Json;
use sqlx::{Postgres, QueryBuilder};

use crate::DbPool;

/// PostgreSQL unique violation.
const UNIQUE_VIOLATION: &str = "23505";

pub struct PgRecordStore {
    pool: DbPool,
}

impl PgRecordStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn create_record(&self, collection: &str, fields: Document) -> StoreResult<Document> {
        let Json(doc) = sqlx::query_scalar::<_, Json<Document>>(
            "WITH next AS (SELECT nextval('records_id_seq') AS id)
             INSERT INTO records (id, collection, doc)
             SELECT next.id, $1, $2 || jsonb_build_object('id', next.id) FROM next
             RETURNING doc",
        )
        .bind(collection)
        .bind(Json(&fields))
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(doc)
    }

    async fn read_records(&self, collection: &str, query: &BuiltQuery) -> StoreResult<ReadOutcome> {
        if query.count {
            let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM records");
            push_filter(&mut qb, collection, query);
            let count: i64 = qb
                .build_query_scalar()
                .fetch_one(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
            return Ok(ReadOutcome::Count {
                count: u64::try_from(count).unwrap_or(0),
            });
        }

        let mut qb = QueryBuilder::<Postgres>::new("SELECT doc FROM records");
        push_filter(&mut qb, collection, query);
        push_order_and_paging(&mut qb, query);

        let rows: Vec<Json<Document>> = qb
            .build_query_scalar()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let records = rows
            .into_iter()
            .map(|Json(doc)| query.fields_to_return.apply(&doc))
            .collect();
        Ok(ReadOutcome::Records(records))
    }

    async fn update_records(
        &self,
        collection: &str,
        update: &UpdateSpec,
    ) -> StoreResult<UpdateOutcome> {
        // Rows already holding every value in `data` are left alone so the
        // affected count reflects real changes.
        let result = sqlx::query(
            "UPDATE records SET doc = doc || $3
             WHERE collection = $1 AND doc @> $2 AND NOT (doc @> $3)",
        )
        .bind(collection)
        .bind(Json(&update.conditions))
        .bind(Json(&update.data))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(UpdateOutcome {
            ok: true,
            n_modified: result.rows_affected(),
        })
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, collection: &str, query: &BuiltQuery) {
    qb.push(" WHERE collection = ")
        .push_bind(collection.to_string())
        .push(" AND doc @> ")
        .push_bind(Json(query.seek_conditions.clone()));
}

fn push_order_and_paging(qb: &mut QueryBuilder<'_, Postgres>, query: &BuiltQuery) {
    qb.push(" ORDER BY ");
    for key in &query.sort_condition.0 {
        qb.push("doc -> (")
            .push_bind(key.field.clone())
            .push("::text)")
            .push(match key.direction {
                SortDirection::Ascending => " ASC, ",
                SortDirection::Descending => " DESC, ",
            });
    }
    qb.push("id ASC");

    if let Some(limit) = query.limit {
        qb.push(" LIMIT ").push_bind(to_i64(limit));
    }
    if query.skip > 0 {
        qb.push(" OFFSET ").push_bind(to_i64(query.skip));
    }
}

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Translate a sqlx error into the store's error vocabulary.
///
/// Unique violations on an index named `uq_<collection>_<field>` surface as
/// [`StoreError::Duplicate`] naming the field.
fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let field = db_err
                .constraint()
                .and_then(|c| c.rsplit('_').next())
                .unwrap_or("unknown")
                .to_string();
            return StoreError::Duplicate { field };
        }
    }
    tracing::error!(error = %err, "Record store query failed");
    StoreError::Backend(err.to_string())
}

#[cfg(test)]
mod tests {
    use repairdesk_core::query::{build_query, QueryOptions};

    use super::*;

    fn rendered(query: &BuiltQuery) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT doc FROM records");
        push_filter(&mut qb, "tickets", query);
        push_order_and_paging(&mut qb, query);
        qb.sql().to_string()
    }

    #[test]
    fn default_query_orders_by_id_without_paging() {
        let sql = rendered(&build_query(&QueryOptions::new()));
        assert_eq!(
            sql,
            "SELECT doc FROM records WHERE collection = $1 AND doc @> $2 ORDER BY id ASC"
        );
    }

    #[test]
    fn sort_fields_are_bound_not_interpolated() {
        let options = QueryOptions {
            skip: Some(10),
            limit: Some(5),
            ..QueryOptions::new().with_sort("-createdOn brand")
        };
        let sql = rendered(&build_query(&options));
        assert_eq!(
            sql,
            "SELECT doc FROM records WHERE collection = $1 AND doc @> $2 \
             ORDER BY doc -> ($3::text) DESC, doc -> ($4::text) ASC, id ASC LIMIT $5 OFFSET $6"
        );
    }
}
