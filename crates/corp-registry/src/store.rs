use crate::models::{CorpIdentity, LoadSummary, RegistryRecord, RegistryStats};
use dart_core::{DartError, DartResult};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Default number of search results.
pub const DEFAULT_SEARCH_LIMIT: i64 = 20;

/// Upper bound for a caller-supplied search limit.
pub const MAX_SEARCH_LIMIT: i64 = 100;

const SELECT_COLUMNS: &str = "SELECT corp_code, corp_name, \
     COALESCE(corp_eng_name, '') AS corp_eng_name, \
     COALESCE(stock_code, '') AS stock_code, \
     COALESCE(modify_date, '') AS modify_date \
     FROM companies";

/// Persistent index of registered corporations keyed by `corp_code`
#[derive(Clone)]
pub struct RegistryStore {
    pool: SqlitePool,
}

impl RegistryStore {
    /// Open (creating if missing) the registry database
    pub async fn new(database_url: &str) -> DartResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(db_err)?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(db_err)?;

        let store = Self { pool };
        store.init_schema().await?;

        Ok(store)
    }

    /// Private in-memory store. A single pinned connection keeps the
    /// database alive for the lifetime of the pool.
    pub async fn in_memory() -> DartResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(db_err)?;

        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> DartResult<Self> {
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Initialize database schema
    async fn init_schema(&self) -> DartResult<()> {
        let schema = include_str!("../schema.sql");

        // sqlx executes one statement per query
        for statement in schema.split(';') {
            let stmt = statement.trim();
            if !stmt.is_empty() {
                sqlx::query(stmt)
                    .execute(&self.pool)
                    .await
                    .map_err(db_err)?;
            }
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Load parsed feed records. Records without a `corp_code` are skipped.
    pub async fn load(&self, records: &[RegistryRecord]) -> DartResult<LoadSummary> {
        let identities: Vec<CorpIdentity> =
            records.iter().filter_map(RegistryRecord::to_identity).collect();
        let skipped = records.len() - identities.len();
        if skipped > 0 {
            warn!("Skipping {} records without corp_code", skipped);
        }

        let loaded = self.upsert_companies(&identities).await?;
        info!("Loaded {} companies ({} skipped)", loaded, skipped);

        Ok(LoadSummary { loaded, skipped })
    }

    /// Insert or fully replace companies by `corp_code`, in one transaction.
    pub async fn upsert_companies(&self, companies: &[CorpIdentity]) -> DartResult<usize> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        for company in companies {
            sqlx::query(
                r#"
                INSERT INTO companies (corp_code, corp_name, corp_eng_name, stock_code, modify_date)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(corp_code) DO UPDATE SET
                    corp_name = excluded.corp_name,
                    corp_eng_name = excluded.corp_eng_name,
                    stock_code = excluded.stock_code,
                    modify_date = excluded.modify_date
                "#,
            )
            .bind(&company.corp_code)
            .bind(&company.corp_name)
            .bind(&company.corp_eng_name)
            .bind(company.stock_code.trim())
            .bind(&company.modify_date)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;
        Ok(companies.len())
    }

    /// Substring search on `corp_name`, ASCII case-insensitive.
    ///
    /// Exact name matches come first, then listed companies, then by name.
    /// A blank query returns nothing; `limit` is clamped to 1..=100.
    pub async fn search(&self, query: &str, limit: Option<i64>) -> DartResult<Vec<CorpIdentity>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let limit = limit
            .unwrap_or(DEFAULT_SEARCH_LIMIT)
            .clamp(1, MAX_SEARCH_LIMIT);

        let sql = format!(
            "{} WHERE instr(lower(corp_name), lower(?1)) > 0 \
             ORDER BY \
                CASE WHEN lower(corp_name) = lower(?1) THEN 0 ELSE 1 END, \
                CASE WHEN COALESCE(TRIM(stock_code), '') != '' THEN 0 ELSE 1 END, \
                corp_name \
             LIMIT ?2",
            SELECT_COLUMNS
        );

        let companies = sqlx::query_as::<_, CorpIdentity>(&sql)
            .bind(query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        debug!("Search '{}' matched {} companies", query, companies.len());
        Ok(companies)
    }

    pub async fn get(&self, corp_code: &str) -> DartResult<Option<CorpIdentity>> {
        let sql = format!("{} WHERE corp_code = ?1", SELECT_COLUMNS);

        sqlx::query_as::<_, CorpIdentity>(&sql)
            .bind(corp_code.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)
    }

    pub async fn count(&self) -> DartResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM companies")
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(count)
    }

    pub async fn stats(&self) -> DartResult<RegistryStats> {
        let (total, listed): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(CASE WHEN COALESCE(TRIM(stock_code), '') != '' THEN 1 ELSE 0 END), 0)
            FROM companies
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(RegistryStats {
            total,
            listed,
            unlisted: total - listed,
        })
    }

    /// A few listed companies, by name, for quick inspection after a load
    pub async fn listed_sample(&self, limit: i64) -> DartResult<Vec<CorpIdentity>> {
        let sql = format!(
            "{} WHERE COALESCE(TRIM(stock_code), '') != '' ORDER BY corp_name LIMIT ?1",
            SELECT_COLUMNS
        );

        sqlx::query_as::<_, CorpIdentity>(&sql)
            .bind(limit.max(0))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)
    }
}

fn db_err(err: sqlx::Error) -> DartError {
    DartError::Database(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company(corp_code: &str, corp_name: &str, stock_code: &str) -> CorpIdentity {
        CorpIdentity {
            corp_code: corp_code.to_string(),
            corp_name: corp_name.to_string(),
            corp_eng_name: String::new(),
            stock_code: stock_code.to_string(),
            modify_date: "20240101".to_string(),
        }
    }

    async fn seeded() -> RegistryStore {
        let store = RegistryStore::in_memory().await.unwrap();
        store
            .upsert_companies(&[
                company("00000005", "삼성코닝", ""),
                company("00126380", "삼성전자", "005930"),
                company("00000003", "삼성생명", "032830"),
                company("00000004", "삼성물산", "028260"),
                company("00000001", "삼성", ""),
                company("00000006", "삼성가나", ""),
                company("00000009", "LG전자", "066570"),
                company("00000010", "Apple Korea", ""),
            ])
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_store_creation() {
        let store = RegistryStore::in_memory().await.unwrap();
        assert!(store.pool().acquire().await.is_ok());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_search_ranks_exact_then_listed_then_name() {
        let store = seeded().await;
        let names: Vec<String> = store
            .search("삼성", None)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.corp_name)
            .collect();

        assert_eq!(
            names,
            vec!["삼성", "삼성물산", "삼성생명", "삼성전자", "삼성가나", "삼성코닝"]
        );
    }

    #[tokio::test]
    async fn test_search_limit_and_blank_query() {
        let store = seeded().await;
        assert_eq!(store.search("삼성", Some(2)).await.unwrap().len(), 2);
        assert_eq!(store.search("삼성", Some(0)).await.unwrap().len(), 1);
        assert!(store.search("   ", None).await.unwrap().is_empty());
        assert!(store.search("없는회사", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_is_ascii_case_insensitive() {
        let store = seeded().await;
        let results = store.search("apple", None).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].corp_name, "Apple Korea");

        assert_eq!(store.search("lg", None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_by_corp_code() {
        let store = seeded().await;
        let company = store.get("00126380").await.unwrap().unwrap();
        assert_eq!(company.corp_name, "삼성전자");
        assert_eq!(company.stock_code, "005930");

        assert!(store.get("99999999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_row() {
        let store = seeded().await;
        store
            .upsert_companies(&[company("00126380", "삼성전자(주)", " 005930 ")])
            .await
            .unwrap();

        let company = store.get("00126380").await.unwrap().unwrap();
        assert_eq!(company.corp_name, "삼성전자(주)");
        assert_eq!(company.stock_code, "005930");
        assert_eq!(store.count().await.unwrap(), 8);
    }

    #[tokio::test]
    async fn test_load_is_idempotent_and_skips_records_without_code() {
        let store = RegistryStore::in_memory().await.unwrap();
        let records: Vec<RegistryRecord> = vec![
            [("corp_code", "00126380"), ("corp_name", "삼성전자"), ("stock_code", "005930")],
            [("corp_code", "00434003"), ("corp_name", "다코"), ("stock_code", "")],
            [("corp_code", ""), ("corp_name", "코드없음"), ("stock_code", "")],
        ]
        .into_iter()
        .map(|pairs| {
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<RegistryRecord>()
        })
        .collect();

        let first = store.load(&records).await.unwrap();
        assert_eq!(first, LoadSummary { loaded: 2, skipped: 1 });

        let second = store.load(&records).await.unwrap();
        assert_eq!(second, first);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_stats_split_listed_and_unlisted() {
        let store = seeded().await;
        let stats = store.stats().await.unwrap();
        assert_eq!(
            stats,
            RegistryStats {
                total: 8,
                listed: 4,
                unlisted: 4
            }
        );

        let sample = store.listed_sample(2).await.unwrap();
        assert_eq!(sample.len(), 2);
        assert!(sample.iter().all(CorpIdentity::is_listed));
    }
}
