//! SQLite corpus store / SQLite 语料库
//!
//! Table layout:
//! - scenario_lines(id, speaker, text), id is the corpus-stable order
//! - speaker is indexed for exact and NOT IN filters
//!
//! Containment uses `instr(text, ?) > 0`, which is case-sensitive, unlike
//! SQLite's `LIKE`.

use async_trait::async_trait;
use sqlx::{sqlite::SqlitePoolOptions, Pool, QueryBuilder, Sqlite};
use std::path::Path;

use super::error::StoreError;
use super::roster::SpeakerFilter;
use super::store::{CorpusStore, LineFilter};
use crate::models::{DialogueLine, SeedLine, SpeakerGroup};

/// Import progress is logged every this many rows
const IMPORT_BATCH: usize = 1000;

/// SQLite-backed corpus / SQLite 语料库
#[derive(Clone, Debug)]
pub struct SqliteCorpus {
    db: Pool<Sqlite>,
}

impl SqliteCorpus {
    /// Use an existing pool
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    /// Open (and create if missing) a corpus database file
    pub async fn open(db_path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Unavailable(format!("{}: {}", parent.display(), e)))?;
        }
        let db_url = format!("sqlite:{}?mode=rwc", db_path.to_string_lossy());
        Self::connect(&db_url).await
    }

    /// Connect by URL, enable WAL and a busy timeout
    pub async fn connect(db_url: &str) -> Result<Self, StoreError> {
        let db = SqlitePoolOptions::new()
            .max_connections(8)
            .connect(db_url)
            .await?;

        sqlx::query("PRAGMA journal_mode=WAL").execute(&db).await?;
        sqlx::query("PRAGMA busy_timeout=5000").execute(&db).await?;

        tracing::info!("Corpus database opened: {} (WAL mode)", db_url);
        Ok(Self { db })
    }

    /// Create tables if they do not exist; never drops data
    pub async fn init(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS scenario_lines (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                speaker TEXT NOT NULL DEFAULT '',
                text TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.db)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_scenario_lines_speaker ON scenario_lines(speaker)")
            .execute(&self.db)
            .await?;

        Ok(())
    }

    pub async fn line_count(&self) -> Result<u64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM scenario_lines")
            .fetch_one(&self.db)
            .await?;
        Ok(count as u64)
    }

    /// Bulk load seed lines in order / 批量导入
    ///
    /// All rows go in one transaction: a failure leaves the table empty, so
    /// the next start imports again.
    pub async fn import(&self, lines: &[SeedLine]) -> Result<u64, StoreError> {
        let mut tx = self.db.begin().await?;
        let mut imported = 0u64;
        for chunk in lines.chunks(IMPORT_BATCH) {
            for line in chunk {
                sqlx::query("INSERT INTO scenario_lines (speaker, text) VALUES (?, ?)")
                    .bind(&line.speaker)
                    .bind(&line.text)
                    .execute(&mut *tx)
                    .await?;
            }
            imported += chunk.len() as u64;
            tracing::debug!("Imported {}/{} lines", imported, lines.len());
        }
        tx.commit().await?;
        Ok(imported)
    }

    pub async fn close(&self) {
        self.db.close().await;
    }
}

/// Append the WHERE clause for a filter
fn push_where(qb: &mut QueryBuilder<'_, Sqlite>, filter: &LineFilter) {
    qb.push(" WHERE 1 = 1");
    if !filter.keyword.is_empty() {
        qb.push(" AND instr(text, ");
        qb.push_bind(filter.keyword.clone());
        qb.push(") > 0");
    }
    match &filter.speaker {
        SpeakerFilter::Any => {}
        SpeakerFilter::Exact(name) => {
            qb.push(" AND speaker = ");
            qb.push_bind(name.clone());
        }
        SpeakerFilter::NotIn(roster) => {
            qb.push(" AND speaker NOT IN (");
            let mut names = qb.separated(", ");
            for name in roster.names() {
                names.push_bind(*name);
            }
            names.push_unseparated(")");
        }
    }
}

fn to_sql_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[async_trait]
impl CorpusStore for SqliteCorpus {
    async fn find_many(
        &self,
        filter: &LineFilter,
        skip: u64,
        take: u64,
    ) -> Result<Vec<DialogueLine>, StoreError> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT id, speaker, text FROM scenario_lines");
        push_where(&mut qb, filter);
        qb.push(" ORDER BY id ASC LIMIT ");
        qb.push_bind(to_sql_int(take));
        qb.push(" OFFSET ");
        qb.push_bind(to_sql_int(skip));

        let lines = qb
            .build_query_as::<DialogueLine>()
            .fetch_all(&self.db)
            .await?;
        Ok(lines)
    }

    async fn group_count(&self, filter: &LineFilter) -> Result<Vec<SpeakerGroup>, StoreError> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT speaker, COUNT(*) AS count, MIN(id) AS first_seen FROM scenario_lines",
        );
        push_where(&mut qb, filter);
        qb.push(" GROUP BY speaker");

        let rows = qb
            .build_query_as::<(String, i64, i64)>()
            .fetch_all(&self.db)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(speaker, count, first_seen)| SpeakerGroup {
                speaker,
                count: count as u64,
                first_seen,
            })
            .collect())
    }

    async fn distinct_speakers(&self) -> Result<Vec<String>, StoreError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT speaker FROM scenario_lines GROUP BY speaker ORDER BY MIN(id)")
                .fetch_all(&self.db)
                .await?;
        Ok(rows.into_iter().map(|(speaker,)| speaker).collect())
    }
}
