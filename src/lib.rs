pub mod config;
pub mod models;
pub mod search;

use std::sync::Arc;

use config::{AppConfig, CorpusBackend};
use search::{store::read_seed_file, CorpusStore, MemoryCorpus, SqliteCorpus};

/// Open the configured corpus, importing the seed file into an empty database / 打开语料库
pub async fn open_corpus(
    config: &AppConfig,
    database_url: &str,
) -> anyhow::Result<Arc<dyn CorpusStore>> {
    let seed_file = config.get_seed_file();

    match config.corpus.backend {
        CorpusBackend::Memory => {
            let seed = match seed_file {
                Some(path) if path.exists() => read_seed_file(&path)?,
                Some(path) => {
                    tracing::warn!("Seed file {:?} does not exist, corpus is empty", path);
                    Vec::new()
                }
                None => {
                    tracing::warn!("No seed file is configured, corpus is empty");
                    Vec::new()
                }
            };
            let corpus = MemoryCorpus::from_seed(seed);
            tracing::info!("In-memory corpus loaded: {} lines", corpus.len());
            Ok(Arc::new(corpus))
        }
        CorpusBackend::Sqlite => {
            let corpus = SqliteCorpus::connect(database_url).await?;
            corpus.init().await?;

            let existing = corpus.line_count().await?;
            if existing == 0 {
                match seed_file {
                    Some(path) if path.exists() => {
                        let seed = read_seed_file(&path)?;
                        let imported = corpus.import(&seed).await?;
                        tracing::info!("Imported {} lines from {:?}", imported, path);
                    }
                    Some(path) => {
                        tracing::warn!("Corpus is empty and seed file {:?} does not exist", path)
                    }
                    None => tracing::warn!("Corpus is empty and no seed file is configured"),
                }
            } else {
                tracing::info!("Corpus database holds {} lines", existing);
            }
            Ok(Arc::new(corpus))
        }
    }
}
