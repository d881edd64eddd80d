use chrono::{DateTime, Utc};
use scenario_search_backend::search::{SearchEngine, SpeakerUniverse};

pub struct AppState {
    pub engine: SearchEngine,
    /// Snapshot taken at startup; the corpus never changes while serving / 启动时快照
    pub speakers: SpeakerUniverse,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Build state, reading the speaker universe from the corpus once
    pub async fn load(engine: SearchEngine) -> anyhow::Result<Self> {
        let speakers = engine.speaker_universe().await?;
        tracing::info!("Speaker universe loaded: {} names", speakers.len());
        Ok(Self {
            engine,
            speakers,
            started_at: Utc::now(),
        })
    }
}
