//! Scenario line search engine / 台词搜索引擎
//!
//! Only composes store primitives:
//! - search: keyword AND speaker predicate, paginated in corpus order
//! - count_by_speaker: keyword only, grouped and ranked
//!
//! No relevance ranking; results keep corpus order.

use std::sync::Arc;

use super::aggregate::rank_speaker_counts;
use super::error::StoreError;
use super::query::SearchQuery;
use super::roster::{SpeakerRoster, SpeakerUniverse};
use super::store::{CorpusStore, LineFilter};
use crate::models::{SearchResultPage, SpeakerCount};

/// Search and aggregation over one corpus / 搜索引擎
#[derive(Clone)]
pub struct SearchEngine {
    store: Arc<dyn CorpusStore>,
    roster: SpeakerRoster,
}

impl SearchEngine {
    pub fn new(store: Arc<dyn CorpusStore>) -> Self {
        Self::with_roster(store, SpeakerRoster::main_cast())
    }

    pub fn with_roster(store: Arc<dyn CorpusStore>, roster: SpeakerRoster) -> Self {
        Self { store, roster }
    }

    pub fn roster(&self) -> SpeakerRoster {
        self.roster
    }

    /// One page of matching lines / 分页搜索
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResultPage, StoreError> {
        let filter =
            LineFilter::contains(query.keyword.as_str()).with_speaker(query.speaker.resolve(self.roster));

        // one extra row tells whether another page exists
        let take = query.page_size.saturating_add(1);
        let mut lines = self.store.find_many(&filter, query.offset(), take).await?;

        let has_more = lines.len() as u64 > query.page_size;
        if has_more {
            lines.truncate(query.page_size as usize);
        }

        tracing::debug!(
            "search keyword={:?} speaker={:?} page={} size={} -> {} lines (more: {})",
            query.keyword,
            query.speaker,
            query.page,
            query.page_size,
            lines.len(),
            has_more
        );

        Ok(SearchResultPage {
            lines,
            page: query.page,
            page_size: query.page_size,
            has_more,
        })
    }

    /// Matches per speaker for a keyword, ignoring any speaker selector / 按角色统计
    pub async fn count_by_speaker(&self, keyword: &str) -> Result<Vec<SpeakerCount>, StoreError> {
        let groups = self.store.group_count(&LineFilter::contains(keyword)).await?;
        let counts = rank_speaker_counts(groups);
        tracing::debug!("count keyword={:?} -> {} speakers", keyword, counts.len());
        Ok(counts)
    }

    /// Roster plus every corpus speaker, for selector validation
    pub async fn speaker_universe(&self) -> Result<SpeakerUniverse, StoreError> {
        let speakers = self.store.distinct_speakers().await?;
        Ok(SpeakerUniverse::new(self.roster, speakers))
    }
}
