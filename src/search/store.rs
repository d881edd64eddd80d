//! Corpus store contract / 语料库存储接口
//!
//! The engine only needs three read primitives from a store. Stores return
//! rows in corpus-stable order; ranking of groups happens in the engine.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use super::error::StoreError;
use super::roster::SpeakerFilter;
use crate::models::{DialogueLine, SeedLine, SpeakerGroup};

/// Keyword containment AND speaker predicate / 组合筛选条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFilter {
    /// Case-sensitive substring of `text`; empty matches everything
    pub keyword: String,
    pub speaker: SpeakerFilter,
}

impl LineFilter {
    pub fn contains(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            speaker: SpeakerFilter::Any,
        }
    }

    pub fn with_speaker(mut self, speaker: SpeakerFilter) -> Self {
        self.speaker = speaker;
        self
    }

    pub fn matches(&self, line: &DialogueLine) -> bool {
        line.text.contains(self.keyword.as_str()) && self.speaker.accepts(&line.speaker)
    }
}

#[async_trait]
pub trait CorpusStore: Send + Sync {
    /// Matching lines in corpus order, after skipping `skip`, at most `take`
    async fn find_many(
        &self,
        filter: &LineFilter,
        skip: u64,
        take: u64,
    ) -> Result<Vec<DialogueLine>, StoreError>;

    /// Matching lines grouped by speaker, in no particular order
    async fn group_count(&self, filter: &LineFilter) -> Result<Vec<SpeakerGroup>, StoreError>;

    /// Every distinct speaker present in the corpus
    async fn distinct_speakers(&self) -> Result<Vec<String>, StoreError>;
}

/// Read a JSON seed file: an array of `{speaker, text}` / 读取种子文件
pub fn read_seed_file(path: &Path) -> anyhow::Result<Vec<SeedLine>> {
    let content = std::fs::read_to_string(path)?;
    let lines: Vec<SeedLine> = serde_json::from_str(&content)?;
    tracing::info!("Read {} seed lines from {:?}", lines.len(), path);
    Ok(lines)
}

/// In-memory corpus / 内存语料库
#[derive(Debug, Clone, Default)]
pub struct MemoryCorpus {
    lines: Arc<Vec<DialogueLine>>,
}

impl MemoryCorpus {
    /// Positions follow input order, starting at 1
    pub fn from_seed(seed: Vec<SeedLine>) -> Self {
        let lines = seed
            .into_iter()
            .enumerate()
            .map(|(idx, line)| DialogueLine::new(idx as i64 + 1, line.speaker, line.text))
            .collect();
        Self {
            lines: Arc::new(lines),
        }
    }

    pub fn from_pairs<S: AsRef<str>>(pairs: &[(S, S)]) -> Self {
        Self::from_seed(
            pairs
                .iter()
                .map(|(speaker, text)| SeedLine {
                    speaker: speaker.as_ref().to_string(),
                    text: text.as_ref().to_string(),
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[async_trait]
impl CorpusStore for MemoryCorpus {
    async fn find_many(
        &self,
        filter: &LineFilter,
        skip: u64,
        take: u64,
    ) -> Result<Vec<DialogueLine>, StoreError> {
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let take = usize::try_from(take).unwrap_or(usize::MAX);
        Ok(self
            .lines
            .iter()
            .filter(|line| filter.matches(line))
            .skip(skip)
            .take(take)
            .cloned()
            .collect())
    }

    async fn group_count(&self, filter: &LineFilter) -> Result<Vec<SpeakerGroup>, StoreError> {
        let mut groups: Vec<SpeakerGroup> = Vec::new();
        for line in self.lines.iter().filter(|line| filter.matches(line)) {
            match groups.iter_mut().find(|g| g.speaker == line.speaker) {
                Some(group) => group.count += 1,
                None => groups.push(SpeakerGroup {
                    speaker: line.speaker.clone(),
                    count: 1,
                    first_seen: line.position,
                }),
            }
        }
        Ok(groups)
    }

    async fn distinct_speakers(&self) -> Result<Vec<String>, StoreError> {
        let mut speakers: Vec<String> = Vec::new();
        for line in self.lines.iter() {
            if !speakers.contains(&line.speaker) {
                speakers.push(line.speaker.clone());
            }
        }
        Ok(speakers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::roster::SpeakerRoster;
    use std::io::Write;

    fn corpus() -> MemoryCorpus {
        MemoryCorpus::from_pairs(&[
            ("A", "hello world"),
            ("B", "hello there"),
            ("A", "goodbye"),
            ("", "Hello narration"),
        ])
    }

    #[tokio::test]
    async fn test_find_many_is_case_sensitive() {
        let lines = corpus()
            .find_many(&LineFilter::contains("hello"), 0, 10)
            .await
            .unwrap();
        let texts: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["hello world", "hello there"]);
    }

    #[tokio::test]
    async fn test_find_many_skip_take() {
        let store = corpus();
        let all = store.find_many(&LineFilter::contains(""), 0, 100).await.unwrap();
        assert_eq!(all.len(), 4);
        let window = store.find_many(&LineFilter::contains(""), 1, 2).await.unwrap();
        assert_eq!(window, all[1..3].to_vec());
        let past_end = store.find_many(&LineFilter::contains(""), 10, 2).await.unwrap();
        assert!(past_end.is_empty());
    }

    #[tokio::test]
    async fn test_other_filter() {
        let store = MemoryCorpus::from_pairs(&[("結城 友奈", "勇者部"), ("大赦", "勇者様")]);
        let filter = LineFilter::contains("勇者")
            .with_speaker(SpeakerFilter::NotIn(SpeakerRoster::main_cast()));
        let lines = store.find_many(&filter, 0, 10).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].speaker, "大赦");
    }

    #[tokio::test]
    async fn test_group_count_first_seen() {
        let groups = corpus()
            .group_count(&LineFilter::contains("o"))
            .await
            .unwrap();
        assert_eq!(
            groups,
            vec![
                SpeakerGroup { speaker: "A".into(), count: 2, first_seen: 1 },
                SpeakerGroup { speaker: "B".into(), count: 1, first_seen: 2 },
                SpeakerGroup { speaker: "".into(), count: 1, first_seen: 4 },
            ]
        );
    }

    #[tokio::test]
    async fn test_distinct_speakers() {
        let speakers = corpus().distinct_speakers().await.unwrap();
        assert_eq!(speakers, vec!["A", "B", ""]);
    }

    #[test]
    fn test_read_seed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"speaker":"A","text":"hello"}},{{"text":"…"}}]"#).unwrap();
        let seed = read_seed_file(file.path()).unwrap();
        let store = MemoryCorpus::from_seed(seed);
        assert_eq!(store.len(), 2);
    }
}
