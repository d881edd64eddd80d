use serde::{Deserialize, Serialize};

/// One scripted line of dialogue / 台词
///
/// `position` is the corpus-stable order (row id for SQLite, index for memory)
/// and is not part of the wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DialogueLine {
    #[serde(skip)]
    #[sqlx(rename = "id")]
    pub position: i64,
    /// Empty for narration / 旁白为空
    pub speaker: String,
    pub text: String,
}

impl DialogueLine {
    pub fn new(position: i64, speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            position,
            speaker: speaker.into(),
            text: text.into(),
        }
    }
}

/// Seed file entry / 种子文件条目
#[derive(Debug, Clone, Deserialize)]
pub struct SeedLine {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub speaker: String,
    pub text: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Per-speaker match count / 按角色统计
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeakerCount {
    pub speaker: String,
    pub count: u64,
}

/// Raw group row returned by a store, before ranking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakerGroup {
    pub speaker: String,
    pub count: u64,
    /// Smallest position of a matching line for this speaker
    pub first_seen: i64,
}

/// One page of search results / 搜索结果页
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResultPage {
    pub lines: Vec<DialogueLine>,
    pub page: u64,
    pub page_size: u64,
    pub has_more: bool,
}
