//! Scenario line search module / 台词搜索模块
//!
//! Architecture principles / 架构原则：
//! - query: raw parameters → validated SearchQuery (shared by search and count)
//! - roster: main cast and speaker selector → predicate
//! - store: read-only corpus primitives (find_many, group_count)
//! - engine: composes predicates, paginates, aggregates
//! - Call direction: API → query → engine → store (unidirectional) / 调用方向
//!
//! Matching features / 匹配特性：
//! - Case-sensitive substring containment, no tokenizing or fuzzy matching
//! - Corpus order, no relevance scoring

pub mod aggregate;
pub mod db_store;
pub mod engine;
pub mod error;
pub mod query;
pub mod roster;
pub mod store;

pub use db_store::SqliteCorpus;
pub use engine::SearchEngine;
pub use error::{FieldIssue, IssueKind, StoreError, ValidationError};
pub use query::{normalize, RawSearchParams, SearchQuery};
pub use roster::{SpeakerFilter, SpeakerRoster, SpeakerSelector, SpeakerUniverse};
pub use store::{CorpusStore, LineFilter, MemoryCorpus};
