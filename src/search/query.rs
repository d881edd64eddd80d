//! Request parameter normalization / 查询参数规范化
//!
//! Both the search and count endpoints parse through [`normalize`], so they
//! share defaults and report errors the same way.

use serde::Deserialize;

use super::error::{FieldIssue, ValidationError};
use super::roster::{SpeakerSelector, SpeakerUniverse};

/// Keyword used when the request carries none / 默认关键词
pub const DEFAULT_KEYWORD: &str = "勇者";
pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Untyped query string parameters / 原始查询参数
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSearchParams {
    pub keyword: Option<String>,
    pub speaker: Option<String>,
    pub page: Option<String>,
    #[serde(alias = "page_size")]
    pub page_size: Option<String>,
    /// Fields that appeared more than once in the query string
    #[serde(skip)]
    pub repeated: Vec<&'static str>,
}

impl RawSearchParams {
    /// Build from decoded query pairs, remembering repeated fields.
    ///
    /// `pageSize` and `page_size` name the same field. Unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut raw = Self::default();
        for (key, value) in pairs {
            let (field, slot) = match key.as_ref() {
                "keyword" => ("keyword", &mut raw.keyword),
                "speaker" => ("speaker", &mut raw.speaker),
                "page" => ("page", &mut raw.page),
                "pageSize" | "page_size" => ("pageSize", &mut raw.page_size),
                _ => continue,
            };
            if slot.is_some() {
                if !raw.repeated.contains(&field) {
                    raw.repeated.push(field);
                }
                continue;
            }
            *slot = Some(value.into());
        }
        raw
    }

    fn is_repeated(&self, field: &str) -> bool {
        self.repeated.contains(&field)
    }
}

/// Canonical, validated query / 规范化查询
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Empty matches every line
    pub keyword: String,
    pub speaker: SpeakerSelector,
    pub page: u64,
    pub page_size: u64,
}

impl SearchQuery {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            speaker: SpeakerSelector::All,
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_speaker(mut self, speaker: SpeakerSelector) -> Self {
        self.speaker = speaker;
        self
    }

    pub fn with_page(mut self, page: u64, page_size: u64) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }

    /// Rows to skip before this page
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }
}

/// Parse and validate raw parameters, collecting every failure.
pub fn normalize(
    raw: &RawSearchParams,
    speakers: &SpeakerUniverse,
) -> Result<SearchQuery, ValidationError> {
    let mut issues = Vec::new();

    if raw.is_repeated("keyword") {
        issues.push(FieldIssue::repeated("keyword"));
    }
    let keyword = raw
        .keyword
        .clone()
        .unwrap_or_else(|| DEFAULT_KEYWORD.to_string());

    let speaker = match raw.speaker.as_deref() {
        _ if raw.is_repeated("speaker") => {
            issues.push(FieldIssue::repeated("speaker"));
            SpeakerSelector::All
        }
        None => SpeakerSelector::All,
        Some(value) => match SpeakerSelector::from_param(value) {
            SpeakerSelector::Named(name) if !speakers.contains(&name) => {
                issues.push(FieldIssue::unknown_speaker(&name));
                SpeakerSelector::All
            }
            selector => selector,
        },
    };

    let page = parse_bounded(raw.page.as_deref(), "page", DEFAULT_PAGE, 1, None, &mut issues);
    if raw.is_repeated("page") {
        issues.push(FieldIssue::repeated("page"));
    }
    let page_size = parse_bounded(
        raw.page_size.as_deref(),
        "pageSize",
        DEFAULT_PAGE_SIZE,
        1,
        Some(MAX_PAGE_SIZE),
        &mut issues,
    );
    if raw.is_repeated("pageSize") {
        issues.push(FieldIssue::repeated("pageSize"));
    }

    if !issues.is_empty() {
        return Err(ValidationError { issues });
    }

    Ok(SearchQuery {
        keyword,
        speaker,
        page,
        page_size,
    })
}

/// Integer coercion with range checks; out-of-range is an error, never clamped.
fn parse_bounded(
    raw: Option<&str>,
    field: &'static str,
    default: u64,
    min: u64,
    max: Option<u64>,
    issues: &mut Vec<FieldIssue>,
) -> u64 {
    let Some(raw) = raw else {
        return default;
    };

    let value = match raw.trim().parse::<i64>() {
        Ok(value) => value,
        Err(_) => {
            issues.push(FieldIssue::invalid(
                field,
                format!("expected an integer, got `{}`", raw),
            ));
            return default;
        }
    };

    if value < min as i64 {
        issues.push(FieldIssue::invalid(
            field,
            format!("must be at least {}, got {}", min, value),
        ));
        return default;
    }
    if let Some(max) = max {
        if value > max as i64 {
            issues.push(FieldIssue::invalid(
                field,
                format!("must be at most {}, got {}", max, value),
            ));
            return default;
        }
    }

    value as u64
}
