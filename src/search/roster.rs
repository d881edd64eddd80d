//! Speaker roster and selector resolution / 主要角色名单与说话人筛选
//!
//! The roster is a closed list fixed at build time. Membership is an exact
//! string comparison: no Unicode normalization, no whitespace folding.

use std::collections::HashSet;

/// Main cast, verbatim / 主要角色（原样保留）
///
/// `乃木 園子` appears twice and `山伏 しずく` / `山伏 シズク` are distinct
/// characters; neither is folded.
pub const MAIN_CHARACTERS: &[&str] = &[
    "結城 友奈",
    "東郷 美森",
    "犬吠埼 風",
    "犬吠埼 樹",
    "三好 夏凜",
    "鷲尾 須美",
    "三ノ輪 銀",
    "乃木 園子",
    "乃木 若葉",
    "土居 球子",
    "伊予島 杏",
    "郡 千景",
    "高嶋 友奈",
    "白鳥 歌野",
    "乃木 園子",
    "秋原 雪花",
    "古波蔵 棗",
    "上里 ひなた",
    "藤森 水都",
    "赤嶺 友奈",
    "国土 亜耶",
    "楠 芽吹",
    "加賀城 雀",
    "弥勒 夕海子",
    "山伏 しずく",
    "山伏 シズク",
    "弥勒 蓮華",
    "桐生 静",
    "安芸真鈴",
    "花本 美佳",
    "芙蓉 友奈",
    "柚木 友奈",
];

/// Wire token for "every speaker"
pub const ALL_TOKEN: &str = "__all__";
/// Wire token for "not a main character"
pub const OTHER_TOKEN: &str = "__other__";

/// Ordered main-character roster / 角色名单
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeakerRoster {
    names: &'static [&'static str],
}

impl SpeakerRoster {
    pub const fn new(names: &'static [&'static str]) -> Self {
        Self { names }
    }

    /// The built-in roster / 内置名单
    pub const fn main_cast() -> Self {
        Self::new(MAIN_CHARACTERS)
    }

    pub fn contains(&self, speaker: &str) -> bool {
        self.names.iter().any(|name| *name == speaker)
    }

    /// Every entry in authored order, duplicates included
    pub fn names(&self) -> &'static [&'static str] {
        self.names
    }
}

impl Default for SpeakerRoster {
    fn default() -> Self {
        Self::main_cast()
    }
}

/// Parsed speaker selector / 说话人选择器
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SpeakerSelector {
    #[default]
    All,
    Other,
    Named(String),
}

impl SpeakerSelector {
    /// Map a raw parameter onto a selector without checking the name exists.
    pub fn from_param(raw: &str) -> Self {
        match raw {
            ALL_TOKEN => Self::All,
            OTHER_TOKEN => Self::Other,
            name => Self::Named(name.to_string()),
        }
    }

    /// Resolve into a speaker predicate / 解析为筛选谓词
    pub fn resolve(&self, roster: SpeakerRoster) -> SpeakerFilter {
        match self {
            Self::All => SpeakerFilter::Any,
            Self::Other => SpeakerFilter::NotIn(roster),
            Self::Named(name) => SpeakerFilter::Exact(name.clone()),
        }
    }
}

/// Speaker predicate a store can evaluate / 说话人谓词
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeakerFilter {
    Any,
    Exact(String),
    NotIn(SpeakerRoster),
}

impl SpeakerFilter {
    pub fn accepts(&self, speaker: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(name) => name == speaker,
            Self::NotIn(roster) => !roster.contains(speaker),
        }
    }
}

/// Names a selector may refer to: roster plus corpus speakers / 可选说话人全集
#[derive(Debug, Clone, Default)]
pub struct SpeakerUniverse {
    roster: SpeakerRoster,
    corpus: HashSet<String>,
}

impl SpeakerUniverse {
    pub fn new<I, S>(roster: SpeakerRoster, corpus_speakers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            roster,
            corpus: corpus_speakers.into_iter().map(Into::into).collect(),
        }
    }

    pub fn roster(&self) -> SpeakerRoster {
        self.roster
    }

    pub fn contains(&self, speaker: &str) -> bool {
        self.roster.contains(speaker) || self.corpus.contains(speaker)
    }

    /// Count of distinct known names
    pub fn len(&self) -> usize {
        let mut names: HashSet<&str> = self.corpus.iter().map(String::as_str).collect();
        names.extend(self.roster.names().iter().copied());
        names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_keeps_every_entry() {
        let roster = SpeakerRoster::main_cast();
        assert_eq!(roster.names().len(), 32);
        let sonoko = roster.names().iter().filter(|n| **n == "乃木 園子").count();
        assert_eq!(sonoko, 2);
        assert!(roster.contains("山伏 しずく"));
        assert!(roster.contains("山伏 シズク"));
    }

    #[test]
    fn test_roster_exact_match_only() {
        let roster = SpeakerRoster::main_cast();
        assert!(roster.contains("結城 友奈"));
        assert!(!roster.contains("結城友奈"));
        assert!(!roster.contains("結城　友奈"));
        assert!(!roster.contains(" 結城 友奈"));
        // written without a space in the roster
        assert!(roster.contains("安芸真鈴"));
        assert!(!roster.contains("安芸 真鈴"));
    }

    #[test]
    fn test_selector_from_param() {
        assert_eq!(SpeakerSelector::from_param("__all__"), SpeakerSelector::All);
        assert_eq!(SpeakerSelector::from_param("__other__"), SpeakerSelector::Other);
        assert_eq!(
            SpeakerSelector::from_param("東郷 美森"),
            SpeakerSelector::Named("東郷 美森".to_string())
        );
    }

    #[test]
    fn test_other_never_accepts_roster_name() {
        let roster = SpeakerRoster::main_cast();
        let filter = SpeakerSelector::Other.resolve(roster);
        for name in roster.names() {
            assert!(!filter.accepts(name), "{} classified as other", name);
        }
        assert!(filter.accepts(""));
        assert!(filter.accepts("大赦の神官"));
        assert!(filter.accepts("山伏しずく"));
    }

    #[test]
    fn test_named_accepts_exactly_that_name() {
        let roster = SpeakerRoster::main_cast();
        for name in roster.names() {
            let filter = SpeakerSelector::Named(name.to_string()).resolve(roster);
            assert!(filter.accepts(name));
            for other in roster.names().iter().filter(|n| *n != name) {
                assert!(!filter.accepts(other));
            }
        }
    }

    #[test]
    fn test_all_accepts_everything() {
        let filter = SpeakerSelector::All.resolve(SpeakerRoster::main_cast());
        assert!(filter.accepts(""));
        assert!(filter.accepts("結城 友奈"));
        assert!(filter.accepts("anyone"));
    }

    #[test]
    fn test_universe_membership() {
        let universe = SpeakerUniverse::new(SpeakerRoster::main_cast(), ["A", "B", "結城 友奈"]);
        assert!(universe.contains("A"));
        assert!(universe.contains("乃木 若葉"));
        assert!(!universe.contains("Nonexistent Person"));
        // 31 distinct roster names plus A and B
        assert_eq!(universe.len(), 33);
    }
}
