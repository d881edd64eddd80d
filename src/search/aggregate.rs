//! Speaker frequency ranking / 角色出现次数排序

use crate::models::{SpeakerCount, SpeakerGroup};

/// Sort groups by count descending, then by first-seen corpus position.
///
/// Zero-count groups are dropped.
pub fn rank_speaker_counts(mut groups: Vec<SpeakerGroup>) -> Vec<SpeakerCount> {
    groups.retain(|g| g.count > 0);
    groups.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.first_seen.cmp(&b.first_seen))
    });
    groups
        .into_iter()
        .map(|g| SpeakerCount {
            speaker: g.speaker,
            count: g.count,
        })
        .collect()
}
