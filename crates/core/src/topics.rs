use std::collections::BTreeMap;

use crate::scorer::ScoreReport;

/// Accuracy statistics for one instructional area across past sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicStat {
    pub topic: String,
    pub wrong_count: u32,
    pub total_count: u32,
}

impl TopicStat {
    /// Share of questions in this topic answered wrong, in `[0, 1]`.
    #[must_use]
    pub fn wrong_rate(&self) -> f64 {
        if self.total_count == 0 {
            return 0.0;
        }
        f64::from(self.wrong_count) / f64::from(self.total_count)
    }
}

/// Group per-question results from `history` by topic.
///
/// Untagged questions are ignored. The result is ordered by wrong rate
/// (highest first), then by topic name so equal rates have a stable order.
#[must_use]
pub fn aggregate<'a>(history: impl IntoIterator<Item = &'a ScoreReport>) -> Vec<TopicStat> {
    let mut by_topic: BTreeMap<&str, (u32, u32)> = BTreeMap::new();

    for report in history {
        for result in &report.per_question {
            let Some(topic) = result.topic.as_deref() else {
                continue;
            };
            let entry = by_topic.entry(topic).or_default();
            if !result.is_correct {
                entry.0 = entry.0.saturating_add(1);
            }
            entry.1 = entry.1.saturating_add(1);
        }
    }

    let mut stats: Vec<TopicStat> = by_topic
        .into_iter()
        .map(|(topic, (wrong_count, total_count))| TopicStat {
            topic: topic.to_owned(),
            wrong_count,
            total_count,
        })
        .collect();

    // Compare cross-multiplied counts to keep the ordering exact.
    stats.sort_by(|a, b| {
        let lhs = u64::from(b.wrong_count) * u64::from(a.total_count);
        let rhs = u64::from(a.wrong_count) * u64::from(b.total_count);
        lhs.cmp(&rhs).then_with(|| a.topic.cmp(&b.topic))
    });
    stats
}
