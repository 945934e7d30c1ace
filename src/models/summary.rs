//! 指标汇总
//!
//! 把一次抓取结果折算成导出用的计数器

use std::collections::BTreeMap;

use super::ScoreRecord;

/// 按类型和类别统计的条目数量
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSummary {
    pub score: f32,
    pub entry_count: u64,
    pub types: BTreeMap<String, u64>,
    pub categories: BTreeMap<String, u64>,
}

impl ScoreSummary {
    pub fn from_record(record: &ScoreRecord) -> Self {
        let mut types = BTreeMap::new();
        let mut categories = BTreeMap::new();

        for entry in &record.datalist {
            *types.entry(entry.entry_type.clone()).or_insert(0) += 1;
            *categories.entry(entry.category.clone()).or_insert(0) += 1;
        }

        Self {
            score: record.score,
            entry_count: record.datalist.len() as u64,
            types,
            categories,
        }
    }
}
