use serde::{Deserialize, Serialize};

/// 看板上一张卡片对应的记录条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RecordEntry {
    pub name: String,
    /// 名称下方的小标签
    pub category: String,
    #[serde(rename = "type")]
    pub entry_type: String,
    /// 可选字段，页面上缺失时为空字符串
    #[serde(default)]
    pub details: String,
    /// 站点原始格式（例如 01.01.2024），不做日期解析
    pub date: String,
}

/// 一次抓取的最终结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub score: f32,
    pub datalist: Vec<RecordEntry>,
}

impl ScoreRecord {
    pub fn new(score: f32) -> Self {
        Self {
            score,
            datalist: Vec::new(),
        }
    }
}
