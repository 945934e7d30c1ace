pub mod score;
pub mod summary;

pub use score::{RecordEntry, ScoreRecord};
pub use summary::ScoreSummary;
