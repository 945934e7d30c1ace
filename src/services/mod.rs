pub mod metrics_sink;
pub mod record_extractor;
pub mod sms;

pub use metrics_sink::{build_metrics_sink, InfluxSink, LogSink, MetricsSink};
pub use record_extractor::RecordExtractor;
pub use sms::{build_code_source, CodeSource, HttpSmsCodeSource, WebhookCodeSource};
