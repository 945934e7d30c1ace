use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use schufa_score_exporter::config::{InfluxConfig, Secret};
use schufa_score_exporter::error::{ExportError, SmsError};
use schufa_score_exporter::services::sms::httpsms::MESSAGE_SUFFIX;
use schufa_score_exporter::services::{
    build_code_source, CodeSource, HttpSmsCodeSource, InfluxSink, MetricsSink,
};
use schufa_score_exporter::utils::logging;
use schufa_score_exporter::{fetch_score, Config, ScoreSummary};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
#[ignore] // 默认忽略，需要真实账号和浏览器：cargo test -- --ignored
async fn test_fetch_score_live() {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::from_env().expect("缺少环境变量");
    let code_source = build_code_source(&config.sms_provider);

    let record = fetch_score(&config, code_source)
        .await
        .expect("抓取失败");

    println!("分数: {}，记录 {} 条", record.score, record.datalist.len());
    assert!(record.score >= 0.0);
}

#[test]
fn test_config_from_dotenv_file() {
    let path = std::env::temp_dir().join(format!("schufa-exporter-{}.env", std::process::id()));
    std::fs::write(
        &path,
        "# 本地配置\n\
         MEINESCHUFA_USERNAME=user@example.org\n\
         MEINESCHUFA_PASSWORD=\"pa ss\"\n\
         SMS_PROVIDER=webhook\n\
         EXPORT_INTERVAL_SECS=600\n",
    )
    .unwrap();

    let vars: HashMap<String, String> = dotenvy::from_path_iter(&path)
        .unwrap()
        .map(|item| item.unwrap())
        .collect();
    std::fs::remove_file(&path).unwrap();

    let config = Config::from_lookup(|key: &str| vars.get(key).cloned()).unwrap();

    assert_eq!(config.credentials.username, "user@example.org");
    assert_eq!(config.credentials.password.expose(), "pa ss");
    assert_eq!(config.interval, Duration::from_secs(600));
}

#[tokio::test]
async fn test_httpsms_returns_code_from_latest_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/messages"))
        .and(query_param("owner", "+4915100000000"))
        .and(query_param("contact", "Schufa"))
        .and(query_param("limit", "1"))
        .and(header("X-API-KEY", "secret-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": "msg-1",
                "owner": "+4915100000000",
                "contact": "Schufa",
                "content": format!("731904{}", MESSAGE_SUFFIX),
                "status": "received"
            }],
            "message": "fetched 1 message",
            "status": "success"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let source = HttpSmsCodeSource::new(&server.uri(), "+4915100000000", "secret-key");

    assert_eq!(source.latest_code().await.unwrap(), "731904");
}

#[tokio::test]
async fn test_httpsms_polls_until_attempts_exhausted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [],
            "message": "fetched 0 messages",
            "status": "success"
        })))
        .expect(3)
        .mount(&server)
        .await;

    let source = HttpSmsCodeSource::new(&server.uri(), "+49", "k")
        .with_polling(3, Duration::from_millis(10));

    let err = source.latest_code().await.unwrap_err();
    assert!(matches!(err, SmsError::NoMessage { attempts: 3 }));
}

#[tokio::test]
async fn test_httpsms_bad_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let source: Arc<dyn CodeSource> =
        Arc::new(HttpSmsCodeSource::new(&server.uri(), "+49", "wrong"));

    let err = source.latest_code().await.unwrap_err();
    assert!(matches!(err, SmsError::BadStatus { status: 401, .. }));
}

fn influx_config(url: String) -> InfluxConfig {
    InfluxConfig {
        url,
        token: Secret::new("influx-token"),
        org: "home".to_string(),
        bucket: "schufa".to_string(),
    }
}

fn summary() -> ScoreSummary {
    ScoreSummary {
        score: 301.0,
        entry_count: 2,
        types: BTreeMap::from([
            ("Negativmerkmal".to_string(), 1),
            ("Positivmerkmal".to_string(), 1),
        ]),
        categories: BTreeMap::from([
            ("Bank".to_string(), 1),
            ("Meldedaten".to_string(), 1),
        ]),
    }
}

#[tokio::test]
async fn test_influx_sink_writes_line_protocol() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/write"))
        .and(query_param("org", "home"))
        .and(query_param("bucket", "schufa"))
        .and(query_param("precision", "s"))
        .and(header("Authorization", "Token influx-token"))
        .and(body_string_contains("score value=301,data=2i"))
        .and(body_string_contains("categories,type=Meldedaten value=1i"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let sink = InfluxSink::new(&influx_config(server.uri()));

    sink.publish(&summary()).await.unwrap();
}

#[tokio::test]
async fn test_influx_sink_reports_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/write"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized access"))
        .mount(&server)
        .await;

    let sink = InfluxSink::new(&influx_config(server.uri()));

    let err = sink.publish(&summary()).await.unwrap_err();
    match err {
        ExportError::Rejected { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "unauthorized access");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}
