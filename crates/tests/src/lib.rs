//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 对进程内模拟收集端的真实 HTTP 投递测试
//! - 配置加载 -> 注册表 -> 驱动的完整链路

#[cfg(test)]
mod collector;

#[cfg(test)]
mod contract_tests {
    use contracts::{ConfigVersion, ContractError, PipelineBlueprint, SinkResult};

    #[test]
    fn test_blueprint_defaults_to_v1() {
        let blueprint: PipelineBlueprint = serde_json::from_str(r#"{"sinks":[]}"#).unwrap();
        assert_eq!(blueprint.version, ConfigVersion::V1);
        assert!(blueprint.sinks.is_empty());
    }

    #[test]
    fn test_failure_keeps_cause() {
        let result = SinkResult::fail(ContractError::Other("boom".into()));
        assert!(!result.is_success());
        assert_eq!(result.into_result().unwrap_err().to_string(), "boom");
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::io::{self, Read};
    use std::sync::Arc;

    use base64::{engine::general_purpose::STANDARD, Engine};
    use bytes::Bytes;
    use flate2::read::GzDecoder;

    use contracts::{
        Batch, BatchSink, CompressionErrorPolicy, ContractError, Event, LifecycleState,
        SinkConfig, SinkContext, SinkResult, SinkType,
    };
    use http_sink::{GzipBase64HttpSink, HttpSink, JsonCodec, JsonHttpSink, RawJsonCodec, WireTransform};

    use crate::collector::{refused_url, MockCollector};

    fn running<T: WireTransform>(mut sink: HttpSink<T>) -> HttpSink<T> {
        let name = sink.config().name.clone();
        sink.init(&SinkContext::new(name)).unwrap();
        sink.start().unwrap();
        sink
    }

    fn plain(addr: String) -> JsonHttpSink {
        let config = SinkConfig::new("plain", SinkType::HttpJson, addr);
        running(JsonHttpSink::json(config).with_codec(Arc::new(RawJsonCodec)))
    }

    fn packed(addr: String) -> GzipBase64HttpSink {
        let config = SinkConfig::new("packed", SinkType::HttpGzipBase64, addr);
        running(GzipBase64HttpSink::gzip_base64(config).with_codec(Arc::new(RawJsonCodec)))
    }

    fn batch_of(bodies: &[&'static str]) -> Batch {
        bodies.iter().map(|b| Event::new(*b)).collect()
    }

    fn gunzip_base64(body: &[u8]) -> Vec<u8> {
        let compressed = STANDARD.decode(body).unwrap();
        let mut out = Vec::new();
        GzDecoder::new(&compressed[..]).read_to_end(&mut out).unwrap();
        out
    }

    #[tokio::test]
    async fn test_three_events_plain_json() {
        let collector = MockCollector::start(200).await.unwrap();
        let sink = plain(collector.url("/ingest"));

        let result = sink
            .consume(&batch_of(&[r#"{"id":1}"#, r#"{"id":2}"#, r#"{"id":3}"#]))
            .await
            .unwrap();
        assert!(result.is_success(), "got: {:?}", result.error());

        let requests = collector.requests();
        assert_eq!(requests.len(), 1);
        let req = &requests[0];
        assert_eq!(req.method, "POST");
        assert_eq!(req.path, "/ingest");
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.body, br#"[{"id":1},{"id":2},{"id":3}]"#);
    }

    #[tokio::test]
    async fn test_empty_batch_sends_nothing() {
        let collector = MockCollector::start(200).await.unwrap();
        let json = plain(collector.url("/ingest"));
        let gzip = packed(collector.url("/ingest"));

        assert!(json.consume(&Batch::default()).await.is_none());
        assert!(gzip.consume(&Batch::default()).await.is_none());

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(collector.requests().is_empty());
    }

    #[tokio::test]
    async fn test_partial_encode_failure_single_request() {
        let collector = MockCollector::start(200).await.unwrap();
        let sink = plain(collector.url("/ingest"));

        let batch = batch_of(&[r#"{"a":1}"#, "garbage", r#"{"b":2}"#, "{", r#"{"c":3}"#]);
        let result = sink.consume(&batch).await.unwrap();
        assert!(result.is_success());

        let requests = collector.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].body, br#"[{"a":1},{"b":2},{"c":3}]"#);
    }

    #[tokio::test]
    async fn test_compressed_payload_reverses_to_plain() {
        let collector = MockCollector::start(200).await.unwrap();
        let json = plain(collector.url("/plain"));
        let gzip = packed(collector.url("/packed"));
        let batch = batch_of(&[r#"{"a":1}"#, r#"{"b":2}"#]);

        assert!(json.consume(&batch).await.unwrap().is_success());
        assert!(gzip.consume(&batch).await.unwrap().is_success());

        let requests = collector.requests();
        let plain_req = requests.iter().find(|r| r.path == "/plain").unwrap();
        let packed_req = requests.iter().find(|r| r.path == "/packed").unwrap();

        assert_eq!(plain_req.body, br#"[{"a":1},{"b":2}]"#);
        assert_eq!(packed_req.header("content-type"), Some("text/plain"));
        assert!(packed_req.body.is_ascii());
        assert_eq!(gunzip_base64(&packed_req.body), plain_req.body);
    }

    #[tokio::test]
    async fn test_all_events_fail_still_sends_empty_array() {
        let collector = MockCollector::start(200).await.unwrap();
        let json = plain(collector.url("/plain"));
        let gzip = packed(collector.url("/packed"));
        let batch = batch_of(&["x", "y"]);

        assert!(json.consume(&batch).await.unwrap().is_success());
        assert!(gzip.consume(&batch).await.unwrap().is_success());

        let requests = collector.requests();
        assert_eq!(requests.len(), 2);
        let plain_req = requests.iter().find(|r| r.path == "/plain").unwrap();
        let packed_req = requests.iter().find(|r| r.path == "/packed").unwrap();
        assert_eq!(plain_req.body, b"[]");
        assert_eq!(gunzip_base64(&packed_req.body), b"[]");
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_failure() {
        let sink = plain(refused_url().await.unwrap());

        let result = sink.consume(&batch_of(&[r#"{"id":1}"#])).await.unwrap();
        let err = result.error().expect("refused connection must fail");
        assert!(err.is_transport(), "got: {err:?}");
        assert!(!err.to_string().is_empty());
    }

    #[tokio::test]
    async fn test_server_error_counts_as_success() {
        let collector = MockCollector::start(500).await.unwrap();
        let sink = plain(collector.url("/ingest"));

        let result = sink.consume(&batch_of(&[r#"{"id":1}"#])).await.unwrap();
        assert!(result.is_success());
        assert_eq!(collector.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_strict_status_rejects_server_error() {
        let collector = MockCollector::start(500).await.unwrap();
        let mut config = SinkConfig::new("strict", SinkType::HttpJson, collector.url("/ingest"));
        config.strict_status = true;
        let sink = running(JsonHttpSink::json(config).with_codec(Arc::new(RawJsonCodec)));

        let result = sink.consume(&batch_of(&[r#"{"id":1}"#])).await.unwrap();
        assert!(matches!(
            result.error(),
            Some(ContractError::RemoteStatus { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_timeout_on_hung_collector() {
        let collector = MockCollector::hanging().await.unwrap();
        let mut config = SinkConfig::new("slow", SinkType::HttpJson, collector.url("/ingest"));
        config.timeout_ms = Some(200);
        let sink = running(JsonHttpSink::json(config).with_codec(Arc::new(RawJsonCodec)));

        let result = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            sink.consume(&batch_of(&[r#"{"id":1}"#])),
        )
        .await
        .expect("sink timeout must fire first")
        .unwrap();

        let err = result.error().expect("hung collector must fail");
        assert!(err.is_transport(), "got: {err:?}");
    }

    #[tokio::test]
    async fn test_extra_headers_forwarded() {
        let collector = MockCollector::start(200).await.unwrap();
        let mut config = SinkConfig::new("auth", SinkType::HttpJson, collector.url("/ingest"));
        config.headers.insert("x-api-key".into(), "secret".into());
        let sink = running(JsonHttpSink::json(config));

        let result = sink.consume(&batch_of(&["hello"])).await.unwrap();
        assert!(result.is_success());

        let requests = collector.requests();
        assert_eq!(requests[0].header("x-api-key"), Some("secret"));
        assert_eq!(requests[0].header("content-type"), Some("application/json"));
    }

    #[tokio::test]
    async fn test_json_codec_wraps_header_and_body() {
        let collector = MockCollector::start(200).await.unwrap();
        let config = SinkConfig::new("wrapped", SinkType::HttpJson, collector.url("/ingest"));
        let sink = running(JsonHttpSink::json(config).with_codec(Arc::new(JsonCodec::new())));

        let batch = Batch::new(vec![Event::new("hello").with_header("host", "edge-01")]);
        assert!(sink.consume(&batch).await.unwrap().is_success());

        let body: serde_json::Value =
            serde_json::from_slice(&collector.requests()[0].body).unwrap();
        assert_eq!(
            body,
            serde_json::json!([{ "host": "edge-01", "body": "hello" }])
        );
    }

    /// Gzip variant whose compression step always fails
    struct FailingCompression;

    impl WireTransform for FailingCompression {
        const SINK_TYPE: SinkType = SinkType::HttpGzipBase64;

        fn content_type(&self) -> &'static str {
            "text/plain"
        }

        fn apply(&self, _array: Bytes) -> io::Result<Bytes> {
            Err(io::Error::other("deflate failed"))
        }
    }

    #[tokio::test]
    async fn test_send_empty_policy_posts_empty_body() {
        let collector = MockCollector::start(200).await.unwrap();
        let mut config = SinkConfig::new("degraded", SinkType::HttpGzipBase64, collector.url("/ingest"));
        config.on_compression_error = CompressionErrorPolicy::SendEmpty;
        let sink = running(HttpSink::new(config, FailingCompression).with_codec(Arc::new(RawJsonCodec)));

        let result = sink.consume(&batch_of(&[r#"{"id":1}"#])).await.unwrap();
        assert!(result.is_success(), "got: {:?}", result.error());

        let requests = collector.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].header("content-type"), Some("text/plain"));
        assert!(requests[0].body.is_empty());
    }

    #[tokio::test]
    async fn test_overlapping_consume_calls_each_post() {
        let collector = MockCollector::start(200).await.unwrap();
        let sink = plain(collector.url("/ingest"));
        let first = batch_of(&[r#"{"n":1}"#]);
        let second = batch_of(&[r#"{"n":2}"#]);

        let (a, b) = tokio::join!(sink.consume(&first), sink.consume(&second));
        assert!(a.unwrap().is_success());
        assert!(b.unwrap().is_success());

        let mut bodies: Vec<Vec<u8>> = collector.requests().into_iter().map(|r| r.body).collect();
        bodies.sort();
        assert_eq!(bodies, vec![br#"[{"n":1}]"#.to_vec(), br#"[{"n":2}]"#.to_vec()]);
    }

    #[tokio::test]
    async fn test_consume_after_stop_is_rejected() {
        let collector = MockCollector::start(200).await.unwrap();
        let mut sink = plain(collector.url("/ingest"));
        sink.stop();
        assert_eq!(sink.state(), LifecycleState::Stopped);

        let result = sink.consume(&batch_of(&[r#"{"id":1}"#])).await.unwrap();
        assert!(matches!(result, SinkResult::Failure(ContractError::InvalidState { .. })));
        assert!(collector.requests().is_empty());
    }
}

#[cfg(test)]
mod pipeline_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{Batch, Event, SinkType};
    use http_sink::{RawJsonCodec, SinkRegistry};
    use std::sync::Arc;

    use crate::collector::{refused_url, MockCollector};

    /// TOML config -> registry -> SinkHandle -> collector
    #[tokio::test]
    async fn test_config_to_collector_with_aliases() {
        let collector = MockCollector::start(200).await.unwrap();
        let toml = format!(
            r#"
[[sinks]]
name = "legacy-plain"
sink_type = "mgnbury"
addr = "{}"

[[sinks]]
name = "legacy-packed"
sink_type = "smbury"
addr = "{}"
timeout_ms = 2000
"#,
            collector.url("/plain"),
            collector.url("/packed"),
        );

        let blueprint = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();
        assert_eq!(blueprint.sinks[0].sink_type, SinkType::HttpJson);
        assert_eq!(blueprint.sinks[1].sink_type, SinkType::HttpGzipBase64);

        let registry = SinkRegistry::with_builtin().with_codec(Arc::new(RawJsonCodec));
        let handles: Vec<_> = blueprint
            .sinks
            .iter()
            .map(|config| registry.spawn(config).unwrap())
            .collect();

        let batch = Batch::new(vec![Event::new(r#"{"n":1}"#), Event::new(r#"{"n":2}"#)]);
        for handle in &handles {
            assert!(handle.send(batch.clone()).await);
            assert!(handle.send(Batch::default()).await);
        }

        for handle in handles {
            let summary = handle.shutdown().await;
            assert_eq!(summary.delivered, 1);
            assert_eq!(summary.skipped, 1);
            assert_eq!(summary.failed, 0);
        }

        let requests = collector.requests();
        assert_eq!(requests.len(), 2);
        let plain = requests.iter().find(|r| r.path == "/plain").unwrap();
        let packed = requests.iter().find(|r| r.path == "/packed").unwrap();
        assert_eq!(plain.header("content-type"), Some("application/json"));
        assert_eq!(packed.header("content-type"), Some("text/plain"));
    }

    #[tokio::test]
    async fn test_failing_sink_does_not_affect_other() {
        let collector = MockCollector::start(200).await.unwrap();
        let toml = format!(
            r#"
[[sinks]]
name = "good"
sink_type = "http_json"
addr = "{}"

[[sinks]]
name = "down"
sink_type = "http_json"
addr = "{}"
"#,
            collector.url("/good"),
            refused_url().await.unwrap(),
        );

        let blueprint = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();
        let registry = SinkRegistry::with_builtin().with_codec(Arc::new(RawJsonCodec));

        let good = registry.spawn(&blueprint.sinks[0]).unwrap();
        let down = registry.spawn(&blueprint.sinks[1]).unwrap();

        for i in 0..3 {
            let batch = Batch::new(vec![Event::new(format!(r#"{{"seq":{i}}}"#))]);
            assert!(good.send(batch.clone()).await);
            assert!(down.send(batch).await);
        }

        let good_summary = good.shutdown().await;
        let down_summary = down.shutdown().await;
        assert_eq!(good_summary.delivered, 3);
        assert_eq!(down_summary.failed, 3);
        assert_eq!(collector.requests().len(), 3);
    }

    #[test]
    fn test_registry_rejects_unregistered_type() {
        let blueprint = ConfigLoader::load_from_str(
            r#"{"sinks":[{"name":"a","sink_type":"http_json","addr":"http://127.0.0.1:1/"}]}"#,
            ConfigFormat::Json,
        )
        .unwrap();

        let registry = SinkRegistry::new();
        assert!(registry.create(&blueprint.sinks[0]).is_err());
    }
}
