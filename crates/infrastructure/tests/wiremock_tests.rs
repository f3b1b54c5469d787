//! Integration tests for infrastructure crate
//!
//! Tests cover:
//! - Correlated HTTP probe client with wiremock
//! - Peer heartbeats and the telemetry upstream
//! - The chaos harness driven over real HTTP
//! - Retry delay properties

use std::sync::Arc;
use std::time::Duration;

use application::{ChaosConfig, ChaosOrchestrator, DependencyPort, HttpProbePort};
use domain::InstanceId;
use serde_json::json;
use wiremock::matchers::{body_json, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use infrastructure::{
    CorrelatedClientConfig, CorrelatedConnector, CorrelatedHttpClient, MetricsRegistry,
    PeerHeartbeatClient, RetryConfig, TelemetryCache, TelemetryUpstreamAdapter,
    TelemetryUpstreamConfig, X_REQUEST_ID,
};

// ============================================================================
// Correlated HTTP Client Tests
// ============================================================================

mod correlated_client_tests {
    use super::*;

    #[tokio::test]
    async fn get_decodes_json_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "system": {"status": "HEALTHY"}
            })))
            .mount(&mock_server)
            .await;

        let client = CorrelatedHttpClient::new().unwrap();
        let response = client
            .get(&format!("{}/health", mock_server.uri()))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body["system"]["status"], "HEALTHY");
    }

    #[tokio::test]
    async fn every_request_carries_correlation_id() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/leader"))
            .and(header_exists(X_REQUEST_ID))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"instance_id": "a"})))
            .expect(2)
            .mount(&mock_server)
            .await;

        let client = CorrelatedHttpClient::new().unwrap();
        let url = format!("{}/leader", mock_server.uri());
        client.get(&url).await.unwrap();
        client.get(&url).await.unwrap();
    }

    #[tokio::test]
    async fn post_sends_json_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chaos/faults/network_latency"))
            .and(body_json(json!({"duration_secs": 5})))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({"engaged": true})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = CorrelatedHttpClient::new().unwrap();
        let response = client
            .post(
                &format!("{}/chaos/faults/network_latency", mock_server.uri()),
                Some(json!({"duration_secs": 5})),
            )
            .await
            .unwrap();
        assert!(response.is_success());
    }

    #[tokio::test]
    async fn delete_and_text_bodies() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/chaos/faults/redis_failure"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/metrics/prometheus"))
            .respond_with(ResponseTemplate::new(200).set_body_string("chaos_active 0\n"))
            .mount(&mock_server)
            .await;

        let client = CorrelatedHttpClient::new().unwrap();
        let deleted = client
            .delete(&format!("{}/chaos/faults/redis_failure", mock_server.uri()))
            .await
            .unwrap();
        assert_eq!(deleted.status, 204);
        assert!(deleted.body.is_null());

        let text = client
            .get(&format!("{}/metrics/prometheus", mock_server.uri()))
            .await
            .unwrap();
        assert_eq!(text.body, json!("chaos_active 0\n"));
    }

    #[tokio::test]
    async fn error_status_is_preserved_not_raised() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/leader"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "no leader"})))
            .mount(&mock_server)
            .await;

        let client = CorrelatedHttpClient::new().unwrap();
        let response = client
            .get(&format!("{}/leader", mock_server.uri()))
            .await
            .unwrap();
        assert_eq!(response.status, 404);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn request_timeout_is_transport_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&mock_server)
            .await;

        let client = CorrelatedHttpClient::with_config(
            CorrelatedClientConfig::default().with_timeout(Duration::from_millis(200)),
        )
        .unwrap();
        let err = client.get(&mock_server.uri()).await.unwrap_err();
        assert!(err.is_retryable());
    }
}

// ============================================================================
// Cluster and dependency adapters
// ============================================================================

mod adapter_tests {
    use super::*;

    #[tokio::test]
    async fn peer_heartbeat_announces_to_every_peer() {
        let peer_a = MockServer::start().await;
        let peer_b = MockServer::start().await;

        for peer in [&peer_a, &peer_b] {
            Mock::given(method("POST"))
                .and(path("/cluster/heartbeat"))
                .and(body_json(json!({"instance_id": "astra-1"})))
                .respond_with(ResponseTemplate::new(200))
                .expect(1)
                .mount(peer)
                .await;
        }

        let client: Arc<dyn HttpProbePort> = Arc::new(CorrelatedHttpClient::new().unwrap());
        let heartbeat = PeerHeartbeatClient::new(
            client,
            InstanceId::parse("astra-1").unwrap(),
            vec![format!("{}/", peer_a.uri()), peer_b.uri(), String::new()],
        );
        assert_eq!(heartbeat.peers().len(), 2);
        assert_eq!(heartbeat.announce().await, 2);
    }

    #[tokio::test]
    async fn unreachable_peer_is_not_counted() {
        let client: Arc<dyn HttpProbePort> = Arc::new(
            CorrelatedHttpClient::with_config(
                CorrelatedClientConfig::default().with_connect_timeout(Duration::from_millis(200)),
            )
            .unwrap(),
        );
        let heartbeat = PeerHeartbeatClient::new(
            client,
            InstanceId::parse("astra-1").unwrap(),
            vec!["http://127.0.0.1:1".to_string()],
        );
        assert_eq!(heartbeat.announce().await, 0);
    }

    #[tokio::test]
    async fn upstream_frames_land_in_cache() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/frames/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_string("frame-42"))
            .mount(&upstream)
            .await;

        let cache = Arc::new(TelemetryCache::default());
        let adapter = TelemetryUpstreamAdapter::new(
            TelemetryUpstreamConfig {
                url: Some(format!("{}/frames/latest", upstream.uri())),
                timeout: Duration::from_secs(2),
            },
            Arc::clone(&cache),
        )
        .unwrap();

        adapter.check().await.unwrap();
        assert_eq!(cache.get("telemetry:latest").await, Some(b"frame-42".to_vec()));
    }

    #[tokio::test]
    async fn upstream_error_status_fails_check() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&upstream)
            .await;

        let adapter = TelemetryUpstreamAdapter::new(
            TelemetryUpstreamConfig {
                url: Some(upstream.uri()),
                timeout: Duration::from_secs(2),
            },
            Arc::new(TelemetryCache::default()),
        )
        .unwrap();
        assert!(adapter.check().await.is_err());
    }
}

// ============================================================================
// Chaos harness over HTTP
// ============================================================================

mod chaos_harness_tests {
    use super::*;

    fn harness(base_url: String, metrics: Arc<MetricsRegistry>) -> ChaosOrchestrator {
        ChaosOrchestrator::new(
            ChaosConfig {
                base_url,
                poll_interval: Duration::from_millis(20),
                recovery_timeout: Duration::from_secs(2),
                default_duration_secs: 1,
            },
            Arc::new(CorrelatedConnector::default()),
            metrics,
        )
    }

    #[tokio::test]
    async fn cluster_consensus_over_http() {
        let service = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/leader"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"instance_id": "astra-1"})))
            .mount(&service)
            .await;
        Mock::given(method("GET"))
            .and(path("/consensus"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "quorum_met": true,
                "voting_instances": 3,
                "known_instances": 3,
                "leader_id": "astra-1"
            })))
            .mount(&service)
            .await;

        let chaos = harness(service.uri(), Arc::new(MetricsRegistry::new()));
        chaos.startup().await.unwrap();
        assert!(chaos.test_cluster_consensus().await);
        chaos.shutdown().await;
    }

    #[tokio::test]
    async fn unknown_fault_name_sends_nothing() {
        let service = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&service)
            .await;

        let metrics = Arc::new(MetricsRegistry::new());
        let chaos = harness(service.uri(), Arc::clone(&metrics));
        chaos.startup().await.unwrap();
        assert!(!chaos.inject_faults_named("disk_full", 1).await);
        chaos.shutdown().await;
        assert!(!metrics.chaos_active());
    }

    #[tokio::test]
    async fn redis_injection_engages_and_withdraws() {
        let service = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chaos/faults/redis_failure"))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({"engaged": true})))
            .expect(1)
            .mount(&service)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/chaos/faults/redis_failure"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"withdrawn": true})))
            .expect(1)
            .mount(&service)
            .await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "system": {"status": "HEALTHY"},
                "circuit_breaker": {"state": "CLOSED"},
                "retry": {"state": "NORMAL"},
                "recovery": {"action_count": 0, "actions": []},
                "consensus": {"quorum_met": true, "voting_instances": 1, "known_instances": 1}
            })))
            .mount(&service)
            .await;

        let metrics = Arc::new(MetricsRegistry::new());
        let chaos = harness(service.uri(), Arc::clone(&metrics));
        chaos.startup().await.unwrap();
        assert!(chaos.inject_redis_failure(1).await);
        chaos.shutdown().await;

        assert_eq!(metrics.injection_count(domain::FaultType::RedisFailure), 1);
        assert!(!metrics.chaos_active());
    }
}

// ============================================================================
// Retry properties
// ============================================================================

mod retry_property_tests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn delay_never_exceeds_max(
            initial in 1u64..1000,
            max in 1000u64..20_000,
            failures in 0u32..64,
        ) {
            let config = RetryConfig::new(initial, max, 2.0, 3).without_jitter();
            prop_assert!(config.delay_for_attempt(failures) <= Duration::from_millis(max));
        }

        #[test]
        fn delay_is_monotonic_without_jitter(failures in 0u32..30) {
            let config = RetryConfig::default().without_jitter();
            prop_assert!(config.delay_for_attempt(failures) <= config.delay_for_attempt(failures + 1));
        }
    }
}
