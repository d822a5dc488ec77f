
use panel_core::{ConfigAggregator, FailurePolicy, MemoryStore, PanelError, StaticKeyIssuer};
use panel_types::MappingRecord;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use test_helpers::{mock_camera, room_with_groups, SlowKeys, SlowRooms};
use tokio::time::{sleep, Duration, Instant};

/// 创建带一条映射和一个房间的存储
async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store
        .insert_mapping("TEC-ITB-1101", MappingRecord::new("ITB-1101", "Main"))
        .await;
    store
        .insert_room(
            "ITB-1101",
            room_with_groups(&[("Main", vec![mock_camera("mock cam")]), ("Empty", vec![])]),
        )
        .await;
    store
}

async fn keys_for_main() -> Arc<StaticKeyIssuer> {
    let keys = Arc::new(StaticKeyIssuer::new());
    keys.insert_key("ITB-1101", "Main", "key-1101").await;
    keys
}

fn aggregator(
    store: &Arc<MemoryStore>,
    keys: &Arc<StaticKeyIssuer>,
    policy: FailurePolicy,
) -> ConfigAggregator {
    ConfigAggregator::new(store.clone(), store.clone(), keys.clone()).with_policy(policy)
}

#[tokio::test]
async fn test_build_config_success() {
    let store = seeded_store().await;
    let keys = keys_for_main().await;

    for policy in [FailurePolicy::Strict, FailurePolicy::BestEffort] {
        let config = aggregator(&store, &keys, policy)
            .build_config("TEC-ITB-1101-NEW")
            .await
            .unwrap();

        assert_eq!(config.cameras, vec![mock_camera("mock cam")]);
        assert_eq!(config.control_key.as_deref(), Some("key-1101"));
    }
}

/// 空主机名在任何后端调用之前被拒绝
#[tokio::test]
async fn test_empty_hostname_rejected() {
    let store = seeded_store().await;
    let keys = keys_for_main().await;

    for hostname in ["", "   "] {
        let err = aggregator(&store, &keys, FailurePolicy::BestEffort)
            .build_config(hostname)
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    assert!(store.mapping_lookups().await.is_empty());
    assert_eq!(store.room_lookups(), 0);
    assert_eq!(keys.calls(), 0);
}

/// 解析失败时不调用摄像头和密钥查询
#[tokio::test]
async fn test_resolver_failure_skips_lookups() {
    let store = seeded_store().await;
    let keys = keys_for_main().await;

    for policy in [FailurePolicy::Strict, FailurePolicy::BestEffort] {
        let err = aggregator(&store, &keys, policy)
            .build_config("UNKNOWN-HOST")
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(matches!(err, PanelError::Mapping { .. }));
    }

    assert_eq!(store.room_lookups(), 0);
    assert_eq!(keys.calls(), 0);
}

/// best-effort：密钥失败仍返回摄像头
#[tokio::test]
async fn test_best_effort_tolerates_key_failure() {
    let store = seeded_store().await;
    let keys = keys_for_main().await;
    keys.fail_with("connection refused").await;

    let config = aggregator(&store, &keys, FailurePolicy::BestEffort)
        .build_config("TEC-ITB-1101")
        .await
        .unwrap();

    assert_eq!(config.cameras.len(), 1);
    assert!(config.control_key.is_none());
    assert_eq!(keys.calls(), 1);
}

/// best-effort：摄像头失败是致命的
#[tokio::test]
async fn test_best_effort_camera_failure_is_fatal() {
    let store = seeded_store().await;
    store.fail_room("ITB-1101", "database unavailable").await;
    let keys = keys_for_main().await;

    let err = aggregator(&store, &keys, FailurePolicy::BestEffort)
        .build_config("TEC-ITB-1101")
        .await
        .unwrap_err();

    assert!(matches!(err, PanelError::RoomConfig { .. }));
    assert!(matches!(err.root(), PanelError::Backend(msg) if msg == "database unavailable"));
    assert_eq!(keys.calls(), 1);
}

/// strict：任一路失败整体失败
#[tokio::test]
async fn test_strict_fails_on_either_branch() {
    let store = seeded_store().await;
    let keys = keys_for_main().await;
    keys.fail_with("connection refused").await;

    let err = aggregator(&store, &keys, FailurePolicy::Strict)
        .build_config("TEC-ITB-1101")
        .await
        .unwrap_err();
    assert!(matches!(err, PanelError::KeyService { .. }));

    let store = seeded_store().await;
    store.fail_room("ITB-1101", "database unavailable").await;
    let keys = keys_for_main().await;

    let err = aggregator(&store, &keys, FailurePolicy::Strict)
        .build_config("TEC-ITB-1101")
        .await
        .unwrap_err();
    assert!(matches!(err, PanelError::RoomConfig { .. }));
}

/// strict：密钥失败取消仍在进行的摄像头查询
#[tokio::test]
async fn test_strict_cancels_sibling() {
    let store = seeded_store().await;
    let rooms = Arc::new(SlowRooms::new(
        Duration::from_millis(500),
        room_with_groups(&[("Main", vec![mock_camera("slow cam")])]),
    ));
    let keys = Arc::new(SlowKeys::new(Duration::from_millis(10), true));

    let aggregator = ConfigAggregator::new(store.clone(), rooms.clone(), keys.clone())
        .with_policy(FailurePolicy::Strict);

    let started = Instant::now();
    let err = aggregator.build_config("TEC-ITB-1101").await.unwrap_err();

    assert!(matches!(err, PanelError::KeyService { .. }));
    assert!(started.elapsed() < Duration::from_millis(400));

    sleep(Duration::from_millis(600)).await;
    assert!(!rooms.completed.load(Ordering::SeqCst));
}

/// strict：摄像头查询先失败时取消进行中的密钥查询
#[tokio::test]
async fn test_strict_camera_failure_cancels_key_lookup() {
    let store = seeded_store().await;
    store.fail_room("ITB-1101", "couchdb unavailable").await;
    let keys = Arc::new(SlowKeys::new(Duration::from_millis(500), false));

    let aggregator = ConfigAggregator::new(store.clone(), store.clone(), keys.clone())
        .with_policy(FailurePolicy::Strict);

    let started = Instant::now();
    let err = aggregator.build_config("TEC-ITB-1101").await.unwrap_err();

    assert!(matches!(err, PanelError::RoomConfig { .. }));
    assert!(started.elapsed() < Duration::from_millis(400));

    sleep(Duration::from_millis(600)).await;
    assert!(!keys.completed.load(Ordering::SeqCst));
}

/// best-effort：两路互不取消
#[tokio::test]
async fn test_best_effort_waits_for_both() {
    let store = seeded_store().await;
    let rooms = Arc::new(SlowRooms::new(
        Duration::from_millis(100),
        room_with_groups(&[("Main", vec![mock_camera("slow cam")])]),
    ));
    let keys = Arc::new(SlowKeys::new(Duration::from_millis(10), true));

    let config = ConfigAggregator::new(store.clone(), rooms.clone(), keys.clone())
        .with_policy(FailurePolicy::BestEffort)
        .build_config("TEC-ITB-1101")
        .await
        .unwrap();

    assert!(rooms.completed.load(Ordering::SeqCst));
    assert!(keys.completed.load(Ordering::SeqCst));
    assert_eq!(config.cameras[0].display_name, "slow cam");
    assert!(config.control_key.is_none());
}

/// 两路查询并发执行
#[tokio::test]
async fn test_lookups_run_concurrently() {
    let store = seeded_store().await;
    let rooms = Arc::new(SlowRooms::new(
        Duration::from_millis(200),
        room_with_groups(&[("Main", vec![])]),
    ));
    let keys = Arc::new(SlowKeys::new(Duration::from_millis(200), false));

    let started = Instant::now();
    let config = ConfigAggregator::new(store.clone(), rooms, keys)
        .with_policy(FailurePolicy::Strict)
        .build_config("TEC-ITB-1101")
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_millis(380));
    assert_eq!(config.control_key.as_deref(), Some("slow-key"));
}

/// 控制组不存在与空摄像头列表是两种结果
#[tokio::test]
async fn test_no_matching_group_distinct_from_empty() {
    let store = Arc::new(MemoryStore::new());
    store
        .insert_room("ITB-1101", room_with_groups(&[("A", vec![]), ("B", vec![])]))
        .await;
    store
        .insert_mapping("PANEL-C", MappingRecord::new("ITB-1101", "C"))
        .await;
    store
        .insert_mapping("PANEL-A", MappingRecord::new("ITB-1101", "A"))
        .await;
    let keys = Arc::new(StaticKeyIssuer::new());
    let aggregator = aggregator(&store, &keys, FailurePolicy::BestEffort);

    let err = aggregator.build_config("PANEL-C").await.unwrap_err();
    match err {
        PanelError::NoMatchingGroup { room, group } => {
            assert_eq!(room, "ITB-1101");
            assert_eq!(group, "C");
        }
        other => panic!("expected NoMatchingGroup, got {other}"),
    }

    let config = aggregator.build_config("PANEL-A").await.unwrap();
    assert!(config.cameras.is_empty());
    assert!(config.control_key.is_none());
}

/// 房间不存在与控制组不存在是不同错误
#[tokio::test]
async fn test_room_not_found() {
    let store = Arc::new(MemoryStore::new());
    store
        .insert_mapping("TEC-ITB-1101", MappingRecord::new("ITB-9999", "Main"))
        .await;
    let keys = Arc::new(StaticKeyIssuer::new());

    let err = aggregator(&store, &keys, FailurePolicy::BestEffort)
        .cameras("ITB-9999", "Main")
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(matches!(&err, PanelError::RoomConfig { room, .. } if room == "ITB-9999"));
}

/// 空字符串密钥视为没有密钥
#[tokio::test]
async fn test_empty_key_is_absent() {
    let store = seeded_store().await;
    let keys = Arc::new(StaticKeyIssuer::new());
    keys.insert_key("ITB-1101", "Main", "").await;

    let config = aggregator(&store, &keys, FailurePolicy::Strict)
        .build_config("TEC-ITB-1101")
        .await
        .unwrap();

    assert!(config.control_key.is_none());
}

/// 超过截止时间返回 Timeout
#[tokio::test]
async fn test_deadline_expiry() {
    let store = seeded_store().await;
    let rooms = Arc::new(SlowRooms::new(
        Duration::from_secs(10),
        room_with_groups(&[("Main", vec![])]),
    ));
    let keys = Arc::new(StaticKeyIssuer::new());

    let aggregator = ConfigAggregator::new(store.clone(), rooms.clone(), keys)
        .with_timeout(Duration::from_millis(50));

    let err = aggregator.build_config("TEC-ITB-1101").await.unwrap_err();
    assert!(err.is_timeout());
    assert!(!rooms.completed.load(Ordering::SeqCst));
}
