//! Full poll cycles against mock hosts

use crate::test_utils::*;
use axum::http::StatusCode;
use std::io::Write;
use xenrrd_collector::{Inventory, StaticInventory};

#[tokio::test]
async fn test_poll_cycle_with_failing_host() {
    let healthy = spawn_mock_host(
        StatusCode::OK,
        xport_body(
            &[
                "AVERAGE:host:555-555:cpu0",
                "AVERAGE:host:555-555:memory_free_kib",
                "AVERAGE:vm:1111-111:vif_0_rx-errors",
            ],
            &[0.25, 2048.0, 3.0],
        ),
    )
    .await;
    let failing = spawn_mock_host(StatusCode::SERVICE_UNAVAILABLE, String::new()).await;

    let inventory = Inventory::from_records(
        vec![
            host_record("xen01", "555-555", &healthy),
            host_record("xen02", "666-666", &failing),
        ],
        vec![vm_record("web-01", "1111-111", "xen01")],
    );

    let report = test_collector().poll_once(&inventory).await;

    assert_eq!(report.hosts_polled, 2);
    assert_eq!(report.hosts_failed, 1);
    assert_eq!(report.hosts_succeeded(), 1);
    assert_eq!(report.metrics.len(), 3);

    let cpu = &report.metrics[0];
    assert_eq!(cpu.name, "cpu");
    assert_eq!(cpu.label("cpu_num"), Some("0"));
    assert_eq!(cpu.label("hostname"), Some("xen01"));
    assert_eq!(cpu.label("scope"), Some("host"));
    assert_eq!(cpu.value, 0.25);

    let vif = &report.metrics[2];
    assert_eq!(vif.name, "vif_0_rx_errors");
    assert_eq!(vif.label("hostname"), Some("web-01"));
    assert_eq!(vif.label("resident_host"), Some("xen01"));
    assert_eq!(vif.label("scope"), Some("vm"));
}

#[tokio::test]
async fn test_poll_cycle_with_no_reachable_hosts() {
    let failing = spawn_mock_host(StatusCode::FORBIDDEN, String::new()).await;
    let garbled = spawn_mock_host(StatusCode::OK, "<xport>".to_string()).await;
    let inventory = Inventory::from_records(
        vec![
            host_record("xen01", "555-555", &failing),
            host_record("xen02", "666-666", &garbled),
        ],
        Vec::new(),
    );

    let report = test_collector().poll_once(&inventory).await;

    assert_eq!(report.hosts_polled, 2);
    assert_eq!(report.hosts_failed, 2);
    assert!(report.metrics.is_empty());
}

#[tokio::test]
async fn test_poll_cycle_with_empty_inventory() {
    let report = test_collector().poll_once(&Inventory::default()).await;

    assert_eq!(report.hosts_polled, 0);
    assert!(report.metrics.is_empty());
}

#[tokio::test]
async fn test_malformed_legend_drops_only_that_host() {
    let good = spawn_mock_host(
        StatusCode::OK,
        xport_body(&["AVERAGE:host:555-555:load"], &[0.5]),
    )
    .await;
    let bad = spawn_mock_host(
        StatusCode::OK,
        xport_body(&["AVERAGE:host:666-666:load", "garbage"], &[0.1, 0.2]),
    )
    .await;
    let inventory = Inventory::from_records(
        vec![
            host_record("xen01", "555-555", &good),
            host_record("xen02", "666-666", &bad),
        ],
        Vec::new(),
    );

    let report = test_collector().poll_once(&inventory).await;

    assert_eq!(report.hosts_failed, 1);
    assert_eq!(report.metrics.len(), 1);
    assert_eq!(report.metrics[0].label("hostname"), Some("xen01"));
}

#[tokio::test]
async fn test_poll_from_static_inventory_file() {
    let address = spawn_mock_host(
        StatusCode::OK,
        xport_body(
            &["AVERAGE:host:555-555:cpu1-C1", "AVERAGE:vm:1111-111:memory"],
            &[0.9, 512.0],
        ),
    )
    .await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[[hosts]]
opaque_ref = "OpaqueRef:xen01"
uuid = "555-555"
hostname = "xen01"
address = "{}"

[[vms]]
opaque_ref = "OpaqueRef:db-01"
uuid = "1111-111"
name_label = "db-01"
resident_on = "OpaqueRef:xen01"
"#,
        address
    )
    .unwrap();

    let source = StaticInventory::new(file.path());
    let report = test_collector().poll(&source).await.unwrap();

    assert_eq!(report.metrics.len(), 2);
    assert_eq!(report.metrics[0].name, "cpu");
    assert_eq!(report.metrics[0].label("core_num"), Some("1"));
    assert_eq!(report.metrics[1].label("hostname"), Some("db-01"));
    assert_eq!(report.metrics[1].label("resident_host"), Some("xen01"));
}

#[tokio::test]
async fn test_poll_with_unreadable_inventory_fails() {
    let source = StaticInventory::new("/nonexistent/inventory.toml");
    assert!(test_collector().poll(&source).await.is_err());
}
