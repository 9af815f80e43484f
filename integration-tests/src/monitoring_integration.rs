//! Poll cycles published through the Prometheus exporter

use crate::test_utils::*;
use axum::http::StatusCode;
use xenrrd_collector::Inventory;
use xenrrd_monitoring::{ExporterConfig, MetricsExporter};

#[tokio::test]
async fn test_poll_publish_render() {
    let address = spawn_mock_host(
        StatusCode::OK,
        xport_body(
            &[
                "AVERAGE:host:555-555:cpu0",
                "AVERAGE:host:555-555:cpu0-C1",
                "AVERAGE:vm:1111-111:memory",
            ],
            &[0.5, 0.25, 1024.0],
        ),
    )
    .await;
    let inventory = Inventory::from_records(
        vec![host_record("xen01", "555-555", &address)],
        vec![vm_record("web-01", "1111-111", "xen01")],
    );

    let report = test_collector().poll_once(&inventory).await;
    let exporter = MetricsExporter::new(ExporterConfig::default()).unwrap();
    let summary = exporter.publish(&report.metrics).unwrap();
    exporter.record_poll(report.hosts_polled, report.hosts_failed, report.duration);

    assert_eq!(summary.families, 2);
    assert_eq!(summary.samples, 3);

    let text = exporter.render().unwrap();
    assert!(text.contains(
        r#"cpu{core_num="",cpu_num="0",hostname="xen01",resident_host="",scope="host",uuid="555-555"} 0.5"#
    ));
    assert!(text.contains(
        r#"cpu{core_num="1",cpu_num="0",hostname="xen01",resident_host="",scope="host",uuid="555-555"} 0.25"#
    ));
    assert!(text.contains(
        r#"memory{hostname="web-01",resident_host="xen01",scope="vm",uuid="1111-111"} 1024"#
    ));
    assert!(text.contains("xenrrd_hosts_polled 1"));
    assert!(text.contains("xenrrd_hosts_failed 0"));
    assert!(text.contains("xenrrd_samples_published 3"));
}

#[tokio::test]
async fn test_failed_host_disappears_from_exposition() {
    let address = spawn_mock_host(
        StatusCode::OK,
        xport_body(&["AVERAGE:host:555-555:load"], &[1.0]),
    )
    .await;
    let exporter = MetricsExporter::new(ExporterConfig::default()).unwrap();
    let collector = test_collector();

    let first = Inventory::from_records(vec![host_record("xen01", "555-555", &address)], Vec::new());
    let report = collector.poll_once(&first).await;
    exporter.publish(&report.metrics).unwrap();
    assert!(exporter.render().unwrap().contains(r#"hostname="xen01""#));

    let down = spawn_mock_host(StatusCode::BAD_GATEWAY, String::new()).await;
    let second = Inventory::from_records(vec![host_record("xen01", "555-555", &down)], Vec::new());
    let report = collector.poll_once(&second).await;
    exporter.publish(&report.metrics).unwrap();
    exporter.record_poll(report.hosts_polled, report.hosts_failed, report.duration);

    let text = exporter.render().unwrap();
    assert!(!text.contains(r#"hostname="xen01""#));
    assert!(text.contains("xenrrd_hosts_failed 1"));
}
