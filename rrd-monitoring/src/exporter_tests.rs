//! Unit tests for sample exposition

#[cfg(test)]
mod tests {
    use super::super::*;
    use std::collections::BTreeMap;
    use std::time::Duration;
    use xenrrd_protocol::MappedMetric;

    fn sample(name: &str, labels: &[(&str, &str)], value: f64) -> MappedMetric {
        let labels: BTreeMap<String, String> = labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        MappedMetric::new(name, labels, value)
    }

    fn exporter() -> MetricsExporter {
        MetricsExporter::new(ExporterConfig {
            self_metrics: false,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_publish_and_render() {
        let exporter = exporter();
        let summary = exporter
            .publish(&[
                sample("memory_free_kib", &[("hostname", "xen01"), ("scope", "host")], 2048.0),
                sample("memory_free_kib", &[("hostname", "xen02"), ("scope", "host")], 4096.0),
                sample("vbd_xvda_read", &[("hostname", "web-01"), ("scope", "vm")], 1.5),
            ])
            .unwrap();

        assert_eq!(summary.families, 2);
        assert_eq!(summary.samples, 3);
        assert_eq!(summary.skipped_families, 0);

        let text = exporter.render().unwrap();
        assert!(text.contains("# TYPE memory_free_kib gauge"));
        assert!(text.contains(r#"memory_free_kib{hostname="xen01",scope="host"} 2048"#));
        assert!(text.contains(r#"memory_free_kib{hostname="xen02",scope="host"} 4096"#));
        assert!(text.contains(r#"vbd_xvda_read{hostname="web-01",scope="vm"} 1.5"#));
    }

    #[test]
    fn test_mixed_label_keys_share_a_family() {
        let exporter = exporter();
        let summary = exporter
            .publish(&[
                sample("cpu", &[("cpu_num", "0")], 0.25),
                sample("cpu", &[("cpu_num", "0"), ("core_num", "1")], 0.75),
            ])
            .unwrap();

        assert_eq!(summary.families, 1);
        assert_eq!(summary.samples, 2);

        let text = exporter.render().unwrap();
        assert!(text.contains(r#"cpu{core_num="",cpu_num="0"} 0.25"#));
        assert!(text.contains(r#"cpu{core_num="1",cpu_num="0"} 0.75"#));
    }

    #[test]
    fn test_publish_replaces_previous_cycle() {
        let exporter = exporter();
        exporter
            .publish(&[sample("load", &[("hostname", "gone")], 1.0)])
            .unwrap();
        exporter
            .publish(&[sample("load", &[("hostname", "xen01")], 2.0)])
            .unwrap();

        let text = exporter.render().unwrap();
        assert!(!text.contains("gone"));
        assert!(text.contains(r#"load{hostname="xen01"} 2"#));
    }

    #[test]
    fn test_duplicate_label_set_counts_once() {
        let exporter = MetricsExporter::new(ExporterConfig::default()).unwrap();
        let summary = exporter
            .publish(&[
                sample("memory", &[("uuid", "1111-111"), ("scope", "vm")], 512.0),
                sample("memory", &[("uuid", "1111-111"), ("scope", "vm")], 1024.0),
                sample("memory", &[("uuid", "2222-222"), ("scope", "vm")], 256.0),
            ])
            .unwrap();

        assert_eq!(summary.families, 1);
        assert_eq!(summary.samples, 2);

        let text = exporter.render().unwrap();
        assert!(text.contains(r#"memory{scope="vm",uuid="1111-111"} 1024"#));
        assert!(!text.contains(r#"memory{scope="vm",uuid="1111-111"} 512"#));
        assert!(text.contains("xenrrd_samples_published 2"));
    }

    #[test]
    fn test_invalid_family_is_skipped() {
        let exporter = exporter();
        let summary = exporter
            .publish(&[
                sample("0bad name", &[("hostname", "xen01")], 1.0),
                sample("good", &[("hostname", "xen01")], 2.0),
            ])
            .unwrap();

        assert_eq!(summary.families, 1);
        assert_eq!(summary.skipped_families, 1);
        assert!(exporter.render().unwrap().contains("good"));
    }

    #[test]
    fn test_namespace_prefix() {
        let exporter = MetricsExporter::new(ExporterConfig {
            namespace: Some("xen".to_string()),
            self_metrics: false,
        })
        .unwrap();
        exporter
            .publish(&[sample("load", &[("hostname", "xen01")], 1.0)])
            .unwrap();

        assert!(exporter.render().unwrap().contains(r#"xen_load{hostname="xen01"} 1"#));
    }

    #[test]
    fn test_self_metrics() {
        let exporter = MetricsExporter::new(ExporterConfig::default()).unwrap();
        exporter
            .publish(&[sample("load", &[], 1.0), sample("other", &[], 2.0)])
            .unwrap();
        exporter.record_poll(3, 1, Duration::from_millis(1500));

        let text = exporter.render().unwrap();
        assert!(text.contains("xenrrd_hosts_polled 3"));
        assert!(text.contains("xenrrd_hosts_failed 1"));
        assert!(text.contains("xenrrd_poll_duration_seconds 1.5"));
        assert!(text.contains("xenrrd_samples_published 2"));
    }

    #[test]
    fn test_empty_publish() {
        let exporter = exporter();
        let summary = exporter.publish(&[]).unwrap();

        assert_eq!(summary, PublishSummary::default());
        assert!(exporter.render().unwrap().is_empty());
    }

    #[test]
    fn test_exporter_config_serialization() {
        let config = ExporterConfig {
            namespace: Some("xen".to_string()),
            self_metrics: false,
        };

        let json = serde_json::to_string(&config).unwrap();
        let deserialized: ExporterConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized, config);
        let defaulted: ExporterConfig = serde_json::from_str("{}").unwrap();
        assert!(defaulted.self_metrics);
    }
}
