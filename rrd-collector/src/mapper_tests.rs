//! Unit tests for inventory correlation

#[cfg(test)]
mod tests {
    use super::super::*;
    use xenrrd_protocol::{MetricIdentity, ObservationRow, Payload};

    fn payload(entries: &[&str], values: &[f64]) -> Payload {
        Payload {
            start_time: 0,
            step: None,
            end_time: None,
            column_count: entries.len() as i64,
            legend: entries
                .iter()
                .map(|entry| MetricIdentity::parse(entry).unwrap())
                .collect(),
            rows: vec![ObservationRow {
                timestamp: 10,
                values: values.to_vec(),
            }],
        }
    }

    fn inventory() -> Inventory {
        Inventory::from_records(
            vec![
                HostRecord {
                    opaque_ref: HostRef::from("OpaqueRef:h1"),
                    uuid: "555-555".to_string(),
                    hostname: "xen01".to_string(),
                    address: "10.0.0.1".to_string(),
                },
                HostRecord {
                    opaque_ref: HostRef::from("OpaqueRef:h2"),
                    uuid: "666-666".to_string(),
                    hostname: "xen02".to_string(),
                    address: "10.0.0.2".to_string(),
                },
            ],
            vec![
                VmRecord {
                    opaque_ref: VmRef::from("OpaqueRef:v1"),
                    uuid: "1111-111".to_string(),
                    name_label: "web-01".to_string(),
                    resident_on: HostRef::from("OpaqueRef:h2"),
                },
                VmRecord {
                    opaque_ref: VmRef::from("OpaqueRef:v2"),
                    uuid: "2222-222".to_string(),
                    name_label: "halted".to_string(),
                    resident_on: HostRef::from("OpaqueRef:NULL"),
                },
            ],
        )
    }

    fn labels(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        let mut labels: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        labels.sort();
        labels
    }

    fn labels_of(metric: &xenrrd_protocol::MappedMetric) -> Vec<(String, String)> {
        metric.labels.clone().into_iter().collect()
    }

    #[test]
    fn test_end_to_end_with_empty_inventory() {
        let payloads = vec![payload(
            &[
                "AVERAGE:VM:1111-111:CPU",
                "AVERAGE:VM:1111-111:MEMORY",
                "AVERAGE:HOST:555-555:CPU",
            ],
            &[1.1, 2.2, 8.8],
        )];

        let mapped = map_payloads(&payloads, &Inventory::default(), &MapperConfig::default());

        assert_eq!(mapped.len(), 3);
        let values: Vec<f64> = mapped.iter().map(|m| m.value).collect();
        assert_eq!(values, vec![1.1, 2.2, 8.8]);

        for metric in &mapped {
            assert_eq!(metric.label("hostname"), Some("unknown"));
            assert_eq!(metric.label("resident_host"), Some(""));
        }
        assert_eq!(mapped[0].label("scope"), Some("VM"));
        assert_eq!(mapped[2].label("scope"), Some("HOST"));
        assert_eq!(mapped[2].label("uuid"), Some("555-555"));
    }

    #[test]
    fn test_one_sample_per_legend_entry() {
        let payloads = vec![
            payload(&["AVERAGE:host:555-555:a", "AVERAGE:host:555-555:b"], &[1.0, 2.0]),
            payload(&["AVERAGE:vm:1111-111:c"], &[3.0]),
            payload(
                &[
                    "AVERAGE:vm:nope:d",
                    "AVERAGE:sr:x:e",
                    "AVERAGE:host:666-666:f",
                    "AVERAGE:host:666-666:cpu3",
                ],
                &[4.0, 5.0, 6.0, 7.0],
            ),
        ];

        for inventory in [inventory(), Inventory::default()] {
            let mapped = map_payloads(&payloads, &inventory, &MapperConfig::default());
            assert_eq!(mapped.len(), 7);
            let values: Vec<f64> = mapped.iter().map(|m| m.value).collect();
            assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        }
    }

    #[test]
    fn test_vm_labels() {
        let inventory = inventory();
        let config = MapperConfig::default();
        let correlator = Correlator::new(&inventory, &config);

        let metric = correlator.map_entry(
            &MetricIdentity::parse("AVERAGE:vm:1111-111:vbd_xvda_read").unwrap(),
            42.0,
        );

        assert_eq!(metric.name, "vbd_xvda_read");
        assert_eq!(metric.value, 42.0);
        assert_eq!(
            labels_of(&metric),
            labels(&[
                ("uuid", "1111-111"),
                ("hostname", "web-01"),
                ("resident_host", "xen02"),
                ("scope", "vm"),
            ])
        );
    }

    #[test]
    fn test_host_labels() {
        let inventory = inventory();
        let config = MapperConfig::default();
        let correlator = Correlator::new(&inventory, &config);

        let metric = correlator.map_entry(
            &MetricIdentity::parse("AVERAGE:host:555-555:memory_free_kib").unwrap(),
            1.0,
        );

        assert_eq!(
            labels_of(&metric),
            labels(&[
                ("uuid", "555-555"),
                ("hostname", "xen01"),
                ("resident_host", ""),
                ("scope", "host"),
            ])
        );
    }

    #[test]
    fn test_vm_without_resident_host() {
        let inventory = inventory();
        let config = MapperConfig::default();
        let correlator = Correlator::new(&inventory, &config);
        let identity = MetricIdentity::parse("AVERAGE:vm:2222-222:memory").unwrap();

        match correlator.resolve(&identity) {
            EntityResolution::Vm { vm, resident_host } => {
                assert_eq!(vm.name_label, "halted");
                assert!(resident_host.is_none());
            }
            other => panic!("expected VM resolution, got {other:?}"),
        }

        let metric = correlator.map_entry(&identity, 0.0);
        assert_eq!(metric.label("hostname"), Some("halted"));
        assert_eq!(metric.label("resident_host"), Some(""));
    }

    #[test]
    fn test_unknown_entity_does_not_reuse_previous_labels() {
        let payloads = vec![payload(
            &["AVERAGE:vm:1111-111:memory", "AVERAGE:sr:1111-111:latency"],
            &[1.0, 2.0],
        )];

        let mapped = map_payloads(&payloads, &inventory(), &MapperConfig::default());

        assert_eq!(mapped[0].label("hostname"), Some("web-01"));
        assert_eq!(mapped[1].label("hostname"), Some("unknown"));
        assert_eq!(mapped[1].label("resident_host"), Some(""));
        assert_eq!(mapped[1].label("scope"), Some("sr"));
    }

    #[test]
    fn test_entity_type_must_match_indexed_kind() {
        let inventory = inventory();
        let config = MapperConfig::default();
        let correlator = Correlator::new(&inventory, &config);

        // Host UUID declared as a VM entry
        let identity = MetricIdentity::parse("AVERAGE:vm:555-555:memory").unwrap();
        assert_eq!(correlator.resolve(&identity), EntityResolution::Unknown);
    }

    #[test]
    fn test_custom_unknown_label() {
        let config = MapperConfig {
            unknown_label: "n/a".to_string(),
        };
        let payloads = vec![payload(&["AVERAGE:host:missing:load"], &[0.1])];

        let mapped = map_payloads(&payloads, &Inventory::default(), &config);

        assert_eq!(mapped[0].label("hostname"), Some("n/a"));
    }

    #[test]
    fn test_cpu_metrics_are_decomposed() {
        let payloads = vec![payload(
            &[
                "AVERAGE:host:555-555:cpu0",
                "AVERAGE:host:555-555:cpu1-C1",
                "AVERAGE:host:555-555:cpu_avg",
            ],
            &[0.1, 0.2, 0.3],
        )];

        let mapped = map_payloads(&payloads, &inventory(), &MapperConfig::default());

        assert_eq!(mapped[0].name, "cpu");
        assert_eq!(mapped[0].label("cpu_num"), Some("0"));
        assert_eq!(mapped[0].label("core_num"), None);
        assert_eq!(mapped[0].label("hostname"), Some("xen01"));

        assert_eq!(mapped[1].name, "cpu");
        assert_eq!(mapped[1].label("cpu_num"), Some("1"));
        assert_eq!(mapped[1].label("core_num"), Some("1"));

        assert_eq!(mapped[2].name, "cpu_avg");
        assert_eq!(mapped[2].label("cpu_num"), None);
    }

    #[test]
    fn test_names_are_normalized() {
        let payloads = vec![payload(
            &["AVERAGE:vm:1111-111:vif_0_rx-errors", "AVERAGE:host:555-555:pif-eth0-tx"],
            &[1.0, 2.0],
        )];

        let mapped = map_payloads(&payloads, &inventory(), &MapperConfig::default());

        assert_eq!(mapped[0].name, "vif_0_rx_errors");
        assert_eq!(mapped[1].name, "pif_eth0_tx");
        assert!(mapped.iter().all(|m| !m.name.contains('-')));
    }

    #[test]
    fn test_payload_without_rows_is_skipped() {
        let mut empty = payload(&["AVERAGE:host:555-555:load"], &[1.0]);
        empty.rows.clear();
        let payloads = vec![empty, payload(&["AVERAGE:host:666-666:load"], &[2.0])];

        let mapped = map_payloads(&payloads, &inventory(), &MapperConfig::default());

        assert_eq!(mapped.len(), 1);
        assert_eq!(mapped[0].label("hostname"), Some("xen02"));
    }

    #[test]
    fn test_uuid_index_merges_hosts_and_vms() {
        let index = UuidIndex::build(&inventory());

        assert_eq!(index.len(), 4);
        assert_eq!(
            index.get("555-555"),
            Some(&EntityRef::Host(HostRef::from("OpaqueRef:h1")))
        );
        assert_eq!(
            index.get("1111-111"),
            Some(&EntityRef::Vm(VmRef::from("OpaqueRef:v1")))
        );
        assert!(index.get("missing").is_none());
    }

    #[test]
    fn test_uuid_collision_keeps_host() {
        let mut inventory = inventory();
        inventory.vms.insert(
            VmRef::from("OpaqueRef:clash"),
            VmRecord {
                opaque_ref: VmRef::from("OpaqueRef:clash"),
                uuid: "555-555".to_string(),
                name_label: "impostor".to_string(),
                resident_on: HostRef::from("OpaqueRef:h1"),
            },
        );

        let index = UuidIndex::build(&inventory);

        assert_eq!(index.len(), 4);
        assert_eq!(
            index.get("555-555"),
            Some(&EntityRef::Host(HostRef::from("OpaqueRef:h1")))
        );

        let mapped = map_payloads(
            &[payload(&["AVERAGE:host:555-555:load"], &[1.0])],
            &inventory,
            &MapperConfig::default(),
        );
        assert_eq!(mapped[0].label("hostname"), Some("xen01"));
    }
}
