//! Integration tests for the xenrrd exporter
//!
//! These tests run whole poll cycles against in-process mock hosts that
//! serve `rrd_updates` over plain HTTP, and check the resulting exposition.

#![allow(clippy::uninlined_format_args)] // Allow traditional format strings in tests

pub mod end_to_end_scenarios;
pub mod monitoring_integration;

/// Common test utilities for integration tests
pub mod test_utils {
    use axum::http::StatusCode;
    use axum::{Router, routing::get};
    use xenrrd_collector::{
        Collector, CollectorConfig, Credentials, FetcherConfig, HostRecord, HostRef, RrdFetcher,
        VmRecord, VmRef,
    };

    pub const USERNAME: &str = "root";
    pub const PASSWORD: &str = "secret";

    /// Render an `xport` document with one row of `values`
    pub fn xport_body(entries: &[&str], values: &[f64]) -> String {
        let legend: String = entries
            .iter()
            .map(|entry| format!("<entry>{}</entry>", entry))
            .collect();
        let row: String = values.iter().map(|value| format!("<v>{}</v>", value)).collect();

        format!(
            "<xport><meta><start>1700000000</start><step>5</step><end>1700000010</end>\
             <rows>1</rows><columns>{}</columns><legend>{}</legend></meta>\
             <data><row><t>1700000010</t>{}</row></data></xport>",
            entries.len(),
            legend,
            row
        )
    }

    /// Serve `body` with `status` on `/rrd_updates`, returning the host address
    pub async fn spawn_mock_host(status: StatusCode, body: String) -> String {
        let router = Router::new().route(
            "/rrd_updates",
            get(move || {
                let body = body.clone();
                async move { (status, body) }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock host");
        let addr = listener.local_addr().expect("mock host address");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("mock host serve");
        });
        addr.to_string()
    }

    /// Collector that reaches mock hosts over plain HTTP
    pub fn test_collector() -> Collector {
        let config = CollectorConfig {
            fetcher: FetcherConfig {
                scheme: "http".to_string(),
                timeout_secs: 5,
                ..Default::default()
            },
            ..Default::default()
        };
        let fetcher = RrdFetcher::new(&config.fetcher, Credentials::new(USERNAME, PASSWORD))
            .expect("fetcher");
        Collector::with_fetcher(config, fetcher)
    }

    pub fn host_record(name: &str, uuid: &str, address: &str) -> HostRecord {
        HostRecord {
            opaque_ref: HostRef(format!("OpaqueRef:{}", name)),
            uuid: uuid.to_string(),
            hostname: name.to_string(),
            address: address.to_string(),
        }
    }

    pub fn vm_record(name: &str, uuid: &str, resident_on: &str) -> VmRecord {
        VmRecord {
            opaque_ref: VmRef(format!("OpaqueRef:{}", name)),
            uuid: uuid.to_string(),
            name_label: name.to_string(),
            resident_on: HostRef(format!("OpaqueRef:{}", resident_on)),
        }
    }
}
