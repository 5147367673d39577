// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

/// 初始化指标系统
///
/// 在指定地址启动Prometheus导出器并注册流水线使用的指标。
pub fn init_metrics(listen_addr: &str) {
    let addr: SocketAddr = match listen_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!("Invalid metrics address {}: {}. Metrics exporter disabled.", listen_addr, e);
            return;
        }
    };

    // Ignore error if address is already in use (for development/testing)
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!("Failed to install Prometheus recorder: {}. This might happen if the port is already in use.", e);
        return;
    }

    describe_metrics();
    info!("Metrics exporter listening on {}", addr);
}

/// 注册指标描述
pub fn describe_metrics() {
    describe_counter!(
        "llm_requests_total",
        "Total number of model requests by task and outcome"
    );
    describe_histogram!(
        "llm_request_duration_seconds",
        "Duration of model requests in seconds"
    );
    describe_counter!(
        "menu_extractions_total",
        "Total number of menus extracted, validated and stored"
    );
    describe_counter!(
        "menu_extraction_failures_total",
        "Total number of failed menu extractions by task and error kind"
    );
}
