// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// 初始化指标系统
///
/// 配置并注册应用所需的各类监控指标
pub fn init_metrics() {
    let builder = PrometheusBuilder::new();
    builder
        .install()
        .expect("failed to install Prometheus recorder");

    describe_counter!(
        "dial_attempts_dispatched_total",
        "Total number of queue entries dispatched to a provider"
    );
    describe_counter!(
        "dial_submission_failures_total",
        "Total number of adapter submissions that errored"
    );
    describe_counter!(
        "dial_no_eligible_provider_total",
        "Total number of dispatches skipped because no provider number qualified"
    );
    describe_counter!(
        "dial_governor_denials_total",
        "Total number of dispatch bursts denied by the concurrency governor"
    );
    describe_counter!(
        "reconciler_stuck_entries_reset_total",
        "Total number of stuck queue entries reset to pending"
    );
    describe_counter!(
        "reconciler_attempts_forced_closed_total",
        "Total number of stale call attempts forced to no_answer"
    );
    describe_counter!(
        "dispositions_processed_total",
        "Total number of disposition events processed"
    );
    describe_counter!(
        "disposition_policy_failures_total",
        "Total number of disposition policy steps that failed"
    );
    describe_gauge!(
        "dial_in_flight_attempts",
        "Call attempts currently in a non-terminal provider state"
    );
    describe_histogram!(
        "dial_submission_duration_seconds",
        "Duration of provider submission calls in seconds"
    );
}
