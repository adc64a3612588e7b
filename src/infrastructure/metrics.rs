// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::MigrationOutcome;
use metrics::{counter, histogram};

/// 记录一次对托管实例的请求
pub fn record_request(operation: &'static str) {
    counter!("host_requests_total", "operation" => operation).increment(1);
}

/// 记录一个迁移任务的结果和耗时
pub fn record_outcome(outcome: &MigrationOutcome) {
    let kind = outcome.kind.as_str();
    counter!("migration_outcomes_total", "kind" => kind, "result" => outcome.label()).increment(1);
    histogram!("migration_duration_seconds", "kind" => kind).record(outcome.elapsed.as_secs_f64());
}
