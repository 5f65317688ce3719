// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! Health polling (§4.4 "Startup sequence") and report aggregation (§4.4
//! "Health protocol").

use std::time::{Duration, Instant};

use lf_wire::{ComponentHealth, HealthReport, HealthStatus};

const INITIAL_BACKOFF: Duration = Duration::from_millis(100);
const MAX_BACKOFF: Duration = Duration::from_secs(2);

/// Poll `check` with exponential backoff until it reports healthy or
/// `deadline` elapses. Returns the last observed report either way so the
/// caller can surface it on timeout (§4.4 "on timeout mark `failed` and
/// surface the last health response").
pub async fn poll_until_healthy<F, Fut>(mut check: F, deadline: Duration) -> (bool, HealthReport)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = HealthReport>,
{
    let start = Instant::now();
    let mut backoff = INITIAL_BACKOFF;
    let mut last = check().await;

    loop {
        if last.status == HealthStatus::Healthy {
            return (true, last);
        }
        if start.elapsed() >= deadline {
            return (false, last);
        }
        let remaining = deadline.saturating_sub(start.elapsed());
        tokio::time::sleep(backoff.min(remaining)).await;
        backoff = (backoff * 2).min(MAX_BACKOFF);
        last = check().await;
    }
}

/// Combine every service's own `/health` report into one banner: unhealthy
/// if any component is unhealthy, degraded if any is degraded, else healthy.
pub fn aggregate(reports: impl IntoIterator<Item = (String, HealthReport)>) -> HealthReport {
    let mut components = std::collections::BTreeMap::new();
    let mut worst = HealthStatus::Healthy;

    for (service_id, report) in reports {
        worst = worse_of(worst, report.status);
        for (name, component) in report.components {
            worst = worse_of(worst, component.status);
            components.insert(format!("{service_id}.{name}"), component);
        }
    }

    HealthReport { status: worst, components }
}

fn worse_of(a: HealthStatus, b: HealthStatus) -> HealthStatus {
    fn rank(s: HealthStatus) -> u8 {
        match s {
            HealthStatus::Healthy => 0,
            HealthStatus::Degraded => 1,
            HealthStatus::Unhealthy => 2,
        }
    }
    if rank(b) > rank(a) {
        b
    } else {
        a
    }
}

pub fn healthy_report() -> HealthReport {
    HealthReport { status: HealthStatus::Healthy, components: std::collections::BTreeMap::new() }
}

pub fn unhealthy_report(component: &str, message: impl Into<String>) -> HealthReport {
    let mut components = std::collections::BTreeMap::new();
    components.insert(
        component.to_string(),
        ComponentHealth { status: HealthStatus::Unhealthy, latency_ms: None, message: Some(message.into()) },
    );
    HealthReport { status: HealthStatus::Unhealthy, components }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn succeeds_once_check_reports_healthy() {
        let attempts = AtomicUsize::new(0);
        let (ok, report) = poll_until_healthy(
            || async {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    unhealthy_report("runtime", "not ready")
                } else {
                    healthy_report()
                }
            },
            Duration::from_secs(5),
        )
        .await;
        assert!(ok);
        assert_eq!(report.status, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn times_out_and_returns_last_report() {
        let (ok, report) =
            poll_until_healthy(|| async { unhealthy_report("runtime", "down") }, Duration::from_millis(150))
                .await;
        assert!(!ok);
        assert_eq!(report.status, HealthStatus::Unhealthy);
    }

    #[test]
    fn aggregate_takes_the_worst_status() {
        let report = aggregate([
            ("worker".to_string(), healthy_report()),
            ("runtime".to_string(), unhealthy_report("embedder", "timeout")),
        ]);
        assert_eq!(report.status, HealthStatus::Unhealthy);
        assert!(report.components.contains_key("runtime.embedder"));
    }
}
