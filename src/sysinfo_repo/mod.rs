// Host CPU / memory / disk snapshot via sysinfo

use crate::models::SystemMetrics;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use sysinfo::{Disks, System};
use tracing::instrument;

pub struct SysinfoRepo {
    sys: Arc<std::sync::Mutex<System>>,
    disks: Arc<std::sync::Mutex<Disks>>,
    last_cpu_refresh: Arc<std::sync::Mutex<Option<(Instant, f64)>>>,
}

impl Default for SysinfoRepo {
    fn default() -> Self {
        Self::new()
    }
}

/// Used/total percentage; 0 when total is 0.
fn percent(used: u64, total: u64) -> f64 {
    if total > 0 {
        (used as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

impl SysinfoRepo {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_all();
        sys.refresh_memory();
        let disks = Disks::new_with_refreshed_list();
        Self {
            sys: Arc::new(std::sync::Mutex::new(sys)),
            disks: Arc::new(std::sync::Mutex::new(disks)),
            last_cpu_refresh: Arc::new(std::sync::Mutex::new(None)),
        }
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "get_system_metrics"))]
    pub async fn get_system_metrics(&self) -> anyhow::Result<SystemMetrics> {
        let sys = self.sys.clone();
        let disks = self.disks.clone();
        let last_cpu_refresh = self.last_cpu_refresh.clone();
        tokio::task::spawn_blocking(move || {
            let mut sys = sys
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))?;

            let now = Instant::now();
            let cpu_percent = if let Ok(mut guard) = last_cpu_refresh.lock() {
                match *guard {
                    Some((prev_ts, prev_usage))
                        if now.duration_since(prev_ts) < sysinfo::MINIMUM_CPU_UPDATE_INTERVAL =>
                    {
                        // Too soon for a meaningful delta; reuse the last reading
                        prev_usage
                    }
                    _ => {
                        sys.refresh_cpu_all();
                        let usage = sys.global_cpu_usage() as f64;
                        *guard = Some((now, usage));
                        usage
                    }
                }
            } else {
                sys.refresh_cpu_all();
                sys.global_cpu_usage() as f64
            };

            sys.refresh_memory();
            let memory_total = sys.total_memory();
            let memory_used = memory_total.saturating_sub(sys.available_memory());

            let mut disks_guard = disks
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo disks lock poisoned: {}", e))?;
            disks_guard.refresh(false);
            let root = disks_guard
                .list()
                .iter()
                .find(|d| d.mount_point() == Path::new("/"))
                .or_else(|| disks_guard.list().iter().max_by_key(|d| d.total_space()));
            let (disk_total, disk_used) = root.map_or((0, 0), |d| {
                let total = d.total_space();
                (total, total.saturating_sub(d.available_space()))
            });

            let load = System::load_average();

            Ok(SystemMetrics {
                hostname: System::host_name().unwrap_or_default(),
                uptime_secs: System::uptime(),
                load_average: [load.one, load.five, load.fifteen],
                cpu_percent: cpu_percent.clamp(0.0, 100.0),
                memory_total,
                memory_used,
                memory_percent: percent(memory_used, memory_total),
                disk_total,
                disk_used,
                disk_percent: percent(disk_used, disk_total),
            })
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }
}
