// Convert a raw Docker stats API response into counter samples.

use crate::runtime::StatsSample;
use bollard::models::ContainerStatsResponse;

/// Pull the CPU and memory counters out of a one-shot stats response. `None` when the response
/// lacks CPU data for either the current or the previous sample.
pub(crate) fn to_sample(s: &ContainerStatsResponse) -> Option<StatsSample> {
    let cpu_stats = s.cpu_stats.as_ref()?;
    let precpu_stats = s.precpu_stats.as_ref()?;

    let cpu_usage = cpu_stats.cpu_usage.as_ref()?;
    let precpu_usage = precpu_stats.cpu_usage.as_ref()?;

    let memory = s.memory_stats.as_ref();

    Some(StatsSample {
        cpu_total_usage: cpu_usage.total_usage.unwrap_or(0),
        precpu_total_usage: precpu_usage.total_usage.unwrap_or(0),
        system_cpu_usage: cpu_stats.system_cpu_usage.unwrap_or(0),
        presystem_cpu_usage: precpu_stats.system_cpu_usage.unwrap_or(0),
        online_cpus: cpu_stats.online_cpus.unwrap_or(1),
        mem_usage: memory.and_then(|m| m.usage).unwrap_or(0),
        mem_limit: memory.and_then(|m| m.limit).unwrap_or(0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bollard::models::{ContainerCpuStats, ContainerCpuUsage, ContainerMemoryStats};

    fn minimal_cpu_stats(total_usage: u64, system_cpu_usage: u64) -> ContainerCpuStats {
        ContainerCpuStats {
            cpu_usage: Some(ContainerCpuUsage {
                total_usage: Some(total_usage),
                ..Default::default()
            }),
            system_cpu_usage: Some(system_cpu_usage),
            online_cpus: Some(2),
            throttling_data: None,
        }
    }

    #[test]
    fn to_sample_returns_none_when_cpu_stats_missing() {
        let s = ContainerStatsResponse {
            cpu_stats: None,
            precpu_stats: Some(minimal_cpu_stats(0, 0)),
            ..Default::default()
        };
        assert!(to_sample(&s).is_none());
    }

    #[test]
    fn to_sample_returns_none_when_precpu_stats_missing() {
        let s = ContainerStatsResponse {
            cpu_stats: Some(minimal_cpu_stats(100, 1000)),
            precpu_stats: None,
            ..Default::default()
        };
        assert!(to_sample(&s).is_none());
    }

    #[test]
    fn to_sample_copies_counters() {
        let s = ContainerStatsResponse {
            cpu_stats: Some(minimal_cpu_stats(100_000_000, 1_000_000_000)),
            precpu_stats: Some(minimal_cpu_stats(50_000_000, 500_000_000)),
            memory_stats: Some(ContainerMemoryStats {
                usage: Some(256 * 1024 * 1024),
                limit: Some(512 * 1024 * 1024),
                ..Default::default()
            }),
            ..Default::default()
        };
        let out = to_sample(&s).unwrap();
        assert_eq!(out.cpu_total_usage, 100_000_000);
        assert_eq!(out.precpu_total_usage, 50_000_000);
        assert_eq!(out.system_cpu_usage, 1_000_000_000);
        assert_eq!(out.presystem_cpu_usage, 500_000_000);
        assert_eq!(out.online_cpus, 2);
        assert_eq!(out.mem_usage, 256 * 1024 * 1024);
        assert_eq!(out.mem_limit, 512 * 1024 * 1024);
    }

    #[test]
    fn to_sample_defaults_missing_memory_to_zero() {
        let s = ContainerStatsResponse {
            cpu_stats: Some(minimal_cpu_stats(100, 500)),
            precpu_stats: Some(minimal_cpu_stats(50, 500)),
            ..Default::default()
        };
        let out = to_sample(&s).unwrap();
        assert_eq!(out.mem_usage, 0);
        assert_eq!(out.mem_limit, 0);
    }
}
