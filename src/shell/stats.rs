// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::Rng;
use sysinfo::System;

pub const REFRESH_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SystemStats {
    pub cpu: f32,
    pub memory: f32,
    pub network: f32,
    pub threats: u32,
    pub connections: u32,
    pub uptime: Duration,
    pub os: String,
    pub host: String,
}

pub fn format_uptime(d: Duration) -> String {
    let secs = d.as_secs();
    let (days, hours, mins, s) = (secs / 86400, (secs % 86400) / 3600, (secs % 3600) / 60, secs % 60);
    if days > 0 {
        format!("{days}d {hours}h {mins}m {s}s")
    } else if hours > 0 {
        format!("{hours}h {mins}m {s}s")
    } else if mins > 0 {
        format!("{mins}m {s}s")
    } else {
        format!("{s}s")
    }
}

pub struct StatsCollector {
    sys: System,
    last_refresh: Option<Instant>,
    stats: SystemStats,
}

impl Default for StatsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsCollector {
    pub fn new() -> Self {
        let mut sys = System::new();
        // First CPU reading is always 0%; take a baseline now.
        sys.refresh_cpu_usage();
        let stats = SystemStats {
            os: System::long_os_version().unwrap_or_else(|| "unknown".to_string()),
            host: System::host_name().unwrap_or_else(|| "nexus".to_string()),
            ..SystemStats::default()
        };
        Self {
            sys,
            last_refresh: None,
            stats,
        }
    }

    pub fn stats(&self) -> &SystemStats {
        &self.stats
    }

    pub fn maybe_refresh(
        &mut self,
        now: Instant,
        started: Instant,
        threats: u32,
        connections: u32,
        rng: &mut StdRng,
    ) -> bool {
        let due = match self.last_refresh {
            None => true,
            Some(last) => now
                .checked_duration_since(last)
                .is_some_and(|elapsed| elapsed >= REFRESH_INTERVAL),
        };
        if !due {
            return false;
        }
        self.last_refresh = Some(now);

        self.sys.refresh_cpu_usage();
        self.sys.refresh_memory();

        let total = self.sys.total_memory();
        self.stats.cpu = self.sys.global_cpu_usage().clamp(0.0, 100.0);
        self.stats.memory = if total > 0 {
            (self.sys.used_memory() as f64 / total as f64 * 100.0) as f32
        } else {
            0.0
        };
        let drift: f32 = rng.random_range(-1.5..1.5);
        self.stats.network = (self.stats.network + drift).clamp(0.5, 48.0);
        self.stats.threats = threats;
        self.stats.connections = connections;
        self.stats.uptime = now.saturating_duration_since(started);
        true
    }
}
