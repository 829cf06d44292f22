// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

pub const BOOT_SEQUENCE: &[&str] = &[
    "[BOOT] Initializing NEXUS OS v3.7.2...",
    "[BOOT] Loading quantum encryption modules...",
    "[BOOT] Establishing dark web connections...",
    "[BOOT] Initializing stealth protocols...",
    "[BOOT] Loading exploit database...",
    "[BOOT] Activating neural firewall...",
    "[BOOT] Scanning for vulnerabilities...",
    "[BOOT] Establishing secure tunnels...",
    "[BOOT] Loading penetration testing suite...",
    "[BOOT] System compromise detection: ACTIVE",
    "[BOOT] Anonymous routing: ENABLED",
    "[BOOT] Trace resistance: MAXIMUM",
    "[SUCCESS] All systems operational. Welcome, Agent.",
    "",
];

pub const BOOT_FOOTER: &str = "Type \"help\" for command suite";

pub const STARTUP_LINE_INTERVAL: Duration = Duration::from_millis(800);
pub const REPLAY_LINE_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Clone, Debug)]
pub struct BootPlayback {
    index: usize,
    interval: Duration,
    next_due: Instant,
    done: bool,
}

impl BootPlayback {
    pub fn start(now: Instant, interval: Duration) -> Self {
        Self {
            index: 0,
            interval,
            next_due: now + interval,
            done: false,
        }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn poll(&mut self, now: Instant) -> Vec<&'static str> {
        let mut out = Vec::new();
        while !self.done && now >= self.next_due {
            match BOOT_SEQUENCE.get(self.index) {
                Some(line) => {
                    out.push(*line);
                    self.index += 1;
                }
                None => {
                    out.push(BOOT_FOOTER);
                    self.done = true;
                }
            }
            self.next_due += self.interval;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plays_one_line_per_interval_then_footer() {
        let t0 = Instant::now();
        let mut boot = BootPlayback::start(t0, STARTUP_LINE_INTERVAL);
        assert!(boot.poll(t0).is_empty());
        assert_eq!(boot.poll(t0 + STARTUP_LINE_INTERVAL), vec![BOOT_SEQUENCE[0]]);

        let rest = boot.poll(t0 + STARTUP_LINE_INTERVAL * 100);
        assert_eq!(rest.len(), BOOT_SEQUENCE.len());
        assert_eq!(rest.last(), Some(&BOOT_FOOTER));
        assert!(boot.is_done());
        assert!(boot.poll(t0 + STARTUP_LINE_INTERVAL * 200).is_empty());
    }
}
