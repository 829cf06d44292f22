// Copyright (c) 2026 rezky_nightky

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use rand::rngs::StdRng;
use rand::Rng;

pub const MAX_EVENTS: usize = 7;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    Scan,
    Connection,
    Firewall,
    Breach,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

const KINDS: [(EventKind, Severity, [&str; 4]); 4] = [
    (
        EventKind::Scan,
        Severity::Medium,
        [
            "Port scan detected from 192.168.1.42",
            "Stealth scan blocked from 45.33.21.87",
            "Vulnerability probe intercepted from 10.0.0.138",
            "Nmap scan detected from external network",
        ],
    ),
    (
        EventKind::Connection,
        Severity::Low,
        [
            "Encrypted tunnel established to tor-node-458.onion",
            "VPN handshake complete with 10.11.12.13",
            "Secure shell connection from 192.168.1.54",
            "Anonymous proxy activated",
        ],
    ),
    (
        EventKind::Firewall,
        Severity::High,
        [
            "Firewall rule updated - blocking subnet 45.67.89.0/24",
            "Intrusion attempt blocked from 23.94.122.35",
            "Packet filter activated for suspicious traffic",
            "Firewall enforcing geo-blocking for region",
        ],
    ),
    (
        EventKind::Breach,
        Severity::Critical,
        [
            "Unauthorized access attempt from 78.91.23.45",
            "SQL injection attempt blocked on /admin endpoint",
            "XSS attack prevented on login form",
            "Buffer overflow exploit attempt detected",
        ],
    ),
];

#[derive(Clone, Debug, PartialEq)]
pub struct SecurityEvent {
    pub id: String,
    pub kind: EventKind,
    pub message: &'static str,
    pub at: DateTime<Local>,
    pub severity: Severity,
}

fn event_id(rng: &mut StdRng) -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    (0..9)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

pub fn random_event(rng: &mut StdRng) -> SecurityEvent {
    let (kind, severity, messages) = KINDS[rng.random_range(0..KINDS.len())];
    SecurityEvent {
        id: event_id(rng),
        kind,
        message: messages[rng.random_range(0..messages.len())],
        at: Local::now(),
        severity,
    }
}

#[derive(Clone, Debug)]
pub struct SecurityFeed {
    events: VecDeque<SecurityEvent>,
    interval: Duration,
    next_due: Instant,
    threats_blocked: u32,
    connections: u32,
}

impl SecurityFeed {
    pub fn new(now: Instant, rng: &mut StdRng) -> Self {
        let interval = Duration::from_millis(3000 + rng.random_range(0..7000));
        Self {
            events: VecDeque::with_capacity(MAX_EVENTS),
            interval,
            next_due: now + interval,
            threats_blocked: 0,
            connections: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn events(&self) -> impl Iterator<Item = &SecurityEvent> {
        self.events.iter()
    }

    pub fn threats_blocked(&self) -> u32 {
        self.threats_blocked
    }

    pub fn connections(&self) -> u32 {
        self.connections
    }

    pub fn push(&mut self, event: SecurityEvent) {
        match event.severity {
            Severity::High | Severity::Critical => self.threats_blocked += 1,
            Severity::Low => self.connections += 1,
            Severity::Medium => {}
        }
        self.events.push_front(event);
        self.events.truncate(MAX_EVENTS);
    }

    pub fn poll(&mut self, now: Instant, rng: &mut StdRng) -> bool {
        if now < self.next_due {
            return false;
        }
        self.push(random_event(rng));
        self.next_due = now + self.interval;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn interval_is_between_three_and_ten_seconds() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let feed = SecurityFeed::new(Instant::now(), &mut rng);
            assert!(feed.interval() >= Duration::from_secs(3));
            assert!(feed.interval() < Duration::from_secs(10));
        }
    }

    #[test]
    fn keeps_the_seven_newest_first() {
        let mut rng = StdRng::seed_from_u64(3);
        let t0 = Instant::now();
        let mut feed = SecurityFeed::new(t0, &mut rng);
        let mut ids = Vec::new();
        for i in 1..=10 {
            assert!(feed.poll(t0 + feed.interval() * i * 2, &mut rng));
            ids.push(feed.events().next().map(|e| e.id.clone()));
        }
        assert_eq!(feed.events().count(), MAX_EVENTS);
        assert_eq!(feed.events().next().map(|e| e.id.clone()), ids[9]);
    }

    #[test]
    fn severity_follows_kind() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..40 {
            let e = random_event(&mut rng);
            let expected = match e.kind {
                EventKind::Scan => Severity::Medium,
                EventKind::Connection => Severity::Low,
                EventKind::Firewall => Severity::High,
                EventKind::Breach => Severity::Critical,
            };
            assert_eq!(e.severity, expected);
            assert_eq!(e.id.len(), 9);
        }
    }

    #[test]
    fn not_due_means_no_event() {
        let mut rng = StdRng::seed_from_u64(1);
        let t0 = Instant::now();
        let mut feed = SecurityFeed::new(t0, &mut rng);
        assert!(!feed.poll(t0, &mut rng));
        assert_eq!(feed.events().count(), 0);
    }
}
