// Copyright (c) 2026 rezky_nightky

use std::fmt::Write as _;
use std::time::{Duration, Instant};

use chrono::Local;
use rand::rngs::StdRng;
use rand::Rng;

use super::card;
use super::history::CommandHistory;
use super::stats::SystemStats;
use super::timers::Timers;
use super::{Deferred, Display, Effect, Settings, TerminalTheme};
use crate::theme::Theme;

const SCAN_DURATION: Duration = Duration::from_secs(3);
const POWER_DOWN_DELAY: Duration = Duration::from_secs(3);
const REBOOT_DELAY: Duration = Duration::from_millis(1500);

pub(super) struct CommandContext<'a> {
    pub settings: &'a mut Settings,
    pub display: &'a mut Display,
    pub timers: &'a mut Timers<Deferred>,
    pub history: &'a CommandHistory,
    pub stats: &'a SystemStats,
    pub effects: &'a mut Vec<Effect>,
    pub rng: &'a mut StdRng,
    pub now: Instant,
    pub clear_screen: bool,
    pub type_tagline: bool,
}

pub(super) type Handler = fn(&[&str], &mut CommandContext<'_>) -> Vec<String>;

const COMMANDS: &[(&str, Handler)] = &[
    ("help", help),
    ("nmap", nmap),
    ("whois", whois),
    ("trace", trace),
    ("enum", enumerate),
    ("exploit", exploit),
    ("payload", payload),
    ("crack", crack),
    ("shell", reverse_shell),
    ("stealth", stealth),
    ("proxy", proxy),
    ("encrypt", encrypt),
    ("tunnel", tunnel),
    ("status", status),
    ("monitor", monitor),
    ("hud", hud),
    ("matrix", matrix),
    ("system_monitor", system_monitor),
    ("security_monitor", security_monitor),
    ("move_monitors", move_monitors),
    ("clear", clear),
    ("cls", clear),
    ("exit", power_off),
    ("poweroff", power_off),
    ("quit", quit),
    ("whoami", whoami),
    ("social", social),
    ("contact", social),
    ("echo", echo),
    ("history", history),
    ("settings", settings),
    ("set_font", set_font),
    ("set_opacity", set_opacity),
    ("set_theme", set_theme),
    ("toggle_ontop", toggle_ontop),
    ("toggle_fullscreen", toggle_fullscreen),
    ("reset", reset),
    ("date", date),
    ("neural", neural),
    ("quantum", quantum),
    ("theme", theme),
];

pub fn names() -> impl Iterator<Item = &'static str> {
    COMMANDS.iter().map(|(name, _)| *name)
}

pub(super) fn lookup(name: &str) -> Option<Handler> {
    COMMANDS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, handler)| *handler)
}

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn first_or<'a>(args: &[&'a str], default: &'a str) -> &'a str {
    args.first().copied().unwrap_or(default)
}

fn enabled(on: bool) -> &'static str {
    if on {
        "ENABLED"
    } else {
        "DISABLED"
    }
}

pub(super) fn boxed(title: &str, rows: &[String]) -> Vec<String> {
    let title = format!(" {title} ");
    let title_w = title.chars().count();
    let content_w = rows
        .iter()
        .map(|r| r.chars().count())
        .max()
        .unwrap_or(0)
        .max(title_w + 4);
    let span = content_w + 2;
    let left = (span - title_w) / 2;
    let right = span - title_w - left;

    let mut out = Vec::with_capacity(rows.len() + 2);
    out.push(format!("╭{}{}{}╮", "─".repeat(left), title, "─".repeat(right)));
    for r in rows {
        out.push(format!("│ {:<width$} │", r, width = content_w));
    }
    out.push(format!("╰{}╯", "─".repeat(span)));
    out
}

fn two_col(left: &str, right: &str) -> String {
    format!("{left:<34}│ {right}")
}

fn help(_args: &[&str], _ctx: &mut CommandContext<'_>) -> Vec<String> {
    let rows = [
        ("RECONNAISSANCE", "EXPLOITATION"),
        ("  nmap <target>     - Port scan", "  exploit <vuln>   - Run"),
        ("  whois <domain>    - Domain", "  payload <type>   - Gen"),
        ("  trace <ip>        - Tracert", "  crack <hash>     - Crack"),
        ("  enum <service>    - Enum", "  shell <target>   - Rev"),
        ("", ""),
        ("STEALTH & SECURITY", "SYSTEM CONTROL"),
        ("  stealth           - Toggle", "  status           - Stats"),
        ("  proxy <type>      - Proxy", "  monitor          - Watch"),
        ("  encrypt <data>    - Encrypt", "  matrix           - Mode"),
        ("  tunnel <target>   - SSH", "  hud              - HUD"),
        ("", ""),
        ("UTILITIES", "MONITORS"),
        ("  clear, cls        - Clear", "  system_monitor   - Show"),
        ("  exit, poweroff    - Exit", "  security_monitor - Show"),
        ("  settings          - Config", "  move_monitors    - Reset"),
        ("  history, echo     - Shell", "  theme [mode]     - Colors"),
        ("  social, contact   - Card", "  quit             - Quit"),
        ("", ""),
        ("DISPLAY OPTIONS", "KEYBOARD SHORTCUTS"),
        ("  toggle_fullscreen - Full", "  F11              - Full"),
        ("  toggle_ontop      - Top", "  ESC              - Exit"),
        ("  set_font <size>   - Font", "  Ctrl+L           - Clear"),
        ("  set_opacity <pct> - Alpha", "  Ctrl+T           - Theme"),
        ("  set_theme <name>  - Theme", "  ↑/↓              - History"),
    ];
    let rows: Vec<String> = rows.iter().map(|(l, r)| two_col(l, r)).collect();
    boxed("NEXUS COMMAND SUITE", &rows)
}

fn nmap(args: &[&str], ctx: &mut CommandContext<'_>) -> Vec<String> {
    let target = first_or(args, "192.168.1.1");
    ctx.display.scanning = true;
    ctx.timers.schedule_in(ctx.now, SCAN_DURATION, Deferred::EndScan);
    vec![
        format!("[NMAP] Scanning {target}..."),
        format!("[NMAP] Host discovery: {target} is UP"),
        "[NMAP] PORT     STATE    SERVICE    VERSION".to_string(),
        "[NMAP] 22/tcp   open     ssh        OpenSSH 8.9".to_string(),
        "[NMAP] 80/tcp   open     http       Apache 2.4.52".to_string(),
        "[NMAP] 443/tcp  open     https      Apache 2.4.52".to_string(),
        "[NMAP] 3306/tcp closed   mysql".to_string(),
        "[NMAP] 8080/tcp filtered http-proxy".to_string(),
        "[SUCCESS] Scan complete. 3 open ports detected.".to_string(),
    ]
}

fn whois(args: &[&str], _ctx: &mut CommandContext<'_>) -> Vec<String> {
    let domain = first_or(args, "nexus.local");
    vec![
        format!("[WHOIS] Querying registry for {domain}..."),
        "[WHOIS] Registrar:    ShadowNames Ltd.".to_string(),
        "[WHOIS] Created:      2019-06-13".to_string(),
        "[WHOIS] Name servers: ns1.blackice.net, ns2.blackice.net".to_string(),
        "[WHOIS] Registrant:   REDACTED FOR PRIVACY".to_string(),
        "[SUCCESS] WHOIS lookup complete.".to_string(),
    ]
}

fn trace(args: &[&str], ctx: &mut CommandContext<'_>) -> Vec<String> {
    let target = first_or(args, "8.8.8.8");
    const HOPS: [&str; 4] = ["10.0.0.1", "172.16.4.1", "84.116.130.2", "209.85.252.76"];
    let mut out = vec![format!("[TRACE] Tracing route to {target}, 30 hops max...")];
    let mut route: Vec<&str> = HOPS.to_vec();
    route.push(target);
    let mut latency = 0.0_f32;
    for (i, hop) in route.iter().enumerate() {
        latency += ctx.rng.random_range(0.4..12.0);
        out.push(format!("[TRACE] {:>2}  {:<16} {:>6.2} ms", i + 1, hop, latency));
    }
    out.push(format!("[SUCCESS] Trace complete. {} hops.", route.len()));
    out
}

fn enumerate(args: &[&str], _ctx: &mut CommandContext<'_>) -> Vec<String> {
    let service = first_or(args, "smb");
    vec![
        format!("[ENUM] Enumerating {service} on target..."),
        "[ENUM] Null session: ALLOWED".to_string(),
        "[ENUM] Users:  admin, guest, svc_backup".to_string(),
        "[ENUM] Shares: ADMIN$, C$, IPC$, backups".to_string(),
        "[ENUM] Password policy: min length 6, no lockout".to_string(),
        "[SUCCESS] Enumeration complete. 3 users, 4 shares.".to_string(),
    ]
}

fn exploit(args: &[&str], _ctx: &mut CommandContext<'_>) -> Vec<String> {
    let vuln = first_or(args, "CVE-2023-1337");
    vec![
        format!("[EXPLOIT] Loading exploit for {vuln}..."),
        "[EXPLOIT] Checking target compatibility...".to_string(),
        "[EXPLOIT] Payload generation: SUCCESS".to_string(),
        "[EXPLOIT] Buffer overflow detected".to_string(),
        "[EXPLOIT] Executing shellcode...".to_string(),
        "[SUCCESS] Exploit successful. Access granted.".to_string(),
    ]
}

fn payload(args: &[&str], _ctx: &mut CommandContext<'_>) -> Vec<String> {
    let kind = first_or(args, "reverse_shell");
    vec![
        format!("[PAYLOAD] Generating {kind} payload..."),
        "[PAYLOAD] Architecture: x64".to_string(),
        "[PAYLOAD] Encoding: shikata_ga_nai".to_string(),
        "[PAYLOAD] Size: 847 bytes".to_string(),
        "[PAYLOAD] Bad characters: None".to_string(),
        "[SUCCESS] Payload ready for deployment.".to_string(),
    ]
}

fn crack(args: &[&str], _ctx: &mut CommandContext<'_>) -> Vec<String> {
    let hash = first_or(args, "a1b2c3d4e5f6");
    vec![
        format!("[CRACK] Analyzing hash: {hash}"),
        "[CRACK] Hash type detected: MD5".to_string(),
        "[CRACK] Loading rainbow tables...".to_string(),
        "[CRACK] Dictionary attack: 15% complete".to_string(),
        "[CRACK] Dictionary attack: 67% complete".to_string(),
        "[CRACK] Dictionary attack: 100% complete".to_string(),
        "[SUCCESS] Hash cracked: password123".to_string(),
    ]
}

fn reverse_shell(args: &[&str], _ctx: &mut CommandContext<'_>) -> Vec<String> {
    let target = first_or(args, "10.0.0.5");
    vec![
        format!("[SHELL] Opening reverse shell to {target}:4444..."),
        "[SHELL] Listener bound on 0.0.0.0:4444".to_string(),
        format!("[SHELL] Connection received from {target}"),
        "[SHELL] Upgrading to interactive TTY...".to_string(),
        "[SUCCESS] Shell session 1 opened.".to_string(),
    ]
}

fn stealth(_args: &[&str], ctx: &mut CommandContext<'_>) -> Vec<String> {
    const MODES: [&str; 4] = ["ghost", "shadow", "phantom", "wraith"];
    let mode = MODES[ctx.rng.random_range(0..MODES.len())];
    vec![
        format!("[STEALTH] Activating {mode} mode..."),
        "[STEALTH] MAC address randomization: ENABLED".to_string(),
        "[STEALTH] Traffic obfuscation: ACTIVE".to_string(),
        "[STEALTH] Footprint elimination: COMPLETE".to_string(),
        "[SUCCESS] Stealth mode activated. You are invisible.".to_string(),
    ]
}

fn proxy(args: &[&str], _ctx: &mut CommandContext<'_>) -> Vec<String> {
    let kind = first_or(args, "socks5");
    vec![
        format!("[PROXY] Building {kind} proxy chain..."),
        "[PROXY] Hop 1: 185.220.101.4   (DE)".to_string(),
        "[PROXY] Hop 2: 51.15.43.205    (NL)".to_string(),
        "[PROXY] Hop 3: 104.244.76.13   (IS)".to_string(),
        "[SUCCESS] Proxy chain active. Exit node: 104.244.76.13".to_string(),
    ]
}

fn encrypt(args: &[&str], ctx: &mut CommandContext<'_>) -> Vec<String> {
    if args.is_empty() {
        return vec!["Usage: encrypt <data>".to_string()];
    }
    let data = args.join(" ");
    let mut hex = |bytes: usize| {
        let mut s = String::with_capacity(bytes * 2);
        for _ in 0..bytes {
            let _ = write!(s, "{:02x}", ctx.rng.random::<u8>());
        }
        s
    };
    let nonce = hex(12);
    let cipher = hex(data.len().clamp(8, 32));
    vec![
        format!("[ENCRYPT] Encrypting {} bytes with AES-256-GCM...", data.len()),
        format!("[ENCRYPT] Nonce: {nonce}"),
        format!("[ENCRYPT] Ciphertext: {cipher}"),
        "[SUCCESS] Data encrypted.".to_string(),
    ]
}

fn tunnel(args: &[&str], _ctx: &mut CommandContext<'_>) -> Vec<String> {
    let target = first_or(args, "target.darkweb.onion");
    vec![
        format!("[TUNNEL] Establishing secure tunnel to {target}..."),
        "[TUNNEL] Routing through 7 proxy layers...".to_string(),
        "[TUNNEL] Encryption: AES-256-GCM".to_string(),
        "[TUNNEL] Authentication: RSA-4096".to_string(),
        "[TUNNEL] Connection established".to_string(),
        "[SUCCESS] Secure tunnel active. Traffic encrypted.".to_string(),
    ]
}

fn status(_args: &[&str], _ctx: &mut CommandContext<'_>) -> Vec<String> {
    let rows = lines(&[
        "Security Level:   MAXIMUM",
        "Firewall:         ACTIVE & ADAPTIVE",
        "Encryption:       QUANTUM-RESISTANT",
        "Anonymity:        MAXIMUM (Tor/VPN)",
        "IDS/IPS:          NEURAL-ENHANCED",
        "Threat Level:     DEFCON 2",
        "Last Breach:      NEVER",
    ]);
    boxed("SYSTEM STATUS REPORT", &rows)
}

fn monitor(_args: &[&str], ctx: &mut CommandContext<'_>) -> Vec<String> {
    let s = ctx.stats;
    let up = s.uptime.as_secs();
    let rows = vec![
        format!("CPU Usage:        {:.1}%", s.cpu),
        format!("Memory:           {:.1}%", s.memory),
        format!("Network I/O:      {:.1} MB/s", s.network),
        format!("Active Conn:      {}", s.connections),
        format!("Threats Blocked:  {}", s.threats),
        format!("Uptime:           {}h {}m {}s", up / 3600, (up % 3600) / 60, up % 60),
    ];
    boxed("REAL-TIME SYSTEM MONITOR", &rows)
}

fn hud(_args: &[&str], ctx: &mut CommandContext<'_>) -> Vec<String> {
    ctx.display.hud = !ctx.display.hud;
    vec![format!("[HUD] Heads-up display {}", enabled(ctx.display.hud))]
}

fn matrix(_args: &[&str], ctx: &mut CommandContext<'_>) -> Vec<String> {
    ctx.display.matrix_mode = !ctx.display.matrix_mode;
    let state = if ctx.display.matrix_mode {
        "ACTIVATED"
    } else {
        "DEACTIVATED"
    };
    vec![format!("[MATRIX] Matrix mode {state}")]
}

fn system_monitor(_args: &[&str], ctx: &mut CommandContext<'_>) -> Vec<String> {
    ctx.display.system_monitor = !ctx.display.system_monitor;
    vec![format!(
        "[MONITOR] System monitor {}",
        enabled(ctx.display.system_monitor)
    )]
}

fn security_monitor(_args: &[&str], ctx: &mut CommandContext<'_>) -> Vec<String> {
    ctx.display.security_monitor = !ctx.display.security_monitor;
    vec![format!(
        "[MONITOR] Security monitor {}",
        enabled(ctx.display.security_monitor)
    )]
}

fn move_monitors(_args: &[&str], ctx: &mut CommandContext<'_>) -> Vec<String> {
    ctx.display.reset_monitor_positions();
    vec!["[MONITOR] Monitor positions reset to default".to_string()]
}

fn clear(_args: &[&str], ctx: &mut CommandContext<'_>) -> Vec<String> {
    ctx.clear_screen = true;
    Vec::new()
}

fn power_off(_args: &[&str], ctx: &mut CommandContext<'_>) -> Vec<String> {
    ctx.display.powering_down = true;
    ctx.timers
        .schedule_in(ctx.now, POWER_DOWN_DELAY, Deferred::Minimize);
    lines(&[
        "[SYSTEM] Initiating shutdown sequence...",
        "[SYSTEM] Closing secure connections...",
        "[SYSTEM] Erasing temporary files...",
        "[SYSTEM] Powering down...",
    ])
}

fn quit(_args: &[&str], ctx: &mut CommandContext<'_>) -> Vec<String> {
    ctx.effects.push(Effect::Quit);
    vec!["[SYSTEM] Terminating session...".to_string()]
}

fn whoami(_args: &[&str], _ctx: &mut CommandContext<'_>) -> Vec<String> {
    vec!["root@nexus:~# CLASSIFIED - SECURITY CLEARANCE REQUIRED".to_string()]
}

fn social(_args: &[&str], ctx: &mut CommandContext<'_>) -> Vec<String> {
    ctx.type_tagline = true;
    boxed("PROFILE", &card::card_rows())
}

fn echo(args: &[&str], _ctx: &mut CommandContext<'_>) -> Vec<String> {
    if args.is_empty() {
        return vec!["Usage: echo <message>".to_string()];
    }
    vec![args.join(" ")]
}

fn history(_args: &[&str], ctx: &mut CommandContext<'_>) -> Vec<String> {
    if ctx.history.is_empty() {
        return vec!["No commands in history".to_string()];
    }
    ctx.history
        .iter()
        .enumerate()
        .map(|(i, e)| format!("  {:>3}  {}", i + 1, e.input))
        .collect()
}

fn yes_no(on: bool) -> &'static str {
    if on {
        "YES"
    } else {
        "NO"
    }
}

fn settings(_args: &[&str], ctx: &mut CommandContext<'_>) -> Vec<String> {
    let s = &ctx.settings;
    let rows = vec![
        format!("Font Size:      {}px (set_font <size>)", s.font_size),
        format!(
            "Opacity:        {}% (set_opacity <50-100>)",
            (s.opacity * 100.0).round()
        ),
        format!("Theme:          {} (set_theme <theme>)", s.theme.as_str()),
        format!("Always On Top:  {} (toggle_ontop)", yes_no(s.always_on_top)),
        format!("Fullscreen:     {} (toggle_fullscreen)", yes_no(s.fullscreen)),
    ];
    boxed("TERMINAL SETTINGS", &rows)
}

fn set_font(args: &[&str], ctx: &mut CommandContext<'_>) -> Vec<String> {
    match first_or(args, "14").parse::<u8>() {
        Ok(size @ 8..=24) => {
            ctx.settings.font_size = size;
            vec![format!("[SETTINGS] Font size set to {size}px")]
        }
        _ => vec!["[ERROR] Font size must be between 8 and 24".to_string()],
    }
}

fn set_opacity(args: &[&str], ctx: &mut CommandContext<'_>) -> Vec<String> {
    match first_or(args, "95").parse::<u8>() {
        Ok(pct @ 50..=100) => {
            ctx.settings.opacity = f32::from(pct) / 100.0;
            vec![format!("[SETTINGS] Opacity set to {pct}%")]
        }
        _ => vec!["[ERROR] Opacity must be between 50 and 100".to_string()],
    }
}

fn set_theme(args: &[&str], ctx: &mut CommandContext<'_>) -> Vec<String> {
    match first_or(args, "auto").to_lowercase().parse::<TerminalTheme>() {
        Ok(theme) => {
            ctx.settings.theme = theme;
            vec![format!("[SETTINGS] Theme set to {}", theme.as_str())]
        }
        Err(()) => vec!["[ERROR] Theme must be auto, matrix, dark, or light".to_string()],
    }
}

fn toggle_ontop(_args: &[&str], ctx: &mut CommandContext<'_>) -> Vec<String> {
    ctx.settings.always_on_top = !ctx.settings.always_on_top;
    vec![format!(
        "[SETTINGS] Always on top: {}",
        enabled(ctx.settings.always_on_top)
    )]
}

fn toggle_fullscreen(_args: &[&str], ctx: &mut CommandContext<'_>) -> Vec<String> {
    ctx.settings.fullscreen = !ctx.settings.fullscreen;
    vec![format!(
        "[SETTINGS] Fullscreen mode: {}",
        enabled(ctx.settings.fullscreen)
    )]
}

fn reset(_args: &[&str], ctx: &mut CommandContext<'_>) -> Vec<String> {
    ctx.timers.schedule_in(ctx.now, REBOOT_DELAY, Deferred::Reboot);
    lines(&[
        "[SYSTEM] Initiating system reset...",
        "[SYSTEM] Restarting all services...",
        "[SYSTEM] Rebooting...",
        "",
    ])
}

fn date(_args: &[&str], _ctx: &mut CommandContext<'_>) -> Vec<String> {
    vec![format!(
        "Current Date: {}",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    )]
}

fn neural(args: &[&str], _ctx: &mut CommandContext<'_>) -> Vec<String> {
    let query = if args.is_empty() {
        "analyze".to_string()
    } else {
        args.join(" ")
    };
    vec![
        format!("[NEURAL] Processing: \"{query}\""),
        "[NEURAL] Quantum neural network: ACTIVE".to_string(),
        "[NEURAL] Deep learning analysis...".to_string(),
        "[NEURAL] Pattern recognition: 94.7% confidence".to_string(),
        "[NEURAL] Predictive modeling complete".to_string(),
        "[SUCCESS] Neural analysis suggests high probability of success.".to_string(),
    ]
}

fn quantum(args: &[&str], _ctx: &mut CommandContext<'_>) -> Vec<String> {
    let op = first_or(args, "decrypt");
    vec![
        format!("[QUANTUM] Initializing quantum {op} protocol..."),
        "[QUANTUM] Entanglement established".to_string(),
        "[QUANTUM] Superposition calibrated".to_string(),
        "[QUANTUM] Quantum tunneling active".to_string(),
        "[QUANTUM] Coherence maintained at 99.8%".to_string(),
        "[SUCCESS] Quantum operation completed in 0.001ms.".to_string(),
    ]
}

fn theme(args: &[&str], ctx: &mut CommandContext<'_>) -> Vec<String> {
    let Some(name) = args.first() else {
        ctx.effects.push(Effect::ToggleTheme);
        return vec!["[THEME] Toggling color theme".to_string()];
    };
    match name.to_lowercase().parse::<Theme>() {
        Ok(t) => {
            ctx.effects.push(Effect::SetTheme(t));
            vec![format!("[THEME] Color theme set to {t}")]
        }
        Err(_) => vec!["[ERROR] Theme must be dark or light".to_string()],
    }
}
