// Copyright (c) 2026 rezky_nightky

use std::fmt;
use std::str::FromStr;

use tracing::{debug, info, warn};

use crate::storage::PreferenceStore;

pub const THEME_KEY: &str = "theme";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn toggled(self) -> Theme {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn from_prefers_dark(dark: bool) -> Theme {
        if dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(format!("unknown theme: {other} (expected dark or light)")),
        }
    }
}

pub trait AmbientSignal {
    fn prefers_dark(&self) -> bool;
}

impl<F: Fn() -> bool> AmbientSignal for F {
    fn prefers_dark(&self) -> bool {
        self()
    }
}

pub struct EnvAmbient;

impl AmbientSignal for EnvAmbient {
    fn prefers_dark(&self) -> bool {
        if let Ok(v) = std::env::var("NEXUSFOLIO_AMBIENT") {
            if let Ok(t) = v.parse::<Theme>() {
                return t == Theme::Dark;
            }
        }
        std::env::var("COLORFGBG")
            .ok()
            .and_then(|v| parse_colorfgbg(&v))
            .unwrap_or(true)
    }
}

pub fn parse_colorfgbg(v: &str) -> Option<bool> {
    let bg: u8 = v.rsplit(';').next()?.trim().parse().ok()?;
    match bg {
        0..=6 | 8 => Some(true),
        7 | 9..=15 => Some(false),
        _ => None,
    }
}

pub type SubscriptionId = u64;

type Subscriber = Box<dyn FnMut(Theme)>;

/// The single source of truth for the active theme.
///
/// Precedence on load: a persisted value, then the ambient signal. Ambient
/// changes only apply while no explicit choice has been persisted.
pub struct ThemeStore {
    theme: Theme,
    store: Box<dyn PreferenceStore>,
    /// Set by `set`/`toggle`, so ambient changes stay ignored even when
    /// persisting failed.
    chosen: bool,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_id: SubscriptionId,
}

impl ThemeStore {
    pub fn load(store: Box<dyn PreferenceStore>, ambient: &dyn AmbientSignal) -> Self {
        let persisted = store.get(THEME_KEY);
        let theme = match persisted.as_deref().map(str::parse::<Theme>) {
            Some(Ok(t)) => {
                debug!(theme = %t, "theme from stored preference");
                t
            }
            Some(Err(e)) => {
                warn!(error = %e, "ignoring stored theme");
                Theme::from_prefers_dark(ambient.prefers_dark())
            }
            None => {
                let t = Theme::from_prefers_dark(ambient.prefers_dark());
                debug!(theme = %t, "theme from ambient preference");
                t
            }
        };
        Self {
            theme,
            store,
            chosen: false,
            subscribers: Vec::new(),
            next_id: 1,
        }
    }

    pub fn get(&self) -> Theme {
        self.theme
    }

    pub fn has_explicit_preference(&self) -> bool {
        self.chosen
            || self
                .store
                .get(THEME_KEY)
                .is_some_and(|v| v.parse::<Theme>().is_ok())
    }

    pub fn set(&mut self, theme: Theme) {
        if let Err(e) = self.store.set(THEME_KEY, theme.as_str()) {
            warn!(error = %e, "failed to persist theme");
        }
        self.chosen = true;
        self.apply(theme);
    }

    pub fn toggle(&mut self) -> Theme {
        let next = self.theme.toggled();
        self.set(next);
        next
    }

    pub fn ambient_changed(&mut self, prefers_dark: bool) -> bool {
        if self.has_explicit_preference() {
            debug!("ambient theme change ignored, explicit preference stored");
            return false;
        }
        self.apply(Theme::from_prefers_dark(prefers_dark));
        true
    }

    fn apply(&mut self, theme: Theme) {
        if theme == self.theme {
            return;
        }
        info!(from = %self.theme, to = %theme, "theme changed");
        self.theme = theme;
        for (_, f) in &mut self.subscribers {
            f(theme);
        }
    }

    pub fn subscribe(&mut self, f: impl FnMut(Theme) + 'static) -> SubscriptionId {
        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.push((id, Box::new(f)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }
}
