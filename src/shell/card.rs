// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

pub const PROFILE_NAME: &str = "BINAR";
pub const CONTACT_EMAIL: &str = "binarrbinar1@gmail.com";

pub const LINKS: &[(&str, &str)] = &[
    ("@github", "https://github.com/itz-binar"),
    ("@youtube", "https://www.youtube.com/@Binar_tech"),
    ("@tiktok", "https://www.tiktok.com/@itz._.binar"),
    ("@telegram", "https://t.me/itz_binar01"),
];

pub const TAGLINES: &[(&str, Duration)] = &[
    (
        "Security researcher & digital explorer",
        Duration::from_millis(60),
    ),
    ("Exploring the digital frontier", Duration::from_millis(40)),
];

pub fn card_rows() -> Vec<String> {
    let mut rows = vec![PROFILE_NAME.to_string(), String::new()];
    for (handle, url) in LINKS {
        rows.push(format!("{handle:<10} {url}"));
    }
    rows.push(String::new());
    rows.push(format!("{:<10} {CONTACT_EMAIL}", "@mail"));
    rows
}

#[derive(Clone, Debug)]
pub struct Typewriter {
    text: &'static str,
    len: usize,
    shown: usize,
    interval: Duration,
    next_due: Instant,
}

impl Typewriter {
    pub fn start(text: &'static str, interval: Duration, now: Instant) -> Self {
        Self {
            text,
            len: text.chars().count(),
            shown: 0,
            interval,
            next_due: now + interval,
        }
    }

    pub fn poll(&mut self, now: Instant) -> bool {
        let before = self.shown;
        while self.shown < self.len && now >= self.next_due {
            self.shown += 1;
            self.next_due += self.interval;
        }
        self.shown != before
    }

    pub fn visible(&self) -> &'static str {
        match self.text.char_indices().nth(self.shown) {
            Some((i, _)) => &self.text[..i],
            None => self.text,
        }
    }

    pub fn is_done(&self) -> bool {
        self.shown >= self.len
    }
}

/// Types the taglines in order. Finished lines are handed back from `poll`;
/// the line in progress is only visible through `typing`.
#[derive(Clone, Debug)]
pub struct TaglinePlayback {
    index: usize,
    current: Typewriter,
}

impl TaglinePlayback {
    pub fn start(now: Instant) -> Self {
        let (text, interval) = TAGLINES[0];
        Self {
            index: 0,
            current: Typewriter::start(text, interval, now),
        }
    }

    pub fn is_done(&self) -> bool {
        self.index >= TAGLINES.len()
    }

    pub fn typing(&self) -> &'static str {
        if self.is_done() {
            ""
        } else {
            self.current.visible()
        }
    }

    pub fn poll(&mut self, now: Instant) -> (Vec<&'static str>, bool) {
        let mut finished = Vec::new();
        let mut changed = false;
        while !self.is_done() {
            changed |= self.current.poll(now);
            if !self.current.is_done() {
                break;
            }
            finished.push(self.current.text);
            self.index += 1;
            if let Some(&(text, interval)) = TAGLINES.get(self.index) {
                // The next line starts one of its own intervals after the last char.
                let from = self.current.next_due - self.current.interval;
                self.current = Typewriter::start(text, interval, from);
            }
        }
        let changed = changed || !finished.is_empty();
        (finished, changed)
    }

    pub fn remaining(&self) -> Vec<&'static str> {
        TAGLINES
            .iter()
            .skip(self.index)
            .map(|(text, _)| *text)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typewriter_reveals_one_char_per_interval() {
        let t0 = Instant::now();
        let step = Duration::from_millis(80);
        let mut tw = Typewriter::start("héllo", step, t0);
        assert!(!tw.poll(t0));
        assert_eq!(tw.visible(), "");
        assert!(tw.poll(t0 + step * 2));
        assert_eq!(tw.visible(), "hé");
        assert!(!tw.poll(t0 + step * 2));
        tw.poll(t0 + step * 50);
        assert_eq!(tw.visible(), "héllo");
        assert!(tw.is_done());
    }

    #[test]
    fn taglines_type_in_order() {
        let t0 = Instant::now();
        let mut tl = TaglinePlayback::start(t0);
        let (first, first_step) = TAGLINES[0];

        let (done, changed) = tl.poll(t0 + first_step * 3);
        assert!(done.is_empty());
        assert!(changed);
        assert_eq!(tl.typing(), &first[..3]);

        let first_end = t0 + first_step * first.chars().count() as u32;
        let (done, _) = tl.poll(first_end);
        assert_eq!(done, vec![first]);
        assert_eq!(tl.typing(), "");
        assert_eq!(tl.remaining(), vec![TAGLINES[1].0]);

        let (done, _) = tl.poll(first_end + Duration::from_secs(60));
        assert_eq!(done, vec![TAGLINES[1].0]);
        assert!(tl.is_done());
        assert!(tl.remaining().is_empty());
    }

    #[test]
    fn card_lists_every_link_and_the_mail() {
        let rows = card_rows();
        assert_eq!(rows[0], PROFILE_NAME);
        for (_, url) in LINKS {
            assert!(rows.iter().any(|r| r.ends_with(url)));
        }
        assert!(rows.iter().any(|r| r.ends_with(CONTACT_EMAIL)));
    }
}
