use std::sync::atomic::{AtomicUsize, Ordering};

/// A coherent set of request headers mimicking one real browser. Rotating
/// whole profiles (instead of lone user-agent strings) keeps the header
/// combination plausible to the source's blocking heuristics.
pub(crate) struct BrowserProfile {
    pub user_agent: &'static str,
    pub accept: &'static str,
    pub accept_language: &'static str,
    pub referer: &'static str,
}

pub(crate) const PROFILES: [BrowserProfile; 5] = [
    // Chrome on Windows 10
    BrowserProfile {
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
        accept_language: "uk-UA,uk;q=0.9,en-US;q=0.8,en;q=0.7",
        referer: "https://www.google.com.ua/",
    },
    // Firefox on Windows 10
    BrowserProfile {
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
        accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        accept_language: "uk-UA,uk;q=0.8,en-US;q=0.5,en;q=0.3",
        referer: "https://www.google.com.ua/",
    },
    // Edge on Windows 11
    BrowserProfile {
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0",
        accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8",
        accept_language: "uk,en-US;q=0.9,en;q=0.8",
        referer: "https://www.bing.com/",
    },
    // Chrome on Android
    BrowserProfile {
        user_agent: "Mozilla/5.0 (Linux; Android 13; SM-S918B) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.6099.144 Mobile Safari/537.36",
        accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
        accept_language: "uk-UA,uk;q=0.9,en;q=0.8",
        referer: "https://www.google.com/",
    },
    // Safari on macOS
    BrowserProfile {
        user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_2) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
        accept: "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        accept_language: "uk-UA,uk;q=0.9",
        referer: "https://www.google.com.ua/",
    },
];

/// Hands out profiles so that two consecutive attempts never share one.
/// Rotation is an anti-blocking heuristic only; a single-profile pool
/// would still be correct.
pub(crate) struct ProfileRotation {
    cursor: AtomicUsize,
}

impl ProfileRotation {
    pub(crate) fn new() -> Self {
        Self {
            cursor: AtomicUsize::new(0),
        }
    }

    pub(crate) fn next_profile(&self) -> &'static BrowserProfile {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % PROFILES.len();
        &PROFILES[index]
    }
}
