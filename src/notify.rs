use std::time::{Duration, Instant};

/// How long form and delete results stay on screen.
pub const FORM_TTL: Duration = Duration::from_secs(4);
/// Bulk import results linger a little longer.
pub const IMPORT_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Flash {
    pub kind: FlashKind,
    pub text: String,
    expires_at: Instant,
}

impl Flash {
    pub fn new(kind: FlashKind, text: impl Into<String>, ttl: Duration, now: Instant) -> Self {
        Self {
            kind,
            text: text.into(),
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Holds at most one transient message; a new one replaces the old.
#[derive(Debug, Default)]
pub struct Notifier {
    current: Option<Flash>,
}

impl Notifier {
    pub fn success(&mut self, text: impl Into<String>, ttl: Duration) {
        self.show(Flash::new(FlashKind::Success, text, ttl, Instant::now()));
    }

    pub fn error(&mut self, text: impl Into<String>, ttl: Duration) {
        self.show(Flash::new(FlashKind::Error, text, ttl, Instant::now()));
    }

    fn show(&mut self, flash: Flash) {
        self.current = Some(flash);
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Drops the message once it has expired.
    pub fn tick(&mut self, now: Instant) {
        if self.current.as_ref().is_some_and(|f| f.is_expired(now)) {
            self.current = None;
        }
    }

    pub fn current(&self) -> Option<&Flash> {
        self.current.as_ref()
    }
}
