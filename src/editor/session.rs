use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Saved,
    Saving,
    Unsaved,
}

impl SaveStatus {
    pub fn display(&self) -> &'static str {
        match self {
            SaveStatus::Saved => "Saved",
            SaveStatus::Saving => "Saving...",
            SaveStatus::Unsaved => "Unsaved",
        }
    }
}

/// Runs an action once events have stopped arriving for `window`
#[derive(Debug, Clone)]
pub struct Debounce {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Restart the quiet period from `now`
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True once, when the quiet period has elapsed
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

/// State that lives exactly as long as one editor session
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub hydrated: bool,
    pub debounce: Debounce,
    /// When the cosmetic "Saving..." turns into "Saved"
    pub saved_at: Option<Instant>,
    pub saved_delay: Duration,
}

impl SessionContext {
    pub fn new(debounce_window: Duration, saved_delay: Duration) -> Self {
        Self {
            hydrated: false,
            debounce: Debounce::new(debounce_window),
            saved_at: None,
            saved_delay,
        }
    }
}
