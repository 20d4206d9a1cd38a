use std::collections::VecDeque;
use std::time::{Duration, Instant};

const DEFAULT_DURATION: Duration = Duration::from_secs(3);
const ERROR_DURATION: Duration = Duration::from_secs(5);
const MAX_VISIBLE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastType {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub toast_type: ToastType,
    created_at: Instant,
    duration: Duration,
}

impl Toast {
    fn new(message: String, toast_type: ToastType) -> Self {
        // Errors linger so they can be read
        let duration = match toast_type {
            ToastType::Error => ERROR_DURATION,
            _ => DEFAULT_DURATION,
        };
        Self {
            message,
            toast_type,
            created_at: Instant::now(),
            duration,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) >= self.duration
    }
}

/// Short-lived notifications, oldest first.
#[derive(Debug, Default)]
pub struct ToastManager {
    queue: VecDeque<Toast>,
}

impl ToastManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>, toast_type: ToastType) {
        self.queue.push_back(Toast::new(message.into(), toast_type));
        while self.queue.len() > MAX_VISIBLE {
            self.queue.pop_front();
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(message, ToastType::Info);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(message, ToastType::Success);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(message, ToastType::Error);
    }

    /// Drop expired toasts. Returns true if any were removed.
    pub fn update(&mut self) -> bool {
        let before = self.queue.len();
        let now = Instant::now();
        self.queue.retain(|toast| !toast.is_expired(now));
        self.queue.len() != before
    }

    pub fn visible_toasts(&self) -> Vec<&Toast> {
        self.queue.iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
