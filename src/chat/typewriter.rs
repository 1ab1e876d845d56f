//! Character-by-character text reveal.

pub const DEFAULT_CHAR_DELAY_MS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Typewriter {
    chars: Vec<char>,
    shown: usize,
    started_ms: u64,
    char_delay_ms: u64,
    finished: bool,
}

impl Typewriter {
    /// Start revealing `text` at `now_ms`. The first character shows at once.
    pub fn start(text: &str, now_ms: u64, char_delay_ms: u64) -> Self {
        Self {
            chars: text.chars().collect(),
            shown: 0,
            started_ms: now_ms,
            char_delay_ms: char_delay_ms.max(1),
            finished: false,
        }
    }

    /// Reveal the characters due at `now_ms`.
    ///
    /// Returns true exactly once: on the tick the reveal completes.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        if self.finished {
            return false;
        }
        let elapsed = now_ms.saturating_sub(self.started_ms);
        let due = (elapsed / self.char_delay_ms + 1) as usize;
        self.shown = due.min(self.chars.len());

        // completion lands one delay after the last character
        let done_at = self.chars.len() as u64 * self.char_delay_ms;
        if elapsed >= done_at {
            self.finished = true;
            return true;
        }
        false
    }

    /// Text revealed so far.
    pub fn visible(&self) -> String {
        self.chars[..self.shown].iter().collect()
    }

    pub fn full_text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
