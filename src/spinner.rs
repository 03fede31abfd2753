//! Loading spinner shown in the option popover while a page is in flight.
//!
//! Each [`Model`] gets a unique id. Tick messages carry that id and a tag, so
//! several spinners can run in one program without advancing each other and a
//! stale tick chain never speeds an animation up.

use bubbletea_rs::{tick as bubbletea_tick, Cmd, Msg};
use lipgloss_extras::prelude::*;
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

static LAST_ID: AtomicI64 = AtomicI64::new(0);

fn next_id() -> i64 {
    LAST_ID.fetch_add(1, Ordering::SeqCst) + 1
}

/// Animation frames and the delay between them.
#[derive(Debug, Clone)]
pub struct Spinner {
    /// Animation frames to cycle through.
    pub frames: Vec<String>,
    /// Delay between frames; smaller is faster.
    pub fps: Duration,
}

impl Spinner {
    /// Creates a spinner from frames and a frame delay.
    pub fn new(frames: Vec<String>, fps: Duration) -> Self {
        Self { frames, fps }
    }
}

fn frames(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// `| / - \`
pub static LINE: Lazy<Spinner> = Lazy::new(|| Spinner {
    frames: frames(&["|", "/", "-", "\\"]),
    fps: Duration::from_millis(100),
});

/// Braille dots.
pub static DOT: Lazy<Spinner> = Lazy::new(|| Spinner {
    frames: frames(&["⣾ ", "⣽ ", "⣻ ", "⢿ ", "⡿ ", "⣟ ", "⣯ ", "⣷ "]),
    fps: Duration::from_millis(100),
});

/// Compact braille dots.
pub static MINI_DOT: Lazy<Spinner> = Lazy::new(|| Spinner {
    frames: frames(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    fps: Duration::from_millis(83),
});

/// Tick message addressed to one spinner.
#[derive(Debug, Clone)]
pub struct TickMsg {
    /// Id of the spinner this tick belongs to.
    pub id: i64,
    tag: i64,
}

/// Spinner state and view.
#[derive(Debug, Clone)]
pub struct Model {
    /// Frames and timing.
    pub spinner: Spinner,
    /// Style applied to the current frame.
    pub style: Style,
    frame: usize,
    id: i64,
    tag: i64,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    /// A [`MINI_DOT`] spinner with a fresh id.
    pub fn new() -> Self {
        Self {
            spinner: MINI_DOT.clone(),
            style: Style::new(),
            frame: 0,
            id: next_id(),
            tag: 0,
        }
    }

    /// Sets the frames and timing (builder).
    pub fn with_spinner(mut self, spinner: Spinner) -> Self {
        self.spinner = spinner;
        self.frame = 0;
        self
    }

    /// Sets the style (builder).
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Unique id of this spinner.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// A tick for the current frame, delivered immediately.
    pub fn tick_msg(&self) -> TickMsg {
        TickMsg {
            id: self.id,
            tag: self.tag,
        }
    }

    /// Starts (or continues) the animation after one frame delay.
    pub fn tick(&self) -> Cmd {
        let id = self.id;
        let tag = self.tag;
        bubbletea_tick(self.spinner.fps, move |_| Box::new(TickMsg { id, tag }) as Msg)
    }

    /// Advances one frame on a tick addressed to this spinner and schedules
    /// the next one. Other messages are ignored.
    pub fn update(&mut self, msg: &Msg) -> Option<Cmd> {
        let tick = msg.downcast_ref::<TickMsg>()?;
        if tick.id != self.id || tick.tag != self.tag {
            return None;
        }
        self.frame = (self.frame + 1) % self.spinner.frames.len().max(1);
        self.tag += 1;
        Some(self.tick())
    }

    /// The current frame, styled.
    pub fn view(&self) -> String {
        match self.spinner.frames.get(self.frame) {
            Some(frame) => self.style.render(frame),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deliver(spinner: &mut Model, tick: TickMsg) -> Option<Cmd> {
        let msg: Msg = Box::new(tick);
        spinner.update(&msg)
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Model::new();
        let b = Model::new();
        assert_ne!(a.id(), b.id());
        assert!(a.id() > 0);
    }

    #[test]
    fn test_frames_advance_and_wrap() {
        let mut spinner = Model::new().with_spinner(LINE.clone());
        let mut seen = Vec::new();
        for _ in 0..5 {
            seen.push(strip_ansi_escapes::strip_str(spinner.view()));
            let tick = spinner.tick_msg();
            assert!(deliver(&mut spinner, tick).is_some());
        }
        assert_eq!(seen, vec!["|", "/", "-", "\\", "|"]);
    }

    #[test]
    fn test_foreign_and_stale_ticks_are_ignored() {
        let mut spinner = Model::new().with_spinner(LINE.clone());
        let other = Model::new();
        assert!(deliver(&mut spinner, other.tick_msg()).is_none());

        let stale = spinner.tick_msg();
        assert!(deliver(&mut spinner, stale.clone()).is_some());
        assert!(deliver(&mut spinner, stale).is_none());
        assert_eq!(strip_ansi_escapes::strip_str(spinner.view()), "/");
    }

    #[test]
    fn test_other_messages_pass_through() {
        let mut spinner = Model::new();
        let msg: Msg = Box::new(42_u8);
        assert!(spinner.update(&msg).is_none());
    }
}
