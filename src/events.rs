use std::path::PathBuf;

use crate::document::ElementId;

/// Keyboard keys the widget reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Enter,
    Space,
    Other(String),
}

impl Key {
    /// Map a DOM `key` value onto the keys the widget knows about.
    pub fn from_dom(key: &str) -> Self {
        match key {
            "ArrowLeft" => Self::ArrowLeft,
            "ArrowRight" => Self::ArrowRight,
            "Enter" => Self::Enter,
            " " | "Space" | "Spacebar" => Self::Space,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Platform signals delivered to the page.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Click(ElementId),
    KeyPress { target: ElementId, key: Key },
    /// Document-level key down, not scoped to any element.
    KeyDown(Key),
    TouchStart { target: ElementId, screen_x: f64 },
    TouchEnd { target: ElementId, screen_x: f64 },
    MouseEnter(ElementId),
    MouseLeave(ElementId),
    VisibilityChange { hidden: bool },
    Resize,
    /// Window-level script error.
    Error {
        filename: Option<String>,
        message: String,
    },
}

/// What a handler did with the event's default action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    DefaultPrevented,
    Passed,
}

/// Identifies a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Purpose of a scheduled timer, echoed back when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    /// Recurring auto-advance tick.
    AutoAdvance,
    /// Exit animation of the slide at `outgoing` has finished.
    TransitionEnd { outgoing: usize },
    /// Quiet period after a touch ended.
    TouchResume,
    /// Window stopped resizing.
    ResizeSettled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired {
    pub id: TimerId,
    pub timer: Timer,
}

/// Outcome of loading one slide's background image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageStatus {
    Loaded { width: u32, height: u32 },
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct ProbeImage {
    pub slide: usize,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ImageProbed {
    pub slide: usize,
    pub path: PathBuf,
    pub status: ImageStatus,
}
