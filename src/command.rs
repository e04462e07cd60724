//! Line-oriented commands that stand in for a user at the page.

use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail, ensure};

use crate::events::Key;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Click the next button (arrow key when the markup has no buttons).
    Next,
    /// Click the previous button (arrow key when the markup has no buttons).
    Prev,
    /// Click the indicator at a zero-based position.
    Go(usize),
    /// Press Enter on the indicator at a zero-based position.
    Activate(usize),
    /// Document-level key down.
    Key(Key),
    /// Touch the container at `from` and lift off at `to`.
    Swipe { from: f64, to: f64 },
    Hover,
    Leave,
    Hide,
    Show,
    Resize,
    /// Report an error raised by a script file.
    Fail { filename: String, message: String },
    Status,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let verb = words.next().ok_or_else(|| anyhow!("empty command"))?;
        let command = match verb.to_ascii_lowercase().as_str() {
            "next" | "n" => Self::Next,
            "prev" | "p" => Self::Prev,
            "go" | "g" => Self::Go(index_arg(words.next(), verb)?),
            "activate" | "a" => Self::Activate(index_arg(words.next(), verb)?),
            "left" => Self::Key(Key::ArrowLeft),
            "right" => Self::Key(Key::ArrowRight),
            "key" => {
                let key = words.next().ok_or_else(|| anyhow!("key needs a key name"))?;
                Self::Key(Key::from_dom(key))
            }
            "swipe" => {
                let from = coord_arg(words.next(), "from")?;
                let to = coord_arg(words.next(), "to")?;
                Self::Swipe { from, to }
            }
            "hover" => Self::Hover,
            "leave" => Self::Leave,
            "hide" => Self::Hide,
            "show" => Self::Show,
            "resize" => Self::Resize,
            "error" => {
                let filename = words
                    .next()
                    .ok_or_else(|| anyhow!("error needs a filename"))?
                    .to_string();
                let message = words.collect::<Vec<_>>().join(" ");
                Self::Fail { filename, message }
            }
            "status" | "s" => Self::Status,
            "quit" | "q" | "exit" => Self::Quit,
            other => bail!("unknown command: {other}"),
        };
        Ok(command)
    }
}

fn index_arg(raw: Option<&str>, verb: &str) -> Result<usize> {
    let raw = raw.ok_or_else(|| anyhow!("{verb} needs a slide index"))?;
    raw.parse()
        .with_context(|| format!("invalid slide index {raw:?}"))
}

fn coord_arg(raw: Option<&str>, name: &str) -> Result<f64> {
    let raw = raw.ok_or_else(|| anyhow!("swipe needs a {name} coordinate"))?;
    let value: f64 = raw
        .parse()
        .with_context(|| format!("invalid {name} coordinate {raw:?}"))?;
    ensure!(value.is_finite(), "{name} coordinate must be finite, got {raw:?}");
    Ok(value)
}
