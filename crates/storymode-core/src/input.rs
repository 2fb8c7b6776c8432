use serde::{Deserialize, Serialize};

use crate::grid::Direction;

/// A discrete player action, already decoded from the host's input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Move(Direction),
    TogglePause,
    Fire,
    /// Pointer tap on the option at this index.
    Select(usize),
    Hint,
    TryAgain,
}

impl Command {
    /// Map a keyboard key name (DOM `KeyboardEvent.key` style) to a command.
    pub fn from_key(key: &str) -> Option<Command> {
        let command = match key {
            "ArrowLeft" | "a" | "A" => Command::Move(Direction::Left),
            "ArrowRight" | "d" | "D" => Command::Move(Direction::Right),
            "ArrowUp" | "w" | "W" => Command::Move(Direction::Up),
            "ArrowDown" | "s" | "S" => Command::Move(Direction::Down),
            "p" | "P" | "Escape" => Command::TogglePause,
            " " | "Space" | "Spacebar" => Command::Fire,
            "h" | "H" => Command::Hint,
            "Enter" => Command::TryAgain,
            _ => return None,
        };
        Some(command)
    }
}

/// Intent accumulated between ticks.
///
/// Movement keeps the latest direction, one-shot actions stay set until the
/// tick consumes them. A selection made after another replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub direction: Option<Direction>,
    pub fire: bool,
    pub select: Option<usize>,
    pub hint: bool,
    pub toggle_pause: bool,
    pub try_again: bool,
}

impl Intent {
    pub fn record(&mut self, command: Command) {
        match command {
            Command::Move(d) => self.direction = Some(d),
            Command::Fire => self.fire = true,
            Command::Select(i) => self.select = Some(i),
            Command::Hint => self.hint = true,
            // Two toggles in one frame cancel out.
            Command::TogglePause => self.toggle_pause = !self.toggle_pause,
            Command::TryAgain => self.try_again = true,
        }
        tracing::debug!(?command, "Intent recorded");
    }

    /// Hand the pending intent to the tick and start fresh.
    pub fn take(&mut self) -> Intent {
        std::mem::take(self)
    }

    pub fn is_empty(&self) -> bool {
        *self == Intent::default()
    }
}
