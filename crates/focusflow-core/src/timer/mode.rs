use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which kind of interval is on the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    Work,
    ShortBreak,
    LongBreak,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Work, Mode::ShortBreak, Mode::LongBreak];

    pub fn label(self) -> &'static str {
        match self {
            Mode::Work => "Focus Time",
            Mode::ShortBreak => "Short Break",
            Mode::LongBreak => "Long Break",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mode::Work => "work",
            Mode::ShortBreak => "short-break",
            Mode::LongBreak => "long-break",
        };
        f.write_str(s)
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "work" | "focus" => Ok(Mode::Work),
            "short-break" | "short" => Ok(Mode::ShortBreak),
            "long-break" | "long" => Ok(Mode::LongBreak),
            other => Err(format!(
                "unknown mode '{other}' (expected work, short-break or long-break)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    /// Not counting; remaining time holds the full duration of the mode.
    Idle,
    /// Counting down toward a wall-clock deadline.
    Running,
    /// Halted with the remaining time frozen.
    Paused,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cli_spellings() {
        assert_eq!("work".parse::<Mode>().unwrap(), Mode::Work);
        assert_eq!("SHORT_BREAK".parse::<Mode>().unwrap(), Mode::ShortBreak);
        assert_eq!("long-break".parse::<Mode>().unwrap(), Mode::LongBreak);
        assert!("lunch".parse::<Mode>().is_err());
    }

    #[test]
    fn display_parses_back() {
        for mode in Mode::ALL {
            assert_eq!(mode.to_string().parse::<Mode>().unwrap(), mode);
        }
    }

    #[test]
    fn serializes_in_storage_spelling() {
        assert_eq!(
            serde_json::to_string(&Mode::ShortBreak).unwrap(),
            "\"SHORT_BREAK\""
        );
        assert_eq!(serde_json::to_string(&RunState::Paused).unwrap(), "\"paused\"");
    }
}
