// Colored console logger. Each level writes its configured ANSI color
// code, the message and a reset code. Colors come from the configuration
// file; the palette below is the closed set of names a user can pick from.

use std::cell::RefCell;
use std::fmt::{self, Display};
use std::io::{self, Write};
use std::str::FromStr;

use crossterm::queue;
use crossterm::style::{Print, ResetColor};

use crate::config::LoggerColors;

/// ANSI sequence that restores the terminal's default style.
pub const RESET: &str = "\u{1b}[0m";

/// Log level, also the key of the matching color in the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl Level {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Capitalized name used in user-facing messages ("Info logger ...").
    pub const fn title(self) -> &'static str {
        match self {
            Self::Info => "Info",
            Self::Warn => "Warn",
            Self::Error => "Error",
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named colors accepted by `shortify logger --info/--warn/--error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Palette {
    Blue,
    Yellow,
    Red,
    Green,
    Magenta,
    Cyan,
    White,
    Reset,
    Black,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

impl Palette {
    /// Every palette entry, in the order `--colors` lists them.
    pub const ALL: [Self; 16] = [
        Self::Blue,
        Self::Yellow,
        Self::Red,
        Self::Green,
        Self::Magenta,
        Self::Cyan,
        Self::White,
        Self::Reset,
        Self::Black,
        Self::BrightRed,
        Self::BrightGreen,
        Self::BrightYellow,
        Self::BrightBlue,
        Self::BrightMagenta,
        Self::BrightCyan,
        Self::BrightWhite,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Blue => "blue",
            Self::Yellow => "yellow",
            Self::Red => "red",
            Self::Green => "green",
            Self::Magenta => "magenta",
            Self::Cyan => "cyan",
            Self::White => "white",
            Self::Reset => "reset",
            Self::Black => "black",
            Self::BrightRed => "brightRed",
            Self::BrightGreen => "brightGreen",
            Self::BrightYellow => "brightYellow",
            Self::BrightBlue => "brightBlue",
            Self::BrightMagenta => "brightMagenta",
            Self::BrightCyan => "brightCyan",
            Self::BrightWhite => "brightWhite",
        }
    }

    pub const fn ansi_code(self) -> &'static str {
        match self {
            Self::Blue => "\u{1b}[34m",
            Self::Yellow => "\u{1b}[33m",
            Self::Red => "\u{1b}[31m",
            Self::Green => "\u{1b}[32m",
            Self::Magenta => "\u{1b}[35m",
            Self::Cyan => "\u{1b}[36m",
            Self::White => "\u{1b}[37m",
            Self::Reset => RESET,
            Self::Black => "\u{1b}[30m",
            Self::BrightRed => "\u{1b}[91m",
            Self::BrightGreen => "\u{1b}[92m",
            Self::BrightYellow => "\u{1b}[93m",
            Self::BrightBlue => "\u{1b}[94m",
            Self::BrightMagenta => "\u{1b}[95m",
            Self::BrightCyan => "\u{1b}[96m",
            Self::BrightWhite => "\u{1b}[97m",
        }
    }
}

/// Returned when a color name is not part of the palette.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown color '{0}'")]
pub struct UnknownColor(pub String);

impl FromStr for Palette {
    type Err = UnknownColor;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|color| color.name() == name)
            .ok_or_else(|| UnknownColor(name.to_string()))
    }
}

/// Leveled console output. `info` goes to stdout, `warn` and `error` to
/// stderr. Every call returns the logger so lines can be chained.
pub struct Logger {
    colors: LoggerColors,
    stdout: RefCell<Box<dyn Write>>,
    stderr: RefCell<Box<dyn Write>>,
}

impl Logger {
    /// Logger writing to the process's standard streams.
    pub fn new(colors: LoggerColors) -> Self {
        Self::with_writers(colors, Box::new(io::stdout()), Box::new(io::stderr()))
    }

    pub fn with_writers(
        colors: LoggerColors,
        stdout: Box<dyn Write>,
        stderr: Box<dyn Write>,
    ) -> Self {
        Self {
            colors,
            stdout: RefCell::new(stdout),
            stderr: RefCell::new(stderr),
        }
    }

    pub fn colors(&self) -> &LoggerColors {
        &self.colors
    }

    pub fn info(&self, message: impl Display) -> &Self {
        self.line(Level::Info, &[&message])
    }

    pub fn warn(&self, message: impl Display) -> &Self {
        self.line(Level::Warn, &[&message])
    }

    pub fn error(&self, message: impl Display) -> &Self {
        self.line(Level::Error, &[&message])
    }

    /// Write one line made of `parts` joined by single spaces.
    pub fn line(&self, level: Level, parts: &[&dyn Display]) -> &Self {
        let message = parts
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        let color = self.colors.get(level);

        let mut writer = match level {
            Level::Info => self.stdout.borrow_mut(),
            Level::Warn | Level::Error => self.stderr.borrow_mut(),
        };
        let written = queue!(writer, Print(color), Print(message), ResetColor, Print("\n"))
            .and_then(|()| writer.flush());
        if let Err(err) = written {
            tracing::debug!(error = %err, level = %level, "failed to write log line");
        }
        self
    }
}


#[cfg(test)]
mod tests {
    use super::testing::capture_logger;
    use super::*;

    #[test]
    fn info_goes_to_stdout_with_color_and_reset() {
        let (logger, out, err) = capture_logger();
        logger.info("hello");
        assert_eq!(out.contents(), "\u{1b}[34mhello\u{1b}[0m\n");
        assert!(err.contents().is_empty());
    }

    #[test]
    fn warn_and_error_go_to_stderr() {
        let (logger, out, err) = capture_logger();
        logger.warn("careful").error("broken");
        assert!(out.contents().is_empty());
        assert_eq!(
            err.contents(),
            "\u{1b}[33mcareful\u{1b}[0m\n\u{1b}[31mbroken\u{1b}[0m\n"
        );
    }

    #[test]
    fn line_joins_parts_with_spaces() {
        let (logger, out, _) = capture_logger();
        logger.line(Level::Info, &[&"Configuration:", &42]);
        assert_eq!(out.contents(), "\u{1b}[34mConfiguration: 42\u{1b}[0m\n");
    }

    #[test]
    fn palette_lookup_is_exact() {
        assert_eq!("brightCyan".parse::<Palette>(), Ok(Palette::BrightCyan));
        assert_eq!("green".parse::<Palette>(), Ok(Palette::Green));
        assert_eq!(
            "Green".parse::<Palette>(),
            Err(UnknownColor("Green".to_string()))
        );
        assert!("not-a-color".parse::<Palette>().is_err());
    }

    #[test]
    fn palette_names_are_unique() {
        for (idx, color) in Palette::ALL.iter().enumerate() {
            assert!(
                Palette::ALL[idx + 1..]
                    .iter()
                    .all(|other| other.name() != color.name())
            );
        }
    }
}
