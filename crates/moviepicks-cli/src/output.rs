use clap::ValueEnum;
use owo_colors::OwoColorize;
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    #[value(name = "json-pretty")]
    JsonPretty,
}

#[derive(Debug, Clone, Copy)]
enum Level {
    Success,
    Info,
    Warning,
}

impl Level {
    fn as_str(&self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Info => "info",
            Level::Warning => "warning",
        }
    }
}

/// User-facing output on stdout; logs go to stderr or the log file.
pub struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        self.emit(Level::Success, msg.as_ref());
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        self.emit(Level::Info, msg.as_ref());
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        self.emit(Level::Warning, msg.as_ref());
    }

    /// Unadorned line (blank lines and the rendered report in human mode)
    pub fn println(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Human => println!("{}", msg.as_ref()),
            OutputFormat::Json | OutputFormat::JsonPretty => self.emit(Level::Info, msg.as_ref()),
        }
    }

    pub fn json(&self, data: &serde_json::Value) {
        if self.quiet && self.format != OutputFormat::Human {
            return;
        }
        self.print_json(data);
    }

    fn emit(&self, level: Level, msg: &str) {
        if self.quiet {
            return;
        }

        match self.format {
            OutputFormat::Human => match level {
                Level::Success => println!("{} {}", "✓".green(), msg),
                Level::Info => println!("{}", msg),
                Level::Warning => println!("{} {}", "⚠".yellow(), msg),
            },
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({
                    "type": level.as_str(),
                    "message": msg,
                }));
            }
        }
    }

    fn print_json(&self, data: &serde_json::Value) {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string(data).unwrap_or_default()),
            OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(data).unwrap_or_default()),
            OutputFormat::Human => println!("{}", data),
        }
    }
}
