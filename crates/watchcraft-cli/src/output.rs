use clap::ValueEnum;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use owo_colors::OwoColorize;
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    #[value(name = "json-pretty")]
    JsonPretty,
}

pub struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    pub fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        self.message("success", msg.as_ref(), |m| println!("{} {}", "✓".green(), m));
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        self.message("info", msg.as_ref(), |m| println!("{}", m));
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        self.message("warning", msg.as_ref(), |m| println!("{} {}", "⚠".yellow(), m));
    }

    /// Print a table in human mode; ignored in JSON modes
    pub fn table(&self, table: &Table) {
        if self.quiet || !self.is_human() {
            return;
        }
        println!("{}", table);
    }

    /// Print structured data in JSON modes; ignored in human mode
    pub fn json(&self, data: &serde_json::Value) {
        if self.quiet || self.is_human() {
            return;
        }
        self.print_json(data);
    }

    fn message(&self, kind: &str, msg: &str, human: impl FnOnce(&str)) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Human => human(msg),
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({ "type": kind, "message": msg }));
            }
        }
    }

    fn print_json(&self, data: &serde_json::Value) {
        match self.format {
            OutputFormat::JsonPretty => {
                println!("{}", serde_json::to_string_pretty(data).unwrap_or_default());
            }
            OutputFormat::Json | OutputFormat::Human => {
                println!("{}", serde_json::to_string(data).unwrap_or_default());
            }
        }
    }
}

/// Empty table with the rounded UTF-8 look used everywhere in the CLI
pub fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.apply_modifier(UTF8_ROUND_CORNERS);
    table
}
