//! Printers: plain/colored text and outcome rendering.

use owo_colors::OwoColorize;

use scriptrun::{ExecutionOutcome, ExecutionStatus};

pub struct TextPrinter {
    pub color: Option<&'static str>,
    /// stderr is colored independently of stdout.
    pub stderr_color: bool,
}

impl TextPrinter {
    /// Colors each stream only when it is a terminal.
    pub fn for_terminal(color: Option<String>) -> Self {
        use is_terminal::IsTerminal;
        let stderr_color = std::io::stderr().is_terminal();
        if !std::io::stdout().is_terminal() {
            return Self {
                color: None,
                stderr_color,
            };
        }
        let color = match color.as_deref() {
            Some("green") => Some("green"),
            Some("cyan") => Some("cyan"),
            Some("yellow") => Some("yellow"),
            Some("red") => Some("red"),
            Some("magenta") | None => Some("magenta"),
            Some(_) => None,
        };
        Self {
            color,
            stderr_color,
        }
    }

    pub fn paint(&self, text: &str, color: &str) -> String {
        if self.color.is_none() {
            return text.to_string();
        }
        match color {
            "green" => format!("{}", text.green()),
            "cyan" => format!("{}", text.cyan()),
            "magenta" => format!("{}", text.magenta()),
            "yellow" => format!("{}", text.yellow()),
            "red" => format!("{}", text.red()),
            _ => text.to_string(),
        }
    }

    pub fn print(&self, text: &str) {
        match self.color {
            Some(c) => println!("{}", self.paint(text, c)),
            None => println!("{}", text),
        }
    }

    pub fn print_outcome(&self, outcome: &ExecutionOutcome) {
        let color = match outcome.status {
            ExecutionStatus::Success => "green",
            ExecutionStatus::Failure => "red",
            ExecutionStatus::TimedOut => "yellow",
            ExecutionStatus::SpawnError => "red",
        };
        let code = outcome
            .exit_code
            .map(|c| format!(", exit code {}", c))
            .unwrap_or_default();
        println!(
            "{} ({}ms{})",
            self.paint(outcome.status.as_str(), color),
            outcome.elapsed_millis,
            code
        );
        if !outcome.stdout.is_empty() {
            print!("{}", outcome.stdout);
            if !outcome.stdout.ends_with('\n') {
                println!();
            }
        }
        if !outcome.stderr.is_empty() {
            eprintln!("{}", self.stderr_text(&outcome.stderr));
        }
    }

    fn stderr_text(&self, stderr: &str) -> String {
        let text = stderr.trim_end_matches('\n');
        if self.stderr_color {
            format!("{}", text.red())
        } else {
            text.to_string()
        }
    }
}
