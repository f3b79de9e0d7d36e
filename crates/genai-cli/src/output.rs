//! Terminal output formatting for the genai CLI.

use std::io::{self, Write};

use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use genai_discovery::{AgentSummary, WorkflowSummary};
use genai_core::{Job, JobStatus};

/// ANSI color codes for terminal styling.
pub mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";
}

pub mod symbols {
    pub const CHECK: &str = "\u{2713}";
    pub const CROSS: &str = "\u{2717}";
    pub const WARNING: &str = "\u{26a0}";
    pub const INFO: &str = "\u{2139}";
    pub const SPINNER: [&str; 4] = ["\u{25d0}", "\u{25d3}", "\u{25d1}", "\u{25d2}"];
}

use colors::*;

/// Formatter for CLI output.
#[derive(Default)]
pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn print_banner(&self) {
        println!("{CYAN}{BOLD}genai{RESET} {DIM}— LM workflow orchestration engine{RESET}");
    }

    pub fn print_job_submitted(&self, job_id: &str) {
        println!("{GREEN}{}{RESET} submitted job {CYAN}{job_id}{RESET}", symbols::CHECK);
    }

    pub fn print_job_status(&self, job: &Job) {
        let (color, label) = match job.status {
            JobStatus::Pending => (YELLOW, "PENDING"),
            JobStatus::Processing => (CYAN, "PROCESSING"),
            JobStatus::Completed => (GREEN, "COMPLETED"),
            JobStatus::Failed => (RED, "FAILED"),
        };
        println!("{BOLD}job{RESET}      {}", job.job_id);
        println!("{BOLD}workflow{RESET} {}", job.workflow_id);
        println!("{BOLD}status{RESET}   {color}{label}{RESET}");
        if let Some(result) = &job.result {
            println!("{BOLD}result{RESET}   {result}");
        }
    }

    pub fn print_agents_table(&self, agents: &[AgentSummary]) {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["ID", "NAME", "DESCRIPTION", "ALLOWED TOOLS"]);
        for agent in agents {
            table.add_row(vec![
                Cell::new(&agent.id),
                Cell::new(&agent.name),
                Cell::new(&agent.description),
                Cell::new(agent.allowed_tools.join(", ")),
            ]);
        }
        println!("{table}");
    }

    pub fn print_workflows_table(&self, workflows: &[WorkflowSummary]) {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["ID", "NAME", "TYPE"]);
        for workflow in workflows {
            table.add_row(vec![
                Cell::new(&workflow.id),
                Cell::new(&workflow.name),
                Cell::new(&workflow.topology).fg(if workflow.topology == "ROUTER" { Color::Magenta } else { Color::Blue }),
            ]);
        }
        println!("{table}");
    }

    pub fn print_error(&self, message: &str) {
        eprintln!("{RED}{BOLD}{}{RESET} {message}", symbols::CROSS);
    }

    pub fn print_warning(&self, message: &str) {
        eprintln!("{YELLOW}{}{RESET} {message}", symbols::WARNING);
    }

    pub fn print_info(&self, message: &str) {
        println!("{CYAN}{}{RESET} {message}", symbols::INFO);
    }

    pub fn flush(&self) {
        let _ = io::stdout().flush();
    }
}

/// Simple spinner for the `submit --wait` progress indicator.
pub struct Spinner {
    state: usize,
    message: String,
}

impl Spinner {
    pub fn new(message: impl Into<String>) -> Self {
        Self { state: 0, message: message.into() }
    }

    pub fn tick(&mut self) {
        self.state = (self.state + 1) % symbols::SPINNER.len();
        print!("\r{CYAN}{}{RESET} {}", symbols::SPINNER[self.state], self.message);
        let _ = io::stdout().flush();
    }

    pub fn finish(&self, success: bool) {
        let (color, symbol) = if success { (GREEN, symbols::CHECK) } else { (RED, symbols::CROSS) };
        println!("\r{color}{symbol}{RESET} {}", self.message);
    }
}
