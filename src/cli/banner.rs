//! Closing "next steps" banner.

use crossterm::style::Stylize;

const WIDTH: usize = 80;

const DATASET_FORMAT_URL: &str = "https://jsonlines.org/";
const TOOL_CALLING_URL: &str = "https://platform.openai.com/docs/guides/function-calling";
const LOG_FILTER_URL: &str =
    "https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html";

/// Hyperlink escape (OSC 8); terminals without support show the text only.
fn link(text: &str, url: &str) -> String {
    format!("\x1b]8;;{url}\x1b\\{}\x1b]8;;\x1b\\", text.cyan())
}

/// Center plain text in the banner width.
fn center(text: &str) -> String {
    let len = text.chars().count();
    if len >= WIDTH {
        return text.to_string();
    }
    let left = (WIDTH - len) / 2;
    format!("{}{}", " ".repeat(left), text)
}

pub fn render_next_steps() -> String {
    let heavy = "═".repeat(WIDTH);
    let light = "─".repeat(WIDTH);
    let mut out = Vec::new();

    out.push(String::new());
    out.push(heavy.clone().green().to_string());
    out.push(center("🚀 What's next").bold().white().to_string());
    out.push(heavy.green().to_string());
    out.push(String::new());

    out.push("1. Write your own tasks".bold().yellow().to_string());
    out.push(format!(
        "   One JSON object per line with {}, {} and {}.",
        "prompt".magenta(),
        "setup_tool".magenta(),
        "evaluate_tool".magenta()
    ));
    out.push(format!("   Format: {}", link("JSON Lines", DATASET_FORMAT_URL)));
    out.push(String::new());

    out.push("2. Give the agent more room".bold().yellow().to_string());
    out.push(format!(
        "   {} raises the step budget; {} bounds each call.",
        "--max-steps".magenta(),
        "--step-timeout-ms".magenta()
    ));
    out.push(format!(
        "   How tool calls work: {}",
        link("function calling guide", TOOL_CALLING_URL)
    ));
    out.push(String::new());

    out.push("3. See what happened".bold().yellow().to_string());
    out.push(format!(
        "   {} prints the full report; {} turns on detailed logs.",
        "--json".magenta(),
        "RUST_LOG=taskloop=debug".magenta()
    ));
    out.push(format!("   Filter syntax: {}", link("EnvFilter", LOG_FILTER_URL)));
    out.push(String::new());

    out.push(light.dim().to_string());
    out.push(center("Run `taskloop --help` for every option").dim().to_string());
    out.push(String::new());

    out.join("\n")
}

pub fn print_next_steps() {
    println!("{}", render_next_steps());
}
