//! Terminal output of the build commands.
//!
//! Each command prints a phase banner, the names it lists or the jobs it
//! resolved, and a one-line summary. Job logs go through `tracing` instead
//! and are off by default.

use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

const BANNER: &str = "==>";
const DONE: &str = "✓";
const FAILED: &str = "✗";
const SKIPPED: &str = "-";
const WARNING: &str = "!";

/// Short human duration: `850ms`, `4.20s`, `2m 5s`.
pub fn format_duration(duration: Duration) -> String {
  let secs = duration.as_secs();
  match secs {
    0 => format!("{}ms", duration.subsec_millis()),
    1..60 => format!("{}.{:02}s", secs, duration.subsec_millis() / 10),
    _ => format!("{}m {}s", secs / 60, secs % 60),
  }
}

/// `1 job`, `3 jobs`.
fn count(n: usize, noun: &str) -> String {
  if n == 1 { format!("1 {noun}") } else { format!("{n} {noun}s") }
}

fn summary_line(resolved: usize, noun: &str, elapsed: Duration) -> String {
  format!("{} resolved in {}", count(resolved, noun), format_duration(elapsed))
}

/// Start of a phase, set off by a blank line.
pub fn print_phase(message: &str) {
  println!();
  println!(
    "{} {}",
    BANNER.if_supports_color(Stream::Stdout, |s| s.cyan()),
    message.if_supports_color(Stream::Stdout, |s| s.bold())
  );
}

/// A phase banner followed by one name per line.
pub fn print_listing<'a>(header: &str, names: impl IntoIterator<Item = &'a str>) {
  print_phase(header);
  for name in names {
    println!("{name}");
  }
}

/// Like [`print_listing`], with each group's names tab-indented below it.
pub fn print_grouped_listing<'a, N>(header: &str, groups: impl IntoIterator<Item = (&'a str, N)>)
where
  N: IntoIterator<Item = &'a str>,
{
  print_phase(header);
  for (group, names) in groups {
    println!("{group}");
    for name in names {
      println!("\t{name}");
    }
  }
}

/// Closing line of a run: how many jobs of which kind, and how long it took.
pub fn print_summary(resolved: usize, noun: &str, elapsed: Duration) {
  println!(
    "{} {}",
    DONE.if_supports_color(Stream::Stdout, |s| s.green()),
    summary_line(resolved, noun, elapsed)
  );
}

pub fn print_done(message: &str) {
  println!("{} {}", DONE.if_supports_color(Stream::Stdout, |s| s.green()), message);
}

pub fn print_skipped(message: &str) {
  println!(
    "{} {}",
    SKIPPED.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    message.if_supports_color(Stream::Stdout, |s| s.dimmed())
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    FAILED.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{json}");
  Ok(())
}
