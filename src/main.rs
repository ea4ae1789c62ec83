//! taskreveal - jump to a task line in a markdown file.
//!
//! # Usage
//!
//! ```bash
//! taskreveal notes.md --text "call mom"
//! taskreveal notes.md --text "call mom" --id a1b2 --rendered
//! taskreveal notes.md --text "call mom" --highlight=1500 --json
//! ```

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use taskreveal::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    save_config_flags,
};
use taskreveal::editor::SurfaceId;
use taskreveal::navigate::{Dispatch, MemoryWorkspace, NavigationRequest, Navigator};
use taskreveal::reveal::{RevealEvent, landed_line};
use taskreveal::source_map::LineSpace;
use taskreveal::task::TaskDescriptor;

/// Find a task in a markdown file and reveal its line
#[derive(Parser, Debug)]
#[command(name = "taskreveal", version, about, long_about = None)]
struct Cli {
    /// Markdown file containing the task
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Task text, as shown in a task list
    #[arg(long, value_name = "TEXT")]
    text: String,

    /// Task id (`#id:`, `🆔` or `[id::]` marker); preferred over the text
    #[arg(long, value_name = "ID")]
    id: Option<String>,

    /// Read the found line in rendered numbering (front matter hidden)
    #[arg(long)]
    rendered: bool,

    /// Mark the line for MS milliseconds instead of selecting it
    #[arg(
        long,
        value_name = "MS",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "2000"
    )]
    highlight: Option<u64>,

    /// Delay between scrolling and selecting
    #[arg(long, value_name = "MS")]
    settle_ms: Option<u64>,

    /// Interval between editor readiness checks
    #[arg(long, value_name = "MS")]
    poll_ms: Option<u64>,

    /// Give up if the editor is not ready after this long
    #[arg(long, value_name = "MS", conflicts_with = "no_timeout")]
    timeout_ms: Option<u64>,

    /// Wait for the editor indefinitely
    #[arg(long)]
    no_timeout: bool,

    /// Print the outcome as JSON
    #[arg(long)]
    json: bool,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

impl Cli {
    /// The saveable subset of the command line.
    const fn flags(&self) -> ConfigFlags {
        ConfigFlags {
            settle_ms: self.settle_ms,
            poll_ms: self.poll_ms,
            timeout_ms: self.timeout_ms,
            no_timeout: self.no_timeout,
            highlight_ms: self.highlight,
            rendered: self.rendered,
            json: self.json,
        }
    }
}

#[derive(Debug, Serialize)]
struct Report {
    file: PathBuf,
    task: TaskDescriptor,
    found: bool,
    /// Zero-based line the reveal landed on.
    line: Option<usize>,
    content: Option<String>,
    events: Vec<RevealEvent>,
}

fn print_human(report: &Report) {
    match (report.line, report.content.as_deref()) {
        (Some(line), Some(content)) => {
            println!("{}:{}: {}", report.file.display(), line + 1, content);
        }
        _ if report
            .events
            .iter()
            .any(|event| matches!(event, RevealEvent::GaveUp { .. })) =>
        {
            eprintln!("Editor for {} never became ready", report.file.display());
        }
        _ => eprintln!(
            "Task not found in {}: {}",
            report.file.display(),
            report.task.text
        ),
    }
}

fn main() -> Result<ExitCode> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = cli.flags();

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    if !cli.file.exists() {
        anyhow::bail!("File not found: {}", cli.file.display());
    }
    let text = fs::read_to_string(&cli.file)
        .with_context(|| format!("Failed to read {}", cli.file.display()))?;

    let mut workspace = MemoryWorkspace::new();
    workspace.add_document(cli.file.clone(), text);

    let task = match cli.id {
        Some(id) => TaskDescriptor::with_id(id, cli.text),
        None => TaskDescriptor::from_text(cli.text),
    };
    let space = if effective.rendered {
        LineSpace::Rendered
    } else {
        LineSpace::Source
    };
    let request = NavigationRequest::new(cli.file.clone(), task.clone())
        .with_space(space)
        .with_strategy(effective.strategy());

    let mut navigator = Navigator::with_system_clock(effective.timing());
    let dispatch = navigator
        .open_task(&mut workspace, request)
        .context("Navigation failed")?;
    let (surface, mut events): (Option<SurfaceId>, Vec<RevealEvent>) = match dispatch {
        Dispatch::Scheduled {
            surface, events, ..
        } => (Some(surface), events),
        Dispatch::NoView => (None, Vec::new()),
    };
    events.extend(navigator.run_until_idle(&mut workspace, std::thread::sleep));

    let line = landed_line(&events);
    let content = line
        .zip(surface)
        .and_then(|(line, surface)| workspace.buffer(surface)?.line_at(line));
    let report = Report {
        file: cli.file,
        task,
        found: line.is_some(),
        line,
        content,
        events,
    };

    if effective.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to encode report")?;
        println!("{json}");
    } else {
        print_human(&report);
    }

    Ok(if report.found {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
