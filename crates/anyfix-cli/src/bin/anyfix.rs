#![allow(clippy::print_stderr)]

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{IsTerminal, Write};

use anyfix_cli::args::CliArgs;
use anyfix_cli::reporter::Reporter;

fn main() -> Result<()> {
    anyfix::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let output = anyfix_cli::run(&args)?;

    let mut stdout = std::io::stdout().lock();
    if args.json {
        let json = serde_json::to_string_pretty(&output).context("failed to serialize report")?;
        writeln!(stdout, "{json}").context("failed to write report")?;
        return Ok(());
    }

    stdout
        .write_all(anyfix_cli::render_sources(&output).as_bytes())
        .context("failed to write rewritten sources")?;

    let reporter = Reporter::new(std::io::stderr().is_terminal(), args.verbose > 0);
    // render() already ends with a newline
    eprint!("{}", reporter.render(&output.report));
    if args.dry_run && output.report.total_changes > 0 {
        eprintln!("dry run: no annotations were kept");
    }
    Ok(())
}
