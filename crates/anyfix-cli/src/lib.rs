//! Command-line front end: reads explicit source files, rewrites them as one
//! program and prints the result.

pub mod args;
pub mod reporter;

use anyhow::{Context, Result, bail};

use anyfix::{RewriteOutput, RewriteSettings, rewrite_sources};
use args::CliArgs;

/// Read every input file and rewrite them together.
pub fn run(args: &CliArgs) -> Result<RewriteOutput> {
    if args.files.is_empty() {
        bail!("no input files");
    }
    let options = args.driver_options()?;
    let mut sources = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        sources.push((path.display().to_string(), text));
    }
    tracing::debug!(files = sources.len(), ?options, "starting rewrite");

    let settings = RewriteSettings {
        include_lib: !args.no_lib,
        dry_run: args.dry_run,
    };
    rewrite_sources(sources, &options, settings).context("failed to build program")
}

/// Concatenated output for stdout; each file gets a header when there are
/// several.
pub fn render_sources(output: &RewriteOutput) -> String {
    if let [(_, text)] = output.files.as_slice() {
        return text.clone();
    }
    let mut out = String::new();
    for (name, text) in &output.files {
        out.push_str(&format!("// ==> {name} <==\n"));
        out.push_str(text);
        if !text.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
#[path = "tests/args_tests.rs"]
mod args_tests;

#[cfg(test)]
#[path = "tests/reporter_tests.rs"]
mod reporter_tests;
