use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use std::path::{Path, PathBuf};

use anyfix_driver::{DiagnosticScope, DriverOptions};

/// CLI arguments for the anyfix binary.
#[derive(Parser, Debug)]
#[command(
    name = "anyfix",
    version,
    about = "Replace implicit any with types inferred from usage"
)]
pub struct CliArgs {
    /// Keep every inferred annotation, even ones that add diagnostics.
    #[arg(long)]
    pub no_revert: bool,

    /// Print reverted annotations and the diagnostics they introduced.
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Widen unions with more distinct members than this.
    #[arg(long = "max-union", value_name = "N")]
    pub max_union: Option<usize>,

    /// Which diagnostics decide whether an annotation is kept.
    #[arg(long, value_enum, ignore_case = true)]
    pub diagnostic_scope: Option<Scope>,

    /// JSON file with driver options; command-line flags win.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Report what would change, then roll every annotation back.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the report as JSON instead of the summary.
    #[arg(long)]
    pub json: bool,

    /// Do not load the built-in lib declarations.
    #[arg(long)]
    pub no_lib: bool,

    /// Source files forming one program.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Scope {
    File,
    Program,
}

impl From<Scope> for DiagnosticScope {
    fn from(scope: Scope) -> Self {
        match scope {
            Scope::File => DiagnosticScope::File,
            Scope::Program => DiagnosticScope::Program,
        }
    }
}

impl CliArgs {
    /// Options from `--config` (or the defaults) with flags applied on top.
    pub fn driver_options(&self) -> Result<DriverOptions> {
        let mut options = match &self.config {
            Some(path) => load_config(path)?,
            None => DriverOptions::default(),
        };
        self.apply_overrides(&mut options);
        Ok(options)
    }

    pub fn apply_overrides(&self, options: &mut DriverOptions) {
        if self.no_revert {
            options.verify = false;
        }
        if self.verbose > 0 {
            options.verbosity = self.verbose;
        }
        if let Some(max) = self.max_union {
            options.policy.max_union_members = max;
        }
        if let Some(scope) = self.diagnostic_scope {
            options.diagnostic_scope = scope.into();
        }
    }
}

pub fn load_config(path: &Path) -> Result<DriverOptions> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    DriverOptions::from_json(&text)
        .with_context(|| format!("failed to parse config {}", path.display()))
}
