use colored::Colorize;

use anyfix::{ProgramReport, SiteOutcome};
use anyfix_common::Diagnostic;

/// Renders a [`ProgramReport`] as the human-readable summary.
///
/// Committed annotations come from every pass; everything else from the final
/// pass only, since bindings left unannotated are retried each pass.
pub struct Reporter {
    color: bool,
    verbose: bool,
}

impl Reporter {
    pub fn new(color: bool, verbose: bool) -> Self {
        Reporter { color, verbose }
    }

    pub fn render(&self, report: &ProgramReport) -> String {
        let mut out = String::new();
        for (file, site) in report.committed() {
            if let SiteOutcome::Committed { annotation } = &site.outcome {
                out.push_str(&format!(
                    "{} {}: {}\n",
                    self.label("annotated", Tone::Good),
                    self.location(file, &site.name),
                    annotation
                ));
            }
        }

        for (file, site) in report.unresolved() {
            match &site.outcome {
                SiteOutcome::Failed { annotation, error } => {
                    out.push_str(&format!(
                        "{} {}: {} ({})\n",
                        self.label("failed", Tone::Bad),
                        self.location(file, &site.name),
                        annotation,
                        error
                    ));
                }
                SiteOutcome::Reverted {
                    annotation,
                    introduced,
                } if self.verbose => {
                    out.push_str(&format!(
                        "{} {}: {}\n",
                        self.label("reverted", Tone::Bad),
                        self.location(file, &site.name),
                        annotation
                    ));
                    for diagnostic in introduced {
                        out.push_str(&self.format_introduced(diagnostic));
                        out.push('\n');
                    }
                }
                SiteOutcome::NoTypeFound if self.verbose => {
                    out.push_str(&format!(
                        "{} {}\n",
                        self.label("no type", Tone::Muted),
                        self.location(file, &site.name)
                    ));
                }
                _ => {}
            }
        }

        out.push_str(&self.format_totals(report));
        out.push('\n');
        out
    }

    fn format_totals(&self, report: &ProgramReport) -> String {
        let left = report.unresolved().count();
        let mut totals = format!(
            "{} annotation{} in {} pass{}",
            report.total_changes,
            if report.total_changes == 1 { "" } else { "s" },
            report.passes.len(),
            if report.passes.len() == 1 { "" } else { "es" }
        );
        if left > 0 {
            totals.push_str(&format!(", {left} left unannotated"));
        }
        if !report.converged {
            totals.push_str(", stopped before converging");
        }
        if self.color {
            totals.bold().to_string()
        } else {
            totals
        }
    }

    fn format_introduced(&self, diagnostic: &Diagnostic) -> String {
        let code = format!("TS{}", diagnostic.code);
        let code = if self.color {
            code.red().to_string()
        } else {
            code
        };
        format!("    {} {}: {}", diagnostic.file, code, diagnostic.message_text)
    }

    fn location(&self, file: &str, name: &str) -> String {
        if self.color {
            format!("{}:{}", file.cyan(), name.bold())
        } else {
            format!("{file}:{name}")
        }
    }

    fn label(&self, label: &str, tone: Tone) -> String {
        if !self.color {
            return label.to_string();
        }
        match tone {
            Tone::Good => label.green().bold().to_string(),
            Tone::Bad => label.yellow().bold().to_string(),
            Tone::Muted => label.dimmed().to_string(),
        }
    }
}

#[derive(Copy, Clone)]
enum Tone {
    Good,
    Bad,
    Muted,
}
