//! Convert command implementation.

use std::path::Path;

use anyhow::Result;
use console::style;
use qbridge_convert::Recorder;
use tracing::debug;

use super::common::{binding, load_template, parse_wires};

/// Execute the convert command.
///
/// Operations go to stdout, one per line; the summary goes to stderr.
pub fn execute(input: &Path, wires: &[String], params: Vec<(String, f64)>) -> Result<()> {
    let template = load_template(input)?;
    let wires = parse_wires(wires);
    debug!(
        input = %input.display(),
        parameters = params.len(),
        "Converting circuit"
    );
    let mut tape = Recorder::new();
    let report = template.apply(&binding(params), wires.as_ref(), &mut tape)?;

    for op in tape.operations() {
        println!("{op}");
    }

    eprintln!(
        "{} {} operations from {}",
        style("✓").green().bold(),
        report.emitted,
        style(input.display()).green()
    );
    if !report.is_complete() {
        eprintln!(
            "  {} skipped: {}",
            style(report.skipped.len()).yellow(),
            report.skipped.join(", ")
        );
    }
    Ok(())
}
