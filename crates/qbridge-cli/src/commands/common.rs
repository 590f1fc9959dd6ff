//! Shared helpers for CLI commands.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use qbridge_convert::{LoadedCircuit, ParameterBinding, Wire, Wires, load_qasm_from_file};
use qbridge_hal::ExecutionResult;

/// Parse `NAME=VALUE` into a parameter binding entry.
pub fn parse_binding(s: &str) -> Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing parameter name in '{s}'"));
    }
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid value for {name}: {e}"))?;
    Ok((name.to_string(), value))
}

/// Integer labels stay integers, everything else is a string label.
pub fn parse_wires(labels: &[String]) -> Option<Wires> {
    if labels.is_empty() {
        return None;
    }
    Some(
        labels
            .iter()
            .map(|l| match l.trim().parse::<i64>() {
                Ok(n) => Wire::Int(n),
                Err(_) => Wire::Label(l.trim().to_string()),
            })
            .collect(),
    )
}

pub fn binding(params: Vec<(String, f64)>) -> ParameterBinding {
    params.into_iter().collect()
}

/// Load an OpenQASM 2.0 file as a template.
pub fn load_template(path: &Path) -> Result<LoadedCircuit> {
    load_qasm_from_file(path).with_context(|| format!("Failed to load {}", path.display()))
}

/// Print execution results in a table format.
pub fn print_results(index: usize, result: &ExecutionResult) {
    println!(
        "\n{} Circuit {} ({} shots):",
        style("✓").green().bold(),
        index,
        result.shots
    );

    let sorted = result.counts.sorted();
    let total = result.counts.total_shots().max(1) as f64;

    for (bitstring, count) in sorted.iter().take(16) {
        let prob = *count as f64 / total * 100.0;
        let bar_len = (prob / 2.0).round() as usize;
        let bar: String = "█".repeat(bar_len);

        println!(
            "  {}: {:>6} ({:>5.2}%) {}",
            style(bitstring).cyan(),
            count,
            prob,
            style(bar).green()
        );
    }

    if sorted.len() > 16 {
        println!("  ... and {} more outcomes", sorted.len() - 16);
    }

    if let Some(time_ms) = result.execution_time_ms {
        println!("  Execution time: {} ms", style(time_ms).yellow());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_binding() {
        assert_eq!(parse_binding("theta=0.5").unwrap(), ("theta".to_string(), 0.5));
        assert_eq!(parse_binding(" phi = -1e-3 ").unwrap(), ("phi".to_string(), -1e-3));
        assert!(parse_binding("theta").is_err());
        assert!(parse_binding("=1").is_err());
        assert!(parse_binding("theta=abc").is_err());
    }

    #[test]
    fn test_parse_wires() {
        assert!(parse_wires(&[]).is_none());
        let wires = parse_wires(&["-1".into(), "anc".into(), "2".into()]).unwrap();
        assert_eq!(
            wires.as_slice(),
            &[Wire::Int(-1), Wire::Label("anc".into()), Wire::Int(2)]
        );
    }
}
