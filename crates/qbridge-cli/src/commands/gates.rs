//! Gates command implementation.

use console::style;
use qbridge_convert::GATE_TABLE;

/// Print the source-to-target gate table.
pub fn execute() {
    println!("{:<8} {}", style("source").bold(), style("target").bold());
    for (source, target) in GATE_TABLE {
        println!("{:<8} {}", style(source).cyan(), target);
    }
    println!("{:<8} {}", style("ch").cyan(), style("QubitUnitary (explicit matrix)").dim());
}
