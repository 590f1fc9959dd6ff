//! Version command implementation.

use console::style;
use qbridge_adapter_ibmq::IbmqDevice;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - circuit conversion and IBM Q remote execution",
        style("qbridge").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qbridge-ir       Circuit model");
    println!("  qbridge-qasm     OpenQASM 2.0 reader and emitter");
    println!("  qbridge-convert  Circuit to operation stream converter");
    println!("  qbridge-hal      Remote execution contract");
    println!(
        "  qbridge-adapter-ibmq  IBM Q device ({})",
        IbmqDevice::SHORT_NAME
    );
    println!();
    println!("License: {}", style("Apache-2.0").dim());
}
