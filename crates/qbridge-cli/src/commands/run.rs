//! Run command implementation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use qbridge_adapter_ibmq::{AccountSession, DeviceConfig, IbmqDevice, WireSpec};
use qbridge_convert::ParameterBinding;
use qbridge_ir::Circuit;
use tracing::{debug, info};

use super::common::{binding, load_template, print_results};

pub struct RunOptions {
    pub backend: Option<String>,
    pub shots: Option<u32>,
    pub config: Option<PathBuf>,
    pub params: Vec<(String, f64)>,
    pub track: bool,
    pub json: bool,
}

/// Execute the run command.
pub async fn execute(inputs: &[PathBuf], options: RunOptions) -> Result<()> {
    let params = binding(options.params);
    let circuits = inputs
        .iter()
        .map(|path| bound_circuit(path, &params))
        .collect::<Result<Vec<_>>>()?;

    let mut config = DeviceConfig::resolve(options.config.as_deref())
        .context("Failed to resolve the device configuration")?;
    if let Some(backend) = options.backend {
        config = config.with_backend(backend);
    }
    if let Some(shots) = options.shots {
        config = config.with_shots(shots);
    }
    let needed = circuits.iter().map(Circuit::num_qubits).max().unwrap_or(0);
    if config.wires.to_wires().len() < needed {
        config = config.with_wires(WireSpec::Count(needed));
    }

    println!(
        "{} Running {} circuit(s) on {} ({} shots)",
        style("→").cyan().bold(),
        circuits.len(),
        style(&config.backend).yellow(),
        config.shots
    );

    debug!(?config, "Resolved device configuration");

    let session = AccountSession::new().shared();
    let mut device = IbmqDevice::new(config, None, &session)
        .await
        .context("Failed to connect to IBM Q. Set IBMQX_TOKEN or store an account in ~/.qiskit/qiskitrc")?;
    if options.track {
        device.tracker_mut().start();
    }

    let avail = device.backend().availability().await?;
    if !avail.is_available {
        anyhow::bail!(
            "Backend '{}' is not available: {}",
            device.backend().name(),
            avail.status_message.unwrap_or_default()
        );
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message("Running batch...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let results = device.batch_execute(&circuits).await;
    spinner.finish_and_clear();
    let results = results?;
    info!(
        circuits = circuits.len(),
        job = ?device.current_job().map(|job| &job.id),
        "Batch finished"
    );

    if options.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        if let Some(job) = device.current_job() {
            println!("  Job: {}", style(&job.id).dim());
        }
        for (i, result) in results.iter().enumerate() {
            print_results(i, result);
        }
    }

    if options.track {
        if let Some(job_time) = device.tracker().latest().and_then(|r| r.job_time) {
            println!("\n{} Job time: {job_time}", style("⏱").cyan());
        }
    }

    Ok(())
}

/// Load a file and bind the parameters it uses.
fn bound_circuit(path: &Path, params: &ParameterBinding) -> Result<Circuit> {
    let template = load_template(path)?;
    let known = template.parameters();
    let relevant: ParameterBinding = params
        .iter()
        .filter(|(name, _)| known.contains(*name))
        .map(|(name, value)| (name.clone(), *value))
        .collect();
    let circuit = template
        .circuit()
        .bind_parameters(&relevant)
        .with_context(|| format!("Failed to bind parameters of {}", path.display()))?;
    if circuit.is_parameterized() {
        let missing: Vec<_> = circuit.parameters().into_iter().collect();
        anyhow::bail!(
            "{} has unbound parameters: {}",
            path.display(),
            missing.join(", ")
        );
    }
    Ok(circuit)
}
