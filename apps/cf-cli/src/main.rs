use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

use cf_app::{
    AppError, AppResult, PARAMETER_KEYS, PolicyId, RunConfig, SimulationResult,
    compute_charge_metrics, parse_assignment, run_simulation_with_progress,
};
use cf_cell::OcvCurve;
use tracing::debug;

#[derive(Parser)]
#[command(name = "cf-cli")]
#[command(about = "CellFlow CLI - lithium-ion cell charging simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a charge simulation
    Run {
        /// Charge policy (CV, CC, CCCV, Pulse, Sine)
        #[arg(short, long)]
        policy: Option<String>,
        /// Run-config file (.yaml, .yml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Override a parameter, e.g. --set Iset=6
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the open-circuit voltage at a state of charge
    Ocv {
        /// State of charge in [0, 1]
        #[arg(long)]
        soc: f64,
    },
    /// List recognized parameters and their defaults
    Params,
    /// List charge policies
    Policies,
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            policy,
            config,
            set,
            json,
        } => cmd_run(policy, config, &set, json),
        Commands::Ocv { soc } => cmd_ocv(soc),
        Commands::Params => cmd_params(),
        Commands::Policies => cmd_policies(),
    }
}

fn cmd_run(
    policy: Option<String>,
    config: Option<PathBuf>,
    overrides: &[String],
    json: bool,
) -> AppResult<()> {
    let mut run_config = match (&config, &policy) {
        (Some(path), _) => RunConfig::load(path)?,
        (None, Some(id)) => RunConfig::new(id.as_str()),
        (None, None) => {
            return Err(AppError::Config(
                "either --policy or --config is required".to_string(),
            ));
        }
    };
    if let Some(id) = policy {
        run_config.policy = PolicyId::parse(&id);
    }
    for raw in overrides {
        let (key, value) = parse_assignment(raw)?;
        debug!(key = %key, value = %value, "parameter override");
        run_config.parameters.insert(key, value);
    }

    let ocv = run_config.ocv_curve()?;

    if !json {
        println!("Running {} charge simulation", run_config.policy);
    }

    let mut last_emit = Instant::now();
    let result = run_simulation_with_progress(
        run_config.policy.clone(),
        &run_config.parameters,
        ocv,
        |p| {
            if !json && last_emit.elapsed().as_millis() >= 100 {
                render_progress(p.fraction_of_cap(), p.sim_time, p.soc);
                last_emit = Instant::now();
            }
        },
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    clear_progress_line();
    print_summary(&result);
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(80));
    let _ = io::stdout().flush();
}

fn render_progress(fraction_of_cap: f64, sim_time: f64, soc: f64) {
    let width = 28usize;
    let filled = ((soc.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    let bar = format!(
        "{}{}",
        "#".repeat(filled),
        "-".repeat(width.saturating_sub(filled))
    );
    print!(
        "\r[{}] SOC {:>5.1}%  t = {:>9.1} s  cap {:>5.1}%",
        bar,
        soc * 100.0,
        sim_time,
        fraction_of_cap * 100.0
    );
    let _ = io::stdout().flush();
}

fn print_summary(result: &SimulationResult) {
    if let Some(requested) = &result.policy_fallback {
        println!("! Unrecognized policy '{}': ran open circuit", requested);
    }
    println!("✓ Status: {}", result.status);
    println!("  Policy: {}", result.policy_label);
    println!("  Steps: {}", result.steps);
    println!("  Final time: {:.1} s", result.final_time);
    println!("  Samples: {}", result.trajectory.len());
    if let Some(diagnostic) = &result.diagnostic {
        println!("  Diagnostic: {}", diagnostic);
    }

    let m = compute_charge_metrics(result);
    if !m.has_data() {
        return;
    }
    println!("\nMetrics:");
    if let (Some(s), Some(h)) = (m.charging_time_s, m.charging_time_h) {
        println!("  Charging time: {:.1} s ({:.3} h)", s, h);
    }
    if let (Some(k), Some(c)) = (m.peak_temperature_k, m.peak_temperature_c) {
        println!("  Peak temperature: {:.2} K ({:.2} °C)", k, c);
    }
    if let (Some(k), Some(c)) = (m.avg_temperature_k, m.avg_temperature_c) {
        println!("  Average temperature: {:.2} K ({:.2} °C)", k, c);
    }
    if let Some(soc) = m.final_soc {
        println!("  Final sampled SOC: {:.4}", soc);
    }
    if let (Some(sei), Some(growth)) = (m.final_sei, m.sei_growth) {
        println!("  Final SEI: {:.4e} (growth {:.4e})", sei, growth);
    }
    if let Some(q) = m.charge_throughput_ah {
        println!("  Charge throughput: {:.4} Ah", q);
    }
    if let Some(stress) = m.thermal_stress {
        println!("  Thermal stress: {:.2} K·s", stress);
    }
}

fn cmd_ocv(soc: f64) -> AppResult<()> {
    let curve = OcvCurve::lfp();
    println!("OCV({:.4}) = {:.4} V", soc, curve.voltage(soc));
    Ok(())
}

fn cmd_params() -> AppResult<()> {
    println!("{:<22} {:<36} DESCRIPTION", "KEY", "DEFAULT");
    for spec in PARAMETER_KEYS {
        println!("{:<22} {:<36} {}", spec.key, spec.default, spec.description);
    }
    Ok(())
}

fn cmd_policies() -> AppResult<()> {
    for id in PolicyId::KNOWN {
        println!("{:<6} keys: {}", id, id.parameter_keys().join(", "));
    }
    println!("Any other id runs open circuit (no charging).");
    Ok(())
}
