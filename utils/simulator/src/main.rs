use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::Parser;
use simulator::{
    FrameDecoder, ModelId, NullTrace, Scenario, SignalDesc, SimError, SimulationOrchestrator,
    Tee, Termination, TraceSink, TraceWriter, VcdWriter,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const MAX_CYCLES_ENV: &str = "CYCLESIM_MAX_CYCLES";

#[derive(Parser, Debug)]
#[command(name = "cyclesim")]
#[command(about = "Clock-driven testbench for the bundled circuit models")]
#[command(version)]
struct Args {
    /// Built-in scenario to run (bus, fifo, serial)
    #[arg(value_name = "SCENARIO", conflicts_with = "config")]
    scenario: Option<ModelId>,

    /// YAML scenario file
    #[arg(long, value_name = "FILE")]
    config: Option<Utf8PathBuf>,

    /// Maximum simulation cycles (overrides the scenario)
    #[arg(long)]
    max_cycles: Option<u64>,

    /// Also dump a VCD waveform to this file
    #[arg(long, value_name = "FILE")]
    vcd: Option<Utf8PathBuf>,

    /// Decode the sampled transmit line as 8N1 UART frames after the run
    #[arg(long)]
    decode_frames: bool,

    /// Suppress the per-cycle text trace
    #[arg(short, long)]
    quiet: bool,

    /// List available models and exit
    #[arg(long)]
    list_models: bool,
}

/// The `--max-cycles` flag wins over the environment.
fn max_cycles_override(flag: Option<u64>, env: Option<&str>) -> Result<Option<u64>> {
    if let Some(cycles) = flag {
        return Ok(Some(cycles));
    }
    env.map(|value| {
        value
            .parse()
            .with_context(|| format!("{MAX_CYCLES_ENV} is not a cycle count: {value}"))
    })
    .transpose()
}

fn load_scenario(args: &Args, env_cycles: Option<&str>) -> Result<Scenario> {
    let scenario = match (&args.config, args.scenario) {
        (Some(path), _) => {
            Scenario::load(path).with_context(|| format!("Failed to load scenario {path}"))?
        }
        (None, Some(model)) => Scenario::builtin(model),
        (None, None) => anyhow::bail!("either SCENARIO or --config is required"),
    };

    Ok(match max_cycles_override(args.max_cycles, env_cycles)? {
        Some(0) => anyhow::bail!("--max-cycles must be positive"),
        Some(cycles) => scenario.with_max_cycles(cycles),
        None => scenario,
    })
}

/// Recorded signals that can go into a waveform. Unknown names are left for
/// the run itself to report.
fn vcd_signals(sim: &SimulationOrchestrator) -> Vec<SignalDesc> {
    sim.scenario()
        .record
        .iter()
        .filter_map(|name| sim.adapter().describe(name).ok().copied())
        .collect()
}

fn exit_status(termination: Termination) -> u8 {
    match termination {
        Termination::Finished => 0,
        Termination::TimeoutExceeded => 2,
    }
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.list_models {
        println!("Available models:");
        for model in SimulationOrchestrator::available_models() {
            println!("  - {}", model);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let env_cycles = std::env::var(MAX_CYCLES_ENV).ok();
    let scenario = load_scenario(&args, env_cycles.as_deref())?;
    let sim = SimulationOrchestrator::new(scenario);

    let text: Box<dyn TraceSink> = if args.quiet {
        Box::new(NullTrace)
    } else {
        Box::new(TraceWriter::new(BufWriter::new(std::io::stdout().lock())))
    };

    let report = match &args.vcd {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("Failed to create {path}"))?;
            let vcd = VcdWriter::new(
                BufWriter::new(file),
                sim.adapter().name(),
                &sim.scenario().clock,
                &vcd_signals(&sim),
            );
            let mut sink = Tee::new(text, vcd);
            sim.run(&mut sink)
        }
        None => {
            let mut sink = text;
            sim.run(&mut sink)
        }
    }
    .context("Simulation failed")?;

    if args.decode_frames {
        match &report.bits {
            Some(bits) => {
                let frames = FrameDecoder::decode(bits);
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "decoded_data\t{}", frames.text())?;
                if frames.framing_errors > 0 {
                    eprintln!("{} framing errors in sampled stream", frames.framing_errors);
                }
            }
            None => eprintln!("Scenario {} samples no transmit line", report.scenario),
        }
    }

    if report.termination == Termination::TimeoutExceeded {
        eprintln!(
            "cyclesim: {}",
            SimError::TimeoutExceeded {
                cycles: report.cycles
            }
        );
    }
    Ok(ExitCode::from(exit_status(report.termination)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use clap::error::ErrorKind;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("cyclesim").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn scenario_and_config_conflict() {
        let err = Args::try_parse_from(["cyclesim", "serial", "--config", "serial.yaml"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn unknown_builtin_is_rejected() {
        let err = Args::try_parse_from(["cyclesim", "uart"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn environment_sets_cap_when_flag_is_absent() {
        let scenario = load_scenario(&parse(&["serial"]), Some("64")).unwrap();
        assert_eq!(scenario.max_cycles, 64);

        let scenario = load_scenario(&parse(&["serial"]), None).unwrap();
        assert_eq!(scenario.max_cycles, 1024);
    }

    #[test]
    fn flag_wins_over_environment() {
        let args = parse(&["bus", "--max-cycles", "16"]);
        assert_eq!(load_scenario(&args, Some("99")).unwrap().max_cycles, 16);
    }

    #[test]
    fn zero_or_garbage_cap_is_rejected() {
        assert!(load_scenario(&parse(&["bus"]), Some("0")).is_err());
        assert!(load_scenario(&parse(&["bus", "--max-cycles", "0"]), None).is_err());
        assert!(load_scenario(&parse(&["bus"]), Some("lots")).is_err());
    }

    #[test]
    fn scenario_is_required() {
        assert!(load_scenario(&parse(&[]), None).is_err());
    }

    #[test]
    fn exit_status_follows_termination() {
        assert_eq!(exit_status(Termination::Finished), 0);
        assert_eq!(exit_status(Termination::TimeoutExceeded), 2);
    }

    #[test]
    fn waveform_leaves_unknown_signals_to_the_run() {
        let mut scenario = Scenario::builtin(ModelId::Bus);
        scenario.record = vec!["req".to_owned(), "bogus".to_owned()];
        let sim = SimulationOrchestrator::new(scenario);

        let names: Vec<&str> = vcd_signals(&sim).iter().map(|desc| desc.name).collect();
        assert_eq!(names, ["req"]);
    }
}
