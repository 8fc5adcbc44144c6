//! End-to-end checks of the `cyclesim` binary: exit codes, the cycle-cap
//! environment variable and the trace left on stdout by failing runs.

use std::path::PathBuf;
use std::process::{Command, Output};

fn cyclesim(args: &[&str], max_cycles: Option<&str>) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_cyclesim"));
    command.args(args).env("RUST_LOG", "off");
    match max_cycles {
        Some(value) => command.env("CYCLESIM_MAX_CYCLES", value),
        None => command.env_remove("CYCLESIM_MAX_CYCLES"),
    };
    command.output().unwrap()
}

fn scenario_file(name: &str, yaml: &str) -> PathBuf {
    let path = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(format!("{name}.yaml"));
    std::fs::write(&path, yaml).unwrap();
    path
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn timeout_exits_with_two() {
    let output = cyclesim(&["serial", "--quiet"], None);

    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(
        stderr.contains("cyclesim: model did not finish within 1024 cycles"),
        "stderr: {stderr}"
    );
}

#[test]
fn list_models_exits_cleanly() {
    let output = cyclesim(&["--list-models"], None);

    assert_eq!(output.status.code(), Some(0));
    let text = stdout(&output);
    for model in ["bus", "fifo", "serial"] {
        assert!(text.contains(&format!("  - {model}")));
    }
}

#[test]
fn environment_caps_the_run() {
    let output = cyclesim(&["bus"], Some("8"));

    assert_eq!(output.status.code(), Some(2));
    let text = stdout(&output);
    assert_eq!(text.matches("--NEXT EVAL--").count(), 8);
    assert!(text.ends_with("--END--\n"));
}

#[test]
fn zero_cap_from_environment_is_an_error() {
    let output = cyclesim(&["bus"], Some("0"));

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}

#[test]
fn unknown_recorded_signal_closes_trace_with_vcd() {
    let config = scenario_file(
        "unknown_record",
        "name: unknown-record\nmodel: bus\nmax_cycles: 4\nrecord: [clk, bogus]\n",
    );
    let vcd = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("unknown_record.vcd");

    for extra in [vec![], vec!["--vcd", vcd.to_str().unwrap()]] {
        let mut args = vec!["--config", config.to_str().unwrap()];
        args.extend(extra);
        let output = cyclesim(&args, None);

        assert_eq!(output.status.code(), Some(1));
        assert_eq!(stdout(&output), "--NEXT EVAL--\n--POSEDGE--\n--END--\n");
    }
}

#[test]
fn unknown_preload_closes_trace() {
    let config = scenario_file(
        "unknown_preload",
        "name: unknown-preload\nmodel: fifo\npreload: { bogus: true }\n",
    );
    let output = cyclesim(&["--config", config.to_str().unwrap()], None);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output), "--END--\n");
}
