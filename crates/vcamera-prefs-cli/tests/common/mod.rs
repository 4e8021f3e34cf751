use std::{path::Path, process::Command};

/// Create a new vcprefs CLI command
pub fn vcprefs() -> Command {
    Command::new(env!("CARGO_BIN_EXE_vcprefs"))
}

/// Run vcprefs against the database in `config_dir`, asserting success, and return stdout.
#[allow(dead_code)]
pub fn run_ok(config_dir: &Path, args: &[&str]) -> String {
    let output = vcprefs()
        .arg("--config-dir")
        .arg(config_dir)
        .args(args)
        .output()
        .expect("Failed to execute vcprefs command");

    assert!(
        output.status.success(),
        "vcprefs {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );

    String::from_utf8_lossy(&output.stdout).into_owned()
}
