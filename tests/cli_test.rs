use anyhow::Result;
use std::process::Command;
use tempfile::tempdir;

/// Runs the conjure binary with a scratch HOME and a dummy API key so no
/// first-run prompt can block and no real config is touched.
fn run_conjure(args: &[&str]) -> Result<std::process::Output> {
    let home = tempdir()?;

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_conjure"));
    cmd.args(args);
    cmd.env("HOME", home.path());
    cmd.env("CONJURE_API_KEY", "sk-ant-test-key");

    Ok(cmd.output()?)
}

#[test]
fn whitespace_only_prompt_is_a_usage_error() -> Result<()> {
    let output = run_conjure(&["ask", "   ", "  "])?;

    assert_eq!(output.status.code(), Some(2), "usage errors exit with 2");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("valid prompt"),
        "should explain the problem, got: {stderr}"
    );
    Ok(())
}

#[test]
fn ask_without_a_prompt_is_rejected_by_the_parser() -> Result<()> {
    let output = run_conjure(&["ask"])?;

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(2), "clap usage errors exit with 2");
    Ok(())
}

#[test]
fn help_lists_both_subcommands() -> Result<()> {
    let output = run_conjure(&["--help"])?;

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ask"));
    assert!(stdout.contains("config"));
    Ok(())
}

#[test]
fn unknown_subcommand_is_an_error() -> Result<()> {
    let output = run_conjure(&["summon"])?;

    assert!(!output.status.success());
    Ok(())
}
