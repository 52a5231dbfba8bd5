//! Development tasks for Knightfall
//!
//! Usage:
//!   cargo run -p xtask -- ci          # fmt check, clippy, tests
//!   cargo run -p xtask -- demo        # run the arena scenario headless
//!   cargo run -p xtask -- package     # release binary plus demo data in dist/

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tasks for Knightfall")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Formatting check, clippy with warnings denied, full test suite
    Ci,
    /// Run a demo scenario through the headless runner
    Demo {
        /// Scenario file, relative to the project root
        #[arg(long, default_value = "demos/arena.ron")]
        scenario: String,
        /// Frames to run
        #[arg(long, default_value_t = 600)]
        frames: u64,
        /// Log filter passed through RUST_LOG
        #[arg(long, default_value = "info")]
        log: String,
    },
    /// Build a release binary and bundle it with the demo data
    Package,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci => ci(),
        Commands::Demo { scenario, frames, log } => demo(&scenario, frames, &log),
        Commands::Package => package(),
    }
}

/// Get the project root directory
fn project_root() -> Result<PathBuf> {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(Path::to_path_buf)
        .context("xtask must live one level below the project root")
}

/// Run a command and check for success
fn run_cmd(cmd: &mut Command) -> Result<()> {
    let status = cmd.status().context("Failed to execute command")?;
    if !status.success() {
        anyhow::bail!("Command failed with status: {}", status);
    }
    Ok(())
}

/// Copy directory recursively
fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    std::fs::create_dir_all(dst)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

fn ci() -> Result<()> {
    let root = project_root()?;

    println!("Checking formatting...");
    run_cmd(Command::new("cargo").current_dir(&root).args(["fmt", "--all", "--", "--check"]))?;

    println!("Running clippy...");
    run_cmd(
        Command::new("cargo")
            .current_dir(&root)
            .args(["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"]),
    )?;

    println!("Running tests...");
    run_cmd(Command::new("cargo").current_dir(&root).args(["test", "--workspace"]))?;

    println!("CI checks passed");
    Ok(())
}

fn demo(scenario: &str, frames: u64, log: &str) -> Result<()> {
    let root = project_root()?;
    let path = root.join(scenario);
    if !path.exists() {
        anyhow::bail!("scenario not found: {}", path.display());
    }

    run_cmd(
        Command::new("cargo")
            .current_dir(&root)
            .env("RUST_LOG", log)
            .args(["run", "--release", "--bin", "knightfall", "--"])
            .arg("--scenario")
            .arg(&path)
            .args(["--config", "demos/config.ron"])
            .args(["--frames", &frames.to_string()]),
    )
}

fn package() -> Result<()> {
    let root = project_root()?;
    let dist = root.join("dist/knightfall");

    println!("Building release...");
    run_cmd(
        Command::new("cargo")
            .current_dir(&root)
            .args(["build", "--release", "--bin", "knightfall"]),
    )?;

    // Clean and create dist folder
    if dist.exists() {
        std::fs::remove_dir_all(&dist)?;
    }
    std::fs::create_dir_all(&dist)?;

    let binary_name = if cfg!(target_os = "windows") {
        "knightfall.exe"
    } else {
        "knightfall"
    };
    std::fs::copy(
        root.join(format!("target/release/{}", binary_name)),
        dist.join(binary_name),
    )?;

    copy_dir_recursive(&root.join("demos"), &dist.join("demos"))?;

    println!("Package ready: dist/knightfall/");
    Ok(())
}
