use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for dashstream")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run fmt, clippy, tests and docs
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates, warnings denied
    Clippy,
    /// Run all tests
    Test,
    /// Build rustdoc for the workspace
    Doc,
    /// Run the level streaming benchmark
    Bench,
    /// Export the model catalog manifest through the CLI
    Catalog {
        /// Output path
        #[arg(short, long, default_value = "target/catalog.json")]
        out: PathBuf,
    },
    /// Write a demo level and run a simulation over it
    Smoke {
        /// Number of demo sections
        #[arg(short, long, default_value = "8")]
        sections: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            cargo("fmt", &["fmt", "--all", "--", "--check"])?;
            clippy()?;
            cargo("test", &["test", "--workspace"])?;
            cargo("doc", &["doc", "--workspace", "--no-deps"])?;
        }
        Commands::Fmt => cargo("fmt", &["fmt", "--all", "--", "--check"])?,
        Commands::Clippy => clippy()?,
        Commands::Test => cargo("test", &["test", "--workspace"])?,
        Commands::Doc => cargo("doc", &["doc", "--workspace", "--no-deps"])?,
        Commands::Bench => cargo(
            "bench",
            &["bench", "-p", "dashstream-stream", "--bench", "bench_level_stream"],
        )?,
        Commands::Catalog { out } => {
            let out = out.to_string_lossy();
            cli_run(&["models", "--export", &out])?;
        }
        Commands::Smoke { sections } => {
            let level = PathBuf::from("target").join(format!("demo-{sections}.json"));
            let level = level.to_string_lossy();
            let sections = sections.to_string();
            cli_run(&["demo", "--sections", &sections, "--out", &level])?;
            cli_run(&["inspect", "--level", &level])?;
            cli_run(&["simulate", "--level", &level, "--ticks", "1200"])?;
        }
    }

    Ok(())
}

fn clippy() -> Result<()> {
    cargo(
        "clippy",
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
    )
}

/// Run `dashstream-cli` in release mode with the given arguments.
fn cli_run(args: &[&str]) -> Result<()> {
    let mut full = vec!["run", "--release", "-q", "-p", "dashstream-cli", "--"];
    full.extend_from_slice(args);
    cargo(args[0], &full)
}

fn cargo(step: &str, args: &[&str]) -> Result<()> {
    println!("==> cargo {}", args.join(" "));
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("{step} failed ({status})");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn catalog_defaults_into_target() {
        let cli = Cli::try_parse_from(["xtask", "catalog"]).unwrap();
        match cli.command {
            Commands::Catalog { out } => assert_eq!(out, PathBuf::from("target/catalog.json")),
            _ => panic!("expected catalog"),
        }
    }

    #[test]
    fn deny_is_not_a_task() {
        assert!(Cli::try_parse_from(["xtask", "deny"]).is_err());
    }
}
