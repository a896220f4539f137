use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;

// cli.rs only depends on clap + clap_complete, both build-dependencies.
#[path = "src/cli.rs"]
mod cli;

fn main() -> io::Result<()> {
    println!("cargo::rerun-if-changed=src/cli.rs");

    let out_dir: PathBuf = std::env::var_os("OUT_DIR")
        .ok_or_else(|| io::Error::other("OUT_DIR not set by Cargo"))?
        .into();
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir)?;

    generate_manpages(&cli::Cli::command(), &man_dir)
}

/// One page per command, recursing into visible subcommands as
/// `parkwatch-<sub>.1`.
fn generate_manpages(cmd: &clap::Command, dir: &Path) -> io::Result<()> {
    let name = cmd.get_name().to_owned();

    let mut buf = Vec::new();
    clap_mangen::Man::new(cmd.clone()).render(&mut buf)?;
    fs::write(dir.join(format!("{name}.1")), buf)?;

    for sub in cmd.get_subcommands().filter(|s| !s.is_hide_set()) {
        let sub = sub.clone().name(format!("{name}-{}", sub.get_name()));
        generate_manpages(&sub, dir)?;
    }
    Ok(())
}
