//! Renders roff manual pages for `autoscale-images` into `OUT_DIR`.
//!
//! One page covers the top-level command and one page is written per
//! subcommand (`autoscale-images-create.1`, ...), all derived from the clap
//! definitions shared with the binary.

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_mangen::Man;

#[path = "src/cli/mod.rs"]
mod cli;

use cli::Cli;

const BIN_NAME: &str = "autoscale-images";

fn render_page(man: Man, target: &Path) -> io::Result<()> {
    let mut roff = Vec::new();
    man.render(&mut roff)?;
    fs::write(target, roff)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = io::stdout();
    writeln!(stdout, "cargo:rerun-if-changed=src/cli/mod.rs")?;

    let man_dir = env::var_os("OUT_DIR")
        .map(PathBuf::from)
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "cargo did not set OUT_DIR"))?;

    let command = Cli::command();
    for subcommand in command.get_subcommands() {
        let page = format!("{BIN_NAME}-{}", subcommand.get_name());
        render_page(
            Man::new(subcommand.clone()).title(page.to_uppercase()),
            &man_dir.join(format!("{page}.1")),
        )?;
    }
    render_page(Man::new(command), &man_dir.join(format!("{BIN_NAME}.1")))?;

    Ok(())
}
