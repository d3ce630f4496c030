use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use console::style;

use crate::Cli;

const BIN_NAME: &str = "thanks";

fn write_completions(shell: clap_complete::Shell, out: &mut dyn Write) {
    clap_complete::generate(shell, &mut Cli::command(), BIN_NAME, out);
}

/// Man pages for `thanks` and each visible subcommand, written into `dir`.
fn write_man_pages(dir: &Path) -> io::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    clap_mangen::generate_to(Cli::command(), dir)?;

    let mut pages = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "1"))
        .collect::<Vec<_>>();
    pages.sort();
    Ok(pages)
}

pub(crate) fn handle_completions(
    shell: clap_complete::Shell,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = io::stdout().lock();
    write_completions(shell, &mut stdout);
    stdout.flush()?;
    Ok(())
}

pub(crate) fn handle_man(output: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let Some(dir) = output else {
        clap_mangen::Man::new(Cli::command()).render(&mut io::stdout().lock())?;
        return Ok(());
    };

    let pages = write_man_pages(&dir)?;
    println!(
        "{} Wrote {} man page(s) to {}",
        style("✓").green().bold(),
        pages.len(),
        dir.display()
    );
    Ok(())
}
