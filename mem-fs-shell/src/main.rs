mod cli;
mod command;
mod shell;

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};

use clap::Parser;
use mem_fs::MemFileSystem;

pub use self::{cli::Cli, shell::Shell};

fn main() -> io::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let fs = MemFileSystem::new(cli.blocks, cli.block_size)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
    let mut shell = Shell::new(fs);

    let input: Box<dyn BufRead> = match &cli.script {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (lineno, line) in input.lines().enumerate() {
        let line = line?;
        if let Err(err) = shell.run_line(&line, &mut out) {
            log::info!("line {}: {line:?}", lineno + 1);
            writeln!(out, "error: {err}")?;
        }
    }

    Ok(())
}
