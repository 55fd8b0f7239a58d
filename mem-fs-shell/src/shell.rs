//! 把命令作用于 [`MemFileSystem`]，并以文本形式输出结果

use std::io::{self, Write};

use mem_fs::MemFileSystem;
use thiserror::Error;

use crate::command::{Command, ParseError};

#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Fs(#[from] vfs::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub struct Shell {
    fs: MemFileSystem,
}

impl Shell {
    pub fn new(fs: MemFileSystem) -> Self {
        Self { fs }
    }

    /// 执行一行脚本。空行与 `#` 开头的注释被跳过。
    pub fn run_line(&mut self, line: &str, out: &mut impl Write) -> Result<(), ShellError> {
        let line = line.trim_end();
        if line.trim_start().is_empty() || line.trim_start().starts_with('#') {
            return Ok(());
        }

        let command: Command = line.parse()?;
        log::debug!("{command:?}");
        self.exec(command, out)
    }

    pub fn exec(&mut self, command: Command, out: &mut impl Write) -> Result<(), ShellError> {
        let fs = &mut self.fs;

        match command {
            Command::Create(name) => {
                let inode = fs.create(&name)?;
                writeln!(out, "{name}: inode {inode}")?;
            }
            Command::Ls => {
                let entries = fs.ls();
                writeln!(out, "total {}", entries.len())?;
                for entry in entries {
                    writeln!(out, "{entry}")?;
                }
            }
            Command::Stat(name) => {
                let stat = fs.stat(&name)?;
                writeln!(out, "File: {name}\n{stat}")?;
            }
            Command::Link(old, new) => {
                let inode = fs.link(&old, &new)?;
                writeln!(out, "{new} -> {old}: inode {inode}")?;
            }
            Command::Unlink(name) => fs.unlink(&name)?,
            Command::Open(name) => {
                let fd = fs.open(&name)?;
                writeln!(out, "fd {fd}")?;
            }
            Command::Close(fd) => fs.close(fd)?,
            Command::Seek(fd, offset) => {
                fs.seek(fd, offset)?;
                writeln!(out, "offset {}", fs.tell(fd)?)?;
            }
            Command::Read(fd, count) => {
                let data = fs.read(fd, count)?;
                writeln!(
                    out,
                    "|Read, size: {}, content: {:?}|",
                    data.len(),
                    String::from_utf8_lossy(&data)
                )?;
            }
            Command::Write(fd, content) => {
                let written = fs.write(fd, content.as_bytes())?;
                writeln!(out, "wrote {written} bytes")?;
            }
            Command::Truncate(fd, size) => fs.truncate(fd, size)?,
            Command::FdOf(name) => match fs.fd_of(&name) {
                Some(fd) => writeln!(out, "fd {fd}")?,
                None => writeln!(out, "{name}: not open")?,
            },
            Command::Df => writeln!(
                out,
                "{} blocks of {} bytes, {} free",
                fs.block_count(),
                fs.block_size(),
                fs.free_blocks()
            )?,
        }

        Ok(())
    }
}
