//! 脚本命令的解析

use std::str::{FromStr, SplitWhitespace};

use mem_fs::Fd;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create(String),
    Ls,
    Stat(String),
    Link(String, String),
    Unlink(String),
    Open(String),
    Close(Fd),
    Seek(Fd, usize),
    Read(Fd, usize),
    /// 行内剩余部分原样写入，保留空格
    Write(Fd, String),
    Truncate(Fd, usize),
    /// 按名字查找最近一次打开的描述符
    FdOf(String),
    /// 块池使用情况
    Df,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("{0}: missing argument")]
    MissingArgument(&'static str),
    #[error("{0}: too many arguments")]
    TooManyArguments(&'static str),
    #[error("{cmd}: not a number: {arg}")]
    NotANumber { cmd: &'static str, arg: String },
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_start();
        let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

        let cmd = match head {
            "create" => "create",
            "ls" => "ls",
            "stat" => "stat",
            "link" | "ln" => "link",
            "unlink" | "rm" => "unlink",
            "open" => "open",
            "close" => "close",
            "seek" => "seek",
            "read" => "read",
            "write" => "write",
            "truncate" => "truncate",
            "fd" => "fd",
            "df" => "df",
            other => return Err(ParseError::Unknown(other.to_owned())),
        };

        // write 的内容可以包含空格，单独处理
        if cmd == "write" {
            let (fd, content) = rest
                .trim_start()
                .split_once(' ')
                .ok_or(ParseError::MissingArgument(cmd))?;
            let fd = Args::parse_number(cmd, fd)?;
            return Ok(Self::Write(Fd::from(fd), content.to_owned()));
        }

        let mut args = Args {
            cmd,
            inner: rest.split_whitespace(),
        };
        let command = match cmd {
            "create" => Self::Create(args.name()?),
            "ls" => Self::Ls,
            "stat" => Self::Stat(args.name()?),
            "link" => Self::Link(args.name()?, args.name()?),
            "unlink" => Self::Unlink(args.name()?),
            "open" => Self::Open(args.name()?),
            "close" => Self::Close(args.fd()?),
            "seek" => Self::Seek(args.fd()?, args.number()?),
            "read" => Self::Read(args.fd()?, args.number()?),
            "truncate" => Self::Truncate(args.fd()?, args.number()?),
            "fd" => Self::FdOf(args.name()?),
            _ => Self::Df,
        };

        args.finish()?;
        Ok(command)
    }
}

/// 按空白切分的命令参数
struct Args<'a> {
    cmd: &'static str,
    inner: SplitWhitespace<'a>,
}

impl<'a> Args<'a> {
    fn next(&mut self) -> Result<&'a str, ParseError> {
        self.inner.next().ok_or(ParseError::MissingArgument(self.cmd))
    }

    fn name(&mut self) -> Result<String, ParseError> {
        self.next().map(str::to_owned)
    }

    fn number(&mut self) -> Result<usize, ParseError> {
        let arg = self.next()?;
        Self::parse_number(self.cmd, arg)
    }

    fn fd(&mut self) -> Result<Fd, ParseError> {
        self.number().map(Fd::from)
    }

    /// 多余的参数视为错误
    fn finish(mut self) -> Result<(), ParseError> {
        match self.inner.next() {
            Some(_) => Err(ParseError::TooManyArguments(self.cmd)),
            None => Ok(()),
        }
    }

    fn parse_number(cmd: &'static str, arg: &str) -> Result<usize, ParseError> {
        arg.parse().map_err(|_| ParseError::NotANumber {
            cmd,
            arg: arg.to_owned(),
        })
    }
}
