use alloc::string::String;
use core::fmt;

use crate::Stat;

/// `ls` 的一行：文件名与其 inode 的元信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub stat: Stat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum DirEntryType {
    Block,
    Char,
    Directory,
    Fifo,
    SymLink,
    Socket,
    #[default]
    Regular,
}

impl DirEntryType {
    /// `ls -l` 风格的类型字符
    pub fn as_char(self) -> char {
        match self {
            Self::Block => 'b',
            Self::Char => 'c',
            Self::Directory => 'd',
            Self::Fifo => 'p',
            Self::SymLink => 'l',
            Self::Socket => 's',
            Self::Regular => '-',
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Block => "block device",
            Self::Char => "character device",
            Self::Directory => "directory",
            Self::Fifo => "named pipe",
            Self::SymLink => "symbolic link",
            Self::Socket => "socket",
            Self::Regular => "regular file",
        }
    }
}

impl fmt::Display for DirEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.name,
            self.stat.mode.as_char(),
            self.stat.links,
            self.stat.size,
            self.stat.inode
        )
    }
}
