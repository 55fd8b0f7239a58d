use core::fmt;

use crate::DirEntryType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    /// Inode number
    pub inode: u64,
    pub mode: DirEntryType,
    /// 硬链接个数
    pub links: u32,
    /// Optimal I/O block size
    pub block_size: u64,
    /// Occupying blocks
    pub blocks: u64,
    /// File size，包含尚未分配存储的空洞
    pub size: u64,
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Size: {}\tBlocks: {}\t{}",
            self.size,
            self.blocks,
            self.mode.description()
        )?;
        write!(f, "Inode: {}\tLinks: {}", self.inode, self.links)
    }
}
