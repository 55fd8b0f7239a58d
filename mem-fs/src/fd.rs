//! # 描述符层
//!
//! 每个描述符带有独立的游标。
//! 同一文件名可以被多次打开，但按名字只能查到最近一次打开的描述符；
//! 更早的描述符仍然有效。

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use core::fmt;

use vfs::Error;

use crate::inode::InodeId;
use crate::Result;

/// 文件描述符
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Fd(usize);

impl From<usize> for Fd {
    fn from(raw: usize) -> Self {
        Self(raw)
    }
}

impl From<Fd> for usize {
    fn from(fd: Fd) -> Self {
        fd.0
    }
}

impl fmt::Display for Fd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone)]
pub struct OpenFile {
    /// **文件**内的偏移量
    pub offset: usize,
    /// 打开时使用的名字
    pub name: String,
    pub inode: InodeId,
}

#[derive(Debug, Default)]
pub struct OpenFileTable {
    files: BTreeMap<Fd, OpenFile>,
    /// 文件名 -> 最近一次打开它的描述符
    by_name: BTreeMap<String, Fd>,
    next_fd: usize,
}

impl OpenFileTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, name: &str, inode: InodeId) -> Fd {
        let fd = Fd(self.next_fd);
        self.next_fd += 1;

        self.files.insert(
            fd,
            OpenFile {
                offset: 0,
                name: name.to_string(),
                inode,
            },
        );
        self.by_name.insert(name.to_string(), fd);
        fd
    }

    pub fn get(&self, fd: Fd) -> Result<&OpenFile> {
        self.files.get(&fd).ok_or(Error::InvalidDescriptor(fd.0))
    }

    pub fn get_mut(&mut self, fd: Fd) -> Result<&mut OpenFile> {
        self.files.get_mut(&fd).ok_or(Error::InvalidDescriptor(fd.0))
    }

    pub fn close(&mut self, fd: Fd) -> Result<OpenFile> {
        let file = self.files.remove(&fd).ok_or(Error::InvalidDescriptor(fd.0))?;
        if self.by_name.get(&file.name) == Some(&fd) {
            self.by_name.remove(&file.name);
        }
        Ok(file)
    }

    #[inline]
    pub fn fd_of(&self, name: &str) -> Option<Fd> {
        self.by_name.get(name).copied()
    }

    /// 名字被删除后，不再能按名字查到描述符
    pub fn forget_name(&mut self, name: &str) {
        self.by_name.remove(name);
    }
}
