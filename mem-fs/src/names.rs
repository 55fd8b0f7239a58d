//! 扁平的名字表：没有目录层级，每个名字直接指向一个 inode。
//! 多个名字可以指向同一个 inode，即硬链接。

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

use vfs::Error;

use crate::inode::InodeId;
use crate::Result;

#[derive(Debug, Default)]
pub struct NameTable {
    entries: BTreeMap<String, InodeId>,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn resolve(&self, name: &str) -> Result<InodeId> {
        self.entries
            .get(name)
            .copied()
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    /// 绑定新名字，不覆盖已有的同名项
    pub fn bind(&mut self, name: &str, id: InodeId) -> Result<()> {
        if self.contains(name) {
            return Err(Error::AlreadyExists(name.to_string()));
        }
        self.entries.insert(name.to_string(), id);
        Ok(())
    }

    pub fn unbind(&mut self, name: &str) -> Result<InodeId> {
        self.entries
            .remove(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    /// 按名字有序遍历
    pub fn iter(&self) -> impl Iterator<Item = (&str, InodeId)> {
        self.entries.iter().map(|(name, &id)| (name.as_str(), id))
    }
}
