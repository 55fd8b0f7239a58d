//! # 文件系统层
//!
//! [`MemFileSystem`] 组合块池、inode 表、名字表与描述符表，
//! 对外提供 create/ls/stat/link/unlink 与 open/close/seek/read/write/truncate。
//!
//! inode 的生命周期由两个计数决定：硬链接数与打开它的描述符数。
//! 两者都归零时才回收 inode 并归还块，所以删除一个仍被打开的文件后，
//! 描述符还能继续读写，直到最后一次 close。

use alloc::vec;
use alloc::vec::Vec;

use vfs::{DirEntry, DirEntryType, Error, Stat};

use crate::fd::{Fd, OpenFileTable};
use crate::inode::{Inode, InodeId, InodeTable};
use crate::names::NameTable;
use crate::store::BlockStore;
use crate::Result;

#[derive(Debug)]
pub struct MemFileSystem {
    store: BlockStore,
    inodes: InodeTable,
    names: NameTable,
    files: OpenFileTable,
}

impl MemFileSystem {
    pub fn new(block_count: usize, block_size: usize) -> Result<Self> {
        let store = BlockStore::new(block_count, block_size)?;
        log::info!("mem-fs: {block_count} blocks of {block_size} bytes");

        Ok(Self {
            store,
            inodes: InodeTable::new(),
            names: NameTable::new(),
            files: OpenFileTable::new(),
        })
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.store.block_size()
    }

    #[inline]
    pub fn block_count(&self) -> usize {
        self.store.block_count()
    }

    #[inline]
    pub fn free_blocks(&self) -> usize {
        self.store.free_blocks()
    }

    pub fn create(&mut self, name: &str) -> Result<InodeId> {
        if self.names.contains(name) {
            return Err(Error::AlreadyExists(name.into()));
        }

        let id = self.inodes.alloc(DirEntryType::Regular);
        self.names.bind(name, id)?;
        log::debug!("create {name:?}: inode {id}");
        Ok(id)
    }

    pub fn ls(&self) -> Vec<DirEntry> {
        self.names
            .iter()
            .filter_map(|(name, id)| {
                let inode = self.inodes.get(id)?;
                Some(DirEntry {
                    name: name.into(),
                    stat: inode.stat(self.block_size()),
                })
            })
            .collect()
    }

    pub fn stat(&self, name: &str) -> Result<Stat> {
        self.inode(name).map(|inode| inode.stat(self.block_size()))
    }

    /// 名字所指的 inode
    fn inode(&self, name: &str) -> Result<&Inode> {
        let id = self.names.resolve(name)?;
        self.inodes
            .get(id)
            .ok_or_else(|| Error::NotFound(name.into()))
    }

    /// 为 `old` 所指的 inode 增加名字 `new`
    pub fn link(&mut self, old: &str, new: &str) -> Result<InodeId> {
        let id = self.names.resolve(old)?;
        let inode = self
            .inodes
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(old.into()))?;
        // 先确认新名字可用，再增加链接数
        self.names.bind(new, id)?;
        inode.links += 1;

        log::debug!("link {new:?} -> {old:?}: inode {id}, {} links", inode.links);
        Ok(id)
    }

    pub fn unlink(&mut self, name: &str) -> Result<()> {
        let id = self.names.unbind(name)?;
        self.files.forget_name(name);

        if let Some(inode) = self.inodes.get_mut(id) {
            inode.links = inode.links.saturating_sub(1);
            log::debug!(
                "unlink {name:?}: inode {id}, {} links, {} open",
                inode.links,
                inode.open
            );
        }
        self.inodes.reclaim(id, &mut self.store);
        Ok(())
    }

    pub fn open(&mut self, name: &str) -> Result<Fd> {
        let id = self.names.resolve(name)?;
        let inode = self
            .inodes
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(name.into()))?;
        inode.open += 1;

        let fd = self.files.open(name, id);
        log::debug!("open {name:?}: fd {fd}");
        Ok(fd)
    }

    pub fn close(&mut self, fd: Fd) -> Result<()> {
        let file = self.files.close(fd)?;
        if let Some(inode) = self.inodes.get_mut(file.inode) {
            inode.open = inode.open.saturating_sub(1);
        }
        // 已被删除的文件在最后一次 close 时回收
        if self.inodes.reclaim(file.inode, &mut self.store) {
            log::debug!("close fd {fd}: {:?} released", file.name);
        }
        Ok(())
    }

    /// 按名字查找最近一次打开的描述符
    #[inline]
    pub fn fd_of(&self, name: &str) -> Option<Fd> {
        self.files.fd_of(name)
    }

    /// 偏移量不小于文件大小时静默忽略，游标不动
    pub fn seek(&mut self, fd: Fd, offset: usize) -> Result<()> {
        let Self { inodes, files, .. } = self;
        let file = files.get_mut(fd)?;
        let size = inodes.get(file.inode).map_or(0, Inode::logical_size);

        if offset < size {
            file.offset = offset;
        } else {
            log::warn!("seek fd {fd} to {offset} ignored: file size is {size}");
        }
        Ok(())
    }

    /// 当前偏移量
    pub fn tell(&self, fd: Fd) -> Result<usize> {
        self.files.get(fd).map(|file| file.offset)
    }

    pub fn read(&mut self, fd: Fd, count: usize) -> Result<Vec<u8>> {
        let Self {
            store,
            inodes,
            files,
            ..
        } = self;
        let file = files.get_mut(fd)?;
        let inode = inodes
            .get(file.inode)
            .ok_or(Error::InvalidDescriptor(fd.into()))?;

        let size = inode.logical_size();
        if file.offset.checked_add(count).is_none_or(|end| end > size) {
            return Err(Error::OutOfRange {
                offset: file.offset,
                count,
                size,
            });
        }

        let mut buf = vec![0; count];
        inode.read_at(file.offset, &mut buf, store);
        file.offset += count;
        Ok(buf)
    }

    pub fn write(&mut self, fd: Fd, content: &[u8]) -> Result<usize> {
        let Self {
            store,
            inodes,
            files,
            ..
        } = self;
        let file = files.get_mut(fd)?;
        let inode = inodes
            .get_mut(file.inode)
            .ok_or(Error::InvalidDescriptor(fd.into()))?;

        let written = inode.write_at(file.offset, content, store).inspect_err(|err| {
            log::warn!("write fd {fd}: {err}");
        })?;
        file.offset += written;
        Ok(written)
    }

    pub fn truncate(&mut self, fd: Fd, new_size: usize) -> Result<()> {
        let Self {
            store,
            inodes,
            files,
            ..
        } = self;
        let file = files.get_mut(fd)?;
        let inode = inodes
            .get_mut(file.inode)
            .ok_or(Error::InvalidDescriptor(fd.into()))?;

        let shrink = new_size < inode.logical_size();
        inode.truncate(new_size, store);
        if shrink && file.offset >= new_size {
            file.offset = new_size.saturating_sub(1);
        }
        log::debug!(
            "truncate fd {fd} to {new_size}: {} blocks, {} bytes backed",
            inode.blocks().len(),
            inode.physical_size()
        );
        Ok(())
    }
}
