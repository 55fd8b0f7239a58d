//! # 索引节点层
//!
//! [`Inode`] 记录文件的类型、链接数与块列表，被所有硬链接到它的名字共享。
//! 块列表的顺序即文件内容的字节顺序：`blocks[i]` 承载
//! `[i * block_size, (i + 1) * block_size)`。
//!
//! 文件由两部分组成：
//! - `[0, size)`：由块承载的物理区域；
//! - `[size, logical_size)`：惰性区间，读出为零，写入时才分配块。
//!
//! 物理区域之后、块内剩余的字节恒为零。

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::fmt;
use core::ops::Range;

use vfs::{DirEntryType, Error, Stat};

use crate::extent::{LazyExtents, Segment};
use crate::store::{BlockId, BlockStore};
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct InodeId(u64);

impl From<u64> for InodeId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<InodeId> for u64 {
    fn from(id: InodeId) -> Self {
        id.0
    }
}

impl fmt::Display for InodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug)]
pub struct Inode {
    pub id: InodeId,
    pub kind: DirEntryType,
    /// 硬链接个数
    pub links: u32,
    /// 持有该 inode 的描述符个数
    pub open: u32,
    /// 物理区域大小
    size: usize,
    blocks: Vec<BlockId>,
    holes: LazyExtents,
}

impl Inode {
    fn new(id: InodeId, kind: DirEntryType) -> Self {
        Self {
            id,
            kind,
            links: 1,
            open: 0,
            size: 0,
            blocks: Vec::new(),
            holes: LazyExtents::new(),
        }
    }

    #[inline]
    pub fn physical_size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn logical_size(&self) -> usize {
        self.size + self.holes.len()
    }

    #[inline]
    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    #[cfg(test)]
    pub fn holes(&self) -> &LazyExtents {
        &self.holes
    }

    /// 既无名字也无描述符引用
    #[inline]
    pub fn is_orphan(&self) -> bool {
        self.links == 0 && self.open == 0
    }

    pub fn stat(&self, block_size: usize) -> Stat {
        Stat {
            inode: self.id.into(),
            mode: self.kind,
            links: self.links,
            block_size: block_size as u64,
            blocks: self.blocks.len() as u64,
            size: self.logical_size() as u64,
        }
    }

    /// 读出 `buf.len()` 个字节。空洞内的字节填零，不访问块池。
    pub fn read_at(&self, offset: usize, buf: &mut [u8], store: &BlockStore) {
        for segment in self.holes.segments(offset..offset + buf.len()) {
            match segment {
                Segment::Backed(range) => {
                    let dst = range.start - offset..range.end - offset;
                    self.copy_out(range, &mut buf[dst], store);
                }
                Segment::Lazy(range) => buf[range.start - offset..range.end - offset].fill(0),
            }
        }
    }

    /// 写入 `buf`，必要时先向块池追加块。
    ///
    /// 写入区间与物理区域末尾之间的空洞会被实体化：
    /// 从空洞集合中移除，由（全零的）块承载。
    /// 块池容量不足时返回 [`Error::NoSpace`]，写入终点溢出时返回
    /// [`Error::OutOfRange`]，两种情况下 inode 都不做任何修改。
    pub fn write_at(
        &mut self,
        offset: usize,
        buf: &[u8],
        store: &mut BlockStore,
    ) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let block_size = store.block_size();
        let end = offset.checked_add(buf.len()).ok_or(Error::OutOfRange {
            offset,
            count: buf.len(),
            size: self.logical_size(),
        })?;

        // Expand
        if end > self.blocks.len() * block_size {
            let wanted = buf
                .len()
                .div_ceil(block_size)
                .max(end.div_ceil(block_size) - self.blocks.len());
            let new_blocks = store.alloc(wanted);
            if new_blocks.is_empty() {
                return Err(Error::NoSpace {
                    requested: wanted,
                    free: store.free_blocks(),
                });
            }
            log::debug!("inode {} grows by {wanted} blocks", self.id);
            self.blocks.extend(new_blocks);
        }

        if end > self.size {
            self.holes.remove(self.size..end);
        }
        self.copy_in(offset, buf, store);
        self.size = self.size.max(end);

        Ok(buf.len())
    }

    /// 截断或扩展到 `new_size`（逻辑大小）。
    ///
    /// 缩小时归还所有整块位于 `new_size` 之后的块；
    /// 扩大时只记录空洞，不分配块。
    pub fn truncate(&mut self, new_size: usize, store: &mut BlockStore) {
        let size = self.logical_size();

        if new_size > size {
            self.holes.insert(size..new_size);
            return;
        }
        if new_size == size {
            return;
        }

        let block_size = store.block_size();
        let keep = new_size.div_ceil(block_size);
        if keep < self.blocks.len() {
            store.release_all(self.blocks.drain(keep..));
        }

        if new_size < self.size {
            self.fill_zero(new_size..keep * block_size, store);
            self.size = new_size;
        }
        self.holes.remove(new_size..usize::MAX);
    }

    /// 归还全部块
    pub fn clear(&mut self, store: &mut BlockStore) {
        store.release_all(self.blocks.drain(..));
        self.holes.clear();
        self.size = 0;
    }
}

impl Inode {
    /// 对 `range` 跨越的每个块，给出（块，块内区间，相对 `range.start` 的偏移）
    fn chunks(
        &self,
        range: Range<usize>,
        block_size: usize,
    ) -> impl Iterator<Item = (BlockId, Range<usize>, usize)> + '_ {
        let mut pos = range.start;
        core::iter::from_fn(move || {
            if pos >= range.end {
                return None;
            }
            let block_index = pos / block_size;
            let shift = pos % block_size;
            let len = (block_size - shift).min(range.end - pos);
            let id = *self.blocks.get(block_index)?;

            let chunk = (id, shift..shift + len, pos - range.start);
            pos += len;
            Some(chunk)
        })
    }

    fn copy_out(&self, range: Range<usize>, dst: &mut [u8], store: &BlockStore) {
        for (id, inner, at) in self.chunks(range, store.block_size()) {
            dst[at..at + inner.len()].copy_from_slice(&store.block(id)[inner]);
        }
    }

    fn copy_in(&self, offset: usize, src: &[u8], store: &mut BlockStore) {
        let block_size = store.block_size();
        for (id, inner, at) in self.chunks(offset..offset + src.len(), block_size) {
            let len = inner.len();
            store.block_mut(id)[inner].copy_from_slice(&src[at..at + len]);
        }
    }

    fn fill_zero(&self, range: Range<usize>, store: &mut BlockStore) {
        let block_size = store.block_size();
        for (id, inner, _) in self.chunks(range, block_size) {
            store.block_mut(id)[inner].fill(0);
        }
    }
}

/// 所有存活的 inode，按 ID 索引
#[derive(Debug, Default)]
pub struct InodeTable {
    inodes: BTreeMap<InodeId, Inode>,
    next_id: u64,
}

impl InodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, kind: DirEntryType) -> InodeId {
        let id = InodeId(self.next_id);
        self.next_id += 1;
        self.inodes.insert(id, Inode::new(id, kind));
        id
    }

    pub fn get(&self, id: InodeId) -> Option<&Inode> {
        self.inodes.get(&id)
    }

    pub fn get_mut(&mut self, id: InodeId) -> Option<&mut Inode> {
        self.inodes.get_mut(&id)
    }

    /// 若 inode 已无任何引用，则移除并归还其块
    pub fn reclaim(&mut self, id: InodeId, store: &mut BlockStore) -> bool {
        if !self.inodes.get(&id).is_some_and(Inode::is_orphan) {
            return false;
        }
        if let Some(mut inode) = self.inodes.remove(&id) {
            log::debug!("reclaim inode {id}: {} blocks", inode.blocks.len());
            inode.clear(store);
        }
        true
    }
}
