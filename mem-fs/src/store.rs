//! # 块池
//!
//! 内存中一段连续的字节区域，被切分为 `block_count` 个大小为
//! `block_size` 的块；块的忙闲记录在位图中。
//!
//! 分配采用 next-fit：每次扫描从上次分配位置之后开始，循环回绕。
//! 空闲块的内容恒为零，释放时清零。

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use vfs::Error;

use crate::Result;

/// 位图的一组
type BitmapGroup = u64;
const GROUP_BITS: usize = BitmapGroup::BITS as usize;

/// 块编号
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct BlockId(usize);

impl From<BlockId> for usize {
    fn from(id: BlockId) -> Self {
        id.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

pub struct BlockStore {
    data: Vec<u8>,
    /// 忙闲位图，置位表示已分配
    busy: Vec<BitmapGroup>,
    block_size: usize,
    block_count: usize,
    free: usize,
    /// 下一次扫描的起点
    cursor: usize,
}

impl BlockStore {
    pub fn new(block_count: usize, block_size: usize) -> Result<Self> {
        if block_count == 0 || block_size == 0 {
            return Err(Error::InvalidGeometry {
                blocks: block_count,
                block_size,
            });
        }
        let bytes = block_count
            .checked_mul(block_size)
            .ok_or(Error::InvalidGeometry {
                blocks: block_count,
                block_size,
            })?;

        Ok(Self {
            data: vec![0; bytes],
            busy: vec![0; block_count.div_ceil(GROUP_BITS)],
            block_size,
            block_count,
            free: block_count,
            cursor: 0,
        })
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    #[inline]
    pub fn block_count(&self) -> usize {
        self.block_count
    }

    #[inline]
    pub fn free_blocks(&self) -> usize {
        self.free
    }

    #[inline]
    pub fn has_capacity(&self, count: usize) -> bool {
        self.free >= count
    }

    /// 分配 `count` 个块，按分配顺序返回其编号。
    /// 若空闲块不足则一个也不分配，返回空；调用者须检查返回的数量。
    pub fn alloc(&mut self, count: usize) -> Vec<BlockId> {
        if !self.has_capacity(count) {
            log::warn!("block store exhausted: {count} requested, {} free", self.free);
            return Vec::new();
        }

        (0..count).filter_map(|_| self.alloc_one()).collect()
    }

    pub fn release(&mut self, id: BlockId) {
        let index = id.0;
        if index >= self.block_count || !self.is_busy(index) {
            return;
        }

        self.block_mut(id).fill(0);
        self.busy[index / GROUP_BITS] &= !(1 << (index % GROUP_BITS));
        self.free += 1;
        log::trace!("release block {index}");
    }

    pub fn release_all(&mut self, ids: impl IntoIterator<Item = BlockId>) {
        for id in ids {
            self.release(id);
        }
    }

    pub fn block(&self, id: BlockId) -> &[u8] {
        let start = id.0 * self.block_size;
        &self.data[start..start + self.block_size]
    }

    pub fn block_mut(&mut self, id: BlockId) -> &mut [u8] {
        let start = id.0 * self.block_size;
        &mut self.data[start..start + self.block_size]
    }

    #[inline]
    pub fn is_busy(&self, index: usize) -> bool {
        self.busy[index / GROUP_BITS] & (1 << (index % GROUP_BITS)) != 0
    }
}

impl BlockStore {
    /// 从游标开始循环扫描，认领第一个空闲块并把游标移到其后
    fn alloc_one(&mut self) -> Option<BlockId> {
        let index = (0..self.block_count)
            .map(|step| (self.cursor + step) % self.block_count)
            .find(|&index| !self.is_busy(index))?;

        self.busy[index / GROUP_BITS] |= 1 << (index % GROUP_BITS);
        self.free -= 1;
        self.cursor = (index + 1) % self.block_count;
        log::trace!("alloc block {index}");

        Some(BlockId(index))
    }
}

impl fmt::Debug for BlockStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockStore")
            .field("block_size", &self.block_size)
            .field("block_count", &self.block_count)
            .field("free", &self.free)
            .field("cursor", &self.cursor)
            .finish()
    }
}
