#![no_std]

extern crate alloc;

/* mem-fs 的整体架构，自上而下 */

// 文件系统层：名字、描述符与 inode 的协同
mod fs;

// 描述符层：打开文件的游标
mod fd;

// 名字表：文件名到 inode 的扁平映射
mod names;

// 索引节点层：文件的元信息与块列表
mod inode;

// 惰性区间：增长截断产生、尚未分配存储的空洞
mod extent;

// 块池：固定数量、固定大小的内存块
mod store;

pub use self::{fd::Fd, fs::MemFileSystem, inode::InodeId};

pub const DEFAULT_BLOCK_SIZE: usize = 16;
pub const DEFAULT_BLOCK_COUNT: usize = 64;

pub type Result<T> = core::result::Result<T, vfs::Error>;
