use alloc::string::String;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("file {0} already exists")]
    AlreadyExists(String),
    #[error("file {0} does not exist")]
    NotFound(String),
    #[error("invalid fd: {0}")]
    InvalidDescriptor(usize),
    /// 读取越过了文件的逻辑大小
    #[error("out of file size: offset {offset} + count {count} exceeds size {size}")]
    OutOfRange {
        offset: usize,
        count: usize,
        size: usize,
    },
    /// 块池剩余容量不足以满足分配
    #[error("no space left: {requested} blocks requested, {free} free")]
    NoSpace { requested: usize, free: usize },
    #[error("invalid geometry: {blocks} blocks of {block_size} bytes")]
    InvalidGeometry { blocks: usize, block_size: usize },
}
