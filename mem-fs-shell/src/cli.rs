use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
pub struct Cli {
    /// Number of blocks in the store
    #[arg(long, short, default_value_t = mem_fs::DEFAULT_BLOCK_COUNT)]
    pub blocks: usize,

    /// Size of one block in bytes
    #[arg(long, short = 'S', default_value_t = mem_fs::DEFAULT_BLOCK_SIZE)]
    pub block_size: usize,

    /// Command script, one command per line; reads stdin when absent
    pub script: Option<PathBuf>,
}
