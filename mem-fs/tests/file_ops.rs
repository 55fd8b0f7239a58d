use mem_fs::{Fd, MemFileSystem};
use vfs::{DirEntryType, Error};

const BLOCK_SIZE: usize = 4;

fn init(blocks: usize) -> MemFileSystem {
    let _ = env_logger::builder().is_test(true).try_init();
    MemFileSystem::new(blocks, BLOCK_SIZE).unwrap()
}

#[test]
fn hello_world() {
    let mut fs = init(16);
    fs.create("f").unwrap();
    let fd = fs.open("f").unwrap();

    assert_eq!(fs.write(fd, b"Hello world!"), Ok(12));
    fs.seek(fd, 0).unwrap();
    assert_eq!(fs.read(fd, 12).unwrap(), b"Hello world!");

    let stat = fs.stat("f").unwrap();
    assert_eq!(stat.size, 12);
    assert_eq!(stat.blocks, 12usize.div_ceil(BLOCK_SIZE) as u64);
    assert_eq!(stat.mode, DirEntryType::Regular);
    assert_eq!(stat.links, 1);
}

#[test]
fn round_trip_across_blocks() {
    let mut fs = init(16);
    fs.create("f").unwrap();
    let fd = fs.open("f").unwrap();

    fs.write(fd, b"0123456789").unwrap();
    fs.seek(fd, 3).unwrap();
    fs.write(fd, b"abcdef").unwrap();
    assert_eq!(fs.tell(fd), Ok(9));

    fs.seek(fd, 0).unwrap();
    assert_eq!(fs.read(fd, 10).unwrap(), b"012abcdef9");
    fs.seek(fd, 2).unwrap();
    assert_eq!(fs.read(fd, 5).unwrap(), b"2abcd");
}

#[test]
fn sparse_truncate() {
    let mut fs = init(16);
    fs.create("f").unwrap();
    assert_eq!(fs.stat("f").unwrap().size, 0);

    let fd = fs.open("f").unwrap();
    fs.truncate(fd, 15).unwrap();
    assert_eq!(fs.read(fd, 15).unwrap(), [0; 15]);

    let stat = fs.stat("f").unwrap();
    assert_eq!(stat.size, 15);
    assert_eq!(stat.blocks, 0);
    assert_eq!(fs.free_blocks(), 16);
}

#[test]
fn sparse_tail_after_data() {
    let mut fs = init(16);
    fs.create("f").unwrap();
    let fd = fs.open("f").unwrap();

    fs.write(fd, b"abc").unwrap();
    fs.truncate(fd, 10).unwrap();
    assert_eq!(fs.stat("f").unwrap().size, 10);
    assert_eq!(fs.stat("f").unwrap().blocks, 1);

    fs.seek(fd, 0).unwrap();
    assert_eq!(fs.read(fd, 10).unwrap(), b"abc\0\0\0\0\0\0\0");
}

#[test]
fn write_inside_hole() {
    let mut fs = init(16);
    fs.create("f").unwrap();
    let fd = fs.open("f").unwrap();

    fs.truncate(fd, 20).unwrap();
    fs.seek(fd, 9).unwrap();
    fs.write(fd, b"xyz").unwrap();

    let stat = fs.stat("f").unwrap();
    assert_eq!(stat.size, 20);
    assert_eq!(stat.blocks, 3);

    fs.seek(fd, 0).unwrap();
    let data = fs.read(fd, 20).unwrap();
    assert_eq!(&data[..9], [0; 9]);
    assert_eq!(&data[9..12], b"xyz");
    assert_eq!(&data[12..], [0; 8]);
}

#[test]
fn write_past_hole_extends() {
    let mut fs = init(16);
    fs.create("f").unwrap();
    let fd = fs.open("f").unwrap();

    fs.truncate(fd, 6).unwrap();
    fs.seek(fd, 5).unwrap();
    fs.write(fd, b"tail").unwrap();
    assert_eq!(fs.stat("f").unwrap().size, 9);

    fs.seek(fd, 0).unwrap();
    assert_eq!(fs.read(fd, 9).unwrap(), b"\0\0\0\0\0tail");
}

#[test]
fn read_past_end() {
    let mut fs = init(16);
    fs.create("f").unwrap();
    let fd = fs.open("f").unwrap();
    fs.write(fd, b"abc").unwrap();

    fs.seek(fd, 1).unwrap();
    assert_eq!(
        fs.read(fd, 3),
        Err(Error::OutOfRange {
            offset: 1,
            count: 3,
            size: 3
        })
    );
    // 失败的读取不移动游标
    assert_eq!(fs.read(fd, 2).unwrap(), b"bc");
    assert_eq!(fs.read(fd, 0).unwrap(), b"");
}

#[test]
fn seek_past_end_is_ignored() {
    let mut fs = init(16);
    fs.create("f").unwrap();
    let fd = fs.open("f").unwrap();
    fs.write(fd, b"abcdef").unwrap();
    fs.seek(fd, 2).unwrap();

    assert_eq!(fs.seek(fd, 6), Ok(()));
    assert_eq!(fs.tell(fd), Ok(2));
    assert_eq!(fs.seek(fd, 100), Ok(()));
    assert_eq!(fs.tell(fd), Ok(2));

    fs.seek(fd, 5).unwrap();
    assert_eq!(fs.tell(fd), Ok(5));
}

#[test]
fn shrink_releases_whole_blocks() {
    let mut fs = init(16);
    fs.create("f").unwrap();
    let fd = fs.open("f").unwrap();
    fs.write(fd, b"Hello world!").unwrap();
    assert_eq!(fs.free_blocks(), 13);

    fs.truncate(fd, 5).unwrap();
    let stat = fs.stat("f").unwrap();
    assert_eq!((stat.size, stat.blocks), (5, 2));
    assert_eq!(fs.free_blocks(), 14);
    // 游标收缩到新大小之前
    assert_eq!(fs.tell(fd), Ok(4));

    fs.truncate(fd, 8).unwrap();
    fs.seek(fd, 0).unwrap();
    assert_eq!(fs.read(fd, 8).unwrap(), b"Hello\0\0\0");

    fs.truncate(fd, 0).unwrap();
    assert_eq!(fs.tell(fd), Ok(0));
    assert_eq!(fs.stat("f").unwrap().blocks, 0);
    assert_eq!(fs.free_blocks(), 16);
}

#[test]
fn shrink_into_hole_keeps_data() {
    let mut fs = init(16);
    fs.create("f").unwrap();
    let fd = fs.open("f").unwrap();
    fs.write(fd, b"abcd").unwrap();
    fs.truncate(fd, 12).unwrap();
    fs.truncate(fd, 6).unwrap();

    let stat = fs.stat("f").unwrap();
    assert_eq!((stat.size, stat.blocks), (6, 1));
    fs.seek(fd, 0).unwrap();
    assert_eq!(fs.read(fd, 6).unwrap(), b"abcd\0\0");
}

#[test]
fn truncate_to_same_size_keeps_cursor() {
    let mut fs = init(16);
    fs.create("f").unwrap();
    let fd = fs.open("f").unwrap();
    fs.write(fd, b"abcd").unwrap();

    fs.truncate(fd, 4).unwrap();
    assert_eq!(fs.tell(fd), Ok(4));
}

#[test]
fn exhaustion_is_reported() {
    let mut fs = init(4);
    fs.create("a").unwrap();
    fs.create("b").unwrap();
    let a = fs.open("a").unwrap();
    let b = fs.open("b").unwrap();

    fs.write(a, b"0123456789abcdef").unwrap();
    assert_eq!(fs.free_blocks(), 0);

    assert_eq!(
        fs.write(b, b"x"),
        Err(Error::NoSpace {
            requested: 1,
            free: 0
        })
    );
    let stat = fs.stat("b").unwrap();
    assert_eq!((stat.size, stat.blocks), (0, 0));
    assert_eq!(fs.tell(b), Ok(0));

    // 已有块内的覆盖写不需要新块
    fs.seek(a, 0).unwrap();
    assert_eq!(fs.write(a, b"ABCD"), Ok(4));
    assert!(matches!(fs.write(a, &[0; 13]), Err(Error::NoSpace { .. })));

    fs.seek(a, 0).unwrap();
    assert_eq!(fs.read(a, 16).unwrap(), b"ABCD456789abcdef");
}

#[test]
fn empty_write() {
    let mut fs = init(1);
    fs.create("f").unwrap();
    let fd = fs.open("f").unwrap();
    assert_eq!(fs.write(fd, b""), Ok(0));
    assert_eq!(fs.free_blocks(), 1);
}

#[test]
fn invalid_descriptor() {
    let mut fs = init(4);
    let fd = Fd::from(7);

    assert_eq!(fs.close(fd), Err(Error::InvalidDescriptor(7)));
    assert_eq!(fs.seek(fd, 0), Err(Error::InvalidDescriptor(7)));
    assert_eq!(fs.read(fd, 1), Err(Error::InvalidDescriptor(7)));
    assert_eq!(fs.write(fd, b"x"), Err(Error::InvalidDescriptor(7)));
    assert_eq!(fs.truncate(fd, 1), Err(Error::InvalidDescriptor(7)));
}

#[test]
fn invalid_geometry() {
    assert!(matches!(
        MemFileSystem::new(0, 4),
        Err(Error::InvalidGeometry { .. })
    ));
}

#[test]
fn huge_read_count() {
    let mut fs = init(4);
    fs.create("f").unwrap();
    let fd = fs.open("f").unwrap();
    fs.write(fd, b"abc").unwrap();
    fs.seek(fd, 1).unwrap();

    assert_eq!(
        fs.read(fd, usize::MAX),
        Err(Error::OutOfRange {
            offset: 1,
            count: usize::MAX,
            size: 3
        })
    );
    assert_eq!(fs.tell(fd), Ok(1));
}

#[test]
fn write_end_overflows() {
    let mut fs = init(4);
    fs.create("f").unwrap();
    let fd = fs.open("f").unwrap();
    fs.truncate(fd, usize::MAX).unwrap();
    fs.seek(fd, usize::MAX - 1).unwrap();

    assert_eq!(
        fs.write(fd, b"xy"),
        Err(Error::OutOfRange {
            offset: usize::MAX - 1,
            count: 2,
            size: usize::MAX
        })
    );
    assert_eq!(fs.tell(fd), Ok(usize::MAX - 1));
    let stat = fs.stat("f").unwrap();
    assert_eq!((stat.size, stat.blocks), (usize::MAX as u64, 0));
    assert_eq!(fs.free_blocks(), 4);
}
