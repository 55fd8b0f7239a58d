//! # 惰性区间
//!
//! 增长截断不会立刻分配块，而是记下一段逻辑上为零、尚无存储的字节区间。
//! 区间互不重叠、按起点有序，相邻区间会被合并。

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::ops::Range;

/// 一段字节区间的归属
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// 由块承载
    Backed(Range<usize>),
    /// 落在空洞内，读出为零
    Lazy(Range<usize>),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LazyExtents {
    /// 起点 -> 终点(exclusive)
    ranges: BTreeMap<usize, usize>,
}

impl LazyExtents {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// 所有区间的总长度
    pub fn len(&self) -> usize {
        self.ranges.iter().map(|(start, end)| end - start).sum()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        self.ranges.iter().map(|(&start, &end)| start..end)
    }

    /// 加入区间，与重叠或相邻的区间合并
    pub fn insert(&mut self, range: Range<usize>) {
        if range.is_empty() {
            return;
        }

        let Range { mut start, mut end } = range;
        let touching: Vec<usize> = self
            .ranges
            .range(..=end)
            .filter(|&(_, &e)| e >= start)
            .map(|(&s, _)| s)
            .collect();

        for s in touching {
            if let Some(e) = self.ranges.remove(&s) {
                start = start.min(s);
                end = end.max(e);
            }
        }
        self.ranges.insert(start, end);
    }

    /// 从集合中挖去区间，被截断的区间保留剩余部分
    pub fn remove(&mut self, range: Range<usize>) {
        if range.is_empty() {
            return;
        }

        let overlapping: Vec<(usize, usize)> = self
            .ranges
            .range(..range.end)
            .filter(|&(_, &e)| e > range.start)
            .map(|(&s, &e)| (s, e))
            .collect();

        for (s, e) in overlapping {
            self.ranges.remove(&s);
            if s < range.start {
                self.ranges.insert(s, range.start);
            }
            if e > range.end {
                self.ranges.insert(range.end, e);
            }
        }
    }

    pub fn clear(&mut self) {
        self.ranges.clear();
    }

    /// 按空洞把 `range` 切分为交替的承载段与惰性段
    pub fn segments(&self, range: Range<usize>) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut pos = range.start;

        for (&start, &end) in self.ranges.range(..range.end) {
            if end <= pos {
                continue;
            }
            let start = start.max(pos);
            if pos < start {
                segments.push(Segment::Backed(pos..start));
            }
            let stop = end.min(range.end);
            segments.push(Segment::Lazy(start..stop));
            pos = stop;
        }

        if pos < range.end {
            segments.push(Segment::Backed(pos..range.end));
        }
        segments
    }
}
