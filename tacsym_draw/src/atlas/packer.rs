// Copyright 2026 the Tacsym Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shelf rectangle packer.
//!
//! Rectangles are placed on horizontal shelves. Each shelf keeps a sorted list of free segments
//! so freed space is reused; an empty shelf at the bottom is reclaimed entirely.

use smallvec::SmallVec;

use super::AtlasRegion;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Segment {
    x: u32,
    width: u32,
}

#[derive(Clone, Debug)]
struct Shelf {
    y: u32,
    height: u32,
    /// Free segments sorted by `x`, never adjacent.
    free: SmallVec<[Segment; 4]>,
}

impl Shelf {
    fn new(y: u32, height: u32, width: u32) -> Self {
        let mut free = SmallVec::new();
        free.push(Segment { x: 0, width });
        Self { y, height, free }
    }

    fn is_empty(&self, width: u32) -> bool {
        self.free.len() == 1 && self.free[0] == Segment { x: 0, width }
    }

    /// Index of the narrowest free segment at least `width` wide.
    fn best_segment(&self, width: u32) -> Option<usize> {
        self.free
            .iter()
            .enumerate()
            .filter(|(_, s)| s.width >= width)
            .min_by_key(|(_, s)| s.width)
            .map(|(i, _)| i)
    }

    fn take(&mut self, index: usize, width: u32) -> u32 {
        let segment = &mut self.free[index];
        let x = segment.x;
        if segment.width == width {
            self.free.remove(index);
        } else {
            segment.x += width;
            segment.width -= width;
        }
        x
    }

    fn release(&mut self, x: u32, width: u32) {
        let index = self.free.partition_point(|s| s.x < x);
        self.free.insert(index, Segment { x, width });
        // Merge with the following segment, then the preceding one.
        if index + 1 < self.free.len() && x + width == self.free[index + 1].x {
            self.free[index].width += self.free[index + 1].width;
            self.free.remove(index + 1);
        }
        if index > 0 {
            let prev = self.free[index - 1];
            if prev.x + prev.width == x {
                self.free[index - 1].width += self.free[index].width;
                self.free.remove(index);
            }
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct ShelfPacker {
    width: u32,
    height: u32,
    shelves: Vec<Shelf>,
}

impl ShelfPacker {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            shelves: Vec::new(),
        }
    }

    pub(crate) fn width(&self) -> u32 {
        self.width
    }

    pub(crate) fn height(&self) -> u32 {
        self.height
    }

    /// Finds space for a `width` x `height` rectangle.
    ///
    /// Prefers the shelf that wastes the least height, then opens a new shelf below the last one.
    pub(crate) fn allocate(&mut self, width: u32, height: u32) -> Option<AtlasRegion> {
        if width == 0 || height == 0 || width > self.width {
            return None;
        }
        let mut best: Option<(usize, usize, u32)> = None;
        for (shelf_index, shelf) in self.shelves.iter().enumerate() {
            if shelf.height < height {
                continue;
            }
            let waste = shelf.height - height;
            if best.is_some_and(|(_, _, w)| w <= waste) {
                continue;
            }
            if let Some(segment) = shelf.best_segment(width) {
                best = Some((shelf_index, segment, waste));
            }
        }
        if let Some((shelf_index, segment, _)) = best {
            let shelf = &mut self.shelves[shelf_index];
            let x = shelf.take(segment, width);
            return Some(AtlasRegion::new(x, shelf.y, width, height));
        }

        let y = self.shelves.last().map_or(0, |s| s.y + s.height);
        if y + height > self.height {
            return None;
        }
        let mut shelf = Shelf::new(y, height, self.width);
        let x = shelf.take(0, width);
        self.shelves.push(shelf);
        Some(AtlasRegion::new(x, y, width, height))
    }

    /// Returns a region obtained from [`allocate`](Self::allocate).
    pub(crate) fn deallocate(&mut self, region: AtlasRegion) {
        let Some(shelf) = self.shelves.iter_mut().find(|s| s.y == region.y) else {
            return;
        };
        shelf.release(region.x, region.width);
        while self
            .shelves
            .last()
            .is_some_and(|s| s.is_empty(self.width))
        {
            self.shelves.pop();
        }
    }

    /// Enlarges the packing area. Existing regions keep their positions.
    pub(crate) fn grow(&mut self, width: u32, height: u32) {
        debug_assert!(width >= self.width && height >= self.height);
        let old_width = self.width;
        if width > old_width {
            for shelf in &mut self.shelves {
                shelf.release(old_width, width - old_width);
            }
        }
        self.width = width;
        self.height = height;
    }

    pub(crate) fn clear(&mut self) {
        self.shelves.clear();
    }
}
