//! Deterministic enumeration of rectangular work units over the domain.
//!
//! The partitioner walks the domain in row-major order with a single
//! advancing cursor. Together the emitted descriptors tile the domain
//! exactly: no gaps, no overlaps, no duplicates. Termination follows
//! from arithmetic alone — the cursor's y coordinate strictly increases
//! by the tile height every time a row is exhausted, so any positive
//! tile size reaches the domain bound.

use crate::config::Config;

/// Origin of the next tile to emit. Owned exclusively by one
/// [`Partitioner`]; monotonically advancing, never reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionCursor {
    /// X coordinate of the next tile origin
    pub x: u32,

    /// Y coordinate of the next tile origin
    pub y: u32,
}

/// One unit of work: a tile origin plus the domain-wide constants
/// needed to derive its extent.
///
/// Immutable value exchanged between the partitioner and exactly one
/// region processor invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionDescriptor {
    /// Tile origin x
    pub x: u32,

    /// Tile origin y
    pub y: u32,

    /// Total domain width in pixels
    pub domain_width: u32,

    /// Total domain height in pixels
    pub domain_height: u32,

    /// Nominal tile width in pixels
    pub tile_width: u32,

    /// Nominal tile height in pixels
    pub tile_height: u32,
}

impl PartitionDescriptor {
    /// Check that the tile origin lies inside the domain.
    pub fn origin_in_bounds(&self) -> bool {
        self.x < self.domain_width && self.y < self.domain_height
    }

    /// Derive the half-open pixel extent of this tile, clamped to the
    /// domain bound. Edge tiles come out narrower or shorter than the
    /// nominal tile size.
    pub fn extent(&self) -> TileExtent {
        TileExtent {
            x_start: self.x,
            x_end: self.x.saturating_add(self.tile_width).min(self.domain_width),
            y_start: self.y,
            y_end: self
                .y
                .saturating_add(self.tile_height)
                .min(self.domain_height),
        }
    }
}

/// Half-open pixel rectangle `[x_start, x_end) × [y_start, y_end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileExtent {
    pub x_start: u32,
    pub x_end: u32,
    pub y_start: u32,
    pub y_end: u32,
}

impl TileExtent {
    /// Width of the extent in pixels.
    pub fn width(&self) -> u32 {
        self.x_end - self.x_start
    }

    /// Height of the extent in pixels.
    pub fn height(&self) -> u32 {
        self.y_end - self.y_start
    }

    /// Number of pixels covered.
    pub fn pixel_count(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }
}

/// Row-major tile enumerator over the render domain.
#[derive(Debug)]
pub struct Partitioner {
    cursor: PartitionCursor,
    domain_width: u32,
    domain_height: u32,
    tile_width: u32,
    tile_height: u32,
}

impl Partitioner {
    /// Create a partitioner for the configured domain and tiling.
    ///
    /// Assumes the config has been validated: tile sizes must be
    /// positive for the traversal to terminate.
    pub fn new(config: &Config) -> Self {
        Self::with_dimensions(
            config.domain.width,
            config.domain.height,
            config.tiling.width,
            config.tiling.height,
        )
    }

    /// Create a partitioner from raw dimensions.
    pub fn with_dimensions(
        domain_width: u32,
        domain_height: u32,
        tile_width: u32,
        tile_height: u32,
    ) -> Self {
        Self {
            cursor: PartitionCursor { x: 0, y: 0 },
            domain_width,
            domain_height,
            tile_width,
            tile_height,
        }
    }

    /// Emit the next partition descriptor, or `None` once the domain
    /// is fully tiled. Exhaustion is stable: after the first `None`,
    /// every subsequent call returns `None`.
    pub fn next_partition(&mut self) -> Option<PartitionDescriptor> {
        if self.cursor.y >= self.domain_height {
            return None;
        }

        let descriptor = PartitionDescriptor {
            x: self.cursor.x,
            y: self.cursor.y,
            domain_width: self.domain_width,
            domain_height: self.domain_height,
            tile_width: self.tile_width,
            tile_height: self.tile_height,
        };

        // Advance in x; wrap to the next row when the row is covered.
        self.cursor.x = self.cursor.x.saturating_add(self.tile_width);
        if self.cursor.x >= self.domain_width {
            self.cursor.x = 0;
            self.cursor.y = self.cursor.y.saturating_add(self.tile_height);
        }

        tracing::trace!("Partition emitted at ({}, {})", descriptor.x, descriptor.y);

        Some(descriptor)
    }

    /// Total number of tiles this partitioner will emit.
    pub fn num_partitions(&self) -> u64 {
        let cols = self.domain_width.div_ceil(self.tile_width) as u64;
        let rows = self.domain_height.div_ceil(self.tile_height) as u64;
        cols * rows
    }

    /// Current cursor position, for inspection.
    pub fn cursor(&self) -> PartitionCursor {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn collect(mut p: Partitioner) -> Vec<PartitionDescriptor> {
        let mut out = Vec::new();
        while let Some(d) = p.next_partition() {
            out.push(d);
        }
        out
    }

    #[test]
    fn test_four_by_four_with_two_by_two_tiles() {
        let p = Partitioner::with_dimensions(4, 4, 2, 2);
        let descriptors = collect(p);

        let origins: Vec<(u32, u32)> = descriptors.iter().map(|d| (d.x, d.y)).collect();
        assert_eq!(origins, vec![(0, 0), (2, 0), (0, 2), (2, 2)]);
    }

    #[test]
    fn test_exhaustion_is_stable() {
        let mut p = Partitioner::with_dimensions(4, 4, 2, 2);
        while p.next_partition().is_some() {}

        for _ in 0..10 {
            assert!(p.next_partition().is_none());
        }
    }

    #[test]
    fn test_boundary_clamping() {
        // Domain width 100 with tile width 30: origins 0, 30, 60, 90
        // and the last extent clamps to width 10 (90..100), not 30.
        let p = Partitioner::with_dimensions(100, 30, 30, 30);
        let descriptors = collect(p);

        let xs: Vec<u32> = descriptors.iter().map(|d| d.x).collect();
        assert_eq!(xs, vec![0, 30, 60, 90]);

        let last = descriptors.last().unwrap().extent();
        assert_eq!(last.x_start, 90);
        assert_eq!(last.x_end, 100);
        assert_eq!(last.width(), 10);
    }

    #[test]
    fn test_tiling_completeness() {
        // Deliberately non-divisible dimensions in both axes.
        let p = Partitioner::with_dimensions(37, 23, 8, 5);
        let descriptors = collect(p);

        let mut seen: HashSet<(u32, u32)> = HashSet::new();
        for d in &descriptors {
            let e = d.extent();
            for y in e.y_start..e.y_end {
                for x in e.x_start..e.x_end {
                    assert!(seen.insert((x, y)), "pixel ({x}, {y}) covered twice");
                }
            }
        }

        // Every domain pixel exactly once.
        assert_eq!(seen.len(), 37 * 23);
        for y in 0..23 {
            for x in 0..37 {
                assert!(seen.contains(&(x, y)), "pixel ({x}, {y}) never covered");
            }
        }
    }

    #[test]
    fn test_num_partitions_matches_enumeration() {
        for (w, h, tw, th) in [(4, 4, 2, 2), (100, 30, 30, 30), (37, 23, 8, 5), (1, 1, 64, 64)] {
            let p = Partitioner::with_dimensions(w, h, tw, th);
            let expected = p.num_partitions();
            assert_eq!(collect(p).len() as u64, expected);
        }
    }

    #[test]
    fn test_tile_larger_than_domain() {
        let p = Partitioner::with_dimensions(10, 10, 64, 64);
        let descriptors = collect(p);
        assert_eq!(descriptors.len(), 1);

        let e = descriptors[0].extent();
        assert_eq!((e.width(), e.height()), (10, 10));
    }

    #[test]
    fn test_one_by_one_tiles() {
        let p = Partitioner::with_dimensions(3, 2, 1, 1);
        let descriptors = collect(p);
        assert_eq!(descriptors.len(), 6);
        assert_eq!(descriptors[0].extent().pixel_count(), 1);
    }

    #[test]
    fn test_cursor_monotonic() {
        let mut p = Partitioner::with_dimensions(9, 9, 4, 4);
        let mut prev = p.cursor();
        while p.next_partition().is_some() {
            let cur = p.cursor();
            assert!(
                cur.y > prev.y || (cur.y == prev.y && cur.x > prev.x) || cur.y >= 9,
                "cursor moved backwards: {prev:?} -> {cur:?}"
            );
            prev = cur;
        }
    }
}
