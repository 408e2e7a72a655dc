//! Block partitioning and the worker pool that fills a field block by block.
//!
//! The field is tiled by `cell_size` square blocks, enumerated row-major.
//! The flat block list is split into contiguous, near-equal ranges, one per
//! worker. Each worker owns mutable slices of exactly its blocks' rows, so
//! workers never share a cell and the field buffer needs no locking.

use std::ops::Range;

use crate::error::{FieldError, Result};
use crate::field::ScalarField;
use crate::noise::cell::evaluate;
use crate::noise::lattice::Lattice;
use crate::noise::params::DEFAULT_WORKERS;

/// One rectangular tile of the field, identified by its lattice cell `(bx, by)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub bx: usize,
    pub by: usize,
    /// Top-left pixel.
    pub x0: usize,
    pub y0: usize,
    /// Extent in pixels; smaller than the cell size on clipped edges.
    pub width: usize,
    pub height: usize,
}

/// Block grid covering a `width × height` field at `cell_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tiling {
    pub width: usize,
    pub height: usize,
    pub cell_size: usize,
    pub blocks_x: usize,
    pub blocks_y: usize,
}

impl Tiling {
    /// # Panics
    /// Panics if `cell_size` is zero.
    pub fn new(width: usize, height: usize, cell_size: usize) -> Self {
        assert!(cell_size > 0, "cell size must be non-zero");
        Self {
            width,
            height,
            cell_size,
            blocks_x: width.div_ceil(cell_size),
            blocks_y: height.div_ceil(cell_size),
        }
    }

    pub fn block_count(&self) -> usize {
        self.blocks_x * self.blocks_y
    }

    /// Block `index` in row-major block order.
    pub fn block(&self, index: usize) -> Block {
        let bx = index % self.blocks_x;
        let by = index / self.blocks_x;
        let x0 = bx * self.cell_size;
        let y0 = by * self.cell_size;
        Block {
            bx,
            by,
            x0,
            y0,
            width: self.cell_size.min(self.width - x0),
            height: self.cell_size.min(self.height - y0),
        }
    }

    pub fn blocks(&self) -> impl Iterator<Item = Block> + '_ {
        (0..self.block_count()).map(|i| self.block(i))
    }
}

/// Split `0..items` into `workers` contiguous ranges whose lengths differ by
/// at most one. The first `items % workers` ranges take the extra item.
/// Never returns an empty range; yields fewer ranges when `items < workers`.
pub fn partition(items: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.min(items);
    if workers == 0 {
        return Vec::new();
    }
    let base = items / workers;
    let extra = items % workers;
    let mut start = 0;
    (0..workers)
        .map(|w| {
            let len = base + usize::from(w < extra);
            let range = start..start + len;
            start += len;
            range
        })
        .collect()
}

/// Mutable view of one block's rows inside the shared field buffer.
struct BlockView<'f> {
    block: Block,
    rows: Vec<&'f mut [f32]>,
}

/// Carve `data` into disjoint per-block row slices, in row-major block order.
fn split_blocks<'f>(data: &'f mut [f32], tiling: &Tiling) -> Vec<BlockView<'f>> {
    let mut views: Vec<BlockView<'f>> = tiling
        .blocks()
        .map(|block| BlockView { block, rows: Vec::with_capacity(block.height) })
        .collect();
    if tiling.width == 0 {
        return views;
    }
    for (y, row) in data.chunks_mut(tiling.width).enumerate() {
        let by = y / tiling.cell_size;
        for (bx, segment) in row.chunks_mut(tiling.cell_size).enumerate() {
            views[by * tiling.blocks_x + bx].rows.push(segment);
        }
    }
    views
}

fn fill_block(view: &mut BlockView<'_>, lattice: &Lattice, cell_size: usize) {
    let Block { x0, y0, .. } = view.block;
    for (dy, row) in view.rows.iter_mut().enumerate() {
        for (dx, v) in row.iter_mut().enumerate() {
            *v = evaluate(lattice, cell_size, x0 + dx, y0 + dy);
        }
    }
}

/// Fixed-size pool that runs one noise pass over a field.
///
/// A fresh rayon pool is built per call and torn down when the pass
/// completes; the caller blocks until every block is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockScheduler {
    workers: usize,
}

impl Default for BlockScheduler {
    fn default() -> Self {
        Self { workers: DEFAULT_WORKERS }
    }
}

impl BlockScheduler {
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(FieldError::InvalidWorkerCount);
        }
        Ok(Self { workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Block index ranges handed to each worker for `block_count` blocks.
    pub fn assignments(&self, block_count: usize) -> Vec<Range<usize>> {
        partition(block_count, self.workers)
    }

    /// Fill `field` with one noise pass over `lattice` at `cell_size`.
    ///
    /// The lattice must cover the field (see [`Lattice::for_field`]). Returns
    /// immediately on an empty field.
    #[tracing::instrument(
        level = "trace",
        skip(self, field, lattice),
        fields(workers = self.workers)
    )]
    pub fn fill(&self, field: &mut ScalarField, cell_size: usize, lattice: &Lattice) -> Result<()> {
        let width = field.width();
        let height = field.height();
        if cell_size == 0 {
            return Err(FieldError::InvalidCellSize { cell_size, width, height });
        }
        let tiling = Tiling::new(width, height, cell_size);
        debug_assert!(lattice.width() > tiling.blocks_x && lattice.height() > tiling.blocks_y);

        let ranges = self.assignments(tiling.block_count());
        if ranges.is_empty() {
            return Ok(());
        }

        let threads = ranges.len();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("gradfield-worker-{i}"))
            .build()?;

        let mut views = split_blocks(field.data_mut(), &tiling);
        let mut rest: &mut [BlockView<'_>] = &mut views;
        // Scope returns only after every spawned worker has finished.
        pool.scope(move |scope| {
            for range in ranges {
                let (mine, tail) = std::mem::take(&mut rest).split_at_mut(range.len());
                rest = tail;
                scope.spawn(move |_| {
                    for view in mine.iter_mut() {
                        fill_block(view, lattice, cell_size);
                    }
                });
            }
        });

        tracing::trace!(blocks = tiling.block_count(), threads, "pass complete");
        Ok(())
    }

    /// Allocate a `width × height` field and fill it with one pass.
    pub fn generate_field(
        &self,
        width: usize,
        height: usize,
        cell_size: usize,
        lattice: &Lattice,
    ) -> Result<ScalarField> {
        let mut field = ScalarField::zeroed(width, height);
        self.fill(&mut field, cell_size, lattice)?;
        Ok(field)
    }
}
