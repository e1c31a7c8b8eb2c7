use rand::Rng;
use rand::seq::SliceRandom;

/// One pixel coordinate together with the partition it hashes into.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PixelKey {
    pub row: usize,
    pub col: usize,
    pub segment: usize,
}

/// Splits the pixel grid into disjoint, shuffled partitions.
///
/// A pixel belongs to exactly one segment, derived as
/// `(row * width + col) % segment_count` -- the invariant the framebuffer's
/// per-segment locking relies on. Membership is therefore deterministic;
/// only each partition's *visiting order* is randomized.
///
/// Rows and columns are shuffled independently before assignment, so a
/// partition's pixels are spatially decorrelated: a half-finished render
/// shows scattered coverage instead of a clean top half.
#[derive(Clone, Debug)]
pub struct Partitioner {
    pub width: usize,
    pub height: usize,
    chunks: Vec<Vec<PixelKey>>,
}

impl Partitioner {
    pub fn new<R: Rng>(width: usize, height: usize, segment_count: usize,
        rng: &mut R) -> Partitioner {
        let mut rows: Vec<usize> = (0..height).collect();
        let mut cols: Vec<usize> = (0..width).collect();
        rows.shuffle(rng);
        cols.shuffle(rng);

        let mut chunks = vec![Vec::new(); segment_count];
        for &col in cols.iter() {
            for &row in rows.iter() {
                let segment = (row * width + col) % segment_count;
                chunks[segment].push(PixelKey { row, col, segment });
            }
        }

        Partitioner { width, height, chunks }
    }

    pub fn segment_count(&self) -> usize {
        self.chunks.len()
    }

    /// The pixels assigned to the given chunk, in visiting order.
    ///
    /// Panics if `chunk >= segment_count()`; callers must never construct
    /// an out-of-range partition id.
    pub fn chunk_pixels(&self, chunk: usize) -> &[PixelKey] {
        &self.chunks[chunk]
    }
}

/* Tests */

#[cfg(test)]
fn test_rng() -> rand::rngs::StdRng {
    use rand::SeedableRng;
    rand::rngs::StdRng::seed_from_u64(42)
}

#[test]
fn partitions_cover_every_pixel_once() {
    use std::collections::HashSet;

    let p = Partitioner::new(10, 10, 4, &mut test_rng());

    let mut seen = HashSet::new();
    let mut total = 0;
    for chunk in 0..p.segment_count() {
        for pixel in p.chunk_pixels(chunk) {
            seen.insert((pixel.row, pixel.col));
            total += 1;
        }
    }

    // No pixel dropped, none duplicated
    assert_eq!(total, 100);
    assert_eq!(seen.len(), 100);
    for row in 0..10 {
        for col in 0..10 {
            assert!(seen.contains(&(row, col)));
        }
    }
}

#[test]
fn segment_assignment_is_deterministic() {
    let p = Partitioner::new(10, 10, 4, &mut test_rng());

    for chunk in 0..p.segment_count() {
        for pixel in p.chunk_pixels(chunk) {
            assert_eq!(pixel.segment, chunk);
            assert_eq!((pixel.row * 10 + pixel.col) % 4, chunk);
        }
    }
}

#[test]
fn single_segment_takes_everything() {
    let p = Partitioner::new(7, 3, 1, &mut test_rng());

    assert_eq!(p.segment_count(), 1);
    assert_eq!(p.chunk_pixels(0).len(), 21);
}

#[test]
#[should_panic]
fn out_of_range_chunk_panics() {
    let p = Partitioner::new(4, 4, 2, &mut test_rng());
    p.chunk_pixels(2);
}
