use std::io;
use std::io::{ BufWriter, Write };
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use crate::color::Color;
use crate::consts::CMAX;

/// An in-memory pixel store shared by all worker threads.
///
/// Pixels are grouped by partition: pixel index `idx = row * width + col`
/// belongs to segment `idx % segment_count`, and each segment's bytes sit
/// behind their own mutex. A worker writing a pixel only contends with
/// writers of the same segment, so under the intended one-worker-per-segment
/// assignment the locks never collide at all.
///
/// Within a segment, pixel `idx` lives at slot `idx / segment_count`; the
/// row-major flat layout is reassembled when reading a pixel back or saving
/// the image.
#[derive(Debug)]
pub struct Framebuffer {
    pub width: usize,
    pub height: usize,
    segment_count: usize,
    segments: Vec<Mutex<Vec<u8>>>,
}

impl Framebuffer {
    /// Allocates a black framebuffer.
    ///
    /// Built once at render start, before any worker spawns; segment counts
    /// and the grid never change afterwards.
    pub fn new(width: usize, height: usize, segment_count: usize)
        -> Framebuffer {
        let total = width * height;
        let segments = (0..segment_count).map(|segment| {
            // Segments share the pixels round-robin, so the first
            // `total % segment_count` segments hold one extra pixel
            let pixels = total / segment_count
                + if segment < total % segment_count { 1 } else { 0 };
            Mutex::new(vec![0u8; pixels * 3])
        }).collect();

        Framebuffer { width, height, segment_count, segments }
    }

    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    /// Writes a color to a pixel, holding only that pixel's segment lock.
    ///
    /// Channels are clamped into the byte range before the write. Writing
    /// the same color twice leaves the stored bytes unchanged.
    pub fn write_pixel(&self, row: usize, col: usize, color: &Color) {
        let idx = row * self.width + col;
        let segment = idx % self.segment_count;
        let slot = idx / self.segment_count;

        let bytes = color.to_bytes();
        let mut data = self.segments[segment].lock().unwrap();
        data[slot * 3..slot * 3 + 3].copy_from_slice(&bytes);
    }

    /// Reads a pixel's stored bytes back.
    pub fn read_pixel(&self, row: usize, col: usize) -> [u8; 3] {
        let idx = row * self.width + col;
        let segment = idx % self.segment_count;
        let slot = idx / self.segment_count;

        let data = self.segments[segment].lock().unwrap();
        [data[slot * 3], data[slot * 3 + 1], data[slot * 3 + 2]]
    }

    /// Saves the framebuffer to a PPM file, one pixel record per line.
    ///
    /// Meant to run after every worker has been joined; it takes each
    /// segment lock briefly while reassembling row-major order.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);

        writeln!(&mut out, "P3")?;
        writeln!(&mut out, "{} {}", self.width, self.height)?;
        writeln!(&mut out, "{}", CMAX)?;

        for row in 0..self.height {
            for col in 0..self.width {
                let [r, g, b] = self.read_pixel(row, col);
                writeln!(&mut out, "{} {} {}", r, g, b)?;
            }
        }

        out.flush()
    }
}

/* Tests */

#[test]
fn starts_black() {
    let fb = Framebuffer::new(4, 4, 3);

    for row in 0..4 {
        for col in 0..4 {
            assert_eq!(fb.read_pixel(row, col), [0, 0, 0]);
        }
    }
}

#[test]
fn write_then_read_back() {
    let fb = Framebuffer::new(8, 8, 4);
    fb.write_pixel(2, 5, &Color::rgb(1.0, 0.0, 0.5));

    assert_eq!(fb.read_pixel(2, 5), [255, 0, 128]);

    // Neighbors in adjacent segments are untouched
    assert_eq!(fb.read_pixel(2, 4), [0, 0, 0]);
    assert_eq!(fb.read_pixel(2, 6), [0, 0, 0]);
}

#[test]
fn write_is_idempotent() {
    let fb = Framebuffer::new(4, 4, 2);
    let color = Color::rgb(0.3, 0.6, 0.9);

    fb.write_pixel(1, 1, &color);
    let first = fb.read_pixel(1, 1);
    fb.write_pixel(1, 1, &color);

    assert_eq!(fb.read_pixel(1, 1), first);
}

#[test]
fn write_clamps_channels() {
    let fb = Framebuffer::new(2, 2, 1);
    fb.write_pixel(0, 0, &Color::rgb(2.0, -1.0, 0.5));

    assert_eq!(fb.read_pixel(0, 0), [255, 0, 128]);
}

#[test]
fn concurrent_writes_land_in_own_segments() {
    use std::sync::Arc;
    use std::thread;

    let segments = 4;
    let fb = Arc::new(Framebuffer::new(16, 16, segments));

    let handles: Vec<_> = (0..segments).map(|segment| {
        let fb = Arc::clone(&fb);
        thread::spawn(move || {
            for row in 0..16 {
                for col in 0..16 {
                    if (row * 16 + col) % segments == segment {
                        fb.write_pixel(row, col, &Color::rgb(1.0, 1.0, 1.0));
                    }
                }
            }
        })
    }).collect();

    for handle in handles {
        handle.join().unwrap();
    }

    for row in 0..16 {
        for col in 0..16 {
            assert_eq!(fb.read_pixel(row, col), [255, 255, 255]);
        }
    }
}

#[test]
fn save_writes_ppm_header_and_records() {
    let fb = Framebuffer::new(2, 2, 2);
    fb.write_pixel(0, 0, &Color::rgb(1.0, 0.0, 0.0));

    let path = std::env::temp_dir()
        .join(format!("rtiaw-fb-save-{}.ppm", std::process::id()));
    fb.save(&path).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(contents, "P3\n2 2\n255\n255 0 0\n0 0 0\n0 0 0\n0 0 0\n");
}
