use std::fs::{ File, OpenOptions };
use std::io;
use std::io::{ BufWriter, Read, Seek, SeekFrom, Write };
use std::path::{ Path, PathBuf };

use crate::color::Color;
use crate::consts::CMAX;
use crate::sink::SinkError;

/// The marker line separating the PPM header from the pixel records.
///
/// Read back and verified before every random-access write; a mismatch
/// means the file has shifted or been overwritten, and writing at computed
/// offsets would corrupt it further.
pub const SENTINEL: &'static str = "#sentinel pixels start below";

/// Every pixel record is exactly this wide: three zero-padded 3-digit
/// channels, two spaces and a newline. Offset arithmetic depends on it.
pub const RECORD_WIDTH: u64 = 12;

/// A "Portable Pixmap" writer in "P3" mode (ASCII, full color) supporting
/// random-access pixel writes.
///
/// Construction pre-allocates the whole file: header, sentinel line, then
/// one placeholder record per pixel in row-major order. Every later write
/// is an in-place overwrite of a fixed-width record, never an insert, so
/// independent workers can fill pixels in any order without buffering the
/// image in memory.
///
/// A single `PpmWriter` must not be shared across threads: interleaved
/// seek/write pairs on one handle corrupt offsets. Each worker gets its
/// own handle to the same path via `reopen`.
#[derive(Debug)]
pub struct PpmWriter {
    file: File,
    path: PathBuf,
    width: usize,
    height: usize,

    /// Byte offset immediately after the header, where the sentinel line
    /// begins.
    sentinel_offset: u64,
}

impl PpmWriter {
    /// Creates the image file, overwriting it if it already exists, and
    /// pre-allocates every pixel record with the placeholder canvas color.
    pub fn create<P: AsRef<Path>>(path: P, width: usize, height: usize,
        canvas: &Color) -> io::Result<PpmWriter> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;

        write!(&mut file, "P3\n{} {}\n{}\n", width, height, CMAX)?;
        let sentinel_offset = file.seek(SeekFrom::Current(0))?;

        {
            let mut out = BufWriter::new(&mut file);
            write!(&mut out, "{}\n", SENTINEL)?;

            let placeholder = format_record(canvas);
            for _ in 0..width * height {
                out.write_all(placeholder.as_bytes())?;
            }
            out.flush()?;
        }

        Ok(PpmWriter { file, path, width, height, sentinel_offset })
    }

    /// Opens an independent handle to an image created by `create`.
    ///
    /// This is how each worker thread gets its own seek position; the
    /// underlying file and its layout are shared.
    pub fn reopen(&self) -> io::Result<PpmWriter> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.path)?;

        Ok(PpmWriter {
            file,
            path: self.path.clone(),
            width: self.width,
            height: self.height,
            sentinel_offset: self.sentinel_offset,
        })
    }

    /// Overwrites one pixel record in place.
    ///
    /// The sentinel line is read back first; if it no longer matches, the
    /// file is treated as compromised and nothing is written.
    pub fn write_pixel(&mut self, color: &Color, row: usize, col: usize)
        -> Result<(), SinkError> {
        self.check_sentinel()?;

        self.file.seek(SeekFrom::Start(self.record_offset(row, col)))?;
        self.file.write_all(format_record(color).as_bytes())?;

        Ok(())
    }

    /// Reads one pixel record back by its recomputed offset.
    pub fn read_pixel(&mut self, row: usize, col: usize)
        -> io::Result<[u8; 3]> {
        self.file.seek(SeekFrom::Start(self.record_offset(row, col)))?;

        let mut record = [0u8; RECORD_WIDTH as usize];
        self.file.read_exact(&mut record)?;

        parse_record(&record)
    }

    /// Flushes buffered writes down to the OS.
    pub fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }

    fn record_offset(&self, row: usize, col: usize) -> u64 {
        let sentinel_line = SENTINEL.len() as u64 + 1;
        self.sentinel_offset + sentinel_line
            + row as u64 * (RECORD_WIDTH * self.width as u64)
            + col as u64 * RECORD_WIDTH
    }

    fn check_sentinel(&mut self) -> Result<(), SinkError> {
        self.file.seek(SeekFrom::Start(self.sentinel_offset))?;

        let mut found = vec![0u8; SENTINEL.len()];
        self.file.read_exact(&mut found)?;

        if found != SENTINEL.as_bytes() {
            return Err(SinkError::Corrupt {
                expected: SENTINEL.to_string(),
                found: String::from_utf8_lossy(&found).into_owned(),
            });
        }

        Ok(())
    }
}

fn format_record(color: &Color) -> String {
    let [r, g, b] = color.to_bytes();
    format!("{:0>3} {:0>3} {:0>3}\n", r, g, b)
}

fn parse_record(record: &[u8]) -> io::Result<[u8; 3]> {
    let text = std::str::from_utf8(record)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let mut channels = [0u8; 3];
    for (i, field) in text.trim_end().split(' ').take(3).enumerate() {
        channels[i] = field.parse()
            .map_err(|e: std::num::ParseIntError| {
                io::Error::new(io::ErrorKind::InvalidData, e)
            })?;
    }

    Ok(channels)
}

/* Tests */

#[cfg(test)]
fn temp_image(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("rtiaw-{}-{}.ppm", name, std::process::id()))
}

#[cfg(test)]
fn canvas_color() -> Color {
    Color::from_bytes(180, 255, 200)
}

#[test]
fn record_is_fixed_width() {
    assert_eq!(format_record(&Color::rgb(0.0, 0.0, 0.0)).len(),
        RECORD_WIDTH as usize);
    assert_eq!(format_record(&Color::rgb(1.0, 1.0, 1.0)).len(),
        RECORD_WIDTH as usize);
    assert_eq!(format_record(&Color::rgb(0.02, 0.5, 0.9)),
        "005 128 230\n");
}

#[test]
fn preallocated_records_hold_canvas_color() {
    let path = temp_image("prealloc");
    let mut writer = PpmWriter::create(&path, 6, 5, &canvas_color()).unwrap();

    assert_eq!(writer.read_pixel(0, 0).unwrap(), [180, 255, 200]);
    assert_eq!(writer.read_pixel(2, 3).unwrap(), [180, 255, 200]);
    assert_eq!(writer.read_pixel(4, 5).unwrap(), [180, 255, 200]);

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn header_and_sentinel_layout() {
    let path = temp_image("header");
    let _writer = PpmWriter::create(&path, 3, 2, &canvas_color()).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let mut lines = contents.lines();
    assert_eq!(lines.next(), Some("P3"));
    assert_eq!(lines.next(), Some("3 2"));
    assert_eq!(lines.next(), Some("255"));
    assert_eq!(lines.next(), Some(SENTINEL));
    assert_eq!(lines.next(), Some("180 255 200"));

    // Header + sentinel + one fixed-width record per pixel, nothing more
    let header_len = "P3\n3 2\n255\n".len() + SENTINEL.len() + 1;
    assert_eq!(contents.len(), header_len + 6 * RECORD_WIDTH as usize);
}

#[test]
fn write_then_read_back_by_offset() {
    let path = temp_image("roundtrip");
    let mut writer = PpmWriter::create(&path, 4, 4, &canvas_color()).unwrap();

    writer.write_pixel(&Color::rgb(0.5, 0.7, 1.0), 1, 2).unwrap();

    assert_eq!(writer.read_pixel(1, 2).unwrap(), [128, 179, 255]);

    // Neighboring records keep the placeholder
    assert_eq!(writer.read_pixel(1, 1).unwrap(), [180, 255, 200]);
    assert_eq!(writer.read_pixel(1, 3).unwrap(), [180, 255, 200]);

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn out_of_order_writes_from_reopened_handles() {
    let path = temp_image("reopen");
    let mut writer = PpmWriter::create(&path, 4, 4, &canvas_color()).unwrap();
    let mut other = writer.reopen().unwrap();

    other.write_pixel(&Color::rgb(1.0, 0.0, 0.0), 3, 3).unwrap();
    writer.write_pixel(&Color::rgb(0.0, 1.0, 0.0), 0, 0).unwrap();
    other.write_pixel(&Color::rgb(0.0, 0.0, 1.0), 2, 1).unwrap();

    assert_eq!(writer.read_pixel(3, 3).unwrap(), [255, 0, 0]);
    assert_eq!(writer.read_pixel(0, 0).unwrap(), [0, 255, 0]);
    assert_eq!(writer.read_pixel(2, 1).unwrap(), [0, 0, 255]);

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn corrupted_sentinel_rejects_writes() {
    let path = temp_image("corrupt");
    let mut writer = PpmWriter::create(&path, 4, 4, &canvas_color()).unwrap();
    writer.write_pixel(&Color::rgb(1.0, 1.0, 1.0), 0, 0).unwrap();

    // Stomp the sentinel through a separate handle
    {
        let mut vandal = OpenOptions::new().write(true).open(&path).unwrap();
        vandal.seek(SeekFrom::Start(writer.sentinel_offset)).unwrap();
        vandal.write_all(b"XX").unwrap();
    }

    let result = writer.write_pixel(&Color::rgb(0.0, 0.0, 0.0), 2, 2);
    match result {
        Err(SinkError::Corrupt { ref expected, ref found }) => {
            assert_eq!(expected, SENTINEL);
            assert!(found.starts_with("XX"));
        }
        other => panic!("expected corruption error, got {:?}", other),
    }

    // The rejected write altered nothing: earlier record and untouched
    // placeholders are intact
    assert_eq!(writer.read_pixel(0, 0).unwrap(), [255, 255, 255]);
    assert_eq!(writer.read_pixel(2, 2).unwrap(), [180, 255, 200]);

    std::fs::remove_file(&path).unwrap();
}
