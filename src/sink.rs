use std::error::Error;
use std::fmt;
use std::io;
use std::sync::Arc;

use crate::color::Color;
use crate::framebuffer::Framebuffer;
use crate::partition::PixelKey;
use crate::ppm::PpmWriter;

/// A failure while persisting a pixel.
#[derive(Debug)]
pub enum SinkError {
    Io(io::Error),

    /// The file sink's sentinel no longer matches: the file has been
    /// shifted or overwritten, and the write was refused.
    Corrupt {
        expected: String,
        found: String,
    },
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SinkError::Io(err) => write!(f, "pixel write failed: {}", err),
            SinkError::Corrupt { expected, found } => write!(f,
                "sentinel mismatch, file seems corrupt, not writing \
                 (expected {:?}, found {:?})", expected, found),
        }
    }
}

impl Error for SinkError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SinkError::Io(err) => Some(err),
            SinkError::Corrupt { .. } => None,
        }
    }
}

impl From<io::Error> for SinkError {
    fn from(err: io::Error) -> SinkError {
        SinkError::Io(err)
    }
}

/// Where finished pixels go.
///
/// Workers only ever see this capability, never the raw pixel storage, so
/// they cannot write outside their assigned coordinates' slots. Each worker
/// owns its own sink value; sharing underneath (a locked framebuffer, a
/// reopened file handle) is the implementation's concern.
pub trait PixelSink: Send {
    fn write_pixel(&mut self, pixel: &PixelKey, color: &Color)
        -> Result<(), SinkError>;

    /// Pushes anything buffered down to the destination.
    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// The in-memory sink: a handle to the shared, segment-locked framebuffer.
pub struct FramebufferSink {
    buffer: Arc<Framebuffer>,
}

impl FramebufferSink {
    pub fn new(buffer: Arc<Framebuffer>) -> FramebufferSink {
        FramebufferSink { buffer }
    }
}

impl PixelSink for FramebufferSink {
    fn write_pixel(&mut self, pixel: &PixelKey, color: &Color)
        -> Result<(), SinkError> {
        self.buffer.write_pixel(pixel.row, pixel.col, color);
        Ok(())
    }
}

/// The on-disk sink: each worker holds an independent handle to the
/// pre-allocated PPM file.
impl PixelSink for PpmWriter {
    fn write_pixel(&mut self, pixel: &PixelKey, color: &Color)
        -> Result<(), SinkError> {
        PpmWriter::write_pixel(self, color, pixel.row, pixel.col)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        PpmWriter::flush(self)?;
        Ok(())
    }
}

/* Tests */

#[test]
fn framebuffer_sink_writes_through() {
    let fb = Arc::new(Framebuffer::new(4, 4, 2));
    let mut sink = FramebufferSink::new(Arc::clone(&fb));

    let pixel = PixelKey { row: 1, col: 2, segment: (1 * 4 + 2) % 2 };
    sink.write_pixel(&pixel, &Color::rgb(1.0, 0.5, 0.0)).unwrap();

    assert_eq!(fb.read_pixel(1, 2), [255, 128, 0]);
}

#[test]
fn sink_error_display() {
    let err = SinkError::Corrupt {
        expected: "marker".to_string(),
        found: "mXrker".to_string(),
    };

    let message = format!("{}", err);
    assert!(message.contains("sentinel mismatch"));
    assert!(message.contains("mXrker"));
}
