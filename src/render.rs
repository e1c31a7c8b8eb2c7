use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::camera::Camera;
use crate::color::Color;
use crate::consts::CANVAS_RGB;
use crate::framebuffer::Framebuffer;
use crate::partition::Partitioner;
use crate::ppm::PpmWriter;
use crate::shade::Sampler;
use crate::sink::{ FramebufferSink, PixelSink, SinkError };
use crate::surface::Surface;

/// Which of the two pixel sinks receives the render.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SinkChoice {
    /// Accumulate in the segment-locked framebuffer, save once at the end.
    Memory,

    /// Pre-allocate the PPM file up front and overwrite records in place
    /// as workers finish pixels.
    File,
}

#[derive(Clone, Debug)]
pub struct RenderOptions {
    pub width: usize,
    pub height: usize,
    pub samples_per_pixel: u32,
    pub workers: usize,

    /// Seeds worker RNGs deterministically when set; each worker derives
    /// its own stream from the seed plus its partition id.
    pub seed: Option<u64>,

    pub sink: SinkChoice,
    pub output: PathBuf,
}

/// Renders one partition's pixels through the given sink.
///
/// This is the whole per-worker loop: sample every pixel the partitioner
/// assigned to `chunk`, in the partitioner's shuffled order, and write each
/// result. Corruption-rejected writes are counted and skipped -- one bad
/// write does not stop the remaining pixels -- while I/O errors abort the
/// chunk.
///
/// Returns the number of rejected writes; zero means the chunk is complete.
pub fn render_chunk<R: Rng>(sink: &mut dyn PixelSink, surfaces: &[Surface],
    camera: &Camera, partitioner: &Partitioner, chunk: usize,
    sampler: &Sampler, rng: &mut R) -> Result<usize, SinkError> {
    let mut rejected = 0;

    for pixel in partitioner.chunk_pixels(chunk) {
        let color = sampler.pixel_color(surfaces, camera,
            pixel.row, pixel.col, partitioner.width, partitioner.height, rng);

        match sink.write_pixel(pixel, &color) {
            Ok(()) => {}
            Err(err @ SinkError::Corrupt { .. }) => {
                // Report the first rejection per chunk; a corrupt file
                // rejects every write that follows
                if rejected == 0 {
                    eprintln!("chunk {}: {}", chunk, err);
                }
                rejected += 1;
            }
            Err(err) => return Err(err),
        }
    }

    sink.flush()?;
    Ok(rejected)
}

/// Renders the scene with one worker thread per partition.
///
/// The partitioner is built once; each worker is bound to exactly one
/// partition for its entire lifetime and runs the full sampling loop over
/// that partition's pixels. There is no work stealing: partition sizes are
/// as balanced as the modulo hash makes them, which is near-uniform for
/// non-degenerate image dimensions.
///
/// Blocks until every worker has been joined, then flushes the in-memory
/// sink if one was selected. Returns the total number of corruption-rejected
/// pixel writes; a nonzero count means the saved image is incomplete.
pub fn render(surfaces: Vec<Surface>, camera: Camera,
    options: RenderOptions) -> Result<usize, SinkError> {
    let workers = options.workers.max(1);

    let partitioner = Arc::new(Partitioner::new(
        options.width, options.height, workers, &mut rand::thread_rng()));
    let surfaces = Arc::new(surfaces);
    let camera = Arc::new(camera);
    let sampler = Sampler::new(options.samples_per_pixel);

    // Build every worker's sink before spawning anything, so setup failures
    // surface as plain errors instead of dead threads
    let mut sinks: Vec<Box<dyn PixelSink>> = Vec::with_capacity(workers);
    let framebuffer = match options.sink {
        SinkChoice::Memory => {
            let buffer = Arc::new(Framebuffer::new(
                options.width, options.height, workers));
            for _ in 0..workers {
                sinks.push(Box::new(FramebufferSink::new(Arc::clone(&buffer))));
            }
            Some(buffer)
        }
        SinkChoice::File => {
            let canvas = Color::from_bytes(
                CANVAS_RGB[0], CANVAS_RGB[1], CANVAS_RGB[2]);
            let writer = PpmWriter::create(&options.output,
                options.width, options.height, &canvas)?;

            // One independent handle per worker; sharing one handle would
            // interleave seek/write pairs across threads
            for _ in 1..workers {
                sinks.push(Box::new(writer.reopen()?));
            }
            sinks.push(Box::new(writer));
            None
        }
    };

    println!("Rendering {}x{} using {} threads...",
        options.width, options.height, workers);

    let mut handles = Vec::with_capacity(workers);
    for (chunk, mut sink) in sinks.into_iter().enumerate() {
        let surfaces = Arc::clone(&surfaces);
        let camera = Arc::clone(&camera);
        let partitioner = Arc::clone(&partitioner);
        let seed = options.seed;

        handles.push(thread::spawn(move || {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(
                    seed.wrapping_add(chunk as u64)),
                None => StdRng::from_entropy(),
            };

            render_chunk(sink.as_mut(), &surfaces, &camera, &partitioner,
                chunk, &sampler, &mut rng)
        }));
    }

    let mut rejected = 0;
    let mut failure = None;
    for handle in handles {
        match handle.join().unwrap() {
            Ok(count) => rejected += count,
            Err(err) => failure = Some(err),
        }
    }

    if let Some(err) = failure {
        return Err(err);
    }

    if let Some(buffer) = framebuffer {
        buffer.save(&options.output)?;
    }

    println!("...done.");
    println!("Saved render to {}.", options.output.display());

    Ok(rejected)
}

/* Tests */

#[cfg(test)]
use crate::vector::Vector;

#[cfg(test)]
fn test_rng() -> StdRng {
    StdRng::seed_from_u64(13)
}

#[cfg(test)]
fn one_sphere() -> Vec<Surface> {
    vec![Surface::sphere(Vector::new(0.0, 0.0, 1.0), 0.5)]
}

#[cfg(test)]
fn temp_out(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("rtiaw-render-{}-{}.ppm", name, std::process::id()))
}

#[test]
fn single_sample_fixture_grid() {
    // 5x4 grid so pixel (2, 2) sits exactly on the optical axis. One
    // sample, no jitter: every value below is derivable by hand from the
    // intersection, camera and shading formulas.
    let surfaces = one_sphere();
    let camera = Camera::new(2.0, 2.0 * 16.0 / 9.0, 1.0);
    let partitioner = Partitioner::new(5, 4, 1, &mut test_rng());
    let buffer = Arc::new(Framebuffer::new(5, 4, 1));
    let mut sink = FramebufferSink::new(Arc::clone(&buffer));
    let sampler = Sampler::without_jitter(1);

    let rejected = render_chunk(&mut sink, &surfaces, &camera,
        &partitioner, 0, &sampler, &mut test_rng()).unwrap();
    assert_eq!(rejected, 0);

    // The on-axis ray hits the sphere head on: normal (0, 0, -1) shades to
    // (0.5, 0.5, 0.0)
    assert_eq!(buffer.read_pixel(2, 2), [128, 128, 0]);

    // Corners miss and take the background gradient
    assert_eq!(buffer.read_pixel(0, 0), [97, 160, 255]);
    assert_eq!(buffer.read_pixel(0, 4), [97, 160, 255]);
    assert_eq!(buffer.read_pixel(3, 0), [144, 188, 255]);
    assert_eq!(buffer.read_pixel(3, 4), [144, 188, 255]);

    // Level rays (y = 0) get the unblended sky color (0.5, 0.7, 1.0)
    assert_eq!(buffer.read_pixel(2, 0), [128, 179, 255]);
    assert_eq!(buffer.read_pixel(2, 1), [128, 179, 255]);

    // Up-screen ray blends darker
    assert_eq!(buffer.read_pixel(1, 2), [82, 151, 255]);
}

#[test]
fn parallel_memory_render_covers_every_pixel() {
    let output = temp_out("memory");
    let options = RenderOptions {
        width: 12,
        height: 9,
        samples_per_pixel: 2,
        workers: 3,
        seed: Some(99),
        sink: SinkChoice::Memory,
        output: output.clone(),
    };

    let rejected = render(one_sphere(),
        Camera::new(2.0, 2.0 * 16.0 / 9.0, 1.0), options).unwrap();
    assert_eq!(rejected, 0);

    let contents = std::fs::read_to_string(&output).unwrap();
    std::fs::remove_file(&output).unwrap();

    let mut lines = contents.lines();
    assert_eq!(lines.next(), Some("P3"));
    assert_eq!(lines.next(), Some("12 9"));
    assert_eq!(lines.next(), Some("255"));

    let records: Vec<&str> = lines.collect();
    assert_eq!(records.len(), 12 * 9);

    // Every record is a full triplet; background rays all carry a 255 blue
    // channel, so the sky must show up somewhere
    assert!(records.iter().all(|r| r.split(' ').count() == 3));
    assert!(records.iter().any(|r| r.ends_with("255")));
}

#[test]
fn parallel_file_render_overwrites_every_record() {
    let output = temp_out("file");
    let options = RenderOptions {
        width: 10,
        height: 8,
        samples_per_pixel: 1,
        workers: 4,
        seed: Some(7),
        sink: SinkChoice::File,
        output: output.clone(),
    };

    let rejected = render(one_sphere(),
        Camera::new(2.0, 2.0 * 16.0 / 9.0, 1.0), options).unwrap();
    assert_eq!(rejected, 0);

    let contents = std::fs::read_to_string(&output).unwrap();
    std::fs::remove_file(&output).unwrap();

    // No record may still hold the placeholder canvas color: every pixel
    // must have been visited by exactly one worker
    let placeholder = format!("{:0>3} {:0>3} {:0>3}",
        CANVAS_RGB[0], CANVAS_RGB[1], CANVAS_RGB[2]);
    let records: Vec<&str> = contents.lines().skip(4).collect();

    assert_eq!(records.len(), 10 * 8);
    assert!(records.iter().all(|r| *r != placeholder));
}

#[test]
fn corrupt_file_skips_writes_but_finishes() {
    use std::io::{ Seek, SeekFrom, Write };

    let output = temp_out("corrupt");
    let canvas = Color::from_bytes(
        CANVAS_RGB[0], CANVAS_RGB[1], CANVAS_RGB[2]);
    let mut writer = PpmWriter::create(&output, 4, 4, &canvas).unwrap();

    // Vandalize the sentinel before rendering starts
    {
        let mut vandal = std::fs::OpenOptions::new()
            .write(true).open(&output).unwrap();
        vandal.seek(SeekFrom::Start("P3\n4 4\n255\n".len() as u64)).unwrap();
        vandal.write_all(b"??").unwrap();
    }

    let partitioner = Partitioner::new(4, 4, 1, &mut test_rng());
    let sampler = Sampler::without_jitter(1);
    let camera = Camera::new(2.0, 2.0 * 16.0 / 9.0, 1.0);
    let surfaces = one_sphere();

    let rejected = render_chunk(&mut writer, &surfaces, &camera,
        &partitioner, 0, &sampler, &mut test_rng()).unwrap();
    std::fs::remove_file(&output).unwrap();

    // Every write was refused, none aborted the chunk
    assert_eq!(rejected, 16);
}
