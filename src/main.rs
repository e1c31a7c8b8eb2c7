use std::error::Error;
use std::path::PathBuf;

use clap::{ ArgEnum, Parser };

use rtiaw::consts;
use rtiaw::render::{ self, RenderOptions, SinkChoice };
use rtiaw::scene::Scene;

#[derive(Copy, Clone, Debug, PartialEq, ArgEnum)]
enum SinkArg {
    /// Accumulate in memory and save once at the end
    Memory,
    /// Pre-allocate the output file and overwrite records as pixels finish
    File,
}

#[derive(Parser, Debug)]
#[clap(version,
    about = "Renders a sphere scene with one worker thread per pixel partition.")]
struct Args {
    /// Image height in pixels; the width follows from the aspect ratio
    #[clap(long, default_value_t = consts::IMAGE_HEIGHT)]
    height: usize,

    /// Width-to-height ratio of the image
    #[clap(long, default_value_t = consts::ASPECT_RATIO)]
    aspect_ratio: f64,

    /// Antialiasing samples per pixel
    #[clap(long, default_value_t = consts::SAMPLES_PER_PIXEL)]
    samples: u32,

    /// Worker thread count; defaults to the number of CPUs
    #[clap(long)]
    threads: Option<usize>,

    /// Seed for reproducible sampling; omit for a fresh render every run
    #[clap(long)]
    seed: Option<u64>,

    /// Where rendered pixels go
    #[clap(long, arg_enum, default_value = "memory")]
    sink: SinkArg,

    /// Scene description JSON; overrides --height and --aspect-ratio
    #[clap(long, parse(from_os_str))]
    scene: Option<PathBuf>,

    /// Output image path
    #[clap(short, long, parse(from_os_str), default_value = consts::OUT_FILE)]
    output: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let scene = match args.scene {
        Some(ref path) => Scene::load(path)?,
        None => Scene::default_scene(args.height, args.aspect_ratio),
    };

    let options = RenderOptions {
        width: scene.width,
        height: scene.height,
        samples_per_pixel: args.samples,
        workers: args.threads.unwrap_or_else(num_cpus::get).max(1),
        seed: args.seed,
        sink: match args.sink {
            SinkArg::Memory => SinkChoice::Memory,
            SinkArg::File => SinkChoice::File,
        },
        output: args.output,
    };

    let rejected = render::render(scene.surfaces, scene.camera, options)?;
    if rejected > 0 {
        eprintln!("WARNING: {} pixel writes were rejected; \
                   the saved image is incomplete", rejected);
    }

    Ok(())
}
