//! World generator binary - fills a brick store with heightmap terrain.
//!
//! Usage: cargo run --release --bin generate_world -- [OPTIONS]
//!
//! Options:
//!   --config <PATH>    JSON store config (default: built-in 64x32x64 grid)
//!   --size <X,Y,Z>     Grid size in bricks, overrides the config
//!   --seed <SEED>      Terrain seed, overrides the config
//!   --jobs <N>         Parallel height sampling threads (default: rayon default)
//!   --out <DIR>        Write bricks.bin, index.bin and materials.bin here

use std::path::{Path, PathBuf};
use std::time::Instant;

use brickgrid::config::StoreConfig;
use brickgrid::core::{IVec3, Result};
use brickgrid::voxel::GpuBuffers;

fn main() {
    brickgrid::core::logging::init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let mut config = match parse_str_arg(&args, "--config") {
        Some(path) => StoreConfig::load(Path::new(&path))?,
        None => StoreConfig::default(),
    };
    if let Some(size) = parse_size_arg(&args, "--size") {
        config.grid_dimensions = size;
    }
    if let Some(seed) = parse_str_arg(&args, "--seed").and_then(|s| s.parse().ok()) {
        config.terrain.seed = seed;
    }
    if let Some(jobs) = parse_str_arg(&args, "--jobs").and_then(|s| s.parse::<usize>().ok()) {
        if let Err(e) = rayon::ThreadPoolBuilder::new().num_threads(jobs).build_global() {
            log::warn!("Could not configure thread pool: {}", e);
        }
    }
    let out_dir = parse_str_arg(&args, "--out").map(PathBuf::from);

    let mut store = config.build_store()?;
    let source = config.height_source();
    let dims = store.dimensions();

    log::info!(
        "Generating {}x{}x{} bricks (seed {})",
        dims.x, dims.y, dims.z, config.terrain.seed
    );

    let mut coords = Vec::with_capacity((dims.x * dims.y * dims.z) as usize);
    for z in 0..dims.z as i32 {
        for y in 0..dims.y as i32 {
            for x in 0..dims.x as i32 {
                coords.push(IVec3::new(x, y, z));
            }
        }
    }

    let start = Instant::now();
    store.generate_chunks(&coords, &source);
    let buffers = store.export_gpu_buffers();
    let took = start.elapsed().as_secs_f64();

    log::info!(
        "Finished terrain generation: {} bricks, {} voxels (size: {:.2} MiB) (time taken: {:.2}s)",
        store.brick_count(),
        store.voxel_count(),
        store.size_in_bytes() as f64 / 1024.0 / 1024.0,
        took
    );

    if let Some(dir) = out_dir {
        write_buffers(&dir, &buffers)?;
        config.save(&dir.join("config.json"))?;
        log::info!("Wrote buffers to {}", dir.display());
    }

    Ok(())
}

fn write_buffers(dir: &Path, buffers: &GpuBuffers) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    std::fs::write(dir.join("bricks.bin"), buffers.brick_bytes())?;
    std::fs::write(dir.join("index.bin"), buffers.index_bytes())?;
    std::fs::write(dir.join("materials.bin"), buffers.material_bytes())?;
    Ok(())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn parse_size_arg(args: &[String], flag: &str) -> Option<[u32; 3]> {
    let value = parse_str_arg(args, flag)?;
    let parts: Vec<u32> = value
        .split(',')
        .map(|p| p.trim().parse().ok())
        .collect::<Option<Vec<_>>>()?;
    match parts.as_slice() {
        [x, y, z] => Some([*x, *y, *z]),
        _ => {
            log::warn!("Ignoring malformed {} value '{}'", flag, value);
            None
        }
    }
}
