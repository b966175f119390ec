use std::cell::Cell;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use strata::blocks::BlockRegistry;
use strata::runtime::GenRuntime;
use strata::world::{ChunkCoord, World, WorldGenParams, load_params_from_path};
use strata::{ChunkManager, StreamConfig, StreamEvent, load_stream_config_from_path};

#[derive(Parser, Debug)]
#[command(name = "strata", about = "Headless terrain streaming driver")]
struct Args {
    /// World seed
    #[arg(long, default_value_t = 1337)]
    seed: i32,
    /// Streaming config (TOML)
    #[arg(long, default_value = "assets/stream.toml")]
    config: PathBuf,
    /// Worldgen config (TOML)
    #[arg(long, default_value = "assets/worldgen/worldgen.toml")]
    worldgen: PathBuf,
    /// Block registry (TOML); the built-in registry when omitted
    #[arg(long)]
    blocks: Option<PathBuf>,
    /// Number of moves along +X after the initial pass
    #[arg(long, default_value_t = 4)]
    steps: u32,
    /// Distance in blocks per move
    #[arg(long, default_value_t = 16.0)]
    step_blocks: f32,
    /// Override the configured generator thread count
    #[arg(long)]
    workers: Option<usize>,
    /// Print one loaded chunk as JSON at the end, e.g. `--dump-chunk 0,-1`
    #[arg(long, value_parser = parse_coord, allow_hyphen_values = true)]
    dump_chunk: Option<ChunkCoord>,
    /// Seconds to wait for each pass
    #[arg(long, default_value_t = 120)]
    timeout_secs: u64,
}

fn parse_coord(s: &str) -> Result<ChunkCoord, String> {
    let (x, z) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `x,z`, got `{s}`"))?;
    let x = x.trim().parse::<i32>().map_err(|e| e.to_string())?;
    let z = z.trim().parse::<i32>().map_err(|e| e.to_string())?;
    Ok(ChunkCoord::new(x, z))
}

fn load_stream_config(path: &Path) -> Result<StreamConfig, Box<dyn Error>> {
    if path.exists() {
        Ok(load_stream_config_from_path(path)?)
    } else {
        log::warn!("{} not found; using default stream config", path.display());
        Ok(StreamConfig::default())
    }
}

fn load_worldgen(path: &Path) -> Result<WorldGenParams, Box<dyn Error>> {
    if path.exists() {
        let params = load_params_from_path(path)?;
        log::info!("loaded worldgen params from {}", path.display());
        Ok(params)
    } else {
        log::warn!("{} not found; using default worldgen params", path.display());
        Ok(WorldGenParams::default())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_env("RUST_LOG")
        .init();

    let args = Args::parse();
    let mut cfg = load_stream_config(&args.config)?;
    if let Some(workers) = args.workers {
        cfg.workers = workers;
    }
    cfg.validate()?;

    let reg = Arc::new(match &args.blocks {
        Some(path) => BlockRegistry::load_from_path(path)?,
        None => BlockRegistry::builtin()?,
    });
    log::info!("block registry: {} types", reg.len());
    let world = Arc::new(World::new(args.seed, load_worldgen(&args.worldgen)?));

    let source = GenRuntime::new(
        world,
        reg.clone(),
        cfg.chunk_size,
        cfg.chunk_height,
        cfg.workers,
        cfg.cache_capacity,
    )?;
    let mut manager = ChunkManager::new(cfg.clone(), reg, source)?;

    let loaded = Rc::new(Cell::new(0usize));
    let unloaded = Rc::new(Cell::new(0usize));
    {
        let loaded = loaded.clone();
        let unloaded = unloaded.clone();
        manager.subscribe(move |ev| match ev {
            StreamEvent::Loaded(_) => loaded.set(loaded.get() + 1),
            StreamEvent::Unloaded(_) => unloaded.set(unloaded.get() + 1),
            StreamEvent::Updated { initial: true } => log::info!("initial area ready"),
            StreamEvent::Updated { .. } => {}
        });
    }

    let timeout = Duration::from_secs(args.timeout_secs);
    let z = cfg.chunk_size as f32 * 0.5;
    for step in 0..=args.steps {
        let x = cfg.chunk_size as f32 * 0.5 + step as f32 * args.step_blocks;
        manager.update_chunks_around(x, z);
        if !manager.run_until_idle(timeout) {
            log::warn!("pass at x={x:.1} did not finish within {}s", args.timeout_secs);
        }
        manager.tick_block_entities();
        let stats = manager.stats();
        let (queued, inflight) = manager.source().queue_debug_counts();
        log::info!(
            "step {step}: x={x:.1} loaded={} visible={} quads={} models={} jobs={queued}/{inflight}",
            stats.loaded,
            stats.visible,
            stats.quads,
            stats.models
        );
    }

    let stats = manager.stats();
    let rt = manager.source().stats();
    println!(
        "passes={} loaded={} visible={} meshes={} quads={} models={} loads={} unloads={} cache_hits={} cache_misses={}",
        stats.passes,
        stats.loaded,
        stats.visible,
        stats.meshes,
        stats.quads,
        stats.models,
        loaded.get(),
        unloaded.get(),
        rt.cache.hits,
        rt.cache.misses
    );
    if let Some(coord) = args.dump_chunk {
        let chunk = manager
            .chunk(coord)
            .ok_or_else(|| format!("chunk ({}, {}) is not loaded", coord.cx, coord.cz))?;
        println!("{}", chunk.to_json()?);
    }
    Ok(())
}
