use std::{env, path::Path, time::Instant};

use anyhow::{anyhow, Result};

use saberview_chart::{parse::BeatmapLoader, BeatmapInfo, DifficultyLevel, LoadError};
use saberview_graphics::settings::Settings;

use preview::Preview;
use renderer::arc_renderer::ArcLinePool;

mod preview;
mod renderer;
mod summary;

const DEFAULT_CHARACTERISTIC: &str = "Standard";
const INFO_FILENAMES: [&str; 2] = ["Info.dat", "info.dat"];
const TICKS_PER_SECOND: f32 = 60.0;
const ARC_POOL_SIZE: usize = 20;

fn load_info(loader: &BeatmapLoader, directory: &Path) -> Result<BeatmapInfo> {
    let mut last_error = LoadError::NoDocument;
    for filename in INFO_FILENAMES {
        match loader.load_info(directory.join(filename)) {
            Ok(info) => return Ok(info),
            Err(LoadError::NoDocument) => continue,
            Err(err) => last_error = err,
        }
    }
    Err(anyhow!(
        "Failed to load beatmap info in {}: {}",
        directory.display(),
        last_error
    ))
}

fn main() -> Result<()> {
    let env = env_logger::Env::default()
        .filter_or("SABERVIEW_LOG_LEVEL", "info")
        .write_style_or("SABERVIEW_LOG_STYLE", "always");
    env_logger::init_from_env(env);

    let args = env::args().collect::<Vec<_>>();
    if args.len() < 2 || args.len() > 4 {
        eprintln!(
            "Usage: {} <map_directory> [difficulty] [characteristic]",
            args[0]
        );
        std::process::exit(1);
    }

    let directory = Path::new(&args[1]);
    let characteristic = args
        .get(3)
        .map(String::as_str)
        .unwrap_or(DEFAULT_CHARACTERISTIC);

    let loader = BeatmapLoader::new()?;
    let info = load_info(&loader, directory)?;

    log::info!("Successfully loaded {}", summary::song_line(&info));
    log::info!(
        "Info version {}, {} difficulties, {} BPM, {}s",
        info.version,
        info.difficulty_beatmaps.len(),
        info.audio.bpm,
        info.audio.song_duration
    );

    let reference = match args.get(2) {
        Some(name) => {
            let level = name.parse::<DifficultyLevel>().map_err(|e| anyhow!(e))?;
            info.find_difficulty(characteristic, level)
        }
        None => info.hardest(characteristic),
    }
    .ok_or_else(|| anyhow!("No matching {} difficulty in the beatmap", characteristic))?;

    let load_start = Instant::now();
    let difficulty = loader.load_difficulty(directory, reference);
    if let Some(issue) = &difficulty.issue {
        log::warn!(
            "Previewing an empty {} {}: {}",
            difficulty.characteristic,
            difficulty.level,
            issue
        );
    }
    log::info!(
        "{}, loaded in {:?}",
        summary::difficulty_line(&difficulty),
        load_start.elapsed()
    );

    let mut preview = Preview::new(
        &difficulty,
        info.audio.bpm,
        info.audio.song_duration,
        ArcLinePool::with_capacity(ARC_POOL_SIZE),
        &Settings::default(),
    );

    let run_start = Instant::now();
    let stats = preview.run(TICKS_PER_SECOND);
    log::info!(
        "Stepped {} ticks over {}s in {:?}, at most {} arcs on screen",
        stats.ticks,
        preview.end_time(),
        run_start.elapsed(),
        stats.peak_rendered
    );

    let pool = preview.window().pool();
    log::info!(
        "Arc lines created {}, acquired {}, released {}, peak in use {}",
        pool.created(),
        pool.acquired(),
        pool.released(),
        pool.peak_in_use()
    );
    if pool.in_use() != 0 {
        log::warn!("{} arc lines were never returned to the pool", pool.in_use());
    }

    Ok(())
}
