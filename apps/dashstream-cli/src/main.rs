use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use dashstream_models::ModelLibrary;
use dashstream_render::RecordingBackend;
use dashstream_stream::{LevelEvent, StreamConfig, World};
use dashstream_tools::{DemoLevel, LevelInspector, demo_level};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dashstream-cli", about = "CLI tool for level streaming operations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Stream configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct LevelSource {
    /// Level file (JSON) to load
    #[arg(short, long, conflicts_with = "demo")]
    level: Option<PathBuf>,
    /// Generate a demo level with this many sections
    #[arg(short, long, default_value = "4")]
    demo: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Print engine version and crate info
    Info,
    /// Write a generated demo level to a file
    Demo {
        /// Number of sections
        #[arg(short, long, default_value = "4")]
        sections: usize,
        /// Output path
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Load a level and sweep the player across it
    Simulate {
        #[command(flatten)]
        source: LevelSource,
        /// Number of fixed ticks
        #[arg(short, long, default_value = "600")]
        ticks: u32,
        /// Distance ahead of the player that is rendered
        #[arg(short, long, default_value = "80")]
        render_distance: f32,
    },
    /// Load a level and print per-chunk details
    Inspect {
        #[command(flatten)]
        source: LevelSource,
        /// Only show this chunk
        #[arg(long)]
        chunk: Option<i32>,
    },
    /// Print or export the block model catalog
    Models {
        /// Write the catalog manifest to this path
        #[arg(short, long)]
        export: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let config = match &cli.config {
        Some(path) => StreamConfig::load(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => StreamConfig::default(),
    };

    match cli.command {
        Commands::Info => {
            println!("dashstream-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", dashstream_common::crate_info());
            println!("timeline: {}", dashstream_timeline::crate_info());
            println!("path: {}", dashstream_path::crate_info());
            println!("models: {}", dashstream_models::crate_info());
            println!("render: {}", dashstream_render::crate_info());
            println!("stream: {}", dashstream_stream::crate_info());
            println!("tools: {}", dashstream_tools::crate_info());
        }
        Commands::Demo { sections, out } => {
            let demo = demo_level(sections)?;
            let file = std::fs::File::create(&out)
                .with_context(|| format!("creating {}", out.display()))?;
            serde_json::to_writer_pretty(file, &demo)?;
            println!(
                "Wrote '{}' ({} rows) to {}",
                demo.level.scene_name,
                demo.level.rows.len(),
                out.display()
            );
        }
        Commands::Simulate {
            source,
            ticks,
            render_distance,
        } => {
            let demo = read_source(&source)?;
            let mut world = World::new(config);
            let mut backend = RecordingBackend::new();
            world.load_level(&demo.level, &demo.prefabs, &demo.path, &mut backend)?;
            world.on_player_spawn(&mut backend);
            println!("{}", LevelInspector::summary(&world));

            let end = world.items().iter().map(|i| i.position.x).max().unwrap_or(0) as f32;
            let mut touched = 0;
            for tick in 0..ticks {
                let travelled = end * tick as f32 / ticks.max(1) as f32;
                world.update(travelled, render_distance, &mut backend);
                world.fixed_update(travelled, render_distance, &mut backend);
                touched += world.stats().instances_touched;
            }

            let updates = world
                .drain_events()
                .iter()
                .filter(|e| matches!(e, LevelEvent::LevelUpdate))
                .count();
            println!(
                "Simulated {ticks} ticks: level_time={:.2}s updates={updates} instances_touched={touched} active_chunks={}",
                world.level_time(),
                world.stats().active_chunks,
            );
            println!("{}", backend.summary());
        }
        Commands::Inspect { source, chunk } => {
            let demo = read_source(&source)?;
            let mut world = World::new(config);
            let mut backend = RecordingBackend::new();
            world.load_level(&demo.level, &demo.prefabs, &demo.path, &mut backend)?;
            println!("{}", LevelInspector::summary(&world));
            match chunk {
                Some(index) => match LevelInspector::chunk_info(&world, index) {
                    Some(info) => println!("{info}"),
                    None => anyhow::bail!("no chunk with index {index}"),
                },
                None => {
                    for info in LevelInspector::chunks(&world) {
                        println!("{info}");
                    }
                }
            }
        }
        Commands::Models { export } => {
            let library = ModelLibrary::global();
            match export {
                Some(path) => {
                    library.export_json(&path)?;
                    println!("Exported {} catalog entries to {}", library.len(), path.display());
                }
                None => {
                    for entry in library.manifest().entries {
                        println!(
                            "{} detail_levels={} faces={} transparent={}",
                            entry.id, entry.detail_levels, entry.faces, entry.transparent
                        );
                    }
                }
            }
        }
    }

    Ok(())
}

fn read_source(source: &LevelSource) -> anyhow::Result<DemoLevel> {
    match &source.level {
        Some(path) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening level {}", path.display()))?;
            Ok(serde_json::from_reader(file)?)
        }
        None => Ok(demo_level(source.demo)?),
    }
}
