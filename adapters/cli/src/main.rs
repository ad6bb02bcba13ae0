#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for querying Outpost maps.

mod graph_transfer;
mod map_file;
mod text_backend;

use std::{
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glam::Vec2;
use outpost_core::{CellGraph, CellId, ObjectKind};
use outpost_rendering::{from_vec2, RenderingBackend, Scene};
use outpost_system_routing::{PathRouter, RouteFollower};
use outpost_world::{query, World};

use map_file::MapFile;
use text_backend::TextBackend;

/// Map graph and hit-testing queries for Outpost maps.
#[derive(Debug, Parser)]
#[command(name = "outpost", version)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Prints the least-cost route between two cells.
    Route {
        /// Path to the TOML map description.
        #[arg(long)]
        map: PathBuf,
        /// Start cell index.
        #[arg(long)]
        from: u32,
        /// Goal cell index.
        #[arg(long)]
        to: u32,
    },
    /// Lists the objects under a point, topmost last.
    Pick {
        /// Path to the TOML map description.
        #[arg(long)]
        map: PathBuf,
        /// Horizontal world coordinate.
        #[arg(long, allow_hyphen_values = true)]
        x: f32,
        /// Vertical world coordinate.
        #[arg(long, allow_hyphen_values = true)]
        y: f32,
    },
    /// Prints the map graph as a transfer string.
    Export {
        /// Path to the TOML map description.
        #[arg(long)]
        map: PathBuf,
    },
    /// Decodes a transfer string and summarises the graph it carries.
    Import {
        /// String produced by `export`.
        value: String,
    },
    /// Walks a unit from every spawn point to the first goal and prints each frame.
    Simulate {
        /// Path to the TOML map description.
        #[arg(long)]
        map: PathBuf,
        /// Travel cost covered per second.
        #[arg(long, default_value_t = 1.0)]
        speed: f32,
        /// Simulated milliseconds per frame.
        #[arg(long, default_value_t = 250)]
        frame_ms: u64,
        /// Upper bound on printed frames.
        #[arg(long, default_value_t = 40)]
        frames: u32,
    },
}

/// Entry point for the Outpost command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(io::stderr)
        .init();

    match Cli::parse().command {
        CliCommand::Route { map, from, to } => route(&load_world(&map)?, from, to),
        CliCommand::Pick { map, x, y } => pick(&load_world(&map)?, Vec2::new(x, y)),
        CliCommand::Export { map } => {
            let world = load_world(&map)?;
            let encoded = graph_transfer::encode(&query::graph(&world).snapshot())?;
            println!("{encoded}");
            Ok(())
        }
        CliCommand::Import { value } => {
            let snapshot = graph_transfer::decode(&value)?;
            let graph = CellGraph::from_snapshot(&snapshot)
                .context("transfer string holds an invalid graph")?;
            println!("{} cells, {} edges", graph.cell_count(), graph.edge_count());
            Ok(())
        }
        CliCommand::Simulate {
            map,
            speed,
            frame_ms,
            frames,
        } => simulate(&load_world(&map)?, speed, Duration::from_millis(frame_ms), frames),
    }
}

fn load_world(path: &Path) -> Result<World> {
    MapFile::load(path)?.build_world()
}

fn route(world: &World, from: u32, to: u32) -> Result<()> {
    let graph = query::graph(world);
    match PathRouter::new().find_path(graph, CellId::new(from), CellId::new(to))? {
        Some(route) => {
            let cells: Vec<_> = route.cells().map(|cell| cell.get().to_string()).collect();
            println!("{} (cost {})", cells.join(" -> "), route.total_cost());
        }
        None => println!("no path from {from} to {to}"),
    }
    Ok(())
}

fn pick(world: &World, cursor: Vec2) -> Result<()> {
    let point = from_vec2(cursor);
    for id in query::objects_containing(world, point) {
        if let Some(object) = query::object(world, id) {
            println!(
                "{:?} {:?} on cell {} (sort index {})",
                id,
                object.kind(),
                object.cell().get(),
                object.sort_index().get()
            );
        }
    }
    match query::pick(world, point) {
        Some(id) => println!("topmost: {id:?}"),
        None => println!("nothing under ({}, {})", point.x, point.y),
    }
    Ok(())
}

fn simulate(world: &World, speed: f32, frame_duration: Duration, frames: u32) -> Result<()> {
    let graph = query::graph(world);
    let goal = query::cells_of_kind(world, ObjectKind::Goal)
        .first()
        .copied()
        .context("map has no goal object")?;

    let mut router = PathRouter::new();
    let mut followers = Vec::new();
    for spawn in query::cells_of_kind(world, ObjectKind::SpawnPoint) {
        match router.find_path(graph, spawn, goal)? {
            Some(route) => followers.push(RouteFollower::new(route, speed)),
            None => tracing::warn!(spawn = spawn.get(), "goal unreachable, unit held back"),
        }
    }

    let mut scene = Scene::from_world(world);
    scene.set_units(&followers);

    let stdout = io::stdout();
    TextBackend::new(stdout.lock(), frame_duration, frames).run(scene, move |dt, scene| {
        for follower in &mut followers {
            let _ = follower.advance(dt);
        }
        scene.set_units(&followers);
        !followers.iter().all(RouteFollower::is_finished)
    })
}
