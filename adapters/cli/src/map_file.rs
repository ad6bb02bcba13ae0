//! TOML map descriptions loaded by the command-line adapter.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use outpost_core::{CellId, ObjectKind, Shape, Vector2};
use outpost_world::{query, World, WorldConfig};
use serde::Deserialize;

const SUPPORTED_MAP_VERSION: u32 = 1;

/// Parsed map description.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct MapFile {
    version: u32,
    #[serde(default)]
    placement_base: u64,
    grid: Option<GridSection>,
    #[serde(default)]
    cells: Vec<CellEntry>,
    #[serde(default)]
    edges: Vec<EdgeEntry>,
    #[serde(default)]
    objects: Vec<ObjectEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GridSection {
    columns: u32,
    rows: u32,
    #[serde(default = "default_spacing")]
    spacing: f32,
    #[serde(default = "default_cost")]
    cost: f32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CellEntry {
    x: f32,
    y: f32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EdgeEntry {
    from: CellId,
    to: CellId,
    cost: f32,
    #[serde(default)]
    bidirectional: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ObjectEntry {
    kind: ObjectKind,
    cell: CellId,
    shape: Shape,
}

fn default_spacing() -> f32 {
    1.0
}

fn default_cost() -> f32 {
    1.0
}

impl MapFile {
    /// Reads and parses the map description at the provided path.
    pub(crate) fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read map file at {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid map file {}", path.display()))
    }

    /// Parses a map description from TOML source.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let map: Self = toml::from_str(contents).context("failed to parse map toml contents")?;
        if map.version != SUPPORTED_MAP_VERSION {
            bail!(
                "unsupported map version {}; expected {}",
                map.version,
                SUPPORTED_MAP_VERSION
            );
        }
        Ok(map)
    }

    /// Builds a world from the description.
    ///
    /// Grid cells come first, then the listed cells, so explicit cell ids in
    /// edges and objects count from zero across both.
    pub(crate) fn build_world(&self) -> Result<World> {
        let mut world = World::new(WorldConfig::new(self.placement_base));

        if let Some(grid) = &self.grid {
            let _ = world
                .graph_mut()
                .add_grid(grid.columns, grid.rows, grid.spacing, grid.cost)
                .context("failed to build map grid")?;
        }

        for (index, cell) in self.cells.iter().enumerate() {
            let _ = world
                .add_cell(Vector2::new(cell.x, cell.y))
                .with_context(|| format!("cell #{index} cannot be added"))?;
        }

        for (index, edge) in self.edges.iter().enumerate() {
            world
                .add_edge(edge.from, edge.to, edge.cost)
                .with_context(|| format!("edge #{index} is invalid"))?;
            if edge.bidirectional {
                world
                    .add_edge(edge.to, edge.from, edge.cost)
                    .with_context(|| format!("reverse of edge #{index} is invalid"))?;
            }
        }

        for (index, object) in self.objects.iter().enumerate() {
            let _ = world
                .place(object.kind, object.cell, object.shape)
                .with_context(|| format!("object #{index} cannot be placed"))?;
        }

        let graph = query::graph(&world);
        tracing::info!(
            cells = graph.cell_count(),
            edges = graph.edge_count(),
            objects = query::objects(&world).count(),
            "map loaded"
        );
        Ok(world)
    }
}
