//! Rendering backend that prints scenes as text.

use std::{
    io::{self, Write},
    time::Duration,
};

use anyhow::{Context, Result};
use outpost_rendering::{Outline, RenderingBackend, Scene};

/// Prints one block per frame until the scene update asks to stop.
///
/// Frame 0 shows the scene as handed in and every later frame follows one
/// update, including the update that ends the run.
#[derive(Debug)]
pub(crate) struct TextBackend<W> {
    out: W,
    frame_duration: Duration,
    max_frames: u32,
}

impl<W: Write> TextBackend<W> {
    pub(crate) fn new(out: W, frame_duration: Duration, max_frames: u32) -> Self {
        Self {
            out,
            frame_duration,
            max_frames,
        }
    }

    fn draw(&mut self, frame: u32, scene: &Scene) -> io::Result<()> {
        writeln!(self.out, "frame {frame}")?;
        for placement in &scene.placements {
            let outline = match placement.outline {
                Outline::Circle { radius } => format!("circle r={radius}"),
                Outline::Square { half_extent } => format!("square s={}", half_extent * 2.0),
            };
            writeln!(
                self.out,
                "  #{:<3} {:?} {:?} at ({:.2}, {:.2}) {outline}",
                placement.sort_index.get(),
                placement.id,
                placement.kind,
                placement.position.x,
                placement.position.y,
            )?;
        }
        for (index, unit) in scene.units.iter().enumerate() {
            writeln!(
                self.out,
                "  unit {index} at ({:.2}, {:.2})",
                unit.position.x, unit.position.y
            )?;
        }
        Ok(())
    }
}

impl<W: Write> RenderingBackend for TextBackend<W> {
    fn run<F>(mut self, mut scene: Scene, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, &mut Scene) -> bool,
    {
        let mut keep_going = true;
        for frame in 0..self.max_frames {
            self.draw(frame, &scene)
                .with_context(|| format!("failed to draw frame {frame}"))?;
            if !keep_going {
                break;
            }
            keep_going = update_scene(self.frame_duration, &mut scene);
        }
        self.out.flush().context("failed to flush text output")
    }
}
