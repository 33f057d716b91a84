//! Backend that serialises a scene as an SVG document.

use std::fmt::{self, Write as _};
use std::io;

use anyhow::{Context, Result as AnyResult};

use crate::{PathPolyline, Presentation, RenderingBackend};

/// Writes each presentation as a standalone SVG document.
#[derive(Debug)]
pub struct SvgBackend<W> {
    writer: W,
}

impl<W: io::Write> SvgBackend<W> {
    /// Creates a backend that writes documents into `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: io::Write> RenderingBackend for SvgBackend<W> {
    fn present(&mut self, presentation: &Presentation) -> AnyResult<()> {
        let document = render(presentation).context("failed to format SVG document")?;
        self.writer
            .write_all(document.as_bytes())
            .context("failed to write SVG document")?;
        self.writer.flush().context("failed to flush SVG document")
    }
}

/// Renders the presentation into an SVG document.
///
/// Tiles become filled `<rect>` elements; every path becomes one `<path>`
/// element drawn on top of the tiles.
pub fn render(presentation: &Presentation) -> Result<String, fmt::Error> {
    let grid = &presentation.scene.tile_grid;
    let palette = &presentation.palette;
    let (width, height) = (grid.width(), grid.height());
    let mut out = String::new();

    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    )?;
    writeln!(out, "<title>{}</title>", escape(&presentation.title))?;

    for tile in &presentation.scene.tiles {
        let origin = grid.tile_origin(tile.position);
        writeln!(
            out,
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
            origin.x,
            origin.y,
            grid.tile_px,
            grid.tile_px,
            palette.tile_fill(tile.state)
        )?;
    }

    for path in &presentation.scene.paths {
        writeln!(
            out,
            r#"<path d="{}" fill="none" stroke="{}" stroke-width="{}"></path>"#,
            path_data(path)?,
            palette.path,
            palette.path_width
        )?;
    }

    writeln!(out, "</svg>")?;
    Ok(out)
}

/// Move-to followed by line-to commands through every vertex.
fn path_data(path: &PathPolyline) -> Result<String, fmt::Error> {
    let mut data = String::new();
    for (index, point) in path.points.iter().enumerate() {
        let command = if index == 0 { "M" } else { " L" };
        write!(data, "{command} {} {}", point.x, point.y)?;
    }
    Ok(data)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
