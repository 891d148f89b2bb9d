use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::Result;
use crate::surface::{
    LabelShape, LineShape, LineStyle, Orientation, RecordedShape, RectShape, ShapeId,
    SurfaceRenderer,
};
use crate::width::truncate_to_width;

const CSI: &str = "\x1b[";
const RECT_FILL: char = '░';

/// Grid dimensions and the pixel size of one terminal cell.
///
/// The engine works in pixels; the cell size maps its coordinates onto the
/// character grid.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceSettings {
    pub cols: u16,
    pub rows: u16,
    pub cell_width_px: f64,
    pub cell_height_px: f64,
}

impl Default for SurfaceSettings {
    fn default() -> Self {
        Self {
            cols: 80,
            rows: 24,
            cell_width_px: 8.0,
            cell_height_px: 16.0,
        }
    }
}

#[derive(Debug)]
struct SurfaceState {
    settings: SurfaceSettings,
    next_id: u64,
    shapes: Vec<(ShapeId, RecordedShape)>,
}

/// Terminal-backed [`SurfaceRenderer`].
///
/// Clones share one retained shape store, so a session can own the renderer
/// boxed while the host keeps a handle for flushing.
#[derive(Debug, Clone)]
pub struct AnsiSurface {
    state: Arc<Mutex<SurfaceState>>,
}

impl AnsiSurface {
    pub fn new(settings: SurfaceSettings) -> Self {
        Self {
            state: Arc::new(Mutex::new(SurfaceState {
                settings,
                next_id: 0,
                shapes: Vec::new(),
            })),
        }
    }

    pub fn with_default() -> Self {
        Self::new(SurfaceSettings::default())
    }

    pub fn settings(&self) -> SurfaceSettings {
        self.lock().settings
    }

    /// Update the grid dimensions after a terminal resize.
    pub fn set_grid(&self, cols: u16, rows: u16) {
        let mut state = self.lock();
        state.settings.cols = cols;
        state.settings.rows = rows;
    }

    pub fn shape_count(&self) -> usize {
        self.lock().shapes.len()
    }

    /// Rasterize the retained shapes and write the full grid as ANSI rows.
    pub fn flush(&self, writer: &mut impl Write) -> Result<()> {
        let state = self.lock();
        let settings = state.settings;
        let cols = settings.cols as usize;
        let rows = settings.rows as usize;
        let mut grid = vec![vec![' '; cols]; rows];

        for (_, shape) in &state.shapes {
            match shape {
                RecordedShape::Rect(rect) => raster_rect(&mut grid, settings, rect),
                RecordedShape::Line(line) => raster_line(&mut grid, settings, line),
                RecordedShape::Label(label) => raster_label(&mut grid, settings, label),
            }
        }
        drop(state);

        for (row_idx, row) in grid.iter().enumerate() {
            let text: String = row.iter().collect();
            write!(writer, "{CSI}{};1H{}", row_idx + 1, text.trim_end())?;
            write!(writer, "{CSI}K")?;
        }
        writer.flush()?;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, SurfaceState> {
        self.state.lock().expect("surface mutex poisoned")
    }

    fn push(&mut self, shape: RecordedShape) -> ShapeId {
        let mut state = self.lock();
        let id = ShapeId(state.next_id);
        state.next_id += 1;
        state.shapes.push((id, shape));
        id
    }
}

impl SurfaceRenderer for AnsiSurface {
    fn add_rect(&mut self, rect: RectShape) -> Result<ShapeId> {
        Ok(self.push(RecordedShape::Rect(rect)))
    }

    fn add_line(&mut self, line: LineShape) -> Result<ShapeId> {
        Ok(self.push(RecordedShape::Line(line)))
    }

    fn add_label(&mut self, label: LabelShape) -> Result<ShapeId> {
        Ok(self.push(RecordedShape::Label(label)))
    }

    fn remove(&mut self, id: ShapeId) -> Result<()> {
        self.lock().shapes.retain(|(shape_id, _)| *shape_id != id);
        Ok(())
    }

    fn remove_all(&mut self) -> Result<()> {
        self.lock().shapes.clear();
        Ok(())
    }
}

fn col_of(settings: SurfaceSettings, x: f64) -> i64 {
    (x / settings.cell_width_px).floor() as i64
}

fn row_of(settings: SurfaceSettings, y: f64) -> i64 {
    (y / settings.cell_height_px).floor() as i64
}

fn put(grid: &mut [Vec<char>], row: i64, col: i64, ch: char) {
    if row < 0 || col < 0 {
        return;
    }
    let (row, col) = (row as usize, col as usize);
    if let Some(cells) = grid.get_mut(row) {
        if let Some(cell) = cells.get_mut(col) {
            *cell = ch;
        }
    }
}

fn raster_rect(grid: &mut [Vec<char>], settings: SurfaceSettings, rect: &RectShape) {
    let col_start = col_of(settings, rect.x);
    let col_end = col_of(settings, rect.x + rect.width - 1.0).max(col_start);
    let row_start = row_of(settings, rect.y);
    let row_end = row_of(settings, rect.y + rect.height - 1.0).max(row_start);
    for row in row_start..=row_end {
        for col in col_start..=col_end {
            put(grid, row, col, RECT_FILL);
        }
    }
}

fn raster_line(grid: &mut [Vec<char>], settings: SurfaceSettings, line: &LineShape) {
    let glyph = match (line.orientation, line.style) {
        (Orientation::Vertical, LineStyle::Solid) => '│',
        (Orientation::Vertical, LineStyle::Dotted) => '┆',
        (Orientation::Vertical, LineStyle::Dashed) => '╎',
        (Orientation::Horizontal, LineStyle::Solid) => '─',
        (Orientation::Horizontal, LineStyle::Dotted) => '┄',
        (Orientation::Horizontal, LineStyle::Dashed) => '╌',
    };
    match line.orientation {
        Orientation::Vertical => {
            let col = col_of(settings, line.x);
            let row_start = row_of(settings, line.y);
            let row_end = row_of(settings, line.y + line.length - 1.0).max(row_start);
            for row in row_start..=row_end {
                put(grid, row, col, glyph);
            }
        }
        Orientation::Horizontal => {
            let row = row_of(settings, line.y);
            let col_start = col_of(settings, line.x);
            let col_end = col_of(settings, line.x + line.length - 1.0).max(col_start);
            for col in col_start..=col_end {
                put(grid, row, col, glyph);
            }
        }
    }
}

fn raster_label(grid: &mut [Vec<char>], settings: SurfaceSettings, label: &LabelShape) {
    let start_col = col_of(settings, label.x);
    let start_row = row_of(settings, label.y);
    for (line_idx, line) in label.text.lines().enumerate() {
        let row = start_row + line_idx as i64;
        if start_col >= settings.cols as i64 {
            continue;
        }
        let available = (settings.cols as i64 - start_col.max(0)) as usize;
        let clipped = truncate_to_width(line, available);
        for (char_idx, ch) in clipped.chars().enumerate() {
            put(grid, row, start_col + char_idx as i64, ch);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> SurfaceSettings {
        SurfaceSettings {
            cols: 20,
            rows: 5,
            cell_width_px: 1.0,
            cell_height_px: 1.0,
        }
    }

    fn flushed(surface: &AnsiSurface) -> String {
        let mut out = Vec::new();
        surface.flush(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn flush_positions_every_row() {
        let surface = AnsiSurface::new(settings());
        let rendered = flushed(&surface);
        assert!(rendered.contains("\u{1b}[1;1H"));
        assert!(rendered.contains("\u{1b}[5;1H"));
    }

    #[test]
    fn shapes_land_on_the_grid() {
        let mut surface = AnsiSurface::new(settings());
        surface
            .add_rect(RectShape {
                x: 0.0,
                y: 0.0,
                width: 3.0,
                height: 1.0,
                fill: "#e5e5e5".to_string(),
            })
            .unwrap();
        surface
            .add_line(LineShape {
                x: 0.0,
                y: 2.0,
                length: 4.0,
                orientation: Orientation::Horizontal,
                color: "#000".to_string(),
                style: LineStyle::Dotted,
            })
            .unwrap();
        surface
            .add_label(LabelShape {
                x: 5.0,
                y: 4.0,
                text: "1.0 in".to_string(),
                color: "#323232".to_string(),
                background: None,
            })
            .unwrap();

        let rendered = flushed(&surface);
        assert!(rendered.contains("░░░"));
        assert!(rendered.contains("┄┄┄┄"));
        assert!(rendered.contains("1.0 in"));
    }

    #[test]
    fn labels_clip_at_the_right_edge() {
        let mut surface = AnsiSurface::new(settings());
        surface
            .add_label(LabelShape {
                x: 16.0,
                y: 0.0,
                text: "100.0 px".to_string(),
                color: "#323232".to_string(),
                background: None,
            })
            .unwrap();
        let rendered = flushed(&surface);
        assert!(rendered.contains("100."));
        assert!(!rendered.contains("100.0"));
    }

    #[test]
    fn clones_share_the_shape_store() {
        let mut surface = AnsiSurface::new(settings());
        let handle = surface.clone();
        let id = surface
            .add_line(LineShape {
                x: 1.0,
                y: 1.0,
                length: 2.0,
                orientation: Orientation::Vertical,
                color: "#000".to_string(),
                style: LineStyle::Solid,
            })
            .unwrap();
        assert_eq!(handle.shape_count(), 1);
        surface.remove(id).unwrap();
        assert_eq!(handle.shape_count(), 0);
    }

    #[test]
    fn offscreen_shapes_are_ignored() {
        let mut surface = AnsiSurface::new(settings());
        surface
            .add_line(LineShape {
                x: -5.0,
                y: -5.0,
                length: 2.0,
                orientation: Orientation::Vertical,
                color: "#000".to_string(),
                style: LineStyle::Solid,
            })
            .unwrap();
        // Must not panic on negative coordinates.
        let _ = flushed(&surface);
    }
}
