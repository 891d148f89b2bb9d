use serde::Serialize;

use crate::error::Result;

/// Handle to a shape previously added to a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ShapeId(pub u64);

/// Axis a line runs along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Stroke style for lines, mirroring the crosshair style options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    Solid,
    Dotted,
    Dashed,
}

/// Filled rectangle in container pixel space.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RectShape {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: String,
}

/// One-pixel-thick line starting at (x, y) and extending along `orientation`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineShape {
    pub x: f64,
    pub y: f64,
    pub length: f64,
    pub orientation: Orientation,
    pub color: String,
    pub style: LineStyle,
}

/// Positioned text, optionally boxed with a background fill.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelShape {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub color: String,
    pub background: Option<String>,
}

/// Capability interface the session draws through.
///
/// Implementations own shape identity: every add returns a fresh [`ShapeId`]
/// and `remove` of an unknown id is a no-op, so the session can replace the
/// crosshair on every pointer move without bookkeeping races.
pub trait SurfaceRenderer {
    fn add_rect(&mut self, rect: RectShape) -> Result<ShapeId>;
    fn add_line(&mut self, line: LineShape) -> Result<ShapeId>;
    fn add_label(&mut self, label: LabelShape) -> Result<ShapeId>;
    fn remove(&mut self, id: ShapeId) -> Result<()>;
    fn remove_all(&mut self) -> Result<()>;
}

/// Shape captured by a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RecordedShape {
    Rect(RectShape),
    Line(LineShape),
    Label(LabelShape),
}

/// Surface that retains every live shape, for tests and diagnostics.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    next_id: u64,
    shapes: Vec<(ShapeId, RecordedShape)>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_shapes(&self) -> impl Iterator<Item = &RecordedShape> {
        self.shapes.iter().map(|(_, shape)| shape)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn lines(&self) -> Vec<&LineShape> {
        self.shapes
            .iter()
            .filter_map(|(_, shape)| match shape {
                RecordedShape::Line(line) => Some(line),
                _ => None,
            })
            .collect()
    }

    pub fn labels(&self) -> Vec<&LabelShape> {
        self.shapes
            .iter()
            .filter_map(|(_, shape)| match shape {
                RecordedShape::Label(label) => Some(label),
                _ => None,
            })
            .collect()
    }

    pub fn rects(&self) -> Vec<&RectShape> {
        self.shapes
            .iter()
            .filter_map(|(_, shape)| match shape {
                RecordedShape::Rect(rect) => Some(rect),
                _ => None,
            })
            .collect()
    }

    fn push(&mut self, shape: RecordedShape) -> ShapeId {
        let id = ShapeId(self.next_id);
        self.next_id += 1;
        self.shapes.push((id, shape));
        id
    }
}

impl SurfaceRenderer for RecordingSurface {
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
        self.shapes.retain(|(shape_id, _)| *shape_id != id);
        Ok(())
    }

    fn remove_all(&mut self) -> Result<()> {
        self.shapes.clear();
        Ok(())
    }
}

/// Surface that accepts and discards everything. Useful for benches and for
/// driving the session logic without a visual host.
#[derive(Debug, Default)]
pub struct NullSurface {
    next_id: u64,
}

impl NullSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SurfaceRenderer for NullSurface {
    fn add_rect(&mut self, _rect: RectShape) -> Result<ShapeId> {
        self.next_id += 1;
        Ok(ShapeId(self.next_id))
    }

    fn add_line(&mut self, _line: LineShape) -> Result<ShapeId> {
        self.next_id += 1;
        Ok(ShapeId(self.next_id))
    }

    fn add_label(&mut self, _label: LabelShape) -> Result<ShapeId> {
        self.next_id += 1;
        Ok(ShapeId(self.next_id))
    }

    fn remove(&mut self, _id: ShapeId) -> Result<()> {
        Ok(())
    }

    fn remove_all(&mut self) -> Result<()> {
        Ok(())
    }
}
