//! Minimal ASCII DXF (R12) writer for 2D line work.

use std::io::{self, Write};

use crate::geometry::{Point, Rect};

/// Drawing units, and the conversion from PDF points.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    PartialEq,
    serde_derive::Deserialize,
    serde_derive::Serialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Units {
    Points,
    #[default]
    Millimeters,
    Inches,
}

impl Units {
    /// Multiplier from PDF points (1/72 inch) into these units.
    pub fn per_point(self) -> f64 {
        match self {
            Units::Points => 1.0,
            Units::Millimeters => 25.4 / 72.0,
            Units::Inches => 1.0 / 72.0,
        }
    }

    /// Value of the `$INSUNITS` header variable.
    fn insunits(self) -> i32 {
        match self {
            Units::Points => 0,
            Units::Millimeters => 4,
            Units::Inches => 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Entity {
    Line {
        layer: String,
        from: Point,
        to: Point,
    },
    Polyline {
        layer: String,
        vertices: Vec<Point>,
        closed: bool,
    },
}

impl Entity {
    fn points(&self) -> Vec<Point> {
        match self {
            Entity::Line { from, to, .. } => vec![*from, *to],
            Entity::Polyline { vertices, .. } => vertices.clone(),
        }
    }
}

/// Entities to be written into one DXF file, already in drawing units.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Drawing {
    pub units: Units,
    pub layers: Vec<String>,
    pub entities: Vec<Entity>,
    /// Extents to declare when there are no entities.
    pub fallback_extents: Option<Rect>,
}

impl Drawing {
    pub fn new(units: Units) -> Self {
        Self {
            units,
            ..Default::default()
        }
    }

    pub fn add_layer(&mut self, name: &str) {
        if !self.layers.iter().any(|layer| layer == name) {
            self.layers.push(name.to_string());
        }
    }

    pub fn extents(&self) -> Rect {
        Rect::bounding(self.entities.iter().flat_map(Entity::points))
            .or(self.fallback_extents)
            .unwrap_or(Rect {
                min: Point::default(),
                max: Point::default(),
            })
    }

    pub fn write_to(&self, w: &mut dyn Write) -> io::Result<()> {
        let mut out = GroupWriter { w };
        self.write_header(&mut out)?;
        self.write_tables(&mut out)?;
        self.write_entities(&mut out)?;
        out.text(0, "EOF")
    }

    fn write_header(&self, out: &mut GroupWriter) -> io::Result<()> {
        let extents = self.extents();
        out.section("HEADER")?;
        out.text(9, "$ACADVER")?;
        out.text(1, "AC1009")?;
        out.text(9, "$INSUNITS")?;
        out.int(70, self.units.insunits())?;
        out.text(9, "$EXTMIN")?;
        out.point(10, extents.min)?;
        out.text(9, "$EXTMAX")?;
        out.point(10, extents.max)?;
        out.end_section()
    }

    fn write_tables(&self, out: &mut GroupWriter) -> io::Result<()> {
        out.section("TABLES")?;
        out.text(0, "TABLE")?;
        out.text(2, "LAYER")?;
        out.int(70, self.layers.len() as i32)?;
        for layer in &self.layers {
            out.text(0, "LAYER")?;
            out.text(2, layer)?;
            out.int(70, 0)?;
            // White/black, continuous line type.
            out.int(62, 7)?;
            out.text(6, "CONTINUOUS")?;
        }
        out.text(0, "ENDTAB")?;
        out.end_section()
    }

    fn write_entities(&self, out: &mut GroupWriter) -> io::Result<()> {
        out.section("ENTITIES")?;
        for entity in &self.entities {
            match entity {
                Entity::Line { layer, from, to } => {
                    out.text(0, "LINE")?;
                    out.text(8, layer)?;
                    out.point(10, *from)?;
                    out.point(11, *to)?;
                }
                Entity::Polyline {
                    layer,
                    vertices,
                    closed,
                } => {
                    out.text(0, "POLYLINE")?;
                    out.text(8, layer)?;
                    out.int(66, 1)?;
                    out.point(10, Point::default())?;
                    out.int(70, if *closed { 1 } else { 0 })?;
                    for vertex in vertices {
                        out.text(0, "VERTEX")?;
                        out.text(8, layer)?;
                        out.point(10, *vertex)?;
                    }
                    out.text(0, "SEQEND")?;
                    out.text(8, layer)?;
                }
            }
        }
        out.end_section()
    }
}

/// Writes DXF group code/value pairs.
struct GroupWriter<'w> {
    w: &'w mut dyn Write,
}

impl GroupWriter<'_> {
    fn text(&mut self, code: i32, value: &str) -> io::Result<()> {
        write!(self.w, "{:>3}\n{}\n", code, value)
    }

    fn int(&mut self, code: i32, value: i32) -> io::Result<()> {
        write!(self.w, "{:>3}\n{:>6}\n", code, value)
    }

    fn real(&mut self, code: i32, value: f64) -> io::Result<()> {
        // Avoid writing "-0.000000".
        let value = if value.abs() < 5e-7 { 0.0 } else { value };
        write!(self.w, "{:>3}\n{:.6}\n", code, value)
    }

    /// Writes a 3D point with zero Z, using `code`, `code + 10` and `code + 20`.
    fn point(&mut self, code: i32, p: Point) -> io::Result<()> {
        self.real(code, p.x)?;
        self.real(code + 10, p.y)?;
        self.real(code + 20, 0.0)
    }

    fn section(&mut self, name: &str) -> io::Result<()> {
        self.text(0, "SECTION")?;
        self.text(2, name)
    }

    fn end_section(&mut self) -> io::Result<()> {
        self.text(0, "ENDSEC")
    }
}
