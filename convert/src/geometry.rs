//! 2D geometry in PDF user space.

use std::ops::Mul;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

/// PDF transformation matrix `[a b c d e f]`, using the PDF row-vector convention:
/// `x' = a*x + c*y + e`, `y' = b*x + d*y + f`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn transform(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// `m1 * m2` applies `m1` first, then `m2`. The `cm` operator therefore sets the CTM to
/// `operand * ctm`.
impl Mul for Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Matrix) -> Matrix {
        Matrix {
            a: self.a * rhs.a + self.b * rhs.c,
            b: self.a * rhs.b + self.b * rhs.d,
            c: self.c * rhs.a + self.d * rhs.c,
            d: self.c * rhs.b + self.d * rhs.d,
            e: self.e * rhs.a + self.f * rhs.c + rhs.e,
            f: self.e * rhs.b + self.f * rhs.d + rhs.f,
        }
    }
}

/// Axis aligned rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    /// Smallest rectangle containing all of `points`, or `None` if there are none.
    pub fn bounding(points: impl IntoIterator<Item = Point>) -> Option<Rect> {
        points.into_iter().fold(None, |acc, p| {
            Some(match acc {
                None => Rect { min: p, max: p },
                Some(r) => Rect {
                    min: Point::new(r.min.x.min(p.x), r.min.y.min(p.y)),
                    max: Point::new(r.max.x.max(p.x), r.max.y.max(p.y)),
                },
            })
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Segment {
    Line(Point),
    /// Cubic Bezier with two control points and an end point.
    Curve(Point, Point, Point),
}

impl Segment {
    fn end(&self) -> Point {
        match *self {
            Segment::Line(p) => p,
            Segment::Curve(_, _, p) => p,
        }
    }
}

/// One connected run of segments.
#[derive(Clone, Debug, PartialEq)]
pub struct SubPath {
    pub start: Point,
    pub segments: Vec<Segment>,
    pub closed: bool,
}

impl SubPath {
    pub fn new(start: Point) -> Self {
        Self {
            start,
            segments: Vec::new(),
            closed: false,
        }
    }

    pub fn current_point(&self) -> Point {
        self.segments.last().map(Segment::end).unwrap_or(self.start)
    }

    pub fn is_degenerate(&self) -> bool {
        self.segments.is_empty()
    }

    /// Vertices of the subpath with curves approximated by `curve_segments` straight lines
    /// each. A closing segment back to `start` is implied by `closed`, not included.
    pub fn flatten(&self, curve_segments: u32) -> Vec<Point> {
        let curve_segments = curve_segments.max(1);
        let mut points = vec![self.start];
        let mut current = self.start;
        for segment in &self.segments {
            match *segment {
                Segment::Line(p) => points.push(p),
                Segment::Curve(c1, c2, end) => {
                    for i in 1..=curve_segments {
                        let t = f64::from(i) / f64::from(curve_segments);
                        points.push(cubic_bezier(current, c1, c2, end, t));
                    }
                }
            }
            current = segment.end();
        }

        if self.closed && points.len() > 1 && points.last() == Some(&self.start) {
            points.pop();
        }
        points
    }
}

fn cubic_bezier(p0: Point, p1: Point, p2: Point, p3: Point, t: f64) -> Point {
    let mt = 1.0 - t;
    let w0 = mt * mt * mt;
    let w1 = 3.0 * mt * mt * t;
    let w2 = 3.0 * mt * t * t;
    let w3 = t * t * t;
    Point::new(
        w0 * p0.x + w1 * p1.x + w2 * p2.x + w3 * p3.x,
        w0 * p0.y + w1 * p1.y + w2 * p2.y + w3 * p3.y,
    )
}
