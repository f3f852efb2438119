//! Interprets page content streams, collecting painted vector paths.
//!
//! Only the operators that affect path geometry are interpreted: graphics state save/restore,
//! `cm`, path construction, path painting, and form XObjects. Text, images, colour and clipping
//! are ignored.

use lopdf::{
    Dictionary, Document, Object, Stream,
    content::{Content, Operation},
};

use crate::geometry::{Matrix, Point, Segment, SubPath};

/// Limits nesting of form XObjects, which also stops self-referencing forms.
const MAX_FORM_DEPTH: usize = 16;

/// How a path was painted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Paint {
    Stroke,
    Fill,
    FillStroke,
}

/// A path as painted by a single painting operator, in page user space.
#[derive(Clone, Debug, PartialEq)]
pub struct PaintedPath {
    pub subpaths: Vec<SubPath>,
    pub paint: Paint,
}

pub(crate) struct Interpreter<'a> {
    doc: &'a Document,
    ctm: Matrix,
    saved: Vec<Matrix>,
    path: Vec<SubPath>,
    painted: Vec<PaintedPath>,
}

impl<'a> Interpreter<'a> {
    pub fn new(doc: &'a Document) -> Self {
        Self {
            doc,
            ctm: Matrix::IDENTITY,
            saved: Vec::new(),
            path: Vec::new(),
            painted: Vec::new(),
        }
    }

    pub fn finish(self) -> Vec<PaintedPath> {
        self.painted
    }

    pub fn run(&mut self, operations: &[Operation], resources: Option<&'a Dictionary>, depth: usize) {
        for op in operations {
            self.apply(op, resources, depth);
        }
    }

    fn apply(&mut self, op: &Operation, resources: Option<&'a Dictionary>, depth: usize) {
        let operands = &op.operands;
        match op.operator.as_str() {
            "q" => self.saved.push(self.ctm),
            "Q" => match self.saved.pop() {
                Some(ctm) => self.ctm = ctm,
                None => log::debug!("Unbalanced Q operator ignored."),
            },
            "cm" => {
                if let Some([a, b, c, d, e, f]) = numbers(operands) {
                    self.ctm = Matrix::new(a, b, c, d, e, f) * self.ctm;
                }
            }
            "m" => {
                if let Some([x, y]) = numbers(operands) {
                    let start = self.user_point(x, y);
                    self.path.push(SubPath::new(start));
                }
            }
            "l" => {
                if let Some([x, y]) = numbers(operands) {
                    let p = self.user_point(x, y);
                    self.push_segment(Segment::Line(p));
                }
            }
            "c" => {
                if let Some([x1, y1, x2, y2, x3, y3]) = numbers(operands) {
                    let segment = Segment::Curve(
                        self.user_point(x1, y1),
                        self.user_point(x2, y2),
                        self.user_point(x3, y3),
                    );
                    self.push_segment(segment);
                }
            }
            "v" => {
                if let (Some([x2, y2, x3, y3]), Some(current)) =
                    (numbers(operands), self.current_point())
                {
                    let segment =
                        Segment::Curve(current, self.user_point(x2, y2), self.user_point(x3, y3));
                    self.push_segment(segment);
                }
            }
            "y" => {
                if let Some([x1, y1, x3, y3]) = numbers(operands) {
                    let end = self.user_point(x3, y3);
                    self.push_segment(Segment::Curve(self.user_point(x1, y1), end, end));
                }
            }
            "h" => self.close_subpath(),
            "re" => {
                if let Some([x, y, w, h]) = numbers(operands) {
                    let mut rect = SubPath::new(self.user_point(x, y));
                    rect.segments = vec![
                        Segment::Line(self.user_point(x + w, y)),
                        Segment::Line(self.user_point(x + w, y + h)),
                        Segment::Line(self.user_point(x, y + h)),
                    ];
                    rect.closed = true;
                    self.path.push(rect);
                }
            }
            "S" => self.paint(Paint::Stroke, false),
            "s" => self.paint(Paint::Stroke, true),
            "f" | "F" | "f*" => self.paint(Paint::Fill, true),
            "B" | "B*" => self.paint(Paint::FillStroke, false),
            "b" | "b*" => self.paint(Paint::FillStroke, true),
            "n" => self.path.clear(),
            "Do" => self.paint_xobject(operands, resources, depth),
            _ => {}
        }
    }

    fn user_point(&self, x: f64, y: f64) -> Point {
        self.ctm.transform(Point::new(x, y))
    }

    fn current_point(&self) -> Option<Point> {
        self.path.last().map(|subpath| {
            if subpath.closed {
                subpath.start
            } else {
                subpath.current_point()
            }
        })
    }

    fn push_segment(&mut self, segment: Segment) {
        // After `h`, drawing continues in a new subpath from the closed subpath's start.
        let restart = match self.path.last() {
            None => {
                log::debug!("Path segment without current point ignored.");
                return;
            }
            Some(subpath) if subpath.closed => Some(subpath.start),
            Some(_) => None,
        };
        if let Some(start) = restart {
            self.path.push(SubPath::new(start));
        }
        if let Some(subpath) = self.path.last_mut() {
            subpath.segments.push(segment);
        }
    }

    fn close_subpath(&mut self) {
        if let Some(subpath) = self.path.last_mut() {
            subpath.closed = true;
        }
    }

    fn paint(&mut self, paint: Paint, close: bool) {
        let mut subpaths: Vec<SubPath> = std::mem::take(&mut self.path)
            .into_iter()
            .filter(|subpath| !subpath.is_degenerate())
            .collect();
        if subpaths.is_empty() {
            return;
        }
        if close {
            for subpath in &mut subpaths {
                subpath.closed = true;
            }
        }
        self.painted.push(PaintedPath { subpaths, paint });
    }

    fn paint_xobject(&mut self, operands: &[Object], resources: Option<&'a Dictionary>, depth: usize) {
        let Some(name) = operands.first().and_then(|o| o.as_name().ok()) else {
            return;
        };
        let Some(stream) = resources.and_then(|resources| self.xobject(resources, name)) else {
            log::debug!("XObject {:?} not found in resources.", String::from_utf8_lossy(name));
            return;
        };
        let is_form = stream
            .dict
            .get(b"Subtype")
            .and_then(Object::as_name)
            .map(|subtype| subtype == b"Form")
            .unwrap_or(false);
        if !is_form {
            return;
        }
        if depth >= MAX_FORM_DEPTH {
            log::warn!(
                "Form XObject {:?} nested too deeply, skipping.",
                String::from_utf8_lossy(name)
            );
            return;
        }

        let content = match decode_stream(stream) {
            Ok(content) => content,
            Err(err) => {
                log::warn!(
                    "Skipping form XObject {:?} with undecodable content: {}",
                    String::from_utf8_lossy(name),
                    err
                );
                return;
            }
        };
        let matrix = stream
            .dict
            .get(b"Matrix")
            .ok()
            .and_then(|m| resolve(self.doc, m).ok())
            .and_then(matrix_from_object)
            .unwrap_or(Matrix::IDENTITY);
        let form_resources = stream
            .dict
            .get(b"Resources")
            .ok()
            .and_then(|r| resolve(self.doc, r).ok())
            .and_then(|r| r.as_dict().ok())
            .or(resources);

        let saved_len = self.saved.len();
        let saved_ctm = self.ctm;
        self.ctm = matrix * self.ctm;
        self.run(&content.operations, form_resources, depth + 1);
        self.saved.truncate(saved_len);
        self.ctm = saved_ctm;
    }

    fn xobject(&self, resources: &'a Dictionary, name: &[u8]) -> Option<&'a Stream> {
        let xobjects = resolve(self.doc, resources.get(b"XObject").ok()?)
            .ok()?
            .as_dict()
            .ok()?;
        resolve(self.doc, xobjects.get(name).ok()?)
            .ok()?
            .as_stream()
            .ok()
    }
}

/// Follows `obj` if it is a reference.
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> lopdf::Result<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id),
        other => Ok(other),
    }
}

fn decode_stream(stream: &Stream) -> lopdf::Result<Content> {
    let bytes = if stream.dict.has(b"Filter") {
        stream.decompressed_content()?
    } else {
        stream.content.clone()
    };
    Content::decode(&bytes)
}

fn matrix_from_object(obj: &Object) -> Option<Matrix> {
    let values = obj.as_array().ok()?;
    let [a, b, c, d, e, f] = numbers(values)?;
    Some(Matrix::new(a, b, c, d, e, f))
}

/// Reads the last `N` operands as numbers. Malformed operators are skipped by callers.
fn numbers<const N: usize>(operands: &[Object]) -> Option<[f64; N]> {
    if operands.len() < N {
        log::debug!("Expected {} numeric operands, got {:?}.", N, operands);
        return None;
    }
    let mut out = [0.0; N];
    for (slot, obj) in out.iter_mut().zip(&operands[operands.len() - N..]) {
        *slot = f64::from(obj.as_float().ok()?);
    }
    Some(out)
}
