use std::{
    io::Write,
    path::{Path, PathBuf},
};

use atomic_write_file::AtomicWriteFile;

use crate::{
    dxf::{Drawing, Entity, Units},
    error::ConvertError,
    geometry::SubPath,
    pages::PageSelector,
    pdf::{PageDrawing, Paint, PdfDocument},
};

/// Tunables for [extract_and_convert].
#[derive(Clone, Debug, PartialEq, serde_derive::Deserialize, serde_derive::Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertOptions {
    pub units: Units,
    /// Number of straight segments used to approximate each Bezier curve.
    pub curve_segments: u32,
    /// Put each page's entities on a layer named after the page, rather than layer "0".
    /// Fill-only paths always go on a separate layer, suffixed `_FILL` for page layers.
    pub layer_per_page: bool,
    pub overwrite_existing: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            units: Units::default(),
            curve_segments: 16,
            layer_per_page: false,
            overwrite_existing: true,
        }
    }
}

/// Progress of a conversion, reported after each page is written.
#[derive(Clone, Debug, PartialEq)]
pub struct PageProgress {
    pub page: u32,
    pub output: PathBuf,
    pub completed: usize,
    pub total: usize,
}

/// Receives notifications about conversion progress, and can request that conversion stops
/// early.
pub trait ConvertEvents {
    fn on_page_converted(&mut self, progress: PageProgress);
    fn do_continue(&self) -> bool;
}

/// [ConvertEvents] that ignores progress and never cancels.
pub struct NoEvents;

impl ConvertEvents for NoEvents {
    fn on_page_converted(&mut self, _progress: PageProgress) {}

    fn do_continue(&self) -> bool {
        true
    }
}

/// Outcome of a successful conversion.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConversionSummary {
    /// DXF files written, in page order.
    pub outputs: Vec<PathBuf>,
}

/// Converts the vector line work of the selected pages (all pages when `pages` is `None`) of
/// `input_pdf` into one DXF file per page inside `output_dir`.
///
/// Output files are named `<input stem>_page<N>.dxf`. Each file is written atomically, so
/// cancellation or failure part way through leaves only complete files behind.
pub fn extract_and_convert(
    input_pdf: &Path,
    output_dir: &Path,
    pages: Option<&PageSelector>,
    options: &ConvertOptions,
    events: &mut dyn ConvertEvents,
) -> Result<ConversionSummary, ConvertError> {
    if options.curve_segments == 0 {
        return Err(ConvertError::InvalidCurveSegments);
    }
    if !output_dir.exists() {
        return Err(ConvertError::OutputDirMissing(output_dir.to_owned()));
    }
    if !output_dir.is_dir() {
        return Err(ConvertError::OutputNotDirectory(output_dir.to_owned()));
    }

    let pdf = PdfDocument::open(input_pdf)?;
    let selected = pdf.select_pages(pages)?;
    let stem = input_pdf
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());

    log::info!(
        "Converting {} of {} pages from {:?} into {:?}.",
        selected.len(),
        pdf.page_count(),
        input_pdf,
        output_dir
    );

    let total = selected.len();
    let mut summary = ConversionSummary::default();
    for (index, (page, page_id)) in selected.into_iter().enumerate() {
        if !events.do_continue() {
            log::info!("Conversion cancelled before page {}.", page);
            return Err(ConvertError::Cancelled);
        }

        let output = output_dir.join(format!("{}_page{}.dxf", stem, page));
        if !options.overwrite_existing && output.exists() {
            return Err(ConvertError::OutputExists(output));
        }

        let drawing = pdf.page_drawing(page, page_id)?;
        let dxf = to_dxf(&drawing, options);
        write_atomic(&output, &dxf)?;
        log::debug!(
            "Wrote {} entities for page {} to {:?}.",
            dxf.entities.len(),
            page,
            output
        );

        summary.outputs.push(output.clone());
        events.on_page_converted(PageProgress {
            page,
            output,
            completed: index + 1,
            total,
        });
    }

    Ok(summary)
}

// TODO: Apply the page /Rotate entry, so rotated pages come out upright.
fn to_dxf(page: &PageDrawing, options: &ConvertOptions) -> Drawing {
    let scale = options.units.per_point();
    let (stroke_layer, fill_layer) = if options.layer_per_page {
        let layer = format!("PAGE_{}", page.page);
        let fill_layer = format!("{}_FILL", layer);
        (layer, fill_layer)
    } else {
        ("0".to_string(), "FILL".to_string())
    };

    let mut drawing = Drawing::new(options.units);
    drawing.add_layer(&stroke_layer);
    drawing.fallback_extents = Some(crate::geometry::Rect {
        min: page.media_box.min.scaled(scale),
        max: page.media_box.max.scaled(scale),
    });

    for path in &page.paths {
        let layer = match path.paint {
            Paint::Fill => &fill_layer,
            Paint::Stroke | Paint::FillStroke => &stroke_layer,
        };
        drawing.add_layer(layer);
        for subpath in &path.subpaths {
            push_subpath(&mut drawing, layer, subpath, scale, options.curve_segments);
        }
    }

    drawing
}

fn push_subpath(
    drawing: &mut Drawing,
    layer: &str,
    subpath: &SubPath,
    scale: f64,
    curve_segments: u32,
) {
    let vertices: Vec<_> = subpath
        .flatten(curve_segments)
        .into_iter()
        .map(|p| p.scaled(scale))
        .collect();
    let entity = if vertices.len() == 2 && !subpath.closed {
        Entity::Line {
            layer: layer.to_string(),
            from: vertices[0],
            to: vertices[1],
        }
    } else {
        Entity::Polyline {
            layer: layer.to_string(),
            vertices,
            closed: subpath.closed,
        }
    };
    drawing.entities.push(entity);
}

fn write_atomic(path: &Path, drawing: &Drawing) -> Result<(), ConvertError> {
    let write_err = |source| ConvertError::Write {
        path: path.to_owned(),
        source,
    };
    let mut file = AtomicWriteFile::open(path).map_err(write_err)?;
    drawing.write_to(&mut file).map_err(write_err)?;
    file.flush().map_err(write_err)?;
    file.commit().map_err(write_err)
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, fs};

    use googletest::prelude::*;
    use tempfile::TempDir;
    use testutils::pdf::PdfBuilder;

    use super::*;
    use crate::pages::parse_pages_arg;

    /// Records progress, and cancels once `cancel_after` pages have been converted.
    #[derive(Default)]
    struct FakeEvents {
        progress: Vec<PageProgress>,
        cancel_after: Option<usize>,
        continue_checks: Cell<usize>,
    }

    impl ConvertEvents for FakeEvents {
        fn on_page_converted(&mut self, progress: PageProgress) {
            self.progress.push(progress);
        }

        fn do_continue(&self) -> bool {
            self.continue_checks.set(self.continue_checks.get() + 1);
            match self.cancel_after {
                Some(limit) => self.progress.len() < limit,
                None => true,
            }
        }
    }

    struct Fixture {
        _dir: TempDir,
        input: PathBuf,
        output_dir: PathBuf,
    }

    fn fixture(builder: PdfBuilder) -> Fixture {
        let dir = tempfile::tempdir().expect("create temp dir");
        let input = dir.path().join("plan.pdf");
        builder.save(&input).expect("save test PDF");
        let output_dir = dir.path().join("out");
        fs::create_dir(&output_dir).expect("create output dir");
        Fixture {
            _dir: dir,
            input,
            output_dir,
        }
    }

    fn three_page_pdf() -> PdfBuilder {
        PdfBuilder::new()
            .page("0 0 m 72 0 l S")
            .page("0 0 72 72 re f")
            .page("0 0 m 10 10 20 10 30 0 c S")
    }

    fn file_names(outputs: &[PathBuf]) -> Vec<String> {
        outputs
            .iter()
            .filter_map(|p| p.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect()
    }

    #[gtest]
    #[test_log::test]
    fn converts_every_page_by_default() -> Result<()> {
        let fx = fixture(three_page_pdf());
        let mut events = FakeEvents::default();

        let summary = extract_and_convert(
            &fx.input,
            &fx.output_dir,
            None,
            &ConvertOptions::default(),
            &mut events,
        )?;

        expect_that!(
            file_names(&summary.outputs),
            elements_are![
                eq("plan_page1.dxf"),
                eq("plan_page2.dxf"),
                eq("plan_page3.dxf"),
            ]
        );
        for output in &summary.outputs {
            let text = fs::read_to_string(output)?;
            expect_that!(text, contains_substring("ENTITIES"));
            expect_that!(text.trim_end(), ends_with("EOF"));
        }
        expect_that!(
            events
                .progress
                .iter()
                .map(|p| (p.page, p.completed, p.total))
                .collect::<Vec<_>>(),
            elements_are![eq(&(1, 1, 3)), eq(&(2, 2, 3)), eq(&(3, 3, 3))]
        );
        Ok(())
    }

    #[gtest]
    fn converts_only_selected_pages() -> Result<()> {
        let fx = fixture(three_page_pdf());
        let pages = parse_pages_arg("1,3")?;

        let summary = extract_and_convert(
            &fx.input,
            &fx.output_dir,
            Some(&pages),
            &ConvertOptions::default(),
            &mut NoEvents,
        )?;

        expect_that!(
            file_names(&summary.outputs),
            elements_are![eq("plan_page1.dxf"), eq("plan_page3.dxf")]
        );
        expect_that!(fx.output_dir.join("plan_page2.dxf").exists(), eq(false));
        Ok(())
    }

    #[gtest]
    fn line_becomes_scaled_line_entity() -> Result<()> {
        let fx = fixture(PdfBuilder::new().page("0 0 m 72 0 l S"));
        let options = ConvertOptions {
            units: Units::Inches,
            ..Default::default()
        };

        let summary =
            extract_and_convert(&fx.input, &fx.output_dir, None, &options, &mut NoEvents)?;

        let text = fs::read_to_string(&summary.outputs[0])?;
        expect_that!(text, contains_substring("LINE"));
        expect_that!(text, not(contains_substring("POLYLINE")));
        // 72 points is one inch.
        expect_that!(text, contains_substring(" 11\n1.000000\n"));
        Ok(())
    }

    #[gtest]
    fn layer_per_page_names_layers_after_pages() -> Result<()> {
        let fx = fixture(three_page_pdf());
        let options = ConvertOptions {
            layer_per_page: true,
            ..Default::default()
        };

        let summary =
            extract_and_convert(&fx.input, &fx.output_dir, None, &options, &mut NoEvents)?;

        let text = fs::read_to_string(&summary.outputs[0])?;
        expect_that!(text, contains_substring("\n  8\nPAGE_1\n"));
        let text = fs::read_to_string(&summary.outputs[1])?;
        expect_that!(text, contains_substring("\n  8\nPAGE_2_FILL\n"));
        Ok(())
    }

    #[gtest]
    fn fills_and_strokes_go_on_separate_layers() -> Result<()> {
        let fx = fixture(
            PdfBuilder::new().page("0 0 m 72 0 l S 0 0 72 72 re f 10 10 20 20 re B"),
        );

        let summary = extract_and_convert(
            &fx.input,
            &fx.output_dir,
            None,
            &ConvertOptions::default(),
            &mut NoEvents,
        )?;

        let text = fs::read_to_string(&summary.outputs[0])?;
        expect_that!(text, contains_substring("\n  2\n0\n"));
        expect_that!(text, contains_substring("\n  2\nFILL\n"));
        expect_that!(text, contains_substring("  0\nLINE\n  8\n0\n"));
        expect_that!(text.matches("POLYLINE\n  8\nFILL\n").count(), eq(1));
        expect_that!(text.matches("POLYLINE\n  8\n0\n").count(), eq(1));
        Ok(())
    }

    #[gtest]
    fn fill_layer_is_only_added_when_used() -> Result<()> {
        let fx = fixture(PdfBuilder::new().page("0 0 m 72 0 l S"));

        let summary = extract_and_convert(
            &fx.input,
            &fx.output_dir,
            None,
            &ConvertOptions::default(),
            &mut NoEvents,
        )?;

        let text = fs::read_to_string(&summary.outputs[0])?;
        expect_that!(text, not(contains_substring("FILL")));
        Ok(())
    }

    #[gtest]
    fn curves_are_flattened_into_polylines() -> Result<()> {
        let fx = fixture(PdfBuilder::new().page("0 0 m 10 10 20 10 30 0 c S"));
        let options = ConvertOptions {
            curve_segments: 4,
            ..Default::default()
        };

        let summary =
            extract_and_convert(&fx.input, &fx.output_dir, None, &options, &mut NoEvents)?;

        let text = fs::read_to_string(&summary.outputs[0])?;
        expect_that!(text.matches("VERTEX").count(), eq(5));
        Ok(())
    }

    #[gtest]
    #[test_log::test]
    fn out_of_range_pages_are_rejected_before_writing() {
        let fx = fixture(three_page_pdf());
        let pages = parse_pages_arg("2-5").expect("valid page range");

        let result = extract_and_convert(
            &fx.input,
            &fx.output_dir,
            Some(&pages),
            &ConvertOptions::default(),
            &mut NoEvents,
        );

        expect_that!(
            result.map_err(|err| err.to_string()),
            err(eq("pages 4-5 are out of range, the document has 3 pages"))
        );
        expect_that!(
            fs::read_dir(&fx.output_dir).map(|entries| entries.count()).ok(),
            some(eq(0))
        );
    }

    #[gtest]
    #[test_log::test]
    fn cancellation_stops_between_pages() {
        let fx = fixture(three_page_pdf());
        let mut events = FakeEvents {
            cancel_after: Some(1),
            ..Default::default()
        };

        let result = extract_and_convert(
            &fx.input,
            &fx.output_dir,
            None,
            &ConvertOptions::default(),
            &mut events,
        );

        expect_that!(
            result.map_err(|err| err.to_string()),
            err(eq("conversion cancelled"))
        );
        expect_that!(events.progress, len(eq(1)));
        expect_that!(events.continue_checks.get(), eq(2));
        expect_that!(fx.output_dir.join("plan_page1.dxf").exists(), eq(true));
        expect_that!(fx.output_dir.join("plan_page2.dxf").exists(), eq(false));
    }

    #[gtest]
    fn refuses_to_overwrite_when_asked() {
        let fx = fixture(three_page_pdf());
        fs::write(fx.output_dir.join("plan_page2.dxf"), "keep me").expect("write existing file");
        let options = ConvertOptions {
            overwrite_existing: false,
            ..Default::default()
        };

        let result = extract_and_convert(&fx.input, &fx.output_dir, None, &options, &mut NoEvents);

        expect_that!(
            result.map_err(|err| err.to_string()),
            err(contains_substring("plan_page2.dxf\" already exists"))
        );
        expect_that!(
            fs::read_to_string(fx.output_dir.join("plan_page2.dxf")).ok(),
            some(eq("keep me"))
        );
    }

    #[gtest]
    fn overwrites_by_default() -> Result<()> {
        let fx = fixture(three_page_pdf());
        let existing = fx.output_dir.join("plan_page1.dxf");
        fs::write(&existing, "old")?;

        extract_and_convert(
            &fx.input,
            &fx.output_dir,
            None,
            &ConvertOptions::default(),
            &mut NoEvents,
        )?;

        expect_that!(fs::read_to_string(&existing)?, contains_substring("SECTION"));
        Ok(())
    }

    #[gtest]
    fn missing_output_dir() {
        let fx = fixture(three_page_pdf());
        let missing = fx.output_dir.join("nope");

        let result = extract_and_convert(
            &fx.input,
            &missing,
            None,
            &ConvertOptions::default(),
            &mut NoEvents,
        );

        expect_that!(
            result.map_err(|err| err.to_string()),
            err(contains_substring("does not exist"))
        );
    }

    #[gtest]
    fn output_path_must_be_directory() {
        let fx = fixture(three_page_pdf());

        let result = extract_and_convert(
            &fx.input,
            &fx.input,
            None,
            &ConvertOptions::default(),
            &mut NoEvents,
        );

        expect_that!(
            result.map_err(|err| err.to_string()),
            err(contains_substring("is not a directory"))
        );
    }

    #[gtest]
    fn unreadable_input_fails_to_load() {
        let fx = fixture(three_page_pdf());
        let not_pdf = fx.output_dir.join("notes.pdf");
        fs::write(&not_pdf, "this is not a PDF").expect("write file");

        let result = extract_and_convert(
            &not_pdf,
            &fx.output_dir,
            None,
            &ConvertOptions::default(),
            &mut NoEvents,
        );

        expect_that!(
            result.map_err(|err| err.to_string()),
            err(contains_substring("failed to load PDF"))
        );
    }

    #[gtest]
    fn zero_curve_segments_rejected() {
        let fx = fixture(three_page_pdf());
        let options = ConvertOptions {
            curve_segments: 0,
            ..Default::default()
        };

        let result = extract_and_convert(&fx.input, &fx.output_dir, None, &options, &mut NoEvents);

        expect_that!(
            result.map_err(|err| err.to_string()),
            err(eq("curve segments must be at least 1"))
        );
    }

    fn encrypted_fixture(user_password: &str) -> Fixture {
        let dir = tempfile::tempdir().expect("create temp dir");
        let input = dir.path().join("plan.pdf");
        PdfBuilder::new()
            .page("0 0 m 72 0 l S")
            .save_encrypted(&input, user_password)
            .expect("save encrypted test PDF");
        let output_dir = dir.path().join("out");
        fs::create_dir(&output_dir).expect("create output dir");
        Fixture {
            _dir: dir,
            input,
            output_dir,
        }
    }

    #[gtest]
    fn user_password_protected_input_rejected() {
        let fx = encrypted_fixture("secret");

        let result = extract_and_convert(
            &fx.input,
            &fx.output_dir,
            None,
            &ConvertOptions::default(),
            &mut NoEvents,
        );

        expect_that!(
            result.map_err(|err| err.to_string()),
            err(eq("file is encrypted"))
        );
        expect_that!(fx.output_dir.join("plan_page1.dxf").exists(), eq(false));
    }

    #[gtest]
    fn owner_password_only_input_converts() -> Result<()> {
        let fx = encrypted_fixture("");

        let summary = extract_and_convert(
            &fx.input,
            &fx.output_dir,
            None,
            &ConvertOptions::default(),
            &mut NoEvents,
        )?;

        expect_that!(file_names(&summary.outputs), elements_are![eq("plan_page1.dxf")]);
        let text = fs::read_to_string(&summary.outputs[0])?;
        expect_that!(text, contains_substring("LINE"));
        Ok(())
    }
}
