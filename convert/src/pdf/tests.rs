use googletest::prelude::*;
use testutils::pdf::{A4, FormSpec, PdfBuilder};

use super::*;
use crate::geometry::Segment;

fn single_page_drawing(content: &str) -> PageDrawing {
    drawing_with_forms(content, Vec::new())
}

fn drawing_with_forms(content: &str, forms: Vec<FormSpec>) -> PageDrawing {
    let doc = PdfBuilder::new().page_with(A4, content, forms).build();
    let pdf = PdfDocument::from_document(doc).expect("document should load");
    let pages = pdf.select_pages(None).expect("document should have pages");
    let (page, page_id) = pages[0];
    pdf.page_drawing(page, page_id)
        .expect("page content should decode")
}

#[gtest]
fn stroked_line() {
    let drawing = single_page_drawing("10 20 m 30 40 l S");

    assert_that!(drawing.paths, len(eq(1)));
    let path = &drawing.paths[0];
    expect_that!(path.paint, eq(Paint::Stroke));
    assert_that!(path.subpaths, len(eq(1)));
    expect_that!(path.subpaths[0].start, eq(Point::new(10.0, 20.0)));
    expect_that!(
        path.subpaths[0].segments,
        elements_are![eq(&Segment::Line(Point::new(30.0, 40.0)))]
    );
    expect_that!(path.subpaths[0].closed, eq(false));
}

#[gtest]
fn rectangle_is_closed_and_transformed() {
    let drawing = single_page_drawing("q 2 0 0 2 100 100 cm 0 0 10 5 re f Q");

    assert_that!(drawing.paths, len(eq(1)));
    let subpath = &drawing.paths[0].subpaths[0];
    expect_that!(drawing.paths[0].paint, eq(Paint::Fill));
    expect_that!(subpath.closed, eq(true));
    expect_that!(subpath.start, eq(Point::new(100.0, 100.0)));
    expect_that!(
        subpath.segments,
        elements_are![
            eq(&Segment::Line(Point::new(120.0, 100.0))),
            eq(&Segment::Line(Point::new(120.0, 110.0))),
            eq(&Segment::Line(Point::new(100.0, 110.0))),
        ]
    );
}

#[gtest]
fn graphics_state_restore_resets_ctm() {
    let drawing = single_page_drawing("q 1 0 0 1 50 50 cm Q 0 0 m 1 1 l S");

    let subpath = &drawing.paths[0].subpaths[0];
    expect_that!(subpath.start, eq(Point::new(0.0, 0.0)));
}

#[gtest]
fn unpainted_paths_are_discarded() {
    let drawing = single_page_drawing("0 0 m 10 10 l n 0 0 10 10 re W n");
    expect_that!(drawing.paths, is_empty());
}

#[gtest]
fn lone_moveto_is_not_painted() {
    let drawing = single_page_drawing("5 5 m S");
    expect_that!(drawing.paths, is_empty());
}

#[gtest]
fn curve_shorthands_use_current_and_end_points() {
    let drawing = single_page_drawing("0 0 m 1 1 2 2 v 3 3 4 4 y S");

    let segments = &drawing.paths[0].subpaths[0].segments;
    expect_that!(
        segments,
        elements_are![
            eq(&Segment::Curve(
                Point::new(0.0, 0.0),
                Point::new(1.0, 1.0),
                Point::new(2.0, 2.0)
            )),
            eq(&Segment::Curve(
                Point::new(3.0, 3.0),
                Point::new(4.0, 4.0),
                Point::new(4.0, 4.0)
            )),
        ]
    );
}

#[gtest]
fn drawing_after_close_starts_new_subpath() {
    let drawing = single_page_drawing("0 0 m 10 0 l 10 10 l h 0 10 l S");

    let subpaths = &drawing.paths[0].subpaths;
    assert_that!(subpaths, len(eq(2)));
    expect_that!(subpaths[0].closed, eq(true));
    expect_that!(subpaths[1].start, eq(Point::new(0.0, 0.0)));
    expect_that!(
        subpaths[1].segments,
        elements_are![eq(&Segment::Line(Point::new(0.0, 10.0)))]
    );
}

#[gtest]
fn close_and_stroke_closes_all_subpaths() {
    let drawing = single_page_drawing("0 0 m 10 0 l 10 10 l s");
    expect_that!(drawing.paths[0].subpaths[0].closed, eq(true));
    expect_that!(drawing.paths[0].paint, eq(Paint::Stroke));
}

#[gtest]
fn form_xobject_is_drawn_with_its_matrix() {
    let drawing = drawing_with_forms(
        "q 1 0 0 1 100 0 cm /Fm1 Do Q 0 0 m 1 0 l S",
        vec![FormSpec {
            name: "Fm1".to_string(),
            bbox: [0.0, 0.0, 50.0, 50.0],
            matrix: Some([1.0, 0.0, 0.0, 1.0, 0.0, 10.0]),
            content: "0 0 m 5 0 l S".to_string(),
        }],
    );

    assert_that!(drawing.paths, len(eq(2)));
    expect_that!(
        drawing.paths[0].subpaths[0].start,
        eq(Point::new(100.0, 10.0))
    );
    // CTM is restored after the form and the outer q/Q.
    expect_that!(drawing.paths[1].subpaths[0].start, eq(Point::new(0.0, 0.0)));
}

#[gtest]
fn self_referencing_form_terminates() {
    let drawing = drawing_with_forms(
        "/Fm1 Do",
        vec![FormSpec {
            name: "Fm1".to_string(),
            bbox: [0.0, 0.0, 10.0, 10.0],
            matrix: None,
            content: "0 0 m 1 1 l S /Fm1 Do".to_string(),
        }],
    );

    // The form inherits the page resources, so refers to itself until the depth limit.
    expect_that!(drawing.paths, len(gt(1)));
}

#[gtest]
fn missing_xobject_is_ignored() {
    let drawing = single_page_drawing("/Missing Do 0 0 m 1 1 l S");
    expect_that!(drawing.paths, len(eq(1)));
}

#[gtest]
fn media_box_is_read() {
    let doc = PdfBuilder::new()
        .page_with([0.0, 0.0, 200.0, 100.0], "", Vec::new())
        .build();
    let pdf = PdfDocument::from_document(doc).expect("document should load");
    let (page, page_id) = pdf.select_pages(None).expect("pages")[0];
    let drawing = pdf.page_drawing(page, page_id).expect("drawing");

    expect_that!(
        drawing.media_box,
        eq(Rect {
            min: Point::new(0.0, 0.0),
            max: Point::new(200.0, 100.0),
        })
    );
}

#[gtest]
fn select_pages_all_when_unrestricted() {
    let pdf = PdfDocument::from_document(PdfBuilder::new().blank_pages(3).build())
        .expect("document should load");

    let pages = pdf.select_pages(None).expect("pages");
    expect_that!(
        pages.iter().map(|(page, _)| *page).collect::<Vec<_>>(),
        elements_are![eq(&1), eq(&2), eq(&3)]
    );
    expect_that!(pdf.page_count(), eq(3));
}

#[gtest]
fn select_pages_restricted() {
    let pdf = PdfDocument::from_document(PdfBuilder::new().blank_pages(5).build())
        .expect("document should load");
    let selector: PageSelector = [1, 3, 4, 5].into_iter().collect();

    let pages = pdf.select_pages(Some(&selector)).expect("pages");
    expect_that!(
        pages.iter().map(|(page, _)| *page).collect::<Vec<_>>(),
        elements_are![eq(&1), eq(&3), eq(&4), eq(&5)]
    );
}

#[gtest]
fn select_pages_out_of_range() {
    let pdf = PdfDocument::from_document(PdfBuilder::new().blank_pages(2).build())
        .expect("document should load");
    let selector: PageSelector = [2, 3, 4, 7].into_iter().collect();

    let result = pdf.select_pages(Some(&selector));
    expect_that!(
        result.map_err(|err| err.to_string()),
        err(eq("pages 3-4,7 are out of range, the document has 2 pages"))
    );
}
