mod common;

use common::TestResult;
use common::fixtures::*;
use folio::{BoxKind, RowGroupKind};

fn cell(content: &str) -> folio::StyledNode {
    element("td", &[], vec![text(content)])
}

fn row(cells: Vec<folio::StyledNode>) -> folio::StyledNode {
    element("tr", &[], cells)
}

#[test]
fn bare_rows_are_normalized_into_a_body_group() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let doc = element(
        "body",
        &[("font-size", len(10.0))],
        vec![element(
            "table",
            &[("width", len(200.0))],
            vec![
                row(vec![cell("a1"), cell("b1")]),
                row(vec![cell("a2"), cell("b2")]),
            ],
        )],
    );
    let pages = render(&doc, &bare_config(300.0, 300.0));
    let body = &pages[0].fragments()[0];
    let table = &body.children[0];
    assert_eq!(table.kind, BoxKind::Table);
    assert_eq!(table.children.len(), 1);
    assert_eq!(
        table.children[0].kind,
        BoxKind::TableRowGroup(RowGroupKind::Body)
    );
    assert_eq!(table.children[0].children.len(), 2);
    Ok(())
}

#[test]
fn automatic_columns_follow_content_proportions() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let doc = element(
        "body",
        &[("font-size", len(10.0))],
        vec![element(
            "table",
            &[("width", len(300.0))],
            vec![
                row(vec![cell("ab"), cell("abcdef")]),
                row(vec![cell("a"), cell("ab")]),
            ],
        )],
    );
    let pages = render(&doc, &bare_config(400.0, 300.0));
    let body = &pages[0].fragments()[0];
    let table = &body.children[0];
    let group = &table.children[0];
    let first_row = &group.children[0];

    let narrow = &first_row.children[0];
    let wide = &first_row.children[1];
    // Preferred widths 10 and 30: the surplus keeps the 1:3 ratio.
    assert!((narrow.border_box.width + wide.border_box.width - 300.0).abs() < 0.1);
    assert!((wide.border_box.width / narrow.border_box.width - 3.0).abs() < 0.05);
    Ok(())
}

#[test]
fn fixed_layout_ignores_content_beyond_the_first_row() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let doc = element(
        "body",
        &[("font-size", len(10.0))],
        vec![element(
            "table",
            &[("table-layout", kw("fixed")), ("width", len(240.0))],
            vec![
                row(vec![
                    element("td", &[("width", len(80.0))], vec![text("a")]),
                    cell("b"),
                ]),
                row(vec![
                    cell("a-very-long-run-of-content-that-must-not-matter"),
                    cell("x"),
                ]),
            ],
        )],
    );
    let pages = render(&doc, &bare_config(400.0, 300.0));
    let body = &pages[0].fragments()[0];
    let table = &body.children[0];
    let group = &table.children[0];
    for table_row in &group.children {
        assert_eq!(table_row.children[0].border_box.width, 80.0);
        assert_eq!(table_row.children[1].border_box.width, 160.0);
    }
    Ok(())
}

#[test]
fn border_spacing_separates_cells_and_rows() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let doc = element(
        "body",
        &[("font-size", len(10.0)), ("line-height", len(10.0))],
        vec![element(
            "table",
            &[("width", len(210.0)), ("border-spacing", len(10.0))],
            vec![row(vec![cell("a"), cell("b")]), row(vec![cell("c"), cell("d")])],
        )],
    );
    let pages = render(&doc, &bare_config(400.0, 300.0));
    let body = &pages[0].fragments()[0];
    let table = &body.children[0];
    let group = &table.children[0];
    let first_row = &group.children[0];
    let second_row = &group.children[1];

    let a = &first_row.children[0];
    let b = &first_row.children[1];
    assert_eq!(a.border_box.x, 10.0);
    assert_eq!(b.border_box.x, a.border_box.x + a.border_box.width + 10.0);
    assert_eq!(second_row.border_box.y - first_row.border_box.bottom(), 10.0);
    Ok(())
}

#[test]
fn long_table_repeats_header_and_footer_across_pages() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut body_rows = Vec::new();
    for i in 0..12 {
        body_rows.push(row(vec![cell(&format!("entry{:02}", i))]));
    }
    let doc = element(
        "body",
        &[("font-size", len(10.0)), ("line-height", len(10.0))],
        vec![element(
            "table",
            &[("width", len(160.0))],
            vec![
                element("thead", &[], vec![row(vec![cell("column-head")])]),
                element("tbody", &[], body_rows),
                element("tfoot", &[], vec![row(vec![cell("column-foot")])]),
            ],
        )],
    );
    let pages = render(&doc, &bare_config(200.0, 65.0));
    assert!(pages.len() > 2, "twelve rows cannot fit two 6-row pages");

    assert_eq!(page_count_with_text(&pages, "column-head"), pages.len());
    assert_eq!(page_count_with_text(&pages, "column-foot"), pages.len());

    // Body content is neither lost nor duplicated.
    let mut seen = Vec::new();
    for page in &pages {
        for leaf in page.leaf_fragments() {
            if let folio::FragmentContent::Text(t) = &leaf.content {
                if t.contains("entry") && !leaf.synthesized {
                    seen.push(t.trim().to_string());
                }
            }
        }
    }
    let expected: Vec<String> = (0..12).map(|i| format!("entry{:02}", i)).collect();
    assert_eq!(seen, expected);
    Ok(())
}

#[test]
fn rows_never_split_across_pages() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut rows_vec = Vec::new();
    for i in 0..6 {
        rows_vec.push(row(vec![element(
            "td",
            &[("height", len(30.0))],
            vec![text(&format!("r{}", i))],
        )]));
    }
    let doc = element(
        "body",
        &[("font-size", len(10.0))],
        vec![element("table", &[("width", len(100.0))], rows_vec)],
    );
    // 30pt rows in a 100pt page: three rows per page, the fourth moves.
    let pages = render(&doc, &bare_config(200.0, 100.0));
    assert_eq!(pages.len(), 2);

    for page in &pages {
        for fragment in all_fragments(page) {
            if fragment.kind == BoxKind::TableRow {
                assert!(fragment.border_box.bottom() <= page.content_area.bottom() + 0.01);
                assert_eq!(fragment.border_box.height, 30.0);
            }
        }
    }
    Ok(())
}
