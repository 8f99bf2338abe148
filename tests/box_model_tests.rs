mod common;

use common::TestResult;
use common::fixtures::*;
use folio::{BoxKind, FragmentContent};

#[test]
fn padding_border_and_margin_nest_correctly() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let doc = element(
        "body",
        &[],
        vec![element(
            "div",
            &[
                ("margin", len(10.0)),
                ("padding", len(5.0)),
                ("border-width", len(2.0)),
                ("border-style", kw("solid")),
                ("height", len(50.0)),
            ],
            vec![],
        )],
    );
    let pages = render(&doc, &bare_config(300.0, 500.0));
    assert_eq!(pages.len(), 1);

    let body = &pages[0].fragments()[0];
    let div = &body.children[0];
    // Border box: margin offsets it, border+padding widen it around the
    // content.
    assert_eq!(div.border_box.x, 10.0);
    assert_eq!(div.border_box.y, 10.0);
    assert_eq!(div.border_box.width, 300.0 - 20.0);
    assert_eq!(div.border_box.height, 50.0 + 2.0 * (5.0 + 2.0));

    let content = div.content_rect();
    assert_eq!(content.x, 17.0);
    assert_eq!(content.y, 17.0);
    assert_eq!(content.height, 50.0);
    Ok(())
}

#[test]
fn fragments_stay_inside_the_page_content_area() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut blocks = Vec::new();
    for i in 0..24 {
        blocks.push(element(
            "div",
            &[("height", len(30.0)), ("margin-bottom", len(6.0))],
            vec![text(&format!("block {}", i))],
        ));
    }
    let doc = element("body", &[("font-size", len(9.0))], blocks);
    let config = bare_config(200.0, 140.0);
    let pages = render(&doc, &config);
    assert!(pages.len() > 1);

    for page in &pages {
        for fragment in all_fragments(page) {
            assert!(
                page.content_area.contains_rect(&fragment.border_box),
                "page {}: fragment {:?} at {:?} escapes the content area",
                page.index,
                fragment.kind,
                fragment.border_box,
            );
        }
    }
    Ok(())
}

#[test]
fn margin_collapse_is_associative_across_sibling_runs() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    // Three zero-edge siblings with margins (20, -5), (15, 10), (0, 30):
    // any grouping of the collapse must give the same positions.
    let run = |margins: &[(f32, f32)]| {
        let mut children = vec![element("div", &[("height", len(10.0))], vec![])];
        for &(top, bottom) in margins {
            children.push(element(
                "div",
                &[
                    ("height", len(10.0)),
                    ("margin-top", len(top)),
                    ("margin-bottom", len(bottom)),
                ],
                vec![],
            ));
        }
        let doc = element("body", &[], children);
        render(&doc, &bare_config(200.0, 1000.0))
    };

    let pages = run(&[(20.0, -5.0), (15.0, 10.0), (0.0, 30.0)]);
    let body = &pages[0].fragments()[0];
    let ys: Vec<f32> = body.children.iter().map(|c| c.border_box.y).collect();

    // First gap: max(0, 20) = 20. Second: max(-5, 15) = 15. Third:
    // max(10, 0) = 10.
    assert_eq!(ys, vec![0.0, 30.0, 55.0, 75.0]);
    Ok(())
}

#[test]
fn negative_dimensions_clamp_instead_of_failing() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let doc = element(
        "body",
        &[],
        vec![
            element(
                "div",
                &[("margin-left", len(500.0)), ("height", len(10.0))],
                vec![],
            ),
            paragraph("still rendered"),
        ],
    );
    let pages = render(&doc, &bare_config(300.0, 500.0));
    assert_eq!(pages.len(), 1);
    assert!(find_text(&pages[0], "still rendered").is_some());

    let body = &pages[0].fragments()[0];
    assert_eq!(body.children[0].border_box.width, 0.0);
    Ok(())
}

#[test]
fn display_none_subtree_is_absent_from_output() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let doc = element(
        "body",
        &[],
        vec![
            element(
                "div",
                &[("display", kw("none"))],
                vec![paragraph("invisible")],
            ),
            paragraph("visible"),
        ],
    );
    let pages = render(&doc, &bare_config(300.0, 500.0));
    assert!(find_text(&pages[0], "invisible").is_none());
    assert!(find_text(&pages[0], "visible").is_some());
    Ok(())
}

#[test]
fn anonymous_blocks_wrap_loose_inline_content() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let doc = element(
        "body",
        &[("font-size", len(10.0))],
        vec![
            text("loose text"),
            element("div", &[("height", len(20.0))], vec![]),
        ],
    );
    let pages = render(&doc, &bare_config(300.0, 500.0));
    let body = &pages[0].fragments()[0];
    assert_eq!(body.children[0].kind, BoxKind::AnonymousBlock);
    assert!(matches!(
        &body.children[0].children[0].children[0].content,
        FragmentContent::Text(t) if t.contains("loose")
    ));
    Ok(())
}

#[test]
fn relative_offset_shifts_without_affecting_flow() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let doc = element(
        "body",
        &[],
        vec![
            element(
                "div",
                &[
                    ("position", kw("relative")),
                    ("top", len(5.0)),
                    ("left", len(7.0)),
                    ("height", len(20.0)),
                ],
                vec![],
            ),
            element("div", &[("height", len(20.0))], vec![]),
        ],
    );
    let pages = render(&doc, &bare_config(300.0, 500.0));
    let body = &pages[0].fragments()[0];
    assert_eq!(body.children[0].border_box.x, 7.0);
    assert_eq!(body.children[0].border_box.y, 5.0);
    // The sibling still flows as if the offset never happened.
    assert_eq!(body.children[1].border_box.y, 20.0);
    Ok(())
}
