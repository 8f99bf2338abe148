mod common;

use common::TestResult;
use common::fixtures::*;
use folio::{BoxKind, Float};

fn float_fragment<'a>(page: &'a folio::Page) -> Option<&'a folio::Fragment> {
    all_fragments(page)
        .into_iter()
        .find(|f| matches!(f.kind, BoxKind::Floated(_)))
}

#[test]
fn two_left_floats_leave_a_narrow_text_band() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    // Spec scenario: two 100pt left floats before a paragraph in a 300pt
    // BFC leave the paragraph's lines 200pt of effective width until the
    // floats end.
    let float_box = || {
        element(
            "div",
            &[
                ("float", kw("left")),
                ("width", len(100.0)),
                ("height", len(40.0)),
            ],
            vec![],
        )
    };
    let doc = element(
        "body",
        &[("font-size", len(10.0)), ("line-height", len(10.0))],
        vec![
            float_box(),
            float_box(),
            element(
                "p",
                &[],
                vec![text(
                    "aa aa aa aa aa aa aa aa aa aa aa aa aa aa aa aa aa aa aa aa aa aa aa aa \
                     aa aa aa aa aa aa aa aa aa aa aa aa aa aa aa aa aa aa aa aa aa aa aa aa",
                )],
            ),
        ],
    );
    let pages = render(&doc, &bare_config(300.0, 600.0));
    let page = &pages[0];

    let lines: Vec<_> = all_fragments(page)
        .into_iter()
        .filter(|f| f.kind == BoxKind::Line)
        .collect();
    assert!(lines.len() >= 5);

    for line in &lines {
        if line.border_box.y < 40.0 {
            assert_eq!(line.border_box.x, 200.0, "line beside the floats");
            assert!((line.border_box.width - 100.0).abs() < 0.01);
        } else {
            assert_eq!(line.border_box.x, 0.0, "line below the floats");
            assert!((line.border_box.width - 300.0).abs() < 0.01);
        }
    }
    Ok(())
}

#[test]
fn left_and_right_floats_sit_on_their_sides() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let doc = element(
        "body",
        &[],
        vec![
            element(
                "div",
                &[
                    ("float", kw("left")),
                    ("width", len(60.0)),
                    ("height", len(30.0)),
                ],
                vec![],
            ),
            element(
                "div",
                &[
                    ("float", kw("right")),
                    ("width", len(60.0)),
                    ("height", len(30.0)),
                ],
                vec![],
            ),
        ],
    );
    let pages = render(&doc, &bare_config(300.0, 200.0));
    let page = &pages[0];

    let floats: Vec<_> = all_fragments(page)
        .into_iter()
        .filter(|f| matches!(f.kind, BoxKind::Floated(_)))
        .collect();
    assert_eq!(floats.len(), 2);
    let left = floats
        .iter()
        .find(|f| f.kind == BoxKind::Floated(Float::Left))
        .unwrap();
    let right = floats
        .iter()
        .find(|f| f.kind == BoxKind::Floated(Float::Right))
        .unwrap();
    assert_eq!(left.border_box.x, 0.0);
    assert_eq!(right.border_box.x, 240.0);
    Ok(())
}

#[test]
fn floats_stack_in_source_order_without_reordering() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    // Three 120pt floats in a 300pt context: two fit beside each other,
    // the third must drop below the first two, never above.
    let float_box = |h: f32| {
        element(
            "div",
            &[
                ("float", kw("left")),
                ("width", len(120.0)),
                ("height", len(h)),
            ],
            vec![],
        )
    };
    let doc = element(
        "body",
        &[],
        vec![float_box(50.0), float_box(30.0), float_box(30.0)],
    );
    let pages = render(&doc, &bare_config(300.0, 300.0));
    let page = &pages[0];
    let floats: Vec<_> = all_fragments(page)
        .into_iter()
        .filter(|f| matches!(f.kind, BoxKind::Floated(_)))
        .map(|f| f.border_box)
        .collect();
    assert_eq!(floats.len(), 3);
    assert_eq!((floats[0].x, floats[0].y), (0.0, 0.0));
    assert_eq!((floats[1].x, floats[1].y), (120.0, 0.0));
    // 240 + 120 > 300: the third drops below the shorter second float.
    assert_eq!((floats[2].x, floats[2].y), (120.0, 30.0));
    Ok(())
}

#[test]
fn clear_both_drops_below_the_lowest_float() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let doc = element(
        "body",
        &[],
        vec![
            element(
                "div",
                &[
                    ("float", kw("left")),
                    ("width", len(50.0)),
                    ("height", len(25.0)),
                ],
                vec![],
            ),
            element(
                "div",
                &[
                    ("float", kw("right")),
                    ("width", len(50.0)),
                    ("height", len(45.0)),
                ],
                vec![],
            ),
            element(
                "div",
                &[("clear", kw("both")), ("height", len(10.0))],
                vec![],
            ),
        ],
    );
    let pages = render(&doc, &bare_config(300.0, 300.0));
    let page = &pages[0];
    let body = &page.fragments()[0];
    let cleared = body
        .children
        .iter()
        .find(|f| f.kind == BoxKind::Block)
        .unwrap();
    assert_eq!(cleared.border_box.y, 45.0);
    Ok(())
}

#[test]
fn unsized_float_shrinks_to_its_content() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let doc = element(
        "body",
        &[("font-size", len(10.0))],
        vec![element(
            "div",
            &[("float", kw("left"))],
            vec![text("abcd")],
        )],
    );
    let pages = render(&doc, &bare_config(300.0, 200.0));
    let float = float_fragment(&pages[0]).expect("float fragment");
    // Shrink-to-fit: 4 chars at 5pt.
    assert!((float.border_box.width - 20.0).abs() < 0.01);
    Ok(())
}

#[test]
fn bfc_establishing_sibling_avoids_the_float() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let doc = element(
        "body",
        &[],
        vec![
            element(
                "div",
                &[
                    ("float", kw("left")),
                    ("width", len(100.0)),
                    ("height", len(40.0)),
                ],
                vec![],
            ),
            element(
                "div",
                &[
                    ("overflow", kw("hidden")),
                    ("width", len(150.0)),
                    ("height", len(20.0)),
                ],
                vec![],
            ),
        ],
    );
    let pages = render(&doc, &bare_config(300.0, 200.0));
    let body = &pages[0].fragments()[0];
    let bfc_block = body
        .children
        .iter()
        .find(|f| f.kind == BoxKind::Block)
        .unwrap();
    // Instead of overlapping the float it shifts into the free band.
    assert_eq!(bfc_block.border_box.x, 100.0);
    assert_eq!(bfc_block.border_box.y, 0.0);
    Ok(())
}
