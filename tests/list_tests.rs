mod common;

use common::TestResult;
use common::fixtures::*;
use folio::{BoxKind, FragmentContent};

fn list_item(content: &str) -> folio::StyledNode {
    element("li", &[], vec![text(content)])
}

#[test]
fn decimal_markers_number_the_items() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let doc = element(
        "body",
        &[("font-size", len(10.0))],
        vec![element(
            "ol",
            &[("list-style-type", kw("decimal"))],
            vec![list_item("first"), list_item("second"), list_item("third")],
        )],
    );
    let pages = render(&doc, &bare_config(300.0, 400.0));
    let page = &pages[0];

    let markers: Vec<String> = all_fragments(page)
        .into_iter()
        .filter(|f| f.kind == BoxKind::ListMarker)
        .filter_map(|f| match &f.content {
            FragmentContent::Text(t) => Some(t.trim().to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(markers, vec!["1.", "2.", "3."]);
    Ok(())
}

#[test]
fn outside_markers_hang_left_of_the_content() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let doc = element(
        "body",
        &[("font-size", len(10.0))],
        vec![element(
            "ul",
            &[("margin-left", len(30.0))],
            vec![list_item("entry")],
        )],
    );
    let pages = render(&doc, &bare_config(300.0, 400.0));
    let page = &pages[0];

    let marker = all_fragments(page)
        .into_iter()
        .find(|f| f.kind == BoxKind::ListMarker)
        .expect("marker fragment");
    let entry = find_text(page, "entry").unwrap();
    // The bullet sits in the margin, flush against the item's content.
    assert!(marker.border_box.x < entry.border_box.x);
    assert_eq!(marker.border_box.right(), 30.0);
    Ok(())
}

#[test]
fn inside_markers_join_the_first_line() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let doc = element(
        "body",
        &[("font-size", len(10.0))],
        vec![element(
            "ul",
            &[("list-style-position", kw("inside"))],
            vec![list_item("entry")],
        )],
    );
    let pages = render(&doc, &bare_config(300.0, 400.0));
    let page = &pages[0];

    // No hanging marker: the bullet is part of the line's text.
    assert!(
        all_fragments(page)
            .into_iter()
            .all(|f| f.kind != BoxKind::ListMarker)
    );
    let line = all_fragments(page)
        .into_iter()
        .find(|f| f.kind == BoxKind::Line)
        .unwrap();
    let first = &line.children[0];
    assert_eq!(first.border_box.x, 0.0);
    assert!(matches!(
        &first.content,
        FragmentContent::Text(t) if t.starts_with('\u{2022}')
    ));
    Ok(())
}

#[test]
fn list_style_none_suppresses_markers() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let doc = element(
        "body",
        &[("font-size", len(10.0))],
        vec![element(
            "ul",
            &[("list-style-type", kw("none"))],
            vec![list_item("entry")],
        )],
    );
    let pages = render(&doc, &bare_config(300.0, 400.0));
    assert!(
        all_fragments(&pages[0])
            .into_iter()
            .all(|f| f.kind != BoxKind::ListMarker)
    );
    assert!(find_text(&pages[0], "entry").is_some());
    Ok(())
}
