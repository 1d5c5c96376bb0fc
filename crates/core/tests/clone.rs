//! Tests for the cloning pipeline: filtering, ordering, kind dispatch and
//! live value materialization.

mod support;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use domshot_core::dom::{CanvasSurface, SourceNode};
use domshot_core::error::{CloneError, DecodeError, FetchError};
use domshot_core::output::ClonedType;
use domshot_core::{ClonedNode, CloneOptions};
use pretty_assertions::assert_eq;
use support::*;

fn ids(node: &ClonedNode) -> Vec<String> {
    node.children
        .iter()
        .filter_map(|c| c.get_attr("id").map(str::to_string))
        .collect()
}

fn contains_id(node: &ClonedNode, id: &str) -> bool {
    node.get_attr("id") == Some(id) || node.children.iter().any(|c| contains_id(c, id))
}

#[tokio::test]
async fn filter_prunes_whole_subtree() {
    init_tracing();
    let root = SourceNode::element("div")
        .with_attr("id", "root")
        .with_child(SourceNode::element("p").with_attr("id", "a"))
        .with_child(
            SourceNode::element("section")
                .with_attr("id", "b")
                .with_attr("class", "skip")
                .with_child(SourceNode::element("span").with_attr("id", "c")),
        )
        .with_child(SourceNode::element("p").with_attr("id", "d"));

    let options = CloneOptions::new().with_filter(|n: &SourceNode| n.get_attr("class") != Some("skip"));
    let clone = quiet_cloner()
        .clone_node(&root, &options, true)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(ids(&clone), vec!["a", "d"]);
    assert!(!contains_id(&clone, "b"));
    assert!(!contains_id(&clone, "c"));
}

#[tokio::test]
async fn pruned_node_never_visits_descendants() {
    let visited = Arc::new(std::sync::Mutex::new(Vec::new()));
    let seen = Arc::clone(&visited);
    let root = SourceNode::element("div").with_child(
        SourceNode::element("section")
            .with_attr("id", "drop")
            .with_child(SourceNode::element("span").with_attr("id", "inner")),
    );

    let options = CloneOptions::new().with_filter(move |n: &SourceNode| {
        seen.lock().unwrap().push(n.get_attr("id").unwrap_or("").to_string());
        n.get_attr("id") != Some("drop")
    });
    quiet_cloner().clone_root(&root, &options).await.unwrap();

    assert_eq!(*visited.lock().unwrap(), vec!["drop".to_string()]);
}

#[tokio::test]
async fn root_is_cloned_even_when_filter_rejects_it() {
    let root = SourceNode::element("div").with_attr("id", "root");
    let options = CloneOptions::new().with_filter(|_: &SourceNode| false);

    let as_root = quiet_cloner().clone_node(&root, &options, true).await.unwrap();
    assert_eq!(as_root.unwrap().get_attr("id"), Some("root"));

    let as_child = quiet_cloner().clone_node(&root, &options, false).await.unwrap();
    assert!(as_child.is_none());
}

#[tokio::test]
async fn slow_first_child_keeps_source_order() {
    let c1 = CanvasSurface::drawn(1, 1, b"one".to_vec());
    let c2 = CanvasSurface::drawn(1, 1, b"two".to_vec());
    let c3 = CanvasSurface::drawn(1, 1, b"three".to_vec());
    let (u1, u2, u3) = (c1.to_data_url(), c2.to_data_url(), c3.to_data_url());

    let root = SourceNode::element("div")
        .with_child(SourceNode::element("canvas").with_canvas(c1))
        .with_child(SourceNode::element("canvas").with_canvas(c2))
        .with_child(SourceNode::element("canvas").with_canvas(c3));

    let decoder = Arc::new(SlowDecoder::default().delay(&u1, 60).delay(&u2, 10));
    let cloner = quiet_cloner().with_image_decoder(decoder.clone());
    let clone = cloner.clone_root(&root, &CloneOptions::new()).await.unwrap();

    let srcs: Vec<&str> = clone.children.iter().filter_map(|c| c.get_attr("src")).collect();
    assert_eq!(srcs, vec![u1.as_str(), u2.as_str(), u3.as_str()]);
    assert_eq!(*decoder.finished.lock().unwrap(), vec![u1.clone(), u2.clone(), u3.clone()]);
    assert_eq!(decoder.max_in_flight.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn blank_canvas_clones_structurally() {
    let canvas = SourceNode::element("canvas")
        .with_attr("width", "40")
        .with_canvas(CanvasSurface::blank(40, 30));
    let decoder = Arc::new(SlowDecoder::default());
    let clone = quiet_cloner()
        .with_image_decoder(decoder.clone())
        .clone_root(&canvas, &CloneOptions::new())
        .await
        .unwrap();

    assert_eq!(clone.tag, "canvas");
    assert!(clone.children.is_empty());
    assert_eq!(clone.get_attr("src"), None);
    assert_eq!(clone.get_attr("width"), Some("40"));
    assert!(decoder.finished.lock().unwrap().is_empty());
}

#[tokio::test]
async fn drawn_canvas_becomes_image() {
    let surface = CanvasSurface::drawn(2, 2, vec![0x89, b'P', b'N', b'G']);
    let expected = surface.to_data_url();
    let canvas = SourceNode::element("canvas").with_canvas(surface);

    let clone = quiet_cloner().clone_root(&canvas, &CloneOptions::new()).await.unwrap();

    assert_eq!(clone.tag, "img");
    assert_eq!(clone.get_attr("src"), Some(expected.as_str()));
}

#[tokio::test]
async fn video_poster_uses_declared_mime() {
    let video = SourceNode::element("video").with_attr("poster", "https://media.test/frame.png");
    let fetcher = Arc::new(StaticFetcher::new(b"poster-bytes", "application/octet-stream"));

    let clone = quiet_cloner()
        .with_fetcher(fetcher.clone())
        .clone_root(&video, &CloneOptions::new())
        .await
        .unwrap();

    assert_eq!(clone.tag, "img");
    assert!(clone.get_attr("src").unwrap().starts_with("data:image/png;base64,"));
    assert_eq!(*fetcher.requested.lock().unwrap(), vec!["https://media.test/frame.png".to_string()]);
}

#[tokio::test]
async fn video_poster_falls_back_to_fetched_content_type() {
    let video = SourceNode::element("video").with_attr("poster", "https://media.test/poster?id=7");
    let fetcher = Arc::new(StaticFetcher::new(b"jpeg-bytes", "image/jpeg"));

    let clone = quiet_cloner()
        .with_fetcher(fetcher)
        .clone_root(&video, &CloneOptions::new())
        .await
        .unwrap();

    assert!(clone.get_attr("src").unwrap().starts_with("data:image/jpeg;base64,"));
}

#[tokio::test]
async fn drawn_canvas_keeps_fallback_children_on_the_image() {
    let surface = CanvasSurface::drawn(2, 2, vec![0x89, b'P', b'N', b'G']);
    let canvas = SourceNode::element("canvas")
        .with_canvas(surface)
        .with_child(SourceNode::element("span").with_attr("id", "fallback"));

    let clone = quiet_cloner().clone_root(&canvas, &CloneOptions::new()).await.unwrap();

    assert_eq!(clone.tag, "img");
    assert_eq!(ids(&clone), vec!["fallback"]);
}

#[tokio::test]
async fn video_with_poster_skips_its_children() {
    let video = SourceNode::element("video")
        .with_attr("poster", "https://media.test/frame.png")
        .with_child(SourceNode::element("source").with_attr("id", "src"))
        .with_child(SourceNode::text("fallback"));
    let fetcher = Arc::new(StaticFetcher::new(b"poster-bytes", "image/png"));

    let clone = quiet_cloner()
        .with_fetcher(fetcher)
        .clone_root(&video, &CloneOptions::new())
        .await
        .unwrap();

    assert_eq!(clone.tag, "img");
    assert!(clone.children.is_empty());
}

#[tokio::test]
async fn video_without_poster_is_structural_and_childless() {
    let video = SourceNode::element("video")
        .with_attr("poster", "")
        .with_child(SourceNode::element("source").with_attr("src", "movie.mp4"))
        .with_child(SourceNode::text("fallback"));
    let fetcher = Arc::new(StaticFetcher::new(b"x", "image/png"));

    let clone = quiet_cloner()
        .with_fetcher(fetcher.clone())
        .clone_root(&video, &CloneOptions::new())
        .await
        .unwrap();

    assert_eq!(clone.tag, "video");
    assert!(clone.children.is_empty());
    assert!(fetcher.requested.lock().unwrap().is_empty());
}

#[tokio::test]
async fn textarea_carries_live_value() {
    let textarea = SourceNode::element("textarea").with_live_value("hello");
    let clone = quiet_cloner().clone_root(&textarea, &CloneOptions::new()).await.unwrap();

    assert_eq!(clone.text_content(), "hello");
    assert_eq!(clone.to_html(), "<textarea>hello</textarea>");
}

#[tokio::test]
async fn textarea_live_value_replaces_markup_text() {
    let textarea = SourceNode::element("textarea")
        .with_child(SourceNode::text("initial"))
        .with_live_value("edited");
    let clone = quiet_cloner().clone_root(&textarea, &CloneOptions::new()).await.unwrap();

    assert_eq!(clone.children.len(), 1);
    assert_eq!(clone.text_content(), "edited");
}

#[tokio::test]
async fn input_carries_live_value_attribute() {
    let input = SourceNode::element("input")
        .with_attr("value", "1")
        .with_live_value("42");
    let clone = quiet_cloner().clone_root(&input, &CloneOptions::new()).await.unwrap();

    assert_eq!(clone.get_attr("value"), Some("42"));
}

#[tokio::test]
async fn shadow_root_replaces_literal_children() {
    let host = SourceNode::element("x-card")
        .with_child(SourceNode::element("span").with_attr("id", "light"))
        .with_shadow_root(vec![
            SourceNode::element("header").with_attr("id", "shadow-1"),
            SourceNode::element("footer").with_attr("id", "shadow-2"),
        ]);

    let clone = quiet_cloner().clone_root(&host, &CloneOptions::new()).await.unwrap();

    assert_eq!(ids(&clone), vec!["shadow-1", "shadow-2"]);
}

#[tokio::test]
async fn slot_clones_assigned_nodes_in_order() {
    let first = SourceNode::element("b").with_attr("id", "first").into_shared();
    let second = SourceNode::element("i").with_attr("id", "second").into_shared();
    let slot = SourceNode::element("slot")
        .with_child(SourceNode::element("em").with_attr("id", "fallback"))
        .with_assigned(vec![first, second]);

    let clone = quiet_cloner().clone_root(&slot, &CloneOptions::new()).await.unwrap();

    assert_eq!(ids(&clone), vec!["first", "second"]);
}

#[tokio::test]
async fn filter_applies_inside_shadow_trees_and_slots() {
    let kept = SourceNode::element("p").with_attr("id", "light-keep").into_shared();
    let dropped = SourceNode::element("p")
        .with_attr("id", "light-drop")
        .with_attr("class", "skip")
        .into_shared();
    let host = SourceNode::element("x-card")
        .with_shared_child(Arc::clone(&kept))
        .with_shared_child(Arc::clone(&dropped))
        .with_shadow_root(vec![
            SourceNode::element("header").with_attr("id", "shadow-keep"),
            SourceNode::element("aside")
                .with_attr("id", "shadow-drop")
                .with_attr("class", "skip"),
            SourceNode::element("slot")
                .with_attr("id", "slot")
                .with_assigned(vec![kept, dropped]),
        ]);

    let options = CloneOptions::new().with_filter(|n: &SourceNode| n.get_attr("class") != Some("skip"));
    let clone = quiet_cloner().clone_root(&host, &options).await.unwrap();

    assert_eq!(ids(&clone), vec!["shadow-keep", "slot"]);
    assert_eq!(ids(&clone.children[1]), vec!["light-keep"]);
    assert!(!contains_id(&clone, "shadow-drop"));
    assert!(!contains_id(&clone, "light-drop"));
}

#[tokio::test]
async fn slot_without_assignment_is_empty() {
    let slot = SourceNode::element("slot").with_child(SourceNode::text("fallback"));
    let clone = quiet_cloner().clone_root(&slot, &CloneOptions::new()).await.unwrap();
    assert!(clone.children.is_empty());
}

#[tokio::test]
async fn fetch_failure_aborts_the_whole_clone() {
    let root = SourceNode::element("div")
        .with_child(SourceNode::element("p"))
        .with_child(
            SourceNode::element("div")
                .with_child(SourceNode::element("video").with_attr("poster", "https://media.test/a.png")),
        );

    let err = quiet_cloner()
        .with_fetcher(Arc::new(FailingFetcher(404)))
        .clone_root(&root, &CloneOptions::new())
        .await
        .unwrap_err();

    assert!(matches!(err, CloneError::Fetch(FetchError::HttpError(404))));
}

#[tokio::test]
async fn decode_failure_propagates() {
    let canvas = SourceNode::element("canvas").with_canvas(CanvasSurface::drawn(1, 1, vec![1]));
    let err = quiet_cloner()
        .with_image_decoder(Arc::new(BrokenDecoder))
        .clone_root(&canvas, &CloneOptions::new())
        .await
        .unwrap_err();

    assert!(matches!(err, CloneError::Decode(DecodeError::InvalidDataUrl { .. })));
}

#[tokio::test]
async fn text_and_comment_nodes_are_copied_undecorated() {
    let styles = StylesById::default().with("p", properties("color: red"));
    let root = SourceNode::element("p")
        .with_attr("id", "p")
        .with_child(SourceNode::text("hi"))
        .with_child(SourceNode::comment("note"));

    let clone = quiet_cloner()
        .with_style_provider(Arc::new(styles))
        .clone_root(&root, &CloneOptions::new())
        .await
        .unwrap();

    assert_eq!(clone.style.get_property_value("color"), "red");
    assert_eq!(clone.children[0].node_type, ClonedType::Text);
    assert!(clone.children[0].style.is_empty());
    assert_eq!(clone.children[1].node_type, ClonedType::Comment);
    assert_eq!(clone.to_html(), r#"<p id="p" style="color: red;">hi<!--note--></p>"#);
}

#[tokio::test]
async fn source_tree_is_left_untouched() {
    let root = SourceNode::element("div")
        .with_attr("style", "color: blue")
        .with_child(SourceNode::element("input").with_live_value("typed"))
        .into_shared();
    let before = format!("{:?}", root);

    domshot_core::Cloner::default()
        .clone_root(&root, &CloneOptions::new())
        .await
        .unwrap();

    assert_eq!(format!("{:?}", root), before);
}
