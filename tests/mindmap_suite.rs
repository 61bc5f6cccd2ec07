use std::cell::RefCell;
use std::f32::consts::TAU;
use std::path::Path;
use std::rc::Rc;

use radial_mindmap::render::node_radius;
use radial_mindmap::{
    EventKind, LayoutEngine, LayoutStrategy, MindMap, MindMapEvent, MindMapFactory,
    MindMapOptions, Node, Renderer, Scene, SvgRenderer, Theme, TreeModel, ViewTransform,
    load_tree, parse_tree,
};

fn assert_valid_svg(svg: &str, fixture: &str) {
    assert!(svg.contains("<svg"), "{fixture}: missing <svg tag");
    assert!(svg.contains("</svg>"), "{fixture}: missing </svg tag");
}

fn fixture_path(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn map_for(data: Node) -> MindMap {
    MindMapFactory::create_radial_mind_map(
        MindMapOptions::new("svg", 800.0, 400.0).with_data(data),
    )
    .expect("map build failed")
}

fn count_updates(map: &mut MindMap) -> Rc<RefCell<usize>> {
    let count = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&count);
    map.on(EventKind::Updated, move |_| *sink.borrow_mut() += 1);
    count
}

#[test]
fn render_all_fixtures() {
    // Keep this list explicit so new fixtures must be added intentionally.
    let candidates = [
        "frameworks.json",
        "summaries.json",
        "duplicates.json",
        "single.json",
        "lenient.json5",
    ];

    for rel in candidates {
        let path = fixture_path(rel);
        assert!(path.exists(), "fixture missing: {}", rel);
        let data = load_tree(&path).expect("fixture load failed");
        let count = TreeModel::new(data.clone()).len();
        for strategy in [LayoutStrategy::radial(), LayoutStrategy::horizontal()] {
            let mut options = MindMapOptions::new("svg", 800.0, 400.0).with_data(data.clone());
            options.layout_strategy = Some(strategy);
            let map = MindMap::new(options).expect("map build failed");
            assert_eq!(map.layout().descendants.len(), count, "{rel}");
            assert_eq!(map.layout().links.len(), count - 1, "{rel}");
            let svg = map.to_svg();
            assert_valid_svg(&svg, rel);
            assert_eq!(svg.matches("<circle r=").count(), count, "{rel}");
        }
    }
}

#[test]
fn root_a_b_walkthrough() {
    let mut map = map_for(Node::new("Root"));
    let updates = count_updates(&mut map);

    map.add_node("Root", "A").unwrap();
    map.add_node("A", "B").unwrap();
    assert_eq!(*updates.borrow(), 2);

    let root = map.tree().root();
    assert_eq!(root.children.len(), 1);
    assert_eq!(root.children[0].name, "A");
    assert_eq!(root.children[0].children.len(), 1);
    assert_eq!(root.children[0].children[0].name, "B");
    assert_eq!(
        map.ancestor_path("A").unwrap(),
        vec!["Root".to_string(), "A".to_string()]
    );

    let a = map.layout().node_by_name("A").unwrap();
    let b = map.layout().node_by_name("B").unwrap();
    assert_eq!(b.parent, Some(a.key));
    assert_eq!(a.y, 110.0);
    assert_eq!(b.y, 220.0);
}

#[test]
fn missing_parent_changes_nothing_and_emits_nothing() {
    let data = parse_tree(include_str!("fixtures/frameworks.json")).unwrap();
    let mut map = map_for(data);
    let updates = count_updates(&mut map);
    let before = map.tree().snapshot();

    assert_eq!(map.add_node("Missing", "X").unwrap(), None);
    assert_eq!(map.tree().snapshot(), before);
    assert_eq!(*updates.borrow(), 0);
}

#[test]
fn child_is_appended_last_exactly_once() {
    let data = parse_tree(include_str!("fixtures/frameworks.json")).unwrap();
    let mut map = map_for(data);
    map.add_node("ReactJs", "Suspense").unwrap();
    let react = map.tree().find_node("ReactJs").unwrap();
    assert_eq!(react.children.last().unwrap().name, "Suspense");
    let occurrences = react
        .children
        .iter()
        .filter(|child| child.name == "Suspense")
        .count();
    assert_eq!(occurrences, 1);
    assert_eq!(map.add_node("VueJs", "Suspense").unwrap(), None);
}

#[test]
fn reroot_then_back_restores_tree_and_transform() {
    let data = parse_tree(include_str!("fixtures/frameworks.json")).unwrap();
    let mut map = map_for(data);
    map.zoom_by(1.5, 100.0, 100.0).unwrap();
    let tree = map.tree().snapshot();
    let transform = map.transform();

    assert!(map.set_new_root("Hooks").unwrap());
    assert_eq!(map.tree().root().name, "Hooks");
    assert_eq!(map.transform(), ViewTransform::identity());
    assert!(map.set_new_root("useState").unwrap());
    assert_eq!(map.history_len(), 2);

    assert!(map.go_back().unwrap());
    assert_eq!(map.tree().root().name, "Hooks");
    assert!(map.go_back().unwrap());
    assert_eq!(map.tree().snapshot(), tree);
    assert_eq!(map.transform(), transform);

    assert!(!map.go_back().unwrap());
    assert_eq!(map.tree().snapshot(), tree);
}

#[test]
fn layouts_are_deterministic_and_bounded() {
    let data = parse_tree(include_str!("fixtures/summaries.json")).unwrap();
    let root = TreeModel::new(data).snapshot();

    let radial = LayoutStrategy::radial();
    let first = radial.compute_layout(&root, 800.0, 400.0).unwrap();
    assert_eq!(first, radial.compute_layout(&root, 800.0, 400.0).unwrap());
    for node in &first.descendants {
        assert!((0.0..TAU).contains(&node.x), "{} angle {}", node.name, node.x);
    }

    let horizontal = LayoutStrategy::horizontal();
    let layout = horizontal.compute_layout(&root, 800.0, 400.0).unwrap();
    for node in &layout.descendants {
        assert!(node.x >= 0.0 && node.x <= 400.0, "{} x {}", node.name, node.x);
        assert!(node.y >= 0.0 && node.y <= 640.0, "{} y {}", node.name, node.y);
    }
}

#[test]
fn node_radius_follows_label_length() {
    assert_eq!(node_radius("AB"), 15.0);
    assert_eq!(node_radius("twenty characters!!!"), 40.0);
    assert_eq!(node_radius("ReactJs Context"), 30.0);
}

#[test]
fn keyed_diff_reports_only_changes() {
    let mut tree = TreeModel::new(parse_tree(include_str!("fixtures/frameworks.json")).unwrap());
    let layout = LayoutStrategy::radial();
    let theme = Theme::default();
    let mut renderer = SvgRenderer::default();
    let mut scene = Scene::new("svg", 800.0, 400.0);

    let frame = layout.compute_layout(tree.root(), 800.0, 400.0).unwrap();
    renderer.render_links(&mut scene, &frame.links, &theme).unwrap();
    let first = renderer
        .render_nodes(&mut scene, &frame.descendants, &theme)
        .unwrap();
    assert_eq!(first.entered.len(), tree.len());

    let links = renderer.render_links(&mut scene, &frame.links, &theme).unwrap();
    let nodes = renderer
        .render_nodes(&mut scene, &frame.descendants, &theme)
        .unwrap();
    assert!(links.is_unchanged());
    assert!(nodes.is_unchanged());

    tree.add_node("VueJs", "Pinia").unwrap();
    let frame = layout.compute_layout(tree.root(), 800.0, 400.0).unwrap();
    let links = renderer.render_links(&mut scene, &frame.links, &theme).unwrap();
    let nodes = renderer
        .render_nodes(&mut scene, &frame.descendants, &theme)
        .unwrap();
    assert_eq!(links.entered.len(), 1);
    assert_eq!(nodes.entered.len(), 1);
    assert!(nodes.exited.is_empty());
}

#[test]
fn re_render_mid_transition_starts_from_displayed_position() {
    let mut map = map_for(Node::new("Root"));
    map.add_node("Root", "A").unwrap();
    map.tick(10_000.0);
    let key = map.layout().node_by_name("A").unwrap().key;

    map.add_node("Root", "B").unwrap();
    map.tick(300.0);
    let displayed = map.scene().nodes[&key].position(map.scene().clock);

    map.add_node("Root", "C").unwrap();
    let motion = map.scene().nodes[&key].motion;
    assert_eq!(motion.from, displayed);
    assert_eq!(motion.start, map.scene().clock);
    assert!(map.scene().is_animating());
}

#[test]
fn zoom_is_clamped_and_reported() {
    let mut map = map_for(Node::new("Root"));
    let zooms = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&zooms);
    map.on_named("zoom", move |event| {
        if let MindMapEvent::Zoom(transform) = event {
            sink.borrow_mut().push(transform.scale);
        }
    })
    .unwrap();

    map.zoom_by(8.0, 400.0, 200.0).unwrap();
    map.zoom_by(0.01, 400.0, 200.0).unwrap();
    assert_eq!(*zooms.borrow(), vec![2.0, 0.5]);
}

#[test]
fn duplicate_names_resolve_to_first_match() {
    let data = load_tree(&fixture_path("duplicates.json")).unwrap();
    let mut map = map_for(data);
    assert_eq!(
        map.ancestor_path("Shared").unwrap(),
        vec!["Root".to_string(), "Shared".to_string()]
    );
    map.add_node("Shared", "Third child").unwrap();
    assert_eq!(map.tree().root().children[0].children.len(), 2);
}

#[test]
fn side_panel_uses_summary_or_placeholder() {
    let data = load_tree(&fixture_path("summaries.json")).unwrap();
    let mut map = map_for(data);

    map.click_node("JavaScript").unwrap();
    let panel = map.side_panel().unwrap();
    assert_eq!(panel.description, "The language of the browser.");
    assert_eq!(panel.details.len(), 3);
    assert_eq!(
        panel.ancestor_names(),
        vec!["Frontend Roadmap", "Fundamentals", "JavaScript"]
    );

    map.click_node("A very long topic name that overflows").unwrap();
    let panel = map.side_panel().unwrap();
    assert_eq!(panel.breadcrumb[1].label, "A very long topic...");
    assert!(panel.to_html().contains("No additional details available."));
}

#[test]
fn progress_is_clamped_and_rendered() {
    let data = load_tree(&fixture_path("lenient.json5")).unwrap();
    let map = map_for(data);
    let ideas = map.layout().node_by_name("Ideas").unwrap();
    assert_eq!(ideas.progress, 100);
    let svg = map.to_svg();
    assert!(svg.contains("class=\"progress-track\""));
}
