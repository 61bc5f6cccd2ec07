use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use radial_mindmap::layout::{LayoutEngine, LayoutStrategy};
use radial_mindmap::tree::{Node, TreeModel};
use radial_mindmap::{MindMap, MindMapOptions, parse_tree};
use std::hint::black_box;

/// Complete tree with `fanout` children per node down to `depth` levels.
fn balanced_tree(fanout: usize, depth: usize) -> Node {
    fn grow(name: String, fanout: usize, depth: usize) -> Node {
        let children = if depth == 0 {
            Vec::new()
        } else {
            (0..fanout)
                .map(|idx| grow(format!("{name}.{idx}"), fanout, depth - 1))
                .collect()
        };
        Node::new(name).with_children(children)
    }
    grow("Root".to_string(), fanout, depth)
}

/// Long chain with a small fan at every level, the shape that stresses apportioning.
fn comb_tree(length: usize) -> Node {
    let mut node = Node::new(format!("Spine {length}"));
    for idx in (0..length).rev() {
        node = Node::new(format!("Spine {idx}")).with_children(vec![
            node,
            Node::new(format!("Leaf {idx}a")),
            Node::new(format!("Leaf {idx}b")),
        ]);
    }
    node
}

fn fixture(name: &str) -> Node {
    let source = match name {
        "frameworks" => include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/frameworks.json"
        )),
        "summaries" => include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/summaries.json"
        )),
        _ => panic!("unknown fixture"),
    };
    parse_tree(source).expect("fixture parse failed")
}

fn inputs() -> Vec<(String, Node)> {
    vec![
        ("frameworks".to_string(), fixture("frameworks")),
        ("summaries".to_string(), fixture("summaries")),
        ("balanced_3x4".to_string(), balanced_tree(3, 4)),
        ("balanced_5x4".to_string(), balanced_tree(5, 4)),
        ("balanced_2x9".to_string(), balanced_tree(2, 9)),
        ("comb_200".to_string(), comb_tree(200)),
    ]
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    for (name, root) in inputs() {
        let root = TreeModel::new(root).snapshot();
        for strategy in [LayoutStrategy::radial(), LayoutStrategy::horizontal()] {
            let id = format!("{}/{}", strategy.name(), name);
            group.bench_with_input(BenchmarkId::from_parameter(id), &root, |b, root| {
                b.iter(|| {
                    let layout = strategy
                        .compute_layout(black_box(root), 800.0, 400.0)
                        .expect("layout failed");
                    black_box(layout.descendants.len());
                });
            });
        }
    }
    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("update");
    for (name, root) in inputs() {
        let mut map = MindMap::new(MindMapOptions::new("svg", 800.0, 400.0).with_data(root))
            .expect("map build failed");
        group.bench_function(BenchmarkId::from_parameter(&name), |b| {
            b.iter(|| {
                map.update().expect("update failed");
                black_box(map.scene().nodes.len());
            });
        });
    }
    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("end_to_end");
    for (name, root) in inputs() {
        group.bench_with_input(BenchmarkId::from_parameter(&name), &root, |b, root| {
            b.iter(|| {
                let map = MindMap::new(
                    MindMapOptions::new("svg", 800.0, 400.0).with_data(black_box(root).clone()),
                )
                .expect("map build failed");
                black_box(map.to_svg().len());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_layout, bench_update, bench_end_to_end);
criterion_main!(benches);
