use super::*;

pub(super) fn compute_horizontal_layout(
    root: &Node,
    width: f32,
    height: f32,
    config: &HorizontalConfig,
) -> TreeLayout {
    let separation = Separation {
        sibling: config.sibling_separation,
        cousin: config.cousin_separation,
    };
    let depth_extent = (width - config.margin).max(0.0);
    let slots = tidy_tree(root, separation, height);
    let max_depth = slots.iter().map(|slot| slot.depth).max().unwrap_or(0).max(1);
    let level_width = depth_extent / max_depth as f32;

    let (descendants, links) = assemble(root, &slots, |slot| {
        let y = slot.depth as f32 * level_width;
        (slot.x, y, (y, slot.x))
    });

    TreeLayout {
        descendants,
        links,
        orientation: Orientation::Horizontal,
        origin: (config.margin / 2.0, 0.0),
        extent: (height, depth_extent),
    }
}
