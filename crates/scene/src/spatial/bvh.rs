use foundation::bounds::Aabb2;
use foundation::math::precision::stable_total_cmp_f64;

/// A deterministic bounding volume hierarchy over `Aabb2` items.
///
/// Items are identified by the caller's index (feature position).
///
/// Ordering contract:
/// - `query_point` returns item indices in ascending order.
#[derive(Debug, Clone, Default)]
pub struct Bvh {
    nodes: Vec<Node>,
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        bounds: Aabb2,
        items: Vec<Item>,
    },
    Internal {
        bounds: Aabb2,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Item {
    pub index: u32,
    pub bounds: Aabb2,
}

impl Bvh {
    pub fn build(items: Vec<Item>) -> Self {
        let mut nodes = Vec::new();
        let mut items = items;
        if !items.is_empty() {
            let _root = build_node(&mut nodes, &mut items);
        }
        Self { nodes }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Items whose bounds contain `p`, in ascending index order.
    pub fn query_point(&self, p: [f64; 2]) -> Vec<u32> {
        if self.nodes.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<u32> = Vec::new();
        let mut stack: Vec<usize> = vec![0];

        while let Some(idx) = stack.pop() {
            match &self.nodes[idx] {
                Node::Leaf { bounds, items } => {
                    if !bounds.contains(p) {
                        continue;
                    }
                    for item in items {
                        if item.bounds.contains(p) {
                            hits.push(item.index);
                        }
                    }
                }
                Node::Internal {
                    bounds,
                    left,
                    right,
                } => {
                    if !bounds.contains(p) {
                        continue;
                    }
                    stack.push(*right);
                    stack.push(*left);
                }
            }
        }

        hits.sort_unstable();
        hits.dedup();
        hits
    }
}

const LEAF_MAX: usize = 4;

fn build_node(nodes: &mut Vec<Node>, items: &mut [Item]) -> usize {
    if items.len() <= LEAF_MAX {
        let bounds = bounds_for_items(items);
        let idx = nodes.len();
        nodes.push(Node::Leaf {
            bounds,
            items: items.to_vec(),
        });
        return idx;
    }

    let bounds = bounds_for_items(items);
    let axis = if bounds.width() >= bounds.height() { 0 } else { 1 };

    items.sort_by(|a, b| {
        let ca = a.bounds.center()[axis];
        let cb = b.bounds.center()[axis];
        stable_total_cmp_f64(ca, cb).then_with(|| a.index.cmp(&b.index))
    });

    let mid = items.len() / 2;
    let (left_items, right_items) = items.split_at_mut(mid);

    let idx = nodes.len();
    // Placeholder; patched once both children exist.
    nodes.push(Node::Leaf {
        bounds,
        items: Vec::new(),
    });

    let left = build_node(nodes, left_items);
    let right = build_node(nodes, right_items);

    nodes[idx] = Node::Internal {
        bounds,
        left,
        right,
    };
    idx
}

fn bounds_for_items(items: &[Item]) -> Aabb2 {
    let mut b = items[0].bounds;
    for item in &items[1..] {
        b = b.union(&item.bounds);
    }
    b
}
