//! Flat-array quad tree broad phase with implicit indexing.

use super::{BroadPhase, BroadPhaseError};
use crate::collision::aabb::Aabb;
use crate::collision::buffer::CollisionBuffer;
use crate::math::vec2::Vec2;
use crate::objects::rigid_body::RigidBody;

#[derive(Debug, Clone)]
struct Node {
    bounds: Aabb,
    bodies: Vec<usize>,
}

/// A complete quad tree of fixed depth stored as one flat array: child `c`
/// of node `i` lives at `4*i + c + 1`, the parent of `i` at `(i - 1) / 4`.
///
/// Insertion descends into the unique child quadrant that fully contains a
/// body's AABB; a body straddling a split line stays at the current node.
/// Any two intersecting bodies therefore end up in the same node or in an
/// ancestor/descendant pair, so the solve pass tests each node's bodies
/// against the node itself and its ancestor chain only — sibling subtrees
/// are never compared.
#[derive(Debug)]
pub struct QuadTree {
    nodes: Vec<Node>,
}

impl QuadTree {
    /// A tree of `depth` levels covering the square of `half_width` around
    /// `center`.
    pub fn new(center: Vec2, half_width: f64, depth: u32) -> Self {
        assert!(depth >= 1, "tree depth must be at least 1");
        assert!(half_width > 0.0, "tree half width must be positive");
        // (4^depth - 1) / 3 nodes in a complete 4-ary tree.
        let node_count = ((1usize << (2 * depth)) - 1) / 3;

        let mut nodes = Vec::with_capacity(node_count);
        let extent = Vec2::new(half_width, half_width);
        nodes.push(Node {
            bounds: Aabb::new(center - extent, center + extent),
            bodies: Vec::new(),
        });
        // Children in index order; parents always precede their children.
        const QUADRANTS: [(f64, f64); 4] = [(-1.0, -1.0), (-1.0, 1.0), (1.0, 1.0), (1.0, -1.0)];
        for idx in 1..node_count {
            let parent = &nodes[(idx - 1) / 4];
            let quadrant = QUADRANTS[(idx - 1) % 4];
            let quarter = parent.bounds.extents() * 0.5;
            let child_center = parent.bounds.center()
                + Vec2::new(quarter.x * quadrant.0, quarter.y * quadrant.1);
            nodes.push(Node {
                bounds: Aabb::new(child_center - quarter, child_center + quarter),
                bodies: Vec::new(),
            });
        }
        Self { nodes }
    }

    fn has_children(&self, idx: usize) -> bool {
        4 * idx + 4 < self.nodes.len()
    }

    fn insert(&mut self, index: usize, aabb: &Aabb) {
        let mut idx = 0;
        loop {
            if !self.has_children(idx) {
                break;
            }
            let first_child = 4 * idx + 1;
            let mut containing = None;
            for c in 0..4 {
                if self.nodes[first_child + c].bounds.contains(aabb) {
                    containing = Some(first_child + c);
                    break;
                }
            }
            match containing {
                Some(child) => idx = child,
                // Straddles a split line (or lies outside the tree):
                // promoted to this node.
                None => break,
            }
        }
        self.nodes[idx].bodies.push(index);
    }
}

impl BroadPhase for QuadTree {
    fn ingest(&mut self, bodies: &[RigidBody]) -> Result<(), BroadPhaseError> {
        for (index, body) in bodies.iter().enumerate() {
            self.insert(index, &body.aabb());
        }
        Ok(())
    }

    fn solve(&mut self, bodies: &[RigidBody], candidates: &mut CollisionBuffer) {
        for idx in 0..self.nodes.len() {
            let here = &self.nodes[idx].bodies;

            // All pairs stored at this node.
            for i in 0..here.len() {
                for j in (i + 1)..here.len() {
                    if bodies[here[i]].aabb().intersects(&bodies[here[j]].aabb()) {
                        candidates.append(here[i], here[j]);
                    }
                }
            }

            // This node's bodies against everything on the ancestor chain.
            let mut ancestor = idx;
            while ancestor != 0 {
                ancestor = (ancestor - 1) / 4;
                for &a in here {
                    for &b in &self.nodes[ancestor].bodies {
                        if bodies[a].aabb().intersects(&bodies[b].aabb()) {
                            candidates.append(a, b);
                        }
                    }
                }
            }
        }
    }

    fn clear(&mut self) {
        for node in &mut self.nodes {
            node.bodies.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadphase::naive::NaiveScan;
    use crate::shapes::{Circle, Shape, VertexArena};
    use std::collections::BTreeSet;

    fn candidate_set(
        strategy: &mut dyn BroadPhase,
        bodies: &[RigidBody],
    ) -> BTreeSet<(usize, usize)> {
        let mut candidates = CollisionBuffer::new();
        strategy.ingest(bodies).unwrap();
        strategy.solve(bodies, &mut candidates);
        strategy.clear();
        candidates.deduplicate();
        candidates.unique_pairs().map(|p| (p.a, p.b)).collect()
    }

    fn circle_at(x: f64, y: f64, radius: f64, arena: &VertexArena) -> RigidBody {
        let mut body = RigidBody::new(Shape::Circle(Circle::new(radius)), arena);
        body.set_position(Vec2::new(x, y));
        body.update_aabb(arena);
        body
    }

    #[test]
    fn test_node_count_and_bounds() {
        let tree = QuadTree::new(Vec2::ZERO, 100.0, 3);
        assert_eq!(tree.nodes.len(), 21);
        assert_eq!(tree.nodes[0].bounds.extents(), Vec2::new(100.0, 100.0));
        // Children of the root halve the extent; grandchildren quarter it.
        assert_eq!(tree.nodes[1].bounds.extents(), Vec2::new(50.0, 50.0));
        assert_eq!(tree.nodes[5].bounds.extents(), Vec2::new(25.0, 25.0));
    }

    #[test]
    fn test_straddling_body_stays_at_ancestor() {
        let arena = VertexArena::new();
        let mut tree = QuadTree::new(Vec2::ZERO, 100.0, 3);
        let bodies = vec![
            // Spans both split axes at the root.
            circle_at(0.0, 0.0, 5.0, &arena),
            // Fits entirely inside one deepest quadrant.
            circle_at(30.0, 30.0, 2.0, &arena),
        ];
        tree.ingest(&bodies).unwrap();
        assert_eq!(tree.nodes[0].bodies, vec![0]);
        let leaf = tree
            .nodes
            .iter()
            .position(|n| n.bodies.contains(&1))
            .unwrap();
        assert!(leaf > 4, "small body should sink below the first level");
        tree.clear();
    }

    #[test]
    fn test_ancestor_chain_covers_straddling_pairs() {
        let arena = VertexArena::new();
        let mut tree = QuadTree::new(Vec2::ZERO, 100.0, 3);
        // The first body straddles both root split lines and is stored at
        // the root; the second sinks into a deep child. They overlap, and
        // only the ancestor walk can report the pair.
        let bodies = vec![
            circle_at(0.0, 0.0, 5.0, &arena),
            circle_at(4.0, 4.0, 2.0, &arena),
        ];
        let pairs = candidate_set(&mut tree, &bodies);
        assert!(pairs.contains(&(0, 1)));
    }

    #[test]
    fn test_matches_naive_on_scatter() {
        let arena = VertexArena::new();
        // Fractional offsets keep AABB edges off the split lines, where a
        // containment tree genuinely cannot see a touching pair.
        let mut bodies = Vec::new();
        for i in 0..60 {
            let x = ((i * 61) % 160) as f64 - 80.0 + 0.37;
            let y = ((i * 43) % 160) as f64 - 80.0 + 0.37;
            let radius = [1.3, 2.7, 6.1][i % 3];
            bodies.push(circle_at(x, y, radius, &arena));
        }
        let mut tree = QuadTree::new(Vec2::ZERO, 100.0, 3);
        let reference = candidate_set(&mut NaiveScan::new(), &bodies);
        assert_eq!(candidate_set(&mut tree, &bodies), reference);
        assert!(!reference.is_empty());
    }

    #[test]
    fn test_body_outside_tree_is_still_tested() {
        let arena = VertexArena::new();
        let mut tree = QuadTree::new(Vec2::ZERO, 10.0, 2);
        let bodies = vec![
            circle_at(50.0, 50.0, 2.0, &arena),
            circle_at(51.0, 50.0, 2.0, &arena),
        ];
        let pairs = candidate_set(&mut tree, &bodies);
        assert!(pairs.contains(&(0, 1)));
    }

    #[test]
    fn test_clear_empties_every_node() {
        let arena = VertexArena::new();
        let mut tree = QuadTree::new(Vec2::ZERO, 100.0, 3);
        let bodies = vec![circle_at(0.0, 0.0, 5.0, &arena)];
        tree.ingest(&bodies).unwrap();
        tree.clear();
        assert!(tree.nodes.iter().all(|n| n.bodies.is_empty()));
    }
}
