//! Binary triangle tree mutation.

use crate::node::{BaseTriangle, Link, NodeId, TriNode};
use crate::pool::TriNodePool;

/// Mutable view of one patch's tree: its two roots plus the pool its
/// descendants are allocated from.
pub struct TriTree<'a> {
    roots: &'a mut [TriNode; 2],
    pool: &'a mut TriNodePool,
}

impl<'a> TriTree<'a> {
    pub fn new(roots: &'a mut [TriNode; 2], pool: &'a mut TriNodePool) -> Self {
        Self { roots, pool }
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &TriNode {
        resolve(self.roots, self.pool, id)
    }

    #[inline]
    fn node_mut(&mut self, id: NodeId) -> &mut TriNode {
        match id {
            NodeId::Root(base) => &mut self.roots[base.index()],
            NodeId::Pooled(slot) => self.pool.node_mut(slot),
        }
    }

    pub fn pool(&self) -> &TriNodePool {
        self.pool
    }

    /// Split a triangle, cascading through its base neighbour so that both
    /// halves of a diamond split together.
    ///
    /// Returns `false` if the pool could not supply the nodes. Slots for the
    /// whole diamond are checked before anything is touched, so a refused
    /// split leaves the tree unchanged.
    pub fn split(&mut self, id: NodeId) -> bool {
        if self.node(id).is_branch() {
            return true;
        }

        // Complete the diamond below us first.
        if let Some(Link::Node(base)) = self.node(id).base_neighbor {
            if self.node(base).base_neighbor != Some(Link::Node(id)) && !self.split(base) {
                return false;
            }
        }

        // The cascade may have relinked our base.
        let tri = *self.node(id);
        let base = tri.base_neighbor.and_then(Link::node);
        let needed = match base {
            Some(base) if self.node(base).is_leaf() => 4,
            _ => 2,
        };
        if !self.pool.reserve(needed) {
            return false;
        }
        let Some(pair) = self.pool.allocate() else {
            return false;
        };
        let (left, right) = (pair.left(), pair.right());
        self.node_mut(id).children = Some(pair);

        {
            let lc = self.node_mut(left);
            lc.base_neighbor = tri.left_neighbor;
            lc.left_neighbor = Some(Link::Node(right));
        }
        {
            let rc = self.node_mut(right);
            rc.base_neighbor = tri.right_neighbor;
            rc.right_neighbor = Some(Link::Node(left));
        }

        if let Some(Link::Node(neighbor)) = tri.left_neighbor {
            self.relink(neighbor, id, left, Side::Left);
        }
        if let Some(Link::Node(neighbor)) = tri.right_neighbor {
            self.relink(neighbor, id, right, Side::Right);
        }

        match tri.base_neighbor {
            Some(Link::Node(base)) => {
                if let Some(base_pair) = self.node(base).children {
                    let (base_left, base_right) = (base_pair.left(), base_pair.right());
                    self.node_mut(base_left).right_neighbor = Some(Link::Node(right));
                    self.node_mut(base_right).left_neighbor = Some(Link::Node(left));
                    self.node_mut(left).right_neighbor = Some(Link::Node(base_right));
                    self.node_mut(right).left_neighbor = Some(Link::Node(base_left));
                } else {
                    // Mutual now, and the reservation covers it.
                    let split = self.split(base);
                    debug_assert!(split, "diamond split refused after reservation");
                }
            }
            edge => {
                self.node_mut(left).right_neighbor = edge;
                self.node_mut(right).left_neighbor = edge;
            }
        }

        true
    }

    /// Point whichever slot of `neighbor` referenced `from` at `to`.
    ///
    /// The left neighbour is searched base, left, right; the right neighbour
    /// base, right, left. A well-formed tree always has a match.
    fn relink(&mut self, neighbor: NodeId, from: NodeId, to: NodeId, side: Side) {
        let from = Some(Link::Node(from));
        let to = Some(Link::Node(to));
        let node = self.node_mut(neighbor);

        let slot = if node.base_neighbor == from {
            Some(&mut node.base_neighbor)
        } else {
            match side {
                Side::Left if node.left_neighbor == from => Some(&mut node.left_neighbor),
                Side::Left if node.right_neighbor == from => Some(&mut node.right_neighbor),
                Side::Right if node.right_neighbor == from => Some(&mut node.right_neighbor),
                Side::Right if node.left_neighbor == from => Some(&mut node.left_neighbor),
                _ => None,
            }
        };
        debug_assert!(slot.is_some(), "neighbour {neighbor:?} does not link back");
        if let Some(slot) = slot {
            *slot = to;
        }
    }
}

/// Look up a node of a tree that is only being read.
#[inline]
pub fn resolve<'n>(roots: &'n [TriNode; 2], pool: &'n TriNodePool, id: NodeId) -> &'n TriNode {
    match id {
        NodeId::Root(base) => &roots[base.index()],
        NodeId::Pooled(slot) => pool.node(slot),
    }
}

#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

/// Fresh roots of a patch: two leaves forming the diagonal diamond, with
/// `edges` giving the external links of the west, north, east and south legs.
pub fn seed_roots(edges: [Option<Link>; 4]) -> [TriNode; 2] {
    let [west, north, east, south] = edges;
    [
        TriNode {
            children: None,
            base_neighbor: Some(Link::Node(NodeId::Root(BaseTriangle::Right))),
            left_neighbor: west,
            right_neighbor: north,
        },
        TriNode {
            children: None,
            base_neighbor: Some(Link::Node(NodeId::Root(BaseTriangle::Left))),
            left_neighbor: east,
            right_neighbor: south,
        },
    ]
}
