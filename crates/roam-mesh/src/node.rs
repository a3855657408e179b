//! Binary triangle tree nodes.
//!
//! Nodes never own each other. Children live in a [`TriNodePool`] and are
//! addressed by slot index; the two roots of a patch live in the patch and
//! survive pool resets.
//!
//! [`TriNodePool`]: crate::pool::TriNodePool

/// One of the two root triangles of a patch, sharing the patch diagonal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BaseTriangle {
    /// Apex at the patch origin corner.
    Left,
    /// Apex at the far corner.
    Right,
}

impl BaseTriangle {
    /// Both roots, in index order.
    pub const ALL: [Self; 2] = [Self::Left, Self::Right];

    /// Index into per-root arrays.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The root on the other side of the diagonal.
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Handle to a node of a patch's tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeId {
    /// A patch root.
    Root(BaseTriangle),
    /// A slot in the node pool.
    Pooled(u32),
}

/// Non-owning reference across an edge of a triangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Link {
    /// A triangle of the same patch.
    Node(NodeId),
    /// The edge borders another patch. Splits do not cascade across it.
    Seam,
}

impl Link {
    /// The linked node, if the link stays inside the patch.
    #[inline]
    pub const fn node(self) -> Option<NodeId> {
        match self {
            Self::Node(id) => Some(id),
            Self::Seam => None,
        }
    }
}

/// A pair of sibling slots handed out together by the pool.
///
/// The left child always sits at an even slot and the right child directly
/// after it, so a node can never end up with a single child.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChildPair(u32);

impl ChildPair {
    /// Pair starting at `left`. `left` must be even.
    #[inline]
    pub(crate) const fn new(left: u32) -> Self {
        debug_assert!(left % 2 == 0);
        Self(left)
    }

    #[inline]
    pub const fn left(self) -> NodeId {
        NodeId::Pooled(self.0)
    }

    #[inline]
    pub const fn right(self) -> NodeId {
        NodeId::Pooled(self.0 + 1)
    }
}

/// A triangle of the binary triangle tree.
///
/// Seen from the apex, the left neighbour shares the apex-left leg, the right
/// neighbour the apex-right leg, and the base neighbour the hypotenuse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TriNode {
    pub children: Option<ChildPair>,
    pub base_neighbor: Option<Link>,
    pub left_neighbor: Option<Link>,
    pub right_neighbor: Option<Link>,
}

impl TriNode {
    /// A node without children.
    #[inline]
    pub const fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    #[inline]
    pub const fn is_branch(&self) -> bool {
        self.children.is_some()
    }

    #[inline]
    pub const fn left_child(&self) -> Option<NodeId> {
        match self.children {
            Some(pair) => Some(pair.left()),
            None => None,
        }
    }

    #[inline]
    pub const fn right_child(&self) -> Option<NodeId> {
        match self.children {
            Some(pair) => Some(pair.right()),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_node_is_leaf() {
        let node = TriNode::default();
        assert!(node.is_leaf());
        assert!(!node.is_branch());
        assert_eq!(node.left_child(), None);
    }

    #[test]
    fn child_pair_is_adjacent() {
        let pair = ChildPair::new(6);
        assert_eq!(pair.left(), NodeId::Pooled(6));
        assert_eq!(pair.right(), NodeId::Pooled(7));

        let node = TriNode {
            children: Some(pair),
            ..Default::default()
        };
        assert!(node.is_branch());
        assert_eq!(node.right_child(), Some(NodeId::Pooled(7)));
    }

    #[test]
    fn seam_links_have_no_node() {
        assert_eq!(Link::Seam.node(), None);
        let root = NodeId::Root(BaseTriangle::Right);
        assert_eq!(Link::Node(root).node(), Some(root));
        assert_eq!(BaseTriangle::Left.opposite(), BaseTriangle::Right);
    }
}
