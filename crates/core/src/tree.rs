//! Huffman tree construction.
//!
//! The builder keeps a min-heap of subtrees keyed by `(weight, symbol)` and
//! repeatedly merges the two lightest ones. For an internal node the key
//! symbol is the smallest symbol in its subtree. Symbols in the heap are
//! always disjoint, so the key is a total order: equal weights are broken by
//! symbol value and the resulting tree does not depend on how the frequencies
//! were gathered.
//!
//! The first node popped becomes the left (bit 0) child of the merged node,
//! the second one the right (bit 1) child.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::frequency::FrequencyTable;

/// A node of the Huffman tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A single symbol
    Leaf { symbol: u8, weight: u64 },

    /// Two subtrees; `left` is reached with bit 0, `right` with bit 1
    Internal {
        weight: u64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    /// Total frequency of the subtree.
    pub fn weight(&self) -> u64 {
        match self {
            Node::Leaf { weight, .. } | Node::Internal { weight, .. } => *weight,
        }
    }

    /// True for a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 0,
            Node::Internal { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// Number of leaves in the subtree.
    pub fn leaf_count(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Internal { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }
}

/// Heap entry ordering subtrees by `(weight, min symbol)`.
#[derive(Debug)]
struct Pending {
    weight: u64,
    min_symbol: u8,
    node: Node,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.weight == other.weight && self.min_symbol == other.min_symbol
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (lighter, then lower symbol = higher priority)
        other
            .weight
            .cmp(&self.weight)
            .then_with(|| other.min_symbol.cmp(&self.min_symbol))
    }
}

/// An optimal prefix tree over the symbols of a frequency table.
///
/// The tree is ephemeral: it exists only to derive an
/// [`EncodingTable`](crate::table::EncodingTable).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    root: Option<Node>,
}

impl HuffmanTree {
    /// Build the tree for every symbol with a non-zero count.
    ///
    /// An empty table yields an empty tree; a single symbol yields a lone leaf.
    pub fn from_frequencies(freqs: &FrequencyTable) -> Self {
        let mut heap: BinaryHeap<Pending> = freqs
            .iter()
            .map(|(symbol, weight)| Pending {
                weight,
                min_symbol: symbol,
                node: Node::Leaf { symbol, weight },
            })
            .collect();

        while heap.len() > 1 {
            let (Some(first), Some(second)) = (heap.pop(), heap.pop()) else {
                break;
            };

            let weight = first.weight + second.weight;
            heap.push(Pending {
                weight,
                min_symbol: first.min_symbol.min(second.min_symbol),
                node: Node::Internal {
                    weight,
                    left: Box::new(first.node),
                    right: Box::new(second.node),
                },
            });
        }

        Self {
            root: heap.pop().map(|pending| pending.node),
        }
    }

    /// Build the tree for the bytes of `text`.
    pub fn from_bytes(text: &[u8]) -> Self {
        Self::from_frequencies(&FrequencyTable::from_bytes(text))
    }

    /// The root node, or `None` for an empty tree.
    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    /// True when the tree covers no symbols.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of symbols covered.
    pub fn len(&self) -> usize {
        self.root.as_ref().map_or(0, Node::leaf_count)
    }
}
