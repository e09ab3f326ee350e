//! Greedy construction of the Huffman tree from a [`FrequencyTable`].

use crate::frequency::FrequencyTable;
use core::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TreeError {
    #[error("Can't build a huffman tree without any symbols")]
    EmptyInput,
    #[error("Sum of all frequencies does not fit into 64 bits")]
    FrequencyOverflow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf {
        symbol: u8,
        frequency: u64,
    },
    Internal {
        frequency: u64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    pub fn frequency(&self) -> u64 {
        match self {
            Node::Leaf { frequency, .. } | Node::Internal { frequency, .. } => *frequency,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}

/// A node waiting in the heap. `sequence` is the secondary key: leaves are
/// numbered in ascending symbol order, internal nodes in creation order
/// after them. Lower frequency is popped first, then lower sequence.
struct Pending {
    frequency: u64,
    sequence: usize,
    node: Node,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
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
        // reversed, BinaryHeap is a max-heap
        other
            .frequency
            .cmp(&self.frequency)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    root: Node,
}

impl HuffmanTree {
    /// Build the tree by repeatedly merging the two cheapest nodes. The first
    /// node taken out of the heap becomes the left child.
    ///
    /// Equal tables always produce equal trees. The decoder depends on this to
    /// re-derive the encoder's codes from frequencies alone.
    pub fn build(frequencies: &FrequencyTable) -> Result<Self, TreeError> {
        let mut heap = BinaryHeap::with_capacity(frequencies.distinct());
        for (sequence, (symbol, frequency)) in frequencies.iter().enumerate() {
            heap.push(Pending {
                frequency,
                sequence,
                node: Node::Leaf { symbol, frequency },
            });
        }
        let mut next_sequence = heap.len();

        let root = loop {
            let first = heap.pop().ok_or(TreeError::EmptyInput)?;
            let Some(second) = heap.pop() else {
                break first.node;
            };
            let frequency = first
                .frequency
                .checked_add(second.frequency)
                .ok_or(TreeError::FrequencyOverflow)?;
            heap.push(Pending {
                frequency,
                sequence: next_sequence,
                node: Node::Internal {
                    frequency,
                    left: Box::new(first.node),
                    right: Box::new(second.node),
                },
            });
            next_sequence += 1;
        };

        tracing::debug!(
            distinct = frequencies.distinct(),
            total = root.frequency(),
            "built huffman tree"
        );
        Ok(HuffmanTree { root })
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Sum of all leaf frequencies.
    pub fn frequency(&self) -> u64 {
        self.root.frequency()
    }

    pub fn leaf_count(&self) -> usize {
        fn count(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 1,
                Node::Internal { left, right, .. } => count(left) + count(right),
            }
        }
        count(&self.root)
    }

    /// Length of the longest root-to-leaf path. Zero for a lone leaf.
    pub fn max_depth(&self) -> usize {
        fn depth(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 0,
                Node::Internal { left, right, .. } => 1 + depth(left).max(depth(right)),
            }
        }
        depth(&self.root)
    }
}
