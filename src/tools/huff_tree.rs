//! Static Huffman tree construction.
//!
//! Merges are reproducible because every node carries a sequence number that
//! breaks weight ties:
//! * leaves are numbered 0,1,2,... in ascending symbol order
//! * each merged node takes the next unused number
//! * the node with the smaller (weight,sequence) is extracted first
//! * of the two nodes extracted in a step, the first becomes the left son (bit 0)

use std::cmp::Reverse;
use std::collections::{BTreeMap,BinaryHeap};
use crate::Error;

/// Node of the Huffman tree, the tree is immutable once built.
#[derive(Debug,Clone,PartialEq,Eq)]
pub enum Node {
    Leaf {
        symbol: u8,
        weight: u64
    },
    Internal {
        weight: u64,
        left: Box<Node>,
        right: Box<Node>
    }
}

impl Node {
    /// Build the tree from a frequency map, returning the root.
    /// A single distinct symbol gives a single leaf.
    pub fn build(freq: &BTreeMap<u8,u64>) -> Result<Self,Error> {
        // node pool is indexed by sequence number, nodes are taken out as they are merged
        let mut pool: Vec<Option<Node>> = Vec::with_capacity(2*freq.len());
        let mut queue: BinaryHeap<Reverse<(u64,usize)>> = BinaryHeap::new();
        for (symbol,weight) in freq {
            queue.push(Reverse((*weight,pool.len())));
            pool.push(Some(Node::Leaf { symbol: *symbol, weight: *weight }));
        }
        if queue.len()==0 {
            return Err(Error::EmptyInput);
        }
        while queue.len() > 1 {
            // unwrap is safe, queue has at least 2 elements and every sequence number is taken once
            let Reverse((w1,seq1)) = queue.pop().unwrap();
            let Reverse((w2,seq2)) = queue.pop().unwrap();
            let left = pool[seq1].take().unwrap();
            let right = pool[seq2].take().unwrap();
            log::trace!("merge {}:{} with {}:{} as {}",seq1,w1,seq2,w2,pool.len());
            queue.push(Reverse((w1+w2,pool.len())));
            pool.push(Some(Node::Internal {
                weight: w1+w2,
                left: Box::new(left),
                right: Box::new(right)
            }));
        }
        let Reverse((_,root)) = queue.pop().unwrap();
        log::debug!("tree built with {} nodes",pool.len());
        Ok(pool[root].take().unwrap())
    }
    pub fn weight(&self) -> u64 {
        match self {
            Node::Leaf { weight, .. } => *weight,
            Node::Internal { weight, .. } => *weight
        }
    }
    pub fn leaf_count(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Internal { left, right, .. } => left.leaf_count() + right.leaf_count()
        }
    }
    /// number of edges on the longest path to a leaf
    pub fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 0,
            Node::Internal { left, right, .. } => 1 + usize::max(left.depth(),right.depth())
        }
    }
    /// sum of the weights of all leaves, should always equal `weight()`
    pub fn leaf_weight(&self) -> u64 {
        match self {
            Node::Leaf { weight, .. } => *weight,
            Node::Internal { left, right, .. } => left.leaf_weight() + right.leaf_weight()
        }
    }
}

#[test]
fn tie_break() {
    let freq = super::frequency::count("aaabbc".as_bytes()).expect("count failed");
    let root = Node::build(&freq).expect("build failed");
    // c and b merge first (c is lighter so it goes left), then a ties with that node
    // and wins on sequence number
    let expected = Node::Internal {
        weight: 6,
        left: Box::new(Node::Leaf { symbol: b'a', weight: 3 }),
        right: Box::new(Node::Internal {
            weight: 3,
            left: Box::new(Node::Leaf { symbol: b'c', weight: 1 }),
            right: Box::new(Node::Leaf { symbol: b'b', weight: 2 })
        })
    };
    assert_eq!(root,expected);
}

#[test]
fn single_symbol() {
    let freq = super::frequency::count("aaaa".as_bytes()).expect("count failed");
    let root = Node::build(&freq).expect("build failed");
    assert_eq!(root,Node::Leaf { symbol: b'a', weight: 4 });
    assert_eq!(root.depth(),0);
}

#[test]
fn weights_are_conserved() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let freq = super::frequency::count(test_data).expect("count failed");
    let root = Node::build(&freq).expect("build failed");
    assert_eq!(root.weight(),test_data.len() as u64);
    assert_eq!(root.leaf_weight(),test_data.len() as u64);
    assert_eq!(root.leaf_count(),freq.len());
}

#[test]
fn reproducible() {
    let test_data = "abcdefgh abcdefgh abcd ab a".as_bytes();
    let freq = super::frequency::count(test_data).expect("count failed");
    let t1 = Node::build(&freq).expect("build failed");
    let t2 = Node::build(&freq.clone()).expect("build failed");
    assert_eq!(t1,t2);
}

#[test]
fn empty_map() {
    assert!(matches!(Node::build(&BTreeMap::new()),Err(Error::EmptyInput)));
}
