//! Components of the static Huffman coder, leaf-first:
//! frequency counting, tree construction, and code table generation.

pub mod frequency;
pub mod huff_tree;
pub mod code_table;
