//! Code table derived from the Huffman tree.
//!
//! Codes are stored as `BitVec` in the order they are emitted, so the first
//! element is the bit nearest the root.

use bit_vec::BitVec;
use std::collections::{BTreeMap,HashMap};
use super::huff_tree::Node;
use crate::Error;

/// Prefix-free map from symbols to codes.
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct CodeTable {
    codes: BTreeMap<u8,BitVec>
}

/// Depth first walk, left appends 0, right appends 1.
fn gather_codes(node: &Node,path: BitVec,table: &mut BTreeMap<u8,BitVec>) {
    match node {
        Node::Leaf { symbol, .. } => {
            table.insert(*symbol,path);
        },
        Node::Internal { left, right, .. } => {
            let mut left_path = path.clone();
            left_path.push(false);
            gather_codes(left,left_path,table);
            let mut right_path = path;
            right_path.push(true);
            gather_codes(right,right_path,table);
        }
    }
}

/// true if `short` is a prefix of `long`, or equal to it
fn starts_with(long: &BitVec,short: &BitVec) -> bool {
    short.len() <= long.len() && short.iter().zip(long.iter()).all(|(a,b)| a==b)
}

impl CodeTable {
    /// Walk the tree and collect the path to each leaf.
    /// A tree that is a lone leaf gets the code `0`.
    pub fn from_tree(root: &Node) -> Self {
        let mut codes = BTreeMap::new();
        match root {
            Node::Leaf { symbol, .. } => {
                codes.insert(*symbol,BitVec::from_elem(1,false));
            },
            Node::Internal { .. } => gather_codes(root,BitVec::new(),&mut codes)
        }
        log::debug!("code table has {} entries",codes.len());
        Self { codes }
    }
    /// Build a table from stored entries, as when reading a container.
    /// Rejects empty tables, duplicate symbols, empty codes, or codes that are not prefix-free.
    pub fn from_entries(entries: Vec<(u8,BitVec)>) -> Result<Self,Error> {
        if entries.len()==0 {
            log::error!("code table has no entries");
            return Err(Error::CorruptContainer);
        }
        let mut codes = BTreeMap::new();
        for (symbol,code) in entries {
            if code.len()==0 {
                log::error!("symbol {} has an empty code",symbol);
                return Err(Error::CorruptContainer);
            }
            if codes.insert(symbol,code).is_some() {
                log::error!("symbol {} appears more than once",symbol);
                return Err(Error::CorruptContainer);
            }
        }
        let ans = Self { codes };
        if !ans.is_prefix_free() {
            log::error!("code table is not prefix-free");
            return Err(Error::CorruptContainer);
        }
        Ok(ans)
    }
    pub fn get(&self,symbol: u8) -> Option<&BitVec> {
        self.codes.get(&symbol)
    }
    pub fn len(&self) -> usize {
        self.codes.len()
    }
    /// iterate over (symbol,code) in ascending symbol order
    pub fn iter(&self) -> impl Iterator<Item = (&u8,&BitVec)> {
        self.codes.iter()
    }
    pub fn max_code_len(&self) -> usize {
        self.codes.values().map(|c| c.len()).max().unwrap_or(0)
    }
    /// View used for decoding, maps code to symbol
    pub fn reversed(&self) -> HashMap<BitVec,u8> {
        self.codes.iter().map(|(s,c)| (c.clone(),*s)).collect()
    }
    /// No code is a prefix of another code.
    pub fn is_prefix_free(&self) -> bool {
        for (s1,c1) in &self.codes {
            for (s2,c2) in &self.codes {
                if s1!=s2 && starts_with(c2,c1) {
                    return false;
                }
            }
        }
        true
    }
    /// Exact number of bits the encoder will produce for these frequencies, before padding.
    /// Returns None if a symbol is missing from the table.
    pub fn encoded_bits(&self,freq: &BTreeMap<u8,u64>) -> Option<u64> {
        let mut ans = 0;
        for (symbol,count) in freq {
            ans += self.codes.get(symbol)?.len() as u64 * count;
        }
        Some(ans)
    }
}

#[cfg(test)]
fn code_str(table: &CodeTable,sym: u8) -> String {
    table.get(sym).unwrap().iter().map(|b| if b {'1'} else {'0'}).collect()
}

#[test]
fn example_codes() {
    let freq = super::frequency::count("aaabbc".as_bytes()).expect("count failed");
    let table = CodeTable::from_tree(&Node::build(&freq).expect("build failed"));
    assert_eq!(table.len(),3);
    assert_eq!(code_str(&table,b'a'),"0");
    assert_eq!(code_str(&table,b'b'),"11");
    assert_eq!(code_str(&table,b'c'),"10");
    assert_eq!(table.encoded_bits(&freq),Some(9));
    assert_eq!(table.max_code_len(),2);
}

#[test]
fn single_symbol_code() {
    let freq = super::frequency::count("aaaa".as_bytes()).expect("count failed");
    let table = CodeTable::from_tree(&Node::build(&freq).expect("build failed"));
    assert_eq!(table.len(),1);
    assert_eq!(code_str(&table,b'a'),"0");
}

#[test]
fn prefix_free() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let freq = super::frequency::count(test_data).expect("count failed");
    let table = CodeTable::from_tree(&Node::build(&freq).expect("build failed"));
    assert_eq!(table.len(),freq.len());
    assert!(table.is_prefix_free());
    assert_eq!(table.reversed().len(),table.len());
}

#[test]
fn skewed_codes() {
    // fibonacci weights give a maximally deep tree
    let mut dat = Vec::new();
    let fib = [1,1,2,3,5,8,13,21,34,55];
    for (i,n) in fib.iter().enumerate() {
        dat.append(&mut vec![b'a' + i as u8;*n]);
    }
    let freq = super::frequency::count(&dat).expect("count failed");
    let table = CodeTable::from_tree(&Node::build(&freq).expect("build failed"));
    assert_eq!(table.max_code_len(),9);
    assert!(table.is_prefix_free());
}

#[test]
fn bad_entries() {
    let mut zero = BitVec::new();
    zero.push(false);
    let mut zero_one = BitVec::new();
    zero_one.push(false);
    zero_one.push(true);
    assert!(matches!(CodeTable::from_entries(vec![]),Err(Error::CorruptContainer)));
    assert!(matches!(CodeTable::from_entries(vec![(1,BitVec::new())]),Err(Error::CorruptContainer)));
    assert!(matches!(CodeTable::from_entries(vec![(1,zero.clone()),(1,zero_one.clone())]),Err(Error::CorruptContainer)));
    assert!(matches!(CodeTable::from_entries(vec![(1,zero.clone()),(2,zero_one.clone())]),Err(Error::CorruptContainer)));
    assert!(CodeTable::from_entries(vec![(1,zero)]).is_ok());
}
