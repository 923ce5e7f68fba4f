//! Symbol frequency counting, the first stage of compression.

use std::collections::BTreeMap;
use crate::Error;

/// Count occurrences of each byte in `dat`.
/// The map is ordered by symbol, which fixes the order leaves enter the tree.
pub fn count(dat: &[u8]) -> Result<BTreeMap<u8,u64>,Error> {
    if dat.len()==0 {
        log::error!("cannot build a code from empty input");
        return Err(Error::EmptyInput);
    }
    let mut ans = BTreeMap::new();
    for sym in dat {
        *ans.entry(*sym).or_insert(0) += 1;
    }
    log::debug!("{} distinct symbols in {} bytes",ans.len(),dat.len());
    Ok(ans)
}

/// Sum of all counts, equals the length of the input that was counted.
pub fn total(freq: &BTreeMap<u8,u64>) -> u64 {
    freq.values().sum()
}

#[test]
fn counting_works() {
    let freq = count("aaabbc".as_bytes()).expect("count failed");
    assert_eq!(freq.len(),3);
    assert_eq!(freq[&b'a'],3);
    assert_eq!(freq[&b'b'],2);
    assert_eq!(freq[&b'c'],1);
    assert_eq!(total(&freq),6);
}

#[test]
fn empty_input() {
    assert!(matches!(count(&[]),Err(Error::EmptyInput)));
}
