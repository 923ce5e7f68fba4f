//! Static Huffman Compression
//!
//! The whole input is buffered, frequencies are counted, and a Huffman tree is
//! built with a reproducible tie-break (see `tools::huff_tree`).  The coded bits
//! are packed MSB first and padded with zeros to a whole byte.  The number of
//! padding bits is stored in the container, so the decoder never has to guess
//! where the data ends.

use bit_vec::BitVec;
use std::io::{Cursor,Read,Write,Seek,SeekFrom};
use crate::tools::{frequency,huff_tree::Node,code_table::CodeTable};
use crate::container::Container;
use crate::{DYNERR,Error};

/// Options controlling compression
#[derive(Clone)]
pub struct Options {
    /// starting position in the input file
    pub in_offset: u64,
    /// starting position in the output file
    pub out_offset: u64,
    /// return error if file is larger
    pub max_file_size: u64
}

pub const STD_OPTIONS: Options = Options {
    in_offset: 0,
    out_offset: 0,
    max_file_size: u32::MAX as u64/4
};

/// Packed code bits, `padding` zero bits were added at the end of the last byte.
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct Payload {
    pub bytes: Vec<u8>,
    pub padding: u8
}

/// Map each symbol through the code table and pack the bits.
pub fn encode(dat: &[u8],table: &CodeTable) -> Result<Payload,Error> {
    let mut bits = BitVec::new();
    for sym in dat {
        match table.get(*sym) {
            Some(code) => {
                for bit in code.iter() {
                    bits.push(bit);
                }
            },
            None => {
                log::error!("symbol {} has no code",sym);
                return Err(Error::SymbolNotInTable);
            }
        }
    }
    let padding = ((8 - bits.len() % 8) % 8) as u8;
    log::debug!("encoded {} symbols into {} bits, padding {}",dat.len(),bits.len(),padding);
    // bit_vec fills the last byte with zeros
    Ok(Payload {
        bytes: bits.to_bytes(),
        padding
    })
}

/// Unpack the bits, drop the padding, and match codes one bit at a time.
pub fn decode(payload: &Payload,table: &CodeTable) -> Result<Vec<u8>,Error> {
    let total_bits = payload.bytes.len() * 8;
    if payload.padding > 7 || payload.padding as usize > total_bits {
        log::error!("padding of {} bits is not possible with {} bits",payload.padding,total_bits);
        return Err(Error::CorruptPayload);
    }
    let valid_bits = total_bits - payload.padding as usize;
    let lookup = table.reversed();
    let max_len = table.max_code_len();
    let mut ans = Vec::new();
    let mut candidate = BitVec::new();
    for bit in BitVec::from_bytes(&payload.bytes).iter().take(valid_bits) {
        candidate.push(bit);
        match lookup.get(&candidate) {
            Some(sym) => {
                ans.push(*sym);
                candidate = BitVec::new();
            },
            None => {
                if candidate.len() >= max_len {
                    log::error!("no code matches {:?}",candidate);
                    return Err(Error::CorruptPayload);
                }
            }
        }
    }
    if candidate.len() > 0 {
        log::error!("data ended inside a code: {:?}",candidate);
        return Err(Error::CorruptPayload);
    }
    log::debug!("decoded {} bits into {} symbols",valid_bits,ans.len());
    Ok(ans)
}

/// Run the whole compression pipeline on a buffer, producing the container.
pub fn compress_buf(dat: &[u8]) -> Result<Container,Error> {
    let freq = frequency::count(dat)?;
    let root = Node::build(&freq)?;
    log::debug!("tree has depth {}",root.depth());
    let table = CodeTable::from_tree(&root);
    let payload = encode(dat,&table)?;
    Ok(Container::create(table,payload))
}

/// Compression ratio in percent, `(1 - compressed/original) * 100`.
/// An empty original gives 0.
pub fn ratio(original: u64,compressed: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    (1.0 - compressed as f64 / original as f64) * 100.0
}

/// read everything from `in_offset` to the end
fn read_all<R: Read + Seek>(reader: &mut R,opt: &Options) -> Result<Vec<u8>,DYNERR> {
    let mut length = reader.seek(SeekFrom::End(0))?;
    if opt.in_offset > length {
        return Err(Box::new(Error::FileFormatMismatch));
    }
    length -= opt.in_offset;
    if length > opt.max_file_size {
        log::error!("{} bytes exceeds limit of {}",length,opt.max_file_size);
        return Err(Box::new(Error::FileTooLarge));
    }
    reader.seek(SeekFrom::Start(opt.in_offset))?;
    let mut ans = Vec::new();
    reader.read_to_end(&mut ans)?;
    Ok(ans)
}

/// Main compression function.
/// `expanded_in` is an object with `Read` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<&[u8]>`.
/// `compressed_out` is an object with `Write` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<Vec<u8>>`.
/// Returns (in_size,out_size) or error.  Nothing is written if there is an error.
pub fn compress<R,W>(expanded_in: &mut R, compressed_out: &mut W, opt: &Options) -> Result<(u64,u64),DYNERR>
where R: Read + Seek, W: Write + Seek {
    let dat = read_all(expanded_in,opt)?;
    let container = compress_buf(&dat)?;
    compressed_out.seek(SeekFrom::Start(opt.out_offset))?;
    let out_size = container.write(compressed_out)?;
    compressed_out.flush()?;
    Ok((dat.len() as u64,out_size))
}

/// Main decompression function.
/// `compressed_in` is an object with `Read` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<&[u8]>`.
/// `expanded_out` is an object with `Write` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<Vec<u8>>`.
/// Returns (in_size,out_size) or error.  Nothing is written if there is an error.
pub fn expand<R,W>(compressed_in: &mut R, expanded_out: &mut W, opt: &Options) -> Result<(u64,u64),DYNERR>
where R: Read + Seek, W: Write + Seek {
    let dat = read_all(compressed_in,opt)?;
    let container = Container::from_bytes(&dat)?;
    let expanded = decode(&container.payload,&container.table)?;
    expanded_out.seek(SeekFrom::Start(opt.out_offset))?;
    expanded_out.write_all(&expanded)?;
    expanded_out.flush()?;
    Ok((dat.len() as u64,expanded.len() as u64))
}

/// Convenience function, calls `compress` with a slice returning a Vec
pub fn compress_slice(slice: &[u8],opt: &Options) -> Result<Vec<u8>,DYNERR> {
    let mut src = Cursor::new(slice);
    let mut ans: Cursor<Vec<u8>> = Cursor::new(Vec::new());
    compress(&mut src,&mut ans,opt)?;
    Ok(ans.into_inner())
}

/// Convenience function, calls `expand` with a slice returning a Vec
pub fn expand_slice(slice: &[u8],opt: &Options) -> Result<Vec<u8>,DYNERR> {
    let mut src = Cursor::new(slice);
    let mut ans: Cursor<Vec<u8>> = Cursor::new(Vec::new());
    expand(&mut src,&mut ans,opt)?;
    Ok(ans.into_inner())
}


// *************** TESTS *****************

#[test]
fn compression_works() {
    // a=0, c=10, b=11 gives 000 11 11 10 plus 7 bits of padding
    let test_data = "aaabbc".as_bytes();
    let huf_str = "48 55 46 01 03 00 61 01 00 62 02 C0 63 02 80 07 02 00 00 00 00 00 00 00 1F 00";
    let compressed = compress_slice(test_data,&STD_OPTIONS).expect("compression failed");
    assert_eq!(compressed,hex::decode(huf_str.replace(" ","")).unwrap());
}

#[test]
fn encoding_works() {
    let container = compress_buf("aaabbc".as_bytes()).expect("compression failed");
    assert_eq!(container.payload.bytes,vec![0x1f,0x00]);
    assert_eq!(container.payload.padding,7);
    assert_eq!(decode(&container.payload,&container.table).expect("decode failed"),"aaabbc".as_bytes().to_vec());
}

#[test]
fn invertibility() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let compressed = compress_slice(test_data,&STD_OPTIONS).expect("compression failed");
    let expanded = expand_slice(&compressed,&STD_OPTIONS).expect("expansion failed");
    assert_eq!(test_data.to_vec(),expanded);

    let test_data: Vec<u8> = (0..=255).collect();
    let compressed = compress_slice(&test_data,&STD_OPTIONS).expect("compression failed");
    let expanded = expand_slice(&compressed,&STD_OPTIONS).expect("expansion failed");
    assert_eq!(test_data,expanded);

    let test_data: Vec<u8> = (0..5000).map(|i: u32| ((i * i + 7 * i) % 37) as u8).collect();
    let compressed = compress_slice(&test_data,&STD_OPTIONS).expect("compression failed");
    let expanded = expand_slice(&compressed,&STD_OPTIONS).expect("expansion failed");
    assert_eq!(test_data,expanded);
}

#[test]
fn single_symbol() {
    let container = compress_buf("aaaa".as_bytes()).expect("compression failed");
    assert_eq!(container.table.len(),1);
    assert_eq!(container.table.get(b'a').unwrap().len(),1);
    // the 4 padding bits spell the code for `a` but must not be decoded
    assert_eq!(container.payload.bytes,vec![0x00]);
    assert_eq!(container.payload.padding,4);
    let expanded = decode(&container.payload,&container.table).expect("decode failed");
    assert_eq!(expanded,"aaaa".as_bytes().to_vec());

    let test_data = "x".as_bytes();
    let compressed = compress_slice(test_data,&STD_OPTIONS).expect("compression failed");
    let expanded = expand_slice(&compressed,&STD_OPTIONS).expect("expansion failed");
    assert_eq!(test_data.to_vec(),expanded);
}

#[test]
fn empty_input() {
    let err = compress_slice(&[],&STD_OPTIONS).expect_err("empty input was accepted");
    assert!(matches!(err.downcast_ref::<Error>(),Some(Error::EmptyInput)));
}

#[test]
fn deterministic() {
    let test_data = "the quick brown fox jumps over the lazy dog".as_bytes();
    let c1 = compress_slice(test_data,&STD_OPTIONS).expect("compression failed");
    let c2 = compress_slice(test_data,&STD_OPTIONS).expect("compression failed");
    assert_eq!(c1,c2);
}

#[test]
fn corrupt_payload() {
    let container = compress_buf("aaabbc".as_bytes()).expect("compression failed");
    // 000 11 11 1 ends inside the code for c
    let short = Payload { bytes: vec![0x1f], padding: 0 };
    assert!(matches!(decode(&short,&container.table),Err(Error::CorruptPayload)));
    // one padding bit too few leaves 000 11 11 10 0, which is valid and gains an `a`
    let extra = Payload { bytes: vec![0x1f,0x00], padding: 6 };
    assert_eq!(decode(&extra,&container.table).expect("decode failed"),"aaabbca".as_bytes().to_vec());
    let bad_padding = Payload { bytes: vec![0x1f], padding: 9 };
    assert!(matches!(decode(&bad_padding,&container.table),Err(Error::CorruptPayload)));
    // a table that cannot match a run of ones
    let mut zero = BitVec::new();
    zero.push(false);
    let mut one_zero = BitVec::new();
    one_zero.push(true);
    one_zero.push(false);
    let table = CodeTable::from_entries(vec![(b'a',zero),(b'c',one_zero)]).expect("bad table");
    let ones = Payload { bytes: vec![0xff], padding: 0 };
    assert!(matches!(decode(&ones,&table),Err(Error::CorruptPayload)));
}

#[test]
fn missing_symbol() {
    let container = compress_buf("aaabbc".as_bytes()).expect("compression failed");
    assert!(matches!(encode("abcd".as_bytes(),&container.table),Err(Error::SymbolNotInTable)));
}

#[test]
fn offsets() {
    let test_data = "HDR0I am Sam. Sam I am.".as_bytes();
    let mut opt = STD_OPTIONS;
    opt.in_offset = 4;
    opt.out_offset = 2;
    let mut src = Cursor::new(test_data);
    let mut dst: Cursor<Vec<u8>> = Cursor::new(vec![0xaa,0xbb]);
    let (in_size,out_size) = compress(&mut src,&mut dst,&opt).expect("compression failed");
    assert_eq!(in_size,test_data.len() as u64 - 4);
    let compressed = dst.into_inner();
    assert_eq!(compressed.len() as u64,out_size + 2);
    assert_eq!(compressed[0..2],[0xaa,0xbb]);
    opt.in_offset = 2;
    opt.out_offset = 0;
    let expanded = expand_slice(&compressed,&opt).expect("expansion failed");
    assert_eq!(expanded,test_data[4..].to_vec());
}

#[test]
fn size_limits() {
    let mut opt = STD_OPTIONS;
    opt.max_file_size = 4;
    let err = compress_slice("12345".as_bytes(),&opt).expect_err("large input was accepted");
    assert!(matches!(err.downcast_ref::<Error>(),Some(Error::FileTooLarge)));
    opt = STD_OPTIONS;
    opt.in_offset = 10;
    let err = compress_slice("12345".as_bytes(),&opt).expect_err("offset past end was accepted");
    assert!(matches!(err.downcast_ref::<Error>(),Some(Error::FileFormatMismatch)));
}

#[test]
fn ratio_works() {
    assert_eq!(ratio(200,50),75.0);
    assert_eq!(ratio(100,100),0.0);
    assert!(ratio(10,20) < 0.0);
    assert_eq!(ratio(0,26),0.0);
}
