//! Container Format
//!
//! Everything needed to decode is stored in one unit, no tree state is kept.
//! All integers are little endian.
//!
//! * 3 byte signature `HUF`
//! * 1 byte version, currently 1
//! * 2 byte count of table entries, 1 to 256
//! * table entries in ascending symbol order, each is
//!     - 1 byte symbol
//!     - 1 byte code length in bits, 1 to 255
//!     - code bits packed MSB first, padded with zeros to a whole byte
//! * 1 byte count of padding bits at the end of the payload, 0 to 7
//! * 8 byte length of the payload in bytes
//! * payload

use bit_vec::BitVec;
use std::io::{Cursor,Read,Write};
use crate::tools::code_table::CodeTable;
use crate::huff::Payload;
use crate::Error;

pub const SIGNATURE: [u8;3] = *b"HUF";
pub const VERSION: u8 = 1;

/// Code table together with the payload it encodes.
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct Container {
    pub table: CodeTable,
    pub payload: Payload
}

/// read exactly `buf.len()` bytes, any shortfall means the container is truncated
fn read_field<R: Read>(reader: &mut R,buf: &mut [u8],what: &str) -> Result<(),Error> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(()),
        Err(e) => {
            log::error!("could not read {}: {}",what,e);
            Err(Error::CorruptContainer)
        }
    }
}

impl Container {
    pub fn create(table: CodeTable,payload: Payload) -> Self {
        Self {
            table,
            payload
        }
    }
    /// Serialize to `writer`, returns the number of bytes written.
    pub fn write<W: Write>(&self,writer: &mut W) -> Result<u64,std::io::Error> {
        let mut count: u64 = 0;
        writer.write_all(&SIGNATURE)?;
        writer.write_all(&[VERSION])?;
        writer.write_all(&u16::to_le_bytes(self.table.len() as u16))?;
        count += 6;
        for (symbol,code) in self.table.iter() {
            let packed = code.to_bytes();
            writer.write_all(&[*symbol,code.len() as u8])?;
            writer.write_all(&packed)?;
            count += 2 + packed.len() as u64;
        }
        writer.write_all(&[self.payload.padding])?;
        writer.write_all(&u64::to_le_bytes(self.payload.bytes.len() as u64))?;
        writer.write_all(&self.payload.bytes)?;
        count += 9 + self.payload.bytes.len() as u64;
        log::debug!("container written with {} bytes",count);
        Ok(count)
    }
    /// Parse from `reader`, stopping right after the payload.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self,Error> {
        let mut header: [u8;6] = [0;6];
        read_field(reader,&mut header,"header")?;
        if header[0..3] != SIGNATURE {
            log::error!("signature not found");
            return Err(Error::CorruptContainer);
        }
        if header[3] != VERSION {
            log::error!("unknown container version {}",header[3]);
            return Err(Error::CorruptContainer);
        }
        let entry_count = u16::from_le_bytes([header[4],header[5]]) as usize;
        if entry_count == 0 || entry_count > 256 {
            log::error!("table cannot have {} entries",entry_count);
            return Err(Error::CorruptContainer);
        }
        let mut entries = Vec::new();
        for _i in 0..entry_count {
            let mut entry_header: [u8;2] = [0;2];
            read_field(reader,&mut entry_header,"table entry")?;
            let (symbol,code_len) = (entry_header[0],entry_header[1] as usize);
            if code_len == 0 {
                log::error!("symbol {} has zero length code",symbol);
                return Err(Error::CorruptContainer);
            }
            let mut packed = vec![0u8;(code_len + 7) / 8];
            read_field(reader,&mut packed,"code bits")?;
            let unused = packed.len() * 8 - code_len;
            if packed[packed.len()-1] & ((1u16 << unused) - 1) as u8 != 0 {
                log::error!("symbol {} has nonzero bits after its code",symbol);
                return Err(Error::CorruptContainer);
            }
            let code: BitVec = BitVec::from_bytes(&packed).iter().take(code_len).collect();
            log::trace!("symbol {} has code {:?}",symbol,code);
            entries.push((symbol,code));
        }
        let table = CodeTable::from_entries(entries)?;
        let mut trailer: [u8;9] = [0;9];
        read_field(reader,&mut trailer,"payload header")?;
        let padding = trailer[0];
        let mut len_bytes: [u8;8] = [0;8];
        len_bytes.copy_from_slice(&trailer[1..9]);
        let payload_len = u64::from_le_bytes(len_bytes);
        if padding > 7 {
            log::error!("padding of {} bits is not possible",padding);
            return Err(Error::CorruptContainer);
        }
        if payload_len == 0 {
            log::error!("payload is empty");
            return Err(Error::CorruptContainer);
        }
        // do not trust the length for allocation, read what is there and compare
        let mut bytes = Vec::new();
        if let Err(e) = reader.by_ref().take(payload_len).read_to_end(&mut bytes) {
            log::error!("could not read payload: {}",e);
            return Err(Error::CorruptContainer);
        }
        if (bytes.len() as u64) < payload_len {
            log::error!("payload truncated, expected {} bytes, got {}",payload_len,bytes.len());
            return Err(Error::CorruptContainer);
        }
        Ok(Self {
            table,
            payload: Payload { bytes, padding }
        })
    }
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut ans = Vec::new();
        // writing to a Vec cannot fail
        self.write(&mut ans).expect(crate::RCH);
        ans
    }
    /// Parse a buffer holding exactly one container, trailing bytes are an error.
    pub fn from_bytes(buf: &[u8]) -> Result<Self,Error> {
        let mut cursor = Cursor::new(buf);
        let ans = Self::read(&mut cursor)?;
        if cursor.position() != buf.len() as u64 {
            log::error!("{} unexpected bytes after payload",buf.len() as u64 - cursor.position());
            return Err(Error::CorruptContainer);
        }
        Ok(ans)
    }
}

#[cfg(test)]
const EXAMPLE: &str = "48 55 46 01 03 00 61 01 00 62 02 C0 63 02 80 07 02 00 00 00 00 00 00 00 1F 00";

#[cfg(test)]
fn example() -> Container {
    let freq = crate::tools::frequency::count("aaabbc".as_bytes()).expect("count failed");
    let root = crate::tools::huff_tree::Node::build(&freq).expect("build failed");
    let table = CodeTable::from_tree(&root);
    let payload = crate::huff::encode("aaabbc".as_bytes(),&table).expect("encode failed");
    Container::create(table,payload)
}

#[test]
fn layout() {
    let bytes = example().to_bytes();
    assert_eq!(bytes,hex::decode(EXAMPLE.replace(" ","")).unwrap());
}

#[test]
fn parse() {
    let bytes = hex::decode(EXAMPLE.replace(" ","")).unwrap();
    let container = Container::from_bytes(&bytes).expect("parse failed");
    assert_eq!(container,example());
    assert_eq!(container.payload.padding,7);
    assert_eq!(container.payload.bytes,vec![0x1f,0x00]);
}

#[test]
fn truncation() {
    let bytes = hex::decode(EXAMPLE.replace(" ","")).unwrap();
    for end in 0..bytes.len() {
        assert!(matches!(Container::from_bytes(&bytes[0..end]),Err(Error::CorruptContainer)),"accepted {} bytes",end);
    }
}

#[test]
fn malformed() {
    let good = hex::decode(EXAMPLE.replace(" ","")).unwrap();
    let mut bad_sig = good.clone();
    bad_sig[0] = b'X';
    let mut bad_version = good.clone();
    bad_version[3] = 2;
    let mut no_entries = good.clone();
    no_entries[4] = 0;
    let mut duplicate = good.clone();
    duplicate[9] = b'a';
    let mut not_prefix_free = good.clone();
    not_prefix_free[11] = 0x00; // b becomes 00, a is 0
    let mut dirty_code = good.clone();
    dirty_code[8] = 0x01; // a is 0, low 7 bits must be clear
    let mut bad_padding = good.clone();
    bad_padding[15] = 8;
    let mut trailing = good.clone();
    trailing.push(0);
    for buf in [bad_sig,bad_version,no_entries,duplicate,not_prefix_free,dirty_code,bad_padding,trailing] {
        assert!(matches!(Container::from_bytes(&buf),Err(Error::CorruptContainer)));
    }
}
