/* Copyright (C) 2026 Open Information Security Foundation
 *
 * You can copy, redistribute or modify this Program under the terms of
 * the GNU General Public License version 2 as published by the Free
 * Software Foundation.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * version 2 along with this program; if not, write to the Free Software
 * Foundation, Inc., 51 Franklin Street, Fifth Floor, Boston, MA
 * 02110-1301, USA.
 */

//! Descriptor driven XDR decoder.
//!
//! Primitive reads are nom streaming parsers, so running out of input is
//! always reported as `TruncatedData` and never confused with a
//! structural problem.

use nom7::bytes::streaming::take;
use nom7::number::streaming::{be_i32, be_i64, be_u32, be_u64};
use nom7::{Err, IResult, Needed};

use crate::error::{DecodeError, ErrorKind};
use crate::registry::{registry, Stability};
use crate::xdr::chunks::{ChunkData, ChunkMap};
use crate::xdr::types::{EnumRef, Length, UnionType, XdrType};
use crate::xdr::value::{Record, XdrValue};

#[derive(Clone, Copy, Debug)]
enum PathSeg {
    Name(&'static str),
    Index(usize),
}

pub struct XdrDecoder<'a> {
    input: &'a [u8],
    offset: usize,
    path: Vec<PathSeg>,
    strict_enums: bool,
    chunks: Option<&'a ChunkMap>,
    use_writes: bool,
    next_write: usize,
    /// Bytes spliced in from read chunks so far. Inline offset plus this
    /// is the position in the reconstructed stream.
    spliced: usize,
}

impl<'a> XdrDecoder<'a> {
    pub fn new(input: &'a [u8]) -> XdrDecoder<'a> {
        XdrDecoder::at(input, 0)
    }

    pub fn at(input: &'a [u8], offset: usize) -> XdrDecoder<'a> {
        XdrDecoder {
            input,
            offset: offset.min(input.len()),
            path: Vec::new(),
            strict_enums: false,
            chunks: None,
            use_writes: false,
            next_write: 0,
            spliced: 0,
        }
    }

    /// Fail with `UnknownEnumValue` instead of tagging unknown codes.
    pub fn strict_enums(mut self, strict: bool) -> XdrDecoder<'a> {
        self.strict_enums = strict;
        self
    }

    /// Resolve out-of-line data through `chunks`. Write chunks are only
    /// consumed when `use_writes` is set, i.e. when decoding a reply.
    pub fn with_chunks(mut self, chunks: &'a ChunkMap, use_writes: bool) -> XdrDecoder<'a> {
        self.chunks = Some(chunks);
        self.use_writes = use_writes;
        self
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> &'a [u8] {
        &self.input[self.offset..]
    }

    pub fn is_empty(&self) -> bool {
        self.offset >= self.input.len()
    }

    /// Write chunks consumed so far.
    pub fn writes_consumed(&self) -> usize {
        self.next_write
    }

    fn path_string(&self) -> String {
        let mut s = String::new();
        for seg in &self.path {
            if !s.is_empty() {
                s.push('.');
            }
            match seg {
                PathSeg::Name(n) => s.push_str(n),
                PathSeg::Index(i) => s.push_str(&i.to_string()),
            }
        }
        s
    }

    pub fn error(&self, kind: ErrorKind) -> DecodeError {
        self.error_at(kind, self.offset)
    }

    fn error_at(&self, kind: ErrorKind, offset: usize) -> DecodeError {
        DecodeError::new(kind, self.path_string(), offset)
    }

    fn run<O, F>(&mut self, mut parser: F) -> Result<O, DecodeError>
        where F: FnMut(&'a [u8]) -> IResult<&'a [u8], O>
    {
        let input = &self.input[self.offset..];
        match parser(input) {
            Ok((rem, out)) => {
                self.offset = self.input.len() - rem.len();
                Ok(out)
            }
            Err(Err::Incomplete(Needed::Size(n))) => {
                Err(self.error(ErrorKind::TruncatedData { needed: n.get() }))
            }
            Err(Err::Incomplete(Needed::Unknown)) => {
                Err(self.error(ErrorKind::TruncatedData { needed: 1 }))
            }
            Err(_) => Err(self.error(ErrorKind::MalformedEncoding("unparseable input"))),
        }
    }

    fn nested<T, F>(&mut self, seg: PathSeg, f: F) -> Result<T, DecodeError>
        where F: FnOnce(&mut XdrDecoder<'a>) -> Result<T, DecodeError>
    {
        self.path.push(seg);
        let r = f(self);
        self.path.pop();
        r
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        self.run(be_u32)
    }

    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        self.run(be_i32)
    }

    pub fn read_u64(&mut self) -> Result<u64, DecodeError> {
        self.run(be_u64)
    }

    pub fn read_i64(&mut self) -> Result<i64, DecodeError> {
        self.run(be_i64)
    }

    pub fn read_bool(&mut self) -> Result<bool, DecodeError> {
        let start = self.offset;
        match self.read_u32()? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(self.error_at(ErrorKind::MalformedEncoding("boolean is not 0 or 1"), start)),
        }
    }

    fn read_padding(&mut self, len: usize) -> Result<(), DecodeError> {
        let pad = (4 - (len & 3)) & 3;
        if pad == 0 {
            return Ok(());
        }
        let start = self.offset;
        let bytes = self.run(take(pad))?;
        if bytes.iter().any(|&b| b != 0) {
            return Err(self.error_at(ErrorKind::MalformedEncoding("non-zero padding"), start));
        }
        Ok(())
    }

    /// Length prefix of variable length data, checked against `max`.
    pub fn read_length(&mut self, max: Option<u32>) -> Result<u32, DecodeError> {
        let start = self.offset;
        let length = self.read_u32()?;
        if let Some(max) = max {
            if length > max {
                return Err(self.error_at(ErrorKind::LengthExceeded { length, max }, start));
            }
        }
        Ok(length)
    }

    pub fn read_opaque_fixed(&mut self, size: u32) -> Result<&'a [u8], DecodeError> {
        let data = self.run(take(size as usize))?;
        self.read_padding(size as usize)?;
        Ok(data)
    }

    pub fn read_opaque(&mut self, max: Option<u32>) -> Result<&'a [u8], DecodeError> {
        let len = self.read_length(max)?;
        self.read_opaque_fixed(len)
    }

    pub fn decode(&mut self, ty: &XdrType) -> Result<XdrValue, DecodeError> {
        match ty {
            XdrType::Void => Ok(XdrValue::Void),
            XdrType::Int => Ok(XdrValue::Int(self.read_i32()?)),
            XdrType::UInt => Ok(XdrValue::UInt(self.read_u32()?)),
            XdrType::Hyper => Ok(XdrValue::Hyper(self.read_i64()?)),
            XdrType::UHyper => Ok(XdrValue::UHyper(self.read_u64()?)),
            XdrType::Bool => Ok(XdrValue::Bool(self.read_bool()?)),
            XdrType::Enum(r) => self.decode_enum(r),
            XdrType::Opaque { len: Length::Fixed(n), .. } => {
                Ok(XdrValue::Opaque(self.read_opaque_fixed(*n)?.to_vec()))
            }
            XdrType::Opaque { len: Length::Variable(max), ddp } => {
                self.decode_variable(*max, *ddp, false)
            }
            XdrType::String { max, ddp } => self.decode_variable(*max, *ddp, true),
            XdrType::Array { elem, len } => {
                let count = match len {
                    Length::Fixed(n) => *n,
                    Length::Variable(max) => self.read_length(*max)?,
                };
                self.check_room(count, elem)?;
                let mut items = Vec::with_capacity((count as usize).min(1024));
                for i in 0..count as usize {
                    items.push(self.nested(PathSeg::Index(i), |d| d.decode(elem))?);
                }
                Ok(XdrValue::Array(items))
            }
            XdrType::List(elem) => {
                let mut items = Vec::new();
                loop {
                    let start = self.offset;
                    match self.read_u32()? {
                        0 => break,
                        1 => {
                            let i = items.len();
                            items.push(self.nested(PathSeg::Index(i), |d| d.decode(elem))?);
                        }
                        _ => {
                            return Err(self.error_at(
                                ErrorKind::MalformedEncoding("optional-data flag is not 0 or 1"),
                                start));
                        }
                    }
                }
                Ok(XdrValue::Array(items))
            }
            XdrType::Optional(inner) => {
                let start = self.offset;
                match self.read_u32()? {
                    0 => Ok(XdrValue::Optional(None)),
                    1 => Ok(XdrValue::some(self.decode(inner)?)),
                    _ => Err(self.error_at(
                        ErrorKind::MalformedEncoding("optional-data flag is not 0 or 1"), start)),
                }
            }
            XdrType::Struct(fields) => {
                let mut record = Record::with_capacity(fields.len());
                for f in fields {
                    let v = self.nested(PathSeg::Name(f.name), |d| d.decode(&f.ty))?;
                    record.push(f.name, v);
                }
                Ok(XdrValue::Struct(record))
            }
            XdrType::Union(u) => self.decode_union(u),
        }
    }

    fn check_room(&self, count: u32, elem: &XdrType) -> Result<(), DecodeError> {
        let need = (count as usize).saturating_mul(elem.min_size());
        let avail = self.input.len() - self.offset;
        if need > avail {
            return Err(self.error(ErrorKind::TruncatedData { needed: need - avail }));
        }
        Ok(())
    }

    fn decode_enum(&mut self, r: &EnumRef) -> Result<XdrValue, DecodeError> {
        let start = self.offset;
        let value = self.read_i32()?;
        match registry().entry(r.protocol, r.table, value) {
            Some(entry) => {
                if r.fixed && entry.stability == Stability::NotToBeUsed {
                    return Err(self.error_at(ErrorKind::ProtocolViolation(
                        format!("{} {} is not to be used", r.table, entry.name)), start));
                }
                Ok(XdrValue::enumeration(value, Some(entry.name)))
            }
            None if r.fixed => Err(self.error_at(ErrorKind::ProtocolViolation(
                format!("{} value {} is not one of the values fixed for all versions",
                        r.table, value)), start)),
            None if self.strict_enums => {
                Err(self.error_at(ErrorKind::UnknownEnumValue { table: r.table, value }, start))
            }
            None => {
                SCLogDebug!("unknown {} value {} at offset {}", r.table, value, start);
                Ok(XdrValue::enumeration(value, None))
            }
        }
    }

    fn decode_union(&mut self, u: &UnionType) -> Result<XdrValue, DecodeError> {
        let start = self.offset;
        let discriminant = self.decode(&u.discriminant)?;
        let key: i64 = match &discriminant {
            XdrValue::Int(v) => *v as i64,
            XdrValue::UInt(v) => *v as i64,
            XdrValue::Enum(e) => e.value as i64,
            XdrValue::Bool(b) => *b as i64,
            _ => return Err(self.error_at(
                ErrorKind::ShapeMismatch("union discriminant must be int, unsigned int, bool or enum"),
                start)),
        };
        let arm = match u.find(key) {
            Some(arm) => arm,
            None => return Err(self.error_at(ErrorKind::UnknownUnionArm(key), start)),
        };
        let value = self.nested(PathSeg::Name(arm.name), |d| d.decode(&arm.ty))?;
        Ok(XdrValue::union(discriminant, arm.name, value))
    }

    fn decode_variable(&mut self, max: Option<u32>, ddp: bool, is_string: bool)
        -> Result<XdrValue, DecodeError>
    {
        let len = self.read_length(max)?;
        if let Some(v) = self.take_chunk(len, ddp, is_string)? {
            return Ok(v);
        }
        let data = self.read_opaque_fixed(len)?.to_vec();
        if is_string {
            Ok(XdrValue::String(data))
        } else {
            Ok(XdrValue::Opaque(data))
        }
    }

    /// Data for a variable length item that was moved out of the inline
    /// stream, if any.
    fn take_chunk(&mut self, len: u32, ddp: bool, is_string: bool)
        -> Result<Option<XdrValue>, DecodeError>
    {
        let chunks = match self.chunks {
            Some(chunks) => chunks,
            None => return Ok(None),
        };
        let position = self.offset + self.spliced;
        let padded = ((len as usize) + 3) & !3;
        if let Some(chunk) = chunks.read_at(position) {
            let clen = chunk.reference.length as usize;
            if clen < len as usize || clen > padded {
                return Err(self.error(ErrorKind::ProtocolViolation(format!(
                    "read chunk at position {} carries {} bytes for a {} byte item",
                    position, clen, len))));
            }
            SCLogDebug!("read chunk {} spliced at position {}", chunk.reference.index, position);
            self.spliced += padded;
            return Ok(Some(chunk_value(chunk, len, is_string)));
        }
        if ddp && self.use_writes && self.next_write < chunks.writes.len() {
            let chunk = &chunks.writes[self.next_write];
            if (chunk.reference.length as usize) < len as usize {
                return Err(self.error(ErrorKind::ProtocolViolation(format!(
                    "write chunk {} holds {} bytes for a {} byte item",
                    chunk.reference.index, chunk.reference.length, len))));
            }
            self.next_write += 1;
            return Ok(Some(chunk_value(chunk, len, is_string)));
        }
        Ok(None)
    }
}

fn chunk_value(chunk: &ChunkData, len: u32, is_string: bool) -> XdrValue {
    match &chunk.data {
        Some(data) => {
            let n = (len as usize).min(data.len());
            let bytes = data[..n].to_vec();
            if is_string {
                XdrValue::String(bytes)
            } else {
                XdrValue::Opaque(bytes)
            }
        }
        None => XdrValue::Unresolved(chunk.reference.clone()),
    }
}

/// Decode one value of type `ty` starting at `offset`. Returns the value
/// and the offset just past it.
pub fn decode(input: &[u8], offset: usize, ty: &XdrType) -> Result<(XdrValue, usize), DecodeError> {
    let mut decoder = XdrDecoder::at(input, offset);
    let value = decoder.decode(ty)?;
    Ok((value, decoder.offset()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Protocol;
    use crate::xdr::chunks::{ChunkKind, ChunkRef};
    use crate::xdr::types::*;
    use test_case::test_case;

    fn lock_like() -> XdrType {
        structure(vec![
            field("caller_name", string(Some(1024))),
            field("fh", opaque(Some(1024))),
            field("svid", int()),
            field("l_offset", uhyper()),
        ])
    }

    #[test]
    fn test_decode_struct() {
        let buf: &[u8] = &[
            0x00, 0x00, 0x00, 0x05, // caller_name len
            b'h', b'o', b's', b't', b'a', 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x02, // fh len
            0xab, 0xcd, 0x00, 0x00,
            0xff, 0xff, 0xff, 0xfe, // svid
            0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x10, // l_offset
        ];
        let (v, off) = decode(buf, 0, &lock_like()).unwrap();
        assert_eq!(off, buf.len());
        assert_eq!(v.path("caller_name").unwrap().as_bytes(), Some(&b"hosta"[..]));
        assert_eq!(v.path("fh").unwrap().as_bytes(), Some(&[0xab, 0xcd][..]));
        assert_eq!(v.path("svid"), Some(&XdrValue::Int(-2)));
        assert_eq!(v.path("l_offset").unwrap().as_u64(), Some(0x1_0000_0010));
    }

    #[test]
    fn test_truncated_is_distinguishable() {
        let buf: &[u8] = &[
            0x00, 0x00, 0x00, 0x05,
            b'h', b'o', b's',
        ];
        let err = decode(buf, 0, &lock_like()).unwrap_err();
        assert!(err.is_truncated());
        assert_eq!(err.path, "caller_name");
        assert_eq!(err.kind, ErrorKind::TruncatedData { needed: 2 });
    }

    #[test]
    fn test_truncated_in_padding() {
        let buf: &[u8] = &[0x00, 0x00, 0x00, 0x01, 0x61, 0x00];
        let err = decode(buf, 0, &string(None)).unwrap_err();
        assert!(err.is_truncated());
    }

    #[test]
    fn test_nonzero_padding() {
        let buf: &[u8] = &[0x00, 0x00, 0x00, 0x01, 0x61, 0x00, 0x01, 0x00];
        let err = decode(buf, 0, &opaque(None)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedEncoding("non-zero padding"));
        assert_eq!(err.offset, 5);
    }

    #[test]
    fn test_length_exceeded() {
        let buf: &[u8] = &[0x00, 0x00, 0x04, 0x01];
        let err = decode(buf, 0, &opaque(Some(1024))).unwrap_err();
        assert_eq!(err.kind, ErrorKind::LengthExceeded { length: 1025, max: 1024 });
        assert_eq!(err.offset, 0);
    }

    #[test_case(&[0, 0, 0, 0], Some(false) ; "false")]
    #[test_case(&[0, 0, 0, 1], Some(true) ; "true")]
    #[test_case(&[0, 0, 0, 2], None ; "two is malformed")]
    fn test_bool(buf: &[u8], expected: Option<bool>) {
        let r = decode(buf, 0, &boolean());
        match expected {
            Some(b) => assert_eq!(r.unwrap().0, XdrValue::Bool(b)),
            None => assert!(matches!(r.unwrap_err().kind, ErrorKind::MalformedEncoding(_))),
        }
    }

    #[test]
    fn test_union_arms() {
        let t = union(int())
            .arm(0, "ok", uint())
            .arm(1, "nothing", void())
            .build();
        let (v, _) = decode(&[0, 0, 0, 0, 0, 0, 0, 7], 0, &t).unwrap();
        assert_eq!(v.as_union().unwrap().arm, "ok");
        assert_eq!(v.path("ok"), Some(&XdrValue::UInt(7)));

        let err = decode(&[0, 0, 0, 9], 0, &t).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownUnionArm(9));

        let t = union(int()).arm(0, "ok", uint()).default_arm("other", void()).build();
        let (v, _) = decode(&[0, 0, 0, 9], 0, &t).unwrap();
        assert_eq!(v.as_union().unwrap().arm, "other");
    }

    #[test]
    fn test_enum_tolerance() {
        let t = enumeration(Protocol::Nlm4, "nlm4_stats");
        let (v, _) = decode(&[0, 0, 0, 3], 0, &t).unwrap();
        assert_eq!(v.as_enum().unwrap().label(), "NLM4_BLOCKED");
        let (v, _) = decode(&[0, 0, 0, 77], 0, &t).unwrap();
        assert_eq!(v.as_enum().unwrap().label(), "UNKNOWN(77)");

        let mut d = XdrDecoder::new(&[0, 0, 0, 77]).strict_enums(true);
        let err = d.decode(&t).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownEnumValue { table: "nlm4_stats", value: 77 });
    }

    #[test_case(0, true ; "rdma_msg")]
    #[test_case(2, false ; "rdma_msgp not to be used")]
    #[test_case(3, false ; "rdma_done not to be used")]
    #[test_case(99, false ; "invalid code")]
    fn test_fixed_enum(code: u8, ok: bool) {
        let t = fixed_enumeration(Protocol::RpcOrdma, "rdma_proc");
        let r = decode(&[0, 0, 0, code], 0, &t);
        if ok {
            assert!(r.is_ok());
        } else {
            assert!(r.unwrap_err().is_protocol_violation());
        }
    }

    #[test]
    fn test_list_and_optional() {
        let t = structure(vec![
            field("items", list(uint())),
            field("maybe", optional(uint())),
        ]);
        let buf: &[u8] = &[
            0, 0, 0, 1, 0, 0, 0, 10,
            0, 0, 0, 1, 0, 0, 0, 11,
            0, 0, 0, 0,
            0, 0, 0, 0,
        ];
        let (v, _) = decode(buf, 0, &t).unwrap();
        assert_eq!(v.path("items"),
                   Some(&XdrValue::Array(vec![XdrValue::UInt(10), XdrValue::UInt(11)])));
        assert_eq!(v.path("maybe"), Some(&XdrValue::Optional(None)));

        let err = decode(&[0, 0, 0, 2], 0, &optional(uint())).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MalformedEncoding(_)));
    }

    #[test]
    fn test_array_count_guard() {
        let t = array(uint(), None);
        let err = decode(&[0x10, 0, 0, 0], 0, &t).unwrap_err();
        assert!(err.is_truncated());
        let t = array(uint(), Some(16));
        let err = decode(&[0, 0, 0, 17], 0, &t).unwrap_err();
        assert_eq!(err.kind, ErrorKind::LengthExceeded { length: 17, max: 16 });
    }

    #[test]
    fn test_error_path() {
        let t = structure(vec![
            field("entries", array(structure(vec![field("fh", opaque(Some(4)))]), None)),
        ]);
        let buf: &[u8] = &[
            0, 0, 0, 2,
            0, 0, 0, 1, 0xaa, 0, 0, 0,
            0, 0, 0, 8,
        ];
        let err = decode(buf, 0, &t).unwrap_err();
        assert_eq!(err.path, "entries.1.fh");
        assert_eq!(err.offset, 12);
    }

    fn read_chunk(position: u32, length: u32, data: Option<Vec<u8>>) -> ChunkData {
        ChunkData {
            reference: ChunkRef {
                kind: ChunkKind::Read,
                index: 0,
                position,
                length,
                handles: vec![0x1234],
            },
            data,
        }
    }

    #[test]
    fn test_read_chunk_splice() {
        // offset, data<> moved to a read chunk, then a trailing word
        let t = structure(vec![
            field("offset", uint()),
            field("data", opaque(None).ddp()),
            field("tail", uint()),
        ]);
        let buf: &[u8] = &[
            0, 0, 0, 1,
            0, 0, 0, 6,
            0, 0, 0, 9,
        ];
        let mut map = ChunkMap::new();
        map.reads.push(read_chunk(8, 6, Some(vec![1, 2, 3, 4, 5, 6])));
        let mut d = XdrDecoder::new(buf).with_chunks(&map, false);
        let v = d.decode(&t).unwrap();
        assert_eq!(v.path("data").unwrap().as_bytes(), Some(&[1, 2, 3, 4, 5, 6][..]));
        assert_eq!(v.path("tail"), Some(&XdrValue::UInt(9)));

        let mut map = ChunkMap::new();
        map.reads.push(read_chunk(8, 8, None));
        let mut d = XdrDecoder::new(buf).with_chunks(&map, false);
        let v = d.decode(&t).unwrap();
        assert!(v.path("data").unwrap().is_unresolved());
        assert_eq!(v.unresolved().len(), 1);
        assert_eq!(v.path("tail"), Some(&XdrValue::UInt(9)));
    }

    #[test]
    fn test_read_chunk_length_mismatch() {
        let buf: &[u8] = &[0, 0, 0, 6];
        let mut map = ChunkMap::new();
        map.reads.push(read_chunk(4, 2, None));
        let mut d = XdrDecoder::new(buf).with_chunks(&map, false);
        assert!(d.decode(&opaque(None)).unwrap_err().is_protocol_violation());
    }

    #[test]
    fn test_write_chunk_only_for_ddp_in_replies() {
        let t = structure(vec![
            field("count", uint()),
            field("data", opaque(None).ddp()),
        ]);
        let buf: &[u8] = &[0, 0, 0, 4, 0, 0, 0, 4];
        let mut map = ChunkMap::new();
        map.writes.push(ChunkData {
            reference: ChunkRef { kind: ChunkKind::Write, index: 0, position: 0,
                                  length: 4, handles: vec![7] },
            data: None,
        });
        let mut d = XdrDecoder::new(buf).with_chunks(&map, true);
        let v = d.decode(&t).unwrap();
        assert!(v.path("data").unwrap().is_unresolved());
        assert_eq!(d.writes_consumed(), 1);

        // a call does not consume write chunks, the data must be inline
        let mut d = XdrDecoder::new(buf).with_chunks(&map, false);
        assert!(d.decode(&t).unwrap_err().is_truncated());
    }
}
