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

//! XDR encoder, the inverse of the decoder for the same descriptors.
//! Always writes zero padding. Used by tests and by tools that build
//! synthetic traffic.

use crate::error::{DecodeError, ErrorKind};
use crate::xdr::types::{Length, UnionType, XdrType};
use crate::xdr::value::XdrValue;

struct XdrEncoder {
    buf: Vec<u8>,
    path: Vec<String>,
}

impl XdrEncoder {
    fn error(&self, kind: ErrorKind) -> DecodeError {
        DecodeError::new(kind, self.path.join("."), self.buf.len())
    }

    fn mismatch(&self, what: &'static str) -> DecodeError {
        self.error(ErrorKind::ShapeMismatch(what))
    }

    fn put_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    fn put_bytes(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
        let pad = (4 - (data.len() & 3)) & 3;
        self.buf.extend_from_slice(&[0u8; 3][..pad]);
    }

    fn put_variable(&mut self, data: &[u8], max: Option<u32>) -> Result<(), DecodeError> {
        let length = data.len() as u32;
        if let Some(max) = max {
            if length > max {
                return Err(self.error(ErrorKind::LengthExceeded { length, max }));
            }
        }
        self.put_u32(length);
        self.put_bytes(data);
        Ok(())
    }

    fn nested<F>(&mut self, seg: String, f: F) -> Result<(), DecodeError>
        where F: FnOnce(&mut XdrEncoder) -> Result<(), DecodeError>
    {
        self.path.push(seg);
        let r = f(self);
        self.path.pop();
        r
    }

    fn put(&mut self, value: &XdrValue, ty: &XdrType) -> Result<(), DecodeError> {
        if let XdrValue::Unresolved(_) = value {
            return Err(self.mismatch("unresolved chunk data cannot be encoded"));
        }
        match (ty, value) {
            (XdrType::Void, XdrValue::Void) => {}
            (XdrType::Int, XdrValue::Int(v)) => self.put_u32(*v as u32),
            (XdrType::UInt, XdrValue::UInt(v)) => self.put_u32(*v),
            (XdrType::Hyper, XdrValue::Hyper(v)) => self.buf.extend_from_slice(&v.to_be_bytes()),
            (XdrType::UHyper, XdrValue::UHyper(v)) => self.buf.extend_from_slice(&v.to_be_bytes()),
            (XdrType::Bool, XdrValue::Bool(b)) => self.put_u32(*b as u32),
            (XdrType::Enum(_), XdrValue::Enum(e)) => self.put_u32(e.value as u32),
            (XdrType::Enum(_), XdrValue::Int(v)) => self.put_u32(*v as u32),
            (XdrType::Opaque { len: Length::Fixed(n), .. }, XdrValue::Opaque(data)) => {
                if data.len() != *n as usize {
                    return Err(self.mismatch("fixed opaque has the wrong size"));
                }
                self.put_bytes(data);
            }
            (XdrType::Opaque { len: Length::Variable(max), .. }, XdrValue::Opaque(data)) => {
                self.put_variable(data, *max)?;
            }
            (XdrType::String { max, .. }, XdrValue::String(data)) => {
                self.put_variable(data, *max)?;
            }
            (XdrType::Array { elem, len }, XdrValue::Array(items)) => {
                match len {
                    Length::Fixed(n) => {
                        if items.len() != *n as usize {
                            return Err(self.mismatch("fixed array has the wrong element count"));
                        }
                    }
                    Length::Variable(max) => {
                        let length = items.len() as u32;
                        if let Some(max) = max {
                            if length > *max {
                                return Err(self.error(ErrorKind::LengthExceeded { length, max: *max }));
                            }
                        }
                        self.put_u32(length);
                    }
                }
                for (i, item) in items.iter().enumerate() {
                    self.nested(i.to_string(), |e| e.put(item, elem))?;
                }
            }
            (XdrType::List(elem), XdrValue::Array(items)) => {
                for (i, item) in items.iter().enumerate() {
                    self.put_u32(1);
                    self.nested(i.to_string(), |e| e.put(item, elem))?;
                }
                self.put_u32(0);
            }
            (XdrType::Optional(_), XdrValue::Optional(None)) => self.put_u32(0),
            (XdrType::Optional(inner), XdrValue::Optional(Some(v))) => {
                self.put_u32(1);
                self.put(v, inner)?;
            }
            (XdrType::Struct(fields), XdrValue::Struct(record)) => {
                for f in fields {
                    let v = match record.get(f.name) {
                        Some(v) => v,
                        None => {
                            self.path.push(f.name.to_string());
                            let err = self.mismatch("struct field missing");
                            self.path.pop();
                            return Err(err);
                        }
                    };
                    self.nested(f.name.to_string(), |e| e.put(v, &f.ty))?;
                }
            }
            (XdrType::Union(u), XdrValue::Union(uv)) => {
                self.put_union(u, &uv.discriminant, uv.arm, &uv.value)?;
            }
            _ => return Err(self.mismatch("value kind differs from descriptor")),
        }
        Ok(())
    }

    fn put_union(&mut self, u: &UnionType, discriminant: &XdrValue, arm_name: &'static str,
                 value: &XdrValue) -> Result<(), DecodeError>
    {
        let key: i64 = match discriminant {
            XdrValue::Int(v) => *v as i64,
            XdrValue::UInt(v) => *v as i64,
            XdrValue::Enum(e) => e.value as i64,
            XdrValue::Bool(b) => *b as i64,
            _ => return Err(self.mismatch("union discriminant must be int, unsigned int, bool or enum")),
        };
        let arm = match u.find(key) {
            Some(arm) => arm,
            None => return Err(self.error(ErrorKind::UnknownUnionArm(key))),
        };
        if arm.name != arm_name {
            return Err(self.mismatch("union arm does not match its discriminant"));
        }
        self.put(discriminant, &u.discriminant)?;
        self.nested(arm.name.to_string(), |e| e.put(value, &arm.ty))
    }
}

/// Encode `value` as described by `ty`.
pub fn encode(value: &XdrValue, ty: &XdrType) -> Result<Vec<u8>, DecodeError> {
    let mut encoder = XdrEncoder { buf: Vec::new(), path: Vec::new() };
    encoder.put(value, ty)?;
    Ok(encoder.buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Protocol;
    use crate::xdr::decoder::decode;
    use crate::xdr::types::*;
    use crate::xdr::value::Record;
    use test_case::test_case;

    fn round_trip(v: &XdrValue, t: &XdrType) -> Vec<u8> {
        let buf = encode(v, t).unwrap();
        assert_eq!(buf.len() % 4, 0);
        let (back, end) = decode(&buf, 0, t).unwrap();
        assert_eq!(end, buf.len());
        assert_eq!(&back, v);
        buf
    }

    #[test_case(XdrValue::Int(-2), int(), 4 ; "int")]
    #[test_case(XdrValue::UInt(u32::MAX), uint(), 4 ; "unsigned int")]
    #[test_case(XdrValue::Hyper(-(1 << 40)), hyper(), 8 ; "hyper")]
    #[test_case(XdrValue::UHyper(u64::MAX), uhyper(), 8 ; "unsigned hyper")]
    #[test_case(XdrValue::Bool(false), boolean(), 4 ; "bool")]
    #[test_case(XdrValue::enumeration(70, Some("NFS3ERR_STALE")),
                enumeration(Protocol::Nfs3, "nfsstat3"), 4 ; "enum")]
    #[test_case(XdrValue::enumeration(12345, None),
                enumeration(Protocol::Nfs3, "nfsstat3"), 4 ; "unknown enum")]
    #[test_case(XdrValue::some(XdrValue::UInt(5)), optional(uint()), 8 ; "optional present")]
    #[test_case(XdrValue::none(), optional(uint()), 4 ; "optional absent")]
    #[test_case(XdrValue::Array(vec![XdrValue::UHyper(1), XdrValue::UHyper(2)]),
                array(uhyper(), Some(4)), 20 ; "variable array")]
    #[test_case(XdrValue::Array(vec![]), array(uint(), None), 4 ; "empty array")]
    #[test_case(XdrValue::Array(vec![XdrValue::Int(1), XdrValue::Int(2), XdrValue::Int(3)]),
                list(int()), 28 ; "linked list")]
    #[test_case(XdrValue::Opaque(vec![1, 2, 3, 4, 5]), opaque(None), 12 ; "padded opaque")]
    fn test_round_trip(v: XdrValue, t: XdrType, len: usize) {
        assert_eq!(round_trip(&v, &t).len(), len);
    }

    #[test]
    fn test_round_trip_nested_union() {
        let entry = structure(vec![
            field("id", uhyper()),
            field("next", optional(structure(vec![field("id", uhyper())]))),
        ]);
        let t = union(int())
            .arm(0, "ok", structure(vec![
                field("entries", array(entry, None)),
                field("eof", boolean()),
            ]))
            .default_arm("fail", void())
            .build();
        let ok = Record::new()
            .with("entries", XdrValue::Array(vec![
                Record::new()
                    .with("id", XdrValue::UHyper(1))
                    .with("next", XdrValue::some(Record::new()
                                                 .with("id", XdrValue::UHyper(2))
                                                 .into_value()))
                    .into_value(),
                Record::new()
                    .with("id", XdrValue::UHyper(3))
                    .with("next", XdrValue::none())
                    .into_value(),
            ]))
            .with("eof", XdrValue::Bool(true))
            .into_value();
        round_trip(&XdrValue::union(XdrValue::Int(0), "ok", ok), &t);
        round_trip(&XdrValue::union(XdrValue::Int(5), "fail", XdrValue::Void), &t);
    }

    #[test]
    fn test_padding_is_zero() {
        let buf = encode(&XdrValue::String(b"abcde".to_vec()), &string(None)).unwrap();
        assert_eq!(buf, vec![0, 0, 0, 5, b'a', b'b', b'c', b'd', b'e', 0, 0, 0]);
    }

    #[test]
    fn test_encode_then_decode_struct() {
        let t = structure(vec![
            field("fh", opaque(Some(64))),
            field("names", list(string(Some(255)))),
            field("verf", opaque_fixed(8)),
            field("attr", union(boolean()).arm(1, "attributes", uhyper())
                  .arm(0, "void", void()).build()),
        ]);
        let v = Record::new()
            .with("fh", XdrValue::Opaque(vec![1, 2, 3]))
            .with("names", XdrValue::Array(vec![XdrValue::String(b"a".to_vec()),
                                                XdrValue::String(b"bb".to_vec())]))
            .with("verf", XdrValue::Opaque(vec![9; 8]))
            .with("attr", XdrValue::union(XdrValue::Bool(true), "attributes",
                                          XdrValue::UHyper(77)))
            .into_value();
        let buf = encode(&v, &t).unwrap();
        assert_eq!(buf.len() % 4, 0);
        let (back, end) = decode(&buf, 0, &t).unwrap();
        assert_eq!(end, buf.len());
        assert_eq!(back, v);
    }

    #[test]
    fn test_encode_rejects() {
        let err = encode(&XdrValue::Opaque(vec![0; 5]), &opaque(Some(4))).unwrap_err();
        assert_eq!(err.kind, ErrorKind::LengthExceeded { length: 5, max: 4 });

        let err = encode(&XdrValue::UInt(1), &string(None)).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::ShapeMismatch(_)));

        let t = union(int()).arm(0, "ok", void()).build();
        let err = encode(&XdrValue::union(XdrValue::Int(3), "ok", XdrValue::Void), &t).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownUnionArm(3));

        let t = structure(vec![field("a", uint()), field("b", uint())]);
        let v = Record::new().with("a", XdrValue::UInt(1)).into_value();
        let err = encode(&v, &t).unwrap_err();
        assert_eq!(err.path, "b");
    }
}
