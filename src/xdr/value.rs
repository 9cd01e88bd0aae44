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

//! Decoded record trees.

use crate::xdr::chunks::ChunkRef;

/// An enum field: the raw wire value plus its symbolic name when the
/// constant table knows it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumValue {
    pub value: i32,
    pub name: Option<&'static str>,
}

impl EnumValue {
    pub fn is_known(&self) -> bool {
        self.name.is_some()
    }

    pub fn label(&self) -> String {
        match self.name {
            Some(name) => name.to_string(),
            None => format!("UNKNOWN({})", self.value),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnionValue {
    pub discriminant: XdrValue,
    /// Name of the arm selected by the discriminant.
    pub arm: &'static str,
    pub value: XdrValue,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum XdrValue {
    Void,
    Int(i32),
    UInt(u32),
    Hyper(i64),
    UHyper(u64),
    Bool(bool),
    Enum(EnumValue),
    Opaque(Vec<u8>),
    String(Vec<u8>),
    Array(Vec<XdrValue>),
    Struct(Record),
    Union(Box<UnionValue>),
    Optional(Option<Box<XdrValue>>),
    /// Data carried out of line in an RDMA chunk that is not present in
    /// the capture.
    Unresolved(ChunkRef),
}

impl XdrValue {
    pub fn enumeration(value: i32, name: Option<&'static str>) -> XdrValue {
        XdrValue::Enum(EnumValue { value, name })
    }

    pub fn union(discriminant: XdrValue, arm: &'static str, value: XdrValue) -> XdrValue {
        XdrValue::Union(Box::new(UnionValue { discriminant, arm, value }))
    }

    pub fn some(value: XdrValue) -> XdrValue {
        XdrValue::Optional(Some(Box::new(value)))
    }

    pub fn none() -> XdrValue {
        XdrValue::Optional(None)
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            XdrValue::UInt(v) => Some(*v),
            XdrValue::Int(v) => Some(*v as u32),
            XdrValue::Enum(e) => Some(e.value as u32),
            XdrValue::Bool(b) => Some(*b as u32),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            XdrValue::Int(v) => Some(*v),
            XdrValue::UInt(v) => Some(*v as i32),
            XdrValue::Enum(e) => Some(e.value),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            XdrValue::UHyper(v) => Some(*v),
            XdrValue::Hyper(v) => Some(*v as u64),
            XdrValue::UInt(v) => Some(*v as u64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            XdrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            XdrValue::Opaque(b) | XdrValue::String(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumValue> {
        match self {
            XdrValue::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            XdrValue::Struct(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[XdrValue]> {
        match self {
            XdrValue::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_union(&self) -> Option<&UnionValue> {
        match self {
            XdrValue::Union(u) => Some(u),
            _ => None,
        }
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, XdrValue::Unresolved(_))
    }

    /// Child lookup used by [`XdrValue::path`]. Unions and present
    /// optionals are transparent: a name that is not the arm name is
    /// looked up in the arm value.
    pub fn get(&self, name: &str) -> Option<&XdrValue> {
        match self {
            XdrValue::Struct(r) => r.get(name),
            XdrValue::Union(u) => {
                if u.arm == name {
                    Some(&u.value)
                } else {
                    u.value.get(name)
                }
            }
            XdrValue::Optional(Some(v)) => v.get(name),
            XdrValue::Array(items) => name.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    }

    /// Dotted path lookup, e.g. `body.cbody.prog` or `entries.0.name`.
    pub fn path(&self, path: &str) -> Option<&XdrValue> {
        let mut node = self;
        for part in path.split('.').filter(|p| !p.is_empty()) {
            node = node.get(part)?;
        }
        Some(node)
    }

    /// All unresolved chunk placeholders in this tree, in decode order.
    pub fn unresolved(&self) -> Vec<&ChunkRef> {
        let mut out = Vec::new();
        self.collect_unresolved(&mut out);
        out
    }

    fn collect_unresolved<'a>(&'a self, out: &mut Vec<&'a ChunkRef>) {
        match self {
            XdrValue::Unresolved(c) => out.push(c),
            XdrValue::Array(items) => {
                for item in items {
                    item.collect_unresolved(out);
                }
            }
            XdrValue::Struct(r) => {
                for (_, v) in r.iter() {
                    v.collect_unresolved(out);
                }
            }
            XdrValue::Union(u) => u.value.collect_unresolved(out),
            XdrValue::Optional(Some(v)) => v.collect_unresolved(out),
            _ => {}
        }
    }
}

/// Ordered named fields of a decoded struct.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(&'static str, XdrValue)>,
}

impl Record {
    pub fn new() -> Record {
        Record { fields: Vec::new() }
    }

    pub fn with_capacity(n: usize) -> Record {
        Record { fields: Vec::with_capacity(n) }
    }

    pub fn push(&mut self, name: &'static str, value: XdrValue) {
        self.fields.push((name, value));
    }

    /// Builder form of [`Record::push`].
    pub fn with(mut self, name: &'static str, value: XdrValue) -> Record {
        self.push(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&XdrValue> {
        self.fields.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(&'static str, XdrValue)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_value(self) -> XdrValue {
        XdrValue::Struct(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_through_union_and_optional() {
        let lock = Record::new()
            .with("caller_name", XdrValue::String(b"client".to_vec()))
            .with("svid", XdrValue::Int(42));
        let v = Record::new()
            .with("stat", XdrValue::union(XdrValue::enumeration(1, Some("NLM4_DENIED")),
                                          "holder", XdrValue::some(lock.into_value())))
            .into_value();
        assert_eq!(v.path("stat.holder.svid"), Some(&XdrValue::Int(42)));
        assert_eq!(v.path("stat.svid"), Some(&XdrValue::Int(42)));
        assert_eq!(v.path("stat.nope"), None);
    }

    #[test]
    fn test_enum_label() {
        let e = EnumValue { value: 99, name: None };
        assert!(!e.is_known());
        assert_eq!(e.label(), "UNKNOWN(99)");
    }
}
