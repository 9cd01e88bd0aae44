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

//! XDR type descriptors.
//!
//! A message shape is a tree of [`XdrType`] values. The same tree drives
//! both the decoder and the encoder. Protocol modules build their trees
//! once with the helper functions below and keep them in a `lazy_static`.

use crate::registry::Protocol;

/// Length rule of opaque data and arrays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Length {
    Fixed(u32),
    /// Variable length with an optional protocol declared maximum.
    Variable(Option<u32>),
}

/// Reference to a constant table. `fixed` marks fields whose codes are
/// "fixed for all versions": unknown or disallowed codes are protocol
/// violations instead of being tagged unknown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnumRef {
    pub protocol: Protocol,
    pub table: &'static str,
    pub fixed: bool,
}

#[derive(Clone, Debug)]
pub struct Field {
    pub name: &'static str,
    pub ty: XdrType,
}

#[derive(Clone, Debug)]
pub struct UnionArm {
    pub name: &'static str,
    pub ty: XdrType,
}

#[derive(Clone, Debug)]
pub struct UnionType {
    /// Int, UInt, Bool or Enum.
    pub discriminant: XdrType,
    pub arms: Vec<(i64, UnionArm)>,
    pub default: Option<UnionArm>,
}

impl UnionType {
    pub fn new(discriminant: XdrType) -> UnionType {
        UnionType {
            discriminant,
            arms: Vec::new(),
            default: None,
        }
    }

    pub fn arm(mut self, value: impl Into<i64>, name: &'static str, ty: XdrType) -> UnionType {
        self.arms.push((value.into(), UnionArm { name, ty }));
        self
    }

    pub fn default_arm(mut self, name: &'static str, ty: XdrType) -> UnionType {
        self.default = Some(UnionArm { name, ty });
        self
    }

    pub fn build(self) -> XdrType {
        XdrType::Union(Box::new(self))
    }

    pub fn find(&self, discriminant: i64) -> Option<&UnionArm> {
        self.arms
            .iter()
            .find(|(v, _)| *v == discriminant)
            .map(|(_, arm)| arm)
            .or(self.default.as_ref())
    }
}

#[derive(Clone, Debug)]
pub enum XdrType {
    Void,
    Int,
    UInt,
    Hyper,
    UHyper,
    Bool,
    Enum(EnumRef),
    /// `ddp` marks data that RPC-over-RDMA may move by direct placement.
    Opaque { len: Length, ddp: bool },
    String { max: Option<u32>, ddp: bool },
    Array { elem: Box<XdrType>, len: Length },
    /// Optional-data linked list (`struct entry *next` chains), decoded
    /// into a flat sequence.
    List(Box<XdrType>),
    Optional(Box<XdrType>),
    Struct(Vec<Field>),
    Union(Box<UnionType>),
}

impl XdrType {
    /// Mark opaque or string data as eligible for direct data placement.
    pub fn ddp(self) -> XdrType {
        match self {
            XdrType::Opaque { len, .. } => XdrType::Opaque { len, ddp: true },
            XdrType::String { max, .. } => XdrType::String { max, ddp: true },
            other => other,
        }
    }

    /// Smallest number of bytes one value of this type occupies on the wire.
    pub fn min_size(&self) -> usize {
        match self {
            XdrType::Void => 0,
            XdrType::Hyper | XdrType::UHyper => 8,
            XdrType::Opaque { len: Length::Fixed(n), .. } => ((*n as usize) + 3) & !3,
            XdrType::Array { elem, len: Length::Fixed(n) } => elem.min_size() * (*n as usize),
            XdrType::Struct(fields) => fields.iter().map(|f| f.ty.min_size()).sum(),
            _ => 4,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            XdrType::Void => "void",
            XdrType::Int => "int",
            XdrType::UInt => "unsigned int",
            XdrType::Hyper => "hyper",
            XdrType::UHyper => "unsigned hyper",
            XdrType::Bool => "bool",
            XdrType::Enum(_) => "enum",
            XdrType::Opaque { .. } => "opaque",
            XdrType::String { .. } => "string",
            XdrType::Array { .. } => "array",
            XdrType::List(_) => "list",
            XdrType::Optional(_) => "optional",
            XdrType::Struct(_) => "struct",
            XdrType::Union(_) => "union",
        }
    }
}

pub fn void() -> XdrType {
    XdrType::Void
}

pub fn int() -> XdrType {
    XdrType::Int
}

pub fn uint() -> XdrType {
    XdrType::UInt
}

pub fn hyper() -> XdrType {
    XdrType::Hyper
}

pub fn uhyper() -> XdrType {
    XdrType::UHyper
}

pub fn boolean() -> XdrType {
    XdrType::Bool
}

pub fn enumeration(protocol: Protocol, table: &'static str) -> XdrType {
    XdrType::Enum(EnumRef { protocol, table, fixed: false })
}

/// Enum whose codes are fixed for all protocol versions.
pub fn fixed_enumeration(protocol: Protocol, table: &'static str) -> XdrType {
    XdrType::Enum(EnumRef { protocol, table, fixed: true })
}

pub fn opaque_fixed(size: u32) -> XdrType {
    XdrType::Opaque { len: Length::Fixed(size), ddp: false }
}

pub fn opaque(max: Option<u32>) -> XdrType {
    XdrType::Opaque { len: Length::Variable(max), ddp: false }
}

pub fn string(max: Option<u32>) -> XdrType {
    XdrType::String { max, ddp: false }
}

pub fn array_fixed(elem: XdrType, count: u32) -> XdrType {
    XdrType::Array { elem: Box::new(elem), len: Length::Fixed(count) }
}

pub fn array(elem: XdrType, max: Option<u32>) -> XdrType {
    XdrType::Array { elem: Box::new(elem), len: Length::Variable(max) }
}

pub fn list(elem: XdrType) -> XdrType {
    XdrType::List(Box::new(elem))
}

pub fn optional(ty: XdrType) -> XdrType {
    XdrType::Optional(Box::new(ty))
}

pub fn field(name: &'static str, ty: XdrType) -> Field {
    Field { name, ty }
}

pub fn structure(fields: Vec<Field>) -> XdrType {
    XdrType::Struct(fields)
}

pub fn union(discriminant: XdrType) -> UnionType {
    UnionType::new(discriminant)
}
