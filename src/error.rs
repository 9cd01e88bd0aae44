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

//! Typed decode errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// Not enough bytes. In streaming contexts this means "wait for more".
    #[error("truncated data, {needed} more bytes needed")]
    TruncatedData { needed: usize },
    #[error("malformed encoding: {0}")]
    MalformedEncoding(&'static str),
    #[error("length {length} exceeds maximum {max}")]
    LengthExceeded { length: u32, max: u32 },
    #[error("no union arm for discriminant {0}")]
    UnknownUnionArm(i64),
    #[error("unknown value {value} for enum {table}")]
    UnknownEnumValue { table: &'static str, value: i32 },
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),
    /// A value handed to the encoder does not have the shape its
    /// descriptor declares.
    #[error("value does not match descriptor: {0}")]
    ShapeMismatch(&'static str),
}

/// A decode (or encode) failure for a single message.
///
/// Carries enough context for the caller to print something actionable
/// without this crate deciding how it is reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{protocol}: {kind} at offset {offset} (field '{path}')")]
pub struct DecodeError {
    pub protocol: &'static str,
    pub kind: ErrorKind,
    /// Dotted path of the field being decoded, e.g. `body.cbody.cred`.
    pub path: String,
    /// Byte offset into the buffer handed to the decoder.
    pub offset: usize,
}

impl DecodeError {
    pub fn new(kind: ErrorKind, path: String, offset: usize) -> DecodeError {
        DecodeError {
            protocol: "XDR",
            kind,
            path,
            offset,
        }
    }

    pub fn violation<S: Into<String>>(protocol: &'static str, path: &str,
                                      offset: usize, reason: S) -> DecodeError
    {
        DecodeError {
            protocol,
            kind: ErrorKind::ProtocolViolation(reason.into()),
            path: path.to_string(),
            offset,
        }
    }

    /// Tag the error with the protocol whose decoder produced it. Errors
    /// already tagged by a nested decoder keep their original protocol.
    pub fn in_protocol(mut self, protocol: &'static str) -> DecodeError {
        if self.protocol == "XDR" {
            self.protocol = protocol;
        }
        self
    }

    /// Shift the offset when the failing buffer was a slice of a bigger one.
    pub fn at_base(mut self, base: usize) -> DecodeError {
        self.offset += base;
        self
    }

    pub fn is_truncated(&self) -> bool {
        matches!(self.kind, ErrorKind::TruncatedData { .. })
    }

    pub fn is_protocol_violation(&self) -> bool {
        matches!(self.kind, ErrorKind::ProtocolViolation(_))
    }

    /// Short stable name of the error kind, used for statistics.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ErrorKind::TruncatedData { .. } => "truncated_data",
            ErrorKind::MalformedEncoding(_) => "malformed_encoding",
            ErrorKind::LengthExceeded { .. } => "length_exceeded",
            ErrorKind::UnknownUnionArm(_) => "unknown_union_arm",
            ErrorKind::UnknownEnumValue { .. } => "unknown_enum_value",
            ErrorKind::ProtocolViolation(_) => "protocol_violation",
            ErrorKind::ShapeMismatch(_) => "shape_mismatch",
        }
    }
}
