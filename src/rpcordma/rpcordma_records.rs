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

//! RPC-over-RDMA version 1 transport header

use lazy_static::lazy_static;

use crate::error::{DecodeError, ErrorKind};
use crate::registry::Protocol;
use crate::rpcordma::types::*;
use crate::xdr::types::*;
use crate::xdr::{Record, XdrDecoder, XdrValue};

/// Offset of `rdma_proc`, after xid, version and credit.
pub const RDMA_BODY_OFFSET: usize = 12;
/// Encoded read list entry: presence word, position and segment.
const READ_ENTRY_LEN: usize = 24;

lazy_static! {
    /// `rdma_body`, everything after xid, version and credit.
    pub static ref RDMA_BODY: XdrType = rdma_body();
}

fn xdr_rdma_segment() -> XdrType {
    structure(vec![
        field("handle", uint()),
        field("length", uint()),
        field("offset", uhyper()),
    ])
}

fn xdr_write_chunk() -> XdrType {
    structure(vec![field("target", array(xdr_rdma_segment(), None))])
}

fn chunk_lists() -> Vec<Field> {
    vec![
        field("rdma_reads", list(structure(vec![
            field("position", uint()),
            field("target", xdr_rdma_segment()),
        ]))),
        field("rdma_writes", list(xdr_write_chunk())),
        field("rdma_reply", optional(xdr_write_chunk())),
    ]
}

fn rdma_body() -> XdrType {
    let mut padded = vec![
        field("rdma_align", uint()),
        field("rdma_thresh", uint()),
    ];
    padded.extend(chunk_lists());
    let rdma_error = union(enumeration(Protocol::RpcOrdma, "rpc_rdma_errcode"))
        .arm(ERR_VERS, "range", structure(vec![
            field("rdma_vers_low", uint()),
            field("rdma_vers_high", uint()),
        ]))
        .arm(ERR_CHUNK, "void", void())
        .build();
    union(fixed_enumeration(Protocol::RpcOrdma, "rdma_proc"))
        .arm(RDMA_MSG, "rdma_msg", structure(chunk_lists()))
        .arm(RDMA_NOMSG, "rdma_nomsg", structure(chunk_lists()))
        .arm(RDMA_MSGP, "rdma_msgp", structure(padded))
        .arm(RDMA_DONE, "void", void())
        .arm(RDMA_ERROR, "rdma_error", rdma_error)
        .build()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RdmaSegment {
    pub handle: u32,
    pub length: u32,
    pub offset: u64,
}

/// Read list entries sharing one position form one read chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadChunk {
    pub position: u32,
    /// Header offset of the position field of the chunk's first entry.
    pub offset: usize,
    pub segments: Vec<RdmaSegment>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteChunk {
    pub segments: Vec<RdmaSegment>,
}

/// Total bytes described by a list of segments.
pub fn segments_len(segments: &[RdmaSegment]) -> u32 {
    segments.iter().fold(0u32, |acc, s| acc.saturating_add(s.length))
}

impl ReadChunk {
    pub fn len(&self) -> u32 {
        segments_len(&self.segments)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl WriteChunk {
    pub fn len(&self) -> u32 {
        segments_len(&self.segments)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RdmaChunks {
    pub reads: Vec<ReadChunk>,
    pub writes: Vec<WriteChunk>,
    pub reply: Option<WriteChunk>,
}

impl RdmaChunks {
    pub fn is_empty(&self) -> bool {
        self.reads.is_empty() && self.writes.is_empty() && self.reply.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RdmaError {
    /// ERR_VERS with the supported version range.
    Vers { low: u32, high: u32 },
    Chunk,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RdmaBody {
    Msg(RdmaChunks),
    NoMsg(RdmaChunks),
    Error(RdmaError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RdmaHeader {
    pub xid: u32,
    pub vers: u32,
    pub credit: u32,
    pub proc_: u32,
    pub body: RdmaBody,
    pub record: XdrValue,
    /// Transport header length, the inline RPC message starts here.
    pub header_len: usize,
}

fn shape(path: &'static str) -> DecodeError {
    DecodeError::new(ErrorKind::ShapeMismatch("rpc_rdma header"), path.to_string(),
                     RDMA_BODY_OFFSET)
        .in_protocol("RPCORDMA")
}

fn segment(v: &XdrValue) -> Option<RdmaSegment> {
    Some(RdmaSegment {
        handle: v.get("handle")?.as_u32()?,
        length: v.get("length")?.as_u32()?,
        offset: v.get("offset")?.as_u64()?,
    })
}

fn write_chunk(v: &XdrValue) -> Option<WriteChunk> {
    let segments = v.get("target")?.as_array()?
        .iter()
        .map(segment)
        .collect::<Option<Vec<_>>>()?;
    Some(WriteChunk { segments })
}

fn chunks(v: &XdrValue) -> Option<RdmaChunks> {
    let mut reads: Vec<ReadChunk> = Vec::new();
    for (k, entry) in v.get("rdma_reads")?.as_array()?.iter().enumerate() {
        let position = entry.get("position")?.as_u32()?;
        let seg = segment(entry.get("target")?)?;
        match reads.last_mut() {
            Some(last) if last.position == position => last.segments.push(seg),
            _ => {
                let offset = RDMA_BODY_OFFSET + 4 + k * READ_ENTRY_LEN + 4;
                reads.push(ReadChunk { position, offset, segments: vec![seg] });
            }
        }
    }
    let writes = v.get("rdma_writes")?.as_array()?
        .iter()
        .map(write_chunk)
        .collect::<Option<Vec<_>>>()?;
    let reply = match v.get("rdma_reply")? {
        XdrValue::Optional(Some(chunk)) => Some(write_chunk(chunk)?),
        _ => None,
    };
    Some(RdmaChunks { reads, writes, reply })
}

/// Decode the transport header at the start of an RDMA SEND payload.
pub fn decode_rdma_header(input: &[u8], strict_enums: bool) -> Result<RdmaHeader, DecodeError> {
    let mut decoder = XdrDecoder::new(input).strict_enums(strict_enums);
    let xid = decoder.read_u32().map_err(|e| e.in_protocol("RPCORDMA"))?;
    let vers_offset = decoder.offset();
    let vers = decoder.read_u32().map_err(|e| e.in_protocol("RPCORDMA"))?;
    if vers != RPCRDMA_VERSION {
        return Err(DecodeError::violation("RPCORDMA", "rdma_vers", vers_offset,
                                          format!("unsupported version {}", vers)));
    }
    let credit = decoder.read_u32().map_err(|e| e.in_protocol("RPCORDMA"))?;
    let body_value = decoder.decode(&RDMA_BODY).map_err(|e| {
        let mut e = e.in_protocol("RPCORDMA");
        e.path = if e.path.is_empty() {
            "rdma_body".to_string()
        } else {
            format!("rdma_body.{}", e.path)
        };
        e
    })?;
    let header_len = decoder.offset();
    let union = body_value.as_union().ok_or_else(|| shape("rdma_body"))?;
    let proc_ = union.discriminant.as_u32().ok_or_else(|| shape("rdma_body"))?;
    let body = match proc_ {
        RDMA_MSG => RdmaBody::Msg(chunks(&union.value).ok_or_else(|| shape("rdma_body.rdma_msg"))?),
        RDMA_NOMSG => RdmaBody::NoMsg(chunks(&union.value)
                                      .ok_or_else(|| shape("rdma_body.rdma_nomsg"))?),
        RDMA_ERROR => {
            let err = union.value.as_union().ok_or_else(|| shape("rdma_body.rdma_error"))?;
            match err.discriminant.as_u32() {
                Some(ERR_VERS) => {
                    let low = err.value.get("rdma_vers_low").and_then(|v| v.as_u32());
                    let high = err.value.get("rdma_vers_high").and_then(|v| v.as_u32());
                    match (low, high) {
                        (Some(low), Some(high)) => RdmaBody::Error(RdmaError::Vers { low, high }),
                        _ => return Err(shape("rdma_body.rdma_error.range")),
                    }
                }
                _ => RdmaBody::Error(RdmaError::Chunk),
            }
        }
        // MSGP and DONE are rejected by the fixed rdma_proc field
        _ => return Err(shape("rdma_body")),
    };
    let record = Record::new()
        .with("rdma_xid", XdrValue::UInt(xid))
        .with("rdma_vers", XdrValue::UInt(vers))
        .with("rdma_credit", XdrValue::UInt(credit))
        .with("rdma_body", body_value)
        .into_value();
    SCLogDebug!("rdma xid {:08x} proc {} header {} bytes", xid, proc_, header_len);
    Ok(RdmaHeader { xid, vers, credit, proc_, body, record, header_len })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xdr::{decode, encode};
    use test_case::test_case;

    fn header(proc_: u8) -> Vec<u8> {
        vec![
            0x00, 0x00, 0x00, 0x2a, // xid
            0x00, 0x00, 0x00, 0x01, // vers
            0x00, 0x00, 0x00, 0x20, // credit
            0x00, 0x00, 0x00, proc_,
        ]
    }

    #[test]
    fn test_rdma_msg_with_read_chunk() {
        let mut buf = header(0);
        buf.extend_from_slice(&[
            0x00, 0x00, 0x00, 0x01, // read list entry
            0x00, 0x00, 0x00, 0x40, // position
            0x00, 0x00, 0x10, 0x01, // handle
            0x00, 0x00, 0x01, 0x00, // length
            0, 0, 0, 0, 0, 0, 0x20, 0x00, // offset
            0x00, 0x00, 0x00, 0x01, // second segment, same position
            0x00, 0x00, 0x00, 0x40,
            0x00, 0x00, 0x10, 0x02,
            0x00, 0x00, 0x00, 0x80,
            0, 0, 0, 0, 0, 0, 0, 0,
            0x00, 0x00, 0x00, 0x00, // end of read list
            0x00, 0x00, 0x00, 0x00, // no write list
            0x00, 0x00, 0x00, 0x00, // no reply chunk
            0xde, 0xad, // inline rpc message
        ]);
        let hdr = decode_rdma_header(&buf, false).unwrap();
        assert_eq!(hdr.xid, 42);
        assert_eq!(hdr.credit, 32);
        assert_eq!(hdr.header_len, buf.len() - 2);
        match &hdr.body {
            RdmaBody::Msg(c) => {
                assert_eq!(c.reads.len(), 1);
                assert_eq!(c.reads[0].position, 0x40);
                assert_eq!(c.reads[0].offset, 20);
                assert_eq!(c.reads[0].segments.len(), 2);
                assert_eq!(c.reads[0].len(), 0x180);
                assert!(c.writes.is_empty());
                assert!(c.reply.is_none());
            }
            b => panic!("unexpected {:?}", b),
        }
        assert_eq!(hdr.record.path("rdma_body.rdma_msg.rdma_reads.0.target.handle")
                   .and_then(|v| v.as_u32()), Some(0x1001));
    }

    #[test_case(2 ; "rdma_msgp")]
    #[test_case(3 ; "rdma_done")]
    #[test_case(99 ; "undefined proc")]
    fn test_rdma_proc_violations(proc_: u8) {
        let mut buf = header(proc_);
        buf.extend_from_slice(&[0u8; 32]);
        let err = decode_rdma_header(&buf, false).unwrap_err();
        assert!(err.is_protocol_violation());
        assert_eq!(err.protocol, "RPCORDMA");
        assert_eq!(err.path, "rdma_body");
        assert_eq!(err.offset, 12);
    }

    #[test]
    fn test_rdma_error_vers() {
        let mut buf = header(4);
        buf.extend_from_slice(&[
            0x00, 0x00, 0x00, 0x01, // ERR_VERS
            0x00, 0x00, 0x00, 0x01,
            0x00, 0x00, 0x00, 0x01,
        ]);
        let hdr = decode_rdma_header(&buf, false).unwrap();
        assert_eq!(hdr.body, RdmaBody::Error(RdmaError::Vers { low: 1, high: 1 }));
    }

    #[test]
    fn test_rdma_bad_version() {
        let buf: &[u8] = &[0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 1, 0, 0, 0, 0];
        let err = decode_rdma_header(buf, false).unwrap_err();
        assert!(err.is_protocol_violation());
        assert_eq!(err.path, "rdma_vers");
    }

    #[test]
    fn test_rdma_truncated() {
        let mut buf = header(1);
        buf.extend_from_slice(&[0x00, 0x00, 0x00, 0x01, 0x00, 0x00]);
        let err = decode_rdma_header(&buf, false).unwrap_err();
        assert!(err.is_truncated());
    }

    #[test]
    fn test_msgp_shape_encodes() {
        // the padded shape exists for building traffic even though a
        // receiver must reject it
        let msgp = XdrValue::union(
            XdrValue::enumeration(RDMA_MSGP as i32, Some("RDMA_MSGP")),
            "rdma_msgp",
            Record::new()
                .with("rdma_align", XdrValue::UInt(32))
                .with("rdma_thresh", XdrValue::UInt(1024))
                .with("rdma_reads", XdrValue::Array(vec![]))
                .with("rdma_writes", XdrValue::Array(vec![]))
                .with("rdma_reply", XdrValue::none())
                .into_value());
        let buf = encode(&msgp, &RDMA_BODY).unwrap();
        assert_eq!(buf.len(), 24);
        let err = decode(&buf, 0, &RDMA_BODY).unwrap_err();
        assert!(err.is_protocol_violation());
        assert_eq!(err.offset, 0);
    }

    fn body(proc_: u8, words: &[u32]) -> Vec<u8> {
        let mut buf = header(proc_);
        for w in words {
            buf.extend_from_slice(&w.to_be_bytes());
        }
        buf
    }

    #[test_case(body(0, &[0, 0, 0]) ; "rdma_msg without chunks")]
    #[test_case(body(0, &[1, 8, 0x10, 64, 0, 0x1000, 1, 8, 0x11, 32, 0, 0, 0, 0, 0])
                ; "rdma_msg with a two segment read chunk")]
    #[test_case(body(0, &[0, 1, 2, 0x20, 512, 0, 0, 0x21, 512, 0, 0, 0, 0])
                ; "rdma_msg with a write chunk")]
    #[test_case(body(1, &[1, 0, 0x30, 200, 0, 0, 0, 0, 0]) ; "rdma_nomsg call")]
    #[test_case(body(1, &[0, 0, 1, 1, 0x40, 4096, 0, 0]) ; "rdma_nomsg reply")]
    #[test_case(body(4, &[1, 1, 1]) ; "rdma_error vers")]
    #[test_case(body(4, &[2]) ; "rdma_error chunk")]
    fn test_rdma_body_reencode(buf: Vec<u8>) {
        let hdr = decode_rdma_header(&buf, false).unwrap();
        assert_eq!(hdr.header_len, buf.len());
        let value = hdr.record.get("rdma_body").unwrap();
        let out = encode(value, &RDMA_BODY).unwrap();
        assert_eq!(&out[..], &buf[RDMA_BODY_OFFSET..]);
        let (back, end) = decode(&out, 0, &RDMA_BODY).unwrap();
        assert_eq!(end, out.len());
        assert_eq!(&back, value);
    }

    #[test_case(body(0, &[1, 8, 0x10, 64, 0, 0x1000, 0, 0, 0]) ; "rdma_msg")]
    #[test_case(body(1, &[0, 0, 1, 1, 0x40, 4096, 0, 0]) ; "rdma_nomsg reply")]
    #[test_case(body(4, &[1, 1, 1]) ; "rdma_error vers")]
    fn test_rdma_truncated_at_every_word(buf: Vec<u8>) {
        for cut in (0..buf.len()).step_by(4) {
            let err = decode_rdma_header(&buf[..cut], false).unwrap_err();
            assert!(err.is_truncated(), "cut at {}: {:?}", cut, err);
        }
    }
}
