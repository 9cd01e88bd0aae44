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

//! RPCv2 message headers and TCP record marking

use lazy_static::lazy_static;
use nom7::bits::bits;
use nom7::bits::streaming::take as take_bits;
use nom7::bytes::streaming::take;
use nom7::sequence::tuple;
use nom7::{Err, IResult, Needed};

use crate::error::{DecodeError, ErrorKind};
use crate::registry::Protocol;
use crate::rpc::types::*;
use crate::xdr::types::*;
use crate::xdr::{XdrDecoder, XdrValue};

lazy_static! {
    pub static ref OPAQUE_AUTH: XdrType = opaque_auth();
    pub static ref AUTHSYS_PARMS: XdrType = structure(vec![
        field("stamp", uint()),
        field("machinename", string(Some(MAX_MACHINE_NAME))),
        field("uid", uint()),
        field("gid", uint()),
        field("gids", array(uint(), Some(MAX_AUTH_GIDS))),
    ]);
    /// `rpc_msg` up to, not including, the procedure arguments or results.
    pub static ref RPC_MSG: XdrType = rpc_msg();
}

fn opaque_auth() -> XdrType {
    structure(vec![
        field("flavor", enumeration(Protocol::Rpc, "auth_flavor")),
        field("body", opaque(Some(MAX_AUTH_BYTES))),
    ])
}

fn mismatch_info() -> XdrType {
    structure(vec![
        field("low", uint()),
        field("high", uint()),
    ])
}

fn rpc_msg() -> XdrType {
    let call_body = structure(vec![
        field("rpcvers", uint()),
        field("prog", uint()),
        field("vers", uint()),
        field("proc", uint()),
        field("cred", opaque_auth()),
        field("verf", opaque_auth()),
    ]);
    let accepted_reply = structure(vec![
        field("verf", opaque_auth()),
        field("reply_data", union(enumeration(Protocol::Rpc, "accept_stat"))
              .arm(SUCCESS, "results", void())
              .arm(PROG_MISMATCH, "mismatch_info", mismatch_info())
              .default_arm("void", void())
              .build()),
    ]);
    let rejected_reply = union(enumeration(Protocol::Rpc, "reject_stat"))
        .arm(RPC_MISMATCH, "mismatch_info", mismatch_info())
        .arm(AUTH_ERROR, "stat", enumeration(Protocol::Rpc, "auth_stat"))
        .build();
    let reply_body = union(enumeration(Protocol::Rpc, "reply_stat"))
        .arm(MSG_ACCEPTED, "areply", accepted_reply)
        .arm(MSG_DENIED, "rreply", rejected_reply)
        .build();
    structure(vec![
        field("xid", uint()),
        field("body", union(enumeration(Protocol::Rpc, "msg_type"))
              .arm(CALL, "cbody", call_body)
              .arm(REPLY, "rbody", reply_body)
              .build()),
    ])
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Call,
    Reply,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Call => "call",
            Direction::Reply => "reply",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpaqueAuth {
    pub flavor: u32,
    pub body: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RpcCall {
    pub rpcvers: u32,
    pub program: u32,
    pub version: u32,
    pub procedure: u32,
    pub cred: OpaqueAuth,
    pub verf: OpaqueAuth,
    /// Decoded `authsys_parms` when the credential flavor is AUTH_SYS.
    pub auth_sys: Option<XdrValue>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RpcReply {
    Accepted {
        verf: OpaqueAuth,
        accept_stat: u32,
        /// Supported (low, high) versions for PROG_MISMATCH.
        mismatch: Option<(u32, u32)>,
    },
    Denied {
        reject_stat: u32,
        /// Supported (low, high) RPC versions for RPC_MISMATCH.
        mismatch: Option<(u32, u32)>,
        auth_stat: Option<u32>,
    },
}

impl RpcReply {
    /// Accepted with SUCCESS: procedure results follow the header.
    pub fn is_success(&self) -> bool {
        matches!(self, RpcReply::Accepted { accept_stat: SUCCESS, .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RpcBody {
    Call(RpcCall),
    Reply(RpcReply),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RpcHeader {
    pub xid: u32,
    pub body: RpcBody,
    /// The decoded `rpc_msg` header tree.
    pub record: XdrValue,
    /// Offset of the procedure arguments or results in the message.
    pub body_offset: usize,
}

impl RpcHeader {
    pub fn direction(&self) -> Direction {
        match self.body {
            RpcBody::Call(_) => Direction::Call,
            RpcBody::Reply(_) => Direction::Reply,
        }
    }

    pub fn call(&self) -> Option<&RpcCall> {
        match &self.body {
            RpcBody::Call(c) => Some(c),
            _ => None,
        }
    }

    pub fn reply(&self) -> Option<&RpcReply> {
        match &self.body {
            RpcBody::Reply(r) => Some(r),
            _ => None,
        }
    }
}

fn shape(path: &'static str) -> DecodeError {
    DecodeError::new(ErrorKind::ShapeMismatch("rpc_msg header"), path.to_string(), 0)
        .in_protocol("RPC")
}

fn u32_at(v: &XdrValue, path: &'static str) -> Result<u32, DecodeError> {
    v.path(path).and_then(|v| v.as_u32()).ok_or_else(|| shape(path))
}

fn discriminant_at(v: &XdrValue, path: &'static str) -> Result<u32, DecodeError> {
    v.path(path).and_then(|v| v.as_union()).and_then(|u| u.discriminant.as_u32())
        .ok_or_else(|| shape(path))
}

fn auth_at(v: &XdrValue, path: &'static str) -> Result<OpaqueAuth, DecodeError> {
    let node = v.path(path).ok_or_else(|| shape(path))?;
    let flavor = node.get("flavor").and_then(|v| v.as_u32()).ok_or_else(|| shape(path))?;
    let body = node.get("body").and_then(|v| v.as_bytes()).ok_or_else(|| shape(path))?;
    Ok(OpaqueAuth { flavor, body: body.to_vec() })
}

fn mismatch_at(v: &XdrValue, path: &'static str) -> Option<(u32, u32)> {
    let node = v.path(path)?;
    Some((node.get("low")?.as_u32()?, node.get("high")?.as_u32()?))
}

/// Decode an RPC message header from a complete message (one UDP
/// datagram, one reassembled TCP record or one RDMA XDR stream).
pub fn decode_rpc_header(input: &[u8], strict_enums: bool) -> Result<RpcHeader, DecodeError> {
    let mut decoder = XdrDecoder::new(input).strict_enums(strict_enums);
    let record = decoder.decode(&RPC_MSG).map_err(|e| e.in_protocol("RPC"))?;
    let body_offset = decoder.offset();
    let xid = u32_at(&record, "xid")?;
    let body = match record.path("body") {
        Some(XdrValue::Union(u)) if u.arm == "cbody" => {
            let cred = auth_at(&record, "body.cbody.cred")?;
            let auth_sys = if cred.flavor == AUTH_SYS {
                let mut d = XdrDecoder::new(&cred.body).strict_enums(strict_enums);
                let v = d.decode(&AUTHSYS_PARMS).map_err(|e| {
                    let mut e = e.in_protocol("RPC");
                    e.path = format!("body.cbody.cred.body.{}", e.path);
                    e
                })?;
                Some(v)
            } else {
                None
            };
            RpcBody::Call(RpcCall {
                rpcvers: u32_at(&record, "body.cbody.rpcvers")?,
                program: u32_at(&record, "body.cbody.prog")?,
                version: u32_at(&record, "body.cbody.vers")?,
                procedure: u32_at(&record, "body.cbody.proc")?,
                cred,
                verf: auth_at(&record, "body.cbody.verf")?,
                auth_sys,
            })
        }
        Some(XdrValue::Union(u)) if u.arm == "rbody" => {
            match u.value.as_union() {
                Some(r) if r.arm == "areply" => RpcBody::Reply(RpcReply::Accepted {
                    verf: auth_at(&record, "body.rbody.areply.verf")?,
                    accept_stat: discriminant_at(&record, "body.rbody.areply.reply_data")?,
                    mismatch: mismatch_at(&record, "body.rbody.areply.reply_data.mismatch_info"),
                }),
                Some(r) if r.arm == "rreply" => RpcBody::Reply(RpcReply::Denied {
                    reject_stat: discriminant_at(&record, "body.rbody.rreply")?,
                    mismatch: mismatch_at(&record, "body.rbody.rreply.mismatch_info"),
                    auth_stat: record.path("body.rbody.rreply.stat").and_then(|v| v.as_u32()),
                }),
                _ => return Err(shape("body.rbody")),
            }
        }
        _ => return Err(shape("body")),
    };
    SCLogDebug!("rpc {} xid {:08x}, body at {}",
                if matches!(body, RpcBody::Call(_)) { "call" } else { "reply" },
                xid, body_offset);
    Ok(RpcHeader { xid, body, record, body_offset })
}

#[derive(Debug, PartialEq, Eq)]
pub struct RecordMark {
    pub last: bool,
    pub length: u32,
}

fn parse_bits(i: &[u8]) -> IResult<&[u8], (u8, u32)> {
    bits::<_, _, nom7::error::Error<(&[u8], usize)>, _, _>(tuple((
        take_bits(1u8),   // last fragment
        take_bits(31u32), // fragment length
    )))(i)
}

pub fn parse_record_mark(i: &[u8]) -> IResult<&[u8], RecordMark> {
    let (i, (last, length)) = parse_bits(i)?;
    Ok((i, RecordMark { last: last == 1, length }))
}

/// Parse one record: fragments up to and including the last one,
/// joined.
pub fn parse_record(input: &[u8]) -> IResult<&[u8], Vec<u8>> {
    let mut i = input;
    let mut record = Vec::new();
    loop {
        let (rem, mark) = parse_record_mark(i)?;
        let (rem, fragment) = take(mark.length as usize)(rem)?;
        record.extend_from_slice(fragment);
        i = rem;
        if mark.last {
            return Ok((i, record));
        }
    }
}

/// Take one record from the front of a TCP stream buffer. Returns the
/// record and the number of stream bytes it used.
pub fn read_record(input: &[u8], max_record: usize) -> Result<(Vec<u8>, usize), DecodeError> {
    // check the fragment lengths first so a huge announced size is not
    // waited for
    let mut i = input;
    let mut total = 0usize;
    loop {
        match parse_record_mark(i) {
            Ok((rem, mark)) => {
                total += mark.length as usize;
                if total > max_record {
                    return Err(DecodeError::new(
                        ErrorKind::LengthExceeded { length: total.min(u32::MAX as usize) as u32,
                                                    max: max_record.min(u32::MAX as usize) as u32 },
                        "record_mark".to_string(), input.len() - i.len()).in_protocol("RPC"));
                }
                if mark.last || rem.len() < mark.length as usize {
                    break;
                }
                i = &rem[mark.length as usize..];
            }
            Err(_) => break,
        }
    }
    match parse_record(input) {
        Ok((rem, record)) => Ok((record, input.len() - rem.len())),
        Err(Err::Incomplete(needed)) => {
            let needed = match needed {
                Needed::Size(n) => n.get(),
                Needed::Unknown => 1,
            };
            Err(DecodeError::new(ErrorKind::TruncatedData { needed },
                                 "record_mark".to_string(), input.len()).in_protocol("RPC"))
        }
        Err(_) => Err(DecodeError::new(ErrorKind::MalformedEncoding("bad record mark"),
                                       "record_mark".to_string(), 0).in_protocol("RPC")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nom7::Err::Incomplete;
    use nom7::Needed;

    const NULL_CALL: &[u8] = &[
        0x8e, 0x28, 0x02, 0x7e, // xid
        0x00, 0x00, 0x00, 0x00, // msgtype CALL
        0x00, 0x00, 0x00, 0x02, // rpcver
        0x00, 0x01, 0x86, 0xa3, // program 100003
        0x00, 0x00, 0x00, 0x03, // progver
        0x00, 0x00, 0x00, 0x00, // procedure NULL
        0x00, 0x00, 0x00, 0x01, // cred AUTH_SYS
        0x00, 0x00, 0x00, 0x1c, // cred len 28
        0x00, 0x00, 0x00, 0x2a, // stamp
        0x00, 0x00, 0x00, 0x04, b'h', b'o', b's', b't', // machinename
        0x00, 0x00, 0x03, 0xe8, // uid 1000
        0x00, 0x00, 0x03, 0xe8, // gid 1000
        0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x0a, // gids [10]
        0x00, 0x00, 0x00, 0x00, // verf AUTH_NONE
        0x00, 0x00, 0x00, 0x00,
    ];

    #[test]
    fn test_call_header() {
        let hdr = decode_rpc_header(NULL_CALL, false).unwrap();
        assert_eq!(hdr.xid, 0x8e28027e);
        assert_eq!(hdr.direction(), Direction::Call);
        assert_eq!(hdr.body_offset, NULL_CALL.len());
        let call = hdr.call().unwrap();
        assert_eq!(call.program, NFS_PROGRAM);
        assert_eq!(call.version, 3);
        assert_eq!(call.cred.flavor, AUTH_SYS);
        let sys = call.auth_sys.as_ref().unwrap();
        assert_eq!(sys.path("machinename").unwrap().as_bytes(), Some(&b"host"[..]));
        assert_eq!(sys.path("uid").unwrap().as_u32(), Some(1000));
        assert_eq!(sys.path("gids.0").unwrap().as_u32(), Some(10));
    }

    #[test]
    fn test_accepted_reply_header() {
        let buf: &[u8] = &[
            0x8e, 0x28, 0x02, 0x7e, // xid
            0x00, 0x00, 0x00, 0x01, // REPLY
            0x00, 0x00, 0x00, 0x00, // MSG_ACCEPTED
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // verf
            0x00, 0x00, 0x00, 0x00, // SUCCESS
            0x00, 0x00, 0x00, 0x00, // results start here
        ];
        let hdr = decode_rpc_header(buf, false).unwrap();
        assert_eq!(hdr.body_offset, 24);
        assert!(hdr.reply().unwrap().is_success());
    }

    #[test]
    fn test_denied_reply_header() {
        let buf: &[u8] = &[
            0x00, 0x00, 0x00, 0x07,
            0x00, 0x00, 0x00, 0x01, // REPLY
            0x00, 0x00, 0x00, 0x01, // MSG_DENIED
            0x00, 0x00, 0x00, 0x00, // RPC_MISMATCH
            0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x02,
        ];
        let hdr = decode_rpc_header(buf, false).unwrap();
        assert_eq!(hdr.reply(), Some(&RpcReply::Denied {
            reject_stat: RPC_MISMATCH,
            mismatch: Some((2, 2)),
            auth_stat: None,
        }));
    }

    #[test]
    fn test_bad_msg_type() {
        let buf: &[u8] = &[0x00, 0x00, 0x00, 0x07, 0x00, 0x00, 0x00, 0x05];
        let err = decode_rpc_header(buf, false).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownUnionArm(5));
        assert_eq!(err.protocol, "RPC");
    }

    #[test]
    fn test_truncated_header() {
        let err = decode_rpc_header(&NULL_CALL[..30], false).unwrap_err();
        assert!(err.is_truncated());
    }

    #[test]
    fn test_record_mark_incomplete() {
        let buf: &[u8] = &[0x80, 0x00];
        match parse_record_mark(buf) {
            Err(Incomplete(_)) => {}
            r => panic!("failed {:?}", r),
        }
        let r = parse_record(&[0x80, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x01]);
        match r {
            Err(Incomplete(s)) => assert_eq!(s, Needed::new(4)),
            _ => panic!("failed {:?}", r),
        }
    }

    #[test]
    fn test_record_fragments_joined() {
        let buf: &[u8] = &[
            0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x07, // first fragment
            0x80, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, // last fragment
            0xff, // next record
        ];
        let (record, used) = read_record(buf, 1024).unwrap();
        assert_eq!(record, vec![0, 0, 0, 7, 0, 0, 0, 0]);
        assert_eq!(used, 16);
    }

    #[test]
    fn test_record_too_big() {
        let buf: &[u8] = &[0x80, 0x10, 0x00, 0x00];
        let err = read_record(buf, 4096).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::LengthExceeded { .. }));
    }
}
