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

//! Rebuilds the logical RPC message of an RPC-over-RDMA transfer from
//! its inline part and its chunks.

use std::collections::{BTreeMap, HashMap};

use crate::error::DecodeError;
use crate::rpcordma::rpcordma_records::*;
use crate::xdr::{ChunkData, ChunkKind, ChunkMap, ChunkRef};

/// Access to data moved by RDMA READ or WRITE operations, which a
/// capture sees apart from the SEND carrying the transport header.
pub trait ChunkSource {
    /// The `length` bytes at `offset` of the memory region `handle`, if
    /// the capture has all of them.
    fn fetch(&self, handle: u32, offset: u64, length: u32) -> Option<Vec<u8>>;
}

/// Source for captures without any RDMA data transfers.
pub struct NoChunkData;

impl ChunkSource for NoChunkData {
    fn fetch(&self, _handle: u32, _offset: u64, _length: u32) -> Option<Vec<u8>> {
        None
    }
}

/// Captured RDMA data transfers, by handle and offset.
#[derive(Default)]
pub struct ChunkStore {
    regions: HashMap<u32, BTreeMap<u64, Vec<u8>>>,
}

impl ChunkStore {
    pub fn new() -> ChunkStore {
        ChunkStore::default()
    }

    pub fn insert(&mut self, handle: u32, offset: u64, data: Vec<u8>) {
        self.regions.entry(handle).or_default().insert(offset, data);
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

impl ChunkSource for ChunkStore {
    fn fetch(&self, handle: u32, offset: u64, length: u32) -> Option<Vec<u8>> {
        let region = self.regions.get(&handle)?;
        let end = offset.checked_add(length as u64)?;
        let mut out = Vec::with_capacity(length as usize);
        let mut at = offset;
        // walk the stored pieces covering [offset, end)
        while at < end {
            let (&start, data) = region.range(..=at).next_back()?;
            let piece_end = start + data.len() as u64;
            if piece_end <= at {
                return None;
            }
            let from = (at - start) as usize;
            let to = (piece_end.min(end) - start) as usize;
            out.extend_from_slice(&data[from..to]);
            at = start + to as u64;
        }
        Some(out)
    }
}

/// Logical RPC message of one RDMA SEND.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RdmaPayload {
    /// The RPC message is available. Read chunks and, for replies,
    /// write chunks are resolved through `chunks` while decoding.
    Message { stream: Vec<u8>, chunks: ChunkMap },
    /// RDMA_NOMSG whose message chunk is not in the capture.
    Unresolved(ChunkRef),
    /// RDMA_ERROR carries no RPC message.
    Error(RdmaError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RdmaMessage {
    pub header: RdmaHeader,
    pub payload: RdmaPayload,
}

fn violation(path: &str, offset: usize, reason: String) -> DecodeError {
    DecodeError::violation("RPCORDMA", path, offset, reason)
}

/// Read chunk positions must be 4-byte aligned and increase through the
/// list. Position zero means the whole message and is only valid in
/// RDMA_NOMSG.
pub fn validate_chunks(chunks: &RdmaChunks, nomsg: bool) -> Result<(), DecodeError> {
    let mut last: Option<u32> = None;
    for (i, chunk) in chunks.reads.iter().enumerate() {
        let path = format!("rdma_reads.{}.position", i);
        if chunk.position % 4 != 0 {
            return Err(violation(&path, chunk.offset, format!(
                "read chunk position {} is not XDR aligned", chunk.position)));
        }
        if chunk.position == 0 && !nomsg {
            return Err(violation(&path, chunk.offset,
                "position zero read chunk outside RDMA_NOMSG".to_string()));
        }
        if let Some(prev) = last {
            if chunk.position < prev {
                return Err(violation(&path, chunk.offset, format!(
                    "read chunk position {} before previous position {}",
                    chunk.position, prev)));
            }
        }
        last = Some(chunk.position);
    }
    if nomsg && chunks.is_empty() {
        return Err(violation("rdma_nomsg", RDMA_BODY_OFFSET,
            "RDMA_NOMSG without any chunk".to_string()));
    }
    Ok(())
}

fn resolve(segments: &[RdmaSegment], source: &dyn ChunkSource) -> Option<Vec<u8>> {
    let mut data = Vec::with_capacity(segments_len(segments) as usize);
    for s in segments {
        data.extend(source.fetch(s.handle, s.offset, s.length)?);
    }
    Some(data)
}

fn chunk_ref(kind: ChunkKind, index: usize, position: u32, segments: &[RdmaSegment]) -> ChunkRef {
    ChunkRef {
        kind,
        index,
        position,
        length: segments_len(segments),
        handles: segments.iter().map(|s| s.handle).collect(),
    }
}

fn chunk_map(chunks: &RdmaChunks, skip_first_read: bool, source: &dyn ChunkSource) -> ChunkMap {
    let mut map = ChunkMap::new();
    for (i, chunk) in chunks.reads.iter().enumerate() {
        if skip_first_read && i == 0 {
            continue;
        }
        map.reads.push(ChunkData {
            reference: chunk_ref(ChunkKind::Read, i, chunk.position, &chunk.segments),
            data: resolve(&chunk.segments, source),
        });
    }
    for (i, chunk) in chunks.writes.iter().enumerate() {
        map.writes.push(ChunkData {
            reference: chunk_ref(ChunkKind::Write, i, 0, &chunk.segments),
            data: resolve(&chunk.segments, source),
        });
    }
    map
}

/// Decode the transport header of `payload` and rebuild the RPC message
/// it carries.
pub fn reassemble(payload: &[u8], source: &dyn ChunkSource, strict_enums: bool)
    -> Result<RdmaMessage, DecodeError>
{
    let header = decode_rdma_header(payload, strict_enums)?;
    let inline = &payload[header.header_len..];
    let payload = match &header.body {
        RdmaBody::Error(err) => RdmaPayload::Error(err.clone()),
        RdmaBody::Msg(chunks) => {
            validate_chunks(chunks, false)?;
            RdmaPayload::Message {
                stream: inline.to_vec(),
                chunks: chunk_map(chunks, false, source),
            }
        }
        RdmaBody::NoMsg(chunks) => {
            validate_chunks(chunks, true)?;
            if !inline.is_empty() {
                SCLogDebug!("rdma_nomsg xid {:08x}: ignoring {} inline bytes",
                            header.xid, inline.len());
            }
            // a long call is in the position zero read chunk, a long
            // reply in the reply chunk
            let (message, skip_first) = match chunks.reads.first() {
                Some(first) if first.position == 0 => {
                    (Some((chunk_ref(ChunkKind::Read, 0, 0, &first.segments),
                           resolve(&first.segments, source))), true)
                }
                _ => match &chunks.reply {
                    Some(reply) => (Some((chunk_ref(ChunkKind::Reply, 0, 0, &reply.segments),
                                          resolve(&reply.segments, source))), false),
                    None => (None, false),
                },
            };
            match message {
                Some((_, Some(stream))) => RdmaPayload::Message {
                    stream,
                    chunks: chunk_map(chunks, skip_first, source),
                },
                Some((reference, None)) => {
                    SCLogDebug!("rdma_nomsg xid {:08x}: message chunk not captured", header.xid);
                    RdmaPayload::Unresolved(reference)
                }
                None => {
                    return Err(violation("rdma_nomsg", RDMA_BODY_OFFSET,
                        "RDMA_NOMSG without a position zero read chunk or reply chunk"
                        .to_string()));
                }
            }
        }
    };
    Ok(RdmaMessage { header, payload })
}

/// The RPC xid inside an RDMA message must be the transport xid.
pub fn check_xid(header: &RdmaHeader, rpc_xid: u32) -> Result<(), DecodeError> {
    if header.xid != rpc_xid {
        return Err(violation("rdma_xid", 0, format!(
            "rdma_xid {:08x} does not match rpc xid {:08x}", header.xid, rpc_xid)));
    }
    Ok(())
}
