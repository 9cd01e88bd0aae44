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

//! Out-of-line data for the decoder.
//!
//! RPC-over-RDMA removes some opaque payloads from the inline XDR stream
//! and moves them in separate chunks. A [`ChunkMap`] tells the decoder
//! where such data belongs so it can splice it back in, or leave an
//! explicit placeholder when the capture does not have it.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChunkKind {
    Read,
    Write,
    Reply,
}

impl ChunkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkKind::Read => "read",
            ChunkKind::Write => "write",
            ChunkKind::Reply => "reply",
        }
    }
}

/// Placeholder for chunk data that could not be resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkRef {
    pub kind: ChunkKind,
    /// Index of the chunk in its list.
    pub index: usize,
    /// XDR position in the reconstructed stream. Zero for write and
    /// reply chunks.
    pub position: u32,
    /// Bytes the chunk carries according to its segments.
    pub length: u32,
    /// Remote access handles (steering tags) of the segments.
    pub handles: Vec<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkData {
    pub reference: ChunkRef,
    pub data: Option<Vec<u8>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChunkMap {
    /// Sorted by position.
    pub reads: Vec<ChunkData>,
    /// In list order. Consumed by DDP-eligible fields of replies.
    pub writes: Vec<ChunkData>,
}

impl ChunkMap {
    pub fn new() -> ChunkMap {
        ChunkMap::default()
    }

    pub fn is_empty(&self) -> bool {
        self.reads.is_empty() && self.writes.is_empty()
    }

    pub fn read_at(&self, position: usize) -> Option<&ChunkData> {
        self.reads.iter().find(|c| c.reference.position as usize == position)
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &ChunkRef> {
        self.reads.iter().chain(self.writes.iter())
            .filter(|c| c.data.is_none())
            .map(|c| &c.reference)
    }
}
