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

//! XDR (RFC 4506) codec driven by type descriptors.

pub mod chunks;
pub mod decoder;
pub mod encoder;
pub mod types;
pub mod value;

pub use self::chunks::{ChunkData, ChunkKind, ChunkMap, ChunkRef};
pub use self::decoder::{decode, XdrDecoder};
pub use self::encoder::encode;
pub use self::types::XdrType;
pub use self::value::{EnumValue, Record, UnionValue, XdrValue};
