/* Copyright (C) 2017-2026 Open Information Security Foundation
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

//! Decoding of ONC RPC, NFSv3, NLMv4 and RPC-over-RDMA traffic for
//! protocol conformance testing.

#![cfg_attr(feature = "strict", deny(warnings))]

// Clippy lints we want to suppress due to style, or simply too noisy
// and not a priority right now.
#![allow(clippy::needless_return)]
#![allow(clippy::redundant_field_names)]
#![allow(clippy::len_zero)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::match_like_matches_macro)]
#![allow(clippy::new_without_default)]
#![allow(clippy::module_inception)]
#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::field_reassign_with_default)]
#![allow(clippy::large_enum_variant)]

#[macro_use]
pub mod log;

pub mod error;
pub mod registry;
pub mod xdr;
pub mod rpc;
pub mod nfs;
pub mod rpcordma;
pub mod conf;
pub mod decoder;
pub mod json;

pub use crate::decoder::{Decoder, DecoderConfig, Event, EventSink, Message, Packet, Transport};
pub use crate::error::{DecodeError, ErrorKind};
pub use crate::registry::{lookup, Protocol};
