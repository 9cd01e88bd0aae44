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

/* RFC 8166, RPC-over-RDMA version 1 */

use crate::registry::{EnumEntry, EnumTable, Protocol};

pub const RPCRDMA_VERSION: u32 = 1;

pub const ERR_VERS:  u32 = 1;
pub const ERR_CHUNK: u32 = 2;

pub const RDMA_MSG:   u32 = 0;
pub const RDMA_NOMSG: u32 = 1;
pub const RDMA_MSGP:  u32 = 2;
pub const RDMA_DONE:  u32 = 3;
pub const RDMA_ERROR: u32 = 4;

pub static RPC_RDMA_ERRCODE: EnumTable = EnumTable {
    protocol: Protocol::RpcOrdma,
    name: "rpc_rdma_errcode",
    entries: &[
        EnumEntry::fixed(ERR_VERS, "ERR_VERS"),
        EnumEntry::new(ERR_CHUNK, "ERR_CHUNK"),
    ],
};

pub static RDMA_PROC: EnumTable = EnumTable {
    protocol: Protocol::RpcOrdma,
    name: "rdma_proc",
    entries: &[
        EnumEntry::fixed(RDMA_MSG, "RDMA_MSG"),
        EnumEntry::fixed(RDMA_NOMSG, "RDMA_NOMSG"),
        EnumEntry::not_to_be_used(RDMA_MSGP, "RDMA_MSGP"),
        EnumEntry::not_to_be_used(RDMA_DONE, "RDMA_DONE"),
        EnumEntry::fixed(RDMA_ERROR, "RDMA_ERROR"),
    ],
};

pub static TABLES: &[&EnumTable] = &[
    &RPC_RDMA_ERRCODE,
    &RDMA_PROC,
];
