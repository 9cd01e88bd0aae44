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

use crate::registry::{EnumEntry, EnumTable, Protocol, SizeLimit};

/* RFC 1813, section '2.4 Sizes' */
pub const NFS3_FHSIZE:         u32 = 64;
pub const NFS3_COOKIEVERFSIZE: u32 = 8;
pub const NFS3_CREATEVERFSIZE: u32 = 8;
pub const NFS3_WRITEVERFSIZE:  u32 = 8;

/* RFC 1813, section '3. Server Procedures' */
pub const NFSPROC3_NULL:        u32 = 0;
pub const NFSPROC3_GETATTR:     u32 = 1;
pub const NFSPROC3_SETATTR:     u32 = 2;
pub const NFSPROC3_LOOKUP:      u32 = 3;
pub const NFSPROC3_ACCESS:      u32 = 4;
pub const NFSPROC3_READLINK:    u32 = 5;
pub const NFSPROC3_READ:        u32 = 6;
pub const NFSPROC3_WRITE:       u32 = 7;
pub const NFSPROC3_CREATE:      u32 = 8;
pub const NFSPROC3_MKDIR:       u32 = 9;
pub const NFSPROC3_SYMLINK:     u32 = 10;
pub const NFSPROC3_MKNOD:       u32 = 11;
pub const NFSPROC3_REMOVE:      u32 = 12;
pub const NFSPROC3_RMDIR:       u32 = 13;
pub const NFSPROC3_RENAME:      u32 = 14;
pub const NFSPROC3_LINK:        u32 = 15;
pub const NFSPROC3_READDIR:     u32 = 16;
pub const NFSPROC3_READDIRPLUS: u32 = 17;
pub const NFSPROC3_FSSTAT:      u32 = 18;
pub const NFSPROC3_FSINFO:      u32 = 19;
pub const NFSPROC3_PATHCONF:    u32 = 20;
pub const NFSPROC3_COMMIT:      u32 = 21;

/* RFC 1813, section '2.6 Defined Error Numbers' */
pub const NFS3_OK:              u32 = 0;
pub const NFS3ERR_PERM:         u32 = 1;
pub const NFS3ERR_NOENT:        u32 = 2;
pub const NFS3ERR_IO:           u32 = 5;
pub const NFS3ERR_NXIO:         u32 = 6;
pub const NFS3ERR_ACCES:        u32 = 13;
pub const NFS3ERR_EXIST:        u32 = 17;
pub const NFS3ERR_XDEV:         u32 = 18;
pub const NFS3ERR_NODEV:        u32 = 19;
pub const NFS3ERR_NOTDIR:       u32 = 20;
pub const NFS3ERR_ISDIR:        u32 = 21;
pub const NFS3ERR_INVAL:        u32 = 22;
pub const NFS3ERR_FBIG:         u32 = 27;
pub const NFS3ERR_NOSPC:        u32 = 28;
pub const NFS3ERR_ROFS:         u32 = 30;
pub const NFS3ERR_MLINK:        u32 = 31;
pub const NFS3ERR_NAMETOOLONG:  u32 = 63;
pub const NFS3ERR_NOTEMPTY:     u32 = 66;
pub const NFS3ERR_DQUOT:        u32 = 69;
pub const NFS3ERR_STALE:        u32 = 70;
pub const NFS3ERR_REMOTE:       u32 = 71;
pub const NFS3ERR_BADHANDLE:    u32 = 10001;
pub const NFS3ERR_NOT_SYNC:     u32 = 10002;
pub const NFS3ERR_BAD_COOKIE:   u32 = 10003;
pub const NFS3ERR_NOTSUPP:      u32 = 10004;
pub const NFS3ERR_TOOSMALL:     u32 = 10005;
pub const NFS3ERR_SERVERFAULT:  u32 = 10006;
pub const NFS3ERR_BADTYPE:      u32 = 10007;
pub const NFS3ERR_JUKEBOX:      u32 = 10008;

pub static NFS_PROC3: EnumTable = EnumTable {
    protocol: Protocol::Nfs3,
    name: "nfs_proc3",
    entries: &[
        EnumEntry::new(NFSPROC3_NULL, "NULL"),
        EnumEntry::new(NFSPROC3_GETATTR, "GETATTR"),
        EnumEntry::new(NFSPROC3_SETATTR, "SETATTR"),
        EnumEntry::new(NFSPROC3_LOOKUP, "LOOKUP"),
        EnumEntry::new(NFSPROC3_ACCESS, "ACCESS"),
        EnumEntry::new(NFSPROC3_READLINK, "READLINK"),
        EnumEntry::new(NFSPROC3_READ, "READ"),
        EnumEntry::new(NFSPROC3_WRITE, "WRITE"),
        EnumEntry::new(NFSPROC3_CREATE, "CREATE"),
        EnumEntry::new(NFSPROC3_MKDIR, "MKDIR"),
        EnumEntry::new(NFSPROC3_SYMLINK, "SYMLINK"),
        EnumEntry::new(NFSPROC3_MKNOD, "MKNOD"),
        EnumEntry::new(NFSPROC3_REMOVE, "REMOVE"),
        EnumEntry::new(NFSPROC3_RMDIR, "RMDIR"),
        EnumEntry::new(NFSPROC3_RENAME, "RENAME"),
        EnumEntry::new(NFSPROC3_LINK, "LINK"),
        EnumEntry::new(NFSPROC3_READDIR, "READDIR"),
        EnumEntry::new(NFSPROC3_READDIRPLUS, "READDIRPLUS"),
        EnumEntry::new(NFSPROC3_FSSTAT, "FSSTAT"),
        EnumEntry::new(NFSPROC3_FSINFO, "FSINFO"),
        EnumEntry::new(NFSPROC3_PATHCONF, "PATHCONF"),
        EnumEntry::new(NFSPROC3_COMMIT, "COMMIT"),
    ],
};

pub static NFSSTAT3: EnumTable = EnumTable {
    protocol: Protocol::Nfs3,
    name: "nfsstat3",
    entries: &[
        EnumEntry::new(NFS3_OK, "NFS3_OK"),
        EnumEntry::new(NFS3ERR_PERM, "NFS3ERR_PERM"),
        EnumEntry::new(NFS3ERR_NOENT, "NFS3ERR_NOENT"),
        EnumEntry::new(NFS3ERR_IO, "NFS3ERR_IO"),
        EnumEntry::new(NFS3ERR_NXIO, "NFS3ERR_NXIO"),
        EnumEntry::new(NFS3ERR_ACCES, "NFS3ERR_ACCES"),
        EnumEntry::new(NFS3ERR_EXIST, "NFS3ERR_EXIST"),
        EnumEntry::new(NFS3ERR_XDEV, "NFS3ERR_XDEV"),
        EnumEntry::new(NFS3ERR_NODEV, "NFS3ERR_NODEV"),
        EnumEntry::new(NFS3ERR_NOTDIR, "NFS3ERR_NOTDIR"),
        EnumEntry::new(NFS3ERR_ISDIR, "NFS3ERR_ISDIR"),
        EnumEntry::new(NFS3ERR_INVAL, "NFS3ERR_INVAL"),
        EnumEntry::new(NFS3ERR_FBIG, "NFS3ERR_FBIG"),
        EnumEntry::new(NFS3ERR_NOSPC, "NFS3ERR_NOSPC"),
        EnumEntry::new(NFS3ERR_ROFS, "NFS3ERR_ROFS"),
        EnumEntry::new(NFS3ERR_MLINK, "NFS3ERR_MLINK"),
        EnumEntry::new(NFS3ERR_NAMETOOLONG, "NFS3ERR_NAMETOOLONG"),
        EnumEntry::new(NFS3ERR_NOTEMPTY, "NFS3ERR_NOTEMPTY"),
        EnumEntry::new(NFS3ERR_DQUOT, "NFS3ERR_DQUOT"),
        EnumEntry::new(NFS3ERR_STALE, "NFS3ERR_STALE"),
        EnumEntry::new(NFS3ERR_REMOTE, "NFS3ERR_REMOTE"),
        EnumEntry::new(NFS3ERR_BADHANDLE, "NFS3ERR_BADHANDLE"),
        EnumEntry::new(NFS3ERR_NOT_SYNC, "NFS3ERR_NOT_SYNC"),
        EnumEntry::new(NFS3ERR_BAD_COOKIE, "NFS3ERR_BAD_COOKIE"),
        EnumEntry::new(NFS3ERR_NOTSUPP, "NFS3ERR_NOTSUPP"),
        EnumEntry::new(NFS3ERR_TOOSMALL, "NFS3ERR_TOOSMALL"),
        EnumEntry::new(NFS3ERR_SERVERFAULT, "NFS3ERR_SERVERFAULT"),
        EnumEntry::new(NFS3ERR_BADTYPE, "NFS3ERR_BADTYPE"),
        EnumEntry::new(NFS3ERR_JUKEBOX, "NFS3ERR_JUKEBOX"),
    ],
};

pub static FTYPE3: EnumTable = EnumTable {
    protocol: Protocol::Nfs3,
    name: "ftype3",
    entries: &[
        EnumEntry::new(1, "NF3REG"),
        EnumEntry::new(2, "NF3DIR"),
        EnumEntry::new(3, "NF3BLK"),
        EnumEntry::new(4, "NF3CHR"),
        EnumEntry::new(5, "NF3LNK"),
        EnumEntry::new(6, "NF3SOCK"),
        EnumEntry::new(7, "NF3FIFO"),
    ],
};

pub static STABLE_HOW: EnumTable = EnumTable {
    protocol: Protocol::Nfs3,
    name: "stable_how",
    entries: &[
        EnumEntry::new(0, "UNSTABLE"),
        EnumEntry::new(1, "DATA_SYNC"),
        EnumEntry::new(2, "FILE_SYNC"),
    ],
};

pub static CREATEMODE3: EnumTable = EnumTable {
    protocol: Protocol::Nfs3,
    name: "createmode3",
    entries: &[
        EnumEntry::new(0, "UNCHECKED"),
        EnumEntry::new(1, "GUARDED"),
        EnumEntry::new(2, "EXCLUSIVE"),
    ],
};

pub static TIME_HOW: EnumTable = EnumTable {
    protocol: Protocol::Nfs3,
    name: "time_how",
    entries: &[
        EnumEntry::new(0, "DONT_CHANGE"),
        EnumEntry::new(1, "SET_TO_SERVER_TIME"),
        EnumEntry::new(2, "SET_TO_CLIENT_TIME"),
    ],
};

pub static TABLES: &[&EnumTable] = &[
    &NFS_PROC3,
    &NFSSTAT3,
    &FTYPE3,
    &STABLE_HOW,
    &CREATEMODE3,
    &TIME_HOW,
];

pub static LIMITS: &[SizeLimit] = &[
    SizeLimit { protocol: Protocol::Nfs3, name: "NFS3_FHSIZE", value: NFS3_FHSIZE },
    SizeLimit { protocol: Protocol::Nfs3, name: "NFS3_COOKIEVERFSIZE", value: NFS3_COOKIEVERFSIZE },
    SizeLimit { protocol: Protocol::Nfs3, name: "NFS3_CREATEVERFSIZE", value: NFS3_CREATEVERFSIZE },
    SizeLimit { protocol: Protocol::Nfs3, name: "NFS3_WRITEVERFSIZE", value: NFS3_WRITEVERFSIZE },
];
