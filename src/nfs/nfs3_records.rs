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

//! NFSv3 (RFC 1813) argument and result shapes

use crate::nfs::nfs3_types::*;
use crate::registry::Protocol;
use crate::rpc::programs::Program;
use crate::rpc::types::NFS_PROGRAM;
use crate::xdr::types::*;

fn nfs_fh3() -> XdrType {
    structure(vec![field("data", opaque(Some(NFS3_FHSIZE)))])
}

fn filename3() -> XdrType {
    string(None)
}

fn nfspath3() -> XdrType {
    string(None)
}

fn nfstime3() -> XdrType {
    structure(vec![
        field("seconds", uint()),
        field("nseconds", uint()),
    ])
}

fn specdata3() -> XdrType {
    structure(vec![
        field("specdata1", uint()),
        field("specdata2", uint()),
    ])
}

fn fattr3() -> XdrType {
    structure(vec![
        field("type", enumeration(Protocol::Nfs3, "ftype3")),
        field("mode", uint()),
        field("nlink", uint()),
        field("uid", uint()),
        field("gid", uint()),
        field("size", uhyper()),
        field("used", uhyper()),
        field("rdev", specdata3()),
        field("fsid", uhyper()),
        field("fileid", uhyper()),
        field("atime", nfstime3()),
        field("mtime", nfstime3()),
        field("ctime", nfstime3()),
    ])
}

/// `union switch (bool)`, the "present or not" idiom of RFC 1813.
fn present(name: &'static str, ty: XdrType) -> XdrType {
    union(boolean())
        .arm(1, name, ty)
        .arm(0, "void", void())
        .build()
}

fn post_op_attr() -> XdrType {
    present("attributes", fattr3())
}

fn pre_op_attr() -> XdrType {
    present("attributes", structure(vec![
        field("size", uhyper()),
        field("mtime", nfstime3()),
        field("ctime", nfstime3()),
    ]))
}

fn wcc_data() -> XdrType {
    structure(vec![
        field("before", pre_op_attr()),
        field("after", post_op_attr()),
    ])
}

fn post_op_fh3() -> XdrType {
    present("handle", nfs_fh3())
}

fn set_time(name: &'static str) -> XdrType {
    union(enumeration(Protocol::Nfs3, "time_how"))
        .arm(2, name, nfstime3())
        .default_arm("void", void())
        .build()
}

fn sattr3() -> XdrType {
    structure(vec![
        field("mode", present("mode", uint())),
        field("uid", present("uid", uint())),
        field("gid", present("gid", uint())),
        field("size", present("size", uhyper())),
        field("atime", set_time("atime")),
        field("mtime", set_time("mtime")),
    ])
}

fn diropargs3() -> XdrType {
    structure(vec![
        field("dir", nfs_fh3()),
        field("name", filename3()),
    ])
}

/// Results switched on nfsstat3: `resok` for NFS3_OK, `resfail` otherwise.
fn result(ok: XdrType, fail: XdrType) -> XdrType {
    union(enumeration(Protocol::Nfs3, "nfsstat3"))
        .arm(NFS3_OK, "resok", ok)
        .default_arm("resfail", fail)
        .build()
}

fn attr_result(ok: Vec<Field>) -> XdrType {
    let mut fields = vec![field("obj_attributes", post_op_attr())];
    fields.extend(ok);
    result(structure(fields), structure(vec![field("obj_attributes", post_op_attr())]))
}

fn diropres3() -> XdrType {
    result(
        structure(vec![
            field("obj", post_op_fh3()),
            field("obj_attributes", post_op_attr()),
            field("dir_wcc", wcc_data()),
        ]),
        structure(vec![field("dir_wcc", wcc_data())]),
    )
}

fn wcc_result(name: &'static str) -> XdrType {
    result(structure(vec![field(name, wcc_data())]),
           structure(vec![field(name, wcc_data())]))
}

fn getattr() -> (XdrType, XdrType) {
    (structure(vec![field("object", nfs_fh3())]),
     result(structure(vec![field("obj_attributes", fattr3())]), void()))
}

fn setattr() -> (XdrType, XdrType) {
    (structure(vec![
        field("object", nfs_fh3()),
        field("new_attributes", sattr3()),
        field("guard", present("obj_ctime", nfstime3())),
    ]),
     wcc_result("obj_wcc"))
}

fn lookup() -> (XdrType, XdrType) {
    (structure(vec![field("what", diropargs3())]),
     result(
         structure(vec![
             field("object", nfs_fh3()),
             field("obj_attributes", post_op_attr()),
             field("dir_attributes", post_op_attr()),
         ]),
         structure(vec![field("dir_attributes", post_op_attr())]),
     ))
}

fn access() -> (XdrType, XdrType) {
    (structure(vec![
        field("object", nfs_fh3()),
        field("access", uint()),
    ]),
     attr_result(vec![field("access", uint())]))
}

fn readlink() -> (XdrType, XdrType) {
    (structure(vec![field("symlink", nfs_fh3())]),
     result(
         structure(vec![
             field("symlink_attributes", post_op_attr()),
             field("data", nfspath3().ddp()),
         ]),
         structure(vec![field("symlink_attributes", post_op_attr())]),
     ))
}

fn read() -> (XdrType, XdrType) {
    (structure(vec![
        field("file", nfs_fh3()),
        field("offset", uhyper()),
        field("count", uint()),
    ]),
     result(
         structure(vec![
             field("file_attributes", post_op_attr()),
             field("count", uint()),
             field("eof", boolean()),
             field("data", opaque(None).ddp()),
         ]),
         structure(vec![field("file_attributes", post_op_attr())]),
     ))
}

fn write() -> (XdrType, XdrType) {
    (structure(vec![
        field("file", nfs_fh3()),
        field("offset", uhyper()),
        field("count", uint()),
        field("stable", enumeration(Protocol::Nfs3, "stable_how")),
        field("data", opaque(None).ddp()),
    ]),
     result(
         structure(vec![
             field("file_wcc", wcc_data()),
             field("count", uint()),
             field("committed", enumeration(Protocol::Nfs3, "stable_how")),
             field("verf", opaque_fixed(NFS3_WRITEVERFSIZE)),
         ]),
         structure(vec![field("file_wcc", wcc_data())]),
     ))
}

fn create() -> (XdrType, XdrType) {
    let how = union(enumeration(Protocol::Nfs3, "createmode3"))
        .arm(0, "obj_attributes", sattr3())
        .arm(1, "obj_attributes", sattr3())
        .arm(2, "verf", opaque_fixed(NFS3_CREATEVERFSIZE))
        .build();
    (structure(vec![
        field("where", diropargs3()),
        field("how", how),
    ]),
     diropres3())
}

fn mkdir() -> (XdrType, XdrType) {
    (structure(vec![
        field("where", diropargs3()),
        field("attributes", sattr3()),
    ]),
     diropres3())
}

fn symlink() -> (XdrType, XdrType) {
    (structure(vec![
        field("where", diropargs3()),
        field("symlink", structure(vec![
            field("symlink_attributes", sattr3()),
            field("symlink_data", nfspath3()),
        ])),
    ]),
     diropres3())
}

fn mknod() -> (XdrType, XdrType) {
    let device = || structure(vec![
        field("dev_attributes", sattr3()),
        field("spec", specdata3()),
    ]);
    let what = union(enumeration(Protocol::Nfs3, "ftype3"))
        .arm(4, "device", device())
        .arm(3, "device", device())
        .arm(6, "pipe_attributes", sattr3())
        .arm(7, "pipe_attributes", sattr3())
        .default_arm("void", void())
        .build();
    (structure(vec![
        field("where", diropargs3()),
        field("what", what),
    ]),
     diropres3())
}

fn remove() -> (XdrType, XdrType) {
    (structure(vec![field("object", diropargs3())]),
     wcc_result("dir_wcc"))
}

fn rename() -> (XdrType, XdrType) {
    let wcc = || structure(vec![
        field("fromdir_wcc", wcc_data()),
        field("todir_wcc", wcc_data()),
    ]);
    (structure(vec![
        field("from", diropargs3()),
        field("to", diropargs3()),
    ]),
     result(wcc(), wcc()))
}

fn link() -> (XdrType, XdrType) {
    let res = || structure(vec![
        field("file_attributes", post_op_attr()),
        field("linkdir_wcc", wcc_data()),
    ]);
    (structure(vec![
        field("file", nfs_fh3()),
        field("link", diropargs3()),
    ]),
     result(res(), res()))
}

fn readdir() -> (XdrType, XdrType) {
    let entry3 = structure(vec![
        field("fileid", uhyper()),
        field("name", filename3()),
        field("cookie", uhyper()),
    ]);
    (structure(vec![
        field("dir", nfs_fh3()),
        field("cookie", uhyper()),
        field("cookieverf", opaque_fixed(NFS3_COOKIEVERFSIZE)),
        field("count", uint()),
    ]),
     result(
         structure(vec![
             field("dir_attributes", post_op_attr()),
             field("cookieverf", opaque_fixed(NFS3_COOKIEVERFSIZE)),
             field("reply", structure(vec![
                 field("entries", list(entry3)),
                 field("eof", boolean()),
             ])),
         ]),
         structure(vec![field("dir_attributes", post_op_attr())]),
     ))
}

fn readdirplus() -> (XdrType, XdrType) {
    let entryplus3 = structure(vec![
        field("fileid", uhyper()),
        field("name", filename3()),
        field("cookie", uhyper()),
        field("name_attributes", post_op_attr()),
        field("name_handle", post_op_fh3()),
    ]);
    (structure(vec![
        field("dir", nfs_fh3()),
        field("cookie", uhyper()),
        field("cookieverf", opaque_fixed(NFS3_COOKIEVERFSIZE)),
        field("dircount", uint()),
        field("maxcount", uint()),
    ]),
     result(
         structure(vec![
             field("dir_attributes", post_op_attr()),
             field("cookieverf", opaque_fixed(NFS3_COOKIEVERFSIZE)),
             field("reply", structure(vec![
                 field("entries", list(entryplus3)),
                 field("eof", boolean()),
             ])),
         ]),
         structure(vec![field("dir_attributes", post_op_attr())]),
     ))
}

fn fsstat() -> (XdrType, XdrType) {
    (structure(vec![field("fsroot", nfs_fh3())]),
     attr_result(vec![
         field("tbytes", uhyper()),
         field("fbytes", uhyper()),
         field("abytes", uhyper()),
         field("tfiles", uhyper()),
         field("ffiles", uhyper()),
         field("afiles", uhyper()),
         field("invarsec", uint()),
     ]))
}

fn fsinfo() -> (XdrType, XdrType) {
    (structure(vec![field("fsroot", nfs_fh3())]),
     attr_result(vec![
         field("rtmax", uint()),
         field("rtpref", uint()),
         field("rtmult", uint()),
         field("wtmax", uint()),
         field("wtpref", uint()),
         field("wtmult", uint()),
         field("dtpref", uint()),
         field("maxfilesize", uhyper()),
         field("time_delta", nfstime3()),
         field("properties", uint()),
     ]))
}

fn pathconf() -> (XdrType, XdrType) {
    (structure(vec![field("object", nfs_fh3())]),
     attr_result(vec![
         field("linkmax", uint()),
         field("name_max", uint()),
         field("no_trunc", boolean()),
         field("chown_restricted", boolean()),
         field("case_insensitive", boolean()),
         field("case_preserving", boolean()),
     ]))
}

fn commit() -> (XdrType, XdrType) {
    (structure(vec![
        field("file", nfs_fh3()),
        field("offset", uhyper()),
        field("count", uint()),
    ]),
     result(
         structure(vec![
             field("file_wcc", wcc_data()),
             field("verf", opaque_fixed(NFS3_WRITEVERFSIZE)),
         ]),
         structure(vec![field("file_wcc", wcc_data())]),
     ))
}

/// NFS program 100003 version 3.
pub fn program() -> Program {
    let procs: Vec<(u32, (XdrType, XdrType))> = vec![
        (NFSPROC3_NULL, (void(), void())),
        (NFSPROC3_GETATTR, getattr()),
        (NFSPROC3_SETATTR, setattr()),
        (NFSPROC3_LOOKUP, lookup()),
        (NFSPROC3_ACCESS, access()),
        (NFSPROC3_READLINK, readlink()),
        (NFSPROC3_READ, read()),
        (NFSPROC3_WRITE, write()),
        (NFSPROC3_CREATE, create()),
        (NFSPROC3_MKDIR, mkdir()),
        (NFSPROC3_SYMLINK, symlink()),
        (NFSPROC3_MKNOD, mknod()),
        (NFSPROC3_REMOVE, remove()),
        (NFSPROC3_RMDIR, remove()),
        (NFSPROC3_RENAME, rename()),
        (NFSPROC3_LINK, link()),
        (NFSPROC3_READDIR, readdir()),
        (NFSPROC3_READDIRPLUS, readdirplus()),
        (NFSPROC3_FSSTAT, fsstat()),
        (NFSPROC3_FSINFO, fsinfo()),
        (NFSPROC3_PATHCONF, pathconf()),
        (NFSPROC3_COMMIT, commit()),
    ];
    procs.into_iter().fold(Program::new(Protocol::Nfs3, NFS_PROGRAM, 3, "nfs_proc3"),
                           |p, (n, (args, res))| p.procedure(n, args, res))
}
