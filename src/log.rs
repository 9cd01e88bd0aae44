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

//! Logging macros.
//!
//! The SCLog* macros format their arguments and hand the
//! formatted message to the `log` facade, so the embedding test runner
//! decides where it ends up.

use std::path::Path;
use std::sync::atomic::{AtomicI32, Ordering};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(i32)]
pub enum Level {
    NotSet = -1,
    None = 0,
    Emergency,
    Alert,
    Critical,
    Error,
    Warning,
    Notice,
    Info,
    Perf,
    Config,
    Debug,
}

impl Level {
    fn as_log_level(self) -> Option<log::Level> {
        match self {
            Level::NotSet | Level::None => None,
            Level::Emergency | Level::Alert | Level::Critical | Level::Error => {
                Some(log::Level::Error)
            }
            Level::Warning => Some(log::Level::Warn),
            Level::Notice | Level::Info | Level::Config => Some(log::Level::Info),
            Level::Perf | Level::Debug => Some(log::Level::Debug),
        }
    }
}

/// Level ceiling applied before the `log` facade sees a message.
/// `NotSet` leaves all filtering to the installed logger.
static LEVEL: AtomicI32 = AtomicI32::new(Level::NotSet as i32);

pub fn get_log_level() -> i32 {
    LEVEL.load(Ordering::Relaxed)
}

pub fn set_log_level(level: Level) {
    LEVEL.store(level as i32, Ordering::Relaxed);
}

pub fn log_enabled(level: Level) -> bool {
    let current = get_log_level();
    current == Level::NotSet as i32 || current >= level as i32
}

fn basename(filename: &str) -> &str {
    let path = Path::new(filename);
    if let Some(os_str) = path.file_name() {
        if let Some(basename) = os_str.to_str() {
            return basename;
        }
    }
    return filename;
}

pub fn sclog(level: Level, file: &str, line: u32, function: &str, message: &str) {
    if let Some(lvl) = level.as_log_level() {
        log::log!(target: "nfsdecode", lvl, "[{}:{} {}] {}",
                  basename(file), line, function, message);
    }
}

// Expands to the path of the enclosing function.
#[macro_export]
macro_rules! function {
    () => {{
        fn __f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            std::any::type_name::<T>()
        }
        let name = type_name_of(__f);
        &name[..name.len() - 5]
    }};
}

#[macro_export]
macro_rules!do_log {
    ($level:expr, $file:expr, $line:expr, $function:expr,
     $($arg:tt)*) => {
        if $crate::log::log_enabled($level) {
            $crate::log::sclog($level, $file, $line, $function,
                  &(format!($($arg)*)));
        }
    }
}

#[macro_export]
macro_rules!SCLogError {
    ($($arg:tt)*) => {
        $crate::do_log!($crate::log::Level::Error, file!(), line!(), $crate::function!(), $($arg)*);
    }
}

#[macro_export]
macro_rules!SCLogWarning {
    ($($arg:tt)*) => {
        $crate::do_log!($crate::log::Level::Warning, file!(), line!(), $crate::function!(), $($arg)*);
    }
}

#[macro_export]
macro_rules!SCLogNotice {
    ($($arg:tt)*) => {
        $crate::do_log!($crate::log::Level::Notice, file!(), line!(), $crate::function!(), $($arg)*);
    }
}

#[macro_export]
macro_rules!SCLogInfo {
    ($($arg:tt)*) => {
        $crate::do_log!($crate::log::Level::Info, file!(), line!(), $crate::function!(), $($arg)*);
    }
}

#[macro_export]
macro_rules!SCLogConfig {
    ($($arg:tt)*) => {
        $crate::do_log!($crate::log::Level::Config, file!(), line!(), $crate::function!(), $($arg)*);
    }
}

// Debug logging is compiled in only with the "debug" feature.
#[cfg(feature = "debug")]
#[macro_export]
macro_rules!SCLogDebug {
    ($($arg:tt)*) => {
        $crate::do_log!($crate::log::Level::Debug, file!(), line!(), $crate::function!(), $($arg)*);
    }
}

#[cfg(not(feature = "debug"))]
#[macro_export]
macro_rules!SCLogDebug {
    ($($arg:tt)*) => {};
}
