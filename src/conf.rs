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

//! YAML configuration access.

use std::time::Duration;

use nom7::{
    character::complete::{multispace0, not_line_ending},
    sequence::{preceded, tuple},
    number::complete::double,
    combinator::verify,
    IResult,
};
use thiserror::Error;
use yaml_rust::{Yaml, YamlLoader};

#[derive(Debug, Error)]
pub enum ConfError {
    #[error("yaml: {0}")]
    Scan(#[from] yaml_rust::ScanError),
    #[error("configuration document is empty")]
    Empty,
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: &'static str,
    },
}

impl ConfError {
    pub fn invalid(key: &str, value: &str, reason: &'static str) -> ConfError {
        ConfError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason,
        }
    }
}

/// Load the first document of a YAML string.
pub fn conf_load_str(input: &str) -> Result<ConfNode, ConfError> {
    let mut docs = YamlLoader::load_from_str(input)?;
    if docs.is_empty() {
        return Err(ConfError::Empty);
    }
    Ok(ConfNode::wrap(docs.swap_remove(0)))
}

// Truthy configuration strings.
fn is_true(val: &str) -> bool {
    match val {
        "1" | "yes" | "true" | "on" => true,
        _ => false,
    }
}

/// A node of the configuration tree.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfNode {
    pub conf: Yaml,
}

impl ConfNode {

    pub fn wrap(conf: Yaml) -> Self {
        return Self { conf }
    }

    /// Node at a dotted path below this one, e.g. `matcher.max-age`.
    pub fn get_node(&self, key: &str) -> Option<ConfNode> {
        let mut node = &self.conf;
        for part in key.split('.') {
            node = match node {
                Yaml::Hash(h) => h.get(&Yaml::String(part.to_string()))?,
                _ => return None,
            };
        }
        if node.is_badvalue() || node.is_null() {
            return None;
        }
        Some(ConfNode::wrap(node.clone()))
    }

    /// Scalar value of a child as a string.
    pub fn get_child_value(&self, key: &str) -> Option<String> {
        match self.get_node(key)?.conf {
            Yaml::String(s) => Some(s),
            Yaml::Integer(i) => Some(i.to_string()),
            Yaml::Real(r) => Some(r),
            Yaml::Boolean(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// A child that is not set is the same as having it set to false.
    pub fn get_child_bool(&self, key: &str) -> bool {
        match self.get_node(key).map(|n| n.conf) {
            Some(Yaml::Boolean(b)) => b,
            Some(Yaml::String(s)) => is_true(&s),
            Some(Yaml::Integer(i)) => i == 1,
            _ => false,
        }
    }

    /// Like `get_child_bool` but keeps `default` for missing children.
    pub fn get_child_bool_or(&self, key: &str, default: bool) -> bool {
        if self.get_node(key).is_none() {
            return default;
        }
        self.get_child_bool(key)
    }

    pub fn get_child_u64(&self, key: &str) -> Result<Option<u64>, ConfError> {
        match self.get_child_value(key) {
            Some(v) => v.trim().parse::<u64>()
                .map(Some)
                .map_err(|_| ConfError::invalid(key, &v, "not an unsigned integer")),
            None => Ok(None),
        }
    }

    pub fn get_child_memval(&self, key: &str) -> Result<Option<u64>, ConfError> {
        match self.get_child_value(key) {
            Some(v) => get_memval(&v).map(Some).map_err(|e| ConfError::invalid(key, &v, e)),
            None => Ok(None),
        }
    }

    pub fn get_child_timeval(&self, key: &str) -> Result<Option<Duration>, ConfError> {
        match self.get_child_value(key) {
            Some(v) => get_timeval(&v).map(Some).map_err(|e| ConfError::invalid(key, &v, e)),
            None => Ok(None),
        }
    }

}

const BYTE: u64       = 1;
const KILOBYTE: u64   = 1024;
const MEGABYTE: u64   = 1_048_576;
const GIGABYTE: u64   = 1_073_741_824;

/// Helper function to retrieve memory unit from a string slice
///
/// Return value: u64
///
/// # Arguments
///
/// * `unit` - A string slice possibly containing memory unit
fn get_memunit(unit: &str) -> u64 {
    let unit = &unit.to_lowercase()[..];
    match unit {
        "b"     => { BYTE }
        "kb"    => { KILOBYTE }
        "mb"    => { MEGABYTE }
        "gb"    => { GIGABYTE }
        _       => { 0 }
    }
}

// A number followed by an optional unit of at most two characters.
fn parse_unit_value(arg: &str) -> IResult<&str, (f64, &str)> {
    tuple((preceded(multispace0, double),
           preceded(multispace0, verify(not_line_ending, |c: &str| c.len() < 3))))(arg)
}

/// Parses memory units from human readable form to machine readable
///
/// Return value:
///     Result => Ok(u64)
///            => Err(error string)
///
/// # Arguments
///
/// * `arg` - A string slice that holds the value parsed from the config
pub fn get_memval(arg: &str) -> Result<u64, &'static str> {
    let arg = arg.trim();
    let (val, mut unit) = match parse_unit_value(arg) {
        Ok((_, r)) => r,
        Err(_) => return Err("Error parsing the memory value"),
    };
    if unit.is_empty() {
        unit = "B";
    }
    let unit = get_memunit(unit);
    if unit == 0 {
        return Err("Invalid memory unit");
    }
    let res = val * unit as f64;
    Ok(res as u64)
}

fn get_timeunit_ms(unit: &str) -> u64 {
    match &unit.to_lowercase()[..] {
        "ms"     => 1,
        "" | "s" => 1_000,
        "m"      => 60_000,
        "h"      => 3_600_000,
        _        => 0,
    }
}

/// Parses a time value like "30s", "500ms", "2m" or "1h". A bare number
/// is seconds.
pub fn get_timeval(arg: &str) -> Result<Duration, &'static str> {
    let arg = arg.trim();
    let (val, unit) = match parse_unit_value(arg) {
        Ok((_, r)) => r,
        Err(_) => return Err("Error parsing the time value"),
    };
    let unit = get_timeunit_ms(unit);
    if unit == 0 {
        return Err("Invalid time unit");
    }
    if val < 0.0 {
        return Err("Negative time value");
    }
    Ok(Duration::from_micros((val * unit as f64 * 1000.0) as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_memval_nospace() {
        let s = "10";
        let res = 10 ;
        assert_eq!(Ok(10), get_memval(s));

        let s = "10kb";
        assert_eq!(Ok(res * KILOBYTE), get_memval(s));

        let s = "10Kb";
        assert_eq!(Ok(res * KILOBYTE), get_memval(s));

        let s = "10mb";
        assert_eq!(Ok(res * MEGABYTE), get_memval(s));

        let s = "10gb";
        assert_eq!(Ok(res * GIGABYTE), get_memval(s));
    }

    #[test]
    fn test_memval_space_in_bw() {
        let s = "10 Kb    ";
        assert_eq!(Ok(10 * KILOBYTE), get_memval(s));

        let s = "        10 Gb           ";
        assert_eq!(Ok(10 * GIGABYTE), get_memval(s));

        let s = "   30.0 b                    ";
        assert_eq!(Ok(30), get_memval(s));
    }

    #[test]
    fn test_memval_erroneous_val() {
        assert!(get_memval("5eb").is_err());
        assert!(get_memval("5 1kb").is_err());
        assert!(get_memval("61k b").is_err());
    }

    #[test_case("30s", Duration::from_secs(30) ; "seconds")]
    #[test_case("30", Duration::from_secs(30) ; "bare number")]
    #[test_case("500ms", Duration::from_millis(500) ; "milliseconds")]
    #[test_case(" 2 m ", Duration::from_secs(120) ; "minutes with spaces")]
    #[test_case("1h", Duration::from_secs(3600) ; "hours")]
    #[test_case("1.5s", Duration::from_millis(1500) ; "fraction")]
    fn test_timeval(s: &str, expected: Duration) {
        assert_eq!(get_timeval(s), Ok(expected));
    }

    #[test_case("10d" ; "unknown unit")]
    #[test_case("abc" ; "not a number")]
    #[test_case("-1s" ; "negative")]
    fn test_timeval_erroneous(s: &str) {
        assert!(get_timeval(s).is_err());
    }

    #[test]
    fn test_conf_node() {
        let conf = conf_load_str(r#"
nfs-decode:
  strict-enums: yes
  matcher:
    max-age: 30s
    flush-on-finish: false
  tcp:
    max-record: 1mb
  count: 12
"#).unwrap();
        let node = conf.get_node("nfs-decode").unwrap();
        assert!(node.get_child_bool("strict-enums"));
        assert!(!node.get_child_bool("matcher.flush-on-finish"));
        assert!(!node.get_child_bool("missing"));
        assert!(node.get_child_bool_or("missing", true));
        assert_eq!(node.get_child_value("matcher.max-age").as_deref(), Some("30s"));
        assert_eq!(node.get_child_timeval("matcher.max-age").unwrap(),
                   Some(Duration::from_secs(30)));
        assert_eq!(node.get_child_memval("tcp.max-record").unwrap(), Some(MEGABYTE));
        assert_eq!(node.get_child_u64("count").unwrap(), Some(12));
        assert!(node.get_child_u64("matcher.max-age").is_err());
        assert_eq!(node.get_child_value("matcher.nothing"), None);
    }

    #[test]
    fn test_conf_load_errors() {
        assert!(matches!(conf_load_str(""), Err(ConfError::Empty)));
        assert!(matches!(conf_load_str("a: [1, 2"), Err(ConfError::Scan(_))));
    }
}
