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

//! Puts items decoded out of order back in capture order before they
//! reach the matcher.

use std::collections::BTreeMap;

pub struct ReorderBuffer<T> {
    /// Next sequence number to release. `None` until the first item
    /// when the buffer starts wherever the capture does.
    next: Option<u64>,
    held: BTreeMap<u64, T>,
    /// Most items held while waiting for a missing sequence number.
    window: usize,
}

impl<T> ReorderBuffer<T> {
    pub fn new(first: u64, window: usize) -> ReorderBuffer<T> {
        ReorderBuffer {
            next: Some(first),
            held: BTreeMap::new(),
            window: window.max(1),
        }
    }

    /// Buffer that starts at the sequence number of the first item.
    pub fn unseeded(window: usize) -> ReorderBuffer<T> {
        ReorderBuffer {
            next: None,
            held: BTreeMap::new(),
            window: window.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    /// Add the item for capture sequence number `seq`. Returns the items
    /// that are now in order. When the window fills up the missing
    /// numbers are given up on.
    pub fn push(&mut self, seq: u64, item: T) -> Vec<T> {
        let next = *self.next.get_or_insert(seq);
        if seq < next {
            SCLogDebug!("seq {} arrived after it was skipped", seq);
            return vec![item];
        }
        self.held.insert(seq, item);
        let mut out = Vec::new();
        self.release(&mut out);
        while self.held.len() > self.window {
            if let Some((&first, _)) = self.held.iter().next() {
                SCLogDebug!("giving up on seq {:?}..{}", self.next, first);
                self.next = Some(first);
            }
            self.release(&mut out);
        }
        out
    }

    fn release(&mut self, out: &mut Vec<T>) {
        while let Some(next) = self.next {
            match self.held.remove(&next) {
                Some(item) => {
                    out.push(item);
                    self.next = Some(next + 1);
                }
                None => break,
            }
        }
    }

    /// Everything still held, in order.
    pub fn flush(&mut self) -> Vec<T> {
        let held = std::mem::take(&mut self.held);
        if let Some((&last, _)) = held.iter().next_back() {
            self.next = Some(last + 1);
        }
        held.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reorder() {
        let mut r = ReorderBuffer::new(0, 8);
        assert!(r.push(1, "b").is_empty());
        assert!(r.push(2, "c").is_empty());
        assert_eq!(r.push(0, "a"), vec!["a", "b", "c"]);
        assert!(r.is_empty());
    }

    #[test]
    fn test_window_skips_gap() {
        let mut r = ReorderBuffer::new(0, 2);
        assert!(r.push(1, 1).is_empty());
        assert!(r.push(2, 2).is_empty());
        assert_eq!(r.push(3, 3), vec![1, 2, 3]);
        // the skipped item is passed through when it finally shows up
        assert_eq!(r.push(0, 0), vec![0]);
    }

    #[test]
    fn test_unseeded_starts_at_first_item() {
        let mut r = ReorderBuffer::unseeded(8);
        assert_eq!(r.push(1, "a"), vec!["a"]);
        assert!(r.push(3, "c").is_empty());
        assert_eq!(r.push(2, "b"), vec!["b", "c"]);
        assert!(r.is_empty());
    }

    #[test]
    fn test_flush() {
        let mut r = ReorderBuffer::new(0, 8);
        r.push(5, 5);
        r.push(3, 3);
        assert_eq!(r.flush(), vec![3, 5]);
        assert_eq!(r.push(6, 6), vec![6]);
    }
}
