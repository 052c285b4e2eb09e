/*
 * This file is a part of the Tree Engine project - a concurrent, in-memory
 * hierarchical directory tree with path-descent locking.
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 *
*/

//! Per-node synchronization primitives.
//!
//! Each [`Node`](crate::engine::tree::Node) owns one [`NodeSync`]: a mutex
//! guarding a handful of counters, plus three condition variables
//! implementing a fair readers/writers coordinator with reader-preference on
//! writer release, and a fourth wait condition for subtree quiescence.

use parking_lot::{Condvar, Mutex};

/// Counters guarded by [`NodeSync`]'s mutex. Split out of `NodeSync` so the
/// lock methods can take `&mut Counters` from a single `lock()` call.
#[derive(Default)]
struct Counters {
    r_active: usize,
    w_active: usize,
    r_waiting: usize,
    w_waiting: usize,
    /// Reader tickets handed out by a writer's release, still unclaimed.
    /// Lets the cohort that was already waiting when a writer released cut
    /// ahead of any writer that has since queued, without letting a *new*
    /// writer acquire out from under a cohort that hasn't finished waking up.
    r_granted: usize,
    /// Number of in-flight descents currently passing through this node.
    refcount: usize,
}

/// The synchronization state embedded in every tree node.
///
/// Implements a readers/writers discipline where readers block
/// while a writer is active or waiting (unless already woken as part of a
/// reader cohort), writers block while any reader or writer is active, and
/// writer release prefers waking the entire waiting reader cohort
/// (broadcast) over a single waiting writer, so independent descents through
/// the same node resume in parallel immediately after a write.
pub(crate) struct NodeSync {
    counters: Mutex<Counters>,
    readers_cv: Condvar,
    writers_cv: Condvar,
    quiescent_cv: Condvar,
}

impl Default for NodeSync {
    fn default() -> Self {
        Self {
            counters: Mutex::new(Counters::default()),
            readers_cv: Condvar::new(),
            writers_cv: Condvar::new(),
            quiescent_cv: Condvar::new(),
        }
    }
}

impl NodeSync {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Blocks until a read lock is held.
    ///
    /// A reader normally defers to a waiting writer, but a reader holding an
    /// unclaimed ticket from the last writer's release (`r_granted`) cuts
    /// ahead regardless - that ticket is what lets the whole cohort that was
    /// waiting at release time proceed together, per [`Self::release_write`].
    pub(crate) fn acquire_read(&self) {
        let mut c = self.counters.lock();
        loop {
            if c.w_active == 0 && (c.r_granted > 0 || c.w_waiting == 0) {
                if c.r_granted > 0 {
                    c.r_granted -= 1;
                }
                break;
            }
            c.r_waiting += 1;
            self.readers_cv.wait(&mut c);
            c.r_waiting -= 1;
        }
        c.r_active += 1;
    }

    /// Releases a previously acquired read lock.
    pub(crate) fn release_read(&self) {
        let mut c = self.counters.lock();
        debug_assert!(c.r_active > 0);
        c.r_active -= 1;
        if c.r_active == 0 && c.r_granted == 0 {
            self.writers_cv.notify_one();
        }
    }

    /// Blocks until a write lock is held.
    ///
    /// Also waits out any unclaimed reader tickets (`r_granted`): otherwise a
    /// writer could acquire between a cohort's wake-up and its members
    /// actually incrementing `r_active`, running concurrently with readers
    /// that believe they still hold the lock.
    pub(crate) fn acquire_write(&self) {
        let mut c = self.counters.lock();
        while c.r_active > 0 || c.w_active > 0 || c.r_granted > 0 {
            c.w_waiting += 1;
            self.writers_cv.wait(&mut c);
            c.w_waiting -= 1;
        }
        debug_assert_eq!(c.r_active, 0);
        debug_assert_eq!(c.w_active, 0);
        c.w_active = 1;
    }

    /// Releases a previously acquired write lock.
    ///
    /// Wakes the entire waiting-reader cohort with a broadcast if any are
    /// queued, handing out one ticket per waiting reader; otherwise wakes a
    /// single waiting writer. The broadcast is required: waking one reader at
    /// a time would serialize every subsequent descent through this node
    /// behind the others. The ticket count is what lets that cohort actually
    /// get in even if a new writer has queued up in the meantime - without
    /// it, every woken reader would immediately see the new writer waiting
    /// and go straight back to sleep, and the writer it deferred to would
    /// never be woken by anyone.
    pub(crate) fn release_write(&self) {
        let mut c = self.counters.lock();
        debug_assert_eq!(c.w_active, 1);
        c.w_active = 0;
        if c.r_waiting > 0 {
            c.r_granted = c.r_waiting;
            self.readers_cv.notify_all();
        } else if c.w_waiting > 0 {
            self.writers_cv.notify_one();
        }
    }

    /// Acquires either a read or a write lock, for call sites where the
    /// terminal node of a descent may need either depending on the
    /// operation's class.
    pub(crate) fn acquire(&self, write: bool) {
        if write {
            self.acquire_write();
        } else {
            self.acquire_read();
        }
    }

    /// Releases either a read or a write lock, mirroring [`Self::acquire`].
    pub(crate) fn release(&self, write: bool) {
        if write {
            self.release_write();
        } else {
            self.release_read();
        }
    }

    /// Increments the in-flight refcount. Called once per descending
    /// operation, for every node the descent passes through.
    pub(crate) fn ref_incr(&self) {
        let mut c = self.counters.lock();
        c.refcount += 1;
    }

    /// Decrements the in-flight refcount and wakes any thread waiting for
    /// this node's subtree to go quiescent.
    pub(crate) fn ref_decr(&self) {
        let mut c = self.counters.lock();
        debug_assert!(c.refcount > 0);
        c.refcount -= 1;
        if c.refcount == 0 {
            self.quiescent_cv.notify_all();
        }
    }

    /// Blocks until the in-flight refcount reaches zero. Used by `remove`
    /// and `move_dir` before mutating a subtree's root, so that no
    /// in-flight descent further down ever observes a stale parent.
    pub(crate) fn wait_quiescent(&self) {
        let mut c = self.counters.lock();
        while c.refcount > 0 {
            self.quiescent_cv.wait(&mut c);
        }
    }

    #[cfg(test)]
    pub(crate) fn refcount(&self) -> usize {
        self.counters.lock().refcount
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> (usize, usize, usize, usize) {
        let c = self.counters.lock();
        (c.r_active, c.w_active, c.r_waiting, c.w_waiting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn readers_run_concurrently() {
        let sync = Arc::new(NodeSync::new());
        sync.acquire_read();
        sync.acquire_read();
        let (r, w, _, _) = sync.state();
        assert_eq!(r, 2);
        assert_eq!(w, 0);
        sync.release_read();
        sync.release_read();
    }

    #[test]
    fn writer_excludes_readers() {
        let sync = Arc::new(NodeSync::new());
        sync.acquire_write();
        let sync2 = Arc::clone(&sync);
        let handle = thread::spawn(move || {
            sync2.acquire_read();
            sync2.release_read();
        });
        thread::sleep(Duration::from_millis(20));
        let (_, w, _, _) = sync.state();
        assert_eq!(w, 1);
        sync.release_write();
        handle.join().unwrap();
    }

    /// A reader cohort already queued when a writer releases must get in
    /// even if another writer has queued up behind them in the meantime -
    /// otherwise that second writer is never woken by anyone.
    #[test]
    fn queued_reader_cohort_is_not_starved_by_a_later_writer() {
        let sync = Arc::new(NodeSync::new());
        sync.acquire_write();

        let reader_sync = Arc::clone(&sync);
        let reader = thread::spawn(move || {
            reader_sync.acquire_read();
            thread::sleep(Duration::from_millis(50));
            reader_sync.release_read();
        });
        thread::sleep(Duration::from_millis(10));

        let writer_sync = Arc::clone(&sync);
        let writer = thread::spawn(move || {
            writer_sync.acquire_write();
            writer_sync.release_write();
        });
        thread::sleep(Duration::from_millis(10));

        sync.release_write();

        reader.join().unwrap();
        writer.join().unwrap();
    }

    #[test]
    fn quiescent_wait_blocks_until_refcount_drains() {
        let sync = Arc::new(NodeSync::new());
        sync.ref_incr();
        let sync2 = Arc::clone(&sync);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            sync2.ref_decr();
        });
        sync.wait_quiescent();
        handle.join().unwrap();
        assert_eq!(sync.refcount(), 0);
    }
}
