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

use super::node::Node;
use std::sync::Arc;

/// A locked descent path from the root to a terminal node.
///
/// `chain` holds every node traversed, root first, terminal last; all but
/// the terminal were briefly read-locked during the hand-over-hand walk and
/// have already had that structural lock released (only their refcount is
/// still pending unwind). The terminal's structural lock - read or write,
/// per `terminal_write` - is still held and is the caller's responsibility
/// to release before calling [`DescentPath::unwind`].
pub(crate) struct DescentPath {
    chain: Vec<Arc<Node>>,
    terminal_write: bool,
}

impl DescentPath {
    pub(crate) fn terminal(&self) -> &Arc<Node> {
        self.chain.last().expect("descent path is never empty")
    }

    /// Releases the terminal's structural lock. Must be called exactly once,
    /// after the operation's point mutation/read under that lock.
    pub(crate) fn release_terminal(&self) {
        self.terminal().sync.release(self.terminal_write);
    }

    /// Unwinds the refcount trail: decrements `refcount` on every traversed
    /// node, terminal first, root last, signaling each node's quiescence
    /// condition. Must be called after `release_terminal`.
    pub(crate) fn unwind(&self) {
        log::trace!("unwinding refcount trail, {} nodes deep", self.chain.len());
        for node in self.chain.iter().rev() {
            node.sync.ref_decr();
        }
    }

}

/// Walks `components` from `root`, locking one node at a time under
/// hand-over-hand discipline and bumping `refcount` on every traversed node.
///
/// Non-terminal nodes are always read-locked (an in-flight read on an
/// ancestor never blocks a write deeper in the tree; only the terminal's own
/// mutation needs exclusivity). The terminal is locked for writing iff
/// `write_terminal` is set.
///
/// Returns `None`, having already released every lock and refcount it took,
/// if any component along the path does not exist.
pub(crate) fn descend(
    root: &Arc<Node>,
    components: &[&str],
    write_terminal: bool,
) -> Option<DescentPath> {
    let terminal_depth = components.len();
    let root_is_terminal = terminal_depth == 0;
    let root_write = write_terminal && root_is_terminal;

    log::trace!("descending {terminal_depth} component(s), root lock write={root_write}");
    root.sync.acquire(root_write);
    root.sync.ref_incr();

    let mut chain = vec![Arc::clone(root)];
    let mut current_write = root_write;

    for (i, name) in components.iter().enumerate() {
        let is_terminal_step = i + 1 == terminal_depth;
        let want_write = is_terminal_step && write_terminal;

        let current = chain.last().expect("chain is never empty");
        let child = current.children.read().get(*name).cloned();

        let Some(child) = child else {
            // Component not found: release whatever structural lock is still
            // held on `current` (it was never released on this path because
            // we only release a predecessor once its successor is locked),
            // then unwind every refcount we've taken so far, root to here.
            log::debug!("descent stopped: no child named {name:?}");
            current.sync.release(current_write);
            for node in chain.iter().rev() {
                node.sync.ref_decr();
            }
            return None;
        };

        log::trace!("descent: locking {name:?} (write={want_write})");
        child.sync.acquire(want_write);
        child.sync.ref_incr();

        // Hand-over-hand: only release the predecessor's structural lock
        // once the successor is safely locked and refcounted.
        current.sync.release(current_write);

        chain.push(child);
        current_write = want_write;
    }

    Some(DescentPath {
        chain,
        terminal_write: current_write,
    })
}

/// Descends write-lock-only, hand-over-hand, from an already write-locked
/// and refcounted `anchor` down `components`. Unlike [`descend`], `anchor`
/// itself is never released by this call - it is the caller's LCA pre-lock
/// and stays held for the whole move, possibly across two calls to this
/// function (one per branch below the LCA).
///
/// On success, every returned node is refcounted and only the last one is
/// still structurally locked (earlier ones were released hand-over-hand).
/// On failure, returns the partial list built so far (same invariant: only
/// the last element, if any, is still locked) so the caller can clean it up
/// with [`release_and_unwind_branch`].
pub(crate) fn extend_write(
    anchor: &Arc<Node>,
    components: &[&str],
) -> Result<Vec<Arc<Node>>, Vec<Arc<Node>>> {
    let mut list: Vec<Arc<Node>> = Vec::new();
    for name in components {
        let current = list.last().unwrap_or(anchor);
        let child = current.children.read().get(*name).cloned();
        let Some(child) = child else {
            return Err(list);
        };
        child.sync.acquire_write();
        child.sync.ref_incr();
        if let Some(prev) = list.last() {
            prev.sync.release_write();
        }
        list.push(child);
    }
    Ok(list)
}

/// Releases the write lock still held on `branch`'s last node (if any) and
/// unwinds every node's refcount, deepest first.
pub(crate) fn release_and_unwind_branch(branch: &[Arc<Node>]) {
    if let Some(last) = branch.last() {
        last.sync.release_write();
    }
    for node in branch.iter().rev() {
        node.sync.ref_decr();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descends_to_root_for_empty_path() {
        let root = Node::new();
        let d = descend(&root, &[], false).unwrap();
        assert!(Arc::ptr_eq(d.terminal(), &root));
        d.release_terminal();
        d.unwind();
    }

    #[test]
    fn missing_component_unwinds_cleanly() {
        let root = Node::new();
        assert!(descend(&root, &["nope"], false).is_none());
        assert_eq!(root.sync.refcount(), 0);
    }

    #[test]
    fn descends_through_children_bumping_refcount() {
        let root = Node::new();
        let a = Node::with_parent(&root);
        root.children.write().insert("a".into(), Arc::clone(&a));
        let b = Node::with_parent(&a);
        a.children.write().insert("b".into(), Arc::clone(&b));

        let d = descend(&root, &["a", "b"], true).unwrap();
        assert!(Arc::ptr_eq(d.terminal(), &b));
        assert_eq!(root.sync.refcount(), 1);
        assert_eq!(a.sync.refcount(), 1);
        assert_eq!(b.sync.refcount(), 1);
        d.release_terminal();
        d.unwind();
        assert_eq!(root.sync.refcount(), 0);
        assert_eq!(b.sync.refcount(), 0);
    }
}
