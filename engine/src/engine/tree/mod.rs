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

//! The tree's public operations: `list`, `create`, `remove`, `move_dir`, and
//! construction/teardown.
//!
//! A [`Tree`] is an owning handle to a root [`Node`]; the tree is the
//! transitive closure of ownership from the root through every node's
//! `children` map. Tear-down is not itself synchronized against concurrent
//! calls - callers must ensure no operation is in flight when a [`Tree`] is
//! dropped.

mod descend;
mod node;
mod ops;

pub use node::Node;

use crate::engine::error::TreeResult;
use std::sync::Arc;

/// An in-memory, concurrently-accessible directory tree.
pub struct Tree {
    pub(crate) root: Arc<Node>,
}

impl Tree {
    /// Constructs a fresh tree containing only the root.
    pub fn new() -> Self {
        Self { root: Node::new() }
    }

    /// Lists the immediate children of `path`, lexicographically sorted and
    /// comma-joined. `None` if `path` is invalid or does not exist; `Some("")`
    /// if it exists but is empty.
    pub fn list(&self, path: &str) -> Option<String> {
        ops::list(&self.root, path)
    }

    /// Creates a new, empty directory at `path`.
    pub fn create(&self, path: &str) -> TreeResult<()> {
        ops::create(&self.root, path)
    }

    /// Removes the empty directory at `path`.
    pub fn remove(&self, path: &str) -> TreeResult<()> {
        ops::remove(&self.root, path)
    }

    /// Moves the directory at `source` to `target`.
    pub fn move_dir(&self, source: &str, target: &str) -> TreeResult<()> {
        ops::move_dir(&self.root, source, target)
    }

    /// Recursively walks the tree, in no particular order, and asserts that
    /// every node is quiescent (`refcount == 0`, no active readers or
    /// writers). Intended for tests between operations, not for production
    /// use - it takes no locks of its own and is only safe when no
    /// concurrent operation is in flight.
    #[cfg(test)]
    pub(crate) fn debug_assert_quiescent(&self) {
        fn walk(node: &Arc<Node>) {
            assert_eq!(node.sync.refcount(), 0, "node has in-flight descents");
            let (r, w, rw, ww) = node.sync.state();
            assert_eq!((r, w, rw, ww), (0, 0, 0, 0), "node is not quiescent");
            for child in node.children.read().values() {
                walk(child);
            }
        }
        walk(&self.root);
    }

    /// Returns the node at `path` for inspection, without taking any lock
    /// beyond a momentary read of each ancestor's children map. Test-only
    /// debug-inspection hook, kept as a non-public helper rather than part
    /// of the engine's closed external interface.
    #[cfg(test)]
    pub(crate) fn debug_node_at(&self, path: &str) -> Option<Arc<Node>> {
        if !crate::engine::path::is_valid(path) {
            return None;
        }
        let mut current = Arc::clone(&self.root);
        for name in crate::engine::path::components(path) {
            let next = current.children.read().get(name).cloned()?;
            current = next;
        }
        Some(current)
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A fixed single-threaded script of creates/lists/removes.
    #[test]
    fn sequential_small_script() {
        let tree = Tree::new();
        tree.create("/a/").unwrap();
        tree.create("/a/b/").unwrap();
        tree.create("/a/c/").unwrap();
        assert_eq!(tree.list("/a/").as_deref(), Some("b,c"));
        tree.remove("/a/b/").unwrap();
        assert_eq!(tree.list("/a/").as_deref(), Some("c"));
        tree.create("/a/b/").unwrap();
        tree.create("/a/b/d/").unwrap();
        assert_eq!(tree.list("/a/b/").as_deref(), Some("d"));
        tree.debug_assert_quiescent();
        assert!(tree.debug_node_at("/a/b/d/").is_some());
        assert!(tree.debug_node_at("/a/x/").is_none());
    }
}
