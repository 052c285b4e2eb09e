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

use crate::engine::sync::NodeSync;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

/// A single directory in the tree.
///
/// Every mutable field is guarded by its own synchronization: `children` by
/// the node's structural lock ([`NodeSync`], via the enclosing `RwLock` that
/// actually holds the data), `parent` by whichever parent's write lock is
/// held while a [`super::ops::move_dir`] reassigns it.
pub struct Node {
    pub(crate) sync: NodeSync,
    pub(crate) parent: Mutex<Option<Weak<Node>>>,
    pub(crate) children: RwLock<BTreeMap<String, Arc<Node>>>,
}

impl Node {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            sync: NodeSync::new(),
            parent: Mutex::new(None),
            children: RwLock::new(BTreeMap::new()),
        })
    }

    pub(crate) fn with_parent(parent: &Arc<Node>) -> Arc<Self> {
        let node = Self::new();
        *node.parent.lock() = Some(Arc::downgrade(parent));
        node
    }

    pub(crate) fn set_parent(&self, parent: &Arc<Node>) {
        *self.parent.lock() = Some(Arc::downgrade(parent));
    }

    /// Number of immediate children. Caller must already hold this node's
    /// structural lock (read or write).
    pub(crate) fn child_count(&self) -> usize {
        self.children.read().len()
    }

    /// Lexicographically sorted, comma-separated child names. Caller must
    /// already hold this node's structural read or write lock.
    pub(crate) fn child_names_joined(&self) -> String {
        // `BTreeMap` iterates in key order already, so no extra sort is needed.
        self.children
            .read()
            .keys()
            .cloned()
            .collect::<Vec<_>>()
            .join(",")
    }
}
