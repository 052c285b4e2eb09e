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

//! The four structural operations (`list`, `create`, `remove`, `move_dir`)
//! composed on top of [`descend`](super::descend::descend).

use super::descend::{self, descend};
use super::node::Node;
use crate::engine::error::{TreeError, TreeResult};
use crate::engine::path;
use std::sync::Arc;

/// Enumerates the immediate children of `path`, lexicographically sorted
/// and comma-joined. Returns `None` if `path` is syntactically invalid or
/// does not exist; `Some("")` if it exists but has no children.
pub(crate) fn list(root: &Arc<Node>, path: &str) -> Option<String> {
    if !path::is_valid(path) {
        log::warn!("list({path}): invalid path");
        return None;
    }
    let comps = path::components(path);
    let d = match descend(root, &comps, false) {
        Some(d) => d,
        None => {
            log::warn!("list({path}): no such directory");
            return None;
        }
    };
    let names = d.terminal().child_names_joined();
    d.release_terminal();
    d.unwind();
    log::debug!("list({path}): {} entries", names.matches(',').count() + usize::from(!names.is_empty()));
    Some(names)
}

/// Creates a new, empty directory at `path`.
pub(crate) fn create(root: &Arc<Node>, path: &str) -> TreeResult<()> {
    if !path::is_valid(path) {
        log::warn!("create({path}): invalid path");
        return Err(TreeError::Inval);
    }
    if path == "/" {
        log::warn!("create({path}): root already exists");
        return Err(TreeError::Exists);
    }
    let (parent_path, name) = path::parent_and_name(path).expect("non-root path has a parent");
    let parent_comps = path::components(&parent_path);

    log::trace!("create({path}): descending to parent {parent_path}");
    let d = descend(root, &parent_comps, true).ok_or_else(|| {
        log::warn!("create({path}): missing ancestor on {parent_path}");
        TreeError::NotFound
    })?;
    let parent = d.terminal();

    if parent.children.read().contains_key(name) {
        d.release_terminal();
        d.unwind();
        log::warn!("create({path}): already exists");
        return Err(TreeError::Exists);
    }

    let child = Node::with_parent(parent);
    parent.children.write().insert(name.to_string(), child);

    d.release_terminal();
    d.unwind();
    log::info!("create({path}): directory created");
    Ok(())
}

/// Removes the empty directory at `path`.
pub(crate) fn remove(root: &Arc<Node>, path: &str) -> TreeResult<()> {
    if path == "/" {
        log::warn!("remove({path}): root is busy");
        return Err(TreeError::Busy);
    }
    if !path::is_valid(path) {
        log::warn!("remove({path}): no such directory");
        return Err(TreeError::NotFound);
    }
    let (parent_path, name) = path::parent_and_name(path).expect("non-root path has a parent");
    let parent_comps = path::components(&parent_path);

    log::trace!("remove({path}): descending to parent {parent_path}");
    let d = descend(root, &parent_comps, true).ok_or_else(|| {
        log::warn!("remove({path}): missing ancestor on {parent_path}");
        TreeError::NotFound
    })?;
    let parent = d.terminal();

    let child = parent.children.read().get(name).cloned();
    let Some(child) = child else {
        d.release_terminal();
        d.unwind();
        log::warn!("remove({path}): no such directory");
        return Err(TreeError::NotFound);
    };

    child.sync.acquire_write();
    log::trace!("remove({path}): waiting for subtree to go quiescent");
    child.sync.wait_quiescent();

    if child.child_count() > 0 {
        child.sync.release_write();
        d.release_terminal();
        d.unwind();
        log::warn!("remove({path}): directory not empty");
        return Err(TreeError::NotEmpty);
    }

    parent.children.write().remove(name);
    child.sync.release_write();

    d.release_terminal();
    d.unwind();
    // `child` drops here, deallocating its subtree (empty, by the check above).
    log::info!("remove({path}): directory removed");
    Ok(())
}

/// Moves the directory at `source` to `target`, atomically with respect to
/// every other structural operation.
///
/// See [`super`]'s module docs for the least-common-ancestor pre-lock
/// protocol this implements.
pub(crate) fn move_dir(root: &Arc<Node>, source: &str, target: &str) -> TreeResult<()> {
    if !path::is_valid(source) || !path::is_valid(target) {
        log::warn!("move({source}, {target}): invalid path");
        return Err(TreeError::Inval);
    }
    if source == "/" {
        log::warn!("move({source}, {target}): root is busy");
        return Err(TreeError::Busy);
    }
    if target == "/" {
        log::warn!("move({source}, {target}): root already exists");
        return Err(TreeError::Exists);
    }
    if path::is_ancestor(source, target) {
        log::warn!("move({source}, {target}): target is a descendant of source");
        return Err(TreeError::MovingAncestor);
    }

    if source == target {
        let comps = path::components(source);
        return match descend(root, &comps, false) {
            Some(d) => {
                d.release_terminal();
                d.unwind();
                log::info!("move({source}, {target}): no-op, source and target are identical");
                Ok(())
            }
            None => {
                log::warn!("move({source}, {target}): no such directory");
                Err(TreeError::NotFound)
            }
        };
    }

    let (source_parent_path, source_name) =
        path::parent_and_name(source).expect("non-root path has a parent");
    let (target_parent_path, target_name) =
        path::parent_and_name(target).expect("non-root path has a parent");

    // The LCA is computed over the two *parent* paths, not the source and
    // target themselves: a move whose target is a strict ancestor of its
    // source (allowed - only the reverse is `MOVING_ANCESTOR`) would
    // otherwise put the LCA of the full paths strictly below one of the two
    // parents, which no downward-only sub-descent could reach. The parents
    // are the actual write-touch points the LCA serialization is meant to
    // protect, so serializing on their common prefix preserves the same
    // mutual-exclusion guarantee.
    let lca_path = path::longest_common_prefix_path(&source_parent_path, &target_parent_path);
    let lca_comps = path::components(&lca_path);

    log::trace!("move({source}, {target}): lca is {lca_path}");
    let lca_descent = descend(root, &lca_comps, true).ok_or_else(|| {
        log::warn!("move({source}, {target}): missing ancestor on {lca_path}");
        TreeError::NotFound
    })?;
    let lca = Arc::clone(lca_descent.terminal());

    let source_parent_comps = path::components(&source_parent_path);
    let target_parent_comps = path::components(&target_parent_path);
    let source_suffix = &source_parent_comps[lca_comps.len()..];

    let source_branch = match descend::extend_write(&lca, source_suffix) {
        Ok(l) => l,
        Err(partial) => {
            descend::release_and_unwind_branch(&partial);
            lca_descent.release_terminal();
            lca_descent.unwind();
            log::warn!("move({source}, {target}): missing ancestor on {source_parent_path}");
            return Err(TreeError::NotFound);
        }
    };

    let same_parent = source_parent_path == target_parent_path;
    let target_branch = if same_parent {
        None
    } else {
        let target_suffix = &target_parent_comps[lca_comps.len()..];
        match descend::extend_write(&lca, target_suffix) {
            Ok(l) => Some(l),
            Err(partial) => {
                descend::release_and_unwind_branch(&partial);
                descend::release_and_unwind_branch(&source_branch);
                lca_descent.release_terminal();
                lca_descent.unwind();
                log::warn!("move({source}, {target}): missing ancestor on {target_parent_path}");
                return Err(TreeError::NotFound);
            }
        }
    };

    let source_parent = source_branch.last().cloned().unwrap_or_else(|| Arc::clone(&lca));
    let target_parent = match &target_branch {
        Some(l) => l.last().cloned().unwrap_or_else(|| Arc::clone(&lca)),
        None => Arc::clone(&source_parent),
    };

    let result = (|| -> TreeResult<()> {
        let source_dir = source_parent
            .children
            .read()
            .get(source_name)
            .cloned()
            .ok_or(TreeError::NotFound)?;
        if target_parent.children.read().contains_key(target_name) {
            return Err(TreeError::Exists);
        }
        log::trace!("move({source}, {target}): waiting for source subtree to go quiescent");
        source_dir.sync.wait_quiescent();
        source_parent.children.write().remove(source_name);
        source_dir.set_parent(&target_parent);
        target_parent
            .children
            .write()
            .insert(target_name.to_string(), source_dir);
        Ok(())
    })();

    if let Some(l) = &target_branch {
        descend::release_and_unwind_branch(l);
    }
    descend::release_and_unwind_branch(&source_branch);
    lca_descent.release_terminal();
    lca_descent.unwind();

    match &result {
        Ok(()) => log::info!("move({source}, {target}): directory moved"),
        Err(e) => log::warn!("move({source}, {target}): {e}"),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tree::Tree;
    use std::sync::{mpsc, Arc};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn scenario_one_from_design_notes() {
        let tree = Tree::new();
        for p in ["/a/", "/b/", "/a/b/", "/b/a/", "/b/a/d/", "/a/b/c/", "/a/b/d/"] {
            create(&tree.root, p).unwrap();
        }
        assert_eq!(list(&tree.root, "/a/").as_deref(), Some("b"));
        assert_eq!(list(&tree.root, "/a/b/").as_deref(), Some("c,d"));
        assert_eq!(list(&tree.root, "/b/").as_deref(), Some("a"));
    }

    #[test]
    fn scenario_two_move_across_subtrees() {
        let tree = Tree::new();
        for p in ["/a/", "/b/", "/a/b/", "/b/a/", "/b/a/d/", "/a/b/c/", "/a/b/d/"] {
            create(&tree.root, p).unwrap();
        }
        move_dir(&tree.root, "/a/b/", "/b/x/").unwrap();
        assert_eq!(list(&tree.root, "/a/").as_deref(), Some(""));
        assert_eq!(list(&tree.root, "/b/").as_deref(), Some("a,x"));
        assert_eq!(list(&tree.root, "/b/x/").as_deref(), Some("c,d"));
    }

    #[test]
    fn scenario_three_moving_ancestor_rejected() {
        let tree = Tree::new();
        for p in ["/a/", "/b/", "/a/b/", "/b/a/", "/b/a/d/", "/a/b/c/", "/a/b/d/"] {
            create(&tree.root, p).unwrap();
        }
        let err = move_dir(&tree.root, "/a/", "/a/b/d/x/").unwrap_err();
        assert_eq!(err, TreeError::MovingAncestor);
        assert_eq!(list(&tree.root, "/a/").as_deref(), Some("b"));
    }

    #[test]
    fn scenario_four_error_codes() {
        let tree = Tree::new();
        assert_eq!(remove(&tree.root, "/").unwrap_err(), TreeError::Busy);
        assert_eq!(create(&tree.root, "/").unwrap_err(), TreeError::Exists);
        assert_eq!(
            create(&tree.root, "/a/b/c/d/").unwrap_err(),
            TreeError::NotFound
        );
    }

    #[test]
    fn move_self_is_noop() {
        let tree = Tree::new();
        create(&tree.root, "/a/").unwrap();
        create(&tree.root, "/a/b/").unwrap();
        move_dir(&tree.root, "/a/", "/a/").unwrap();
        assert_eq!(list(&tree.root, "/a/").as_deref(), Some("b"));
    }

    #[test]
    fn move_then_move_back_restores_tree() {
        let tree = Tree::new();
        create(&tree.root, "/a/").unwrap();
        create(&tree.root, "/b/").unwrap();
        create(&tree.root, "/a/c/").unwrap();
        move_dir(&tree.root, "/a/c/", "/b/c/").unwrap();
        move_dir(&tree.root, "/b/c/", "/a/c/").unwrap();
        assert_eq!(list(&tree.root, "/a/").as_deref(), Some("c"));
        assert_eq!(list(&tree.root, "/b/").as_deref(), Some(""));
    }

    #[test]
    fn create_then_remove_restores_empty_tree() {
        let tree = Tree::new();
        create(&tree.root, "/a/").unwrap();
        assert_eq!(list(&tree.root, "/").as_deref(), Some("a"));
        remove(&tree.root, "/a/").unwrap();
        assert_eq!(list(&tree.root, "/").as_deref(), Some(""));
    }

    #[test]
    fn remove_nonempty_rejected() {
        let tree = Tree::new();
        create(&tree.root, "/a/").unwrap();
        create(&tree.root, "/a/b/").unwrap();
        assert_eq!(remove(&tree.root, "/a/").unwrap_err(), TreeError::NotEmpty);
    }

    #[test]
    fn list_of_missing_path_is_sentinel_none() {
        let tree = Tree::new();
        assert_eq!(list(&tree.root, "/nope/"), None);
        assert_eq!(list(&tree.root, "not-a-path"), None);
    }

    fn panic_timeout<T, F>(dur: Duration, f: F) -> T
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || {
            let val = f();
            tx.send(()).unwrap();
            val
        });
        match rx.recv_timeout(dur) {
            Ok(_) => handle.join().expect("thread panicked"),
            Err(_) => panic!("thread timed out, likely deadlocked"),
        }
    }

    /// Many readers and writers hammering overlapping paths concurrently
    /// must never deadlock and must leave the tree internally consistent.
    #[test]
    fn concurrent_workers_do_not_deadlock() {
        let tree = Arc::new(Tree::new());
        for p in ["/a/", "/b/", "/a/b/", "/b/a/"] {
            tree.create(p).unwrap();
        }
        panic_timeout(Duration::from_secs(10), move || {
            let handles: Vec<_> = (0..8)
                .map(|id| {
                    let tree = Arc::clone(&tree);
                    thread::spawn(move || {
                        for i in 0..100 {
                            match (id + i) % 4 {
                                0 => {
                                    let _ = tree.list("/a/");
                                }
                                1 => {
                                    let _ = tree.create(&format!("/a/w{id}/"));
                                }
                                2 => {
                                    let _ = tree.remove(&format!("/a/w{id}/"));
                                }
                                _ => {
                                    let _ = tree.move_dir("/a/b/", "/b/b/");
                                    let _ = tree.move_dir("/b/b/", "/a/b/");
                                }
                            }
                        }
                    })
                })
                .collect();
            for h in handles {
                h.join().expect("worker thread panicked");
            }
            tree.debug_assert_quiescent();
        });
    }
}
