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

//! End-to-end scenarios against the public `Tree` API, black-box (no access
//! to the crate's debug-only introspection hooks).

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use treecore::{Tree, TreeError};

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

fn build_scenario_one() -> Tree {
    let tree = Tree::new();
    for p in ["/a/", "/b/", "/a/b/", "/b/a/", "/b/a/d/", "/a/b/c/", "/a/b/d/"] {
        tree.create(p).unwrap();
    }
    tree
}

#[test]
fn scenario_one_listing() {
    let tree = build_scenario_one();
    assert_eq!(tree.list("/a/").as_deref(), Some("b"));
    assert_eq!(tree.list("/a/b/").as_deref(), Some("c,d"));
    assert_eq!(tree.list("/b/").as_deref(), Some("a"));
}

#[test]
fn scenario_two_move_across_subtrees() {
    let tree = build_scenario_one();
    tree.move_dir("/a/b/", "/b/x/").unwrap();
    assert_eq!(tree.list("/a/").as_deref(), Some(""));
    assert_eq!(tree.list("/b/").as_deref(), Some("a,x"));
    assert_eq!(tree.list("/b/x/").as_deref(), Some("c,d"));
}

#[test]
fn scenario_three_moving_into_own_descendant_rejected() {
    let tree = build_scenario_one();
    assert_eq!(
        tree.move_dir("/a/", "/a/b/d/x/").unwrap_err(),
        TreeError::MovingAncestor
    );
    assert_eq!(tree.list("/a/").as_deref(), Some("b"));
}

#[test]
fn scenario_four_root_and_missing_ancestor_errors() {
    let tree = Tree::new();
    assert_eq!(tree.remove("/").unwrap_err(), TreeError::Busy);
    assert_eq!(tree.create("/").unwrap_err(), TreeError::Exists);
    assert_eq!(
        tree.create("/a/b/c/d/").unwrap_err(),
        TreeError::NotFound
    );
}

#[test]
fn scenario_five_disjoint_concurrent_create_remove() {
    let tree = Arc::new(Tree::new());
    tree.create("/a/").unwrap();
    tree.create("/b/").unwrap();

    panic_timeout(Duration::from_secs(10), move || {
        let tree_a = Arc::clone(&tree);
        let worker_a = thread::spawn(move || {
            for i in 0..200 {
                let letter = (b'a' + (i % 26) as u8) as char;
                let p = format!("/a/x{letter}/");
                tree_a.create(&p).unwrap();
                tree_a.remove(&p).unwrap();
            }
        });
        let tree_b = Arc::clone(&tree);
        let worker_b = thread::spawn(move || {
            for i in 0..200 {
                let letter = (b'a' + (i % 26) as u8) as char;
                let p = format!("/b/x{letter}/");
                tree_b.create(&p).unwrap();
                tree_b.remove(&p).unwrap();
            }
        });
        worker_a.join().expect("worker a panicked");
        worker_b.join().expect("worker b panicked");
        assert_eq!(tree.list("/a/").as_deref(), Some(""));
        assert_eq!(tree.list("/b/").as_deref(), Some(""));
    });
}

#[test]
fn scenario_six_racing_symmetric_moves_exactly_one_succeeds() {
    let tree = Arc::new(Tree::new());
    tree.create("/x/").unwrap();
    tree.create("/y/").unwrap();

    panic_timeout(Duration::from_secs(10), move || {
        let tree_a = Arc::clone(&tree);
        let a = thread::spawn(move || tree_a.move_dir("/x/", "/y/x/"));
        let tree_b = Arc::clone(&tree);
        let b = thread::spawn(move || tree_b.move_dir("/y/", "/x/y/"));

        let result_a = a.join().expect("mover a panicked");
        let result_b = b.join().expect("mover b panicked");

        let oks = [&result_a, &result_b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(oks, 1, "exactly one of the two racing moves must succeed");
        for result in [&result_a, &result_b] {
            if let Err(e) = result {
                assert!(
                    matches!(e, TreeError::MovingAncestor | TreeError::NotFound),
                    "losing move must fail with MovingAncestor or NotFound, got {e:?}"
                );
            }
        }
        // the tree remains acyclic and internally consistent: exactly one
        // of the two possible nestings exists, never both, never neither.
        let x_under_y = tree.list("/y/x/").is_some();
        let y_under_x = tree.list("/x/y/").is_some();
        assert_ne!(x_under_y, y_under_x);
    });
}
