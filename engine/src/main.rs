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

//! `treed` - a demo/benchmark binary that hammers a [`treecore::Tree`] from
//! several worker threads at once: each worker repeatedly and randomly
//! lists, creates, removes, or moves directories in a shared tree, and we
//! report how many iterations each operation completed.

use clap::{App, Arg};
use log::info;
use rand::Rng;
use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use treecore::engine::config::{Config, LOG_ENV_VAR};
use treecore::Tree;

const SEED_PATHS: &[&str] = &["/a/", "/b/", "/a/b/", "/b/a/", "/b/a/d/", "/a/b/c/", "/a/b/d/"];
const DIR_NAMES: &[&str] = &[
    "/a/", "/b/", "/c/", "/d/", "/e/", "/f/", "/g/", "/h/", "/i/", "/j/", "/k/", "/l/", "/m/",
    "/n/", "/o/", "/p/", "/q/", "/r/", "/s/", "/t/", "/u/", "/v/", "/w/", "/x/", "/y/", "/z/",
];

fn build_seed_tree() -> Tree {
    let tree = Tree::new();
    for path in SEED_PATHS {
        tree.create(path).expect("seed paths are well-formed and ancestor-complete");
    }
    tree
}

fn worker(id: usize, tree: Arc<Tree>, iterations: usize, completed: Arc<AtomicUsize>) {
    let mut rng = rand::thread_rng();
    for _ in 0..iterations {
        match rng.gen_range(0..4) {
            0 => {
                let path = DIR_NAMES[rng.gen_range(0..2)];
                if tree.list(path).is_none() {
                    info!("worker {id}: list({path}) found nothing");
                }
            }
            1 => {
                let path = DIR_NAMES[rng.gen_range(0..DIR_NAMES.len())];
                let _ = tree.create(path);
            }
            2 => {
                let path = DIR_NAMES[rng.gen_range(0..DIR_NAMES.len())];
                let _ = tree.remove(path);
            }
            _ => {
                let source = DIR_NAMES[rng.gen_range(0..DIR_NAMES.len())];
                let target = DIR_NAMES[rng.gen_range(0..DIR_NAMES.len())];
                let _ = tree.move_dir(source, target);
            }
        }
        completed.fetch_add(1, Ordering::Relaxed);
    }
}

fn main() {
    env_logger::Builder::new()
        .parse_filters(&env::var(LOG_ENV_VAR).unwrap_or_else(|_| "info".to_owned()))
        .init();

    let matches = App::new("treed")
        .about("Concurrent tree engine demo/benchmark")
        .arg(
            Arg::with_name("workers")
                .long("workers")
                .takes_value(true)
                .help("number of concurrent worker threads"),
        )
        .arg(
            Arg::with_name("iterations")
                .long("iterations")
                .takes_value(true)
                .help("operations performed by each worker"),
        )
        .get_matches();

    let workers = matches.value_of("workers").and_then(|v| v.parse().ok());
    let iterations = matches
        .value_of("iterations")
        .and_then(|v| v.parse().ok());
    let cfg = Config::from_args(workers, iterations);

    info!(
        "starting demo with {} workers x {} iterations",
        cfg.workers, cfg.iterations
    );

    let tree = Arc::new(build_seed_tree());
    let completed = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..cfg.workers)
        .map(|id| {
            let tree = Arc::clone(&tree);
            let completed = Arc::clone(&completed);
            let iterations = cfg.iterations;
            thread::spawn(move || worker(id, tree, iterations, completed))
        })
        .collect();

    for h in handles {
        h.join().expect("worker thread panicked");
    }

    info!(
        "demo finished: {} operations completed across {} workers",
        completed.load(Ordering::Relaxed),
        cfg.workers
    );
    println!(
        "{} operations completed across {} workers",
        completed.load(Ordering::Relaxed),
        cfg.workers
    );
}
