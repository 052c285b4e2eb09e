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

//! Process-wide configuration for the `treed` demo binary.
//!
//! Deliberately small: there is no network listener, TLS, or persistence to
//! configure here, only the handful of knobs the concurrent demo/benchmark
//! in `main.rs` needs. The pattern - typed defaults, overridable from the
//! environment and from CLI flags - carries over even though the surface is
//! tiny.

use std::env;

/// Default number of worker threads the demo spins up per side (creators
/// and removers).
const DEFAULT_WORKERS: usize = 4;
/// Default number of create/remove iterations each worker performs.
const DEFAULT_ITERATIONS: usize = 200;
/// Environment variable controlling the `log` filter, read by `main.rs` the
/// same way a server binary reads its own log-level variable.
pub const LOG_ENV_VAR: &str = "TREED_LOG";

#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub workers: usize,
    pub iterations: usize,
}

impl Config {
    /// Builds a [`Config`] from CLI-style overrides, falling back to
    /// environment variables and finally to the built-in defaults.
    pub fn from_args(workers: Option<usize>, iterations: Option<usize>) -> Self {
        let workers = workers
            .or_else(|| env::var("TREED_WORKERS").ok().and_then(|v| v.parse().ok()))
            .unwrap_or(DEFAULT_WORKERS);
        let iterations = iterations
            .or_else(|| {
                env::var("TREED_ITERATIONS")
                    .ok()
                    .and_then(|v| v.parse().ok())
            })
            .unwrap_or(DEFAULT_ITERATIONS);
        Self { workers, iterations }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_args(None, None)
    }
}
