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

//! The concurrent directory tree engine.
//!
//! Three cooperating layers, innermost first:
//! - [`sync`] - per-node readers/writers/quiescence synchronization.
//! - [`tree::descend`] (private) - hand-over-hand path descent with a
//!   refcount trail, and its matching unwind.
//! - [`tree`] - the five public operations, composed on top of descent.
//!
//! [`path`] and [`error`] are the narrow external contracts the core
//! depends on: path parsing/validation, and the caller-facing error
//! taxonomy.
//!
//! Resource-exhaustion (allocation failure) and synchronization-primitive
//! failure are not represented in [`error::TreeError`] - both are
//! unrecoverable conditions the engine does not attempt to handle locally;
//! `parking_lot`'s primitives do not return errors, and an allocation
//! failure aborts the process per Rust's default `alloc` behavior.

pub mod config;
pub mod error;
pub mod path;
pub mod sync;
pub mod tree;
