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

//! The engine's error taxonomy.
//!
//! Caller errors (validation failures, absent paths, semantic conflicts) are
//! returned here unchanged, with no state mutated. Allocation failure and
//! synchronization-primitive poisoning are not representable by this type —
//! both are treated as fatal by the engine (see the module-level docs on
//! `engine::tree`) and abort the process instead of being propagated.

use core::fmt;

pub type TreeResult<T> = Result<T, TreeError>;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[repr(i8)]
/// Caller-facing error codes for the five tree operations.
///
/// Discriminants are explicit and distinct; [`TreeError::MovingAncestor`] is
/// a negative, library-specific code that cannot collide with any POSIX
/// `errno` value in use by the other variants' conceptual analogues.
pub enum TreeError {
    /// The path failed syntactic validation (empty, too long, bad
    /// component, missing leading/trailing `/`).
    Inval = 1,
    /// `create`/`move_dir` target names a node that already exists, or a
    /// caller attempted to treat `/` as creatable/movable-onto.
    Exists = 2,
    /// An ancestor on the path (or the node itself) does not exist.
    NotFound = 3,
    /// The root was named as the subject of `remove` or as the source of
    /// `move_dir`; the root can never be detached.
    Busy = 4,
    /// `remove` was called on a directory that still has children.
    NotEmpty = 5,
    /// `move_dir` was asked to move a directory into one of its own
    /// descendants, which would disconnect the tree from its root.
    MovingAncestor = -1,
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::Inval => "invalid path",
            Self::Exists => "already exists",
            Self::NotFound => "no such directory",
            Self::Busy => "the root cannot be removed or moved",
            Self::NotEmpty => "directory not empty",
            Self::MovingAncestor => "cannot move a directory into its own descendant",
        };
        write!(f, "{msg}")
    }
}

impl std::error::Error for TreeError {}
