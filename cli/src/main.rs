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

//! `treesh` - an interactive shell over an in-process [`treecore::Tree`].
//!
//! There is no network client here: the tree lives in this process, so
//! `repl` talks to it directly rather than through a connection trait.

macro_rules! fatal {
    ($($arg:tt)*) => {{
        eprintln!($($arg)*);
        std::process::exit(0x01);
    }}
}

mod error;
mod repl;

fn main() {
    match repl::start() {
        Ok(()) => {}
        Err(e) => fatal!("treesh error: {e}"),
    }
}
