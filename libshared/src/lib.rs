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

//! Shared utilities used by both the `treecore` engine crate and the `treesh` CLI.

pub mod util;

use std::str::FromStr;

lazy_static::lazy_static! {
    static ref ARGS_RE: regex::Regex = regex::Regex::from_str(r#"("[^"]*"|'[^']*'|[\S]+)+"#).unwrap();
}

/// Splits a REPL line into shell-like whitespace-separated arguments,
/// honoring single and double quoted spans.
pub fn split_into_args(line: &str) -> Vec<String> {
    ARGS_RE
        .find_iter(line)
        .map(|val| val.as_str().replace(['\'', '"'], ""))
        .collect()
}
