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

//! Path parsing and validation.
//!
//! Out of the engine's hard scope per design: any correct implementation of
//! "split `/a/b/c/` into components, validate it, find a parent path, find a
//! least-common-ancestor path" suffices here. Kept deliberately small.

pub const MAX_PATH_LENGTH: usize = 4095;
pub const MAX_COMPONENT_LENGTH: usize = 255;

/// Returns `true` if `path` is a syntactically valid canonical directory
/// path: starts and ends with `/`, each component is 1-255 lowercase ASCII
/// letters, and the total length does not exceed [`MAX_PATH_LENGTH`].
pub fn is_valid(path: &str) -> bool {
    if path.is_empty() || path.len() > MAX_PATH_LENGTH {
        return false;
    }
    if !path.starts_with('/') || !path.ends_with('/') {
        return false;
    }
    if path == "/" {
        return true;
    }
    path[1..path.len() - 1].split('/').all(|component| {
        !component.is_empty()
            && component.len() <= MAX_COMPONENT_LENGTH
            && component.bytes().all(|b| b.is_ascii_lowercase())
    })
}

/// Splits a validated path into its ordered components. `"/"` has zero
/// components.
pub fn components(path: &str) -> Vec<&str> {
    if path == "/" {
        return Vec::new();
    }
    path[1..path.len() - 1].split('/').collect()
}

/// Splits a non-root validated path into its parent path (with trailing
/// slash, `"/"` for a top-level entry) and its final component name.
/// Returns `None` for the root path, which has no parent.
pub fn parent_and_name(path: &str) -> Option<(String, &str)> {
    if path == "/" {
        return None;
    }
    let comps = components(path);
    let name = comps.last().copied().unwrap();
    let parent_len = path.len() - name.len() - 1;
    Some((path[..parent_len].to_string(), name))
}

/// `true` if `ancestor` is a proper ancestor of `path` (i.e. `path` lies
/// strictly within the subtree rooted at `ancestor`).
pub fn is_ancestor(ancestor: &str, path: &str) -> bool {
    ancestor != path && path.starts_with(ancestor)
}

/// The longest common directory-prefix path of `a` and `b` - the deepest
/// node that is a prefix of both.
pub fn longest_common_prefix_path(a: &str, b: &str) -> String {
    let ac = components(a);
    let bc = components(b);
    let mut out = String::from("/");
    for (x, y) in ac.iter().zip(bc.iter()) {
        if x == y {
            out.push_str(x);
            out.push('/');
        } else {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_basic_paths() {
        assert!(is_valid("/"));
        assert!(is_valid("/a/"));
        assert!(is_valid("/a/b/c/"));
        assert!(!is_valid("a/"));
        assert!(!is_valid("/a"));
        assert!(!is_valid("/A/"));
        assert!(!is_valid("/a//b/"));
        assert!(!is_valid(""));
    }

    #[test]
    fn splits_parent_and_name() {
        assert_eq!(parent_and_name("/"), None);
        assert_eq!(
            parent_and_name("/a/"),
            Some(("/".to_string(), "a"))
        );
        assert_eq!(
            parent_and_name("/a/b/c/"),
            Some(("/a/b/".to_string(), "c"))
        );
    }

    #[test]
    fn ancestor_checks() {
        assert!(is_ancestor("/a/", "/a/b/"));
        assert!(is_ancestor("/", "/a/"));
        assert!(!is_ancestor("/a/", "/a/"));
        assert!(!is_ancestor("/a/b/", "/a/"));
    }

    #[test]
    fn lca_computation() {
        assert_eq!(longest_common_prefix_path("/a/b/", "/a/c/"), "/a/");
        assert_eq!(longest_common_prefix_path("/a/b/", "/x/y/"), "/");
        assert_eq!(longest_common_prefix_path("/a/b/c/", "/a/b/d/"), "/a/b/");
        assert_eq!(longest_common_prefix_path("/a/", "/a/b/"), "/a/");
    }
}
