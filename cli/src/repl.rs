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

use crate::error::{CliError, CliResult};
use libshared::{split_into_args, util::terminal};
use rustyline::config::Configurer;
use rustyline::error::ReadlineError;
use rustyline::Editor;
use std::io::ErrorKind;

type ReplEditor = Editor<()>;
use treecore::Tree;

const TREESH_HISTORY_FILE: &str = ".treesh_history";
const TXT_WELCOME: &str = "treesh - an interactive shell for the tree engine\n\
Commands:\n  list <path>\n  create <path>\n  remove <path>\n  move <source> <target>\n  !help\n  clear\n  exit";

pub fn start() -> CliResult<()> {
    let tree = Tree::new();
    let mut editor = match init_editor() {
        Ok(e) => e,
        Err(e) => fatal!("error: failed to init REPL. {e}"),
    };
    let prompt = "treesh> ".to_owned();
    loop {
        match editor.readline(&prompt) {
            Ok(line) => match line.as_str() {
                "!help" => println!("{TXT_WELCOME}"),
                "exit" => break,
                "clear" => clear_screen()?,
                _ => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    dispatch(&tree, &line);
                }
            },
            Err(e) => match e {
                ReadlineError::Interrupted | ReadlineError::Eof => break,
                e => fatal!("error: failed to read line REPL. {e}"),
            },
        }
    }
    editor
        .save_history(TREESH_HISTORY_FILE)
        .expect("failed to save history");
    println!("Goodbye!");
    Ok(())
}

fn dispatch(tree: &Tree, line: &str) {
    let args = split_into_args(line);
    let mut parts = args.iter().map(String::as_str);
    let result = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some("list"), Some(path), None, None) => match tree.list(path) {
            Some(listing) if listing.is_empty() => terminal::write_info("(empty)\n"),
            Some(listing) => terminal::write_info(format!("{listing}\n")),
            None => terminal::write_warning(format!("no such directory: {path}\n")),
        },
        (Some("create"), Some(path), None, None) => match tree.create(path) {
            Ok(()) => terminal::write_success(format!("created {path}\n")),
            Err(e) => terminal::write_error(format!("{e}\n")),
        },
        (Some("remove"), Some(path), None, None) => match tree.remove(path) {
            Ok(()) => terminal::write_success(format!("removed {path}\n")),
            Err(e) => terminal::write_error(format!("{e}\n")),
        },
        (Some("move"), Some(source), Some(target), None) => {
            match tree.move_dir(source, target) {
                Ok(()) => terminal::write_success(format!("moved {source} -> {target}\n")),
                Err(e) => terminal::write_error(format!("{e}\n")),
            }
        }
        _ => terminal::write_warning("unrecognized command, try !help\n"),
    };
    let _ = result;
}

fn init_editor() -> rustyline::Result<ReplEditor> {
    let mut editor = Editor::<()>::new();
    editor.set_auto_add_history(true);
    match editor.load_history(TREESH_HISTORY_FILE) {
        Ok(()) => {}
        Err(e) => match e {
            ReadlineError::Io(ref ioe) if ioe.kind() == ErrorKind::NotFound => {
                println!("{TXT_WELCOME}");
            }
            e => return Err(e),
        },
    }
    Ok(editor)
}

fn clear_screen() -> Result<(), CliError> {
    print!("\x1B[2J\x1B[1;1H");
    Ok(())
}
