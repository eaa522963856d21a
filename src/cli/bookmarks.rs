//! Bookmark CLI operations for creature.

use anyhow::Result;
use colored::Colorize;

use super::{profile_storage, BookmarkAction};
use crate::bookmarks::{BookmarkNode, BookmarkStore};
use crate::config::{Config, LaunchOverrides};

/// Dispatches a bookmarks subcommand to its handler. Edits are saved
/// immediately.
pub(crate) fn handle_bookmarks(
    action: BookmarkAction,
    config: &Config,
    overrides: &LaunchOverrides,
) -> Result<()> {
    let storage = profile_storage(config, overrides)?;
    let mut store = BookmarkStore::open(&storage)?;

    match action {
        BookmarkAction::List { flat } => {
            if flat {
                for b in store.flat_bookmarks() {
                    let path = b.folders.join(" / ");
                    println!(
                        "{:<12} {:<28} {} {}",
                        b.guid.dimmed(),
                        b.title,
                        b.uri.cyan(),
                        path.dimmed()
                    );
                }
            } else {
                print_tree(store.root(), 0);
            }
        }
        BookmarkAction::Add { title, url, folder } => {
            let guid = store.add_bookmark(&title, &url, folder.as_deref())?;
            store.save()?;
            println!("{} bookmark '{}' ({})", "Added".green().bold(), title, guid);
        }
        BookmarkAction::Folder { title, parent } => {
            let guid = store.add_folder(&title, parent.as_deref())?;
            store.save()?;
            println!("{} folder '{}' ({})", "Added".green().bold(), title, guid);
        }
        BookmarkAction::Remove { guid } => match store.remove(&guid) {
            Some(node) => {
                store.save()?;
                println!("{} '{}'", "Removed".green().bold(), node.title);
            }
            None => anyhow::bail!("no removable bookmark with GUID '{}'", guid),
        },
    }
    Ok(())
}

fn print_tree(node: &BookmarkNode, depth: usize) {
    for child in &node.children {
        let indent = "  ".repeat(depth);
        if child.is_folder() {
            println!("{}{}", indent, child.title.bold());
            print_tree(child, depth + 1);
        } else {
            let uri = child.uri.as_deref().unwrap_or("");
            println!("{}{}  {}", indent, child.title, uri.cyan());
        }
    }
}
