//! TypeScript declarations for the types a web host exchanges with the core.

use crate::bookmarks::{Bookmark, BookmarkEdit, NewBookmark};
use crate::notifications::Notification;
use crate::progress::Progress;
use crate::scroll::ScrollRequest;
use crate::search::SearchResult;
use crate::session::{ReaderSnapshot, RenderedLine};
use crate::viewport::ViewportRange;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use ts_rs::TS;

fn export_single_type<T: TS + 'static>(out_dir: &Path, names: &mut Vec<String>) -> Result<()> {
    T::export_all_to(out_dir).with_context(|| format!("Failed to export {}", T::name()))?;
    names.push(T::name());
    Ok(())
}

/// Clear stale `.ts` files in `out_dir`, export every type and write an
/// `index.ts` re-exporting them.
pub fn export_ts_bindings(out_dir: &Path) -> Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    for entry in
        fs::read_dir(out_dir).with_context(|| format!("Failed to list {}", out_dir.display()))?
    {
        let path = entry.context("Failed to read entry")?.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("ts") {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
    }

    let mut names = Vec::new();
    export_single_type::<ViewportRange>(out_dir, &mut names)?;
    export_single_type::<ScrollRequest>(out_dir, &mut names)?;
    export_single_type::<SearchResult>(out_dir, &mut names)?;
    export_single_type::<Bookmark>(out_dir, &mut names)?;
    export_single_type::<BookmarkEdit>(out_dir, &mut names)?;
    export_single_type::<NewBookmark>(out_dir, &mut names)?;
    export_single_type::<Progress>(out_dir, &mut names)?;
    export_single_type::<Notification>(out_dir, &mut names)?;
    export_single_type::<RenderedLine>(out_dir, &mut names)?;
    export_single_type::<ReaderSnapshot>(out_dir, &mut names)?;

    let index_content: String = names
        .iter()
        .map(|name| format!("export type {{ {name} }} from \"./{name}\";\n"))
        .collect();
    let index_path = out_dir.join("index.ts");
    fs::write(&index_path, index_content)
        .with_context(|| format!("Failed to write {}", index_path.display()))?;

    Ok(())
}
