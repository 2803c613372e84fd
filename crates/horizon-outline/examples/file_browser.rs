//! Lazily browse a directory tree.
//!
//! Directory listings are read on the rayon pool and published back through
//! the dispatcher, so the "render loop" below never blocks on the filesystem.
//!
//! ```text
//! cargo run --example file_browser -- /usr/share
//! RUST_LOG=horizon_outline=debug cargo run --example file_browser
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use horizon_outline::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct FsEntry {
    path: PathBuf,
    is_dir: bool,
}

impl FsEntry {
    fn name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

impl LazyItem for FsEntry {
    type Key = PathBuf;

    fn key(&self) -> PathBuf {
        self.path.clone()
    }

    fn may_have_children(&self) -> bool {
        self.is_dir
    }

    fn load_children(&self) -> Result<Vec<Self>, LoadError> {
        let entries =
            std::fs::read_dir(&self.path).map_err(|err| LoadError::io(&self.path, err))?;

        let mut children = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| LoadError::io(&self.path, err))?;
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            children.push(FsEntry {
                path: entry.path(),
                is_dir,
            });
        }
        children.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.path.cmp(&b.path)));
        Ok(children)
    }
}

/// Runs frames until `done` holds or a second passes. Each frame handles at
/// most one batch of completions.
fn pump(dispatcher: &Dispatcher, mut done: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(1);
    while !done() && Instant::now() < deadline {
        dispatcher.process_pending();
        std::thread::sleep(Duration::from_millis(5));
    }
    dispatcher.process_all();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let root_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let config = match std::env::var("OUTLINE_CONFIG") {
        Ok(path) => OutlineConfig::load(path)?,
        Err(_) => OutlineConfig::default(),
    };

    let dispatcher = Dispatcher::with_batch_size(16);
    dispatcher.install()?;

    let root = Arc::new(LazyNode::new(
        FsEntry {
            is_dir: root_path.is_dir(),
            path: root_path.clone(),
        },
        dispatcher.handle(),
    ));

    let expansion = Arc::new(ExpansionStore::new());
    let selection = Arc::new(SelectionModel::single());
    let mut view = OutlineView::new(vec![root.clone()], expansion.clone(), |node: &LazyNode<FsEntry>| {
        node.item().name()
    })
    .with_selection(selection.clone())
    .with_config(config)
    .with_on_node_click(|node| println!("clicked {}", node.item().path.display()));

    // Select the root, then click again to open it.
    view.activate(&root_path);
    view.activate(&root_path);
    println!("{}", view.debug_dump());

    pump(&dispatcher, || !root.is_loading_children());
    for change in view.update() {
        println!("{change:?}");
    }

    // Open the first subdirectory, if there is one.
    let first_dir = view
        .rows()
        .iter()
        .find(|row| row.depth() == 1 && row.affordance() == Affordance::Collapsed)
        .map(|row| (row.id().clone(), row.node().clone()));
    if let Some((id, node)) = first_dir {
        view.toggle_expanded(&id);
        // Walking the newly opened row starts its fetch.
        println!("{}", view.debug_dump());
        pump(&dispatcher, || !node.is_loading_children());
    }

    println!("{}", view.debug_dump());
    println!("{} visible rows, {} selected", view.row_count(), selection.len());
    Ok(())
}
