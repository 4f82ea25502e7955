//! Renaming of block environments, `align` to `aligned` by default.
//!
//! Content is rendered inside an outer math environment, where the
//! top-level `align` is not allowed but its inner variant is.

use std::convert::Infallible;

use indexmap::IndexMap;
use log::trace;

use mathfix_parser::{Diagnostic, NodeId, Tree, VisitMut, visit::walk_block_mut};

use super::{Fix, UnitContext};

/// Renames every block whose name appears in its map.
#[derive(Debug, Clone)]
pub struct RenameEnvironments {
    renames: IndexMap<String, String>,
}

impl Default for RenameEnvironments {
    fn default() -> Self {
        Self::new(default_renames())
    }
}

impl RenameEnvironments {
    pub fn new(renames: IndexMap<String, String>) -> Self {
        Self { renames }
    }

    pub fn renames(&self) -> &IndexMap<String, String> {
        &self.renames
    }
}

/// `align` and `align*` both become `aligned`.
pub fn default_renames() -> IndexMap<String, String> {
    IndexMap::from([
        ("align".to_string(), "aligned".to_string()),
        ("align*".to_string(), "aligned".to_string()),
    ])
}

struct Renamer<'a> {
    renames: &'a IndexMap<String, String>,
}

impl VisitMut for Renamer<'_> {
    type Error = Infallible;

    fn visit_block(&mut self, tree: &mut Tree, id: NodeId) -> Result<(), Infallible> {
        let renamed = tree
            .node(id)
            .name()
            .and_then(|name| self.renames.get(name).map(|new| (name.to_string(), new)));

        if let Some((old, new)) = renamed {
            trace!(from = old, to = new; "Renaming environment");
            tree.rename(id, new.as_str());
        }
        walk_block_mut(self, tree, id)
    }
}

impl Fix for RenameEnvironments {
    fn name(&self) -> &'static str {
        "rename-environments"
    }

    fn fix(&self, tree: &mut Tree, _context: &mut UnitContext) -> Result<(), Diagnostic> {
        let root = tree.root();
        let Ok(()) = Renamer {
            renames: &self.renames,
        }
        .visit(tree, root);
        Ok(())
    }
}
