//! Rewrite passes applied to every math expression.
//!
//! A pass implements [`Fix`] and rewrites one resolved [`Tree`] in place.
//! State that must outlive a single expression, such as macro definitions,
//! lives in the [`UnitContext`] of the content unit being fixed.

mod environments;
mod newcommand;
mod spaces;

pub use environments::{RenameEnvironments, default_renames};
pub use newcommand::{
    DEFINITION_COMMAND, MAX_ARITY, MacroContext, MacroDefinition, MacroExpander,
};
pub use spaces::TrimSpaces;

use mathfix_parser::{Diagnostic, Tree};

/// Per content unit state shared by the passes.
#[derive(Debug, Clone, Default)]
pub struct UnitContext {
    macros: MacroContext,
}

impl UnitContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Macros defined so far in this unit.
    pub fn macros(&self) -> &MacroContext {
        &self.macros
    }

    pub fn macros_mut(&mut self) -> &mut MacroContext {
        &mut self.macros
    }
}

/// A rewrite pass over one math expression.
pub trait Fix {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Rewrite `tree` in place.
    ///
    /// # Errors
    ///
    /// Returns a diagnostic with spans relative to the expression text when
    /// the expression cannot be rewritten.
    fn fix(&self, tree: &mut Tree, context: &mut UnitContext) -> Result<(), Diagnostic>;
}

impl Fix for MacroExpander {
    fn name(&self) -> &'static str {
        "expand-macros"
    }

    fn fix(&self, tree: &mut Tree, context: &mut UnitContext) -> Result<(), Diagnostic> {
        self.apply(tree, context.macros_mut())
    }
}
