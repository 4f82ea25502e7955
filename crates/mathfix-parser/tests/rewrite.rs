use std::convert::Infallible;

use mathfix_parser::{
    NodeId, Tree, TreeError, Visit, VisitMut, parse_math, serialize,
    visit::{walk_command, walk_command_mut},
};

/// Drops `\displaystyle` and turns `\dfrac` into `\frac`.
struct Normalize;

impl VisitMut for Normalize {
    type Error = TreeError;

    fn visit_command(&mut self, tree: &mut Tree, id: NodeId) -> Result<(), Self::Error> {
        match tree.node(id).name() {
            Some("displaystyle") if tree.owning_cell(id).is_some() => {
                tree.delete(id)?;
                return Ok(());
            }
            Some("dfrac") => {
                tree.rename(id, "frac");
            }
            _ => {}
        }
        walk_command_mut(self, tree, id)
    }
}

#[derive(Default)]
struct CommandNames(Vec<String>);

impl Visit for CommandNames {
    type Error = Infallible;

    fn visit_command(&mut self, tree: &Tree, id: NodeId) -> Result<(), Self::Error> {
        self.0
            .push(tree.node(id).name().unwrap_or_default().to_string());
        walk_command(self, tree, id)
    }
}

#[test]
fn test_pass_outside_the_crate() {
    let mut tree = parse_math(
        r"\displaystyle \dfrac{a}{\dfrac{b}{c}} + \begin{cases} \displaystyle x \end{cases}",
    )
    .expect("Failed to parse");

    let root = tree.root();
    Normalize.visit(&mut tree, root).expect("Failed to rewrite");

    assert_eq!(
        serialize(&tree),
        r" \frac{a}{\frac{b}{c}} + \begin{cases}  x \end{cases}"
    );
}

#[test]
fn test_read_only_walk_in_document_order() {
    let tree = parse_math(r"\sqrt[n]{x^\alpha} + \frac{\beta}{2}").expect("Failed to parse");

    let mut names = CommandNames::default();
    let Ok(()) = names.visit(&tree, tree.root());

    assert_eq!(names.0, vec!["sqrt", "alpha", "frac", "beta"]);
}

#[test]
fn test_grafted_replacement_serializes_in_place() {
    let mut tree = parse_math(r"a + \old + b").expect("Failed to parse");
    let replacement = parse_math(r"\frac{1}{2}").expect("Failed to parse");

    let (cell, _) = tree
        .cells(tree.root())
        .find(|&(_, head)| tree.node(head).name() == Some("old"))
        .expect("command is present");
    let copy = tree.graft(&replacement, None);
    tree.replace(cell, copy).expect("Failed to replace");

    assert_eq!(serialize(&tree), r"a + \frac{1}{2} + b");
}
