//! Tree builder: linear tokens to an AST
//!
//! Every token becomes a node. Nodes with a parent are appended to that
//! parent's children in token order; the rest become roots in token order.

use std::collections::HashMap;

use tracing::trace;

use super::token::{ParseError, Token};
use crate::domain::{AstTree, Node, NodeKind};

/// Builds a tree from tokens produced by either lexer
pub fn build_tree(tokens: Vec<Token>) -> Result<AstTree, ParseError> {
    let mut index = HashMap::with_capacity(tokens.len());
    for (i, token) in tokens.iter().enumerate() {
        if index.insert(token.id.clone(), i).is_some() {
            return Err(ParseError::DuplicateId(token.id.clone()));
        }
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); tokens.len()];
    let mut roots = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        let Some(parent) = &token.parent else {
            roots.push(i);
            continue;
        };

        let &parent_index = index.get(parent).ok_or_else(|| ParseError::UnknownParent {
            child: token.id.clone(),
            parent: parent.clone(),
        })?;

        if tokens[parent_index].kind == NodeKind::Task && token.kind != NodeKind::Task {
            return Err(ParseError::InvalidNesting {
                child_kind: token.kind,
                parent: parent.clone(),
            });
        }

        children[parent_index].push(i);
    }

    let ids: Vec<_> = tokens.iter().map(|t| t.id.clone()).collect();
    let mut slots: Vec<Option<Node>> = tokens.into_iter().map(|t| Some(t.into_node())).collect();

    let tree = AstTree::new(
        roots
            .iter()
            .filter_map(|&i| assemble(i, &mut slots, &children))
            .collect(),
    );

    // Anything left over hangs off a parent chain that never reaches a root
    if let Some(i) = slots.iter().position(Option::is_some) {
        return Err(ParseError::Cycle(ids[i].clone()));
    }

    trace!(nodes = ids.len(), roots = tree.roots.len(), "built tree");
    Ok(tree)
}

fn assemble(i: usize, slots: &mut [Option<Node>], children: &[Vec<usize>]) -> Option<Node> {
    let mut node = slots[i].take()?;
    node.children = children[i]
        .iter()
        .filter_map(|&child| assemble(child, slots, children))
        .collect();
    Some(node)
}
