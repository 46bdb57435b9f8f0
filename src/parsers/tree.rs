// Copyright 2020 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::Arc;

use crate::grammar::Expr;
use crate::tokens::Token;
use crate::utils::Name;

/// A single derivation tree.
///
/// Leaves borrow the caller's tokens. Branches record the expression used
/// and the span of input it covers; their children follow the order of the
/// expression's terms. Optional terms that were absent have no child.
///
/// Children are shared between clones, so cloning a tree is cheap and the
/// trees enumerated from one forest share their common subtrees.
#[derive(Derivative)]
#[derivative(Clone(bound = ""), Debug(bound = "T: std::fmt::Debug"))]
pub enum Tree<'a, T> {
  Leaf {
    position: usize,
    token: &'a Token<T>,
  },
  Branch {
    expr: Expr<'a>,
    start: usize,
    end: usize,
    children: Arc<Vec<Tree<'a, T>>>,
  },
}

impl<'a, T> Tree<'a, T> {
  pub fn new_leaf(position: usize, token: &'a Token<T>) -> Self {
    Tree::Leaf { position, token }
  }

  pub fn new_branch(
    expr: Expr<'a>,
    start: usize,
    end: usize,
    children: impl IntoIterator<Item = Tree<'a, T>>,
  ) -> Self {
    Tree::Branch {
      expr,
      start,
      end,
      children: Arc::new(children.into_iter().collect()),
    }
  }

  /// The token name of a leaf, or the nonterminal of a branch.
  pub fn name(&self) -> &'a Name {
    match self {
      Tree::Leaf { token, .. } => token.name(),
      Tree::Branch { expr, .. } => expr.head(),
    }
  }

  pub fn start(&self) -> usize {
    match self {
      Tree::Leaf { position, .. } => *position,
      Tree::Branch { start, .. } => *start,
    }
  }

  pub fn end(&self) -> usize {
    match self {
      Tree::Leaf { position, .. } => *position + 1,
      Tree::Branch { end, .. } => *end,
    }
  }

  pub fn is_leaf(&self) -> bool {
    matches!(self, Tree::Leaf { .. })
  }

  /// The expression a branch was derived with.
  pub fn expr(&self) -> Option<Expr<'a>> {
    match self {
      Tree::Leaf { .. } => None,
      Tree::Branch { expr, .. } => Some(*expr),
    }
  }

  pub fn token(&self) -> Option<&'a Token<T>> {
    match self {
      Tree::Leaf { token, .. } => Some(*token),
      Tree::Branch { .. } => None,
    }
  }

  pub fn children(&self) -> impl DoubleEndedIterator<Item = &Tree<'a, T>> {
    let children = match self {
      Tree::Leaf { .. } => None,
      Tree::Branch { children, .. } => Some(children.iter()),
    };
    children.into_iter().flatten()
  }

  pub fn num_children(&self) -> usize {
    match self {
      Tree::Leaf { .. } => 0,
      Tree::Branch { children, .. } => children.len(),
    }
  }

  /// Returns the tokens under this tree, in input order.
  pub fn leaves(&self) -> impl Iterator<Item = &'a Token<T>> {
    let mut leaves = Vec::new();
    let mut stack = vec![self];
    while let Some(tree) = stack.pop() {
      match tree {
        Tree::Leaf { token, .. } => leaves.push(*token),
        Tree::Branch { children, .. } => stack.extend(children.iter().rev()),
      }
    }
    leaves.into_iter()
  }

  /// Renders the tree with one node per line. Each line is prefixed with
  /// one backtick per level of nesting:
  ///
  /// ```text
  /// S
  /// `a
  /// `S
  /// `b
  /// ```
  pub fn to_outline(&self) -> String {
    let mut out = String::new();
    let mut stack = vec![(self, 0)];
    while let Some((tree, depth)) = stack.pop() {
      out.extend(std::iter::repeat('`').take(depth));
      out.push_str(tree.name());
      out.push('\n');
      stack.extend(tree.children().rev().map(|child| (child, depth + 1)));
    }
    out
  }
}

// Trees can be as deep as the input is long, so they are taken apart
// without recursion.
impl<'a, T> Drop for Tree<'a, T> {
  fn drop(&mut self) {
    let mut pending = Vec::new();
    take_unshared_children(self, &mut pending);
    while let Some(children) = pending.pop() {
      if let Ok(children) = Arc::try_unwrap(children) {
        for mut child in children {
          take_unshared_children(&mut child, &mut pending);
        }
      }
    }
  }
}

/// Moves the children of `tree` to `pending` if no other tree shares them.
fn take_unshared_children<'a, T>(
  tree: &mut Tree<'a, T>,
  pending: &mut Vec<Arc<Vec<Tree<'a, T>>>>,
) {
  if let Tree::Branch { children, .. } = tree {
    if !children.is_empty() && Arc::strong_count(children) == 1 {
      pending.push(std::mem::take(children));
    }
  }
}

impl<'a, T> std::fmt::Display for Tree<'a, T> {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    f.write_str(&self.to_outline())
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::grammar::examples;

  #[test]
  fn test_outline() {
    let g = examples::make_balanced();
    let mut exprs = g.get_rule("S").exprs();
    let recurse = exprs.next().unwrap();
    let empty = exprs.next().unwrap();
    let tokens = Token::from_names(vec!["a", "b"]);

    let inner = Tree::new_branch(empty, 1, 1, vec![]);
    let tree = Tree::new_branch(
      recurse,
      0,
      2,
      vec![
        Tree::new_leaf(0, &tokens[0]),
        inner,
        Tree::new_leaf(1, &tokens[1]),
      ],
    );

    assert_eq!(tree.to_outline(), "S\n`a\n`S\n`b\n");
    assert_eq!(tree.to_string(), tree.to_outline());
    assert_eq!(tree.num_children(), 3);
    assert_eq!(
      tree.leaves().map(|t| t.name().str()).collect::<Vec<_>>(),
      vec!["a", "b"]
    );
    assert_eq!(tree.expr(), Some(recurse));
    assert!(tree.token().is_none());
  }

  #[test]
  fn test_leaf_span() {
    let tokens = Token::from_names(vec!["x"]);
    let leaf: Tree<()> = Tree::new_leaf(0, &tokens[0]);
    assert!(leaf.is_leaf());
    assert_eq!((leaf.start(), leaf.end()), (0, 1));
    assert_eq!(leaf.children().count(), 0);
    assert_eq!(leaf.name(), "x");
  }

  #[test]
  fn test_deep_tree_drops() {
    let g = examples::make_right_recursive();
    let mut exprs = g.get_rule("S").exprs();
    let recurse = exprs.next().unwrap();
    let single = exprs.next().unwrap();
    let depth = 200_000;
    let tokens = Token::from_names(std::iter::repeat("a").take(depth));

    let last = Tree::new_leaf(depth - 1, &tokens[depth - 1]);
    let mut tree = Tree::new_branch(single, depth - 1, depth, vec![last]);
    for pos in (0..depth - 1).rev() {
      tree = Tree::new_branch(
        recurse,
        pos,
        depth,
        vec![Tree::new_leaf(pos, &tokens[pos]), tree],
      );
    }

    let shared = tree.clone();
    assert_eq!(shared.leaves().count(), depth);
    drop(tree);
    assert_eq!(shared.num_children(), 2);
    drop(shared);
  }
}
