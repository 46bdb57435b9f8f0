// Copyright 2018 Google LLC
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

use crate::grammar::{Expr, Term};
use crate::utils::ToDoc;

/// A dotted item: an expression and a cursor into it.
///
/// An expression state keeps track of a particular expression, the
/// nonterminal it derives, and an index into the expression, which is the
/// number of terms already matched. For example:
///
/// ```text
/// A => a <b> . c
/// ```
///
/// This indicates that the head is A, the expression is a <b> c, and the
/// cursor is just before the final c.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExprState<'a> {
  expr: Expr<'a>,

  /// Must be in the range [0, self.expr.len()].
  cursor: usize,
}

impl<'a> ExprState<'a> {
  /// Creates a state at the start of the given expression.
  pub fn from_start(expr: Expr<'a>) -> Self {
    ExprState { expr, cursor: 0 }
  }

  /// Creates a state at the given cursor. Panics if the cursor is past the
  /// end of the expression.
  pub fn at(expr: Expr<'a>, cursor: usize) -> Self {
    assert!(cursor <= expr.len());
    ExprState { expr, cursor }
  }

  pub fn expr(&self) -> Expr<'a> {
    self.expr
  }

  pub fn cursor(&self) -> usize {
    self.cursor
  }

  /// Returns the next term to be matched, or `None` if the state is
  /// complete.
  pub fn next_term(&self) -> Option<&'a Term> {
    self.expr.term_at(self.cursor)
  }

  /// Returns the term just before the cursor, or `None` at the start.
  pub fn prev_term(&self) -> Option<&'a Term> {
    self
      .cursor
      .checked_sub(1)
      .and_then(|i| self.expr.term_at(i))
  }

  /// Returns the next term together with the state after matching it. If
  /// the state is complete, returns `None`.
  pub fn next_term_state(&self) -> Option<(&'a Term, ExprState<'a>)> {
    self.next_term().map(|term| {
      (
        term,
        ExprState {
          expr: self.expr,
          cursor: self.cursor + 1,
        },
      )
    })
  }

  /// Returns the state with the cursor moved one term forward.
  pub fn advance(&self) -> Option<ExprState<'a>> {
    self.next_term_state().map(|(_, next)| next)
  }

  /// Returns the state with the cursor moved one term back.
  pub fn retreat(&self) -> Option<ExprState<'a>> {
    self.cursor.checked_sub(1).map(|cursor| ExprState {
      expr: self.expr,
      cursor,
    })
  }

  pub fn is_complete(&self) -> bool {
    self.expr.len() == self.cursor
  }
}

impl<'a> ToDoc for ExprState<'a> {
  fn to_doc<'b, DA: pretty::DocAllocator<'b>>(
    &self,
    da: &'b DA,
  ) -> pretty::DocBuilder<'b, DA>
  where
    DA::Doc: Clone,
  {
    let terms = self.expr.terms();
    let before = terms[..self.cursor].iter().map(|t| t.to_doc(da));
    let after = terms[self.cursor..].iter().map(|t| t.to_doc(da));
    self
      .expr
      .head()
      .to_doc(da)
      .append(da.text(" =>"))
      .append(da.space())
      .append(da.intersperse(
        before.chain(std::iter::once(da.text("."))).chain(after),
        da.space(),
      ))
  }
}

impl<'a> std::fmt::Debug for ExprState<'a> {
  fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
    let arena = pretty::Arena::new();
    write!(fmt, "{}", self.to_doc(&arena).into_doc().pretty(80))
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::grammar::examples;

  #[test]
  fn test_walk_expression() {
    let g = examples::make_balanced();
    let expr = g.get_rule("S").exprs().next().unwrap();
    let start = ExprState::from_start(expr);
    assert_eq!(start.next_term().unwrap().name(), "a");
    assert!(start.prev_term().is_none());
    assert!(start.retreat().is_none());

    let mid = start.advance().unwrap();
    assert!(mid.next_term().unwrap().is_nonterminal());
    assert_eq!(mid.prev_term().unwrap().name(), "a");
    assert_eq!(mid.retreat(), Some(start));

    let end = mid.advance().unwrap().advance().unwrap();
    assert!(end.is_complete());
    assert!(end.advance().is_none());
    assert_eq!(format!("{:?}", end), "S => \"a\" <S> \"b\" .");
  }

  #[test]
  fn test_empty_expression_is_complete() {
    let g = examples::make_balanced();
    let empty = g.get_rule("S").exprs().nth(1).unwrap();
    let state = ExprState::from_start(empty);
    assert!(state.is_complete());
    assert!(state.next_term().is_none());
    assert_eq!(format!("{:?}", state), "S => .");
  }
}
