// Copyright 2019 Google LLC
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

use super::{Expression, Grammar, Production, Term};
use crate::grammar::GrammarError;
use crate::utils::{BuilderInto, Name};

pub struct ExpressionBuilder {
  terms: Vec<Term>,
}

impl ExpressionBuilder {
  fn new() -> Self {
    ExpressionBuilder { terms: Vec::new() }
  }

  fn build(self) -> Expression {
    let ExpressionBuilder { terms } = self;
    Expression::new(terms)
  }

  pub fn add_term(&mut self, term: impl BuilderInto<Name>) -> &mut Self {
    self.terms.push(Term::terminal(term));
    self
  }

  pub fn add_nonterm(&mut self, nonterm: impl BuilderInto<Name>) -> &mut Self {
    self.terms.push(Term::nonterminal(nonterm));
    self
  }

  pub fn add_optional_term(
    &mut self,
    term: impl BuilderInto<Name>,
  ) -> &mut Self {
    self.terms.push(Term::terminal(term).optional());
    self
  }

  pub fn add_optional_nonterm(
    &mut self,
    nonterm: impl BuilderInto<Name>,
  ) -> &mut Self {
    self.terms.push(Term::nonterminal(nonterm).optional());
    self
  }
}

// ----------------

pub struct RuleBuilder {
  head: Name,
  exprs: Vec<Expression>,
}

impl RuleBuilder {
  fn new(head: Name) -> Self {
    RuleBuilder {
      head,
      exprs: Vec::new(),
    }
  }

  fn build(self) -> Production {
    let RuleBuilder { head, exprs } = self;
    Production::new(head, exprs)
  }

  pub fn add_expr(
    &mut self,
    build_fn: impl FnOnce(&mut ExpressionBuilder),
  ) -> &mut Self {
    let mut builder = ExpressionBuilder::new();
    build_fn(&mut builder);
    self.exprs.push(builder.build());
    self
  }

  pub fn add_expr_with_terms(
    &mut self,
    terms: impl BuilderInto<Vec<Term>>,
  ) -> &mut Self {
    self.exprs.push(Expression::new(terms.builder_into()));
    self
  }

  /// Adds an epsilon alternative.
  pub fn add_empty(&mut self) -> &mut Self {
    self.exprs.push(Expression::empty());
    self
  }
}

// ----------------

pub struct GrammarBuilder {
  start: Name,
  rules: Vec<Production>,
}

impl GrammarBuilder {
  fn new(start: Name) -> Self {
    GrammarBuilder {
      start,
      rules: Vec::new(),
    }
  }

  fn build(self) -> Result<Grammar, GrammarError> {
    let GrammarBuilder { start, rules } = self;
    Grammar::new(start, rules)
  }

  pub fn add_rule<F>(
    &mut self,
    head: impl BuilderInto<Name>,
    build_fn: F,
  ) -> &mut Self
  where
    F: FnOnce(&mut RuleBuilder),
  {
    let mut rule_builder = RuleBuilder::new(head.builder_into());
    build_fn(&mut rule_builder);
    self.rules.push(rule_builder.build());
    self
  }
}

/// Builds a grammar using a builder function.
///
/// Example:
///
/// ```rust
/// let g = earley_forest::grammar::build("S", |gb| {
///   gb.add_rule("S", |rb| {
///     rb.add_expr(|eb| {
///       eb.add_term("a").add_nonterm("S").add_term("b");
///     })
///     .add_empty();
///   });
/// })
/// .unwrap();
/// assert_eq!(g.get_rule("S").exprs().count(), 2);
/// ```
///
/// Arguments that take a `Name` can take a `&str`, a `String`, a `Name`, or
/// a reference to a `Name`.
pub fn build(
  start: impl BuilderInto<Name>,
  build_fn: impl FnOnce(&mut GrammarBuilder),
) -> Result<Grammar, GrammarError> {
  let mut builder = GrammarBuilder::new(start.builder_into());
  build_fn(&mut builder);
  builder.build()
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_builder_matches_productions() {
    let built = build("S", |gb| {
      gb.add_rule("S", |rb| {
        rb.add_expr(|eb| {
          eb.add_nonterm("A").add_term("x");
        })
        .add_empty();
      })
      .add_rule("A", |rb| {
        rb.add_expr_with_terms(vec![Term::terminal("y")]);
      });
    })
    .unwrap();

    let expected = Grammar::new(
      "S",
      vec![
        Production::new(
          "S",
          vec![
            Expression::new(vec![Term::nonterminal("A"), Term::terminal("x")]),
            Expression::empty(),
          ],
        ),
        Production::new("A", vec![Expression::new(vec![Term::terminal("y")])]),
      ],
    )
    .unwrap();

    assert_eq!(built.to_pretty(), expected.to_pretty());
  }

  #[test]
  fn test_builder_optional_terms() {
    let g = build("S", |gb| {
      gb.add_rule("S", |rb| {
        rb.add_expr(|eb| {
          eb.add_term("a").add_optional_term("b");
        });
      });
    })
    .unwrap();
    assert_eq!(g.get_rule("S").exprs().count(), 2);
  }

  #[test]
  fn test_builder_reports_errors() {
    let err = build("S", |gb| {
      gb.add_rule("S", |rb| {
        rb.add_expr(|eb| {
          eb.add_nonterm("Nope");
        });
      });
    })
    .unwrap_err();
    assert!(matches!(err, GrammarError::UndefinedNonterminal { .. }));
  }
}
