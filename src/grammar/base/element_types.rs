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

//! The plain input shapes a caller uses to describe a grammar.
//!
//! These carry no validation. They become a `Grammar` through
//! `Grammar::new` or `Grammar::from_productions`.

use std::iter::FromIterator;

use crate::utils::{fmt::list_fmt, BuilderInto, Name, ToDoc};

/// A single symbol inside an expression.
///
/// A terminal term is matched against a token with the same name. A
/// nonterminal term is matched by deriving one of the alternatives of the
/// rule with that name.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Term {
  name: Name,
  is_terminal: bool,
  is_optional: bool,
}

impl Term {
  pub fn new(name: impl BuilderInto<Name>, is_terminal: bool) -> Self {
    Term {
      name: name.builder_into(),
      is_terminal,
      is_optional: false,
    }
  }

  pub fn terminal(name: impl BuilderInto<Name>) -> Self {
    Term::new(name, true)
  }

  pub fn nonterminal(name: impl BuilderInto<Name>) -> Self {
    Term::new(name, false)
  }

  /// Marks this term as optional. An optional term may be absent from a
  /// derivation without leaving a trace in the resulting tree.
  pub fn optional(mut self) -> Self {
    self.is_optional = true;
    self
  }

  pub(crate) fn required(mut self) -> Self {
    self.is_optional = false;
    self
  }

  pub fn name(&self) -> &Name {
    &self.name
  }

  pub fn is_terminal(&self) -> bool {
    self.is_terminal
  }

  pub fn is_nonterminal(&self) -> bool {
    !self.is_terminal
  }

  pub fn is_optional(&self) -> bool {
    self.is_optional
  }

  /// Returns the name of this term if it is a terminal.
  pub fn as_terminal(&self) -> Option<&Name> {
    if self.is_terminal {
      Some(&self.name)
    } else {
      None
    }
  }

  /// Returns the name of this term if it is a nonterminal.
  pub fn as_nonterminal(&self) -> Option<&Name> {
    if self.is_terminal {
      None
    } else {
      Some(&self.name)
    }
  }
}

impl ToDoc for Term {
  fn to_doc<'a, DA: pretty::DocAllocator<'a>>(
    &self,
    da: &'a DA,
  ) -> pretty::DocBuilder<'a, DA>
  where
    DA::Doc: Clone,
  {
    let body = if self.is_terminal {
      da.text(format!("{:?}", self.name.str()))
    } else {
      da.text("<").append(self.name.to_doc(da)).append(da.text(">"))
    };

    if self.is_optional {
      body.append(da.text("?"))
    } else {
      body
    }
  }
}

impl std::fmt::Debug for Term {
  fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
    if self.is_terminal {
      write!(fmt, "{:?}", self.name.str())?;
    } else {
      write!(fmt, "<{}>", self.name)?;
    }
    if self.is_optional {
      fmt.write_str("?")?;
    }
    Ok(())
  }
}

/// An ordered sequence of terms. The empty expression is the epsilon
/// alternative.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Expression {
  terms: Vec<Term>,
}

impl Expression {
  pub fn new(terms: Vec<Term>) -> Self {
    Expression { terms }
  }

  pub fn empty() -> Self {
    Expression { terms: Vec::new() }
  }

  pub fn terms(&self) -> &[Term] {
    &self.terms
  }

  pub fn len(&self) -> usize {
    self.terms.len()
  }

  pub fn is_empty(&self) -> bool {
    self.terms.is_empty()
  }
}

impl FromIterator<Term> for Expression {
  fn from_iter<I: IntoIterator<Item = Term>>(iter: I) -> Self {
    Expression::new(iter.into_iter().collect())
  }
}

impl std::fmt::Debug for Expression {
  fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
    std::fmt::Debug::fmt(&list_fmt(&self.terms), fmt)
  }
}

/// A left-hand-side nonterminal with its alternative expressions.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Production {
  lhs: Name,
  rhs: Vec<Expression>,
}

impl Production {
  pub fn new(lhs: impl BuilderInto<Name>, rhs: Vec<Expression>) -> Self {
    Production {
      lhs: lhs.builder_into(),
      rhs,
    }
  }

  pub fn lhs(&self) -> &Name {
    &self.lhs
  }

  pub fn rhs(&self) -> &[Expression] {
    &self.rhs
  }
}
