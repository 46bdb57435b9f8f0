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

use std::collections::BTreeSet;

use crate::utils::{fmt::set_fmt, Name};

pub mod earley;
pub mod forest;
pub mod tree;

use forest::Forest;
use tree::Tree;

/// Errors from operations on a completed parse.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
  #[error(
    "input has {} derivations, more than the limit of {limit}",
    count_text(.count)
  )]
  AmbiguityLimitExceeded { limit: usize, count: Option<u64> },
}

fn count_text(count: &Option<u64>) -> String {
  match count {
    Some(n) => n.to_string(),
    None => "unboundedly many".to_string(),
  }
}

/// Where and why a parse failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rejection {
  position: usize,
  found: Option<Name>,
  expected: BTreeSet<Name>,
}

impl Rejection {
  pub fn new(
    position: usize,
    found: Option<Name>,
    expected: BTreeSet<Name>,
  ) -> Self {
    Rejection {
      position,
      found,
      expected,
    }
  }

  /// The furthest position any state reached. A token at this position, if
  /// there is one, could not be matched.
  pub fn position(&self) -> usize {
    self.position
  }

  /// The name of the token at `position()`, or `None` at the end of input.
  pub fn found(&self) -> Option<&Name> {
    self.found.as_ref()
  }

  /// The terminals that some state could have scanned at `position()`.
  pub fn expected(&self) -> &BTreeSet<Name> {
    &self.expected
  }
}

impl std::fmt::Display for Rejection {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    match &self.found {
      Some(name) => write!(f, "unexpected \"{}\" at {}", name, self.position)?,
      None => write!(f, "unexpected end of input at {}", self.position)?,
    }
    if !self.expected.is_empty() {
      write!(f, ", expected one of {:?}", set_fmt(&self.expected))?;
    }
    Ok(())
  }
}

/// The outcome of a parse.
#[derive(Derivative)]
#[derivative(Debug(bound = "T: std::fmt::Debug"))]
pub enum ParseResult<'a, T> {
  /// The whole input derives from the start symbol. The forest holds every
  /// derivation.
  Accepted(Forest<'a, T>),
  Rejected(Rejection),
}

impl<'a, T> ParseResult<'a, T> {
  pub fn is_accepted(&self) -> bool {
    matches!(self, ParseResult::Accepted(_))
  }

  pub fn forest(&self) -> Option<&Forest<'a, T>> {
    match self {
      ParseResult::Accepted(forest) => Some(forest),
      ParseResult::Rejected(_) => None,
    }
  }

  pub fn rejection(&self) -> Option<&Rejection> {
    match self {
      ParseResult::Accepted(_) => None,
      ParseResult::Rejected(rejection) => Some(rejection),
    }
  }

  /// Enumerates every derivation tree, failing if there are more than
  /// `limit` of them. A rejected parse has no trees.
  pub fn into_trees(
    self,
    limit: usize,
  ) -> Result<Vec<Tree<'a, T>>, ParseError> {
    match self {
      ParseResult::Accepted(forest) => forest.trees(limit),
      ParseResult::Rejected(_) => Ok(Vec::new()),
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_rejection_display() {
    let rejection = Rejection::new(
      2,
      Some(Name::new("c")),
      vec![Name::new("a"), Name::new("b")].into_iter().collect(),
    );
    assert_eq!(
      rejection.to_string(),
      "unexpected \"c\" at 2, expected one of {a, b}"
    );

    let at_end = Rejection::new(0, None, BTreeSet::new());
    assert_eq!(at_end.to_string(), "unexpected end of input at 0");
  }

  #[test]
  fn test_ambiguity_error_display() {
    let err = ParseError::AmbiguityLimitExceeded {
      limit: 2,
      count: Some(5),
    };
    assert_eq!(
      err.to_string(),
      "input has 5 derivations, more than the limit of 2"
    );

    let err = ParseError::AmbiguityLimitExceeded {
      limit: 2,
      count: None,
    };
    assert!(err.to_string().contains("unboundedly many"));
  }
}
