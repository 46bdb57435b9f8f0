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

use crate::utils::Name;

/// Errors found while constructing a `Grammar`. Any of these means no parse
/// can be run against the grammar.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum GrammarError {
  #[error("nonterminal <{name}> used in a rule for <{lhs}> has no production")]
  UndefinedNonterminal { name: Name, lhs: Name },

  #[error("start symbol <{name}> has no production")]
  UndefinedStartSymbol { name: Name },

  #[error("terminal \"{name}\" is also used as the lhs of a production")]
  TerminalUsedAsLhs { name: Name },

  #[error(
    "an expression for <{lhs}> has {count} optional terms, more than the {max} allowed"
  )]
  TooManyOptionalTerms { lhs: Name, count: usize, max: usize },
}
