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

//! Expansion of optional terms into plain alternatives.
//!
//! An expression `"N" "{" <block>? "}"` becomes the two expressions
//! `"N" "{" <block> "}"` and `"N" "{" "}"`. Every combination of present and
//! absent optional terms becomes its own expression, so the chart never has
//! to know about optionality.

use super::{GrammarError, Term};
use crate::utils::Name;

/// The largest number of optional terms a single expression may carry.
pub const MAX_OPTIONAL_TERMS: usize = 16;

/// Returns every variant of `terms` with the optional terms either present
/// or absent. The first variant has all of them present. An expression
/// without optional terms yields itself.
pub fn expand_optionals(
  lhs: &Name,
  terms: &[Term],
) -> Result<Vec<Vec<Term>>, GrammarError> {
  let count = terms.iter().filter(|t| t.is_optional()).count();
  if count > MAX_OPTIONAL_TERMS {
    return Err(GrammarError::TooManyOptionalTerms {
      lhs: lhs.clone(),
      count,
      max: MAX_OPTIONAL_TERMS,
    });
  }

  let mut variants = vec![Vec::with_capacity(terms.len())];
  for term in terms {
    if term.is_optional() {
      let mut absent = variants.clone();
      for variant in &mut variants {
        variant.push(term.clone().required());
      }
      variants.append(&mut absent);
    } else {
      for variant in &mut variants {
        variant.push(term.clone());
      }
    }
  }

  Ok(variants)
}
