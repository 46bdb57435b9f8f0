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

//! A general context-free parser.
//!
//! Grammars may be left or right recursive, ambiguous, and may contain empty
//! alternatives. Parsing builds an Earley chart over the input tokens, and an
//! accepted input yields a shared forest of every derivation. Trees can be
//! enumerated from the forest up to a caller-chosen limit.
//!
//! ```rust
//! use earley_forest::{grammar, parse, Token};
//!
//! let g = grammar::build("S", |gb| {
//!   gb.add_rule("S", |rb| {
//!     rb.add_expr(|eb| {
//!       eb.add_term("a").add_nonterm("S").add_term("b");
//!     })
//!     .add_empty();
//!   });
//! })
//! .unwrap();
//!
//! let tokens = Token::from_names(vec!["a", "a", "b", "b"]);
//! let result = parse(&g, &tokens);
//! assert!(result.is_accepted());
//! let trees = result.into_trees(1).unwrap();
//! assert_eq!(trees[0].to_outline(), "S\n`a\n`S\n``a\n``S\n``b\n`b\n");
//! ```

#[macro_use]
extern crate derivative;

pub mod grammar;
pub mod parsers;
pub mod state;
pub mod tokens;
pub mod utils;

pub use grammar::{Grammar, GrammarError};
pub use parsers::{
  earley::{parse, recognize, Chart},
  forest::Forest,
  tree::Tree,
  ParseError, ParseResult, Rejection,
};
pub use tokens::{Token, TokenStream};
pub use utils::Name;
