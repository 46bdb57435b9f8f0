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

//! Input tokens and a borrowed, position-indexed view over them.

use crate::utils::{BuilderInto, Name};

/// A single input token: a name matched against terminal terms, and a
/// payload the parser carries through to its results without inspecting.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Token<T> {
  name: Name,
  payload: T,
}

impl<T> Token<T> {
  pub fn new(name: impl BuilderInto<Name>, payload: T) -> Self {
    Token {
      name: name.builder_into(),
      payload,
    }
  }

  pub fn name(&self) -> &Name {
    &self.name
  }

  pub fn payload(&self) -> &T {
    &self.payload
  }
}

impl Token<()> {
  /// Creates a token list with no payloads from a sequence of names.
  pub fn from_names<'b>(
    names: impl IntoIterator<Item = &'b str>,
  ) -> Vec<Token<()>> {
    names.into_iter().map(|n| Token::new(n, ())).collect()
  }
}

/// A borrowed view over the caller's tokens.
///
/// Positions run from `0` to `len()`. Position `len()` is the end of input:
/// there is no token there.
#[derive(Derivative)]
#[derivative(
  Clone(bound = ""),
  Copy(bound = ""),
  Debug(bound = "T: std::fmt::Debug")
)]
pub struct TokenStream<'a, T> {
  tokens: &'a [Token<T>],
}

impl<'a, T> TokenStream<'a, T> {
  pub fn new(tokens: &'a [Token<T>]) -> Self {
    TokenStream { tokens }
  }

  pub fn len(&self) -> usize {
    self.tokens.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tokens.is_empty()
  }

  /// Returns the token at `pos`, or `None` at or past the end of input.
  pub fn get(&self, pos: usize) -> Option<&'a Token<T>> {
    self.tokens.get(pos)
  }

  /// Returns the name of the token at `pos`.
  pub fn name_at(&self, pos: usize) -> Option<&'a Name> {
    self.get(pos).map(Token::name)
  }

  pub fn is_end(&self, pos: usize) -> bool {
    pos >= self.tokens.len()
  }

  /// Returns every position holding a token with the given name.
  pub fn positions_of<'b>(
    &'b self,
    name: &'b str,
  ) -> impl Iterator<Item = usize> + 'b {
    self
      .tokens
      .iter()
      .enumerate()
      .filter(move |(_, t)| t.name() == name)
      .map(|(i, _)| i)
  }
}

impl<'a, T> From<&'a [Token<T>]> for TokenStream<'a, T> {
  fn from(tokens: &'a [Token<T>]) -> Self {
    TokenStream::new(tokens)
  }
}

impl<'a, T> From<&'a Vec<Token<T>>> for TokenStream<'a, T> {
  fn from(tokens: &'a Vec<Token<T>>) -> Self {
    TokenStream::new(tokens)
  }
}
