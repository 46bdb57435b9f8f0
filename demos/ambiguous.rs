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

use earley_forest::grammar::build;
use earley_forest::{parse, ParseError, Token};

fn main() -> anyhow::Result<()> {
  let g = build("E", |gb| {
    gb.add_rule("E", |rb| {
      rb.add_expr(|eb| {
        eb.add_nonterm("E").add_term("+").add_nonterm("E");
      })
      .add_expr(|eb| {
        eb.add_term("n");
      });
    });
  })?;

  let tokens = Token::from_names(vec!["n", "+", "n", "+", "n", "+", "n"]);
  let result = parse(&g, &tokens);
  let forest = result
    .forest()
    .ok_or_else(|| anyhow::anyhow!("Input rejected."))?;

  eprintln!(
    "Forest: {} symbol nodes, {} item nodes, {:?} derivations.",
    forest.num_symbols(),
    forest.num_items(),
    forest.count_derivations()
  );

  match forest.trees(2) {
    Err(ParseError::AmbiguityLimitExceeded { limit, count }) => {
      eprintln!("More than {} trees ({:?}), raising the limit.", limit, count);
    }
    Ok(_) => unreachable!("four operands have five derivations"),
  }

  for tree in forest.trees(10)? {
    println!("{}", tree);
  }

  Ok(())
}
