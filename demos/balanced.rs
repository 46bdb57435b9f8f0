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
use earley_forest::{parse, ParseResult, Token};

fn main() -> anyhow::Result<()> {
  let g = build("a", |gb| {
    gb.add_rule("a", |rb| {
      rb.add_expr(|eb| {
        eb.add_term("VALUE");
      })
      .add_expr(|eb| {
        eb.add_term("LPAREN").add_nonterm("a").add_term("RPAREN");
      });
    });
  })?;

  eprintln!("Grammar: {}", g.to_pretty());

  let tokens = vec![
    Token::new("LPAREN", "("),
    Token::new("VALUE", "Hello!"),
    Token::new("RPAREN", ")"),
  ];

  match parse(&g, &tokens) {
    ParseResult::Accepted(forest) => {
      println!("{}", forest.to_dot());
      for tree in forest.trees(1)? {
        eprint!("{}", tree);
        let text: Vec<_> = tree.leaves().map(|t| *t.payload()).collect();
        eprintln!("Payloads: {}", text.join(" "));
      }
    }
    ParseResult::Rejected(rejection) => {
      anyhow::bail!("Input rejected: {}", rejection);
    }
  }

  Ok(())
}
