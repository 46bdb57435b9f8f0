// Copyright 2020 Google LLC
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

//! Property tests over the example grammars.

use earley_forest::{grammar::examples, parse, Chart, Token};
use proptest::prelude::*;

fn to_tokens(names: &[&'static str]) -> Vec<Token<()>> {
  Token::from_names(names.iter().copied())
}

/// Any sequence of `a` and `b` tokens.
fn ab_strategy() -> impl Strategy<Value = Vec<&'static str>> {
  prop::collection::vec(prop_oneof![Just("a"), Just("b")], 0..12)
}

/// A prefix of some balanced string: `a^k b^j` with `j <= k`.
fn balanced_prefix_strategy() -> impl Strategy<Value = Vec<&'static str>> {
  (0usize..8)
    .prop_flat_map(|k| (Just(k), 0..=k))
    .prop_map(|(k, j)| {
      let mut names = vec!["a"; k];
      names.extend(vec!["b"; j]);
      names
    })
}

fn is_balanced(names: &[&str]) -> bool {
  let k = names.len() / 2;
  names.len() % 2 == 0
    && names[..k].iter().all(|n| *n == "a")
    && names[k..].iter().all(|n| *n == "b")
}

fn catalan(n: u64) -> u64 {
  (0..n).fold(1, |c, i| c * 2 * (2 * i + 1) / (i + 2))
}

proptest! {
  #[test]
  fn test_parse_is_deterministic(names in ab_strategy()) {
    let g = examples::make_balanced();
    let tokens = to_tokens(&names);

    let first = parse(&g, &tokens);
    let second = parse(&g, &tokens);
    prop_assert_eq!(first.is_accepted(), second.is_accepted());
    prop_assert_eq!(first.rejection(), second.rejection());
    prop_assert_eq!(
      first.forest().map(|f| f.count_derivations()),
      second.forest().map(|f| f.count_derivations())
    );
  }

  #[test]
  fn test_balanced_language(names in ab_strategy()) {
    let g = examples::make_balanced();
    let tokens = to_tokens(&names);
    let result = parse(&g, &tokens);

    prop_assert_eq!(result.is_accepted(), is_balanced(&names));
    if let Some(forest) = result.forest() {
      prop_assert_eq!(forest.count_derivations(), Some(1));
    }
  }

  #[test]
  fn test_rejects_at_unmatchable_token(prefix in balanced_prefix_strategy()) {
    let g = examples::make_balanced();
    let mut names = prefix.clone();
    names.push("c");
    names.push("a");
    let tokens = to_tokens(&names);

    let result = parse(&g, &tokens);
    let rejection = result.rejection().expect("a stray token is rejected");
    prop_assert_eq!(rejection.position(), prefix.len());
    prop_assert_eq!(rejection.found().map(|n| n.str()), Some("c"));
  }

  #[test]
  fn test_sum_derivations_are_catalan(operands in 1usize..8) {
    let g = examples::make_ambiguous_sum();
    let mut names = vec!["n"];
    for _ in 1..operands {
      names.push("+");
      names.push("n");
    }
    let tokens = to_tokens(&names);

    let result = parse(&g, &tokens);
    let forest = result.forest().expect("sums are accepted");
    prop_assert_eq!(
      forest.count_derivations(),
      Some(catalan(operands as u64 - 1))
    );
  }

  #[test]
  fn test_left_recursion_stays_bounded(repeats in 0usize..300) {
    let g = examples::make_left_recursive();
    let mut names = vec!["y"];
    names.extend(std::iter::repeat("x").take(repeats));
    let tokens = to_tokens(&names);

    let mut chart = Chart::new(&g, &tokens);
    chart.run();
    prop_assert!(chart.is_accepted());
    for pos in 0..=tokens.len() {
      let set = chart.state_set(pos).expect("every position is reached");
      prop_assert!(set.len() <= g.num_dotted_items());
    }
  }

  #[test]
  fn test_right_recursion_stays_bounded(repeats in 1usize..300) {
    let g = examples::make_right_recursive();
    let tokens = to_tokens(&vec!["a"; repeats]);

    let mut chart = Chart::new(&g, &tokens);
    chart.run();
    prop_assert!(chart.is_accepted());
    for pos in 0..=tokens.len() {
      let set = chart.state_set(pos).expect("every position is reached");
      prop_assert!(set.len() <= g.num_dotted_items());
    }

    let result = parse(&g, &tokens);
    let trees = result.into_trees(1).expect("right recursion is unambiguous");
    prop_assert_eq!(trees.len(), 1);
    prop_assert_eq!(trees[0].leaves().count(), repeats);
  }
}
