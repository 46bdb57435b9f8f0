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

//! An Earley parser for any grammar.
//!
//! The chart is built one position at a time. Each state set is closed under
//! prediction and completion before the states that can scan the next token
//! seed the following set. Nonterminals that derive the empty string are
//! completed in the set they were predicted in, so an item waiting on such a
//! nonterminal advances over it immediately.
//!
//! Right recursion uses Leo's transitive items: when a completion would only
//! cascade through states that have a single waiter each, just the state at
//! the top of the cascade is added. This keeps the chart linear for
//! unambiguous right-recursive grammars. The skipped states are recovered on
//! demand with `Chart::skipped_completions`.

pub mod state;

use {
  crate::{
    grammar::Grammar,
    parsers::{forest::Forest, ParseResult, Rejection},
    state::ExprState,
    tokens::{Token, TokenStream},
  },
  state::{EarleyStateKey, EarleyStateSet, LeoItem},
};

/// The chart of an in-progress or finished parse.
///
/// A chart borrows the grammar and the tokens, and owns everything else. It
/// can be dropped at any point, so a caller wanting a budget can drive it
/// with `step` and stop early.
pub struct Chart<'a, T> {
  grammar: &'a Grammar,
  tokens: TokenStream<'a, T>,
  sets: Vec<EarleyStateSet<'a>>,
  closed: usize,
}

impl<'a, T> Chart<'a, T> {
  /// Creates a chart seeded with the start symbol's expressions at position
  /// 0. Nothing is processed until `step` or `run` is called.
  pub fn new(
    grammar: &'a Grammar,
    tokens: impl Into<TokenStream<'a, T>>,
  ) -> Self {
    let mut start_set = EarleyStateSet::new();
    if let Some(rule) = grammar.start_rule() {
      for expr in rule.exprs() {
        start_set
          .insert(EarleyStateKey::new(ExprState::from_start(expr), 0), None);
      }
    }

    Chart {
      grammar,
      tokens: tokens.into(),
      sets: vec![start_set],
      closed: 0,
    }
  }

  pub fn grammar(&self) -> &'a Grammar {
    self.grammar
  }

  pub fn tokens(&self) -> TokenStream<'a, T> {
    self.tokens
  }

  /// Returns true once no further positions can be processed, either
  /// because the end of input was reached or because no state could scan
  /// the next token.
  pub fn is_finished(&self) -> bool {
    self.closed == self.sets.len()
  }

  /// Processes the next position. Returns true if there is more work to do.
  pub fn step(&mut self) -> bool {
    if self.is_finished() {
      return false;
    }

    let pos = self.closed;
    let next = self.close_set(pos);
    self.closed += 1;

    if let Some(next) = next {
      if !next.is_empty() {
        self.sets.push(next);
      }
    }

    !self.is_finished()
  }

  /// Processes positions until the chart is finished.
  pub fn run(&mut self) {
    while self.step() {}
  }

  /// Returns the state set at `pos`, if the chart reached it.
  pub fn state_set(&self, pos: usize) -> Option<&EarleyStateSet<'a>> {
    self.sets.get(pos)
  }

  pub(crate) fn sets(&self) -> &[EarleyStateSet<'a>] {
    &self.sets
  }

  /// The last position at which the chart has any states.
  pub fn furthest_position(&self) -> usize {
    self.sets.len() - 1
  }

  /// Returns true if the chart is finished and a complete expression of
  /// the start symbol spans the whole input.
  pub fn is_accepted(&self) -> bool {
    let start = match self.grammar.start_nt() {
      Some(start) => start,
      None => return false,
    };

    let end = self.tokens.len();
    if !self.is_finished() || self.sets.len() != end + 1 {
      return false;
    }

    !self.sets[end].completions_of(start, 0).is_empty()
      || self
        .skipped_completions(end)
        .iter()
        .any(|(key, _)| key.origin == 0 && key.state.expr().head() == start)
  }

  /// Returns the complete states at `pos` that were not added to the chart
  /// because a leo item completed the top of their chain directly. Each
  /// state comes with the position where its last term starts.
  pub fn skipped_completions(
    &self,
    pos: usize,
  ) -> Vec<(EarleyStateKey<'a>, usize)> {
    let mut skipped = Vec::new();
    let set = match self.sets.get(pos) {
      Some(set) => set,
      None => return skipped,
    };

    for (bottom_origin, bottom_head) in set.leo_bottoms() {
      let mut set_pos = bottom_origin;
      let mut head: &str = bottom_head;
      while let Some(leo) = self.sets[set_pos].leo_item(head) {
        let key = advanced_complete(leo.waiter)
          .expect("Leo waiters are complete once advanced.");
        if key == leo.top {
          break;
        }

        skipped.push((key, set_pos));
        head = key.state.expr().head();
        set_pos = key.origin;
      }
    }

    skipped
  }

  /// Describes why the parse failed. Returns `None` if the parse succeeded
  /// or the chart is not finished.
  pub fn rejection(&self) -> Option<Rejection> {
    if !self.is_finished() || self.is_accepted() {
      return None;
    }

    let position = self.furthest_position();
    Some(Rejection::new(
      position,
      self.tokens.name_at(position).cloned(),
      self.sets[position].expected_terminals(),
    ))
  }

  /// Closes the set at `pos` under prediction and completion, and returns
  /// the set seeded by scanning the token at `pos`, if there is one.
  fn close_set(&mut self, pos: usize) -> Option<EarleyStateSet<'a>> {
    let grammar = self.grammar;
    let token = self.tokens.get(pos);
    let mut next_set = token.map(|_| EarleyStateSet::new());

    let (prev_sets, rest) = self.sets.split_at_mut(pos);
    let curr_set = &mut rest[0];

    let mut i = 0;
    while i < curr_set.len() {
      let key = curr_set.get(i).key();

      match key.state.next_term() {
        None => complete(prev_sets, curr_set, pos, key),
        Some(term) if term.is_nonterminal() => {
          let nt = term.name();
          curr_set.add_waiting(nt, i);

          let rule = grammar.get_rule(nt);
          for expr in rule.exprs() {
            let predicted =
              EarleyStateKey::new(ExprState::from_start(expr), pos);
            if curr_set.insert(predicted, None).1.is_changed() {
              log::trace!("Predicted {:?} at {}.", predicted.state, pos);
            }
          }

          if curr_set.was_completed_here(nt) {
            advance_over(curr_set, key, pos, pos);
          }
        }
        Some(term) => {
          curr_set.add_scanning(term.name());

          if let (Some(token), Some(next_set)) = (token, next_set.as_mut()) {
            if token.name() == term.name() {
              if let Some(next_state) = key.state.advance() {
                let scanned = EarleyStateKey::new(next_state, key.origin);
                next_set.insert(scanned, Some(pos));
                log::trace!("Scanned {:?} at {}.", scanned.state, pos);
              }
            }
          }
        }
      }

      i += 1;
    }

    assert!(
      curr_set.len() <= grammar.num_dotted_items() * (pos + 1),
      "State set at {} grew past its bound: {} states.",
      pos,
      curr_set.len()
    );

    memoize_leo_items(prev_sets, curr_set, pos);
    next_set
  }
}

/// Returns the state `waiter` becomes after matching its next term, if that
/// state is complete.
fn advanced_complete(waiter: EarleyStateKey) -> Option<EarleyStateKey> {
  waiter
    .state
    .advance()
    .filter(|state| state.is_complete())
    .map(|state| EarleyStateKey::new(state, waiter.origin))
}

/// Records the leo items of the closed set at `pos`.
///
/// A leo item extends the one of its waiter's origin set only when that
/// chain's top started strictly before the waiter did, so the top never
/// coincides with a state in the middle of the chain.
fn memoize_leo_items<'a>(
  prev_sets: &[EarleyStateSet<'a>],
  curr_set: &mut EarleyStateSet<'a>,
  pos: usize,
) {
  let mut items = Vec::new();
  for (nt, waiter) in curr_set.single_waiters() {
    let advanced = match advanced_complete(waiter) {
      Some(advanced) => advanced,
      None => continue,
    };

    let above = prev_sets
      .get(waiter.origin)
      .and_then(|set| set.leo_item(advanced.state.expr().head()))
      .filter(|above| above.top.origin < waiter.origin);

    let item = match above {
      Some(above) => LeoItem {
        waiter,
        top: above.top,
        top_split: above.top_split,
      },
      None => LeoItem {
        waiter,
        top: advanced,
        top_split: pos,
      },
    };
    items.push((nt.clone(), item));
  }

  for (nt, item) in items {
    curr_set.add_leo_item(nt, item);
  }
}

/// Advances the states waiting on the head of the complete state `key`.
fn complete<'a>(
  prev_sets: &[EarleyStateSet<'a>],
  curr_set: &mut EarleyStateSet<'a>,
  pos: usize,
  key: EarleyStateKey<'a>,
) {
  let head = key.state.expr().head();
  log::trace!("Completed {:?} from {} at {}.", key.state, key.origin, pos);

  let waiters: Vec<EarleyStateKey<'a>> = if key.origin == pos {
    curr_set.add_completed_here(head);
    curr_set
      .waiting_on(head)
      .iter()
      .map(|idx| curr_set.get(*idx).key())
      .collect()
  } else {
    let origin_set = &prev_sets[key.origin];
    if let Some(leo) = origin_set.leo_item(head) {
      let (top, split) = (leo.top, leo.top_split);
      curr_set.add_leo_bottom(key.origin, head);
      if curr_set.insert(top, Some(split)).1.is_changed() {
        log::trace!("Completed {:?} through a leo item at {}.", top.state, pos);
      }
      return;
    }

    origin_set
      .waiting_on(head)
      .iter()
      .map(|idx| origin_set.get(*idx).key())
      .collect()
  };

  for waiter in waiters {
    advance_over(curr_set, waiter, key.origin, pos);
  }
}

/// Adds the state that follows `waiter` once its next nonterminal has
/// matched the tokens from `split` to `pos`.
fn advance_over<'a>(
  curr_set: &mut EarleyStateSet<'a>,
  waiter: EarleyStateKey<'a>,
  split: usize,
  pos: usize,
) {
  if let Some(next_state) = waiter.state.advance() {
    let advanced = EarleyStateKey::new(next_state, waiter.origin);
    if curr_set.insert(advanced, Some(split)).1.is_changed() {
      log::trace!("Advanced {:?} at {}.", advanced.state, pos);
    }
  }
}

/// Runs the recognizer to completion and returns the finished chart.
pub fn recognize<'a, T>(
  grammar: &'a Grammar,
  tokens: &'a [Token<T>],
) -> Chart<'a, T> {
  let mut chart = Chart::new(grammar, tokens);
  chart.run();
  chart
}

/// Parses `tokens` against `grammar`.
///
/// An accepted parse returns a forest holding every derivation of the input;
/// it borrows the grammar and the tokens. A rejected parse describes the
/// furthest position reached.
pub fn parse<'a, T>(
  grammar: &'a Grammar,
  tokens: &'a [Token<T>],
) -> ParseResult<'a, T> {
  log::debug!("Parsing {} tokens.", tokens.len());
  let chart = recognize(grammar, tokens);

  match Forest::from_chart(&chart) {
    Some(forest) => {
      log::debug!(
        "Accepted with {} symbol nodes and {} item nodes.",
        forest.num_symbols(),
        forest.num_items()
      );
      ParseResult::Accepted(forest)
    }
    None => {
      let rejection = chart
        .rejection()
        .expect("A chart without a forest is rejected.");
      log::debug!("Rejected: {}.", rejection);
      ParseResult::Rejected(rejection)
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::grammar::{examples, Expression, Grammar, Production, Term};
  use crate::utils::Name;

  fn tokens(names: &[&str]) -> Vec<Token<()>> {
    Token::from_names(names.iter().copied())
  }

  #[test]
  fn test_balanced() {
    let g = examples::make_balanced();
    let input = tokens(&["a", "a", "b", "b"]);
    let result = parse(&g, &input);
    assert!(result.is_accepted());
    assert_eq!(result.forest().unwrap().count_derivations(), Some(1));

    let input = tokens(&["a", "b", "b"]);
    assert!(!parse(&g, &input).is_accepted());
  }

  #[test]
  fn test_empty_input_needs_epsilon() {
    let g = examples::make_balanced();
    let input = tokens(&[]);
    assert!(parse(&g, &input).is_accepted());

    let g = examples::make_right_recursive();
    let result = parse(&g, &input);
    let rejection = result.rejection().unwrap();
    assert_eq!(rejection.position(), 0);
    assert_eq!(rejection.found(), None);
    assert!(rejection.expected().contains("a"));
  }

  #[test]
  fn test_shared_prefix_uses_longer_alternative() {
    let g = examples::make_shared_prefix();
    let input = tokens(&["x", "x"]);
    let result = parse(&g, &input);
    let forest = result.forest().unwrap();
    assert_eq!(forest.count_derivations(), Some(1));

    let trees = forest.trees(10).unwrap();
    assert_eq!(trees[0].to_outline(), "S\n`A\n``x\n``x\n");
  }

  #[test]
  fn test_undefined_nonterminal_never_parses() {
    let err = Grammar::from_productions(vec![Production::new(
      "A",
      vec![Expression::new(vec![Term::nonterminal("B")])],
    )])
    .unwrap_err();
    assert_eq!(
      err.to_string(),
      "nonterminal <B> used in a rule for <A> has no production"
    );
  }

  #[test]
  fn test_empty_grammar_rejects() {
    let g = Grammar::from_productions(vec![]).unwrap();
    let input = tokens(&["a"]);
    let rejection = parse(&g, &input).rejection().cloned().unwrap();
    assert_eq!(rejection.position(), 0);
    assert_eq!(rejection.found(), Some(&Name::new("a")));
    assert!(rejection.expected().is_empty());

    let input = tokens(&[]);
    assert!(!parse(&g, &input).is_accepted());
  }

  #[test]
  fn test_right_recursion_is_unambiguous() {
    let g = examples::make_right_recursive();
    let input = tokens(&["a", "a", "a"]);
    let result = parse(&g, &input);
    assert_eq!(result.forest().unwrap().count_derivations(), Some(1));
  }

  #[test]
  fn test_left_recursion() {
    let g = examples::make_left_recursive();
    let mut names = vec!["y"];
    names.extend(std::iter::repeat("x").take(200));
    let input = tokens(&names);

    let mut chart = Chart::new(&g, &input);
    chart.run();
    assert!(chart.is_accepted());
    for pos in 0..=input.len() {
      assert!(chart.state_set(pos).unwrap().len() <= g.num_dotted_items());
    }

    let result = parse(&g, &input);
    assert_eq!(result.forest().unwrap().count_derivations(), Some(1));
  }

  #[test]
  fn test_right_recursion_is_linear() {
    let g = examples::make_right_recursive();
    let input = tokens(&vec!["a"; 2000]);
    let mut chart = Chart::new(&g, &input);
    chart.run();
    assert!(chart.is_accepted());
    for pos in 0..=input.len() {
      assert!(chart.state_set(pos).unwrap().len() <= g.num_dotted_items());
    }

    // Only the outermost S is in the last set; the S items in between are
    // recovered from the leo items.
    let skipped = chart.skipped_completions(input.len());
    assert_eq!(skipped.len(), input.len() - 2);
    assert!(skipped.iter().all(|(key, split)| *split == key.origin + 1));
  }

  #[test]
  fn test_right_recursion_under_a_wrapper() {
    let g = crate::grammar::build("T", |gb| {
      gb.add_rule("T", |rb| {
        rb.add_expr(|eb| {
          eb.add_nonterm("S");
        });
      })
      .add_rule("S", |rb| {
        rb.add_expr(|eb| {
          eb.add_term("a").add_nonterm("S");
        })
        .add_expr(|eb| {
          eb.add_term("a");
        });
      });
    })
    .unwrap();

    let input = tokens(&["a", "a", "a"]);
    let trees = parse(&g, &input).into_trees(1).unwrap();
    assert_eq!(trees.len(), 1);
    assert_eq!(trees[0].to_outline(), "T\n`S\n``a\n``S\n```a\n```S\n````a\n");

    let input = tokens(&["a", "a", "b"]);
    assert_eq!(parse(&g, &input).rejection().unwrap().position(), 2);
  }

  #[test]
  fn test_nullable_right_recursion_is_cyclic() {
    // A -> N A | "x"; N -> ()
    let g = crate::grammar::build("A", |gb| {
      gb.add_rule("A", |rb| {
        rb.add_expr(|eb| {
          eb.add_nonterm("N").add_nonterm("A");
        })
        .add_expr(|eb| {
          eb.add_term("x");
        });
      })
      .add_rule("N", |rb| {
        rb.add_empty();
      });
    })
    .unwrap();

    let input = tokens(&["x"]);
    let result = parse(&g, &input);
    assert_eq!(result.forest().unwrap().count_derivations(), None);
  }

  #[test]
  fn test_hidden_epsilon() {
    let g = examples::make_hidden_epsilon();
    let input = tokens(&["y", "x", "x"]);
    let result = parse(&g, &input);
    assert_eq!(result.forest().unwrap().count_derivations(), Some(1));

    let input = tokens(&["y", "x", "y"]);
    assert!(!parse(&g, &input).is_accepted());
  }

  #[test]
  fn test_nullable_chain() {
    let g = examples::make_nullable_chain();
    let input = tokens(&["c"]);
    let result = parse(&g, &input);
    let trees = result.into_trees(4).unwrap();
    assert_eq!(trees.len(), 1);
    assert_eq!(trees[0].to_outline(), "S\n`A\n``B\n`B\n`c\n");
  }

  #[test]
  fn test_ambiguity_is_complete() {
    let g = examples::make_ambiguous_sum();
    let input = tokens(&["n", "+", "n", "+", "n"]);
    let result = parse(&g, &input);
    assert_eq!(result.forest().unwrap().count_derivations(), Some(2));
  }

  #[test]
  fn test_rejection_at_unextendable_token() {
    let g = examples::make_balanced();
    let input = tokens(&["a", "a", "b", "c", "b"]);
    let result = parse(&g, &input);
    let rejection = result.rejection().unwrap();
    assert_eq!(rejection.position(), 3);
    assert_eq!(rejection.found(), Some(&Name::new("c")));
    assert_eq!(
      rejection.expected().iter().map(Name::str).collect::<Vec<_>>(),
      vec!["b"]
    );
  }

  #[test]
  fn test_rejection_at_end_of_input() {
    let g = examples::make_balanced();
    let input = tokens(&["a", "a", "b"]);
    let rejection = parse(&g, &input).rejection().cloned().unwrap();
    assert_eq!(rejection.position(), 3);
    assert_eq!(rejection.found(), None);
    assert!(rejection.expected().contains("b"));
  }

  #[test]
  fn test_step_can_be_abandoned() {
    let g = examples::make_balanced();
    let input = tokens(&["a", "a", "b", "b"]);
    let mut chart = Chart::new(&g, &input);
    assert!(chart.step());
    assert!(chart.step());
    assert!(!chart.is_finished());
    assert!(!chart.is_accepted());
    assert_eq!(chart.furthest_position(), 2);
    drop(chart);

    let mut chart = Chart::new(&g, &input);
    let mut steps = 0;
    while chart.step() {
      steps += 1;
    }
    assert_eq!(steps, input.len());
    assert!(chart.is_accepted());
    assert!(chart.rejection().is_none());
  }

  #[test]
  fn test_optional_terms_parse_both_ways() {
    let g = examples::make_optional_block();
    for names in vec![
      vec!["N", "{", "}"],
      vec!["N", "{", "W", "}"],
      vec!["N", "{", "W", "W", "W", "}"],
    ] {
      let input = tokens(&names);
      assert!(parse(&g, &input).is_accepted(), "{:?}", names);
    }

    let input = tokens(&["N", "{", "W"]);
    assert!(!parse(&g, &input).is_accepted());
  }

  #[test]
  fn test_parse_is_deterministic() {
    let g = examples::make_ambiguous_sum();
    let input = tokens(&["n", "+", "n", "+", "n", "+", "n"]);
    let first = parse(&g, &input).into_trees(100).unwrap();
    let second = parse(&g, &input).into_trees(100).unwrap();
    assert_eq!(
      first.iter().map(|t| t.to_outline()).collect::<Vec<_>>(),
      second.iter().map(|t| t.to_outline()).collect::<Vec<_>>()
    );
  }
}
