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

//! Provides base data structures to represent and work with Earley states.
//!
//! An Earley state set consists of a set of expression states, each tagged
//! with the position it started at.

use {
  crate::{
    state::ExprState,
    utils::{fmt::set_fmt, Name, WasChanged},
  },
  std::collections::{btree_map, BTreeMap, BTreeSet},
};

/// The identity of a chart state: the dotted item and its origin.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct EarleyStateKey<'a> {
  pub state: ExprState<'a>,
  pub origin: usize,
}

impl<'a> EarleyStateKey<'a> {
  pub fn new(state: ExprState<'a>, origin: usize) -> Self {
    EarleyStateKey { state, origin }
  }
}

/// A chart state: a key and the derivation links that justify it.
///
/// A link is the position where the term just before the cursor started
/// matching. For a state at position `k` with a link `j`, the term before the
/// cursor spans `j..k`, and the state with the cursor one term back spans
/// `origin..j`. States with the cursor at the start have no links.
#[derive(Clone)]
pub struct EarleyState<'a> {
  key: EarleyStateKey<'a>,
  links: BTreeSet<usize>,
}

impl<'a> EarleyState<'a> {
  pub fn key(&self) -> EarleyStateKey<'a> {
    self.key
  }

  pub fn state(&self) -> ExprState<'a> {
    self.key.state
  }

  pub fn origin(&self) -> usize {
    self.key.origin
  }

  pub fn links(&self) -> &BTreeSet<usize> {
    &self.links
  }

  pub fn is_complete(&self) -> bool {
    self.key.state.is_complete()
  }
}

impl<'a> std::fmt::Debug for EarleyState<'a> {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    let mut st = f.debug_struct("EarleyState");
    st.field("state", &self.key.state);
    st.field("origin", &self.key.origin);
    st.field("links", &self.links);
    st.finish()
  }
}

/// A shortcut over a chain of completions (Leo's transitive item).
///
/// Stored in the set at position `j` for a nonterminal `B` when exactly one
/// state in that set waits on `B`, and that state is complete once it
/// advances over `B`. Completing `B` from `j` then completes the waiter, and
/// possibly the waiter of its head further down, and so on. Only the `top`
/// of the chain is added to the chart; the states in between are recovered
/// from the `waiter` links when a forest is built.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct LeoItem<'a> {
  /// The only state waiting on the nonterminal.
  pub waiter: EarleyStateKey<'a>,
  /// The complete state at the top of the chain.
  pub top: EarleyStateKey<'a>,
  /// Where the last term of `top` starts.
  pub top_split: usize,
}

/// The states of the chart at one position.
///
/// States are kept in insertion order, which doubles as the worklist order
/// when the set is closed. Besides the key index, the set keeps:
///
/// - `waiting`: states whose next term is a given nonterminal.
/// - `scanning`: terminals some state can scan next.
/// - `completions`: complete states by head and origin.
/// - `completed_here`: heads completed with an origin at this position,
///   i.e. nonterminals that derived the empty string here.
/// - `leo_items`: once the set is closed, the deterministic completion
///   chains that start at this position.
/// - `leo_bottoms`: completions into this set that were resolved through
///   another set's `leo_items`, as `(origin, head)`.
#[derive(Clone, Default)]
pub struct EarleyStateSet<'a> {
  states: Vec<EarleyState<'a>>,
  index: BTreeMap<EarleyStateKey<'a>, usize>,
  waiting: BTreeMap<Name, Vec<usize>>,
  scanning: BTreeSet<Name>,
  completions: BTreeMap<Name, BTreeMap<usize, Vec<usize>>>,
  completed_here: BTreeSet<Name>,
  leo_items: BTreeMap<Name, LeoItem<'a>>,
  leo_bottoms: BTreeSet<(usize, Name)>,
}

impl<'a> EarleyStateSet<'a> {
  pub fn new() -> Self {
    EarleyStateSet::default()
  }

  pub fn len(&self) -> usize {
    self.states.len()
  }

  pub fn is_empty(&self) -> bool {
    self.states.is_empty()
  }

  pub fn get(&self, idx: usize) -> &EarleyState<'a> {
    &self.states[idx]
  }

  pub fn states(&self) -> impl Iterator<Item = &EarleyState<'a>> {
    self.states.iter()
  }

  pub fn find(&self, key: &EarleyStateKey<'a>) -> Option<&EarleyState<'a>> {
    self.index.get(key).map(|idx| &self.states[*idx])
  }

  /// Adds a state to the set, or adds the link to the state already there.
  ///
  /// Returns the index of the state, and whether a new state was created.
  pub fn insert(
    &mut self,
    key: EarleyStateKey<'a>,
    link: Option<usize>,
  ) -> (usize, WasChanged) {
    match self.index.entry(key) {
      btree_map::Entry::Occupied(occ) => {
        let idx = *occ.get();
        if let Some(link) = link {
          self.states[idx].links.insert(link);
        }
        (idx, WasChanged::Unchanged)
      }
      btree_map::Entry::Vacant(vac) => {
        let idx = self.states.len();
        vac.insert(idx);
        self.states.push(EarleyState {
          key,
          links: link.into_iter().collect(),
        });

        if key.state.is_complete() {
          self
            .completions
            .entry(key.state.expr().head().clone())
            .or_insert_with(BTreeMap::new)
            .entry(key.origin)
            .or_insert_with(Vec::new)
            .push(idx);
        }

        (idx, WasChanged::Changed)
      }
    }
  }

  /// Records that the state at `idx` waits on the nonterminal `nt`.
  pub fn add_waiting(&mut self, nt: &Name, idx: usize) {
    self
      .waiting
      .entry(nt.clone())
      .or_insert_with(Vec::new)
      .push(idx);
  }

  /// Records that some state can scan the terminal `term`.
  pub fn add_scanning(&mut self, term: &Name) {
    if !self.scanning.contains(term) {
      self.scanning.insert(term.clone());
    }
  }

  /// Records that `nt` was completed with its origin at this set's position.
  pub fn add_completed_here(&mut self, nt: &Name) -> WasChanged {
    WasChanged::from_changed(self.completed_here.insert(nt.clone()))
  }

  pub fn waiting_on(&self, nt: &str) -> &[usize] {
    self.waiting.get(nt).map(Vec::as_slice).unwrap_or(&[])
  }

  pub fn was_completed_here(&self, nt: &str) -> bool {
    self.completed_here.contains(nt)
  }

  /// Returns the complete states for `nt` that started at `origin`.
  pub fn completions_of(&self, nt: &str, origin: usize) -> &[usize] {
    self
      .completions
      .get(nt)
      .and_then(|by_origin| by_origin.get(&origin))
      .map(Vec::as_slice)
      .unwrap_or(&[])
  }

  /// Returns the terminals some state in this set could scan next.
  pub fn expected_terminals(&self) -> BTreeSet<Name> {
    self.scanning.clone()
  }

  /// Returns the nonterminals exactly one state waits on, with that state.
  pub fn single_waiters(
    &self,
  ) -> impl Iterator<Item = (&Name, EarleyStateKey<'a>)> + '_ {
    self.waiting.iter().filter_map(move |(nt, idxs)| match idxs.as_slice() {
      [idx] => Some((nt, self.states[*idx].key)),
      _ => None,
    })
  }

  pub fn add_leo_item(&mut self, nt: Name, item: LeoItem<'a>) {
    self.leo_items.insert(nt, item);
  }

  pub fn leo_item(&self, nt: &str) -> Option<&LeoItem<'a>> {
    self.leo_items.get(nt)
  }

  /// Records that a completion of `nt` from `origin` was resolved through
  /// the leo item of the set at `origin`.
  pub fn add_leo_bottom(&mut self, origin: usize, nt: &Name) {
    self.leo_bottoms.insert((origin, nt.clone()));
  }

  pub fn leo_bottoms(&self) -> impl Iterator<Item = (usize, &Name)> {
    self.leo_bottoms.iter().map(|(origin, nt)| (*origin, nt))
  }
}

impl<'a> std::fmt::Debug for EarleyStateSet<'a> {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    std::fmt::Debug::fmt(&set_fmt(&self.states), f)
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::grammar::examples;

  #[test]
  fn test_insert_dedups_and_merges_links() {
    let g = examples::make_ambiguous_sum();
    let expr = g.get_rule("E").exprs().next().unwrap();
    let key = EarleyStateKey::new(ExprState::at(expr, 2), 0);

    let mut set = EarleyStateSet::new();
    let (idx, changed) = set.insert(key, Some(1));
    assert!(changed.is_changed());
    let (idx2, changed) = set.insert(key, Some(3));
    assert!(!changed.is_changed());
    assert_eq!(idx, idx2);
    assert_eq!(set.len(), 1);
    assert_eq!(
      set.get(idx).links().iter().copied().collect::<Vec<_>>(),
      vec![1, 3]
    );
  }

  #[test]
  fn test_completions_are_indexed() {
    let g = examples::make_ambiguous_sum();
    let num = g.get_rule("E").exprs().nth(1).unwrap();
    let mut set = EarleyStateSet::new();
    set.insert(EarleyStateKey::new(ExprState::from_start(num), 2), None);
    assert!(set.completions_of("E", 2).is_empty());

    let (idx, _) =
      set.insert(EarleyStateKey::new(ExprState::at(num, 1), 2), Some(2));
    assert_eq!(set.completions_of("E", 2), &[idx]);
    assert!(set.completions_of("E", 0).is_empty());
  }

  #[test]
  fn test_single_waiters() {
    let g = examples::make_ambiguous_sum();
    let mut exprs = g.get_rule("E").exprs();
    let sum = exprs.next().unwrap();
    let num = exprs.next().unwrap();

    let mut set = EarleyStateSet::new();
    let (lone, _) =
      set.insert(EarleyStateKey::new(ExprState::at(sum, 2), 0), Some(1));
    set.add_waiting(&Name::new("E"), lone);
    set.insert(EarleyStateKey::new(ExprState::from_start(num), 2), None);
    set.add_scanning(&Name::new("n"));
    set.add_scanning(&Name::new("n"));

    let waiters = set.single_waiters().collect::<Vec<_>>();
    assert_eq!(waiters.len(), 1);
    assert_eq!(waiters[0].0, "E");
    assert_eq!(waiters[0].1, set.get(lone).key());
    assert_eq!(
      set.expected_terminals().into_iter().collect::<Vec<_>>(),
      vec![Name::new("n")]
    );

    let (predicted, _) =
      set.insert(EarleyStateKey::new(ExprState::from_start(sum), 2), None);
    set.add_waiting(&Name::new("E"), predicted);
    assert_eq!(set.single_waiters().count(), 0);
  }
}
