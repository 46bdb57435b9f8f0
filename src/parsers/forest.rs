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

//! A shared packed parse forest built from a finished chart.
//!
//! The forest has two kinds of nodes:
//!
//! - Symbol nodes: a nonterminal spanning `start..end`. Each alternative is
//!   an item node for a complete expression of that nonterminal.
//! - Item nodes: an expression with the cursor after `cursor` terms,
//!   spanning `start..end`. Each family is one way of splitting the span:
//!   the item with one term fewer (absent when that item would be at the
//!   start of the expression), followed by the last matched term, which is
//!   either a token or a symbol node.
//!
//! Nodes are shared, so the forest stays polynomial in the input length even
//! when the number of derivations is exponential or infinite.

use {
  crate::{
    grammar::Grammar,
    parsers::{
      earley::{state::EarleyStateKey, Chart},
      tree::Tree,
      ParseError,
    },
    state::ExprState,
    tokens::TokenStream,
    utils::Name,
  },
  im::Vector,
  std::{
    borrow::Cow,
    collections::{BTreeMap, BTreeSet, HashMap},
  },
};

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct SymbolId(usize);

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ItemId(usize);

/// The last matched term of a family.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Child {
  /// The token at the given position.
  Token(usize),
  Symbol(SymbolId),
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Family {
  prev: Option<ItemId>,
  child: Child,
}

impl Family {
  pub fn prev(&self) -> Option<ItemId> {
    self.prev
  }

  pub fn child(&self) -> Child {
    self.child
  }
}

#[derive(Clone, Debug)]
pub struct SymbolNode<'a> {
  name: &'a Name,
  start: usize,
  end: usize,
  alternatives: Vec<ItemId>,
}

impl<'a> SymbolNode<'a> {
  pub fn name(&self) -> &'a Name {
    self.name
  }

  pub fn start(&self) -> usize {
    self.start
  }

  pub fn end(&self) -> usize {
    self.end
  }

  pub fn alternatives(&self) -> &[ItemId] {
    &self.alternatives
  }
}

#[derive(Clone, Debug)]
pub struct ItemNode<'a> {
  state: ExprState<'a>,
  start: usize,
  end: usize,
  families: Vec<Family>,
}

impl<'a> ItemNode<'a> {
  pub fn state(&self) -> ExprState<'a> {
    self.state
  }

  pub fn start(&self) -> usize {
    self.start
  }

  pub fn end(&self) -> usize {
    self.end
  }

  /// The ways this item can be split. Empty for an item at the start of
  /// its expression.
  pub fn families(&self) -> &[Family] {
    &self.families
  }
}

/// All derivations of an accepted input.
///
/// The forest borrows the grammar and tokens it was parsed from. Payloads
/// are reachable through the tokens but never inspected.
pub struct Forest<'a, T> {
  grammar: &'a Grammar,
  tokens: TokenStream<'a, T>,
  symbols: Vec<SymbolNode<'a>>,
  items: Vec<ItemNode<'a>>,
  root: SymbolId,
}

impl<'a, T> Forest<'a, T> {
  /// Builds the forest of a finished chart. Returns `None` if the chart did
  /// not accept its input.
  pub fn from_chart(chart: &Chart<'a, T>) -> Option<Self> {
    if !chart.is_accepted() {
      return None;
    }

    let start = chart.grammar().start_nt()?;
    let mut builder = ForestBuilder::new(chart);
    let root = builder.symbol(start, 0, chart.tokens().len());
    builder.drain();

    Some(Forest {
      grammar: chart.grammar(),
      tokens: chart.tokens(),
      symbols: builder.symbols,
      items: builder.items,
      root,
    })
  }

  pub fn grammar(&self) -> &'a Grammar {
    self.grammar
  }

  pub fn tokens(&self) -> TokenStream<'a, T> {
    self.tokens
  }

  /// The start symbol spanning the whole input.
  pub fn root(&self) -> SymbolId {
    self.root
  }

  pub fn symbol(&self, id: SymbolId) -> &SymbolNode<'a> {
    &self.symbols[id.0]
  }

  pub fn item(&self, id: ItemId) -> &ItemNode<'a> {
    &self.items[id.0]
  }

  pub fn num_symbols(&self) -> usize {
    self.symbols.len()
  }

  pub fn num_items(&self) -> usize {
    self.items.len()
  }

  /// Returns true if some node can be derived in more than one way.
  pub fn is_ambiguous(&self) -> bool {
    self.symbols.iter().any(|s| s.alternatives.len() > 1)
      || self.items.iter().any(|i| i.families.len() > 1)
  }

  /// Counts the distinct derivation trees in the forest.
  ///
  /// Returns `None` if the count is unbounded, which happens when a
  /// nonterminal can derive itself, or if it does not fit in a `u64`.
  pub fn count_derivations(&self) -> Option<u64> {
    let mut symbol_marks = vec![Mark::Unvisited; self.symbols.len()];
    let mut item_marks = vec![Mark::Unvisited; self.items.len()];
    let mut stack = vec![(NodeRef::Symbol(self.root), false)];

    while let Some((node, expanded)) = stack.pop() {
      let mark = match node {
        NodeRef::Symbol(id) => &mut symbol_marks[id.0],
        NodeRef::Item(id) => &mut item_marks[id.0],
      };

      if expanded {
        let count = self.node_count(node, &symbol_marks, &item_marks)?;
        match node {
          NodeRef::Symbol(id) => symbol_marks[id.0] = Mark::Done(count),
          NodeRef::Item(id) => item_marks[id.0] = Mark::Done(count),
        }
        continue;
      }

      match *mark {
        Mark::Done(_) => continue,
        // Reached again from one of its own descendants.
        Mark::Visiting => return None,
        Mark::Unvisited => *mark = Mark::Visiting,
      }

      stack.push((node, true));
      stack.extend(self.node_children(node).into_iter().map(|c| (c, false)));
    }

    match symbol_marks[self.root.0] {
      Mark::Done(count) => Some(count),
      _ => None,
    }
  }

  fn node_children(&self, node: NodeRef) -> Vec<NodeRef> {
    match node {
      NodeRef::Symbol(id) => self.symbols[id.0]
        .alternatives
        .iter()
        .map(|item| NodeRef::Item(*item))
        .collect(),
      NodeRef::Item(id) => {
        let mut children = Vec::new();
        for family in &self.items[id.0].families {
          children.extend(family.prev.map(NodeRef::Item));
          if let Child::Symbol(symbol) = family.child {
            children.push(NodeRef::Symbol(symbol));
          }
        }
        children
      }
    }
  }

  fn node_count(
    &self,
    node: NodeRef,
    symbol_marks: &[Mark],
    item_marks: &[Mark],
  ) -> Option<u64> {
    let done = |mark: Mark| match mark {
      Mark::Done(count) => count,
      _ => panic!("Children are counted before their parents."),
    };

    match node {
      NodeRef::Symbol(id) => {
        self.symbols[id.0].alternatives.iter().try_fold(0u64, |acc, item| {
          acc.checked_add(done(item_marks[item.0]))
        })
      }
      NodeRef::Item(id) => {
        let families = &self.items[id.0].families;
        if families.is_empty() {
          return Some(1);
        }

        families.iter().try_fold(0u64, |acc, family| {
          let prev = family.prev.map_or(1, |p| done(item_marks[p.0]));
          let child = match family.child {
            Child::Token(_) => 1,
            Child::Symbol(s) => done(symbol_marks[s.0]),
          };
          acc.checked_add(prev.checked_mul(child)?)
        })
      }
    }
  }

  /// Enumerates every derivation tree.
  ///
  /// Fails with `AmbiguityLimitExceeded` if there are more than `limit`
  /// trees, or infinitely many. The forest itself stays usable.
  pub fn trees(&self, limit: usize) -> Result<Vec<Tree<'a, T>>, ParseError> {
    match self.count_derivations() {
      Some(count) if count <= limit as u64 => {}
      count => {
        log::debug!(
          "Refusing to enumerate {:?} derivations with a limit of {}.",
          count,
          limit
        );
        return Err(ParseError::AmbiguityLimitExceeded { limit, count });
      }
    }

    Ok(TreeEnumerator::new(self).run(self.root))
  }

  /// Renders the forest in Graphviz DOT format.
  pub fn to_dot(&self) -> String {
    let graph = DotGraph::new(self);
    let mut buffer = Vec::new();
    dot::render(&graph, &mut buffer).expect("Writing to a Vec cannot fail.");
    String::from_utf8(buffer).expect("DOT output is UTF-8.")
  }
}

impl<'a, T> std::fmt::Debug for Forest<'a, T> {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    let mut st = f.debug_struct("Forest");
    st.field("root", &self.root);
    st.field("symbols", &self.symbols);
    st.field("items", &self.items);
    st.finish()
  }
}

#[derive(Copy, Clone, Debug)]
enum Mark {
  Unvisited,
  Visiting,
  Done(u64),
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum NodeRef {
  Symbol(SymbolId),
  Item(ItemId),
}

// ----------------

/// Complete states left out of one chart set by leo items, by head and
/// origin, with the splits of their last term.
type SkippedStates<'a> =
  BTreeMap<(&'a Name, usize), BTreeMap<ExprState<'a>, BTreeSet<usize>>>;

struct ForestBuilder<'c, 'a, T> {
  chart: &'c Chart<'a, T>,
  symbols: Vec<SymbolNode<'a>>,
  items: Vec<ItemNode<'a>>,
  symbol_ids: BTreeMap<(&'a Name, usize, usize), SymbolId>,
  item_ids: BTreeMap<(ExprState<'a>, usize, usize), ItemId>,
  skipped: HashMap<usize, SkippedStates<'a>>,
  pending_symbols: Vec<SymbolId>,
  pending_items: Vec<ItemId>,
}

impl<'c, 'a, T> ForestBuilder<'c, 'a, T> {
  fn new(chart: &'c Chart<'a, T>) -> Self {
    ForestBuilder {
      chart,
      symbols: Vec::new(),
      items: Vec::new(),
      symbol_ids: BTreeMap::new(),
      item_ids: BTreeMap::new(),
      skipped: HashMap::new(),
      pending_symbols: Vec::new(),
      pending_items: Vec::new(),
    }
  }

  fn symbol(&mut self, name: &'a Name, start: usize, end: usize) -> SymbolId {
    if let Some(id) = self.symbol_ids.get(&(name, start, end)) {
      return *id;
    }

    let id = SymbolId(self.symbols.len());
    self.symbols.push(SymbolNode {
      name,
      start,
      end,
      alternatives: Vec::new(),
    });
    self.symbol_ids.insert((name, start, end), id);
    self.pending_symbols.push(id);
    id
  }

  fn item(&mut self, state: ExprState<'a>, start: usize, end: usize) -> ItemId {
    if let Some(id) = self.item_ids.get(&(state, start, end)) {
      return *id;
    }

    let id = ItemId(self.items.len());
    self.items.push(ItemNode {
      state,
      start,
      end,
      families: Vec::new(),
    });
    self.item_ids.insert((state, start, end), id);
    self.pending_items.push(id);
    id
  }

  fn drain(&mut self) {
    loop {
      if let Some(id) = self.pending_symbols.pop() {
        self.fill_symbol(id);
      } else if let Some(id) = self.pending_items.pop() {
        self.fill_item(id);
      } else {
        break;
      }
    }
  }

  /// Returns the skipped states of the chart set at `end`.
  fn skipped_at(&mut self, end: usize) -> &SkippedStates<'a> {
    let chart = self.chart;
    self.skipped.entry(end).or_insert_with(|| {
      let mut skipped = SkippedStates::new();
      for (key, split) in chart.skipped_completions(end) {
        skipped
          .entry((key.state.expr().head(), key.origin))
          .or_insert_with(BTreeMap::new)
          .entry(key.state)
          .or_insert_with(BTreeSet::new)
          .insert(split);
      }
      skipped
    })
  }

  fn fill_symbol(&mut self, id: SymbolId) {
    let chart = self.chart;
    let (name, start, end) = {
      let node = &self.symbols[id.0];
      (node.name, node.start, node.end)
    };

    let set = &chart.sets()[end];
    let mut states: Vec<ExprState<'a>> = set
      .completions_of(name, start)
      .iter()
      .map(|idx| set.get(*idx).state())
      .collect();
    if let Some(skipped) = self.skipped_at(end).get(&(name, start)) {
      states.extend(skipped.keys().copied());
    }

    for state in states {
      let item = self.item(state, start, end);
      if !self.symbols[id.0].alternatives.contains(&item) {
        self.symbols[id.0].alternatives.push(item);
      }
    }
  }

  /// Returns the splits of the last matched term of a chart state.
  fn splits(&mut self, key: EarleyStateKey<'a>, end: usize) -> BTreeSet<usize> {
    let chart = self.chart;
    let mut splits = chart.sets()[end]
      .find(&key)
      .map(|state| state.links().clone());

    if key.state.is_complete() {
      let head = key.state.expr().head();
      let skipped = self
        .skipped_at(end)
        .get(&(head, key.origin))
        .and_then(|states| states.get(&key.state));
      if let Some(skipped) = skipped {
        splits.get_or_insert_with(BTreeSet::new).extend(skipped);
      }
    }

    splits.expect("Forest items are backed by chart states.")
  }

  fn fill_item(&mut self, id: ItemId) {
    let (state, start, end) = {
      let node = &self.items[id.0];
      (node.state, node.start, node.end)
    };

    let (prev_state, term) = match (state.retreat(), state.prev_term()) {
      (Some(prev_state), Some(term)) => (prev_state, term),
      _ => return,
    };

    for split in self.splits(EarleyStateKey::new(state, start), end) {
      let prev = if prev_state.cursor() == 0 {
        assert_eq!(split, start);
        None
      } else {
        Some(self.item(prev_state, start, split))
      };

      let child = if term.is_terminal() {
        Child::Token(split)
      } else {
        Child::Symbol(self.symbol(term.name(), split, end))
      };

      self.items[id.0].families.push(Family { prev, child });
    }
  }
}

// ----------------

/// Builds the trees of every node bottom-up, children before parents. The
/// forest must be acyclic.
struct TreeEnumerator<'f, 'a, T> {
  forest: &'f Forest<'a, T>,
  symbol_trees: Vec<Option<Vec<Tree<'a, T>>>>,
  item_children: Vec<Option<Vec<Vector<Tree<'a, T>>>>>,
}

impl<'f, 'a, T> TreeEnumerator<'f, 'a, T> {
  fn new(forest: &'f Forest<'a, T>) -> Self {
    TreeEnumerator {
      forest,
      symbol_trees: vec![None; forest.symbols.len()],
      item_children: vec![None; forest.items.len()],
    }
  }

  fn is_done(&self, node: NodeRef) -> bool {
    match node {
      NodeRef::Symbol(id) => self.symbol_trees[id.0].is_some(),
      NodeRef::Item(id) => self.item_children[id.0].is_some(),
    }
  }

  fn run(mut self, root: SymbolId) -> Vec<Tree<'a, T>> {
    let mut stack = vec![(NodeRef::Symbol(root), false)];
    while let Some((node, expanded)) = stack.pop() {
      if self.is_done(node) {
        continue;
      }

      if !expanded {
        stack.push((node, true));
        for child in self.forest.node_children(node) {
          if !self.is_done(child) {
            stack.push((child, false));
          }
        }
        continue;
      }

      match node {
        NodeRef::Symbol(id) => {
          self.symbol_trees[id.0] = Some(self.symbol_trees(id));
        }
        NodeRef::Item(id) => {
          self.item_children[id.0] = Some(self.item_children(id));
        }
      }
    }

    self.symbol_trees[root.0].take().unwrap_or_default()
  }

  fn done_symbol(&self, id: SymbolId) -> &[Tree<'a, T>] {
    self.symbol_trees[id.0]
      .as_deref()
      .expect("Children are enumerated before their parents.")
  }

  fn done_item(&self, id: ItemId) -> &[Vector<Tree<'a, T>>] {
    self.item_children[id.0]
      .as_deref()
      .expect("Children are enumerated before their parents.")
  }

  fn symbol_trees(&self, id: SymbolId) -> Vec<Tree<'a, T>> {
    let mut trees = Vec::new();
    for item_id in &self.forest.symbols[id.0].alternatives {
      let item = &self.forest.items[item_id.0];
      for children in self.done_item(*item_id) {
        trees.push(Tree::new_branch(
          item.state.expr(),
          item.start,
          item.end,
          children.iter().cloned(),
        ));
      }
    }
    trees
  }

  /// Returns every sequence of subtrees for the terms before the item's
  /// cursor.
  fn item_children(&self, id: ItemId) -> Vec<Vector<Tree<'a, T>>> {
    let families = &self.forest.items[id.0].families;
    let mut seqs = Vec::new();
    if families.is_empty() {
      seqs.push(Vector::new());
    }

    let empty = [Vector::new()];
    for family in families {
      let prefixes = match family.prev {
        Some(prev) => self.done_item(prev),
        None => &empty[..],
      };
      let leaf;
      let lasts = match family.child {
        Child::Token(pos) => {
          leaf = [Tree::new_leaf(
            pos,
            self
              .forest
              .tokens
              .get(pos)
              .expect("Token children lie inside the input."),
          )];
          &leaf[..]
        }
        Child::Symbol(symbol) => self.done_symbol(symbol),
      };

      for prefix in prefixes {
        for last in lasts {
          let mut seq = prefix.clone();
          seq.push_back(last.clone());
          seqs.push(seq);
        }
      }
    }
    seqs
  }
}

// ----------------

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum DotNode {
  Symbol(usize),
  Item(usize),
  Family(usize, usize),
  Token(usize),
}

type DotEdge = (DotNode, DotNode, &'static str);

struct DotGraph<'f, 'a, T> {
  forest: &'f Forest<'a, T>,
  nodes: Vec<DotNode>,
  edges: Vec<DotEdge>,
}

impl<'f, 'a, T> DotGraph<'f, 'a, T> {
  fn new(forest: &'f Forest<'a, T>) -> Self {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    let mut tokens = BTreeSet::new();

    for (i, symbol) in forest.symbols.iter().enumerate() {
      nodes.push(DotNode::Symbol(i));
      for item in &symbol.alternatives {
        edges.push((DotNode::Symbol(i), DotNode::Item(item.0), "alt"));
      }
    }

    for (i, item) in forest.items.iter().enumerate() {
      nodes.push(DotNode::Item(i));
      for (j, family) in item.families.iter().enumerate() {
        let fam = DotNode::Family(i, j);
        nodes.push(fam);
        edges.push((DotNode::Item(i), fam, ""));
        if let Some(prev) = family.prev {
          edges.push((fam, DotNode::Item(prev.0), "prev"));
        }
        let child = match family.child {
          Child::Token(pos) => {
            tokens.insert(pos);
            DotNode::Token(pos)
          }
          Child::Symbol(s) => DotNode::Symbol(s.0),
        };
        edges.push((fam, child, "child"));
      }
    }

    nodes.extend(tokens.into_iter().map(DotNode::Token));
    DotGraph {
      forest,
      nodes,
      edges,
    }
  }
}

impl<'g, 'f, 'a, T> dot::Labeller<'g, DotNode, DotEdge>
  for DotGraph<'f, 'a, T>
{
  fn graph_id(&'g self) -> dot::Id<'g> {
    dot::Id::new("forest").expect("Graph id is a valid identifier.")
  }

  fn node_id(&'g self, n: &DotNode) -> dot::Id<'g> {
    let id = match *n {
      DotNode::Symbol(i) => format!("s{}", i),
      DotNode::Item(i) => format!("i{}", i),
      DotNode::Family(i, j) => format!("f{}_{}", i, j),
      DotNode::Token(i) => format!("t{}", i),
    };
    dot::Id::new(id).expect("Node ids are valid identifiers.")
  }

  fn node_label(&'g self, n: &DotNode) -> dot::LabelText<'g> {
    let label = match *n {
      DotNode::Symbol(i) => {
        let symbol = &self.forest.symbols[i];
        format!("{} {}..{}", symbol.name, symbol.start, symbol.end)
      }
      DotNode::Item(i) => {
        let item = &self.forest.items[i];
        format!("{:?} {}..{}", item.state, item.start, item.end)
      }
      DotNode::Family(_, _) => String::new(),
      DotNode::Token(pos) => match self.forest.tokens.name_at(pos) {
        Some(name) => format!("{} @{}", name, pos),
        None => format!("@{}", pos),
      },
    };
    dot::LabelText::LabelStr(Cow::Owned(label))
  }

  fn edge_label(&'g self, e: &DotEdge) -> dot::LabelText<'g> {
    dot::LabelText::LabelStr(Cow::Borrowed(e.2))
  }
}

impl<'g, 'f, 'a, T> dot::GraphWalk<'g, DotNode, DotEdge>
  for DotGraph<'f, 'a, T>
{
  fn nodes(&'g self) -> dot::Nodes<'g, DotNode> {
    Cow::Borrowed(&self.nodes)
  }

  fn edges(&'g self) -> dot::Edges<'g, DotEdge> {
    Cow::Borrowed(&self.edges)
  }

  fn source(&'g self, e: &DotEdge) -> DotNode {
    e.0
  }

  fn target(&'g self, e: &DotEdge) -> DotNode {
    e.1
  }
}
