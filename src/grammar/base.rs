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

pub mod builder;
mod cmp_wrappers;
mod element_types;

use {
  super::{optional::expand_optionals, GrammarError},
  crate::utils::{breadth_first_search, BuilderInto, Name, ToDoc},
  std::collections::{BTreeSet, HashMap},
};

pub use cmp_wrappers::ParentRef;
pub use element_types::{Expression, Production, Term};

/// The stable identity of one alternative expression within a grammar.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ExprId(usize);

impl ExprId {
  pub fn index(self) -> usize {
    self.0
  }
}

/// The stable identity of one rule (all alternatives of a single lhs).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct RuleId(usize);

impl RuleId {
  pub fn index(self) -> usize {
    self.0
  }
}

/// Where an expression came from in the caller's input: the index of the
/// `Production` and the index of the `Expression` within its `rhs`.
///
/// Several expressions share an origin when an expression with optional
/// terms was expanded.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ExprOrigin {
  pub production: usize,
  pub alternative: usize,
}

#[derive(Clone, Debug)]
struct ExprInner {
  head: Name,
  terms: Vec<Term>,
  origin: ExprOrigin,
}

#[derive(Clone, Debug)]
struct RuleInner {
  head: Name,
  exprs: Vec<ExprId>,
}

/// A context-free grammar.
///
/// This consists of
///
/// - An optional start nonterminal (absent only for a grammar without any
///   productions)
/// - A set of rules, each which consist of
///   - A head nonterminal
///   - A list of alternative expressions, where each expression is a list of
///     terminal and nonterminal terms, and carries a stable `ExprId`.
///
/// Productions sharing an lhs are merged into one rule, keeping every
/// alternative. Grammars are read-only once built, and are `Send + Sync` so
/// concurrent parses may share one.
#[derive(Clone)]
pub struct Grammar {
  start_symbol: Option<Name>,
  rules: Vec<RuleInner>,
  rule_index: HashMap<Name, RuleId>,
  exprs: Vec<ExprInner>,
}

impl Grammar {
  /// Builds a grammar with an explicit start symbol.
  pub fn new(
    start: impl BuilderInto<Name>,
    productions: impl IntoIterator<Item = Production>,
  ) -> Result<Self, GrammarError> {
    Grammar::assemble(Some(start.builder_into()), productions)
  }

  /// Builds a grammar whose start symbol is the lhs of the first production.
  ///
  /// Unlike `Grammar::new`, an empty list of productions is accepted. The
  /// resulting grammar has no start symbol and rejects every input.
  pub fn from_productions(
    productions: impl IntoIterator<Item = Production>,
  ) -> Result<Self, GrammarError> {
    let productions: Vec<_> = productions.into_iter().collect();
    let start = productions.first().map(|p| p.lhs().clone());
    Grammar::assemble(start, productions)
  }

  fn assemble(
    start_symbol: Option<Name>,
    productions: impl IntoIterator<Item = Production>,
  ) -> Result<Self, GrammarError> {
    let mut g = Grammar {
      start_symbol,
      rules: Vec::new(),
      rule_index: HashMap::new(),
      exprs: Vec::new(),
    };

    for (prod_index, production) in productions.into_iter().enumerate() {
      let rule_id = g.rule_id_for(production.lhs());
      for (alt_index, expression) in production.rhs().iter().enumerate() {
        let origin = ExprOrigin {
          production: prod_index,
          alternative: alt_index,
        };
        for terms in expand_optionals(production.lhs(), expression.terms())? {
          let expr_id = ExprId(g.exprs.len());
          g.exprs.push(ExprInner {
            head: production.lhs().clone(),
            terms,
            origin,
          });
          g.rules[rule_id.0].exprs.push(expr_id);
        }
      }
    }

    g.check_grammar()?;
    g.report_lints();
    Ok(g)
  }

  fn rule_id_for(&mut self, head: &Name) -> RuleId {
    if let Some(id) = self.rule_index.get(head) {
      return *id;
    }

    let id = RuleId(self.rules.len());
    self.rules.push(RuleInner {
      head: head.clone(),
      exprs: Vec::new(),
    });
    self.rule_index.insert(head.clone(), id);
    id
  }

  /// Returns the start nonterminal for this grammar.
  pub fn start_nt(&self) -> Option<&Name> {
    self.start_symbol.as_ref()
  }

  /// Returns the start rule. `None` only for a grammar without productions.
  pub fn start_rule(&self) -> Option<Rule> {
    self.start_nt().and_then(|nt| self.try_get_rule(nt))
  }

  /// Returns an iterator over all of the rules, in the order their lhs was
  /// first seen.
  pub fn rules(&self) -> impl Iterator<Item = Rule> {
    (0..self.rules.len()).map(move |i| Rule::new(self, RuleId(i)))
  }

  /// Gets an iterator over all expressions in the grammar, in `ExprId` order.
  pub fn exprs(&self) -> impl Iterator<Item = Expr> {
    (0..self.exprs.len()).map(move |i| Expr::new(self, ExprId(i)))
  }

  /// Gets the rule that has the given nonterminal as a head.
  pub fn try_get_rule<'a>(&'a self, nt: &str) -> Option<Rule<'a>> {
    self.rule_index.get(nt).map(|id| Rule::new(self, *id))
  }

  /// Gets the rule that has the given nonterminal as a head.
  ///
  /// Panics if there is no such rule.
  pub fn get_rule<'a>(&'a self, nt: &str) -> Rule<'a> {
    self
      .try_get_rule(nt)
      .expect("An NT rule exists in the grammar.")
  }

  pub fn rule(&self, id: RuleId) -> Rule {
    assert!(id.0 < self.rules.len());
    Rule::new(self, id)
  }

  pub fn expr(&self, id: ExprId) -> Expr {
    assert!(id.0 < self.exprs.len());
    Expr::new(self, id)
  }

  pub fn num_exprs(&self) -> usize {
    self.exprs.len()
  }

  /// Returns true if `name` is the head of some rule.
  pub fn is_nonterminal(&self, name: &str) -> bool {
    self.rule_index.contains_key(name)
  }

  /// The number of distinct dotted items (expression plus cursor) in the
  /// grammar. A chart state set at position `k` never holds more than
  /// `(k + 1)` times this many states.
  pub fn num_dotted_items(&self) -> usize {
    self.exprs.iter().map(|e| e.terms.len() + 1).sum()
  }

  fn terms(&self) -> impl Iterator<Item = (&Name, &Term)> {
    self
      .exprs
      .iter()
      .flat_map(|e| e.terms.iter().map(move |t| (&e.head, t)))
  }

  fn reachable_nonterms(&self) -> BTreeSet<&Name> {
    breadth_first_search(self.start_symbol.iter(), |nt| {
      self
        .try_get_rule(nt)
        .into_iter()
        .flat_map(|r| r.exprs())
        .flat_map(|e| e.terms().iter())
        .filter_map(Term::as_nonterminal)
        .collect::<Vec<_>>()
    })
  }

  /// Returns the heads of rules that can never be reached from the start
  /// symbol.
  pub fn unreachable_nonterminals(&self) -> BTreeSet<&Name> {
    let reachable = self.reachable_nonterms();
    self
      .rules
      .iter()
      .map(|r| &r.head)
      .filter(|nt| !reachable.contains(nt))
      .collect()
  }

  fn check_grammar(&self) -> Result<(), GrammarError> {
    if let Some(start) = &self.start_symbol {
      if !self.is_nonterminal(start) {
        return Err(GrammarError::UndefinedStartSymbol {
          name: start.clone(),
        });
      }
    }

    for (lhs, term) in self.terms() {
      match term.as_nonterminal() {
        Some(nt) if !self.is_nonterminal(nt) => {
          return Err(GrammarError::UndefinedNonterminal {
            name: nt.clone(),
            lhs: lhs.clone(),
          });
        }
        Some(_) => {}
        None => {
          if self.is_nonterminal(term.name()) {
            return Err(GrammarError::TerminalUsedAsLhs {
              name: term.name().clone(),
            });
          }
        }
      }
    }

    Ok(())
  }

  fn report_lints(&self) {
    for nt in self.unreachable_nonterminals() {
      log::warn!("Nonterminal <{}> is unreachable from the start symbol.", nt);
    }

    for rule in self.rules.iter().filter(|r| r.exprs.is_empty()) {
      log::warn!("Rule <{}> has no alternatives.", rule.head);
    }
  }

  pub fn to_pretty(&self) -> String {
    let arena = pretty::Arena::new();
    format!("{}", self.to_doc(&arena).into_doc().pretty(80))
  }
}

impl std::fmt::Debug for Grammar {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    let mut dbg_struct = f.debug_struct("Grammar");
    dbg_struct.field("Start", &self.start_symbol);
    dbg_struct.field("Rules", &self.rules().collect::<Vec<_>>());
    dbg_struct.finish()
  }
}

impl ToDoc for Grammar {
  fn to_doc<'a, DA: pretty::DocAllocator<'a>>(
    &self,
    da: &'a DA,
  ) -> pretty::DocBuilder<'a, DA>
  where
    DA::Doc: Clone,
  {
    let start_doc = match &self.start_symbol {
      Some(start) => start.to_doc(da),
      None => da.text("<none>"),
    };
    let start_entry = da
      .text("Start =")
      .group()
      .append(da.softline())
      .append(start_doc);
    let rules_entry = da.text("Rules ").append(
      da.softline()
        .append(
          da.concat(self.rules().map(|rule| {
            rule.to_doc(da).append(da.text(";")).append(da.softline())
          }))
          .nest(2),
        )
        .braces(),
    );

    da.concat(
      vec![start_entry, rules_entry]
        .into_iter()
        .map(|doc| doc.append(da.text(",")).append(da.softline())),
    )
  }
}

// ------------

/// A rule within a grammar: a head nonterminal and all of its alternatives.
///
/// Compares like `Expr`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rule<'a> {
  grammar: ParentRef<'a, Grammar>,
  id: RuleId,
}

impl<'a> Rule<'a> {
  fn new(grammar: &'a Grammar, id: RuleId) -> Self {
    Rule {
      grammar: ParentRef::new(grammar),
      id,
    }
  }

  fn inner(&self) -> &'a RuleInner {
    let grammar: &'a Grammar = *self.grammar;
    &grammar.rules[self.id.0]
  }

  pub fn id(&self) -> RuleId {
    self.id
  }

  /// Returns the head nonterminal.
  pub fn head(&self) -> &'a Name {
    &self.inner().head
  }

  /// Returns an iterator over the alternatives of this rule.
  pub fn exprs(&self) -> impl Iterator<Item = Expr<'a>> {
    let grammar = *self.grammar;
    self.inner().exprs.iter().map(move |id| Expr::new(grammar, *id))
  }
}

impl<'a> ToDoc for Rule<'a> {
  fn to_doc<'b, DA: pretty::DocAllocator<'b>>(
    &self,
    da: &'b DA,
  ) -> pretty::DocBuilder<'b, DA>
  where
    DA::Doc: Clone,
  {
    self
      .head()
      .to_doc(da)
      .append(da.text(" =>"))
      .append(da.softline())
      .append(da.intersperse(
        self.exprs().map(|expr| expr.to_doc(da)),
        da.text(" |").append(da.softline()),
      ))
  }
}

impl<'a> std::fmt::Debug for Rule<'a> {
  fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
    let mut dbg_struct = fmt.debug_struct("Rule");
    dbg_struct.field("head", self.head());
    dbg_struct.field("exprs", &self.exprs().collect::<Vec<_>>());
    dbg_struct.finish()
  }
}

// ------------

/// A single alternative expression of a rule.
///
/// Handles into one grammar compare by `ExprId`. Handles into different
/// grammars are never equal.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Expr<'a> {
  grammar: ParentRef<'a, Grammar>,
  id: ExprId,
}

impl<'a> Expr<'a> {
  fn new(grammar: &'a Grammar, id: ExprId) -> Self {
    Expr {
      grammar: ParentRef::new(grammar),
      id,
    }
  }

  fn inner(&self) -> &'a ExprInner {
    let grammar: &'a Grammar = *self.grammar;
    &grammar.exprs[self.id.0]
  }

  pub fn id(&self) -> ExprId {
    self.id
  }

  /// Returns the head nonterminal this expression derives.
  pub fn head(&self) -> &'a Name {
    &self.inner().head
  }

  pub fn terms(&self) -> &'a [Term] {
    &self.inner().terms
  }

  /// Returns the term at a given index, or `None` past the end.
  pub fn term_at(&self, index: usize) -> Option<&'a Term> {
    self.inner().terms.get(index)
  }

  /// Returns the number of terms in this expression.
  pub fn len(&self) -> usize {
    self.inner().terms.len()
  }

  /// Returns true for an epsilon alternative.
  pub fn is_empty(&self) -> bool {
    self.inner().terms.is_empty()
  }

  pub fn origin(&self) -> ExprOrigin {
    self.inner().origin
  }
}

impl<'a> ToDoc for Expr<'a> {
  fn to_doc<'b, DA: pretty::DocAllocator<'b>>(
    &self,
    da: &'b DA,
  ) -> pretty::DocBuilder<'b, DA>
  where
    DA::Doc: Clone,
  {
    if self.is_empty() {
      da.text("ε")
    } else {
      da.intersperse(self.terms().iter().map(|t| t.to_doc(da)), da.softline())
    }
  }
}

impl<'a> std::fmt::Debug for Expr<'a> {
  fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
    let mut dbg_struct = fmt.debug_struct("Expr");
    dbg_struct.field("id", &self.id.0);
    dbg_struct.field("head", self.head());
    dbg_struct.field("terms", &self.terms());
    dbg_struct.finish()
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::grammar::examples;

  fn prod(lhs: &str, rhs: Vec<Vec<Term>>) -> Production {
    Production::new(lhs, rhs.into_iter().map(Expression::new).collect())
  }

  #[test]
  fn test_same_lhs_productions_merge() {
    let g = Grammar::from_productions(vec![
      prod("S", vec![vec![Term::terminal("a")]]),
      prod("T", vec![vec![Term::terminal("b")]]),
      prod("S", vec![vec![Term::nonterminal("T")], vec![]]),
    ])
    .unwrap();

    let rule = g.get_rule("S");
    let exprs: Vec<_> = rule.exprs().collect();
    assert_eq!(exprs.len(), 3);
    assert_eq!(
      exprs.iter().map(|e| e.origin()).collect::<Vec<_>>(),
      vec![
        ExprOrigin {
          production: 0,
          alternative: 0
        },
        ExprOrigin {
          production: 2,
          alternative: 0
        },
        ExprOrigin {
          production: 2,
          alternative: 1
        },
      ]
    );
    assert!(exprs[2].is_empty());
    assert_eq!(g.start_nt(), Some(&Name::new("S")));
    assert_eq!(g.rules().count(), 2);
  }

  #[test]
  fn test_expr_ids_are_stable() {
    let g = examples::make_balanced();
    for expr in g.exprs() {
      assert_eq!(g.expr(expr.id()), expr);
      assert_eq!(expr.head(), &Name::new("S"));
    }
    assert_eq!(g.num_exprs(), 2);
    assert_eq!(g.num_dotted_items(), 4 + 1);
  }

  #[test]
  fn test_undefined_nonterminal() {
    let err = Grammar::from_productions(vec![prod(
      "A",
      vec![vec![Term::nonterminal("B")]],
    )])
    .unwrap_err();
    assert_eq!(
      err,
      GrammarError::UndefinedNonterminal {
        name: Name::new("B"),
        lhs: Name::new("A"),
      }
    );
  }

  #[test]
  fn test_undefined_start_symbol() {
    let err = Grammar::new(
      "Missing",
      vec![prod("A", vec![vec![Term::terminal("a")]])],
    )
    .unwrap_err();
    assert_eq!(
      err,
      GrammarError::UndefinedStartSymbol {
        name: Name::new("Missing"),
      }
    );

    let err = Grammar::new("S", vec![]).unwrap_err();
    assert!(matches!(err, GrammarError::UndefinedStartSymbol { .. }));
  }

  #[test]
  fn test_terminal_used_as_lhs() {
    let err = Grammar::from_productions(vec![
      prod("S", vec![vec![Term::terminal("A")]]),
      prod("A", vec![vec![Term::terminal("a")]]),
    ])
    .unwrap_err();
    assert_eq!(
      err,
      GrammarError::TerminalUsedAsLhs {
        name: Name::new("A"),
      }
    );
  }

  #[test]
  fn test_empty_grammar_has_no_start() {
    let g = Grammar::from_productions(vec![]).unwrap();
    assert!(g.start_nt().is_none());
    assert!(g.start_rule().is_none());
    assert_eq!(g.num_exprs(), 0);
  }

  #[test]
  fn test_unreachable_is_not_an_error() {
    let g = Grammar::from_productions(vec![
      prod("S", vec![vec![Term::terminal("a")]]),
      prod("Orphan", vec![vec![Term::terminal("b")]]),
    ])
    .unwrap();
    assert_eq!(
      g.unreachable_nonterminals().into_iter().collect::<Vec<_>>(),
      vec![&Name::new("Orphan")]
    );
  }

  #[test]
  fn test_optional_terms_expand_with_shared_origin() {
    let g = Grammar::from_productions(vec![
      prod(
        "ns",
        vec![vec![
          Term::terminal("N"),
          Term::nonterminal("block").optional(),
        ]],
      ),
      prod("block", vec![vec![Term::terminal("W")]]),
    ])
    .unwrap();

    let exprs: Vec<_> = g.get_rule("ns").exprs().collect();
    assert_eq!(exprs.len(), 2);
    assert_eq!(exprs[0].len(), 2);
    assert_eq!(exprs[1].len(), 1);
    assert_eq!(exprs[0].origin(), exprs[1].origin());
    assert!(g.terms().all(|(_, t)| !t.is_optional()));
  }

  #[test]
  fn test_pretty_print() {
    let g = examples::make_balanced();
    let text = g.to_pretty();
    assert!(text.contains("Start ="));
    assert!(text.contains("S =>"));
    assert!(text.contains("ε"));
    assert!(text.contains("\"a\""));
  }

  #[test]
  fn test_handles_from_different_grammars() {
    let g1 = examples::make_balanced();
    let g2 = examples::make_balanced();
    let e1 = g1.get_rule("S").exprs().next().unwrap();
    let e2 = g2.get_rule("S").exprs().next().unwrap();

    assert_eq!(e1.id(), e2.id());
    assert_ne!(e1, e2);
    assert_ne!(e1.cmp(&e2), std::cmp::Ordering::Equal);
    assert_eq!(e1.cmp(&e2), e2.cmp(&e1).reverse());
    assert_ne!(g1.get_rule("S"), g2.get_rule("S"));
    assert_eq!(e1, g1.get_rule("S").exprs().next().unwrap());
  }

  #[test]
  fn test_grammar_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Grammar>();
  }
}
