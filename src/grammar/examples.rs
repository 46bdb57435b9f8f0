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

//! Small grammars that exercise the interesting corners of the parser.

use crate::grammar::{build, Grammar, GrammarBuilder};

fn make(start: &str, build_fn: impl FnOnce(&mut GrammarBuilder)) -> Grammar {
  build(start, build_fn).expect("example grammars are well formed")
}

/// `S -> "a" S "b" | ε`
pub fn make_balanced() -> Grammar {
  make("S", |gb| {
    gb.add_rule("S", |rb| {
      rb.add_expr(|eb| {
        eb.add_term("a").add_nonterm("S").add_term("b");
      })
      .add_empty();
    });
  })
}

/// `A -> A "x" | "y"`
pub fn make_left_recursive() -> Grammar {
  make("A", |gb| {
    gb.add_rule("A", |rb| {
      rb.add_expr(|eb| {
        eb.add_nonterm("A").add_term("x");
      })
      .add_expr(|eb| {
        eb.add_term("y");
      });
    });
  })
}

/// `S -> "a" S | "a"`
pub fn make_right_recursive() -> Grammar {
  make("S", |gb| {
    gb.add_rule("S", |rb| {
      rb.add_expr(|eb| {
        eb.add_term("a").add_nonterm("S");
      })
      .add_expr(|eb| {
        eb.add_term("a");
      });
    });
  })
}

/// `S -> A; A -> "x" | "x" "x"`
pub fn make_shared_prefix() -> Grammar {
  make("S", |gb| {
    gb.add_rule("S", |rb| {
      rb.add_expr(|eb| {
        eb.add_nonterm("A");
      });
    })
    .add_rule("A", |rb| {
      rb.add_expr(|eb| {
        eb.add_term("x");
      })
      .add_expr(|eb| {
        eb.add_term("x").add_term("x");
      });
    });
  })
}

/// `E -> E "+" E | "n"`
///
/// Every sum of more than two operands is ambiguous; `k` operands have the
/// `(k - 1)`th Catalan number of derivations.
pub fn make_ambiguous_sum() -> Grammar {
  make("E", |gb| {
    gb.add_rule("E", |rb| {
      rb.add_expr(|eb| {
        eb.add_nonterm("E").add_term("+").add_nonterm("E");
      })
      .add_expr(|eb| {
        eb.add_term("n");
      });
    });
  })
}

/// `A -> A | "x"`
///
/// Has infinitely many derivations for `"x"`.
pub fn make_cyclic() -> Grammar {
  make("A", |gb| {
    gb.add_rule("A", |rb| {
      rb.add_expr(|eb| {
        eb.add_nonterm("A");
      })
      .add_expr(|eb| {
        eb.add_term("x");
      });
    });
  })
}

/// `S -> A S "x" | "y"; A -> ε`
///
/// The nullable `A` is predicted and completed in the same state set as the
/// item waiting on it.
pub fn make_hidden_epsilon() -> Grammar {
  make("S", |gb| {
    gb.add_rule("S", |rb| {
      rb.add_expr(|eb| {
        eb.add_nonterm("A").add_nonterm("S").add_term("x");
      })
      .add_expr(|eb| {
        eb.add_term("y");
      });
    })
    .add_rule("A", |rb| {
      rb.add_empty();
    });
  })
}

/// `S -> A B "c"; A -> B; B -> ε`
pub fn make_nullable_chain() -> Grammar {
  make("S", |gb| {
    gb.add_rule("S", |rb| {
      rb.add_expr(|eb| {
        eb.add_nonterm("A").add_nonterm("B").add_term("c");
      });
    })
    .add_rule("A", |rb| {
      rb.add_expr(|eb| {
        eb.add_nonterm("B");
      });
    })
    .add_rule("B", |rb| {
      rb.add_empty();
    });
  })
}

/// `ns -> "N" "{" block? "}"; block -> "W" block?`
pub fn make_optional_block() -> Grammar {
  make("ns", |gb| {
    gb.add_rule("ns", |rb| {
      rb.add_expr(|eb| {
        eb.add_term("N")
          .add_term("{")
          .add_optional_nonterm("block")
          .add_term("}");
      });
    })
    .add_rule("block", |rb| {
      rb.add_expr(|eb| {
        eb.add_term("W").add_optional_nonterm("block");
      });
    });
  })
}
