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

//! Helper functions for debug formatting.

use std::fmt::{Debug, Formatter, Result};

#[derive(Clone)]
struct DebugListFormatted<C>(C);

impl<C: IntoIterator + Clone> Debug for DebugListFormatted<C>
where
  C::Item: Debug,
{
  fn fmt(&self, fmt: &mut Formatter) -> Result {
    let mut list = fmt.debug_list();
    list.entries(self.0.clone().into_iter());
    list.finish()
  }
}

#[derive(Clone)]
struct DebugSetFormatted<C>(C);

impl<C: IntoIterator + Clone> Debug for DebugSetFormatted<C>
where
  C::Item: Debug,
{
  fn fmt(&self, fmt: &mut Formatter) -> Result {
    let mut dbg_set = fmt.debug_set();
    dbg_set.entries(self.0.clone().into_iter());
    dbg_set.finish()
  }
}

pub fn list_fmt<C>(items: C) -> impl Debug
where
  C: IntoIterator + Clone,
  C::Item: Debug,
{
  DebugListFormatted(items)
}

pub fn set_fmt<C>(items: C) -> impl Debug
where
  C: IntoIterator + Clone,
  C::Item: Debug,
{
  DebugSetFormatted(items)
}
