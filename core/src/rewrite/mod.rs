//! Type rewrites and the conversions they produce.
//!
//! Rewriting a type yields a [`RewriteResult`]: the new type, a point-free
//! function converting values of the old type into values of the new one,
//! and the set of recursive family members the rewrite went through.

mod family;
mod rule;


use core::fmt;

use smallvec::SmallVec;

use crate::data_result::DataResult;
use crate::errors::EvalError;
use crate::functions::{PointFree, PointFreeRule};
use crate::ops::{self, DynamicOps};
use crate::optics::TypedOptic;
use crate::types::{Type, TypeManager};
use crate::values::Value;

pub(crate) use family::rewrite_family;
pub use rule::TypeRewriteRule;

/// Indices of recursive family members a rewrite passed through.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct RecData {
    // Bit `i % 64` of word `i / 64`. The last word is never zero.
    words: SmallVec<[u64; 1]>,
}

impl RecData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(index: usize) -> Self {
        let mut rec = Self::new();
        rec.insert(index);
        rec
    }

    pub fn insert(&mut self, index: usize) {
        let word = index / 64;
        if self.words.len() <= word {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1 << (index % 64);
    }

    pub fn contains(&self, index: usize) -> bool {
        self.words
            .get(index / 64)
            .is_some_and(|word| word & (1 << (index % 64)) != 0)
    }

    pub fn union_with(&mut self, other: &RecData) {
        if other.words.len() > self.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        for (word, other) in self.words.iter_mut().zip(other.words.iter()) {
            *word |= other;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(i, word)| {
            (0..64)
                .filter(move |bit| word & (1 << bit) != 0)
                .map(move |bit| i * 64 + bit)
        })
    }
}

impl FromIterator<usize> for RecData {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut rec = RecData::new();
        for index in iter {
            rec.insert(index);
        }
        rec
    }
}

/// A conversion from values of `ty` to values of `new_type`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct View {
    ty: Type,
    new_type: Type,
    function: PointFree,
}

impl View {
    pub fn new(ty: Type, new_type: Type, function: PointFree) -> Self {
        View {
            ty,
            new_type,
            function,
        }
    }

    pub fn nop(ty: Type) -> Self {
        View {
            new_type: ty.clone(),
            ty,
            function: PointFree::id(),
        }
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn new_type(&self) -> &Type {
        &self.new_type
    }

    pub fn function(&self) -> &PointFree {
        &self.function
    }

    /// Identity conversion that leaves the type alone. A retyping with an
    /// identity function, such as a field rename, is not a no-op.
    pub fn is_nop(&self) -> bool {
        self.function.is_id() && self.ty == self.new_type
    }

    pub fn func_type(&self, cx: &TypeManager) -> Type {
        cx.func(self.ty.clone(), self.new_type.clone())
    }

    /// This view after `earlier`. The new type of `earlier` must be the input
    /// type of this view.
    pub fn compose(&self, earlier: &View) -> View {
        debug_assert_eq!(earlier.new_type, self.ty);
        if earlier.is_nop() {
            return self.clone();
        }
        if self.is_nop() {
            return earlier.clone();
        }
        View {
            ty: earlier.ty.clone(),
            new_type: self.new_type.clone(),
            function: PointFree::comp(self.ty.clone(), self.function.clone(), earlier.function.clone()),
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "View[{} -> {}]: {}", self.ty, self.new_type, self.function)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RewriteResult {
    view: View,
    rec_data: RecData,
}

impl RewriteResult {
    pub fn nop(ty: Type) -> Self {
        RewriteResult {
            view: View::nop(ty),
            rec_data: RecData::new(),
        }
    }

    pub fn create(view: View, rec_data: RecData) -> Self {
        RewriteResult { view, rec_data }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn ty(&self) -> &Type {
        &self.view.ty
    }

    pub fn new_type(&self) -> &Type {
        &self.view.new_type
    }

    pub fn function(&self) -> &PointFree {
        &self.view.function
    }

    pub fn rec_data(&self) -> &RecData {
        &self.rec_data
    }

    pub fn is_nop(&self) -> bool {
        self.view.is_nop()
    }

    pub fn add_rec_data(mut self, rec_data: &RecData) -> Self {
        self.rec_data.union_with(rec_data);
        self
    }

    /// This result after `earlier`, with the recursion data of both.
    pub fn compose(&self, earlier: &RewriteResult) -> RewriteResult {
        let mut rec_data = earlier.rec_data.clone();
        rec_data.union_with(&self.rec_data);
        RewriteResult {
            view: self.view.compose(&earlier.view),
            rec_data,
        }
    }

    /// Lifts the rewrite of a sub-type of `ty` through `optic`, which
    /// focuses on that sub-type.
    pub fn optic_view(
        cx: &TypeManager,
        ty: &Type,
        result: RewriteResult,
        optic: TypedOptic,
    ) -> RewriteResult {
        if result.is_nop() {
            return RewriteResult {
                view: View::nop(ty.clone()),
                rec_data: result.rec_data,
            };
        }
        let arg_type = result.view.func_type(cx);
        let new_type = optic.t().clone();
        let function = PointFree::app(PointFree::lift(optic), result.view.function, arg_type);
        RewriteResult {
            view: View::new(ty.clone(), new_type, function),
            rec_data: result.rec_data,
        }
    }

    /// Simplifies the conversion function with `rule`.
    pub fn optimize(self, cx: &TypeManager, rule: &PointFreeRule) -> Self {
        if self.is_nop() {
            return self;
        }
        let func_type = self.view.func_type(cx);
        let function = rule.rewrite_or_keep(cx, &func_type, &self.view.function);
        RewriteResult {
            view: View::new(self.view.ty, self.view.new_type, function),
            rec_data: self.rec_data,
        }
    }

    /// Runs the conversion on a decoded value.
    pub fn apply<O: DynamicOps + Clone + 'static>(
        &self,
        ops: &O,
        value: Value,
    ) -> Result<Value, EvalError> {
        if self.is_nop() {
            return Ok(value);
        }
        let f = self.view.function.eval_fn(&ops::adapter(ops))?;
        f(value)
    }

    /// Reads `input` as the old type, converts it and writes it back as the
    /// new type. Parts of the input the old type does not describe are kept.
    pub fn migrate<O: DynamicOps + Clone + 'static>(
        &self,
        cx: &TypeManager,
        ops: &O,
        input: O::Value,
    ) -> DataResult<O::Value> {
        let (rest, value) = match self.ty().read(cx, ops, input.clone()) {
            Ok((rest, Some(value))) => (rest, value),
            Ok((_, None)) => {
                return DataResult::error_with_partial(
                    format!("unable to read input as {}", self.ty()),
                    input,
                );
            }
            Err(err) => return DataResult::error_with_partial(err.to_string(), input),
        };
        let value = match self.apply(ops, value) {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(error = %err, "conversion failed");
                return DataResult::error_with_partial(format!("conversion failed: {}", err), input);
            }
        };
        match self.new_type().write(cx, ops, rest, &value) {
            Ok(output) => DataResult::success(output),
            Err(err) => DataResult::error_with_partial(err.to_string(), input),
        }
    }
}

impl fmt::Display for RewriteResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.view)?;
        if !self.rec_data.is_empty() {
            write!(f, " rec{:?}", self.rec_data.iter().collect::<Vec<_>>())?;
        }
        Ok(())
    }
}
