//! Tagged choices: sums discriminated by a key stored in a map field.
//!
//! A value `{kind: "a", value: 5}` of the choice `kind` reads the key `"a"`
//! from the `kind` field, then reads the rest of the map with the branch
//! registered for that key.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config;
use crate::errors::{FieldNotFound, OpticError, SchemaError};
use crate::functions::PointFree;
use crate::ops::DynamicOps;
use crate::optics::{Affine, Capability, Lens, Optic, Traversal, TypedOptic};
use crate::rewrite::{RecData, RewriteResult, TypeRewriteRule, View};
use crate::types::find::{FindResult, TypeMatcher, Visiting};
use crate::types::ty::{Primitive, Type, TypeKind};
use crate::types::TypeManager;
use crate::values::{TagKey, Value};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TaggedChoiceType {
    name: Arc<str>,
    key_type: Type,
    branches: Arc<BTreeMap<TagKey, Type>>,
}

/// The primitive a key type reads, looking through names.
pub(crate) fn key_primitive(key_type: &Type) -> Option<Primitive> {
    match key_type.kind() {
        TypeKind::Const(p @ (Primitive::Bool | Primitive::Int | Primitive::Long | Primitive::String)) => {
            Some(*p)
        }
        TypeKind::Named { element, .. } => key_primitive(element),
        _ => None,
    }
}

/// Collects branches, rejecting duplicate keys and keys the key type
/// cannot represent.
pub(crate) fn collect_branches<T>(
    choice: &str,
    key_type: &Type,
    branches: impl IntoIterator<Item = (TagKey, T)>,
) -> Result<BTreeMap<TagKey, T>, SchemaError> {
    let invalid = || SchemaError::InvalidKeyType {
        choice: choice.to_string(),
        key_type: key_type.to_string(),
    };
    let primitive = key_primitive(key_type).ok_or_else(invalid)?;
    let mut collected = BTreeMap::new();
    for (key, branch) in branches {
        if !key.fits(primitive) {
            return Err(invalid());
        }
        if collected.contains_key(&key) {
            return Err(SchemaError::DuplicateKey {
                choice: choice.to_string(),
                key,
            });
        }
        collected.insert(key, branch);
    }
    Ok(collected)
}

impl TaggedChoiceType {
    pub(crate) fn new(
        name: &str,
        key_type: Type,
        branches: impl IntoIterator<Item = (TagKey, Type)>,
    ) -> Result<Self, SchemaError> {
        let branches = collect_branches(name, &key_type, branches)?;
        Ok(Self::from_parts(Arc::from(name), key_type, branches))
    }

    pub(crate) fn from_parts(
        name: Arc<str>,
        key_type: Type,
        branches: BTreeMap<TagKey, Type>,
    ) -> Self {
        TaggedChoiceType {
            name,
            key_type,
            branches: Arc::new(branches),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_arc(&self) -> Arc<str> {
        self.name.clone()
    }

    pub fn key_type(&self) -> &Type {
        &self.key_type
    }

    pub fn branches(&self) -> &BTreeMap<TagKey, Type> {
        &self.branches
    }

    pub fn branch(&self, key: &TagKey) -> Option<&Type> {
        self.branches.get(key)
    }

    /// The same choice with the branch of `key` replaced.
    pub fn with_branch(&self, key: &TagKey, ty: Type) -> Self {
        let mut branches = (*self.branches).clone();
        branches.insert(key.clone(), ty);
        Self::from_parts(self.name.clone(), self.key_type.clone(), branches)
    }

    fn unsupported(&self, key: String) -> SchemaError {
        SchemaError::UnsupportedKey {
            choice: self.name.to_string(),
            key,
        }
    }

    pub(crate) fn read<O: DynamicOps>(
        &self,
        cx: &TypeManager,
        ops: &O,
        input: O::Value,
    ) -> Result<(O::Value, Option<Value>), SchemaError> {
        let Some(tag) = ops.get(&input, &self.name) else {
            return Ok((input, None));
        };
        let (_, key_value) = self.key_type.read(cx, ops, tag)?;
        let Some(key) = key_value.as_ref().and_then(TagKey::from_value) else {
            return Ok((input, None));
        };
        let Some(branch) = self.branches.get(&key) else {
            if config::errors_are_fatal() {
                return Err(self.unsupported(key.to_string()));
            }
            tracing::warn!(choice = %self.name, key = %key, "unsupported key in tagged choice");
            return Ok((input, None));
        };
        let body = ops.remove(input.clone(), &self.name);
        let (rest, payload) = branch.read(cx, ops, body)?;
        Ok(match payload {
            Some(payload) => (rest, Some(Value::Tagged(key, Box::new(payload)))),
            None => (input, None),
        })
    }

    pub(crate) fn write<O: DynamicOps>(
        &self,
        cx: &TypeManager,
        ops: &O,
        rest: O::Value,
        key: &TagKey,
        payload: &Value,
    ) -> Result<O::Value, SchemaError> {
        let branch = self
            .branches
            .get(key)
            .ok_or_else(|| self.unsupported(key.to_string()))?;
        let key_value = key_primitive(&self.key_type)
            .and_then(|primitive| key.to_value(primitive))
            .ok_or_else(|| SchemaError::InvalidKeyType {
                choice: self.name.to_string(),
                key_type: self.key_type.to_string(),
            })?;
        let written_key = self.key_type.write(cx, ops, ops.empty(), &key_value)?;
        let with_key = ops
            .merge_into(rest, ops.create_string(&self.name), written_key)
            .into_result()
            .map_err(SchemaError::Merge)?;
        branch.write(cx, ops, with_key, payload)
    }

    fn element_result(
        &self,
        cx: &TypeManager,
        this: &Type,
        key: &TagKey,
        result: RewriteResult,
    ) -> RewriteResult {
        let optic = TypedOptic::tagged(cx, self, key, result.ty(), result.new_type());
        RewriteResult::optic_view(cx, this, result, optic)
    }

    /// Rewrites every branch with `rule`.
    ///
    /// One changed branch is lifted through the tag optic of that branch.
    /// Several changed branches are combined into a dispatch function that
    /// picks the conversion by key; unchanged branches keep their type.
    pub(crate) fn all(
        &self,
        cx: &TypeManager,
        this: &Type,
        rule: &TypeRewriteRule,
    ) -> Result<RewriteResult, SchemaError> {
        let mut rec_data = RecData::new();
        let mut changed = Vec::new();
        for (key, branch) in self.branches.iter() {
            if let Some(result) = rule.rewrite(cx, branch)? {
                rec_data.union_with(result.rec_data());
                if !result.is_nop() {
                    changed.push((key.clone(), result));
                }
            }
        }
        let result = if changed.is_empty() {
            RewriteResult::nop(this.clone())
        } else if changed.len() == 1 {
            let (key, result) = changed.remove(0);
            self.element_result(cx, this, &key, result)
        } else {
            let mut branches = (*self.branches).clone();
            let mut functions = BTreeMap::new();
            for (key, result) in changed {
                branches.insert(key.clone(), result.new_type().clone());
                functions.insert(key, result.function().clone());
            }
            let new_type = cx.tagged_choice_from(Self::from_parts(
                self.name.clone(),
                self.key_type.clone(),
                branches,
            ));
            let function = PointFree::tagged_dispatch(this.clone(), new_type.clone(), functions);
            RewriteResult::create(View::new(this.clone(), new_type, function), RecData::new())
        };
        Ok(result.add_rec_data(&rec_data))
    }

    /// Rewrites the first branch, in key order, that `rule` changes.
    pub(crate) fn one(
        &self,
        cx: &TypeManager,
        this: &Type,
        rule: &TypeRewriteRule,
    ) -> Result<Option<RewriteResult>, SchemaError> {
        for (key, branch) in self.branches.iter() {
            if let Some(result) = rule.rewrite(cx, branch)? {
                if !result.is_nop() {
                    return Ok(Some(self.element_result(cx, this, key, result)));
                }
            }
        }
        Ok(None)
    }

    /// Searches every branch and merges the branch optics.
    ///
    /// A single matching branch yields the tag affine composed with the
    /// branch optic. Several matches merge into one optic per tag: a lens
    /// when every branch matched with a lens, otherwise an affine when every
    /// match is at most affine, otherwise a traversal.
    pub(crate) fn find_in_children(
        &self,
        cx: &TypeManager,
        matcher: &TypeMatcher,
        result_type: &Type,
        recurse: bool,
        visiting: &mut Visiting,
    ) -> Result<FindResult, SchemaError> {
        let mut found: BTreeMap<TagKey, TypedOptic> = BTreeMap::new();
        for (key, branch) in self.branches.iter() {
            if let Ok(optic) = branch.find_type_visiting(cx, matcher, result_type, recurse, visiting)? {
                found.insert(key.clone(), optic);
            }
        }
        let (a, b) = match found.values().next() {
            Some(optic) => (optic.a().clone(), optic.b().clone()),
            None => {
                return Ok(Err(FieldNotFound::new(format!(
                    "not found in any branch of tagged choice `{}`",
                    self.name
                ))));
            }
        };
        if let (1, Some((key, optic))) = (found.len(), found.first_key_value()) {
            let outer = TypedOptic::tagged(cx, self, key, optic.s(), optic.t());
            return Ok(Ok(outer.compose(optic)));
        }

        let bound = found
            .values()
            .map(TypedOptic::capability)
            .fold(Capability::Adapter, Capability::join);
        let total = found.len() == self.branches.len();
        let merged: Result<Optic, OpticError> = if bound.satisfies(Capability::Lens) && total {
            found
                .iter()
                .map(|(key, optic)| Ok::<_, OpticError>((key.clone(), optic.optic().as_lens()?)))
                .collect::<Result<_, _>>()
                .map(|lenses| Optic::Lens(Lens::tagged(lenses)))
        } else if bound.satisfies(Capability::Affine) {
            found
                .iter()
                .map(|(key, optic)| Ok::<_, OpticError>((key.clone(), optic.optic().as_affine()?)))
                .collect::<Result<_, _>>()
                .map(|affines| Optic::Affine(Affine::tagged(affines)))
        } else {
            let traversals = found
                .iter()
                .map(|(key, optic)| (key.clone(), optic.optic().as_traversal()))
                .collect();
            Ok(Optic::Traversal(Traversal::tagged(traversals)))
        };
        let optic = merged.map_err(|_| SchemaError::IncompatibleCapabilities {
            choice: self.name.to_string(),
            found: found
                .values()
                .map(|o| o.capability().to_string())
                .collect::<Vec<_>>()
                .join(", "),
        })?;

        let mut t_branches = (*self.branches).clone();
        for (key, branch_optic) in found.iter() {
            t_branches.insert(key.clone(), branch_optic.t().clone());
        }
        let t = cx.tagged_choice_from(Self::from_parts(
            self.name.clone(),
            self.key_type.clone(),
            t_branches,
        ));
        let s = cx.tagged_choice_from(self.clone());
        Ok(Ok(TypedOptic::new(s, t, a, b, optic)))
    }
}
