use std::sync::Arc;

use parking_lot::RwLock;

use crate::errors::SchemaError;
use crate::pool::Pool;
use crate::types::family::RecursiveTypeFamily;
use crate::types::tagged_choice::{TaggedChoiceType, collect_branches};
use crate::types::template::{Template, TemplateKind};
use crate::types::ty::{FamilyId, Primitive, Type, TypeKind};
use crate::values::TagKey;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct FamilyRecipe {
    name: Arc<str>,
    templates: Arc<[Template]>,
}

/// Factory and interner for types, templates and recursive families.
///
/// Every constructor returns the canonical instance for its structure, so
/// building the same type twice yields pointer-equal handles. A manager is
/// `Send + Sync` and meant to be shared by all threads of one session.
pub struct TypeManager {
    types: Pool<TypeKind, Type>,
    templates: Pool<TemplateKind, Template>,
    family_recipes: Pool<FamilyRecipe, FamilyId>,
    /// Memoized template applications, keyed by template, family and index.
    instances: Pool<(Template, FamilyId, usize), Type>,
    /// Registered families. Append-only, so a [`FamilyId`] stays valid for
    /// the lifetime of the manager, across pool resets.
    families: RwLock<Vec<Arc<RecursiveTypeFamily>>>,
}

impl Default for TypeManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeManager {
    pub fn new() -> Self {
        TypeManager {
            types: Pool::new("types"),
            templates: Pool::new("templates"),
            family_recipes: Pool::new("families"),
            instances: Pool::new("instances"),
            families: RwLock::new(Vec::new()),
        }
    }

    pub(crate) fn intern(&self, kind: TypeKind) -> Type {
        self.types.create(kind, |kind| Type::new(kind.clone()))
    }

    pub(crate) fn intern_template(&self, kind: TemplateKind) -> Template {
        self.templates
            .create(kind, |kind| Template::new(kind.clone()))
    }

    // Factory methods for types.
    pub fn primitive(&self, primitive: Primitive) -> Type {
        self.intern(TypeKind::Const(primitive))
    }
    pub fn nil(&self) -> Type {
        self.primitive(Primitive::Nil)
    }
    pub fn bool(&self) -> Type {
        self.primitive(Primitive::Bool)
    }
    pub fn int(&self) -> Type {
        self.primitive(Primitive::Int)
    }
    pub fn long(&self) -> Type {
        self.primitive(Primitive::Long)
    }
    pub fn float(&self) -> Type {
        self.primitive(Primitive::Float)
    }
    pub fn double(&self) -> Type {
        self.primitive(Primitive::Double)
    }
    pub fn string(&self) -> Type {
        self.primitive(Primitive::String)
    }

    pub fn and(&self, first: Type, second: Type) -> Type {
        self.intern(TypeKind::Product(first, second))
    }

    /// Right-nested product of all `types`. An empty product is `nil`.
    pub fn and_all(&self, types: impl IntoIterator<Item = Type>) -> Type {
        let types: Vec<Type> = types.into_iter().collect();
        let mut iter = types.into_iter().rev();
        match iter.next() {
            None => self.nil(),
            Some(last) => iter.fold(last, |acc, ty| self.and(ty, acc)),
        }
    }

    pub fn or(&self, left: Type, right: Type) -> Type {
        self.intern(TypeKind::Sum(left, right))
    }

    pub fn list(&self, element: Type) -> Type {
        self.intern(TypeKind::List(element))
    }

    pub fn field(&self, name: &str, element: Type) -> Type {
        self.intern(TypeKind::Field {
            name: Arc::from(name),
            element,
            optional: false,
        })
    }

    pub fn optional_field(&self, name: &str, element: Type) -> Type {
        self.intern(TypeKind::Field {
            name: Arc::from(name),
            element,
            optional: true,
        })
    }

    pub fn named(&self, name: &str, element: Type) -> Type {
        self.intern(TypeKind::Named {
            name: Arc::from(name),
            element,
        })
    }

    pub fn func(&self, arg: Type, ret: Type) -> Type {
        self.intern(TypeKind::Func(arg, ret))
    }

    pub fn check(&self, name: &str, index: usize, expected_index: usize, element: Type) -> Type {
        self.intern(TypeKind::Check {
            name: Arc::from(name),
            index,
            expected_index,
            element,
        })
    }

    /// A sum discriminated by the map field `name`, whose value is read with
    /// `key_type`. Fails on duplicate keys or keys that do not fit the key type.
    pub fn tagged_choice(
        &self,
        name: &str,
        key_type: Type,
        branches: impl IntoIterator<Item = (TagKey, Type)>,
    ) -> Result<Type, SchemaError> {
        let choice = TaggedChoiceType::new(name, key_type, branches)?;
        Ok(self.tagged_choice_from(choice))
    }

    pub(crate) fn tagged_choice_from(&self, choice: TaggedChoiceType) -> Type {
        self.intern(TypeKind::TaggedChoice(choice))
    }

    pub(crate) fn recursion_point(&self, family: FamilyId, index: usize) -> Type {
        self.intern(TypeKind::RecursivePoint { family, index })
    }

    // Factory methods for templates.
    pub fn const_template(&self, ty: Type) -> Template {
        self.intern_template(TemplateKind::Const(ty))
    }

    /// Placeholder for member `index` of the family the template is applied to.
    pub fn id_template(&self, index: usize) -> Template {
        self.intern_template(TemplateKind::Id(index))
    }

    pub fn and_template(&self, first: Template, second: Template) -> Template {
        self.intern_template(TemplateKind::Product(first, second))
    }

    pub fn or_template(&self, left: Template, right: Template) -> Template {
        self.intern_template(TemplateKind::Sum(left, right))
    }

    pub fn list_template(&self, element: Template) -> Template {
        self.intern_template(TemplateKind::List(element))
    }

    pub fn field_template(&self, name: &str, element: Template) -> Template {
        self.intern_template(TemplateKind::Field {
            name: Arc::from(name),
            element,
            optional: false,
        })
    }

    pub fn optional_field_template(&self, name: &str, element: Template) -> Template {
        self.intern_template(TemplateKind::Field {
            name: Arc::from(name),
            element,
            optional: true,
        })
    }

    pub fn named_template(&self, name: &str, element: Template) -> Template {
        self.intern_template(TemplateKind::Named {
            name: Arc::from(name),
            element,
        })
    }

    pub fn tagged_choice_template(
        &self,
        name: &str,
        key_type: Type,
        branches: impl IntoIterator<Item = (TagKey, Template)>,
    ) -> Result<Template, SchemaError> {
        let branches = collect_branches(name, &key_type, branches)?;
        Ok(self.intern_template(TemplateKind::TaggedChoice {
            name: Arc::from(name),
            key_type,
            branches: Arc::new(branches),
        }))
    }

    /// Admits `element` only in the family member `expected_index`.
    pub fn check_template(&self, name: &str, expected_index: usize, element: Template) -> Template {
        self.intern_template(TemplateKind::Check {
            name: Arc::from(name),
            expected_index,
            element,
        })
    }

    /// Registers (or finds) the family built from `templates`. Member `i` of
    /// the family is `templates[i]` applied to the family itself.
    pub fn family(
        &self,
        name: &str,
        templates: impl IntoIterator<Item = Template>,
    ) -> Result<Arc<RecursiveTypeFamily>, SchemaError> {
        let templates: Arc<[Template]> = templates.into_iter().collect();
        if let Some(oversized) = templates.iter().find(|t| t.size() > templates.len()) {
            return Err(SchemaError::MissingFamilyMember {
                family: name.to_string(),
                index: oversized.size() - 1,
            });
        }
        let recipe = FamilyRecipe {
            name: Arc::from(name),
            templates,
        };
        let id = self
            .family_recipes
            .create(recipe, |recipe| self.alloc_family(recipe));
        self.family_by_id(id)
    }

    fn alloc_family(&self, recipe: &FamilyRecipe) -> FamilyId {
        let mut families = self.families.write();
        let id = FamilyId(families.len());
        tracing::debug!(family = %recipe.name, id = id.0, size = recipe.templates.len(), "registering recursive family");
        families.push(Arc::new(RecursiveTypeFamily::new(
            id,
            recipe.name.clone(),
            recipe.templates.clone(),
        )));
        id
    }

    pub fn family_by_id(&self, id: FamilyId) -> Result<Arc<RecursiveTypeFamily>, SchemaError> {
        self.families
            .read()
            .get(id.0)
            .cloned()
            .ok_or(SchemaError::UnknownFamily(id.0))
    }

    pub(crate) fn instantiate(
        &self,
        template: &Template,
        family: &RecursiveTypeFamily,
        index: usize,
    ) -> Result<Type, SchemaError> {
        self.instances
            .try_create((template.clone(), family.id(), index), |_| {
                template.build(self, Some(family), index)
            })
    }

    pub fn interned_types(&self) -> usize {
        self.types.len()
    }

    pub fn interned_templates(&self) -> usize {
        self.templates.len()
    }

    /// Empties every pool atomically: all pool locks are taken before any
    /// pool is cleared. Handles created before the reset stay valid and
    /// still compare structurally equal to new ones, but are no longer
    /// pointer-equal to them. Registered families are kept, so existing
    /// recursion points still resolve.
    pub fn clear_pools(&self) {
        let mut types = self.types.lock();
        let mut templates = self.templates.lock();
        let mut family_recipes = self.family_recipes.lock();
        let mut instances = self.instances.lock();
        tracing::debug!(
            types = types.len(),
            templates = templates.len(),
            instances = instances.len(),
            "clearing type pools"
        );
        types.clear();
        templates.clear();
        family_recipes.clear();
        instances.clear();
    }
}
