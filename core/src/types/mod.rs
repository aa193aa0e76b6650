mod codec;
mod display;
mod family;
mod find;
mod manager;
mod rewrite;
mod tagged_choice;
mod template;
mod ty;

#[cfg(test)]
mod codec_test;
#[cfg(test)]
mod tagged_choice_test;

pub use family::RecursiveTypeFamily;
pub use find::{FindResult, MatchOutcome, TypeMatcher};
pub use manager::TypeManager;
pub use tagged_choice::TaggedChoiceType;
pub use template::{Template, TemplateKind};
pub use ty::{FamilyId, Primitive, TyData, Type, TypeFlags, TypeKind};
