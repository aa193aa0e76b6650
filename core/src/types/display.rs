use core::fmt;

use crate::types::template::{Template, TemplateKind};
use crate::types::ty::{FamilyId, Primitive, Type, TypeKind};

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Primitive::Nil => "Nil",
            Primitive::Bool => "Bool",
            Primitive::Int => "Int",
            Primitive::Long => "Long",
            Primitive::Float => "Float",
            Primitive::Double => "Double",
            Primitive::String => "String",
        };
        write!(f, "{}", name)
    }
}

impl fmt::Display for FamilyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            TypeKind::Const(p) => write!(f, "{}", p),
            TypeKind::Product(a, b) => write!(f, "({}, {})", a, b),
            TypeKind::Sum(a, b) => write!(f, "({} | {})", a, b),
            TypeKind::List(element) => write!(f, "List[{}]", element),
            TypeKind::Field {
                name,
                element,
                optional: false,
            } => write!(f, "{}: {}", name, element),
            TypeKind::Field {
                name,
                element,
                optional: true,
            } => write!(f, "{}?: {}", name, element),
            TypeKind::Named { name, element } => write!(f, "{}={}", name, element),
            TypeKind::TaggedChoice(choice) => {
                write!(f, "TaggedChoice[{}, {}, {{", choice.name(), choice.key_type())?;
                for (i, (key, branch)) in choice.branches().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} -> {}", key, branch)?;
                }
                write!(f, "}}]")
            }
            TypeKind::RecursivePoint { family, index } => write!(f, "Rec{}.{}", family, index),
            TypeKind::Check {
                name,
                index,
                expected_index,
                element,
            } => write!(f, "Check[{}, {}/{}, {}]", name, index, expected_index, element),
            TypeKind::Func(arg, ret) => write!(f, "({} -> {})", arg, ret),
        }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            TemplateKind::Const(ty) => write!(f, "{}", ty),
            TemplateKind::Id(index) => write!(f, "Id[{}]", index),
            TemplateKind::Product(a, b) => write!(f, "({}, {})", a, b),
            TemplateKind::Sum(a, b) => write!(f, "({} | {})", a, b),
            TemplateKind::List(element) => write!(f, "List[{}]", element),
            TemplateKind::Field {
                name,
                element,
                optional,
            } => write!(f, "{}{}: {}", name, if *optional { "?" } else { "" }, element),
            TemplateKind::Named { name, element } => write!(f, "{}={}", name, element),
            TemplateKind::TaggedChoice {
                name,
                key_type,
                branches,
            } => {
                write!(f, "TaggedChoice[{}, {}, {{", name, key_type)?;
                for (i, (key, branch)) in branches.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} -> {}", key, branch)?;
                }
                write!(f, "}}]")
            }
            TemplateKind::Check {
                name,
                expected_index,
                element,
            } => write!(f, "Check[{}, {}, {}]", name, expected_index, element),
        }
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
