// The error policy is process wide, so this binary holds a single test.

mod common;

use common::TYPES;
use pretty_assertions::assert_eq;
use remold::config::{self, ErrorPolicy};
use remold::{SchemaError, TagKey, Tree, TreeOps};

#[test]
fn unknown_keys_follow_the_error_policy() {
    let cx = &*TYPES;
    let choice = cx
        .tagged_choice("kind", cx.string(), [(TagKey::str("a"), cx.field("value", cx.int()))])
        .unwrap();
    let input = Tree::map([("kind", Tree::string("z")), ("value", Tree::Int(1))]);

    let previous = config::set_error_policy(ErrorPolicy::Lenient);
    let (rest, value) = choice.read(cx, &TreeOps, input.clone()).unwrap();
    assert_eq!(value, None);
    assert_eq!(rest, input);
    assert!(!choice.decode(cx, &TreeOps, input.clone()).is_success());

    config::set_error_policy(ErrorPolicy::Strict);
    assert_eq!(config::error_policy(), ErrorPolicy::Strict);
    assert_eq!(
        choice.read(cx, &TreeOps, input).unwrap_err(),
        SchemaError::UnsupportedKey {
            choice: "kind".to_string(),
            key: "\"z\"".to_string(),
        }
    );

    config::set_error_policy(previous);
}
