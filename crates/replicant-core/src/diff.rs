//! Recursive diff engine
//!
//! Used for whole-value assignment, where no per-edit tracking exists:
//! the old and new trees are compared and an equivalent ordered op list
//! is produced. Mappings recurse per key; sequences collapse into a
//! single splice covering the changed window.

use crate::ops::ChangeOp;
use crate::value::join_key;
use serde_json::Value;

/// Compute the minimal ordered op list transforming `old` into `new`
pub fn diff(old: &Value, new: &Value) -> Vec<ChangeOp> {
    let mut ops = Vec::new();
    diff_at("", old, new, &mut ops);
    ops
}

fn diff_at(path: &str, old: &Value, new: &Value, ops: &mut Vec<ChangeOp>) {
    if old == new {
        return;
    }

    match (old, new) {
        (Value::Object(old_map), Value::Object(new_map)) => {
            for (key, new_child) in new_map {
                let child_path = join_key(path, key);
                match old_map.get(key) {
                    Some(old_child) => diff_at(&child_path, old_child, new_child, ops),
                    None => ops.push(ChangeOp::update(child_path, Value::Null, new_child.clone())),
                }
            }
            for (key, old_child) in old_map {
                if !new_map.contains_key(key) {
                    let child_path = join_key(path, key);
                    ops.push(ChangeOp::update(child_path, old_child.clone(), Value::Null));
                }
            }
        }
        (Value::Array(old_arr), Value::Array(new_arr)) => {
            ops.push(splice_window(path, old_arr, new_arr));
        }
        _ => {
            ops.push(ChangeOp::update(path, old.clone(), new.clone()));
        }
    }
}

/// One splice covering the differing middle of two sequences, with the
/// common prefix and suffix trimmed away.
fn splice_window(path: &str, old: &[Value], new: &[Value]) -> ChangeOp {
    let mut prefix = 0;
    while prefix < old.len() && prefix < new.len() && old[prefix] == new[prefix] {
        prefix += 1;
    }

    let mut suffix = 0;
    while suffix < old.len() - prefix
        && suffix < new.len() - prefix
        && old[old.len() - 1 - suffix] == new[new.len() - 1 - suffix]
    {
        suffix += 1;
    }

    let removed = old[prefix..old.len() - suffix].to_vec();
    let added = new[prefix..new.len() - suffix].to_vec();
    ChangeOp::splice(path, prefix, removed, added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_equal_trees_produce_no_ops() {
        let v = json!({"a": [1, 2], "b": {"c": true}});
        assert!(diff(&v, &v.clone()).is_empty());
    }

    #[test]
    fn test_scalar_replacement_is_root_update() {
        let ops = diff(&json!("foo"), &json!("bar"));
        assert_eq!(ops, vec![ChangeOp::update("", json!("foo"), json!("bar"))]);
    }

    #[test]
    fn test_nested_key_change_has_full_path() {
        let ops = diff(&json!({"a": {"b": {"c": "c"}}}), &json!({"a": {"b": {"c": "x"}}}));
        assert_eq!(ops, vec![ChangeOp::update("a.b.c", json!("c"), json!("x"))]);
    }

    #[test]
    fn test_added_and_removed_keys() {
        let ops = diff(&json!({"gone": 1}), &json!({"fresh": 2}));
        assert!(ops.contains(&ChangeOp::update("fresh", Value::Null, json!(2))));
        assert!(ops.contains(&ChangeOp::update("gone", json!(1), Value::Null)));
        assert_eq!(ops.len(), 2);
    }

    #[test]
    fn test_append_is_single_splice() {
        let ops = diff(&json!(["starting"]), &json!(["starting", "arrPushOK"]));
        assert_eq!(
            ops,
            vec![ChangeOp::splice("", 1, vec![], vec![json!("arrPushOK")])]
        );
    }

    #[test]
    fn test_middle_replacement_trims_prefix_and_suffix() {
        let ops = diff(&json!([1, 2, 3, 4]), &json!([1, 9, 9, 4]));
        assert_eq!(
            ops,
            vec![ChangeOp::splice(
                "",
                1,
                vec![json!(2), json!(3)],
                vec![json!(9), json!(9)]
            )]
        );
    }

    #[test]
    fn test_type_change_replaces_subtree() {
        let ops = diff(&json!({"v": [1, 2]}), &json!({"v": {"k": 1}}));
        assert_eq!(
            ops,
            vec![ChangeOp::update("v", json!([1, 2]), json!({"k": 1}))]
        );
    }
}
