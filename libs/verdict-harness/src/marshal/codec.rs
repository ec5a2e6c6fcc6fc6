//! Rust-side implementation of the canonical flat encodings.
//!
//! The generated harnesses carry their own copies of these algorithms in the
//! target language; this module is the reference used to validate authored
//! test data and to pin down the exact encoding rules.

use super::MarshalError;
use serde_json::Value;
use std::collections::VecDeque;

#[derive(Debug)]
pub struct ListNode {
    pub val: Value,
    pub next: Option<Box<ListNode>>,
}

#[derive(Debug)]
pub struct TreeNode {
    pub val: Value,
    pub left: Option<Box<TreeNode>>,
    pub right: Option<Box<TreeNode>>,
}

// Drop and equality walk the graph with an explicit worklist: the derived
// versions recurse once per node and overflow the stack on long inputs.

impl Drop for ListNode {
    fn drop(&mut self) {
        let mut next = self.next.take();
        while let Some(mut node) = next {
            next = node.next.take();
        }
    }
}

impl PartialEq for ListNode {
    fn eq(&self, other: &Self) -> bool {
        let (mut a, mut b) = (Some(self), Some(other));
        loop {
            match (a, b) {
                (None, None) => return true,
                (Some(x), Some(y)) if x.val == y.val => {
                    a = x.next.as_deref();
                    b = y.next.as_deref();
                }
                _ => return false,
            }
        }
    }
}

impl Drop for TreeNode {
    fn drop(&mut self) {
        let mut pending: Vec<Box<TreeNode>> = Vec::new();
        pending.extend(self.left.take());
        pending.extend(self.right.take());
        while let Some(mut node) = pending.pop() {
            pending.extend(node.left.take());
            pending.extend(node.right.take());
        }
    }
}

impl PartialEq for TreeNode {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some((a, b)) = pending.pop() {
            if a.val != b.val {
                return false;
            }
            for (x, y) in [(&a.left, &b.left), (&a.right, &b.right)] {
                match (x.as_deref(), y.as_deref()) {
                    (Some(x), Some(y)) => pending.push((x, y)),
                    (None, None) => {}
                    _ => return false,
                }
            }
        }
        true
    }
}

impl TreeNode {
    pub fn leaf(val: impl Into<Value>) -> Self {
        Self {
            val: val.into(),
            left: None,
            right: None,
        }
    }
}

fn parse_sequence(raw: &str) -> Result<Vec<Value>, MarshalError> {
    let value: Value = serde_json::from_str(raw.trim())
        .map_err(|e| MarshalError::Malformed(format!("{}: {}", raw.trim(), e)))?;
    match value {
        Value::Array(items) => Ok(items),
        other => Err(MarshalError::Malformed(format!(
            "expected a sequence, got {}",
            other
        ))),
    }
}

fn ensure_scalar(value: &Value) -> Result<(), MarshalError> {
    match value {
        Value::Array(_) | Value::Object(_) => Err(MarshalError::Malformed(format!(
            "node values must be scalars, got {}",
            value
        ))),
        _ => Ok(()),
    }
}

fn render(values: &[Value]) -> String {
    // serde_json never fails on plain values
    Value::Array(values.to_vec()).to_string()
}

/// Build a node chain from a flat sequence; `[]` is the empty list.
pub fn deserialize_list(raw: &str) -> Result<Option<Box<ListNode>>, MarshalError> {
    let values = parse_sequence(raw)?;
    list_from_values(values)
}

fn list_from_values(values: Vec<Value>) -> Result<Option<Box<ListNode>>, MarshalError> {
    let mut head: Option<Box<ListNode>> = None;
    for val in values.into_iter().rev() {
        if val.is_null() {
            return Err(MarshalError::Malformed(
                "linked lists cannot contain null values".to_string(),
            ));
        }
        ensure_scalar(&val)?;
        head = Some(Box::new(ListNode { val, next: head }));
    }
    Ok(head)
}

pub fn serialize_list(head: &Option<Box<ListNode>>) -> String {
    let mut values = Vec::new();
    let mut node = head.as_deref();
    while let Some(current) = node {
        values.push(current.val.clone());
        node = current.next.as_deref();
    }
    render(&values)
}

/// Decode `[[..],[..]]` into two independent heads.
pub fn deserialize_list_pair(
    raw: &str,
) -> Result<(Option<Box<ListNode>>, Option<Box<ListNode>>), MarshalError> {
    let mut parts = parse_sequence(raw)?.into_iter();
    let (first, second) = match (parts.next(), parts.next(), parts.next()) {
        (Some(Value::Array(a)), Some(Value::Array(b)), None) => (a, b),
        _ => {
            return Err(MarshalError::Malformed(
                "a list pair must hold exactly two sequences".to_string(),
            ))
        }
    };
    Ok((list_from_values(first)?, list_from_values(second)?))
}

/// Queue-driven level-order build. Children are consumed two at a time for
/// each dequeued node; `null` children are skipped and never enqueued.
pub fn deserialize_tree(raw: &str) -> Result<Option<Box<TreeNode>>, MarshalError> {
    let values = parse_sequence(raw)?;
    for val in &values {
        ensure_scalar(val)?;
    }
    if values.first().map_or(true, Value::is_null) {
        return match values.iter().position(|v| !v.is_null()) {
            Some(at) => Err(orphan(at)),
            None => Ok(None),
        };
    }

    // Resolve child positions first, then assemble owned boxes bottom-up.
    let mut children: Vec<(Option<usize>, Option<usize>)> = vec![(None, None); values.len()];
    let mut queue = VecDeque::from([0usize]);
    let mut i = 1;
    while i < values.len() {
        let Some(parent) = queue.pop_front() else {
            break;
        };
        if !values[i].is_null() {
            children[parent].0 = Some(i);
            queue.push_back(i);
        }
        i += 1;
        if i < values.len() && !values[i].is_null() {
            children[parent].1 = Some(i);
            queue.push_back(i);
        }
        i += 1;
    }
    // Values left over once the queue drains have no parent to attach to.
    if let Some(at) = (i..values.len()).find(|&at| !values[at].is_null()) {
        return Err(orphan(at));
    }

    Ok(assemble(values, &children))
}

fn orphan(at: usize) -> MarshalError {
    MarshalError::Malformed(format!("tree value at position {} has no parent", at))
}

/// Children always sit after their parent, so building from the back finds
/// every subtree ready to attach.
fn assemble(
    values: Vec<Value>,
    children: &[(Option<usize>, Option<usize>)],
) -> Option<Box<TreeNode>> {
    let mut built: Vec<Option<Box<TreeNode>>> = (0..values.len()).map(|_| None).collect();
    for (index, val) in values.into_iter().enumerate().rev() {
        if val.is_null() {
            continue;
        }
        let (left, right) = children[index];
        let node = Box::new(TreeNode {
            val,
            left: left.and_then(|i| built[i].take()),
            right: right.and_then(|i| built[i].take()),
        });
        built[index] = Some(node);
    }
    built.into_iter().next().flatten()
}

/// Breadth-first walk emitting `null` for every missing child, with the
/// trailing run of `null`s trimmed.
pub fn serialize_tree(root: &Option<Box<TreeNode>>) -> String {
    let mut values = Vec::new();
    let mut queue: VecDeque<Option<&TreeNode>> = VecDeque::from([root.as_deref()]);
    while let Some(slot) = queue.pop_front() {
        match slot {
            Some(node) => {
                values.push(node.val.clone());
                queue.push_back(node.left.as_deref());
                queue.push_back(node.right.as_deref());
            }
            None => values.push(Value::Null),
        }
    }
    while values.last().is_some_and(Value::is_null) {
        values.pop();
    }
    render(&values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn list_values(head: &Option<Box<ListNode>>) -> Vec<Value> {
        let mut out = Vec::new();
        let mut node = head.as_deref();
        while let Some(n) = node {
            out.push(n.val.clone());
            node = n.next.as_deref();
        }
        out
    }

    #[test]
    fn test_list_decode_order() {
        let head = deserialize_list("[1, 2, 3]").unwrap();
        assert_eq!(list_values(&head), vec![json!(1), json!(2), json!(3)]);
    }

    #[test]
    fn test_empty_list_is_none() {
        assert_eq!(deserialize_list("[]").unwrap(), None);
        assert_eq!(serialize_list(&None), "[]");
    }

    #[test]
    fn test_list_rejects_null_and_non_sequences() {
        assert!(deserialize_list("[1,null,3]").is_err());
        assert!(deserialize_list("42").is_err());
        assert!(deserialize_list("[1,").is_err());
        assert!(deserialize_list("[[1]]").is_err());
    }

    #[test]
    fn test_list_round_trip() {
        for raw in ["[]", "[7]", "[1,2,3,4,5]", "[\"a\",\"b\"]", "[-3,0,3]"] {
            let head = deserialize_list(raw).unwrap();
            assert_eq!(serialize_list(&head), raw);
        }
    }

    #[test]
    fn test_list_pair() {
        let (a, b) = deserialize_list_pair("[[1,2,4],[1,3,4]]").unwrap();
        assert_eq!(serialize_list(&a), "[1,2,4]");
        assert_eq!(serialize_list(&b), "[1,3,4]");

        let (a, b) = deserialize_list_pair("[[],[0]]").unwrap();
        assert!(a.is_none());
        assert_eq!(serialize_list(&b), "[0]");

        assert!(deserialize_list_pair("[[1]]").is_err());
        assert!(deserialize_list_pair("[[1],[2],[3]]").is_err());
        assert!(deserialize_list_pair("[1,2]").is_err());
    }

    #[test]
    fn test_tree_skips_null_children() {
        let root = deserialize_tree("[3,9,20,null,null,15,7]").unwrap().unwrap();
        assert_eq!(root.val, json!(3));
        let left = root.left.as_deref().unwrap();
        assert_eq!(left.val, json!(9));
        assert!(left.left.is_none() && left.right.is_none());
        let right = root.right.as_deref().unwrap();
        assert_eq!(right.val, json!(20));
        assert_eq!(right.left.as_deref().unwrap().val, json!(15));
        assert_eq!(right.right.as_deref().unwrap().val, json!(7));
    }

    #[test]
    fn test_tree_null_children_are_not_enqueued() {
        // 2's children come right after 1's, since 1's left child is missing
        let root = deserialize_tree("[1,null,2,3]").unwrap().unwrap();
        assert!(root.left.is_none());
        let two = root.right.as_deref().unwrap();
        assert_eq!(two.left.as_deref().unwrap().val, json!(3));
        assert!(two.right.is_none());
    }

    #[test]
    fn test_empty_tree() {
        assert_eq!(deserialize_tree("[]").unwrap(), None);
        assert_eq!(deserialize_tree("[null]").unwrap(), None);
        assert_eq!(serialize_tree(&None), "[]");
    }

    #[test]
    fn test_tree_serialize_trims_trailing_nulls() {
        let mut root = TreeNode::leaf(1);
        root.left = Some(Box::new(TreeNode::leaf(2)));
        assert_eq!(serialize_tree(&Some(Box::new(root))), "[1,2]");
    }

    #[test]
    fn test_tree_round_trip() {
        for raw in [
            "[]",
            "[1]",
            "[3,9,20,null,null,15,7]",
            "[1,null,2,3]",
            "[5,4,8,11,null,13,4,7,2,null,null,null,1]",
            "[1,2,3,4,5,6,7]",
        ] {
            let tree = deserialize_tree(raw).unwrap();
            assert_eq!(serialize_tree(&tree), raw, "round trip of {}", raw);
        }
    }

    #[test]
    fn test_tree_round_trip_normalizes_trailing_nulls() {
        let tree = deserialize_tree("[1,2,null,null,null]").unwrap();
        assert_eq!(serialize_tree(&tree), "[1,2]");
    }

    #[test]
    fn test_long_list_does_not_overflow_stack() {
        let values: Vec<String> = (0..100_000).map(|i| i.to_string()).collect();
        let raw = format!("[{}]", values.join(","));
        let head = deserialize_list(&raw).unwrap();
        assert_eq!(serialize_list(&head), raw);
        assert_eq!(head, deserialize_list(&raw).unwrap());
        drop(head);
    }

    #[test]
    fn test_skewed_tree_does_not_overflow_stack() {
        // Every node hangs off its parent's right slot.
        let mut parts = vec!["0".to_string()];
        for i in 1..100_000 {
            parts.push("null".to_string());
            parts.push(i.to_string());
        }
        let raw = format!("[{}]", parts.join(","));
        let root = deserialize_tree(&raw).unwrap();
        assert_eq!(serialize_tree(&root), raw);
        assert_eq!(root, deserialize_tree(&raw).unwrap());
        drop(root);
    }

    #[test]
    fn test_tree_equality_compares_shape() {
        let left = deserialize_tree("[1,2]").unwrap();
        let right = deserialize_tree("[1,null,2]").unwrap();
        assert_ne!(left, right);
    }

    #[test]
    fn test_tree_rejects_orphaned_values() {
        assert!(deserialize_tree("[null,1]").is_err());
        assert!(deserialize_tree("[1,null,null,2]").is_err());
        assert_eq!(serialize_tree(&deserialize_tree("[1,null,null,null]").unwrap()), "[1]");
    }

    #[test]
    fn test_tree_rejects_nested_values() {
        assert!(deserialize_tree("[1,[2]]").is_err());
        assert!(deserialize_tree("{\"a\":1}").is_err());
    }
}
