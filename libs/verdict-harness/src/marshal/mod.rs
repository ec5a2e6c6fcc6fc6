//! Data-structure marshalling library.
//!
//! Every (language, structure) pair that can be marshalled has one
//! [`Fragment`]: the node type definition plus `deserialize`/`serialize`
//! functions written in the target language, and the expressions the driver
//! uses to call them. The table is plain data; the generator never branches
//! on language to produce marshalling code.

pub mod codec;
mod fragments;

use serde_json::Value;
use thiserror::Error;
use verdict_common::question::CodingQuestion;
use verdict_common::types::{DataStructureType, Language, TestCase};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MarshalError {
    #[error("malformed structural value: {0}")]
    Malformed(String),
}

/// Node graph a fragment defines. A list pair reuses the list fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StructureKind {
    LinkedList,
    BinaryTree,
}

impl StructureKind {
    pub fn for_type(ty: DataStructureType) -> Option<Self> {
        match ty {
            DataStructureType::LinkedList | DataStructureType::LinkedListPair => {
                Some(StructureKind::LinkedList)
            }
            DataStructureType::BinaryTree => Some(StructureKind::BinaryTree),
            _ => None,
        }
    }
}

/// Source text and call shapes for one (language, structure) pair.
///
/// `decode` and `encode` are handlebars snippets over `src` and `val`.
#[derive(Debug)]
pub struct Fragment {
    pub language: Language,
    pub kind: StructureKind,
    /// Marker for "no node" in this language's level-order buffer.
    pub sentinel: &'static str,
    pub definition: &'static str,
    pub native_type: &'static str,
    pub decode: &'static str,
    pub encode: &'static str,
    pub default_return: &'static str,
}

static FRAGMENTS: &[Fragment] = &[
    Fragment {
        language: Language::JavaScript,
        kind: StructureKind::LinkedList,
        sentinel: "null",
        definition: fragments::JAVASCRIPT_LIST,
        native_type: "",
        decode: "deserializeList({{{src}}})",
        encode: "serializeList({{{val}}})",
        default_return: "return null;",
    },
    Fragment {
        language: Language::JavaScript,
        kind: StructureKind::BinaryTree,
        sentinel: "null",
        definition: fragments::JAVASCRIPT_TREE,
        native_type: "",
        decode: "deserializeTree({{{src}}})",
        encode: "serializeTree({{{val}}})",
        default_return: "return null;",
    },
    Fragment {
        language: Language::Python,
        kind: StructureKind::LinkedList,
        sentinel: "None",
        definition: fragments::PYTHON_LIST,
        native_type: "",
        decode: "deserialize_list({{{src}}})",
        encode: "serialize_list({{{val}}})",
        default_return: "return None",
    },
    Fragment {
        language: Language::Python,
        kind: StructureKind::BinaryTree,
        sentinel: "None",
        definition: fragments::PYTHON_TREE,
        native_type: "",
        decode: "deserialize_tree({{{src}}})",
        encode: "serialize_tree({{{val}}})",
        default_return: "return None",
    },
    Fragment {
        language: Language::Cpp,
        kind: StructureKind::LinkedList,
        sentinel: "nullptr",
        definition: fragments::CPP_LIST,
        native_type: "ListNode*",
        decode: "deserializeList({{{src}}})",
        encode: "serializeList({{{val}}})",
        default_return: "return nullptr;",
    },
    Fragment {
        language: Language::Cpp,
        kind: StructureKind::BinaryTree,
        sentinel: "TREE_SENTINEL",
        definition: fragments::CPP_TREE,
        native_type: "TreeNode*",
        decode: "deserializeTree({{{src}}})",
        encode: "serializeTree({{{val}}})",
        default_return: "return nullptr;",
    },
    Fragment {
        language: Language::Java,
        kind: StructureKind::LinkedList,
        sentinel: "null",
        definition: fragments::JAVA_LIST,
        native_type: "ListNode",
        decode: "ListCodec.deserialize({{{src}}})",
        encode: "ListCodec.serialize({{{val}}})",
        default_return: "return null;",
    },
    Fragment {
        language: Language::Java,
        kind: StructureKind::BinaryTree,
        sentinel: "null",
        definition: fragments::JAVA_TREE,
        native_type: "TreeNode",
        decode: "TreeCodec.deserialize({{{src}}})",
        encode: "TreeCodec.serialize({{{val}}})",
        default_return: "return null;",
    },
];

/// Look up the fragment for a pair, if the language has one.
pub fn fragment(language: Language, kind: StructureKind) -> Option<&'static Fragment> {
    FRAGMENTS
        .iter()
        .find(|f| f.language == language && f.kind == kind)
}

pub fn supports(language: Language, ty: DataStructureType) -> bool {
    match StructureKind::for_type(ty) {
        Some(kind) => fragment(language, kind).is_some(),
        None => true,
    }
}

/// Re-encode authored structural text into its canonical form.
///
/// Primitive types are returned trimmed and otherwise untouched.
pub fn canonicalize(ty: DataStructureType, raw: &str) -> Result<String, MarshalError> {
    match ty {
        DataStructureType::LinkedList => Ok(codec::serialize_list(&codec::deserialize_list(raw)?)),
        DataStructureType::LinkedListPair => {
            let (a, b) = codec::deserialize_list_pair(raw)?;
            Ok(format!(
                "[{},{}]",
                codec::serialize_list(&a),
                codec::serialize_list(&b)
            ))
        }
        DataStructureType::BinaryTree => Ok(codec::serialize_tree(&codec::deserialize_tree(raw)?)),
        DataStructureType::Array => {
            let value: Value = serde_json::from_str(raw.trim())
                .map_err(|e| MarshalError::Malformed(e.to_string()))?;
            if value.is_array() {
                Ok(value.to_string())
            } else {
                Err(MarshalError::Malformed(format!("expected an array, got {}", value)))
            }
        }
        _ => Ok(raw.trim().to_string()),
    }
}

/// Check that a test case's structural text decodes under its declared types.
pub fn validate_test_case(tc: &TestCase) -> Result<(), MarshalError> {
    if let Some(ty) = tc.input_type.filter(DataStructureType::is_structural) {
        let first = tc
            .input
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or("[]");
        canonicalize(ty, first)
            .map_err(|e| MarshalError::Malformed(format!("test case {} input: {}", tc.id, e)))?;
    }
    if let Some(ty) = tc.output_type.filter(DataStructureType::is_structural) {
        canonicalize(ty, &tc.expected_output).map_err(|e| {
            MarshalError::Malformed(format!("test case {} expected output: {}", tc.id, e))
        })?;
    }
    Ok(())
}

/// Check every test case of a question before it is stored or graded.
pub fn validate_question(question: &CodingQuestion) -> Result<(), MarshalError> {
    question.test_cases.iter().try_for_each(validate_test_case)
}

/// Expected output as the harness would print it.
///
/// Structural outputs are re-encoded canonically so authored spacing does not
/// matter; anything else, or text that fails to decode, is only trimmed.
pub fn expected_output(tc: &TestCase) -> String {
    match tc.output_type.filter(DataStructureType::is_structural) {
        Some(ty) => canonicalize(ty, &tc.expected_output)
            .unwrap_or_else(|_| tc.expected_output.trim().to_string()),
        None => tc.expected_output.trim().to_string(),
    }
}
