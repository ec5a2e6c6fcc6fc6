//! Best-effort function signature detection.
//!
//! Scans free text (a problem statement, a title, or source code) for
//! something shaped like a function declaration in one of the supported
//! languages. Detection either yields a signature or nothing; it never
//! invents a name.

use regex::Regex;
use std::sync::LazyLock;
use verdict_common::types::FunctionSignature;

/// Pluggable detection strategy.
pub trait SignatureDetector: Send + Sync {
    /// All declarations found, in order of appearance.
    fn candidates(&self, text: &str) -> Vec<FunctionSignature>;

    fn detect(&self, text: &str) -> Option<FunctionSignature> {
        self.candidates(text).into_iter().next()
    }

    fn detect_named(&self, text: &str, name: &str) -> Option<FunctionSignature> {
        self.candidates(text).into_iter().find(|sig| sig.name == name)
    }
}

// Each pattern captures (name, raw parameter list).
static DECLARATION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // JavaScript: function name(a, b)
        Regex::new(r"\bfunction\s+([A-Za-z_$][\w$]*)\s*\(([^)]*)\)").unwrap(),
        // JavaScript: const name = (a, b) =>
        Regex::new(
            r"\b(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*=\s*(?:async\s*)?(?:function\s*)?\(([^)]*)\)",
        )
        .unwrap(),
        // Python / Ruby: def name(a, b)
        Regex::new(r"\bdef\s+([A-Za-z_]\w*[?!]?)\s*\(([^)]*)\)").unwrap(),
        // C++ / Java: int name(int a), vector<int> name(...), public static int[] name(...)
        Regex::new(
            r"\b(?:(?:public|private|protected|static|final|inline|const)\s+)*(?:unsigned\s+)?(?:int|long(?:\s+long)?|double|float|bool|boolean|void|char|string|String|auto|ListNode|TreeNode|(?:std::)?(?:vector|List|ArrayList|map|Map|set|Set)\s*<[^()]*?>+)(?:\s*[*&]\s*|\s*(?:\[\]\s*)+|\s+)([A-Za-z_]\w*)\s*\(([^)]*)\)",
        )
        .unwrap(),
        // Prose: "a function named twoSum(nums, target)"
        Regex::new(r"(?i:function|method)\s+(?i:called|named)\s+`?([A-Za-z_$][\w$]*)\s*\(([^)]*)\)")
            .unwrap(),
    ]
});

static ANNOTATED_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*{0,2}([A-Za-z_]\w*)\s*:[^:]").unwrap());

static TRAILING_IDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z_$][\w$]*)\s*(?:\[\s*\]\s*)*$").unwrap());

const RESERVED_NAMES: &[&str] = &[
    "if", "for", "while", "switch", "catch", "return", "main", "constructor", "function",
];

const RECEIVER_PARAMS: &[&str] = &["self", "cls"];

/// Regex-table detector covering the supported languages' declaration idioms.
#[derive(Debug, Default, Clone, Copy)]
pub struct PatternDetector;

impl SignatureDetector for PatternDetector {
    fn candidates(&self, text: &str) -> Vec<FunctionSignature> {
        let mut found: Vec<(usize, usize, FunctionSignature)> = Vec::new();
        for (rank, pattern) in DECLARATION_PATTERNS.iter().enumerate() {
            for caps in pattern.captures_iter(text) {
                let (Some(name), Some(params)) = (caps.get(1), caps.get(2)) else {
                    continue;
                };
                if RESERVED_NAMES.contains(&name.as_str()) {
                    continue;
                }
                found.push((
                    name.start(),
                    rank,
                    FunctionSignature::new(name.as_str(), parse_parameters(params.as_str())),
                ));
            }
        }
        // Earliest in the text wins; on a tie the more specific pattern does.
        found.sort_by_key(|(pos, rank, _)| (*pos, *rank));
        found.dedup_by_key(|(pos, _, _)| *pos);
        found.into_iter().map(|(_, _, sig)| sig).collect()
    }
}

/// Detect a signature with the default pattern table.
pub fn detect_function_signature(text: &str) -> Option<FunctionSignature> {
    PatternDetector.detect(text)
}

/// Split on top-level commas, then keep only each parameter's name.
pub fn parse_parameters(raw: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    for c in raw.chars() {
        match c {
            '<' | '[' | '(' | '{' => depth += 1,
            '>' | ']' | ')' | '}' => depth -= 1,
            _ => {}
        }
        if c == ',' && depth == 0 {
            pieces.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    pieces.push(current);

    pieces
        .iter()
        .filter_map(|piece| parameter_name(piece))
        .filter(|name| !RECEIVER_PARAMS.contains(&name.as_str()))
        .collect()
}

fn parameter_name(piece: &str) -> Option<String> {
    let without_default = piece.split('=').next().unwrap_or("").trim();
    if without_default.is_empty() {
        return None;
    }
    if let Some(caps) = ANNOTATED_PARAM.captures(without_default) {
        return Some(caps[1].to_string());
    }
    TRAILING_IDENT
        .captures(without_default)
        .map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(name: &str, params: &[&str]) -> FunctionSignature {
        FunctionSignature::new(name, params.iter().map(|p| p.to_string()).collect())
    }

    #[test]
    fn test_javascript_function() {
        let text = "Implement `function sumArray(nums) { }` that returns the total.";
        assert_eq!(detect_function_signature(text), Some(sig("sumArray", &["nums"])));
    }

    #[test]
    fn test_javascript_arrow() {
        let text = "const mergeTwoLists = (list1, list2) => { ... }";
        assert_eq!(
            detect_function_signature(text),
            Some(sig("mergeTwoLists", &["list1", "list2"]))
        );
    }

    #[test]
    fn test_python_def_with_annotations_and_self() {
        let text = "class Solution:\n    def twoSum(self, nums: List[int], target: int = 0) -> List[int]:\n";
        assert_eq!(
            detect_function_signature(text),
            Some(sig("twoSum", &["nums", "target"]))
        );
    }

    #[test]
    fn test_cpp_typed_declaration() {
        let text = "int maxDepth(TreeNode* root) {\n    return 0;\n}";
        assert_eq!(detect_function_signature(text), Some(sig("maxDepth", &["root"])));

        let text = "vector<int> twoSum(vector<int>& nums, int target);";
        assert_eq!(
            detect_function_signature(text),
            Some(sig("twoSum", &["nums", "target"]))
        );
    }

    #[test]
    fn test_cpp_generic_parameters_keep_commas() {
        let text = "bool check(map<int, int> counts, const std::string& word)";
        assert_eq!(
            detect_function_signature(text),
            Some(sig("check", &["counts", "word"]))
        );
    }

    #[test]
    fn test_java_method() {
        let text = "class Solution {\n    public int[] reverse(int[] values, int k) {\n    }\n}";
        assert_eq!(
            detect_function_signature(text),
            Some(sig("reverse", &["values", "k"]))
        );
    }

    #[test]
    fn test_prose_declaration() {
        let text = "Write a function named isPalindrome(s) that returns true for palindromes.";
        assert_eq!(detect_function_signature(text), Some(sig("isPalindrome", &["s"])));
    }

    #[test]
    fn test_no_parameters() {
        assert_eq!(
            detect_function_signature("def answer():\n    return 42"),
            Some(sig("answer", &[]))
        );
    }

    #[test]
    fn test_no_declaration_is_none() {
        let text = "Given an array of integers, return the sum of all its elements.";
        assert_eq!(detect_function_signature(text), None);
    }

    #[test]
    fn test_main_is_not_a_candidate() {
        assert_eq!(detect_function_signature("int main() { return 0; }"), None);
    }

    #[test]
    fn test_earliest_declaration_wins() {
        let text = "def helper(x):\n    pass\n\ndef solve(nums):\n    return helper(nums)";
        assert_eq!(detect_function_signature(text), Some(sig("helper", &["x"])));
        assert_eq!(
            PatternDetector.detect_named(text, "solve"),
            Some(sig("solve", &["nums"]))
        );
        assert_eq!(PatternDetector.candidates(text).len(), 2);
    }

    #[test]
    fn test_parse_parameters_variants() {
        assert_eq!(parse_parameters(""), Vec::<String>::new());
        assert_eq!(parse_parameters("...args"), vec!["args"]);
        assert_eq!(parse_parameters("int nums[], int n"), vec!["nums", "n"]);
        assert_eq!(parse_parameters("*args, **kwargs"), vec!["args", "kwargs"]);
        assert_eq!(parse_parameters("a=1, b = [1, 2]"), vec!["a", "b"]);
        assert_eq!(parse_parameters("String... words"), vec!["words"]);
    }
}
