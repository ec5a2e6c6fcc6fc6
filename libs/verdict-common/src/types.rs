use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Languages a coding question can be answered in.
///
/// The set is closed: every generator template and marshalling fragment is
/// keyed by this enum, so adding a language is a table entry, not a new code
/// path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    Python,
    Cpp,
    Java,
    Ruby,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::JavaScript,
        Language::Python,
        Language::Cpp,
        Language::Java,
        Language::Ruby,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Cpp => "cpp",
            Language::Java => "java",
            Language::Ruby => "ruby",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "javascript" | "js" | "node" => Ok(Language::JavaScript),
            "python" | "py" | "python3" => Ok(Language::Python),
            "cpp" | "c++" => Ok(Language::Cpp),
            "java" => Ok(Language::Java),
            "ruby" | "rb" => Ok(Language::Ruby),
            other => Err(format!("unsupported language: {}", other)),
        }
    }
}

/// Shape of a test case's input or output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataStructureType {
    Array,
    String,
    Number,
    Boolean,
    LinkedList,
    LinkedListPair,
    BinaryTree,
}

impl DataStructureType {
    /// Structural types need an explicit (de)serialization fragment.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            DataStructureType::LinkedList
                | DataStructureType::LinkedListPair
                | DataStructureType::BinaryTree
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataStructureType::Array => "array",
            DataStructureType::String => "string",
            DataStructureType::Number => "number",
            DataStructureType::Boolean => "boolean",
            DataStructureType::LinkedList => "linked-list",
            DataStructureType::LinkedListPair => "linked-list-pair",
            DataStructureType::BinaryTree => "binary-tree",
        }
    }
}

impl fmt::Display for DataStructureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub name: String,
    pub parameters: Vec<String>,
}

impl FunctionSignature {
    pub fn new(name: impl Into<String>, parameters: Vec<String>) -> Self {
        Self {
            name: name.into(),
            parameters,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub id: String,
    pub input: String,
    pub expected_output: String,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default)]
    pub input_type: Option<DataStructureType>,
    #[serde(default)]
    pub output_type: Option<DataStructureType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub question_id: String,
    pub code: String,
    pub language: Language,
}

/// Terminal classification of a single test case run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    Passed,
    WrongAnswer,
    CompilationError,
    RuntimeError,
    TimeLimitExceeded,
    /// The poll loop gave up before the service reported a terminal state.
    PollTimeout,
    TransportError,
    InternalError,
}

impl TestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Passed => "passed",
            TestStatus::WrongAnswer => "wrong_answer",
            TestStatus::CompilationError => "compilation_error",
            TestStatus::RuntimeError => "runtime_error",
            TestStatus::TimeLimitExceeded => "time_limit_exceeded",
            TestStatus::PollTimeout => "poll_timeout",
            TestStatus::TransportError => "transport_error",
            TestStatus::InternalError => "internal_error",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCaseResult {
    pub test_case_id: String,
    pub passed: bool,
    pub status: TestStatus,
    pub is_hidden: bool,
    pub input: String,
    pub expected_output: String,
    /// `None` when the service reported no output at all, as opposed to an
    /// empty string for a run that printed nothing.
    pub actual_output: Option<String>,
    pub execution_time_ms: Option<u64>,
    pub memory_kb: Option<u64>,
    pub error: Option<String>,
}

/// Keep only the results a test taker may see.
pub fn visible_results(results: &[TestCaseResult]) -> Vec<TestCaseResult> {
    results.iter().filter(|r| !r.is_hidden).cloned().collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRequest {
    pub question_id: String,
    pub code: String,
    pub language: Language,
    pub results: Vec<TestCaseResult>,
    pub total_test_cases: usize,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub question_id: String,
    pub score: u32,
    pub max_score: u32,
    pub percentage: u32,
    pub passed_count: usize,
    pub total_count: usize,
}
