use crate::types::{FunctionSignature, Language, TestCase};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuestionError {
    #[error("question {0} allows no languages")]
    NoAllowedLanguages(String),
    #[error("question {question_id} has duplicate test case id {test_case_id}")]
    DuplicateTestCase {
        question_id: String,
        test_case_id: String,
    },
    #[error("question {question_id} has no starter code for primary language {language}")]
    MissingStarterCode {
        question_id: String,
        language: Language,
    },
    #[error("question {question_id} does not allow {language}")]
    LanguageNotAllowed {
        question_id: String,
        language: Language,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodingQuestion {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub problem_statement: String,
    pub points: u32,
    #[serde(default)]
    pub starter_code: BTreeMap<Language, String>,
    pub test_cases: Vec<TestCase>,
    pub allowed_languages: BTreeSet<Language>,
    /// Falls back to the first allowed language when absent.
    #[serde(default)]
    pub primary_language: Option<Language>,
    /// Explicit signature; when absent it is detected from the statement.
    #[serde(default)]
    pub function_signature: Option<FunctionSignature>,
}

impl CodingQuestion {
    pub fn primary_language(&self) -> Option<Language> {
        self.primary_language
            .or_else(|| self.allowed_languages.iter().next().copied())
    }

    pub fn visible_test_cases(&self) -> impl Iterator<Item = &TestCase> {
        self.test_cases.iter().filter(|tc| !tc.is_hidden)
    }

    pub fn hidden_test_cases(&self) -> impl Iterator<Item = &TestCase> {
        self.test_cases.iter().filter(|tc| tc.is_hidden)
    }

    /// Check the authoring invariants that grading relies on.
    pub fn validate(&self) -> Result<(), QuestionError> {
        if self.allowed_languages.is_empty() {
            return Err(QuestionError::NoAllowedLanguages(self.id.clone()));
        }

        let mut seen = HashSet::new();
        for tc in &self.test_cases {
            if !seen.insert(tc.id.as_str()) {
                return Err(QuestionError::DuplicateTestCase {
                    question_id: self.id.clone(),
                    test_case_id: tc.id.clone(),
                });
            }
        }

        if let Some(primary) = self.primary_language() {
            if !self.starter_code.contains_key(&primary) {
                return Err(QuestionError::MissingStarterCode {
                    question_id: self.id.clone(),
                    language: primary,
                });
            }
        }

        Ok(())
    }

    pub fn ensure_language_allowed(&self, language: Language) -> Result<(), QuestionError> {
        if self.allowed_languages.contains(&language) {
            Ok(())
        } else {
            Err(QuestionError::LanguageNotAllowed {
                question_id: self.id.clone(),
                language,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_case(id: &str, hidden: bool) -> TestCase {
        TestCase {
            id: id.to_string(),
            input: "[1, 2, 3]".to_string(),
            expected_output: "6".to_string(),
            is_hidden: hidden,
            input_type: None,
            output_type: None,
        }
    }

    fn make_question() -> CodingQuestion {
        CodingQuestion {
            id: "q1".to_string(),
            title: Some("Array Sum".to_string()),
            problem_statement: "Write function sumArray(nums)".to_string(),
            points: 10,
            starter_code: BTreeMap::from([(
                Language::JavaScript,
                "function sumArray(nums) {}".to_string(),
            )]),
            test_cases: vec![make_test_case("t1", false), make_test_case("t2", true)],
            allowed_languages: BTreeSet::from([Language::JavaScript, Language::Python]),
            primary_language: Some(Language::JavaScript),
            function_signature: None,
        }
    }

    #[test]
    fn test_valid_question() {
        assert_eq!(make_question().validate(), Ok(()));
    }

    #[test]
    fn test_empty_allowed_languages() {
        let mut question = make_question();
        question.allowed_languages.clear();
        assert_eq!(
            question.validate(),
            Err(QuestionError::NoAllowedLanguages("q1".to_string()))
        );
    }

    #[test]
    fn test_duplicate_test_case_ids() {
        let mut question = make_question();
        question.test_cases.push(make_test_case("t1", true));
        assert!(matches!(
            question.validate(),
            Err(QuestionError::DuplicateTestCase { test_case_id, .. }) if test_case_id == "t1"
        ));
    }

    #[test]
    fn test_missing_primary_starter_code() {
        let mut question = make_question();
        question.primary_language = Some(Language::Python);
        assert!(matches!(
            question.validate(),
            Err(QuestionError::MissingStarterCode { language: Language::Python, .. })
        ));
    }

    #[test]
    fn test_primary_language_fallback() {
        let mut question = make_question();
        question.primary_language = None;
        // BTreeSet ordering follows enum declaration order
        assert_eq!(question.primary_language(), Some(Language::JavaScript));
    }

    #[test]
    fn test_visible_and_hidden_partition() {
        let question = make_question();
        assert_eq!(question.visible_test_cases().count(), 1);
        assert_eq!(question.hidden_test_cases().count(), 1);
    }

    #[test]
    fn test_language_allowed() {
        let question = make_question();
        assert!(question.ensure_language_allowed(Language::Python).is_ok());
        assert!(question.ensure_language_allowed(Language::Java).is_err());
    }
}
