//! Starter and harness code generation.
//!
//! **Starter code** is the stub shown to the test taker. **Harnesses** wrap a
//! submission at grading time: prelude, helpers, the marshalling fragments the
//! test case needs (each at most once), the submission verbatim, then a driver
//! that decodes stdin, calls the function and prints one line.
//!
//! Generation is a pure function of its inputs. Every language-specific piece
//! comes from [`templates`] and [`marshal`]; the assembly below is shared.

use handlebars::Handlebars;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;
use verdict_common::question::CodingQuestion;
use verdict_common::types::{DataStructureType, FunctionSignature, Language, TestCase};

use crate::marshal::{self, Fragment, StructureKind};
use crate::signature::{PatternDetector, SignatureDetector};
use crate::templates::{self, LanguageTemplates, ValueKind};

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("no function signature could be detected, one must be supplied")]
    SignatureRequired,
    #[error("{language} has no marshalling support for {structure}")]
    UnsupportedStructure {
        language: Language,
        structure: DataStructureType,
    },
    #[error("{0} cannot be used as an output type")]
    UnsupportedOutput(DataStructureType),
    #[error("template rendering failed: {0}")]
    Template(#[from] handlebars::RenderError),
}

/// Type information used to pick native types and marshalling code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeHints {
    #[serde(default)]
    pub input_type: Option<DataStructureType>,
    #[serde(default)]
    pub output_type: Option<DataStructureType>,
    #[serde(default)]
    pub sample_input: Option<String>,
    #[serde(default)]
    pub sample_output: Option<String>,
}

impl TypeHints {
    pub fn from_test_case(tc: &TestCase) -> Self {
        Self {
            input_type: tc.input_type,
            output_type: tc.output_type,
            sample_input: Some(tc.input.clone()),
            sample_output: Some(tc.expected_output.clone()),
        }
    }

    /// Hints taken from the question's first test case.
    pub fn from_question(question: &CodingQuestion) -> Self {
        question
            .test_cases
            .first()
            .map(Self::from_test_case)
            .unwrap_or_default()
    }
}

/// A ready-to-submit program and the stdin to feed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Harness {
    pub source: String,
    pub stdin: String,
}

// Where one call argument comes from.
#[derive(Debug, Clone, Copy)]
struct ArgSlot {
    line: usize,
    pair_part: Option<usize>,
    kind: ValueKind,
}

#[derive(Debug, Clone, Copy)]
struct KindCodec {
    native_type: &'static str,
    param_type: &'static str,
    decode: &'static str,
    default_return: &'static str,
}

pub struct HarnessGenerator {
    registry: Handlebars<'static>,
    detector: Box<dyn SignatureDetector>,
}

impl Default for HarnessGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl HarnessGenerator {
    pub fn new() -> Self {
        Self::with_detector(Box::new(PatternDetector))
    }

    pub fn with_detector(detector: Box<dyn SignatureDetector>) -> Self {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);
        Self { registry, detector }
    }

    /// Detect a signature in free text, or ask the caller for one.
    pub fn detect_signature(&self, text: &str) -> Result<FunctionSignature, GenerateError> {
        self.detector
            .detect(text)
            .ok_or(GenerateError::SignatureRequired)
    }

    /// Signature of the function a submission defines.
    ///
    /// With a `function_name` the matching declaration is preferred; if the
    /// detector cannot find it, the name is still trusted.
    pub fn resolve_signature(
        &self,
        code: &str,
        function_name: Option<&str>,
    ) -> Result<FunctionSignature, GenerateError> {
        match function_name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => Ok(self
                .detector
                .detect_named(code, name)
                .unwrap_or_else(|| FunctionSignature::new(name, Vec::new()))),
            None => self.detect_signature(code),
        }
    }

    /// Authored signature, else one detected in the statement or title.
    pub fn question_signature(
        &self,
        question: &CodingQuestion,
    ) -> Result<FunctionSignature, GenerateError> {
        if let Some(signature) = &question.function_signature {
            return Ok(signature.clone());
        }
        self.detector
            .detect(&question.problem_statement)
            .or_else(|| question.title.as_deref().and_then(|t| self.detector.detect(t)))
            .ok_or(GenerateError::SignatureRequired)
    }

    pub fn starter_code(
        &self,
        language: Language,
        signature: &FunctionSignature,
        hints: &TypeHints,
    ) -> Result<String, GenerateError> {
        let t = templates::for_language(language);
        required_fragments(language, hints)?;

        let lines = hints
            .sample_input
            .as_deref()
            .map(input_lines)
            .unwrap_or_default();
        let slots = plan_arguments(hints.input_type, &lines, signature.parameters.len());

        let mut params = Vec::with_capacity(signature.parameters.len());
        for (name, slot) in signature.parameters.iter().zip(&slots) {
            let codec = codec_for(language, t, slot.kind)?;
            params.push(self.render(t.parameter, &json!({ "ty": codec.param_type, "name": name }))?);
        }

        let ret = codec_for(language, t, return_kind(hints))?;
        self.render(
            t.starter,
            &json!({
                "name": signature.name,
                "params": params.join(", "),
                "ret": ret.native_type,
                "default_return": ret.default_return,
            }),
        )
    }

    pub fn starter_for_question(
        &self,
        question: &CodingQuestion,
        language: Language,
    ) -> Result<String, GenerateError> {
        let signature = self.question_signature(question)?;
        self.starter_code(language, &signature, &TypeHints::from_question(question))
    }

    /// Starter code for every allowed language, keyed by language.
    ///
    /// The primary language keeps the authored code; the rest are generated
    /// from the signature detected in it.
    pub fn all_starter_code(
        &self,
        primary_language: Language,
        primary_code: &str,
        allowed_languages: impl IntoIterator<Item = Language>,
        hints: &TypeHints,
    ) -> Result<BTreeMap<Language, String>, GenerateError> {
        let signature = self.detect_signature(primary_code)?;
        let mut out = BTreeMap::new();
        out.insert(primary_language, primary_code.to_string());
        for language in allowed_languages {
            if language == primary_language {
                continue;
            }
            out.insert(language, self.starter_code(language, &signature, hints)?);
        }
        Ok(out)
    }

    /// Wrap a submission so that it runs one test case end to end.
    pub fn build_harness(
        &self,
        language: Language,
        signature: &FunctionSignature,
        code: &str,
        test_case: &TestCase,
    ) -> Result<Harness, GenerateError> {
        let t = templates::for_language(language);
        let hints = TypeHints::from_test_case(test_case);
        let fragments = required_fragments(language, &hints)?;

        let lines = input_lines(&test_case.input);
        let slots = plan_arguments(hints.input_type, &lines, 0);

        let mut decls = Vec::with_capacity(slots.len());
        let mut args = Vec::with_capacity(slots.len());
        for (n, slot) in slots.iter().enumerate() {
            let codec = codec_for(language, t, slot.kind)?;
            let line = self.render(t.line, &json!({ "index": slot.line }))?;
            let src = match slot.pair_part {
                Some(part) => self.render(t.pair_part, &json!({ "src": line, "index": part }))?,
                None => line,
            };
            let expr = self.render(codec.decode, &json!({ "src": src }))?;
            let var = format!("{}{}", t.arg_prefix, n);
            decls.push(self.render(
                t.declaration,
                &json!({ "ty": codec.native_type, "var": var, "expr": expr }),
            )?);
            args.push(var);
        }

        let encode = match output_fragment(language, &hints)? {
            Some(fragment) => fragment.encode,
            None => t.encode,
        };
        let output = self.render(encode, &json!({ "val": t.result_var }))?;
        let driver = self.render(
            t.driver,
            &json!({
                "decls": decls,
                "name": signature.name,
                "args": args.join(", "),
                "output": output,
            }),
        )?;

        let mut sections: Vec<&str> = Vec::new();
        for part in [t.prelude, t.helpers] {
            if !part.is_empty() {
                sections.push(part);
            }
        }
        sections.extend(fragments.iter().map(|f| f.definition));
        sections.push(code.trim_end());
        sections.push(&driver);

        debug!(
            language = %language,
            function = %signature.name,
            test_id = %test_case.id,
            fragments = fragments.len(),
            "Assembled harness"
        );

        Ok(Harness {
            source: format!("{}\n", sections.join("\n\n")),
            stdin: test_case.input.clone(),
        })
    }

    fn render(&self, template: &str, data: &Value) -> Result<String, GenerateError> {
        Ok(self.registry.render_template(template, data)?)
    }
}

/// Non-empty, trimmed input lines. One line per argument.
pub fn input_lines(input: &str) -> Vec<&str> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

fn plan_arguments(
    input_type: Option<DataStructureType>,
    lines: &[&str],
    min_args: usize,
) -> Vec<ArgSlot> {
    let mut slots = Vec::new();
    let mut line = 0;
    while line < lines.len() || slots.len() < min_args {
        match (line, input_type) {
            (0, Some(DataStructureType::LinkedListPair)) => {
                for part in 0..2 {
                    slots.push(ArgSlot {
                        line,
                        pair_part: Some(part),
                        kind: ValueKind::List,
                    });
                }
            }
            (0, Some(ty)) => slots.push(ArgSlot {
                line,
                pair_part: None,
                kind: ValueKind::from_type(ty),
            }),
            _ => slots.push(ArgSlot {
                line,
                pair_part: None,
                kind: lines
                    .get(line)
                    .map_or(ValueKind::Number, |text| ValueKind::infer(text)),
            }),
        }
        line += 1;
    }
    slots
}

fn return_kind(hints: &TypeHints) -> ValueKind {
    match (hints.output_type, hints.sample_output.as_deref()) {
        (Some(ty), _) => ValueKind::from_type(ty),
        (None, Some(sample)) => ValueKind::infer(sample),
        (None, None) => ValueKind::Number,
    }
}

fn fragment_for(
    language: Language,
    ty: DataStructureType,
) -> Result<Option<&'static Fragment>, GenerateError> {
    match StructureKind::for_type(ty) {
        None => Ok(None),
        Some(kind) => marshal::fragment(language, kind)
            .map(Some)
            .ok_or(GenerateError::UnsupportedStructure {
                language,
                structure: ty,
            }),
    }
}

fn output_fragment(
    language: Language,
    hints: &TypeHints,
) -> Result<Option<&'static Fragment>, GenerateError> {
    match hints.output_type {
        Some(DataStructureType::LinkedListPair) => Err(GenerateError::UnsupportedOutput(
            DataStructureType::LinkedListPair,
        )),
        Some(ty) => fragment_for(language, ty),
        None => Ok(None),
    }
}

/// Fragments for the declared input then output type, without repeats.
fn required_fragments(
    language: Language,
    hints: &TypeHints,
) -> Result<Vec<&'static Fragment>, GenerateError> {
    let mut out: Vec<&'static Fragment> = Vec::new();
    let input = match hints.input_type {
        Some(ty) => fragment_for(language, ty)?,
        None => None,
    };
    let output = output_fragment(language, hints)?;
    for fragment in [input, output].into_iter().flatten() {
        if !out.iter().any(|f| f.kind == fragment.kind) {
            out.push(fragment);
        }
    }
    Ok(out)
}

fn codec_for(
    language: Language,
    t: &LanguageTemplates,
    kind: ValueKind,
) -> Result<KindCodec, GenerateError> {
    if let Some(p) = t.primitive(kind) {
        return Ok(KindCodec {
            native_type: p.native_type,
            param_type: p.param_type,
            decode: p.decode,
            default_return: p.default_return,
        });
    }
    let (structure, ty) = match kind {
        ValueKind::Tree => (StructureKind::BinaryTree, DataStructureType::BinaryTree),
        _ => (StructureKind::LinkedList, DataStructureType::LinkedList),
    };
    let fragment = marshal::fragment(language, structure).ok_or(
        GenerateError::UnsupportedStructure {
            language,
            structure: ty,
        },
    )?;
    Ok(KindCodec {
        native_type: fragment.native_type,
        param_type: fragment.native_type,
        decode: fragment.decode,
        default_return: fragment.default_return,
    })
}
