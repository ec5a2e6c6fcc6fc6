// CLI commands for authoring and debugging questions
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use verdict_common::question::CodingQuestion;
use verdict_common::types::{FunctionSignature, Language, Submission, TestCase, TestCaseResult};
use verdict_harness::marshal;
use verdict_harness::{HarnessGenerator, TypeHints};
use verdict_runtime::{
    Grader, HttpScoreSink, LanguageConfigManager, RunOptions, RuntimeConfig, SandboxClient,
    ScoreSink, TestRunner,
};

fn load_question(path: &Path) -> Result<CodingQuestion> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let question: CodingQuestion = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse question {}", path.display()))?;
    question
        .validate()
        .with_context(|| format!("Invalid question {}", question.id))?;
    marshal::validate_question(&question)
        .with_context(|| format!("Invalid test cases in question {}", question.id))?;
    Ok(question)
}

fn read_code(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Split a comma-separated parameter list, dropping blanks.
pub fn split_params(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// The requested test case, or the first one when no id is given.
pub fn pick_test_case<'a>(question: &'a CodingQuestion, id: Option<&str>) -> Result<&'a TestCase> {
    match id {
        Some(id) => question
            .test_cases
            .iter()
            .find(|tc| tc.id == id)
            .with_context(|| format!("Test case '{}' not found in question {}", id, question.id)),
        None => question
            .test_cases
            .first()
            .with_context(|| format!("Question {} has no test cases", question.id)),
    }
}

/// Detect a function signature in a file
pub fn detect(file: &Path) -> Result<()> {
    let text = read_code(file)?;
    let generator = HarnessGenerator::new();
    match generator.detect_signature(&text) {
        Ok(signature) => {
            println!("{}", serde_json::to_string_pretty(&signature)?);
            Ok(())
        }
        Err(_) => bail!(
            "No function signature found in {}; pass one explicitly with `starter --name --params`",
            file.display()
        ),
    }
}

/// Print starter code for one language
pub fn starter(language: Language, name: &str, params: &str, hints: &TypeHints) -> Result<()> {
    let signature = FunctionSignature::new(name, split_params(params));
    let code = HarnessGenerator::new()
        .starter_code(language, &signature, hints)
        .with_context(|| format!("Failed to generate {} starter code", language))?;
    print!("{}", code);
    Ok(())
}

/// Print the assembled harness (or its stdin) for one test case
pub fn harness(
    question_path: &Path,
    language: Language,
    code_path: &Path,
    test_case_id: Option<&str>,
    emit_stdin: bool,
) -> Result<()> {
    let question = load_question(question_path)?;
    question.ensure_language_allowed(language)?;
    let code = read_code(code_path)?;
    let test_case = pick_test_case(&question, test_case_id)?;

    let generator = HarnessGenerator::new();
    let signature = match generator.question_signature(&question) {
        Ok(signature) => signature,
        Err(_) => generator
            .resolve_signature(&code, None)
            .context("No function signature in the question or the submission")?,
    };
    let harness = generator
        .build_harness(language, &signature, &code, test_case)
        .with_context(|| format!("Failed to build harness for test case {}", test_case.id))?;

    if emit_stdin {
        print!("{}", harness.stdin);
    } else {
        print!("{}", harness.source);
    }
    Ok(())
}

fn status_line(result: &TestCaseResult) -> String {
    let mark = if result.passed { "✅" } else { "❌" };
    let mut line = format!(
        "{} {:<12} {:<20} {}",
        mark,
        result.test_case_id,
        result.status.as_str(),
        result.execution_time_ms.map(|ms| format!("{}ms", ms)).unwrap_or_default()
    );
    if !result.passed {
        match (&result.actual_output, &result.error) {
            (_, Some(error)) => line.push_str(&format!("\n     error: {}", error.trim())),
            (Some(actual), None) => line.push_str(&format!(
                "\n     expected {:?}, got {:?}",
                result.expected_output,
                actual.trim()
            )),
            (None, None) => line.push_str("\n     no output"),
        }
    }
    line
}

/// Grade a submission end to end
pub async fn grade(
    question_path: &Path,
    language: Language,
    code_path: &Path,
    show_hidden: bool,
) -> Result<()> {
    let question = load_question(question_path)?;
    let code = read_code(code_path)?;

    let config = RuntimeConfig::from_env();
    let languages = LanguageConfigManager::load_or_builtin(&config.languages_file)?;
    let backend = SandboxClient::from_config(&config).context("Failed to build sandbox client")?;
    let runner = TestRunner::new(
        Arc::new(backend),
        Arc::new(HarnessGenerator::new()),
        languages,
        RunOptions::from_config(&config),
    );
    let sink = match &config.score_sink_url {
        Some(url) => Some(Arc::new(HttpScoreSink::new(url.as_str())?) as Arc<dyn ScoreSink>),
        None => None,
    };
    let grader = Grader::new(runner, sink);

    println!(
        "🚀 Grading {} against question {} ({} test cases) via {}",
        language,
        question.id,
        question.test_cases.len(),
        config.service_url
    );

    let submission = Submission {
        question_id: question.id.clone(),
        code,
        language,
    };
    let outcome = grader
        .grade(&question, &submission)
        .await
        .with_context(|| format!("Grading failed for question {}", question.id))?;

    let shown = if show_hidden {
        outcome.results.clone()
    } else {
        outcome.visible_results()
    };
    println!();
    for result in &shown {
        println!("{}", status_line(result));
    }
    let hidden = outcome.results.len() - outcome.visible_results().len();
    if hidden > 0 && !show_hidden {
        println!("   ({} hidden test case(s) not shown)", hidden);
    }

    let score = &outcome.score;
    println!(
        "\n📊 Score: {}/{} ({}%), {} of {} passed",
        score.score, score.max_score, score.percentage, score.passed_count, score.total_count
    );
    println!("🆔 Submission: {}", outcome.submission_id);
    Ok(())
}

/// List configured languages
pub fn list_languages() -> Result<()> {
    let config = RuntimeConfig::from_env();
    let languages = LanguageConfigManager::load_or_builtin(&config.languages_file)?;

    println!("📋 Configured Languages:\n");
    println!("{:<12} {:<24} {:<8} {:<12}", "NAME", "DISPLAY NAME", "ID", "FILE");
    println!("{}", "─".repeat(60));
    for name in languages.list_languages() {
        let language: Language = name.parse().map_err(|e: String| anyhow::anyhow!(e))?;
        let lang = languages.get_config(language)?;
        println!(
            "{:<12} {:<24} {:<8} {:<12}",
            lang.name, lang.display_name, lang.language_id, lang.file_name
        );
    }
    Ok(())
}
