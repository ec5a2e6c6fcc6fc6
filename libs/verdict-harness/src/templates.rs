//! Per-language starter and driver templates.
//!
//! Templates are handlebars strings rendered with HTML escaping disabled.
//! They must not contain a literal `{{` outside of placeholders.

use regex::Regex;
use std::sync::LazyLock;
use verdict_common::types::{DataStructureType, Language};

// Plain decimal literals only; `inf` and `nan` stay strings.
static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+(\.\d+)?([eE][+-]?\d+)?$").unwrap());

/// Value shapes the driver knows how to pass to a student function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Array,
    Number,
    String,
    Boolean,
    List,
    Tree,
}

impl ValueKind {
    pub fn from_type(ty: DataStructureType) -> Self {
        match ty {
            DataStructureType::Array => ValueKind::Array,
            DataStructureType::Number => ValueKind::Number,
            DataStructureType::String => ValueKind::String,
            DataStructureType::Boolean => ValueKind::Boolean,
            DataStructureType::LinkedList | DataStructureType::LinkedListPair => ValueKind::List,
            DataStructureType::BinaryTree => ValueKind::Tree,
        }
    }

    /// Guess a primitive kind from one line of test text.
    pub fn infer(raw: &str) -> Self {
        let text = raw.trim();
        if text.starts_with('[') {
            ValueKind::Array
        } else if text.starts_with('"') {
            ValueKind::String
        } else if text == "true" || text == "false" {
            ValueKind::Boolean
        } else if NUMBER.is_match(text) {
            ValueKind::Number
        } else {
            ValueKind::String
        }
    }

    pub fn is_structural(&self) -> bool {
        matches!(self, ValueKind::List | ValueKind::Tree)
    }
}

/// How one primitive kind is spelled and decoded in a language.
#[derive(Debug)]
pub struct PrimitiveCodec {
    pub native_type: &'static str,
    pub param_type: &'static str,
    pub decode: &'static str,
    pub default_return: &'static str,
}

#[derive(Debug)]
pub struct LanguageTemplates {
    pub language: Language,
    pub prelude: &'static str,
    pub helpers: &'static str,
    pub starter: &'static str,
    pub driver: &'static str,
    /// `{{ty}}`, `{{name}}`
    pub parameter: &'static str,
    /// `{{index}}`
    pub line: &'static str,
    /// `{{src}}`, `{{index}}`
    pub pair_part: &'static str,
    /// `{{ty}}`, `{{var}}`, `{{expr}}`
    pub declaration: &'static str,
    /// `{{val}}`
    pub encode: &'static str,
    pub arg_prefix: &'static str,
    pub result_var: &'static str,
    pub array: PrimitiveCodec,
    pub number: PrimitiveCodec,
    pub string: PrimitiveCodec,
    pub boolean: PrimitiveCodec,
}

impl LanguageTemplates {
    pub fn primitive(&self, kind: ValueKind) -> Option<&PrimitiveCodec> {
        match kind {
            ValueKind::Array => Some(&self.array),
            ValueKind::Number => Some(&self.number),
            ValueKind::String => Some(&self.string),
            ValueKind::Boolean => Some(&self.boolean),
            ValueKind::List | ValueKind::Tree => None,
        }
    }
}

const fn dynamic(decode: &'static str) -> PrimitiveCodec {
    PrimitiveCodec {
        native_type: "",
        param_type: "",
        decode,
        default_return: "",
    }
}

pub fn for_language(language: Language) -> &'static LanguageTemplates {
    match language {
        Language::JavaScript => &JAVASCRIPT,
        Language::Python => &PYTHON,
        Language::Cpp => &CPP,
        Language::Java => &JAVA,
        Language::Ruby => &RUBY,
    }
}

static JAVASCRIPT: LanguageTemplates = LanguageTemplates {
    language: Language::JavaScript,
    prelude: "",
    helpers: r#"function harnessParseArg(raw) {
  try {
    return JSON.parse(raw);
  } catch (e) {
    return raw;
  }
}

function harnessFormat(value) {
  if (typeof value === 'string') {
    return value;
  }
  if (value === undefined) {
    return 'undefined';
  }
  return JSON.stringify(value);
}

function harnessPairPart(raw, index) {
  const parts = JSON.parse(raw);
  return JSON.stringify(parts[index] || []);
}"#,
    starter: r#"function {{name}}({{params}}) {
  // Write your code here
}
"#,
    driver: r#"const harnessLines = require('fs')
  .readFileSync(0, 'utf8')
  .split('\n')
  .map((line) => line.trim())
  .filter((line) => line.length > 0);
{{#each decls}}
{{{this}}}
{{/each}}
const harnessResult = {{name}}({{args}});
console.log({{{output}}});"#,
    parameter: "{{name}}",
    line: "harnessLines[{{index}}]",
    pair_part: "harnessPairPart({{{src}}}, {{index}})",
    declaration: "const {{var}} = {{{expr}}};",
    encode: "harnessFormat({{{val}}})",
    arg_prefix: "harnessArg",
    result_var: "harnessResult",
    array: dynamic("harnessParseArg({{{src}}})"),
    number: dynamic("harnessParseArg({{{src}}})"),
    string: dynamic("harnessParseArg({{{src}}})"),
    boolean: dynamic("harnessParseArg({{{src}}})"),
};

static PYTHON: LanguageTemplates = LanguageTemplates {
    language: Language::Python,
    prelude: "import json\nimport sys\nfrom typing import *",
    helpers: r#"def _harness_parse_arg(raw):
    try:
        return json.loads(raw)
    except ValueError:
        return raw


def _harness_format(value):
    if isinstance(value, str):
        return value
    return json.dumps(value, separators=(",", ":"))


def _harness_pair_part(raw, index):
    parts = json.loads(raw)
    return json.dumps(parts[index] if index < len(parts) else [])"#,
    starter: r#"def {{name}}({{params}}):
    # Write your code here
    pass
"#,
    driver: r#"_harness_lines = [line.strip() for line in sys.stdin.read().split("\n") if line.strip()]
{{#each decls}}
{{{this}}}
{{/each}}
_harness_result = {{name}}({{args}})
print({{{output}}})"#,
    parameter: "{{name}}",
    line: "_harness_lines[{{index}}]",
    pair_part: "_harness_pair_part({{{src}}}, {{index}})",
    declaration: "{{var}} = {{{expr}}}",
    encode: "_harness_format({{{val}}})",
    arg_prefix: "_harness_arg",
    result_var: "_harness_result",
    array: dynamic("_harness_parse_arg({{{src}}})"),
    number: dynamic("_harness_parse_arg({{{src}}})"),
    string: dynamic("_harness_parse_arg({{{src}}})"),
    boolean: dynamic("_harness_parse_arg({{{src}}})"),
};

static CPP: LanguageTemplates = LanguageTemplates {
    language: Language::Cpp,
    prelude: "#include <bits/stdc++.h>\nusing namespace std;",
    helpers: r#"string harness_trim(const string& s) {
    size_t start = s.find_first_not_of(" \t\r\n");
    if (start == string::npos) {
        return "";
    }
    size_t end = s.find_last_not_of(" \t\r\n");
    return s.substr(start, end - start + 1);
}

vector<string> harness_read_lines() {
    vector<string> lines;
    string line;
    while (getline(cin, line)) {
        line = harness_trim(line);
        if (!line.empty()) {
            lines.push_back(line);
        }
    }
    return lines;
}

vector<string> harness_split_top_level(const string& raw) {
    string s = harness_trim(raw);
    vector<string> parts;
    if (s.size() < 2 || s.front() != '[' || s.back() != ']') {
        return parts;
    }
    s = s.substr(1, s.size() - 2);
    int depth = 0;
    bool quoted = false;
    string current;
    for (char c : s) {
        if (c == '"') {
            quoted = !quoted;
        }
        if (!quoted && (c == '[' || c == '{')) {
            depth++;
        } else if (!quoted && (c == ']' || c == '}')) {
            depth--;
        }
        if (!quoted && depth == 0 && c == ',') {
            parts.push_back(harness_trim(current));
            current.clear();
        } else {
            current += c;
        }
    }
    if (!harness_trim(current).empty()) {
        parts.push_back(harness_trim(current));
    }
    return parts;
}

int harness_parse_int(const string& raw) {
    return stoi(harness_trim(raw));
}

string harness_parse_string(const string& raw) {
    string s = harness_trim(raw);
    if (s.size() >= 2 && s.front() == '"' && s.back() == '"') {
        return s.substr(1, s.size() - 2);
    }
    return s;
}

bool harness_parse_bool(const string& raw) {
    return harness_trim(raw) == "true";
}

vector<int> harness_parse_int_array(const string& raw) {
    vector<int> values;
    for (const string& part : harness_split_top_level(raw)) {
        values.push_back(harness_parse_int(part));
    }
    return values;
}

string harness_pair_part(const string& raw, size_t index) {
    vector<string> parts = harness_split_top_level(raw);
    return index < parts.size() ? parts[index] : string("[]");
}

string harness_format(int value) { return to_string(value); }
string harness_format(long value) { return to_string(value); }
string harness_format(long long value) { return to_string(value); }
string harness_format(unsigned int value) { return to_string(value); }
string harness_format(unsigned long value) { return to_string(value); }
string harness_format(unsigned long long value) { return to_string(value); }
string harness_format(bool value) { return value ? "true" : "false"; }
string harness_format(char value) { return string(1, value); }
string harness_format(const string& value) { return value; }
string harness_format(const char* value) { return string(value); }

string harness_format(double value) {
    ostringstream out;
    out << setprecision(15) << value;
    return out.str();
}

template <typename T>
string harness_format(const vector<T>& values);

string harness_format_element(const string& value) { return "\"" + value + "\""; }

template <typename T>
string harness_format_element(const T& value) { return harness_format(value); }

template <typename T>
string harness_format(const vector<T>& values) {
    string out = "[";
    for (size_t i = 0; i < values.size(); i++) {
        if (i > 0) {
            out += ",";
        }
        out += harness_format_element(values[i]);
    }
    return out + "]";
}"#,
    starter: r#"{{ret}} {{name}}({{params}}) {
    // Write your code here
    {{{default_return}}}
}
"#,
    driver: r#"int main() {
    vector<string> harness_lines = harness_read_lines();
{{#each decls}}
    {{{this}}}
{{/each}}
    auto harness_result = {{name}}({{args}});
    cout << {{{output}}} << endl;
    return 0;
}"#,
    parameter: "{{ty}} {{name}}",
    line: "harness_lines.at({{index}})",
    pair_part: "harness_pair_part({{{src}}}, {{index}})",
    declaration: "{{ty}} {{var}} = {{{expr}}};",
    encode: "harness_format({{{val}}})",
    arg_prefix: "harness_arg",
    result_var: "harness_result",
    array: PrimitiveCodec {
        native_type: "vector<int>",
        param_type: "vector<int>&",
        decode: "harness_parse_int_array({{{src}}})",
        default_return: "return {};",
    },
    number: PrimitiveCodec {
        native_type: "int",
        param_type: "int",
        decode: "harness_parse_int({{{src}}})",
        default_return: "return 0;",
    },
    string: PrimitiveCodec {
        native_type: "string",
        param_type: "string",
        decode: "harness_parse_string({{{src}}})",
        default_return: "return \"\";",
    },
    boolean: PrimitiveCodec {
        native_type: "bool",
        param_type: "bool",
        decode: "harness_parse_bool({{{src}}})",
        default_return: "return false;",
    },
};

static JAVA: LanguageTemplates = LanguageTemplates {
    language: Language::Java,
    prelude: "import java.util.*;\nimport java.io.*;",
    helpers: r#"class Harness {
    static List<String> readLines() throws IOException {
        BufferedReader reader = new BufferedReader(new InputStreamReader(System.in));
        List<String> lines = new ArrayList<>();
        String line;
        while ((line = reader.readLine()) != null) {
            if (!line.trim().isEmpty()) {
                lines.add(line.trim());
            }
        }
        return lines;
    }

    static List<String> splitTopLevel(String raw) {
        List<String> parts = new ArrayList<>();
        String s = raw.trim();
        if (s.length() < 2 || s.charAt(0) != '[' || s.charAt(s.length() - 1) != ']') {
            return parts;
        }
        s = s.substring(1, s.length() - 1);
        int depth = 0;
        boolean quoted = false;
        StringBuilder current = new StringBuilder();
        for (char c : s.toCharArray()) {
            if (c == '"') {
                quoted = !quoted;
            }
            if (!quoted && (c == '[' || c == '{')) {
                depth++;
            } else if (!quoted && (c == ']' || c == '}')) {
                depth--;
            }
            if (!quoted && depth == 0 && c == ',') {
                parts.add(current.toString().trim());
                current.setLength(0);
            } else {
                current.append(c);
            }
        }
        if (!current.toString().trim().isEmpty()) {
            parts.add(current.toString().trim());
        }
        return parts;
    }

    static int parseInt(String raw) {
        return Integer.parseInt(raw.trim());
    }

    static String parseString(String raw) {
        String s = raw.trim();
        if (s.length() >= 2 && s.startsWith("\"") && s.endsWith("\"")) {
            return s.substring(1, s.length() - 1);
        }
        return s;
    }

    static boolean parseBoolean(String raw) {
        return raw.trim().equals("true");
    }

    static int[] parseIntArray(String raw) {
        List<String> parts = splitTopLevel(raw);
        int[] values = new int[parts.size()];
        for (int i = 0; i < values.length; i++) {
            values[i] = parseInt(parts.get(i));
        }
        return values;
    }

    static String pairPart(String raw, int index) {
        List<String> parts = splitTopLevel(raw);
        return index < parts.size() ? parts.get(index) : "[]";
    }

    static String format(int value) {
        return Integer.toString(value);
    }

    static String format(long value) {
        return Long.toString(value);
    }

    static String format(double value) {
        return Double.toString(value);
    }

    static String format(boolean value) {
        return value ? "true" : "false";
    }

    static String format(String value) {
        return value;
    }

    static String format(int[] values) {
        StringBuilder out = new StringBuilder("[");
        for (int i = 0; i < values.length; i++) {
            if (i > 0) {
                out.append(',');
            }
            out.append(values[i]);
        }
        return out.append(']').toString();
    }

    static String format(long[] values) {
        StringBuilder out = new StringBuilder("[");
        for (int i = 0; i < values.length; i++) {
            if (i > 0) {
                out.append(',');
            }
            out.append(values[i]);
        }
        return out.append(']').toString();
    }

    static String format(List<?> values) {
        StringBuilder out = new StringBuilder("[");
        for (int i = 0; i < values.size(); i++) {
            if (i > 0) {
                out.append(',');
            }
            Object value = values.get(i);
            out.append(value instanceof String ? "\"" + value + "\"" : String.valueOf(value));
        }
        return out.append(']').toString();
    }

    static String format(Object value) {
        return String.valueOf(value);
    }
}"#,
    starter: r#"class Solution {
    public {{ret}} {{name}}({{params}}) {
        // Write your code here
        {{{default_return}}}
    }
}
"#,
    driver: r#"public class Main {
    public static void main(String[] args) throws Exception {
        List<String> harnessLines = Harness.readLines();
{{#each decls}}
        {{{this}}}
{{/each}}
        var harnessResult = new Solution().{{name}}({{args}});
        System.out.println({{{output}}});
    }
}"#,
    parameter: "{{ty}} {{name}}",
    line: "harnessLines.get({{index}})",
    pair_part: "Harness.pairPart({{{src}}}, {{index}})",
    declaration: "{{ty}} {{var}} = {{{expr}}};",
    encode: "Harness.format({{{val}}})",
    arg_prefix: "harnessArg",
    result_var: "harnessResult",
    array: PrimitiveCodec {
        native_type: "int[]",
        param_type: "int[]",
        decode: "Harness.parseIntArray({{{src}}})",
        default_return: "return new int[0];",
    },
    number: PrimitiveCodec {
        native_type: "int",
        param_type: "int",
        decode: "Harness.parseInt({{{src}}})",
        default_return: "return 0;",
    },
    string: PrimitiveCodec {
        native_type: "String",
        param_type: "String",
        decode: "Harness.parseString({{{src}}})",
        default_return: "return \"\";",
    },
    boolean: PrimitiveCodec {
        native_type: "boolean",
        param_type: "boolean",
        decode: "Harness.parseBoolean({{{src}}})",
        default_return: "return false;",
    },
};

// Primitive types only: there are no Ruby marshalling fragments.
static RUBY: LanguageTemplates = LanguageTemplates {
    language: Language::Ruby,
    prelude: "require 'json'",
    helpers: r#"def harness_parse_arg(raw)
  JSON.parse(raw)
rescue JSON::ParserError
  raw
end

def harness_format(value)
  value.is_a?(String) ? value : JSON.generate(value)
end

def harness_pair_part(raw, index)
  JSON.generate(JSON.parse(raw)[index] || [])
end"#,
    starter: r#"def {{name}}({{params}})
  # Write your code here
end
"#,
    driver: r#"harness_lines = STDIN.read.split("\n").map(&:strip).reject(&:empty?)
{{#each decls}}
{{{this}}}
{{/each}}
harness_result = {{name}}({{args}})
puts {{{output}}}"#,
    parameter: "{{name}}",
    line: "harness_lines[{{index}}]",
    pair_part: "harness_pair_part({{{src}}}, {{index}})",
    declaration: "{{var}} = {{{expr}}}",
    encode: "harness_format({{{val}}})",
    arg_prefix: "harness_arg",
    result_var: "harness_result",
    array: dynamic("harness_parse_arg({{{src}}})"),
    number: dynamic("harness_parse_arg({{{src}}})"),
    string: dynamic("harness_parse_arg({{{src}}})"),
    boolean: dynamic("harness_parse_arg({{{src}}})"),
};
