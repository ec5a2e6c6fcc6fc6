/// Toolchain tests for generated harnesses
///
/// These run the assembled source for every full-support language through its
/// real interpreter or compiler and compare stdout with the canonical expected
/// output:
/// 1. Linked list in, linked list out
/// 2. Binary tree in, number out
/// 3. Binary tree in, binary tree out (sentinels inside the encoding)
/// 4. Linked-list pair in, linked list out
/// 5. Primitive array, string and boolean round trips

#[cfg(test)]
mod harness_toolchain_tests {
    use crate::generator::HarnessGenerator;
    use crate::marshal;
    use std::fs;
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use std::process::{Command, Stdio};
    use verdict_common::types::{DataStructureType, FunctionSignature, Language, TestCase};

    struct Case {
        function: &'static str,
        input: &'static str,
        expected: &'static str,
        input_type: Option<DataStructureType>,
        output_type: Option<DataStructureType>,
    }

    const CASES: &[Case] = &[
        Case {
            function: "reverseList",
            input: "[1,2,3,4,5]",
            expected: "[5,4,3,2,1]",
            input_type: Some(DataStructureType::LinkedList),
            output_type: Some(DataStructureType::LinkedList),
        },
        Case {
            function: "maxDepth",
            input: "[3,9,20,null,null,15,7]",
            expected: "3",
            input_type: Some(DataStructureType::BinaryTree),
            output_type: Some(DataStructureType::Number),
        },
        Case {
            function: "mirrorTree",
            input: "[1,2,3,4]",
            expected: "[1,3,2,null,null,null,4]",
            input_type: Some(DataStructureType::BinaryTree),
            output_type: Some(DataStructureType::BinaryTree),
        },
        Case {
            function: "mergeTwoLists",
            input: "[[1,2,4],[1,3,4]]",
            expected: "[1,1,2,3,4,4]",
            input_type: Some(DataStructureType::LinkedListPair),
            output_type: Some(DataStructureType::LinkedList),
        },
        Case {
            function: "sumArray",
            input: "[1, 2, 3, 4, 5]",
            expected: "15",
            input_type: Some(DataStructureType::Array),
            output_type: Some(DataStructureType::Number),
        },
        Case {
            function: "reverseString",
            input: "\"hello\"",
            expected: "olleh",
            input_type: Some(DataStructureType::String),
            output_type: Some(DataStructureType::String),
        },
        Case {
            function: "isEven",
            input: "4",
            expected: "true",
            input_type: Some(DataStructureType::Number),
            output_type: Some(DataStructureType::Boolean),
        },
    ];

    fn javascript(function: &str) -> &'static str {
        match function {
            "reverseList" => r#"function reverseList(head) {
  let prev = null;
  while (head) {
    const next = head.next;
    head.next = prev;
    prev = head;
    head = next;
  }
  return prev;
}"#,
            "maxDepth" => r#"function maxDepth(root) {
  if (!root) return 0;
  return 1 + Math.max(maxDepth(root.left), maxDepth(root.right));
}"#,
            "mirrorTree" => r#"function mirrorTree(root) {
  if (!root) return null;
  const left = mirrorTree(root.left);
  root.left = mirrorTree(root.right);
  root.right = left;
  return root;
}"#,
            "mergeTwoLists" => r#"function mergeTwoLists(a, b) {
  const dummy = new ListNode(0);
  let tail = dummy;
  while (a && b) {
    if (a.val <= b.val) {
      tail.next = a;
      a = a.next;
    } else {
      tail.next = b;
      b = b.next;
    }
    tail = tail.next;
  }
  tail.next = a || b;
  return dummy.next;
}"#,
            "sumArray" => "function sumArray(nums) {\n  return nums.reduce((a, b) => a + b, 0);\n}",
            "reverseString" => "function reverseString(s) {\n  return s.split('').reverse().join('');\n}",
            _ => "function isEven(n) {\n  return n % 2 === 0;\n}",
        }
    }

    fn python(function: &str) -> &'static str {
        match function {
            "reverseList" => r#"def reverseList(head):
    prev = None
    while head:
        head.next, prev, head = prev, head, head.next
    return prev"#,
            "maxDepth" => r#"def maxDepth(root):
    if root is None:
        return 0
    return 1 + max(maxDepth(root.left), maxDepth(root.right))"#,
            "mirrorTree" => r#"def mirrorTree(root):
    if root is None:
        return None
    root.left, root.right = mirrorTree(root.right), mirrorTree(root.left)
    return root"#,
            "mergeTwoLists" => r#"def mergeTwoLists(a, b):
    dummy = ListNode()
    tail = dummy
    while a and b:
        if a.val <= b.val:
            tail.next, a = a, a.next
        else:
            tail.next, b = b, b.next
        tail = tail.next
    tail.next = a or b
    return dummy.next"#,
            "sumArray" => "def sumArray(nums):\n    return sum(nums)",
            "reverseString" => "def reverseString(s):\n    return s[::-1]",
            _ => "def isEven(n):\n    return n % 2 == 0",
        }
    }

    fn cpp(function: &str) -> &'static str {
        match function {
            "reverseList" => r#"ListNode* reverseList(ListNode* head) {
    ListNode* prev = nullptr;
    while (head) {
        ListNode* next = head->next;
        head->next = prev;
        prev = head;
        head = next;
    }
    return prev;
}"#,
            "maxDepth" => r#"int maxDepth(TreeNode* root) {
    if (!root) return 0;
    return 1 + max(maxDepth(root->left), maxDepth(root->right));
}"#,
            "mirrorTree" => r#"TreeNode* mirrorTree(TreeNode* root) {
    if (!root) return nullptr;
    TreeNode* left = mirrorTree(root->left);
    root->left = mirrorTree(root->right);
    root->right = left;
    return root;
}"#,
            "mergeTwoLists" => r#"ListNode* mergeTwoLists(ListNode* a, ListNode* b) {
    ListNode dummy;
    ListNode* tail = &dummy;
    while (a && b) {
        if (a->val <= b->val) {
            tail->next = a;
            a = a->next;
        } else {
            tail->next = b;
            b = b->next;
        }
        tail = tail->next;
    }
    tail->next = a ? a : b;
    return dummy.next;
}"#,
            "sumArray" => r#"int sumArray(vector<int>& nums) {
    int total = 0;
    for (int n : nums) total += n;
    return total;
}"#,
            "reverseString" => r#"string reverseString(string s) {
    reverse(s.begin(), s.end());
    return s;
}"#,
            _ => "bool isEven(int n) {\n    return n % 2 == 0;\n}",
        }
    }

    fn java(function: &str) -> &'static str {
        match function {
            "reverseList" => r#"class Solution {
    public ListNode reverseList(ListNode head) {
        ListNode prev = null;
        while (head != null) {
            ListNode next = head.next;
            head.next = prev;
            prev = head;
            head = next;
        }
        return prev;
    }
}"#,
            "maxDepth" => r#"class Solution {
    public int maxDepth(TreeNode root) {
        if (root == null) return 0;
        return 1 + Math.max(maxDepth(root.left), maxDepth(root.right));
    }
}"#,
            "mirrorTree" => r#"class Solution {
    public TreeNode mirrorTree(TreeNode root) {
        if (root == null) return null;
        TreeNode left = mirrorTree(root.left);
        root.left = mirrorTree(root.right);
        root.right = left;
        return root;
    }
}"#,
            "mergeTwoLists" => r#"class Solution {
    public ListNode mergeTwoLists(ListNode a, ListNode b) {
        ListNode dummy = new ListNode();
        ListNode tail = dummy;
        while (a != null && b != null) {
            if (a.val <= b.val) {
                tail.next = a;
                a = a.next;
            } else {
                tail.next = b;
                b = b.next;
            }
            tail = tail.next;
        }
        tail.next = a != null ? a : b;
        return dummy.next;
    }
}"#,
            "sumArray" => r#"class Solution {
    public int sumArray(int[] nums) {
        int total = 0;
        for (int n : nums) total += n;
        return total;
    }
}"#,
            "reverseString" => r#"class Solution {
    public String reverseString(String s) {
        return new StringBuilder(s).reverse().toString();
    }
}"#,
            _ => r#"class Solution {
    public boolean isEven(int n) {
        return n % 2 == 0;
    }
}"#,
        }
    }

    fn workdir(language: Language, function: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "verdict-harness-{}-{}-{}",
            std::process::id(),
            language,
            function
        ));
        fs::create_dir_all(&dir).expect("Failed to create work dir");
        dir
    }

    fn run(command: &mut Command, stdin: &str) -> String {
        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("Failed to start toolchain");
        child
            .stdin
            .take()
            .expect("stdin is piped")
            .write_all(stdin.as_bytes())
            .expect("Failed to write stdin");
        let output = child.wait_with_output().expect("Failed to wait for toolchain");
        assert!(
            output.status.success(),
            "toolchain failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).into_owned()
    }

    fn compile(command: &mut Command) {
        let output = command.output().expect("Failed to start compiler");
        assert!(
            output.status.success(),
            "compilation failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }

    /// Write, build and run one harness; returns its stdout.
    fn execute(language: Language, dir: &Path, source: &str, stdin: &str) -> String {
        match language {
            Language::JavaScript => {
                let file = dir.join("script.js");
                fs::write(&file, source).expect("Failed to write source");
                run(Command::new("node").arg(&file), stdin)
            }
            Language::Python => {
                let file = dir.join("script.py");
                fs::write(&file, source).expect("Failed to write source");
                run(Command::new("python3").arg(&file), stdin)
            }
            Language::Cpp => {
                let file = dir.join("main.cpp");
                let binary = dir.join("main");
                fs::write(&file, source).expect("Failed to write source");
                compile(Command::new("g++").arg("-std=c++17").arg(&file).arg("-o").arg(&binary));
                run(&mut Command::new(&binary), stdin)
            }
            Language::Java => {
                let file = dir.join("Main.java");
                fs::write(&file, source).expect("Failed to write source");
                compile(Command::new("javac").arg("-d").arg(dir).arg(&file));
                run(Command::new("java").arg("-cp").arg(dir).arg("Main"), stdin)
            }
            Language::Ruby => unreachable!("ruby has no structural fragments"),
        }
    }

    fn check_language(language: Language, solution: fn(&str) -> &'static str) {
        let generator = HarnessGenerator::new();
        for (n, case) in CASES.iter().enumerate() {
            let tc = TestCase {
                id: format!("case-{}", n),
                input: case.input.to_string(),
                expected_output: case.expected.to_string(),
                is_hidden: false,
                input_type: case.input_type,
                output_type: case.output_type,
            };
            let signature = FunctionSignature::new(case.function, vec![]);
            let harness = generator
                .build_harness(language, &signature, solution(case.function), &tc)
                .expect("Failed to build harness");

            let dir = workdir(language, case.function);
            let stdout = execute(language, &dir, &harness.source, &harness.stdin);
            let _ = fs::remove_dir_all(&dir);

            assert_eq!(
                stdout.trim(),
                marshal::expected_output(&tc),
                "{} {} printed the wrong value",
                language,
                case.function
            );
        }
    }

    /// Test: JavaScript harnesses under node
    #[test]
    #[ignore] // Requires node
    fn test_javascript_harnesses_run() {
        check_language(Language::JavaScript, javascript);
    }

    /// Test: Python harnesses under python3
    #[test]
    #[ignore] // Requires python3
    fn test_python_harnesses_run() {
        check_language(Language::Python, python);
    }

    /// Test: C++ harnesses under g++
    #[test]
    #[ignore] // Requires g++
    fn test_cpp_harnesses_run() {
        check_language(Language::Cpp, cpp);
    }

    /// Test: Java harnesses under javac/java
    #[test]
    #[ignore] // Requires a JDK
    fn test_java_harnesses_run() {
        check_language(Language::Java, java);
    }
}
