// Node definitions and codecs, one block per (language, structure).
// C++ and Java blocks rely on the tokenizer in the language helpers.

pub const JAVASCRIPT_LIST: &str = r#"class ListNode {
  constructor(val, next) {
    this.val = val === undefined ? 0 : val;
    this.next = next === undefined ? null : next;
  }
}

function deserializeList(raw) {
  const values = JSON.parse(raw);
  const dummy = new ListNode(0);
  let tail = dummy;
  for (const value of values) {
    tail.next = new ListNode(value);
    tail = tail.next;
  }
  return dummy.next;
}

function serializeList(head) {
  const values = [];
  let node = head;
  while (node !== null && node !== undefined) {
    values.push(node.val);
    node = node.next;
  }
  return JSON.stringify(values);
}"#;

pub const JAVASCRIPT_TREE: &str = r#"class TreeNode {
  constructor(val, left, right) {
    this.val = val === undefined ? 0 : val;
    this.left = left === undefined ? null : left;
    this.right = right === undefined ? null : right;
  }
}

function deserializeTree(raw) {
  const values = JSON.parse(raw);
  if (values.length === 0 || values[0] === null) {
    return null;
  }
  const root = new TreeNode(values[0]);
  const queue = [root];
  let head = 0;
  let i = 1;
  while (head < queue.length && i < values.length) {
    const node = queue[head++];
    if (i < values.length && values[i] !== null) {
      node.left = new TreeNode(values[i]);
      queue.push(node.left);
    }
    i++;
    if (i < values.length && values[i] !== null) {
      node.right = new TreeNode(values[i]);
      queue.push(node.right);
    }
    i++;
  }
  return root;
}

function serializeTree(root) {
  const values = [];
  const queue = [root];
  let head = 0;
  while (head < queue.length) {
    const node = queue[head++];
    if (node === null || node === undefined) {
      values.push(null);
      continue;
    }
    values.push(node.val);
    queue.push(node.left);
    queue.push(node.right);
  }
  while (values.length > 0 && values[values.length - 1] === null) {
    values.pop();
  }
  return JSON.stringify(values);
}"#;

pub const PYTHON_LIST: &str = r#"class ListNode:
    def __init__(self, val=0, next=None):
        self.val = val
        self.next = next


def deserialize_list(raw):
    dummy = ListNode()
    tail = dummy
    for value in json.loads(raw):
        tail.next = ListNode(value)
        tail = tail.next
    return dummy.next


def serialize_list(head):
    values = []
    while head is not None:
        values.append(head.val)
        head = head.next
    return json.dumps(values, separators=(",", ":"))"#;

pub const PYTHON_TREE: &str = r#"class TreeNode:
    def __init__(self, val=0, left=None, right=None):
        self.val = val
        self.left = left
        self.right = right


def deserialize_tree(raw):
    values = json.loads(raw)
    if not values or values[0] is None:
        return None
    root = TreeNode(values[0])
    queue = [root]
    head = 0
    i = 1
    while head < len(queue) and i < len(values):
        node = queue[head]
        head += 1
        if i < len(values) and values[i] is not None:
            node.left = TreeNode(values[i])
            queue.append(node.left)
        i += 1
        if i < len(values) and values[i] is not None:
            node.right = TreeNode(values[i])
            queue.append(node.right)
        i += 1
    return root


def serialize_tree(root):
    values = []
    queue = [root]
    head = 0
    while head < len(queue):
        node = queue[head]
        head += 1
        if node is None:
            values.append(None)
            continue
        values.append(node.val)
        queue.append(node.left)
        queue.append(node.right)
    while values and values[-1] is None:
        values.pop()
    return json.dumps(values, separators=(",", ":"))"#;

pub const CPP_LIST: &str = r#"struct ListNode {
    int val;
    ListNode* next;
    ListNode() : val(0), next(nullptr) {}
    ListNode(int x) : val(x), next(nullptr) {}
    ListNode(int x, ListNode* next) : val(x), next(next) {}
};

ListNode* deserializeList(const string& raw) {
    ListNode dummy;
    ListNode* tail = &dummy;
    for (const string& part : harness_split_top_level(raw)) {
        tail->next = new ListNode(stoi(part));
        tail = tail->next;
    }
    return dummy.next;
}

string serializeList(ListNode* head) {
    string out = "[";
    for (ListNode* node = head; node != nullptr; node = node->next) {
        if (node != head) {
            out += ",";
        }
        out += to_string(node->val);
    }
    return out + "]";
}"#;

pub const CPP_TREE: &str = r#"struct TreeNode {
    int val;
    TreeNode* left;
    TreeNode* right;
    TreeNode() : val(0), left(nullptr), right(nullptr) {}
    TreeNode(int x) : val(x), left(nullptr), right(nullptr) {}
    TreeNode(int x, TreeNode* left, TreeNode* right) : val(x), left(left), right(right) {}
};

// int node values can never reach this
const long long TREE_SENTINEL = LLONG_MIN;

vector<long long> harness_level_order(const string& raw) {
    vector<long long> values;
    for (const string& part : harness_split_top_level(raw)) {
        values.push_back(part == "null" ? TREE_SENTINEL : stoll(part));
    }
    return values;
}

TreeNode* deserializeTree(const string& raw) {
    vector<long long> values = harness_level_order(raw);
    if (values.empty() || values[0] == TREE_SENTINEL) {
        return nullptr;
    }
    TreeNode* root = new TreeNode(static_cast<int>(values[0]));
    queue<TreeNode*> pending;
    pending.push(root);
    size_t i = 1;
    while (!pending.empty() && i < values.size()) {
        TreeNode* node = pending.front();
        pending.pop();
        if (i < values.size() && values[i] != TREE_SENTINEL) {
            node->left = new TreeNode(static_cast<int>(values[i]));
            pending.push(node->left);
        }
        i++;
        if (i < values.size() && values[i] != TREE_SENTINEL) {
            node->right = new TreeNode(static_cast<int>(values[i]));
            pending.push(node->right);
        }
        i++;
    }
    return root;
}

string serializeTree(TreeNode* root) {
    vector<long long> values;
    queue<TreeNode*> pending;
    pending.push(root);
    while (!pending.empty()) {
        TreeNode* node = pending.front();
        pending.pop();
        if (node == nullptr) {
            values.push_back(TREE_SENTINEL);
            continue;
        }
        values.push_back(node->val);
        pending.push(node->left);
        pending.push(node->right);
    }
    while (!values.empty() && values.back() == TREE_SENTINEL) {
        values.pop_back();
    }
    string out = "[";
    for (size_t i = 0; i < values.size(); i++) {
        if (i > 0) {
            out += ",";
        }
        out += values[i] == TREE_SENTINEL ? string("null") : to_string(values[i]);
    }
    return out + "]";
}"#;

pub const JAVA_LIST: &str = r#"class ListNode {
    int val;
    ListNode next;

    ListNode() {}

    ListNode(int val) {
        this.val = val;
    }

    ListNode(int val, ListNode next) {
        this.val = val;
        this.next = next;
    }
}

class ListCodec {
    static ListNode deserialize(String raw) {
        ListNode dummy = new ListNode();
        ListNode tail = dummy;
        for (String part : Harness.splitTopLevel(raw)) {
            tail.next = new ListNode(Harness.parseInt(part));
            tail = tail.next;
        }
        return dummy.next;
    }

    static String serialize(ListNode head) {
        StringBuilder out = new StringBuilder("[");
        for (ListNode node = head; node != null; node = node.next) {
            if (node != head) {
                out.append(',');
            }
            out.append(node.val);
        }
        return out.append(']').toString();
    }
}"#;

pub const JAVA_TREE: &str = r#"class TreeNode {
    int val;
    TreeNode left;
    TreeNode right;

    TreeNode() {}

    TreeNode(int val) {
        this.val = val;
    }

    TreeNode(int val, TreeNode left, TreeNode right) {
        this.val = val;
        this.left = left;
        this.right = right;
    }
}

class TreeCodec {
    static TreeNode deserialize(String raw) {
        List<Integer> values = new ArrayList<>();
        for (String part : Harness.splitTopLevel(raw)) {
            Integer value = part.equals("null") ? null : Integer.valueOf(Harness.parseInt(part));
            values.add(value);
        }
        if (values.isEmpty() || values.get(0) == null) {
            return null;
        }
        TreeNode root = new TreeNode(values.get(0));
        Queue<TreeNode> pending = new LinkedList<>();
        pending.add(root);
        int i = 1;
        while (!pending.isEmpty() && i < values.size()) {
            TreeNode node = pending.poll();
            if (i < values.size() && values.get(i) != null) {
                node.left = new TreeNode(values.get(i));
                pending.add(node.left);
            }
            i++;
            if (i < values.size() && values.get(i) != null) {
                node.right = new TreeNode(values.get(i));
                pending.add(node.right);
            }
            i++;
        }
        return root;
    }

    static String serialize(TreeNode root) {
        List<Integer> values = new ArrayList<>();
        // LinkedList accepts null entries, ArrayDeque does not
        Queue<TreeNode> pending = new LinkedList<>();
        pending.add(root);
        while (!pending.isEmpty()) {
            TreeNode node = pending.poll();
            if (node == null) {
                values.add(null);
                continue;
            }
            values.add(node.val);
            pending.add(node.left);
            pending.add(node.right);
        }
        while (!values.isEmpty() && values.get(values.size() - 1) == null) {
            values.remove(values.size() - 1);
        }
        StringBuilder out = new StringBuilder("[");
        for (int i = 0; i < values.size(); i++) {
            if (i > 0) {
                out.append(',');
            }
            out.append(values.get(i) == null ? "null" : values.get(i).toString());
        }
        return out.append(']').toString();
    }
}"#;
