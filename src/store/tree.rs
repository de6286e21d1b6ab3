//! Radix tree keyed by UTF-8 strings.
//!
//! # Layout
//! - Every edge carries a non-empty label; the root has an empty one
//! - Siblings differ in the first char of their label and are kept sorted
//! - Labels are only ever split on char boundaries
//!
//! # Traversal
//! `walk_prefix` visits a node's own entry before its children and children
//! in label order, which yields keys in lexicographic byte order.

/// A prefix tree mapping string keys to values.
#[derive(Debug)]
pub struct PrefixTree<V> {
    root: Node<V>,
    len: usize,
}

#[derive(Debug)]
struct Node<V> {
    label: String,
    value: Option<V>,
    children: Vec<Node<V>>,
}

impl<V> Node<V> {
    fn empty(label: String) -> Self {
        Self {
            label,
            value: None,
            children: Vec::new(),
        }
    }

    fn leaf(label: &str, value: V) -> Self {
        Self {
            label: label.to_string(),
            value: Some(value),
            children: Vec::new(),
        }
    }

    fn first_char(&self) -> Option<char> {
        self.label.chars().next()
    }

    fn child_index(&self, c: char) -> Result<usize, usize> {
        self.children
            .binary_search_by(|child| child.first_char().cmp(&Some(c)))
    }

    fn child(&self, c: char) -> Option<&Node<V>> {
        self.child_index(c).ok().map(|i| &self.children[i])
    }

    /// Cut this node's label at `at`, pushing the tail (with the current
    /// value and children) down into a single new child.
    fn split(&mut self, at: usize) {
        let tail = self.label.split_off(at);
        let mut lower = Node::empty(tail);
        lower.value = self.value.take();
        lower.children = std::mem::take(&mut self.children);
        self.children.push(lower);
    }

    fn insert(&mut self, rest: &str, value: V) -> Option<V> {
        let Some(c) = rest.chars().next() else {
            return self.value.replace(value);
        };

        match self.child_index(c) {
            Err(pos) => {
                self.children.insert(pos, Node::leaf(rest, value));
                None
            }
            Ok(pos) => {
                let child = &mut self.children[pos];
                let common = common_prefix_len(&child.label, rest);
                if common < child.label.len() {
                    child.split(common);
                }
                child.insert(&rest[common..], value)
            }
        }
    }

    fn walk<F>(&self, path: &mut String, visit: &mut F)
    where
        F: FnMut(&str, &V),
    {
        if let Some(value) = &self.value {
            visit(path, value);
        }
        for child in &self.children {
            let mark = path.len();
            path.push_str(&child.label);
            child.walk(path, visit);
            path.truncate(mark);
        }
    }
}

/// Length in bytes of the longest common prefix, always on a char boundary.
fn common_prefix_len(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, ca), cb)| ca != cb)
        .map(|((i, _), _)| i)
        .unwrap_or_else(|| a.len().min(b.len()))
}

impl<V> PrefixTree<V> {
    pub fn new() -> Self {
        Self {
            root: Node::empty(String::new()),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert `value` under `key`, returning the value it replaced.
    pub fn insert(&mut self, key: &str, value: V) -> Option<V> {
        let old = self.root.insert(key, value);
        if old.is_none() {
            self.len += 1;
        }
        old
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        let mut node = &self.root;
        let mut rest = key;
        while let Some(c) = rest.chars().next() {
            let child = node.child(c)?;
            rest = rest.strip_prefix(child.label.as_str())?;
            node = child;
        }
        node.value.as_ref()
    }

    /// Visit every entry whose key starts with `prefix`, in key order.
    pub fn walk_prefix<F>(&self, prefix: &str, mut visit: F)
    where
        F: FnMut(&str, &V),
    {
        let mut node = &self.root;
        let mut path = String::with_capacity(prefix.len());
        let mut rest = prefix;

        loop {
            let Some(c) = rest.chars().next() else {
                node.walk(&mut path, &mut visit);
                return;
            };
            let Some(child) = node.child(c) else {
                return;
            };

            if child.label.starts_with(rest) {
                // The prefix ends inside this edge: everything below matches.
                path.push_str(&child.label);
                child.walk(&mut path, &mut visit);
                return;
            }
            match rest.strip_prefix(child.label.as_str()) {
                Some(tail) => {
                    path.push_str(&child.label);
                    rest = tail;
                    node = child;
                }
                None => return,
            }
        }
    }
}

impl<V> Default for PrefixTree<V> {
    fn default() -> Self {
        Self::new()
    }
}
