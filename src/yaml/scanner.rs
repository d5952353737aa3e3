use crate::yaml::node::Node;

/// Depth-first walk over a tree yielding every node with its path.
///
/// A collection is yielded before its children and each child subtree is
/// exhausted before its next sibling. Mapping children are paths of the form
/// `parent.key`, sequence children `parent[index]`. The scan is single-pass:
/// create a new scanner to walk the tree again.
#[derive(Debug)]
pub struct NodeScanner<'a> {
    root: Option<(&'a Node, String)>,
    stack: Vec<Frame<'a>>,
}

#[derive(Debug)]
struct Frame<'a> {
    node: &'a Node,
    path: String,
    next_child: usize,
}

impl<'a> Frame<'a> {
    fn new(node: &'a Node, path: String) -> Self {
        Self {
            node,
            path,
            next_child: 0,
        }
    }

    /// Move the child cursor forward, returning the child it passed.
    fn advance(&mut self) -> Option<(&'a Node, String)> {
        let index = self.next_child;
        let child = match self.node {
            Node::Scalar(_) => None,
            Node::Mapping(mapping) => mapping
                .entries
                .get(index)
                .map(|entry| (&entry.value, key_path(&self.path, &entry.key.value))),
            Node::Sequence(sequence) => sequence
                .items
                .get(index)
                .map(|item| (item, index_path(&self.path, index))),
        };
        if child.is_some() {
            self.next_child += 1;
        }
        child
    }
}

impl<'a> NodeScanner<'a> {
    pub fn new(root: &'a Node, root_path: impl Into<String>) -> Self {
        Self {
            root: Some((root, root_path.into())),
            stack: Vec::new(),
        }
    }
}

impl<'a> Iterator for NodeScanner<'a> {
    type Item = (&'a Node, String);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some((root, path)) = self.root.take() {
            self.stack.push(Frame::new(root, path.clone()));
            return Some((root, path));
        }

        while let Some(frame) = self.stack.last_mut() {
            match frame.advance() {
                Some((child, path)) => {
                    self.stack.push(Frame::new(child, path.clone()));
                    return Some((child, path));
                }
                None => {
                    self.stack.pop();
                }
            }
        }

        None
    }
}

/// `.a` + `b` -> `.a.b`; the root path `.` + `b` -> `.b`.
pub fn key_path(parent: &str, key: &str) -> String {
    format!("{}.{}", parent.trim_end_matches('.'), key)
}

pub fn index_path(parent: &str, index: usize) -> String {
    format!("{parent}[{index}]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::yaml::parse;

    fn paths(source: &str) -> Vec<String> {
        let root = parse(source).unwrap();
        NodeScanner::new(&root, ".").map(|(_, path)| path).collect()
    }

    #[test]
    fn walks_depth_first_in_document_order() {
        let source = "a:\n  foo: 1\n  bar: [x, y]\nb: z\n";
        assert_eq!(
            paths(source),
            vec![".", ".a", ".a.foo", ".a.bar", ".a.bar[0]", ".a.bar[1]", ".b"]
        );
    }

    #[test]
    fn sequence_root_paths() {
        assert_eq!(
            paths("- a: 1\n- b\n"),
            vec![".", ".[0]", ".[0].a", ".[1]"]
        );
    }

    #[test]
    fn custom_root_path() {
        let root = parse("image:\n  tag: v1\n").unwrap();
        let paths: Vec<String> = NodeScanner::new(&root, ".values")
            .map(|(_, path)| path)
            .collect();
        assert_eq!(paths, vec![".values", ".values.image", ".values.image.tag"]);
    }

    #[test]
    fn scalar_root_yields_once() {
        let root = parse("just text\n").unwrap();
        let mut scanner = NodeScanner::new(&root, ".");
        let (node, path) = scanner.next().unwrap();
        assert_eq!(path, ".");
        assert_eq!(node.as_scalar().unwrap().value, "just text");
        assert!(scanner.next().is_none());
        assert!(scanner.next().is_none());
    }

    #[test]
    fn yields_nodes_alongside_paths() {
        let root = parse("a:\n  b: leaf\n").unwrap();
        let leaf = NodeScanner::new(&root, ".")
            .find(|(_, path)| path == ".a.b")
            .map(|(node, _)| node)
            .unwrap();
        assert_eq!(leaf.as_scalar().unwrap().value, "leaf");
    }

    #[test]
    fn key_and_index_paths() {
        assert_eq!(key_path(".", "a"), ".a");
        assert_eq!(key_path(".a", "b"), ".a.b");
        assert_eq!(index_path(".a", 3), ".a[3]");
        assert_eq!(index_path(".", 0), ".[0]");
    }
}
