//! Tree rendering functionality for debugging and visualization.
//!
//! Forests are lazy and may be enormous, so rendering is always bounded by
//! an explicit depth.

use super::Tree;

impl<T> Tree<T>
where
    T: Clone + std::fmt::Display + 'static,
{
    /// Render the tree down to `max_depth` levels of shrinks.
    pub fn render(&self, max_depth: usize) -> String {
        let mut result = String::new();
        result.push_str(&format!("{}\n", self.value));
        self.render_recursive(&mut result, "", max_depth, 0);
        result
    }

    fn render_recursive(
        &self,
        result: &mut String,
        prefix: &str,
        max_depth: usize,
        current_depth: usize,
    ) {
        if current_depth >= max_depth {
            return;
        }

        let children: Vec<Tree<T>> = self.shrinks.iter().collect();
        for (i, child) in children.iter().enumerate() {
            let is_last = i == children.len() - 1;
            result.push_str(prefix);
            result.push_str(if is_last { "└── " } else { "├── " });
            result.push_str(&format!("{}\n", child.value));

            let child_prefix = if is_last {
                format!("{prefix}    ")
            } else {
                format!("{prefix}│   ")
            };
            child.render_recursive(result, &child_prefix, max_depth, current_depth + 1);
        }
    }

    /// Render the tree compactly, values only, down to `max_depth`.
    pub fn render_compact(&self, max_depth: usize) -> String {
        if max_depth == 0 || !self.has_shrinks() {
            format!("{}", self.value)
        } else {
            let children: Vec<String> = self
                .shrinks
                .iter()
                .map(|child| child.render_compact(max_depth - 1))
                .collect();
            format!("{}[{}]", self.value, children.join(", "))
        }
    }
}
