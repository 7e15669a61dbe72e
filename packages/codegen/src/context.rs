use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// Options for source generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateOptions {
    /// One level of indentation
    pub indent: String,
    /// Package the `motion` primitives are imported from in generated modules
    pub motion_package: String,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
            motion_package: "framer-motion".to_string(),
        }
    }
}

/// Output buffer and indentation state shared while walking a tree
pub struct GeneratorContext {
    buffer: Rc<RefCell<String>>,
    indent_level: Rc<RefCell<usize>>,
    pub options: GenerateOptions,
}

impl GeneratorContext {
    pub fn new(options: GenerateOptions, indent_level: usize) -> Self {
        Self {
            buffer: Rc::new(RefCell::new(String::new())),
            indent_level: Rc::new(RefCell::new(indent_level)),
            options,
        }
    }

    pub fn add(&self, text: &str) {
        self.buffer.borrow_mut().push_str(text);
    }

    pub fn add_line(&self, text: &str) {
        self.add_indented(text);
        self.add("\n");
    }

    pub fn add_indented(&self, text: &str) {
        let indent = self.options.indent.repeat(*self.indent_level.borrow());
        let mut buffer = self.buffer.borrow_mut();
        buffer.push_str(&indent);
        buffer.push_str(text);
    }

    pub fn indent(&self) {
        *self.indent_level.borrow_mut() += 1;
    }

    pub fn dedent(&self) {
        let mut level = self.indent_level.borrow_mut();
        if *level > 0 {
            *level -= 1;
        }
    }

    /// Output with the trailing newline of the last line removed
    pub fn get_output(&self) -> String {
        let buffer = self.buffer.borrow();
        buffer.strip_suffix('\n').unwrap_or(&buffer).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indentation() {
        let ctx = GeneratorContext::new(GenerateOptions::default(), 1);
        ctx.add_line("<div>");
        ctx.indent();
        ctx.add_line("<p />");
        ctx.dedent();
        ctx.dedent();
        ctx.dedent();
        ctx.add_line("</div>");

        assert_eq!(ctx.get_output(), "  <div>\n    <p />\n</div>");
    }
}
