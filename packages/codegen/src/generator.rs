use crate::context::{GenerateOptions, GeneratorContext};
use jsxlab_animation::{is_animation_prop, motion_tag, resolve};
use jsxlab_parser::expression::escape_string;
use jsxlab_parser::{KnownImports, ParsedElement, FRAGMENT_TYPE, NUMERIC_ATTRIBUTES};
use std::collections::BTreeSet;
use tracing::{debug, instrument};

/// Tag of the container wrapped around animated external components
const MOTION_WRAPPER: &str = "motion.div";

/// Generate markup for `element` and its subtree, indented by `indent_level`
pub fn generate(element: &ParsedElement, indent_level: usize) -> String {
    generate_with_options(element, indent_level, &GenerateOptions::default())
}

#[instrument(skip_all, fields(root = %element.id, indent = indent_level))]
pub fn generate_with_options(
    element: &ParsedElement,
    indent_level: usize,
    options: &GenerateOptions,
) -> String {
    let ctx = GeneratorContext::new(options.clone(), indent_level);
    generate_element(element, &ctx);
    let output = ctx.get_output();
    debug!(bytes = output.len(), "generated markup");
    output
}

fn generate_element(element: &ParsedElement, ctx: &GeneratorContext) {
    let animation = element
        .animations
        .as_ref()
        .filter(|config| config.enabled)
        .map(resolve);

    match animation {
        Some(motion) if element.is_component() => {
            // Component props are opaque, so the animation goes on a wrapper
            let props = motion.jsx_props();
            ctx.add_indented(&format!("<{}", MOTION_WRAPPER));
            add_props(&props, ctx);
            ctx.add(">\n");
            ctx.indent();
            generate_tag(element, element.tag_name(), &[], ctx);
            ctx.dedent();
            ctx.add_line(&format!("</{}>", MOTION_WRAPPER));
        }
        Some(motion) => {
            let tag = motion_tag(element.tag_name());
            generate_tag(element, &tag, &motion.jsx_props(), ctx);
        }
        None => generate_tag(element, element.tag_name(), &[], ctx),
    }
}

fn generate_tag(
    element: &ParsedElement,
    tag: &str,
    motion_props: &[(String, String)],
    ctx: &GeneratorContext,
) {
    if element.element_type == FRAGMENT_TYPE && element.original_tag.is_none() {
        generate_fragment(element, ctx);
        return;
    }

    ctx.add_indented(&format!("<{}", tag));

    if let Some(class_name) = element.class_name.as_deref().filter(|c| !c.trim().is_empty()) {
        ctx.add(&format!(" className={}", quote_attribute(class_name)));
    }

    if !element.style.is_empty() {
        let entries = element
            .style
            .iter()
            .map(|(key, value)| format!("{}: \"{}\"", js_key(key), escape_string(value)))
            .collect::<Vec<_>>()
            .join(", ");
        ctx.add(&format!(" style={{{{ {} }}}}", entries));
    }

    let animated = !motion_props.is_empty();
    for (name, value) in &element.attributes {
        if animated && is_animation_prop(name) {
            continue;
        }
        ctx.add(" ");
        ctx.add(&format_attribute(name, value));
    }

    add_props(motion_props, ctx);
    close_tag(element, tag, ctx);
}

fn generate_fragment(element: &ParsedElement, ctx: &GeneratorContext) {
    ctx.add_indented("<");
    close_tag(element, "", ctx);
}

/// Finish the opening tag, then emit text, children and the closing tag
fn close_tag(element: &ParsedElement, tag: &str, ctx: &GeneratorContext) {
    let text = element
        .text_content
        .as_deref()
        .filter(|text| !text.trim().is_empty());

    match (text, element.children.is_empty()) {
        (None, true) if tag.is_empty() => ctx.add("></>\n"),
        (None, true) => ctx.add(" />\n"),
        (Some(text), true) => ctx.add(&format!(">{}</{}>\n", text, tag)),
        (text, false) => {
            ctx.add(">\n");
            ctx.indent();
            if let Some(text) = text {
                ctx.add_line(text);
            }
            for child in &element.children {
                generate_element(child, ctx);
            }
            ctx.dedent();
            ctx.add_line(&format!("</{}>", tag));
        }
    }
}

fn add_props(props: &[(String, String)], ctx: &GeneratorContext) {
    for (name, value) in props {
        ctx.add(&format!(" {}={{{}}}", name, value));
    }
}

/// `name="value"`, `name={expr}` or `name={120}` for numeric attributes
pub fn format_attribute(name: &str, value: &str) -> String {
    if is_expression(value) {
        return format!("{}={}", name, value);
    }
    if NUMERIC_ATTRIBUTES.contains(&name) && value.trim().parse::<f64>().is_ok() {
        return format!("{}={{{}}}", name, value.trim());
    }
    format!("{}={}", name, quote_attribute(value))
}

fn is_expression(value: &str) -> bool {
    value.len() >= 2 && value.starts_with('{') && value.ends_with('}')
}

/// Attribute strings cannot contain escapes, so pick a quote that fits
fn quote_attribute(value: &str) -> String {
    if !value.contains('"') {
        format!("\"{}\"", value)
    } else if !value.contains('\'') {
        format!("'{}'", value)
    } else {
        format!("{{\"{}\"}}", escape_string(value))
    }
}

fn js_key(key: &str) -> String {
    let is_ident = key
        .chars()
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        .unwrap_or(false)
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if is_ident {
        key.to_string()
    } else {
        format!("\"{}\"", escape_string(key))
    }
}

/// Generate a complete component module: imports, function body and markup
#[instrument(skip_all, fields(component = name))]
pub fn generate_module(
    name: &str,
    root: &ParsedElement,
    function_body: Option<&str>,
    imports: &KnownImports,
    options: &GenerateOptions,
) -> String {
    let ctx = GeneratorContext::new(options.clone(), 0);

    let mut statements = BTreeSet::new();
    if uses_motion(root) {
        statements.insert(format!(
            "import {{ motion }} from \"{}\";",
            options.motion_package
        ));
    }
    collect_imports(root, imports, &mut statements);
    for statement in &statements {
        ctx.add_line(statement);
    }
    if !statements.is_empty() {
        ctx.add("\n");
    }

    ctx.add_line(&format!("export default function {}() {{", name));
    ctx.indent();
    if let Some(body) = function_body.filter(|b| !b.trim().is_empty()) {
        for line in dedent_lines(body) {
            ctx.add_line(line);
        }
        ctx.add("\n");
    }
    ctx.add_line("return (");
    ctx.add(&generate_with_options(root, 2, options));
    ctx.add("\n");
    ctx.add_line(");");
    ctx.dedent();
    ctx.add_line("}");

    ctx.get_output()
}

/// Strip the indentation shared by every non-blank line after the first
fn dedent_lines(body: &str) -> Vec<&str> {
    let common = body
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    body.lines()
        .enumerate()
        .map(|(i, line)| {
            let line = line.trim_end();
            if i == 0 || line.len() < common {
                line.trim_start()
            } else {
                line.get(common..).unwrap_or_else(|| line.trim_start())
            }
        })
        .collect()
}

fn uses_motion(element: &ParsedElement) -> bool {
    element.has_enabled_animations()
        || element.tag_name().starts_with("motion.")
        || element.children.iter().any(|child| uses_motion(child))
}

fn collect_imports(element: &ParsedElement, imports: &KnownImports, out: &mut BTreeSet<String>) {
    if element.is_component() {
        if let Some(statement) = imports.import_statement(element.tag_name()) {
            out.insert(statement);
        }
    }
    for child in &element.children {
        collect_imports(child, imports, out);
    }
}
