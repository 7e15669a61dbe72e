use crate::ast::{ParsedElement, FRAGMENT_TYPE, ROOT_ID};
use crate::error::{ParseError, ParseResult};
use crate::expression::{format_number, parse_expression, unquote, Expr};
use crate::id_generator::IdGenerator;
use crate::imports::{is_component_tag, KnownImports};
use crate::tokenizer::{tokenize, SpannedToken, Token};
use std::ops::Range;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Attributes whose numeric expression values are stored as bare numbers
pub const NUMERIC_ATTRIBUTES: &[&str] = &["width", "height", "size", "stroke-width", "strokeWidth"];

/// Result of parsing one component source
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutput {
    pub root: ParsedElement,
    /// Code preceding the returned markup (hooks, handlers, constants)
    pub function_body: Option<String>,
}

enum AttrValue<'src> {
    Literal(String),
    Expression(&'src str),
    Flag,
}

/// Parser for JSX-like markup
pub struct Parser<'a> {
    tokens: Vec<SpannedToken<'a>>,
    pos: usize,
    end: usize,
    imports: &'a KnownImports,
    id_generator: &'a mut IdGenerator,
}

impl<'a> Parser<'a> {
    /// Tokenize the element starting at `start` (which must point at `<`)
    pub fn new(
        source: &'a str,
        start: usize,
        imports: &'a KnownImports,
        id_generator: &'a mut IdGenerator,
    ) -> ParseResult<Self> {
        let stream = tokenize(source, start)?;
        Ok(Self {
            tokens: stream.tokens,
            pos: 0,
            end: stream.end,
            imports,
            id_generator,
        })
    }

    /// Parse the root element
    pub fn parse_root(&mut self) -> ParseResult<ParsedElement> {
        self.parse_element(None)
    }

    /// Byte offset just past the root element
    pub fn end(&self) -> usize {
        self.end
    }

    fn parse_element(&mut self, parent: Option<&str>) -> ParseResult<ParsedElement> {
        let is_root = parent.is_none();
        let open_span = self.peek_span();
        self.expect(Token::OpenTag, "'<'")?;

        let id = if is_root {
            ROOT_ID.to_string()
        } else {
            self.id_generator.new_id()
        };

        // `<>` opens a fragment
        if self.match_token(Token::TagEnd) {
            let mut element = ParsedElement::new(id, FRAGMENT_TYPE);
            element.is_root_fragment = is_root;
            element.parent = parent.map(str::to_string);
            self.parse_children(&mut element, "")?;
            return Ok(element);
        }

        let tag = self.expect_ident()?;
        let mut element = self.create_element(id, &tag, open_span)?;
        element.parent = parent.map(str::to_string);

        loop {
            match self.peek() {
                Some((Token::Ident(_), _)) => {
                    let name = self.expect_ident()?;
                    let value = if self.match_token(Token::Equals) {
                        self.parse_attribute_value()?
                    } else {
                        AttrValue::Flag
                    };
                    apply_attribute(&mut element, &name, value)?;
                }
                Some((Token::Expression(inner), span)) => {
                    let message = if inner.trim_start().starts_with("...") {
                        "Spread attributes are not supported"
                    } else {
                        "Expected attribute name before expression"
                    };
                    return Err(ParseError::invalid_syntax(span.clone(), message));
                }
                Some((Token::SelfClose, _)) => {
                    self.advance();
                    return Ok(element);
                }
                Some((Token::TagEnd, _)) => {
                    self.advance();
                    self.parse_children(&mut element, &tag)?;
                    return Ok(element);
                }
                _ => {
                    return Err(ParseError::unexpected_token(
                        self.peek_span(),
                        "attribute, '>' or '/>'",
                        self.format_peek(),
                    ))
                }
            }
        }
    }

    fn create_element(
        &self,
        id: String,
        tag: &str,
        span: Range<usize>,
    ) -> ParseResult<ParsedElement> {
        if tag.starts_with('.') || tag.ends_with('.') {
            return Err(ParseError::invalid_syntax(
                span,
                format!("Invalid tag name '{}'", tag),
            ));
        }

        if is_component_tag(tag) {
            let mut element = ParsedElement::new(id, tag);
            element.component_info = self.imports.component_info(tag);
            return Ok(element);
        }

        // motion.div renders as a div
        match tag.rsplit_once('.') {
            Some((_, base)) => {
                let mut element = ParsedElement::new(id, base);
                element.original_tag = Some(tag.to_string());
                Ok(element)
            }
            None => Ok(ParsedElement::new(id, tag)),
        }
    }

    fn parse_attribute_value(&mut self) -> ParseResult<AttrValue<'a>> {
        match self.advance() {
            Some((Token::String(literal), _)) => Ok(AttrValue::Literal(unquote(literal))),
            Some((Token::Expression(inner), _)) => Ok(AttrValue::Expression(inner)),
            Some((token, span)) => Err(ParseError::unexpected_token(
                span,
                "attribute value",
                token.to_string(),
            )),
            None => Err(ParseError::unexpected_eof("attribute value")),
        }
    }

    fn parse_children(&mut self, element: &mut ParsedElement, tag: &str) -> ParseResult<()> {
        let mut text = String::new();

        loop {
            match self.advance() {
                Some((Token::Text(raw), _)) => text.push_str(raw),
                Some((Token::Expression(inner), _)) => {
                    if !is_comment_only(inner) {
                        text.push('{');
                        text.push_str(inner.trim());
                        text.push('}');
                    }
                }
                Some((Token::OpenTag, _)) => {
                    self.pos -= 1;
                    text.push(' ');
                    let child = self.parse_element(Some(&element.id))?;
                    element.children.push(Arc::new(child));
                }
                Some((Token::CloseTagOpen, span)) => {
                    let found = match self.peek() {
                        Some((Token::Ident(name), _)) => {
                            let name = name.to_string();
                            self.advance();
                            name
                        }
                        _ => String::new(),
                    };
                    if found != tag {
                        return Err(ParseError::MismatchedTag {
                            span: span.start..self.peek_span().end,
                            expected: tag.to_string(),
                            found,
                        });
                    }
                    self.expect(Token::TagEnd, "'>'")?;
                    break;
                }
                Some((token, span)) => {
                    return Err(ParseError::unexpected_token(
                        span,
                        "child content",
                        token.to_string(),
                    ))
                }
                None => return Err(ParseError::unexpected_eof(format!("</{}>", tag))),
            }
        }

        let text = collapse_whitespace(&text);
        if !text.is_empty() {
            element.text_content = Some(text);
        }
        Ok(())
    }

    // Helper methods

    fn peek(&self) -> Option<&SpannedToken<'a>> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<SpannedToken<'a>> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn check(&self, token: Token) -> bool {
        if let Some((t, _)) = self.peek() {
            std::mem::discriminant(t) == std::mem::discriminant(&token)
        } else {
            false
        }
    }

    fn match_token(&mut self, token: Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token, expected: &str) -> ParseResult<()> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else if self.peek().is_none() {
            Err(ParseError::unexpected_eof(expected))
        } else {
            Err(ParseError::unexpected_token(
                self.peek_span(),
                expected,
                self.format_peek(),
            ))
        }
    }

    fn expect_ident(&mut self) -> ParseResult<String> {
        match self.peek() {
            Some((Token::Ident(name), _)) => {
                let name = name.to_string();
                self.advance();
                Ok(name)
            }
            Some(_) => Err(ParseError::unexpected_token(
                self.peek_span(),
                "tag or attribute name",
                self.format_peek(),
            )),
            None => Err(ParseError::unexpected_eof("tag or attribute name")),
        }
    }

    fn peek_span(&self) -> Range<usize> {
        self.peek()
            .map(|(_, span)| span.clone())
            .unwrap_or(self.end..self.end)
    }

    fn format_peek(&self) -> String {
        self.peek()
            .map(|(token, _)| token.to_string())
            .unwrap_or_else(|| "end of input".to_string())
    }
}

fn apply_attribute(element: &mut ParsedElement, name: &str, value: AttrValue) -> ParseResult<()> {
    match (name, value) {
        ("className" | "class", AttrValue::Literal(classes)) => {
            element.class_name = Some(classes);
        }
        ("className" | "class", AttrValue::Expression(inner)) => {
            match parse_expression(inner) {
                Ok(Expr::String { value }) => element.class_name = Some(value),
                _ => {
                    element
                        .attributes
                        .insert("className".to_string(), format!("{{{}}}", inner.trim()));
                }
            }
        }
        ("style", AttrValue::Literal(css)) => {
            for (property, value) in parse_css_declarations(&css) {
                element.style.insert(property, value);
            }
        }
        ("style", AttrValue::Expression(inner)) => match parse_expression(inner) {
            Ok(Expr::Object { entries }) => {
                for (key, value) in entries {
                    element.style.insert(camel_case(&key), style_value(&value));
                }
            }
            _ => {
                element
                    .attributes
                    .insert("style".to_string(), format!("{{{}}}", inner.trim()));
            }
        },
        (name, AttrValue::Literal(value)) => {
            element.attributes.insert(name.to_string(), value);
        }
        (name, AttrValue::Expression(inner)) => {
            let stored = match parse_expression(inner) {
                Ok(Expr::Number { value }) if NUMERIC_ATTRIBUTES.contains(&name) => {
                    format_number(value)
                }
                Ok(Expr::String { value }) => value,
                _ => format!("{{{}}}", inner.trim()),
            };
            element.attributes.insert(name.to_string(), stored);
        }
        (name, AttrValue::Flag) => {
            element
                .attributes
                .insert(name.to_string(), "{true}".to_string());
        }
    }
    Ok(())
}

fn style_value(value: &Expr) -> String {
    match value {
        Expr::String { value } => value.clone(),
        Expr::Number { value } => format_number(*value),
        other => other.to_string(),
    }
}

/// `color: red; font-size: 12px` → `[(color, red), (fontSize, 12px)]`
pub fn parse_css_declarations(css: &str) -> Vec<(String, String)> {
    css.split(';')
        .filter_map(|declaration| {
            let (property, value) = declaration.split_once(':')?;
            let property = property.trim();
            let value = value.trim();
            if property.is_empty() || value.is_empty() {
                return None;
            }
            Some((camel_case(property), value.to_string()))
        })
        .collect()
}

/// `background-color` → `backgroundColor`. Custom properties (`--x`) are kept as-is.
pub fn camel_case(property: &str) -> String {
    if property.starts_with("--") {
        return property.to_string();
    }
    let mut out = String::with_capacity(property.len());
    let mut upper = false;
    for c in property.chars() {
        if c == '-' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_comment_only(inner: &str) -> bool {
    let trimmed = inner.trim();
    trimmed.is_empty()
        || (trimmed.starts_with("/*") && trimmed.ends_with("*/"))
        || trimmed.starts_with("//")
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Locate the root markup element. `return (<...` wins; otherwise the first
/// `<` that starts a tag in expression position (not a comparison).
pub fn find_markup_start(source: &str) -> Option<usize> {
    let bytes = source.as_bytes();

    let mut search = 0;
    while let Some(found) = source[search..].find("return") {
        let at = search + found;
        let after = at + "return".len();
        search = after;
        if at > 0 && is_ident_byte(bytes[at - 1]) {
            continue;
        }
        let mut i = after;
        while i < bytes.len() && (bytes[i].is_ascii_whitespace() || bytes[i] == b'(') {
            i += 1;
        }
        if bytes.get(i) == Some(&b'<') {
            return Some(i);
        }
    }

    bytes.iter().enumerate().find_map(|(i, &b)| {
        if b != b'<' {
            return None;
        }
        let opens_tag = matches!(bytes.get(i + 1), Some(c) if c.is_ascii_alphabetic() || *c == b'>');
        let operand_before = source[..i]
            .trim_end()
            .bytes()
            .last()
            .map(|c| is_ident_byte(c) || c == b')' || c == b']')
            .unwrap_or(false);
        (opens_tag && !operand_before).then_some(i)
    })
}

/// Code between the function header and the returned markup
fn extract_function_body(prefix: &str) -> Option<String> {
    let mut body = prefix.trim_end().trim_end_matches('(').trim_end();
    if let Some(stripped) = body.strip_suffix("return") {
        if !stripped.bytes().last().map(is_ident_byte).unwrap_or(false) {
            body = stripped;
        }
    }

    let body = match header_end(body) {
        Some(end) => match body[end..].find('{') {
            Some(brace) => &body[end + brace + 1..],
            None => "",
        },
        None => body,
    };

    let body = body.trim();
    (!body.is_empty()).then(|| body.to_string())
}

fn header_end(prefix: &str) -> Option<usize> {
    let function = prefix.find("function");
    let arrow = prefix.find("=>");
    match (function, arrow) {
        (Some(f), Some(a)) if a < f => Some(a + 2),
        (Some(f), _) => Some(skip_params(prefix, f + "function".len())),
        (None, Some(a)) => Some(a + 2),
        (None, None) => None,
    }
}

/// Offset just past the parenthesized parameter list following `from`
fn skip_params(source: &str, from: usize) -> usize {
    let Some(open) = source[from..].find('(').map(|i| from + i) else {
        return from;
    };
    let mut depth = 0usize;
    for (i, b) in source.bytes().enumerate().skip(open) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return i + 1;
                }
            }
            _ => {}
        }
    }
    from
}

/// Parse with no external components
pub fn parse(source: &str) -> ParseResult<ParseOutput> {
    parse_with_imports(source, &KnownImports::default())
}

/// Parse, resolving capitalized tags against `imports`
pub fn parse_with_imports(source: &str, imports: &KnownImports) -> ParseResult<ParseOutput> {
    let mut id_generator = IdGenerator::new(source);
    parse_with_generator(source, imports, &mut id_generator)
}

/// Parse using a caller-owned id generator, so later inserts never reuse an id
#[instrument(skip(source, imports, id_generator), fields(len = source.len()))]
pub fn parse_with_generator(
    source: &str,
    imports: &KnownImports,
    id_generator: &mut IdGenerator,
) -> ParseResult<ParseOutput> {
    if source.trim().is_empty() {
        debug!("empty input, using default root");
        return Ok(ParseOutput {
            root: ParsedElement::default_root(),
            function_body: None,
        });
    }

    let start = find_markup_start(source).ok_or_else(|| {
        ParseError::invalid_syntax(0..source.len(), "No markup element found")
    })?;

    let mut parser = Parser::new(source, start, imports, id_generator)?;
    let root = parser.parse_root()?;
    let function_body = extract_function_body(&source[..start]);

    debug!(
        nodes = root.node_count(),
        has_function_body = function_body.is_some(),
        "parsed markup"
    );

    Ok(ParseOutput {
        root,
        function_body,
    })
}
