//! Signal.xml scanner
//!
//! Only `segment` elements matter, wherever they are in the tree. Everything else is checked for
//! being well formed (one root, balanced tags, unique attributes, valid references) and then
//! ignored. Comments, CDATA sections, processing instructions and the DOCTYPE never produce
//! segments. Entities are not resolved: the predefined ones and character references are
//! decoded, entities declared in the DOCTYPE are kept as written, anything else is an error.
use std::borrow::Cow;
use std::path::Path;
use nom::IResult;
use nom::error::{Error as NomError, ErrorKind};
use nom::branch::alt;
use nom::bytes::complete::{tag, take_till, take_until, take_while, take_while1};
use nom::character::complete::{char, multispace0, multispace1};
use nom::combinator::{map, opt, recognize};
use nom::multi::many0;
use nom::sequence::{delimited, pair, preceded, separated_pair, tuple};
use errors::*;

/// Name of the annotated span elements
pub const SEGMENT: &'static str = "segment";
/// Separator of the tags in a `features` attribute
pub const FEATURE_SEPARATOR: char = ';';

/// One annotated span of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Inclusive character offset, negative counts back from the end of the text
    pub start: i64,
    /// Exclusive character offset, negative counts back from the end of the text
    pub end: i64,
    /// Raw `;` separated tags
    pub features: String,
}

impl Segment {
    /// The signal label, which is the last of the feature tags
    pub fn feature(&self) -> &str {
        self.features.rsplit(FEATURE_SEPARATOR).next().unwrap_or("")
    }

    pub fn span(&self) -> (i64, i64) {
        (self.start, self.end)
    }
}

/// A start (or empty element) tag with its raw attribute values
#[derive(Debug, PartialEq, Eq)]
struct Tag<'a> {
    name: &'a str,
    attributes: Vec<(&'a str, &'a str)>,
    /// Written as `<name/>`
    empty: bool,
}

/// Anything starting with `<`
#[derive(Debug, PartialEq, Eq)]
enum Node<'a> {
    Start(Tag<'a>),
    End(&'a str),
    Doctype(&'a str),
    CData,
    /// Comments and processing instructions
    Misc,
}

/// Well-formedness state over one document
struct Scanner<'m> {
    markup: &'m str,
    path: &'m Path,
    open: Vec<&'m str>,
    roots: usize,
    entities: Vec<&'m str>,
}

impl<'m> Scanner<'m> {
    fn new(markup: &'m str, path: &'m Path) -> Self {
        Scanner { markup: markup, path: path, open: vec![], roots: 0, entities: vec![] }
    }

    /// `at` must be a slice of the markup
    fn malformed(&self, at: &str, info: String) -> Error {
        Error::MalformedMarkup {
            path: self.path.to_path_buf(),
            offset: at.as_ptr() as usize - self.markup.as_ptr() as usize,
            info: info,
        }
    }

    fn text(&self, text: &'m str) -> Result<()> {
        if self.open.is_empty() {
            if !text.trim().is_empty() {
                return Err(self.malformed(text, "text outside the root element".to_string()));
            }
            return Ok(());
        }
        unescape(text, &self.entities).map_err(|info| self.malformed(text, info))?;
        Ok(())
    }

    /// Open an element and decode its attributes
    fn start(&mut self, at: &'m str, tag: &Tag<'m>) -> Result<Vec<(&'m str, Cow<'m, str>)>> {
        if self.open.is_empty() {
            if self.roots > 0 {
                return Err(self.malformed(at, format!("second root element <{}>", tag.name)));
            }
            self.roots += 1;
        }
        let mut attributes: Vec<(&'m str, Cow<'m, str>)> = Vec::with_capacity(tag.attributes.len());
        for &(name, raw) in &tag.attributes {
            if attributes.iter().any(|&(seen, _)| seen == name) {
                return Err(self.malformed(at,
                    format!("attribute {} given twice on <{}>", name, tag.name)));
            }
            let value = unescape(raw, &self.entities).map_err(|info| self.malformed(raw, info))?;
            attributes.push((name, value));
        }
        if !tag.empty {
            self.open.push(tag.name);
        }
        Ok(attributes)
    }

    fn end(&mut self, at: &'m str, name: &'m str) -> Result<()> {
        match self.open.pop() {
            Some(open) if open == name => Ok(()),
            Some(open) => Err(self.malformed(at, format!("</{}> closes <{}>", name, open))),
            None => Err(self.malformed(at, format!("</{}> has no start tag", name))),
        }
    }

    fn doctype(&mut self, at: &'m str, doctype: &'m str) -> Result<()> {
        if self.roots > 0 {
            return Err(self.malformed(at, "DOCTYPE after the root element".to_string()));
        }
        self.entities.extend(declared_entities(doctype));
        Ok(())
    }

    fn cdata(&self, at: &'m str) -> Result<()> {
        if self.open.is_empty() {
            return Err(self.malformed(at, "CDATA outside the root element".to_string()));
        }
        Ok(())
    }

    fn finish(&self, at: &'m str) -> Result<()> {
        if let Some(open) = self.open.last() {
            return Err(self.malformed(at, format!("<{}> is never closed", open)));
        }
        if self.roots == 0 {
            return Err(self.malformed(at, "document has no root element".to_string()));
        }
        Ok(())
    }
}

/// Find every segment in a Signal.xml document, in document order
///
/// `path` is only used for error messages.
pub fn parse_segments(markup: &str, path: &Path) -> Result<Vec<Segment>> {
    let mut scanner = Scanner::new(markup, path);
    let mut segments = vec![];
    let mut rest = markup.trim_start_matches('\u{feff}');
    while let Some(idx) = rest.find('<') {
        scanner.text(&rest[..idx])?;
        rest = &rest[idx..];
        let (next, parsed) = node(rest).map_err(|_| {
            scanner.malformed(rest,
                format!("cannot parse {:?}", rest.chars().take(32).collect::<String>()))
        })?;
        match parsed {
            Node::Start(tag) => {
                let attributes = scanner.start(rest, &tag)?;
                if tag.name == SEGMENT {
                    segments.push(segment(&attributes, path)?);
                }
            }
            Node::End(name) => scanner.end(rest, name)?,
            Node::Doctype(doctype) => scanner.doctype(rest, doctype)?,
            Node::CData => scanner.cdata(rest)?,
            Node::Misc => {}
        }
        rest = next;
    }
    scanner.text(rest)?;
    scanner.finish(rest)?;
    Ok(segments)
}

fn segment<'a>(attributes: &[(&'a str, Cow<'a, str>)], path: &Path) -> Result<Segment> {
    let value = |attribute: &'static str| {
        attributes.iter()
            .find(|&&(name, _)| name == attribute)
            .map(|&(_, ref value)| value)
            .ok_or_else(|| Error::MissingAttribute { path: path.to_path_buf(), attribute: attribute })
    };
    Ok(Segment {
        start: value("start")?.trim().parse()?,
        end: value("end")?.trim().parse()?,
        features: value("features")?.to_string(),
    })
}

//
// Grammar
//

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == ':'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == ':' || c == '-' || c == '.'
}

fn name(input: &str) -> IResult<&str, &str> {
    recognize(pair(take_while1(is_name_start), take_while(is_name_char)))(input)
}

fn is_name(input: &str) -> bool {
    match name(input) {
        Ok(("", _)) => true,
        _ => false,
    }
}

fn quoted(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('"'), take_till(|c: char| c == '"'), char('"')),
        delimited(char('\''), take_till(|c: char| c == '\''), char('\'')),
    ))(input)
}

fn attribute(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(name, tuple((multispace0, char('='), multispace0)), quoted)(input)
}

fn start_tag<'a>(input: &'a str) -> IResult<&'a str, Tag<'a>> {
    map(
        tuple((
            char('<'),
            name,
            many0(preceded(multispace1, attribute)),
            multispace0,
            alt((map(tag("/>"), |_| true), map(tag(">"), |_| false))),
        )),
        |(_, name, attributes, _, empty)| Tag { name: name, attributes: attributes, empty: empty },
    )(input)
}

fn end_tag(input: &str) -> IResult<&str, &str> {
    delimited(tag("</"), name, pair(multispace0, char('>')))(input)
}

fn enclosed<'a>(open: &'static str, close: &'static str)
    -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    recognize(tuple((tag(open), take_until(close), tag(close))))
}

/// Everything up to the `]` that ends the internal subset, which is the one followed by `>`
fn internal_subset(input: &str) -> IResult<&str, &str> {
    let mut from = 0;
    while let Some(idx) = input[from..].find(']') {
        let close = from + idx;
        if input[close + 1..].trim_start().starts_with('>') {
            return Ok((&input[close..], &input[..close]));
        }
        from = close + 1;
    }
    Err(nom::Err::Error(NomError::new(input, ErrorKind::TakeUntil)))
}

fn doctype(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        tag("<!DOCTYPE"),
        take_till(|c: char| c == '[' || c == '>'),
        opt(tuple((char('['), internal_subset, char(']'), multispace0))),
        char('>'),
    )))(input)
}

/// Names of the general entities a DOCTYPE declares
fn declared_entities(doctype: &str) -> Vec<&str> {
    const DECLARATION: &'static str = "<!ENTITY";
    let mut entities = vec![];
    let mut rest = doctype;
    while let Some(idx) = rest.find(DECLARATION) {
        rest = &rest[idx + DECLARATION.len()..];
        // Parameter entities (`<!ENTITY % name`) never appear in content
        let declared: IResult<&str, &str> = preceded(multispace1, name)(rest);
        if let Ok((next, entity)) = declared {
            entities.push(entity);
            rest = next;
        }
    }
    entities
}

fn node<'a>(input: &'a str) -> IResult<&'a str, Node<'a>> {
    alt((
        map(enclosed("<!--", "-->"), |_| Node::Misc),
        map(enclosed("<![CDATA[", "]]>"), |_| Node::CData),
        map(enclosed("<?", "?>"), |_| Node::Misc),
        map(doctype, Node::Doctype),
        map(end_tag, Node::End),
        map(start_tag, Node::Start),
    ))(input)
}

/// Decode references and normalize whitespace in an attribute value or text
///
/// Entities in `declared` are kept as written. The error is a description of the problem.
fn unescape<'a>(raw: &'a str, declared: &[&str]) -> ::std::result::Result<Cow<'a, str>, String> {
    if raw.contains('<') {
        return Err("'<' in attribute value".to_string());
    }
    if !raw.contains(|c: char| c == '&' || c == '\t' || c == '\n' || c == '\r') {
        return Ok(Cow::Borrowed(raw));
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        push_literal(&mut out, &rest[..amp]);
        rest = &rest[amp..];
        let semi = match rest.find(';') {
            Some(semi) => semi,
            None => return Err(format!("unterminated reference {:?}", rest)),
        };
        let entity = &rest[1..semi];
        match reference(entity) {
            Some(c) => out.push(c),
            None if is_name(entity) && declared.contains(&entity) => out.push_str(&rest[..semi + 1]),
            None if is_name(entity) => return Err(format!("entity '{}' not defined", entity)),
            None => return Err(format!("malformed reference {:?}", &rest[..semi + 1])),
        }
        rest = &rest[semi + 1..];
    }
    push_literal(&mut out, rest);
    Ok(Cow::Owned(out))
}

fn push_literal(out: &mut String, literal: &str) {
    out.extend(literal.chars().map(|c| match c {
        '\t' | '\n' | '\r' => ' ',
        c => c,
    }));
}

fn reference(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ if name.starts_with("#x") => {
            u32::from_str_radix(&name[2..], 16).ok().and_then(::std::char::from_u32)
        }
        _ if name.starts_with('#') => name[1..].parse().ok().and_then(::std::char::from_u32),
        _ => None,
    }
}
