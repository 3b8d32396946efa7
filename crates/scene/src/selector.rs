use std::fmt;
use std::str::FromStr;

/// Read access an element needs to expose for selector matching.
pub trait ElementView {
    fn tag(&self) -> &str;
    fn attribute(&self, name: &str) -> Option<&str>;

    fn element_id(&self) -> Option<&str> {
        self.attribute("id")
    }

    fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|list| list.split_whitespace().any(|c| c == class))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrOp {
    Exists,
    Equals(String),
    EndsWith(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrMatch {
    pub name: String,
    pub op: AttrOp,
}

/// One compound selector: `tag#id.class[attr]...` with no combinators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<AttrMatch>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.id.is_none() && self.classes.is_empty() && self.attrs.is_empty()
    }

    pub fn matches<E: ElementView + ?Sized>(&self, el: &E) -> bool {
        if let Some(tag) = &self.tag
            && !el.tag().eq_ignore_ascii_case(tag)
        {
            return false;
        }
        if let Some(id) = &self.id
            && el.element_id() != Some(id.as_str())
        {
            return false;
        }
        if !self.classes.iter().all(|c| el.has_class(c)) {
            return false;
        }
        self.attrs.iter().all(|a| match (&a.op, el.attribute(&a.name)) {
            (_, None) => false,
            (AttrOp::Exists, Some(_)) => true,
            (AttrOp::Equals(v), Some(actual)) => actual == v,
            (AttrOp::EndsWith(v), Some(actual)) => !v.is_empty() && actual.ends_with(v.as_str()),
        })
    }
}

/// Parsed selector list covering the subset of CSS the tour markup relies on:
/// type, `#id`, `.class`, `[attr]`, `[attr="v"]`, `[attr$="v"]` and `,`.
///
/// Descendant and child combinators are rejected; containment is expressed
/// through `SceneHost::query_within` and `SceneHost::closest` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Compound>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    Empty,
    Unexpected { pos: usize, found: char },
    UnexpectedEnd,
    UnsupportedCombinator { pos: usize },
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorError::Empty => write!(f, "empty selector"),
            SelectorError::Unexpected { pos, found } => {
                write!(f, "unexpected {found:?} at offset {pos}")
            }
            SelectorError::UnexpectedEnd => write!(f, "selector ended unexpectedly"),
            SelectorError::UnsupportedCombinator { pos } => {
                write!(f, "combinators are not supported (offset {pos})")
            }
        }
    }
}

impl std::error::Error for SelectorError {}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let mut cur = Cursor { src: input, pos: 0 };
        let mut alternatives = Vec::new();
        cur.skip_ws();
        if cur.peek().is_none() {
            return Err(SelectorError::Empty);
        }
        loop {
            alternatives.push(cur.compound()?);
            cur.skip_ws();
            match cur.peek() {
                None => break,
                Some(',') => {
                    cur.bump();
                    cur.skip_ws();
                }
                Some(_) => return Err(SelectorError::UnsupportedCombinator { pos: cur.pos }),
            }
        }
        Ok(Self { alternatives })
    }

    pub fn id(id: &str) -> Self {
        Self::single(Compound {
            id: Some(id.to_string()),
            ..Compound::default()
        })
    }

    pub fn class(class: &str) -> Self {
        Self::single(Compound {
            classes: vec![class.to_string()],
            ..Compound::default()
        })
    }

    pub fn tag(tag: &str) -> Self {
        Self::single(Compound {
            tag: Some(tag.to_string()),
            ..Compound::default()
        })
    }

    /// Elements carrying `name`, whatever its value.
    pub fn has_attr(name: &str) -> Self {
        Self::single(Compound {
            attrs: vec![AttrMatch {
                name: name.to_string(),
                op: AttrOp::Exists,
            }],
            ..Compound::default()
        })
    }

    /// `[id$="<suffix>"]`
    pub fn id_suffix(suffix: &str) -> Self {
        Self::single(Compound {
            attrs: vec![AttrMatch {
                name: "id".to_string(),
                op: AttrOp::EndsWith(suffix.to_string()),
            }],
            ..Compound::default()
        })
    }

    fn single(compound: Compound) -> Self {
        Self {
            alternatives: vec![compound],
        }
    }

    /// Adds an attribute condition to every alternative.
    pub fn with_attr(mut self, name: &str, op: AttrOp) -> Self {
        for c in &mut self.alternatives {
            c.attrs.push(AttrMatch {
                name: name.to_string(),
                op: op.clone(),
            });
        }
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        for c in &mut self.alternatives {
            c.classes.push(class.to_string());
        }
        self
    }

    /// Selector list matching either side.
    pub fn or(mut self, other: Selector) -> Self {
        self.alternatives.extend(other.alternatives);
        self
    }

    pub fn alternatives(&self) -> &[Compound] {
        &self.alternatives
    }

    pub fn matches<E: ElementView + ?Sized>(&self, el: &E) -> bool {
        self.alternatives.iter().any(|c| c.matches(el))
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}

/// Renders back to CSS so DOM hosts can hand the selector to `querySelectorAll`.
/// Identifiers are escaped the way `CSS.escape` does it and attribute values
/// are always double-quoted.
impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, c) in self.alternatives.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if let Some(tag) = &c.tag {
                write_ident(f, tag)?;
            }
            if let Some(id) = &c.id {
                f.write_str("#")?;
                write_ident(f, id)?;
            }
            for class in &c.classes {
                f.write_str(".")?;
                write_ident(f, class)?;
            }
            for a in &c.attrs {
                f.write_str("[")?;
                write_ident(f, &a.name)?;
                match &a.op {
                    AttrOp::Exists => {}
                    AttrOp::Equals(v) => {
                        f.write_str("=")?;
                        write_quoted(f, v)?;
                    }
                    AttrOp::EndsWith(v) => {
                        f.write_str("$=")?;
                        write_quoted(f, v)?;
                    }
                }
                f.write_str("]")?;
            }
        }
        Ok(())
    }
}

fn write_hex_escape(f: &mut fmt::Formatter<'_>, c: char) -> fmt::Result {
    write!(f, "\\{:x} ", u32::from(c))
}

fn write_ident(f: &mut fmt::Formatter<'_>, ident: &str) -> fmt::Result {
    let mut chars = ident.chars().peekable();
    let mut first = true;
    let mut after_leading_dash = false;
    while let Some(c) = chars.next() {
        match c {
            '\0' => f.write_str("\u{FFFD}")?,
            '\u{1}'..='\u{1f}' | '\u{7f}' => write_hex_escape(f, c)?,
            '0'..='9' if first || after_leading_dash => write_hex_escape(f, c)?,
            '-' if first && chars.peek().is_none() => f.write_str("\\-")?,
            c if is_ident_char(c) || !c.is_ascii() => write!(f, "{c}")?,
            c => write!(f, "\\{c}")?,
        }
        after_leading_dash = first && c == '-';
        first = false;
    }
    Ok(())
}

fn write_quoted(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in value.chars() {
        match c {
            '"' | '\\' => write!(f, "\\{c}")?,
            '\0' => f.write_str("\u{FFFD}")?,
            '\u{1}'..='\u{1f}' | '\u{7f}' => write_hex_escape(f, c)?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

impl Cursor<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn expect(&mut self, want: char) -> Result<(), SelectorError> {
        match self.bump() {
            Some(c) if c == want => Ok(()),
            Some(c) => Err(SelectorError::Unexpected {
                pos: self.pos - c.len_utf8(),
                found: c,
            }),
            None => Err(SelectorError::UnexpectedEnd),
        }
    }

    /// Reads the character after a `\\`: up to six hex digits and one
    /// optional space, or any other character taken literally.
    fn escape(&mut self) -> Result<char, SelectorError> {
        self.expect('\\')?;
        let start = self.pos;
        while self.pos - start < 6 && self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
            self.bump();
        }
        if self.pos == start {
            return self.bump().ok_or(SelectorError::UnexpectedEnd);
        }
        let code = u32::from_str_radix(&self.src[start..self.pos], 16).unwrap_or(0xFFFD);
        if self.peek() == Some(' ') {
            self.bump();
        }
        Ok(char::from_u32(code)
            .filter(|c| *c != '\0')
            .unwrap_or('\u{FFFD}'))
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let mut out = String::new();
        loop {
            match self.peek() {
                Some('\\') => out.push(self.escape()?),
                Some(c) if is_ident_char(c) || !c.is_ascii() => {
                    self.bump();
                    out.push(c);
                }
                _ => break,
            }
        }
        if out.is_empty() {
            return match self.peek() {
                Some(found) => Err(SelectorError::Unexpected { pos: self.pos, found }),
                None => Err(SelectorError::UnexpectedEnd),
            };
        }
        Ok(out)
    }

    fn value(&mut self) -> Result<String, SelectorError> {
        match self.peek() {
            Some(q @ ('"' | '\'')) => {
                self.bump();
                let mut out = String::new();
                loop {
                    match self.peek() {
                        Some('\\') => out.push(self.escape()?),
                        Some(c) if c == q => {
                            self.bump();
                            break;
                        }
                        Some(c) => {
                            self.bump();
                            out.push(c);
                        }
                        None => return Err(SelectorError::UnexpectedEnd),
                    }
                }
                Ok(out)
            }
            _ => self.ident(),
        }
    }

    fn attr(&mut self) -> Result<AttrMatch, SelectorError> {
        self.expect('[')?;
        self.skip_ws();
        let name = self.ident()?;
        self.skip_ws();
        let op = match self.peek() {
            Some(']') => AttrOp::Exists,
            Some('=') => {
                self.bump();
                self.skip_ws();
                AttrOp::Equals(self.value()?)
            }
            Some('$') => {
                self.bump();
                self.expect('=')?;
                self.skip_ws();
                AttrOp::EndsWith(self.value()?)
            }
            Some(found) => return Err(SelectorError::Unexpected { pos: self.pos, found }),
            None => return Err(SelectorError::UnexpectedEnd),
        };
        self.skip_ws();
        self.expect(']')?;
        Ok(AttrMatch { name, op })
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let mut c = Compound::default();
        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    c.id = Some(self.ident()?);
                }
                Some('.') => {
                    self.bump();
                    c.classes.push(self.ident()?);
                }
                Some('[') => c.attrs.push(self.attr()?),
                Some(ch) if c.is_empty() && (is_ident_char(ch) || ch == '\\' || !ch.is_ascii()) => {
                    c.tag = Some(self.ident()?);
                }
                _ => break,
            }
        }
        if c.is_empty() {
            return match self.peek() {
                Some(found) => Err(SelectorError::Unexpected { pos: self.pos, found }),
                None => Err(SelectorError::UnexpectedEnd),
            };
        }
        Ok(c)
    }
}

#[cfg(test)]
mod tests {
    use super::{AttrOp, ElementView, Selector, SelectorError};
    use std::collections::BTreeMap;

    struct El {
        tag: &'static str,
        attrs: BTreeMap<&'static str, &'static str>,
    }

    impl El {
        fn new(tag: &'static str, attrs: &[(&'static str, &'static str)]) -> Self {
            Self {
                tag,
                attrs: attrs.iter().copied().collect(),
            }
        }
    }

    impl ElementView for El {
        fn tag(&self) -> &str {
            self.tag
        }

        fn attribute(&self, name: &str) -> Option<&str> {
            self.attrs.get(name).copied()
        }
    }

    #[test]
    fn parses_the_tour_selectors() {
        for src in [
            "a-scene",
            "#lobby-hotspots",
            ".guide",
            ".clickable[data-target]",
            ".clickable[data-action=\"close-panel\"]",
            "[id$=\"-hotspots\"]",
            ".info-panel, .explanation-panel",
        ] {
            let sel = Selector::parse(src).unwrap();
            assert_eq!(sel.to_string(), src);
        }
    }

    #[test]
    fn single_quotes_and_bare_values_are_accepted() {
        let sel = Selector::parse("[data-action='book-room']").unwrap();
        assert_eq!(
            sel.alternatives()[0].attrs[0].op,
            AttrOp::Equals("book-room".into())
        );
        let bare = Selector::parse("[data-action=book-room]").unwrap();
        assert_eq!(sel, bare);
    }

    #[test]
    fn rejects_combinators_and_garbage() {
        assert_eq!(
            Selector::parse(".a .b"),
            Err(SelectorError::UnsupportedCombinator { pos: 3 })
        );
        assert_eq!(Selector::parse("   "), Err(SelectorError::Empty));
        assert_eq!(Selector::parse("[id$=\"x"), Err(SelectorError::UnexpectedEnd));
        assert!(matches!(
            Selector::parse("#"),
            Err(SelectorError::UnexpectedEnd)
        ));
        assert!(matches!(
            Selector::parse("a, >b"),
            Err(SelectorError::Unexpected { found: '>', .. })
        ));
    }

    #[test]
    fn matching_checks_every_part() {
        let hotspot = El::new(
            "a-entity",
            &[("class", "clickable nav"), ("data-target", "room")],
        );
        assert!(Selector::parse(".clickable[data-target]").unwrap().matches(&hotspot));
        assert!(Selector::parse("a-entity.nav").unwrap().matches(&hotspot));
        assert!(!Selector::parse(".clickable[data-info]").unwrap().matches(&hotspot));
        assert!(!Selector::parse(".guide").unwrap().matches(&hotspot));
    }

    #[test]
    fn id_suffix_matches_hotspot_groups_only() {
        let group = El::new("a-entity", &[("id", "lobby-hotspots")]);
        let guide = El::new("a-entity", &[("id", "lobby-guide")]);
        let sel = Selector::id_suffix("-hotspots");
        assert!(sel.matches(&group));
        assert!(!sel.matches(&guide));
    }

    #[test]
    fn or_combines_alternatives() {
        let sel = Selector::class("info-panel").or(Selector::class("explanation-panel"));
        let panel = El::new("a-entity", &[("class", "explanation-panel")]);
        assert!(sel.matches(&panel));
        assert_eq!(sel.to_string(), ".info-panel, .explanation-panel");
    }

    #[test]
    fn awkward_ids_and_values_render_escaped() {
        assert_eq!(Selector::id("1st-floor").to_string(), "#\\31 st-floor");
        assert_eq!(Selector::id("-2").to_string(), "#-\\32 ");
        assert_eq!(Selector::id("-").to_string(), "#\\-");
        assert_eq!(Selector::id("suite:a").to_string(), "#suite\\:a");
        let quoted = Selector::has_attr("data-target")
            .with_attr("data-target", AttrOp::Equals("say \"hi\"\\".into()));
        assert_eq!(
            quoted.to_string(),
            "[data-target][data-target=\"say \\\"hi\\\"\\\\\"]"
        );
    }

    #[test]
    fn escaped_selectors_parse_back() {
        for sel in [
            Selector::id("1st-floor"),
            Selector::id("-2"),
            Selector::class("suite:a"),
            Selector::has_attr("data-info").with_attr("data-info", AttrOp::Equals("a\"b\\c".into())),
        ] {
            assert_eq!(Selector::parse(&sel.to_string()).unwrap(), sel);
        }
    }

    #[test]
    fn builders_render_like_parsed_selectors() {
        let built = Selector::tag("button")
            .with_class("cancel")
            .with_attr("data-action", AttrOp::Equals("cancel-booking".into()));
        let parsed = Selector::parse("button.cancel[data-action=\"cancel-booking\"]").unwrap();
        assert_eq!(built, parsed);
        assert_eq!(built.to_string(), "button.cancel[data-action=\"cancel-booking\"]");
    }
}
