//! Query text parser
//!
//! Translates the embedded pattern syntax into a structured [`Query`], so
//! the planner and executor never touch strings. The grammar is the
//! SPARQL-shaped subset the engine supports:
//!
//! ```text
//! SELECT ?s ?b WHERE {
//!   ?s a ex:CommunicationsSatellite .
//!   ?s ex:batteryLevel ?b .
//!   FILTER(?b < 50)
//! }
//! ```
//!
//! - `a` in predicate position expands to `rdf:type`
//! - IRIs are written `<absolute>` or `prefix:local` against a caller
//!   supplied [`PrefixMap`] (with `rdf:` and `xsd:` built in)
//! - literals: `"strings"`, integers, decimals, `true`/`false`
//! - filters compare a variable/literal/IRI pair with `< <= > >= = !=`
//! - `#` starts a line comment

use crate::error::ParseError;
use crate::ir::{CompareOp, FilterExpr, Operand};
use crate::pattern::{Query, Term, TriplePattern};
use crate::var_registry::VarRegistry;
use rustc_hash::FxHashMap;
use twindb_core::{Iri, Value};
use twindb_vocab::{prefixes, rdf};

/// Prefix-to-namespace expansions for `prefix:local` names
#[derive(Clone, Debug)]
pub struct PrefixMap {
    map: FxHashMap<String, String>,
}

impl Default for PrefixMap {
    fn default() -> Self {
        let mut map = FxHashMap::default();
        map.insert("rdf".to_string(), prefixes::RDF.to_string());
        map.insert("xsd".to_string(), prefixes::XSD.to_string());
        Self { map }
    }
}

impl PrefixMap {
    /// The built-in prefixes (`rdf:`, `xsd:`)
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a prefix expansion
    pub fn with(mut self, prefix: impl Into<String>, namespace: impl Into<String>) -> Self {
        self.map.insert(prefix.into(), namespace.into());
        self
    }

    /// Expand `prefix:local` into a full IRI
    pub fn resolve(&self, prefix: &str, local: &str) -> Option<String> {
        self.map.get(prefix).map(|ns| format!("{ns}{local}"))
    }
}

/// Parse query text into a structured query plus its variable registry
pub fn parse_query(
    text: &str,
    prefixes: &PrefixMap,
) -> Result<(Query, VarRegistry), ParseError> {
    let tokens = tokenize(text)?;
    Parser {
        tokens,
        pos: 0,
        vars: VarRegistry::new(),
        prefixes,
        end: text.len(),
    }
    .parse()
}

#[derive(Clone, Debug, PartialEq)]
enum Tok {
    Select,
    Where,
    Filter,
    A,
    Var(String),
    IriRef(String),
    Prefixed(String, String),
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Op(CompareOp),
    LBrace,
    RBrace,
    LParen,
    RParen,
    Dot,
}

fn tokenize(text: &str) -> Result<Vec<(usize, Tok)>, ParseError> {
    let mut out = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some(&(at, c)) = chars.peek() {
        match c {
            _ if c.is_whitespace() => {
                chars.next();
            }
            '#' => {
                while let Some(&(_, c)) = chars.peek() {
                    chars.next();
                    if c == '\n' {
                        break;
                    }
                }
            }
            '{' => {
                chars.next();
                out.push((at, Tok::LBrace));
            }
            '}' => {
                chars.next();
                out.push((at, Tok::RBrace));
            }
            '(' => {
                chars.next();
                out.push((at, Tok::LParen));
            }
            ')' => {
                chars.next();
                out.push((at, Tok::RParen));
            }
            '.' => {
                chars.next();
                out.push((at, Tok::Dot));
            }
            '<' => {
                chars.next();
                // "<=" is an operator; "<iri>" an IRI reference. A bare "<"
                // followed by anything that starts an operand (space,
                // variable, number, string) is the less-than operator, so
                // "FILTER(?b <50)" does not misread "50)..." as an IRI.
                if matches!(chars.peek(), Some(&(_, '='))) {
                    chars.next();
                    out.push((at, Tok::Op(CompareOp::Le)));
                } else if matches!(
                    chars.peek(),
                    Some(&(_, c)) if c.is_whitespace()
                        || c == '?'
                        || c == '-'
                        || c == '"'
                        || c.is_ascii_digit()
                ) {
                    out.push((at, Tok::Op(CompareOp::Lt)));
                } else {
                    let mut iri = String::new();
                    loop {
                        match chars.next() {
                            Some((_, '>')) => break,
                            Some((_, c)) => iri.push(c),
                            None => {
                                return Err(ParseError::new(at, "unterminated IRI reference"))
                            }
                        }
                    }
                    out.push((at, Tok::IriRef(iri)));
                }
            }
            '>' => {
                chars.next();
                if matches!(chars.peek(), Some(&(_, '='))) {
                    chars.next();
                    out.push((at, Tok::Op(CompareOp::Ge)));
                } else {
                    out.push((at, Tok::Op(CompareOp::Gt)));
                }
            }
            '=' => {
                chars.next();
                if matches!(chars.peek(), Some(&(_, '='))) {
                    chars.next();
                }
                out.push((at, Tok::Op(CompareOp::Eq)));
            }
            '!' => {
                chars.next();
                match chars.peek() {
                    Some(&(_, '=')) => {
                        chars.next();
                        out.push((at, Tok::Op(CompareOp::Ne)));
                    }
                    _ => return Err(ParseError::new(at, "expected '=' after '!'")),
                }
            }
            '?' => {
                chars.next();
                let mut name = String::from("?");
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if name.len() == 1 {
                    return Err(ParseError::new(at, "empty variable name"));
                }
                out.push((at, Tok::Var(name)));
            }
            '"' => {
                chars.next();
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some((_, '"')) => break,
                        Some((_, '\\')) => match chars.next() {
                            Some((_, 'n')) => s.push('\n'),
                            Some((_, 't')) => s.push('\t'),
                            Some((_, c)) => s.push(c),
                            None => return Err(ParseError::new(at, "unterminated string")),
                        },
                        Some((_, c)) => s.push(c),
                        None => return Err(ParseError::new(at, "unterminated string")),
                    }
                }
                out.push((at, Tok::Str(s)));
            }
            _ if c == '-' || c.is_ascii_digit() => {
                chars.next();
                let mut text = String::from(c);
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' {
                        // A '.' followed by a non-digit is the triple terminator
                        if c == '.' {
                            let next = chars.clone().nth(1);
                            if !matches!(next, Some((_, d)) if d.is_ascii_digit()) {
                                break;
                            }
                        }
                        text.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let tok = if text.contains('.') {
                    Tok::Float(
                        text.parse()
                            .map_err(|_| ParseError::new(at, format!("bad number: {text}")))?,
                    )
                } else {
                    Tok::Int(
                        text.parse()
                            .map_err(|_| ParseError::new(at, format!("bad number: {text}")))?,
                    )
                };
                out.push((at, tok));
            }
            _ if c.is_alphabetic() || c == '_' => {
                let mut word = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' || c == '-' {
                        word.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                // prefix:local
                if matches!(chars.peek(), Some(&(_, ':'))) {
                    chars.next();
                    let mut local = String::new();
                    while let Some(&(_, c)) = chars.peek() {
                        if c.is_alphanumeric() || c == '_' || c == '-' {
                            local.push(c);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    out.push((at, Tok::Prefixed(word, local)));
                    continue;
                }
                let tok = match word.to_ascii_lowercase().as_str() {
                    "select" => Tok::Select,
                    "where" => Tok::Where,
                    "filter" => Tok::Filter,
                    "a" => Tok::A,
                    "true" => Tok::Bool(true),
                    "false" => Tok::Bool(false),
                    _ => {
                        return Err(ParseError::new(
                            at,
                            format!("unexpected bare word: {word}"),
                        ))
                    }
                };
                out.push((at, tok));
            }
            _ => {
                return Err(ParseError::new(at, format!("unexpected character: {c}")));
            }
        }
    }

    Ok(out)
}

struct Parser<'a> {
    tokens: Vec<(usize, Tok)>,
    pos: usize,
    vars: VarRegistry,
    prefixes: &'a PrefixMap,
    end: usize,
}

impl<'a> Parser<'a> {
    fn parse(mut self) -> Result<(Query, VarRegistry), ParseError> {
        self.expect(&Tok::Select, "SELECT")?;

        let mut select = Vec::new();
        while let Some((_, Tok::Var(name))) = self.peek() {
            let name = name.clone();
            self.pos += 1;
            select.push(self.vars.get_or_insert(&name));
        }
        if select.is_empty() {
            return Err(self.err_here("SELECT needs at least one variable"));
        }

        self.expect(&Tok::Where, "WHERE")?;
        self.expect(&Tok::LBrace, "'{'")?;

        let mut patterns = Vec::new();
        let mut filters = Vec::new();
        loop {
            match self.peek() {
                Some((_, Tok::RBrace)) => {
                    self.pos += 1;
                    break;
                }
                Some((_, Tok::Filter)) => {
                    self.pos += 1;
                    filters.push(self.parse_filter()?);
                    self.eat(&Tok::Dot);
                }
                Some(_) => {
                    patterns.push(self.parse_triple()?);
                    self.eat(&Tok::Dot);
                }
                None => return Err(self.err_here("unterminated WHERE block")),
            }
        }

        if let Some((at, _)) = self.peek() {
            return Err(ParseError::new(*at, "trailing input after '}'"));
        }

        Ok((Query::new(patterns, filters, select), self.vars))
    }

    fn parse_triple(&mut self) -> Result<TriplePattern, ParseError> {
        let s = self.parse_term(Slot::Subject)?;
        let p = self.parse_term(Slot::Predicate)?;
        let o = self.parse_term(Slot::Object)?;
        Ok(TriplePattern::new(s, p, o))
    }

    fn parse_term(&mut self, slot: Slot) -> Result<Term, ParseError> {
        let Some((at, tok)) = self.peek() else {
            return Err(self.err_here("unexpected end of query"));
        };
        let (at, tok) = (*at, tok.clone());
        self.pos += 1;

        match tok {
            Tok::Var(name) => Ok(Term::Var(self.vars.get_or_insert(&name))),
            Tok::A if slot == Slot::Predicate => Ok(Term::Iri(Iri::new(rdf::TYPE))),
            Tok::IriRef(iri) => Ok(Term::Iri(Iri::new(iri))),
            Tok::Prefixed(prefix, local) => {
                let iri = self
                    .prefixes
                    .resolve(&prefix, &local)
                    .ok_or_else(|| ParseError::new(at, format!("unknown prefix: {prefix}")))?;
                Ok(Term::Iri(Iri::new(iri)))
            }
            Tok::Str(s) if slot == Slot::Object => Ok(Term::Value(Value::String(s))),
            Tok::Int(i) if slot == Slot::Object => Ok(Term::Value(Value::Integer(i))),
            Tok::Float(f) if slot == Slot::Object => Ok(Term::Value(Value::Float(f))),
            Tok::Bool(b) if slot == Slot::Object => Ok(Term::Value(Value::Boolean(b))),
            _ => Err(ParseError::new(at, format!("unexpected token in {slot}"))),
        }
    }

    fn parse_filter(&mut self) -> Result<FilterExpr, ParseError> {
        self.expect(&Tok::LParen, "'('")?;
        let lhs = self.parse_operand()?;
        let op = match self.peek() {
            Some((_, Tok::Op(op))) => {
                let op = *op;
                self.pos += 1;
                op
            }
            _ => return Err(self.err_here("expected comparison operator")),
        };
        let rhs = self.parse_operand()?;
        self.expect(&Tok::RParen, "')'")?;
        Ok(FilterExpr::new(lhs, op, rhs))
    }

    fn parse_operand(&mut self) -> Result<Operand, ParseError> {
        let Some((at, tok)) = self.peek() else {
            return Err(self.err_here("unexpected end of filter"));
        };
        let (at, tok) = (*at, tok.clone());
        self.pos += 1;

        match tok {
            Tok::Var(name) => Ok(Operand::Var(self.vars.get_or_insert(&name))),
            Tok::Str(s) => Ok(Operand::Const(Value::String(s))),
            Tok::Int(i) => Ok(Operand::Const(Value::Integer(i))),
            Tok::Float(f) => Ok(Operand::Const(Value::Float(f))),
            Tok::Bool(b) => Ok(Operand::Const(Value::Boolean(b))),
            Tok::IriRef(iri) => Ok(Operand::Const(Value::Ref(Iri::new(iri)))),
            Tok::Prefixed(prefix, local) => {
                let iri = self
                    .prefixes
                    .resolve(&prefix, &local)
                    .ok_or_else(|| ParseError::new(at, format!("unknown prefix: {prefix}")))?;
                Ok(Operand::Const(Value::Ref(Iri::new(iri))))
            }
            _ => Err(ParseError::new(at, "unexpected token in filter operand")),
        }
    }

    fn peek(&self) -> Option<&(usize, Tok)> {
        self.tokens.get(self.pos)
    }

    fn eat(&mut self, tok: &Tok) {
        if matches!(self.peek(), Some((_, t)) if t == tok) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, tok: &Tok, what: &str) -> Result<(), ParseError> {
        match self.peek() {
            Some((_, t)) if t == tok => {
                self.pos += 1;
                Ok(())
            }
            Some((at, _)) => Err(ParseError::new(*at, format!("expected {what}"))),
            None => Err(ParseError::new(self.end, format!("expected {what}"))),
        }
    }

    fn err_here(&self, message: &str) -> ParseError {
        let at = self.peek().map_or(self.end, |(at, _)| *at);
        ParseError::new(at, message)
    }
}

/// Slot a term is being parsed for; literals are object-only, `a` is
/// predicate-only
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Subject,
    Predicate,
    Object,
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Slot::Subject => "subject position",
            Slot::Predicate => "predicate position",
            Slot::Object => "object position",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::var_registry::VarId;

    fn prefixes() -> PrefixMap {
        PrefixMap::new().with("ex", "http://example.org/")
    }

    #[test]
    fn test_parse_battery_query() {
        let text = r#"
            SELECT ?s ?b WHERE {
                ?s a ex:CommunicationsSatellite .
                ?s ex:batteryLevel ?b .
                FILTER(?b < 50)
            }
        "#;
        let (query, vars) = parse_query(text, &prefixes()).unwrap();

        assert_eq!(query.patterns.len(), 2);
        assert_eq!(query.filters.len(), 1);
        assert_eq!(query.select.len(), 2);

        let s = vars.get("?s").unwrap();
        let b = vars.get("?b").unwrap();
        assert_eq!(query.select, vec![s, b]);

        assert!(query.patterns[0].p.is_rdf_type());
        assert_eq!(
            query.patterns[0].o,
            Term::Iri(Iri::new("http://example.org/CommunicationsSatellite"))
        );
        assert_eq!(
            query.patterns[1].p,
            Term::Iri(Iri::new("http://example.org/batteryLevel"))
        );

        let filter = &query.filters[0];
        assert_eq!(filter.op, CompareOp::Lt);
        assert_eq!(filter.lhs, Operand::Var(b));
        assert_eq!(filter.rhs, Operand::Const(Value::Integer(50)));
    }

    #[test]
    fn test_less_than_without_space_is_an_operator() {
        // "<50" must not be read as the start of an IRI reference
        let text = "SELECT ?b WHERE { ?s ex:batteryLevel ?b . FILTER(?b <50) }";
        let (query, vars) = parse_query(text, &prefixes()).unwrap();
        let b = vars.get("?b").unwrap();

        let filter = &query.filters[0];
        assert_eq!(filter.op, CompareOp::Lt);
        assert_eq!(filter.lhs, Operand::Var(b));
        assert_eq!(filter.rhs, Operand::Const(Value::Integer(50)));

        // Negative and string operands disambiguate the same way
        let text = "SELECT ?b WHERE { ?s ex:batteryLevel ?b . FILTER(?b <-1.5) }";
        let (query, _) = parse_query(text, &prefixes()).unwrap();
        assert_eq!(
            query.filters[0].rhs,
            Operand::Const(Value::Float(-1.5))
        );

        let text = r#"SELECT ?n WHERE { ?s ex:name ?n . FILTER(?n <"m") }"#;
        let (query, _) = parse_query(text, &prefixes()).unwrap();
        assert_eq!(query.filters[0].op, CompareOp::Lt);
        assert_eq!(query.filters[0].rhs, Operand::Const(Value::from("m")));
    }

    #[test]
    fn test_parse_absolute_iri_and_literals() {
        let text = r#"
            SELECT ?s WHERE {
                ?s <http://example.org/name> "Alpha" .
                ?s <http://example.org/active> true .
                ?s <http://example.org/mass> 1200.5 .
            }
        "#;
        let (query, _) = parse_query(text, &PrefixMap::new()).unwrap();
        assert_eq!(query.patterns.len(), 3);
        assert_eq!(query.patterns[0].o, Term::Value(Value::from("Alpha")));
        assert_eq!(query.patterns[1].o, Term::Value(Value::Boolean(true)));
        assert_eq!(query.patterns[2].o, Term::Value(Value::Float(1200.5)));
    }

    #[test]
    fn test_parse_all_operators() {
        for (sym, op) in [
            ("<", CompareOp::Lt),
            ("<=", CompareOp::Le),
            (">", CompareOp::Gt),
            (">=", CompareOp::Ge),
            ("=", CompareOp::Eq),
            ("!=", CompareOp::Ne),
        ] {
            let text = format!(
                "SELECT ?b WHERE {{ ?s ex:batteryLevel ?b . FILTER(?b {sym} 50) }}"
            );
            let (query, _) = parse_query(&text, &prefixes()).unwrap();
            assert_eq!(query.filters[0].op, op, "operator {sym}");
        }
    }

    #[test]
    fn test_parse_errors() {
        let bad = [
            "WHERE { ?s ?p ?o }",                           // missing SELECT
            "SELECT WHERE { ?s ?p ?o }",                    // no select vars
            "SELECT ?s WHERE { ?s ex:p ?o ",                // unterminated block
            "SELECT ?s WHERE { ?s nope ?o }",               // bare word
            "SELECT ?s WHERE { ?s unknownprefix:p ?o . }",  // unknown prefix
            "SELECT ?s WHERE { \"lit\" ex:p ?o . }",        // literal subject
            "SELECT ?s WHERE { ?s ex:p ?o . } trailing:x",  // trailing input
        ];
        for text in bad {
            assert!(
                parse_query(text, &prefixes()).is_err(),
                "should not parse: {text}"
            );
        }
    }

    #[test]
    fn test_variable_ids_are_shared() {
        let text = "SELECT ?s WHERE { ?s ex:batteryLevel ?b . FILTER(?b > 10) }";
        let (query, vars) = parse_query(text, &prefixes()).unwrap();
        let b = vars.get("?b").unwrap();
        assert_eq!(query.patterns[0].o, Term::Var(b));
        assert_eq!(query.filters[0].lhs, Operand::Var(b));
        assert_eq!(vars.get("?s"), Some(VarId(0)));
    }
}
