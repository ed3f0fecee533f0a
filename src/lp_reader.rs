//! Reading .lp text back into a [Model].
//!
//! Covers the dialect [crate::lp_format] writes plus the usual spellings other
//! tools produce: keywords are case-insensitive and may be abbreviated
//! (`max`, `st`, `s.t.`, `integers`, `bin`), `\` starts a comment, and a bound
//! line can be written either way round (`5 >= x`). Constraint and bound lines
//! hold one row each; the objective may continue over several lines.
use crate::error::{Error, Result};
use crate::problem::{BoundSpec, ColumnBound, Constraint, LpObjective, Model, Numeral, Term};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Cmp {
    Le,
    Ge,
    Eq,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token {
    Number(String),
    Name(String),
    Cmp(Cmp),
    Plus,
    Minus,
    Colon,
}

enum Keyword {
    Objective(LpObjective),
    Constraints,
    Bounds,
    Generals,
    Binaries,
    End,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Objective,
    Constraints,
    Bounds,
    Generals,
    Binaries,
}

fn keyword(line: &str) -> Option<Keyword> {
    let lower = line.to_ascii_lowercase();
    let words: Vec<&str> = lower.split_whitespace().collect();
    match words.join(" ").as_str() {
        "maximize" | "maximise" | "maximum" | "max" => Some(Keyword::Objective(LpObjective::Maximize)),
        "minimize" | "minimise" | "minimum" | "min" => Some(Keyword::Objective(LpObjective::Minimize)),
        "subject to" | "such that" | "subj to" | "st" | "s.t." | "st." => Some(Keyword::Constraints),
        "bounds" | "bound" => Some(Keyword::Bounds),
        "generals" | "general" | "gen" | "integers" | "integer" => Some(Keyword::Generals),
        "binaries" | "binary" | "bin" => Some(Keyword::Binaries),
        "end" => Some(Keyword::End),
        _ => None,
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || "_.!\"#$%&()/,;?@'`{}|~[]^".contains(c)
}

fn is_infinity(name: &str) -> bool {
    matches!(name.to_ascii_lowercase().as_str(), "inf" | "infinity")
}

fn tokenize(line: &str, line_no: usize) -> Result<Vec<Token>> {
    let chars: Vec<char> = line.chars().collect();
    let mut tokens = vec![];
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match c {
            _ if c.is_whitespace() => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            ':' => {
                tokens.push(Token::Colon);
                i += 1;
            }
            '<' | '>' | '=' => {
                let (cmp, len) = match (c, next) {
                    ('<', Some('=')) | ('=', Some('<')) => (Cmp::Le, 2),
                    ('>', Some('=')) | ('=', Some('>')) => (Cmp::Ge, 2),
                    ('<', _) => (Cmp::Le, 1),
                    ('>', _) => (Cmp::Ge, 1),
                    _ => (Cmp::Eq, 1),
                };
                tokens.push(Token::Cmp(cmp));
                i += len;
            }
            _ if c.is_ascii_digit() || (c == '.' && next.map_or(false, |n| n.is_ascii_digit())) => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let mut scientific = false;
                if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                    let sign = matches!(chars.get(i + 1).copied(), Some('+') | Some('-'));
                    let digit_at = if sign { i + 2 } else { i + 1 };
                    if chars.get(digit_at).map_or(false, |d| d.is_ascii_digit()) {
                        scientific = true;
                        i = digit_at;
                        while i < chars.len() && chars[i].is_ascii_digit() {
                            i += 1;
                        }
                    }
                }
                let text: String = chars[start..i].iter().collect();
                let text = if scientific {
                    // other writers use exponents; numerals here are always plain
                    let value: f64 = text
                        .parse()
                        .map_err(|_| Error::syntax(line_no, format!("bad number {:?}", text)))?;
                    Numeral::try_from(value)?.to_string()
                } else {
                    text
                };
                tokens.push(Token::Number(text));
            }
            _ if is_name_char(c) => {
                let start = i;
                while i < chars.len() && is_name_char(chars[i]) {
                    i += 1;
                }
                tokens.push(Token::Name(chars[start..i].iter().collect()));
            }
            _ => return Err(Error::syntax(line_no, format!("unexpected character {:?}", c))),
        }
    }
    Ok(tokens)
}

struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
    line: usize,
}

impl<'a> Cursor<'a> {
    fn new(tokens: &'a [Token], line: usize) -> Self {
        Cursor { tokens, pos: 0, line }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn is_done(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::syntax(self.line, message)
    }

    fn label(&mut self) -> Option<String> {
        match self.tokens.get(self.pos..self.pos + 2) {
            Some([Token::Name(name), Token::Colon]) => {
                self.pos += 2;
                Some(name.clone())
            }
            _ => None,
        }
    }

    /// Consume any run of `+`/`-`, returning whether the result is negative
    fn signs(&mut self) -> bool {
        let mut negative = false;
        while let Some(token) = self.peek() {
            match token {
                Token::Plus => {}
                Token::Minus => negative = !negative,
                _ => break,
            }
            self.pos += 1;
        }
        negative
    }

    /// A value followed by a comparison, as in `lb <= expr`
    fn starts_with_value(&self) -> bool {
        let mut pos = self.pos;
        while matches!(self.tokens.get(pos), Some(Token::Plus) | Some(Token::Minus)) {
            pos += 1;
        }
        let value = match self.tokens.get(pos) {
            Some(Token::Number(_)) => true,
            Some(Token::Name(name)) => is_infinity(name),
            _ => false,
        };
        value && matches!(self.tokens.get(pos + 1), Some(Token::Cmp(_)))
    }

    fn signed(negative: bool, text: &str) -> Result<Numeral> {
        if negative {
            Numeral::parse(&format!("-{}", text))
        } else {
            Numeral::parse(text)
        }
    }

    fn value(&mut self) -> Result<Numeral> {
        let negative = self.signs();
        match self.next() {
            Some(Token::Number(n)) => Self::signed(negative, n),
            Some(Token::Name(name)) if is_infinity(name) => Ok(if negative {
                Numeral::neg_infinity()
            } else {
                Numeral::infinity()
            }),
            other => Err(self.error(format!("expected a number, found {:?}", other))),
        }
    }

    fn cmp(&mut self) -> Result<Cmp> {
        match self.next() {
            Some(Token::Cmp(cmp)) => Ok(*cmp),
            other => Err(self.error(format!("expected <=, >= or =, found {:?}", other))),
        }
    }

    fn expression(&mut self) -> Result<Vec<Term>> {
        let mut terms = vec![];
        while !self.is_done() && !matches!(self.peek(), Some(Token::Cmp(_))) {
            let negative = self.signs();
            let coef = match self.peek() {
                Some(Token::Number(n)) => {
                    self.pos += 1;
                    Self::signed(negative, n)?
                }
                _ => Self::signed(negative, "1")?,
            };
            match self.next() {
                Some(Token::Name(name)) => terms.push(Term {
                    name: name.clone(),
                    coef,
                }),
                None | Some(Token::Cmp(_)) => {
                    return Err(self.error("constant terms are not supported"))
                }
                Some(other) => return Err(self.error(format!("unexpected {:?} in expression", other))),
            }
        }
        Ok(terms)
    }

    /// `expr op rhs`, `lhs op expr` or `lb op expr op ub`
    fn bounded(&mut self) -> Result<(Vec<Term>, BoundSpec)> {
        if !self.starts_with_value() {
            let terms = self.expression()?;
            let op = self.cmp()?;
            let rhs = self.value()?;
            return Ok((terms, bound_from(op, rhs)));
        }
        let first = self.value()?;
        let first_op = self.cmp()?;
        let terms = self.expression()?;
        if self.is_done() {
            let flipped = match first_op {
                Cmp::Le => Cmp::Ge,
                Cmp::Ge => Cmp::Le,
                Cmp::Eq => Cmp::Eq,
            };
            return Ok((terms, bound_from(flipped, first)));
        }
        let second_op = self.cmp()?;
        let second = self.value()?;
        match (first_op, second_op) {
            (Cmp::Le, Cmp::Le) => Ok((terms, BoundSpec::double(first, second))),
            (Cmp::Ge, Cmp::Ge) => Ok((terms, BoundSpec::double(second, first))),
            _ => Err(self.error("a double bound needs two comparisons in the same direction")),
        }
    }

    fn finish(&self) -> Result<()> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(self.error(format!("unexpected trailing {:?}", token))),
        }
    }
}

fn bound_from(op: Cmp, value: Numeral) -> BoundSpec {
    match op {
        Cmp::Le => BoundSpec::upper(value),
        Cmp::Ge => BoundSpec::lower(value),
        Cmp::Eq => BoundSpec::fixed(value),
    }
}

fn column_bound(tokens: &[Token], line: usize) -> Result<ColumnBound> {
    if let [Token::Name(name), Token::Name(free)] = tokens {
        if free.eq_ignore_ascii_case("free") {
            return Ok(ColumnBound {
                name: name.clone(),
                bnds: BoundSpec::free(),
            });
        }
    }
    let mut cursor = Cursor::new(tokens, line);
    let (terms, bnds) = cursor.bounded()?;
    cursor.finish()?;
    match terms.as_slice() {
        [term] if term.coef.is_one() => Ok(ColumnBound {
            name: term.name.clone(),
            bnds,
        }),
        _ => Err(Error::syntax(line, "a bound applies to exactly one variable")),
    }
}

/// Parse .lp text into a [Model]
pub fn parse(text: &str) -> Result<Model> {
    let mut section = Section::Preamble;
    let mut model: Option<Model> = None;
    let mut name = None;
    let mut objective_label_seen = false;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let (content, comment) = match raw.find('\\') {
            Some(pos) => (&raw[..pos], Some(&raw[pos + 1..])),
            None => (raw, None),
        };
        if section == Section::Preamble && name.is_none() {
            name = comment.map(str::trim).filter(|c| !c.is_empty()).map(String::from);
        }
        let content = content.trim();
        if content.is_empty() {
            continue;
        }
        if let Some(kw) = keyword(content) {
            section = match kw {
                Keyword::Objective(direction) => {
                    if model.is_some() {
                        return Err(Error::syntax(line_no, "objective sense given twice"));
                    }
                    model = Some(Model::new(direction));
                    Section::Objective
                }
                Keyword::End => break,
                _ if model.is_none() => {
                    return Err(Error::syntax(line_no, "the objective sense must come first"))
                }
                Keyword::Constraints => Section::Constraints,
                Keyword::Bounds => Section::Bounds,
                Keyword::Generals => Section::Generals,
                Keyword::Binaries => Section::Binaries,
            };
            continue;
        }
        let model = match model.as_mut() {
            Some(model) => model,
            None => return Err(Error::syntax(line_no, "the objective sense must come first")),
        };
        let tokens = tokenize(content, line_no)?;
        match section {
            Section::Preamble => return Err(Error::syntax(line_no, "the objective sense must come first")),
            Section::Objective => {
                let mut cursor = Cursor::new(&tokens, line_no);
                if !objective_label_seen {
                    model.objective.name = cursor.label();
                    objective_label_seen = true;
                }
                let terms = cursor.expression()?;
                cursor.finish()?;
                model.objective.vars.extend(terms);
            }
            Section::Constraints => {
                let mut cursor = Cursor::new(&tokens, line_no);
                let label = cursor.label();
                let (vars, bnds) = cursor.bounded()?;
                cursor.finish()?;
                model.subject_to.push(Constraint {
                    name: label,
                    vars,
                    bnds,
                });
            }
            Section::Bounds => model.bounds.push(column_bound(&tokens, line_no)?),
            Section::Generals | Section::Binaries => {
                let target = if section == Section::Generals {
                    &mut model.generals
                } else {
                    &mut model.binaries
                };
                for token in &tokens {
                    match token {
                        Token::Name(n) => target.push(n.clone()),
                        other => {
                            return Err(Error::syntax(line_no, format!("expected a variable name, found {:?}", other)))
                        }
                    }
                }
            }
        }
    }

    let mut model = model.ok_or_else(|| Error::syntax(1, "missing Maximize/Minimize section"))?;
    model.name = name;
    Ok(model)
}
