//! The structured model: an objective, constraint rows, optional column bounds
//! and the names of the variables that must take integer or binary values.
//!
//! The JSON shape is the one documented on [Model]; numerals may be JSON numbers
//! or strings, so coefficients wider than an `f64` survive the trip untouched.
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::decimal;
use crate::error::{Error, Result};

/// A numeral exactly as the caller wrote it: a plain decimal (`-0.15`,
/// `200000000000000000000`) or an infinity (`inf`, `-inf`).
/// Never in scientific notation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "NumeralRepr", into = "String")]
pub struct Numeral(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum NumeralRepr {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl TryFrom<NumeralRepr> for Numeral {
    type Error = Error;

    fn try_from(repr: NumeralRepr) -> Result<Self> {
        match repr {
            NumeralRepr::Integer(i) => Ok(Numeral::from(i)),
            NumeralRepr::Float(f) => Numeral::try_from(f),
            NumeralRepr::Text(s) => Numeral::parse(&s),
        }
    }
}

impl Numeral {
    /// Validate a numeral. A leading `+` is dropped.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "inf" | "+inf" | "infinity" | "+infinity" => return Ok(Numeral("inf".to_string())),
            "-inf" | "-infinity" => return Ok(Numeral("-inf".to_string())),
            _ => {}
        }
        if !decimal::is_valid(s) {
            return Err(Error::InvalidDecimalFormat(s.to_string()));
        }
        Ok(Numeral(s.strip_prefix('+').unwrap_or(s).to_string()))
    }

    /// Positive infinity
    pub fn infinity() -> Self {
        Numeral("inf".to_string())
    }

    /// Negative infinity
    pub fn neg_infinity() -> Self {
        Numeral("-inf".to_string())
    }

    /// The numeral text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `inf` or `-inf`
    pub fn is_infinite(&self) -> bool {
        self.0 == "inf" || self.0 == "-inf"
    }

    /// Whether the numeral is written with a leading minus sign
    pub fn is_negative(&self) -> bool {
        self.0.starts_with('-')
    }

    /// Numerically equal to 1
    pub fn is_one(&self) -> bool {
        self.numerically_eq_str("1")
    }

    /// Numerically equal to -1
    pub fn is_minus_one(&self) -> bool {
        self.numerically_eq_str("-1")
    }

    fn numerically_eq_str(&self, other: &str) -> bool {
        !self.is_infinite() && matches!(decimal::compare(&self.0, other), Ok(Ordering::Equal))
    }

    /// Exact numeric equality, `"5"` equals `"5.00"`
    pub fn numerically_eq(&self, other: &Numeral) -> bool {
        if self.is_infinite() || other.is_infinite() {
            self.0 == other.0
        } else {
            self.numerically_eq_str(&other.0)
        }
    }

    /// Nearest `f64`; infinities map to `f64::INFINITY` / `f64::NEG_INFINITY`
    pub fn to_f64(&self) -> Result<f64> {
        self.0
            .parse()
            .map_err(|_| Error::InvalidDecimalFormat(self.0.clone()))
    }
}

impl From<i64> for Numeral {
    fn from(v: i64) -> Self {
        Numeral(v.to_string())
    }
}

impl TryFrom<f64> for Numeral {
    type Error = Error;

    /// `Display` of an `f64` never uses an exponent, so the text is always a plain numeral
    fn try_from(v: f64) -> Result<Self> {
        if v.is_nan() {
            Err(Error::InvalidDecimalFormat(v.to_string()))
        } else if v == f64::INFINITY {
            Ok(Numeral::infinity())
        } else if v == f64::NEG_INFINITY {
            Ok(Numeral::neg_infinity())
        } else {
            Ok(Numeral(v.to_string()))
        }
    }
}

impl FromStr for Numeral {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Numeral::parse(s)
    }
}

impl From<Numeral> for String {
    fn from(n: Numeral) -> Self {
        n.0
    }
}

impl fmt::Display for Numeral {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CodeOrName {
    Code(u8),
    Name(String),
}

impl fmt::Display for CodeOrName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CodeOrName::Code(c) => write!(f, "{}", c),
            CodeOrName::Name(n) => write!(f, "{:?}", n),
        }
    }
}

/// Optimization sense
#[derive(Clone, Copy, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(try_from = "CodeOrName", rename_all = "lowercase")]
pub enum LpObjective {
    /// min
    Minimize,
    /// max
    Maximize,
}

impl TryFrom<CodeOrName> for LpObjective {
    type Error = Error;

    /// Accepts the GLPK codes (1 = min, 2 = max) as well as names
    fn try_from(value: CodeOrName) -> Result<Self> {
        let direction = match &value {
            CodeOrName::Code(1) => Some(LpObjective::Minimize),
            CodeOrName::Code(2) => Some(LpObjective::Maximize),
            CodeOrName::Name(n) => match n.to_ascii_lowercase().as_str() {
                "min" | "minimize" | "minimise" => Some(LpObjective::Minimize),
                "max" | "maximize" | "maximise" => Some(LpObjective::Maximize),
                _ => None,
            },
            _ => None,
        };
        direction.ok_or_else(|| Error::InvalidModel(format!("unknown objective direction {}", value)))
    }
}

/// Which of the lower and upper limits apply to a row or a column
#[derive(Clone, Copy, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(try_from = "CodeOrName", rename_all = "lowercase")]
pub enum BoundType {
    /// no limit at all
    Free,
    /// `expr >= lb`
    Lower,
    /// `expr <= ub`
    Upper,
    /// `lb <= expr <= ub`
    Double,
    /// `expr = value`
    Fixed,
}

impl TryFrom<CodeOrName> for BoundType {
    type Error = Error;

    /// Accepts the GLPK codes (1 = free, 2 = lower, 3 = upper, 4 = double, 5 = fixed) as well as names
    fn try_from(value: CodeOrName) -> Result<Self> {
        let kind = match &value {
            CodeOrName::Code(1) => Some(BoundType::Free),
            CodeOrName::Code(2) => Some(BoundType::Lower),
            CodeOrName::Code(3) => Some(BoundType::Upper),
            CodeOrName::Code(4) => Some(BoundType::Double),
            CodeOrName::Code(5) => Some(BoundType::Fixed),
            CodeOrName::Name(n) => match n.to_ascii_lowercase().as_str() {
                "free" | "fr" => Some(BoundType::Free),
                "lower" | "lo" => Some(BoundType::Lower),
                "upper" | "up" => Some(BoundType::Upper),
                "double" | "db" => Some(BoundType::Double),
                "fixed" | "fx" => Some(BoundType::Fixed),
                _ => None,
            },
            _ => None,
        };
        kind.ok_or_else(|| Error::InvalidModel(format!("unknown bound type {}", value)))
    }
}

/// A bound spec after type inference, borrowing the numerals it needs
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolvedBound<'a> {
    /// no limit
    Free,
    /// lower limit only
    Lower(&'a Numeral),
    /// upper limit only
    Upper(&'a Numeral),
    /// both limits, in (lower, upper) order
    Double(&'a Numeral, &'a Numeral),
    /// lower == upper
    Fixed(&'a Numeral),
}

impl ResolvedBound<'_> {
    /// `(lower, upper)` with infinities for the missing sides
    pub fn limits(&self) -> Result<(f64, f64)> {
        Ok(match self {
            ResolvedBound::Free => (f64::NEG_INFINITY, f64::INFINITY),
            ResolvedBound::Lower(lb) => (lb.to_f64()?, f64::INFINITY),
            ResolvedBound::Upper(ub) => (f64::NEG_INFINITY, ub.to_f64()?),
            ResolvedBound::Double(lb, ub) => (lb.to_f64()?, ub.to_f64()?),
            ResolvedBound::Fixed(v) => {
                let v = v.to_f64()?;
                (v, v)
            }
        })
    }

    /// Overwrite only the sides this bound names. Used for column bounds, where
    /// an untouched side keeps its default (`0` below, `+inf` above).
    pub fn apply_to(&self, lower: &mut f64, upper: &mut f64) -> Result<()> {
        let (lb, ub) = self.limits()?;
        match self {
            ResolvedBound::Lower(_) => *lower = lb,
            ResolvedBound::Upper(_) => *upper = ub,
            _ => {
                *lower = lb;
                *upper = ub;
            }
        }
        Ok(())
    }
}

/// Lower bound, upper bound and an optional explicit type
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundSpec {
    /// lower limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lb: Option<Numeral>,
    /// upper limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ub: Option<Numeral>,
    /// explicit type; inferred from `lb`/`ub` when absent
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<BoundType>,
}

impl BoundSpec {
    /// `expr >= lb`
    pub fn lower(lb: impl Into<Numeral>) -> Self {
        BoundSpec {
            lb: Some(lb.into()),
            ..Default::default()
        }
    }

    /// `expr <= ub`
    pub fn upper(ub: impl Into<Numeral>) -> Self {
        BoundSpec {
            ub: Some(ub.into()),
            ..Default::default()
        }
    }

    /// `lb <= expr <= ub`
    pub fn double(lb: impl Into<Numeral>, ub: impl Into<Numeral>) -> Self {
        BoundSpec {
            lb: Some(lb.into()),
            ub: Some(ub.into()),
            kind: None,
        }
    }

    /// `expr = value`
    pub fn fixed(value: impl Into<Numeral>) -> Self {
        BoundSpec {
            lb: Some(value.into()),
            ub: None,
            kind: Some(BoundType::Fixed),
        }
    }

    /// No limit at all
    pub fn free() -> Self {
        BoundSpec {
            kind: Some(BoundType::Free),
            ..Default::default()
        }
    }

    /// Infer the bound type when none is given.
    ///
    /// `owner` names the row or column in the [Error::MissingBounds] message.
    pub fn resolve(&self, owner: &str) -> Result<ResolvedBound<'_>> {
        let kind = match self.kind {
            Some(kind) => kind,
            None => match (&self.lb, &self.ub) {
                (Some(lb), Some(ub)) if lb.numerically_eq(ub) => BoundType::Fixed,
                (Some(_), Some(_)) => BoundType::Double,
                (Some(_), None) => BoundType::Lower,
                (None, Some(_)) => BoundType::Upper,
                (None, None) => return Err(Error::MissingBounds(owner.to_string())),
            },
        };
        let missing = || Error::MissingBounds(owner.to_string());
        Ok(match kind {
            BoundType::Free => ResolvedBound::Free,
            BoundType::Lower => ResolvedBound::Lower(self.lb.as_ref().ok_or_else(missing)?),
            BoundType::Upper => ResolvedBound::Upper(self.ub.as_ref().ok_or_else(missing)?),
            BoundType::Double => ResolvedBound::Double(
                self.lb.as_ref().ok_or_else(missing)?,
                self.ub.as_ref().ok_or_else(missing)?,
            ),
            BoundType::Fixed => {
                ResolvedBound::Fixed(self.lb.as_ref().or(self.ub.as_ref()).ok_or_else(missing)?)
            }
        })
    }
}

/// `coef * name`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    /// variable name
    pub name: String,
    /// coefficient
    pub coef: Numeral,
}

impl Term {
    /// Build a term
    pub fn new(name: impl Into<String>, coef: impl Into<Numeral>) -> Self {
        Term {
            name: name.into(),
            coef: coef.into(),
        }
    }
}

/// Target function
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    /// whether to maximize or minimize
    pub direction: LpObjective,
    /// label written in front of the expression, `obj` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// ordered terms
    #[serde(default)]
    pub vars: Vec<Term>,
}

/// One row of the constraint matrix
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    /// row label, `c<index>` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// ordered terms
    #[serde(default)]
    pub vars: Vec<Term>,
    /// row limits
    pub bnds: BoundSpec,
}

/// Limits on a single variable
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnBound {
    /// variable name
    pub name: String,
    /// column limits
    #[serde(flatten)]
    pub bnds: BoundSpec,
}

/// A linear or mixed-integer program.
///
/// JSON shape:
/// `{ name?, objective: { direction, name?, vars: [{name, coef}] },
///    subjectTo: [{ name?, vars: [{name, coef}], bnds: {lb?, ub?, type?} }],
///    bounds?: [{name, lb?, ub?, type?}], binaries?: [name], generals?: [name] }`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// problem name, written as a comment line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// target function
    pub objective: Objective,
    /// constraint rows
    #[serde(default)]
    pub subject_to: Vec<Constraint>,
    /// column limits
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bounds: Vec<ColumnBound>,
    /// variables restricted to {0, 1}
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub binaries: Vec<String>,
    /// variables restricted to integers
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generals: Vec<String>,
}

impl Model {
    /// An empty model with the given sense
    pub fn new(direction: LpObjective) -> Self {
        Model {
            name: None,
            objective: Objective {
                direction,
                name: None,
                vars: vec![],
            },
            subject_to: vec![],
            bounds: vec![],
            binaries: vec![],
            generals: vec![],
        }
    }

    /// Read a model from its JSON form
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the model in its JSON form
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Whether any variable is designated integer or binary
    pub fn has_integer_variables(&self) -> bool {
        !self.binaries.is_empty() || !self.generals.is_empty()
    }

    /// Variable names in order of first appearance: objective, constraints,
    /// bounds, generals, binaries.
    pub fn column_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut names = vec![];
        let terms = self
            .objective
            .vars
            .iter()
            .chain(self.subject_to.iter().flat_map(|c| c.vars.iter()))
            .map(|t| t.name.as_str());
        let declared = self
            .bounds
            .iter()
            .map(|b| b.name.as_str())
            .chain(self.generals.iter().map(String::as_str))
            .chain(self.binaries.iter().map(String::as_str));
        for name in terms.chain(declared) {
            if seen.insert(name) {
                names.push(name.to_string());
            }
        }
        names
    }
}
