//! Writing a [Model] in the .lp file format
//!
use std::fmt;
use std::fmt::Formatter;
use std::io::prelude::*;

use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::problem::{BoundSpec, LpObjective, Model, ResolvedBound, Term};

/// Types that can write themselves as a piece of .lp text
pub trait WriteToLpFileFormat {
    /// Write the object to the given formatter in the .lp format
    fn to_lp_file_format(&self, f: &mut fmt::Formatter) -> fmt::Result;
}

impl<'a, T: WriteToLpFileFormat> WriteToLpFileFormat for &'a T {
    fn to_lp_file_format(&self, f: &mut Formatter) -> fmt::Result {
        (*self).to_lp_file_format(f)
    }
}

/// An ordered list of terms, rendered `3 x +2 y - z`
pub struct Expression<'a>(pub &'a [Term]);

impl WriteToLpFileFormat for Expression<'_> {
    fn to_lp_file_format(&self, f: &mut Formatter) -> fmt::Result {
        for (idx, term) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            let coef = &term.coef;
            match (idx, coef.is_one(), coef.is_minus_one()) {
                (0, true, _) => write!(f, "{}", term.name)?,
                (0, _, true) => write!(f, "-{}", term.name)?,
                (0, _, _) => write!(f, "{} {}", coef, term.name)?,
                (_, true, _) => write!(f, "+ {}", term.name)?,
                (_, _, true) => write!(f, "- {}", term.name)?,
                _ if coef.is_negative() => write!(f, "{} {}", coef, term.name)?,
                _ => write!(f, "+{} {}", coef, term.name)?,
            }
        }
        Ok(())
    }
}

/// An expression together with its resolved limits, rendered with the
/// operator the bound type calls for
pub struct BoundedExpression<'a, E> {
    /// left hand side
    pub expression: E,
    /// limits after type inference
    pub bound: ResolvedBound<'a>,
    /// `x free` instead of `x >= -inf` (only valid in the Bounds section)
    pub column: bool,
}

impl<E: WriteToLpFileFormat> WriteToLpFileFormat for BoundedExpression<'_, E> {
    fn to_lp_file_format(&self, f: &mut Formatter) -> fmt::Result {
        match self.bound {
            ResolvedBound::Double(lb, ub) => {
                write!(f, "{} <= ", lb)?;
                self.expression.to_lp_file_format(f)?;
                write!(f, " <= {}", ub)
            }
            ResolvedBound::Fixed(v) => {
                self.expression.to_lp_file_format(f)?;
                write!(f, " = {}", v)
            }
            ResolvedBound::Lower(lb) => {
                self.expression.to_lp_file_format(f)?;
                write!(f, " >= {}", lb)
            }
            ResolvedBound::Upper(ub) => {
                self.expression.to_lp_file_format(f)?;
                write!(f, " <= {}", ub)
            }
            ResolvedBound::Free if self.column => {
                self.expression.to_lp_file_format(f)?;
                f.write_str(" free")
            }
            ResolvedBound::Free => {
                self.expression.to_lp_file_format(f)?;
                f.write_str(" >= -inf")
            }
        }
    }
}

struct Name<'a>(&'a str);

impl WriteToLpFileFormat for Name<'_> {
    fn to_lp_file_format(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.0)
    }
}

fn constraint_label(name: Option<&String>, idx: usize) -> String {
    name.cloned().unwrap_or_else(|| format!("c{}", idx))
}

/// Check everything that can make the rendering fail: every bound spec must
/// resolve and every coefficient must be finite.
pub fn validate(model: &Model) -> Result<()> {
    let finite = |terms: &[Term]| -> Result<()> {
        match terms.iter().find(|t| t.coef.is_infinite()) {
            Some(t) => Err(Error::InvalidDecimalFormat(t.coef.to_string())),
            None => Ok(()),
        }
    };
    finite(&model.objective.vars)?;
    for (idx, constraint) in model.subject_to.iter().enumerate() {
        finite(&constraint.vars)?;
        constraint
            .bnds
            .resolve(&constraint_label(constraint.name.as_ref(), idx))?;
    }
    for column in &model.bounds {
        column.bnds.resolve(&column.name)?;
    }
    Ok(())
}

/// Serialize a model to .lp text.
///
/// Fails with [Error::MissingBounds] when a bound spec has neither limit nor type.
pub fn create_lp(model: &Model) -> Result<String> {
    Ok(model.display_lp()?.to_string())
}

impl Model {
    /// Return an object whose [fmt::Display] implementation is the problem in the .lp format
    pub fn display_lp(&self) -> Result<DisplayedLp<'_>> {
        validate(self)?;
        Ok(DisplayedLp(self))
    }

    /// Write the problem to a temporary file
    pub fn to_tmp_file(&self) -> Result<NamedTempFile> {
        let displayed = self.display_lp()?;
        let prefix = self
            .name
            .as_deref()
            .filter(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or("lp_clp_problem");
        let mut f = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(".lp")
            .tempfile()?;
        write!(f, "{}", displayed)?;
        f.flush()?;
        Ok(f)
    }
}

/// A problem whose `Display` implementation outputs valid .lp syntax.
/// Only obtainable through [Model::display_lp], which validates first.
pub struct DisplayedLp<'a>(&'a Model);

impl std::fmt::Display for DisplayedLp<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let model = self.0;
        if let Some(name) = &model.name {
            write!(f, "\\ {}\n\n", name)?;
        }
        objective_lp_file_block(model, f)?;
        write_constraints_lp_file_block(model, f)?;
        write_bounds_lp_file_block(model, f)?;
        write_names_lp_file_block("Generals", &model.generals, f)?;
        write_names_lp_file_block("Binaries", &model.binaries, f)?;
        writeln!(f, "\nEnd")
    }
}

fn resolved<'a>(bnds: &'a BoundSpec, owner: &str) -> std::result::Result<ResolvedBound<'a>, fmt::Error> {
    // DisplayedLp is only built after `validate`, so this cannot fail
    bnds.resolve(owner).map_err(|_| fmt::Error)
}

fn objective_lp_file_block(model: &Model, f: &mut Formatter) -> fmt::Result {
    let obj_type = match model.objective.direction {
        LpObjective::Maximize => "Maximize\n  ",
        LpObjective::Minimize => "Minimize\n  ",
    };
    let label = model.objective.name.as_deref().unwrap_or("obj");
    write!(f, "{}{}: ", obj_type, label)?;
    Expression(&model.objective.vars).to_lp_file_format(f)?;
    writeln!(f)
}

fn write_constraints_lp_file_block(model: &Model, f: &mut Formatter) -> fmt::Result {
    write!(f, "\nSubject To\n")?;
    for (idx, constraint) in model.subject_to.iter().enumerate() {
        let label = constraint_label(constraint.name.as_ref(), idx);
        write!(f, "  {}: ", label)?;
        BoundedExpression {
            expression: Expression(&constraint.vars),
            bound: resolved(&constraint.bnds, &label)?,
            column: false,
        }
        .to_lp_file_format(f)?;
        writeln!(f)?;
    }
    Ok(())
}

fn write_bounds_lp_file_block(model: &Model, f: &mut Formatter) -> fmt::Result {
    if model.bounds.is_empty() {
        return Ok(());
    }
    write!(f, "\nBounds\n")?;
    for column in &model.bounds {
        write!(f, "  ")?;
        BoundedExpression {
            expression: Name(&column.name),
            bound: resolved(&column.bnds, &column.name)?,
            column: true,
        }
        .to_lp_file_format(f)?;
        writeln!(f)?;
    }
    Ok(())
}

fn write_names_lp_file_block(header: &str, names: &[String], f: &mut Formatter) -> fmt::Result {
    if names.is_empty() {
        return Ok(());
    }
    writeln!(f, "\n{}", header)?;
    for name in names {
        writeln!(f, "  {}", name)?;
    }
    Ok(())
}
