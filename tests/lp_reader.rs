mod common;

use common::{n, tinlake};
use lp_clp::lp_format::create_lp;
use lp_clp::lp_reader::parse;
use lp_clp::problem::{BoundSpec, BoundType, LpObjective, Term};
use lp_clp::Error;
use test_case::test_case;

#[test]
fn reads_back_what_it_writes() {
    let text = create_lp(&tinlake()).unwrap();
    let model = parse(&text).unwrap();
    assert_eq!(model.objective.direction, LpObjective::Maximize);
    assert_eq!(model.subject_to.len(), 4);
    assert_eq!(model.generals.len(), 4);
    assert_eq!(create_lp(&model).unwrap(), text);
}

#[test]
fn free_format_problem() {
    let text = r"\ diet
\ a second comment line is ignored
MINIMIZE
 cost: 0.6 x
   + 0.5 y
ST
 c1: x + 2 y <= 1
 3 x + y =< 2
 -1 <= x - y
 2 >= x + y >= -inf
Bounds
 x Free
 -5 <= y
 3 >= y
Integers
 y
end
this is never read
";
    let model = parse(text).unwrap();
    assert_eq!(model.name.as_deref(), Some("diet"));
    assert_eq!(model.objective.name.as_deref(), Some("cost"));
    assert_eq!(
        model.objective.vars,
        vec![Term::new("x", n("0.6")), Term::new("y", n("0.5"))]
    );
    assert_eq!(model.subject_to[0].name.as_deref(), Some("c1"));
    assert_eq!(model.subject_to[0].bnds, BoundSpec::upper(1));
    assert_eq!(model.subject_to[1].name, None);
    assert_eq!(model.subject_to[1].bnds, BoundSpec::upper(2));
    assert_eq!(model.subject_to[2].bnds, BoundSpec::lower(-1));
    assert_eq!(
        model.subject_to[2].vars,
        vec![Term::new("x", 1), Term::new("y", -1)]
    );
    assert_eq!(
        model.subject_to[3].bnds,
        BoundSpec::double(lp_clp::problem::Numeral::neg_infinity(), 2)
    );
    assert_eq!(model.bounds[0].bnds.kind, Some(BoundType::Free));
    assert_eq!(model.bounds[1].bnds, BoundSpec::lower(-5));
    assert_eq!(model.bounds[2].bnds, BoundSpec::upper(3));
    assert_eq!(model.generals, vec!["y".to_string()]);
}

#[test]
fn scientific_numbers_become_plain_numerals() {
    let model = parse("max\n obj: 1.5e3 x\nst\n x <= 2E-2\nend").unwrap();
    assert_eq!(model.objective.vars[0].coef, n("1500"));
    assert_eq!(model.subject_to[0].bnds.ub, Some(n("0.02")));
}

#[test]
fn repeated_signs() {
    let model = parse("min\n obj: - - x - + y\nst\n x + y >= 1\nend").unwrap();
    assert_eq!(
        model.objective.vars,
        vec![Term::new("x", 1), Term::new("y", -1)]
    );
}

#[test_case("x + y\nmax\n", 1; "content before the objective")]
#[test_case("max\n obj: x\nmin\n obj: y\n", 3; "two objectives")]
#[test_case("max\n obj: x\nst\n c1: x <= \n", 4; "missing right hand side")]
#[test_case("max\n obj: x\nst\n c1: x + 3 <= 4\n", 4; "constant term")]
#[test_case("max\n obj: x\nst\n c1: 1 <= x >= 0\n", 4; "mixed double bound")]
#[test_case("max\n obj: x\nbounds\n 0 <= x + y <= 1\n", 4; "bound on an expression")]
#[test_case("max\n obj: x\nst\n c1: x <= 4 5\n", 4; "trailing token")]
#[test_case("max\n obj: x * 2\n", 2; "unknown character")]
#[test_case("max\n obj: x\ngenerals\n x 3\n", 4; "number among generals")]
fn syntax_errors(text: &str, line: usize) {
    match parse(text) {
        Err(Error::LpSyntax { line: at, .. }) => assert_eq!(at, line),
        other => panic!("expected a syntax error at line {}, got {:?}", line, other),
    }
}

#[test]
fn missing_objective() {
    assert!(matches!(parse("\\ only a comment\n"), Err(Error::LpSyntax { .. })));
}
