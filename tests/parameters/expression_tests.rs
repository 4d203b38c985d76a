//! Tests for formula parsing and evaluation

use petab_rs::parameters::expression::{EvaluationContext, Expression, ExpressionError, SimpleContext};
use std::collections::HashMap;

#[test]
fn test_expression_parsing() {
    let expr = Expression::parse("42").unwrap();
    assert!(expr.variables().is_empty());

    let expr = Expression::parse("observableParameter1_obs_b * B + observableParameter2_obs_b").unwrap();
    assert_eq!(expr.variables().len(), 3);

    let expr = Expression::parse("  (  x  +  y  )  *  z  ").unwrap();
    assert_eq!(expr.variables().len(), 3);

    let expr = Expression::parse("sqrt(sigma_abs^2 + (sigma_rel * obs_b)^2)").unwrap();
    assert_eq!(expr.variables(), vec!["obs_b", "sigma_abs", "sigma_rel"]);

    let expr = Expression::parse("x + (-y)").unwrap();
    assert_eq!(expr.variables().len(), 2);

    assert!(Expression::parse("").is_err());
    assert!(Expression::parse("x +").is_err());
    assert!(Expression::parse("x + (y").is_err());
    assert!(Expression::parse("@#$%").is_err());
}

#[test]
fn test_expression_variables_deduplicated() {
    let expr = Expression::parse("x + x + x").unwrap();
    assert_eq!(expr.variables(), vec!["x"]);

    let expr = Expression::parse("2 * (x + y) / z").unwrap();
    assert_eq!(expr.variables(), vec!["x", "y", "z"]);
}

#[test]
fn test_expression_evaluation_simple() {
    let mut context = SimpleContext::new();
    context.set_variable("x", 2.0);
    context.set_variable("y", 3.0);

    let eval = |s: &str| Expression::parse(s).unwrap().evaluate(&context).unwrap();
    assert_eq!(eval("42"), 42.0);
    assert_eq!(eval("-x"), -2.0);
    assert_eq!(eval("x - y"), -1.0);
    assert_eq!(eval("y / x"), 1.5);
    assert_eq!(eval("x^2 + y^2"), 13.0);
    assert_eq!(eval("(x + y) * (x - y)"), -5.0);
    assert_eq!(eval("1 - 2 + 3"), 2.0);
    assert_eq!(eval("2 * 3 / 4"), 1.5);
}

#[test]
fn test_expression_evaluation_functions() {
    let mut context = SimpleContext::new();
    context.set_variable("x", 2.0);
    context.set_variable("z", 4.0);

    let eval = |s: &str| Expression::parse(s).unwrap().evaluate(&context).unwrap();
    assert!((eval("exp(x)") - 2f64.exp()).abs() < 1e-10);
    assert!((eval("log(z)") - 4f64.ln()).abs() < 1e-10);
    assert!((eval("ln(z)") - 4f64.ln()).abs() < 1e-10);
    assert!((eval("log10(z)") - 4f64.log10()).abs() < 1e-10);
    assert!((eval("log(8, x)") - 3.0).abs() < 1e-10);
    assert_eq!(eval("sqrt(z)"), 2.0);
    assert_eq!(eval("abs(-x)"), 2.0);
    assert_eq!(eval("max(x, z, 3)"), 4.0);
    assert_eq!(eval("min(x, z)"), 2.0);
    assert_eq!(eval("pow(x, 3)"), 8.0);
}

#[test]
fn test_hashmap_context() {
    let mut context: HashMap<String, f64> = HashMap::new();
    context.insert("noiseParameter1_obs_a".to_string(), 0.5);
    context.insert("obs_a".to_string(), 2.0);
    assert!(context.has_variable("obs_a"));
    assert!(!context.has_variable("obs_b"));

    let expr = Expression::parse("noiseParameter1_obs_a * obs_a").unwrap();
    assert_eq!(expr.evaluate(&context).unwrap(), 1.0);

    match Expression::parse("obs_b").unwrap().evaluate(&context) {
        Err(ExpressionError::UndefinedVariable { name }) => assert_eq!(name, "obs_b"),
        other => panic!("Expected UndefinedVariable, got {other:?}"),
    }
}

#[test]
fn test_constant_literals() {
    assert_eq!(Expression::parse("0.25").unwrap().as_constant(), Some(0.25));
    assert_eq!(Expression::parse("-1e-2").unwrap().as_constant(), Some(-0.01));
    assert_eq!(Expression::parse("2 * k").unwrap().as_constant(), None);
}
