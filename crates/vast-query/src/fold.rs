//! Constant folding over the value type lattice (§9 Open Question 3:
//! the source left the unary and arithmetic folders unimplemented).
//! Every `Expr` is a closed arithmetic tree with no variables, so
//! folding always terminates in either a `Value` or a `ValidationError`
//! naming the unsupported operator/type pair — never a panic.

use vast_value::{Duration, TimePoint, Value};

use crate::ast::{ArithOp, Expr};
use crate::error::ValidationError;

pub fn fold(expr: &Expr) -> Result<Value, ValidationError> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),
        Expr::Neg(inner) => fold_neg(fold(inner)?),
        Expr::Binary(lhs, op, rhs) => fold_binary(fold(lhs)?, *op, fold(rhs)?),
    }
}

fn fold_neg(v: Value) -> Result<Value, ValidationError> {
    match v {
        Value::Int(i) => Ok(Value::Int(-i)),
        Value::Double(d) => Ok(Value::Double(-d)),
        Value::Duration(d) => Ok(Value::Duration(Duration::from_nanos(-d.as_nanos()))),
        _ => Err(ValidationError::UnfoldableExpression),
    }
}

fn fold_binary(lhs: Value, op: ArithOp, rhs: Value) -> Result<Value, ValidationError> {
    use Value::*;
    match (lhs, rhs) {
        (Int(a), Int(b)) => int_arith(a, op, b).map(Int),
        (UInt(a), UInt(b)) => uint_arith(a, op, b).map(UInt),
        (Double(a), Double(b)) => Ok(Double(double_arith(a, op, b))),
        (Duration(a), Duration(b)) => duration_arith(a, op, b).map(Duration),
        (TimePoint(t), Duration(d)) => timepoint_arith(t, op, d).map(TimePoint),
        _ => Err(ValidationError::UnfoldableExpression),
    }
}

fn int_arith(a: i64, op: ArithOp, b: i64) -> Result<i64, ValidationError> {
    match op {
        ArithOp::Add => Ok(a.wrapping_add(b)),
        ArithOp::Sub => Ok(a.wrapping_sub(b)),
        ArithOp::Mul => Ok(a.wrapping_mul(b)),
        ArithOp::Div if b != 0 => Ok(a / b),
        ArithOp::Div => Err(ValidationError::UnfoldableExpression),
    }
}

fn uint_arith(a: u64, op: ArithOp, b: u64) -> Result<u64, ValidationError> {
    match op {
        ArithOp::Add => Ok(a.wrapping_add(b)),
        ArithOp::Sub => Ok(a.wrapping_sub(b)),
        ArithOp::Mul => Ok(a.wrapping_mul(b)),
        ArithOp::Div if b != 0 => Ok(a / b),
        ArithOp::Div => Err(ValidationError::UnfoldableExpression),
    }
}

fn double_arith(a: f64, op: ArithOp, b: f64) -> f64 {
    match op {
        ArithOp::Add => a + b,
        ArithOp::Sub => a - b,
        ArithOp::Mul => a * b,
        ArithOp::Div => a / b,
    }
}

fn duration_arith(a: Duration, op: ArithOp, b: Duration) -> Result<Duration, ValidationError> {
    match op {
        ArithOp::Add => Ok(a + b),
        ArithOp::Sub => Ok(a - b),
        _ => Err(ValidationError::UnfoldableExpression),
    }
}

fn timepoint_arith(t: TimePoint, op: ArithOp, d: Duration) -> Result<TimePoint, ValidationError> {
    match op {
        ArithOp::Add => Ok(t + d),
        ArithOp::Sub => Ok(t + Duration::from_nanos(-d.as_nanos())),
        _ => Err(ValidationError::UnfoldableExpression),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_integer_arithmetic() {
        let expr = Expr::Binary(
            Box::new(Expr::Literal(Value::Int(2))),
            ArithOp::Mul,
            Box::new(Expr::Literal(Value::Int(3))),
        );
        assert_eq!(fold(&expr).unwrap(), Value::Int(6));
    }

    #[test]
    fn folds_unary_negation() {
        let expr = Expr::Neg(Box::new(Expr::Literal(Value::Int(5))));
        assert_eq!(fold(&expr).unwrap(), Value::Int(-5));
    }

    #[test]
    fn folds_duration_addition() {
        let expr = Expr::Binary(
            Box::new(Expr::Literal(Value::Duration(Duration::from_secs_f64(1.0)))),
            ArithOp::Add,
            Box::new(Expr::Literal(Value::Duration(Duration::from_secs_f64(0.5)))),
        );
        assert_eq!(fold(&expr).unwrap(), Value::Duration(Duration::from_secs_f64(1.5)));
    }

    #[test]
    fn division_by_zero_is_a_validation_error() {
        let expr = Expr::Binary(
            Box::new(Expr::Literal(Value::Int(1))),
            ArithOp::Div,
            Box::new(Expr::Literal(Value::Int(0))),
        );
        assert!(fold(&expr).is_err());
    }

    #[test]
    fn mismatched_types_are_unfoldable() {
        let expr = Expr::Binary(
            Box::new(Expr::Literal(Value::Int(1))),
            ArithOp::Add,
            Box::new(Expr::Literal(Value::String("x".into()))),
        );
        assert!(fold(&expr).is_err());
    }
}
