use crate::{environment::prelude::DnclObject, lexer::prelude::Token, utils::prelude::SrcSpan};

fn mismatch(operator: &Token, left: &DnclObject, right: &DnclObject, location: SrcSpan) -> DnclObject {
    DnclObject::type_error(
        format!(
            "`{}` は{}と{}には使えません",
            operator.as_literal(),
            left.type_name(),
            right.type_name()
        ),
        location
    )
}

fn overflow(location: SrcSpan) -> DnclObject {
    DnclObject::error("計算結果が整数の範囲を超えました", location)
}

pub fn eval_infix(
    operator: &Token,
    left: DnclObject,
    right: DnclObject,
    location: SrcSpan
) -> DnclObject {
    match (&left, &right) {
        (
            DnclObject::Int { value: left_value, .. },
            DnclObject::Int { value: right_value, .. }
        ) => eval_int_infix(operator, *left_value, *right_value, location)
            .unwrap_or_else(|| mismatch(operator, &left, &right, location)),
        (
            DnclObject::String { value: left_value, .. },
            DnclObject::String { value: right_value, .. }
        ) => {
            let value = match operator {
                Token::Plus => return DnclObject::string(format!("{left_value}{right_value}"), location),
                Token::LessThan => left_value < right_value,
                Token::LessThanOrEqual => left_value <= right_value,
                Token::GreaterThan => left_value > right_value,
                Token::GreaterThanOrEqual => left_value >= right_value,
                Token::Equal => left_value == right_value,
                Token::NotEqual => left_value != right_value,
                _ => return mismatch(operator, &left, &right, location)
            };

            DnclObject::boolean(value, location)
        },
        (DnclObject::String { value: left_value, .. }, DnclObject::Int { value: right_value, .. })
            if *operator == Token::Plus => DnclObject::string(format!("{left_value}{right_value}"), location),
        (DnclObject::Int { value: left_value, .. }, DnclObject::String { value: right_value, .. })
            if *operator == Token::Plus => DnclObject::string(format!("{left_value}{right_value}"), location),
        (
            DnclObject::Boolean { value: left_value, .. },
            DnclObject::Boolean { value: right_value, .. }
        ) => match operator {
            Token::And => DnclObject::boolean(*left_value && *right_value, location),
            Token::Or => DnclObject::boolean(*left_value || *right_value, location),
            Token::Equal => DnclObject::boolean(left_value == right_value, location),
            Token::NotEqual => DnclObject::boolean(left_value != right_value, location),
            _ => mismatch(operator, &left, &right, location)
        },
        _ => match operator {
            // values of different kinds are never equal
            Token::Equal => DnclObject::boolean(left == right, location),
            Token::NotEqual => DnclObject::boolean(left != right, location),
            _ => mismatch(operator, &left, &right, location)
        }
    }
}

/// `None` when `operator` has no integer meaning.
fn eval_int_infix(operator: &Token, left: i64, right: i64, location: SrcSpan) -> Option<DnclObject> {
    let arithmetic = |value: Option<i64>| match value {
        Some(value) => DnclObject::int(value, location),
        None => overflow(location),
    };

    let value = match operator {
        Token::Plus => arithmetic(left.checked_add(right)),
        Token::Minus => arithmetic(left.checked_sub(right)),
        Token::Asterisk => arithmetic(left.checked_mul(right)),
        Token::Slash | Token::IntDiv | Token::Percent if right == 0 => {
            DnclObject::error("0 で割ることはできません", location)
        },
        Token::Slash | Token::IntDiv => arithmetic(left.checked_div(right)),
        Token::Percent => arithmetic(left.checked_rem(right)),
        Token::LessThan => DnclObject::boolean(left < right, location),
        Token::LessThanOrEqual => DnclObject::boolean(left <= right, location),
        Token::GreaterThan => DnclObject::boolean(left > right, location),
        Token::GreaterThanOrEqual => DnclObject::boolean(left >= right, location),
        Token::Equal => DnclObject::boolean(left == right, location),
        Token::NotEqual => DnclObject::boolean(left != right, location),
        _ => return None
    };

    Some(value)
}

pub fn eval_prefix(operator: &Token, operand: DnclObject, location: SrcSpan) -> DnclObject {
    match (operator, &operand) {
        (Token::Minus, DnclObject::Int { value, .. }) => match value.checked_neg() {
            Some(value) => DnclObject::int(value, location),
            None => overflow(location),
        },
        (Token::Plus, DnclObject::Int { value, .. }) => DnclObject::int(*value, location),
        (Token::Not, DnclObject::Boolean { value, .. }) => DnclObject::boolean(!value, location),
        _ => DnclObject::type_error(
            format!("`{}` は{}には使えません", operator.as_literal(), operand.type_name()),
            location
        )
    }
}
