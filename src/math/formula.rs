//! Infix formula syntax (`(vm * s1)/(km + s1)`).
//!
//! Parsing happens in two passes. The tokenizer groups everything inside
//! parentheses into nested [`Token::Group`]s, then the parser splits each
//! token slice at every operator of one precedence level and folds the
//! operands left to right, recursing only into groups.

use crate::generator::attributes::encode_double;
use crate::math::{AstNode, Constant, MAX_DEPTH, Operator};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid formula: {message}")]
pub struct FormulaError {
    pub message: String,
}

impl FormulaError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Parse an infix formula into an expression tree.
///
/// Input nested deeper than [`MAX_DEPTH`] levels, or with more than
/// [`MAX_GROUP_NESTING`] levels of parentheses, is rejected.
pub fn parse_formula(text: &str) -> Result<AstNode, FormulaError> {
    let chars: Vec<char> = text.chars().collect();
    let mut position = 0;
    let tokens = tokenize_group(&chars, &mut position, 0)?;
    parse_sum(&tokens).map(|parsed| parsed.node)
}

/// Deepest parenthesis nesting accepted by [`parse_formula`].
pub const MAX_GROUP_NESTING: usize = 128;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Comma,
    Number(String),
    Name(String),
    Group(Vec<Token>),
}

impl Token {
    fn is_operand(&self) -> bool {
        matches!(self, Token::Number(_) | Token::Name(_) | Token::Group(_))
    }
}

/// Tokenize up to the `)` closing this group. `depth` 0 is the whole input.
fn tokenize_group(
    chars: &[char],
    position: &mut usize,
    depth: usize,
) -> Result<Vec<Token>, FormulaError> {
    let mut output = Vec::new();
    while let Some(&c) = chars.get(*position) {
        *position += 1;
        match c {
            c if c.is_whitespace() => {}
            '+' => output.push(Token::Plus),
            '-' => output.push(Token::Minus),
            '*' => output.push(Token::Star),
            '/' => output.push(Token::Slash),
            '^' => output.push(Token::Caret),
            ',' => output.push(Token::Comma),
            '(' => {
                if depth >= MAX_GROUP_NESTING {
                    return Err(FormulaError::new(format!(
                        "parentheses nested deeper than {} levels",
                        MAX_GROUP_NESTING
                    )));
                }
                output.push(Token::Group(tokenize_group(chars, position, depth + 1)?));
            }
            ')' => {
                return if depth == 0 {
                    Err(FormulaError::new("unexpected ')'"))
                } else {
                    Ok(output)
                };
            }
            c if c.is_ascii_digit() || c == '.' => {
                output.push(Token::Number(read_number(chars, position, c)));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut name = String::from(c);
                while let Some(&next) = chars.get(*position) {
                    if next.is_alphanumeric() || next == '_' {
                        name.push(next);
                        *position += 1;
                    } else {
                        break;
                    }
                }
                output.push(Token::Name(name));
            }
            other => return Err(FormulaError::new(format!("unexpected '{}'", other))),
        }
    }
    if depth == 0 {
        Ok(output)
    } else {
        Err(FormulaError::new("expected ')'"))
    }
}

fn read_number(chars: &[char], position: &mut usize, first: char) -> String {
    let mut number = String::from(first);
    while let Some(&c) = chars.get(*position) {
        if c.is_ascii_digit() || c == '.' {
            number.push(c);
            *position += 1;
        } else {
            break;
        }
    }
    // Exponent: `e`/`E`, optional sign, at least one digit.
    if let Some(&e) = chars.get(*position) {
        if e == 'e' || e == 'E' {
            let mut lookahead = *position + 1;
            let mut exponent = String::from("e");
            if let Some(&sign) = chars.get(lookahead) {
                if sign == '+' || sign == '-' {
                    exponent.push(sign);
                    lookahead += 1;
                }
            }
            let digits_start = lookahead;
            while let Some(&d) = chars.get(lookahead) {
                if d.is_ascii_digit() {
                    exponent.push(d);
                    lookahead += 1;
                } else {
                    break;
                }
            }
            if lookahead > digits_start {
                number.push_str(&exponent);
                *position = lookahead;
            }
        }
    }
    number
}

/// A parsed subtree and its height, so depth is checked without walking it.
struct Parsed {
    node: AstNode,
    height: usize,
}

impl Parsed {
    fn leaf(node: AstNode) -> Self {
        Self { node, height: 1 }
    }
}

fn check_height(height: usize) -> Result<(), FormulaError> {
    if height > MAX_DEPTH {
        Err(FormulaError::new(format!(
            "expression nested deeper than {} levels",
            MAX_DEPTH
        )))
    } else {
        Ok(())
    }
}

fn build(op: Operator, args: Vec<Parsed>) -> Result<Parsed, FormulaError> {
    let height = 1 + args.iter().map(|a| a.height).max().unwrap_or(0);
    check_height(height)?;
    Ok(Parsed {
        node: AstNode::apply(op, args.into_iter().map(|a| a.node).collect()),
        height,
    })
}

/// Append `right` to an n-ary node of the same operator, or start one.
fn join_nary(op: Operator, left: Parsed, right: Parsed) -> Result<Parsed, FormulaError> {
    match left.node {
        AstNode::Apply { op: left_op, mut args } if left_op == op && args.len() >= 2 => {
            let height = left.height.max(right.height + 1);
            check_height(height)?;
            args.push(right.node);
            Ok(Parsed {
                node: AstNode::Apply { op, args },
                height,
            })
        }
        node => build(
            op,
            vec![
                Parsed {
                    node,
                    height: left.height,
                },
                right,
            ],
        ),
    }
}

/// Split `data` at every top-level binary operator matched by `is_op`. An
/// operator only counts as binary when it follows an operand.
fn split_binary<'a>(
    data: &'a [Token],
    is_op: impl Fn(&Token) -> bool,
) -> (&'a [Token], Vec<(&'a Token, &'a [Token])>) {
    let positions: Vec<usize> = (1..data.len())
        .filter(|&i| is_op(&data[i]) && data[i - 1].is_operand())
        .collect();
    let Some(&first_op) = positions.first() else {
        return (data, Vec::new());
    };
    let rest = positions
        .iter()
        .enumerate()
        .map(|(n, &i)| {
            let end = positions.get(n + 1).copied().unwrap_or(data.len());
            (&data[i], &data[i + 1..end])
        })
        .collect();
    (&data[..first_op], rest)
}

fn parse_sum(data: &[Token]) -> Result<Parsed, FormulaError> {
    let (first, rest) = split_binary(data, |t| matches!(t, Token::Plus | Token::Minus));
    let mut acc = parse_product(first)?;
    for (op, operand) in rest {
        let right = parse_product(operand)?;
        acc = match op {
            Token::Plus => join_nary(Operator::Plus, acc, right)?,
            _ => build(Operator::Minus, vec![acc, right])?,
        };
    }
    Ok(acc)
}

fn parse_product(data: &[Token]) -> Result<Parsed, FormulaError> {
    let (first, rest) = split_binary(data, |t| matches!(t, Token::Star | Token::Slash));
    let mut acc = parse_unary(first)?;
    for (op, operand) in rest {
        let right = parse_unary(operand)?;
        acc = match op {
            Token::Star => join_nary(Operator::Times, acc, right)?,
            _ => build(Operator::Divide, vec![acc, right])?,
        };
    }
    Ok(acc)
}

fn parse_unary(data: &[Token]) -> Result<Parsed, FormulaError> {
    let signs = data
        .iter()
        .take_while(|t| matches!(t, Token::Plus | Token::Minus))
        .count();
    let mut value = parse_power(&data[signs..])?;
    for sign in data[..signs].iter().rev() {
        if *sign == Token::Minus {
            value = negate(value)?;
        }
    }
    Ok(value)
}

fn negate(value: Parsed) -> Result<Parsed, FormulaError> {
    let height = value.height;
    let node = match value.node {
        AstNode::Integer(v) => AstNode::Integer(-v),
        AstNode::Real(v) => AstNode::Real(-v),
        AstNode::RealE { mantissa, exponent } => AstNode::RealE {
            mantissa: -mantissa,
            exponent,
        },
        other => return build(Operator::Minus, vec![Parsed { node: other, height }]),
    };
    Ok(Parsed { node, height })
}

fn parse_power(data: &[Token]) -> Result<Parsed, FormulaError> {
    let (first, rest) = split_binary(data, |t| matches!(t, Token::Caret));
    let mut acc = parse_terminal(first)?;
    for (_, operand) in rest {
        let exponent = parse_unary(operand)?;
        acc = build(Operator::Power, vec![acc, exponent])?;
    }
    Ok(acc)
}

fn parse_terminal(data: &[Token]) -> Result<Parsed, FormulaError> {
    match data {
        [] => Err(FormulaError::new("expected an expression, found nothing")),
        [Token::Number(text)] => parse_number(text).map(Parsed::leaf),
        [Token::Name(name)] => Ok(Parsed::leaf(name_to_node(name))),
        [Token::Group(inner)] => parse_sum(inner),
        [Token::Name(name), Token::Group(args)] => {
            let args = split_arguments(args)?;
            // piecewise and lambda add one wrapper level in MathML
            let height = 2 + args.iter().map(|a| a.height).max().unwrap_or(0);
            check_height(height)?;
            let node = call_to_node(name, args.into_iter().map(|a| a.node).collect())?;
            Ok(Parsed { node, height })
        }
        _ => Err(FormulaError::new(format!(
            "unexpected token sequence {:?}",
            data
        ))),
    }
}

fn split_arguments(data: &[Token]) -> Result<Vec<Parsed>, FormulaError> {
    if data.is_empty() {
        return Ok(Vec::new());
    }
    data.split(|t| *t == Token::Comma).map(parse_sum).collect()
}

fn parse_number(text: &str) -> Result<AstNode, FormulaError> {
    let invalid = || FormulaError::new(format!("invalid number '{}'", text));
    if let Some((mantissa, exponent)) = text.split_once(|c| c == 'e' || c == 'E') {
        let mantissa: f64 = mantissa.parse().map_err(|_| invalid())?;
        let exponent: i64 = exponent.parse().map_err(|_| invalid())?;
        return Ok(AstNode::RealE { mantissa, exponent });
    }
    if text.contains('.') {
        return text.parse().map(AstNode::Real).map_err(|_| invalid());
    }
    text.parse().map(AstNode::Integer).map_err(|_| invalid())
}

fn name_to_node(name: &str) -> AstNode {
    if let Some(constant) = Constant::from_name(name) {
        return AstNode::Constant(constant);
    }
    match name {
        "time" => AstNode::Time(name.to_string()),
        "avogadro" => AstNode::Avogadro(name.to_string()),
        "INF" | "inf" | "infinity" => AstNode::Real(f64::INFINITY),
        "NaN" | "nan" | "notanumber" => AstNode::Real(f64::NAN),
        _ => AstNode::Name(name.to_string()),
    }
}

fn call_to_node(name: &str, mut args: Vec<AstNode>) -> Result<AstNode, FormulaError> {
    let arity = |expected: usize, args: &[AstNode]| {
        if args.len() == expected {
            Ok(())
        } else {
            Err(FormulaError::new(format!(
                "{}() takes {} argument(s), found {}",
                name,
                expected,
                args.len()
            )))
        }
    };
    match name {
        "lambda" => {
            let body = args
                .pop()
                .ok_or_else(|| FormulaError::new("lambda() needs a body"))?;
            let bvars = args
                .into_iter()
                .map(|a| match a {
                    AstNode::Name(n) => Ok(n),
                    other => Err(FormulaError::new(format!(
                        "lambda() argument {:?} is not a name",
                        other
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(AstNode::Lambda {
                bvars,
                body: Box::new(body),
            })
        }
        "piecewise" => {
            let otherwise = if args.len() % 2 == 1 {
                args.pop().map(Box::new)
            } else {
                None
            };
            let mut pieces = Vec::with_capacity(args.len() / 2);
            let mut it = args.into_iter();
            while let (Some(value), Some(condition)) = (it.next(), it.next()) {
                pieces.push((value, condition));
            }
            Ok(AstNode::Piecewise { pieces, otherwise })
        }
        "sqrt" => {
            arity(1, &args)?;
            args.insert(0, AstNode::Integer(2));
            Ok(AstNode::apply(Operator::Root, args))
        }
        "log10" => {
            arity(1, &args)?;
            args.insert(0, AstNode::Integer(10));
            Ok(AstNode::apply(Operator::Log, args))
        }
        "log" if args.len() == 1 => Ok(AstNode::apply(Operator::Ln, args)),
        "pow" | "power" => {
            arity(2, &args)?;
            Ok(AstNode::apply(Operator::Power, args))
        }
        "ceil" => Ok(AstNode::apply(Operator::Ceiling, args)),
        _ => match Operator::from_name(name) {
            Some(op) => Ok(AstNode::apply(op, args)),
            None => Ok(AstNode::Call {
                name: name.to_string(),
                args,
            }),
        },
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Rendering
// ────────────────────────────────────────────────────────────────────────────

const PREC_SUM: u8 = 1;
const PREC_PRODUCT: u8 = 2;
const PREC_UNARY: u8 = 3;
const PREC_POWER: u8 = 4;
const PREC_ATOM: u8 = 5;

impl AstNode {
    /// Render as infix text accepted by [`parse_formula`].
    pub fn to_formula(&self) -> String {
        let mut out = String::new();
        write_formula(&mut out, self);
        out
    }

    fn precedence(&self) -> u8 {
        match self {
            AstNode::Apply { op, args } => match op {
                Operator::Plus if args.len() >= 2 => PREC_SUM,
                Operator::Minus if args.len() == 2 => PREC_SUM,
                Operator::Minus if args.len() == 1 => PREC_UNARY,
                Operator::Times | Operator::Divide if args.len() >= 2 => PREC_PRODUCT,
                Operator::Power if args.len() == 2 => PREC_POWER,
                _ => PREC_ATOM,
            },
            AstNode::Integer(v) if *v < 0 => PREC_UNARY,
            AstNode::Real(v) if *v < 0.0 => PREC_UNARY,
            AstNode::RealE { mantissa, .. } if *mantissa < 0.0 => PREC_UNARY,
            _ => PREC_ATOM,
        }
    }
}

fn write_operand(out: &mut String, node: &AstNode, parent: u8, strict: bool) {
    let p = node.precedence();
    if p < parent || (strict && p == parent) {
        out.push('(');
        write_formula(out, node);
        out.push(')');
    } else {
        write_formula(out, node);
    }
}

fn write_call(out: &mut String, name: &str, args: &[AstNode]) {
    out.push_str(name);
    out.push('(');
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_formula(out, arg);
    }
    out.push(')');
}

fn write_formula(out: &mut String, node: &AstNode) {
    match node {
        AstNode::Integer(v) => out.push_str(&v.to_string()),
        AstNode::Real(v) if !v.is_finite() => out.push_str(&encode_double(*v)),
        AstNode::Real(v) => {
            // Plain digits with a decimal point so the text reads back as a real.
            let text = v.to_string();
            out.push_str(&text);
            if !text.contains('.') {
                out.push_str(".0");
            }
        }
        AstNode::RealE { mantissa, exponent } => {
            out.push_str(&mantissa.to_string());
            out.push('e');
            out.push_str(&exponent.to_string());
        }
        AstNode::Rational {
            numerator,
            denominator,
        } => {
            out.push_str(&format!("({}/{})", numerator, denominator));
        }
        AstNode::Name(name) | AstNode::Time(name) | AstNode::Avogadro(name) => {
            out.push_str(name)
        }
        AstNode::Constant(c) => out.push_str(c.name()),
        AstNode::Apply { op, args } => write_apply(out, *op, args),
        AstNode::Call { name, args } => write_call(out, name, args),
        AstNode::Lambda { bvars, body } => {
            out.push_str("lambda(");
            for bvar in bvars {
                out.push_str(bvar);
                out.push_str(", ");
            }
            write_formula(out, body);
            out.push(')');
        }
        AstNode::Piecewise { pieces, otherwise } => {
            let mut args: Vec<AstNode> = Vec::new();
            for (value, condition) in pieces {
                args.push(value.clone());
                args.push(condition.clone());
            }
            if let Some(o) = otherwise {
                args.push((**o).clone());
            }
            write_call(out, "piecewise", &args);
        }
    }
}

fn write_apply(out: &mut String, op: Operator, args: &[AstNode]) {
    let infix = match (op, args.len()) {
        (Operator::Plus, n) if n >= 2 => Some((" + ", PREC_SUM)),
        (Operator::Minus, 2) => Some((" - ", PREC_SUM)),
        (Operator::Times, n) if n >= 2 => Some((" * ", PREC_PRODUCT)),
        (Operator::Divide, 2) => Some((" / ", PREC_PRODUCT)),
        (Operator::Power, 2) => Some(("^", PREC_POWER)),
        _ => None,
    };
    if let Some((symbol, precedence)) = infix {
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                out.push_str(symbol);
            }
            write_operand(out, arg, precedence, i > 0);
        }
        return;
    }
    match (op, args) {
        (Operator::Minus, [operand]) => {
            out.push('-');
            write_operand(out, operand, PREC_UNARY, false);
        }
        (Operator::Root, [AstNode::Integer(2), x]) => write_call(out, "sqrt", std::slice::from_ref(x)),
        (Operator::Log, [AstNode::Integer(10), x]) => write_call(out, "log10", std::slice::from_ref(x)),
        _ => write_call(out, op.name(), args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ci(name: &str) -> AstNode {
        AstNode::name(name)
    }

    #[test]
    fn michaelis_menten() {
        let ast = parse_formula("(vm * s1)/(km + s1)").unwrap();
        assert_eq!(
            ast,
            AstNode::apply(
                Operator::Divide,
                vec![
                    AstNode::apply(Operator::Times, vec![ci("vm"), ci("s1")]),
                    AstNode::apply(Operator::Plus, vec![ci("km"), ci("s1")]),
                ]
            )
        );
        assert_eq!(ast.to_formula(), "vm * s1 / (km + s1)");
    }

    #[test]
    fn sums_are_nary_and_left_associative() {
        let ast = parse_formula("a + b + c - d").unwrap();
        assert_eq!(
            ast,
            AstNode::apply(
                Operator::Minus,
                vec![
                    AstNode::apply(Operator::Plus, vec![ci("a"), ci("b"), ci("c")]),
                    ci("d"),
                ]
            )
        );
        assert_eq!(parse_formula("a - (b - c)").unwrap().to_formula(), "a - (b - c)");
    }

    #[test]
    fn unary_minus_and_literals() {
        assert_eq!(parse_formula("-3").unwrap(), AstNode::Integer(-3));
        assert_eq!(parse_formula("2.5").unwrap(), AstNode::Real(2.5));
        assert_eq!(
            parse_formula("1.5e-3").unwrap(),
            AstNode::RealE {
                mantissa: 1.5,
                exponent: -3
            }
        );
        assert_eq!(
            parse_formula("a * -b").unwrap(),
            AstNode::apply(
                Operator::Times,
                vec![ci("a"), AstNode::apply(Operator::Minus, vec![ci("b")])]
            )
        );
        assert_eq!(
            parse_formula("-x^2").unwrap(),
            AstNode::apply(
                Operator::Minus,
                vec![AstNode::apply(
                    Operator::Power,
                    vec![ci("x"), AstNode::Integer(2)]
                )]
            )
        );
    }

    #[test]
    fn functions_and_symbols() {
        assert_eq!(
            parse_formula("sqrt(x)").unwrap(),
            AstNode::apply(Operator::Root, vec![AstNode::Integer(2), ci("x")])
        );
        assert_eq!(
            parse_formula("delay(x, 0.5)").unwrap(),
            AstNode::apply(Operator::Delay, vec![ci("x"), AstNode::Real(0.5)])
        );
        assert_eq!(parse_formula("time").unwrap(), AstNode::Time("time".into()));
        assert_eq!(
            parse_formula("f(x, 2)").unwrap(),
            AstNode::Call {
                name: "f".into(),
                args: vec![ci("x"), AstNode::Integer(2)]
            }
        );
        assert_eq!(
            parse_formula("lambda(x, y, x + y)").unwrap(),
            AstNode::Lambda {
                bvars: vec!["x".into(), "y".into()],
                body: Box::new(AstNode::apply(Operator::Plus, vec![ci("x"), ci("y")])),
            }
        );
    }

    #[test]
    fn piecewise_with_otherwise() {
        let ast = parse_formula("piecewise(1, lt(t, 5), 0)").unwrap();
        assert_eq!(
            ast,
            AstNode::Piecewise {
                pieces: vec![(
                    AstNode::Integer(1),
                    AstNode::apply(Operator::Lt, vec![ci("t"), AstNode::Integer(5)])
                )],
                otherwise: Some(Box::new(AstNode::Integer(0))),
            }
        );
        assert_eq!(ast.to_formula(), "piecewise(1, lt(t, 5), 0)");
    }

    #[test]
    fn rendered_formulas_parse_back() {
        for text in [
            "k1 * S1 * S2",
            "(a + b)^2",
            "-(a + b)",
            "a / (b * c)",
            "exp(-k * time)",
            "log10(x) + sqrt(y)",
        ] {
            let ast = parse_formula(text).unwrap();
            assert_eq!(parse_formula(&ast.to_formula()).unwrap(), ast, "{}", text);
        }
    }

    #[test]
    fn long_operator_chains_parse_flat() {
        let terms = 10_000;
        let sum = parse_formula(&vec!["a"; terms].join(" + ")).unwrap();
        match &sum {
            AstNode::Apply {
                op: Operator::Plus,
                args,
            } => assert_eq!(args.len(), terms),
            other => panic!("expected a flat sum, got {:?}", other),
        }
        assert_eq!(parse_formula(&sum.to_formula()).unwrap(), sum);

        let product = parse_formula(&vec!["k"; terms].join(" * ")).unwrap();
        assert!(matches!(
            product,
            AstNode::Apply { op: Operator::Times, ref args } if args.len() == terms
        ));
    }

    #[test]
    fn excessive_nesting_is_an_error() {
        let deep_minus = vec!["a"; 10_000].join(" - ");
        let err = parse_formula(&deep_minus).unwrap_err();
        assert!(err.message.contains("nested deeper"), "{}", err);

        let parens = format!("{}a{}", "(".repeat(1000), ")".repeat(1000));
        let err = parse_formula(&parens).unwrap_err();
        assert!(err.message.contains("parentheses"), "{}", err);

        let signs = format!("{}x", "-".repeat(10_000));
        assert!(parse_formula(&signs).is_err());

        let ok = format!("{}a{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(parse_formula(&ok).unwrap(), ci("a"));
        assert_eq!(parse_formula("- - 3").unwrap(), AstNode::Integer(3));
    }

    #[test]
    fn reals_render_as_reals() {
        assert_eq!(AstNode::Real(2.0).to_formula(), "2.0");
        assert_eq!(parse_formula("2.0").unwrap(), AstNode::Real(2.0));
        for node in [
            AstNode::Real(2.0),
            AstNode::Real(1e20),
            AstNode::Real(-0.5),
            AstNode::RealE {
                mantissa: 1e20,
                exponent: 5,
            },
            AstNode::RealE {
                mantissa: 2.0,
                exponent: -3,
            },
        ] {
            assert_eq!(parse_formula(&node.to_formula()).unwrap(), node, "{:?}", node);
        }
    }

    #[test]
    fn malformed_input_is_rejected() {
        assert!(parse_formula("(a + b").is_err());
        assert!(parse_formula("a + b)").is_err());
        assert!(parse_formula("a +").is_err());
        assert!(parse_formula("a $ b").is_err());
        assert!(parse_formula("sqrt(a, b)").is_err());
    }
}
