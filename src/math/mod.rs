//! Mathematical expressions attached to SBML elements.
//!
//! - [`formula`] – SBML Level 1 style infix text to [`AstNode`] and back.
//! - [`mathml`] – [`AstNode`] to and from content MathML.

pub mod formula;
pub mod mathml;

pub use formula::{FormulaError, parse_formula};

use serde::{Deserialize, Serialize};

/// Deepest expression tree accepted from formula text or MathML.
pub const MAX_DEPTH: usize = 512;

/// Built-in MathML operators and functions (`<apply><op/> ...</apply>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Plus,
    Minus,
    Times,
    Divide,
    Power,
    Abs,
    Arccos,
    Arccosh,
    Arccot,
    Arccoth,
    Arccsc,
    Arccsch,
    Arcsec,
    Arcsech,
    Arcsin,
    Arcsinh,
    Arctan,
    Arctanh,
    Ceiling,
    Cos,
    Cosh,
    Cot,
    Coth,
    Csc,
    Csch,
    /// `csymbol` delay, not a MathML element.
    Delay,
    Exp,
    Factorial,
    Floor,
    Ln,
    /// First argument is the `<logbase>` when two arguments are present.
    Log,
    /// First argument is the `<degree>` when two arguments are present.
    Root,
    Sec,
    Sech,
    Sin,
    Sinh,
    Tan,
    Tanh,
    And,
    Not,
    Or,
    Xor,
    Eq,
    Geq,
    Gt,
    Leq,
    Lt,
    Neq,
}

const OPERATORS: &[(Operator, &str)] = &[
    (Operator::Plus, "plus"),
    (Operator::Minus, "minus"),
    (Operator::Times, "times"),
    (Operator::Divide, "divide"),
    (Operator::Power, "power"),
    (Operator::Abs, "abs"),
    (Operator::Arccos, "arccos"),
    (Operator::Arccosh, "arccosh"),
    (Operator::Arccot, "arccot"),
    (Operator::Arccoth, "arccoth"),
    (Operator::Arccsc, "arccsc"),
    (Operator::Arccsch, "arccsch"),
    (Operator::Arcsec, "arcsec"),
    (Operator::Arcsech, "arcsech"),
    (Operator::Arcsin, "arcsin"),
    (Operator::Arcsinh, "arcsinh"),
    (Operator::Arctan, "arctan"),
    (Operator::Arctanh, "arctanh"),
    (Operator::Ceiling, "ceiling"),
    (Operator::Cos, "cos"),
    (Operator::Cosh, "cosh"),
    (Operator::Cot, "cot"),
    (Operator::Coth, "coth"),
    (Operator::Csc, "csc"),
    (Operator::Csch, "csch"),
    (Operator::Delay, "delay"),
    (Operator::Exp, "exp"),
    (Operator::Factorial, "factorial"),
    (Operator::Floor, "floor"),
    (Operator::Ln, "ln"),
    (Operator::Log, "log"),
    (Operator::Root, "root"),
    (Operator::Sec, "sec"),
    (Operator::Sech, "sech"),
    (Operator::Sin, "sin"),
    (Operator::Sinh, "sinh"),
    (Operator::Tan, "tan"),
    (Operator::Tanh, "tanh"),
    (Operator::And, "and"),
    (Operator::Not, "not"),
    (Operator::Or, "or"),
    (Operator::Xor, "xor"),
    (Operator::Eq, "eq"),
    (Operator::Geq, "geq"),
    (Operator::Gt, "gt"),
    (Operator::Leq, "leq"),
    (Operator::Lt, "lt"),
    (Operator::Neq, "neq"),
];

impl Operator {
    /// MathML element name, which is also the function name in infix formulas.
    pub fn name(self) -> &'static str {
        OPERATORS
            .iter()
            .find(|(op, _)| *op == self)
            .map(|(_, name)| *name)
            .unwrap_or("unknown")
    }

    pub fn from_name(name: &str) -> Option<Operator> {
        OPERATORS
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(op, _)| *op)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Constant {
    ExponentialE,
    Pi,
    True,
    False,
}

impl Constant {
    pub fn name(self) -> &'static str {
        match self {
            Constant::ExponentialE => "exponentiale",
            Constant::Pi => "pi",
            Constant::True => "true",
            Constant::False => "false",
        }
    }

    pub fn from_name(name: &str) -> Option<Constant> {
        match name {
            "exponentiale" => Some(Constant::ExponentialE),
            "pi" => Some(Constant::Pi),
            "true" => Some(Constant::True),
            "false" => Some(Constant::False),
            _ => None,
        }
    }
}

/// Expression tree. Operands of `plus` and `times` are kept n-ary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AstNode {
    Integer(i64),
    Real(f64),
    /// `mantissa * 10^exponent`, written as `<cn type="e-notation">`.
    RealE { mantissa: f64, exponent: i64 },
    Rational { numerator: i64, denominator: i64 },
    Name(String),
    /// Simulation time `csymbol`; the string is the symbol's display name.
    Time(String),
    Avogadro(String),
    Constant(Constant),
    Apply { op: Operator, args: Vec<AstNode> },
    /// Call of a user-defined function.
    Call { name: String, args: Vec<AstNode> },
    Lambda { bvars: Vec<String>, body: Box<AstNode> },
    Piecewise {
        pieces: Vec<(AstNode, AstNode)>,
        otherwise: Option<Box<AstNode>>,
    },
}

impl AstNode {
    pub fn name(name: impl Into<String>) -> Self {
        AstNode::Name(name.into())
    }

    pub fn apply(op: Operator, args: Vec<AstNode>) -> Self {
        AstNode::Apply { op, args }
    }

    /// True if `id` is referenced as a plain identifier anywhere in the tree.
    pub fn contains_identifier(&self, id: &str) -> bool {
        match self {
            AstNode::Name(name) => name == id,
            AstNode::Apply { args, .. } | AstNode::Call { args, .. } => {
                args.iter().any(|a| a.contains_identifier(id))
            }
            AstNode::Lambda { body, .. } => body.contains_identifier(id),
            AstNode::Piecewise { pieces, otherwise } => {
                pieces
                    .iter()
                    .any(|(v, c)| v.contains_identifier(id) || c.contains_identifier(id))
                    || otherwise.as_ref().is_some_and(|o| o.contains_identifier(id))
            }
            _ => false,
        }
    }
}
