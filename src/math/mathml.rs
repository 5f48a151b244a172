//! Content MathML for [`AstNode`] trees.

use crate::generator::attributes::{Attributes, decode_double, encode_double};
use crate::generator::xml_writer::XmlWriter;
use crate::math::{AstNode, Constant, MAX_DEPTH, Operator};
use anyhow::{Context, Result, anyhow, bail};
use roxmltree::Node;

pub const MATHML_NS: &str = "http://www.w3.org/1998/Math/MathML";
pub const TIME_SYMBOL: &str = "http://www.sbml.org/sbml/symbols/time";
pub const DELAY_SYMBOL: &str = "http://www.sbml.org/sbml/symbols/delay";
pub const AVOGADRO_SYMBOL: &str = "http://www.sbml.org/sbml/symbols/avogadro";

/// Write a `<math>` element holding `node`.
pub fn write_math(w: &mut XmlWriter, node: &AstNode) {
    let mut attrs = Attributes::new();
    attrs.push("xmlns", MATHML_NS);
    w.element("math", &attrs, |w| write_node(w, node));
}

fn cn(w: &mut XmlWriter, kind: Option<&str>, content: String) {
    let mut attrs = Attributes::new();
    if let Some(kind) = kind {
        attrs.push("type", kind);
    }
    w.inline_element("cn", &attrs, &content);
}

fn csymbol(w: &mut XmlWriter, url: &str, name: &str) {
    let mut attrs = Attributes::new();
    attrs.push("encoding", "text").push("definitionURL", url);
    w.text_element("csymbol", &attrs, &format!(" {} ", name));
}

fn ci(w: &mut XmlWriter, name: &str) {
    w.text_element("ci", &Attributes::new(), &format!(" {} ", name));
}

fn write_node(w: &mut XmlWriter, node: &AstNode) {
    let none = Attributes::new();
    match node {
        AstNode::Integer(v) => cn(w, Some("integer"), format!(" {} ", v)),
        AstNode::Real(v) if v.is_nan() => w.empty_element("notanumber", &none),
        AstNode::Real(v) if v.is_infinite() => {
            if *v > 0.0 {
                w.empty_element("infinity", &none);
            } else {
                w.element("apply", &none, |w| {
                    w.empty_element("minus", &none);
                    w.empty_element("infinity", &none);
                });
            }
        }
        AstNode::Real(v) => cn(w, None, format!(" {} ", encode_double(*v))),
        AstNode::RealE { mantissa, exponent } => cn(
            w,
            Some("e-notation"),
            format!(" {} <sep/> {} ", encode_double(*mantissa), exponent),
        ),
        AstNode::Rational {
            numerator,
            denominator,
        } => cn(
            w,
            Some("rational"),
            format!(" {} <sep/> {} ", numerator, denominator),
        ),
        AstNode::Name(name) => ci(w, name),
        AstNode::Time(name) => csymbol(w, TIME_SYMBOL, name),
        AstNode::Avogadro(name) => csymbol(w, AVOGADRO_SYMBOL, name),
        AstNode::Constant(c) => w.empty_element(c.name(), &none),
        AstNode::Apply {
            op: op @ (Operator::Plus | Operator::Times),
            args,
        } => w.element("apply", &none, |w| {
            w.empty_element(op.name(), &none);
            let mut operands = Vec::with_capacity(args.len());
            flatten_operands(*op, args, &mut operands);
            for arg in operands {
                write_node(w, arg);
            }
        }),
        AstNode::Apply { op, args } => w.element("apply", &none, |w| {
            if *op == Operator::Delay {
                csymbol(w, DELAY_SYMBOL, "delay");
            } else {
                w.empty_element(op.name(), &none);
            }
            let qualifier = match op {
                Operator::Log if args.len() == 2 => Some("logbase"),
                Operator::Root if args.len() == 2 => Some("degree"),
                _ => None,
            };
            let mut rest = args.as_slice();
            if let (Some(tag), Some((first, tail))) = (qualifier, args.split_first()) {
                w.element(tag, &none, |w| write_node(w, first));
                rest = tail;
            }
            for arg in rest {
                write_node(w, arg);
            }
        }),
        AstNode::Call { name, args } => w.element("apply", &none, |w| {
            ci(w, name);
            for arg in args {
                write_node(w, arg);
            }
        }),
        AstNode::Lambda { bvars, body } => w.element("lambda", &none, |w| {
            for bvar in bvars {
                w.element("bvar", &none, |w| ci(w, bvar));
            }
            write_node(w, body);
        }),
        AstNode::Piecewise { pieces, otherwise } => w.element("piecewise", &none, |w| {
            for (value, condition) in pieces {
                w.element("piece", &none, |w| {
                    write_node(w, value);
                    write_node(w, condition);
                });
            }
            if let Some(o) = otherwise {
                w.element("otherwise", &none, |w| write_node(w, o));
            }
        }),
    }
}

/// Operands of an n-ary `op`, with nested applies of the same operator inlined.
fn flatten_operands<'a>(op: Operator, args: &'a [AstNode], out: &mut Vec<&'a AstNode>) {
    for arg in args {
        match arg {
            AstNode::Apply { op: inner, args } if *inner == op && !args.is_empty() => {
                flatten_operands(op, args, out)
            }
            other => out.push(other),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Reading
// ────────────────────────────────────────────────────────────────────────────

fn elements<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|c| c.is_element())
}

fn trimmed_text(node: Node) -> String {
    node.text().map(|s| s.trim().to_string()).unwrap_or_default()
}

/// Read the single expression inside a `<math>` element.
pub fn read_math(math: Node) -> Result<AstNode> {
    let mut children = elements(math);
    let first = children
        .next()
        .ok_or_else(|| anyhow!("<math> has no children"))?;
    if children.next().is_some() {
        bail!("more than one child in <math>");
    }
    read_node(first, 1)
}

fn read_node(node: Node, depth: usize) -> Result<AstNode> {
    if depth > MAX_DEPTH {
        bail!(
            "expression nested deeper than {} levels at <{}>",
            MAX_DEPTH,
            node.tag_name().name()
        );
    }
    let tag = node.tag_name().name();
    match tag {
        "cn" => read_cn(node),
        "ci" => {
            let name = trimmed_text(node);
            if name.is_empty() {
                bail!("empty <ci>");
            }
            Ok(AstNode::Name(name))
        }
        "csymbol" => {
            let name = trimmed_text(node);
            match node.attribute("definitionURL") {
                Some(TIME_SYMBOL) => Ok(AstNode::Time(name)),
                Some(AVOGADRO_SYMBOL) => Ok(AstNode::Avogadro(name)),
                other => bail!("unsupported csymbol {:?}", other),
            }
        }
        "infinity" => Ok(AstNode::Real(f64::INFINITY)),
        "notanumber" => Ok(AstNode::Real(f64::NAN)),
        "apply" => read_apply(node, depth),
        "lambda" => {
            let mut bvars = Vec::new();
            let mut body = None;
            for child in elements(node) {
                if child.tag_name().name() == "bvar" {
                    let ci = elements(child)
                        .next()
                        .ok_or_else(|| anyhow!("empty <bvar>"))?;
                    bvars.push(trimmed_text(ci));
                } else {
                    body = Some(read_node(child, depth + 1)?);
                }
            }
            let body = body.ok_or_else(|| anyhow!("<lambda> without body"))?;
            Ok(AstNode::Lambda {
                bvars,
                body: Box::new(body),
            })
        }
        "piecewise" => {
            let mut pieces = Vec::new();
            let mut otherwise = None;
            for child in elements(node) {
                match child.tag_name().name() {
                    "piece" => {
                        let mut parts = elements(child);
                        match (parts.next(), parts.next()) {
                            (Some(value), Some(condition)) => {
                                pieces.push((read_node(value, depth + 2)?, read_node(condition, depth + 2)?))
                            }
                            _ => bail!("<piece> needs a value and a condition"),
                        }
                    }
                    "otherwise" => {
                        let value = elements(child)
                            .next()
                            .ok_or_else(|| anyhow!("empty <otherwise>"))?;
                        otherwise = Some(Box::new(read_node(value, depth + 2)?));
                    }
                    other => bail!("unexpected <{}> in <piecewise>", other),
                }
            }
            Ok(AstNode::Piecewise { pieces, otherwise })
        }
        other => match Constant::from_name(other) {
            Some(c) => Ok(AstNode::Constant(c)),
            None => bail!("unsupported MathML element <{}>", other),
        },
    }
}

fn read_apply(node: Node, depth: usize) -> Result<AstNode> {
    let mut children = elements(node);
    let head = children
        .next()
        .ok_or_else(|| anyhow!("<apply> with no child elements"))?;

    let mut args = Vec::new();
    for child in children {
        match child.tag_name().name() {
            "logbase" | "degree" => {
                let inner = elements(child)
                    .next()
                    .ok_or_else(|| anyhow!("empty <{}>", child.tag_name().name()))?;
                args.push(read_node(inner, depth + 2)?);
            }
            _ => args.push(read_node(child, depth + 1)?),
        }
    }

    match head.tag_name().name() {
        "ci" => Ok(AstNode::Call {
            name: trimmed_text(head),
            args,
        }),
        "csymbol" if head.attribute("definitionURL") == Some(DELAY_SYMBOL) => {
            Ok(AstNode::apply(Operator::Delay, args))
        }
        name => {
            let op = Operator::from_name(name)
                .filter(|op| *op != Operator::Delay)
                .ok_or_else(|| anyhow!("unsupported MathML operator <{}>", name))?;
            if let (Operator::Minus, [AstNode::Real(v)]) = (op, args.as_slice()) {
                if v.is_infinite() && *v > 0.0 {
                    return Ok(AstNode::Real(f64::NEG_INFINITY));
                }
            }
            Ok(AstNode::apply(op, args))
        }
    }
}

fn read_cn(node: Node) -> Result<AstNode> {
    let parts: Vec<&str> = node
        .children()
        .filter(|c| c.is_text())
        .filter_map(|c| c.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    let kind = node.attribute("type").unwrap_or("real");
    let first = parts.first().copied().unwrap_or("");
    match kind {
        "integer" => first
            .parse()
            .map(AstNode::Integer)
            .with_context(|| format!("invalid integer <cn> '{}'", first)),
        "real" => decode_double(first)
            .map(AstNode::Real)
            .ok_or_else(|| anyhow!("invalid real <cn> '{}'", first)),
        "e-notation" | "rational" => {
            let [left, right] = parts.as_slice() else {
                bail!("<cn type=\"{}\"> needs two parts separated by <sep/>", kind);
            };
            if kind == "e-notation" {
                let mantissa = decode_double(left)
                    .ok_or_else(|| anyhow!("invalid mantissa '{}'", left))?;
                let exponent = right
                    .parse()
                    .with_context(|| format!("invalid exponent '{}'", right))?;
                Ok(AstNode::RealE { mantissa, exponent })
            } else {
                let numerator = left
                    .parse()
                    .with_context(|| format!("invalid numerator '{}'", left))?;
                let denominator = right
                    .parse()
                    .with_context(|| format!("invalid denominator '{}'", right))?;
                Ok(AstNode::Rational {
                    numerator,
                    denominator,
                })
            }
        }
        other => bail!("unsupported <cn> type '{}'", other),
    }
}
