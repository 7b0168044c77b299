use std::fmt;

use rust_decimal::Decimal;

use crate::ast::{BinOp, UnaryOp};

/// Literal type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralType {
    Number,
    String,
    Boolean,
    Null,
}

/// Decoded literal value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    /// Number literal, kept as an exact decimal
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 0.15
    /// ```
    Number(Decimal),

    /// String literal with escapes resolved
    String(String),

    /// `TRUE` / `FALSE`
    Boolean(bool),

    /// `NULL`
    Null,
}

impl Literal {
    pub fn literal_type(&self) -> LiteralType {
        match self {
            Literal::Number(_) => LiteralType::Number,
            Literal::String(_) => LiteralType::String,
            Literal::Boolean(_) => LiteralType::Boolean,
            Literal::Null => LiteralType::Null,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{}", n),
            Literal::String(s) => {
                f.write_str("'")?;
                for ch in s.chars() {
                    match ch {
                        '\'' => f.write_str("\\'")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\t' => f.write_str("\\t")?,
                        '\r' => f.write_str("\\r")?,
                        c => write!(f, "{}", c)?,
                    }
                }
                f.write_str("'")
            }
            Literal::Boolean(true) => f.write_str("TRUE"),
            Literal::Boolean(false) => f.write_str("FALSE"),
            Literal::Null => f.write_str("NULL"),
        }
    }
}

/// Abstract Syntax Tree node representing a parsed formula.
///
/// Every node records `position`, the character offset in the source of the
/// token that introduced it (the operator for operations, the name for calls,
/// the first token for field references). Subtrees are owned exclusively by
/// their parent.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Binary operation (arithmetic, comparison, logical, concatenation)
    ///
    /// # Examples
    /// ```text
    /// Amount__c * 0.2
    /// Stage = 'Closed' AND Probability > 50
    /// ```
    BinaryOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
        position: usize,
    },

    /// Unary operation (negation, logical NOT)
    ///
    /// # Examples
    /// ```text
    /// -Discount__c
    /// NOT IsClosed
    /// ```
    UnaryOp {
        op: UnaryOp,
        operand: Box<Expr>,
        position: usize,
    },

    /// Function call; the name keeps its source casing
    ///
    /// # Examples
    /// ```text
    /// TODAY()
    /// IF(Amount > 100, 'big', 'small')
    /// ```
    FunctionCall {
        name: String,
        args: Vec<Expr>,
        position: usize,
    },

    /// Literal value
    Literal { value: Literal, position: usize },

    /// Field reference: a non-empty dotted path
    ///
    /// # Examples
    /// ```text
    /// Name                  // ["Name"]
    /// Account.Owner.Name    // ["Account", "Owner", "Name"]
    /// $User.Id              // ["$User", "Id"]
    /// ```
    FieldRef { path: Vec<String>, position: usize },
}

impl Expr {
    /// Source offset of the token that introduced this node.
    pub fn position(&self) -> usize {
        match self {
            Expr::BinaryOp { position, .. }
            | Expr::UnaryOp { position, .. }
            | Expr::FunctionCall { position, .. }
            | Expr::Literal { position, .. }
            | Expr::FieldRef { position, .. } => *position,
        }
    }

    /// Node kind name used in tooling output and logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::BinaryOp { .. } => "binary",
            Expr::UnaryOp { .. } => "unary",
            Expr::FunctionCall { .. } => "call",
            Expr::Literal { .. } => "literal",
            Expr::FieldRef { .. } => "field",
        }
    }

    /// Visits this node and all of its descendants in pre-order, left to right.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Expr)) {
        visit(self);
        match self {
            Expr::BinaryOp { left, right, .. } => {
                left.walk(visit);
                right.walk(visit);
            }
            Expr::UnaryOp { operand, .. } => operand.walk(visit),
            Expr::FunctionCall { args, .. } => {
                for arg in args {
                    arg.walk(visit);
                }
            }
            Expr::Literal { .. } | Expr::FieldRef { .. } => {}
        }
    }

    /// Field paths referenced anywhere in the tree, in source order.
    pub fn field_references(&self) -> Vec<&[String]> {
        let mut paths = Vec::new();
        self.walk(&mut |node| {
            if let Expr::FieldRef { path, .. } = node {
                paths.push(path.as_slice());
            }
        });
        paths
    }

    /// Names of the functions called anywhere in the tree, in source order.
    pub fn function_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.walk(&mut |node| {
            if let Expr::FunctionCall { name, .. } = node {
                names.push(name.as_str());
            }
        });
        names
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        match self {
            Expr::BinaryOp { left, right, .. } => 1 + left.depth().max(right.depth()),
            Expr::UnaryOp { operand, .. } => 1 + operand.depth(),
            Expr::FunctionCall { args, .. } => {
                1 + args.iter().map(Expr::depth).max().unwrap_or(0)
            }
            Expr::Literal { .. } | Expr::FieldRef { .. } => 1,
        }
    }

    /// Compares two trees ignoring source positions.
    ///
    /// `1 + 2 * 3` and `1 + (2 * 3)` are structurally equal even though their
    /// nodes sit at different offsets.
    pub fn structurally_eq(&self, other: &Expr) -> bool {
        match (self, other) {
            (
                Expr::BinaryOp {
                    op: a_op,
                    left: a_left,
                    right: a_right,
                    ..
                },
                Expr::BinaryOp {
                    op: b_op,
                    left: b_left,
                    right: b_right,
                    ..
                },
            ) => {
                a_op == b_op && a_left.structurally_eq(b_left) && a_right.structurally_eq(b_right)
            }
            (
                Expr::UnaryOp {
                    op: a_op,
                    operand: a_operand,
                    ..
                },
                Expr::UnaryOp {
                    op: b_op,
                    operand: b_operand,
                    ..
                },
            ) => a_op == b_op && a_operand.structurally_eq(b_operand),
            (
                Expr::FunctionCall {
                    name: a_name,
                    args: a_args,
                    ..
                },
                Expr::FunctionCall {
                    name: b_name,
                    args: b_args,
                    ..
                },
            ) => {
                a_name == b_name
                    && a_args.len() == b_args.len()
                    && a_args
                        .iter()
                        .zip(b_args)
                        .all(|(a, b)| a.structurally_eq(b))
            }
            (Expr::Literal { value: a, .. }, Expr::Literal { value: b, .. }) => a == b,
            (Expr::FieldRef { path: a, .. }, Expr::FieldRef { path: b, .. }) => a == b,
            _ => false,
        }
    }
}

/// Renders the tree back to formula source with every operation parenthesized,
/// so the output re-parses to a structurally equal tree.
///
/// Logical negation is written `!`: `NOT (...)` would re-parse as a call.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::BinaryOp {
                op, left, right, ..
            } => write!(f, "({} {} {})", left, op, right),
            Expr::UnaryOp {
                op: UnaryOp::Negate,
                operand,
                ..
            } => write!(f, "(-{})", operand),
            Expr::UnaryOp {
                op: UnaryOp::Not,
                operand,
                ..
            } => write!(f, "(!{})", operand),
            Expr::FunctionCall { name, args, .. } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
            Expr::Literal { value, .. } => write!(f, "{}", value),
            Expr::FieldRef { path, .. } => f.write_str(&path.join(".")),
        }
    }
}
