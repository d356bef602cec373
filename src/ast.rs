//! AST module for the ink scripting language
//!
//! Content nodes produced by the grammar productions. The parser only builds
//! and returns these; evaluation and code generation live elsewhere.

use serde::{Deserialize, Serialize};

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// Represents a byte span in the source code.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// A zero-width span at `offset`.
    pub fn point(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }
}

/// A parsed source file: the ordered content of all its lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    pub content: Vec<Node>,
}

/// A single piece of story content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Text(Text),
    /// Joins adjacent text without an intervening break.
    Glue,
    Sequence(Sequence),
    Expression(Expression),
    Conditional(Conditional),
    Assignment(Assignment),
    Return(Return),
    Include(IncludedFile),
}

/// A run of literal story text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub text: String,
}

/// Alternative content branches separated by `|`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    pub branches: Vec<Vec<Node>>,
}

/// An expression in content position.
///
/// `emits` is set for inline `{expr}` logic, whose value is printed when the
/// surrounding content is rendered. Statements after `~` never emit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub expr: Expr,
    pub emits: bool,
}

/// `{condition: when_true}` or `{condition: when_true | when_false}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conditional {
    pub condition: Expr,
    pub when_true: Vec<Node>,
    pub when_false: Option<Vec<Node>>,
}

/// `var name = value`, `var name` or `name = value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub name: String,
    pub value: Option<Expr>,
    pub declares: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Return {
    pub value: Option<Expr>,
}

/// An `include` statement. `document` is absent when the file could not be
/// read or parsed; the diagnostic explaining why has already been reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncludedFile {
    pub filename: String,
    pub document: Option<Box<Document>>,
}

/// Logic expressions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Variable(String),
    Call {
        name: String,
        args: Vec<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Negate,
    Not,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Or,
    And,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

// ============================================================================
// AST CONSTRUCTORS
// ============================================================================

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(Text { text: text.into() })
    }

    pub fn glue() -> Self {
        Node::Glue
    }

    pub fn sequence(branches: Vec<Vec<Node>>) -> Self {
        Node::Sequence(Sequence { branches })
    }

    pub fn expression(expr: Expr, emits: bool) -> Self {
        Node::Expression(Expression { expr, emits })
    }

    pub fn include(filename: impl Into<String>, document: Option<Document>) -> Self {
        Node::Include(IncludedFile {
            filename: filename.into(),
            document: document.map(Box::new),
        })
    }

    /// Returns the text run if this node is one.
    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Node::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut Text> {
        match self {
            Node::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl Expr {
    pub fn variable(name: impl Into<String>) -> Self {
        Expr::Variable(name.into())
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }
}

// ============================================================================
// PRETTY PRINTING
// ============================================================================

impl Document {
    /// Compact outline of the whole document, one node after another.
    pub fn pretty(&self) -> String {
        pretty_nodes(&self.content)
    }
}

impl Node {
    /// Pretty-prints the node as an s-expression style outline.
    ///
    /// ```rust
    /// use inkparse::ast::{Expr, Node};
    /// assert_eq!(Node::text("hi\n").pretty(), "\"hi\\n\"");
    /// assert_eq!(Node::expression(Expr::variable("x"), true).pretty(), "(emit x)");
    /// ```
    pub fn pretty(&self) -> String {
        match self {
            Node::Text(text) => format!("{:?}", text.text),
            Node::Glue => "glue".to_string(),
            Node::Sequence(seq) => {
                let branches = seq
                    .branches
                    .iter()
                    .map(|branch| format!("[{}]", pretty_nodes(branch)))
                    .collect::<Vec<_>>()
                    .join(" ");
                format!("(seq {})", branches)
            }
            Node::Expression(expression) => {
                let head = if expression.emits { "emit" } else { "eval" };
                format!("({} {})", head, expression.expr.pretty())
            }
            Node::Conditional(cond) => match &cond.when_false {
                Some(when_false) => format!(
                    "(if {} [{}] [{}])",
                    cond.condition.pretty(),
                    pretty_nodes(&cond.when_true),
                    pretty_nodes(when_false)
                ),
                None => format!(
                    "(if {} [{}])",
                    cond.condition.pretty(),
                    pretty_nodes(&cond.when_true)
                ),
            },
            Node::Assignment(assign) => {
                let head = if assign.declares { "var" } else { "set" };
                match &assign.value {
                    Some(value) => format!("({} {} {})", head, assign.name, value.pretty()),
                    None => format!("({} {})", head, assign.name),
                }
            }
            Node::Return(ret) => match &ret.value {
                Some(value) => format!("(return {})", value.pretty()),
                None => "(return)".to_string(),
            },
            Node::Include(included) => match &included.document {
                Some(document) => format!(
                    "(include {:?} [{}])",
                    included.filename,
                    document.pretty()
                ),
                None => format!("(include {:?} absent)", included.filename),
            },
        }
    }
}

impl Expr {
    /// Pretty-prints the expression in prefix form.
    pub fn pretty(&self) -> String {
        match self {
            Expr::Int(n) => n.to_string(),
            Expr::Float(n) => format!("{:?}", n),
            Expr::Bool(b) => b.to_string(),
            Expr::Str(s) => format!("{:?}", s),
            Expr::Variable(name) => name.clone(),
            Expr::Call { name, args } => {
                let mut parts = vec![name.clone()];
                parts.extend(args.iter().map(Expr::pretty));
                format!("(call {})", parts.join(" "))
            }
            Expr::Unary { op, operand } => format!("({} {})", op.symbol(), operand.pretty()),
            Expr::Binary { op, left, right } => {
                format!("({} {} {})", op.symbol(), left.pretty(), right.pretty())
            }
        }
    }
}

impl UnaryOp {
    pub const fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Negate => "-",
            UnaryOp::Not => "!",
        }
    }
}

impl BinaryOp {
    pub const fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
        }
    }
}

fn pretty_nodes(nodes: &[Node]) -> String {
    nodes.iter().map(Node::pretty).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pretty_sequence_and_glue() {
        let node = Node::sequence(vec![vec![Node::text("a")], vec![Node::glue()]]);
        assert_eq!(node.pretty(), "(seq [\"a\"] [glue])");
    }

    #[test]
    fn test_pretty_binary_expression() {
        let expr = Expr::binary(BinaryOp::Add, Expr::Int(1), Expr::variable("x"));
        assert_eq!(expr.pretty(), "(+ 1 x)");
    }

    #[test]
    fn test_pretty_absent_include() {
        let node = Node::include("missing.ink", None);
        assert_eq!(node.pretty(), "(include \"missing.ink\" absent)");
    }

    #[test]
    fn test_node_serializes_with_kind_tag() {
        let json = serde_json::to_string(&Node::glue()).unwrap();
        assert_eq!(json, r#"{"kind":"glue"}"#);
    }
}
