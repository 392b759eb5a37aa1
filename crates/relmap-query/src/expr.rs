//! Criteria expressions.
//!
//! An `Expr` tree describes what a statement selects, filters or assigns,
//! independent of any dialect. Trees are immutable once built; combinators
//! consume their inputs and return new nodes. Operator arity is checked when
//! a predicate is constructed, never at format time.

use crate::alias::TableRef;
use crate::statement::Statement;
use relmap_core::error::StatementErrorKind;
use relmap_core::{Error, Result, SqlType, Value};

/// A criteria expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Logical property path, e.g. `["geo_location", "latitude"]`.
    /// The column name is derived by the dialect's naming strategy.
    Property {
        qualifier: Option<TableRef>,
        path: Vec<String>,
    },
    /// Physical column, rendered verbatim (quoted if needed)
    Column {
        qualifier: Option<TableRef>,
        name: String,
    },
    /// Constant value, bound through the active parameter collector
    Literal {
        value: Value,
        sql_type: Option<SqlType>,
    },
    Predicate {
        op: Operator,
        operands: Vec<Expr>,
    },
    Projection {
        kind: ProjectionKind,
        operand: Box<Expr>,
    },
    Function {
        name: String,
        args: Vec<Expr>,
    },
    /// `*` or `alias.*`
    All { qualifier: Option<TableRef> },
    Subquery(Box<Statement>),
    /// Dialect-specific construct; only dialects that know `kind` render it
    Extension {
        kind: String,
        operands: Vec<Expr>,
    },
    /// Raw SQL fragment (escape hatch)
    Raw(String),
}

/// Required operand count of an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub const fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Not,
    IsNull,
    IsNotNull,
    Like,
    NotLike,
    /// First operand is tested against the rest (a list or one subquery)
    In,
    NotIn,
    Between,
    Exists,
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    pub const fn arity(self) -> Arity {
        match self {
            Operator::Not | Operator::IsNull | Operator::IsNotNull | Operator::Exists => {
                Arity::Exactly(1)
            }
            Operator::And | Operator::Or | Operator::In | Operator::NotIn => Arity::AtLeast(2),
            Operator::Between => Arity::Exactly(3),
            _ => Arity::Exactly(2),
        }
    }

    /// SQL keyword or symbol for infix/prefix/postfix rendering.
    pub const fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "<>",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::Not => "NOT",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::Between => "BETWEEN",
            Operator::Exists => "EXISTS",
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
        }
    }

    /// Binding strength; higher binds tighter.
    pub const fn precedence(self) -> u8 {
        match self {
            Operator::Or => 1,
            Operator::And => 2,
            Operator::Not => 3,
            Operator::Eq
            | Operator::Ne
            | Operator::Lt
            | Operator::Le
            | Operator::Gt
            | Operator::Ge
            | Operator::IsNull
            | Operator::IsNotNull
            | Operator::Like
            | Operator::NotLike
            | Operator::In
            | Operator::NotIn
            | Operator::Between
            | Operator::Exists => 4,
            Operator::Add | Operator::Sub => 5,
            Operator::Mul | Operator::Div => 6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProjectionKind {
    Count,
    CountDistinct,
    Sum,
    Avg,
    Min,
    Max,
    /// `operand AS name`
    Alias(String),
}

impl ProjectionKind {
    /// Aggregate function name, `None` for non-aggregates.
    pub fn function_name(&self) -> Option<&'static str> {
        match self {
            ProjectionKind::Count | ProjectionKind::CountDistinct => Some("COUNT"),
            ProjectionKind::Sum => Some("SUM"),
            ProjectionKind::Avg => Some("AVG"),
            ProjectionKind::Min => Some("MIN"),
            ProjectionKind::Max => Some("MAX"),
            ProjectionKind::Alias(_) => None,
        }
    }
}

impl Expr {
    // ==================== Leaves ====================

    /// Unqualified property path; dots separate embedded segments.
    pub fn prop(path: &str) -> Self {
        Expr::Property {
            qualifier: None,
            path: split_path(path),
        }
    }

    /// Unqualified physical column.
    pub fn col(name: impl Into<String>) -> Self {
        Expr::Column {
            qualifier: None,
            name: name.into(),
        }
    }

    pub fn lit(value: impl Into<Value>) -> Self {
        Expr::Literal {
            value: value.into(),
            sql_type: None,
        }
    }

    /// Literal with a declared column type.
    pub fn typed(value: impl Into<Value>, sql_type: SqlType) -> Self {
        Expr::Literal {
            value: value.into(),
            sql_type: Some(sql_type),
        }
    }

    pub fn null() -> Self {
        Expr::lit(Value::Null)
    }

    pub fn all() -> Self {
        Expr::All { qualifier: None }
    }

    pub fn raw(sql: impl Into<String>) -> Self {
        Expr::Raw(sql.into())
    }

    pub fn subquery(statement: Statement) -> Self {
        Expr::Subquery(Box::new(statement))
    }

    pub fn function(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Function {
            name: name.into(),
            args,
        }
    }

    pub fn extension(kind: impl Into<String>, operands: Vec<Expr>) -> Self {
        Expr::Extension {
            kind: kind.into(),
            operands,
        }
    }

    // ==================== Predicates ====================

    /// Build a predicate, checking the operator's arity.
    pub fn predicate(op: Operator, operands: Vec<Expr>) -> Result<Self> {
        if !op.arity().accepts(operands.len()) {
            return Err(Error::statement(
                StatementErrorKind::Arity,
                format!(
                    "operator {} expects {:?} operands, got {}",
                    op.as_str(),
                    op.arity(),
                    operands.len()
                ),
            ));
        }
        Ok(Expr::Predicate { op, operands })
    }

    fn binary(self, op: Operator, other: impl Into<Expr>) -> Self {
        Expr::Predicate {
            op,
            operands: vec![self, other.into()],
        }
    }

    fn unary(self, op: Operator) -> Self {
        Expr::Predicate {
            op,
            operands: vec![self],
        }
    }

    pub fn eq(self, other: impl Into<Expr>) -> Self {
        self.binary(Operator::Eq, other)
    }

    pub fn ne(self, other: impl Into<Expr>) -> Self {
        self.binary(Operator::Ne, other)
    }

    pub fn lt(self, other: impl Into<Expr>) -> Self {
        self.binary(Operator::Lt, other)
    }

    pub fn le(self, other: impl Into<Expr>) -> Self {
        self.binary(Operator::Le, other)
    }

    pub fn gt(self, other: impl Into<Expr>) -> Self {
        self.binary(Operator::Gt, other)
    }

    pub fn ge(self, other: impl Into<Expr>) -> Self {
        self.binary(Operator::Ge, other)
    }

    pub fn like(self, pattern: impl Into<Expr>) -> Self {
        self.binary(Operator::Like, pattern)
    }

    pub fn not_like(self, pattern: impl Into<Expr>) -> Self {
        self.binary(Operator::NotLike, pattern)
    }

    pub fn add(self, other: impl Into<Expr>) -> Self {
        self.binary(Operator::Add, other)
    }

    pub fn sub(self, other: impl Into<Expr>) -> Self {
        self.binary(Operator::Sub, other)
    }

    pub fn mul(self, other: impl Into<Expr>) -> Self {
        self.binary(Operator::Mul, other)
    }

    pub fn div(self, other: impl Into<Expr>) -> Self {
        self.binary(Operator::Div, other)
    }

    /// Logical AND; nested ANDs are flattened into one node.
    pub fn and(self, other: impl Into<Expr>) -> Self {
        self.junction(Operator::And, other.into())
    }

    /// Logical OR; nested ORs are flattened into one node.
    pub fn or(self, other: impl Into<Expr>) -> Self {
        self.junction(Operator::Or, other.into())
    }

    fn junction(self, op: Operator, other: Expr) -> Self {
        let mut operands = match self {
            Expr::Predicate { op: o, operands } if o == op => operands,
            e => vec![e],
        };
        match other {
            Expr::Predicate { op: o, operands: more } if o == op => operands.extend(more),
            e => operands.push(e),
        }
        Expr::Predicate { op, operands }
    }

    pub fn not(self) -> Self {
        self.unary(Operator::Not)
    }

    pub fn is_null(self) -> Self {
        self.unary(Operator::IsNull)
    }

    pub fn is_not_null(self) -> Self {
        self.unary(Operator::IsNotNull)
    }

    pub fn between(self, low: impl Into<Expr>, high: impl Into<Expr>) -> Self {
        Expr::Predicate {
            op: Operator::Between,
            operands: vec![self, low.into(), high.into()],
        }
    }

    /// `self IN (values...)`. An empty list fails the arity check.
    pub fn in_list<I, V>(self, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Expr>,
    {
        let mut operands = vec![self];
        operands.extend(values.into_iter().map(Into::into));
        Expr::predicate(Operator::In, operands)
    }

    pub fn not_in_list<I, V>(self, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Expr>,
    {
        let mut operands = vec![self];
        operands.extend(values.into_iter().map(Into::into));
        Expr::predicate(Operator::NotIn, operands)
    }

    /// `self IN (SELECT ...)`
    pub fn in_subquery(self, statement: Statement) -> Self {
        self.binary(Operator::In, Expr::subquery(statement))
    }

    pub fn exists(statement: Statement) -> Self {
        Expr::subquery(statement).unary(Operator::Exists)
    }

    // ==================== Projections ====================

    fn project(self, kind: ProjectionKind) -> Self {
        Expr::Projection {
            kind,
            operand: Box::new(self),
        }
    }

    /// `COUNT(*)`
    pub fn count_all() -> Self {
        Expr::all().project(ProjectionKind::Count)
    }

    pub fn count(self) -> Self {
        self.project(ProjectionKind::Count)
    }

    pub fn count_distinct(self) -> Self {
        self.project(ProjectionKind::CountDistinct)
    }

    pub fn sum(self) -> Self {
        self.project(ProjectionKind::Sum)
    }

    pub fn avg(self) -> Self {
        self.project(ProjectionKind::Avg)
    }

    pub fn min(self) -> Self {
        self.project(ProjectionKind::Min)
    }

    pub fn max(self) -> Self {
        self.project(ProjectionKind::Max)
    }

    pub fn alias(self, name: impl Into<String>) -> Self {
        self.project(ProjectionKind::Alias(name.into()))
    }

    // ==================== Inspection ====================

    /// Is this a non-null literal, i.e. something a collector would bind?
    pub fn is_bindable_literal(&self) -> bool {
        matches!(self, Expr::Literal { value, .. } if !value.is_null() && *value != Value::Default)
    }

    /// Visit this node and every descendant, depth-first, parents first.
    /// Subqueries are not entered.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Expr)) {
        visit(self);
        match self {
            Expr::Predicate { operands, .. } | Expr::Extension { operands, .. } => {
                for e in operands {
                    e.walk(visit);
                }
            }
            Expr::Function { args, .. } => {
                for e in args {
                    e.walk(visit);
                }
            }
            Expr::Projection { operand, .. } => operand.walk(visit),
            _ => {}
        }
    }
}

/// Split a dotted property path.
pub fn split_path(path: &str) -> Vec<String> {
    path.split('.')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

macro_rules! literal_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Expr {
                fn from(value: $ty) -> Self {
                    Expr::lit(value)
                }
            }
        )*
    };
}

literal_from!(Value, bool, i16, i32, i64, f32, f64, String, &str, Vec<u8>, serde_json::Value);

impl<T: Into<Value>> From<Option<T>> for Expr {
    fn from(value: Option<T>) -> Self {
        Expr::lit(value)
    }
}
