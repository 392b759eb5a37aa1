//! Statement formatting.
//!
//! A [`Formatter`] renders exactly one statement: it owns a fresh parameter
//! collector and the alias scopes of the statement being rendered, and is
//! consumed by [`Formatter::format`]. Clauses are visited in their stored
//! (canonical) order and every fragment is rendered left to right, so
//! placeholders appear in the text in the order their parameters were
//! collected.
//!
//! DDL never binds parameters: literals inside CREATE/ALTER statements
//! (column defaults, CHECK conditions) are always rendered inline.

use crate::dialect::Dialect;
use crate::params::{Parameter, ParameterCollector, collector_for};
use crate::rules::UpsertParts;
use relmap_core::error::{FormatErrorKind, StatementErrorKind};
use relmap_core::{Error, Result, SqlType, Value};
use relmap_query::{
    Assignment, Clause, ColumnSpec, ConstraintDef, ConstraintSpec, DdlElement, Expr, IndexSpec,
    NullsOrder, OperationType, Operator, OrderBy, OrderDirection, ProjectionKind, Statement,
    StatementCategory, StatementKind, TableName, TableOperation, TableRef, TableSpec,
};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Rendered text plus the parameters to bind, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedStatement {
    sql: String,
    parameters: Vec<Parameter>,
    kind: StatementKind,
}

impl FormattedStatement {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    /// Bound values in order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.parameters.iter().map(|p| &p.value)
    }

    /// Named parameter lookup.
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters
            .iter()
            .find(|p| p.name.as_deref() == Some(name))
    }

    pub fn into_parts(self) -> (String, Vec<Parameter>) {
        (self.sql, self.parameters)
    }
}

impl fmt::Display for FormattedStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Single-use renderer for one statement.
#[derive(Debug)]
pub struct Formatter<'d> {
    dialect: &'d Dialect,
    collector: Box<dyn ParameterCollector>,
    /// Alias of every table occurrence, innermost statement last
    scopes: Vec<HashMap<u64, Option<String>>>,
    /// Name hint for the next collected literal
    hint: Option<String>,
    inline_literals: bool,
}

impl<'d> Formatter<'d> {
    pub(crate) fn new(dialect: &'d Dialect) -> Self {
        Self {
            dialect,
            collector: collector_for(dialect.binding()),
            scopes: Vec::new(),
            hint: None,
            inline_literals: false,
        }
    }

    pub fn format(mut self, statement: &Statement) -> Result<FormattedStatement> {
        let sql = self.statement(statement)?;
        let parameters = self.collector.into_parameters();
        tracing::debug!(
            dialect = self.dialect.id(),
            kind = statement.kind().as_str(),
            parameters = parameters.len(),
            "formatted statement"
        );
        tracing::trace!(sql = %sql, "sql");
        Ok(FormattedStatement {
            sql,
            parameters,
            kind: statement.kind(),
        })
    }

    // ==================== Statements ====================

    fn statement(&mut self, statement: &Statement) -> Result<String> {
        let reserved: HashSet<String> = self
            .scopes
            .iter()
            .flat_map(|scope| scope.values().flatten())
            .map(|alias| alias.to_ascii_lowercase())
            .collect();
        let scope = statement
            .aliases()
            .resolve(&reserved)
            .into_iter()
            .map(|(table, alias)| (table.id(), alias))
            .collect();
        self.scopes.push(scope);
        let inline_before = self.inline_literals;
        if statement.category() == StatementCategory::Ddl {
            self.inline_literals = true;
        }
        let result = self.clauses(statement);
        self.inline_literals = inline_before;
        self.scopes.pop();
        result
    }

    fn clauses(&mut self, statement: &Statement) -> Result<String> {
        if let Some(Clause::Upsert {
            target,
            keys,
            columns,
        }) = statement.clauses().first()
        {
            return self.upsert(statement, target, keys, columns);
        }

        let mut parts = Vec::with_capacity(statement.clauses().len());
        let mut value_hints: Vec<Option<String>> = Vec::new();
        let mut limit = None;
        let mut offset = None;
        for clause in statement.clauses() {
            let part = match clause {
                Clause::Select { distinct, items } => {
                    let items = if items.is_empty() {
                        "*".to_string()
                    } else {
                        self.list(items)?
                    };
                    if *distinct {
                        format!("SELECT DISTINCT {}", items)
                    } else {
                        format!("SELECT {}", items)
                    }
                }
                Clause::Insert { target, columns } => {
                    value_hints = columns.iter().map(hint_of).collect();
                    format!(
                        "INSERT INTO {}({})",
                        self.table_name(target.table()),
                        self.column_list(columns)?
                    )
                }
                Clause::Update { target } => format!("UPDATE {}", self.dml_target(target)?),
                Clause::Delete { target } => format!("DELETE FROM {}", self.dml_target(target)?),
                Clause::Merge { target, source, on } => format!(
                    "MERGE INTO {} USING {} ON {}",
                    self.table_decl(target)?,
                    self.table_decl(source)?,
                    self.expr(on, 0)?
                ),
                Clause::Upsert { .. } => {
                    return Err(self.unsupported("UPSERT after the start clause"));
                }
                Clause::CreateTable(spec) => self.create_table(spec)?,
                Clause::AlterTable { table, operations } => self.alter_table(table, operations)?,
                Clause::DropTable { table, if_exists } => format!(
                    "DROP TABLE {}{}",
                    if *if_exists { "IF EXISTS " } else { "" },
                    self.table_name(&table.name)
                ),
                Clause::CreateIndex(index) => self.create_index(index)?,
                Clause::DropIndex(index) => {
                    let name = self.dialect.quote(&index.name(self.dialect.naming()));
                    let table = self.table_name(&index.table);
                    self.dialect.rules().drop_index(&name, &table)
                }
                Clause::Set(assignments) => format!("SET {}", self.assignments(assignments)?),
                Clause::Values(rows) => {
                    let rows = rows
                        .iter()
                        .map(|row| Ok(format!("({})", self.values(row, &value_hints)?)))
                        .collect::<Result<Vec<_>>>()?;
                    format!("VALUES {}", rows.join(", "))
                }
                Clause::From(tables) => {
                    let tables = tables
                        .iter()
                        .map(|t| self.table_decl(t))
                        .collect::<Result<Vec<_>>>()?;
                    format!("FROM {}", tables.join(", "))
                }
                Clause::Join { kind, table, on } => format!(
                    "{} {} ON {}",
                    kind.keyword(),
                    self.table_decl(table)?,
                    self.expr(on, 0)?
                ),
                Clause::Where(condition) => format!("WHERE {}", self.expr(condition, 0)?),
                Clause::GroupBy(items) => format!("GROUP BY {}", self.list(items)?),
                Clause::Having(condition) => format!("HAVING {}", self.expr(condition, 0)?),
                Clause::OrderBy(items) => {
                    let items = items
                        .iter()
                        .map(|o| self.order_item(o))
                        .collect::<Result<Vec<_>>>()?;
                    format!("ORDER BY {}", items.join(", "))
                }
                Clause::Limit(n) => {
                    limit = Some(*n);
                    continue;
                }
                Clause::Offset(n) => {
                    offset = Some(*n);
                    continue;
                }
                Clause::WhenMatched(assignments) => format!(
                    "WHEN MATCHED THEN UPDATE SET {}",
                    self.assignments(assignments)?
                ),
                Clause::WhenNotMatched { columns, values } => {
                    let hints: Vec<Option<String>> = columns.iter().map(hint_of).collect();
                    format!(
                        "WHEN NOT MATCHED THEN INSERT ({}) VALUES ({})",
                        self.column_list(columns)?,
                        self.values(values, &hints)?
                    )
                }
            };
            parts.push(part);
        }
        if limit.is_some() || offset.is_some() {
            parts.push(self.dialect.rules().render_limit(limit, offset));
        }
        Ok(parts.join(" "))
    }

    fn upsert(
        &mut self,
        statement: &Statement,
        target: &TableRef,
        keys: &[Expr],
        columns: &[Expr],
    ) -> Result<String> {
        let row = statement
            .clauses()
            .iter()
            .find_map(|c| match c {
                Clause::Values(rows) => rows.first(),
                _ => None,
            })
            .ok_or_else(|| {
                Error::statement(StatementErrorKind::Incomplete, "UPSERT without values")
            })?;
        let table = self.table_name(target.table());
        let column_names = columns
            .iter()
            .map(|c| self.column_ref(c))
            .collect::<Result<Vec<_>>>()?;
        let key_names = keys
            .iter()
            .map(|k| self.column_ref(k))
            .collect::<Result<Vec<_>>>()?;
        let hints: Vec<Option<String>> = columns.iter().map(hint_of).collect();
        let values = row
            .iter()
            .enumerate()
            .map(|(i, v)| self.with_hint(hints.get(i).cloned().flatten(), |f| f.expr(v, 0)))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.dialect.rules().render_upsert(&UpsertParts {
            table: &table,
            columns: &column_names,
            keys: &key_names,
            values: &values,
        }))
    }

    // ==================== DDL ====================

    fn create_table(&mut self, spec: &TableSpec) -> Result<String> {
        let raw = spec.name(self.dialect.naming());
        let mut items: Vec<String> = spec.columns.iter().map(|c| self.column_def(c)).collect();
        for constraint in &spec.constraints {
            items.push(self.constraint_def(constraint, &raw)?);
        }
        Ok(format!(
            "CREATE TABLE {} ({})",
            self.table_name(&spec.name),
            items.join(", ")
        ))
    }

    fn column_def(&self, column: &ColumnSpec) -> String {
        let rules = self.dialect.rules();
        let mut out = format!(
            "{} {}",
            self.spec_column(column),
            rules.type_name(&column.sql_type)
        );
        if let Some(default) = &column.default {
            out.push_str(" DEFAULT ");
            out.push_str(&rules.literal(default));
        }
        if !column.nullable {
            out.push_str(" NOT NULL");
        }
        out
    }

    fn constraint_def(&mut self, constraint: &ConstraintSpec, table: &str) -> Result<String> {
        let name = self
            .dialect
            .quote(&constraint.name(table, self.dialect.naming()));
        let def = constraint.def.as_ref().ok_or_else(|| {
            Error::statement(
                StatementErrorKind::Incomplete,
                format!("constraint {} has no definition", name),
            )
        })?;
        let body = match def {
            ConstraintDef::PrimaryKey(columns) => {
                format!("PRIMARY KEY ({})", self.spec_columns(columns))
            }
            ConstraintDef::ForeignKey {
                columns,
                references,
                referenced,
                on_delete,
            } => {
                let mut out = format!(
                    "FOREIGN KEY ({}) REFERENCES {} ({})",
                    self.spec_columns(columns),
                    self.table_name(references),
                    self.spec_columns(referenced)
                );
                if let Some(action) = on_delete {
                    out.push_str(" ON DELETE ");
                    out.push_str(action.as_sql());
                }
                out
            }
            ConstraintDef::NotNull(column) => {
                format!("CHECK ({} IS NOT NULL)", self.spec_column(column))
            }
            ConstraintDef::Unique(columns) => format!("UNIQUE ({})", self.spec_columns(columns)),
            ConstraintDef::Check(condition) => format!("CHECK ({})", self.expr(condition, 0)?),
        };
        Ok(format!("CONSTRAINT {} {}", name, body))
    }

    fn alter_table(&mut self, spec: &TableSpec, operations: &[TableOperation]) -> Result<String> {
        if operations.len() > 1 && !self.dialect.rules().supports_multiple_alterations() {
            return Err(self.unsupported("several operations in one ALTER TABLE"));
        }
        let raw = spec.name(self.dialect.naming());
        let operations = operations
            .iter()
            .map(|op| self.table_operation(op, &raw))
            .collect::<Result<Vec<_>>>()?;
        Ok(format!(
            "ALTER TABLE {} {}",
            self.table_name(&spec.name),
            operations.join(", ")
        ))
    }

    fn table_operation(&mut self, operation: &TableOperation, table: &str) -> Result<String> {
        let keyword = operation.op.keyword();
        let element = operation.kind().keyword();
        match &operation.element {
            DdlElement::Column(column) => match operation.op {
                OperationType::Add => Ok(format!("ADD {} {}", element, self.column_def(column))),
                OperationType::Modify => {
                    let rules = self.dialect.rules();
                    rules
                        .modify_column(
                            &self.spec_column(column),
                            &rules.type_name(&column.sql_type),
                            column.nullable,
                        )
                        .ok_or_else(|| self.unsupported("MODIFY COLUMN"))
                }
                OperationType::Drop | OperationType::Rename => {
                    let name = self.spec_column(column);
                    self.rename_or_drop(operation, keyword, element, name)
                }
            },
            DdlElement::Constraint(constraint) => {
                if !self.dialect.rules().supports_constraint_alteration() {
                    return Err(self.unsupported(format!("{} {}", keyword, element)));
                }
                match operation.op {
                    OperationType::Add => {
                        Ok(format!("ADD {}", self.constraint_def(constraint, table)?))
                    }
                    OperationType::Modify => Err(self.unsupported("MODIFY CONSTRAINT")),
                    OperationType::Drop | OperationType::Rename => {
                        let name = self
                            .dialect
                            .quote(&constraint.name(table, self.dialect.naming()));
                        self.rename_or_drop(operation, keyword, element, name)
                    }
                }
            }
        }
    }

    fn rename_or_drop(
        &self,
        operation: &TableOperation,
        keyword: &str,
        element: &str,
        name: String,
    ) -> Result<String> {
        if operation.op != OperationType::Rename {
            return Ok(format!("{} {} {}", keyword, element, name));
        }
        let to = operation.rename_to.as_deref().ok_or_else(|| {
            Error::statement(
                StatementErrorKind::Incomplete,
                format!("RENAME {} {} without a new name", element, name),
            )
        })?;
        Ok(format!(
            "{} {} {} TO {}",
            keyword,
            element,
            name,
            self.dialect.quote(to)
        ))
    }

    fn create_index(&self, index: &IndexSpec) -> Result<String> {
        if index.columns.is_empty() {
            return Err(Error::statement(
                StatementErrorKind::Incomplete,
                "CREATE INDEX without columns",
            ));
        }
        Ok(format!(
            "CREATE {}INDEX {} ON {} ({})",
            if index.unique { "UNIQUE " } else { "" },
            self.dialect.quote(&index.name(self.dialect.naming())),
            self.table_name(&index.table),
            self.spec_columns(&index.columns)
        ))
    }

    // ==================== Names ====================

    fn table_name(&self, table: &TableName) -> String {
        table
            .resolve(self.dialect.naming())
            .split('.')
            .map(|part| self.dialect.quote(part))
            .collect::<Vec<_>>()
            .join(".")
    }

    fn table_decl(&self, table: &TableRef) -> Result<String> {
        let name = self.table_name(table.table());
        Ok(match self.alias_of(table)? {
            Some(alias) => format!("{} {}", name, self.dialect.quote(&alias)),
            None => name,
        })
    }

    fn dml_target(&self, table: &TableRef) -> Result<String> {
        let name = self.table_name(table.table());
        Ok(match self.alias_of(table)? {
            Some(alias) => self.dialect.rules().dml_target(&name, &self.dialect.quote(&alias)),
            None => name,
        })
    }

    fn alias_of(&self, table: &TableRef) -> Result<Option<String>> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(&table.id()))
            .cloned()
            .ok_or_else(|| {
                self.unsupported(format!(
                    "reference to table {} outside its statement",
                    table.table().logical()
                ))
            })
    }

    fn qualify(&self, qualifier: Option<&TableRef>, column: String) -> Result<String> {
        match qualifier {
            Some(table) => Ok(match self.alias_of(table)? {
                Some(alias) => format!("{}.{}", self.dialect.quote(&alias), column),
                None => column,
            }),
            None => Ok(column),
        }
    }

    /// Column of a property path. Entity tables resolve it through the
    /// entity's mapping tree, anything else through the naming strategy.
    fn property_column(&self, qualifier: Option<&TableRef>, path: &[String]) -> Result<String> {
        let path: Vec<&str> = path.iter().map(String::as_str).collect();
        let naming = self.dialect.naming();
        let column = match qualifier.and_then(|table| Some((table, table.properties()?))) {
            Some((table, properties)) => self.dialect.type_mappings().property_column(
                table.table().logical(),
                properties,
                &path,
                naming,
            )?,
            None => naming.column_name(&path),
        };
        Ok(self.dialect.quote(&column))
    }

    fn spec_column(&self, column: &ColumnSpec) -> String {
        self.dialect.quote(&column.name(self.dialect.naming()))
    }

    fn spec_columns(&self, columns: &[ColumnSpec]) -> String {
        columns
            .iter()
            .map(|c| self.spec_column(c))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Unqualified column for SET and INSERT lists.
    fn column_ref(&mut self, expr: &Expr) -> Result<String> {
        match expr {
            Expr::Property { qualifier, path } => self.property_column(qualifier.as_ref(), path),
            Expr::Column { name, .. } => Ok(self.dialect.quote(name)),
            other => self.expr(other, 0),
        }
    }

    fn column_list(&mut self, columns: &[Expr]) -> Result<String> {
        Ok(columns
            .iter()
            .map(|c| self.column_ref(c))
            .collect::<Result<Vec<_>>>()?
            .join(", "))
    }

    // ==================== Expressions ====================

    fn list(&mut self, items: &[Expr]) -> Result<String> {
        Ok(items
            .iter()
            .map(|e| self.expr(e, 0))
            .collect::<Result<Vec<_>>>()?
            .join(", "))
    }

    fn values(&mut self, values: &[Expr], hints: &[Option<String>]) -> Result<String> {
        Ok(values
            .iter()
            .enumerate()
            .map(|(i, v)| self.with_hint(hints.get(i).cloned().flatten(), |f| f.expr(v, 0)))
            .collect::<Result<Vec<_>>>()?
            .join(", "))
    }

    fn assignments(&mut self, assignments: &[Assignment]) -> Result<String> {
        Ok(assignments
            .iter()
            .map(|a| {
                let column = self.column_ref(&a.column)?;
                let value = self.with_hint(hint_of(&a.column), |f| f.expr(&a.value, 0))?;
                Ok(format!("{} = {}", column, value))
            })
            .collect::<Result<Vec<_>>>()?
            .join(", "))
    }

    fn order_item(&mut self, order: &OrderBy) -> Result<String> {
        let mut out = self.expr(&order.expr, 0)?;
        if order.direction == OrderDirection::Desc {
            out.push_str(" DESC");
        }
        if let Some(nulls) = order.nulls {
            if !self.dialect.rules().supports_nulls_order() {
                return Err(self.unsupported("NULLS FIRST/LAST"));
            }
            out.push_str(match nulls {
                NullsOrder::First => " NULLS FIRST",
                NullsOrder::Last => " NULLS LAST",
            });
        }
        Ok(out)
    }

    fn with_hint<T>(&mut self, hint: Option<String>, render: impl FnOnce(&mut Self) -> T) -> T {
        let saved = self.hint.clone();
        if hint.is_some() {
            self.hint = hint;
        }
        let out = render(self);
        self.hint = saved;
        out
    }

    /// Render `expr` as an operand of an operator binding with `parent`
    /// precedence; looser-binding predicates are parenthesized.
    fn expr(&mut self, expr: &Expr, parent: u8) -> Result<String> {
        match expr {
            Expr::Property { qualifier, path } => {
                let column = self.property_column(qualifier.as_ref(), path)?;
                self.qualify(qualifier.as_ref(), column)
            }
            Expr::Column { qualifier, name } => {
                let column = self.dialect.quote(name);
                self.qualify(qualifier.as_ref(), column)
            }
            Expr::Literal { value, sql_type } => Ok(self.literal(value, sql_type.as_ref())),
            Expr::Predicate { op, operands } => {
                let hint = operands.iter().find_map(hint_of);
                let text = self.with_hint(hint, |f| f.predicate(*op, operands))?;
                Ok(if op.precedence() < parent {
                    format!("({})", text)
                } else {
                    text
                })
            }
            Expr::Projection {
                kind: ProjectionKind::Alias(name),
                operand,
            } => Ok(format!(
                "{} AS {}",
                self.expr(operand, 0)?,
                self.dialect.quote(name)
            )),
            Expr::Projection {
                kind: ProjectionKind::CountDistinct,
                operand,
            } => Ok(format!("COUNT(DISTINCT {})", self.expr(operand, 0)?)),
            Expr::Projection { kind, operand } => Ok(format!(
                "{}({})",
                kind.function_name().unwrap_or_default(),
                self.expr(operand, 0)?
            )),
            Expr::Function { name, args } => Ok(format!("{}({})", name, self.list(args)?)),
            Expr::All { qualifier: None } => Ok("*".to_string()),
            Expr::All {
                qualifier: Some(table),
            } => Ok(match self.alias_of(table)? {
                Some(alias) => format!("{}.*", self.dialect.quote(&alias)),
                None => "*".to_string(),
            }),
            Expr::Subquery(statement) => Ok(format!("({})", self.statement(statement)?)),
            Expr::Extension { kind, operands } => {
                let comparison = Operator::Eq.precedence();
                let hint = operands.iter().find_map(hint_of);
                let rendered = self.with_hint(hint, |f| {
                    operands
                        .iter()
                        .map(|o| f.expr(o, comparison + 1))
                        .collect::<Result<Vec<_>>>()
                })?;
                let text = self
                    .dialect
                    .rules()
                    .render_extension(kind, &rendered)
                    .ok_or_else(|| {
                        Error::format(
                            FormatErrorKind::UnknownExpression,
                            format!("extension '{}'", kind),
                            self.dialect.id(),
                        )
                    })?;
                Ok(if comparison < parent {
                    format!("({})", text)
                } else {
                    text
                })
            }
            Expr::Raw(sql) => Ok(sql.clone()),
        }
    }

    fn predicate(&mut self, op: Operator, operands: &[Expr]) -> Result<String> {
        if !op.arity().accepts(operands.len()) {
            return Err(Error::statement(
                StatementErrorKind::Arity,
                format!("operator {} with {} operands", op.as_str(), operands.len()),
            ));
        }
        let prec = op.precedence();
        match op {
            Operator::And | Operator::Or => {
                let parts = operands
                    .iter()
                    .map(|o| self.expr(o, prec))
                    .collect::<Result<Vec<_>>>()?;
                Ok(parts.join(&format!(" {} ", op.as_str())))
            }
            Operator::Not => Ok(format!("NOT {}", self.expr(&operands[0], prec)?)),
            Operator::IsNull | Operator::IsNotNull => Ok(format!(
                "{} {}",
                self.expr(&operands[0], prec + 1)?,
                op.as_str()
            )),
            Operator::Exists => Ok(format!("EXISTS {}", self.expr(&operands[0], prec + 1)?)),
            Operator::In | Operator::NotIn => {
                let subject = self.expr(&operands[0], prec + 1)?;
                let set = match &operands[1..] {
                    [Expr::Subquery(statement)] => self.statement(statement)?,
                    items => self.list(items)?,
                };
                Ok(format!("{} {} ({})", subject, op.as_str(), set))
            }
            Operator::Between => Ok(format!(
                "{} BETWEEN {} AND {}",
                self.expr(&operands[0], prec + 1)?,
                self.expr(&operands[1], prec + 1)?,
                self.expr(&operands[2], prec + 1)?
            )),
            Operator::Add | Operator::Sub | Operator::Mul | Operator::Div => Ok(format!(
                "{} {} {}",
                self.expr(&operands[0], prec)?,
                op.as_str(),
                self.expr(&operands[1], prec + 1)?
            )),
            _ => Ok(format!(
                "{} {} {}",
                self.expr(&operands[0], prec + 1)?,
                op.as_str(),
                self.expr(&operands[1], prec + 1)?
            )),
        }
    }

    fn literal(&mut self, value: &Value, sql_type: Option<&SqlType>) -> String {
        let rules = self.dialect.rules();
        if self.inline_literals || matches!(value, Value::Null | Value::Default) {
            return rules.literal(value);
        }
        self.collector
            .collect(value.clone(), sql_type.cloned(), self.hint.as_deref(), rules)
    }

    fn unsupported(&self, construct: impl Into<String>) -> Error {
        Error::format(FormatErrorKind::Unsupported, construct, self.dialect.id())
    }
}

/// Name a literal compared with or assigned to `expr` would be bound under.
fn hint_of(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Property { path, .. } => Some(path.join(".")),
        Expr::Column { name, .. } => Some(name.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relmap_query::ReferentialAction;

    #[test]
    fn delete_with_alias() {
        let person = TableRef::new("Person");
        let statement = Statement::delete_from(person.clone())
            .filter(person.col("Single").eq(true))
            .build()
            .unwrap();
        let sql = Dialect::generic().to_inline_sql(&statement).unwrap();
        assert_eq!(sql, "DELETE FROM Person p WHERE p.Single = TRUE");
    }

    #[test]
    fn insert_targets_are_unqualified() {
        let person = TableRef::new("Person");
        let statement = Statement::insert_into(person.clone())
            .set(person.col("Name"), "John Doe")
            .set(person.col("Single"), true)
            .build()
            .unwrap();
        let dialect = Dialect::generic();
        assert_eq!(
            dialect.to_inline_sql(&statement).unwrap(),
            "INSERT INTO Person(Name, Single) VALUES ('John Doe', TRUE)"
        );
        let formatted = dialect.format(&statement).unwrap();
        assert_eq!(formatted.sql(), "INSERT INTO Person(Name, Single) VALUES (?, ?)");
        assert_eq!(formatted.parameters().len(), 2);
    }

    #[test]
    fn nulls_are_never_parameters() {
        let city = TableRef::new("CITY");
        let statement = Statement::update(city.clone())
            .set(Expr::col("NAME"), Expr::null())
            .filter(city.col("ID").eq(7_i64))
            .build()
            .unwrap();
        let formatted = Dialect::postgres().format(&statement).unwrap();
        assert_eq!(formatted.sql(), "UPDATE CITY c SET NAME = NULL WHERE c.ID = $1");
        assert_eq!(formatted.values().collect::<Vec<_>>(), [&Value::BigInt(7)]);
    }

    #[test]
    fn sqlite_aliases_dml_targets_with_as() {
        let city = TableRef::new("CITY");
        let update = Statement::update(city.clone())
            .set(Expr::col("NAME"), "Bern")
            .filter(city.col("ID").eq(7_i64))
            .build()
            .unwrap();
        assert_eq!(
            Dialect::sqlite().format(&update).unwrap().sql(),
            "UPDATE CITY AS c SET NAME = ?1 WHERE c.ID = ?2"
        );
        let delete = Statement::delete_from(city.clone())
            .filter(city.col("ID").eq(7_i64))
            .build()
            .unwrap();
        assert_eq!(
            Dialect::sqlite().format(&delete).unwrap().sql(),
            "DELETE FROM CITY AS c WHERE c.ID = ?1"
        );
        assert_eq!(
            Dialect::mysql().format(&delete).unwrap().sql(),
            "DELETE FROM CITY c WHERE c.ID = ?"
        );
    }

    #[test]
    fn precedence_adds_parentheses() {
        let city = TableRef::new("CITY");
        let condition = city
            .col("A")
            .eq(1)
            .or(city.col("B").eq(2))
            .and(city.col("C").is_null().not());
        let statement = Statement::select_all()
            .from(city)
            .filter(condition)
            .build()
            .unwrap();
        assert_eq!(
            Dialect::generic().to_inline_sql(&statement).unwrap(),
            "SELECT * FROM CITY c WHERE (c.A = 1 OR c.B = 2) AND NOT c.C IS NULL"
        );
    }

    #[test]
    fn subqueries_get_their_own_aliases() {
        let person = TableRef::new("Person");
        let inner = TableRef::new("Person");
        let sub = Statement::select([inner.col("ID")])
            .from(inner.clone())
            .filter(inner.col("Boss").eq(person.col("ID")))
            .build()
            .unwrap();
        let statement = Statement::select_all()
            .from(person.clone())
            .filter(Expr::exists(sub))
            .build()
            .unwrap();
        assert_eq!(
            Dialect::generic().to_inline_sql(&statement).unwrap(),
            "SELECT * FROM Person p WHERE EXISTS (SELECT pe.ID FROM Person pe WHERE pe.Boss = p.ID)"
        );
    }

    #[test]
    fn foreign_tables_are_rejected() {
        let person = TableRef::new("Person");
        let stranger = TableRef::new("City");
        let statement = Statement::select_all()
            .from(person)
            .filter(stranger.col("ID").eq(1))
            .build()
            .unwrap();
        let err = Dialect::generic().format(&statement).unwrap_err();
        assert!(matches!(err, Error::Format(ref f) if f.kind == FormatErrorKind::Unsupported));
    }

    #[test]
    fn unknown_extensions_fail() {
        let city = TableRef::new("CITY");
        let statement = Statement::select_all()
            .from(city.clone())
            .filter(Expr::extension("ilike", vec![city.col("NAME"), Expr::lit("b%")]))
            .build()
            .unwrap();
        let formatted = Dialect::postgres().format(&statement).unwrap();
        assert_eq!(formatted.sql(), "SELECT * FROM CITY c WHERE c.NAME ILIKE $1");

        let err = Dialect::mysql().format(&statement).unwrap_err();
        match err {
            Error::Format(f) => {
                assert_eq!(f.kind, FormatErrorKind::UnknownExpression);
                assert_eq!(f.construct, "extension 'ilike'");
                assert_eq!(f.dialect, "mysql");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn select_extras() {
        let city = TableRef::new("CITY");
        let country = TableRef::new("COUNTRY");
        let statement = Statement::select([city.col("NAME"), Expr::count_all().alias("N")])
            .distinct()
            .from(city.clone())
            .left_join(country.clone(), city.col("COUNTRY").eq(country.col("ID")))
            .filter(country.col("CODE").in_list(["CH", "AT"]).unwrap())
            .group_by([city.col("NAME")])
            .having(Expr::count_all().gt(1))
            .order_by(OrderBy::desc(city.col("NAME")).nulls_last())
            .limit(10)
            .offset(20)
            .build()
            .unwrap();
        let formatted = Dialect::postgres().format(&statement).unwrap();
        assert_eq!(
            formatted.sql(),
            "SELECT DISTINCT c.NAME, COUNT(*) AS N FROM CITY c LEFT JOIN COUNTRY co ON c.COUNTRY = co.ID \
             WHERE co.CODE IN ($1, $2) GROUP BY c.NAME HAVING COUNT(*) > $3 \
             ORDER BY c.NAME DESC NULLS LAST LIMIT 10 OFFSET 20"
        );
        assert!(Dialect::mysql().format(&statement).is_err());
    }

    #[test]
    fn merge_renders_both_branches() {
        let target = TableRef::new("CITY");
        let source = TableRef::new("STAGING");
        let statement = Statement::merge_into(
            target.clone(),
            source.clone(),
            target.col("ID").eq(source.col("ID")),
        )
        .when_matched_set(Expr::col("NAME"), source.col("NAME"))
        .when_not_matched_insert(
            vec![Expr::col("ID"), Expr::col("NAME")],
            vec![source.col("ID"), source.col("NAME")],
        )
        .build()
        .unwrap();
        assert_eq!(
            Dialect::generic().format(&statement).unwrap().sql(),
            "MERGE INTO CITY c USING STAGING s ON c.ID = s.ID \
             WHEN MATCHED THEN UPDATE SET NAME = s.NAME \
             WHEN NOT MATCHED THEN INSERT (ID, NAME) VALUES (s.ID, s.NAME)"
        );
    }

    #[test]
    fn upsert_per_dialect() {
        let city = TableRef::new("CITY");
        let statement = Statement::upsert(city)
            .keys([Expr::col("ID")])
            .set(Expr::col("ID"), 1_i64)
            .set(Expr::col("NAME"), "Bern")
            .build()
            .unwrap();
        assert_eq!(
            Dialect::generic().to_inline_sql(&statement).unwrap(),
            "MERGE INTO CITY(ID, NAME) KEY(ID) VALUES (1, 'Bern')"
        );
        assert_eq!(
            Dialect::sqlite().format(&statement).unwrap().sql(),
            "INSERT INTO CITY(ID, NAME) VALUES (?1, ?2) ON CONFLICT (ID) DO UPDATE SET NAME = EXCLUDED.NAME"
        );
    }

    #[test]
    fn create_table_lists_columns_then_constraints() {
        let name = ColumnSpec::named("NAME", SqlType::VarChar(Some(80)));
        let id = ColumnSpec::named("ID", SqlType::BigInt).not_null();
        let spec = TableSpec::named("PERSON")
            .column(id.clone())
            .column(name.clone())
            .column(ColumnSpec::named("CITY$ID", SqlType::BigInt))
            .constraint(
                ConstraintSpec::foreign_key(
                    vec![ColumnSpec::named("CITY$ID", SqlType::BigInt)],
                    TableName::Explicit("CITY".into()),
                    vec![id.clone()],
                )
                .on_delete(ReferentialAction::Cascade),
            )
            .constraint(ConstraintSpec::not_null(name))
            .constraint(ConstraintSpec::primary_key(vec![id]));
        let statement = Statement::create_table(spec).build().unwrap();
        assert_eq!(
            Dialect::generic().format(&statement).unwrap().sql(),
            "CREATE TABLE PERSON (ID BIGINT NOT NULL, NAME VARCHAR(80), CITY$ID BIGINT, \
             CONSTRAINT FK_PERSON_CITY$ID FOREIGN KEY (CITY$ID) REFERENCES CITY (ID) ON DELETE CASCADE, \
             CONSTRAINT NN_PERSON_NAME CHECK (NAME IS NOT NULL), \
             CONSTRAINT PK_PERSON PRIMARY KEY (ID))"
        );
    }

    #[test]
    fn ddl_literals_are_inline() {
        let spec = TableSpec::named("T")
            .column(ColumnSpec::named("N", SqlType::Integer).default_value(0))
            .constraint(ConstraintSpec::check(Expr::col("N").ge(0)));
        let statement = Statement::create_table(spec).build().unwrap();
        let formatted = Dialect::postgres().format(&statement).unwrap();
        assert_eq!(
            formatted.sql(),
            "CREATE TABLE T (N INTEGER DEFAULT 0, CONSTRAINT CK_T CHECK (N >= 0))"
        );
        assert!(formatted.parameters().is_empty());
    }

    #[test]
    fn alter_operations_keep_their_order() {
        let nick = ColumnSpec::named("NICK", SqlType::Text);
        let statement = Statement::alter_table(TableSpec::named("PERSON"))
            .add_column(nick.clone())
            .drop_constraint_named("UK_PERSON_NICK")
            .rename_column(nick.clone(), "ALIAS")
            .modify_column(ColumnSpec::named("NAME", SqlType::VarChar(Some(40))))
            .add_column(nick)
            .build()
            .unwrap();
        assert_eq!(
            Dialect::generic().format(&statement).unwrap().sql(),
            "ALTER TABLE PERSON ADD COLUMN NICK TEXT, DROP CONSTRAINT UK_PERSON_NICK, \
             RENAME COLUMN NICK TO ALIAS, MODIFY COLUMN NAME VARCHAR(40), ADD COLUMN NICK TEXT"
        );
        assert!(Dialect::sqlite().format(&statement).is_err());
    }

    #[test]
    fn sqlite_cannot_modify_columns() {
        let statement = Statement::alter_table(TableSpec::named("PERSON"))
            .modify_column(ColumnSpec::named("NAME", SqlType::Text))
            .build()
            .unwrap();
        let err = Dialect::sqlite().format(&statement).unwrap_err();
        assert!(matches!(err, Error::Format(ref f) if f.construct == "MODIFY COLUMN"));
        assert_eq!(
            Dialect::postgres().format(&statement).unwrap().sql(),
            "ALTER TABLE PERSON ALTER COLUMN NAME TYPE TEXT"
        );
    }

    #[test]
    fn index_statements() {
        let index = IndexSpec::new(
            TableName::Explicit("CITY".into()),
            vec![ColumnSpec::named("NAME", SqlType::Text)],
            true,
        );
        let create = Statement::create_index(index.clone());
        assert_eq!(
            Dialect::generic().format(&create).unwrap().sql(),
            "CREATE UNIQUE INDEX UX_CITY_NAME ON CITY (NAME)"
        );
        let drop = Statement::drop_index(index);
        assert_eq!(
            Dialect::mysql().format(&drop).unwrap().sql(),
            "DROP INDEX UX_CITY_NAME ON CITY"
        );
    }

    #[test]
    fn reserved_and_irregular_identifiers_are_quoted() {
        let order = TableRef::new("order");
        let statement = Statement::select([order.col("first name")])
            .from(order)
            .build()
            .unwrap();
        assert_eq!(
            Dialect::generic().format(&statement).unwrap().sql(),
            "SELECT o.\"first name\" FROM \"order\" o"
        );
        assert_eq!(
            Dialect::mysql().format(&statement).unwrap().sql(),
            "SELECT o.`first name` FROM `order` o"
        );
    }
}
