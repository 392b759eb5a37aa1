//! DDL statement builders.

use crate::clause::Clause;
use crate::ddl::{ColumnSpec, ConstraintSpec, TableOperation, TableSpec};
use crate::statement::{Statement, StatementKind};
use relmap_core::error::StatementErrorKind;
use relmap_core::{Error, Result};

#[derive(Debug, Clone)]
pub struct CreateTableBuilder {
    table: TableSpec,
}

impl CreateTableBuilder {
    pub fn new(table: TableSpec) -> Self {
        Self { table }
    }

    pub fn column(mut self, column: ColumnSpec) -> Self {
        self.table.columns.push(column);
        self
    }

    pub fn constraint(mut self, constraint: ConstraintSpec) -> Self {
        self.table.constraints.push(constraint);
        self
    }

    pub fn build(self) -> Result<Statement> {
        if self.table.columns.is_empty() {
            return Err(Error::statement(
                StatementErrorKind::Incomplete,
                format!("CREATE TABLE {} has no columns", self.table.name.logical()),
            ));
        }
        Ok(Statement::new(
            StatementKind::CreateTable,
            Clause::CreateTable(self.table),
        ))
    }
}

/// ALTER TABLE with an ordered list of operations. Nothing is reordered or
/// deduplicated.
#[derive(Debug, Clone)]
pub struct AlterTableBuilder {
    table: TableSpec,
    operations: Vec<TableOperation>,
}

impl AlterTableBuilder {
    pub fn new(table: TableSpec) -> Self {
        Self {
            table,
            operations: Vec::new(),
        }
    }

    pub fn operation(mut self, operation: TableOperation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn add_column(self, column: ColumnSpec) -> Self {
        self.operation(TableOperation::add_column(column))
    }

    pub fn drop_column(self, column: ColumnSpec) -> Self {
        self.operation(TableOperation::drop_column(column))
    }

    pub fn modify_column(self, column: ColumnSpec) -> Self {
        self.operation(TableOperation::modify_column(column))
    }

    pub fn rename_column(self, column: ColumnSpec, to: impl Into<String>) -> Self {
        self.operation(TableOperation::rename_column(column, to))
    }

    pub fn add_constraint(self, constraint: ConstraintSpec) -> Self {
        self.operation(TableOperation::add_constraint(constraint))
    }

    pub fn drop_constraint(self, constraint: ConstraintSpec) -> Self {
        self.operation(TableOperation::drop_constraint(constraint))
    }

    pub fn drop_constraint_named(self, name: impl Into<String>) -> Self {
        self.operation(TableOperation::drop_constraint_named(name))
    }

    pub fn build(self) -> Result<Statement> {
        if self.operations.is_empty() {
            return Err(Error::statement(
                StatementErrorKind::Incomplete,
                format!("ALTER TABLE {} has no operations", self.table.name.logical()),
            ));
        }
        Ok(Statement::new(
            StatementKind::AlterTable,
            Clause::AlterTable {
                table: self.table,
                operations: self.operations,
            },
        ))
    }
}

#[derive(Debug, Clone)]
pub struct DropTableBuilder {
    table: TableSpec,
    if_exists: bool,
}

impl DropTableBuilder {
    pub fn new(table: TableSpec) -> Self {
        Self {
            table,
            if_exists: false,
        }
    }

    pub fn if_exists(mut self) -> Self {
        self.if_exists = true;
        self
    }

    pub fn build(self) -> Result<Statement> {
        Ok(Statement::new(
            StatementKind::DropTable,
            Clause::DropTable {
                table: self.table,
                if_exists: self.if_exists,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ddl::{ElementKind, OperationType};
    use relmap_core::SqlType;

    #[test]
    fn create_table_needs_columns() {
        assert!(Statement::create_table(TableSpec::named("T")).build().is_err());
        let statement = Statement::create_table(TableSpec::named("T"))
            .column(ColumnSpec::named("ID", SqlType::BigInt).not_null())
            .build()
            .unwrap();
        assert_eq!(statement.kind(), StatementKind::CreateTable);
    }

    #[test]
    fn alter_operations_keep_order_and_duplicates() {
        let nick = ColumnSpec::named("NICK", SqlType::Text);
        let statement = Statement::alter_table(TableSpec::named("PERSON"))
            .add_column(nick.clone())
            .drop_constraint_named("UK_PERSON_NAME")
            .rename_column(nick.clone(), "NICKNAME")
            .add_column(nick)
            .build()
            .unwrap();
        let shapes: Vec<_> = statement
            .table_operations()
            .iter()
            .map(|op| (op.op, op.kind()))
            .collect();
        assert_eq!(
            shapes,
            [
                (OperationType::Add, ElementKind::Column),
                (OperationType::Drop, ElementKind::Constraint),
                (OperationType::Rename, ElementKind::Column),
                (OperationType::Add, ElementKind::Column),
            ]
        );
        assert!(Statement::alter_table(TableSpec::named("PERSON")).build().is_err());
    }
}
