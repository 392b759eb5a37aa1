//! DDL element model.
//!
//! Columns, tables, constraints and indexes are described by specs whose names
//! are either explicit or derived on demand from a [`NamingStrategy`]. Derived
//! names are never cached: the strategy in effect when a name is asked for
//! decides it.

use crate::alias::TableName;
use crate::expr::Expr;
use relmap_core::{ConstraintKind, NamingStrategy, SqlType, Value};

/// Referential action for foreign keys (ON DELETE / ON UPDATE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferentialAction {
    #[default]
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

impl ReferentialAction {
    pub const fn as_sql(self) -> &'static str {
        match self {
            ReferentialAction::NoAction => "NO ACTION",
            ReferentialAction::Restrict => "RESTRICT",
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::SetDefault => "SET DEFAULT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnName {
    Explicit(String),
    /// Logical property path, converted and joined by the naming strategy
    Path(Vec<String>),
    /// Already-converted path segments, joined by the naming strategy
    Segments(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub name: ColumnName,
    pub sql_type: SqlType,
    pub nullable: bool,
    pub default: Option<Value>,
}

impl ColumnSpec {
    /// Column with an explicit name.
    pub fn named(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self::with_name(ColumnName::Explicit(name.into()), sql_type)
    }

    /// Column named after a logical property path (`"geoLocation.latitude"`).
    pub fn property(path: &str, sql_type: SqlType) -> Self {
        Self::with_name(ColumnName::Path(crate::expr::split_path(path)), sql_type)
    }

    pub fn with_name(name: ColumnName, sql_type: SqlType) -> Self {
        Self {
            name,
            sql_type,
            nullable: true,
            default: None,
        }
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn not_null(self) -> Self {
        self.nullable(false)
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Physical name under `naming`.
    pub fn name(&self, naming: &NamingStrategy) -> String {
        match &self.name {
            ColumnName::Explicit(name) => name.clone(),
            ColumnName::Path(path) => {
                let parts: Vec<&str> = path.iter().map(String::as_str).collect();
                naming.column_name(&parts)
            }
            ColumnName::Segments(segments) => naming.join_path(segments),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintDef {
    PrimaryKey(Vec<ColumnSpec>),
    ForeignKey {
        columns: Vec<ColumnSpec>,
        references: TableName,
        referenced: Vec<ColumnSpec>,
        on_delete: Option<ReferentialAction>,
    },
    NotNull(ColumnSpec),
    Unique(Vec<ColumnSpec>),
    Check(Expr),
}

impl ConstraintDef {
    pub const fn kind(&self) -> ConstraintKind {
        match self {
            ConstraintDef::PrimaryKey(_) => ConstraintKind::PrimaryKey,
            ConstraintDef::ForeignKey { .. } => ConstraintKind::ForeignKey,
            ConstraintDef::NotNull(_) => ConstraintKind::NotNull,
            ConstraintDef::Unique(_) => ConstraintKind::Unique,
            ConstraintDef::Check(_) => ConstraintKind::Check,
        }
    }

    /// Constrained columns, in declaration order.
    pub fn columns(&self) -> &[ColumnSpec] {
        match self {
            ConstraintDef::PrimaryKey(columns)
            | ConstraintDef::ForeignKey { columns, .. }
            | ConstraintDef::Unique(columns) => columns,
            ConstraintDef::NotNull(column) => std::slice::from_ref(column),
            ConstraintDef::Check(_) => &[],
        }
    }
}

/// A table constraint. Either fully defined, or known only by name (enough
/// to drop it).
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintSpec {
    pub explicit_name: Option<String>,
    pub def: Option<ConstraintDef>,
}

impl ConstraintSpec {
    pub fn new(def: ConstraintDef) -> Self {
        Self {
            explicit_name: None,
            def: Some(def),
        }
    }

    /// A constraint referred to by name only.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            explicit_name: Some(name.into()),
            def: None,
        }
    }

    pub fn primary_key(columns: Vec<ColumnSpec>) -> Self {
        Self::new(ConstraintDef::PrimaryKey(columns))
    }

    pub fn foreign_key(
        columns: Vec<ColumnSpec>,
        references: TableName,
        referenced: Vec<ColumnSpec>,
    ) -> Self {
        Self::new(ConstraintDef::ForeignKey {
            columns,
            references,
            referenced,
            on_delete: None,
        })
    }

    pub fn not_null(column: ColumnSpec) -> Self {
        Self::new(ConstraintDef::NotNull(column))
    }

    pub fn unique(columns: Vec<ColumnSpec>) -> Self {
        Self::new(ConstraintDef::Unique(columns))
    }

    pub fn check(condition: Expr) -> Self {
        Self::new(ConstraintDef::Check(condition))
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.explicit_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        if let Some(ConstraintDef::ForeignKey { on_delete, .. }) = &mut self.def {
            *on_delete = Some(action);
        }
        self
    }

    /// Physical name on table `table` under `naming`.
    pub fn name(&self, table: &str, naming: &NamingStrategy) -> String {
        if let Some(name) = &self.explicit_name {
            return name.clone();
        }
        match &self.def {
            Some(def) => {
                let columns: Vec<String> = def.columns().iter().map(|c| c.name(naming)).collect();
                naming.constraint_name(def.kind(), table, &columns)
            }
            None => naming.clip(table.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableSpec {
    pub name: TableName,
    pub columns: Vec<ColumnSpec>,
    pub constraints: Vec<ConstraintSpec>,
}

impl TableSpec {
    pub fn new(name: TableName) -> Self {
        Self {
            name,
            columns: Vec::new(),
            constraints: Vec::new(),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::new(TableName::Explicit(name.into()))
    }

    /// Table named after an entity.
    pub fn entity(entity: &'static str) -> Self {
        Self::new(TableName::Entity(entity))
    }

    pub fn column(mut self, column: ColumnSpec) -> Self {
        self.columns.push(column);
        self
    }

    pub fn constraint(mut self, constraint: ConstraintSpec) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn name(&self, naming: &NamingStrategy) -> String {
        self.name.resolve(naming)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexSpec {
    pub explicit_name: Option<String>,
    pub table: TableName,
    pub columns: Vec<ColumnSpec>,
    pub unique: bool,
}

impl IndexSpec {
    pub fn new(table: TableName, columns: Vec<ColumnSpec>, unique: bool) -> Self {
        Self {
            explicit_name: None,
            table,
            columns,
            unique,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.explicit_name = Some(name.into());
        self
    }

    pub fn name(&self, naming: &NamingStrategy) -> String {
        if let Some(name) = &self.explicit_name {
            return name.clone();
        }
        let columns: Vec<String> = self.columns.iter().map(|c| c.name(naming)).collect();
        naming.index_name(self.unique, &self.table.resolve(naming), &columns)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    Add,
    Drop,
    Rename,
    Modify,
}

impl OperationType {
    pub const fn keyword(self) -> &'static str {
        match self {
            OperationType::Add => "ADD",
            OperationType::Drop => "DROP",
            OperationType::Rename => "RENAME",
            OperationType::Modify => "MODIFY",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Column,
    Constraint,
}

impl ElementKind {
    pub const fn keyword(self) -> &'static str {
        match self {
            ElementKind::Column => "COLUMN",
            ElementKind::Constraint => "CONSTRAINT",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DdlElement {
    Column(ColumnSpec),
    Constraint(ConstraintSpec),
}

/// One ALTER TABLE operation.
#[derive(Debug, Clone, PartialEq)]
pub struct TableOperation {
    pub op: OperationType,
    pub element: DdlElement,
    /// New name for RENAME
    pub rename_to: Option<String>,
}

impl TableOperation {
    pub fn kind(&self) -> ElementKind {
        match self.element {
            DdlElement::Column(_) => ElementKind::Column,
            DdlElement::Constraint(_) => ElementKind::Constraint,
        }
    }

    pub fn add_column(column: ColumnSpec) -> Self {
        Self::plain(OperationType::Add, DdlElement::Column(column))
    }

    pub fn drop_column(column: ColumnSpec) -> Self {
        Self::plain(OperationType::Drop, DdlElement::Column(column))
    }

    pub fn modify_column(column: ColumnSpec) -> Self {
        Self::plain(OperationType::Modify, DdlElement::Column(column))
    }

    pub fn rename_column(column: ColumnSpec, to: impl Into<String>) -> Self {
        Self {
            op: OperationType::Rename,
            element: DdlElement::Column(column),
            rename_to: Some(to.into()),
        }
    }

    pub fn add_constraint(constraint: ConstraintSpec) -> Self {
        Self::plain(OperationType::Add, DdlElement::Constraint(constraint))
    }

    pub fn drop_constraint(constraint: ConstraintSpec) -> Self {
        Self::plain(OperationType::Drop, DdlElement::Constraint(constraint))
    }

    /// Same operation shape as [`TableOperation::drop_constraint`].
    pub fn drop_constraint_named(name: impl Into<String>) -> Self {
        Self::drop_constraint(ConstraintSpec::named(name))
    }

    fn plain(op: OperationType, element: DdlElement) -> Self {
        Self {
            op,
            element,
            rename_to: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relmap_core::IdentifierCase;

    #[test]
    fn column_names_are_derived_lazily() {
        let column = ColumnSpec::property("geoLocation.latitude", SqlType::Double);
        let upper = NamingStrategy::default();
        let lower = NamingStrategy {
            case: IdentifierCase::Lower,
            ..NamingStrategy::default()
        };
        assert_eq!(column.name(&upper), "GEO_LOCATION$LATITUDE");
        assert_eq!(column.name(&lower), "geo_location$latitude");
        assert_eq!(ColumnSpec::named("Name", SqlType::Text).name(&upper), "Name");
    }

    #[test]
    fn constraint_names_follow_kind_prefixes() {
        let naming = NamingStrategy::default();
        let fk = ConstraintSpec::foreign_key(
            vec![ColumnSpec::property("city.id", SqlType::BigInt)],
            TableName::Entity("City"),
            vec![ColumnSpec::named("ID", SqlType::BigInt)],
        );
        assert_eq!(fk.name("PERSON", &naming), "FK_PERSON_CITY$ID");

        let nn = ConstraintSpec::not_null(ColumnSpec::property("name", SqlType::Text));
        assert_eq!(nn.name("PERSON", &naming), "NN_PERSON_NAME");

        let pk = ConstraintSpec::primary_key(vec![ColumnSpec::named("ID", SqlType::BigInt)]);
        assert_eq!(pk.name("PERSON", &naming), "PK_PERSON");

        let explicit = pk.with_name("PERSON_PKEY");
        assert_eq!(explicit.name("PERSON", &naming), "PERSON_PKEY");
    }

    #[test]
    fn dropping_by_name_or_object_converge() {
        let by_name = TableOperation::drop_constraint_named("UK_PERSON_NAME");
        let by_object = TableOperation::drop_constraint(ConstraintSpec::named("UK_PERSON_NAME"));
        assert_eq!(by_name, by_object);
        assert_eq!(by_name.kind(), ElementKind::Constraint);
        assert_eq!(by_name.op, OperationType::Drop);
    }

    #[test]
    fn index_names() {
        let naming = NamingStrategy::default();
        let index = IndexSpec::new(
            TableName::Entity("City"),
            vec![ColumnSpec::property("name", SqlType::Text)],
            true,
        );
        assert_eq!(index.name(&naming), "UX_CITY_NAME");
        let clipped = NamingStrategy::with_max_length(6);
        assert_eq!(index.name(&clipped), "UX_CIT");
    }

    #[test]
    fn on_delete_only_applies_to_foreign_keys() {
        let pk = ConstraintSpec::primary_key(Vec::new()).on_delete(ReferentialAction::Cascade);
        assert_eq!(pk.def, Some(ConstraintDef::PrimaryKey(Vec::new())));
    }
}
