mod common;

use common::{City, GeoLocation};
use relmap::prelude::*;
use relmap::{StatementErrorKind, delete_entity, update_entity};

#[derive(Debug, Clone, PartialEq, Entity)]
struct Author {
    #[relmap(column = "FULL_NAME")]
    name: String,
    #[relmap(column = "HOME")]
    home: Option<GeoLocation>,
    city: Option<Ref<City>>,
    #[relmap(id)]
    id: ObjectId,
}

fn grace() -> Author {
    Author {
        name: "Grace".to_string(),
        home: None,
        city: Some(Ref::new(ObjectId::new(3, 1))),
        id: ObjectId::new(9, 2),
    }
}

#[test]
fn criteria_use_the_mapped_columns() {
    let author = TableRef::entity::<Author>();
    let statement = Statement::select_all()
        .from(author.clone())
        .filter(author.prop("name").eq("Ada"))
        .filter(author.prop("id.rev").eq(1_i64))
        .build()
        .unwrap();
    assert_eq!(
        Dialect::generic().to_inline_sql(&statement).unwrap(),
        "SELECT * FROM AUTHOR a WHERE a.FULL_NAME = 'Ada' AND a.REV = 1"
    );
}

#[test]
fn every_property_path_names_a_mapper_column() {
    let paths = [
        "name",
        "home.latitude",
        "home.longitude",
        "city.id",
        "city.rev",
        "id.id",
        "id.rev",
    ];
    for dialect in common::all_dialects() {
        let mapper = dialect.bean_mapper::<Author>().unwrap();
        let columns: Vec<_> = mapper.column_names().collect();
        assert_eq!(
            columns,
            [
                "FULL_NAME",
                "HOME$LATITUDE",
                "HOME$LONGITUDE",
                "CITY$ID",
                "CITY$REV",
                "ID",
                "REV"
            ]
        );

        let author = TableRef::entity::<Author>();
        let statement = Statement::select(paths.iter().map(|p| author.prop(p)))
            .from(author.clone())
            .build()
            .unwrap();
        let expected = columns
            .iter()
            .map(|c| format!("a.{}", dialect.quote(c)))
            .collect::<Vec<_>>()
            .join(", ");
        assert_eq!(
            dialect.to_inline_sql(&statement).unwrap(),
            format!("SELECT {expected} FROM AUTHOR a"),
            "{}",
            dialect.id()
        );
    }
}

#[test]
fn assignments_use_the_mapped_columns() {
    let author = TableRef::entity::<Author>();
    let update = Statement::update(author.clone())
        .set(author.prop("name"), "Grace")
        .filter(author.prop("id").eq(9_i64))
        .build()
        .unwrap();
    assert_eq!(
        Dialect::generic().to_inline_sql(&update).unwrap(),
        "UPDATE AUTHOR a SET FULL_NAME = 'Grace' WHERE a.ID = 9"
    );

    let target = TableRef::entity::<Author>();
    let insert = Statement::insert_into(target.clone())
        .set(target.prop("name"), "Grace")
        .set(target.prop("id.id"), 9_i64)
        .set(target.prop("id.rev"), 1_i64)
        .build()
        .unwrap();
    assert_eq!(
        Dialect::generic().to_inline_sql(&insert).unwrap(),
        "INSERT INTO AUTHOR(FULL_NAME, ID, REV) VALUES ('Grace', 9, 1)"
    );
}

#[test]
fn named_parameters_keep_the_property_path() {
    let author = TableRef::entity::<Author>();
    let statement = Statement::select_all()
        .from(author.clone())
        .filter(author.prop("name").eq("Ada"))
        .build()
        .unwrap();
    let formatted = Dialect::generic()
        .with_binding(BindingStyle::Named { merge: false })
        .format(&statement)
        .unwrap();
    assert_eq!(formatted.sql(), "SELECT * FROM AUTHOR a WHERE a.FULL_NAME = :name");
}

#[test]
fn unknown_properties_fail_to_format() {
    let author = TableRef::entity::<Author>();
    let statement = Statement::select_all()
        .from(author.clone())
        .filter(author.prop("nickname").eq("Amazing Grace"))
        .build()
        .unwrap();
    match Dialect::generic().format(&statement).unwrap_err() {
        Error::Statement(e) => assert_eq!(e.kind, StatementErrorKind::UnknownProperty),
        other => panic!("unexpected {other:?}"),
    }

    // Plain tables have no property list; the path maps by naming alone.
    let plain = TableRef::new("AUTHOR");
    let statement = Statement::select_all()
        .from(plain.clone())
        .filter(plain.prop("nickname").eq("Amazing Grace"))
        .build()
        .unwrap();
    assert_eq!(
        Dialect::generic().to_inline_sql(&statement).unwrap(),
        "SELECT * FROM AUTHOR a WHERE a.NICKNAME = 'Amazing Grace'"
    );
}

#[test]
fn sqlite_dml_targets_take_as() {
    let sqlite = Dialect::sqlite();
    let delete = sqlite.format(&delete_entity(&sqlite, &grace()).unwrap()).unwrap();
    assert_eq!(delete.sql(), "DELETE FROM AUTHOR AS a WHERE ID = ?1");

    let update = sqlite.format(&update_entity(&sqlite, &grace()).unwrap()).unwrap();
    assert!(
        update.sql().starts_with("UPDATE AUTHOR AS a SET FULL_NAME = ?1, "),
        "{}",
        update.sql()
    );
    assert!(update.sql().ends_with("WHERE ID = ?4 AND REV = ?5"), "{}", update.sql());

    let author = TableRef::entity::<Author>();
    let statement = Statement::update(author.clone())
        .set(author.prop("name"), "Grace")
        .filter(author.prop("id.rev").eq(2_i64))
        .build()
        .unwrap();
    assert_eq!(
        sqlite.format(&statement).unwrap().sql(),
        "UPDATE AUTHOR AS a SET FULL_NAME = ?1 WHERE a.REV = ?2"
    );
    assert_eq!(
        Dialect::postgres().format(&statement).unwrap().sql(),
        "UPDATE AUTHOR a SET FULL_NAME = $1 WHERE a.REV = $2"
    );
}
