mod support;

use entgraph::{
    ConflictAction, EntityDef, Error, Executor, FieldDef, GenericSqlWriter, IdReadback, Insert,
    OnConflict, RelationalGraph, Schema, SqliteSqlWriter, Value,
};
use support::MemoryExecutor;

const SQLITE: SqliteSqlWriter = SqliteSqlWriter::new();
const GENERIC: GenericSqlWriter = GenericSqlWriter::new();

fn users() -> RelationalGraph {
    Schema::new()
        .entity(
            EntityDef::new("User")
                .field(FieldDef::new("email", Value::Varchar(None)).unique())
                .field(FieldDef::new("name", Value::Varchar(None))),
        )
        .compile()
        .unwrap()
}

#[tokio::test]
async fn duplicate_key_without_policy_is_a_constraint_violation() {
    let graph = users();
    let mut executor = MemoryExecutor::new(&graph);

    let first = Insert::new(&graph, "User")
        .value("email", "a@b.c")
        .value("name", "Ada")
        .build(&SQLITE)
        .unwrap();
    let result = executor.execute(&first).await.unwrap();
    assert_eq!(result.rows_affected, 1);
    assert_eq!(result.last_inserted_id, Some(Value::from(1i64)));

    let second = Insert::new(&graph, "User")
        .value("email", "a@b.c")
        .value("name", "Grace")
        .build(&SQLITE)
        .unwrap();
    let error = executor.execute(&second).await.unwrap_err();
    assert!(matches!(
        error,
        Error::ConstraintViolation { constraint } if constraint == "users_email_key"
    ));
    assert_eq!(executor.rows("users").len(), 1);
}

#[tokio::test]
async fn update_all_overwrites_and_keeps_the_identifier() {
    let graph = users();
    let mut executor = MemoryExecutor::new(&graph);

    let first = Insert::new(&graph, "User")
        .value("email", "a@b.c")
        .value("name", "Ada")
        .build(&SQLITE)
        .unwrap();
    let created = executor.execute(&first).await.unwrap();

    let second = Insert::new(&graph, "User")
        .value("email", "a@b.c")
        .value("name", "Grace")
        .on_conflict(OnConflict::update_all())
        .build(&SQLITE)
        .unwrap();
    let updated = executor.execute(&second).await.unwrap();

    assert_eq!(updated.rows_affected, 1);
    assert_eq!(updated.last_inserted_id, created.last_inserted_id);
    let row = executor
        .row_by("users", "email", &Value::from("a@b.c"))
        .unwrap();
    assert_eq!(row["name"], Value::from("Grace"));
    assert_eq!(executor.rows("users").len(), 1);
}

#[tokio::test]
async fn do_nothing_reports_zero_affected_rows() {
    let graph = users();
    let mut executor = MemoryExecutor::new(&graph);

    let first = Insert::new(&graph, "User")
        .value("email", "a@b.c")
        .value("name", "Ada")
        .build(&SQLITE)
        .unwrap();
    executor.execute(&first).await.unwrap();

    let second = Insert::new(&graph, "User")
        .value("email", "a@b.c")
        .value("name", "Grace")
        .on_conflict(OnConflict::nothing())
        .build(&SQLITE)
        .unwrap();
    let result = executor.execute(&second).await.unwrap();

    assert_eq!(result.rows_affected, 0);
    assert_eq!(result.last_inserted_id, None);
    let row = executor
        .row_by("users", "email", &Value::from("a@b.c"))
        .unwrap();
    assert_eq!(row["name"], Value::from("Ada"));
}

#[tokio::test]
async fn per_column_actions_mix_incoming_and_existing_values() {
    let graph = Schema::new()
        .entity(
            EntityDef::new("Profile")
                .field(FieldDef::new("handle", Value::Varchar(None)).unique())
                .field(FieldDef::new("bio", Value::Varchar(None)))
                .field(FieldDef::new("location", Value::Varchar(None))),
        )
        .compile()
        .unwrap();
    let mut executor = MemoryExecutor::new(&graph);

    let first = Insert::new(&graph, "Profile")
        .value("handle", "ada")
        .value("bio", "mathematician")
        .value("location", "London")
        .build(&SQLITE)
        .unwrap();
    executor.execute(&first).await.unwrap();

    let second = Insert::new(&graph, "Profile")
        .value("handle", "ada")
        .value("bio", "engineer")
        .value("location", "Turin")
        .on_conflict(OnConflict::resolve().action("bio", ConflictAction::Existing))
        .build(&SQLITE)
        .unwrap();
    executor.execute(&second).await.unwrap();

    let row = executor
        .row_by("profiles", "handle", &Value::from("ada"))
        .unwrap();
    assert_eq!(row["bio"], Value::from("mathematician"));
    assert_eq!(row["location"], Value::from("Turin"));
}

#[tokio::test]
async fn expression_actions_accumulate() {
    let graph = Schema::new()
        .entity(
            EntityDef::new("Counter")
                .field(FieldDef::new("key", Value::Varchar(None)).unique())
                .field(FieldDef::new("hits", Value::Int64(None))),
        )
        .compile()
        .unwrap();
    let mut executor = MemoryExecutor::new(&graph);

    let accumulate = |hits: i64| {
        Insert::new(&graph, "Counter")
            .value("key", "home")
            .value("hits", hits)
            .on_conflict(OnConflict::resolve().action(
                "hits",
                ConflictAction::Expr(r#""counters"."hits" + excluded."hits""#.to_owned()),
            ))
            .build(&SQLITE)
            .unwrap()
    };
    executor.execute(&accumulate(3)).await.unwrap();
    executor.execute(&accumulate(4)).await.unwrap();

    let row = executor
        .row_by("counters", "key", &Value::from("home"))
        .unwrap();
    assert_eq!(row["hits"], Value::from(7i64));
}

#[tokio::test]
async fn identifier_readback_without_returning_support() {
    let graph = users();
    let mut executor = MemoryExecutor::new(&graph);

    let pending = Insert::new(&graph, "User")
        .value("email", "a@b.c")
        .value("name", "Ada");
    let insert = pending.build(&GENERIC).unwrap();
    assert_eq!(
        insert.readback,
        IdReadback::ByColumns(vec!["email".to_owned()])
    );
    let result = executor.execute(&insert).await.unwrap();
    assert_eq!(result.rows_affected, 1);
    assert_eq!(result.last_inserted_id, None);

    let lookup = pending.id_lookup(&GENERIC).unwrap();
    let row = executor.fetch_one(&lookup).await.unwrap().unwrap();
    assert_eq!(row, [Value::from(1i64)]);
}
