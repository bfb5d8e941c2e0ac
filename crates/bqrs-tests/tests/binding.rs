//! Table binding over a decoded golden container.

use bqrs_binding::{BindError, BoundValue, ElementOptions, Requirement, TableSpec, bind_tables};
use bqrs_decoder::ContainerReader;
use bqrs_tests::{golden_path, select};
use bqrs_types::{LocationValue, PrimitiveValue};

const NO_LABEL: ElementOptions = ElementOptions {
    label: Requirement::Forbidden,
    location: Requirement::Required,
};

const BARE: ElementOptions = ElementOptions {
    label: Requirement::Forbidden,
    location: Requirement::Forbidden,
};

fn specs() -> Vec<TableSpec> {
    vec![
        TableSpec::new("select", |b| b.element(0, ElementOptions::default()).rest(1)),
        TableSpec::new("edges", |b| b.element(0, NO_LABEL).element(1, BARE)),
    ]
}

#[tokio::test]
async fn binds_golden_tables() {
    let reader = ContainerReader::open_file(golden_path("elements")).await.unwrap();
    let tables = bind_tables(&reader, &specs()).unwrap();
    assert_eq!(tables.len(), 2);

    let select = tables[0].read_rows().await.unwrap();
    assert_eq!(select.len(), 2);
    let call = select[1].get(0).and_then(BoundValue::as_element).unwrap();
    assert_eq!(call.label.as_deref(), Some("util"));
    assert!(call.location.is_resolvable());
    let rest = select[1].get(1).and_then(BoundValue::as_list).unwrap();
    assert_eq!(rest.len(), 4);
    assert_eq!(rest[0].as_str(), Some("https://example.com/a"));
    assert_eq!(rest[1], BoundValue::Primitive(PrimitiveValue::Boolean(false)));

    let edges = tables[1].read_rows().await.unwrap();
    let src = edges[0].get(0).and_then(BoundValue::as_element).unwrap();
    assert_eq!(src.id, PrimitiveValue::Integer(7));
    assert!(matches!(&src.location, LocationValue::String(s) if s.starts_with("file://")));
    assert!(!src.location.is_resolvable());
    let dst = edges[0].get(1).and_then(BoundValue::as_element).unwrap();
    assert_eq!(dst.location, LocationValue::None);
}

#[tokio::test]
async fn required_label_missing_fails() {
    let reader = ContainerReader::open_file(golden_path("elements")).await.unwrap();
    let specs = vec![
        TableSpec::new("select", |b| b.element(0, ElementOptions::default()).rest(1)),
        TableSpec::new("edges", |b| b.element(0, ElementOptions::default()).element(1, BARE)),
    ];
    assert!(matches!(
        bind_tables(&reader, &specs),
        Err(BindError::MissingElementPart { index: 0, part: "label", .. })
    ));
}

#[tokio::test]
async fn string_rest_rejects_other_column_types() {
    let reader = ContainerReader::open_file(golden_path("elements")).await.unwrap();
    let specs = vec![
        TableSpec::new("select", |b| b.element(0, ElementOptions::default()).rest_strings(1)),
        TableSpec::new("edges", |b| b.rest_elements(0, ElementOptions::ANY)),
    ];
    // Column 1 of #select is a url, not a string.
    assert!(matches!(
        bind_tables(&reader, &specs),
        Err(BindError::TypeMismatch {
            index: 1,
            expected: "string",
            ..
        })
    ));
}

#[tokio::test]
async fn nested_group_binds_a_column_span() {
    let reader = ContainerReader::open_file(golden_path("elements")).await.unwrap();
    let specs = vec![
        TableSpec::new("select", |b| {
            b.element(0, ElementOptions::default())
                .group(1, |g| g.any(1).any(0))
                .rest(3)
        }),
        TableSpec::new("edges", |b| b.rest_elements(0, ElementOptions::ANY)),
    ];
    let tables = bind_tables(&reader, &specs).unwrap();

    let rows = tables[0].read_rows().await.unwrap();
    assert_eq!(rows[0].len(), 3);
    let group = rows[0].get(1).and_then(BoundValue::as_group).unwrap();
    assert_eq!(group.get(0), Some(&BoundValue::Primitive(PrimitiveValue::Boolean(true))));
    assert_eq!(group.get(1).and_then(BoundValue::as_str), Some("https://example.com/a"));
    assert_eq!(rows[0].get(2).and_then(BoundValue::as_list).map(<[_]>::len), Some(2));

    let edges = tables[1].read_rows().await.unwrap();
    assert_eq!(edges[0].get(0).and_then(BoundValue::as_list).map(<[_]>::len), Some(2));
}

#[tokio::test]
async fn select_alias_and_row_counting() {
    let reader = ContainerReader::from_bytes(select().encode().unwrap()).await.unwrap();
    let specs = vec![TableSpec::new("results", |b| b.string(0).any(1)).with_names(["select"])];
    let tables = bind_tables(&reader, &specs).unwrap();

    let mut seen = Vec::new();
    let visited = tables[0]
        .for_each_row(|row| seen.push(row.get(0).and_then(BoundValue::as_str).map(String::from)))
        .await
        .unwrap();
    assert_eq!(visited, 2);
    assert_eq!(seen, vec![Some("hello".to_string()), Some("world".to_string())]);
}
