//! Seed-document bootstrap exercised end to end through the query engine

use twindb_core::Value;
use twindb_query::{run, Binding, PrefixMap};
use twindb_transact::{SeedDataset, UpdateBatch};

const EX: &str = "http://example.org/";

const DOC: &str = r#"{
    "classes": [
        { "iri": "http://example.org/CommunicationsSatellite",
          "properties": [
              "http://example.org/batteryLevel",
              "http://example.org/operator"
          ] },
        { "iri": "http://example.org/Operator", "properties": [] }
    ],
    "properties": [
        { "iri": "http://example.org/batteryLevel",
          "datatype": "float",
          "range": { "min": 0.0, "max": 100.0 } },
        { "iri": "http://example.org/operator", "datatype": "ref" }
    ],
    "entities": [
        { "id": "http://example.org/sat-1",
          "classes": ["http://example.org/CommunicationsSatellite"],
          "properties": {
              "http://example.org/batteryLevel": 73.5,
              "http://example.org/operator": "http://example.org/op-1"
          } },
        { "id": "http://example.org/sat-2",
          "classes": ["http://example.org/CommunicationsSatellite"],
          "properties": {
              "http://example.org/batteryLevel": 41.0,
              "http://example.org/operator": "http://example.org/op-1"
          } },
        { "id": "http://example.org/op-1",
          "classes": ["http://example.org/Operator"] }
    ]
}"#;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn prefixes() -> PrefixMap {
    PrefixMap::new().with("ex", EX)
}

fn ex(local: &str) -> twindb_core::Iri {
    twindb_core::Iri::new(format!("{EX}{local}"))
}

#[test]
fn test_seeded_dataset_answers_queries() {
    init_logging();
    let coordinator = SeedDataset::from_json(DOC).unwrap().bootstrap().unwrap();
    let store = coordinator.store();

    let text = "SELECT ?s ?b WHERE { \
        ?s a ex:CommunicationsSatellite . \
        ?s ex:batteryLevel ?b . \
        FILTER(?b < 50.0) \
    }";
    let results: Vec<Binding> = run(text, &prefixes(), store).unwrap().collect();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].get("?s"), Some(&Value::Ref(ex("sat-2"))));
    assert_eq!(results[0].get("?b"), Some(&Value::Float(41.0)));
}

#[test]
fn test_query_joins_through_class_only_entity() {
    init_logging();
    let coordinator = SeedDataset::from_json(DOC).unwrap().bootstrap().unwrap();
    let store = coordinator.store();

    // op-1 carries no properties; the join still reaches it by membership
    let text = "SELECT ?s WHERE { \
        ?s ex:operator ?op . \
        ?op a ex:Operator . \
    }";
    let results: Vec<Binding> = run(text, &prefixes(), store).unwrap().collect();
    assert_eq!(results.len(), 2);
}

#[test]
fn test_batch_update_visible_to_later_query() {
    init_logging();
    let coordinator = SeedDataset::from_json(DOC).unwrap().bootstrap().unwrap();
    let store = coordinator.store();

    let batch = UpdateBatch::new(ex("sat-1")).set(ex("batteryLevel"), 12.5);
    coordinator.apply(&batch).unwrap();

    let text = "SELECT ?s WHERE { ?s ex:batteryLevel ?b . FILTER(?b <= 12.5) }";
    let results: Vec<Binding> = run(text, &prefixes(), store).unwrap().collect();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].get("?s"), Some(&Value::Ref(ex("sat-1"))));
}
