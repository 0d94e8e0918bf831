//! End-to-end tests driving the textual query surface over a real store.

use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;
use tensordb_common::{StoreConfig, TensorDbError};
use tensordb_core::TypedBuffer;
use tensordb_query::{Executor, InsertSource, QueryOutput, Statement};
use tensordb_storage::Storage;

fn setup() -> (TempDir, Executor) {
    let dir = TempDir::new().unwrap();
    let storage = Storage::open(StoreConfig::for_testing(dir.path())).unwrap();
    (dir, Executor::new(Arc::new(storage)))
}

async fn status(executor: &Executor, query: &str) -> String {
    let output = executor.execute_query(query).await.unwrap();
    output.as_status().expect("expected a status result").to_string()
}

async fn value(executor: &Executor, query: &str) -> serde_json::Value {
    let output = executor.execute_query(query).await.unwrap();
    output.as_value().expect("expected a value result").clone()
}

#[tokio::test]
async fn test_create_insert_select_matrix() {
    let (_dir, executor) = setup();

    let s = status(&executor, "CREATE TENSOR t 2,3").await;
    assert_eq!(s, "Tensor t created with type float64");

    let s = status(&executor, "INSERT INTO t VALUES (1, 2, 3, 4, 5, 6)").await;
    assert_eq!(s, "String data inserted into t");

    let v = value(&executor, "SELECT t FROM t").await;
    assert_eq!(v, json!([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]));
}

#[tokio::test]
async fn test_scalar_round_trip() {
    let (_dir, executor) = setup();

    let s = status(&executor, "CREATE TENSOR s TYPE int64").await;
    assert_eq!(s, "Tensor s created with type int64");

    status(&executor, "INSERT INTO s VALUES (1234567890123)").await;
    let v = value(&executor, "SELECT s FROM s").await;
    assert_eq!(v, json!(1234567890123i64));
}

#[tokio::test]
async fn test_empty_tensor_round_trip() {
    let (_dir, executor) = setup();

    status(&executor, "CREATE TENSOR e 0,2 TYPE float32").await;
    let s = status(&executor, "INSERT INTO e VALUES ()").await;
    assert_eq!(s, "Data inserted into e (0 elements from string)");

    let v = value(&executor, "SELECT e FROM e").await;
    assert_eq!(v, json!([]));
}

#[tokio::test]
async fn test_empty_trailing_dim_renders_nested() {
    let (_dir, executor) = setup();

    status(&executor, "CREATE TENSOR e2 2,0 TYPE float32").await;
    let v = value(&executor, "SELECT e2 FROM e2").await;
    assert_eq!(v, json!([[], []]));
}

#[tokio::test]
async fn test_duplicate_create_fails() {
    let (_dir, executor) = setup();

    status(&executor, "CREATE TENSOR t 1,1").await;
    let err = executor
        .execute_query("CREATE TENSOR t 2,2")
        .await
        .unwrap_err();
    assert!(matches!(err, TensorDbError::AlreadyExists { name } if name == "t"));
}

#[tokio::test]
async fn test_insert_wrong_count_fails() {
    let (_dir, executor) = setup();

    status(&executor, "CREATE TENSOR t 2,3").await;
    let err = executor
        .execute_query("INSERT INTO t VALUES (1, 2, 3)")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TensorDbError::SizeMismatch {
            expected: 6,
            actual: 3,
            ..
        }
    ));
}

#[tokio::test]
async fn test_insert_raw_misaligned_length_fails() {
    let (_dir, executor) = setup();

    status(&executor, "CREATE TENSOR t 2,3 TYPE float32").await;
    // 7 bytes is not a multiple of the 4-byte element size.
    let err = executor
        .execute(Statement::Insert {
            name: "t".to_string(),
            source: InsertSource::Raw(vec![0u8; 7]),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TensorDbError::SizeMismatch {
            expected: 24,
            actual: 7,
            ..
        }
    ));
}

#[tokio::test]
async fn test_insert_into_missing_tensor_fails() {
    let (_dir, executor) = setup();
    let err = executor
        .execute_query("INSERT INTO ghost VALUES (1)")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_insert_bad_literal_reports_it() {
    let (_dir, executor) = setup();

    status(&executor, "CREATE TENSOR n 2 TYPE int32").await;
    let err = executor
        .execute_query("INSERT INTO n VALUES (1, 2.5)")
        .await
        .unwrap_err();
    assert!(matches!(err, TensorDbError::ParseLiteral { literal, .. } if literal == "2.5"));
}

#[tokio::test]
async fn test_select_with_slice() {
    let (_dir, executor) = setup();

    status(&executor, "CREATE TENSOR t 2,3 TYPE int32").await;
    status(&executor, "INSERT INTO t VALUES (1, 2, 3, 4, 5, 6)").await;

    let v = value(&executor, "SELECT t FROM t [1:2, 0:3]").await;
    assert_eq!(v, json!([[4, 5, 6]]));

    let v = value(&executor, "SELECT t FROM t [0:2, 1:2]").await;
    assert_eq!(v, json!([[2], [5]]));
}

#[tokio::test]
async fn test_select_slice_out_of_bounds() {
    let (_dir, executor) = setup();

    status(&executor, "CREATE TENSOR t 2,2").await;
    let err = executor
        .execute_query("SELECT t FROM t [0:3, 0:2]")
        .await
        .unwrap_err();
    assert!(matches!(err, TensorDbError::InvalidSlice { .. }));
}

#[tokio::test]
async fn test_add_tensors_end_to_end() {
    let (_dir, executor) = setup();

    status(&executor, "CREATE TENSOR a 2,2 TYPE float32").await;
    status(&executor, "INSERT INTO a VALUES (1, 2, 3, 4)").await;
    status(&executor, "CREATE TENSOR b 2,2 TYPE float32").await;
    status(&executor, "INSERT INTO b VALUES (10, 20, 30, 40)").await;

    let s = status(&executor, "ADD TENSOR a WITH TENSOR b INTO c").await;
    assert_eq!(s, "Tensor 'c' created successfully from operation ADD_TENSORS");

    let v = value(&executor, "SELECT c FROM c").await;
    assert_eq!(v, json!([[11.0, 22.0], [33.0, 44.0]]));

    // Repeating the same operation must refuse to overwrite the output.
    let err = executor
        .execute_query("ADD TENSOR a WITH TENSOR b INTO c")
        .await
        .unwrap_err();
    assert!(matches!(err, TensorDbError::AlreadyExists { name } if name == "c"));
}

#[tokio::test]
async fn test_add_tensors_type_mismatch() {
    let (_dir, executor) = setup();

    status(&executor, "CREATE TENSOR a 2 TYPE float32").await;
    status(&executor, "CREATE TENSOR b 2 TYPE float64").await;
    let err = executor
        .execute_query("ADD TENSOR a WITH TENSOR b INTO c")
        .await
        .unwrap_err();
    assert!(matches!(err, TensorDbError::TypeMismatch { .. }));
}

#[tokio::test]
async fn test_add_scalar_end_to_end() {
    let (_dir, executor) = setup();

    status(&executor, "CREATE TENSOR a 2,2 TYPE float32").await;
    status(&executor, "INSERT INTO a VALUES (1, 2, 3, 4)").await;

    let s = status(&executor, "ADD SCALAR 1.5 TO TENSOR a INTO shifted").await;
    assert_eq!(
        s,
        "Tensor 'shifted' created successfully from operation ADD_SCALAR"
    );

    let v = value(&executor, "SELECT shifted FROM shifted").await;
    assert_eq!(v, json!([[2.5, 3.5], [4.5, 5.5]]));
}

#[tokio::test]
async fn test_add_scalar_zero_is_identity() {
    let (_dir, executor) = setup();

    status(&executor, "CREATE TENSOR a 3 TYPE int64").await;
    status(&executor, "INSERT INTO a VALUES (7, 8, 9)").await;
    status(&executor, "ADD SCALAR 0 TO TENSOR a INTO same").await;

    let original = value(&executor, "SELECT a FROM a").await;
    let shifted = value(&executor, "SELECT same FROM same").await;
    assert_eq!(original, shifted);
}

#[tokio::test]
async fn test_get_data_batching_large_tensor() {
    let (_dir, executor) = setup();

    status(&executor, "CREATE TENSOR big 256,256 TYPE float32").await;
    let values: Vec<f32> = (0..256 * 256).map(|i| i as f32).collect();
    let bytes = TypedBuffer::F32(values.clone()).to_le_bytes().to_vec();
    let s = executor
        .execute(Statement::Insert {
            name: "big".to_string(),
            source: InsertSource::Raw(bytes),
        })
        .await
        .unwrap();
    assert_eq!(s.as_status(), Some("Raw data inserted into big"));

    let output = executor
        .execute_query("GET DATA FROM big BATCH 1024")
        .await
        .unwrap();
    let batches = output.as_batches().unwrap();
    assert_eq!(batches.len(), 64);
    for (k, env) in batches.iter().enumerate() {
        let info = env.batch_info.unwrap();
        assert_eq!(info.current_batch_index, k);
        assert_eq!(info.num_batches, 64);
        assert_eq!(info.batch_size, 1024);
        assert_eq!(env.data.len(), 1024);
        assert_eq!(env.data_size_bytes, 4096);
        assert_eq!(env.total_elements, 65536);
    }

    // Concatenating the batches in index order reproduces the raw data.
    let mut concat: Vec<f32> = Vec::with_capacity(65536);
    for env in batches {
        match &env.data {
            TypedBuffer::F32(v) => concat.extend_from_slice(v),
            other => panic!("unexpected buffer kind {other:?}"),
        }
    }
    assert_eq!(concat, values);
}

#[tokio::test]
async fn test_get_data_multi_tensor_preserves_order() {
    let (_dir, executor) = setup();

    status(&executor, "CREATE TENSOR first 2 TYPE int32").await;
    status(&executor, "INSERT INTO first VALUES (1, 2)").await;
    status(&executor, "CREATE TENSOR second 2 TYPE int32").await;
    status(&executor, "INSERT INTO second VALUES (3, 4)").await;

    let output = executor
        .execute_query("GET DATA FROM second, first")
        .await
        .unwrap();
    let QueryOutput::BatchSets(sets) = output else {
        panic!("expected nested result for a multi-tensor GET DATA");
    };
    assert_eq!(sets.len(), 2);
    assert_eq!(sets[0][0].name, "second");
    assert_eq!(sets[0][0].data, TypedBuffer::I32(vec![3, 4]));
    assert_eq!(sets[1][0].name, "first");
    assert_eq!(sets[1][0].data, TypedBuffer::I32(vec![1, 2]));
}

#[tokio::test]
async fn test_get_data_single_tensor_is_flat() {
    let (_dir, executor) = setup();

    status(&executor, "CREATE TENSOR t 4 TYPE int32").await;
    status(&executor, "INSERT INTO t VALUES (1, 2, 3, 4)").await;

    let output = executor.execute_query("GET DATA FROM t").await.unwrap();
    assert!(matches!(output, QueryOutput::Batches(_)));
}

#[tokio::test]
async fn test_get_data_with_slice() {
    let (_dir, executor) = setup();

    status(&executor, "CREATE TENSOR t 2,3 TYPE int32").await;
    status(&executor, "INSERT INTO t VALUES (1, 2, 3, 4, 5, 6)").await;

    let output = executor
        .execute_query("GET DATA FROM t [1:2, 0:3]")
        .await
        .unwrap();
    let batches = output.as_batches().unwrap();
    assert_eq!(batches[0].shape, vec![1, 3]);
    assert_eq!(batches[0].strides, vec![3, 1]);
    assert_eq!(batches[0].data, TypedBuffer::I32(vec![4, 5, 6]));
}

#[tokio::test]
async fn test_get_data_combines_all_failures() {
    let (_dir, executor) = setup();

    status(&executor, "CREATE TENSOR ok 1 TYPE int32").await;
    status(&executor, "INSERT INTO ok VALUES (1)").await;

    let err = executor
        .execute_query("GET DATA FROM ok, missing_a, missing_b")
        .await
        .unwrap_err();
    let TensorDbError::GetData { messages } = err else {
        panic!("expected a combined GET DATA error");
    };
    assert_eq!(messages.len(), 2);
    assert!(messages[0].contains("missing_a"));
    assert!(messages[1].contains("missing_b"));
}

#[tokio::test]
async fn test_get_data_zero_element_batch_envelope() {
    let (_dir, executor) = setup();

    status(&executor, "CREATE TENSOR e 0,2 TYPE float32").await;
    status(&executor, "INSERT INTO e VALUES ()").await;

    let output = executor
        .execute_query("GET DATA FROM e BATCH 8")
        .await
        .unwrap();
    let batches = output.as_batches().unwrap();
    assert_eq!(batches.len(), 1);
    let env = &batches[0];
    assert!(env.data.is_empty());
    let info = env.batch_info.unwrap();
    assert_eq!((info.batch_size, info.num_batches, info.current_batch_index), (8, 1, 0));
}

#[tokio::test]
async fn test_list_tensors_filters() {
    let (_dir, executor) = setup();

    status(&executor, "CREATE TENSOR f32_mat 2,2 TYPE float32").await;
    status(&executor, "CREATE TENSOR f32_vec 3 TYPE float32").await;
    status(&executor, "CREATE TENSOR i32_mat 2,2 TYPE int32").await;
    status(&executor, "CREATE TENSOR f64_mat 2,2").await;

    let all = executor.execute_query("LIST TENSORS").await.unwrap();
    let names: Vec<&str> = all
        .as_listing()
        .unwrap()
        .iter()
        .map(|m| m.name.as_str())
        .collect();
    assert_eq!(names, vec!["f32_mat", "f32_vec", "f64_mat", "i32_mat"]);

    let filtered = executor
        .execute_query("LIST TENSORS WHERE DATATYPE = 'float32' AND NUM_DIMENSIONS = 2")
        .await
        .unwrap();
    let listing = filtered.as_listing().unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].name, "f32_mat");

    let by_rank = executor
        .execute_query("LIST TENSORS WHERE NUM_DIMENSIONS = 1")
        .await
        .unwrap();
    let listing = by_rank.as_listing().unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].name, "f32_vec");
}

#[tokio::test]
async fn test_listing_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let storage = Storage::open(StoreConfig::for_testing(dir.path())).unwrap();
        let executor = Executor::new(Arc::new(storage));
        status(&executor, "CREATE TENSOR persisted 2,2 TYPE int64").await;
        status(&executor, "INSERT INTO persisted VALUES (1, 2, 3, 4)").await;
    }

    let storage = Storage::open(StoreConfig::for_testing(dir.path())).unwrap();
    let executor = Executor::new(Arc::new(storage));
    let listing = executor.execute_query("LIST TENSORS").await.unwrap();
    assert_eq!(listing.as_listing().unwrap()[0].name, "persisted");

    let v = value(&executor, "SELECT persisted FROM persisted").await;
    assert_eq!(v, json!([[1, 2], [3, 4]]));
}

#[tokio::test]
async fn test_tensor_mmap_view_and_guard() {
    let (_dir, executor) = setup();

    status(&executor, "CREATE TENSOR m 2 TYPE int32").await;
    status(&executor, "INSERT INTO m VALUES (7, 9)").await;

    let (meta, view, guard) = executor.tensor_mmap("m").unwrap();
    assert_eq!(meta.name, "m");
    assert_eq!(view.len(), 8);
    assert_eq!(&view[0..4], &7i32.to_le_bytes());
    assert_eq!(&view[4..8], &9i32.to_le_bytes());
    guard.dispose().unwrap();
}

#[tokio::test]
async fn test_malformed_query_reports_position() {
    let (_dir, executor) = setup();
    let err = executor.execute_query("CREATE TABLE t").await.unwrap_err();
    assert!(matches!(err, TensorDbError::MalformedQuery { .. }));
}

#[tokio::test]
async fn test_close_clears_open_table() {
    let (_dir, executor) = setup();

    status(&executor, "CREATE TENSOR t 2 TYPE int32").await;
    status(&executor, "INSERT INTO t VALUES (1, 2)").await;
    value(&executor, "SELECT t FROM t").await;

    executor.close().unwrap();
    // The store remains usable after a close.
    let v = value(&executor, "SELECT t FROM t").await;
    assert_eq!(v, json!([1, 2]));
}
