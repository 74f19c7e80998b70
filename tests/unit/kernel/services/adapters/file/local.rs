use super::*;
use tempfile::tempdir;

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

#[test]
fn test_read_write_file() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("test.txt");
    let store = LocalFileStore::new();

    block_on(async {
        store.write_file(&file_path, "Hello, World!").await.unwrap();
        let content = store.read_file(&file_path).await.unwrap();
        assert_eq!(content, "Hello, World!");
    });
}

#[test]
fn test_write_creates_parent_dirs() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("a").join("b").join("c.md");
    let store = LocalFileStore::new();

    block_on(async {
        store.write_file(&file_path, "# title").await.unwrap();
    });
    assert_eq!(std::fs::read_to_string(&file_path).unwrap(), "# title");
}

#[test]
fn test_missing_file_is_not_found() {
    let dir = tempdir().unwrap();
    let store = LocalFileStore::new();

    let err = block_on(store.read_file(&dir.path().join("missing.txt"))).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_directory_is_not_a_file() {
    let dir = tempdir().unwrap();
    let store = LocalFileStore::new();

    let err = block_on(store.read_file_bytes(dir.path())).unwrap_err();
    assert!(matches!(err, FileError::NotAFile(_)));
}

#[test]
fn test_invalid_utf8_is_reported() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("blob.bin");
    std::fs::write(&file_path, [0xff, 0xfe, 0x00]).unwrap();
    let store = LocalFileStore::new();

    let err = block_on(store.read_file(&file_path)).unwrap_err();
    assert!(matches!(err, FileError::InvalidUtf8(_)));
    let bytes = block_on(store.read_file_bytes(&file_path)).unwrap();
    assert_eq!(bytes, vec![0xff, 0xfe, 0x00]);
}
