//! Persistence tests for the book collection.
//!
//! These tests verify that records survive a save/load cycle through the
//! JSON file and that the file format matches what other tools expect.

use book_ledger::auth::{AdminGate, Session};
use book_ledger::library::model::{BookDraft, ReadingStatus};
use book_ledger::library::{BookCatalog, BookForm, BookStore, CoverUpload};

fn admin() -> Session {
    let mut session = Session::viewer();
    session
        .login(&AdminGate::new(Some("letmein".into())), "letmein")
        .unwrap();
    session
}

fn add(catalog: &BookCatalog, session: &Session, draft: BookDraft) -> String {
    catalog
        .save_book(
            session,
            BookForm {
                fields: draft,
                ..Default::default()
            },
        )
        .unwrap()
        .record
        .id
}

#[test]
fn collection_survives_reopen() {
    let dir = tempfile::TempDir::new().unwrap();
    let session = admin();

    let saved = {
        let catalog = BookCatalog::open(dir.path());
        add(
            &catalog,
            &session,
            BookDraft {
                title: Some("The Master and Margarita".into()),
                author: Some("Mikhail Bulgakov".into()),
                status: Some(ReadingStatus::Reading),
                progress: Some(35),
                favorite: Some(true),
                tags: Some(vec!["satire".into(), "classic".into()]),
                rating: Some(Some(9)),
                notes: Some("Reread chapter 12.".into()),
                ..Default::default()
            },
        );
        catalog.books()
    };

    let reopened = BookCatalog::open(dir.path()).books();
    assert_eq!(reopened, saved);
    let book = &reopened[0];
    assert_eq!(book.tags.iter().collect::<Vec<_>>(), vec!["classic", "satire"]);
    assert_eq!(book.rating, Some(9));
}

#[test]
fn file_is_a_json_array_with_expected_fields() {
    let dir = tempfile::TempDir::new().unwrap();
    let catalog = BookCatalog::open(dir.path());
    add(
        &catalog,
        &admin(),
        BookDraft {
            title: Some("Solaris".into()),
            ..Default::default()
        },
    );

    let raw = std::fs::read_to_string(catalog.store().path()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let array = value.as_array().expect("top level is an array");
    assert_eq!(array.len(), 1);
    let obj = array[0].as_object().unwrap();
    let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec![
            "author",
            "cover_path",
            "created_at",
            "favorite",
            "id",
            "notes",
            "progress",
            "rating",
            "status",
            "tags",
            "title",
            "updated_at"
        ]
    );
    assert_eq!(obj["status"], "to_read");
}

#[test]
fn hand_written_file_loads_with_defaults() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = BookStore::in_dir(dir.path());
    std::fs::write(
        store.path(),
        r#"[
            {"id": "a", "title": "Beloved", "author": "Toni Morrison", "status": "read",
             "progress": 100, "favorite": true, "tags": ["classic"], "cover_path": null,
             "rating": 10, "notes": "", "created_at": "2024-02-01T10:00:00",
             "updated_at": "2024-02-03T18:45:10"},
            {"id": "b", "title": "Piranesi", "progress": "45.5"}
        ]"#,
    )
    .unwrap();

    let books = store.load();
    assert_eq!(books.len(), 2);
    assert_eq!(books[0].status, ReadingStatus::Read);
    assert_eq!(books[0].updated_at.to_string(), "2024-02-03 18:45:10");
    assert_eq!(books[1].progress, 45);
    assert_eq!(books[1].status, ReadingStatus::ToRead);
}

#[test]
fn corrupt_file_reads_as_empty_and_is_replaced_on_next_save() {
    let dir = tempfile::TempDir::new().unwrap();
    let catalog = BookCatalog::open(dir.path());
    std::fs::write(catalog.store().path(), "[{\"id\": \"truncated\"").unwrap();

    assert!(catalog.books().is_empty());

    add(
        &catalog,
        &admin(),
        BookDraft {
            title: Some("Fresh Start".into()),
            ..Default::default()
        },
    );
    let books = catalog.books();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "Fresh Start");
}

#[test]
fn delete_removes_exactly_one_record_and_its_cover() {
    let dir = tempfile::TempDir::new().unwrap();
    let catalog = BookCatalog::open(dir.path());
    let session = admin();

    for title in ["One", "Two", "Three"] {
        add(
            &catalog,
            &session,
            BookDraft {
                title: Some(title.into()),
                ..Default::default()
            },
        );
    }
    let with_cover = catalog
        .save_book(
            &session,
            BookForm {
                fields: BookDraft {
                    title: Some("Covered".into()),
                    ..Default::default()
                },
                cover: Some(CoverUpload {
                    file_name: "front.PNG".into(),
                    bytes: vec![0x89, b'P', b'N', b'G'],
                }),
                ..Default::default()
            },
        )
        .unwrap()
        .record;
    let cover = with_cover.cover_path.clone().unwrap();
    assert!(cover.exists());

    let before = catalog.books().len();
    catalog.remove(&session, &with_cover.id).unwrap();
    let after = catalog.books();

    assert_eq!(after.len(), before - 1);
    assert!(after.iter().all(|b| b.id != with_cover.id));
    assert!(!cover.exists());
}
