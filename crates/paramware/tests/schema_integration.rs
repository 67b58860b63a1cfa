//! Schema compilation checks through the derive macro.

use paramware::{Bindable, Binder, Channel, Cookie, UploadedFile};

#[derive(Default, Bindable)]
struct FileOnQuery {
    #[param("type(query)")]
    upload: UploadedFile,
}

#[test]
fn test_file_shape_outside_form_data_is_rejected() {
    let e = Binder::new().register::<FileOnQuery>().unwrap_err();
    assert_eq!(e.type_name(), "FileOnQuery");
    assert_eq!(e.field(), "upload");
    assert!(e.reason().contains("must be `formData`"));
}

#[derive(Default, Bindable)]
struct NumberFromCookie {
    #[param("type(cookie)")]
    count: u64,
}

#[test]
fn test_cookie_whitelist_is_enforced() {
    let e = Binder::new().register::<NumberFromCookie>().unwrap_err();
    assert!(e.reason().contains("invalid field shape for `cookie`"));
}

#[derive(Default, Bindable)]
struct BadPattern {
    #[param("type(query)")]
    #[regex("(unclosed")]
    p: String,
}

#[test]
fn test_invalid_regex_fails_compilation() {
    let e = Binder::new().register::<BadPattern>().unwrap_err();
    assert!(e.reason().contains("invalid `regex` pattern"));
}

#[derive(Default, Bindable)]
struct LenOnNumber {
    #[param("type(query),len(1:3)")]
    n: u32,
}

#[test]
fn test_len_on_numeric_shape_fails_compilation() {
    let e = Binder::new().register::<LenOnNumber>().unwrap_err();
    assert!(e.reason().contains("only usable on string"));
}

#[derive(Default, Bindable)]
struct Annotated {
    #[param("type(path),desc(account id)")]
    account_id: u64,

    #[param("type(query),name(q),required")]
    search_text: String,

    #[param("type(cookie)")]
    session: Cookie,
}

#[test]
fn test_compiled_descriptors_expose_metadata() {
    let schema = Binder::new().register::<Annotated>().unwrap();
    assert_eq!(schema.type_name, "Annotated");

    let names: Vec<_> = schema.fields().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["account_id", "q", "session"]);

    let id = schema.field("account_id").unwrap();
    assert_eq!(id.channel, Channel::Path);
    assert!(id.required);
    assert_eq!(id.description(), Some("account id"));

    let q = schema.field("q").unwrap();
    assert_eq!(q.channel, Channel::Query);
    assert!(q.required);
    assert_eq!(q.description(), None);

    let session = schema.field("session").unwrap();
    assert_eq!(session.channel, Channel::Cookie);
    assert!(!session.required);
}
