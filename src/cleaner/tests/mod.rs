use super::*;
use crate::record::RecordKind;

fn cleaner() -> HtmlCleaner {
    HtmlCleaner::new().unwrap()
}

async fn clean_page(uri: &str, html: &str) -> CleanedRecord {
    cleaner()
        .clean(ArchiveRecord::response(uri, html.as_bytes().to_vec()))
        .await
        .unwrap()
        .unwrap()
}

#[tokio::test]
async fn strips_non_content_elements() {
    let html = "<html><head><style>p { color: red }</style></head><body>\
                <header>site banner</header>\
                <nav>menu items</nav>\
                <p>visible text</p>\
                <script>var hidden = 1;</script>\
                <footer>copyright line</footer>\
                </body></html>";
    let record = clean_page("https://example.com/", html).await;

    assert_eq!(record.cleaned_text, "visible text");
    for leaked in ["banner", "menu", "hidden", "copyright", "color"] {
        assert!(
            !record.cleaned_text.contains(leaked),
            "stripped content leaked: {leaked}"
        );
    }
}

#[tokio::test]
async fn relative_media_src_gets_uri_prepended() {
    // Resolution is plain concatenation of page URI and src, with no path
    // joining and no separator inserted.
    let record = clean_page(
        "https://ex.com/page",
        r#"<html><body>before <img src="pic.jpg"> after</body></html>"#,
    )
    .await;
    assert_eq!(
        record.cleaned_text,
        "before <IMAGE>https://ex.com/pagepic.jpg</IMAGE> after"
    );
}

#[tokio::test]
async fn absolute_media_src_stays_verbatim() {
    let record = clean_page(
        "https://ex.com/page",
        r#"<html><body><img src="https://cdn.ex.com/pic.jpg"></body></html>"#,
    )
    .await;
    assert_eq!(
        record.cleaned_text,
        "<IMAGE>https://cdn.ex.com/pic.jpg</IMAGE>"
    );
}

#[tokio::test]
async fn http_substring_heuristic_misclassifies_on_purpose() {
    // A relative path that happens to contain "http" is treated as absolute,
    // and a scheme-relative URL (no "http" substring) is treated as relative.
    // Both follow from the literal containment test and are intentional.
    let record = clean_page(
        "https://ex.com/page",
        r#"<html><body><img src="/http-news.jpg"><img src="//cdn.example.com/x.jpg"></body></html>"#,
    )
    .await;
    assert_eq!(
        record.cleaned_text,
        "<IMAGE>/http-news.jpg</IMAGE> <IMAGE>https://ex.com/page//cdn.example.com/x.jpg</IMAGE>"
    );
}

#[tokio::test]
async fn missing_src_resolves_to_page_uri_alone() {
    let record = clean_page(
        "https://ex.com/page",
        "<html><body><video controls></video></body></html>",
    )
    .await;
    assert_eq!(record.cleaned_text, "<VIDEO>https://ex.com/page</VIDEO>");
}

#[tokio::test]
async fn each_media_tag_maps_to_its_kind() {
    let record = clean_page(
        "https://ex.com/",
        r#"<html><body><img src="a.png"><video src="b.mp4"></video><audio src="c.ogg"></audio></body></html>"#,
    )
    .await;
    assert_eq!(
        record.cleaned_text,
        "<IMAGE>https://ex.com/a.png</IMAGE> \
         <VIDEO>https://ex.com/b.mp4</VIDEO> \
         <AUDIO>https://ex.com/c.ogg</AUDIO>"
    );
}

#[tokio::test]
async fn media_inside_stripped_subtree_emits_no_token() {
    let record = clean_page(
        "https://ex.com/",
        r#"<html><body><nav><img src="logo.png"></nav><p>content</p></body></html>"#,
    )
    .await;
    assert_eq!(record.cleaned_text, "content");
}

#[tokio::test]
async fn whitespace_is_collapsed_and_trimmed() {
    let html = "<html><body>\n\n  <p>alpha\n\tbeta</p>  <p>gamma</p>\t\n</body></html>";
    let record = clean_page("https://ex.com/", html).await;

    assert_eq!(record.cleaned_text, "alpha beta gamma");
    assert!(!record.cleaned_text.contains("  "));
    assert_eq!(record.cleaned_text, record.cleaned_text.trim());
}

#[tokio::test]
async fn tag_boundaries_separate_words() {
    let record = clean_page(
        "https://ex.com/",
        "<html><body><p>one</p><p>two</p></body></html>",
    )
    .await;
    assert_eq!(record.cleaned_text, "one two");
}

#[tokio::test]
async fn cleaning_is_idempotent() {
    let html = r#"<html><body><h1>Title</h1><img src="pic.jpg"><script>x()</script></body></html>"#;
    let first = clean_page("https://ex.com/", html).await;
    let second = clean_page("https://ex.com/", html).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn missing_target_uri_yields_empty_uri() {
    let record = ArchiveRecord::new(
        RecordKind::Response,
        Vec::new(),
        b"<html><body><img src=\"pic.jpg\"></body></html>".to_vec(),
    );
    let cleaned = cleaner().clean(record).await.unwrap().unwrap();
    assert_eq!(cleaned.uri, "");
    assert_eq!(cleaned.cleaned_text, "<IMAGE>pic.jpg</IMAGE>");
}

#[tokio::test]
async fn script_only_page_cleans_to_empty_text() {
    let record = clean_page(
        "https://ex.com/empty",
        "<html><body><script>only code here</script></body></html>",
    )
    .await;
    assert_eq!(record.uri, "https://ex.com/empty");
    assert_eq!(record.cleaned_text, "");
}

#[tokio::test]
async fn non_utf8_body_is_a_parse_error() {
    let record = ArchiveRecord::response("https://ex.com/bin", vec![0xff, 0xfe, 0x00, 0x80]);
    let outcome = cleaner().clean(record).await;
    assert!(matches!(
        outcome,
        Err(CleanError::Parse { ref uri, .. }) if uri == "https://ex.com/bin"
    ));
}

#[tokio::test]
async fn non_response_record_is_absent_not_an_error() {
    let record = ArchiveRecord::new(
        RecordKind::Request,
        Vec::new(),
        b"GET / HTTP/1.1".to_vec(),
    );
    let outcome = cleaner().clean(record).await.unwrap();
    assert!(outcome.is_none());
}
