//! Rendering posts pulled through the service

use quill_core::{render, render_page, MemoryRecordStore, NewPost, PostService};

#[test]
fn test_reference_to_existing_post() {
    let service = PostService::new(MemoryRecordStore::new());

    let a = service.create(NewPost::new("Hello", "**hi**")).unwrap();
    let b = service
        .create(NewPost::new("See also", format!("[[{}]]", a.id)))
        .unwrap();

    assert_eq!(service.render(&a.id).unwrap(), "<p><strong>hi</strong></p>");

    let html = service.render(&b.id).unwrap();
    assert_eq!(
        html,
        format!(
            r##"<p><a href="#post-{id}" data-post-reference="{id}">[{id}]</a></p>"##,
            id = a.id
        )
    );

    let refs = service.references(&b.id).unwrap();
    assert_eq!(refs.len(), 1);
    assert!(refs[0].exists);
}

#[test]
fn test_mixed_document() {
    let markdown = "# Notes\n\nIntro with *emphasis* and `code`.\n- one\n- two\n\n```\nlet x = a < b;\n```\n";
    let html = render(markdown);

    assert_eq!(
        html,
        "<h1>Notes</h1>\
         <p>Intro with <em>emphasis</em> and <code>code</code>.</p>\
         <ul><li>one</li><li>two</li></ul>\
         <pre><code>let x = a &lt; b;</code></pre>"
    );
}

#[test]
fn test_html_post_page_preview() {
    let service = PostService::new(MemoryRecordStore::new());
    let post = service
        .create(NewPost::new("Raw", "<section>kept</section>").with_format("html"))
        .unwrap();

    let page = render_page(&service.get(&post.id).unwrap());
    assert!(page.contains("<section>kept</section>"));
    assert!(page.contains(&format!(r#"data-post-id="{}""#, post.id)));
}
