//! Shared fixtures for tests that stand a mock forum up with wiremock.

#![allow(dead_code)]

use std::fmt::Write;
use std::io::Write as _;

use flate2::write::GzEncoder;
use flate2::Compression;
use forum_thread_rss::config::Config;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOPIC_ID: u64 = 77;
pub const PAGE_SIZE: usize = 20;

/// Config pointing the forum client at the mock server.
pub fn forum_config(server: &MockServer) -> Config {
    Config {
        forum_base_url: server.uri(),
        ..Config::for_testing()
    }
}

/// Render one physical page of a thread whose posts are numbered `1..=len`.
pub fn render_page(title: &str, len: usize, from: usize) -> String {
    let mut html = format!(
        "<html><head><meta charset=\"utf-8\"><title>{title}</title></head><body>"
    );

    if len > PAGE_SIZE {
        html.push_str("<div class=\"pagination\">");
        for st in (0..len).step_by(PAGE_SIZE) {
            write!(
                html,
                "<a href=\"//forum.test/forum/index.php?showtopic={TOPIC_ID}&amp;st={st}\">{}</a>",
                st / PAGE_SIZE + 1
            )
            .unwrap();
        }
        html.push_str("</div>");
    }

    let end = (from + PAGE_SIZE).min(len);
    for id in (from + 1)..=end {
        write!(
            html,
            r#"<div data-post="{id}">
  <div class="post_header_container"><div class="post_header">
    <span class="post_date">01.02.24, 10:00 | <a href="//forum.test/forum/index.php?showtopic={TOPIC_ID}&amp;view=findpost&amp;p={id}">#{id}</a></span>
  </div></div>
  <div class="post_body">Message number {id} :smile:</div>
</div>"#
        )
        .unwrap();
    }

    html.push_str("</body></html>");
    html
}

/// Mock every page a download of a `len`-post thread can request.
pub async fn mount_thread(server: &MockServer, title: &str, len: usize) {
    Mock::given(method("GET"))
        .and(path("/forum/index.php"))
        .and(query_param("showtopic", TOPIC_ID.to_string()))
        .and(query_param_is_missing("st"))
        .respond_with(html_response(render_page(title, len, 0)))
        .mount(server)
        .await;

    // every cursor the logical page walk can land on
    for st in 1..=len {
        Mock::given(method("GET"))
            .and(path("/forum/index.php"))
            .and(query_param("showtopic", TOPIC_ID.to_string()))
            .and(query_param("st", st.to_string()))
            .respond_with(html_response(render_page(title, len, st)))
            .mount(server)
            .await;
    }
}

pub fn html_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

pub fn gzip(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap()
}
