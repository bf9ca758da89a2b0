use bbs_harvest::config::{ArchiveConfig, Config, ListingSource, DEFAULT_USER_AGENT};
use bbs_harvest::crawler::Harvester;
use bbs_harvest::TraversalEnd;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a configuration with no sources, no throttle, and the given output directory
fn create_test_config(output: &Path) -> Config {
    let mut config = Config::default();
    config.queue.capacity = 8;
    config.queue.download_interval_ms = 0;
    config.output.directory = output.to_string_lossy().to_string();
    config.listings.clear();
    config.archive.enabled = false;
    config
}

fn listing_html(links: &[&str]) -> String {
    let rows: String = links
        .iter()
        .map(|link| format!(r#"<tr><td><a href="{}">file</a></td></tr>"#, link))
        .collect();
    format!(
        "<html><body><table><tbody>{}</tbody></table></body></html>",
        rows
    )
}

async fn mount_asset(server: &MockServer, at: &str, body: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_listing_end_to_end() {
    let server = MockServer::start().await;

    // Page 1 answers late so page 2's error is drained first
    Mock::given(method("GET"))
        .and(path("/usr/board/rivbb.cgi"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_html(&["a.png", "b.jpg", "c.txt"]))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/usr/board/rivbb.cgi"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    mount_asset(&server, "/usr/board/a.png", "png bytes", 1).await;
    mount_asset(&server, "/usr/board/b.jpg", "jpg bytes", 1).await;
    mount_asset(&server, "/usr/board/c.txt", "never", 0).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(dir.path());
    config.listings.push(ListingSource::new(
        "board",
        &format!("{}/usr/board/", server.uri()),
        2,
    ));

    let harvester = Harvester::new(config).await.expect("harvester");
    let summary = harvester.run().await.expect("harvest");

    assert_eq!(summary.strategies.len(), 1);
    let board = summary.strategy("board").unwrap();
    assert_eq!(board.drain.downloaded.len(), 2);
    assert!(board.drain.failed.is_empty());
    assert_eq!(board.drain.errors, 1);
    assert!(board.traversal.is_none());

    assert_eq!(
        std::fs::read_to_string(dir.path().join("a.png")).unwrap(),
        "png bytes"
    );
    assert_eq!(
        std::fs::read_to_string(dir.path().join("b.jpg")).unwrap(),
        "jpg bytes"
    );
    assert!(!dir.path().join("c.txt").exists());
}

#[tokio::test]
async fn test_every_request_carries_browser_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/usr/board/rivbb.cgi"))
        .and(header("user-agent", DEFAULT_USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(&["x.png"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/usr/board/x.png"))
        .and(header("user-agent", DEFAULT_USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string("x"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(dir.path());
    config.listings.push(ListingSource::new(
        "board",
        &format!("{}/usr/board/", server.uri()),
        1,
    ));

    let summary = Harvester::new(config).await.unwrap().run().await.unwrap();

    assert_eq!(summary.downloaded(), 1);
    assert!(dir.path().join("x.png").exists());
}

#[tokio::test]
async fn test_downloads_are_throttled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/usr/board/rivbb.cgi"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(listing_html(&["1.png", "2.png", "3.png"])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/usr/board/1.png"))
        .respond_with(ResponseTemplate::new(200).set_body_string("1"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/usr/board/2.png"))
        .respond_with(ResponseTemplate::new(200).set_body_string("2"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/usr/board/3.png"))
        .respond_with(ResponseTemplate::new(200).set_body_string("3"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(dir.path());
    config.queue.download_interval_ms = 150;
    config.listings.push(ListingSource::new(
        "board",
        &format!("{}/usr/board/", server.uri()),
        1,
    ));

    let started = Instant::now();
    let summary = Harvester::new(config).await.unwrap().run().await.unwrap();

    assert_eq!(summary.downloaded(), 3);
    assert!(started.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn test_archive_end_to_end() {
    let server = MockServer::start().await;
    let page = |content: &str, foot: &[&str]| {
        let anchors: String = foot
            .iter()
            .map(|href| format!(r#"<a href="{}">nav</a>"#, href))
            .collect();
        format!(
            r#"<html><body><div id="rightcol"><a href="{}">entry</a><a href="about.txt">about</a></div><div id="foot">{}</div></body></html>"#,
            content, anchors
        )
    };
    let content = |src: &str| {
        format!(
            r#"<html><body><div id="rightcol"><img src="{}"></div></body></html>"#,
            src
        )
    };

    let html_routes = vec![
        ("/mee/index.html", page("e/one.html", &["index.html", "#", "index2.html"])),
        ("/mee/index2.html", page("e/two.html", &["index.html", "index.html", "index3.html"])),
        ("/mee/index3.html", page("e/three.html", &["index.html", "index2.html", "index.html"])),
        ("/mee/e/one.html", content("img/one.jpg")),
        ("/mee/e/two.html", content("img/two.jpg")),
        ("/mee/e/three.html", content("img/three.png")),
    ];
    for (route, body) in html_routes {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;
    }
    mount_asset(&server, "/mee/e/img/one.jpg", "one", 1).await;
    mount_asset(&server, "/mee/e/img/two.jpg", "two", 1).await;
    mount_asset(&server, "/mee/e/img/three.png", "three", 1).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(dir.path());
    config.archive = ArchiveConfig {
        base_url: format!("{}/mee/", server.uri()),
        seed_url: format!("{}/mee/index.html", server.uri()),
        page_interval_ms: 0,
        ..ArchiveConfig::default()
    };

    let summary = tokio::time::timeout(Duration::from_secs(10), async {
        Harvester::new(config).await.unwrap().run().await.unwrap()
    })
    .await
    .expect("archive strategy must terminate");

    let archive = summary.strategy("archive").unwrap();
    assert_eq!(archive.traversal, Some(TraversalEnd::CycleDetected));
    assert_eq!(archive.drain.downloaded.len(), 3);
    assert_eq!(archive.drain.errors, 0);
    for name in ["one.jpg", "two.jpg", "three.png"] {
        assert!(dir.path().join(name).exists(), "{} missing", name);
    }
}

#[tokio::test]
async fn test_strategies_run_concurrently_and_all_report() {
    let server = MockServer::start().await;
    for (board, file) in [("new", "n.png"), ("old", "o.jpg")] {
        Mock::given(method("GET"))
            .and(path(format!("/usr/{}/rivbb.cgi", board)))
            .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(&[file])))
            .mount(&server)
            .await;
        mount_asset(&server, &format!("/usr/{}/{}", board, file), board, 1).await;
    }
    // The archive is gone entirely
    Mock::given(method("GET"))
        .and(path("/mee/index.html"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(dir.path());
    config.listings.push(ListingSource::new(
        "new-contents",
        &format!("{}/usr/new/", server.uri()),
        1,
    ));
    config.listings.push(ListingSource::new(
        "old-contents",
        &format!("{}/usr/old/", server.uri()),
        1,
    ));
    config.archive = ArchiveConfig {
        base_url: format!("{}/mee/", server.uri()),
        seed_url: format!("{}/mee/index.html", server.uri()),
        page_interval_ms: 0,
        ..ArchiveConfig::default()
    };

    let summary = Harvester::new(config).await.unwrap().run().await.unwrap();

    assert_eq!(summary.strategies.len(), 3);
    assert_eq!(summary.downloaded(), 2);
    assert_eq!(summary.errors(), 0);
    assert_eq!(
        summary.strategy("archive").unwrap().traversal,
        Some(TraversalEnd::NotFound)
    );
    assert!(dir.path().join("n.png").exists());
    assert!(dir.path().join("o.jpg").exists());
}

#[tokio::test]
async fn test_every_page_failing_still_finishes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    // The other pages fail later, so the first error is drained on its own
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_delay(Duration::from_millis(200)))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(dir.path());
    config.listings.push(ListingSource::new(
        "board",
        &format!("{}/usr/board/", server.uri()),
        3,
    ));

    let summary = Harvester::new(config).await.unwrap().run().await.unwrap();

    assert_eq!(summary.strategies.len(), 1);
    assert_eq!(summary.downloaded(), 0);
    assert_eq!(summary.failed(), 0);
    assert!(summary.errors() >= 1);
}
