//! Integration tests for the freezer
//!
//! These tests drive full freeze runs against sites declared in TOML and
//! against hand-written applications, then inspect the files on disk.

use async_trait::async_trait;
use site_freezer::config::parse_config;
use site_freezer::crawler::{CancelHandle, ConfiguredSeeds, Freezer, FreezerOptions};
use site_freezer::routing::{RequestContext, Route, RouteTable};
use site_freezer::{
    Application, ConfiguredSite, FreezeError, GenerationTask, Request, Response,
    RouteDescriptor, TaskState, UrlBuilder, UrlGenerator,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tempfile::TempDir;

/// Builds a freezer for a TOML site writing into `destination`
fn site_freezer(toml: &str, destination: &Path) -> Freezer<ConfiguredSite> {
    let config = parse_config(toml).expect("valid config");
    let site = ConfiguredSite::from_config(&config).expect("valid site");

    let mut options = FreezerOptions::from_config(&config.freezer);
    options.destination = destination.to_path_buf();

    let mut freezer = Freezer::new(site, options);
    freezer.register_generator(ConfiguredSeeds::new(config.seeds.clone()));
    freezer
}

/// Reads every file below `root`, keyed by relative path
fn collect_files(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    let mut files = BTreeMap::new();
    let mut dirs = vec![root.to_path_buf()];

    while let Some(dir) = dirs.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                dirs.push(path);
            } else {
                let relative = path.strip_prefix(root).unwrap().to_path_buf();
                files.insert(relative, fs::read(&path).unwrap());
            }
        }
    }

    files
}

fn file_names(root: &Path) -> Vec<String> {
    collect_files(root)
        .keys()
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .collect()
}

const BLOG: &str = r#"
[[route]]
name = "index"
path = "/"
body = '''
<a href="{{ url_for(route="hello") }}">hello</a>
<a href="/docs/">docs</a>
<a href="/search?q=x">x</a>
<a href="/search?q=y">y</a>
<a href="/hello#greeting">hello again</a>
'''

[[route]]
name = "hello"
path = "/hello"
body = '<h1>Hello</h1><a href="/">home</a>'

[[route]]
name = "docs"
path = "/docs/"
body = '<a href="intro">intro</a><a href="../">up</a>'

[[route]]
name = "intro"
path = "/docs/intro"
body = "Intro"

[[route]]
name = "search"
path = "/search"
body = 'results for {{ q | default(value="all") }}'
"#;

#[tokio::test]
async fn test_path_mapping_on_disk() {
    let dir = TempDir::new().unwrap();
    let freezer = site_freezer(BLOG, dir.path());

    let report = freezer.freeze().await.unwrap();

    assert_eq!(
        file_names(dir.path()),
        vec![
            "docs/index.html",
            "docs/intro.html",
            "hello.html",
            "index.html",
            "search.html",
        ]
    );
    assert_eq!(report.failed_count(), 0);
    assert_eq!(report.skipped_count(), 0);

    let hello = fs::read_to_string(dir.path().join("hello.html")).unwrap();
    assert_eq!(hello, r#"<h1>Hello</h1><a href="/">home</a>"#);
}

#[tokio::test]
async fn test_each_url_fetched_once() {
    let dir = TempDir::new().unwrap();
    let freezer = site_freezer(BLOG, dir.path());

    let report = freezer.freeze().await.unwrap();

    let mut urls: Vec<&str> = report.written().map(|r| r.url.as_str()).collect();
    let total = urls.len();
    urls.sort();
    urls.dedup();
    assert_eq!(urls.len(), total, "a URL was written twice: {:?}", urls);

    // /hello is reached by seed, url_for, a plain anchor and a fragment link
    assert!(report.deduplicated >= 3);
}

#[tokio::test]
async fn test_query_urls_fetched_independently_and_collide() {
    let dir = TempDir::new().unwrap();
    let freezer = site_freezer(BLOG, dir.path());

    let report = freezer.freeze().await.unwrap();

    let search: Vec<&str> = report
        .written()
        .filter(|r| r.url.starts_with("/search"))
        .map(|r| r.url.as_str())
        .collect();
    assert_eq!(search, vec!["/search", "/search?q=x", "/search?q=y"]);

    // Same output file, last write wins
    let body = fs::read_to_string(dir.path().join("search.html")).unwrap();
    assert_eq!(body, "results for y");
}

#[tokio::test]
async fn test_cycle_terminates() {
    let dir = TempDir::new().unwrap();
    let freezer = site_freezer(
        r#"
[[route]]
name = "a"
path = "/a"
body = '<a href="/b">b</a>'

[[route]]
name = "b"
path = "/b"
body = '<a href="/a">a</a><a href="{{ url_for(route="a") }}">a again</a>'
"#,
        dir.path(),
    );

    let report = freezer.freeze().await.unwrap();

    assert_eq!(file_names(dir.path()), vec!["a.html", "b.html"]);
    assert_eq!(report.written_count(), 2);
}

#[tokio::test]
async fn test_non_ok_responses_skipped() {
    let dir = TempDir::new().unwrap();
    let freezer = site_freezer(
        r#"
[[route]]
name = "index"
path = "/"
body = '<a href="/nowhere">broken</a>'

[[route]]
name = "gone"
path = "/gone"
body = '<a href="/never">never followed</a>'
status = 404

[[route]]
name = "about"
path = "/about"
body = "About"

[[seed]]
url = "/missing"
"#,
        dir.path(),
    );

    let report = freezer.freeze().await.unwrap();

    assert_eq!(file_names(dir.path()), vec!["about.html", "index.html"]);
    assert_eq!(report.count(TaskState::SkippedNonOk), 3);

    let skipped: Vec<(&str, Option<u16>)> = report
        .records
        .iter()
        .filter(|r| r.state == TaskState::SkippedNonOk)
        .map(|r| (r.url.as_str(), r.http_status))
        .collect();
    assert!(skipped.contains(&("/gone", Some(404))));
    assert!(skipped.contains(&("/missing", Some(404))));
    assert!(skipped.contains(&("/nowhere", Some(404))));
    assert!(!skipped.iter().any(|(url, _)| *url == "/never"));
}

const USERS: &str = r#"
[freezer]
intercept-url-generation = true

[[route]]
name = "index"
path = "/"
body = '''
Featured: {{ url_for(route="show_user", id="42") }}
Profile: {{ url_for(route="show_user", id="7", absolute=true) }}
'''

[[route]]
name = "show_user"
path = "/users/{id}"
body = "User {{ id }}"
"#;

#[tokio::test]
async fn test_auto_discovery_of_generated_urls() {
    let dir = TempDir::new().unwrap();
    let freezer = site_freezer(USERS, dir.path());

    let report = freezer.freeze().await.unwrap();

    let user = fs::read_to_string(dir.path().join("users/42.html")).unwrap();
    assert_eq!(user, "User 42");

    // Absolute URLs are never frozen
    assert!(!dir.path().join("users/7.html").exists());

    // The default generator cannot resolve show_user without an id
    let failures: Vec<&str> = report.failures().map(|r| r.url.as_str()).collect();
    assert_eq!(failures, vec!["show_user"]);
}

#[tokio::test]
async fn test_auto_discovery_disabled() {
    let dir = TempDir::new().unwrap();
    let toml = USERS.replace(
        "intercept-url-generation = true",
        "intercept-url-generation = false",
    );
    let freezer = site_freezer(&toml, dir.path());

    freezer.freeze().await.unwrap();

    assert_eq!(file_names(dir.path()), vec!["index.html"]);
}

#[tokio::test]
async fn test_explicit_seeds() {
    let dir = TempDir::new().unwrap();
    let toml = format!(
        "{}\n[[seed]]\nroute = \"show_user\"\nparams = {{ id = \"7\" }}\n",
        USERS
    );
    let freezer = site_freezer(&toml, dir.path());

    freezer.freeze().await.unwrap();

    assert!(dir.path().join("users/7.html").is_file());
    assert!(dir.path().join("users/42.html").is_file());
}

#[tokio::test]
async fn test_generator_failure_aborts_run() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    let mut freezer = site_freezer(USERS, &out);
    freezer.register_generator(|| -> anyhow::Result<Vec<GenerationTask>> {
        anyhow::bail!("database unavailable")
    });

    let err = freezer.freeze().await.unwrap_err();

    match err {
        FreezeError::GeneratorFailure { generator, source } => {
            assert_eq!(generator, "custom");
            assert_eq!(source.to_string(), "database unavailable");
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(collect_files(&out).is_empty());
}

#[tokio::test]
async fn test_ignored_seed_url_recorded_as_failed() {
    let dir = TempDir::new().unwrap();
    let mut freezer = site_freezer(USERS, dir.path());
    freezer.register_generator(|| -> anyhow::Result<Vec<GenerationTask>> {
        Ok(vec![
            GenerationTask::raw_url("#top"),
            GenerationTask::raw_url("mailto:team@example.com"),
        ])
    });

    let report = freezer.freeze().await.unwrap();

    let failures: Vec<&str> = report.failures().map(|r| r.url.as_str()).collect();
    assert_eq!(failures, vec!["show_user", "#top", "mailto:team@example.com"]);
    for record in report.failures().skip(1) {
        assert_eq!(record.state, TaskState::Failed);
        assert_eq!(record.detail.as_deref(), Some("not a page URL"));
    }
    assert_eq!(report.deduplicated, 0);
}

const ENCODED: &str = r#"
[[route]]
name = "index"
path = "/"
body = '<a href="{{ url_for(route="cafe") }}">menu</a>'

[[route]]
name = "cafe"
path = "/café"
body = "Menu du café"

[[route]]
name = "show_user"
path = "/users/{id}"
body = "User {{ id }}"

[[seed]]
route = "show_user"
params = { id = "zoë doe" }
"#;

#[tokio::test]
async fn test_encoded_paths_frozen_with_decoded_values() {
    let dir = TempDir::new().unwrap();
    let freezer = site_freezer(ENCODED, dir.path());

    let report = freezer.freeze().await.unwrap();

    let cafe = fs::read_to_string(dir.path().join("caf%C3%A9.html")).unwrap();
    assert_eq!(cafe, "Menu du café");

    let user = fs::read_to_string(dir.path().join("users/zo%C3%AB%20doe.html")).unwrap();
    assert_eq!(user, "User zoë doe");

    let written: Vec<&str> = report.written().map(|r| r.url.as_str()).collect();
    assert!(written.contains(&"/caf%C3%A9"));
    assert!(written.contains(&"/users/zo%C3%AB%20doe"));
    assert_eq!(report.skipped_count(), 0);
}

#[tokio::test]
async fn test_freeze_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let freezer = site_freezer(BLOG, dir.path());

    freezer.freeze().await.unwrap();
    let first = collect_files(dir.path());

    let report = freezer.freeze().await.unwrap();
    let second = collect_files(dir.path());

    assert_eq!(first, second);

    // Dedup state does not leak between runs
    assert_eq!(report.written().count(), 7);
}

#[tokio::test]
async fn test_digest_matches_written_file() {
    let dir = TempDir::new().unwrap();
    let freezer = site_freezer(BLOG, dir.path());

    let report = freezer.freeze().await.unwrap();

    let index = report.written().find(|r| r.url == "/").unwrap();
    let path = index.output_path.as_ref().unwrap();
    let body = fs::read(path).unwrap();
    assert_eq!(
        index.digest.as_deref(),
        Some(site_freezer::output::body_digest(&body).as_str())
    );
}

#[tokio::test]
async fn test_external_links_skipped_once() {
    let dir = TempDir::new().unwrap();
    let freezer = site_freezer(
        r#"
[[route]]
name = "index"
path = "/"
body = '''
<a href="https://other.test/">other</a>
<a href="//cdn.test/lib.js">cdn</a>
<a href="mailto:team@example.com">mail</a>
<a href="/page">page</a>
'''

[[route]]
name = "page"
path = "/page"
body = '<a href="https://other.test/">other again</a>'
"#,
        dir.path(),
    );

    let report = freezer.freeze().await.unwrap();

    let external: Vec<&str> = report
        .records
        .iter()
        .filter(|r| r.state == TaskState::SkippedExternal)
        .map(|r| r.url.as_str())
        .collect();
    assert_eq!(external, vec!["https://other.test/", "//cdn.test/lib.js"]);
    assert_eq!(file_names(dir.path()), vec!["index.html", "page.html"]);
}

#[tokio::test]
async fn test_base_path_prefixes_output() {
    let dir = TempDir::new().unwrap();
    let freezer = site_freezer(
        r#"
[context]
base-path = "/blog"

[[route]]
name = "index"
path = "/"
body = '<a href="{{ url_for(route="post", slug="first") }}">first</a>'

[[route]]
name = "post"
path = "/posts/{slug}"
body = "Post {{ slug }}"
"#,
        dir.path(),
    );

    freezer.freeze().await.unwrap();

    assert_eq!(
        file_names(dir.path()),
        vec!["blog/index.html", "blog/posts/first.html"]
    );
}

#[tokio::test]
async fn test_write_failure_does_not_abort() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("blocked"), b"not a directory").unwrap();
    let freezer = site_freezer(
        r#"
[[route]]
name = "blocked"
path = "/blocked/page"
body = "unreachable on disk"

[[route]]
name = "ok"
path = "/ok"
body = "fine"
"#,
        dir.path(),
    );

    let report = freezer.freeze().await.unwrap();

    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.written_count(), 1);
    assert!(dir.path().join("ok.html").is_file());

    let failed = report.failures().next().unwrap();
    assert_eq!(failed.url, "/blocked/page");
    assert_eq!(failed.http_status, Some(200));
}

#[tokio::test]
async fn test_destination_failure_is_fatal() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("file"), b"").unwrap();
    let freezer = site_freezer(BLOG, &dir.path().join("file/out"));

    let err = freezer.freeze().await.unwrap_err();
    assert!(matches!(err, FreezeError::Destination { .. }));
}

/// Hand-written application used for timing and cancellation tests
struct ScriptedSite {
    urls: Arc<UrlBuilder>,
    delay: Duration,
    cancel_on_first: OnceLock<CancelHandle>,
}

impl ScriptedSite {
    fn new(delay: Duration) -> Self {
        let routes = RouteTable::new(vec![Route::new("index", "/").unwrap()]);
        let context = RequestContext::new("http", "localhost", "").unwrap();
        Self {
            urls: Arc::new(UrlBuilder::new(Arc::new(routes), context)),
            delay,
            cancel_on_first: OnceLock::new(),
        }
    }
}

#[async_trait]
impl Application for ScriptedSite {
    fn routes(&self) -> Vec<RouteDescriptor> {
        self.urls.routes().descriptors()
    }

    fn url_generator(&self) -> Arc<dyn UrlGenerator> {
        self.urls.clone()
    }

    async fn respond(&self, request: Request, _urls: Arc<dyn UrlGenerator>) -> Response {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(handle) = self.cancel_on_first.get() {
            handle.cancel();
        }
        Response::html(format!(r#"<a href="{}next">next</a>"#, request.uri))
    }
}

#[tokio::test]
async fn test_timeout_ends_run() {
    let dir = TempDir::new().unwrap();
    let freezer = Freezer::new(
        ScriptedSite::new(Duration::from_millis(500)),
        FreezerOptions {
            destination: dir.path().to_path_buf(),
            timeout: Some(Duration::from_millis(50)),
            ..Default::default()
        },
    );

    let err = freezer.freeze().await.unwrap_err();
    assert!(matches!(err, FreezeError::TimedOut { .. }));
}

#[tokio::test]
async fn test_cancel_between_tasks() {
    let dir = TempDir::new().unwrap();
    let freezer = Freezer::new(
        ScriptedSite::new(Duration::ZERO),
        FreezerOptions {
            destination: dir.path().to_path_buf(),
            ..Default::default()
        },
    );
    freezer
        .app()
        .cancel_on_first
        .set(freezer.cancel_handle())
        .unwrap();

    let err = freezer.freeze().await.unwrap_err();
    assert!(matches!(err, FreezeError::Cancelled));

    // The page in flight completed before the cancellation was seen
    assert_eq!(file_names(dir.path()), vec!["index.html"]);
}
