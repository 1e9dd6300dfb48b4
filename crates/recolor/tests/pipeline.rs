//! End-to-end recolor passes over fixture pages.

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use recolor::{
    Config, Fetch, FetchError, MapFetcher, Overlay, PageStyles, RecolorEngine, RecolorPass,
    Sandbox,
};

const PAGE: &str = "https://docs.example.com/guide/index.html";

const SITE_CSS: &str = r#"
@import url("theme.css") screen;

html, body { margin: 0; padding: 0; font-family: "Red Hat Text", sans-serif }
.banner { background: url(red.png) no-repeat; border-bottom: 1px solid #ddd }

@media (prefers-color-scheme: dark) {
  .banner { color: white !important; }
  .spacer { height: 4px }
}

@supports (backdrop-filter: blur(1px)) {
  .glass { background-color: rgba(255, 255, 255, 0.4) }
}

@keyframes flash {
  from { background: yellow }
  to { opacity: 0 }
}

@font-face { font-family: Brand; src: url(brand.woff2) }
"#;

const THEME_CSS: &str = "a { color: #0645ad } a:visited { color: #0b0080 }";

fn invert() -> Config {
    Config::default().with_transform(Sandbox::new("[255 - r, 255 - g, 255 - b, a]").unwrap())
}

fn site() -> MapFetcher {
    MapFetcher::new()
        .with("https://docs.example.com/css/site.css", SITE_CSS)
        .with("https://docs.example.com/css/theme.css", THEME_CSS)
}

// ============================================================================
// Whole pass
// ============================================================================

#[tokio::test]
async fn test_linked_sheet_with_import() {
    let engine = RecolorEngine::css().unwrap();
    let config = invert();
    let page = PageStyles::new(PAGE).with_linked("../css/site.css");

    let mut overlay = Overlay::new();
    let appended = RecolorPass::new(&engine, &config, &site())
        .run(&page, &mut overlay)
        .await;

    assert_eq!(appended, 1);
    let expected = [
        "a { color:rgba(249,186,82,1); }",
        "a:visited { color:rgba(244,255,127,1); }",
        ".banner { border-bottom:1px solid rgba(34,34,34,1); }",
        "@media (prefers-color-scheme: dark) { .banner { color:rgba(0,0,0,1)!important; } }",
        "@supports (backdrop-filter: blur(1px)) { .glass { background-color:rgba(0,0,0,0.4); } }",
        "@keyframes flash { from { background:rgba(0,0,255,1); } }",
    ]
    .join("\n");
    assert_eq!(overlay.to_css(), expected);
}

#[tokio::test]
async fn test_resident_and_linked_keep_page_order() {
    let engine = RecolorEngine::css().unwrap();
    let config = invert();
    let page = PageStyles::new(PAGE)
        .with_resident("h1 { color: black }")
        .with_linked("/css/theme.css")
        .with_resident("h2 { color: white }");

    let mut overlay = Overlay::new();
    RecolorPass::new(&engine, &config, &site())
        .run(&page, &mut overlay)
        .await;

    assert_eq!(
        overlay.blocks(),
        [
            "h1 { color:rgba(255,255,255,1); }".to_string(),
            "h2 { color:rgba(0,0,0,1); }".to_string(),
            "a { color:rgba(249,186,82,1); }\na:visited { color:rgba(244,255,127,1); }".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_target_palette_with_swap() {
    let engine = RecolorEngine::css().unwrap();
    let config = Config::from_yaml(
        r##"
target_colors: ["#1d2021", "#fbf1c7", "#458588"]
swap_rules:
  "#458588": "#83a598"
swap_include_pattern: 'docs\.example\.com'
"##,
    )
    .unwrap();
    let css = "a { color: #3d7ea6 } body { background: white; color: #111 }";
    let fetcher = MapFetcher::new();
    let pass = RecolorPass::new(&engine, &config, &fetcher);

    let mut swapped = Overlay::new();
    pass.run(&PageStyles::new(PAGE).with_resident(css), &mut swapped)
        .await;
    assert_eq!(
        swapped.to_css(),
        "a { color:#83a598; }\nbody { background:#fbf1c7;\ncolor:#1d2021; }"
    );

    let mut unswapped = Overlay::new();
    pass.run(
        &PageStyles::new("https://blog.example.org/").with_resident(css),
        &mut unswapped,
    )
    .await;
    assert_eq!(
        unswapped.to_css(),
        "a { color:#458588; }\nbody { background:#fbf1c7;\ncolor:#1d2021; }"
    );
}

#[tokio::test]
async fn test_every_source_failing_recolors_nothing() {
    let engine = RecolorEngine::css().unwrap();
    let config = invert();
    let page = PageStyles::new(PAGE)
        .with_linked("missing-1.css")
        .with_linked("missing-2.css");

    let mut overlay = Overlay::new();
    let appended = RecolorPass::new(&engine, &config, &MapFetcher::new())
        .run(&page, &mut overlay)
        .await;
    assert_eq!(appended, 0);
    assert!(overlay.is_empty());
}

// ============================================================================
// Completion order
// ============================================================================

struct SlowFetcher {
    inner: MapFetcher,
    delays: HashMap<&'static str, u64>,
    completed: RefCell<Vec<String>>,
}

#[async_trait(?Send)]
impl Fetch for SlowFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let delay = self.delays.get(url).copied().unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        self.completed.borrow_mut().push(url.to_string());
        self.inner.fetch(url).await
    }
}

#[tokio::test(start_paused = true)]
async fn test_slow_first_sheet_still_comes_first() {
    let fetcher = SlowFetcher {
        inner: MapFetcher::new()
            .with("https://a.test/1.css", "one { color: red }")
            .with("https://a.test/2.css", "two { color: lime }")
            .with("https://a.test/3.css", "three { color: blue }"),
        delays: HashMap::from([
            ("https://a.test/1.css", 300),
            ("https://a.test/2.css", 100),
            ("https://a.test/3.css", 200),
        ]),
        completed: RefCell::new(Vec::new()),
    };
    let engine = RecolorEngine::css().unwrap();
    let config = invert();
    let page = PageStyles::new("https://a.test/")
        .with_linked("1.css")
        .with_linked("2.css")
        .with_linked("3.css");

    let mut overlay = Overlay::new();
    RecolorPass::new(&engine, &config, &fetcher)
        .run(&page, &mut overlay)
        .await;

    assert_eq!(
        *fetcher.completed.borrow(),
        ["https://a.test/2.css", "https://a.test/3.css", "https://a.test/1.css"]
    );
    assert_eq!(
        overlay.blocks(),
        [
            "one { color:rgba(0,255,255,1); }".to_string(),
            "two { color:rgba(255,0,255,1); }".to_string(),
            "three { color:rgba(255,255,0,1); }".to_string(),
        ]
    );
}

// ============================================================================
// Inline styles
// ============================================================================

#[test]
fn test_element_style_override() {
    let engine = RecolorEngine::css().unwrap();
    let config = invert();
    let fetcher = MapFetcher::new();
    let pass = RecolorPass::new(&engine, &config, &fetcher);

    assert_eq!(
        pass.recolor_element_style("color: #fff; padding: 2px", PAGE)
            .as_deref(),
        Some("color: #fff; padding: 2px; color:rgba(0,0,0,1);")
    );
    assert_eq!(pass.recolor_element_style("padding: 2px", PAGE), None);
    assert_eq!(
        pass.recolor_element_style("font-family: 'Red Hat'", PAGE),
        None
    );
}
