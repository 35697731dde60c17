//! End-to-end reconciliation tests against mock collaborators.

use std::sync::Arc;

use site_curator::testing::{MockFetcher, MockOracle, MockSearch};
use site_curator::{
    dataset, ClassificationVerdict, Curator, CuratorConfig, DatasetRow, MemoryCache, QueryKind,
    RetryPolicy, SearchCandidate,
};

const PAGE: &str = "<title>Acme blender</title><p>Specifications, features and price</p>";
const DISCONTINUED: &str = "<p>This product has been discontinued. Price: n/a</p>";

const CATALOG: &str = "https://acme.com/blenders";
const X100: &str = "https://acme.com/blenders/x100";
const X200: &str = "https://acme.com/blenders/x200";

struct Harness {
    curator: Curator,
    oracle: Arc<MockOracle>,
    fetcher: Arc<MockFetcher>,
    search: Arc<MockSearch>,
}

impl Harness {
    fn new(fetcher: MockFetcher, oracle: MockOracle, search: MockSearch) -> Self {
        Self::with_config(fetcher, oracle, search, CuratorConfig::default())
    }

    fn with_config(
        fetcher: MockFetcher,
        oracle: MockOracle,
        search: MockSearch,
        config: CuratorConfig,
    ) -> Self {
        let oracle = Arc::new(oracle);
        let fetcher = Arc::new(fetcher);
        let search = Arc::new(search);
        let curator = Curator::new(
            fetcher.clone(),
            oracle.clone(),
            search.clone(),
            Arc::new(MemoryCache::new()),
            config.with_retry(RetryPolicy::immediate(0)),
        );
        Self {
            curator,
            oracle,
            fetcher,
            search,
        }
    }
}

fn row(index: usize, model: &str, url: Option<&str>) -> DatasetRow {
    DatasetRow::new(index, "blender", "Acme", model, url.map(str::to_string))
}

fn product_page_oracle(urls: &[&str]) -> MockOracle {
    urls.iter().fold(MockOracle::new(), |oracle, url| {
        oracle
            .with_answer(QueryKind::CheckUrl, *url, "True")
            .with_answer(QueryKind::CheckProductPage, *url, "True")
    })
}

/// Row 0's URL is a catalog naming X200, whose page search finds.
fn catalog_redirect() -> Harness {
    let fetcher = MockFetcher::new()
        .with_html(CATALOG, PAGE)
        .with_html(X200, PAGE);
    let oracle = product_page_oracle(&[X200])
        .with_answer(QueryKind::CheckUrl, CATALOG, "Catalog\nlineup page")
        .with_answer(QueryKind::FindInCatalog, CATALOG, "X200");
    let search = MockSearch::new().with_results(
        "buy Acme X200 blender",
        vec![SearchCandidate::new("Acme X200", X200)],
    );
    Harness::new(fetcher, oracle, search)
}

#[tokio::test]
async fn test_valid_url_is_kept_unchanged() {
    let h = Harness::new(
        MockFetcher::new().with_html(X100, PAGE),
        product_page_oracle(&[X100]),
        MockSearch::new(),
    );

    let result = h
        .curator
        .reconciler()
        .reconcile(vec![row(0, "X100", Some(X100))], 2)
        .await
        .unwrap();

    assert_eq!(result.accepted, vec![row(0, "X100", Some(X100))]);
    assert!(result.rejected.is_empty());
    assert!(h.search.queries().is_empty());
}

#[tokio::test]
async fn test_catalog_url_is_replaced_by_listed_model() {
    let h = catalog_redirect();

    let result = h
        .curator
        .reconciler()
        .reconcile(vec![row(0, "X100", Some(CATALOG))], 2)
        .await
        .unwrap();

    assert_eq!(result.accepted, vec![row(0, "X200", Some(X200))]);
    assert_eq!(h.search.queries(), vec!["buy Acme X200 blender".to_string()]);
}

#[tokio::test]
async fn test_unavailable_page_skips_page_check() {
    let h = Harness::new(
        MockFetcher::new().with_html(X100, DISCONTINUED),
        MockOracle::new(),
        MockSearch::new(),
    );

    let classification = h
        .curator
        .classifier()
        .classify("blender", "Acme", Some(X100))
        .await
        .unwrap();
    assert_eq!(classification.verdict, ClassificationVerdict::Unavailable);

    let result = h
        .curator
        .reconciler()
        .reconcile(vec![row(0, "X100", Some(X100))], 1)
        .await
        .unwrap();

    assert!(result.accepted.is_empty());
    assert_eq!(result.rejected, vec![row(0, "X100", Some(X100))]);
    assert!(h.oracle.calls().is_empty());
    assert_eq!(h.search.queries(), vec!["buy Acme X100 blender".to_string()]);
}

#[tokio::test]
async fn test_second_run_uses_cached_answers_only() {
    let h = catalog_redirect();
    let rows = vec![row(0, "X100", Some(CATALOG))];

    let first = h.curator.reconciler().reconcile(rows.clone(), 2).await.unwrap();
    h.oracle.clear_calls();
    let fetches = h.fetcher.fetch_count();
    let queries = h.search.queries().len();

    let second = h.curator.reconciler().reconcile(rows, 2).await.unwrap();

    assert_eq!(first.accepted, second.accepted);
    assert_eq!(first.rejected, second.rejected);
    assert!(h.oracle.calls().is_empty());
    assert_eq!(h.fetcher.fetch_count(), fetches);
    assert_eq!(h.search.queries().len(), queries);
}

#[tokio::test]
async fn test_catalog_cycle_stops_at_depth_bound() {
    let a = "https://acme.com/lineup/a";
    let b = "https://acme.com/lineup/b";
    let fetcher = MockFetcher::new().with_html(a, PAGE).with_html(b, PAGE);
    let oracle = MockOracle::new()
        .with_answer(QueryKind::CheckUrl, a, "Catalog")
        .with_answer(QueryKind::CheckUrl, b, "Catalog")
        .with_answer(QueryKind::FindInCatalog, a, "X")
        .with_answer(QueryKind::FindInCatalog, b, "Y");
    let search = MockSearch::new()
        .with_results("buy Acme M blender", vec![SearchCandidate::new("A", a)])
        .with_results("buy Acme X blender", vec![SearchCandidate::new("B", b)])
        .with_results("buy Acme Y blender", vec![SearchCandidate::new("A", a)]);
    let h = Harness::new(fetcher, oracle, search);

    let outcome = h
        .curator
        .resolver()
        .resolve("blender", "Acme", "M")
        .await
        .unwrap();

    assert!(!outcome.accepted);
    assert!(outcome.final_url.is_none());
    // M, X, Y; the repeated search for X is served from cache.
    assert_eq!(h.search.queries().len(), 3);
}

#[tokio::test]
async fn test_catalog_naming_same_model_is_not_followed() {
    let lineup = "https://acme.com/lineup/all";
    let fetcher = MockFetcher::new()
        .with_html(lineup, PAGE)
        .with_html(X100, PAGE);
    let oracle = product_page_oracle(&[X100])
        .with_answer(QueryKind::CheckUrl, lineup, "Catalog")
        .with_answer(QueryKind::FindInCatalog, lineup, "X100");
    let search = MockSearch::new().with_results(
        "buy Acme X100 blender",
        vec![
            SearchCandidate::new("Lineup", lineup),
            SearchCandidate::new("X100", X100),
        ],
    );
    let h = Harness::new(fetcher, oracle, search);

    let result = h
        .curator
        .reconciler()
        .reconcile(vec![row(0, "X100", None)], 1)
        .await
        .unwrap();

    assert_eq!(result.accepted, vec![row(0, "X100", Some(X100))]);
    assert_eq!(h.search.queries().len(), 1);
}

#[tokio::test]
async fn test_duplicate_urls_keep_first_arrival() {
    let h = Harness::new(
        MockFetcher::new().with_html(X100, PAGE),
        product_page_oracle(&[X100]),
        MockSearch::new(),
    );
    let rows = vec![
        row(0, "X100", Some(X100)),
        row(1, "X100 Pro", Some(X100)),
        row(2, "X300", None),
    ];

    let result = h.curator.reconciler().reconcile(rows, 1).await.unwrap();

    assert_eq!(result.len(), 3);
    assert_eq!(result.duplicates, 1);
    assert_eq!(result.accepted, vec![row(0, "X100", Some(X100))]);
    assert_eq!(
        result.rejected,
        vec![row(1, "X100 Pro", Some(X100)), row(2, "X300", None)]
    );
}

#[tokio::test]
async fn test_rate_limited_search_rejects_without_caching() {
    let h = Harness::new(MockFetcher::new(), MockOracle::new(), MockSearch::new().rate_limited());
    let rows = vec![row(0, "X100", None)];

    let first = h.curator.reconciler().reconcile(rows.clone(), 1).await.unwrap();
    let second = h.curator.reconciler().reconcile(rows, 1).await.unwrap();

    assert_eq!(first.rejected.len(), 1);
    assert_eq!(first.failed, 0);
    assert_eq!(second.rejected.len(), 1);
    assert_eq!(h.search.queries().len(), 2);
}

#[tokio::test]
async fn test_oracle_failure_rejects_row() {
    // X100 has no oracle answers, so its evaluation fails.
    let h = Harness::new(
        MockFetcher::new().with_html(X100, PAGE).with_html(X200, PAGE),
        product_page_oracle(&[X200]),
        MockSearch::new(),
    );
    let rows = vec![row(0, "X100", Some(X100)), row(1, "X200", Some(X200))];

    let result = h.curator.reconciler().reconcile(rows, 2).await.unwrap();

    assert_eq!(result.failed, 1);
    assert_eq!(result.accepted, vec![row(1, "X200", Some(X200))]);
    assert_eq!(result.rejected, vec![row(0, "X100", Some(X100))]);
}

#[tokio::test]
async fn test_audit_trails_record_every_row() {
    let dir = tempfile::tempdir().unwrap();
    let h = Harness::new(
        MockFetcher::new().with_html(X100, PAGE),
        product_page_oracle(&[X100]),
        MockSearch::new(),
    );
    let rows = vec![row(0, "X100", Some(X100)), row(1, "X300", None)];

    let mut audit = dataset::AuditTrail::create(dir.path(), "products_v1.1").unwrap();
    let result = h
        .curator
        .reconciler()
        .reconcile_with_audit(rows, 2, &mut audit)
        .await
        .unwrap();

    let accepted = dataset::read_rows(audit.accepted_path(), None).unwrap();
    let rejected = dataset::read_rows(audit.rejected_path(), None).unwrap();

    assert_eq!(result.accepted.len(), 1);
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0].url.as_deref(), Some(X100));
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].model, "X300");
    assert!(rejected[0].url.is_none());
}

#[tokio::test]
async fn test_max_depth_zero_never_follows_catalogs() {
    let fetcher = MockFetcher::new()
        .with_html(CATALOG, PAGE)
        .with_html(X200, PAGE);
    let oracle = product_page_oracle(&[X200])
        .with_answer(QueryKind::CheckUrl, CATALOG, "Catalog")
        .with_answer(QueryKind::FindInCatalog, CATALOG, "X200");
    let search = MockSearch::new()
        .with_results(
            "buy Acme X100 blender",
            vec![SearchCandidate::new("Lineup", CATALOG)],
        )
        .with_results(
            "buy Acme X200 blender",
            vec![SearchCandidate::new("Acme X200", X200)],
        );
    let h = Harness::with_config(
        fetcher,
        oracle,
        search,
        CuratorConfig::default().with_max_depth(0),
    );

    let outcome = h
        .curator
        .resolver()
        .resolve("blender", "Acme", "X100")
        .await
        .unwrap();

    assert!(!outcome.accepted);
    assert_eq!(h.search.queries(), vec!["buy Acme X100 blender".to_string()]);
}

#[tokio::test]
async fn test_audit_trails_record_dropped_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let h = Harness::new(
        MockFetcher::new().with_html(X100, PAGE),
        product_page_oracle(&[X100]),
        MockSearch::new(),
    );
    let rows = vec![row(0, "X100", Some(X100)), row(1, "X100 Pro", Some(X100))];

    let mut audit = dataset::AuditTrail::create(dir.path(), "products_v1.1").unwrap();
    let result = h
        .curator
        .reconciler()
        .reconcile_with_audit(rows, 1, &mut audit)
        .await
        .unwrap();

    let rejected = dataset::read_rows(audit.rejected_path(), None).unwrap();

    assert_eq!(result.duplicates, 1);
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].model, "X100 Pro");
    assert_eq!(rejected[0].url.as_deref(), Some(X100));
}

#[tokio::test]
async fn test_search_catalog_hop_finds_listed_model() {
    // The row's URL is not a product page, so X100 is searched and the
    // first candidate is a lineup page naming X200.
    let fetcher = MockFetcher::new()
        .with_html(X100, "<p>About us</p>")
        .with_html(CATALOG, PAGE)
        .with_html(X200, PAGE);
    let oracle = product_page_oracle(&[X200])
        .with_answer(QueryKind::CheckUrl, CATALOG, "Catalog")
        .with_answer(QueryKind::FindInCatalog, CATALOG, "X200");
    let search = MockSearch::new()
        .with_results(
            "buy Acme X100 blender",
            vec![SearchCandidate::new("Lineup", CATALOG)],
        )
        .with_results(
            "buy Acme X200 blender",
            vec![SearchCandidate::new("Acme X200", X200)],
        );
    let h = Harness::new(fetcher, oracle, search);

    let result = h
        .curator
        .reconciler()
        .reconcile(vec![row(0, "X100", Some(X100))], 1)
        .await
        .unwrap();

    assert_eq!(result.accepted, vec![row(0, "X200", Some(X200))]);
    assert_eq!(
        h.search.queries(),
        vec![
            "buy Acme X100 blender".to_string(),
            "buy Acme X200 blender".to_string()
        ]
    );
}

#[tokio::test]
async fn test_unreachable_url_falls_back_to_search() {
    let moved = "https://acme.com/blenders/x100-2024";
    let h = Harness::new(
        MockFetcher::new().with_html(moved, PAGE),
        product_page_oracle(&[moved]),
        MockSearch::new().with_results(
            "buy Acme X100 blender",
            vec![SearchCandidate::new("Acme X100", moved)],
        ),
    );

    let result = h
        .curator
        .reconciler()
        .reconcile(vec![row(0, "X100", Some(X100))], 1)
        .await
        .unwrap();

    assert_eq!(result.accepted, vec![row(0, "X100", Some(moved))]);
    assert!(result.rejected.is_empty());
    assert_eq!(result.failed, 0);
    assert!(h.fetcher.fetched().contains(&X100.to_string()));
}

const REVIEW_PAGE: &str = "https://blendreviews.com/top-blenders/x100";

fn review_site_search() -> MockSearch {
    MockSearch::new().with_results(
        "buy Acme X100 blender",
        vec![SearchCandidate::new("Best blenders", REVIEW_PAGE)],
    )
}

#[tokio::test]
async fn test_foreign_host_rejected_by_brand_check_is_never_fetched() {
    let h = Harness::new(
        MockFetcher::new().with_html(REVIEW_PAGE, PAGE),
        product_page_oracle(&[REVIEW_PAGE]).with_answer(
            QueryKind::CheckUrlBrand,
            "blendreviews.com/top-blenders",
            "False",
        ),
        review_site_search(),
    );

    let result = h
        .curator
        .reconciler()
        .reconcile(vec![row(0, "X100", None)], 1)
        .await
        .unwrap();

    assert!(result.accepted.is_empty());
    assert_eq!(h.fetcher.fetch_count(), 0);

    let calls = h.oracle.calls();
    assert_eq!(h.oracle.call_count(QueryKind::CheckUrlBrand), 1);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].url, "blendreviews.com/top-blenders");
}

#[tokio::test]
async fn test_foreign_host_confirmed_by_brand_check_is_accepted() {
    let h = Harness::new(
        MockFetcher::new().with_html(REVIEW_PAGE, PAGE),
        product_page_oracle(&[REVIEW_PAGE]).with_default(QueryKind::CheckUrlBrand, "True"),
        review_site_search(),
    );

    let result = h
        .curator
        .reconciler()
        .reconcile(vec![row(0, "X100", None)], 1)
        .await
        .unwrap();

    assert_eq!(result.accepted, vec![row(0, "X100", Some(REVIEW_PAGE))]);
    assert_eq!(h.oracle.call_count(QueryKind::CheckUrlBrand), 1);
}
