//! Integration tests for the fetch client and the source adapters
//!
//! These tests use wiremock to stand in for the knowledge graph, the wiki APIs
//! and the literature index.

use genewiki_priority::config::{FetchConfig, PageViewConfig, UserAgentConfig};
use genewiki_priority::fetch::{
    ExistenceQuery, FetchClient, KnowledgeGraph, LiteratureCredentials, LiteratureIndex, Pacer,
    WikiMetrics,
};
use genewiki_priority::FetchError;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Client with no backoff so retry tests run instantly
fn create_test_client(max_retries: u32) -> FetchClient {
    let user_agent = UserAgentConfig {
        contact_email: "curator@example.org".to_string(),
        ..UserAgentConfig::default()
    };
    let fetch = FetchConfig {
        max_retries,
        backoff_factor: 0.0,
        ..FetchConfig::default()
    };
    FetchClient::new(&user_agent, &fetch).expect("Failed to build client")
}

fn create_test_literature(server: &MockServer, min_linked_publications: usize) -> LiteratureIndex {
    LiteratureIndex::new(
        create_test_client(0),
        format!("{}/eutils", server.uri()),
        LiteratureCredentials {
            tool: "genewiki-priority".to_string(),
            email: "curator@example.org".to_string(),
            api_key: None,
        },
        min_linked_publications,
        Pacer::from_millis(0),
    )
}

fn elink_body(gene_id: &str, pmids: &[&str]) -> serde_json::Value {
    json!({
        "header": {"type": "elink", "version": "0.3"},
        "linksets": [{
            "dbfrom": "gene",
            "ids": [gene_id],
            "linksetdbs": [{"dbto": "pubmed", "linkname": "gene_pubmed", "links": pmids}]
        }]
    })
}

const MEDLINE_RECORD: &str = "
PMID- 31363486
DP  - 2019 Aug 1
TI  - Loss of CDK2AP2 alters cell fate decisions.
FAU - Smith, Jane
AU  - Smith J
AD  - Department of Genetics, Example University, Boston, USA.
      jane.smith@example.edu.
FAU - Doe, John
AU  - Doe J
";

#[tokio::test]
async fn test_retries_after_service_unavailable() {
    let mock_server = MockServer::start().await;

    // First attempt fails, the retry succeeds
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(3);
    let body = client
        .get_text(&format!("{}/flaky", mock_server.uri()), &[])
        .await
        .expect("Retry should have succeeded");

    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(3);
    let result = client
        .get_text(&format!("{}/missing", mock_server.uri()), &[])
        .await;

    assert!(matches!(result, Err(FetchError::NotFoundOrEmpty { .. })));
}

#[tokio::test]
async fn test_exhausted_retries_surface_transient_error() {
    let mock_server = MockServer::start().await;

    // One attempt plus two retries
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = create_test_client(2);
    let result = client
        .get_text(&format!("{}/down", mock_server.uri()), &[])
        .await;

    match result {
        Err(FetchError::Transient { reason, .. }) => assert!(reason.contains("503")),
        other => panic!("Expected a transient error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_exhausted_rate_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(429))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = create_test_client(1);
    let result = client
        .get_text(&format!("{}/busy", mock_server.uri()), &[])
        .await;

    assert!(matches!(result, Err(FetchError::RateLimited { .. })));
}

#[tokio::test]
async fn test_undecodable_json_is_malformed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/garbage"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(0);
    let result: Result<serde_json::Value, _> = client
        .get_json(&format!("{}/garbage", mock_server.uri()), &[])
        .await;

    assert!(matches!(result, Err(FetchError::Malformed { .. })));
}

#[tokio::test]
async fn test_knowledge_graph_keeps_english_links() {
    let mock_server = MockServer::start().await;

    let binding = |gene: &str, link: &str| {
        json!({
            "item": {"type": "uri", "value": format!("http://www.wikidata.org/entity/Q{}", gene)},
            "itemLabel": {"type": "literal", "value": format!("GENE{}", gene)},
            "geneID": {"type": "literal", "value": gene},
            "proteinwdid": {"type": "uri", "value": format!("http://www.wikidata.org/entity/P{}", gene)},
            "sitelink": {"type": "uri", "value": link}
        })
    };

    Mock::given(method("GET"))
        .and(path("/sparql"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "head": {"vars": ["item", "itemLabel", "geneID", "proteinwdid", "sitelink"]},
            "results": {"bindings": [
                binding("672", "https://en.wikipedia.org/wiki/BRCA1"),
                binding("672", "https://de.wikipedia.org/wiki/BRCA1"),
                binding("672", "https://en.wikipedia.org/wiki/BRCA1"),
                binding("7157", "https://en.wikipedia.org/wiki/P53")
            ]}
        })))
        .mount(&mock_server)
        .await;

    let knowledge_graph =
        KnowledgeGraph::new(create_test_client(0), format!("{}/sparql", mock_server.uri()));
    let links = knowledge_graph
        .wiki_links(ExistenceQuery::GenesWithArticle)
        .await
        .expect("Query should succeed");

    assert_eq!(links.len(), 2);
    assert_eq!(links[0].gene_id, "672");
    assert_eq!(links[0].qid, "Q672");
    assert_eq!(links[0].protein_id, "P672");
    assert_eq!(links[0].title, "BRCA1");
    assert_eq!(links[1].title, "P53");
}

#[tokio::test]
async fn test_wiki_volume_keyed_by_requested_title() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("titles", "Cyclin_D1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "batchcomplete": "",
            "query": {"pages": {"2456": {
                "pageid": 2456,
                "ns": 0,
                "title": "Cyclin D1",
                "length": 4210,
                "touched": "2021-05-01T10:00:00Z",
                "lastrevid": 1020304
            }}}
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("titles", "No_such_page"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": {"pages": {"-1": {"ns": 0, "title": "No such page", "missing": ""}}}
        })))
        .mount(&mock_server)
        .await;

    let wiki = WikiMetrics::new(
        create_test_client(0),
        format!("{}/w/api.php", mock_server.uri()),
        format!("{}/pageviews", mock_server.uri()),
        PageViewConfig::default(),
        Pacer::from_millis(0),
    );

    let record = wiki.volume("Cyclin_D1").await.expect("Volume should succeed");
    assert_eq!(record.title, "Cyclin_D1");
    assert_eq!(record.page_length, 4210);
    assert_eq!(record.last_revision_id, 1020304);

    let missing = wiki.volume("No_such_page").await;
    assert!(matches!(missing, Err(FetchError::NotFoundOrEmpty { ref item, .. }) if item == "No_such_page"));
}

#[tokio::test]
async fn test_page_views_sentinel_on_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(
            "/pageviews/en.wikipedia/all-access/user/BRCA1/monthly/20200101/20201231",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"project": "en.wikipedia", "article": "BRCA1", "granularity": "monthly",
                 "timestamp": "2020010100", "access": "all-access", "agent": "user", "views": 5120},
                {"project": "en.wikipedia", "article": "BRCA1", "granularity": "monthly",
                 "timestamp": "2020020100", "access": "all-access", "agent": "user", "views": 4980}
            ]
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(
            "/pageviews/en.wikipedia/all-access/user/Obscure/monthly/20200101/20201231",
        ))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let wiki = WikiMetrics::new(
        create_test_client(0),
        format!("{}/w/api.php", mock_server.uri()),
        format!("{}/pageviews", mock_server.uri()),
        PageViewConfig::default(),
        Pacer::from_millis(0),
    );

    let views = wiki.page_views("BRCA1").await.expect("Pageviews should succeed");
    assert_eq!(views.len(), 2);
    assert_eq!(views[0].views, 5120);

    let none = wiki.page_views("Obscure").await.expect("404 yields a sentinel");
    assert_eq!(none.len(), 1);
    assert!(none[0].is_no_data());
    assert_eq!(none[0].title, "Obscure");
}

#[tokio::test]
async fn test_gene_literature_quarantines_single_citation() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/eutils/elink.fcgi"))
        .and(query_param("id", "672"))
        .and(query_param("tool", "genewiki-priority"))
        .and(query_param("email", "curator@example.org"))
        .respond_with(ResponseTemplate::new(200).set_body_json(elink_body("672", &["11", "12", "13"])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/eutils/efetch.fcgi"))
        .and(query_param("id", "13"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/eutils/efetch.fcgi"))
        .and(query_param("rettype", "medline"))
        .respond_with(ResponseTemplate::new(200).set_body_string(MEDLINE_RECORD))
        .mount(&mock_server)
        .await;

    let literature = create_test_literature(&mock_server, 2);
    let gene = literature.gene("672").await.expect("Gene should succeed");

    assert_eq!(gene.publications.len(), 2);
    assert!(gene.publications.iter().all(|p| p.gene_id == "672"));
    assert_eq!(gene.publications[0].pmid, "11");
    assert_eq!(gene.publications[0].publication_date, "2019 Aug 1");
    assert_eq!(gene.authors.len(), 4);
    assert_eq!(gene.authors[0].email.as_deref(), Some("jane.smith@example.edu"));
    assert_eq!(gene.pmid_failures.len(), 1);
    assert_eq!(gene.pmid_failures[0].pmid, "13");
}

#[tokio::test]
async fn test_gene_with_few_publications_is_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/eutils/elink.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(elink_body("99", &["1", "2"])))
        .mount(&mock_server)
        .await;
    // No citation may be fetched for a rejected gene
    Mock::given(method("GET"))
        .and(path("/eutils/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(MEDLINE_RECORD))
        .expect(0)
        .mount(&mock_server)
        .await;

    let literature = create_test_literature(&mock_server, 2);
    let result = literature.gene("99").await;

    assert!(matches!(result, Err(FetchError::NotFoundOrEmpty { ref item, .. }) if item == "99"));
}
