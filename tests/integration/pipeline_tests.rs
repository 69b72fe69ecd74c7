//! End-to-end pipeline tests
//!
//! Every upstream is a wiremock server; tables land in a temporary directory
//! and the run ledger is in memory.

use genewiki_priority::config::{
    Config, EndpointConfig, FetchConfig, OutputConfig, PageViewConfig, ResumeConfig,
    ThresholdConfig, UserAgentConfig,
};
use genewiki_priority::pipeline::{files, Pipeline, Step};
use genewiki_priority::records::{
    AuthorRecord, AuthorRollupRow, DateSource, ExternalEntityRef, GeneScore, PageViewRecord,
    PmidFailure, PublicationRecord, SizedArticle, WikiLinkGroup, WikiVolumeRecord,
};
use genewiki_priority::storage::{
    read_keys, read_snapshot, read_table, write_keys, write_snapshot, write_table, RunLedger,
    SqliteLedger, StorageError,
};
use genewiki_priority::{GeneWikiError, RunStatus, Stage};
use serde_json::json;
use std::path::Path;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

/// Matches a SPARQL request whose query text contains every fragment
struct QueryContains(Vec<&'static str>);

impl Match for QueryContains {
    fn matches(&self, request: &Request) -> bool {
        request
            .url
            .query_pairs()
            .any(|(key, value)| key == "query" && self.0.iter().all(|f| value.contains(f)))
    }
}

fn create_test_config(server: &MockServer, root: &Path) -> Config {
    let uri = server.uri();
    Config {
        user_agent: UserAgentConfig {
            contact_email: "curator@example.org".to_string(),
            ..UserAgentConfig::default()
        },
        fetch: FetchConfig {
            max_retries: 0,
            backoff_factor: 0.0,
            wiki_delay_ms: 0,
            literature_delay_ms: 0,
            ..FetchConfig::default()
        },
        endpoints: EndpointConfig {
            sparql_url: format!("{}/sparql", uri),
            wiki_api_url: format!("{}/w/api.php", uri),
            pageviews_url: format!("{}/pageviews", uri),
            eutils_url: format!("{}/eutils", uri),
        },
        thresholds: ThresholdConfig {
            min_linked_publications: 2,
            ..ThresholdConfig::default()
        },
        resume: ResumeConfig::default(),
        pageviews: PageViewConfig::default(),
        output: OutputConfig {
            data_dir: root.join("data").display().to_string(),
            result_dir: root.join("results").display().to_string(),
            ledger_path: root.join("ledger.db").display().to_string(),
        },
    }
}

fn entity_binding(gene: &str) -> serde_json::Value {
    json!({
        "item": {"type": "uri", "value": format!("http://www.wikidata.org/entity/Q{}", gene)},
        "itemLabel": {"type": "literal", "value": format!("GENE{}", gene)},
        "geneID": {"type": "literal", "value": gene},
        "proteinwdid": {"type": "uri", "value": format!("http://www.wikidata.org/entity/P{}", gene)}
    })
}

fn link_binding(gene: &str, link: &str) -> serde_json::Value {
    let mut binding = entity_binding(gene);
    binding["sitelink"] = json!({"type": "uri", "value": link});
    binding
}

fn sparql_body(bindings: Vec<serde_json::Value>) -> serde_json::Value {
    json!({"head": {"vars": []}, "results": {"bindings": bindings}})
}

async fn mount_sparql(server: &MockServer, fragments: Vec<&'static str>, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/sparql"))
        .and(QueryContains(fragments))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_volume(server: &MockServer, title: &str, length: u64) {
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("titles", title))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": {"pages": {"1": {
                "title": title,
                "length": length,
                "touched": "2021-01-01T00:00:00Z",
                "lastrevid": 7
            }}}
        })))
        .mount(server)
        .await;
}

async fn mount_elink(server: &MockServer, gene: &str, first_pmid: u32, count: u32) {
    let pmids: Vec<String> = (first_pmid..first_pmid + count).map(|p| p.to_string()).collect();
    Mock::given(method("GET"))
        .and(path("/eutils/elink.fcgi"))
        .and(query_param("id", gene))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "linksets": [{
                "dbfrom": "gene",
                "ids": [gene],
                "linksetdbs": [{"dbto": "pubmed", "linkname": "gene_pubmed", "links": pmids}]
            }]
        })))
        .mount(server)
        .await;
}

const MEDLINE_RECORD: &str = "PMID- 1
DP  - 2015 Mar
FAU - Smith, Jane
AU  - Smith J
AD  - Department of Genetics, Example University. jane.smith@example.edu.
FAU - Doe, John
AU  - Doe J
";

/// Three genes with short articles, one with a long article, and one gene
/// without any article
///
/// | gene | article length | publications |
/// |------|----------------|--------------|
/// | 1    | 150            | 5            |
/// | 2    | 300            | 40           |
/// | 3    | 9500           | 31           |
/// | 4    | 12000          | -            |
async fn mount_scenario(server: &MockServer) {
    mount_sparql(
        server,
        vec!["FILTER NOT EXISTS", "?article schema:about ?item ."],
        sparql_body(vec![entity_binding("9"), entity_binding("10")]),
    )
    .await;
    mount_sparql(
        server,
        vec!["FILTER NOT EXISTS", "?article schema:about ?proteinwdid ."],
        sparql_body(vec![entity_binding("9"), entity_binding("11")]),
    )
    .await;
    mount_sparql(
        server,
        vec!["FILTER EXISTS", "?sitelink schema:about ?item ."],
        sparql_body(vec![
            link_binding("1", "https://en.wikipedia.org/wiki/GENE1"),
            link_binding("2", "https://en.wikipedia.org/wiki/GENE2"),
            link_binding("3", "https://en.wikipedia.org/wiki/GENE3"),
            link_binding("3", "https://fr.wikipedia.org/wiki/GENE3"),
            link_binding("4", "https://en.wikipedia.org/wiki/GENE4"),
        ]),
    )
    .await;
    mount_sparql(
        server,
        vec!["FILTER EXISTS", "?sitelink schema:about ?proteinwdid ."],
        sparql_body(vec![link_binding("2", "https://en.wikipedia.org/wiki/GENE2")]),
    )
    .await;

    mount_volume(server, "GENE1", 150).await;
    mount_volume(server, "GENE2", 300).await;
    mount_volume(server, "GENE3", 9500).await;
    mount_volume(server, "GENE4", 12000).await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/pageviews/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;

    mount_elink(server, "1", 1001, 5).await;
    mount_elink(server, "2", 2001, 40).await;
    mount_elink(server, "3", 3001, 31).await;

    // The first fetch of one citation fails; its retry succeeds
    Mock::given(method("GET"))
        .and(path("/eutils/efetch.fcgi"))
        .and(query_param("id", "2040"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/eutils/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(MEDLINE_RECORD))
        .mount(server)
        .await;
}

fn create_test_pipeline(config: Config, step: Step) -> Pipeline {
    let ledger = SqliteLedger::new_in_memory().expect("Failed to create ledger");
    Pipeline::with_ledger(config, Box::new(ledger), "test-hash", step)
        .expect("Failed to create pipeline")
}

#[tokio::test]
async fn test_full_pipeline_ranks_short_well_studied_genes() {
    let mock_server = MockServer::start().await;
    mount_scenario(&mock_server).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server, dir.path());
    let data_dir = dir.path().join("data");
    let result_dir = dir.path().join("results");

    let mut pipeline = create_test_pipeline(config, Step::All);
    pipeline.run(Step::All).await.expect("Pipeline failed");

    // Genes without either article
    let neither: Vec<ExternalEntityRef> =
        read_table(&result_dir.join(files::GENES_WITHOUT_ANY_ARTICLE)).unwrap();
    assert_eq!(neither.len(), 1);
    assert_eq!(neither[0].gene_id, "9");

    // Long article dropped, the rest ordered by length
    let sized: Vec<SizedArticle> = read_table(&result_dir.join(files::PRIORITY_BY_SIZE)).unwrap();
    let titles: Vec<&str> = sized.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["GENE1", "GENE2", "GENE3"]);

    // Every title without pageview data gets a sentinel
    let views: Vec<PageViewRecord> = read_table(&data_dir.join(files::PAGE_VIEWS)).unwrap();
    assert_eq!(views.len(), 4);
    assert!(views.iter().all(|v| v.is_no_data()));

    // The failed citation was recovered by the publication retry
    let pmid_failures: Vec<PmidFailure> = read_table(&data_dir.join(files::PMID_FAILURES)).unwrap();
    assert!(pmid_failures.is_empty());
    assert!(read_keys(&data_dir.join("gene_failures.txt")).unwrap().is_empty());

    // Gene 1 fails both filters; gene 2 outranks gene 3
    let by_score: Vec<GeneScore> = read_table(&result_dir.join(files::GENES_BY_SCORE)).unwrap();
    let genes: Vec<&str> = by_score.iter().map(|g| g.gene_id.as_str()).collect();
    assert_eq!(genes, vec!["2", "3"]);
    assert_eq!(by_score[0].pubcount, 40);
    assert_eq!(by_score[0].median_pub_year, 2015);
    assert!(by_score[0].priority_score > by_score[1].priority_score);

    let by_length: Vec<GeneScore> =
        read_table(&result_dir.join(files::GENES_BY_WIKI_LENGTH)).unwrap();
    assert_eq!(by_length[0].gene_id, "2");
    let by_pubcount: Vec<GeneScore> =
        read_table(&result_dir.join(files::GENES_BY_PUBCOUNT)).unwrap();
    assert_eq!(by_pubcount[0].gene_id, "2");

    // Both recurring authors are listed for gene 2 with every publication counted
    let authors: Vec<AuthorRollupRow> =
        read_table(&result_dir.join(files::POTENTIAL_AUTHORS)).unwrap();
    let gene2: Vec<&AuthorRollupRow> = authors.iter().filter(|a| a.gene_id == "2").collect();
    assert_eq!(gene2.len(), 2);
    assert!(gene2.iter().all(|a| a.count == 40));
    assert!(gene2
        .iter()
        .any(|a| a.email.as_deref() == Some("jane.smith@example.edu")));

    // The ledger saw the run through
    let run = pipeline.ledger().get_run(pipeline.run_id()).unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    let passes = pipeline.ledger().get_passes(pipeline.run_id()).unwrap();
    for stage in [
        Stage::KnowledgeGraph,
        Stage::WikiVolume,
        Stage::PageViews,
        Stage::GeneLiterature,
        Stage::PublicationDetail,
    ] {
        assert!(passes.iter().any(|p| p.stage == stage), "no pass for {}", stage);
    }
}

#[tokio::test]
async fn test_failed_titles_are_quarantined_and_resumed() {
    let mock_server = MockServer::start().await;
    mount_scenario(&mock_server).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let data_dir = dir.path().join("data");

    // Acquire the link tables
    let config = create_test_config(&mock_server, dir.path());
    let mut pipeline = create_test_pipeline(config, Step::KnowledgeGraph);
    pipeline.run(Step::KnowledgeGraph).await.unwrap();

    // Pretend an earlier run fetched GENE1 only and quarantined the rest
    let rows = vec![WikiVolumeRecord {
        title: "GENE1".to_string(),
        page_length: 150,
        last_touched: "2021-01-01T00:00:00Z".to_string(),
        last_revision_id: 7,
    }];
    write_table(&data_dir.join(files::WIKI_VOLUME), &rows).unwrap();
    write_keys(
        &data_dir.join("wiki_title_failures.txt"),
        &["GENE2".to_string(), "GENE3".to_string(), "Missing_title".to_string()],
    )
    .unwrap();

    let config = create_test_config(&mock_server, dir.path());
    let mut pipeline = create_test_pipeline(config, Step::WikiVolume).resume_from_disk(true);
    let sized = pipeline.wiki_volume().await.unwrap();

    // GENE4 was never listed as failed, so it is not fetched on resume
    let titles: Vec<&str> = sized.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["GENE1", "GENE2", "GENE3"]);

    // The unknown title fails every pass until the residual threshold is met
    let residual = read_keys(&data_dir.join("wiki_title_failures.txt")).unwrap();
    assert_eq!(residual, vec!["Missing_title".to_string()]);
}

#[tokio::test]
async fn test_scoring_without_literature_reports_missing_table() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    let mut pipeline =
        create_test_pipeline(create_test_config(&mock_server, dir.path()), Step::Prioritize);
    let result = pipeline.run(Step::Prioritize).await;

    assert!(result.is_err());
    let run = pipeline.ledger().get_run(pipeline.run_id()).unwrap();
    assert_eq!(run.status, RunStatus::Failed);
}

#[tokio::test]
async fn test_failed_existence_query_discards_stale_table() {
    let mock_server = MockServer::start().await;
    // Mounted first, so it wins over the scenario's answer for the same query
    Mock::given(method("GET"))
        .and(path("/sparql"))
        .and(QueryContains(vec![
            "FILTER NOT EXISTS",
            "?article schema:about ?item .",
        ]))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    mount_scenario(&mock_server).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let data_dir = dir.path().join("data");
    let result_dir = dir.path().join("results");

    // A set left behind by an earlier run
    let stale = vec![ExternalEntityRef {
        qid: "Q11".to_string(),
        label: "STALE".to_string(),
        gene_id: "11".to_string(),
        protein_id: "P11".to_string(),
    }];
    write_table(&data_dir.join(files::GENES_NO_WIKI), &stale).unwrap();

    let config = create_test_config(&mock_server, dir.path());
    let mut pipeline = create_test_pipeline(config, Step::All);
    let result = pipeline.run(Step::All).await;

    match result {
        Err(GeneWikiError::Incomplete { stage, failed }) => {
            assert_eq!(stage, Stage::KnowledgeGraph);
            assert_eq!(failed, vec![files::GENES_NO_WIKI.to_string()]);
        }
        other => panic!("expected an incomplete knowledge graph stage, got {:?}", other),
    }

    // The stale set is gone and nothing downstream was computed from it
    assert!(!data_dir.join(files::GENES_NO_WIKI).exists());
    assert!(data_dir.join(files::PROTEINS_NO_WIKI).exists());
    assert!(!result_dir.join(files::GENES_WITHOUT_ANY_ARTICLE).exists());
    assert!(!result_dir.join(files::PRIORITY_BY_SIZE).exists());

    let run = pipeline.ledger().get_run(pipeline.run_id()).unwrap();
    assert_eq!(run.status, RunStatus::Failed);
}

#[tokio::test]
async fn test_knowledge_graph_stage_writes_genes_without_any_article() {
    let mock_server = MockServer::start().await;
    mount_scenario(&mock_server).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server, dir.path());
    let mut pipeline = create_test_pipeline(config, Step::KnowledgeGraph);
    pipeline.run(Step::KnowledgeGraph).await.unwrap();

    let neither: Vec<ExternalEntityRef> = read_table(
        &dir.path()
            .join("results")
            .join(files::GENES_WITHOUT_ANY_ARTICLE),
    )
    .unwrap();
    let genes: Vec<&str> = neither.iter().map(|e| e.gene_id.as_str()).collect();
    assert_eq!(genes, vec!["9"]);
}

fn publication(gene_id: &str, pmid: &str) -> PublicationRecord {
    PublicationRecord {
        gene_id: gene_id.to_string(),
        pmid: pmid.to_string(),
        publication_date: "2012 Jan".to_string(),
        date_source: DateSource::ExplicitPublicationDate,
    }
}

fn earlier_author(pmid: &str) -> AuthorRecord {
    AuthorRecord {
        author_short_name: "Roe R".to_string(),
        author_full_name: "Roe, Richard".to_string(),
        affiliation: None,
        pmid: pmid.to_string(),
        publication_date: "2012 Jan".to_string(),
        email: None,
    }
}

/// Literature tables of an earlier run that finished gene 1 and quarantined gene 2
fn seed_literature(data_dir: &Path) {
    let publications: Vec<PublicationRecord> = ["1001", "1002", "1003"]
        .iter()
        .map(|pmid| publication("1", pmid))
        .collect();
    let authors: Vec<AuthorRecord> = ["1001", "1002", "1003"]
        .iter()
        .map(|pmid| earlier_author(pmid))
        .collect();

    write_table(&data_dir.join(files::PUBLICATION_DETAILS), &publications).unwrap();
    write_snapshot(&data_dir.join(files::AUTHOR_TABLE), &authors).unwrap();
    write_table(&data_dir.join(files::PMID_FAILURES), &Vec::<PmidFailure>::new()).unwrap();
    write_keys(&data_dir.join("gene_failures.txt"), &["2".to_string()]).unwrap();
}

fn assert_gene2_added_to_earlier_tables(data_dir: &Path) {
    // Earlier rows kept in front, gene 2 appended without its failed citation
    let publications: Vec<PublicationRecord> =
        read_table(&data_dir.join(files::PUBLICATION_DETAILS)).unwrap();
    assert_eq!(publications.len(), 3 + 39);
    assert_eq!(publications[0], publication("1", "1001"));
    assert_eq!(publications.iter().filter(|p| p.gene_id == "2").count(), 39);

    let authors: Vec<AuthorRecord> = read_snapshot(&data_dir.join(files::AUTHOR_TABLE)).unwrap();
    assert_eq!(authors.len(), 3 + 39 * 2);
    assert_eq!(authors[0], earlier_author("1001"));

    let pmid_failures: Vec<PmidFailure> =
        read_table(&data_dir.join(files::PMID_FAILURES)).unwrap();
    assert_eq!(
        pmid_failures,
        vec![PmidFailure {
            gene_id: "2".to_string(),
            pmid: "2040".to_string(),
        }]
    );

    assert!(read_keys(&data_dir.join("gene_failures.txt")).unwrap().is_empty());
}

#[tokio::test]
async fn test_retry_literature_extends_persisted_tables() {
    let mock_server = MockServer::start().await;
    mount_scenario(&mock_server).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let data_dir = dir.path().join("data");
    seed_literature(&data_dir);

    let config = create_test_config(&mock_server, dir.path());
    let mut pipeline = create_test_pipeline(config, Step::RetryLiterature);
    pipeline.run(Step::RetryLiterature).await.unwrap();

    assert_gene2_added_to_earlier_tables(&data_dir);
}

#[tokio::test]
async fn test_resumed_literature_skips_finished_genes() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/eutils/elink.fcgi"))
        .and(query_param("id", "1"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;
    mount_scenario(&mock_server).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let data_dir = dir.path().join("data");
    seed_literature(&data_dir);

    let sized: Vec<SizedArticle> = ["1", "2"]
        .iter()
        .map(|gene| SizedArticle {
            title: format!("GENE{}", gene),
            page_length: 300,
            last_touched: "2021-01-01T00:00:00Z".to_string(),
            last_revision_id: 7,
            gene_id: gene.to_string(),
            protein_id: format!("P{}", gene),
            wikilink: format!("https://en.wikipedia.org/wiki/GENE{}", gene),
        })
        .collect();
    write_table(&dir.path().join("results").join(files::PRIORITY_BY_SIZE), &sized).unwrap();

    let config = create_test_config(&mock_server, dir.path());
    let mut pipeline = create_test_pipeline(config, Step::Literature).resume_from_disk(true);
    pipeline.run(Step::Literature).await.unwrap();

    assert_gene2_added_to_earlier_tables(&data_dir);
}

#[tokio::test]
async fn test_retry_literature_requires_persisted_tables() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    let mut pipeline = create_test_pipeline(
        create_test_config(&mock_server, dir.path()),
        Step::RetryLiterature,
    );
    let result = pipeline.run(Step::RetryLiterature).await;

    assert!(matches!(
        result,
        Err(GeneWikiError::Storage(StorageError::MissingTable(_)))
    ));
}

#[tokio::test]
async fn test_page_views_rewrite_failure_list_when_nothing_to_fetch() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let data_dir = dir.path().join("data");

    write_table(
        &data_dir.join(files::GENE_PROTEIN_WIKILINKS),
        &Vec::<WikiLinkGroup>::new(),
    )
    .unwrap();
    write_keys(
        &data_dir.join("page_view_failures.txt"),
        &["Old_title".to_string()],
    )
    .unwrap();

    let config = create_test_config(&mock_server, dir.path());
    let mut pipeline = create_test_pipeline(config, Step::PageViews);
    let rows = pipeline.page_views().await.unwrap();

    assert!(rows.is_empty());
    assert!(read_keys(&data_dir.join("page_view_failures.txt"))
        .unwrap()
        .is_empty());
}
