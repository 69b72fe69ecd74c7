//! Pipeline coordinator - stage orchestration
//!
//! This module drives the acquisition and correlation stages, including:
//! - Opening the run ledger and recording each run and pass
//! - Running every per-item stage through the quarantine
//! - Persisting tables and residual failure lists after each pass
//! - Reloading persisted state to resume on the failed subset

use crate::config::Config;
use crate::fetch::{
    ExistenceQuery, FetchClient, KnowledgeGraph, LiteratureCredentials, LiteratureIndex, Pacer,
    WikiMetrics,
};
use crate::merge::{
    below_length_threshold, genes_without_any_article, inner_join_on_title, union_dedup,
    unique_titles,
};
use crate::pipeline::{files, Step};
use crate::quarantine::{
    resume_until_settled, run_pass, Accumulator, LiteratureTables, PassSummary, ResumePolicy,
};
use crate::records::{
    ExternalEntityRef, PageViewRecord, PmidFailure, PublicationRecord, SizedArticle,
    WikiLinkGroup, WikiLinkRecord, WikiVolumeRecord,
};
use crate::score::{author_rollup, prioritize, summarize_publications, Rankings};
use crate::state::{RunStatus, Stage};
use crate::storage::{
    open_ledger, read_keys, read_snapshot, read_table, write_keys, write_snapshot, write_table,
    RunLedger,
};
use crate::{FetchError, FetchResult, GeneWikiError};
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Rows returned by one knowledge-graph query
#[derive(Debug)]
enum QueryRows {
    Entities(Vec<ExternalEntityRef>),
    Links(Vec<WikiLinkRecord>),
}

async fn fetch_query(
    knowledge_graph: &KnowledgeGraph,
    name: String,
) -> FetchResult<(ExistenceQuery, QueryRows)> {
    let query = ExistenceQuery::from_file_name(&name).ok_or_else(|| FetchError::Malformed {
        item: name.clone(),
        reason: "unknown existence query".to_string(),
    })?;

    let rows = if query.has_links() {
        QueryRows::Links(knowledge_graph.wiki_links(query).await?)
    } else {
        QueryRows::Entities(knowledge_graph.entities(query).await?)
    };
    Ok((query, rows))
}

/// Distinct values in first-appearance order
fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

fn record_pass(
    ledger: &mut dyn RunLedger,
    run_id: i64,
    summary: &PassSummary,
) -> crate::Result<()> {
    ledger.record_pass(run_id, summary)?;
    Ok(())
}

/// Main pipeline coordinator structure
pub struct Pipeline {
    config: Config,
    data_dir: PathBuf,
    result_dir: PathBuf,
    knowledge_graph: KnowledgeGraph,
    wiki: WikiMetrics,
    literature: LiteratureIndex,
    policy: ResumePolicy,
    ledger: Box<dyn RunLedger>,
    run_id: i64,
    resume: bool,
}

impl Pipeline {
    /// Creates a pipeline backed by the ledger at `output.ledger-path`
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    /// * `config_hash` - Hash of the configuration file, recorded with the run
    /// * `step` - The step this run executes
    pub fn new(config: Config, config_hash: &str, step: Step) -> crate::Result<Self> {
        let ledger = open_ledger(Path::new(&config.output.ledger_path))?;
        Self::with_ledger(config, Box::new(ledger), config_hash, step)
    }

    /// Creates a pipeline with an explicit ledger
    pub fn with_ledger(
        config: Config,
        mut ledger: Box<dyn RunLedger>,
        config_hash: &str,
        step: Step,
    ) -> crate::Result<Self> {
        if let Some(latest) = ledger.get_latest_run()? {
            if latest.status == RunStatus::Running {
                tracing::warn!(
                    "Run {} ({}) started at {} never finished; persisted tables will be reused where resuming",
                    latest.id,
                    latest.stage,
                    latest.started_at
                );
            }
        }

        let http = FetchClient::new(&config.user_agent, &config.fetch)?;
        let knowledge_graph = KnowledgeGraph::new(http.clone(), config.endpoints.sparql_url.as_str());
        let wiki = WikiMetrics::new(
            http.clone(),
            config.endpoints.wiki_api_url.as_str(),
            config.endpoints.pageviews_url.as_str(),
            config.pageviews.clone(),
            Pacer::from_millis(config.fetch.wiki_delay_ms),
        );
        let literature = LiteratureIndex::new(
            http,
            config.endpoints.eutils_url.as_str(),
            LiteratureCredentials {
                tool: config.user_agent.client_name.clone(),
                email: config.user_agent.contact_email.clone(),
                api_key: config.user_agent.ncbi_api_key.clone(),
            },
            config.thresholds.min_linked_publications,
            Pacer::from_millis(config.fetch.literature_delay_ms),
        );

        let run_id = ledger.create_run(config_hash, step.name())?;
        tracing::info!("Starting run {} ({})", run_id, step.name());

        Ok(Self {
            data_dir: PathBuf::from(&config.output.data_dir),
            result_dir: PathBuf::from(&config.output.result_dir),
            policy: ResumePolicy::from_config(&config.resume, &config.fetch),
            config,
            knowledge_graph,
            wiki,
            literature,
            ledger,
            run_id,
            resume: false,
        })
    }

    /// Reload persisted tables and failure lists instead of starting stages fresh
    pub fn resume_from_disk(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }

    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    pub fn ledger(&self) -> &dyn RunLedger {
        self.ledger.as_ref()
    }

    fn data_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }

    fn result_path(&self, name: &str) -> PathBuf {
        self.result_dir.join(name)
    }

    fn failure_path(&self, stage: Stage) -> PathBuf {
        self.data_dir
            .join(stage.failure_file().unwrap_or("failures.txt"))
    }

    /// Runs one step and closes the run in the ledger
    pub async fn run(&mut self, step: Step) -> crate::Result<()> {
        let result = match step {
            Step::All => self.run_all().await,
            Step::KnowledgeGraph => self.knowledge_graph().await.map(|_| ()),
            Step::WikiVolume => self.wiki_volume().await.map(|_| ()),
            Step::PageViews => self.page_views().await.map(|_| ()),
            Step::Literature => self.literature().await.map(|_| ()),
            Step::RetryLiterature => self.retry_literature().await.map(|_| ()),
            Step::RetryPublications => self.retry_publications().await.map(|_| ()),
            Step::Prioritize => self.prioritize().map(|_| ()),
            Step::Authors => self.authors().map(|_| ()),
        };

        match &result {
            Ok(()) => {
                self.ledger.complete_run(self.run_id)?;
                tracing::info!("Run {} completed", self.run_id);
            }
            Err(e) => {
                tracing::error!("Run {} failed: {}", self.run_id, e);
                self.ledger
                    .update_run_status(self.run_id, RunStatus::Failed)?;
            }
        }
        result
    }

    /// Runs every stage in order
    pub async fn run_all(&mut self) -> crate::Result<()> {
        self.knowledge_graph().await?;
        self.wiki_volume().await?;
        self.page_views().await?;
        self.literature().await?;

        let pmid_failures: Vec<PmidFailure> = read_table(&self.data_path(files::PMID_FAILURES))?;
        if !pmid_failures.is_empty() {
            self.retry_publications().await?;
        }

        self.prioritize()?;
        self.authors()?;
        Ok(())
    }

    /// Runs the four existence queries, persists each result set and writes
    /// the genes without any article
    ///
    /// A failed query removes its table, so a set left by an earlier run is
    /// never mixed with fresh ones, and the stage fails naming the queries.
    pub async fn knowledge_graph(&mut self) -> crate::Result<Vec<ExternalEntityRef>> {
        tracing::info!("Querying the knowledge graph");

        let keys: Vec<String> = ExistenceQuery::all()
            .iter()
            .map(|q| q.file_name().to_string())
            .collect();
        let knowledge_graph = &self.knowledge_graph;
        let outcome = run_pass(Stage::KnowledgeGraph, &keys, 1, |name| {
            fetch_query(knowledge_graph, name)
        })
        .await;

        let summary = PassSummary {
            stage: Stage::KnowledgeGraph,
            pass_number: 1,
            attempted: outcome.attempted(),
            succeeded: outcome.successes.len(),
            failed: outcome.failures.len(),
        };

        for (query, rows) in &outcome.successes {
            let path = self.data_path(query.file_name());
            match rows {
                QueryRows::Entities(rows) => write_table(&path, rows)?,
                QueryRows::Links(rows) => write_table(&path, rows)?,
            }
        }

        let failed = outcome.failed_keys();
        for name in &failed {
            let path = self.data_path(name);
            if path.exists() {
                tracing::warn!("Removing stale {}", path.display());
                std::fs::remove_file(&path)?;
            }
        }
        record_pass(self.ledger.as_mut(), self.run_id, &summary)?;

        if !failed.is_empty() {
            return Err(GeneWikiError::Incomplete {
                stage: Stage::KnowledgeGraph,
                failed,
            });
        }
        self.filter_no_wikis()
    }

    /// Genes with neither a gene nor a protein article
    pub fn filter_no_wikis(&self) -> crate::Result<Vec<ExternalEntityRef>> {
        let genes: Vec<ExternalEntityRef> = read_table(&self.data_path(files::GENES_NO_WIKI))?;
        let proteins: Vec<ExternalEntityRef> =
            read_table(&self.data_path(files::PROTEINS_NO_WIKI))?;

        let neither = genes_without_any_article(&genes, &proteins);
        tracing::info!(
            "{} genes without a gene article, {} without a protein article, {} without either",
            genes.len(),
            proteins.len(),
            neither.len()
        );

        write_table(&self.result_path(files::GENES_WITHOUT_ANY_ARTICLE), &neither)?;
        Ok(neither)
    }

    /// Gene-side and protein-side links, unioned and deduplicated
    fn link_groups(&self) -> crate::Result<Vec<WikiLinkGroup>> {
        let gene_links: Vec<WikiLinkRecord> = read_table(&self.data_path(files::GENES_EN_WIKI))?;
        let protein_links: Vec<WikiLinkRecord> =
            read_table(&self.data_path(files::PROTEINS_EN_WIKI))?;

        let groups = union_dedup(&gene_links, &protein_links);
        write_table(&self.data_path(files::GENE_PROTEIN_WIKILINKS), &groups)?;
        Ok(groups)
    }

    /// Rows and residual failure keys persisted by an earlier run
    ///
    /// None unless resuming and the stage's table exists.
    fn persisted<R: DeserializeOwned>(
        &self,
        stage: Stage,
        table: &Path,
    ) -> crate::Result<Option<(Vec<R>, Vec<String>)>> {
        if !self.resume || !table.exists() {
            return Ok(None);
        }
        let rows: Vec<R> = read_table(table)?;
        let residual = read_keys(&self.failure_path(stage))?;
        tracing::info!(
            "[{}] resuming: {} rows on disk, {} residual failures",
            stage,
            rows.len(),
            residual.len()
        );
        Ok(Some((rows, residual)))
    }

    /// Fetches article length for every linked title and builds the
    /// priority-by-size table
    pub async fn wiki_volume(&mut self) -> crate::Result<Vec<SizedArticle>> {
        let groups = self.link_groups()?;
        let titles = unique_titles(&groups);
        tracing::info!(
            "{} link groups, {} unique titles",
            groups.len(),
            titles.len()
        );

        let table = self.data_path(files::WIKI_VOLUME);
        let failures = self.failure_path(Stage::WikiVolume);
        let mut acc: Accumulator<Vec<WikiVolumeRecord>> =
            match self.persisted(Stage::WikiVolume, &table)? {
                Some((rows, residual)) => Accumulator::resume(rows, residual),
                None => Accumulator::pending(titles),
            };

        let wiki = &self.wiki;
        let ledger = self.ledger.as_mut();
        let run_id = self.run_id;
        resume_until_settled(
            Stage::WikiVolume,
            &mut acc,
            self.policy,
            |title| async move { wiki.volume(&title).await },
            |acc, summary| -> crate::Result<()> {
                write_table(&table, &acc.results)?;
                write_keys(&failures, &acc.residual_keys())?;
                record_pass(&mut *ledger, run_id, summary)
            },
        )
        .await?;
        write_table(&table, &acc.results)?;
        write_keys(&failures, &acc.residual_keys())?;

        let short = below_length_threshold(&acc.results, self.config.thresholds.max_page_length);
        let sized = inner_join_on_title(&short, &groups);
        tracing::info!(
            "{} of {} articles are shorter than {}; {} gene rows",
            short.len(),
            acc.results.len(),
            self.config.thresholds.max_page_length,
            sized.len()
        );

        write_table(&self.result_path(files::PRIORITY_BY_SIZE), &sized)?;
        Ok(sized)
    }

    /// Fetches the pageview series for every linked title
    pub async fn page_views(&mut self) -> crate::Result<Vec<PageViewRecord>> {
        let groups: Vec<WikiLinkGroup> =
            read_table(&self.data_path(files::GENE_PROTEIN_WIKILINKS))?;
        let titles = unique_titles(&groups);

        let table = self.data_path(files::PAGE_VIEWS);
        let failures = self.failure_path(Stage::PageViews);
        let mut acc: Accumulator<Vec<Vec<PageViewRecord>>> =
            match self.persisted(Stage::PageViews, &table)? {
                Some((rows, residual)) => Accumulator::resume(vec![rows], residual),
                None => Accumulator::pending(titles),
            };

        let wiki = &self.wiki;
        let ledger = self.ledger.as_mut();
        let run_id = self.run_id;
        resume_until_settled(
            Stage::PageViews,
            &mut acc,
            self.policy,
            |title| async move { wiki.page_views(&title).await },
            |acc, summary| -> crate::Result<()> {
                let rows: Vec<PageViewRecord> = acc.results.iter().flatten().cloned().collect();
                write_table(&table, &rows)?;
                write_keys(&failures, &acc.residual_keys())?;
                record_pass(&mut *ledger, run_id, summary)
            },
        )
        .await?;

        write_keys(&failures, &acc.residual_keys())?;
        let rows: Vec<PageViewRecord> = acc.into_results().into_iter().flatten().collect();
        write_table(&table, &rows)?;
        let without_data = rows.iter().filter(|r| r.is_no_data()).count();
        tracing::info!(
            "{} pageview rows, {} titles without data",
            rows.len(),
            without_data
        );
        Ok(rows)
    }

    /// Genes of the priority-by-size table, in table order
    fn literature_genes(&self) -> crate::Result<Vec<String>> {
        let articles: Vec<SizedArticle> = read_table(&self.result_path(files::PRIORITY_BY_SIZE))?;
        Ok(distinct(articles.iter().map(|a| a.gene_id.as_str())))
    }

    fn load_literature(&self) -> crate::Result<LiteratureTables> {
        Ok(LiteratureTables {
            publications: read_table(&self.data_path(files::PUBLICATION_DETAILS))?,
            authors: read_snapshot(&self.data_path(files::AUTHOR_TABLE))?,
            pmid_failures: read_table(&self.data_path(files::PMID_FAILURES))?,
        })
    }

    fn write_literature(&self, tables: &LiteratureTables) -> crate::Result<()> {
        write_literature_tables(&self.data_dir, tables)
    }

    /// Fetches publications and authors for every gene of the
    /// priority-by-size table
    pub async fn literature(&mut self) -> crate::Result<LiteratureTables> {
        let genes = self.literature_genes()?;
        let acc = if self.resume && self.data_path(files::PUBLICATION_DETAILS).exists() {
            let residual = read_keys(&self.failure_path(Stage::GeneLiterature))?;
            Accumulator::resume(self.load_literature()?, residual)
        } else {
            Accumulator::pending(genes)
        };
        self.run_literature(acc).await
    }

    /// Re-runs the genes listed in the residual failure file on top of the
    /// persisted literature tables
    pub async fn retry_literature(&mut self) -> crate::Result<LiteratureTables> {
        let tables = self.load_literature()?;
        let residual = read_keys(&self.failure_path(Stage::GeneLiterature))?;
        tracing::info!("Retrying {} genes", residual.len());
        self.run_literature(Accumulator::resume(tables, residual))
            .await
    }

    async fn run_literature(
        &mut self,
        mut acc: Accumulator<LiteratureTables>,
    ) -> crate::Result<LiteratureTables> {
        let data_dir = self.data_dir.clone();
        let failures = self.failure_path(Stage::GeneLiterature);
        let literature = &self.literature;
        let ledger = self.ledger.as_mut();
        let run_id = self.run_id;

        resume_until_settled(
            Stage::GeneLiterature,
            &mut acc,
            self.policy,
            |gene_id| async move { literature.gene(&gene_id).await },
            |acc, summary| -> crate::Result<()> {
                write_literature_tables(&data_dir, &acc.results)?;
                write_keys(&failures, &acc.residual_keys())?;
                record_pass(&mut *ledger, run_id, summary)
            },
        )
        .await?;
        write_literature_tables(&data_dir, &acc.results)?;
        write_keys(&failures, &acc.residual_keys())?;

        let tables = acc.into_results();
        tracing::info!(
            "{} publications, {} author rows, {} publication failures",
            tables.publications.len(),
            tables.authors.len(),
            tables.pmid_failures.len()
        );
        Ok(tables)
    }

    /// Re-fetches the citations that failed inside otherwise successful genes
    ///
    /// Recovered citations are attached to every gene that was missing them;
    /// the remaining failures replace the publication failure table.
    pub async fn retry_publications(&mut self) -> crate::Result<LiteratureTables> {
        let mut tables = self.load_literature()?;
        let pmids = distinct(tables.pmid_failures.iter().map(|f| f.pmid.as_str()));
        tracing::info!(
            "Retrying {} publications ({} gene/publication pairs)",
            pmids.len(),
            tables.pmid_failures.len()
        );

        let literature = &self.literature;
        let outcome = run_pass(
            Stage::PublicationDetail,
            &pmids,
            self.policy.concurrency,
            |pmid| async move { literature.citation(&pmid).await },
        )
        .await;

        let summary = PassSummary {
            stage: Stage::PublicationDetail,
            pass_number: 1,
            attempted: outcome.attempted(),
            succeeded: outcome.successes.len(),
            failed: outcome.failures.len(),
        };

        let mut genes_by_pmid: HashMap<&str, Vec<&str>> = HashMap::new();
        for failure in &tables.pmid_failures {
            genes_by_pmid
                .entry(failure.pmid.as_str())
                .or_default()
                .push(failure.gene_id.as_str());
        }

        let known_author_pmids: HashSet<String> =
            tables.authors.iter().map(|a| a.pmid.clone()).collect();
        let mut publications: Vec<PublicationRecord> = Vec::new();
        let mut authors = Vec::new();
        for citation in &outcome.successes {
            for gene_id in genes_by_pmid.get(citation.pmid.as_str()).into_iter().flatten() {
                publications.push(citation.publication_for(gene_id));
            }
            if !known_author_pmids.contains(&citation.pmid) {
                authors.extend(citation.authors.iter().cloned());
            }
        }

        let still_failing: HashSet<String> = outcome.failed_keys().into_iter().collect();
        tables.publications.extend(publications);
        tables.authors.extend(authors);
        tables
            .pmid_failures
            .retain(|f| still_failing.contains(&f.pmid));

        self.write_literature(&tables)?;
        record_pass(self.ledger.as_mut(), self.run_id, &summary)?;

        tracing::info!(
            "Recovered {} publications, {} still failing",
            outcome.successes.len(),
            still_failing.len()
        );
        Ok(tables)
    }

    /// Scores every gene and writes the three rankings
    pub fn prioritize(&self) -> crate::Result<Rankings> {
        let articles: Vec<SizedArticle> = read_table(&self.result_path(files::PRIORITY_BY_SIZE))?;
        let publications: Vec<PublicationRecord> =
            read_table(&self.data_path(files::PUBLICATION_DETAILS))?;

        let summaries = summarize_publications(&publications);
        let rankings = prioritize(&articles, &summaries, &self.config.thresholds);

        write_table(&self.result_path(files::GENES_BY_SCORE), &rankings.by_score)?;
        write_table(
            &self.result_path(files::GENES_BY_WIKI_LENGTH),
            &rankings.by_length,
        )?;
        write_table(
            &self.result_path(files::GENES_BY_PUBCOUNT),
            &rankings.by_pubcount,
        )?;

        tracing::info!(
            "{} genes summarized, {} ranked",
            summaries.len(),
            rankings.by_score.len()
        );
        Ok(rankings)
    }

    /// Writes the frequent authors of each gene
    pub fn authors(&self) -> crate::Result<usize> {
        let publications: Vec<PublicationRecord> =
            read_table(&self.data_path(files::PUBLICATION_DETAILS))?;
        let authors = read_snapshot(&self.data_path(files::AUTHOR_TABLE))?;

        let rows = author_rollup(
            &publications,
            &authors,
            self.config.thresholds.min_author_gene_count,
        );
        write_table(&self.result_path(files::POTENTIAL_AUTHORS), &rows)?;

        tracing::info!("{} potential author rows", rows.len());
        Ok(rows.len())
    }
}

/// Persists the three literature tables
fn write_literature_tables(data_dir: &Path, tables: &LiteratureTables) -> crate::Result<()> {
    write_table(
        &data_dir.join(files::PUBLICATION_DETAILS),
        &tables.publications,
    )?;
    write_table(&data_dir.join(files::PMID_FAILURES), &tables.pmid_failures)?;
    write_snapshot(&data_dir.join(files::AUTHOR_TABLE), &tables.authors)?;
    Ok(())
}
