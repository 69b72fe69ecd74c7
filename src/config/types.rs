use serde::Deserialize;

/// Main configuration structure for Genewiki-Priority
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub endpoints: EndpointConfig,
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    #[serde(default)]
    pub resume: ResumeConfig,
    #[serde(default)]
    pub pageviews: PageViewConfig,
    pub output: OutputConfig,
}

/// Client identification sent with every request
///
/// The contact email doubles as the `email` parameter required by the
/// literature index.
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    #[serde(rename = "client-name", default = "default_client_name")]
    pub client_name: String,

    #[serde(rename = "client-version", default = "default_client_version")]
    pub client_version: String,

    #[serde(rename = "contact-url", default)]
    pub contact_url: String,

    #[serde(rename = "contact-email", default)]
    pub contact_email: String,

    /// Full user-agent string; overrides the formatted name/version/contact
    #[serde(rename = "override", default)]
    pub override_string: Option<String>,

    /// Literature index API key (raises the per-second ceiling)
    #[serde(rename = "ncbi-api-key", default)]
    pub ncbi_api_key: Option<String>,
}

impl UserAgentConfig {
    /// Formats the user-agent header value
    ///
    /// Format: `ClientName/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        if let Some(custom) = &self.override_string {
            return custom.clone();
        }
        if self.contact_url.is_empty() {
            format!(
                "{}/{} ({})",
                self.client_name, self.client_version, self.contact_email
            )
        } else {
            format!(
                "{}/{} (+{}; {})",
                self.client_name, self.client_version, self.contact_url, self.contact_email
            )
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            client_name: default_client_name(),
            client_version: default_client_version(),
            contact_url: String::new(),
            contact_email: String::new(),
            override_string: None,
            ncbi_api_key: None,
        }
    }
}

fn default_client_name() -> String {
    "genewiki-priority".to_string()
}

fn default_client_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// HTTP retry, timeout and pacing behaviour
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Retries after the first attempt
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Seconds multiplied by 2^(attempt-1) before each retry
    #[serde(rename = "backoff-factor")]
    pub backoff_factor: f64,

    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Status codes that trigger a retry
    #[serde(rename = "retry-statuses")]
    pub retry_statuses: Vec<u16>,

    /// Minimum spacing between wiki requests (milliseconds)
    #[serde(rename = "wiki-delay-ms")]
    pub wiki_delay_ms: u64,

    /// Minimum spacing between literature-index requests (milliseconds)
    #[serde(rename = "literature-delay-ms")]
    pub literature_delay_ms: u64,

    /// Items in flight per pass; 1 keeps the pipeline strictly sequential
    pub concurrency: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_factor: 1.0,
            timeout_secs: 25,
            connect_timeout_secs: 10,
            retry_statuses: vec![429, 500, 502, 503, 504],
            wiki_delay_ms: 1000,
            literature_delay_ms: 500,
            concurrency: 1,
        }
    }
}

/// Upstream service locations
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    #[serde(rename = "sparql-url")]
    pub sparql_url: String,

    #[serde(rename = "wiki-api-url")]
    pub wiki_api_url: String,

    /// Base of the per-article pageviews route (without project)
    #[serde(rename = "pageviews-url")]
    pub pageviews_url: String,

    /// Base of the E-utilities routes (elink.fcgi / efetch.fcgi are appended)
    #[serde(rename = "eutils-url")]
    pub eutils_url: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            sparql_url: "https://query.wikidata.org/sparql".to_string(),
            wiki_api_url: "https://en.wikipedia.org/w/api.php".to_string(),
            pageviews_url: "https://wikimedia.org/api/rest_v1/metrics/pageviews/per-article"
                .to_string(),
            eutils_url: "https://eutils.ncbi.nlm.nih.gov/entrez/eutils".to_string(),
        }
    }
}

/// Numeric gates and scoring constants
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Articles at or above this length are considered comprehensive
    #[serde(rename = "max-page-length")]
    pub max_page_length: u64,

    /// Genes need more linked publications than this before details are fetched
    #[serde(rename = "min-linked-publications")]
    pub min_linked_publications: usize,

    #[serde(rename = "min-pubcount")]
    pub min_pubcount: u64,

    #[serde(rename = "min-page-length")]
    pub min_page_length: u64,

    #[serde(rename = "top-n")]
    pub top_n: usize,

    #[serde(rename = "length-numerator")]
    pub length_numerator: f64,

    #[serde(rename = "pubcount-divisor")]
    pub pubcount_divisor: f64,

    /// Authors must appear on more than this many of a gene's publications
    #[serde(rename = "min-author-gene-count")]
    pub min_author_gene_count: usize,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            max_page_length: 10_000,
            min_linked_publications: 30,
            min_pubcount: 30,
            min_page_length: 200,
            top_n: 500,
            length_numerator: 10_000.0,
            pubcount_divisor: 2_800.0,
            min_author_gene_count: 2,
        }
    }
}

/// Termination policy for iterative resume
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResumeConfig {
    /// Stop once fewer residual failures than this remain
    #[serde(rename = "residual-threshold")]
    pub residual_threshold: usize,

    /// Hard cap on passes, including the first
    #[serde(rename = "max-passes")]
    pub max_passes: u32,
}

impl Default for ResumeConfig {
    fn default() -> Self {
        Self {
            residual_threshold: 2,
            max_passes: 5,
        }
    }
}

/// Pageview query parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PageViewConfig {
    pub project: String,
    pub access: String,
    pub agent: String,
    pub granularity: String,
    /// YYYYMMDD or YYYYMMDDHH
    pub start: String,
    pub end: String,
}

impl Default for PageViewConfig {
    fn default() -> Self {
        Self {
            project: "en.wikipedia".to_string(),
            access: "all-access".to_string(),
            agent: "user".to_string(),
            granularity: "monthly".to_string(),
            start: "20200101".to_string(),
            end: "20201231".to_string(),
        }
    }
}

/// Output locations
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Intermediate tables and failure lists
    #[serde(rename = "data-dir")]
    pub data_dir: String,

    /// Ranked outputs and the markdown summary
    #[serde(rename = "result-dir")]
    pub result_dir: String,

    /// SQLite run ledger
    #[serde(rename = "ledger-path")]
    pub ledger_path: String,
}
