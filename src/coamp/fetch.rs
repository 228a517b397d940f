use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;
use tracing::debug;

use super::error::{CoampError, CoampResult};
use super::graph::CoampGraph;
use super::parse::parse_graph;
use super::session::QueryContext;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub trait GraphSource: Send + Sync {
    fn fetch(&self, context: &QueryContext) -> CoampResult<CoampGraph>;

    fn describe(&self) -> String;
}

#[derive(Debug)]
pub struct HttpGraphSource {
    base: Url,
    client: Client,
}

impl HttpGraphSource {
    pub fn new(base: &str) -> CoampResult<Self> {
        let base = Url::parse(base.trim()).map_err(|error| {
            CoampError::InputInvalid(format!("invalid server url '{base}': {error}"))
        })?;
        if base.cannot_be_a_base() {
            return Err(CoampError::InputInvalid(format!(
                "server url '{base}' cannot carry a path"
            )));
        }
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|error| {
                CoampError::InputInvalid(format!("could not build http client: {error}"))
            })?;

        Ok(Self { base, client })
    }

    pub fn endpoint(&self, context: &QueryContext) -> CoampResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| {
                CoampError::InputInvalid(format!("server url '{}' cannot carry a path", self.base))
            })?
            .pop_if_empty()
            .extend(["coamplification-graph", "visualizer", context.gene.as_str(), ""]);

        url.query_pairs_mut()
            .append_pair("min_weight", &context.min_weight.to_string())
            .append_pair("min_samples", &context.min_samples.to_string())
            .append_pair("oncogenes", bool_param(context.oncogenes_only))
            .append_pair("all_edges", "false");

        Ok(url)
    }
}

fn bool_param(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

impl GraphSource for HttpGraphSource {
    fn fetch(&self, context: &QueryContext) -> CoampResult<CoampGraph> {
        let url = self.endpoint(context)?;
        debug!(%url, "requesting co-amplification graph");

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|error| CoampError::fetch_failed(&context.gene, error))?;
        let status = response.status();
        if !status.is_success() {
            return Err(CoampError::fetch_failed(
                &context.gene,
                format!("server responded with {status}"),
            ));
        }

        let body = response
            .text()
            .map_err(|error| CoampError::fetch_failed(&context.gene, error))?;
        parse_graph(&body)
    }

    fn describe(&self) -> String {
        self.base.to_string()
    }
}

#[derive(Debug)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl GraphSource for JsonFileSource {
    fn fetch(&self, context: &QueryContext) -> CoampResult<CoampGraph> {
        let text = fs::read_to_string(&self.path).map_err(|error| {
            CoampError::fetch_failed(
                &context.gene,
                format!("could not read {}: {error}", self.path.display()),
            )
        })?;
        parse_graph(&text)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
