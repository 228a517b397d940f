use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::info;

use super::error::{CoampError, CoampResult};
use super::graph::{CoampGraph, EdgeLookup, TestName, TestStats, weight_desc};

pub const HEADER: [&str; 18] = [
    "Gene Name",
    "Oncogene",
    "Gene ecDNA Count",
    "Intersection Count",
    "Coamplification Frequency",
    "Location",
    "Distance (bp)",
    "P-Value Single Interval Test",
    "Q-value Single Interval Test",
    "Odds Ratio Single Interval Test",
    "P-Value Multi Interval Test",
    "Q-value Multi Interval Test",
    "Odds Ratio Multi Interval Test",
    "P-Value Multi Chromosomal Test",
    "Q-value Multi Chromosomal Test",
    "Odds Ratio Multi Chromosomal Test",
    "Gene ecDNA Samples",
    "Intersection Samples",
];

const NOT_APPLICABLE: &str = "N/A";

#[derive(Clone, Debug, PartialEq)]
pub struct ExportRow {
    pub gene: String,
    pub oncogene: bool,
    pub samples: Vec<String>,
    pub location: Option<String>,
    pub link: Option<EdgeColumns>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeColumns {
    pub weight: Option<f64>,
    pub intersection: Vec<String>,
    pub distance_bp: Option<u64>,
    pub tests: [TestStats; 3],
}

impl ExportRow {
    pub fn weight(&self) -> Option<f64> {
        self.link.as_ref().and_then(|link| link.weight)
    }

    pub fn fields(&self) -> Vec<String> {
        let link = self.link.as_ref();
        let mut fields = Vec::with_capacity(HEADER.len());

        fields.push(self.gene.clone());
        fields.push(if self.oncogene { "True" } else { "False" }.to_owned());
        fields.push(self.samples.len().to_string());
        fields.push(or_na(link.map(|link| link.intersection.len().to_string())));
        fields.push(fixed(link.and_then(|link| link.weight)));
        fields.push(or_na(self.location.clone()));
        fields.push(or_na(
            link.and_then(|link| link.distance_bp)
                .map(|distance| distance.to_string()),
        ));
        for test in TestName::ALL {
            let stats = link.map(|link| link.tests[test.index()]);
            fields.push(fixed(stats.and_then(|stats| stats.p_value)));
            fields.push(fixed(stats.and_then(|stats| stats.q_value)));
            fields.push(fixed(stats.and_then(|stats| stats.odds_ratio)));
        }
        fields.push(list_literal(&self.samples));
        fields.push(or_na(link.map(|link| list_literal(&link.intersection))));

        fields
    }
}

fn or_na(value: Option<String>) -> String {
    value.unwrap_or_else(|| NOT_APPLICABLE.to_owned())
}

fn fixed(value: Option<f64>) -> String {
    or_na(value.map(|value| format!("{value:.3}")))
}

fn list_literal(items: &[String]) -> String {
    let quoted = items
        .iter()
        .map(|item| Value::String(item.clone()).to_string())
        .collect::<Vec<_>>();
    format!("[{}]", quoted.join(", "))
}

pub fn export_rows(graph: &CoampGraph, query_gene: &str) -> CoampResult<Vec<ExportRow>> {
    if query_gene.trim().is_empty() {
        return Err(CoampError::IncompleteData(
            "No query gene selected. Please load a graph first.".to_owned(),
        ));
    }
    if graph.node_count() == 0 {
        return Err(CoampError::IncompleteData(
            "No graph data available. Please load a graph first.".to_owned(),
        ));
    }
    let query = graph.node_by_label(query_gene).ok_or_else(|| {
        CoampError::IncompleteData(format!(
            "Gene {query_gene} is not part of the loaded graph."
        ))
    })?;

    let lookup = EdgeLookup::new(graph);
    let mut rows = graph
        .nodes()
        .iter()
        .filter(|node| node.id != query.id)
        .map(|node| {
            let link = lookup.between(&node.id, &query.id).map(|edge| EdgeColumns {
                weight: edge.weight,
                intersection: edge.inter.clone(),
                distance_bp: edge.distance_bp,
                tests: edge.tests,
            });
            ExportRow {
                gene: node.label.clone(),
                oncogene: node.oncogene,
                samples: node.samples.clone(),
                location: node.location.as_ref().map(ToString::to_string),
                link,
            }
        })
        .collect::<Vec<_>>();
    rows.sort_by(|a, b| weight_desc(a.weight(), b.weight()));

    rows.insert(
        0,
        ExportRow {
            gene: query.label.clone(),
            oncogene: query.oncogene,
            samples: query.samples.clone(),
            location: query.location.as_ref().map(ToString::to_string),
            link: None,
        },
    );

    Ok(rows)
}

pub fn serialize(rows: &[ExportRow]) -> CoampResult<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(HEADER)?;
    for row in rows {
        writer.write_record(row.fields())?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| CoampError::IncompleteData(error.to_string()))?;
    String::from_utf8(bytes).map_err(|error| CoampError::IncompleteData(error.to_string()))
}

pub fn export_file_name(query_gene: &str, at: DateTime<Utc>) -> String {
    format!(
        "AACoampGraph_{query_gene}_{}.csv",
        at.format("%Y-%m-%d_%H-%M-%S")
    )
}

pub fn write_export(dir: &Path, graph: &CoampGraph, query_gene: &str) -> CoampResult<PathBuf> {
    let rows = export_rows(graph, query_gene)?;
    let text = serialize(&rows)?;

    fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(query_gene, Utc::now()));
    fs::write(&path, text)?;

    info!(path = %path.display(), rows = rows.len(), "wrote co-amplification export");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::super::parse::graph_from_value;
    use super::*;

    fn neighbourhood() -> CoampGraph {
        graph_from_value(json!({
            "nodes": [
                {"data": {"id": "CCAT1", "label": "CCAT1", "oncogene": "False",
                          "features": ["s3"]}},
                {"data": {"id": "MYC", "label": "MYC", "oncogene": "True",
                          "location": "chr8:127735434-127742951",
                          "features": ["s1", "s2", "s3"]}},
                {"data": {"id": "PVT1", "label": "PVT1", "oncogene": "False",
                          "features": ["s1", "s2"]}},
                {"data": {"id": "LONE", "label": "LONE", "features": []}}
            ],
            "edges": [
                {"data": {"source": "MYC", "target": "CCAT1", "weight": 0.3333,
                          "inter": ["s3"], "union": ["s1", "s2", "s3"], "distance": -1,
                          "pval_single_interval": -1, "qval_single_interval": -1,
                          "odds_ratio_single_interval": -1}},
                {"data": {"source": "PVT1", "target": "MYC", "weight": 0.6667,
                          "inter": ["s1", "s2"], "union": ["s1", "s2", "s3"],
                          "distance": 51582,
                          "pval_single_interval": 0.00012, "qval_single_interval": 0.0049,
                          "odds_ratio_single_interval": 14.25}}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn query_gene_is_pinned_first() {
        let rows = export_rows(&neighbourhood(), "MYC").unwrap();
        let genes = rows.iter().map(|row| row.gene.as_str()).collect::<Vec<_>>();
        assert_eq!(genes, vec!["MYC", "PVT1", "CCAT1", "LONE"]);
    }

    #[test]
    fn pinning_holds_for_any_query() {
        let graph = neighbourhood();
        for gene in ["MYC", "PVT1", "CCAT1", "LONE"] {
            let rows = export_rows(&graph, gene).unwrap();
            assert_eq!(rows[0].gene, gene);
            assert_eq!(rows.len(), graph.node_count());
        }
    }

    #[test]
    fn renders_fixed_precision_and_not_applicable() {
        let rows = export_rows(&neighbourhood(), "MYC").unwrap();

        let pvt1 = rows[1].fields();
        assert_eq!(pvt1[0], "PVT1");
        assert_eq!(pvt1[1], "False");
        assert_eq!(pvt1[2], "2");
        assert_eq!(pvt1[3], "2");
        assert_eq!(pvt1[4], "0.667");
        assert_eq!(pvt1[5], "N/A");
        assert_eq!(pvt1[6], "51582");
        assert_eq!(&pvt1[7..10], &["0.000", "0.005", "14.250"]);
        assert!(pvt1[10..16].iter().all(|cell| cell == "N/A"));
        assert_eq!(pvt1[16], r#"["s1", "s2"]"#);
        assert_eq!(pvt1[17], r#"["s1", "s2"]"#);

        let ccat1 = rows[2].fields();
        assert_eq!(ccat1[4], "0.333");
        assert_eq!(ccat1[6], "N/A");
        assert!(ccat1[7..16].iter().all(|cell| cell == "N/A"));

        let myc = rows[0].fields();
        assert_eq!(myc[1], "True");
        assert_eq!(myc[3], "N/A");
        assert_eq!(myc[4], "N/A");
        assert_eq!(myc[5], "chr8:127735434-127742951");
        assert_eq!(myc[17], "N/A");

        let lone = rows[3].fields();
        assert_eq!(lone[2], "0");
        assert_eq!(lone[16], "[]");
        assert_eq!(lone.len(), HEADER.len());
    }

    #[test]
    fn sentinel_weight_renders_not_applicable_and_sorts_last() {
        let graph = graph_from_value(json!({
            "nodes": [
                {"data": {"id": "MYC", "label": "MYC"}},
                {"data": {"id": "SENT", "label": "SENT"}},
                {"data": {"id": "ZERO", "label": "ZERO"}},
                {"data": {"id": "BARE", "label": "BARE"}}
            ],
            "edges": [
                {"data": {"source": "MYC", "target": "SENT", "weight": -1}},
                {"data": {"source": "MYC", "target": "ZERO", "weight": 0.0}},
                {"data": {"source": "BARE", "target": "MYC"}}
            ]
        }))
        .unwrap();

        let rows = export_rows(&graph, "MYC").unwrap();
        let genes = rows.iter().map(|row| row.gene.as_str()).collect::<Vec<_>>();
        assert_eq!(genes, vec!["MYC", "ZERO", "SENT", "BARE"]);
        assert_eq!(rows[1].fields()[4], "0.000");
        assert_eq!(rows[2].fields()[4], "N/A");
        assert_eq!(rows[3].fields()[4], "N/A");
    }

    #[test]
    fn missing_query_or_graph_is_incomplete() {
        let graph = neighbourhood();
        assert!(matches!(
            export_rows(&graph, "  "),
            Err(CoampError::IncompleteData(_))
        ));
        assert!(matches!(
            export_rows(&CoampGraph::default(), "MYC"),
            Err(CoampError::IncompleteData(_))
        ));
        assert!(matches!(
            export_rows(&graph, "EGFR"),
            Err(CoampError::IncompleteData(_))
        ));
    }

    #[test]
    fn serialized_document_starts_with_header() {
        let rows = export_rows(&neighbourhood(), "MYC").unwrap();
        let text = serialize(&rows).unwrap();
        let mut lines = text.lines();

        assert_eq!(lines.next(), Some(HEADER.join(",").as_str()));
        assert!(lines.next().is_some_and(|line| line.starts_with("MYC,True,3,N/A,N/A,")));
        assert_eq!(text.lines().count(), rows.len() + 1);
    }

    #[test]
    fn awkward_sample_ids_survive_a_csv_round_trip() {
        let samples = vec!["a,b".to_owned(), "c\"d".to_owned(), "e\nf".to_owned()];
        let rows = vec![ExportRow {
            gene: "MYC".to_owned(),
            oncogene: true,
            samples: samples.clone(),
            location: None,
            link: None,
        }];
        let text = serialize(&rows).unwrap();

        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), HEADER.len());

        let records = reader.records().collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(records.len(), 1);
        let cell = &records[0][16];
        let parsed: Vec<String> = serde_json::from_str(cell).unwrap();
        assert_eq!(parsed, samples);
    }

    #[test]
    fn file_name_uses_dashed_timestamp() {
        let at = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        assert_eq!(
            export_file_name("MYC", at),
            "AACoampGraph_MYC_2025-03-14_09-26-53.csv"
        );
    }

    #[test]
    fn writes_export_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_export(dir.path(), &neighbourhood(), "MYC").unwrap();

        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("AACoampGraph_MYC_"));
        assert!(name.ends_with(".csv"));
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 5);
    }
}
