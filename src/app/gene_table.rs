use std::cmp::Ordering;

use crate::coamp::{ExportRow, GraphSession, export_rows};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum SortColumn {
    Rank,
    Gene,
    Oncogene,
    Weight,
}

impl SortColumn {
    pub(in crate::app) const ALL: [SortColumn; 4] = [
        SortColumn::Rank,
        SortColumn::Gene,
        SortColumn::Oncogene,
        SortColumn::Weight,
    ];

    pub(in crate::app) fn title(self) -> &'static str {
        match self {
            Self::Rank => "#",
            Self::Gene => "Gene",
            Self::Oncogene => "Oncogene",
            Self::Weight => "Frequency",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) struct GeneRow {
    pub(in crate::app) rank: usize,
    pub(in crate::app) id: Option<String>,
    pub(in crate::app) gene: String,
    pub(in crate::app) oncogene: bool,
    pub(in crate::app) weight: Option<f64>,
}

pub(in crate::app) struct GeneTable {
    rows: Vec<GeneRow>,
    column: SortColumn,
    descending: bool,
    message: Option<String>,
}

impl GeneTable {
    pub(in crate::app) fn build(session: &GraphSession) -> Self {
        let graph = &session.displayed;
        match export_rows(graph, &session.context.gene) {
            Ok(rows) => Self::from_rows(
                rows.iter()
                    .enumerate()
                    .map(|(index, row)| gene_row(index + 1, row, session))
                    .collect(),
            ),
            Err(error) => Self {
                message: Some(error.to_string()),
                ..Self::from_rows(Vec::new())
            },
        }
    }

    fn from_rows(rows: Vec<GeneRow>) -> Self {
        Self {
            rows,
            column: SortColumn::Rank,
            descending: false,
            message: None,
        }
    }

    pub(in crate::app) fn rows(&self) -> &[GeneRow] {
        &self.rows
    }

    pub(in crate::app) fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub(in crate::app) fn sorted_by(&self) -> (SortColumn, bool) {
        (self.column, self.descending)
    }

    pub(in crate::app) fn toggle(&mut self, column: SortColumn) {
        if self.column == column {
            self.descending = !self.descending;
        } else {
            self.column = column;
            self.descending = false;
        }
        let (column, descending) = (self.column, self.descending);
        self.rows
            .sort_by(|a, b| compare_rows(a, b, column, descending));
    }
}

fn gene_row(rank: usize, row: &ExportRow, session: &GraphSession) -> GeneRow {
    GeneRow {
        rank,
        id: session
            .displayed
            .node_by_label(&row.gene)
            .map(|node| node.id.clone()),
        gene: row.gene.clone(),
        oncogene: row.oncogene,
        weight: row.weight(),
    }
}

fn directed(ordering: Ordering, descending: bool) -> Ordering {
    if descending { ordering.reverse() } else { ordering }
}

/// Missing frequencies sort last in both directions; ties fall back to rank.
fn compare_rows(a: &GeneRow, b: &GeneRow, column: SortColumn, descending: bool) -> Ordering {
    let ordering = match column {
        SortColumn::Rank => directed(a.rank.cmp(&b.rank), descending),
        SortColumn::Gene => directed(a.gene.cmp(&b.gene), descending),
        SortColumn::Oncogene => directed(a.oncogene.cmp(&b.oncogene), descending),
        SortColumn::Weight => match (a.weight, b.weight) {
            (Some(a), Some(b)) => directed(a.total_cmp(&b), descending),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    };
    ordering.then(a.rank.cmp(&b.rank))
}
