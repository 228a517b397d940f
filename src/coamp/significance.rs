use std::fmt;
use std::str::FromStr;

use super::error::CoampError;
use super::graph::{CoampGraph, Edge, TestName};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TestSelector {
    #[default]
    Any,
    Test(TestName),
}

impl TestSelector {
    pub const ALL: [TestSelector; 4] = [
        TestSelector::Any,
        TestSelector::Test(TestName::SingleInterval),
        TestSelector::Test(TestName::MultiInterval),
        TestSelector::Test(TestName::MultiChromosomal),
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Any => "Any test",
            Self::Test(test) => test.label(),
        }
    }
}

impl fmt::Display for TestSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::Test(test) => f.write_str(test.key()),
        }
    }
}

impl FromStr for TestSelector {
    type Err = CoampError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("any") {
            return Ok(Self::Any);
        }
        TestName::from_key(&value.to_ascii_lowercase())
            .map(Self::Test)
            .ok_or_else(|| {
                CoampError::InputInvalid(format!(
                    "unknown significance test '{value}'; expected any, single_interval, multi_interval or multi_chromosomal"
                ))
            })
    }
}

pub fn is_significant(edge: &Edge, selector: TestSelector, threshold: f64) -> bool {
    match selector {
        TestSelector::Any => TestName::ALL
            .into_iter()
            .any(|test| passes(edge, test, threshold)),
        TestSelector::Test(test) => passes(edge, test, threshold),
    }
}

fn passes(edge: &Edge, test: TestName, threshold: f64) -> bool {
    edge.stats(test)
        .q_value
        .is_some_and(|q| q >= 0.0 && q <= threshold)
}

pub fn recompute_classification(
    graph: &CoampGraph,
    selector: TestSelector,
    threshold: f64,
) -> Vec<bool> {
    graph
        .edges()
        .iter()
        .map(|edge| is_significant(edge, selector, threshold))
        .collect()
}
