//! Human-readable and serializable summaries of an analysis

use crate::analysis::CfpAnalysis;
use crate::tree::{ComponentId, ComponentTree};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Serializable view of a finished analysis, components referred to by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CfpSummary {
    pub root: String,
    /// Basic component names, by dense index
    pub basic_components: Vec<String>,
    pub weight_vector: Vec<f64>,
    pub minimal_paths: Vec<Vec<String>>,
    /// Row-major 0/1 matrix, rows aligned with `minimal_paths`
    pub matrix: Vec<Vec<u8>>,
    pub longest_cfp_len: usize,
    pub paths_by_order: IndexMap<usize, usize>,
    pub single_point_failures: Vec<String>,
}

impl CfpSummary {
    pub fn from_analysis(analysis: &CfpAnalysis, tree: &ComponentTree) -> Self {
        let name_of = |id: ComponentId| {
            tree.get(id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| id.to_string())
        };

        Self {
            root: analysis.root_name().to_string(),
            basic_components: analysis
                .basic_index()
                .iter()
                .map(|(_, id)| name_of(id))
                .collect(),
            weight_vector: analysis.weight_vector().to_vec(),
            minimal_paths: analysis
                .minimal_path_ids()
                .into_iter()
                .map(|ids| ids.into_iter().map(name_of).collect())
                .collect(),
            matrix: analysis.matrix().to_dense(),
            longest_cfp_len: analysis.longest_cfp_len(),
            paths_by_order: analysis.paths_by_order(),
            single_point_failures: analysis
                .single_point_failures()
                .into_iter()
                .map(name_of)
                .collect(),
        }
    }
}

/// Format a plain-text CFP report
pub fn format_cfp_report(analysis: &CfpAnalysis, tree: &ComponentTree) -> String {
    let summary = CfpSummary::from_analysis(analysis, tree);
    let mut report = String::new();

    report.push_str("Critical Failure Path Analysis\n");
    report.push_str("==============================\n\n");
    report.push_str(&format!("System root:       {}\n", summary.root));
    report.push_str(&format!(
        "Basic components:  {}\n",
        summary.basic_components.len()
    ));
    report.push_str(&format!(
        "Minimal paths:     {}\n",
        summary.minimal_paths.len()
    ));
    report.push_str(&format!("Longest path:      {}\n\n", summary.longest_cfp_len));

    report.push_str("Paths by order\n");
    report.push_str("--------------\n");
    for (order, count) in &summary.paths_by_order {
        report.push_str(&format!("  order {}: {}\n", order, count));
    }

    if !summary.single_point_failures.is_empty() {
        report.push_str("\nSingle point failures\n");
        report.push_str("---------------------\n");
        for name in &summary.single_point_failures {
            report.push_str(&format!("  {}\n", name));
        }
    }

    report.push_str("\nMinimal paths\n");
    report.push_str("-------------\n");
    for (row, members) in summary.minimal_paths.iter().enumerate() {
        report.push_str(&format!("  CFP-{:03}: {{{}}}\n", row + 1, members.join(", ")));
    }

    report.push_str("\nWeights\n");
    report.push_str("-------\n");
    for (name, weight) in summary
        .basic_components
        .iter()
        .zip(&summary.weight_vector)
    {
        report.push_str(&format!("  {:<20} {}\n", name, weight));
    }

    report
}
