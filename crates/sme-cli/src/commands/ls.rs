//! Ls command implementation

use crate::cli::{GlobalArgs, ListOutput, LsArgs};
use crate::commands::common::{load_manifest, print_json, print_table};
use anyhow::Result;
use serde::Serialize;
use sme_core::{Manifest, MetricKind};

/// One listed manifest item
#[derive(Debug, Serialize)]
struct ItemInfo {
    name: String,
    kind: &'static str,
    #[serde(rename = "type")]
    item_type: String,
    detail: String,
}

/// Execute the ls command
pub(crate) async fn execute(args: &LsArgs, _global: &GlobalArgs) -> Result<()> {
    let outcome = load_manifest(&args.file)?;
    let items = collect_items(&outcome.manifest);

    match args.output {
        ListOutput::Json => print_json(&items)?,
        ListOutput::Table => {
            let rows: Vec<Vec<String>> = items
                .iter()
                .map(|i| {
                    vec![
                        i.name.clone(),
                        i.kind.to_string(),
                        i.item_type.clone(),
                        i.detail.clone(),
                    ]
                })
                .collect();
            print_table(&["NAME", "KIND", "TYPE", "DETAIL"], &rows);
            println!(
                "\n{} semantic models, {} metrics",
                outcome.manifest.semantic_models.len(),
                outcome.manifest.metrics.len()
            );
        }
    }
    Ok(())
}

fn collect_items(manifest: &Manifest) -> Vec<ItemInfo> {
    let models = manifest.semantic_models.iter().map(|model| ItemInfo {
        name: model.name.clone(),
        kind: "semantic_model",
        item_type: model
            .node_relation
            .as_ref()
            .map(|r| format!("{}.{}", r.schema_name, r.alias))
            .unwrap_or_else(|| "-".to_string()),
        detail: format!(
            "{} entities, {} dimensions, {} measures",
            model.entities.len(),
            model.dimensions.len(),
            model.measures.len()
        ),
    });

    let metrics = manifest.metrics.iter().map(|metric| {
        let item_type = match &metric.kind {
            Some(MetricKind::Unrecognized(raw)) => raw.clone(),
            Some(kind) => kind
                .metric_type()
                .map(|t| t.to_string())
                .unwrap_or_default(),
            None => "-".to_string(),
        };
        let references: Vec<&str> = metric
            .measure_references()
            .into_iter()
            .map(|(_, reference)| reference)
            .chain(metric.metric_references().iter().map(String::as_str))
            .collect();
        ItemInfo {
            name: metric.name.clone(),
            kind: "metric",
            item_type,
            detail: references.join(", "),
        }
    });

    models.chain(metrics).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sme_core::{Metric, NodeRelation, SemanticModel};

    #[test]
    fn test_collect_items() {
        let mut manifest = Manifest::new();
        manifest.semantic_models.push(SemanticModel::new(
            "us_employment",
            NodeRelation::new("us_employment", "main", "bls_data"),
        ));
        manifest.metrics.push(Metric::ratio(
            "unemployment_rate",
            "us_employment.unemployed",
            "us_employment.labor_force",
        ));
        manifest
            .metrics
            .push(Metric::derived("pct", "unemployment_rate * 100", ["unemployment_rate"]));

        let items = collect_items(&manifest);
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].item_type, "main.us_employment");
        assert_eq!(items[0].detail, "0 entities, 0 dimensions, 0 measures");
        assert_eq!(items[1].item_type, "ratio");
        assert_eq!(
            items[1].detail,
            "us_employment.unemployed, us_employment.labor_force"
        );
        assert_eq!(items[2].detail, "unemployment_rate");
    }
}
