use std::collections::HashMap;
use std::path::Path;

use plotters::prelude::*;
use serde::Serialize;

use crate::error::{GleanError, Result};
use crate::table::{Table, cell_text};

pub const TITLE_COLUMN: &str = "title";

const CHART_SIZE: (u32, u32) = (1000, 600);

/// Distinct values of one column with their occurrence counts, most
/// frequent first. Ties keep the order in which values first appeared.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Distribution {
    pub column: String,
    pub counts: Vec<(String, usize)>,
}

impl Distribution {
    pub fn get(&self, value: &str) -> Option<usize> {
        self.counts
            .iter()
            .find(|(v, _)| v == value)
            .map(|(_, c)| *c)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, c)| c).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Turns records into a [`Table`] and summarizes tables.
///
/// Holds only the records it was given. Display and plotting take the table
/// as an argument, so there is no second copy that could go stale.
pub struct TableAnalyzer<T> {
    records: Vec<T>,
}

impl<T: Serialize> TableAnalyzer<T> {
    pub fn new(records: Vec<T>) -> TableAnalyzer<T> {
        TableAnalyzer { records }
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn to_table(&self) -> Result<Table> {
        Table::from_records(&self.records)
    }
}

pub fn display(table: &Table) -> String {
    table.to_string()
}

pub fn value_counts(table: &Table, column: &str) -> Result<Distribution> {
    let Some(cells) = table.column(column) else {
        log::warn!("table has no {column:?} column; columns are {:?}", table.columns());
        return Err(GleanError::shape(format!("missing column {column:?}")));
    };

    // value -> (first row seen, count)
    let mut seen: HashMap<String, (usize, usize)> = HashMap::new();
    for (row, cell) in cells.into_iter().enumerate() {
        if cell.is_null() {
            continue;
        }
        seen.entry(cell_text(cell)).or_insert((row, 0)).1 += 1;
    }

    let mut ranked: Vec<(String, usize, usize)> = seen
        .into_iter()
        .map(|(value, (first, count))| (value, first, count))
        .collect();
    ranked.sort_by(|a, b| b.2.cmp(&a.2).then(a.1.cmp(&b.1)));
    let counts = ranked
        .into_iter()
        .map(|(value, _, count)| (value, count))
        .collect();

    Ok(Distribution {
        column: column.to_string(),
        counts,
    })
}

/// Bar chart of the `title` column as an SVG document.
pub fn plot_distribution(table: &Table) -> Result<String> {
    let distribution = value_counts(table, TITLE_COLUMN)?;
    if distribution.is_empty() {
        log::warn!("no titles to plot");
        return Err(GleanError::empty("no titles to plot"));
    }
    render_bar_chart(
        &distribution,
        "Distribution of Staff Titles",
        "Staff Title",
        "Count",
    )
}

pub fn save_distribution(table: &Table, path: &Path) -> Result<()> {
    let svg = plot_distribution(table)?;
    std::fs::write(path, svg)?;
    log::info!("wrote title distribution to {}", path.display());
    Ok(())
}

pub fn render_bar_chart(
    distribution: &Distribution,
    caption: &str,
    x_desc: &str,
    y_desc: &str,
) -> Result<String> {
    let labels: Vec<&str> = distribution.counts.iter().map(|(v, _)| v.as_str()).collect();
    let max_count = distribution
        .counts
        .iter()
        .map(|(_, c)| *c as u32)
        .max()
        .unwrap_or(0);

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(caption, ("sans-serif", 24))
            .margin(20)
            .x_label_area_size(180)
            .y_label_area_size(60)
            .build_cartesian_2d((0..labels.len()).into_segmented(), 0u32..max_count + 1)
            .map_err(chart_err)?;

        let label_for = |v: &SegmentValue<usize>| match v {
            SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
                labels.get(*i).map(|s| s.to_string()).unwrap_or_default()
            }
            SegmentValue::Last => String::new(),
        };

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(labels.len())
            .x_label_formatter(&label_for)
            .x_label_style(
                ("sans-serif", 14)
                    .into_font()
                    .transform(FontTransform::Rotate90),
            )
            .x_desc(x_desc)
            .y_desc(y_desc)
            .draw()
            .map_err(chart_err)?;

        chart
            .draw_series(
                Histogram::vertical(&chart)
                    .style(BLUE.filled())
                    .margin(10)
                    .data(
                        distribution
                            .counts
                            .iter()
                            .enumerate()
                            .map(|(i, (_, c))| (i, *c as u32)),
                    ),
            )
            .map_err(chart_err)?;

        root.present().map_err(chart_err)?;
    }
    Ok(svg)
}

fn chart_err<E: std::fmt::Debug>(e: E) -> GleanError {
    GleanError::chart(format!("{e:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_counts_descending() {
        let mut table = Table::new(vec!["title".to_string()]);
        for t in ["A", "B", "A", "C", "C", "C"] {
            table.push_row(vec![json!(t)]).unwrap();
        }
        let dist = value_counts(&table, "title").unwrap();
        assert_eq!(
            dist.counts,
            vec![
                ("C".to_string(), 3),
                ("A".to_string(), 2),
                ("B".to_string(), 1)
            ]
        );
        assert_eq!(dist.total(), 6);
    }

    #[test]
    fn test_value_counts_ties_keep_first_appearance() {
        let mut table = Table::new(vec!["title".to_string()]);
        for t in ["B", "A", "A", "B"] {
            table.push_row(vec![json!(t)]).unwrap();
        }
        let dist = value_counts(&table, "title").unwrap();
        assert_eq!(dist.counts[0].0, "B");
        assert_eq!(dist.counts[1].0, "A");
    }

    #[test]
    fn test_value_counts_many_distinct_values() {
        let mut table = Table::new(vec!["title".to_string()]);
        for i in 0..2000 {
            table.push_row(vec![json!(format!("t{}", i % 500))]).unwrap();
        }
        table.push_row(vec![json!("t499")]).unwrap();
        let dist = value_counts(&table, "title").unwrap();
        assert_eq!(dist.counts.len(), 500);
        assert_eq!(dist.counts[0], ("t499".to_string(), 5));
        assert_eq!(dist.counts[1], ("t0".to_string(), 4));
        assert_eq!(dist.counts[499], ("t498".to_string(), 4));
        assert_eq!(dist.total(), 2001);
    }
}
