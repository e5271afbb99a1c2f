use anyhow::Result;
use plotters::prelude::*;
use std::path::Path;

use crate::report::WinTally;

/// Grouped bars: wins for each answer under every criterion.
pub fn plot_win_tally(tally: &WinTally, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let root = BitMapBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let categories = tally.criteria.len().max(1) as f64;
    let max_wins = tally
        .criteria
        .iter()
        .map(|c| c.answer1.max(c.answer2))
        .max()
        .unwrap_or(0)
        .max(1) as f64;

    let labels: Vec<String> = tally.criteria.iter().map(|c| c.criterion.clone()).collect();

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Pairwise wins over {} evaluations", tally.total),
            ("sans-serif", 30),
        )
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..categories, 0f64..(max_wins * 1.2))?;

    chart
        .configure_mesh()
        .y_desc("Wins")
        .x_labels(labels.len().max(1))
        .x_label_formatter(&|x| {
            let index = x.floor() as usize;
            labels.get(index).cloned().unwrap_or_default()
        })
        .draw()?;

    chart
        .draw_series(tally.criteria.iter().enumerate().map(|(i, c)| {
            Rectangle::new(
                [(i as f64 + 0.1, 0.0), (i as f64 + 0.45, c.answer1 as f64)],
                BLUE.filled(),
            )
        }))?
        .label("Answer 1")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], BLUE.filled()));

    chart
        .draw_series(tally.criteria.iter().enumerate().map(|(i, c)| {
            Rectangle::new(
                [(i as f64 + 0.55, 0.0), (i as f64 + 0.9, c.answer2 as f64)],
                RED.filled(),
            )
        }))?
        .label("Answer 2")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], RED.filled()));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
