use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use rates_cli::pipeline::{EnrichRun, Explanation};
use rates_map::{ConfidenceLevel, TierCounts};

/// Candidates listed by `explain`.
const EXPLAIN_LIMIT: usize = 10;

pub fn print_summary(run: &EnrichRun) {
    println!("Crosswalk: {}", run.crosswalk_version);
    if !run.written {
        println!("Dry run: catalogs left unchanged");
    }
    if run.routed > 0 {
        println!("Routed by hint rules: {}", run.routed);
    }
    if let Some(path) = &run.report {
        println!("QA report: {}", path.display());
    }

    let mut table = tier_table("Catalog");
    for catalog in &run.catalogs {
        table.add_row(tier_row(
            Cell::new(&catalog.file).fg(Color::Blue),
            &catalog.stats.tiers,
        ));
    }
    let mut total = tier_row(
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        &run.stats.tiers,
    );
    for cell in total.iter_mut().skip(1) {
        *cell = cell.clone().add_attribute(Attribute::Bold);
    }
    table.add_row(total);
    println!("{table}");

    let mut sections = tier_table("Section");
    for (section, counts) in &run.stats.by_section {
        sections.add_row(tier_row(Cell::new(section), counts));
    }
    println!();
    println!("By section:");
    println!("{sections}");

    if run.stats.missing_text > 0 {
        eprintln!(
            "warning: {} rates had no name or description",
            run.stats.missing_text
        );
    }
}

pub fn print_explanation(explanation: &Explanation) {
    let rate = &explanation.rate;
    println!("Rate: {} ({})", rate.code, explanation.file);
    println!("Text: {}", rate.match_text());
    println!("Unit: {}", dash_if_blank(&rate.unit));
    println!("Hint: {}", dash_if_blank(&rate.level2_hint));
    if let Some(target) = &explanation.override_target {
        let level4 = target.level4_code.as_deref().unwrap_or("-");
        println!("Override: {} / {level4}", target.group);
        if let Some(reason) = &target.reason {
            println!("Reason: {reason}");
        }
    }
    if explanation.ranked.is_empty() {
        println!("No candidates for this hint.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("L4 Code"),
        header_cell("Description"),
        header_cell("Unit"),
        header_cell("Desc"),
        header_cell("Keywords"),
        header_cell("Total"),
        header_cell("Tier"),
    ]);
    apply_table_style(&mut table);
    for index in [2, 3, 4, 5] {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for (entry, score) in explanation.ranked.iter().take(EXPLAIN_LIMIT) {
        table.add_row(vec![
            Cell::new(&entry.level4_code).fg(Color::Blue),
            Cell::new(&entry.description),
            percent_cell(score.unit_score),
            percent_cell(score.description_score),
            percent_cell(score.keyword_score),
            percent_cell(score.total_score).add_attribute(Attribute::Bold),
            level_cell(score.confidence),
        ]);
    }
    println!("{table}");
    if explanation.ranked.len() > EXPLAIN_LIMIT {
        println!(
            "{} more candidates not shown",
            explanation.ranked.len() - EXPLAIN_LIMIT
        );
    }
}

fn tier_table(label: &str) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell(label),
        header_cell("Rates"),
        header_cell("High"),
        header_cell("Medium"),
        header_cell("Low"),
        header_cell("Manual"),
        header_cell("No Match"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..=6 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    table
}

fn tier_row(label: Cell, counts: &TierCounts) -> Vec<Cell> {
    vec![
        label,
        Cell::new(counts.total()),
        count_cell(counts.high, Color::Green),
        count_cell(counts.medium, Color::Yellow),
        count_cell(counts.low, Color::Red),
        count_cell(counts.manual, Color::Magenta),
        count_cell(counts.no_match, Color::Red),
    ]
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color)
    } else {
        dim_cell(count)
    }
}

fn percent_cell(score: f64) -> Cell {
    Cell::new(format!("{:.0}%", score * 100.0))
}

fn level_cell(level: ConfidenceLevel) -> Cell {
    match level {
        ConfidenceLevel::High => Cell::new("HIGH").fg(Color::Green),
        ConfidenceLevel::Medium => Cell::new("MEDIUM").fg(Color::Yellow),
        ConfidenceLevel::Low => Cell::new("LOW").fg(Color::Red),
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn dash_if_blank(value: &str) -> &str {
    if value.trim().is_empty() { "-" } else { value }
}
