use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use labcode_model::Judgment;

use crate::commands::ValidateResult;

const JUDGMENTS: [Judgment; 7] = [
    Judgment::Correct,
    Judgment::Fixed,
    Judgment::Unresolved,
    Judgment::Incorrect,
    Judgment::ExcludedInvalidCode,
    Judgment::ExcludedNonTextualName,
    Judgment::ExcludedNonQuantitative,
];

pub fn print_summary(result: &ValidateResult) {
    println!("Output: {}", result.output.display());
    println!("Catalog sha256: {}", result.catalog_sha256);
    println!("{}", summary_table(result));
}

pub fn summary_table(result: &ValidateResult) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Judgment"), header_cell("Records")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for judgment in JUDGMENTS {
        let count = result.counts.get(&judgment).copied().unwrap_or(0);
        table.add_row(vec![judgment_cell(judgment), count_cell(count, judgment)]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(result.records).add_attribute(Attribute::Bold),
    ]);
    table
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
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn judgment_color(judgment: Judgment) -> Color {
    match judgment {
        Judgment::Correct => Color::Green,
        Judgment::Fixed => Color::Blue,
        Judgment::Unresolved | Judgment::Incorrect => Color::Red,
        _ => Color::DarkGrey,
    }
}

fn judgment_cell(judgment: Judgment) -> Cell {
    Cell::new(judgment.as_str()).fg(judgment_color(judgment))
}

fn count_cell(count: usize, judgment: Judgment) -> Cell {
    if count > 0 {
        Cell::new(count)
            .fg(judgment_color(judgment))
            .add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
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
