use colored::*;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};

use imtag::classifier::ClassifierDescription;
use imtag::report::{format_line, Prediction};
use imtag::store::StoredLabel;
use imtag::tagger::TaggedImage;

fn header(titles: &[&str]) -> Vec<Cell> {
    titles
        .iter()
        .map(|t| Cell::new(t).fg(comfy_table::Color::Cyan).add_attribute(Attribute::Bold))
        .collect()
}

fn new_table(titles: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .set_header(header(titles))
        .load_preset(comfy_table::presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Prints one `<label> <score>` line per prediction.
pub fn print_report(predictions: &[Prediction]) {
    for prediction in predictions {
        println!("{}", format_line(prediction));
    }
}

/// Prints classifier predictions and zero-shot tags for each image.
pub fn display_tagged_images(images: &[TaggedImage]) {
    if images.is_empty() {
        println!("{}", "No images found".yellow());
        return;
    }

    for image in images {
        println!("\n{}", format!("{}:", image.filename.display()).bright_green());

        let mut predictions = new_table(&["#", "Class", "Score"]);
        for (i, p) in image.predictions.iter().enumerate() {
            predictions.add_row(vec![
                Cell::new(i + 1).set_alignment(CellAlignment::Center),
                Cell::new(&p.label).fg(comfy_table::Color::Yellow),
                Cell::new(format!("{:.4}", p.score)).set_alignment(CellAlignment::Right),
            ]);
        }
        println!("{}", predictions);

        if !image.tags.is_empty() {
            let mut tags = new_table(&["#", "Tag", "Distance"]);
            for (i, t) in image.tags.iter().enumerate() {
                tags.add_row(vec![
                    Cell::new(i + 1).set_alignment(CellAlignment::Center),
                    Cell::new(&t.label).fg(comfy_table::Color::Green),
                    Cell::new(format!("{:.4}", t.distance)).set_alignment(CellAlignment::Right),
                ]);
            }
            println!("{}", tags);
        }
    }
}

pub fn display_stored_labels(labels: &[StoredLabel]) {
    if labels.is_empty() {
        println!("{}", "No labels registered".yellow());
        return;
    }

    let mut table = new_table(&["#", "Label", "Synset", "Added Date"]);
    for (i, l) in labels.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1).set_alignment(CellAlignment::Center),
            Cell::new(&l.label).fg(comfy_table::Color::Yellow),
            Cell::new(if l.synset { "yes" } else { "" }).set_alignment(CellAlignment::Center),
            Cell::new(l.added_date.format("%Y-%m-%d %H:%M:%S")).fg(comfy_table::Color::DarkGrey),
        ]);
    }
    println!("\n{}", table);
    println!("{}", format!("Total labels: {}", labels.len()).bright_green());
}

pub fn display_classifiers(classifiers: &[&ClassifierDescription]) {
    let mut table = new_table(&["Name", "Model File", "Input Node", "Output Node", "Label File", "Labels"]);
    for c in classifiers {
        table.add_row(vec![
            Cell::new(c.name).fg(comfy_table::Color::Yellow),
            Cell::new(c.model_file),
            Cell::new(c.input_tag).fg(comfy_table::Color::Magenta),
            Cell::new(c.output_tag).fg(comfy_table::Color::Magenta),
            Cell::new(c.label_file),
            Cell::new(c.num_labels).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("\n{}", table);
}
