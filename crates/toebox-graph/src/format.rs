//! Markdown formatting of shoe records and retrieved documents for the
//! prompt templates.

use toebox_core::{ScoredDoc, ShoeRecord};

/// Format shoe data for inclusion in a prompt.
pub fn format_shoe_data(shoes: &[ShoeRecord]) -> String {
    if shoes.is_empty() {
        return "No relevant shoes found in the database.".to_string();
    }

    shoes
        .iter()
        .map(format_shoe)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn format_shoe(shoe: &ShoeRecord) -> String {
    let mut info = format!("## {} {}\n", shoe.brand, shoe.model);

    let mut specs = Vec::new();
    if let Some(forefoot) = shoe.forefoot_stack_height_mm {
        specs.push(format!("Forefoot Stack Height: {forefoot}mm"));
    }
    if let Some(heel) = shoe.heel_stack_height_mm {
        specs.push(format!("Heel Stack Height: {heel}mm"));
    }
    if let Some(drop) = shoe.drop_value() {
        specs.push(format!("Drop: {drop}mm"));
    }
    if let Some(fit) = &shoe.fit {
        specs.push(format!("Fit: {fit}"));
    }
    specs.push(format!(
        "Wide Option: {}",
        if shoe.wide_option { "Yes" } else { "No" }
    ));
    if let Some(intended_use) = &shoe.intended_use {
        specs.push(format!("Intended Use: {intended_use}"));
    }
    if let Some(description) = &shoe.description {
        specs.push(format!("Description: {description}"));
    }

    info.push_str("### Specifications\n");
    for spec in &specs {
        info.push_str(&format!("- {spec}\n"));
    }

    if !shoe.genders.is_empty() {
        info.push_str("### Gender Specific information\n");
        for version in &shoe.genders {
            info.push_str(&format!("- {} version", version.gender));
            if let Some(rrp) = version.price_rrp {
                info.push_str(&format!(", RRP: ${rrp}"));
            }
            if let Some(price) = version.price {
                info.push_str(&format!(", Current Price: ${price}"));
            }
            if let Some(weight) = version.weight_grams {
                info.push_str(&format!(", Weight: {weight}g"));
            }
            info.push('\n');
        }
    }

    if !shoe.reviews.is_empty() {
        info.push_str("### Reviews\n");
        for review in &shoe.reviews {
            if let Some(fit) = &review.fit {
                info.push_str(&format!("- Fit: {fit}\n"));
            }
            if let Some(feel) = &review.feel {
                info.push_str(&format!("- Feel: {feel}\n"));
            }
            if let Some(durability) = &review.durability {
                info.push_str(&format!("- Durability: {durability}\n"));
            }
        }
    }

    info
}

/// Format retrieved documents for inclusion in a prompt.
pub fn format_docs(docs: &[ScoredDoc]) -> String {
    if docs.is_empty() {
        return "No relevant documents found.".to_string();
    }

    let formatted: Vec<String> = docs
        .iter()
        .map(|scored| {
            format!(
                "<document source=\"{}\" title=\"{}\">\n{}\n</document>",
                scored.doc.metadata.source, scored.doc.metadata.title, scored.doc.page_content
            )
        })
        .collect();

    format!("<documents>\n{}\n</documents>", formatted.join("\n"))
}
