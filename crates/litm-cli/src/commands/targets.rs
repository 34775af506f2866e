use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use litm_core::{TagType, target_tags};

pub fn run(text: &str) -> Result<(), String> {
    let tags = target_tags(text);

    if tags.is_empty() {
        println!("  No target tags found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Name", "Kind", "Level"]);

    for tag in &tags {
        let level = if tag.kind == TagType::Status {
            tag.resolved_value().to_string()
        } else {
            "-".to_string()
        };
        table.add_row(vec![tag.id.clone(), tag.name.clone(), tag.kind.to_string(), level]);
    }

    println!("{table}");
    println!();
    println!("  {} target tags", tags.len().to_string().bold());
    Ok(())
}
