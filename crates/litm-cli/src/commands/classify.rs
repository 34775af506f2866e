use comfy_table::{ContentArrangement, Table};
use litm_core::classify;

pub fn run(raw: &[String], json: bool) -> Result<(), String> {
    let tags: Vec<_> = raw.iter().map(|r| classify(r.as_str())).collect();

    if json {
        let out = serde_json::to_string_pretty(&tags).map_err(|e| e.to_string())?;
        println!("{out}");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Input", "Name", "Type", "Tier", "Value"]);

    for (input, tag) in raw.iter().zip(&tags) {
        let level = tag.level.map_or_else(|| "-".to_string(), |l| l.to_string());
        let value = tag
            .value
            .as_ref()
            .map_or_else(|| "-".to_string(), |v| v.resolved().to_string());
        table.add_row(vec![
            input.clone(),
            tag.name.clone(),
            tag.kind.to_string(),
            level,
            value,
        ]);
    }

    println!("{table}");
    Ok(())
}
