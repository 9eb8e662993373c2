use anyhow::{anyhow, bail, Context, Result};

use crate::backend;
use crate::config;
use crate::model::work_item::{Field, FieldChange, ItemId, WorkItem};
use crate::sort::{sort_items, SortConfig};

const NO_API: &str = "No API configured. Set [api] base_url in ~/.taskboard/config.toml or TASKBOARD_API_URL";

/// `taskboard list [--sort <spec>]`: fetch, sort and print every item.
pub async fn handle_list(args: &[String]) -> Result<()> {
    let config = config::load_config()?;
    let sort = match parse_list_args(args)? {
        Some(spec) => spec
            .parse::<SortConfig>()
            .with_context(|| format!("Invalid --sort '{spec}'"))?,
        None => config.initial_sort()?,
    };
    let backend = backend::create_backend(&config).ok_or_else(|| anyhow!(NO_API))?;

    let items = backend
        .fetch_items()
        .await
        .with_context(|| format!("Failed to fetch items from {}", backend.name()))?;
    let rows = sort_items(&sort, &items);
    print!("{}", format_table(&rows));
    Ok(())
}

/// `taskboard set <id> <field> <value>`: one backing update, no local state.
pub async fn handle_set(args: &[String]) -> Result<()> {
    let (item_id, change) = parse_set_args(args)?;
    let config = config::load_config()?;
    let backend = backend::create_backend(&config).ok_or_else(|| anyhow!(NO_API))?;

    backend
        .set_field(item_id, change)
        .await
        .with_context(|| format!("Failed to set {change} on #{item_id}"))?;
    println!("#{item_id}: {change}");
    Ok(())
}

/// Parse `list` arguments into an optional sort spec.
///
/// Supported forms:
///   taskboard list
///   taskboard list --sort status:asc,priority:desc
///   taskboard list -s title
pub fn parse_list_args(args: &[String]) -> Result<Option<String>> {
    let mut sort = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-s" | "--sort" => {
                i += 1;
                match args.get(i) {
                    Some(spec) => sort = Some(spec.clone()),
                    None => bail!("Missing value for -s/--sort flag"),
                }
            }
            other => bail!("Unexpected argument '{other}'\n\nUsage: taskboard list [--sort <spec>]"),
        }
        i += 1;
    }
    Ok(sort)
}

/// Parse `set` arguments into the item and the change to send.
pub fn parse_set_args(args: &[String]) -> Result<(ItemId, FieldChange)> {
    let [id, field, value] = args else {
        bail!("Usage: taskboard set <id> <status|priority> <value>\n\nExamples:\n  taskboard set 12 status completed\n  taskboard set 12 priority high");
    };
    let item_id: ItemId = id
        .trim_start_matches('#')
        .parse()
        .with_context(|| format!("Invalid item id '{id}'"))?;
    let field = Field::parse(field)
        .ok_or_else(|| anyhow!("Unknown field '{field}', expected status or priority"))?;
    let change = FieldChange::parse(field, value)
        .ok_or_else(|| anyhow!("Invalid {field} '{value}'"))?;
    Ok((item_id, change))
}

pub fn format_table(rows: &[&WorkItem]) -> String {
    if rows.is_empty() {
        return "No items found\n".to_string();
    }
    let title_width = rows
        .iter()
        .map(|i| i.title.chars().count())
        .max()
        .unwrap_or(0)
        .clamp(5, 50);

    let mut out = format!(
        "{:>6}  {:<title_width$}  {:<12}  {:<8}  {:<10}  {}\n",
        "ID", "TITLE", "STATUS", "PRIORITY", "DUE", "PROJECT"
    );
    for item in rows {
        let title: String = item.title.chars().take(title_width).collect();
        let due = item
            .due_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".into());
        out.push_str(&format!(
            "{:>6}  {:<title_width$}  {:<12}  {:<8}  {:<10}  {}\n",
            item.id,
            title,
            item.status.as_str(),
            item.priority.as_str(),
            due,
            item.project.name
        ));
    }
    out
}

pub fn print_help() {
    println!("taskboard — terminal board for work items\n");
    println!("USAGE:");
    println!("  taskboard                              Launch the TUI");
    println!("  taskboard list [--sort <spec>]         Print all items, sorted");
    println!("  taskboard set <id> <field> <value>     Set status or priority of one item");
    println!();
    println!("SORT SPEC:");
    println!("  Comma-separated field[:direction], highest precedence first.");
    println!("  Fields: title, status, priority, due_date, project");
    println!("  Directions: asc, desc, on_hold_first (status), medium_first (priority)");
    println!();
    println!("EXAMPLES:");
    println!("  taskboard list --sort status:on_hold_first,due_date");
    println!("  taskboard set 12 status in_progress");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{due, item};
    use crate::model::work_item::{Priority, Status};

    fn args(strs: &[&str]) -> Vec<String> {
        strs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_list_without_flags() {
        assert_eq!(parse_list_args(&args(&[])).unwrap(), None);
    }

    #[test]
    fn parse_list_sort_flag() {
        let spec = parse_list_args(&args(&["--sort", "status:desc,title"])).unwrap();
        assert_eq!(spec.as_deref(), Some("status:desc,title"));
        let spec = parse_list_args(&args(&["-s", "due_date"])).unwrap();
        assert_eq!(spec.as_deref(), Some("due_date"));
    }

    #[test]
    fn parse_list_missing_sort_value_fails() {
        let err = parse_list_args(&args(&["--sort"])).unwrap_err();
        assert!(err.to_string().contains("Missing value"));
    }

    #[test]
    fn parse_list_rejects_stray_args() {
        assert!(parse_list_args(&args(&["everything"])).is_err());
    }

    #[test]
    fn parse_set_status() {
        let (id, change) = parse_set_args(&args(&["12", "status", "in_progress"])).unwrap();
        assert_eq!(id, 12);
        assert_eq!(change, FieldChange::Status(Status::InProgress));
    }

    #[test]
    fn parse_set_accepts_hash_prefix() {
        let (id, change) = parse_set_args(&args(&["#7", "priority", "high"])).unwrap();
        assert_eq!(id, 7);
        assert_eq!(change, FieldChange::Priority(Priority::High));
    }

    #[test]
    fn parse_set_rejects_bad_input() {
        assert!(parse_set_args(&args(&["12", "status"])).is_err());
        assert!(parse_set_args(&args(&["abc", "status", "pending"])).is_err());

        let err = parse_set_args(&args(&["12", "owner", "me"])).unwrap_err();
        assert!(err.to_string().contains("Unknown field"));

        let err = parse_set_args(&args(&["12", "status", "on_hold"])).unwrap_err();
        assert!(err.to_string().contains("Invalid status"));
    }

    #[test]
    fn table_lists_rows_in_given_order() {
        let a = due(item(2, "Write docs", Status::Pending, Priority::Low), 2024, 3, 1);
        let b = item(10, "Fix build", Status::Completed, Priority::High);
        let out = format_table(&[&b, &a]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("TITLE"));
        assert!(lines[1].contains("Fix build") && lines[1].contains("completed"));
        assert!(lines[2].contains("2024-03-01") && lines[2].contains("Default"));
    }

    #[test]
    fn table_empty_collection() {
        assert_eq!(format_table(&[]), "No items found\n");
    }
}
