//! CSV export of the task list.

use chrono::NaiveDate;
use taskdash_core::Task;

/// Header row, written unquoted.
pub const CSV_HEADER: &str = "ID,Title,Status,Priority,Assigned To,Due Date,Progress,Estimated Hours";

/// Render `tasks` as CSV, one row per task in the given order.
///
/// Every cell is wrapped in double quotes and every line ends in `\n`.
pub fn export_csv(tasks: &[Task]) -> String {
    let mut csv = String::with_capacity(CSV_HEADER.len() + 1 + tasks.len() * 96);
    csv.push_str(CSV_HEADER);
    csv.push('\n');

    for task in tasks {
        let cells = [
            task.id.to_string(),
            task.title.clone(),
            task.status.to_string(),
            task.display_priority().to_string(),
            task.assigned_to_name
                .clone()
                .unwrap_or_else(|| "Unassigned".to_string()),
            task.due_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "N/A".to_string()),
            format!("{}%", task.progress.unwrap_or(0)),
            task.estimated_hours
                .map(format_hours)
                .unwrap_or_else(|| "N/A".to_string()),
        ];

        let row: Vec<String> = cells.iter().map(|c| quote(c)).collect();
        csv.push_str(&row.join(","));
        csv.push('\n');
    }

    csv
}

/// Download name for an export made on `today`.
pub fn export_file_name(today: NaiveDate) -> String {
    format!("tasks-{}.csv", today.format("%Y-%m-%d"))
}

fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

// Whole numbers print without a fractional part: 40, not 40.0.
fn format_hours(hours: f64) -> String {
    if hours.fract() == 0.0 && hours.abs() < 1e15 {
        format!("{}", hours as i64)
    } else {
        hours.to_string()
    }
}
