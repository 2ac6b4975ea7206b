//! Interactive group selection on the terminal.

use std::io;

use chat_core::GroupDescriptor;
use chrono::{DateTime, Utc};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// What the operator typed at the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Zero-based index into the listed groups.
    Group(usize),
    Quit,
    OutOfRange,
    NotANumber,
}

/// Interpret one line of input against a list of `count` groups.
pub fn parse_choice(input: &str, count: usize) -> Choice {
    let input = input.trim();
    if input.eq_ignore_ascii_case("q") {
        return Choice::Quit;
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Choice::Group(n - 1),
        Ok(_) => Choice::OutOfRange,
        Err(_) => Choice::NotANumber,
    }
}

/// "3h 12m ago", "7m ago", or "unknown" for groups not seen yet.
pub fn time_ago(last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(last) = last else {
        return "unknown".to_string();
    };
    let minutes = (now - last).num_minutes().max(0);
    let (hours, minutes) = (minutes / 60, minutes % 60);
    if hours > 0 {
        format!("{}h {}m ago", hours, minutes)
    } else {
        format!("{}m ago", minutes)
    }
}

/// Numbered listing shown before the prompt.
pub fn render_groups(groups: &[GroupDescriptor], hours: u64, now: DateTime<Utc>) -> String {
    let mut out = format!("\n=== Available groups (active in last {} hours) ===\n\n", hours);
    for (i, group) in groups.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, group.name));
        if let Some(count) = group.member_count {
            out.push_str(&format!("   Members: {}\n", count));
        }
        out.push_str(&format!(
            "   Last message: {}\n",
            time_ago(group.last_activity, now)
        ));
        out.push_str(&format!("   Id: {}\n\n", group.id));
    }
    out
}

/// Ask on stdin until a group is chosen.
///
/// Returns `None` when the operator quits or stdin closes.
pub async fn prompt_for_group(groups: &[GroupDescriptor]) -> io::Result<Option<GroupDescriptor>> {
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        stdout
            .write_all(b"\nEnter the number of the group to monitor (or 'q' to quit): ")
            .await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            return Ok(None);
        };

        let message = match parse_choice(&line, groups.len()) {
            Choice::Group(index) => return Ok(groups.get(index).cloned()),
            Choice::Quit => return Ok(None),
            Choice::OutOfRange => "Invalid selection. Please try again.\n",
            Choice::NotANumber => "Please enter a valid number or 'q' to quit.\n",
        };
        stdout.write_all(message.as_bytes()).await?;
    }
}
