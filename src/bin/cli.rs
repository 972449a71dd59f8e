//! taskboard-cli - terminal client.
//!
//! A line-oriented shell around the client state controller: lists tasks,
//! shows the stats panel, and drives the create / inline-edit / delete
//! flows against a running server.

use taskboard::client::{HttpTasksApi, TaskBoard, TaskForm};
use taskboard::config::ClientConfig;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskboard=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env();
    println!("taskboard-cli (API: {})", config.api_base_url);
    println!("Type 'help' for commands.");

    let api = HttpTasksApi::new(config.api_base_url);
    let mut board = TaskBoard::new(api);
    board.mount().await;
    render(&board);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let Some(line) = read_line(&mut lines).await else {
            break;
        };
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or("");
        let arg = parts.next();

        match command {
            "" => {}
            "help" => print_help(),
            "list" | "refresh" => {
                board.refresh().await;
                render(&board);
            }
            "stats" => {
                board.refresh().await;
                render_stats(&board);
            }
            "add" => {
                board.form = read_form(&mut lines, &TaskForm::default()).await;
                board.submit_create().await;
                render(&board);
            }
            "edit" => match parse_id_arg(arg) {
                Some(id) => {
                    if board.begin_edit(id) {
                        let current = board.edit_form.clone();
                        board.edit_form = read_form(&mut lines, &current).await;
                        board.save_edit().await;
                        render(&board);
                    } else {
                        println!("No task with id {} in the current list.", id);
                    }
                }
                None => println!("Usage: edit <id>"),
            },
            "delete" => match parse_id_arg(arg) {
                Some(id) => {
                    let answer = prompt(
                        &mut lines,
                        &format!("Are you sure you want to delete task {}? [y/N] ", id),
                    )
                    .await;
                    let confirmed = matches!(answer.as_deref(), Some("y") | Some("Y"));
                    board.delete_task(id, confirmed).await;
                    render(&board);
                }
                None => println!("Usage: delete <id>"),
            },
            "quit" | "exit" => break,
            other => println!("Unknown command: {} (try 'help')", other),
        }
    }

    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  list          show all tasks and stats");
    println!("  stats         show the stats panel");
    println!("  add           create a task (prompts for fields)");
    println!("  edit <id>     edit a task inline");
    println!("  delete <id>   delete a task (asks for confirmation)");
    println!("  refresh       re-fetch tasks and stats");
    println!("  quit          exit");
}

fn parse_id_arg(arg: Option<&str>) -> Option<i64> {
    arg.and_then(|s| s.parse::<i64>().ok()).filter(|id| *id >= 1)
}

async fn read_line(lines: &mut Lines<BufReader<Stdin>>) -> Option<String> {
    print_prompt("> ");
    lines.next_line().await.ok().flatten().map(|l| l.trim().to_string())
}

async fn prompt(lines: &mut Lines<BufReader<Stdin>>, message: &str) -> Option<String> {
    print_prompt(message);
    lines.next_line().await.ok().flatten().map(|l| l.trim().to_string())
}

fn print_prompt(message: &str) {
    use std::io::Write;
    print!("{}", message);
    let _ = std::io::stdout().flush();
}

/// Prompt for the four mutable fields, keeping the given value on empty
/// input. Unknown status/priority strings fall back the same way.
async fn read_form(lines: &mut Lines<BufReader<Stdin>>, current: &TaskForm) -> TaskForm {
    let mut form = current.clone();

    if let Some(title) = prompt(lines, &format!("Title [{}]: ", current.title)).await {
        if !title.is_empty() {
            form.title = title;
        }
    }
    if let Some(desc) = prompt(lines, &format!("Description [{}]: ", current.description)).await {
        if !desc.is_empty() {
            form.description = desc;
        }
    }
    if let Some(status) = prompt(lines, &format!("Status [{}]: ", current.status)).await {
        if !status.is_empty() {
            match status.parse() {
                Ok(s) => form.status = s,
                Err(_) => println!("Unknown status {:?}, keeping {}", status, current.status),
            }
        }
    }
    if let Some(priority) = prompt(lines, &format!("Priority [{}]: ", current.priority)).await {
        if !priority.is_empty() {
            match priority.parse() {
                Ok(p) => form.priority = p,
                Err(_) => {
                    println!("Unknown priority {:?}, keeping {}", priority, current.priority)
                }
            }
        }
    }

    form
}

fn render<A: taskboard::client::TasksApi>(board: &TaskBoard<A>) {
    if let Some(error) = &board.error {
        println!("! {}", error);
    }
    render_stats(board);

    if board.tasks.is_empty() {
        println!("No tasks yet. Use 'add' to create one.");
        return;
    }

    println!("{:>4}  {:<12} {:<8} {}", "id", "status", "priority", "title");
    for task in &board.tasks {
        println!(
            "{:>4}  {:<12} {:<8} {}",
            task.id, task.status, task.priority, task.title
        );
        if !task.description.is_empty() {
            println!("      {}", task.description);
        }
    }
}

fn render_stats<A: taskboard::client::TasksApi>(board: &TaskBoard<A>) {
    let s = &board.stats;
    println!(
        "Tasks: {} total | {} pending | {} in progress | {} completed",
        s.total, s.pending, s.in_progress, s.completed
    );
}
