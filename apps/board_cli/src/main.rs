use anyhow::Result;
use clap::Parser;
use shared::domain::ProjectId;
use sync_core::{ClientEvent, SyncClient};
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

/// Watches a board and reprints it whenever the server pushes a change.
#[derive(Parser, Debug)]
struct Args {
    #[arg(long)]
    server_url: String,
    /// Watch one project's lists instead of the global status board.
    #[arg(long)]
    project: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let client = SyncClient::with_websocket(args.server_url)?;
    let project = args.project.map(ProjectId::new);

    client.refresh_projects().await?;
    client.refresh_tasks(project.as_ref()).await?;
    if let Some(project) = &project {
        client.refresh_lists(project).await?;
    }

    let mut events = client.subscribe_events();
    client.open().await;

    print_board(&client, project.as_ref()).await;
    loop {
        match events.recv().await {
            Ok(ClientEvent::Push(_)) => print_board(&client, project.as_ref()).await,
            Ok(ClientEvent::Error(message)) => eprintln!("error: {message}"),
            Err(RecvError::Lagged(missed)) => {
                // The store already absorbed the missed events; just redraw.
                warn!(missed, "event stream lagged");
                print_board(&client, project.as_ref()).await;
            }
            Err(RecvError::Closed) => break,
        }
    }

    client.close().await;
    Ok(())
}

async fn print_board(client: &SyncClient, project: Option<&ProjectId>) {
    match project {
        Some(project) => {
            println!("== project {project} ==");
            for column in client.by_list(project).await {
                println!("[{}]", column.list.name);
                for task in &column.tasks {
                    println!("  {:>3}  {}  ({:?})", task.position, task.title, task.priority);
                }
            }
        }
        None => {
            let board = client.by_status().await;
            for (name, tasks) in [
                ("todo", &board.todo),
                ("in-progress", &board.in_progress),
                ("done", &board.done),
            ] {
                println!("[{name}]");
                for task in tasks {
                    println!("  {:>3}  {}  ({:?})", task.position, task.title, task.priority);
                }
            }
        }
    }
    println!();
}
