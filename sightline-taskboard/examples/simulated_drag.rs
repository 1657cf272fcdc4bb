//! Simulate a full drag interaction against a logging gateway.
//!
//! Run with: cargo run --example simulated_drag

use sightline_taskboard::{
    async_trait, BoardController, GatewayError, Priority, ReportRunId, RowBounds, StatusGateway,
    Task, TaskId, TaskStatus,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Stand-in for the reporting API client: logs the PATCH it would send
struct LoggingGateway;

#[async_trait]
impl StatusGateway for LoggingGateway {
    async fn update_task_status(
        &self,
        report_run_id: &ReportRunId,
        task_id: &TaskId,
        new_status: TaskStatus,
    ) -> Result<(), GatewayError> {
        tracing::info!(
            run = %report_run_id,
            task = %task_id,
            status = %new_status,
            "PATCH task status"
        );
        Ok(())
    }
}

fn print_board(board: &BoardController) {
    for status in TaskStatus::COLUMN_ORDER {
        println!("{status}");
        for task in board.column(status) {
            println!("  [{}] {}", task.priority, task.title);
        }
    }
    println!();
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let (mut board, mut events) =
        BoardController::new(ReportRunId::from_string("run-2026-07"), Arc::new(LoggingGateway));

    let comparison_task = Task::new("Publish comparison page", TaskStatus::NotStarted)
        .with_priority(Priority::High)
        .with_category("Content")
        .with_impact_metric("+12% share of voice")
        .with_description("Head-to-head page against the two most-cited competitors");
    let faq_task = Task::new("Add FAQ schema", TaskStatus::NotStarted)
        .with_category("Technical SEO")
        .with_dependencies(vec![comparison_task.id.clone()]);
    let listicle_task = Task::new("Earn a listicle mention", TaskStatus::InProgress)
        .with_category("Outreach")
        .with_impact_metric("+8% assistant mentions");

    board.seed(vec![comparison_task, faq_task, listicle_task]);

    println!("before:");
    print_board(&board);

    let faq = board.column(TaskStatus::NotStarted)[1].id.clone();
    let listicle = board.column(TaskStatus::InProgress)[0].id.clone();

    // Reorder within the first column: drag the FAQ card above the
    // comparison page (pointer in the top half of the hovered card)
    let comparison = board.column(TaskStatus::NotStarted)[0].id.clone();
    board.drag_start(&faq);
    board.drag_over(comparison.as_str(), 110.0, RowBounds::new(100.0, 40.0));
    board.drag_end(comparison.as_str());

    // Cross-column move: drop the listicle card on the done gutter
    board.drag_start(&listicle);
    board.drag_end(TaskStatus::Completed.gutter_id());

    board.flush().await;

    println!("after:");
    print_board(&board);

    while let Ok(event) = events.try_recv() {
        println!("event: {event:?}");
    }
}
