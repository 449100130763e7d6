//! # Check Command
//!
//! Runs the read-only part of a reconcile cycle against the live cluster and
//! prints what the controller would publish.

use anyhow::{Context, Result};
use kube::Client;
use latency_profile_controller::config::ControllerConfig;
use latency_profile_controller::controller::reconciler::{derive, evaluate_fleet, Reconciler};
use latency_profile_controller::store::KubeStore;
use std::sync::Arc;

pub async fn check_command(client: Client, config: ControllerConfig) -> Result<()> {
    let target = config.target_name.clone();
    let reconciler = Reconciler::new(Arc::new(KubeStore::new(client)), config);

    let Some(evaluation) = evaluate_fleet(&reconciler)
        .await
        .context("Evaluation failed")?
    else {
        println!("Node config '{target}' not found; the controller does nothing");
        return Ok(());
    };

    println!("🔍 Checking node config '{target}'");
    println!();
    println!("Profile: {}", evaluation.profile);
    if !evaluation.expected.is_empty() {
        println!("Expected arguments:");
        for (name, value) in evaluation.expected.iter() {
            println!("  {name}: {value}");
        }
        let revisions: Vec<String> = evaluation.revisions.iter().map(ToString::to_string).collect();
        println!("Running revisions: {}", revisions.join(", "));
    }
    println!("Outcome: {}", evaluation.outcome);

    println!();
    println!("Conditions that would be published:");
    for condition in derive(evaluation.outcome).iter() {
        println!(
            "  {}: {} ({})",
            condition.r#type, condition.status, condition.reason
        );
    }

    Ok(())
}
