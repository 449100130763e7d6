//! # Status Command
//!
//! Shows the published rollout conditions and the controller's operational condition.

use anyhow::{Context, Result};
use kube::{api::Api, Client};
use latency_profile_controller::config::ControllerConfig;
use latency_profile_controller::constants::CONTROLLER_DEGRADED_CONDITION;
use latency_profile_controller::crd::{Condition, KubeControllerManager, NodeConfig};

pub async fn status_command(client: Client, config: &ControllerConfig) -> Result<()> {
    let nodes: Api<NodeConfig> = Api::all(client.clone());
    let operators: Api<KubeControllerManager> = Api::all(client);

    let node = nodes
        .get(&config.target_name)
        .await
        .with_context(|| format!("Failed to get node config '{}'", config.target_name))?;

    println!("📊 Status for node config '{}'", config.target_name);
    println!();
    println!(
        "Worker latency profile: {}",
        node.spec
            .worker_latency_profile
            .as_deref()
            .filter(|p| !p.is_empty())
            .unwrap_or("<unset>")
    );

    println!();
    println!("Rollout conditions:");
    let conditions = node
        .status
        .as_ref()
        .map(|s| s.conditions().to_vec())
        .unwrap_or_default();
    if conditions.is_empty() {
        println!("  (none published yet)");
    }
    for condition in &conditions {
        print_condition(condition);
    }

    println!();
    match operators.get_opt(&config.operator_name).await? {
        Some(operator) => {
            let status = operator.status.unwrap_or_default();
            println!("Fleet revisions:");
            for node_status in &status.node_statuses {
                println!(
                    "  {}: revision {}",
                    node_status.node_name, node_status.current_revision
                );
            }
            println!();
            println!("Controller health:");
            match status
                .conditions
                .iter()
                .find(|c| c.r#type == CONTROLLER_DEGRADED_CONDITION)
            {
                Some(condition) => print_condition(condition),
                None => println!("  (not reported yet)"),
            }
        }
        None => println!(
            "⚠️  Operator resource '{}' not found",
            config.operator_name
        ),
    }

    Ok(())
}

fn print_condition(condition: &Condition) {
    println!("  {}: {}", condition.r#type, condition.status);
    if !condition.reason.is_empty() {
        println!("    Reason: {}", condition.reason);
    }
    if !condition.message.is_empty() {
        println!("    Message: {}", condition.message);
    }
    if let Some(time) = &condition.last_transition_time {
        println!("    Last Transition: {time}");
    }
}
