//! # CRD Generator
//!
//! Generates Kubernetes CustomResourceDefinition (CRD) YAML from the Rust type
//! definitions of the resources this controller reads and writes.
//!
//! ## Usage
//!
//! ```bash
//! # Generate CRD YAML for a local test cluster
//! cargo run --bin crdgen > config/crd/crds.yaml
//!
//! # Generate and apply directly
//! cargo run --bin crdgen | kubectl apply -f -
//! ```
//!
//! On OpenShift both CRDs are installed by the platform; this output is
//! meant for kind/k3d clusters used in development.

use kube::core::CustomResourceExt;
use latency_profile_controller::crd::{KubeControllerManager, NodeConfig};

fn main() {
    let crds = [NodeConfig::crd(), KubeControllerManager::crd()];

    println!("# This file is auto-generated by crdgen");
    println!("# DO NOT EDIT THIS FILE MANUALLY");
    println!("# Fix schema issues in the Rust code (src/crd/) instead");
    println!("#");
    for crd in &crds {
        match serde_yaml::to_string(crd) {
            Ok(yaml) => {
                println!("---");
                print!("{yaml}");
            }
            Err(e) => {
                eprintln!("Failed to serialize CRD to YAML: {e}");
                std::process::exit(1);
            }
        }
    }
}
