//! # Resolve Command
//!
//! Prints the controller-manager arguments a worker latency profile implies.

use anyhow::Result;
use latency_profile_controller::controller::reconciler::{resolve_raw, Resolution};

pub fn resolve_command(profile: &str) -> Result<()> {
    print!("{}", render(profile)?);
    Ok(())
}

fn render(profile: &str) -> Result<String> {
    let resolution = resolve_raw(profile)?;
    let shown = if profile.is_empty() { "<unset>" } else { profile };

    let mut out = format!("Profile: {shown}\n");
    match resolution {
        Resolution::ProfileEmpty => {
            out.push_str("No arguments are expected; the rollout is reported as ProfileEmpty\n");
        }
        Resolution::Expected(settings) => {
            out.push_str("Expected kube-controller-manager arguments:\n");
            for (name, value) in settings.iter() {
                out.push_str(&format!("  {name}: {value}\n"));
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_known_profile() {
        let out = render("LowUpdateSlowReaction").unwrap();
        assert!(out.contains("node-monitor-grace-period: 5m0s"));
    }

    #[test]
    fn test_render_empty_profile() {
        let out = render("").unwrap();
        assert!(out.starts_with("Profile: <unset>"));
        assert!(out.contains("ProfileEmpty"));
    }

    #[test]
    fn test_render_unknown_profile_fails() {
        let err = render("Fast").unwrap_err();
        assert_eq!(err.to_string(), "unknown worker latency profile 'Fast'");
    }
}
