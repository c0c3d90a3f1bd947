//! List rules command implementation.

use flexlint_checks::all_rules;
use flexlint_core::{Config, NodeKind};

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules:\n");
    println!("{:<8} {:<35} {:<9} Description", "Code", "Name", "Severity");
    println!("{}", "-".repeat(90));

    for rule in all_rules(&Config::default()) {
        println!(
            "{:<8} {:<35} {:<9} {}",
            rule.key(),
            rule.name(),
            rule.default_severity().to_string(),
            rule.description()
        );
    }

    println!("\nPresets:");
    println!("  sonar-way  - S1467, S1314 (default)");
    println!("  all        - Every built-in rule");

    println!("\nUse --rules to filter specific rules, e.g.:");
    println!("  flexlint check --rules octal-value");
    println!("  flexlint check --rules S1467,S1314");

    println!("\nNode kinds usable in [[node-rules]]:");
    let kinds: Vec<&str> = NodeKind::ALL.iter().map(|k| k.as_str()).collect();
    for chunk in kinds.chunks(4) {
        println!("  {}", chunk.join(", "));
    }
}
