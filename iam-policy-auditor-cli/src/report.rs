//! Colored terminal report for scan results. Presentation only; the
//! Finding's content is produced entirely by the scan core.

use colored::Colorize;
use iam_policy_auditor_scan::Finding;

pub(crate) fn print_finding(finding: Option<&Finding>, high_priority_only: bool) {
    let Some(finding) = finding else {
        println!("There were no results found.");
        return;
    };

    let mut sections_printed = 0;

    if !finding.privilege_escalation.is_empty() {
        sections_printed += 1;
        println!(
            "{}",
            "Potential Issue found: Policy is capable of Privilege Escalation".red()
        );
        for item in &finding.privilege_escalation {
            println!("- Method: {}", item.method);
            println!("  Actions: {}\n", item.actions.join(", "));
        }
    }

    if !finding.data_exfiltration_actions.is_empty() {
        sections_printed += 1;
        println!(
            "{}",
            "Potential Issue found: Policy is capable of Data Exfiltration".red()
        );
        println!(
            "{}: {}\n",
            "Actions".bold(),
            finding.data_exfiltration_actions.join(", ")
        );
    }

    if !finding.permissions_management_actions.is_empty() {
        sections_printed += 1;
        println!(
            "{}",
            "Potential Issue found: Policy is capable of Resource Exposure".red()
        );
        println!(
            "{}: {}\n",
            "Actions".bold(),
            finding.permissions_management_actions.join(", ")
        );
    }

    if !high_priority_only {
        sections_printed += 1;
        println!(
            "{}",
            "Potential Issue found: Policy is capable of Unrestricted Infrastructure Modification"
                .red()
        );
        println!("{}: {}", "Actions".bold(), finding.actions.join(", "));
    }

    if sections_printed == 0 {
        println!("There were no results found.");
    }
}
