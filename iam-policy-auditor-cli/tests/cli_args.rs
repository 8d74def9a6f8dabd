use std::io::Write;
use std::process::{Command, Stdio};

const RISKY_POLICY: &str = r#"{
    "Version": "2012-10-17",
    "Statement": [{
        "Effect": "Allow",
        "Action": ["iam:PassRole", "ec2:RunInstances", "s3:GetObject", "iam:CreateAccessKey"],
        "Resource": "*"
    }]
}"#;

const SCOPED_POLICY: &str = r#"{
    "Version": "2012-10-17",
    "Statement": [{
        "Effect": "Allow",
        "Action": "s3:PutObject",
        "Resource": "arn:aws:s3:::my-bucket/*"
    }]
}"#;

const LOW_PRIORITY_POLICY: &str = r#"{
    "Version": "2012-10-17",
    "Statement": [{
        "Effect": "Allow",
        "Action": "ec2:TerminateInstances",
        "Resource": "*"
    }]
}"#;

fn write_policy(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .expect("failed to create temp policy file");
    file.write_all(contents.as_bytes())
        .expect("failed to write temp policy file");
    file
}

#[test]
fn scan_reports_all_risk_sections() {
    let policy = write_policy(RISKY_POLICY);
    let policy_path = policy.path().display().to_string();
    let output = Command::new(env!("CARGO_BIN_EXE_iam-policy-auditor"))
        .args(["--input-file", policy_path.as_str()])
        .output()
        .expect("failed to run scan");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Privilege Escalation"),
        "stdout was: {}",
        stdout
    );
    assert!(
        stdout.contains("PassExistingRoleToNewEc2Instance"),
        "stdout was: {}",
        stdout
    );
    assert!(stdout.contains("Data Exfiltration"), "stdout was: {}", stdout);
    assert!(stdout.contains("Resource Exposure"), "stdout was: {}", stdout);
    assert!(
        stdout.contains("Unrestricted Infrastructure Modification"),
        "stdout was: {}",
        stdout
    );
    assert!(stdout.contains("iam:CreateAccessKey"), "stdout was: {}", stdout);
}

#[test]
fn scan_scoped_policy_reports_nothing() {
    let policy = write_policy(SCOPED_POLICY);
    let policy_path = policy.path().display().to_string();
    let output = Command::new(env!("CARGO_BIN_EXE_iam-policy-auditor"))
        .args(["--input-file", policy_path.as_str()])
        .output()
        .expect("failed to run scan");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("There were no results found."),
        "stdout was: {}",
        stdout
    );
}

#[test]
fn high_priority_only_hides_the_modification_section() {
    let policy = write_policy(LOW_PRIORITY_POLICY);
    let policy_path = policy.path().display().to_string();
    let output = Command::new(env!("CARGO_BIN_EXE_iam-policy-auditor"))
        .args([
            "--input-file",
            policy_path.as_str(),
            "--high-priority-only",
        ])
        .output()
        .expect("failed to run scan");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    // the only finding is low priority, so the filtered report is empty
    assert!(
        stdout.contains("There were no results found."),
        "stdout was: {}",
        stdout
    );
    assert!(
        !stdout.contains("Unrestricted Infrastructure Modification"),
        "stdout was: {}",
        stdout
    );
}

#[test]
fn reads_policy_from_stdin() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_iam-policy-auditor"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn scan");
    child
        .stdin
        .as_mut()
        .expect("stdin is piped")
        .write_all(RISKY_POLICY.as_bytes())
        .expect("failed to write stdin");
    let output = child.wait_with_output().expect("failed to wait for scan");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Privilege Escalation"),
        "stdout was: {}",
        stdout
    );
}

#[test]
fn invalid_json_input_exits_nonzero() {
    let policy = write_policy("not json at all");
    let policy_path = policy.path().display().to_string();
    let output = Command::new(env!("CARGO_BIN_EXE_iam-policy-auditor"))
        .args(["--input-file", policy_path.as_str()])
        .output()
        .expect("failed to run scan");

    assert_ne!(output.status.code(), Some(0));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid JSON"), "stderr was: {}", stderr);
}

#[test]
fn exclusions_file_suppresses_findings() {
    let policy = write_policy(LOW_PRIORITY_POLICY);
    let mut exclusions = tempfile::Builder::new()
        .suffix(".yml")
        .tempfile()
        .expect("failed to create temp exclusions file");
    exclusions
        .write_all(b"exclude-actions:\n  - \"ec2:TerminateInstances\"\n")
        .expect("failed to write exclusions");

    let policy_path = policy.path().display().to_string();
    let exclusions_path = exclusions.path().display().to_string();
    let output = Command::new(env!("CARGO_BIN_EXE_iam-policy-auditor"))
        .args([
            "--input-file",
            policy_path.as_str(),
            "--exclusions-file",
            exclusions_path.as_str(),
        ])
        .output()
        .expect("failed to run scan");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("There were no results found."),
        "stdout was: {}",
        stdout
    );
}

#[test]
fn malformed_exclusions_file_exits_nonzero() {
    let policy = write_policy(RISKY_POLICY);
    let mut exclusions = tempfile::Builder::new()
        .suffix(".yml")
        .tempfile()
        .expect("failed to create temp exclusions file");
    exclusions
        .write_all(b"exclude-actions: 17\n")
        .expect("failed to write exclusions");

    let policy_path = policy.path().display().to_string();
    let exclusions_path = exclusions.path().display().to_string();
    let output = Command::new(env!("CARGO_BIN_EXE_iam-policy-auditor"))
        .args([
            "--input-file",
            policy_path.as_str(),
            "--exclusions-file",
            exclusions_path.as_str(),
        ])
        .output()
        .expect("failed to run scan");

    assert_ne!(output.status.code(), Some(0));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("invalid exclusions"),
        "stderr was: {}",
        stderr
    );
}

#[test]
fn help_describes_the_flags() {
    let output = Command::new(env!("CARGO_BIN_EXE_iam-policy-auditor"))
        .arg("--help")
        .output()
        .expect("failed to run --help");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--input-file"), "help was: {}", stdout);
    assert!(stdout.contains("--exclusions-file"), "help was: {}", stdout);
    assert!(stdout.contains("--high-priority-only"), "help was: {}", stdout);
}
