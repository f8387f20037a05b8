//! 握手探测
//!
//! 打开链路（含上电序列），依次执行 WAKE 和 SLEEP 握手并打印结果，
//! 用于确认接线、波特率和固件应答。

use super::open_link;
use crate::config::AxioConfig;
use anyhow::{Result, bail};
use axio_sdk::driver::{AckOutcome, CommandLink};
use axio_sdk::protocol::Command;

pub fn execute(config: &AxioConfig, dry_run: bool) -> Result<()> {
    let link = open_link(config, dry_run);
    if !link.is_available() {
        bail!("Could not open {}", config.link.port);
    }

    let result = probe_link(&link);
    link.close();
    result
}

/// 在已打开的链路上执行 WAKE/SLEEP 握手，任一未确认即返回错误
fn probe_link(link: &CommandLink) -> Result<()> {
    let timeout = link.config().ack_timeout();
    let mut failures = Vec::new();
    for command in [Command::Wake, Command::Sleep] {
        let outcome = link.handshake_default(command);
        println!("{:<6} -> {}", command.to_string(), describe(outcome));
        if let Some(expected) = command.expected_ack()
            && let Err(e) = outcome.into_result(expected, timeout)
        {
            failures.push(format!("{command}: {e}"));
        }
    }

    let metrics = link.metrics().snapshot();
    println!(
        "sent {} commands, received {} lines, {} ack timeouts",
        metrics.commands_sent, metrics.lines_received, metrics.ack_timeouts
    );
    if let Some(rate) = metrics.ack_success_rate() {
        println!("ack success rate: {:.0}%", rate * 100.0);
    }

    if !failures.is_empty() {
        bail!("Device did not acknowledge every handshake: {}", failures.join("; "));
    }
    Ok(())
}

fn describe(outcome: AckOutcome) -> &'static str {
    match outcome {
        AckOutcome::Matched => "acknowledged",
        AckOutcome::TimedOut => "no acknowledgment (timed out)",
        AckOutcome::Unavailable => "link unavailable",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axio_sdk::driver::LinkConfig;
    use axio_sdk::link::MockLink;

    #[test]
    fn test_dry_run_probe_succeeds() {
        let config = AxioConfig::default();
        assert!(execute(&config, true).is_ok());
    }

    #[test]
    fn test_silent_device_reports_timeouts() {
        let link = CommandLink::new(
            MockLink::new(),
            LinkConfig {
                ack_timeout_ms: 20,
                ack_poll_ms: 1,
            },
        );
        let err = probe_link(&link).unwrap_err().to_string();
        assert!(err.contains("WAKE: No AWAKE acknowledgment within 20 ms"), "{err}");
        assert!(err.contains("SLEEP: No ASLEEP acknowledgment within 20 ms"), "{err}");
        assert_eq!(link.metrics().snapshot().ack_success_rate(), Some(0.0));
    }

    #[test]
    fn test_firmware_acks_give_full_success_rate() {
        let link = CommandLink::new(MockLink::with_firmware_acks(), LinkConfig::default());
        assert!(probe_link(&link).is_ok());
        assert_eq!(link.metrics().snapshot().ack_success_rate(), Some(1.0));
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe(AckOutcome::TimedOut), "no acknowledgment (timed out)");
    }
}
