use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

use anyhow::Context;
use beacon_common::network::host::ProbeResult;
use beacon_common::{config::Config, network::target::Target, success};
use beacon_core::SubnetScanner;
use colored::*;

use crate::bprint;
use crate::terminal::{colors, format, input::InputHandle, print, spinner::Spinner};

pub async fn scan(target: Target, cfg: &Config) -> anyhow::Result<()> {
    print::header("host scan", cfg.quiet);
    let range = target.to_range().context("invalid scan target")?;

    let stop_signal: Arc<AtomicBool> = Arc::new(AtomicBool::new(false));
    let input = if cfg.disable_input {
        None
    } else {
        InputHandle::listen(Arc::clone(&stop_signal))
    };
    let spinner = Spinner::start("Probing hosts", input.is_some());
    let progress = spinner.progress();

    let scanner = SubnetScanner::from_config(cfg)
        .with_stop_signal(Arc::clone(&stop_signal))
        .on_host_found(Arc::new(move |total: usize| progress.post(total)));

    let start_time: Instant = Instant::now();
    let hosts = match range {
        Some(range) => scanner.scan(range, cfg.timeout).await,
        None => scanner.scan_local(cfg.timeout).await,
    };

    spinner.finish();
    let interrupted = input.as_ref().is_some_and(InputHandle::interrupted);
    drop(input);

    let hosts = hosts.context("scan failed")?;
    if interrupted {
        beacon_common::warn!("Stopped early, results may be incomplete");
    }
    scan_ends(&hosts, start_time.elapsed(), cfg);
    Ok(())
}

fn scan_ends(hosts: &[ProbeResult], total_time: Duration, cfg: &Config) {
    if hosts.is_empty() {
        print::header("zero hosts detected", cfg.quiet);
        print::no_results(cfg.quiet);
        return;
    }

    print::header("reachable hosts", cfg.quiet);
    if cfg.quiet < 2 {
        for (idx, host) in hosts.iter().enumerate() {
            print::tree_head(idx, &format::host_name(host));
            print::as_tree_one_level(format::host_to_details(host));
            if idx + 1 != hosts.len() {
                bprint!();
            }
        }
    }

    let active_hosts: ColoredString = format!("{} active hosts", hosts.len()).bold().green();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output: &ColoredString =
        &format!("Scan Complete: {active_hosts} identified in {total_time}").color(colors::TEXT_DEFAULT);

    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::centerln(output);
        }
        _ => {
            bprint!();
            success!("{}", output)
        }
    }
}
