use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

use anyhow::Context;
use beacon_common::{config::Config, network::target::Target, success};
use beacon_core::resolver::{ResolverSettings, ServiceResolver};
use beacon_core::{ServiceDirectory, SubnetScanner};
use colored::*;

use crate::bprint;
use crate::terminal::{colors, format, input::InputHandle, print, spinner::Spinner};

pub async fn discover(target: Target, cfg: &Config) -> anyhow::Result<()> {
    print::header("service discovery", cfg.quiet);
    let range = target.to_range().context("invalid discovery target")?;

    let stop_signal: Arc<AtomicBool> = Arc::new(AtomicBool::new(false));
    let input = if cfg.disable_input {
        None
    } else {
        InputHandle::listen(Arc::clone(&stop_signal))
    };
    let spinner = Spinner::start("Searching for services", input.is_some());
    let progress = spinner.progress();

    let scanner = SubnetScanner::from_config(cfg)
        .with_stop_signal(Arc::clone(&stop_signal))
        .on_host_found(Arc::new(move |total: usize| progress.post(total)));
    let directory = ServiceDirectory::new(scanner, ResolverSettings::from(cfg));

    let start_time: Instant = Instant::now();
    let services = directory.discover(range, cfg.timeout).await;

    spinner.finish();
    let interrupted = input.as_ref().is_some_and(InputHandle::interrupted);
    drop(input);

    let services = services.context("discovery failed")?;
    if interrupted {
        beacon_common::warn!("Stopped early, results may be incomplete");
    }
    discovery_ends(&services, start_time.elapsed(), cfg);
    Ok(())
}

fn discovery_ends(services: &[ServiceResolver], total_time: Duration, cfg: &Config) {
    if services.is_empty() {
        print::header("zero services detected", cfg.quiet);
        print::no_results(cfg.quiet);
        return;
    }

    print::header("services", cfg.quiet);
    if cfg.quiet < 2 {
        print_services(services);
    }
    print_summary(services.len(), total_time, cfg);
}

fn print_services(services: &[ServiceResolver]) {
    for (idx, service) in services.iter().enumerate() {
        print::tree_head(idx, &format::service_name(service));
        print::as_tree_one_level(format::service_to_details(service));
        if idx + 1 != services.len() {
            bprint!();
        }
    }
}

fn print_summary(found: usize, total_time: Duration, cfg: &Config) {
    let services: ColoredString = format!("{found} services").bold().green();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output: &ColoredString =
        &format!("Discovery Complete: {services} identified in {total_time}").color(colors::TEXT_DEFAULT);

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
