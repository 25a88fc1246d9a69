use anyhow::{Context, Result};
use clap::Parser;
use ddscalc::cli::{Cli, OutputFormat};
use ddscalc::config::AnalyzerConfig;
use ddscalc::frame::{Encoding, FrameCalculator, FrameParameters, DEFAULT_MTU, FRAME_OVERHEAD};
use ddscalc::log_source::{FileLogSource, JournalctlSource, LogSource};
use ddscalc::mtu::{detect_mtu, MtuDetection};
use ddscalc::reference::SettingsFileLocator;
use ddscalc::report::{group_thousands, StabilityAnalyzer};
use ddscalc::settings::{cycle_min_time, DdsSettings, SettingsNote};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

const DEFAULT_INTERFACE: &str = "enp5s0";

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn banner(title: &str) {
    println!("\n{}\n{}\n{}", "=".repeat(100), title, "=".repeat(100));
}

fn print_header() {
    println!(
        r#"
╔═══════════════════════════════════════════════════════════════════════════════╗
║              DDS CONFIGURATION & RECEIVER LOG ANALYSIS                        ║
║                    Optimized for High-Quality Reference Clocks                ║
║                                                                               ║
║  Focus: Clock STABILITY (phase noise/jitter), not just accuracy               ║
╚═══════════════════════════════════════════════════════════════════════════════╝"#
    );
}

fn load_config(args: &Cli) -> Result<AnalyzerConfig> {
    let config = match &args.config {
        Some(path) => AnalyzerConfig::from_file(path)?,
        None => AnalyzerConfig::default(),
    };

    if let Err(e) = config.validate() {
        anyhow::bail!("Invalid analyzer configuration: {}", e);
    }
    Ok(config)
}

/// `--detect-mtu`: list interfaces and the auto-selected one
fn run_mtu_detection(args: &Cli) -> Result<()> {
    let detection = detect_mtu(args.interface.as_deref());

    if args.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&detection)?);
        return Ok(());
    }

    print_header();
    banner("NETWORK INTERFACE MTU DETECTION");
    println!();

    match (&detection.selected, &args.interface) {
        (Some(selected), Some(_)) => {
            println!("Interface: {}", selected.name);
            println!("MTU: {} bytes", selected.mtu);
            println!("Detection method: {}", detection.method.as_str());
        }
        (Some(selected), None) => {
            println!("All network interfaces (excluding loopback):");
            let mut listed = detection.interfaces.clone();
            listed.sort_by(|a, b| a.name.cmp(&b.name));
            for iface in &listed {
                let marker = if iface.name == selected.name {
                    " ← AUTO-SELECTED (highest MTU)"
                } else {
                    ""
                };
                println!("  {:15}: {:5} bytes{}", iface.name, iface.mtu, marker);
            }
            println!(
                "\nAuto-selected interface: {} (MTU: {} bytes)",
                selected.name, selected.mtu
            );
            println!("Detection method: {}", detection.method.as_str());
        }
        (None, Some(requested)) => {
            println!("✗ Could not detect MTU");
            println!("  Interface '{}' not found or MTU detection failed", requested);
        }
        (None, None) => {
            println!("✗ Could not detect MTU");
            println!("  No network interfaces found or MTU detection failed");
        }
    }

    println!("\n{}", "=".repeat(100));
    Ok(())
}

/// `--analyze-sync` / `--analyze-memory`
fn run_analysis(args: &Cli, config: &AnalyzerConfig, service: String, max_lines: usize) -> Result<()> {
    let source: Box<dyn LogSource> = match &args.log_file {
        Some(path) => Box::new(FileLogSource::new(path)),
        None => Box::new(JournalctlSource),
    };
    let locator = Box::new(SettingsFileLocator::new(config.settings_paths.clone()));

    let report = StabilityAnalyzer::new(service, source, locator)
        .with_reference(args.cycle_time)
        .analyze(max_lines);

    match args.format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        ),
        OutputFormat::Text => println!("{}", report.to_report_string()),
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct ConfigurationOutput<'a> {
    interface: &'a str,
    mtu: u32,
    mtu_detected: bool,
    encoding: Encoding,
    cycle_time_us: u32,
    cycle_min_time_us: u32,
    frame: &'a FrameParameters,
    settings: &'a DdsSettings,
    notes: &'a [SettingsNote],
    settings_file: &'a str,
}

/// Resolve MTU and interface for configuration mode
///
/// Detection failure falls back to the default MTU.
fn resolve_link(args: &Cli, announce: bool) -> (u32, String, bool) {
    if let Some(mtu) = args.mtu {
        let interface = args.interface.clone().unwrap_or_else(|| DEFAULT_INTERFACE.to_string());
        return (mtu, interface, false);
    }

    let detection: MtuDetection = detect_mtu(args.interface.as_deref());
    match (detection.mtu(), detection.interface()) {
        (Some(mtu), Some(interface)) => {
            if announce {
                println!("✓ Auto-detected MTU: {} bytes on interface {}", mtu, interface);
            }
            (mtu, interface.to_string(), true)
        }
        _ => {
            tracing::warn!("MTU detection failed, falling back to {}", DEFAULT_MTU);
            if announce {
                println!("⚠ MTU auto-detection failed, using default: {} bytes", DEFAULT_MTU);
            }
            let interface = args.interface.clone().unwrap_or_else(|| DEFAULT_INTERFACE.to_string());
            (DEFAULT_MTU, interface, false)
        }
    }
}

fn print_next_steps() {
    banner("NEXT STEPS");
    println!(
        r#"
1. SAVE CONFIGURATION:
   Copy the above to: ~/DirettaAlsaHost/setting.inf          (diretta_sync_host)
   Copy the above to: ~/MemoryPlay/memoryplay_setting.inf    (diretta_memoryplay_host)

2. RESTART THE HOST SERVICE:
   sudo systemctl restart diretta_sync_host.service
   sudo systemctl restart diretta_memoryplay_host.service

3. ANALYZE PERFORMANCE:
   ddscalc --analyze-sync 10000
   ddscalc --analyze-memory 10000

4. INTERPRET RESULTS:
   • Network jitter IQR < 0.5%: Excellent network stability
   • Buffer correction IQR < 0.010: Good clock matching
   • Buffer correction IQR > 0.020: Consider PTP synchronization
"#
    );
}

/// Default mode: compute the 48 kHz cycle time and emit the settings file
fn run_configuration(args: &Cli) -> Result<()> {
    let json = args.format == OutputFormat::Json;
    let (mtu, interface, mtu_detected) = resolve_link(args, !json);

    let encoding = Encoding::from_dsd_flag(!args.pcm);
    let (cycle_time_us, params) = FrameCalculator::new(mtu).cycle_time_for_48k(encoding);

    if params.samples_per_frame == 0 {
        anyhow::bail!(
            "Invalid MTU: {} bytes leaves no room for audio after the {} byte frame overhead",
            mtu,
            FRAME_OVERHEAD
        );
    }
    let settings = args.settings(&interface);
    let notes = settings.validate();
    let settings_file = settings.render(cycle_time_us);

    if json {
        let output = ConfigurationOutput {
            interface: &interface,
            mtu,
            mtu_detected,
            encoding,
            cycle_time_us,
            cycle_min_time_us: cycle_min_time(cycle_time_us),
            frame: &params,
            settings: &settings,
            notes: &notes,
            settings_file: &settings_file,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if !args.config_only {
        print_header();
        banner("CONFIGURATION SUMMARY");
        println!("Format: {}", encoding.label());
        println!("Interface: {}", interface);
        println!("MTU: {} bytes", mtu);
        println!(
            "Base calculation: 48kHz ({}: {} Hz = {:.3} MHz)",
            if encoding.is_dsd() { "DSD256" } else { "PCM" },
            group_thousands(params.sample_rate as usize),
            params.sample_rate_mhz()
        );
        println!(
            "Samples per frame: {}",
            group_thousands(params.samples_per_frame as usize)
        );
        println!(
            "Audio bytes per frame: {} (frame size {} bytes)",
            group_thousands(params.audio_bytes as usize),
            group_thousands(params.total_frame_size as usize)
        );
        println!(
            "Target CycleTime: {} μs (exact {:.4} ms, {:.1} packets/s)",
            cycle_time_us,
            params.cycle_time_ms(),
            params.packet_rate_hz
        );
        println!(
            "CycleMinTime: {} μs (0.5% lower margin)",
            cycle_min_time(cycle_time_us)
        );
        println!(
            "Network Buffering: periodMin={}, periodMax={}",
            settings.period_min, settings.period_max
        );
        println!("Clock Sync Buffer: syncBufferCount={}", settings.sync_buffer);
        println!("Total buffering: {} periods", settings.total_periods());

        if !notes.is_empty() {
            banner("CONFIGURATION NOTES");
            println!();
            for note in &notes {
                println!("  {}\n", note);
            }
        }
    }

    banner("DDS SETTINGS FILE");
    println!();
    println!("{}", settings_file);

    if !args.config_only {
        print_next_steps();
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    if args.detect_mtu {
        return run_mtu_detection(&args);
    }

    if args.analysis_requested() {
        if let Err(e) = args.validate_cycle_time() {
            anyhow::bail!("Invalid cycle time: {}", e);
        }
        let config = load_config(&args)?;
        if let Some((service, max_lines)) = args.analysis_target(&config) {
            return run_analysis(&args, &config, service, max_lines);
        }
    }

    run_configuration(&args)
}
