use std::path::PathBuf;

use anyhow::{bail, Context};
use tokio::io::{AsyncBufReadExt, BufReader};

use scootvolt::battery::{format_percent, EvaluationResult, Tip};
use scootvolt::config::{JsonSettingsStore, LogLevel, SettingsStore};
use scootvolt::logging::{configure_logging, set_debug_flags, DebugFlags};
use scootvolt::reading::{
    extract_voltages, format_voltage_input, is_live_edit_voltage, parse_optional_voltage,
    EntryVerdict,
};
use scootvolt::{BatteryProfile, Calculator, Debouncer, PercentageModel, SettingsField};

/// Flags accepted before the command
#[derive(Debug, Default)]
struct Options {
    log_level: Option<LogLevel>,
    log_file: Option<PathBuf>,
    debug: Option<DebugFlags>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (options, args) = parse_options(args)?;

    let store = JsonSettingsStore::default();
    let stored_level = store.load().map(|s| s.log_level).unwrap_or_default();
    configure_logging(
        options.log_level.unwrap_or(stored_level),
        options.log_file.clone(),
        true,
    )
    .map_err(anyhow::Error::msg)?;
    if let Some(flags) = options.debug {
        set_debug_flags(flags);
    }

    let mut calculator = Calculator::new(store);

    match args.first().map(String::as_str) {
        None | Some("help") | Some("--help") | Some("-h") => print_usage(),
        Some("profiles") => print_profiles(),
        Some("scan") => {
            let text = args.get(1).context("scan needs the recognized text")?;
            select_profile_arg(&mut calculator, args.get(2))?;
            let scan = extract_voltages(text, calculator.profile());
            if scan.all.is_empty() {
                println!("No numbers found in the text");
            } else {
                let all: Vec<String> = scan.all.iter().map(|v| v.to_string()).collect();
                println!("Numbers found: {}", all.join(", "));
            }
            match scan.best {
                Some(voltage) => {
                    let profile = calculator.profile();
                    let result = calculator.set_voltage_text(&voltage.to_string())?;
                    print_result(profile, &voltage.to_string(), result);
                }
                None => bail!("No plausible battery voltage found in '{}'", text),
            }
        }
        Some("set") => {
            let field = args.get(1).context("set needs a field name")?;
            let value = args.get(2).map(String::as_str).unwrap_or("");
            set_field(&mut calculator, field, value)?;
        }
        Some("watch") => {
            select_profile_arg(&mut calculator, args.get(1))?;
            watch(&mut calculator).await?;
        }
        Some(voltage) => {
            select_profile_arg(&mut calculator, args.get(1))?;
            let voltage = voltage.to_string();
            calculator.set_voltage_text(&voltage)?;
            if let EntryVerdict::Clear { placeholder } = calculator.commit_voltage() {
                bail!("{}", placeholder);
            }
            let profile = calculator.profile();
            let result = calculator.refresh()?;
            print_result(profile, &voltage, result);
        }
    }

    Ok(())
}

fn parse_options(args: Vec<String>) -> anyhow::Result<(Options, Vec<String>)> {
    let mut options = Options::default();
    let mut rest = Vec::new();
    for arg in args {
        if let Some(level) = arg.strip_prefix("--log-level=") {
            options.log_level = Some(level.parse()?);
        } else if let Some(path) = arg.strip_prefix("--log-file=") {
            options.log_file = Some(PathBuf::from(path));
        } else if let Some(categories) = arg.strip_prefix("--debug=") {
            options.debug = Some(categories.parse().map_err(anyhow::Error::msg)?);
        } else {
            rest.push(arg);
        }
    }
    Ok((options, rest))
}

fn select_profile_arg<S: SettingsStore>(
    calculator: &mut Calculator<S>,
    arg: Option<&String>,
) -> anyhow::Result<()> {
    if let Some(arg) = arg {
        let profile: BatteryProfile = arg.parse()?;
        if profile != calculator.profile() {
            calculator.select_profile(profile)?;
        }
    }
    Ok(())
}

fn set_field<S: SettingsStore>(
    calculator: &mut Calculator<S>,
    field: &str,
    value: &str,
) -> anyhow::Result<()> {
    let field = match field {
        "max" => SettingsField::MaxCell,
        "nominal" => SettingsField::NominalCell,
        "min" => SettingsField::MinCell,
        "cutoff" => SettingsField::ControllerCutoff,
        "profile" => {
            let profile: BatteryProfile = value.parse()?;
            calculator.select_profile(profile)?;
            println!("Profile set to {}", profile);
            return Ok(());
        }
        "model" => {
            let model = match value {
                "linear" => PercentageModel::Linear,
                "corrected" => PercentageModel::Corrected,
                other => bail!("Unknown percentage model '{}'", other),
            };
            calculator.set_percentage_model(model)?;
            println!("Percentage model set to {}", value);
            return Ok(());
        }
        other => bail!("Unknown setting '{}'", other),
    };

    let applied = calculator.commit_field(field, value)?;
    println!("{:?} set to {}", field, applied);
    Ok(())
}

/// Read voltages line by line; the tip is printed once typing settles.
/// Numbers outside the lenient live range for the pack are not evaluated.
async fn watch<S: SettingsStore>(calculator: &mut Calculator<S>) -> anyhow::Result<()> {
    println!(
        "Enter voltages for the {} pack ({}), 'q' to quit",
        calculator.profile(),
        calculator.placeholder()
    );

    let mut debouncer = Debouncer::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line == "q" || line == "quit" {
            break;
        }
        if let Some(voltage) = parse_optional_voltage(line) {
            if !is_live_edit_voltage(voltage, calculator.profile()) {
                println!(
                    "{} is not a live reading for the {} pack, skipped",
                    format_voltage_input(line),
                    calculator.profile()
                );
                continue;
            }
        }

        let result = match calculator.set_voltage_text(line) {
            Ok(result) => result,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };
        println!(
            "{}  {}  {}",
            format_voltage_input(line),
            result.percent_display(),
            result.status_label
        );

        let tip = result.tip.clone();
        debouncer.schedule(move || print_tip(&tip));
    }
    debouncer.settle().await;
    Ok(())
}

fn print_result(profile: BatteryProfile, raw: &str, result: &EvaluationResult) {
    println!(
        "Battery: {} ({}S, nominal {:.1}V)",
        profile,
        profile.series_cells(),
        profile.nominal_voltage()
    );
    match result.cell_voltage {
        Some(cell) => println!("Voltage: {} ({:.2} V/cell)", format_voltage_input(raw), cell),
        None => println!("Voltage: -- V"),
    }
    println!(
        "Charge:  {} ({})",
        format_percent(result.percent),
        result.status_label
    );
    if let Some(tier) = result.safety_tier {
        println!("Safety:  {} ({:?})", tier.id(), result.alert_level);
    }
    println!(
        "Range:   {:.1}V to {:.1}V",
        result.bounds.min, result.bounds.max
    );
    print_tip(&result.tip);

    println!("\nReference:");
    for point in &result.reference_points {
        let marker = if point.is_current { " <" } else { "" };
        println!(
            "  {:>6.1}V  {:>6}  {}{}",
            point.voltage,
            format_percent(point.percent),
            point.label,
            marker
        );
    }
}

fn print_tip(tip: &Tip) {
    println!("\n{} {}", tip.icon.emoji(), tip.title);
    println!("   {}", tip.text);
    if tip.recommend_troubleshooting {
        println!("   Check the BMS, connectors and wiring before riding.");
    }
}

fn print_profiles() {
    println!("Profile  Cells  Nominal  Expected range");
    for profile in BatteryProfile::ALL {
        let (min, max) = profile.expected_range();
        println!(
            "{:<8} {:>5}  {:>6.1}V  {:.1}V to {:.1}V",
            profile.to_string(),
            profile.series_cells(),
            profile.nominal_voltage(),
            min,
            max
        );
    }
}

fn print_usage() {
    println!("ScootVolt - e-scooter battery voltage calculator");
    println!("\nUsage:");
    println!("  scootvolt <voltage> [profile]       - Evaluate a pack voltage (e.g. 78.5 72)");
    println!("  scootvolt scan \"<text>\" [profile]   - Pick the voltage out of OCR text");
    println!("  scootvolt watch [profile]           - Evaluate voltages typed line by line");
    println!("  scootvolt set <field> <value>       - Set max|nominal|min|cutoff|profile|model");
    println!("  scootvolt profiles                  - List battery profiles");
    println!("\nOptions:");
    println!("  --log-level=<error|warn|info|debug|trace>");
    println!("  --log-file=<path>");
    println!("  --debug=<engine,reading,config,app|all>");
}
