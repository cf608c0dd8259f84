//! ttyctl - inspect and adjust terminal line settings
//!
//! With no setting arguments, ttyctl prints the current line settings of
//! the controlling terminal (or of the device named with `-F`). Setting
//! arguments are applied left to right against a single read/modify/write
//! of the attributes, stty-style:
//!
//! ```text
//! ttyctl                       # report the controlling terminal
//! ttyctl -F /dev/ttyUSB0 115200,8,n,1
//! ttyctl -echo -icanon         # raw-ish input on the current terminal
//! ttyctl --save console        # snapshot settings as a named profile
//! ttyctl --load console        # apply them later
//! ```

use std::env;

use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use ttyctl::{Mode, ModemLines, Profile, ProfileStore, Terminal, When};

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// One setting argument, already validated.
#[derive(Debug, Clone)]
enum Setting {
    Mode(Mode),
    Speed(u32),
    InputSpeed(u32),
    OutputSpeed(u32),
    Canonical(bool),
    Echo(bool),
    Receiver(bool),
    HangupOnClose(bool),
    LocalMode(bool),
    Dtr(bool),
    Rts(bool),
}

#[derive(Default)]
struct Options {
    device: Option<String>,
    settings: Vec<Setting>,
    save: Option<String>,
    load: Option<String>,
    list_profiles: bool,
}

fn print_version() {
    eprintln!("ttyctl {}", VERSION);
}

fn print_help() {
    eprintln!("ttyctl {} - terminal line-settings control for Unix", VERSION);
    eprintln!();
    eprintln!("Usage: ttyctl [OPTIONS] [SETTING...]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -F, --file <DEVICE>   Operate on DEVICE instead of the controlling terminal");
    eprintln!("      --save <NAME>     Save the resulting settings as profile NAME");
    eprintln!("      --load <NAME>     Apply saved profile NAME before other settings");
    eprintln!("      --profiles        List saved profile names");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Settings (applied left to right):");
    eprintln!("  9600,8,n,1            Mode string: baud, character size, parity, stop bits");
    eprintln!("  115200                Baud rate for both directions");
    eprintln!("  ispeed N / ospeed N   Input / output baud rate");
    eprintln!("  [-]icanon             Canonical (line-editing) input");
    eprintln!("  [-]echo               Input echo");
    eprintln!("  [-]cread              Receiver enable");
    eprintln!("  [-]hupcl              Hang up on last close");
    eprintln!("  [-]clocal             Ignore modem status lines");
    eprintln!("  [-]dtr / [-]rts       Raise or drop a modem control line");
    eprintln!();
    eprintln!("With no settings, ttyctl prints the current line settings.");
    eprintln!();
    eprintln!("Profiles are stored in: ~/.ttyctl/profiles.toml");
}

fn parse_speed(arg: &str) -> Result<u32, String> {
    arg.parse::<u32>()
        .map_err(|_| format!("Invalid baud rate: {}", arg))
}

/// Parse one positional setting token.
fn parse_setting(arg: &str) -> Result<Setting, String> {
    if arg.contains(',') {
        return arg
            .parse::<Mode>()
            .map(Setting::Mode)
            .map_err(|e| e.to_string());
    }
    if !arg.is_empty() && arg.chars().all(|c| c.is_ascii_digit()) {
        return parse_speed(arg).map(Setting::Speed);
    }

    let (name, on) = match arg.strip_prefix('-') {
        Some(name) => (name, false),
        None => (arg, true),
    };
    match name {
        "icanon" | "canonical" => Ok(Setting::Canonical(on)),
        "echo" => Ok(Setting::Echo(on)),
        "cread" => Ok(Setting::Receiver(on)),
        "hupcl" => Ok(Setting::HangupOnClose(on)),
        "clocal" => Ok(Setting::LocalMode(on)),
        "dtr" => Ok(Setting::Dtr(on)),
        "rts" => Ok(Setting::Rts(on)),
        _ => Err(format!("Unknown setting: {}. Use -h for help.", arg)),
    }
}

fn parse_args() -> Result<Options, String> {
    let args: Vec<String> = env::args().collect();
    let mut opts = Options::default();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "-F" | "--file" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing device argument".to_string());
                }
                opts.device = Some(args[i].clone());
            }
            "--save" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing profile name for --save".to_string());
                }
                opts.save = Some(args[i].clone());
            }
            "--load" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing profile name for --load".to_string());
                }
                opts.load = Some(args[i].clone());
            }
            "--profiles" => {
                opts.list_profiles = true;
            }
            "ispeed" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing argument to ispeed".to_string());
                }
                opts.settings
                    .push(Setting::InputSpeed(parse_speed(&args[i])?));
            }
            "ospeed" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing argument to ospeed".to_string());
                }
                opts.settings
                    .push(Setting::OutputSpeed(parse_speed(&args[i])?));
            }
            arg => {
                opts.settings.push(parse_setting(arg)?);
            }
        }
        i += 1;
    }

    Ok(opts)
}

/// Apply all settings against one getattr/setattr cycle. Modem line
/// changes go through their own ioctls after the attributes land.
fn apply_settings(term: &Terminal, settings: &[Setting]) -> ttyctl::Result<()> {
    let mut attrs = term.attrs()?;
    let mut dirty = false;
    let mut modem_ops: Vec<(bool, ModemLines)> = Vec::new();

    for setting in settings {
        match setting {
            Setting::Mode(mode) => {
                attrs.apply_mode(mode)?;
                dirty = true;
            }
            Setting::Speed(speed) => {
                attrs.set_speed(*speed)?;
                dirty = true;
            }
            Setting::InputSpeed(speed) => {
                attrs.set_input_speed(*speed)?;
                dirty = true;
            }
            Setting::OutputSpeed(speed) => {
                attrs.set_output_speed(*speed)?;
                dirty = true;
            }
            Setting::Canonical(on) => {
                attrs.set_canonical(*on);
                dirty = true;
            }
            Setting::Echo(on) => {
                attrs.set_echo(*on);
                dirty = true;
            }
            Setting::Receiver(on) => {
                attrs.set_receiver_enabled(*on);
                dirty = true;
            }
            Setting::HangupOnClose(on) => {
                attrs.set_hangup_on_close(*on);
                dirty = true;
            }
            Setting::LocalMode(on) => {
                attrs.set_local_mode(*on);
                dirty = true;
            }
            Setting::Dtr(on) => modem_ops.push((*on, ModemLines::DTR)),
            Setting::Rts(on) => modem_ops.push((*on, ModemLines::RTS)),
        }
    }

    if dirty {
        term.set_attrs_when(When::Drain, &attrs)?;
        debug!("Applied {} settings to {}", settings.len(), term.name());
    }
    for (on, line) in modem_ops {
        if on {
            term.raise_modem_lines(line)?;
        } else {
            term.lower_modem_lines(line)?;
        }
    }
    Ok(())
}

fn flag(name: &str, on: bool) -> String {
    if on {
        name.to_string()
    } else {
        format!("-{}", name)
    }
}

fn print_report(term: &Terminal) -> ttyctl::Result<()> {
    let attrs = term.attrs()?;
    let mode = attrs.mode();

    println!("device: {}", term.name());
    if attrs.input_speed() != attrs.output_speed() {
        println!(
            "ispeed {} ospeed {} baud; mode {}",
            attrs.input_speed(),
            attrs.output_speed(),
            mode
        );
    } else {
        println!("speed {} baud; mode {}", mode.speed, mode);
    }
    println!(
        "{} {} {} {} {}",
        flag("icanon", attrs.canonical()),
        flag("echo", attrs.echo()),
        flag("cread", attrs.receiver_enabled()),
        flag("hupcl", attrs.hangup_on_close()),
        flag("clocal", attrs.local_mode()),
    );

    // Not every terminal has modem lines; a pty typically answers ENOTTY.
    match term.modem_lines() {
        Ok(lines) if !lines.is_empty() => println!("modem lines: {}", lines),
        Ok(_) => println!("modem lines: (none)"),
        Err(e) => debug!("Modem status unavailable on {}: {}", term.name(), e),
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let opts = match parse_args() {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(2);
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    if opts.list_profiles {
        let store = ProfileStore::load()?;
        if store.is_empty() {
            println!("no saved profiles");
        } else {
            for name in store.names() {
                println!("{}", name);
            }
        }
        return Ok(());
    }

    let term = match &opts.device {
        Some(path) => Terminal::open(path)?,
        None => Terminal::from_stdio()?,
    };
    debug!("Using terminal {}", term.name());

    if let Some(name) = &opts.load {
        let store = ProfileStore::load()?;
        let profile = store.get(name)?;
        let mut attrs = term.attrs()?;
        profile.apply_to_attrs(&mut attrs)?;
        term.set_attrs_when(When::Drain, &attrs)?;
        debug!("Applied profile {}", name);
    }

    if !opts.settings.is_empty() {
        apply_settings(&term, &opts.settings)?;
    }

    if let Some(name) = &opts.save {
        let mut store = ProfileStore::load()?;
        store.insert(name.clone(), Profile::capture(&term)?);
        store.save()?;
        println!("saved profile {}", name);
    }

    if opts.settings.is_empty() && opts.load.is_none() && opts.save.is_none() {
        print_report(&term)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_setting_tokens() {
        assert!(matches!(parse_setting("echo"), Ok(Setting::Echo(true))));
        assert!(matches!(parse_setting("-echo"), Ok(Setting::Echo(false))));
        assert!(matches!(
            parse_setting("-icanon"),
            Ok(Setting::Canonical(false))
        ));
        assert!(matches!(parse_setting("dtr"), Ok(Setting::Dtr(true))));
        assert!(matches!(
            parse_setting("115200"),
            Ok(Setting::Speed(115200))
        ));
        assert!(matches!(parse_setting("9600,8,n,1"), Ok(Setting::Mode(_))));
        assert!(parse_setting("bogus").is_err());
        assert!(parse_setting("9600,8,x,1").is_err());
    }
}
