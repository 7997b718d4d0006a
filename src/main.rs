extern crate clap;
use log::{error, info};
use std::error::Error;
use std::fs::File;
use std::process;

use chip8::display::{Display, MonoTermDisplay};
use chip8::environment::Environment;
use chip8::input::TerminalInput;
use chip8::{Chip8Interpreter, Config, Quirks};

/// Configures command-line interface using clap
fn get_cli_config<'a>() -> clap::ArgMatches<'a> {
    clap::App::new("chip8")
        .version("0.1")
        .about("CHIP-8 interpreter for the terminal")
        .arg(
            clap::Arg::with_name("ROM")
                .help("program to run")
                .required_unless("test-card")
                .index(1),
        )
        .arg(
            clap::Arg::with_name("shift-quirk")
                .long("shift-quirk")
                .help("8XY6/8XYE shift VX in place and ignore VY"),
        )
        .arg(
            clap::Arg::with_name("load-store-quirk")
                .long("load-store-quirk")
                .help("FX55/FX65 leave I unchanged"),
        )
        .arg(
            clap::Arg::with_name("speed")
                .long("speed")
                .takes_value(true)
                .value_name("IPS")
                .help("instructions per second"),
        )
        .arg(
            clap::Arg::with_name("cycles")
                .long("cycles")
                .takes_value(true)
                .value_name("N")
                .help("stop after N cycles"),
        )
        .arg(
            clap::Arg::with_name("seed")
                .long("seed")
                .takes_value(true)
                .value_name("N")
                .help("seed for the random number instruction"),
        )
        .arg(
            clap::Arg::with_name("test-card")
                .long("test-card")
                .help("show the display test card and exit"),
        )
        .get_matches()
}

fn parse_arg<T: std::str::FromStr>(matches: &clap::ArgMatches, name: &str) -> Result<Option<T>, String> {
    matches
        .value_of(name)
        .map(|v| v.parse().map_err(|_| format!("invalid value for --{}: {}", name, v)))
        .transpose()
}

fn run(matches: &clap::ArgMatches) -> Result<(), Box<dyn Error>> {
    let mut config = Config {
        quirks: Quirks {
            shift_uses_single_register: matches.is_present("shift-quirk"),
            load_store_keeps_index: matches.is_present("load-store-quirk"),
        },
        rng_seed: parse_arg(matches, "seed")?,
        ..Config::default()
    };
    if let Some(speed) = parse_arg(matches, "speed")? {
        config.instructions_per_second = speed;
    }
    let max_cycles = parse_arg(matches, "cycles")?;

    if matches.is_present("test-card") {
        let mut display = MonoTermDisplay::new()?;
        display.test_card()?;
        return Ok(());
    }

    // load the ROM before touching the terminal so load errors print cleanly
    let path = matches.value_of("ROM").unwrap_or_default();
    let mut interpreter = Chip8Interpreter::new(&config);
    interpreter.read_program(&mut File::open(path)?)?;

    let mut display = MonoTermDisplay::new()?;
    let mut input = TerminalInput::new(config.key_hold)?;
    let result = Environment::with_interpreter(interpreter, &config, &mut display, &mut input)
        .run(max_cycles);
    let size = display.get_display_size_bytes();
    drop(input);

    // shove some junk on stdout to stop the cli messing up the last frame
    for _ in 0..size / 64 {
        println!();
    }
    let summary = result?;
    info!("stopped after {} cycles", summary.cycles);
    Ok(())
}

fn main() {
    env_logger::init();
    let matches = get_cli_config();
    if let Err(e) = run(&matches) {
        error!("{}", e);
        eprintln!("chip8: {}", e);
        process::exit(1);
    }
}
