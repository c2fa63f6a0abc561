//! Run the slampibot control loop against the simulated robot.
//!
//! Prints `roll pitch yaw` while driving and a summary when the run ends.
//! Ctrl+C cancels the run; both motors are coasted before exit.
//!
//! Usage:
//!   cargo run -p slampibot_sitl --bin slampibot_sitl -- [OPTIONS]
//!
//! Options:
//!   --mode <velocity|pattern>  Drive mode (default: pattern)
//!   --linear <V>               Linear velocity (default: 0.5)
//!   --angular <W>              Angular velocity (default: -0.1)
//!   --duration-ms <MS>         Velocity mode run time (default: until Ctrl+C)
//!   --phase-ms <MS>            Pattern phase length (default: 3000)
//!   --cycles <N>               Pattern cycles (default: until Ctrl+C)
//!   --period-ms <MS>           Control loop period (default: 10)
//!   --print-every <N>          Print attitude every N iterations (default: 10)
//!   --seed <N>                 Sensor noise seed
//!   --lockstep                 Run as fast as possible
//!   --param <NAME=VALUE>       Override a parameter (repeatable)
//!   --list-params              Print all parameters and exit

use std::env;
use std::process;
use std::str::FromStr;

use slampibot::rover::{DEFAULT_PHASE_MS, PATTERN_ANGULAR, PATTERN_LINEAR};
use slampibot_core::kinematics::DriveRequest;
use slampibot_core::parameters::{DriveParams, ParamFlags};
use slampibot_sitl::{run_until, DriveMode, Pace, RobotConfig, SimConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Velocity,
    Pattern,
}

struct Args {
    mode: Mode,
    linear: f32,
    angular: f32,
    duration_ms: Option<u64>,
    phase_ms: u64,
    cycles: Option<u32>,
    period_ms: u32,
    print_every: u32,
    seed: Option<u64>,
    lockstep: bool,
    params: Vec<String>,
    list_params: bool,
}

fn parse_args() -> Args {
    let mut args = Args {
        mode: Mode::Pattern,
        linear: PATTERN_LINEAR,
        angular: PATTERN_ANGULAR,
        duration_ms: None,
        phase_ms: DEFAULT_PHASE_MS,
        cycles: None,
        period_ms: DriveParams::default().loop_period_ms,
        print_every: 10,
        seed: None,
        lockstep: false,
        params: Vec::new(),
        list_params: false,
    };

    let raw: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < raw.len() {
        match raw[i].as_str() {
            "--mode" => {
                i += 1;
                args.mode = match raw.get(i).map(String::as_str) {
                    Some("velocity") => Mode::Velocity,
                    Some("pattern") => Mode::Pattern,
                    _ => {
                        eprintln!("Error: --mode must be 'velocity' or 'pattern'");
                        process::exit(1);
                    }
                };
            }
            "--linear" => {
                i += 1;
                args.linear = parse_arg(&raw, i, "linear");
            }
            "--angular" => {
                i += 1;
                args.angular = parse_arg(&raw, i, "angular");
            }
            "--duration-ms" => {
                i += 1;
                args.duration_ms = Some(parse_arg(&raw, i, "duration-ms"));
            }
            "--phase-ms" => {
                i += 1;
                args.phase_ms = parse_arg(&raw, i, "phase-ms");
            }
            "--cycles" => {
                i += 1;
                args.cycles = Some(parse_arg(&raw, i, "cycles"));
            }
            "--period-ms" => {
                i += 1;
                args.period_ms = parse_arg(&raw, i, "period-ms");
            }
            "--print-every" => {
                i += 1;
                args.print_every = parse_arg(&raw, i, "print-every");
            }
            "--seed" => {
                i += 1;
                args.seed = Some(parse_arg(&raw, i, "seed"));
            }
            "--lockstep" => args.lockstep = true,
            "--param" => {
                i += 1;
                args.params.push(parse_arg(&raw, i, "param"));
            }
            "--list-params" => args.list_params = true,
            "-h" | "--help" => {
                print_usage();
                process::exit(0);
            }
            other => {
                eprintln!("Unknown option: {other}");
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    args
}

fn parse_arg<T: FromStr>(raw: &[String], i: usize, name: &str) -> T {
    raw.get(i)
        .unwrap_or_else(|| {
            eprintln!("Error: --{name} requires a value");
            process::exit(1);
        })
        .parse()
        .unwrap_or_else(|_| {
            eprintln!("Error: invalid value for --{name}");
            process::exit(1);
        })
}

fn print_usage() {
    eprintln!(
        "Usage: slampibot_sitl [OPTIONS]\n\
         \n\
         Options:\n\
         \x20 --mode <velocity|pattern>  Drive mode (default: pattern)\n\
         \x20 --linear <V>               Linear velocity (default: 0.5)\n\
         \x20 --angular <W>              Angular velocity (default: -0.1)\n\
         \x20 --duration-ms <MS>         Velocity mode run time (default: until Ctrl+C)\n\
         \x20 --phase-ms <MS>            Pattern phase length (default: 3000)\n\
         \x20 --cycles <N>               Pattern cycles (default: until Ctrl+C)\n\
         \x20 --period-ms <MS>           Control loop period (default: 10)\n\
         \x20 --print-every <N>          Print attitude every N iterations (default: 10)\n\
         \x20 --seed <N>                 Sensor noise seed\n\
         \x20 --lockstep                 Run as fast as possible\n\
         \x20 --param <NAME=VALUE>       Override a parameter (repeatable)\n\
         \x20 --list-params              Print all parameters and exit\n\
         \x20 -h, --help                 Show this help"
    );
}

fn build_config(args: &Args) -> SimConfig {
    let request = DriveRequest::new(args.linear, args.angular);
    let mode = match args.mode {
        Mode::Velocity => DriveMode::Velocity {
            request,
            duration_ms: args.duration_ms,
        },
        Mode::Pattern => DriveMode::Pattern {
            request,
            phase_ms: args.phase_ms,
            cycles: args.cycles,
        },
    };

    SimConfig {
        mode,
        pace: if args.lockstep {
            Pace::Lockstep
        } else {
            Pace::RealTime
        },
        robot: RobotConfig {
            seed: args.seed,
            ..RobotConfig::default()
        },
        drive: DriveParams {
            loop_period_ms: args.period_ms,
            ..DriveParams::default()
        },
        print_every: args.print_every,
        ..SimConfig::default()
    }
}

fn print_params(config: &SimConfig) {
    let store = match config.parameter_store() {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };
    for (name, value, flags) in store.iter() {
        let kind = if flags.contains(ParamFlags::CALIBRATION) {
            " (calibration)"
        } else {
            ""
        };
        println!("{name:<16} {value}{kind}");
    }
}

#[tokio::main]
async fn main() {
    let args = parse_args();
    let mut config = build_config(&args);

    if let Err(e) = config.apply_params(args.params.iter().map(String::as_str)) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
    if args.list_params {
        print_params(&config);
        return;
    }

    println!("=== slampibot SITL ===");
    println!(
        "Mode: {:?}, request: ({}, {}), period: {} ms, pace: {:?}",
        args.mode, args.linear, args.angular, config.drive.loop_period_ms, config.pace
    );
    println!("Printing roll pitch yaw. Press Ctrl+C to stop.\n");

    let stop = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => println!("\nShutdown requested."),
            Err(e) => {
                eprintln!("Ctrl+C handler unavailable: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    match run_until(config, stop).await {
        Ok(report) => {
            println!("\n=== Run Summary ===");
            println!("Outcome: {:?}", report.summary.outcome);
            println!("Iterations: {}", report.summary.iterations);
            println!("Sim time: {:.2}s", report.sim_time_ms as f64 / 1000.0);
            if let Some(attitude) = report.attitude {
                let heading = attitude.heading.map_or("-", |h| h.as_str());
                println!("Last attitude: {} ({})", attitude, heading);
            }
            println!(
                "Robot: heading {:.1} deg, position ({:.3}, {:.3}) m",
                report.robot.heading_deg, report.robot.x_m, report.robot.y_m
            );
            println!(
                "Encoders: left {}, right {}",
                report.encoders.0, report.encoders.1
            );
            println!("Motors: {:?}", report.motors);
        }
        Err(e) => {
            eprintln!("Simulation failed: {e}");
            process::exit(1);
        }
    }
}
