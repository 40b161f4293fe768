//! Nod-0 CLI
//!
//! Usage:
//!   nod0 --demo                             # Scripted behavior demo
//!   nod0 --serve                            # HTTP API server + control loop
//!   nod0 --demo --json                      # JSON output
//!   nod0 --animations custom.json --demo    # Custom animation library

use clap::Parser;
use std::time::{Duration, Instant};

use nod0::core::{load_preferences, run_server, BehaviorEngine};
use nod0::types::{ActuatorCommand, ActuatorSink, AnimationLibrary, BehaviorState};
use nod0::{CONTROL_TICK_MS, VERSION};

#[derive(Parser, Debug)]
#[command(
    name = "nod0",
    version = VERSION,
    about = "Nod-0 - Real-time pose composition and behavior control for a robot head",
    long_about = "Nod-0 blends idle animations, speech sway, face tracking, sound-direction\n\
                  turns and a commanded pose into one head pose, two antenna positions and\n\
                  a body-yaw target at a fixed 10 ms control rate.\n\n\
                  Modes:\n  \
                  --demo   Run a scripted conversation scenario against a printing sink\n  \
                  --serve  Run the control loop and expose the HTTP/WebSocket API\n\n\
                  States:\n  \
                  IDLE      - Slow breathing animation\n  \
                  LISTENING - Attentive perk, antennas frozen\n  \
                  THINKING  - Pondering tilt\n  \
                  SPEAKING  - Breathing plus speech sway"
)]
struct Args {
    /// Run the scripted behavior demo
    #[arg(short, long)]
    demo: bool,

    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Server address (default: 127.0.0.1:3000)
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// Animation library file (built-in set when missing)
    #[arg(long, default_value = "./animations.json")]
    animations: String,

    /// Preferences file
    #[arg(long, default_value = "./prefs.json")]
    prefs: String,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if args.serve {
        run_serve(&args).await;
    } else {
        // Default to the demo if no mode specified
        run_demo(&args).await;
    }
}

/// Build the engine from the configured library and preferences
fn build_engine(args: &Args) -> BehaviorEngine {
    let library = match AnimationLibrary::from_file(&args.animations) {
        Ok(library) if !library.is_empty() => library,
        Ok(_) | Err(_) => {
            eprintln!(
                "warning: {} missing or empty, using built-in animations",
                args.animations
            );
            AnimationLibrary::builtin()
        }
    };
    let engine = BehaviorEngine::new(library);
    engine.set_preferences(load_preferences(&args.prefs));
    engine
}

/// Sink that prints every Nth command to the terminal
struct PrintSink {
    json: bool,
    no_color: bool,
    counter: u64,
}

impl ActuatorSink for PrintSink {
    fn apply(&mut self, command: &ActuatorCommand) {
        self.counter += 1;
        // One line every 250 ms keeps the terminal readable
        if self.counter % 25 != 0 {
            return;
        }
        if self.json {
            if let Ok(json) = serde_json::to_string(&command) {
                println!("{}", json);
            }
            return;
        }
        let (roll, pitch, yaw) = command.pose.euler_angles();
        let dim = if self.no_color { "" } else { "\x1b[90m" };
        let reset = if self.no_color { "" } else { "\x1b[0m" };
        println!(
            "{}pose rpy=({:+.3} {:+.3} {:+.3}) t=({:+.3} {:+.3} {:+.3}) ant=({:+.2} {:+.2}) body={:+.3}{}",
            dim,
            roll,
            pitch,
            yaw,
            command.pose.translation[0],
            command.pose.translation[1],
            command.pose.translation[2],
            command.antennas.0,
            command.antennas.1,
            command.body_yaw,
            reset
        );
    }
}

/// Run a scripted conversation scenario against a printing sink
async fn run_demo(args: &Args) {
    let engine = build_engine(args);
    print_header("Demo Mode", args.no_color);

    let sink = PrintSink {
        json: args.json,
        no_color: args.no_color,
        counter: 0,
    };
    let handle = engine.spawn(sink);

    let script: [(f64, &str, BehaviorState); 6] = [
        (0.0, "Resting", BehaviorState::Idle),
        (3.0, "Wake word heard", BehaviorState::Listening),
        (6.0, "Pondering", BehaviorState::Thinking),
        (9.0, "Replying", BehaviorState::Speaking),
        (13.0, "Done replying", BehaviorState::Listening),
        (16.0, "Conversation over", BehaviorState::Idle),
    ];

    let start = Instant::now();
    for (at, label, state) in script {
        let target = start + Duration::from_secs_f64(at);
        tokio::time::sleep_until(tokio::time::Instant::from_std(target)).await;
        print_event(label, state, args.no_color);
        match state {
            BehaviorState::Idle => engine.on_idle(),
            BehaviorState::Listening => engine.on_listening_start(),
            BehaviorState::Thinking => engine.on_thinking_start(),
            BehaviorState::Speaking => {
                engine.on_speaking_start();
                // Synthetic speech: a second of modulated tone
                let samples: Vec<f32> = (0..16_000)
                    .map(|i| {
                        let t = i as f32 / 16_000.0;
                        0.3 * (2.0 * std::f32::consts::PI * 180.0 * t).sin()
                            * (2.0 * std::f32::consts::PI * 3.0 * t).sin().abs()
                    })
                    .collect();
                engine.feed_audio(&samples, 16_000);
            }
        }
    }

    tokio::time::sleep(Duration::from_secs(2)).await;
    engine.suspend();
    handle.abort();
    println!("\nDemo finished after {:.1}s", start.elapsed().as_secs_f64());
}

/// Print a demo script event
fn print_event(label: &str, state: BehaviorState, no_color: bool) {
    if no_color {
        println!("== {} -> {}", label, state);
    } else {
        println!(
            "{}== {} -> {}{}",
            state.color_code(),
            label,
            state,
            BehaviorState::color_reset()
        );
    }
}

/// Print header
fn print_header(mode: &str, no_color: bool) {
    if no_color {
        println!("========================================");
        println!("  Nod-0 v{} - {}", VERSION, mode);
        println!("========================================");
    } else {
        println!("\x1b[1m========================================\x1b[0m");
        println!("\x1b[1m  Nod-0 v{} - {}\x1b[0m", VERSION, mode);
        println!("\x1b[1m========================================\x1b[0m");
    }
    println!(
        "Control rate: {} ms | animations: built-in or file",
        CONTROL_TICK_MS
    );
    println!();
}

/// Run HTTP API server with the control loop attached
async fn run_serve(args: &Args) {
    let engine = build_engine(args);
    print_header("API Server", args.no_color);

    let sink = PrintSink {
        json: args.json,
        no_color: args.no_color,
        counter: 0,
    };
    let _loop_handle = engine.spawn(sink);

    if let Err(e) = run_server(&args.addr, engine).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
