use chordloops::{
    cli::{parse_command, validate_device, Args},
    clock::TickGenerator,
    config::Config,
    create_engine, default_progression,
    event_loop::{timeline_listing, EngineMessage, EventLoop},
    logging,
    midi_output::{list_output_devices, LogSink, MidiOutputManager, NoteSink},
    ui::run_state_inspector,
    Engine,
};
use clap::Parser;
use crossbeam::channel::{unbounded, Sender};
use std::io::{self, BufRead};
use std::thread;

fn main() {
    let args = parse_command_line_arguments();

    if args.list_devices {
        list_available_devices(&list_output_devices());
        return;
    }

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    initialize_logging(&config);

    let sink = match create_note_sink(&config) {
        Ok(sink) => sink,
        Err(error_msg) => {
            log::error!("{}", error_msg);
            eprintln!("{}", error_msg);
            std::process::exit(1);
        }
    };

    let mut engine = create_engine(&config);
    load_initial_progression(&mut engine, &config);
    print!("{}", timeline_listing(&engine));

    let inspector = config
        .inspector
        .then(|| run_state_inspector(engine.shared_state()));

    let (message_tx, message_rx) = unbounded();
    let mut tick_generator = TickGenerator::new();
    tick_generator.start(config.tick_interval, message_tx.clone());
    spawn_input_reader(message_tx);

    let event_loop = EventLoop::new(engine, message_rx, sink, config.export_path.clone());
    let engine = event_loop.run();

    tick_generator.stop();
    drop(engine);
    if let Some(handle) = inspector {
        let _ = handle.join();
    }
    log::info!("Application exiting");
}

fn initialize_logging(config: &Config) {
    if let Err(e) = logging::init_logger(&config.log_level) {
        eprintln!("Logger initialization failed: {}", e);
    }
    log::info!("Application starting");
}

fn parse_command_line_arguments() -> Args {
    Args::parse()
}

fn list_available_devices(devices: &[String]) {
    println!("Available MIDI output devices:");
    for device in devices {
        println!("  - {}", device);
    }
}

fn create_note_sink(config: &Config) -> Result<Box<dyn NoteSink>, String> {
    let Some(device_name) = &config.midi_output_device else {
        return Ok(Box::new(LogSink));
    };

    validate_device(device_name, &list_output_devices())?;
    let mut manager = MidiOutputManager::new();
    manager
        .connect_to_device(device_name)
        .map_err(|e| format!("Error connecting to MIDI device: {}", e))?;
    log::info!("Successfully connected to MIDI device: {}", device_name);
    println!("Successfully connected to MIDI device: {}", device_name);
    Ok(Box::new(manager))
}

fn load_initial_progression(engine: &mut Engine, config: &Config) {
    let result = match &config.import {
        Some(path) => engine.import_file(path),
        None => engine.import_sequence(&default_progression()),
    };
    match result {
        Ok(report) => {
            for skipped in &report.skipped {
                eprintln!("Skipped segment {}: {}", skipped.index, skipped.error);
            }
        }
        Err(e) => {
            log::error!("Failed to load initial progression: {}", e);
            eprintln!("Failed to load initial progression: {}", e);
        }
    }
}

fn spawn_input_reader(message_tx: Sender<EngineMessage>) {
    println!("Commands: add <amount> <single> <chord> [scale|quick], remove <n>, bpm <n>, play, stop, toggle, list, import <file>, export [file], quit");
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            match parse_command(&line) {
                Ok(Some(message)) => {
                    let shutdown = message == EngineMessage::Shutdown;
                    if message_tx.send(message).is_err() || shutdown {
                        return;
                    }
                }
                Ok(None) => {}
                Err(e) => eprintln!("{}", e),
            }
        }
        // End of input behaves like quit
        let _ = message_tx.send(EngineMessage::Shutdown);
    });
}
