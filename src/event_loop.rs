// event_loop.rs

use crate::chord::SymbolChordResolver;
use crate::clock::VirtualTransport;
use crate::loops::{NoteEvent, PatternLoopAdapter};
use crate::midi_output::NoteSink;
use crate::time;
use crate::timeline::{SegmentDescriptor, TimelineScheduler};
use crossbeam::channel::Receiver;
use log::{debug, error, info, warn};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::Instant;

/// The scheduler wired to the built-in collaborators.
pub type Engine = TimelineScheduler<VirtualTransport, PatternLoopAdapter, SymbolChordResolver>;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add(SegmentDescriptor),
    Remove(usize),
    Tempo(i64),
    Start,
    Stop,
    Toggle,
    List,
    Import(PathBuf),
    Export(Option<PathBuf>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineMessage {
    Tick,
    Command(Command),
    Shutdown,
}

/// Owns the engine; every mutation and every clock callback runs here.
pub struct EventLoop {
    engine: Engine,
    message_rx: Receiver<EngineMessage>,
    sink: Box<dyn NoteSink>,
    export_path: PathBuf,
    last_tick: Option<Instant>,
}

impl EventLoop {
    pub fn new(
        engine: Engine,
        message_rx: Receiver<EngineMessage>,
        sink: Box<dyn NoteSink>,
        export_path: PathBuf,
    ) -> Self {
        EventLoop {
            engine,
            message_rx,
            sink,
            export_path,
            last_tick: None,
        }
    }

    /// Processes messages until shutdown or until every sender is gone, then
    /// hands the engine back.
    pub fn run(mut self) -> Engine {
        info!("Event loop running");
        loop {
            match self.message_rx.recv() {
                Ok(message) => {
                    if !self.handle(message, Instant::now()) {
                        info!("Shutdown requested");
                        break;
                    }
                }
                Err(e) => {
                    debug!("Message channel closed: {}", e);
                    break;
                }
            }
        }
        self.sink.silence();
        self.engine
    }

    /// Returns `false` once the loop should exit.
    pub fn handle(&mut self, message: EngineMessage, now: Instant) -> bool {
        match message {
            EngineMessage::Tick => self.on_tick(now),
            EngineMessage::Command(command) => self.on_command(command, now),
            EngineMessage::Shutdown => return false,
        }
        true
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    fn on_tick(&mut self, now: Instant) {
        self.engine.poll_tempo(now);

        let elapsed = self
            .last_tick
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or_default();
        self.last_tick = Some(now);

        if !self.engine.is_playing() {
            return;
        }

        let spans = self
            .engine
            .clock_mut()
            .advance_seconds(elapsed.as_secs_f64());
        let bpm = self.engine.tempo();
        for (from, to) in spans {
            let mut events: Vec<NoteEvent> = self
                .engine
                .items()
                .iter()
                .flat_map(|item| item.loop_handle().events_between(from, to))
                .collect();
            events.sort_by_key(|event| event.at);
            for event in &events {
                self.sink.play(event, bpm);
            }
        }
    }

    fn on_command(&mut self, command: Command, now: Instant) {
        debug!("Handling command: {:?}", command);
        match command {
            Command::Add(descriptor) => match self.engine.insert_segment(&descriptor) {
                Ok(position) => println!("Added {} at position {}", descriptor.chord, position),
                Err(e) => {
                    warn!("Add rejected: {}", e);
                    eprintln!("{}", e);
                }
            },
            Command::Remove(position) => {
                if position < self.engine.len() {
                    let removed = self.engine.remove_segment(position);
                    println!("Removed {} from position {}", removed.chord, position);
                } else {
                    eprintln!("No segment at position {}", position);
                }
            }
            Command::Tempo(bpm) => {
                self.engine.request_tempo(bpm, now);
                if let Some(pending) = self.engine.pending_tempo() {
                    println!("Tempo will change to {} BPM", pending);
                }
            }
            Command::Start => {
                self.engine.start();
                self.last_tick = Some(now);
            }
            Command::Stop => {
                self.engine.stop();
                self.sink.silence();
            }
            Command::Toggle => {
                self.engine.toggle();
                if self.engine.is_playing() {
                    self.last_tick = Some(now);
                } else {
                    self.sink.silence();
                }
            }
            Command::List => print!("{}", timeline_listing(&self.engine)),
            Command::Import(path) => match self.engine.import_file(&path) {
                Ok(report) => {
                    println!("Imported {} segments", report.imported);
                    for skipped in &report.skipped {
                        eprintln!("Skipped segment {}: {}", skipped.index, skipped.error);
                    }
                }
                Err(e) => {
                    error!("Import of {} failed: {}", path.display(), e);
                    eprintln!("{}", e);
                }
            },
            Command::Export(path) => {
                let path = path.unwrap_or_else(|| self.export_path.clone());
                match self.engine.export_file(&path) {
                    Ok(()) => println!("Exported to {}", path.display()),
                    Err(e) => {
                        error!("Export to {} failed: {}", path.display(), e);
                        eprintln!("{}", e);
                    }
                }
            }
        }
    }
}

/// One line per segment; the active segment is marked with `>`.
pub fn timeline_listing(engine: &Engine) -> String {
    let active = engine.active_index();
    let mut listing = format!(
        "{} segments, {} BPM, {}\n",
        engine.len(),
        engine.tempo(),
        if engine.is_playing() { "playing" } else { "idle" }
    );
    for item in engine.items() {
        let marker = if Some(item.position()) == active { '>' } else { ' ' };
        let _ = writeln!(
            listing,
            "{} {:>2}  {:<8} {}x1/{} {:<5}  {:>6.2} -> {:>6.2}",
            marker,
            item.position(),
            item.chord(),
            item.repeat_count(),
            item.subdivision(),
            item.pattern().to_string(),
            time::to_f64(item.start()),
            time::to_f64(item.stop()),
        );
    }
    listing
}
