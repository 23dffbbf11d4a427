//! bb3d entry point
//!
//! Starts the optimizer thread and runs a headless frame loop that draws the
//! latest candidate backboard. Keys are read from stdin one line at a time:
//! layer toggles (t n s b c g h w x), camera orbit (a d r f), pan (i j k l),
//! lift (u o), zoom (+ -) and `q` to quit.

use std::io::BufRead;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use bb3d::Settings;
use bb3d::optimize::{CancelToken, ControlPointSlot, MinimizeResult, OptimizerDriver};
use bb3d::renderer::{ChannelKeys, KeySource, LogPresenter, ProblemVisualization};

const QUIT_KEY: char = 'q';

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("bb3d starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => match Settings::load(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("{e}");
                std::process::exit(2);
            }
        },
        None => Settings::default(),
    };
    if let Err(e) = settings.validate() {
        log::error!("{e}");
        std::process::exit(2);
    }

    run(&settings);
}

/// Forward every character typed on stdin; ends when stdin closes
fn spawn_key_reader(tx: Sender<char>) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new().name("input".to_string()).spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            for key in line.chars().filter(|c| !c.is_whitespace()) {
                if tx.send(key).is_err() {
                    return;
                }
            }
        }
    })
}

/// Join a finished optimizer. A panic inside the objective is fatal.
fn join_optimizer(handle: JoinHandle<Option<MinimizeResult>>) {
    match handle.join() {
        Ok(Some(result)) => log::info!(
            "Optimizer finished: objective {:.9} ({:?})",
            result.fun,
            result.termination
        ),
        Ok(None) => log::warn!("Optimizer stopped without a result"),
        Err(_) => {
            log::error!("Optimizer thread panicked");
            std::process::exit(1);
        }
    }
}

fn run(settings: &Settings) {
    let slot = Arc::new(ControlPointSlot::new());
    let cancel = CancelToken::new();
    let frame_interval = Duration::from_millis(settings.frame_interval_ms);

    let mut visualization = ProblemVisualization::from_settings(settings);
    let initial = visualization.problem().backboard.initialize();
    visualization.update(&initial);

    let (tx, mut keys) = ChannelKeys::new();
    if let Err(e) = spawn_key_reader(tx) {
        log::warn!("Keyboard input unavailable: {e}");
    }

    let mut optimizer = match OptimizerDriver::from_settings(settings)
        .spawn(Arc::clone(&slot), cancel.clone())
    {
        Ok(handle) => Some(handle),
        Err(e) => {
            log::error!("Failed to start optimizer thread: {e}");
            std::process::exit(1);
        }
    };

    let mut presenter = LogPresenter::new();
    loop {
        let mut quit = false;
        while let Some(key) = keys.poll_keypress() {
            if key == QUIT_KEY {
                quit = true;
            } else {
                visualization.handle_key_press(key);
            }
        }
        if quit {
            log::info!("Quit requested");
            break;
        }

        if let Some(control_points) = slot.take_latest() {
            visualization.update(&control_points);
        }
        visualization.draw(&mut presenter);

        if optimizer.as_ref().is_some_and(|h| h.is_finished()) {
            if let Some(handle) = optimizer.take() {
                join_optimizer(handle);
            }
            // keep drawing the last candidate until told to stop
            if let Some(control_points) = slot.take_latest() {
                visualization.update(&control_points);
                visualization.draw(&mut presenter);
            }
            if let Some(stats) = visualization.stats() {
                log::info!(
                    "Final shape: mean miss {:.4} m, max miss {:.4} m over {} samples",
                    stats.mean,
                    stats.max,
                    stats.samples
                );
            }
        }
        if optimizer.is_none() && keys.is_closed() {
            break;
        }

        thread::sleep(frame_interval);
    }

    cancel.cancel();
    if let Some(handle) = optimizer {
        join_optimizer(handle);
    }
    log::info!(
        "Drew {} frames ({} bytes of vertex data in the last one)",
        presenter.frames(),
        presenter.frame_bytes()
    );
}
