mod config;
mod game;
mod hazard;
mod input;
mod maze;
mod render;

use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event};
use crossterm::style::Print;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{ExecutableCommand, QueueableCommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::OpenOptions;
use std::io::{self, Stdout};
use std::thread;
use std::time::{Duration, Instant};

use config::Config;
use game::{Game, GameEvent};
use input::Action;
use render::Renderer;

fn main() -> io::Result<()> {
    let config = Config::from_env();
    init_logging(&config);

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, &config);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    if let Err(err) = &result {
        log::error!("terminal error: {}", err);
    }
    result
}

// Raw mode owns the terminal, so log output goes to a file or nowhere.
fn init_logging(config: &Config) {
    let Some(path) = &config.log_file else {
        return;
    };
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => {
            env_logger::Builder::from_env(env_logger::Env::new().filter_or("KEYMAZE_LOG", "info"))
                .target(env_logger::Target::Pipe(Box::new(file)))
                .write_style(env_logger::WriteStyle::Never)
                .init();
        }
        Err(err) => eprintln!("keymaze: cannot open log file {}: {}", path.display(), err),
    }
}

fn run(stdout: &mut Stdout, config: &Config) -> io::Result<()> {
    let seed = config.seed.unwrap_or_else(rand::random);
    log::info!("seed {}, config {:?}", seed, config);
    let mut rng = StdRng::seed_from_u64(seed);

    let mut game = Game::new(config.maze, &mut rng);
    let mut renderer = Renderer::new(config.maze.width, config.maze.height);
    let tick_interval = config.tick_interval();
    let frame_time = config.frame_time();
    let mut last_tick = Instant::now();

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(key) => match input::action_for(&key) {
                    Some(Action::Quit) => return Ok(()),
                    Some(Action::Start) => {
                        if game.start(&mut rng) {
                            last_tick = Instant::now();
                        }
                    }
                    Some(Action::Move(dir)) => {
                        let events = game.move_player(dir, &mut rng);
                        play_cues(stdout, config, &events)?;
                    }
                    _ => {}
                },
                Event::Resize(_, _) => renderer.invalidate(),
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_interval {
            last_tick = Instant::now();
            let events = game.tick_hazards();
            play_cues(stdout, config, &events)?;
        }

        renderer.draw(stdout, &game)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

fn play_cues(stdout: &mut Stdout, config: &Config, events: &[GameEvent]) -> io::Result<()> {
    for event in events {
        log::debug!("event {:?}", event);
    }
    if config.bell && !events.is_empty() {
        stdout.queue(Print('\x07'))?;
    }
    Ok(())
}
