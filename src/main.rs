use crossterm::{
    cursor::{Hide, Show as ShowCursor},
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::env;
use std::fs::File;
use std::io::{self, stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use neonburst::audio::AudioEngine;
use neonburst::palette::{parse_color, Rgb};
use neonburst::{Mode, Show, ShowConfig, ShowError, ShowResult};

fn print_usage() {
    eprintln!("neonburst - Neon heart fireworks over a mosaic word wall");
    eprintln!();
    eprintln!("Usage: neonburst [EFFECT] [OPTIONS]");
    eprintln!();
    eprintln!("Effects:");
    eprintln!("  show       Fireworks over the word mosaic (default)");
    eprintln!("  fireworks  Fireworks only");
    eprintln!("  mosaic     Word mosaic only");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config FILE      Load tuning from a TOML file");
    eprintln!("  --bg-color RRGGBB  Set background color as hex (e.g., --bg-color 1a1b26)");
    eprintln!("  --auto             Launch rockets automatically");
    eprintln!("  --words A,B,C      Words cycled by the mosaic");
    eprintln!("  --log-file FILE    Write logs to FILE (filter with RUST_LOG)");
    eprintln!("  --mute             Disable sound");
    eprintln!();
    eprintln!("Controls:");
    eprintln!("  space = launch, 1/2/3 = line/vee/arch formation, click = launch at point");
    eprintln!("  f then o = fist-to-palm gesture, a = toggle auto launch, m = toggle word cycling");
    eprintln!();
    eprintln!("Press 'q', ESC, or Ctrl+C to exit");
}

#[derive(Debug, Default, PartialEq)]
struct Options {
    mode: Option<Mode>,
    config: Option<PathBuf>,
    bg_color: Option<Rgb>,
    auto: bool,
    words: Option<Vec<String>>,
    log_file: Option<PathBuf>,
    mute: bool,
}

#[derive(Debug, PartialEq)]
enum Command {
    Help,
    Run(Options),
}

fn parse_args(args: &[String]) -> ShowResult<Command> {
    let mut options = Options::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--bg-color" => {
                options.bg_color = Some(parse_color(value(args, i)?)?);
                i += 2;
            }
            "--config" => {
                options.config = Some(PathBuf::from(value(args, i)?));
                i += 2;
            }
            "--log-file" => {
                options.log_file = Some(PathBuf::from(value(args, i)?));
                i += 2;
            }
            "--words" => {
                let words = value(args, i)?
                    .split(',')
                    .map(str::trim)
                    .filter(|w| !w.is_empty())
                    .map(str::to_string)
                    .collect();
                options.words = Some(words);
                i += 2;
            }
            "--auto" => {
                options.auto = true;
                i += 1;
            }
            "--mute" => {
                options.mute = true;
                i += 1;
            }
            "help" | "--help" | "-h" => return Ok(Command::Help),
            arg => {
                if arg.starts_with('-') {
                    return Err(ShowError::Usage(format!("Unknown option: {}", arg)));
                }
                let mode = Mode::from_name(arg)
                    .ok_or_else(|| ShowError::Usage(format!("Unknown effect: {}", arg)))?;
                options.mode = Some(mode);
                i += 1;
            }
        }
    }

    Ok(Command::Run(options))
}

fn value(args: &[String], i: usize) -> ShowResult<&str> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| ShowError::Usage(format!("{} requires a value", args[i])))
}

fn init_logging(path: &Path) -> ShowResult<()> {
    let file = File::create(path)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn load_config(options: &Options) -> ShowResult<ShowConfig> {
    let mut config = match &options.config {
        Some(path) => ShowConfig::load(path)?,
        None => ShowConfig::default(),
    };
    if let Some(color) = options.bg_color {
        config.background = color;
    }
    if let Some(words) = &options.words {
        config.mosaic.words = words.clone();
    }
    config.validate()?;
    Ok(config)
}

/// Raw mode and the alternate screen for as long as it lives.
struct TerminalGuard;

impl TerminalGuard {
    fn enter<W: Write>(out: &mut W) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(out, EnterAlternateScreen, Hide, Clear(ClearType::All), EnableMouseCapture)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), ShowCursor, LeaveAlternateScreen, DisableMouseCapture);
        let _ = terminal::disable_raw_mode();
    }
}

fn run_show(mode: Mode, config: &ShowConfig, options: &Options) -> ShowResult<()> {
    let mut audio = AudioEngine::new(options.mute);

    let stdout = stdout();
    let mut stdout = BufWriter::with_capacity(1024 * 64, stdout);
    let _guard = TerminalGuard::enter(&mut stdout)?;

    let (cols, rows) = terminal::size()?;
    let mut show = Show::new(mode, cols as usize, rows as usize, config, options.auto);
    log::info!(
        "{:?} on {}x{} cells, viewport {:?}",
        mode,
        cols,
        rows,
        show.viewport()
    );

    let mut last_frame = Instant::now();
    let mut accumulator = 0.0f32;
    let fixed_dt = 1.0 / config.fps;

    loop {
        if event::poll(Duration::from_millis(1))? {
            let event = event::read()?;
            match &event {
                Event::Key(key_event) => {
                    if key_event.code == KeyCode::Char('q')
                        || key_event.code == KeyCode::Esc
                        || (key_event.code == KeyCode::Char('c')
                            && key_event.modifiers.contains(event::KeyModifiers::CONTROL))
                    {
                        break;
                    }
                    show.handle_event(&event);
                }
                Event::Resize(cols, rows) => {
                    show.resize(*cols as usize, *rows as usize);
                    execute!(stdout, Clear(ClearType::All))?;
                }
                _ => {
                    show.handle_event(&event);
                }
            }
        }

        let now = Instant::now();
        let frame_time = now.duration_since(last_frame).as_secs_f32();
        last_frame = now;

        accumulator += frame_time;
        if accumulator > fixed_dt * 3.0 {
            accumulator = fixed_dt * 3.0;
        }

        while accumulator >= fixed_dt {
            show.update(fixed_dt, &mut audio);
            accumulator -= fixed_dt;
        }

        show.render(&mut stdout)?;
    }

    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let options = match parse_args(&args) {
        Ok(Command::Help) => {
            print_usage();
            return;
        }
        Ok(Command::Run(options)) => options,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    if let Some(path) = &options.log_file {
        if let Err(e) = init_logging(path) {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }

    let result = load_config(&options).and_then(|config| {
        let mode = options.mode.unwrap_or(Mode::Show);
        run_show(mode, &config, &options)
    });

    if let Err(e) = result {
        log::error!("{}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
