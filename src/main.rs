mod app;
mod braille;
mod color;
mod config;
mod presets;
mod simulation;
mod species;
mod ui;

use app::{App, Focus};
use clap::Parser;
use config::AppConfig;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use presets::PresetManager;
use ratatui::{backend::CrosstermBackend, Terminal};
use species::{SpeciesRoster, MAX_POPULATION, MIN_POPULATION};
use std::io;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "atom-life")]
#[command(about = "Multi-species particle attraction simulation in the terminal")]
struct Args {
    /// Number of species to start with (1-8)
    #[arg(short = 'n', long, default_value = "3")]
    species: usize,

    /// Particles per species (10-1000)
    #[arg(short = 'p', long, default_value = "200")]
    population: usize,

    /// RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Simulation speed (ticks per frame, 1-10)
    #[arg(long, default_value = "1")]
    speed: usize,

    /// Start from a named preset (see H for the list)
    #[arg(long)]
    preset: Option<String>,

    /// Load a configuration exported with --save-config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the resolved starting configuration to a JSON file
    #[arg(long = "save-config")]
    save_config: Option<PathBuf>,

    /// Start with every attraction coefficient at zero instead of random
    #[arg(long, default_value = "false")]
    zero_matrix: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Resolve external configuration before touching the terminal so
    // errors print cleanly
    let loaded_config = match &args.config {
        Some(path) => Some(AppConfig::load_from_file(path)?),
        None => None,
    };
    let preset_roster = match &args.preset {
        Some(name) => {
            let manager = PresetManager::new();
            let preset = manager.find(name).ok_or_else(|| {
                format!(
                    "Unknown preset '{}'. Available: {}",
                    name,
                    manager.preset_names().join(", ")
                )
            })?;
            Some(preset.roster.clone())
        }
        None => None,
    };

    // Enter the alternate screen before any drawing
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Size the arena from the starting terminal dimensions
    let size = terminal.size()?;
    let frame_rect = ratatui::layout::Rect {
        x: 0,
        y: 0,
        width: size.width,
        height: size.height,
    };
    let (canvas_width, canvas_height) = ui::get_canvas_size(frame_rect, false);
    let mut app = App::new(canvas_width, canvas_height, args.seed);

    // Apply CLI configuration, most specific source first
    if let Some(config) = &loaded_config {
        app.apply_config(config);
    } else if let Some(roster) = &preset_roster {
        app.roster = SpeciesRoster::from_spec(roster);
        app.reconfigure();
    } else {
        let mut roster = SpeciesRoster::new();
        for i in 0..args.species.clamp(1, 8) {
            roster.add(
                color::palette_color(i),
                args.population.clamp(MIN_POPULATION, MAX_POPULATION),
            );
        }
        app.roster = roster;
        if !args.zero_matrix {
            app.randomize_matrix();
        }
        app.reconfigure();
    }
    app.ticks_per_frame = args.speed.clamp(app::MIN_SPEED, app::MAX_SPEED);

    if let Some(path) = &args.save_config {
        app.to_config().save_to_file(path)?;
    }

    let res = run_app(&mut terminal, &mut app);

    // Restore the terminal before reporting any error
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    // 16ms poll keeps the animation near 60fps
    const FRAME_DURATION: Duration = Duration::from_millis(16);

    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        if event::poll(FRAME_DURATION)? {
            match event::read()? {
                Event::Key(key) => {
                    // Key repeat and release events are ignored
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }

                    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        return Ok(());
                    }

                    match key.code {
                        // Lifecycle
                        KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),
                        KeyCode::Char(' ') => app.toggle_pause(),
                        KeyCode::Char('r') | KeyCode::Char('R') => app.reset(),
                        KeyCode::Char('v') | KeyCode::Char('V') => app.toggle_fullscreen(),
                        KeyCode::Char('h') | KeyCode::Char('H') => app.toggle_help(),

                        // Roster editing
                        KeyCode::Char('a') | KeyCode::Char('A') => {
                            app.add_species();
                            app.focus = Focus::Species;
                        }
                        KeyCode::Char('x') | KeyCode::Char('X') => {
                            app.remove_selected();
                            app.focus = Focus::Species;
                        }
                        KeyCode::Char('z') | KeyCode::Char('Z') => app.randomize_matrix(),
                        KeyCode::Char('c') | KeyCode::Char('C') => {
                            app.cycle_selected_color();
                            app.focus = Focus::Species;
                        }
                        KeyCode::Char('w') | KeyCode::Char('W') => {
                            // Best-effort save; the load path is equally lenient
                            let _ = app.save_custom_preset();
                        }
                        KeyCode::Char('[') => {
                            app.select_prev_species();
                            app.focus = Focus::Species;
                        }
                        KeyCode::Char(']') => {
                            app.select_next_species();
                            app.focus = Focus::Species;
                        }
                        KeyCode::Char(',') => {
                            app.select_prev_target();
                            app.focus = Focus::Target;
                        }
                        KeyCode::Char('.') => {
                            app.select_next_target();
                            app.focus = Focus::Target;
                        }

                        // Presets
                        KeyCode::Char(c @ '1'..='9') => {
                            app.apply_preset(c as usize - '1' as usize);
                        }

                        // Speed
                        KeyCode::Char('+') | KeyCode::Char('=') => {
                            app.increase_speed();
                            app.focus = Focus::Speed;
                        }
                        KeyCode::Char('-') | KeyCode::Char('_') => {
                            app.decrease_speed();
                            app.focus = Focus::Speed;
                        }

                        // Focus and scrolling
                        KeyCode::Tab => app.next_focus(),
                        KeyCode::BackTab => app.prev_focus(),
                        KeyCode::Up => {
                            if !app.show_help {
                                if app.focus.is_param() {
                                    app.adjust_focused_up();
                                } else {
                                    app.scroll_controls_up();
                                }
                            }
                        }
                        KeyCode::Down => {
                            if !app.show_help {
                                if app.focus.is_param() {
                                    app.adjust_focused_down();
                                } else {
                                    let term_size = terminal.size().unwrap_or_default();
                                    let visible = ui::get_controls_visible_lines(term_size.height);
                                    app.scroll_controls_down(ui::CONTROLS_CONTENT_LINES.saturating_sub(visible));
                                }
                            }
                        }
                        KeyCode::Esc => {
                            if app.show_help {
                                app.toggle_help();
                            } else if app.focus.is_param() {
                                app.focus = Focus::Controls;
                            }
                        }
                        KeyCode::Char('j') | KeyCode::Char('J') => {
                            if app.show_help {
                                app.scroll_help_down(ui::HELP_CONTENT_LINES);
                            }
                        }
                        KeyCode::Char('k') | KeyCode::Char('K') => {
                            if app.show_help {
                                app.scroll_help_up();
                            }
                        }
                        _ => {}
                    }
                }
                Event::Resize(width, height) => {
                    let (canvas_width, canvas_height) = ui::get_canvas_size(
                        ratatui::layout::Rect {
                            x: 0,
                            y: 0,
                            width,
                            height,
                        },
                        app.fullscreen_mode,
                    );
                    app.resize(canvas_width, canvas_height);
                }
                _ => {}
            }
        }

        // Advance regardless of whether an event arrived
        app.tick();
    }
}
