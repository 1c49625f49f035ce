use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use tracing::{info, warn};
use tui_textarea::TextArea;

use rogsh::commands::CLEAR_SCREEN;
use rogsh::fs::{AttackEffect, Zone};
use rogsh::game::{GameEvent, GameOverReason};
use rogsh::save::{JsonSaveManager, Persistence};
use rogsh::{logging, Catalog, Game, GameConfig, Locale};

#[derive(Parser, Debug)]
#[command(name = "rogsh", version, about = "A roguelike that teaches Unix commands")]
struct Cli {
    /// Jump straight into a zone (zone1, zone2, zone3)
    #[arg(long, value_name = "ZONE")]
    start_zone: Option<String>,

    /// Skip the title screen and start a new game
    #[arg(long)]
    skip_intro: bool,

    /// Development mode: skips the intro and enables `debug`
    #[arg(long)]
    dev: bool,

    /// Message language (en, ja); defaults from LANG
    #[arg(long)]
    locale: Option<Locale>,

    /// Config file (default: <config dir>/rogsh/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Save file (default: ~/.rogsh_save.json)
    #[arg(long, value_name = "PATH")]
    save_file: Option<PathBuf>,

    /// Log file (default: <data dir>/rogsh/rogsh.log)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

enum Screen {
    TitleScreen,
    Playing,
    SavePrompt,
    GameOver,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum MenuOption {
    Continue,
    NewGame,
    Quit,
}

impl MenuOption {
    fn next(self, has_save: bool) -> Self {
        match self {
            MenuOption::Continue => MenuOption::NewGame,
            MenuOption::NewGame => MenuOption::Quit,
            MenuOption::Quit if has_save => MenuOption::Continue,
            MenuOption::Quit => MenuOption::NewGame,
        }
    }

    fn previous(self, has_save: bool) -> Self {
        match self {
            MenuOption::Continue => MenuOption::Quit,
            MenuOption::NewGame if has_save => MenuOption::Continue,
            MenuOption::NewGame => MenuOption::Quit,
            MenuOption::Quit => MenuOption::NewGame,
        }
    }
}

struct App<'a> {
    game: Game,
    config: GameConfig,
    catalog: Catalog,
    locale: Locale,
    dev_mode: bool,
    saves: JsonSaveManager,
    has_save: bool,
    input: TextArea<'a>,
    output: Vec<Line<'static>>,
    /// Lines scrolled up from the bottom of the output pane.
    output_scroll: u16,
    attack: Option<AttackEffect>,
    screen: Screen,
    menu_selection: MenuOption,
    quit: bool,
}

fn new_input<'a>() -> TextArea<'a> {
    let mut input = TextArea::default();
    input.set_block(Block::default().borders(Borders::ALL));
    input.set_cursor_line_style(Style::default());
    input
}

/// Splits `**bold**` markup into styled spans.
fn markup(text: &str, base: Style) -> Line<'static> {
    let spans: Vec<Span<'static>> = text
        .split("**")
        .enumerate()
        .filter(|(_, part)| !part.is_empty())
        .map(|(index, part)| {
            if index % 2 == 1 {
                Span::styled(part.to_string(), base.add_modifier(Modifier::BOLD))
            } else {
                Span::styled(part.to_string(), base)
            }
        })
        .collect();
    Line::from(spans)
}

impl<'a> App<'a> {
    fn new(config: GameConfig, catalog: Catalog, locale: Locale, dev_mode: bool, saves: JsonSaveManager) -> Self {
        let has_save = saves.save_exists();
        let game = Game::new(config.clone(), catalog.clone(), locale).with_dev_mode(dev_mode);
        App {
            game,
            config,
            catalog,
            locale,
            dev_mode,
            saves,
            has_save,
            input: new_input(),
            output: Vec::new(),
            output_scroll: 0,
            attack: None,
            screen: Screen::TitleScreen,
            menu_selection: if has_save {
                MenuOption::Continue
            } else {
                MenuOption::NewGame
            },
            quit: false,
        }
    }

    fn msg(&self, key: &str) -> String {
        self.catalog.get_message(self.locale, key)
    }

    fn print(&mut self, text: &str, style: Style) {
        for line in text.lines() {
            self.output.push(markup(line, style));
        }
        self.output_scroll = 0;
    }

    fn print_welcome(&mut self) {
        let title = self.msg("welcome.title");
        self.print(&title, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        let description = self.msg("welcome.description");
        self.print(&description, Style::default().fg(Color::White));
        for key in ["welcome.help_hint", "welcome.exit_hint"] {
            let line = self.msg(key);
            self.print(&line, Style::default().fg(Color::DarkGray));
        }
    }

    fn fresh_game(&mut self) {
        self.game = Game::new(self.config.clone(), self.catalog.clone(), self.locale)
            .with_dev_mode(self.dev_mode);
        self.output.clear();
        self.attack = None;
        self.screen = Screen::Playing;
    }

    fn start_game(&mut self) {
        self.fresh_game();
        self.print_welcome();
        info!("new game");
    }

    fn continue_game(&mut self) {
        let Some(data) = self.saves.load() else {
            self.start_game();
            return;
        };
        self.fresh_game();
        self.game.apply_save(data);
        let text = format!("{}\n{}", self.msg("welcome.continue"), self.msg("save.loaded"));
        self.print(&text, Style::default().fg(Color::Green));
    }

    fn start_debug_zone(&mut self, name: &str) {
        self.fresh_game();
        let zone = self.game.setup_debug_zone_by_name(name);
        let text = self
            .catalog
            .format(self.locale, "welcome.debug_zone", &[("zone", &zone.name())]);
        self.print(&text, Style::default().fg(Color::Magenta));
    }

    fn start_dev(&mut self) {
        self.fresh_game();
        let text = self.msg("welcome.dev_mode");
        self.print(&text, Style::default().fg(Color::Magenta));
    }

    fn submit(&mut self) {
        let line = self.input.lines().join(" ");
        self.input = new_input();
        self.attack = None;

        let prompt = format!("{}$ {}", self.game.state().current_path, line);
        self.print(&prompt, Style::default().fg(Color::Green));

        let trimmed = line.trim();
        if trimmed == "exit" || trimmed == "quit" {
            self.ask_to_save();
            return;
        }

        let outcome = self.game.process_command(trimmed);
        if outcome.result.output == CLEAR_SCREEN {
            self.output.clear();
        } else if !outcome.result.output.is_empty() {
            let style = if outcome.result.success {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::Red)
            };
            self.print(&outcome.result.output, style);
        }
        self.attack = outcome.result.attack_effect;

        for event in &outcome.events {
            self.announce(event);
        }
        if self.game.state().is_game_over {
            self.screen = Screen::GameOver;
        } else if outcome.result.should_exit {
            self.ask_to_save();
        }
    }

    fn announce(&mut self, event: &GameEvent) {
        let highlight = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
        match event {
            GameEvent::ZoneCompleted(Zone::Zone1) => {
                let text = self.msg("game.zone1_complete");
                self.print(&text, highlight);
            }
            GameEvent::ZoneCompleted(Zone::Zone2) => {
                let text = self.msg("game.zone2_complete");
                self.print(&text, highlight);
            }
            GameEvent::HelpNotification => {
                let text = self.msg("game.zone2_help_notification");
                self.print(&text, Style::default().fg(Color::Cyan));
            }
            GameEvent::ForkSpawned { pid, threat } => {
                let text = self
                    .catalog
                    .format(self.locale, "game.fork_spawned", &[("pid", pid), ("threat", threat)]);
                self.print(&text, Style::default().fg(Color::LightRed));
            }
            GameEvent::GameOver(reason) => {
                let text = self.msg(reason.message_key());
                self.print(&text, Style::default().fg(Color::Red).add_modifier(Modifier::BOLD));
            }
            GameEvent::ZoneCompleted(Zone::Zone3)
            | GameEvent::ZoneUnlocked(_)
            | GameEvent::PhaseChanged { .. } => {}
        }
    }

    fn ask_to_save(&mut self) {
        let key = if self.saves.save_exists() {
            "save.overwrite_prompt"
        } else {
            "save.prompt"
        };
        let text = self.msg(key);
        self.print(&text, Style::default().fg(Color::Yellow));
        self.screen = Screen::SavePrompt;
    }

    fn save(&mut self) {
        match self.saves.save(&self.game.snapshot()) {
            Ok(()) => {
                let path = self.saves.path().display().to_string();
                let text = self.catalog.format(self.locale, "save.saved", &[("path", &path)]);
                self.print(&text, Style::default().fg(Color::Green));
            }
            Err(err) => {
                warn!(error = %err, "save failed");
                let text = self.catalog.format(self.locale, "save.failed", &[("error", &err)]);
                self.print(&text, Style::default().fg(Color::Red));
            }
        }
    }

    fn interrupt(&mut self) {
        if self.config.session.save_on_interrupt
            && matches!(self.screen, Screen::Playing | Screen::SavePrompt)
        {
            self.save();
        }
        self.quit = true;
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.interrupt();
            return;
        }

        match self.screen {
            Screen::TitleScreen => match key.code {
                KeyCode::Down | KeyCode::Char('j') => {
                    self.menu_selection = self.menu_selection.next(self.has_save);
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.menu_selection = self.menu_selection.previous(self.has_save);
                }
                KeyCode::Enter => match self.menu_selection {
                    MenuOption::Continue => self.continue_game(),
                    MenuOption::NewGame => self.start_game(),
                    MenuOption::Quit => self.quit = true,
                },
                KeyCode::Char('q') => self.quit = true,
                _ => {}
            },
            Screen::SavePrompt => match key.code {
                KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.save();
                    self.quit = true;
                }
                KeyCode::Char('n') | KeyCode::Char('N') => {
                    let text = self.msg("save.not_saved");
                    self.print(&text, Style::default().fg(Color::DarkGray));
                    self.quit = true;
                }
                KeyCode::Esc => self.screen = Screen::Playing,
                _ => {}
            },
            Screen::GameOver => self.quit = true,
            Screen::Playing => match key.code {
                KeyCode::Enter => self.submit(),
                KeyCode::PageUp => {
                    let max = self.output.len() as u16;
                    self.output_scroll = (self.output_scroll + 5).min(max);
                }
                KeyCode::PageDown => {
                    self.output_scroll = self.output_scroll.saturating_sub(5);
                }
                _ => {
                    self.input.input(key);
                }
            },
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_path = logging::init(cli.log_file.clone());

    let config = GameConfig::load(cli.config.as_deref()).context("failed to load config")?;
    let catalog = Catalog::embedded().context("failed to load message catalogs")?;
    let locale = cli.locale.unwrap_or_else(Locale::detect);
    let saves = cli
        .save_file
        .clone()
        .map(JsonSaveManager::new)
        .unwrap_or_default();
    info!(%locale, save = %saves.path().display(), log = ?log_path, "session configured");

    let mut app = App::new(config, catalog, locale, cli.dev, saves);
    if let Some(zone) = cli.start_zone.as_deref() {
        app.start_debug_zone(zone);
    } else if cli.dev || cli.skip_intro {
        app.start_dev();
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    result?;

    if let Some(reason) = app.game.game_over_reason() {
        print_final_stats(&app, reason);
    } else {
        println!("\n{}\n", app.msg("game.exit_message"));
    }
    Ok(())
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    while !app.quit {
        terminal.draw(|f| draw_ui(f, app))?;
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                app.handle_key(key);
            }
        }
    }
    Ok(())
}

fn final_stats(app: &App) -> Vec<(String, String)> {
    let state = app.game.state();
    vec![
        (app.msg("game.turns_survived"), state.turn_count.to_string()),
        (app.msg("game.knowledge_gained"), state.knowledge.to_string()),
        (app.msg("game.final_threat_level"), format!("{:.1}", state.threat_level)),
        (app.msg("game.depth_reached"), state.current_depth.to_string()),
    ]
}

fn print_final_stats(app: &App, reason: GameOverReason) {
    println!("\n{}", app.msg("game.game_over"));
    println!("{}\n", app.msg(reason.message_key()));
    println!("{}", app.msg("game.final_stats"));
    for (label, value) in final_stats(app) {
        println!("  {:<20} {}", label, value);
    }
    println!("\n{}\n", app.msg("game.thank_you"));
}

fn draw_ui(f: &mut Frame, app: &App) {
    if matches!(app.screen, Screen::TitleScreen) {
        draw_title_screen(f, app);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(8),
            Constraint::Length(5),
            Constraint::Length(3),
        ])
        .split(f.area());

    // Status bar
    let state = app.game.state();
    let threat_color = if state.threat_level >= app.config.turn.critical_threat * 0.75 {
        Color::Red
    } else if state.threat_level >= app.config.turn.critical_threat * 0.5 {
        Color::Yellow
    } else {
        Color::Green
    };
    let status = Line::from(vec![
        Span::styled(" ROGSH ", Style::default().fg(Color::Black).bg(Color::Cyan)),
        Span::raw("  "),
        Span::styled(
            format!("HP {}/{}", state.hp, state.max_hp),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  "),
        Span::styled(
            format!("EP {}/{}", state.energy, state.max_energy),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("  "),
        Span::styled(
            format!("THR {:.1}", state.threat_level),
            Style::default().fg(threat_color),
        ),
        Span::raw("  "),
        Span::styled(
            format!("DISK {}/{}", state.disk_usage, state.max_disk_usage),
            Style::default().fg(Color::Magenta),
        ),
        Span::raw("  "),
        Span::styled(
            state.current_path.clone(),
            Style::default().fg(Color::White).bg(Color::DarkGray),
        ),
    ]);
    f.render_widget(
        Paragraph::new(status).block(Block::default().borders(Borders::BOTTOM)),
        chunks[0],
    );

    // Output pane, pinned to the bottom unless scrolled.
    let visible = chunks[1].height.saturating_sub(2);
    let total = app.output.len() as u16;
    let top = total
        .saturating_sub(visible)
        .saturating_sub(app.output_scroll);
    let output = Paragraph::new(app.output.clone())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(app.msg("ui.output_title")),
        )
        .scroll((top, 0));
    f.render_widget(output, chunks[1]);

    draw_hint_pane(f, app, chunks[2]);

    match app.screen {
        Screen::GameOver => {
            let footer = Paragraph::new(app.msg("ui.press_any_key"))
                .style(Style::default().fg(Color::White).bg(Color::Red))
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title(app.msg("game.game_over")));
            f.render_widget(footer, chunks[3]);
        }
        _ => f.render_widget(&app.input, chunks[3]),
    }
}

fn draw_hint_pane(f: &mut Frame, app: &App, area: ratatui::layout::Rect) {
    if let Some(effect) = app.attack {
        let (key, modifier) = match effect {
            AttackEffect::Medium => ("ui.attack_medium", Modifier::BOLD),
            AttackEffect::High => ("ui.attack_high", Modifier::BOLD | Modifier::SLOW_BLINK),
        };
        let banner = Paragraph::new(app.msg(key))
            .style(Style::default().fg(Color::White).bg(Color::Red).add_modifier(modifier))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(banner, area);
        return;
    }

    if matches!(app.screen, Screen::GameOver) {
        let stats: Vec<Line> = final_stats(app)
            .into_iter()
            .map(|(label, value)| Line::from(format!("{:<20} {}", label, value)))
            .collect();
        let panel = Paragraph::new(stats)
            .block(Block::default().borders(Borders::ALL).title(app.msg("game.final_stats")))
            .style(Style::default().fg(Color::Red));
        f.render_widget(panel, area);
        return;
    }

    let text = app
        .game
        .display_hint()
        .map(|hint| markup(&hint.description, Style::default().fg(Color::Yellow)))
        .unwrap_or_default();
    let hint = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(app.msg("ui.hint_title")))
        .wrap(Wrap { trim: false });
    f.render_widget(hint, area);
}

fn draw_title_screen(f: &mut Frame, app: &App) {
    let title_art = r#"
    ╔═══════════════════════════════════════════════════╗
    ║                                                   ║
    ║    ██████╗  ██████╗  ██████╗ ███████╗██╗  ██╗     ║
    ║    ██╔══██╗██╔═══██╗██╔════╝ ██╔════╝██║  ██║     ║
    ║    ██████╔╝██║   ██║██║  ███╗███████╗███████║     ║
    ║    ██╔══██╗██║   ██║██║   ██║╚════██║██╔══██║     ║
    ║    ██║  ██║╚██████╔╝╚██████╔╝███████║██║  ██║     ║
    ║    ╚═╝  ╚═╝ ╚═════╝  ╚═════╝ ╚══════╝╚═╝  ╚═╝     ║
    ║                                                   ║
    ╚═══════════════════════════════════════════════════╝
"#;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(12),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Min(1),
        ])
        .split(f.area());

    f.render_widget(
        Paragraph::new(title_art)
            .style(Style::default().fg(Color::Cyan))
            .alignment(Alignment::Center),
        chunks[0],
    );
    f.render_widget(
        Paragraph::new(app.msg("welcome.title"))
            .style(Style::default().fg(Color::White))
            .alignment(Alignment::Center),
        chunks[1],
    );

    let options = [
        (MenuOption::Continue, "ui.continue", chunks[2]),
        (MenuOption::NewGame, "ui.new_game", chunks[3]),
        (MenuOption::Quit, "ui.quit", chunks[4]),
    ];
    for (option, key, area) in options {
        if option == MenuOption::Continue && !app.has_save {
            continue;
        }
        let style = if app.menu_selection == option {
            Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        f.render_widget(
            Paragraph::new(format!("  {}  ", app.msg(key)))
                .style(style)
                .alignment(Alignment::Center),
            area,
        );
    }

    f.render_widget(
        Paragraph::new(app.msg("ui.menu_help"))
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        chunks[5],
    );
}
