use crate::game::{Game, GameMode};
use crate::stats::StatsManager;
use crate::theme::{Theme, ThemeName};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use gauss_core::Generator;
use rand::Rng;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Oldest entries are dropped past this many
const HISTORY_LIMIT: usize = 100;

/// Ticks a status message stays visible (~3 seconds at 100ms)
const MESSAGE_TICKS: u32 = 30;

/// Result of handling a key press or command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Continue,
    Quit,
}

/// Current screen state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenState {
    /// Normal gameplay
    Playing,
    /// Win screen
    Solved,
    /// Statistics screen
    Stats,
}

/// Startup parameters, usually from the command line
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Pinned difficulty; drawn per puzzle when absent
    pub difficulty: Option<u8>,
    /// Pinned compressibility; drawn per puzzle when absent
    pub compressibility: Option<u8>,
    pub seed: Option<u64>,
    pub mode: GameMode,
    pub theme: ThemeName,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            difficulty: None,
            compressibility: None,
            seed: None,
            mode: GameMode::Fmc,
            theme: ThemeName::Dark,
        }
    }
}

/// The main application state
pub struct App {
    pub game: Game,
    pub theme: Theme,
    /// Text typed at the prompt
    pub input: String,
    /// Submitted lines, oldest first
    history: Vec<String>,
    history_pos: Option<usize>,
    /// Transient status message
    pub message: Option<String>,
    message_timer: u32,
    /// Last rejection, shown until the next accepted move
    pub last_error: Option<String>,
    pub screen_state: ScreenState,
    pub stats: StatsManager,
    game_recorded: bool,
    generator: Generator,
    options: AppOptions,
    save_path: PathBuf,
}

impl App {
    pub fn new(options: AppOptions, stats: StatsManager, save_path: PathBuf) -> Self {
        let mut generator = match options.seed {
            Some(seed) => Generator::with_seed(seed),
            None => Generator::new(),
        };
        let game = new_game(&mut generator, &options, None, None, options.mode);

        Self {
            game,
            theme: Theme::from_name(options.theme),
            input: String::new(),
            history: Vec::new(),
            history_pos: None,
            message: None,
            message_timer: 0,
            last_error: None,
            screen_state: ScreenState::Playing,
            stats,
            game_recorded: false,
            generator,
            options,
            save_path,
        }
    }

    /// Get the save file path
    pub fn default_save_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gauss_save.json")
    }

    /// Update timers (called every tick)
    pub fn tick(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message = None;
            }
        }
    }

    /// Show a temporary message
    pub fn show_message(&mut self, msg: &str) {
        self.message = Some(msg.to_string());
        self.message_timer = MESSAGE_TICKS;
    }

    /// Handle a key press
    pub fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        match self.screen_state {
            ScreenState::Playing => self.handle_prompt_key(key),
            ScreenState::Solved => self.handle_solved_key(key),
            ScreenState::Stats => self.handle_stats_key(key),
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Enter => {
                let line = std::mem::take(&mut self.input);
                self.history_pos = None;
                return self.submit(&line);
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Esc => {
                self.input.clear();
                self.history_pos = None;
            }
            KeyCode::Up => self.recall_older(),
            KeyCode::Down => self.recall_newer(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.push(c);
            }
            _ => {}
        }
        AppAction::Continue
    }

    fn handle_solved_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Char('q') => return AppAction::Quit,
            KeyCode::Enter | KeyCode::Char('n') => self.start_new(None, None),
            KeyCode::Char('r') => self.restart(),
            KeyCode::Char('s') => self.screen_state = ScreenState::Stats,
            KeyCode::Esc => self.screen_state = ScreenState::Playing,
            _ => {}
        }
        AppAction::Continue
    }

    fn handle_stats_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter => {
                self.screen_state = ScreenState::Playing;
            }
            _ => {}
        }
        AppAction::Continue
    }

    /// Run one prompt line: a command or a transformation
    pub fn submit(&mut self, line: &str) -> AppAction {
        let line = line.trim();
        if line.is_empty() {
            return AppAction::Continue;
        }
        self.remember(line);

        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default().to_ascii_lowercase();
        let args: Vec<&str> = words.collect();

        match command.as_str() {
            "quit" | "exit" => return AppAction::Quit,
            "hint" => self.show_hint(),
            "new" => self.new_command(&args),
            "restart" => self.restart(),
            "mode" => self.mode_command(&args),
            "save" => self.save_game(),
            "load" => self.load_game(),
            "stats" => self.screen_state = ScreenState::Stats,
            "theme" => self.theme_command(&args),
            "help" => self.show_message(
                "Commands: hint, new [d c], restart, mode [fmc|timed], save, load, stats, theme, quit",
            ),
            _ => self.apply_move(line),
        }
        AppAction::Continue
    }

    fn apply_move(&mut self, text: &str) {
        if self.game.is_completed() {
            self.show_message("Already solved. Type 'new' or 'restart'");
            return;
        }

        match self.game.apply(text) {
            Ok(count) => {
                self.last_error = None;
                if self.game.is_completed() {
                    self.record_game();
                    self.screen_state = ScreenState::Solved;
                } else {
                    self.show_message(&format!("Move {}", count));
                }
            }
            Err(err) => {
                let text = format!("{}: {}", err.kind(), err);
                self.show_message(&text);
                self.last_error = Some(text);
            }
        }
    }

    fn show_hint(&mut self) {
        if self.game.is_completed() {
            self.show_message("Already solved");
            return;
        }
        match self.game.hint() {
            Some(op) => self.show_message(&format!("Try: {}", op)),
            None => self.show_message("No greedy move from here"),
        }
    }

    fn new_command(&mut self, args: &[&str]) {
        let mut numbers = args.iter().map(|a| a.parse::<i64>());
        match (numbers.next(), numbers.next()) {
            (None, _) => self.start_new(None, None),
            (Some(Ok(d)), None) => self.start_new(Some(d), None),
            (Some(Ok(d)), Some(Ok(c))) => self.start_new(Some(d), Some(c)),
            _ => self.show_message("Usage: new [difficulty] [compressibility]"),
        }
    }

    fn start_new(&mut self, difficulty: Option<i64>, compressibility: Option<i64>) {
        self.game = new_game(
            &mut self.generator,
            &self.options,
            difficulty,
            compressibility,
            self.game.mode(),
        );
        self.reset_view();
        let config = *self.game.config();
        self.show_message(&format!(
            "New puzzle: difficulty {}, compressibility {}",
            config.difficulty, config.compressibility
        ));
    }

    fn restart(&mut self) {
        self.game = self.game.restart();
        self.reset_view();
        self.show_message("Puzzle restarted");
    }

    fn reset_view(&mut self) {
        self.game_recorded = false;
        self.last_error = None;
        self.screen_state = ScreenState::Playing;
    }

    fn mode_command(&mut self, args: &[&str]) {
        let mode = match args.first() {
            Some(name) => match GameMode::parse(name) {
                Some(mode) => mode,
                None => {
                    self.show_message("Usage: mode [fmc|timed]");
                    return;
                }
            },
            None => self.game.mode().toggle(),
        };
        self.game.set_mode(mode);
        self.show_message(&format!("Mode: {}", mode));
    }

    fn theme_command(&mut self, args: &[&str]) {
        let name = match args.first() {
            Some(name) => match ThemeName::parse(name) {
                Some(name) => name,
                None => {
                    self.show_message("Usage: theme [dark|light|contrast]");
                    return;
                }
            },
            None => self.theme.name.next(),
        };
        self.theme = Theme::from_name(name);
        self.show_message(&format!("Theme: {}", name));
    }

    /// Record the current game to stats
    fn record_game(&mut self) {
        if self.game_recorded {
            return;
        }
        self.game_recorded = true;

        self.stats.record_game(&self.game);
        if let Err(err) = self.stats.save() {
            warn!("failed to save records: {}", err);
            self.show_message("Could not save records");
        }
    }

    /// Save the current game
    fn save_game(&mut self) {
        match fs::write(&self.save_path, self.game.serialize()) {
            Ok(_) => self.show_message("Game saved"),
            Err(err) => {
                warn!(path = %self.save_path.display(), "save failed: {}", err);
                self.show_message("Failed to save");
            }
        }
    }

    /// Load a saved game
    fn load_game(&mut self) {
        match fs::read_to_string(&self.save_path) {
            Ok(json) => {
                if let Some(game) = Game::deserialize(&json) {
                    self.game = game;
                    self.reset_view();
                    self.game_recorded = self.game.is_completed();
                    self.show_message("Game loaded");
                } else {
                    self.show_message("Invalid save file");
                }
            }
            Err(_) => self.show_message("No save file found"),
        }
    }

    fn remember(&mut self, line: &str) {
        if self.history.last().map(String::as_str) != Some(line) {
            self.history.push(line.to_string());
            if self.history.len() > HISTORY_LIMIT {
                self.history.remove(0);
            }
        }
    }

    fn recall_older(&mut self) {
        if self.history.is_empty() {
            return;
        }
        let pos = match self.history_pos {
            None => self.history.len() - 1,
            Some(pos) => pos.saturating_sub(1),
        };
        self.history_pos = Some(pos);
        self.input = self.history[pos].clone();
    }

    fn recall_newer(&mut self) {
        match self.history_pos {
            Some(pos) if pos + 1 < self.history.len() => {
                self.history_pos = Some(pos + 1);
                self.input = self.history[pos + 1].clone();
            }
            Some(_) => {
                self.history_pos = None;
                self.input.clear();
            }
            None => {}
        }
    }
}

fn new_game(
    generator: &mut Generator,
    options: &AppOptions,
    difficulty: Option<i64>,
    compressibility: Option<i64>,
    mode: GameMode,
) -> Game {
    let difficulty = difficulty.unwrap_or_else(|| draw_parameter(options.difficulty));
    let compressibility = compressibility.unwrap_or_else(|| draw_parameter(options.compressibility));
    debug!(difficulty, compressibility, "starting puzzle");

    let generated = generator.generate(difficulty, compressibility);
    Game::new(generated, *generator.config(), mode)
}

/// The pinned value, or a uniform draw from 0..=100
fn draw_parameter(pinned: Option<u8>) -> i64 {
    pinned
        .map(i64::from)
        .unwrap_or_else(|| rand::thread_rng().gen_range(0..=100))
}
