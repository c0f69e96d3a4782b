use digisort::async_worker::{SharedCopier, SharedLister, SyncWorkerManager};
use digisort::cli::{AppConfig, Args};
use digisort::config::{Preferences, UserConfig};
use digisort::domain::{discover_images, CommitResult, KeyOutcome, SequenceMatcher, SortSession};
use digisort::file_ops::{DryRunCopier, FsCopier, FsFolderLister};
use digisort::tui::{
    handle_confirm_input, handle_key_event, handle_result_input, render_view, FrameInfo,
    KeyAction, ViewState,
};
use digisort::{logging, open_file, Result};

use crossterm::{
    event::{self, Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const PREFS_SYNC_INTERVAL: Duration = Duration::from_secs(1);
const NOTICE_DISPLAY: Duration = Duration::from_secs(3);

fn main() -> io::Result<()> {
    // Parse command line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Convert to config
    let config: AppConfig = args.into();

    if let Err(e) = logging::init(config.log_level()) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    if let Err(e) = run_app_with_config(&config) {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

/// Runs the TUI application with configuration
pub fn run_app_with_config(config: &AppConfig) -> Result<()> {
    let images = discover_images(&config.images_dir, &config.discovery_options())?;

    if images.is_empty() {
        println!(
            "No images found in directory: {}",
            config.images_dir.display()
        );
        return Ok(());
    }

    // Load user preferences
    let prefs = Preferences::load().unwrap_or_else(|e| {
        warn!("Failed to load user config: {}", e);
        Preferences::ephemeral(UserConfig::default())
    });

    let matcher = match config.debounce {
        Some(window) => SequenceMatcher::with_window(window),
        None => SequenceMatcher::new(),
    };
    let mut session = SortSession::new(images).with_matcher(matcher);
    session.set_auto_advance(config.auto_advance.unwrap_or(prefs.get().auto_advance));

    let lister: SharedLister = Arc::new(FsFolderLister {
        show_hidden: config.show_hidden,
    });
    let copier: SharedCopier = if config.dry_run {
        Arc::new(DryRunCopier)
    } else {
        Arc::new(FsCopier)
    };
    let mut worker = SyncWorkerManager::new(lister, copier)?;
    worker.start_tree_build(config.dest_dir.clone())?;

    let view = if config.force_welcome || !prefs.get().welcome_shown {
        ViewState::Welcome
    } else {
        ViewState::Browsing
    };

    let mut app = App {
        session,
        worker,
        prefs_rx: prefs.subscribe(),
        prefs,
        view,
        info: FrameInfo {
            loading_tree: true,
            dry_run: config.dry_run,
            ..FrameInfo::default()
        },
        notice_until: None,
        dimensions_for: None,
        dest_dir: config.dest_dir.clone(),
        last_sync: Instant::now(),
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    app.worker.shutdown();

    if !app.session.pending().is_empty() {
        println!(
            "{} pending image(s) were not copied",
            app.session.pending().len()
        );
    }

    result
}

/// Suspends the TUI terminal to allow external programs to run
fn suspend_terminal<B: ratatui::backend::Backend + std::io::Write>(
    terminal: &mut Terminal<B>,
) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Resumes the TUI terminal after external program exits
fn resume_terminal<B: ratatui::backend::Backend + std::io::Write>(
    terminal: &mut Terminal<B>,
) -> io::Result<()> {
    enable_raw_mode()?;
    execute!(terminal.backend_mut(), EnterAlternateScreen)?;
    terminal.hide_cursor()?;
    terminal.clear()?;
    Ok(())
}

enum Flow {
    Continue,
    Quit,
    Open(PathBuf),
}

struct App {
    session: SortSession,
    worker: SyncWorkerManager,
    prefs: Preferences,
    prefs_rx: watch::Receiver<UserConfig>,
    view: ViewState,
    info: FrameInfo,
    notice_until: Option<Instant>,
    /// Image whose dimensions are in `info`
    dimensions_for: Option<PathBuf>,
    dest_dir: PathBuf,
    last_sync: Instant,
}

impl App {
    fn notify(&mut self, message: impl Into<String>, now: Instant) {
        self.info.notice = Some(message.into());
        self.notice_until = Some(now + NOTICE_DISPLAY);
    }

    /// Collects background results and advances timers.
    fn tick(&mut self, now: Instant) {
        if let Some(built) = self.worker.poll_tree() {
            match built {
                Ok(tree) => {
                    let folders = tree.len().saturating_sub(1);
                    self.session.load_tree(tree);
                    self.notify(format!("Loaded {} folder(s)", folders), now);
                }
                Err(e) => {
                    error!("Failed to load destination tree: {}", e);
                    self.notify(format!("Failed to load folders: {}", e), now);
                }
            }
        }
        self.info.loading_tree = self.worker.is_building();

        if let Some(result) = self.worker.poll_commit() {
            self.session.finish_commit(&result);
            self.info.notice = None;
            self.notice_until = None;
            self.view = ViewState::CommitResult(result);
        }

        if let KeyOutcome::Resolved { target, .. } = self.session.tick(now) {
            debug!(target = %target.display(), "Sequence resolved on timeout");
        }

        if self.notice_until.is_some_and(|until| now >= until) {
            self.info.notice = None;
            self.notice_until = None;
        }

        if now.duration_since(self.last_sync) >= PREFS_SYNC_INTERVAL {
            self.last_sync = now;
            if let Err(e) = self.prefs.sync_from_disk() {
                warn!("Failed to reload user config: {}", e);
            }
        }
        self.session.sync_preferences(&mut self.prefs_rx);

        self.refresh_dimensions();
    }

    fn refresh_dimensions(&mut self) {
        let current = self.session.current_image().map(|image| image.path.clone());
        if current == self.dimensions_for {
            return;
        }
        self.info.dimensions = current
            .as_ref()
            .and_then(|path| image::image_dimensions(path).ok());
        self.dimensions_for = current;
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Flow {
        match &self.view {
            ViewState::Help => {
                let action = handle_key_event(key);
                if matches!(action, KeyAction::Help | KeyAction::Quit | KeyAction::None) {
                    self.view = ViewState::Browsing;
                }
                return Flow::Continue;
            }
            ViewState::Welcome => {
                // Any key dismisses welcome and starts browsing
                self.view = ViewState::Browsing;
                if let Err(e) = self.prefs.mark_welcome_shown() {
                    warn!("Failed to save user config: {}", e);
                }
                return Flow::Continue;
            }
            ViewState::ConfirmCommit => {
                match handle_confirm_input(key) {
                    KeyAction::Confirm => self.start_commit(),
                    KeyAction::Cancel => self.view = ViewState::Browsing,
                    _ => {}
                }
                return Flow::Continue;
            }
            ViewState::ConfirmClear => {
                match handle_confirm_input(key) {
                    KeyAction::Confirm => {
                        if self.session.clear_pending() {
                            info!("Cleared all pending moves");
                            self.notify("Cleared all pending moves", now);
                        }
                        self.view = ViewState::Browsing;
                    }
                    KeyAction::Cancel => self.view = ViewState::Browsing,
                    _ => {}
                }
                return Flow::Continue;
            }
            ViewState::Committing => return Flow::Continue,
            ViewState::CommitResult(result) => {
                let failures = result.failed_entries.clone();
                match handle_result_input(key) {
                    KeyAction::CopyFailures if !failures.is_empty() => {
                        let count = failures.len();
                        match copy_to_clipboard(failures.join("\n")) {
                            Ok(()) => {
                                self.notify(format!("Copied {} failure(s) to clipboard", count), now)
                            }
                            Err(e) => {
                                warn!("Clipboard unavailable: {}", e);
                                self.notify(format!("Clipboard unavailable: {}", e), now);
                            }
                        }
                    }
                    KeyAction::Quit => return Flow::Quit,
                    _ => {
                        self.info.notice = None;
                        self.notice_until = None;
                        self.view = ViewState::Browsing;
                    }
                }
                return Flow::Continue;
            }
            ViewState::Browsing => {}
        }

        // Settle an expired sequence before commit, remove or clear act on the set
        log_outcome(self.session.tick(now));

        match handle_key_event(key) {
            KeyAction::Quit => return Flow::Quit,
            KeyAction::Digit(digit) => {
                log_outcome(self.session.on_digit(digit, now));
            }
            KeyAction::Submit => {
                log_outcome(self.session.on_enter(now));
            }
            KeyAction::Next => {
                self.session.next_image(now);
            }
            KeyAction::Previous => {
                self.session.previous_image(now);
            }
            KeyAction::Commit => {
                if self.session.pending().is_empty() {
                    self.notify("Nothing to copy yet", now);
                } else if !self.session.is_committing() {
                    self.view = ViewState::ConfirmCommit;
                }
            }
            KeyAction::RemovePending => {
                if let Some(mv) = self.session.remove_current_pending() {
                    self.notify(format!("Removed pending move for {}", mv.image_label), now);
                }
            }
            KeyAction::ClearAll => {
                if !self.session.pending().is_empty() {
                    self.view = ViewState::ConfirmClear;
                }
            }
            KeyAction::ToggleAutoAdvance => {
                let enabled = !self.session.auto_advance();
                self.session.set_auto_advance(enabled);
                if let Err(e) = self.prefs.set_auto_advance(enabled) {
                    warn!("Failed to save user config: {}", e);
                }
                let state = if enabled { "on" } else { "off" };
                self.notify(format!("Auto-advance {}", state), now);
            }
            KeyAction::Open => {
                if let Some(image) = self.session.current_image() {
                    return Flow::Open(image.path.clone());
                }
            }
            KeyAction::Reload => self.reload_tree(now),
            KeyAction::Help => self.view = ViewState::Help,
            KeyAction::Confirm | KeyAction::Cancel | KeyAction::CopyFailures => {
                // Only meaningful inside dialogs
            }
            KeyAction::None => {}
        }
        Flow::Continue
    }

    fn start_commit(&mut self) {
        let Some(moves) = self.session.begin_commit() else {
            self.view = ViewState::Browsing;
            return;
        };
        info!(moves = moves.len(), "Starting copy operation");
        match self.worker.start_commit(moves) {
            Ok(()) => self.view = ViewState::Committing,
            Err(e) => {
                error!("Failed to start copy operation: {}", e);
                let result = CommitResult::aborted(e.to_string());
                self.session.finish_commit(&result);
                self.view = ViewState::CommitResult(result);
            }
        }
    }

    fn reload_tree(&mut self, now: Instant) {
        if self.worker.is_building() || self.session.is_committing() {
            return;
        }
        match self.worker.start_tree_build(self.dest_dir.clone()) {
            Ok(()) => {
                info!(dest = %self.dest_dir.display(), "Reloading destination tree");
                self.info.loading_tree = true;
                if !self.session.pending().is_empty() {
                    self.notify("Reloading folders; pending moves will be dropped", now);
                }
            }
            Err(e) => {
                error!("Failed to reload destination tree: {}", e);
                self.notify(format!("Failed to reload folders: {}", e), now);
            }
        }
    }
}

fn log_outcome(outcome: KeyOutcome) {
    match outcome {
        KeyOutcome::Rejected(e) => debug!("{}", e),
        KeyOutcome::Resolved { advanced: true, .. } => debug!("Advanced to next image"),
        _ => {}
    }
}

fn copy_to_clipboard(text: String) -> std::result::Result<(), arboard::Error> {
    let mut clipboard = arboard::Clipboard::new()?;
    clipboard.set_text(text)
}

/// Main application loop
fn run_loop<B: ratatui::backend::Backend + std::io::Write>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()> {
    loop {
        app.tick(Instant::now());

        terminal.draw(|frame| render_view(frame, &app.session, &app.view, &app.info))?;

        // Handle input
        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.handle_key(key, Instant::now()) {
            Flow::Continue => {}
            Flow::Quit => break,
            Flow::Open(path) => {
                // Suspend terminal before opening external program
                if let Err(e) = suspend_terminal(terminal) {
                    warn!("Failed to suspend terminal: {}", e);
                    continue;
                }

                let open_result = open_file(&path);

                // Resume terminal after external program exits
                resume_terminal(terminal)?;

                if let Err(e) = open_result {
                    warn!("Failed to open image: {}", e);
                    app.notify(format!("Failed to open image: {}", e), Instant::now());
                }
            }
        }
    }

    Ok(())
}
