//! Application core — event loop, screen management, action dispatch.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};
use secrecy::SecretString;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use storefront_core::{AuthState, Catalog, CoreError, Credentials};

use crate::action::{Action, Notification};
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;

/// Top-level application state and event loop.
pub struct App {
    /// Current active screen; follows the auth state.
    active_screen: ScreenId,
    /// All screen components, keyed by ScreenId.
    screens: HashMap<ScreenId, Box<dyn Component>>,
    /// Whether the app should keep running.
    running: bool,
    /// Help overlay visibility.
    help_visible: bool,
    /// Terminal size for responsive layout.
    terminal_size: (u16, u16),
    /// Action sender — components can dispatch actions through this.
    action_tx: mpsc::UnboundedSender<Action>,
    /// Action receiver — main loop drains this.
    action_rx: mpsc::UnboundedReceiver<Action>,
    /// Catalog handle for live data and commands.
    catalog: Catalog,
    /// Cancellation token for the data bridge task.
    data_cancel: CancellationToken,
    /// Active notification toast with display timestamp.
    notification: Option<(Notification, Instant)>,
    /// Last auth state, for the status bar.
    auth_state: AuthState,
}

impl App {
    pub fn new(catalog: Catalog) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        Self {
            active_screen: ScreenId::Login,
            screens: create_screens(),
            running: true,
            help_visible: false,
            terminal_size: (0, 0),
            action_tx,
            action_rx,
            catalog,
            data_cancel: CancellationToken::new(),
            notification: None,
            auth_state: AuthState::Unauthenticated,
        }
    }

    /// Initialize all screen components with the action sender.
    fn init_screens(&mut self) -> Result<()> {
        for screen in self.screens.values_mut() {
            screen.init(self.action_tx.clone())?;
        }
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }
        Ok(())
    }

    /// Run the main event loop. This is the heart of the TUI.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        self.terminal_size = tui.size().unwrap_or((80, 24));
        self.init_screens()?;

        // Data bridge owns the catalog background tasks; a cached token
        // may flip us straight past the login screen.
        {
            let catalog = self.catalog.clone();
            let cancel = self.data_cancel.clone();
            let tx = self.action_tx.clone();
            tokio::spawn(async move {
                crate::data_bridge::spawn_data_bridge(catalog, tx, cancel).await;
            });
        }

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!("TUI event loop started");

        while self.running {
            // 1. Wait for the next event
            let Some(event) = events.next().await else {
                break;
            };

            // 2. Map event → action(s)
            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => {
                    self.action_tx.send(Action::Resize(w, h))?;
                }
                Event::Tick => {
                    self.action_tx.send(Action::Tick)?;
                }
                Event::Render => {
                    self.action_tx.send(Action::Render)?;
                }
            }

            // 3. Drain and process all queued actions
            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        // Cancel the data bridge and clean up
        self.data_cancel.cancel();
        events.stop();
        info!("TUI event loop ended");
        Ok(())
    }

    /// Map a key event to an action. Global keys are handled here;
    /// screen-specific keys are delegated to the active screen component.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        // Ctrl+C quits no matter what has focus.
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if self.help_visible {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Ok(Some(Action::ToggleHelp)),
                _ => Ok(None),
            };
        }

        // The login form and an open modal swallow everything else.
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            if screen.captures_input() {
                return screen.handle_key_event(key);
            }
        }

        // Global keybindings
        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),
            (KeyModifiers::NONE, KeyCode::Char('?')) => return Ok(Some(Action::ToggleHelp)),
            (KeyModifiers::CONTROL, KeyCode::Char('l')) => return Ok(Some(Action::Logout)),
            _ => {}
        }

        // Delegate to active screen component
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            return screen.handle_key_event(key);
        }

        Ok(None)
    }

    /// Process a single action — update app state and propagate to components.
    #[allow(clippy::too_many_lines)]
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.running = false;
            }

            Action::Resize(w, h) => {
                self.terminal_size = (*w, *h);
            }

            Action::ToggleHelp => {
                self.help_visible = !self.help_visible;
            }

            Action::Render => {}

            Action::Tick => {
                // Auto-dismiss notifications after 3 seconds
                if let Some((_, created)) = &self.notification {
                    if created.elapsed() > Duration::from_secs(3) {
                        self.notification = None;
                    }
                }
                // Active screen animates its throbber off the tick
                if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                    let _ = screen.update(action);
                }
            }

            // Data updates go to ALL screens so they stay in sync
            Action::ProductsUpdated(_) => {
                for screen in self.screens.values_mut() {
                    if let Some(follow_up) = screen.update(action)? {
                        self.action_tx.send(follow_up)?;
                    }
                }
            }

            Action::AuthChanged(state) => {
                debug!(?state, "auth state changed");
                self.auth_state = *state;
                let target = match state {
                    AuthState::Authenticated => ScreenId::Products,
                    AuthState::Unauthenticated => ScreenId::Login,
                };
                self.switch_screen(target);
            }

            // ── Session lifecycle ────────────────────────────────────
            Action::LoginSubmit { username, password } => {
                let catalog = self.catalog.clone();
                let credentials = Credentials {
                    username: username.clone(),
                    password: SecretString::from(password.clone()),
                };
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    let result = catalog
                        .session()
                        .login(&credentials)
                        .await
                        .map_err(|e| e.to_string());
                    let _ = tx.send(Action::LoginResult(result));
                });
            }

            Action::LoginResult(result) => {
                if let Some(screen) = self.screens.get_mut(&ScreenId::Login) {
                    screen.update(action)?;
                }
                if result.is_ok() {
                    // AuthChanged arrives via the data bridge; the
                    // snapshot fetch starts right away.
                    self.action_tx.send(Action::RequestRefresh)?;
                }
            }

            Action::Logout => {
                self.catalog.session().logout();
                self.action_tx
                    .send(Action::Notify(Notification::info("Signed out")))?;
            }

            // ── Catalog pipeline ─────────────────────────────────────
            Action::RequestRefresh => {
                let catalog = self.catalog.clone();
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    match catalog.fetch_all().await {
                        Ok(()) => {}
                        Err(CoreError::SessionExpired) => {
                            catalog.session().logout();
                            let _ = tx.send(Action::Notify(Notification::error(
                                "Session expired — signed out",
                            )));
                        }
                        Err(e) => {
                            warn!(error = %e, "refresh failed");
                            let _ = tx.send(Action::Notify(Notification::error(format!("{e}"))));
                        }
                    }
                });
            }

            Action::SubmitModal(pending) => {
                let catalog = self.catalog.clone();
                let tx = self.action_tx.clone();
                let generation = pending.generation;
                let command = pending.command.clone();
                tokio::spawn(async move {
                    let outcome = catalog.execute(command).await;
                    let expired = matches!(outcome, Err(CoreError::SessionExpired));
                    let result = match outcome {
                        Ok(_) => Ok(()),
                        Err(e) => Err(e.to_string()),
                    };
                    let _ = tx.send(Action::ModalFinished { generation, result });
                    if expired {
                        catalog.session().logout();
                    }
                });
            }

            Action::ModalFinished { result, .. } => {
                if let Some(screen) = self.screens.get_mut(&ScreenId::Products) {
                    screen.update(action)?;
                }
                match result {
                    Ok(()) => {
                        self.action_tx
                            .send(Action::Notify(Notification::success("Saved")))?;
                        self.action_tx.send(Action::RequestRefresh)?;
                    }
                    Err(e) => {
                        self.action_tx
                            .send(Action::Notify(Notification::error(e.clone())))?;
                    }
                }
            }

            // Notifications
            Action::Notify(n) => {
                self.notification = Some((n.clone(), Instant::now()));
            }

            // Everything else goes to the active screen only
            other => {
                if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                    if let Some(follow_up) = screen.update(other)? {
                        self.action_tx.send(follow_up)?;
                    }
                }
            }
        }

        Ok(())
    }

    fn switch_screen(&mut self, target: ScreenId) {
        if target == self.active_screen {
            return;
        }
        debug!("switching screen: {} → {}", self.active_screen, target);
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(false);
        }
        self.active_screen = target;
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }
    }

    // ── Rendering ─────────────────────────────────────────────────

    /// Render the full application frame.
    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        // Login gets the full frame — no status bar
        if self.active_screen == ScreenId::Login {
            if let Some(screen) = self.screens.get(&ScreenId::Login) {
                screen.render(frame, area);
            }
        } else {
            // Layout: [screen content] [status bar]
            let layout = Layout::vertical([
                Constraint::Min(1),    // Screen content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            if let Some(screen) = self.screens.get(&self.active_screen) {
                screen.render(frame, layout[0]);
            }
            self.render_status_bar(frame, layout[1]);
        }

        // Render overlays on top (order matters: last = topmost)
        if let Some((ref notif, _)) = self.notification {
            self.render_notification(frame, area, notif);
        }

        if self.help_visible {
            self.render_help_overlay(frame, area);
        }
    }

    /// Render the bottom status bar with session state and key hints.
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let session_indicator = match self.auth_state {
            AuthState::Authenticated => Span::styled(
                format!("● {}", self.catalog.config().merchant),
                Style::default().fg(theme::MINT),
            ),
            AuthState::Unauthenticated => {
                Span::styled("○ signed out", Style::default().fg(theme::ROSE))
            }
        };

        let hints = Span::styled(" │ ? help  Ctrl+L sign out  q quit", theme::key_hint());

        let line = Line::from(vec![Span::raw(" "), session_indicator, hints]);

        frame.render_widget(Paragraph::new(line), area);
    }

    /// Render the help overlay centered on screen.
    #[allow(clippy::unused_self)]
    fn render_help_overlay(&self, frame: &mut Frame, area: Rect) {
        let help_width = 58u16.min(area.width.saturating_sub(4));
        let help_height = 20u16.min(area.height.saturating_sub(4));

        let x = (area.width.saturating_sub(help_width)) / 2;
        let y = (area.height.saturating_sub(help_height)) / 2;

        let help_area = Rect::new(area.x + x, area.y + y, help_width, help_height);

        // Clear the background
        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            help_area,
        );

        let block = Block::default()
            .title(" Keyboard Shortcuts ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());

        let inner = block.inner(help_area);
        frame.render_widget(block, help_area);

        let section = |label: &str| {
            Line::from(Span::styled(
                format!("  {label}"),
                Style::default().fg(theme::SKY),
            ))
        };
        let entry = |keys: &str, what: &str| {
            Line::from(vec![
                Span::styled(format!("  {keys:<10}"), theme::key_hint_key()),
                Span::styled(what.to_string(), theme::key_hint()),
            ])
        };

        let help_text = vec![
            Line::from(""),
            section("Products"),
            Line::from(Span::styled("  ────────", theme::key_hint())),
            entry("j/k ↑/↓", "Move selection"),
            entry("g/G", "Top / bottom"),
            entry("n", "New product"),
            entry("e Enter", "Edit selected"),
            entry("d", "Delete selected"),
            entry("r", "Refresh from server"),
            Line::from(""),
            section("Modal"),
            Line::from(Span::styled("  ─────", theme::key_hint())),
            entry("Tab", "Next field"),
            entry("Ctrl+A/X", "Add / remove image slot"),
            entry("Enter", "Save"),
            entry("Esc", "Cancel"),
            Line::from(""),
            section("Global"),
            Line::from(Span::styled("  ──────", theme::key_hint())),
            entry("Ctrl+L", "Sign out"),
            entry("q", "Quit"),
            Line::from(""),
            Line::from(Span::styled(
                "                        Esc or ? to close",
                theme::key_hint(),
            )),
        ];

        frame.render_widget(Paragraph::new(help_text), inner);
    }

    /// Render a notification toast in the bottom-right corner.
    #[allow(clippy::unused_self)]
    fn render_notification(&self, frame: &mut Frame, area: Rect, notif: &Notification) {
        use crate::action::NotificationLevel;

        #[allow(clippy::cast_possible_truncation)]
        let msg_len = notif.message.len() as u16;
        let width = (msg_len + 6).clamp(20, 60);
        let height = 3u16;

        let x = area.width.saturating_sub(width + 1);
        let y = area.height.saturating_sub(height + 2); // above status bar
        let toast_area = Rect::new(area.x + x, area.y + y, width, height);

        let (border_color, icon) = match notif.level {
            NotificationLevel::Success => (theme::MINT, "✓"),
            NotificationLevel::Error => (theme::ROSE, "✗"),
            NotificationLevel::Info => (theme::SKY, "·"),
        };

        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            toast_area,
        );

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_color));

        let inner = block.inner(toast_area);
        frame.render_widget(block, toast_area);

        let line = Line::from(vec![
            Span::styled(format!(" {icon} "), Style::default().fg(border_color)),
            Span::styled(&notif.message, Style::default().fg(theme::DIM_WHITE)),
        ]);
        frame.render_widget(Paragraph::new(line), inner);
    }
}
