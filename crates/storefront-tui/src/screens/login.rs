//! Login screen — operator sign-in form.
//!
//! Two fields (email, masked password) with Tab cycling. Enter submits;
//! a throbber runs while the sign-in request is in flight. On failure the
//! server message is shown and the form stays as typed.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use tokio::sync::mpsc::UnboundedSender;

use crate::action::Action;
use crate::component::Component;
use crate::theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoginState {
    Editing,
    Authenticating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoginField {
    Username,
    Password,
}

pub struct LoginScreen {
    focused: bool,
    action_tx: Option<UnboundedSender<Action>>,
    state: LoginState,
    active_field: LoginField,
    username_input: String,
    password_input: String,
    show_password: bool,
    error: Option<String>,
    throbber_state: throbber_widgets_tui::ThrobberState,
}

impl LoginScreen {
    pub fn new() -> Self {
        let mut screen = Self {
            focused: false,
            action_tx: None,
            state: LoginState::Editing,
            active_field: LoginField::Username,
            username_input: String::new(),
            password_input: String::new(),
            show_password: false,
            error: None,
            throbber_state: throbber_widgets_tui::ThrobberState::default(),
        };
        screen.load_from_config();
        screen
    }

    /// Pre-fill the form from the config file so a returning operator
    /// only has to hit Enter.
    fn load_from_config(&mut self) {
        let cfg = storefront_config::load_config_or_default();
        if let Some(user) = cfg.username {
            self.username_input = user;
        }
        if self.username_input.is_empty() {
            self.active_field = LoginField::Username;
        } else {
            self.active_field = LoginField::Password;
        }
    }

    fn focus_next(&mut self) {
        self.active_field = match self.active_field {
            LoginField::Username => LoginField::Password,
            LoginField::Password => LoginField::Username,
        };
    }

    fn active_input_mut(&mut self) -> &mut String {
        match self.active_field {
            LoginField::Username => &mut self.username_input,
            LoginField::Password => &mut self.password_input,
        }
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.username_input.trim().is_empty() {
            return Err("Email cannot be empty".into());
        }
        if self.password_input.is_empty() {
            return Err("Password cannot be empty".into());
        }
        Ok(())
    }

    fn submit(&mut self) -> Option<Action> {
        match self.validate() {
            Err(msg) => {
                self.error = Some(msg);
                None
            }
            Ok(()) => {
                self.state = LoginState::Authenticating;
                self.error = None;
                Some(Action::LoginSubmit {
                    username: self.username_input.trim().to_string(),
                    password: self.password_input.clone(),
                })
            }
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    #[allow(clippy::unused_self)]
    fn render_centered_panel(&self, frame: &mut Frame, area: Rect) -> Rect {
        let panel_w = 52u16.min(area.width.saturating_sub(4));
        let panel_h = 16u16.min(area.height.saturating_sub(2));
        let x = (area.width.saturating_sub(panel_w)) / 2;
        let y = (area.height.saturating_sub(panel_h)) / 2;
        let panel = Rect::new(area.x + x, area.y + y, panel_w, panel_h);

        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            panel,
        );

        let block = Block::default()
            .title(Line::from(vec![
                Span::raw(" "),
                Span::styled(
                    "Storefront Admin",
                    Style::default().fg(theme::AMBER).add_modifier(Modifier::BOLD),
                ),
                Span::raw(" "),
            ]))
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme::AMBER));

        let inner = block.inner(panel);
        frame.render_widget(block, panel);
        inner
    }

    #[allow(clippy::unused_self)]
    fn render_input_field(
        &self,
        frame: &mut Frame,
        area: Rect,
        label: &str,
        value: &str,
        active: bool,
        masked: bool,
    ) {
        if area.height < 3 {
            return;
        }

        let label_style = if active {
            Style::default().fg(theme::SKY)
        } else {
            Style::default().fg(theme::DIM_WHITE)
        };
        frame.render_widget(
            Paragraph::new(Span::styled(label, label_style)),
            Rect::new(area.x, area.y, area.width, 1),
        );

        let display = if masked && !value.is_empty() {
            "\u{25CF}".repeat(value.chars().count())
        } else {
            value.to_string()
        };

        let border_color = if active { theme::AMBER } else { theme::BORDER_GRAY };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_color));

        let block_area = Rect::new(area.x, area.y + 1, area.width, 3.min(area.height - 1));
        let inner = block.inner(block_area);
        frame.render_widget(block, block_area);

        let text = if active {
            format!("{display}\u{2588}")
        } else {
            display
        };
        frame.render_widget(
            Paragraph::new(Span::styled(text, Style::default().fg(theme::DIM_WHITE))),
            inner,
        );
    }

    fn render_editing(&self, frame: &mut Frame, area: Rect) {
        let fields_area = Rect::new(area.x + 1, area.y, area.width.saturating_sub(2), area.height);
        let chunks = Layout::vertical([
            Constraint::Length(4), // email
            Constraint::Length(4), // password
            Constraint::Min(0),
        ])
        .split(fields_area);

        self.render_input_field(
            frame,
            chunks[0],
            "  Email",
            &self.username_input,
            self.active_field == LoginField::Username,
            false,
        );
        self.render_input_field(
            frame,
            chunks[1],
            "  Password",
            &self.password_input,
            self.active_field == LoginField::Password,
            !self.show_password,
        );
    }

    fn render_authenticating(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::vertical([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

        let throbber = throbber_widgets_tui::Throbber::default()
            .label("  Signing in...")
            .style(Style::default().fg(theme::DIM_WHITE))
            .throbber_style(Style::default().fg(theme::AMBER));

        frame.render_stateful_widget(throbber, layout[1], &mut self.throbber_state.clone());
    }

    fn render_key_hints(&self, frame: &mut Frame, area: Rect) {
        let hints = match self.state {
            LoginState::Editing => {
                if self.active_field == LoginField::Password {
                    "Ctrl+U reveal  Tab next  Enter sign in  Ctrl+C quit"
                } else {
                    "Tab next  Enter sign in  Ctrl+C quit"
                }
            }
            LoginState::Authenticating => "Esc cancel",
        };

        frame.render_widget(
            Paragraph::new(Span::styled(hints, theme::key_hint())).alignment(Alignment::Center),
            area,
        );
    }
}

impl Component for LoginScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.state == LoginState::Authenticating {
            if key.code == KeyCode::Esc {
                self.state = LoginState::Editing;
            }
            return Ok(None);
        }

        // Clear the error on any input
        self.error = None;

        match key.code {
            KeyCode::Tab | KeyCode::BackTab => self.focus_next(),
            KeyCode::Enter => return Ok(self.submit()),
            KeyCode::Backspace => {
                self.active_input_mut().pop();
            }
            KeyCode::Char(c) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) && c == 'u' {
                    self.show_password = !self.show_password;
                } else {
                    self.active_input_mut().push(c);
                }
            }
            _ => {}
        }

        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::LoginResult(result) => match result {
                Ok(()) => {
                    // The session watch flips the screen; wipe the
                    // password so nothing lingers in the buffer.
                    self.state = LoginState::Editing;
                    self.password_input.clear();
                }
                Err(msg) => {
                    self.state = LoginState::Editing;
                    self.error = Some(msg.clone());
                }
            },
            Action::Tick => {
                if self.state == LoginState::Authenticating {
                    self.throbber_state.calc_next();
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            area,
        );

        let inner = self.render_centered_panel(frame, area);

        let layout = Layout::vertical([
            Constraint::Length(1), // spacer
            Constraint::Min(1),    // content
            Constraint::Length(1), // error
            Constraint::Length(1), // hints
        ])
        .split(inner);

        if let Some(ref err) = self.error {
            frame.render_widget(
                Paragraph::new(Span::styled(err, Style::default().fg(theme::ROSE)))
                    .alignment(Alignment::Center),
                layout[2],
            );
        }

        self.render_key_hints(frame, layout[3]);

        match self.state {
            LoginState::Editing => self.render_editing(frame, layout[1]),
            LoginState::Authenticating => self.render_authenticating(frame, layout[1]),
        }
    }

    fn captures_input(&self) -> bool {
        true
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &'static str {
        "login"
    }
}
